#![forbid(unsafe_code)]

//! Arena-backed doubly-linked list nodes.
//!
//! [`Links<T>`] stores nodes in a generation-checked arena and links them
//! through [`NodeKey`]s instead of pointers. A node can be inserted before or
//! after any other live node in O(1) and unlinked from wherever it sits in
//! O(1). Lists have no owning head object: a list is simply whatever chain of
//! nodes is reachable from a node the caller remembers (a first/last pair, or
//! a sentinel node that never carries a payload of interest).
//!
//! # Invariants
//!
//! 1. A node is reachable from a neighbor iff it is currently linked.
//! 2. [`Links::unlink`] repairs both neighbors and clears the node's own
//!    links; it is idempotent.
//! 3. Insertion always unlinks the inserted node first, so re-inserting a
//!    node that is already linked elsewhere is safe.
//! 4. Inserting a node relative to itself is a no-op.
//! 5. A key whose node was removed is stale forever: the slot generation is
//!    bumped on removal, so stale keys never alias a newer node.

/// Generation-checked handle to a node in a [`Links`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    index: u32,
    generation: u32,
}

impl NodeKey {
    /// Arena slot index of this key.
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot at the time this key was issued.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<NodeKey>,
    next: Option<NodeKey>,
}

#[derive(Debug)]
enum Entry<T> {
    Occupied { generation: u32, node: Node<T> },
    Vacant { generation: u32, next_free: Option<u32> },
}

/// Arena of doubly-linked nodes.
#[derive(Debug)]
pub struct Links<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for Links<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Links<T> {
    /// Create an empty arena.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Number of live nodes (linked or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The key the next call to [`insert`](Self::insert) will return.
    #[must_use]
    pub fn next_key(&self) -> NodeKey {
        match self.free_head {
            Some(index) => match &self.entries[index as usize] {
                Entry::Vacant { generation, .. } => NodeKey {
                    index,
                    generation: *generation,
                },
                Entry::Occupied { .. } => unreachable!("free list points at an occupied slot"),
            },
            None => NodeKey {
                index: self.entries.len() as u32,
                generation: 0,
            },
        }
    }

    /// Allocate a new, unlinked node holding `value`.
    pub fn insert(&mut self, value: T) -> NodeKey {
        let key = self.next_key();
        let node = Node {
            value,
            prev: None,
            next: None,
        };
        match self.free_head {
            Some(index) => {
                let slot = &mut self.entries[index as usize];
                if let Entry::Vacant { next_free, .. } = slot {
                    self.free_head = *next_free;
                }
                *slot = Entry::Occupied {
                    generation: key.generation,
                    node,
                };
            }
            None => self.entries.push(Entry::Occupied {
                generation: key.generation,
                node,
            }),
        }
        self.len += 1;
        key
    }

    /// Unlink and free a node, returning its value. Stale keys yield `None`.
    pub fn remove(&mut self, key: NodeKey) -> Option<T> {
        if !self.contains(key) {
            return None;
        }
        self.unlink(key);
        let slot = &mut self.entries[key.index as usize];
        let vacant = Entry::Vacant {
            generation: key.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        match std::mem::replace(slot, vacant) {
            Entry::Occupied { node, .. } => {
                self.free_head = Some(key.index);
                self.len -= 1;
                Some(node.value)
            }
            Entry::Vacant { .. } => None,
        }
    }

    /// Whether `key` refers to a live node.
    #[must_use]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.node(key).is_some()
    }

    /// Shared access to a node's value.
    #[must_use]
    pub fn get(&self, key: NodeKey) -> Option<&T> {
        self.node(key).map(|node| &node.value)
    }

    /// Mutable access to a node's value.
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut T> {
        self.node_mut(key).map(|node| &mut node.value)
    }

    /// Successor of `key`, if linked to one.
    #[must_use]
    pub fn next(&self, key: NodeKey) -> Option<NodeKey> {
        self.node(key).and_then(|node| node.next)
    }

    /// Predecessor of `key`, if linked to one.
    #[must_use]
    pub fn prev(&self, key: NodeKey) -> Option<NodeKey> {
        self.node(key).and_then(|node| node.prev)
    }

    /// Whether `key` currently has any neighbor.
    #[must_use]
    pub fn is_linked(&self, key: NodeKey) -> bool {
        self.node(key)
            .is_some_and(|node| node.prev.is_some() || node.next.is_some())
    }

    /// Detach `key` from its neighbors, joining them to each other.
    ///
    /// Returns `false` for stale keys.
    pub fn unlink(&mut self, key: NodeKey) -> bool {
        let Some((prev, next)) = self.node(key).map(|node| (node.prev, node.next)) else {
            return false;
        };
        if let Some(node) = prev.and_then(|p| self.node_mut(p)) {
            node.next = next;
        }
        if let Some(node) = next.and_then(|n| self.node_mut(n)) {
            node.prev = prev;
        }
        if let Some(node) = self.node_mut(key) {
            node.prev = None;
            node.next = None;
        }
        true
    }

    /// Insert `other` immediately before `at`.
    ///
    /// `other` is unlinked from its current position first. Returns `false`
    /// (and changes nothing) when `other == at` or either key is stale.
    pub fn push_front(&mut self, at: NodeKey, other: NodeKey) -> bool {
        if at == other || !self.contains(at) || !self.contains(other) {
            return false;
        }
        self.unlink(other);
        let before = self.prev(at);
        if let Some(node) = before.and_then(|b| self.node_mut(b)) {
            node.next = Some(other);
        }
        if let Some(node) = self.node_mut(other) {
            node.prev = before;
            node.next = Some(at);
        }
        if let Some(node) = self.node_mut(at) {
            node.prev = Some(other);
        }
        true
    }

    /// Insert `other` immediately after `at`.
    ///
    /// `other` is unlinked from its current position first. Returns `false`
    /// (and changes nothing) when `other == at` or either key is stale.
    pub fn push_back(&mut self, at: NodeKey, other: NodeKey) -> bool {
        if at == other || !self.contains(at) || !self.contains(other) {
            return false;
        }
        self.unlink(other);
        let after = self.next(at);
        if let Some(node) = after.and_then(|a| self.node_mut(a)) {
            node.prev = Some(other);
        }
        if let Some(node) = self.node_mut(other) {
            node.prev = Some(at);
            node.next = after;
        }
        if let Some(node) = self.node_mut(at) {
            node.next = Some(other);
        }
        true
    }

    /// Iterate keys forward starting at (and including) `start`.
    pub fn iter_from(&self, start: Option<NodeKey>) -> impl Iterator<Item = NodeKey> + '_ {
        std::iter::successors(start.filter(|k| self.contains(*k)), move |k| self.next(*k))
    }

    fn node(&self, key: NodeKey) -> Option<&Node<T>> {
        match self.entries.get(key.index as usize)? {
            Entry::Occupied { generation, node } if *generation == key.generation => Some(node),
            _ => None,
        }
    }

    fn node_mut(&mut self, key: NodeKey) -> Option<&mut Node<T>> {
        match self.entries.get_mut(key.index as usize)? {
            Entry::Occupied { generation, node } if *generation == key.generation => Some(node),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(links: &Links<char>, first: NodeKey) -> Vec<char> {
        links
            .iter_from(Some(first))
            .map(|k| *links.get(k).unwrap())
            .collect()
    }

    #[test]
    fn insert_is_unlinked() {
        let mut links = Links::new();
        let a = links.insert('a');
        assert!(links.contains(a));
        assert!(!links.is_linked(a));
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn push_back_and_front_build_order() {
        let mut links = Links::new();
        let a = links.insert('a');
        let b = links.insert('b');
        let c = links.insert('c');
        assert!(links.push_back(a, c));
        assert!(links.push_front(c, b));
        assert_eq!(chain(&links, a), vec!['a', 'b', 'c']);
        assert_eq!(links.prev(c), Some(b));
        assert_eq!(links.prev(a), None);
    }

    #[test]
    fn unlink_repairs_neighbors() {
        let mut links = Links::new();
        let a = links.insert('a');
        let b = links.insert('b');
        let c = links.insert('c');
        links.push_back(a, b);
        links.push_back(b, c);

        assert!(links.unlink(b));
        assert_eq!(chain(&links, a), vec!['a', 'c']);
        assert_eq!(links.prev(c), Some(a));
        assert!(!links.is_linked(b));

        // Idempotent.
        assert!(links.unlink(b));
        assert_eq!(chain(&links, a), vec!['a', 'c']);
    }

    #[test]
    fn reinsert_moves_node() {
        let mut links = Links::new();
        let a = links.insert('a');
        let b = links.insert('b');
        let c = links.insert('c');
        links.push_back(a, b);
        links.push_back(b, c);

        // Move `a` behind `c`.
        assert!(links.push_back(c, a));
        assert_eq!(chain(&links, b), vec!['b', 'c', 'a']);
        assert_eq!(links.prev(b), None);
    }

    #[test]
    fn self_insertion_is_noop() {
        let mut links = Links::new();
        let a = links.insert('a');
        let b = links.insert('b');
        links.push_back(a, b);
        assert!(!links.push_back(a, a));
        assert!(!links.push_front(b, b));
        assert_eq!(chain(&links, a), vec!['a', 'b']);
    }

    #[test]
    fn remove_frees_and_stales_key() {
        let mut links = Links::new();
        let a = links.insert('a');
        let b = links.insert('b');
        links.push_back(a, b);

        assert_eq!(links.remove(a), Some('a'));
        assert!(!links.contains(a));
        assert_eq!(links.prev(b), None);
        assert_eq!(links.remove(a), None);

        // Slot is reused with a new generation.
        let c = links.insert('c');
        assert_eq!(c.index(), a.index());
        assert_ne!(c.generation(), a.generation());
        assert_eq!(links.get(a), None);
        assert_eq!(links.get(c), Some(&'c'));
    }

    #[test]
    fn next_key_predicts_insert() {
        let mut links = Links::new();
        let predicted = links.next_key();
        assert_eq!(links.insert(1), predicted);
        let x = links.insert(2);
        links.remove(x);
        let predicted = links.next_key();
        assert_eq!(links.insert(3), predicted);
    }

    #[test]
    fn stale_keys_are_rejected_by_insertion() {
        let mut links = Links::new();
        let a = links.insert('a');
        let b = links.insert('b');
        links.remove(b);
        assert!(!links.push_back(a, b));
        assert!(!links.push_front(b, a));
        assert!(!links.unlink(b));
    }
}
