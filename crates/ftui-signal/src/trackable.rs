#![forbid(unsafe_code)]

//! Observer base: the receiving end of connections.
//!
//! Every object that wants slot methods called on it embeds a [`Trackable`]
//! and exposes it through [`Observer`]. The trackable keeps one binding per
//! connection that targets the object. Destroying a binding always destroys
//! its paired token on the emitter side, so dropping the trackable leaves no
//! emitter pointing at a dead receiver.
//!
//! # Invariants
//!
//! 1. Each binding pairs with exactly one token, and vice versa.
//! 2. Bindings are always appended; their order carries no meaning.
//! 3. Teardown is binding first, then token, per pair, with no user code in
//!    between.
//! 4. Cloning a trackable never copies connections.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::delegate::{MethodId, SlotMethod};
use crate::link::{Links, NodeKey};
use crate::slot::Slot;

/// Identity of a trackable (and therefore of the receiver embedding it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackableId(usize);

/// An object that can be the target of a connection.
pub trait Observer: 'static {
    /// The trackable embedded in this object.
    fn trackable(&self) -> &Trackable;
}

/// Emitter-side hook invoked when the binding half of a pair goes away.
pub(crate) trait TokenHost {
    /// Destroy the token `key` whose binding has already been removed.
    fn release_token(&self, key: NodeKey);

    /// Method identity of token `key`, if it is a bound slot method.
    fn token_method(&self, key: NodeKey) -> Option<MethodId>;
}

/// Where a binding's paired token lives.
#[derive(Clone)]
pub(crate) struct TokenRef {
    pub(crate) host: Weak<dyn TokenHost>,
    pub(crate) key: NodeKey,
}

struct BindingRecord {
    token: TokenRef,
}

#[derive(Default)]
struct BindingList {
    bindings: Links<BindingRecord>,
    first: Option<NodeKey>,
    last: Option<NodeKey>,
}

impl BindingList {
    fn push_back(&mut self, token: TokenRef) -> NodeKey {
        let key = self.bindings.insert(BindingRecord { token });
        match self.last {
            Some(last) => {
                self.bindings.push_back(last, key);
            }
            None => self.first = Some(key),
        }
        self.last = Some(key);
        key
    }

    fn detach(&mut self, key: NodeKey) -> Option<TokenRef> {
        if !self.bindings.contains(key) {
            return None;
        }
        if self.first == Some(key) {
            self.first = self.bindings.next(key);
        }
        if self.last == Some(key) {
            self.last = self.bindings.prev(key);
        }
        self.bindings.remove(key).map(|record| record.token)
    }

    fn snapshot(&self) -> Vec<(NodeKey, TokenRef)> {
        self.bindings
            .iter_from(self.first)
            .filter_map(|key| {
                self.bindings
                    .get(key)
                    .map(|record| (key, record.token.clone()))
            })
            .collect()
    }
}

/// Shared interior of a [`Trackable`].
pub(crate) struct TrackableCore {
    bindings: RefCell<BindingList>,
}

impl TrackableCore {
    pub(crate) fn id(self: &Rc<Self>) -> TrackableId {
        TrackableId(Rc::as_ptr(self) as usize)
    }

    /// Append a binding paired with `token`.
    pub(crate) fn attach_binding(&self, token: TokenRef) -> NodeKey {
        self.bindings.borrow_mut().push_back(token)
    }

    /// Drop binding `key` whose token is already being destroyed.
    pub(crate) fn release_binding(&self, key: NodeKey) {
        let released = self.bindings.borrow_mut().detach(key);
        drop(released);
    }

    /// Destroy binding `key` and cascade into its token.
    fn destroy_binding(&self, key: NodeKey) -> bool {
        let token = self.bindings.borrow_mut().detach(key);
        let Some(token) = token else {
            return false;
        };
        if let Some(host) = token.host.upgrade() {
            host.release_token(token.key);
        }
        true
    }

    fn first_binding(&self) -> Option<NodeKey> {
        self.bindings.borrow().first
    }

    fn len(&self) -> usize {
        self.bindings.borrow().bindings.len()
    }

    fn keys_matching(&self, method: MethodId) -> Vec<NodeKey> {
        let snapshot = self.bindings.borrow().snapshot();
        snapshot
            .into_iter()
            .filter(|(_, token)| {
                token
                    .host
                    .upgrade()
                    .is_some_and(|host| host.token_method(token.key) == Some(method))
            })
            .map(|(key, _)| key)
            .collect()
    }
}

/// Connection bookkeeping for a receiver.
///
/// Embed one in any type that provides slot methods and implement
/// [`Observer`] for it.
///
/// ```ignore
/// struct Label {
///     trackable: Trackable,
///     text: RefCell<String>,
/// }
///
/// impl Observer for Label {
///     fn trackable(&self) -> &Trackable {
///         &self.trackable
///     }
/// }
/// ```
pub struct Trackable {
    core: Rc<TrackableCore>,
}

impl Trackable {
    /// Create an unconnected trackable.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: Rc::new(TrackableCore {
                bindings: RefCell::new(BindingList::default()),
            }),
        }
    }

    /// Identity of this trackable.
    #[must_use]
    pub fn id(&self) -> TrackableId {
        self.core.id()
    }

    pub(crate) fn core(&self) -> &Rc<TrackableCore> {
        &self.core
    }

    /// Number of live connections targeting this object.
    #[must_use]
    pub fn count_bindings(&self) -> usize {
        self.core.len()
    }

    /// Number of live connections targeting `method` on this object.
    #[must_use]
    pub fn count_bindings_to<T, A, M: SlotMethod<T, A>>(&self, method: M) -> usize {
        self.core.keys_matching(MethodId::of::<T, A, M>(method)).len()
    }

    /// Disconnect the connection currently being invoked through `slot`.
    ///
    /// Only succeeds when that connection targets this object. The emission
    /// in progress continues with the next connection.
    pub fn unbind(&self, slot: &Slot) -> bool {
        slot.unbind_current(self.id())
    }

    /// Disconnect every connection targeting this object.
    ///
    /// Returns the number of connections removed.
    pub fn unbind_all(&self) -> usize {
        let mut removed = 0;
        while let Some(key) = self.core.first_binding() {
            if !self.core.destroy_binding(key) {
                break;
            }
            removed += 1;
        }
        #[cfg(feature = "tracing")]
        if removed > 0 {
            debug!(trackable = ?self.id(), removed, "unbound all connections");
        }
        removed
    }

    /// Disconnect every connection targeting `method` on this object.
    ///
    /// Returns the number of connections removed.
    pub fn unbind_all_to<T, A, M: SlotMethod<T, A>>(&self, method: M) -> usize {
        let keys = self.core.keys_matching(MethodId::of::<T, A, M>(method));
        keys.into_iter()
            .filter(|key| self.core.destroy_binding(*key))
            .count()
    }
}

impl Default for Trackable {
    fn default() -> Self {
        Self::new()
    }
}

/// Connections are never copied: the clone starts unconnected.
impl Clone for Trackable {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl Drop for Trackable {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

impl std::fmt::Debug for Trackable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trackable")
            .field("id", &self.id())
            .field("bindings", &self.count_bindings())
            .finish()
    }
}
