#![forbid(unsafe_code)]

//! Multicast emitter with mutation-safe emission.
//!
//! # Design
//!
//! A [`Signal<A>`] owns an arena of tokens linked in invocation order. Each
//! token pairs with a binding in the receiver's [`Trackable`]; destroying
//! either half destroys the other. A token invokes either a bound slot method
//! or another signal (forwarding).
//!
//! Emission walks the list with a cursor. The cursor's position is a *mark*
//! node anchored in the current token's mark list. Destroying a token moves
//! every mark anchored on it to the following token and flags the cursor to
//! skip its next advance, so callbacks may connect or disconnect anything,
//! including the token that is running, without the walk skipping or
//! repeating an unrelated connection.
//!
//! # Ordering
//!
//! Tokens run front to back as the list stands when each step begins. A token
//! inserted after the cursor runs in the same pass; one inserted before it
//! waits for the next emission.
//!
//! # Positions
//!
//! Insert and disconnect positions are signed. `0, 1, ..` count from the
//! front, `-1, -2, ..` from the back. Inserting at `n >= 0` places the token
//! before the n-th token (appending when `n` is past the end); inserting at
//! `-n` places it after the n-th token from the back (prepending when past
//! the front). So `0` prepends and `-1` appends.
//!
//! # Failure Modes
//!
//! - **Forwarding cycle**: refused at connect time with
//!   [`SignalError::ForwardCycle`] unless the config allows it, in which case
//!   emission recurses until the depth limit (if any) stops it.
//! - **Depth limit**: with [`SignalConfig::max_emit_depth`] set, an emission
//!   past the limit does nothing ([`Signal::emit`]) or reports
//!   [`SignalError::DepthExceeded`] ([`Signal::try_emit`]).
//! - **Panicking callback**: unwinds through `emit`; the cursor is released
//!   and the depth counter restored.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::rc::{Rc, Weak};

#[cfg(feature = "tracing")]
use tracing::{trace, warn};

use crate::config::SignalConfig;
use crate::delegate::{Callable, Delegate, Invocation, MethodId, SlotMethod};
use crate::error::{Result, SignalError};
use crate::link::{Links, NodeKey};
use crate::slot::{Slot, SlotHost};
use crate::trackable::{Observer, TokenHost, TokenRef, Trackable, TrackableCore, TrackableId};

/// Where a token's paired binding lives.
struct BindingRef {
    owner: Weak<TrackableCore>,
    owner_id: TrackableId,
    key: NodeKey,
}

struct TokenRecord<A> {
    callable: Callable<A>,
    binding: BindingRef,
    /// Sentinel of the list of cursors positioned on this token.
    marks: NodeKey,
}

enum Mark {
    Head,
    Cursor {
        token: Option<NodeKey>,
        /// Set when the token under the cursor was destroyed and the cursor
        /// already moved on; the next advance is suppressed.
        skip: bool,
    },
}

enum Target<A> {
    Any,
    Method { owner: TrackableId, method: MethodId },
    Forward(*const SignalCore<A>),
}

impl<A> TokenRecord<A> {
    fn matches(&self, target: &Target<A>) -> bool {
        match target {
            Target::Any => true,
            Target::Method { owner, method } => {
                self.binding.owner_id == *owner && self.callable.method() == Some(*method)
            }
            Target::Forward(core) => self.callable.forwards_to(*core),
        }
    }
}

struct SignalState<A> {
    tokens: Links<TokenRecord<A>>,
    first: Option<NodeKey>,
    last: Option<NodeKey>,
    marks: Links<Mark>,
}

impl<A> SignalState<A> {
    fn new() -> Self {
        Self {
            tokens: Links::new(),
            first: None,
            last: None,
            marks: Links::new(),
        }
    }

    /// Token at signed position `pos`, if the list is long enough.
    fn seek(&self, pos: isize) -> Option<NodeKey> {
        if pos >= 0 {
            let mut it = self.first;
            for _ in 0..pos.unsigned_abs() {
                it = self.tokens.next(it?);
            }
            it
        } else {
            let mut it = self.last;
            for _ in 0..(pos + 1).unsigned_abs() {
                it = self.tokens.prev(it?);
            }
            it
        }
    }

    fn step(&self, key: NodeKey, forward: bool) -> Option<NodeKey> {
        if forward {
            self.tokens.next(key)
        } else {
            self.tokens.prev(key)
        }
    }

    fn insert_token(&mut self, index: isize, key: NodeKey) {
        let (Some(first), Some(last)) = (self.first, self.last) else {
            self.first = Some(key);
            self.last = Some(key);
            return;
        };
        match (index >= 0, self.seek(index)) {
            (true, Some(at)) => {
                self.tokens.push_front(at, key);
                if at == first {
                    self.first = Some(key);
                }
            }
            (true, None) => {
                self.tokens.push_back(last, key);
                self.last = Some(key);
            }
            (false, Some(at)) => {
                self.tokens.push_back(at, key);
                if at == last {
                    self.last = Some(key);
                }
            }
            (false, None) => {
                self.tokens.push_front(first, key);
                self.first = Some(key);
            }
        }
    }

    /// Unlink and free token `key`, moving any cursors on it to its successor.
    fn detach_token(&mut self, key: NodeKey) -> Option<TokenRecord<A>> {
        if !self.tokens.contains(key) {
            return None;
        }
        let next = self.tokens.next(key);
        if self.first == Some(key) {
            self.first = next;
        }
        if self.last == Some(key) {
            self.last = self.tokens.prev(key);
        }
        let record = self.tokens.remove(key)?;
        self.relocate_marks(record.marks, next);
        self.marks.remove(record.marks);
        Some(record)
    }

    fn relocate_marks(&mut self, head: NodeKey, next: Option<NodeKey>) {
        let target = next
            .and_then(|n| self.tokens.get(n))
            .map(|record| record.marks);
        while let Some(mark) = self.marks.next(head) {
            if let Some(Mark::Cursor { token, skip }) = self.marks.get_mut(mark) {
                *token = next;
                *skip = true;
            }
            let moved = target.is_some_and(|t| self.marks.push_back(t, mark));
            if !moved {
                self.marks.unlink(mark);
            }
        }
    }

    fn open_cursor(&mut self) -> NodeKey {
        self.marks.insert(Mark::Cursor {
            token: self.first,
            skip: false,
        })
    }

    fn close_cursor(&mut self, mark: NodeKey) {
        self.marks.remove(mark);
    }

    /// Anchor the cursor on its current token and fetch what to run.
    fn begin_step(&mut self, mark: NodeKey) -> Option<Invocation<A>> {
        let token = match self.marks.get(mark)? {
            Mark::Cursor { token, .. } => (*token)?,
            Mark::Head => return None,
        };
        let record = self.tokens.get(token)?;
        let head = record.marks;
        let invocation = record.callable.invocation();
        self.marks.push_back(head, mark);
        Some(invocation)
    }

    /// Advance the cursor unless the topology already moved it.
    fn finish_step(&mut self, mark: NodeKey) {
        let current = match self.marks.get_mut(mark) {
            Some(Mark::Cursor { skip, .. }) if *skip => {
                *skip = false;
                return;
            }
            Some(Mark::Cursor { token, .. }) => *token,
            _ => return,
        };
        let next = current.and_then(|t| self.tokens.next(t));
        if let Some(Mark::Cursor { token, .. }) = self.marks.get_mut(mark) {
            *token = next;
        }
        match next.and_then(|n| self.tokens.get(n)).map(|record| record.marks) {
            Some(head) => {
                self.marks.push_back(head, mark);
            }
            None => {
                self.marks.unlink(mark);
            }
        }
    }

    /// Token whose callback the cursor is running, if it still exists.
    fn invoked_token(&self, mark: NodeKey) -> Option<NodeKey> {
        match self.marks.get(mark)? {
            Mark::Cursor {
                token,
                skip: false,
            } => *token,
            _ => None,
        }
    }

    fn forward_targets(&self) -> Vec<Rc<SignalCore<A>>> {
        self.tokens
            .iter_from(self.first)
            .filter_map(|key| self.tokens.get(key))
            .filter_map(|record| record.callable.forward_target())
            .collect()
    }
}

struct DepthGuard<'a>(&'a Cell<u32>);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// Shared interior of a [`Signal`].
pub(crate) struct SignalCore<A> {
    state: RefCell<SignalState<A>>,
    /// The signal seen as a receiver of forwarding connections.
    trackable: Trackable,
    config: SignalConfig,
    depth: Cell<u32>,
}

impl<A: 'static> SignalCore<A> {
    fn new(config: SignalConfig) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(SignalState::new()),
            trackable: Trackable::new(),
            config,
            depth: Cell::new(0),
        })
    }

    fn connect(this: &Rc<Self>, owner: &Trackable, callable: Callable<A>, index: isize) {
        let host: Weak<dyn TokenHost> = Rc::downgrade(this) as Weak<dyn TokenHost>;
        let owner_core = owner.core();
        let mut state = this.state.borrow_mut();
        let key = state.tokens.next_key();
        let binding_key = owner_core.attach_binding(TokenRef { host, key });
        let marks = state.marks.insert(Mark::Head);
        let inserted = state.tokens.insert(TokenRecord {
            callable,
            binding: BindingRef {
                owner: Rc::downgrade(owner_core),
                owner_id: owner_core.id(),
                key: binding_key,
            },
            marks,
        });
        debug_assert_eq!(inserted, key);
        state.insert_token(index, key);
        #[cfg(feature = "tracing")]
        trace!(
            index,
            connections = state.tokens.len(),
            receiver = ?owner_core.id(),
            "signal connected"
        );
    }

    fn connect_method<T: Observer, M: SlotMethod<T, A>>(
        this: &Rc<Self>,
        receiver: &Rc<T>,
        method: M,
        index: isize,
    ) {
        let delegate = Delegate::<A>::bind::<T, M>(receiver, method);
        Self::connect(this, receiver.trackable(), Callable::Delegate(delegate), index);
    }

    fn connect_forward(this: &Rc<Self>, other: &Rc<Self>, index: isize) -> Result<()> {
        if this.config.reject_forward_cycles && Self::reaches(other, Rc::as_ptr(this)) {
            #[cfg(feature = "tracing")]
            warn!("refused cyclic forwarding connection");
            return Err(SignalError::ForwardCycle);
        }
        Self::connect(
            this,
            &other.trackable,
            Callable::Forward(Rc::downgrade(other)),
            index,
        );
        Ok(())
    }

    /// Whether emitting `from` can end up emitting `goal`.
    fn reaches(from: &Rc<Self>, goal: *const Self) -> bool {
        let mut stack = vec![Rc::clone(from)];
        let mut seen = HashSet::new();
        while let Some(core) = stack.pop() {
            if std::ptr::eq(Rc::as_ptr(&core), goal) {
                return true;
            }
            if !seen.insert(Rc::as_ptr(&core) as usize) {
                continue;
            }
            let targets = core.state.borrow().forward_targets();
            stack.extend(targets);
        }
        false
    }

    /// Destroy token `key` and cascade into its binding.
    fn destroy_token(&self, key: NodeKey) -> bool {
        let record = self.state.borrow_mut().detach_token(key);
        let Some(record) = record else {
            return false;
        };
        if let Some(owner) = record.binding.owner.upgrade() {
            owner.release_binding(record.binding.key);
        }
        true
    }

    /// Remove up to `count` tokens matching `target`, scanning from
    /// `start_pos` towards the end it counts from. Negative `count` = all.
    fn disconnect_matching(&self, target: &Target<A>, start_pos: isize, count: isize) -> usize {
        if count == 0 {
            return 0;
        }
        let forward = start_pos >= 0;
        let mut remaining = count;
        let mut removed = 0;
        let mut it = self.state.borrow().seek(start_pos);
        while let Some(key) = it {
            let hit = {
                let state = self.state.borrow();
                it = state.step(key, forward);
                state
                    .tokens
                    .get(key)
                    .is_some_and(|record| record.matches(target))
            };
            if hit && self.destroy_token(key) {
                removed += 1;
                if remaining > 0 {
                    remaining -= 1;
                    if remaining == 0 {
                        break;
                    }
                }
            }
        }
        #[cfg(feature = "tracing")]
        trace!(start_pos, count, removed, "signal disconnected");
        removed
    }

    fn disconnect_all(&self) -> usize {
        let mut removed = 0;
        loop {
            let first = self.state.borrow().first;
            match first {
                Some(key) if self.destroy_token(key) => removed += 1,
                _ => break,
            }
        }
        removed
    }

    fn count_matching(&self, target: &Target<A>) -> usize {
        let state = self.state.borrow();
        state
            .tokens
            .iter_from(state.first)
            .filter(|key| {
                state
                    .tokens
                    .get(*key)
                    .is_some_and(|record| record.matches(target))
            })
            .count()
    }

    fn any_matching(&self, target: &Target<A>) -> bool {
        let state = self.state.borrow();
        state.tokens.iter_from(state.first).any(|key| {
            state
                .tokens
                .get(key)
                .is_some_and(|record| record.matches(target))
        })
    }

    fn count_connections(&self) -> usize {
        self.state.borrow().tokens.len()
    }

    fn emit(this: &Rc<Self>, args: &A) -> Result<()> {
        if let Some(limit) = this.config.max_emit_depth {
            if this.depth.get() >= limit {
                return Err(SignalError::DepthExceeded { limit });
            }
        }
        let _depth = DepthGuard::enter(&this.depth);
        let mark = this.state.borrow_mut().open_cursor();
        let slot = Slot::open(this, mark);
        #[cfg(feature = "tracing")]
        trace!(depth = this.depth.get(), "signal emit");

        loop {
            let step = this.state.borrow_mut().begin_step(mark);
            let Some(invocation) = step else {
                break;
            };
            match invocation {
                Invocation::Call(callback) => (*callback)(args, &slot),
                Invocation::Forward(target) => {
                    let _outcome = Self::emit(&target, args);
                    #[cfg(feature = "tracing")]
                    if let Err(err) = &_outcome {
                        warn!(%err, "forwarded emission skipped");
                    }
                }
                Invocation::Skip => {}
            }
            this.state.borrow_mut().finish_step(mark);
        }

        drop(slot);
        Ok(())
    }
}

impl<A: 'static> TokenHost for SignalCore<A> {
    fn release_token(&self, key: NodeKey) {
        let record = self.state.borrow_mut().detach_token(key);
        drop(record);
    }

    fn token_method(&self, key: NodeKey) -> Option<MethodId> {
        self.state
            .borrow()
            .tokens
            .get(key)
            .and_then(|record| record.callable.method())
    }
}

impl<A: 'static> SlotHost for SignalCore<A> {
    fn close_cursor(&self, mark: NodeKey) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.close_cursor(mark);
        }
    }

    fn current_binding(&self, mark: NodeKey) -> Option<TrackableId> {
        let state = self.state.borrow();
        let token = state.invoked_token(mark)?;
        state.tokens.get(token).map(|record| record.binding.owner_id)
    }

    fn current_receiver(&self, mark: NodeKey) -> Option<Rc<dyn Any>> {
        let state = self.state.borrow();
        let token = state.invoked_token(mark)?;
        state
            .tokens
            .get(token)
            .and_then(|record| record.callable.receiver())
    }

    fn unbind_current(&self, mark: NodeKey, owner: TrackableId) -> bool {
        let token = {
            let state = self.state.borrow();
            state.invoked_token(mark).filter(|key| {
                state
                    .tokens
                    .get(*key)
                    .is_some_and(|record| record.binding.owner_id == owner)
            })
        };
        token.is_some_and(|key| self.destroy_token(key))
    }
}

impl<A> Drop for SignalCore<A> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        while let Some(key) = state.first {
            let Some(record) = state.detach_token(key) else {
                break;
            };
            if let Some(owner) = record.binding.owner.upgrade() {
                owner.release_binding(record.binding.key);
            }
        }
    }
}

/// A multicast emitter for payload type `A`.
///
/// Use a tuple for events with several parameters. Dropping the signal
/// disconnects everything it emits to and everything forwarding into it.
///
/// ```ignore
/// let clicked: Signal<(i32, i32)> = Signal::new();
/// clicked.connect(&button_observer, Handler::on_click);
/// clicked.emit(&(10, 20));
/// ```
pub struct Signal<A: 'static> {
    core: Rc<SignalCore<A>>,
}

impl<A: 'static> Signal<A> {
    /// Create a signal with the default config.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SignalConfig::default())
    }

    /// Create a signal with an explicit dispatch policy.
    #[must_use]
    pub fn with_config(config: SignalConfig) -> Self {
        Self {
            core: SignalCore::new(config),
        }
    }

    /// The dispatch policy of this signal.
    #[must_use]
    pub fn config(&self) -> SignalConfig {
        self.core.config
    }

    pub(crate) fn core(&self) -> &Rc<SignalCore<A>> {
        &self.core
    }

    /// A restricted handle that can connect and query but not emit.
    #[must_use]
    pub fn signal_ref(&self) -> SignalRef<A> {
        SignalRef::from_core(&self.core)
    }

    /// Connect `method` on `receiver`, appended at the back.
    pub fn connect<T: Observer, M: SlotMethod<T, A>>(&self, receiver: &Rc<T>, method: M) {
        self.connect_at(receiver, method, -1);
    }

    /// Connect `method` on `receiver` at signed position `index`.
    pub fn connect_at<T: Observer, M: SlotMethod<T, A>>(&self, receiver: &Rc<T>, method: M, index: isize) {
        SignalCore::connect_method(&self.core, receiver, method, index);
    }

    /// Forward every emission of this signal to `other`, appended at the back.
    pub fn connect_signal(&self, other: &Signal<A>) -> Result<()> {
        self.connect_signal_at(other, -1)
    }

    /// Forward every emission of this signal to `other` at position `index`.
    pub fn connect_signal_at(&self, other: &Signal<A>, index: isize) -> Result<()> {
        SignalCore::connect_forward(&self.core, &other.core, index)
    }

    /// Remove up to `count` connections to `method` on `receiver`.
    ///
    /// Non-negative `start_pos` scans forward from that position, negative
    /// scans backward from that position counted from the back. A negative
    /// `count` removes every match; a `count` of zero removes nothing.
    /// Returns the number removed.
    pub fn disconnect<T: Observer, M: SlotMethod<T, A>>(
        &self,
        receiver: &Rc<T>,
        method: M,
        start_pos: isize,
        count: isize,
    ) -> usize {
        self.core
            .disconnect_matching(&method_target::<T, A, M>(receiver, method), start_pos, count)
    }

    /// Remove up to `count` forwarding connections to `other`.
    pub fn disconnect_signal(&self, other: &Signal<A>, start_pos: isize, count: isize) -> usize {
        self.core
            .disconnect_matching(&forward_target(other), start_pos, count)
    }

    /// Remove up to `count` connections of any kind, scanning as
    /// [`disconnect`](Self::disconnect) does.
    pub fn disconnect_range(&self, start_pos: isize, count: isize) -> usize {
        self.core.disconnect_matching(&Target::Any, start_pos, count)
    }

    /// Remove every connection to `method` on `receiver`.
    pub fn disconnect_all_to<T: Observer, M: SlotMethod<T, A>>(&self, receiver: &Rc<T>, method: M) -> usize {
        self.disconnect(receiver, method, -1, -1)
    }

    /// Remove every forwarding connection to `other`.
    pub fn disconnect_all_signal(&self, other: &Signal<A>) -> usize {
        self.disconnect_signal(other, -1, -1)
    }

    /// Remove every connection.
    pub fn disconnect_all(&self) -> usize {
        self.core.disconnect_all()
    }

    /// Whether `method` on `receiver` is connected.
    #[must_use]
    pub fn is_connected_to<T: Observer, M: SlotMethod<T, A>>(&self, receiver: &Rc<T>, method: M) -> bool {
        self.core.any_matching(&method_target::<T, A, M>(receiver, method))
    }

    /// Whether this signal forwards to `other`.
    #[must_use]
    pub fn is_connected_to_signal(&self, other: &Signal<A>) -> bool {
        self.core.any_matching(&forward_target(other))
    }

    /// Whether any connection ends at `trackable`.
    #[must_use]
    pub fn is_connected_to_trackable(&self, trackable: &Trackable) -> bool {
        let owner = trackable.id();
        let state = self.core.state.borrow();
        state.tokens.iter_from(state.first).any(|key| {
            state
                .tokens
                .get(key)
                .is_some_and(|record| record.binding.owner_id == owner)
        })
    }

    /// Number of connections.
    #[must_use]
    pub fn count_connections(&self) -> usize {
        self.core.count_connections()
    }

    /// Number of connections to `method` on `receiver`.
    #[must_use]
    pub fn count_connections_to<T: Observer, M: SlotMethod<T, A>>(&self, receiver: &Rc<T>, method: M) -> usize {
        self.core.count_matching(&method_target::<T, A, M>(receiver, method))
    }

    /// Number of forwarding connections to `other`.
    #[must_use]
    pub fn count_connections_to_signal(&self, other: &Signal<A>) -> usize {
        self.core.count_matching(&forward_target(other))
    }

    /// Number of signals forwarding into this one.
    #[must_use]
    pub fn count_bindings(&self) -> usize {
        self.core.trackable.count_bindings()
    }

    /// Invoke every connection in order.
    ///
    /// An emission past the configured depth limit is dropped.
    pub fn emit(&self, args: &A) {
        let _outcome = SignalCore::emit(&self.core, args);
        #[cfg(feature = "tracing")]
        if let Err(err) = &_outcome {
            warn!(%err, "emission skipped");
        }
    }

    /// Invoke every connection in order, reporting a depth-limit hit.
    pub fn try_emit(&self, args: &A) -> Result<()> {
        SignalCore::emit(&self.core, args)
    }

    /// Number of emissions of this signal currently in progress.
    #[must_use]
    pub fn emit_depth(&self) -> u32 {
        self.core.depth.get()
    }
}

impl<A: 'static> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> Drop for Signal<A> {
    fn drop(&mut self) {
        self.core.disconnect_all();
        self.core.trackable.unbind_all();
    }
}

impl<A: 'static> Observer for Signal<A> {
    fn trackable(&self) -> &Trackable {
        &self.core.trackable
    }
}

impl<A: 'static> std::fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.count_connections())
            .field("bindings", &self.count_bindings())
            .field("depth", &self.emit_depth())
            .finish()
    }
}

fn method_target<T: Observer, A, M: SlotMethod<T, A>>(receiver: &Rc<T>, method: M) -> Target<A> {
    Target::Method {
        owner: receiver.trackable().id(),
        method: MethodId::of::<T, A, M>(method),
    }
}

fn forward_target<A: 'static>(other: &Signal<A>) -> Target<A> {
    Target::Forward(Rc::as_ptr(&other.core))
}

/// Non-owning, emit-less view of a [`Signal`].
///
/// Producers hand this out so other code can connect and query without
/// being able to fire the event. Operations on a dropped signal connect
/// nothing ([`SignalError::Detached`]) and count zero.
pub struct SignalRef<A: 'static> {
    core: Weak<SignalCore<A>>,
}

impl<A: 'static> Clone for SignalRef<A> {
    fn clone(&self) -> Self {
        Self {
            core: Weak::clone(&self.core),
        }
    }
}

impl<A: 'static> SignalRef<A> {
    pub(crate) fn from_core(core: &Rc<SignalCore<A>>) -> Self {
        Self {
            core: Rc::downgrade(core),
        }
    }

    fn upgrade(&self) -> Result<Rc<SignalCore<A>>> {
        self.core.upgrade().ok_or(SignalError::Detached)
    }

    /// Whether the underlying signal still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.core.strong_count() > 0
    }

    /// Whether both handles view the same signal.
    #[must_use]
    pub fn ptr_eq(&self, other: &SignalRef<A>) -> bool {
        Weak::ptr_eq(&self.core, &other.core)
    }

    /// Whether this handle views `signal`.
    #[must_use]
    pub fn refers_to(&self, signal: &Signal<A>) -> bool {
        std::ptr::eq(self.core.as_ptr(), Rc::as_ptr(&signal.core))
    }

    /// See [`Signal::connect`].
    pub fn connect<T: Observer, M: SlotMethod<T, A>>(&self, receiver: &Rc<T>, method: M) -> Result<()> {
        self.connect_at(receiver, method, -1)
    }

    /// See [`Signal::connect_at`].
    pub fn connect_at<T: Observer, M: SlotMethod<T, A>>(
        &self,
        receiver: &Rc<T>,
        method: M,
        index: isize,
    ) -> Result<()> {
        let core = self.upgrade()?;
        SignalCore::connect_method(&core, receiver, method, index);
        Ok(())
    }

    /// See [`Signal::connect_signal`].
    pub fn connect_signal(&self, other: &Signal<A>) -> Result<()> {
        self.connect_signal_at(other, -1)
    }

    /// See [`Signal::connect_signal_at`].
    pub fn connect_signal_at(&self, other: &Signal<A>, index: isize) -> Result<()> {
        let core = self.upgrade()?;
        SignalCore::connect_forward(&core, &other.core, index)
    }

    /// See [`Signal::disconnect`].
    pub fn disconnect<T: Observer, M: SlotMethod<T, A>>(
        &self,
        receiver: &Rc<T>,
        method: M,
        start_pos: isize,
        count: isize,
    ) -> usize {
        self.upgrade().map_or(0, |core| {
            core.disconnect_matching(&method_target::<T, A, M>(receiver, method), start_pos, count)
        })
    }

    /// See [`Signal::disconnect_signal`].
    pub fn disconnect_signal(&self, other: &Signal<A>, start_pos: isize, count: isize) -> usize {
        self.upgrade().map_or(0, |core| {
            core.disconnect_matching(&forward_target(other), start_pos, count)
        })
    }

    /// See [`Signal::disconnect_range`].
    pub fn disconnect_range(&self, start_pos: isize, count: isize) -> usize {
        self.upgrade()
            .map_or(0, |core| core.disconnect_matching(&Target::Any, start_pos, count))
    }

    /// See [`Signal::disconnect_all_to`].
    pub fn disconnect_all_to<T: Observer, M: SlotMethod<T, A>>(&self, receiver: &Rc<T>, method: M) -> usize {
        self.disconnect(receiver, method, -1, -1)
    }

    /// See [`Signal::disconnect_all_signal`].
    pub fn disconnect_all_signal(&self, other: &Signal<A>) -> usize {
        self.disconnect_signal(other, -1, -1)
    }

    /// See [`Signal::disconnect_all`].
    pub fn disconnect_all(&self) -> usize {
        self.upgrade().map_or(0, |core| core.disconnect_all())
    }

    /// See [`Signal::is_connected_to`].
    #[must_use]
    pub fn is_connected_to<T: Observer, M: SlotMethod<T, A>>(&self, receiver: &Rc<T>, method: M) -> bool {
        self.upgrade()
            .is_ok_and(|core| core.any_matching(&method_target::<T, A, M>(receiver, method)))
    }

    /// See [`Signal::is_connected_to_signal`].
    #[must_use]
    pub fn is_connected_to_signal(&self, other: &Signal<A>) -> bool {
        self.upgrade()
            .is_ok_and(|core| core.any_matching(&forward_target(other)))
    }

    /// See [`Signal::is_connected_to_trackable`].
    #[must_use]
    pub fn is_connected_to_trackable(&self, trackable: &Trackable) -> bool {
        let owner = trackable.id();
        self.upgrade().is_ok_and(|core| {
            let state = core.state.borrow();
            state.tokens.iter_from(state.first).any(|key| {
                state
                    .tokens
                    .get(key)
                    .is_some_and(|record| record.binding.owner_id == owner)
            })
        })
    }

    /// See [`Signal::count_connections`].
    #[must_use]
    pub fn count_connections(&self) -> usize {
        self.upgrade().map_or(0, |core| core.count_connections())
    }

    /// See [`Signal::count_connections_to`].
    #[must_use]
    pub fn count_connections_to<T: Observer, M: SlotMethod<T, A>>(&self, receiver: &Rc<T>, method: M) -> usize {
        self.upgrade()
            .map_or(0, |core| core.count_matching(&method_target::<T, A, M>(receiver, method)))
    }

    /// See [`Signal::count_connections_to_signal`].
    #[must_use]
    pub fn count_connections_to_signal(&self, other: &Signal<A>) -> usize {
        self.upgrade()
            .map_or(0, |core| core.count_matching(&forward_target(other)))
    }

    /// See [`Signal::count_bindings`].
    #[must_use]
    pub fn count_bindings(&self) -> usize {
        self.upgrade()
            .map_or(0, |core| core.trackable.count_bindings())
    }
}

impl<A: 'static> std::fmt::Debug for SignalRef<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
