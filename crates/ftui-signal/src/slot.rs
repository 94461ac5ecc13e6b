#![forbid(unsafe_code)]

//! Emission cursor handed to every slot method.
//!
//! A [`Slot`] exists only for the duration of one `emit` call. The emitter
//! creates it, walks its token list with it, and passes `&Slot` as the last
//! argument of every callback. The borrow ends when the callback returns, so
//! a slot cannot be kept past its emission.
//!
//! The cursor position itself lives in the emitter as a mark anchored on the
//! current token; destroying that token moves the mark forward, which is
//! what keeps emission correct while callbacks disconnect things.

use std::any::Any;
use std::rc::Rc;

use crate::link::NodeKey;
use crate::signal::{Signal, SignalCore, SignalRef};
use crate::trackable::TrackableId;

/// Emitter-side operations a cursor needs.
pub(crate) trait SlotHost {
    fn close_cursor(&self, mark: NodeKey);
    fn current_binding(&self, mark: NodeKey) -> Option<TrackableId>;
    fn current_receiver(&self, mark: NodeKey) -> Option<Rc<dyn Any>>;
    fn unbind_current(&self, mark: NodeKey, owner: TrackableId) -> bool;
}

/// Cursor of an emission in progress.
pub struct Slot {
    host: Rc<dyn SlotHost>,
    emitter: Rc<dyn Any>,
    mark: NodeKey,
}

impl Slot {
    pub(crate) fn open<A: 'static>(core: &Rc<SignalCore<A>>, mark: NodeKey) -> Self {
        let host: Rc<dyn SlotHost> = Rc::clone(core) as Rc<dyn SlotHost>;
        let emitter: Rc<dyn Any> = Rc::clone(core) as Rc<dyn Any>;
        Self {
            host,
            emitter,
            mark,
        }
    }

    /// The signal currently emitting, if its payload type is `A`.
    #[must_use]
    pub fn signal<A: 'static>(&self) -> Option<SignalRef<A>> {
        Rc::clone(&self.emitter)
            .downcast::<SignalCore<A>>()
            .ok()
            .map(|core| SignalRef::from_core(&core))
    }

    /// Whether `signal` is the one driving this cursor.
    #[must_use]
    pub fn emitted_by<A: 'static>(&self, signal: &Signal<A>) -> bool {
        std::ptr::eq(
            Rc::as_ptr(&self.emitter).cast::<()>(),
            Rc::as_ptr(signal.core()).cast::<()>(),
        )
    }

    /// Identity of the object on the receiving end of the current connection.
    ///
    /// For a forwarding connection this is the target signal.
    #[must_use]
    pub fn binding_trackable(&self) -> Option<TrackableId> {
        self.host.current_binding(self.mark)
    }

    /// The receiver currently being invoked, if it is a `T`.
    #[must_use]
    pub fn receiver<T: 'static>(&self) -> Option<Rc<T>> {
        self.host
            .current_receiver(self.mark)
            .and_then(|any| any.downcast::<T>().ok())
    }

    pub(crate) fn unbind_current(&self, owner: TrackableId) -> bool {
        self.host.unbind_current(self.mark, owner)
    }
}

impl Drop for Slot {
    fn drop(&mut self) {
        self.host.close_cursor(self.mark);
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("binding", &self.binding_trackable())
            .finish_non_exhaustive()
    }
}
