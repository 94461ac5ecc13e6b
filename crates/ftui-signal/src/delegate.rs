#![forbid(unsafe_code)]

//! Type-erased callables stored in tokens.
//!
//! A token invokes either a bound slot method (receiver + method) or
//! another signal of the same payload type. Both are reduced to
//! [`Callable<A>`], which knows how to hand out an owned [`Invocation`] so
//! the emitter can release its own borrows before running user code.

use std::any::{Any, TypeId};
use std::rc::{Rc, Weak};

use crate::signal::SignalCore;
use crate::slot::Slot;
use crate::trackable::Observer;

/// A slot method on receiver type `T` for payload `A`.
///
/// Implemented by every named function or method with the shape
/// `fn(&T, &A, &Slot)`, so `Label::on_text` can be passed directly. The
/// trailing [`Slot`] is the emission cursor; pass it to
/// [`Trackable::unbind`](crate::Trackable::unbind) to disconnect the running
/// connection from inside the callback.
pub trait SlotMethod<T, A>: Fn(&T, &A, &Slot) + Copy + 'static {}

impl<T, A, F> SlotMethod<T, A> for F where F: Fn(&T, &A, &Slot) + Copy + 'static {}

/// Stable identity of a slot method, used for disconnect-by-method.
///
/// Every fn item has its own zero-sized type, so the identity is that type
/// rather than the code address, which the optimizer may share between
/// functions with identical bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(TypeId);

impl MethodId {
    /// Identity of `method`.
    ///
    /// `method` must name a function (`Type::method`); fn pointers and
    /// capturing closures are rejected at compile time because their type
    /// does not identify a single function.
    #[must_use]
    pub fn of<T, A, M: SlotMethod<T, A>>(_method: M) -> Self {
        const {
            assert!(
                std::mem::size_of::<M>() == 0,
                "slot methods must be passed as named functions, not fn pointers"
            );
        }
        Self(TypeId::of::<M>())
    }
}

/// A bound slot method.
pub(crate) struct Delegate<A> {
    receiver: Weak<dyn Any>,
    method: MethodId,
    invoke: Rc<dyn Fn(&A, &Slot)>,
}

impl<A: 'static> Delegate<A> {
    pub(crate) fn bind<T: Observer, M: SlotMethod<T, A>>(receiver: &Rc<T>, method: M) -> Self {
        let target = Rc::downgrade(receiver);
        let invoke: Rc<dyn Fn(&A, &Slot)> = Rc::new(move |args: &A, slot: &Slot| {
            if let Some(obj) = target.upgrade() {
                method(&*obj, args, slot);
            }
        });
        let receiver = Rc::downgrade(receiver) as Weak<dyn Any>;
        Self {
            receiver,
            method: MethodId::of::<T, A, M>(method),
            invoke,
        }
    }
}

/// What a token does when the cursor reaches it.
pub(crate) enum Callable<A> {
    Delegate(Delegate<A>),
    Forward(Weak<SignalCore<A>>),
}

/// Owned, borrow-free form of a [`Callable`] ready to run.
pub(crate) enum Invocation<A> {
    Call(Rc<dyn Fn(&A, &Slot)>),
    Forward(Rc<SignalCore<A>>),
    /// Receiver or target already gone; nothing to run.
    Skip,
}

impl<A> Callable<A> {
    pub(crate) fn invocation(&self) -> Invocation<A> {
        match self {
            Self::Delegate(d) => Invocation::Call(Rc::clone(&d.invoke)),
            Self::Forward(target) => target.upgrade().map_or(Invocation::Skip, Invocation::Forward),
        }
    }

    pub(crate) fn method(&self) -> Option<MethodId> {
        match self {
            Self::Delegate(d) => Some(d.method),
            Self::Forward(_) => None,
        }
    }

    pub(crate) fn receiver(&self) -> Option<Rc<dyn Any>> {
        match self {
            Self::Delegate(d) => d.receiver.upgrade(),
            Self::Forward(_) => None,
        }
    }

    pub(crate) fn forward_target(&self) -> Option<Rc<SignalCore<A>>> {
        match self {
            Self::Delegate(_) => None,
            Self::Forward(target) => target.upgrade(),
        }
    }

    pub(crate) fn forwards_to(&self, core: *const SignalCore<A>) -> bool {
        matches!(self, Self::Forward(target) if std::ptr::eq(target.as_ptr(), core))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trackable::Trackable;
    use std::cell::Cell;

    struct Widget {
        trackable: Trackable,
        hits: Cell<u32>,
    }

    impl Widget {
        fn on_resize(&self, _: &i32, _: &Slot) {
            self.hits.set(self.hits.get() + 1);
        }

        fn on_move(&self, _: &i32, _: &Slot) {
            self.hits.set(self.hits.get() + 1);
        }
    }

    impl Observer for Widget {
        fn trackable(&self) -> &Trackable {
            &self.trackable
        }
    }

    #[test]
    fn identical_bodies_have_distinct_ids() {
        let resize = MethodId::of::<Widget, i32, _>(Widget::on_resize);
        let moved = MethodId::of::<Widget, i32, _>(Widget::on_move);
        assert_ne!(resize, moved);
        assert_eq!(resize, MethodId::of::<Widget, i32, _>(Widget::on_resize));
    }

    #[test]
    fn bound_delegate_calls_live_receiver_only() {
        let widget = Rc::new(Widget {
            trackable: Trackable::new(),
            hits: Cell::new(0),
        });
        let delegate = Delegate::<i32>::bind(&widget, Widget::on_resize);
        let callable = Callable::Delegate(delegate);
        assert_eq!(
            callable.method(),
            Some(MethodId::of::<Widget, i32, _>(Widget::on_resize))
        );
        assert!(callable.receiver().is_some());
        assert!(callable.forward_target().is_none());

        drop(widget);
        assert!(callable.receiver().is_none());
    }
}
