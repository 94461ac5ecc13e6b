#![forbid(unsafe_code)]

//! Signal/slot event dispatch for single-threaded object graphs.
//!
//! # Role in FrankenTUI
//! `ftui-signal` lets widgets and models announce events without knowing who
//! listens. An emitter owns a [`Signal<A>`]; any object embedding a
//! [`Trackable`] can connect one of its methods to it. Connections are
//! severed automatically when either side is dropped.
//!
//! # Primary responsibilities
//! - **Signal**: ordered multicast with positional connect/disconnect.
//! - **Trackable**: receiver-side bookkeeping, self-unbind via [`Slot`].
//! - **Forwarding**: one signal re-emits into another of the same payload.
//! - **Mutation-safe emit**: callbacks may connect, disconnect, drop
//!   receivers, or re-emit, and the walk stays well defined.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use ftui_signal::{Observer, Signal, Slot, Trackable};
//!
//! struct Counter {
//!     trackable: Trackable,
//!     total: Cell<i32>,
//! }
//!
//! impl Counter {
//!     fn on_add(&self, n: &i32, _: &Slot) {
//!         self.total.set(self.total.get() + n);
//!     }
//! }
//!
//! impl Observer for Counter {
//!     fn trackable(&self) -> &Trackable {
//!         &self.trackable
//!     }
//! }
//!
//! let added = Signal::<i32>::new();
//! let counter = Rc::new(Counter { trackable: Trackable::new(), total: Cell::new(0) });
//! added.connect(&counter, Counter::on_add);
//! added.emit(&5);
//! assert_eq!(counter.total.get(), 5);
//!
//! drop(counter);
//! assert_eq!(added.count_connections(), 0);
//! ```
//!
//! Everything here is `!Send`; use one dispatch graph per thread.

pub mod config;
pub mod delegate;
pub mod error;
pub mod link;
pub mod signal;
pub mod slot;
pub mod trackable;

pub use config::SignalConfig;
pub use delegate::{MethodId, SlotMethod};
pub use error::{Result, SignalError};
pub use signal::{Signal, SignalRef};
pub use slot::Slot;
pub use trackable::{Observer, Trackable, TrackableId};
