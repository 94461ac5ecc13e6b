#![forbid(unsafe_code)]

//! Test fixtures for `ftui-signal`.
//!
//! - [`Recorder`]: a receiver whose slot methods append to a shared
//!   [`InvocationLog`] and optionally run a hook, so tests can mutate the
//!   dispatch graph from inside a callback.
//! - [`init_test_logging`]: route `tracing` output to the test writer.

pub mod logging;
pub mod recorder;

pub use logging::init_test_logging;
pub use recorder::{Hook, Invocation, InvocationLog, Recorder};
