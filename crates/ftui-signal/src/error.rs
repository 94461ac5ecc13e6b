#![forbid(unsafe_code)]

//! Error type for the dispatch core.
//!
//! Most operations never fail: disconnecting something that is not connected
//! returns a zero count and queries on unconnected pairs return `false`. The
//! variants here cover the remaining precondition violations that would
//! otherwise be latent bugs.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SignalError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// The signal behind a [`SignalRef`](crate::SignalRef) has been dropped.
    #[error("signal has been dropped")]
    Detached,

    /// Forwarding into the target would let a signal re-emit itself.
    #[error("forwarding connection would create a cycle")]
    ForwardCycle,

    /// Emission re-entered the same signal deeper than the configured limit.
    #[error("emission depth limit reached ({limit})")]
    DepthExceeded { limit: u32 },
}
