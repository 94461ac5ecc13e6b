#![forbid(unsafe_code)]

//! Per-signal dispatch policy.
//!
//! The defaults reproduce the classic behaviour: emission may re-enter
//! without bound, and forwarding cycles are refused at connect time.
//!
//! # Environment
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `FTUI_SIGNAL_MAX_EMIT_DEPTH` | positive integer caps concurrent emissions per signal |
//! | `FTUI_SIGNAL_ALLOW_FORWARD_CYCLES` | `1`/`true`/`yes`/`on` accepts cyclic forwarding |

/// Environment variable holding the emission depth limit.
pub const MAX_EMIT_DEPTH_ENV: &str = "FTUI_SIGNAL_MAX_EMIT_DEPTH";

/// Environment variable that disables forwarding-cycle rejection.
pub const ALLOW_FORWARD_CYCLES_ENV: &str = "FTUI_SIGNAL_ALLOW_FORWARD_CYCLES";

/// Dispatch policy attached to a [`Signal`](crate::Signal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalConfig {
    /// Maximum number of simultaneously active emissions of one signal.
    /// `None` means unbounded.
    pub max_emit_depth: Option<u32>,
    /// Refuse forwarding connections that would make a signal reach itself.
    pub reject_forward_cycles: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            max_emit_depth: None,
            reject_forward_cycles: true,
        }
    }
}

impl SignalConfig {
    /// Default policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the emission depth limit (`None` = unbounded).
    #[must_use]
    pub fn with_max_emit_depth(mut self, limit: Option<u32>) -> Self {
        self.max_emit_depth = limit.filter(|n| *n > 0);
        self
    }

    /// Set whether cyclic forwarding connections are refused.
    #[must_use]
    pub fn with_reject_forward_cycles(mut self, reject: bool) -> Self {
        self.reject_forward_cycles = reject;
        self
    }

    /// Build a config from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Build a config using a custom environment lookup.
    ///
    /// Unparseable values fall back to the defaults.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = get_env(MAX_EMIT_DEPTH_ENV) {
            config.max_emit_depth = value.trim().parse::<u32>().ok().filter(|n| *n > 0);
        }
        if let Some(value) = get_env(ALLOW_FORWARD_CYCLES_ENV) {
            config.reject_forward_cycles = !env_flag(&value);
        }
        config
    }
}

#[inline]
fn env_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
