//! Orchestrator configuration loaded from environment variables.

use std::str::FromStr;

/// How instrument charges and reversals within one order are dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// One instrument at a time, stopping at the first unrecoverable error.
    #[default]
    Sequential,

    /// All instruments at once; every attempt is awaited before deciding.
    Concurrent,
}

impl FromStr for DispatchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(DispatchMode::Sequential),
            "concurrent" => Ok(DispatchMode::Concurrent),
            other => Err(format!("unknown dispatch mode: {other}")),
        }
    }
}

/// What to do with approved charges whose reversal failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReversalFailurePolicy {
    /// Hand unreversed charges to the contingency sink.
    #[default]
    Escalate,

    /// Log and count the failure only.
    Absorb,
}

impl FromStr for ReversalFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "escalate" => Ok(ReversalFailurePolicy::Escalate),
            "absorb" => Ok(ReversalFailurePolicy::Absorb),
            other => Err(format!("unknown reversal failure policy: {other}")),
        }
    }
}

/// Orchestrator configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `PAYMENTS_DISPATCH` — `sequential` or `concurrent` (default: `sequential`)
/// - `PAYMENTS_REVERSAL_FAILURE` — `escalate` or `absorb` (default: `escalate`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub dispatch: DispatchMode,
    pub reversal_failure: ReversalFailurePolicy,
    pub log_level: String,
}

impl OrchestratorConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Unparsable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            dispatch: lookup("PAYMENTS_DISPATCH")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            reversal_failure: lookup("PAYMENTS_REVERSAL_FAILURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            log_level: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Returns a copy using the given dispatch mode.
    pub fn with_dispatch(mut self, dispatch: DispatchMode) -> Self {
        self.dispatch = dispatch;
        self
    }

    /// Returns a copy using the given reversal failure policy.
    pub fn with_reversal_failure(mut self, policy: ReversalFailurePolicy) -> Self {
        self.reversal_failure = policy;
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            dispatch: DispatchMode::default(),
            reversal_failure: ReversalFailurePolicy::default(),
            log_level: "info".to_string(),
        }
    }
}
