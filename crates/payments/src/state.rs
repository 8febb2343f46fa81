//! Phases of a single `pay` call.

use serde::{Deserialize, Serialize};

/// The phase a `pay` call is in.
///
/// Transitions:
/// ```text
/// Started ──► Charging ──┬──► Validating ──┬──────────────────► Settled ──► Done
///                        │                 └──► Reversing ───► Settled ──► Done
///                        └──► Contingency ──────────────────────────────► Done
/// ```
/// Persistence failures after validation also divert to `Contingency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PayPhase {
    #[default]
    Started,

    /// Instrument charges are being executed.
    Charging,

    /// Approved charges are being compared to the order total.
    Validating,

    /// Approved charges are being compensated after a failed validation.
    Reversing,

    /// A definitive true/false outcome was reached and persisted.
    Settled,

    /// The outcome could not be decided; the batch is handed off.
    Contingency,

    /// The call has returned (terminal state).
    Done,
}

impl PayPhase {
    /// Returns the phase name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PayPhase::Started => "Started",
            PayPhase::Charging => "Charging",
            PayPhase::Validating => "Validating",
            PayPhase::Reversing => "Reversing",
            PayPhase::Settled => "Settled",
            PayPhase::Contingency => "Contingency",
            PayPhase::Done => "Done",
        }
    }
}

impl std::fmt::Display for PayPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
