//! Payment error types.

use thiserror::Error;

/// Errors raised by payment collaborators.
///
/// Business declines are not errors: a declined charge comes back as a
/// regular payment with a non-approved status.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// No processor handles the instrument type tag.
    #[error("Unsupported instrument: {0}")]
    UnsupportedInstrument(String),

    /// The gateway call could not be completed; money may or may not have moved.
    #[error("Gateway error on {instrument}: {reason}")]
    Gateway { instrument: String, reason: String },

    /// Compensating a previously approved charge failed.
    #[error("Reversal failed on {instrument}: {reason}")]
    Reversal { instrument: String, reason: String },

    /// The payment ledger rejected a record.
    #[error("Ledger error: {0}")]
    Ledger(String),

    /// The contingency sink rejected a batch.
    #[error("Contingency sink error: {0}")]
    Contingency(String),
}

/// Convenience type alias for payment results.
pub type Result<T> = std::result::Result<T, PaymentError>;
