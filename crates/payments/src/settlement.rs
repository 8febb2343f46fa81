//! The detailed outcome of settling an order.

use domain::{Amount, Payment};
use serde::Serialize;

/// How a `settle` call ended.
///
/// `Paid` and `Rejected` are validated outcomes whose payments were
/// persisted. `Contingency` means the outcome could not be decided and the
/// payments were handed to the contingency sink instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Settlement {
    /// Approved charges cover the order total exactly.
    Paid { payments: Vec<Payment> },

    /// Approved charges did not match the total; they were reversed.
    Rejected {
        payments: Vec<Payment>,
        /// Order total minus approved charges (negative on overpayment).
        remainder: Amount,
        /// Approved charges whose reversal failed.
        failed_reversals: usize,
    },

    /// The call was abandoned before a validated outcome was reached.
    Contingency { payments: Vec<Payment>, reason: String },
}

impl Settlement {
    /// Returns true only when the order is fully and exactly paid.
    pub fn is_paid(&self) -> bool {
        matches!(self, Settlement::Paid { .. })
    }

    /// Returns the payments of this outcome in attempt order.
    pub fn payments(&self) -> &[Payment] {
        match self {
            Settlement::Paid { payments }
            | Settlement::Rejected { payments, .. }
            | Settlement::Contingency { payments, .. } => payments,
        }
    }

    /// Returns the outcome name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Settlement::Paid { .. } => "paid",
            Settlement::Rejected { .. } => "rejected",
            Settlement::Contingency { .. } => "contingency",
        }
    }
}
