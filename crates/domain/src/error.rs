//! Domain error types.

use thiserror::Error;

/// Errors raised while building an order.
#[derive(Debug, Error, PartialEq)]
pub enum OrderError {
    /// A line item or payment instruction carries a negative amount.
    #[error("Negative amount in {field} #{index}: {amount}")]
    NegativeAmount {
        field: &'static str,
        index: usize,
        amount: f32,
    },

    /// A line item or payment instruction carries NaN or infinity.
    #[error("Non-finite amount in {field} #{index}")]
    NonFiniteAmount { field: &'static str, index: usize },

    /// A line item has a zero quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },
}
