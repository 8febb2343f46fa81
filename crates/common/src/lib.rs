//! Shared types for the payment orchestrator workspace.

mod types;

pub use types::{CustomerId, OrderId, PaymentId, RestaurantId};
