//! Data model for the order payment orchestrator.
//!
//! This crate provides:
//! - `Order` with its line items and payment instructions
//! - `PaymentDetail` / `PaymentMethod` describing one instrument charge request
//! - `Charge` (a processor's raw outcome) and `Payment` (a charge bound to its order)
//! - `Amount`, the floating-point monetary value used throughout

pub mod amount;
pub mod error;
pub mod order;
pub mod payment;

pub use amount::Amount;
pub use common::{CustomerId, OrderId, PaymentId, RestaurantId};
pub use error::OrderError;
pub use order::{Customer, Order, OrderDetail, Restaurant};
pub use payment::{Charge, Payment, PaymentDetail, PaymentMethod, PaymentStatus};
