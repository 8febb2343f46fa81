//! Orders, their line items, and the parties involved.

use common::{CustomerId, OrderId, RestaurantId};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::error::OrderError;
use crate::payment::PaymentDetail;

/// The buyer placing an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub first_name: String,
    pub last_name: String,
}

impl Customer {
    /// Creates a customer reference.
    pub fn new(
        id: CustomerId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// The seller fulfilling an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    pub address: String,
}

impl Restaurant {
    /// Creates a restaurant reference.
    pub fn new(id: RestaurantId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
        }
    }
}

/// A line item in an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    /// Item label.
    pub item: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Amount charged for the whole line.
    pub amount: Amount,
}

impl OrderDetail {
    /// Creates a new line item.
    pub fn new(item: impl Into<String>, quantity: u32, amount: impl Into<Amount>) -> Self {
        Self {
            item: item.into(),
            quantity,
            amount: amount.into(),
        }
    }
}

/// An order ready to be paid.
///
/// Orders are immutable once built. The payable total is derived from the
/// line items and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    id: OrderId,
    customer: Customer,
    restaurant: Restaurant,
    order_details: Vec<OrderDetail>,
    payment_details: Vec<PaymentDetail>,
}

impl Order {
    /// Builds an order, validating every line item and payment instruction.
    ///
    /// The sum of payment instructions is not required to match the total;
    /// a mismatch surfaces later as a failed settlement.
    pub fn new(
        id: OrderId,
        customer: Customer,
        restaurant: Restaurant,
        order_details: Vec<OrderDetail>,
        payment_details: Vec<PaymentDetail>,
    ) -> Result<Self, OrderError> {
        for (index, detail) in order_details.iter().enumerate() {
            if detail.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    quantity: detail.quantity,
                });
            }
            check_amount("order detail", index, detail.amount)?;
        }

        for (index, detail) in payment_details.iter().enumerate() {
            check_amount("payment detail", index, detail.amount)?;
        }

        Ok(Self {
            id,
            customer,
            restaurant,
            order_details,
            payment_details,
        })
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the buyer.
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    /// Returns the seller.
    pub fn restaurant(&self) -> &Restaurant {
        &self.restaurant
    }

    /// Returns the line items in order.
    pub fn order_details(&self) -> &[OrderDetail] {
        &self.order_details
    }

    /// Returns the payment instructions in the order they must be attempted.
    pub fn payment_details(&self) -> &[PaymentDetail] {
        &self.payment_details
    }

    /// Returns the payable total: the sum of all line item amounts.
    ///
    /// Lines are summed in `f64` and the result rounded once to `f32`.
    pub fn total_amount(&self) -> Amount {
        let total: f64 = self
            .order_details
            .iter()
            .map(|d| f64::from(d.amount.value()))
            .sum();
        Amount::from(total)
    }
}

fn check_amount(field: &'static str, index: usize, amount: Amount) -> Result<(), OrderError> {
    if !amount.is_finite() {
        return Err(OrderError::NonFiniteAmount { field, index });
    }
    if amount.is_negative() {
        return Err(OrderError::NegativeAmount {
            field,
            index,
            amount: amount.value(),
        });
    }
    Ok(())
}
