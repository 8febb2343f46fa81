//! Payment instructions, processor outcomes, and payment records.

use chrono::{DateTime, Utc};
use common::{OrderId, PaymentId};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// The instrument to charge: a type tag plus the intended charge amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Instrument type tag, e.g. `"credit_card"`, `"wallet"` or `"cash"`.
    #[serde(rename = "type")]
    pub type_tag: String,

    /// Mirrors the amount of the owning payment detail.
    pub amount: Amount,
}

impl PaymentMethod {
    /// Creates a payment method.
    pub fn new(type_tag: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            type_tag: type_tag.into(),
            amount: amount.into(),
        }
    }

    /// Returns the instrument type tag.
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }
}

/// A request to charge one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentDetail {
    pub amount: Amount,
    pub payment_method: PaymentMethod,
}

impl PaymentDetail {
    /// Creates a payment detail whose method mirrors the charge amount.
    pub fn new(type_tag: impl Into<String>, amount: impl Into<Amount>) -> Self {
        let amount = amount.into();
        Self {
            amount,
            payment_method: PaymentMethod::new(type_tag, amount),
        }
    }
}

/// Status of a payment.
///
/// Statuses are string-keyed: anything other than the well-known values is
/// carried through untouched as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    /// The gateway accepted the charge.
    Approved,

    /// The gateway refused the charge; no money moved.
    Declined,

    /// A previously approved charge was compensated.
    Reversed,

    /// Any other gateway-specific status.
    Other(String),
}

impl PaymentStatus {
    pub const APPROVED: &'static str = "APPROVED";
    pub const DECLINED: &'static str = "DECLINED";
    pub const REVERSED: &'static str = "REVERSED";

    /// Returns the status key.
    pub fn as_str(&self) -> &str {
        match self {
            PaymentStatus::Approved => Self::APPROVED,
            PaymentStatus::Declined => Self::DECLINED,
            PaymentStatus::Reversed => Self::REVERSED,
            PaymentStatus::Other(s) => s,
        }
    }

    /// Returns true only for the literal `"APPROVED"` status.
    pub fn is_approved(&self) -> bool {
        self.as_str() == Self::APPROVED
    }
}

impl From<&str> for PaymentStatus {
    fn from(s: &str) -> Self {
        match s {
            Self::APPROVED => PaymentStatus::Approved,
            Self::DECLINED => PaymentStatus::Declined,
            Self::REVERSED => PaymentStatus::Reversed,
            other => PaymentStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        PaymentStatus::from(s.as_str())
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw outcome of a single processor charge.
///
/// A charge is not yet tied to an order; it becomes a [`Payment`] once every
/// instrument of the order has been attempted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Charge {
    /// Amount actually moved (zero when declined).
    pub transaction_amount: Amount,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    /// Gateway-side reference, when the gateway returns one.
    pub gateway_reference: Option<String>,
    pub processed_at: DateTime<Utc>,
}

impl Charge {
    /// An approved charge that moved `amount`.
    pub fn approved(payment_method: PaymentMethod, amount: impl Into<Amount>) -> Self {
        Self {
            transaction_amount: amount.into(),
            payment_method,
            status: PaymentStatus::Approved,
            gateway_reference: None,
            processed_at: Utc::now(),
        }
    }

    /// A declined charge; nothing moved.
    pub fn declined(payment_method: PaymentMethod) -> Self {
        Self {
            transaction_amount: Amount::zero(),
            payment_method,
            status: PaymentStatus::Declined,
            gateway_reference: None,
            processed_at: Utc::now(),
        }
    }

    /// Attaches the gateway reference.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.gateway_reference = Some(reference.into());
        self
    }
}

/// The result of attempting one payment detail for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    id: Option<PaymentId>,
    order_id: OrderId,
    transaction_amount: Amount,
    payment_method: PaymentMethod,
    status: PaymentStatus,
    gateway_reference: Option<String>,
    processed_at: DateTime<Utc>,
}

impl Payment {
    /// Binds a charge to its order.
    pub fn from_charge(charge: Charge, order_id: OrderId) -> Self {
        Self {
            id: None,
            order_id,
            transaction_amount: charge.transaction_amount,
            payment_method: charge.payment_method,
            status: charge.status,
            gateway_reference: charge.gateway_reference,
            processed_at: charge.processed_at,
        }
    }

    /// Returns a copy carrying the ledger-assigned ID.
    pub fn with_id(&self, id: PaymentId) -> Self {
        Self {
            id: Some(id),
            ..self.clone()
        }
    }

    /// Returns a copy marked as reversed.
    pub fn reversed(&self) -> Self {
        Self {
            status: PaymentStatus::Reversed,
            ..self.clone()
        }
    }

    /// Ledger ID; `None` until persisted.
    pub fn id(&self) -> Option<PaymentId> {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn transaction_amount(&self) -> Amount {
        self.transaction_amount
    }

    pub fn payment_method(&self) -> &PaymentMethod {
        &self.payment_method
    }

    pub fn status(&self) -> &PaymentStatus {
        &self.status
    }

    pub fn gateway_reference(&self) -> Option<&str> {
        self.gateway_reference.as_deref()
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    /// Returns true if the payment counts toward settling the order.
    pub fn is_approved(&self) -> bool {
        self.status.is_approved()
    }
}
