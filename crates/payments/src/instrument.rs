//! The closed set of supported payment instruments.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PaymentError;

/// A kind of payment instrument.
///
/// Type tags on payment methods are parsed into this enum before dispatch,
/// so an unknown tag fails up front with [`PaymentError::UnsupportedInstrument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    CreditCard,
    Wallet,
    Cash,
}

impl InstrumentKind {
    /// All instrument kinds.
    pub const ALL: [InstrumentKind; 3] = [
        InstrumentKind::CreditCard,
        InstrumentKind::Wallet,
        InstrumentKind::Cash,
    ];

    /// Returns the type tag used on payment methods.
    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::CreditCard => "credit_card",
            InstrumentKind::Wallet => "wallet",
            InstrumentKind::Cash => "cash",
        }
    }
}

impl FromStr for InstrumentKind {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstrumentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PaymentError::UnsupportedInstrument(s.to_string()))
    }
}

impl std::fmt::Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
