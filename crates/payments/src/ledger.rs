//! Payment ledger trait and in-memory implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use common::PaymentId;
use domain::Payment;

use crate::error::{PaymentError, Result};

/// Persists finalized payment records for audit.
#[async_trait]
pub trait PaymentLedger: Send + Sync {
    /// Stores one payment and returns the identifier assigned to it.
    async fn save(&self, payment: &Payment) -> Result<PaymentId>;
}

#[derive(Debug, Default)]
struct InMemoryLedgerState {
    records: Vec<Payment>,
    fail_on_save: bool,
}

/// In-memory ledger for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentLedger {
    state: Arc<Mutex<InMemoryLedgerState>>,
}

impl InMemoryPaymentLedger {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryLedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the ledger to reject every save.
    pub fn set_fail_on_save(&self, fail: bool) {
        self.state().fail_on_save = fail;
    }

    /// Returns the number of stored records.
    pub fn record_count(&self) -> usize {
        self.state().records.len()
    }

    /// Returns a snapshot of the stored records in insertion order.
    pub fn records(&self) -> Vec<Payment> {
        self.state().records.clone()
    }
}

#[async_trait]
impl PaymentLedger for InMemoryPaymentLedger {
    async fn save(&self, payment: &Payment) -> Result<PaymentId> {
        let mut state = self.state();

        if state.fail_on_save {
            return Err(PaymentError::Ledger("storage unavailable".to_string()));
        }

        let id = PaymentId::new();
        state.records.push(payment.with_id(id));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use domain::{Charge, OrderId, PaymentMethod};

    use super::*;

    fn payment() -> Payment {
        Payment::from_charge(
            Charge::approved(PaymentMethod::new("wallet", 4.0), 4.0),
            OrderId::new(),
        )
    }

    #[tokio::test]
    async fn test_save_assigns_ids() {
        let ledger = InMemoryPaymentLedger::new();

        let id1 = ledger.save(&payment()).await.unwrap();
        let id2 = ledger.save(&payment()).await.unwrap();

        assert_ne!(id1, id2);
        let records = ledger.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id(), Some(id1));
        assert_eq!(records[1].id(), Some(id2));
    }

    #[tokio::test]
    async fn test_fail_on_save() {
        let ledger = InMemoryPaymentLedger::new();
        ledger.set_fail_on_save(true);

        let result = ledger.save(&payment()).await;

        assert!(matches!(result, Err(PaymentError::Ledger(_))));
        assert_eq!(ledger.record_count(), 0);
    }
}
