//! Contingency sink trait and in-memory implementation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::Payment;
use serde::Serialize;

use crate::error::{PaymentError, Result};

/// A batch of payments whose final state must be reconciled out of band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyBatch {
    pub order_id: OrderId,
    /// Payments obtained before the hand-off, in attempt order.
    pub payments: Vec<Payment>,
    /// Why the batch could not be settled synchronously.
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl ContingencyBatch {
    /// Creates a batch stamped with the current time.
    pub fn new(order_id: OrderId, payments: Vec<Payment>, reason: impl Into<String>) -> Self {
        Self {
            order_id,
            payments,
            reason: reason.into(),
            created_at: Utc::now(),
        }
    }
}

/// Accepts batches for deferred reconciliation.
///
/// Implementations should enqueue and return quickly; this is the escape
/// hatch, not a synchronous payment path.
#[async_trait]
pub trait ContingencySink: Send + Sync {
    async fn create_contingency(&self, batch: ContingencyBatch) -> Result<()>;
}

#[derive(Debug, Default)]
struct InMemoryContingencyState {
    batches: Vec<ContingencyBatch>,
    fail_on_create: bool,
}

/// In-memory contingency sink for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContingencySink {
    state: Arc<Mutex<InMemoryContingencyState>>,
}

impl InMemoryContingencySink {
    /// Creates a new, empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, InMemoryContingencyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Configures the sink to reject every batch.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state().fail_on_create = fail;
    }

    /// Returns the number of accepted batches.
    pub fn batch_count(&self) -> usize {
        self.state().batches.len()
    }

    /// Returns a snapshot of the accepted batches.
    pub fn batches(&self) -> Vec<ContingencyBatch> {
        self.state().batches.clone()
    }
}

#[async_trait]
impl ContingencySink for InMemoryContingencySink {
    async fn create_contingency(&self, batch: ContingencyBatch) -> Result<()> {
        let mut state = self.state();

        if state.fail_on_create {
            return Err(PaymentError::Contingency("queue unavailable".to_string()));
        }

        state.batches.push(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_batches() {
        let sink = InMemoryContingencySink::new();
        let order_id = OrderId::new();

        sink.create_contingency(ContingencyBatch::new(order_id, vec![], "gateway timeout"))
            .await
            .unwrap();

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].order_id, order_id);
        assert_eq!(batches[0].reason, "gateway timeout");
        assert!(batches[0].payments.is_empty());
    }

    #[tokio::test]
    async fn test_fail_on_create() {
        let sink = InMemoryContingencySink::new();
        sink.set_fail_on_create(true);

        let result = sink
            .create_contingency(ContingencyBatch::new(OrderId::new(), vec![], "x"))
            .await;

        assert!(matches!(result, Err(PaymentError::Contingency(_))));
        assert_eq!(sink.batch_count(), 0);
    }
}
