use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use domain::{Amount, Charge, Payment, PaymentDetail};

use super::PaymentProcessor;
use crate::error::{PaymentError, Result};
use crate::instrument::InstrumentKind;

/// Outcome the in-memory gateway returns for the next charge.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedOutcome {
    /// Approve the full requested amount.
    Approve,

    /// Approve, moving a different amount than requested.
    ApproveAmount(Amount),

    /// Decline; nothing moves.
    Decline,

    /// The gateway call fails without a definitive answer.
    GatewayFailure(String),
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    script: VecDeque<ScriptedOutcome>,
    executions: Vec<PaymentDetail>,
    captured: HashMap<String, Amount>,
    reversed: HashSet<String>,
    reversal_calls: usize,
    next_id: u32,
    fail_on_reverse: bool,
}

/// In-memory processor for testing and demos.
///
/// Approves everything unless told otherwise through [`script`](Self::script).
/// Cloned handles share state, so a test can keep one clone while the
/// registry owns another.
#[derive(Debug, Clone)]
pub struct InMemoryProcessor {
    kind: InstrumentKind,
    state: Arc<Mutex<InMemoryGatewayState>>,
}

impl InMemoryProcessor {
    /// Creates a new in-memory processor for the given instrument kind.
    pub fn new(kind: InstrumentKind) -> Self {
        Self {
            kind,
            state: Arc::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, InMemoryGatewayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues the outcome for the next charge; queued outcomes are consumed in order.
    pub fn script(&self, outcome: ScriptedOutcome) {
        self.state().script.push_back(outcome);
    }

    /// Configures the service to fail every reversal.
    pub fn set_fail_on_reverse(&self, fail: bool) {
        self.state().fail_on_reverse = fail;
    }

    /// Returns the number of charge attempts received.
    pub fn execution_count(&self) -> usize {
        self.state().executions.len()
    }

    /// Returns the number of reversal calls received, including no-ops.
    pub fn reversal_calls(&self) -> usize {
        self.state().reversal_calls
    }

    /// Returns the number of charges actually reversed.
    pub fn reversed_count(&self) -> usize {
        self.state().reversed.len()
    }

    /// Returns the amount currently held by approved, unreversed charges.
    pub fn captured_total(&self) -> Amount {
        self.state().captured.values().copied().sum()
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryProcessor {
    fn kind(&self) -> InstrumentKind {
        self.kind
    }

    async fn execute_payment(&self, detail: &PaymentDetail) -> Result<Charge> {
        let mut state = self.state();
        state.executions.push(detail.clone());

        let method = detail.payment_method.clone();
        let moved = match state.script.pop_front().unwrap_or(ScriptedOutcome::Approve) {
            ScriptedOutcome::Approve => detail.amount,
            ScriptedOutcome::ApproveAmount(amount) => amount,
            ScriptedOutcome::Decline => return Ok(Charge::declined(method)),
            ScriptedOutcome::GatewayFailure(reason) => {
                return Err(PaymentError::Gateway {
                    instrument: self.kind.to_string(),
                    reason,
                });
            }
        };

        state.next_id += 1;
        let reference = format!("{}-{:04}", self.kind, state.next_id);
        state.captured.insert(reference.clone(), moved);

        Ok(Charge::approved(method, moved).with_reference(reference))
    }

    async fn reverse_payment(&self, payment: &Payment) -> Result<()> {
        let mut state = self.state();
        state.reversal_calls += 1;

        if state.fail_on_reverse {
            return Err(PaymentError::Reversal {
                instrument: self.kind.to_string(),
                reason: "gateway refused reversal".to_string(),
            });
        }

        if !payment.is_approved() {
            return Ok(());
        }

        let Some(reference) = payment.gateway_reference() else {
            return Ok(());
        };

        if state.captured.remove(reference).is_some() {
            state.reversed.insert(reference.to_string());
        }

        Ok(())
    }
}
