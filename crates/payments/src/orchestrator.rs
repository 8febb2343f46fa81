//! Payment orchestrator for multi-instrument orders.

use std::time::Instant;

use common::OrderId;
use domain::{Amount, Charge, Order, Payment, PaymentDetail};
use futures_util::future::join_all;

use crate::config::{DispatchMode, OrchestratorConfig, ReversalFailurePolicy};
use crate::contingency::{ContingencyBatch, ContingencySink};
use crate::error::{PaymentError, Result};
use crate::ledger::PaymentLedger;
use crate::resolver::ProcessorResolver;
use crate::settlement::Settlement;
use crate::state::PayPhase;

/// A call that could not reach a validated outcome.
///
/// Carries every payment obtained before the failure so nothing that may
/// have moved money is dropped.
#[derive(Debug)]
struct Abandoned {
    payments: Vec<Payment>,
    error: PaymentError,
}

/// Turns an order's payment instructions into a single paid/not-paid decision.
///
/// Each instrument is charged through the processor its type tag resolves
/// to. The order is paid only if the approved charges add up to exactly the
/// order total; otherwise approved charges are reversed. Any collaborator
/// error short of a validated outcome diverts the partial batch to the
/// contingency sink.
///
/// The orchestrator holds no per-order state and may serve any number of
/// orders concurrently.
pub struct PaymentOrchestrator<R, L, C>
where
    R: ProcessorResolver,
    L: PaymentLedger,
    C: ContingencySink,
{
    resolver: R,
    ledger: L,
    contingency: C,
    config: OrchestratorConfig,
}

impl<R, L, C> PaymentOrchestrator<R, L, C>
where
    R: ProcessorResolver,
    L: PaymentLedger,
    C: ContingencySink,
{
    /// Creates an orchestrator with the default configuration.
    pub fn new(resolver: R, ledger: L, contingency: C) -> Self {
        Self::with_config(resolver, ledger, contingency, OrchestratorConfig::default())
    }

    /// Creates an orchestrator with an explicit configuration.
    pub fn with_config(
        resolver: R,
        ledger: L,
        contingency: C,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            resolver,
            ledger,
            contingency,
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Pays an order, returning true only if it is fully and exactly paid.
    ///
    /// Declines, partial payments, overpayments and abandoned calls all
    /// return false. Collaborator errors never reach the caller.
    pub async fn pay(&self, order: &Order) -> bool {
        self.settle(order).await.is_paid()
    }

    /// Pays an order and reports how the call ended.
    #[tracing::instrument(skip(self, order), fields(order_id = %order.id()))]
    pub async fn settle(&self, order: &Order) -> Settlement {
        metrics::counter!("payment_orders_total").increment(1);
        let start = Instant::now();
        trace_phase(order.id(), PayPhase::Started);

        let settlement = match self.run(order).await {
            Ok(settlement) => settlement,
            Err(abandoned) => self.abandon(order.id(), abandoned).await,
        };

        let duration = start.elapsed().as_secs_f64();
        metrics::histogram!("payment_settle_duration_seconds").record(duration);
        match &settlement {
            Settlement::Paid { .. } => metrics::counter!("payment_orders_paid").increment(1),
            Settlement::Rejected { .. } => {
                metrics::counter!("payment_orders_rejected").increment(1)
            }
            Settlement::Contingency { .. } => {}
        }
        trace_phase(order.id(), PayPhase::Done);
        tracing::info!(
            outcome = settlement.as_str(),
            payments = settlement.payments().len(),
            duration,
            "order settlement finished"
        );

        settlement
    }

    /// Charges, validates, reverses and persists. Any error is an abandonment.
    async fn run(&self, order: &Order) -> std::result::Result<Settlement, Abandoned> {
        let order_id = order.id();

        trace_phase(order_id, PayPhase::Charging);
        let (charges, failure) = self.charge_all(order.payment_details()).await;

        // Payments exist only once the charging phase is over.
        let payments: Vec<Payment> = charges
            .into_iter()
            .map(|charge| Payment::from_charge(charge, order_id))
            .collect();

        if let Some(error) = failure {
            return Err(Abandoned { payments, error });
        }

        trace_phase(order_id, PayPhase::Validating);
        let total = order.total_amount();
        let remainder = approved_remainder(total, &payments);

        if remainder.is_zero() {
            let payments = self.persist(payments).await?;
            trace_phase(order_id, PayPhase::Settled);
            return Ok(Settlement::Paid { payments });
        }

        tracing::warn!(%total, %remainder, "approved charges do not match order total");
        trace_phase(order_id, PayPhase::Reversing);
        let (finalized, unreversed) = self.reverse_approved(payments).await;
        let failed_reversals = unreversed.len();

        let payments = self.persist(finalized).await?;
        trace_phase(order_id, PayPhase::Settled);

        if failed_reversals > 0
            && self.config.reversal_failure == ReversalFailurePolicy::Escalate
        {
            self.hand_off(
                order_id,
                unreversed,
                format!("{failed_reversals} approved charge(s) could not be reversed"),
            )
            .await;
        }

        Ok(Settlement::Rejected {
            payments,
            remainder,
            failed_reversals,
        })
    }

    /// Executes every payment detail, returning the charges obtained in input
    /// order and the first unrecoverable error, if any.
    async fn charge_all(&self, details: &[PaymentDetail]) -> (Vec<Charge>, Option<PaymentError>) {
        let mut charges = Vec::with_capacity(details.len());

        match self.config.dispatch {
            DispatchMode::Sequential => {
                for detail in details {
                    match self.charge(detail).await {
                        Ok(charge) => charges.push(charge),
                        Err(error) => return (charges, Some(error)),
                    }
                }
                (charges, None)
            }
            DispatchMode::Concurrent => {
                // Every attempt settles before deciding; money may already have moved.
                let results = join_all(details.iter().map(|detail| self.charge(detail))).await;

                let mut failure = None;
                for result in results {
                    match result {
                        Ok(charge) => charges.push(charge),
                        Err(error) if failure.is_none() => failure = Some(error),
                        Err(error) => {
                            tracing::warn!(%error, "additional charge failure in batch");
                        }
                    }
                }
                (charges, failure)
            }
        }
    }

    async fn charge(&self, detail: &PaymentDetail) -> Result<Charge> {
        let type_tag = detail.payment_method.type_tag();
        let processor = self.resolver.resolve(type_tag)?;
        let charge = processor.execute_payment(detail).await?;

        tracing::debug!(
            instrument = type_tag,
            requested = %detail.amount,
            moved = %charge.transaction_amount,
            status = %charge.status,
            "instrument charged"
        );
        Ok(charge)
    }

    /// Reverses every approved payment in attempt order.
    ///
    /// Returns the finalized payments (reversed ones marked as such) and the
    /// approved payments whose reversal failed.
    async fn reverse_approved(&self, payments: Vec<Payment>) -> (Vec<Payment>, Vec<Payment>) {
        let outcomes: Vec<Option<Result<()>>> = match self.config.dispatch {
            DispatchMode::Sequential => {
                let mut outcomes = Vec::with_capacity(payments.len());
                for payment in &payments {
                    outcomes.push(self.reverse_if_approved(payment).await);
                }
                outcomes
            }
            DispatchMode::Concurrent => {
                join_all(payments.iter().map(|payment| self.reverse_if_approved(payment))).await
            }
        };

        let mut finalized = Vec::with_capacity(payments.len());
        let mut unreversed = Vec::new();

        for (payment, outcome) in payments.into_iter().zip(outcomes) {
            match outcome {
                None => finalized.push(payment),
                Some(Ok(())) => finalized.push(payment.reversed()),
                Some(Err(error)) => {
                    metrics::counter!("payment_reversals_failed").increment(1);
                    tracing::error!(
                        %error,
                        instrument = payment.payment_method().type_tag(),
                        amount = %payment.transaction_amount(),
                        "reversal failed; approved charge left in place"
                    );
                    unreversed.push(payment.clone());
                    finalized.push(payment);
                }
            }
        }

        (finalized, unreversed)
    }

    async fn reverse_if_approved(&self, payment: &Payment) -> Option<Result<()>> {
        if !payment.is_approved() {
            return None;
        }

        let result = match self.resolver.resolve(payment.payment_method().type_tag()) {
            Ok(processor) => processor.reverse_payment(payment).await,
            Err(error) => Err(error),
        };

        Some(result)
    }

    /// Saves every payment in order, returning them with their ledger IDs.
    async fn persist(
        &self,
        payments: Vec<Payment>,
    ) -> std::result::Result<Vec<Payment>, Abandoned> {
        let mut persisted = Vec::with_capacity(payments.len());
        let mut failure = None;

        for payment in &payments {
            match self.ledger.save(payment).await {
                Ok(id) => persisted.push(payment.with_id(id)),
                Err(error) => {
                    failure = Some(error);
                    break;
                }
            }
        }

        match failure {
            Some(error) => Err(Abandoned { payments, error }),
            None => Ok(persisted),
        }
    }

    async fn abandon(&self, order_id: OrderId, abandoned: Abandoned) -> Settlement {
        trace_phase(order_id, PayPhase::Contingency);
        tracing::error!(
            error = %abandoned.error,
            payments = abandoned.payments.len(),
            "payment could not be settled; handing off to contingency"
        );

        let reason = abandoned.error.to_string();
        self.hand_off(order_id, abandoned.payments.clone(), reason.clone())
            .await;

        Settlement::Contingency {
            payments: abandoned.payments,
            reason,
        }
    }

    async fn hand_off(&self, order_id: OrderId, payments: Vec<Payment>, reason: String) {
        metrics::counter!("payment_contingencies_total").increment(1);

        let batch = ContingencyBatch::new(order_id, payments, reason);
        if let Err(error) = self.contingency.create_contingency(batch).await {
            metrics::counter!("payment_contingency_failures").increment(1);
            tracing::error!(%error, %order_id, "contingency hand-off failed");
        }
    }
}

/// Order total minus the sum of approved transaction amounts.
fn approved_remainder(total: Amount, payments: &[Payment]) -> Amount {
    payments
        .iter()
        .filter(|payment| payment.is_approved())
        .fold(total, |remainder, payment| {
            remainder - payment.transaction_amount()
        })
}

fn trace_phase(order_id: OrderId, phase: PayPhase) {
    tracing::debug!(%order_id, %phase, "pay phase");
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use domain::{
        Charge, Customer, CustomerId, OrderDetail, PaymentMethod, PaymentStatus, Restaurant,
        RestaurantId,
    };

    use super::*;
    use crate::contingency::InMemoryContingencySink;
    use crate::instrument::InstrumentKind;
    use crate::ledger::InMemoryPaymentLedger;
    use crate::processors::{InMemoryProcessor, ScriptedOutcome};
    use crate::resolver::ProcessorRegistry;

    type TestOrchestrator =
        PaymentOrchestrator<ProcessorRegistry, InMemoryPaymentLedger, InMemoryContingencySink>;

    struct Fixture {
        orchestrator: TestOrchestrator,
        card: InMemoryProcessor,
        wallet: InMemoryProcessor,
        ledger: InMemoryPaymentLedger,
        contingency: InMemoryContingencySink,
    }

    fn setup() -> Fixture {
        let card = InMemoryProcessor::new(InstrumentKind::CreditCard);
        let wallet = InMemoryProcessor::new(InstrumentKind::Wallet);
        let registry = ProcessorRegistry::new()
            .register(Arc::new(card.clone()))
            .register(Arc::new(wallet.clone()));
        let ledger = InMemoryPaymentLedger::new();
        let contingency = InMemoryContingencySink::new();

        let orchestrator = PaymentOrchestrator::new(registry, ledger.clone(), contingency.clone());

        Fixture {
            orchestrator,
            card,
            wallet,
            ledger,
            contingency,
        }
    }

    fn order(total: f64, payments: &[(&str, f64)]) -> Order {
        Order::new(
            OrderId::new(),
            Customer::new(CustomerId::new(), "Grace", "Hopper"),
            Restaurant::new(RestaurantId::new(), "Diner", "2 Elm St"),
            vec![OrderDetail::new("Meal", 1, total)],
            payments
                .iter()
                .map(|(tag, amount)| PaymentDetail::new(*tag, *amount))
                .collect(),
        )
        .unwrap()
    }

    fn approved(tag: &str, amount: f64) -> Payment {
        Payment::from_charge(
            Charge::approved(PaymentMethod::new(tag, amount), amount),
            OrderId::new(),
        )
    }

    #[test]
    fn test_remainder_counts_only_approved() {
        let declined = Payment::from_charge(
            Charge::declined(PaymentMethod::new("wallet", 4.0)),
            OrderId::new(),
        );
        let other = approved("cash", 4.0).reversed();

        let remainder = approved_remainder(
            Amount::new(10.0),
            &[approved("credit_card", 6.0), declined, other],
        );
        assert_eq!(remainder, Amount::new(4.0));
    }

    #[test]
    fn test_remainder_negative_on_overpayment() {
        let remainder = approved_remainder(
            Amount::new(10.0),
            &[approved("credit_card", 6.0), approved("wallet", 6.0)],
        );
        assert_eq!(remainder, Amount::new(-2.0));
    }

    #[tokio::test]
    async fn test_pay_full_order() {
        let f = setup();
        let order = order(10.0, &[("credit_card", 6.0), ("wallet", 4.0)]);

        assert!(f.orchestrator.pay(&order).await);

        let records = f.ledger.records();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|p| p.order_id() == order.id()));
        assert!(records.iter().all(|p| p.id().is_some()));
        assert_eq!(f.card.reversal_calls(), 0);
        assert_eq!(f.wallet.reversal_calls(), 0);
        assert_eq!(f.contingency.batch_count(), 0);
    }

    #[tokio::test]
    async fn test_decline_reverses_approved_only() {
        let f = setup();
        f.wallet.script(ScriptedOutcome::Decline);
        let order = order(10.0, &[("credit_card", 6.0), ("wallet", 4.0)]);

        let settlement = f.orchestrator.settle(&order).await;

        assert!(matches!(
            settlement,
            Settlement::Rejected {
                remainder,
                failed_reversals: 0,
                ..
            } if remainder == Amount::new(4.0)
        ));
        assert_eq!(f.card.reversal_calls(), 1);
        assert_eq!(f.wallet.reversal_calls(), 0);

        let statuses: Vec<PaymentStatus> =
            f.ledger.records().iter().map(|p| p.status().clone()).collect();
        assert_eq!(statuses, vec![PaymentStatus::Reversed, PaymentStatus::Declined]);
        assert_eq!(f.contingency.batch_count(), 0);
    }

    #[tokio::test]
    async fn test_ledger_failure_hands_off() {
        let f = setup();
        f.ledger.set_fail_on_save(true);
        let order = order(10.0, &[("credit_card", 6.0), ("wallet", 4.0)]);

        let settlement = f.orchestrator.settle(&order).await;

        assert!(matches!(settlement, Settlement::Contingency { .. }));
        let batches = f.contingency.batches();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].payments.len(), 2);
        assert!(batches[0].reason.starts_with("Ledger error"));
    }

    #[tokio::test]
    async fn test_failing_contingency_sink_still_returns_false() {
        let f = setup();
        f.contingency.set_fail_on_create(true);
        f.card
            .script(ScriptedOutcome::GatewayFailure("connection reset".into()));
        let order = order(10.0, &[("credit_card", 6.0), ("wallet", 4.0)]);

        assert!(!f.orchestrator.pay(&order).await);
        assert_eq!(f.contingency.batch_count(), 0);
        assert_eq!(f.ledger.record_count(), 0);
    }
}
