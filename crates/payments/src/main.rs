//! Demo entry point: settles sample orders against in-memory collaborators.

use std::sync::Arc;

use domain::{
    Customer, CustomerId, Order, OrderDetail, OrderId, PaymentDetail, Restaurant, RestaurantId,
};
use payments::{
    InMemoryContingencySink, InMemoryPaymentLedger, InMemoryProcessor, InstrumentKind,
    OrchestratorConfig, PaymentOrchestrator, ProcessorRegistry, ScriptedOutcome, Settlement,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type DemoOrchestrator =
    PaymentOrchestrator<ProcessorRegistry, InMemoryPaymentLedger, InMemoryContingencySink>;

/// A sample order plus the outcome the wallet gateway returns for it.
struct Scenario {
    name: &'static str,
    order: Order,
    wallet_outcome: Option<ScriptedOutcome>,
}

struct Demo {
    orchestrator: DemoOrchestrator,
    wallet: InMemoryProcessor,
    ledger: InMemoryPaymentLedger,
    contingency: InMemoryContingencySink,
}

impl Demo {
    fn new(config: OrchestratorConfig) -> Self {
        let wallet = InMemoryProcessor::new(InstrumentKind::Wallet);
        let registry = ProcessorRegistry::new()
            .register(Arc::new(InMemoryProcessor::new(InstrumentKind::CreditCard)))
            .register(Arc::new(wallet.clone()))
            .register(Arc::new(InMemoryProcessor::new(InstrumentKind::Cash)));
        let ledger = InMemoryPaymentLedger::new();
        let contingency = InMemoryContingencySink::new();

        let orchestrator =
            PaymentOrchestrator::with_config(registry, ledger.clone(), contingency.clone(), config);

        Self {
            orchestrator,
            wallet,
            ledger,
            contingency,
        }
    }

    /// Settles each scenario in turn, scripting the wallet just before its order.
    async fn run(&self, scenarios: Vec<Scenario>) -> Vec<(&'static str, Order, Settlement)> {
        let mut results = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            if let Some(outcome) = scenario.wallet_outcome {
                self.wallet.script(outcome);
            }
            let settlement = self.orchestrator.settle(&scenario.order).await;
            results.push((scenario.name, scenario.order, settlement));
        }
        results
    }
}

fn sample_order(payments: Vec<PaymentDetail>) -> Order {
    Order::new(
        OrderId::new(),
        Customer::new(CustomerId::new(), "Ada", "Lovelace"),
        Restaurant::new(RestaurantId::new(), "Trattoria", "1 Main St"),
        vec![
            OrderDetail::new("Margherita", 1, 7.5),
            OrderDetail::new("Lemonade", 1, 2.5),
        ],
        payments,
    )
    .expect("sample order is valid")
}

/// A split order that pays, the same split with a declined wallet, and an
/// order using an instrument nobody handles.
fn scenarios() -> Vec<Scenario> {
    let split = || {
        vec![
            PaymentDetail::new("credit_card", 6.0),
            PaymentDetail::new("wallet", 4.0),
        ]
    };

    vec![
        Scenario {
            name: "split",
            order: sample_order(split()),
            wallet_outcome: None,
        },
        Scenario {
            name: "declined",
            order: sample_order(split()),
            wallet_outcome: Some(ScriptedOutcome::Decline),
        },
        Scenario {
            name: "unknown_instrument",
            order: sample_order(vec![
                PaymentDetail::new("cash", 5.0),
                PaymentDetail::new("crypto", 5.0),
            ]),
            wallet_outcome: None,
        },
    ]
}

#[tokio::main]
async fn main() {
    let config = OrchestratorConfig::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire in-memory collaborators
    let demo = Demo::new(config);
    tracing::info!(config = ?demo.orchestrator.config(), "starting payment demo");

    // 4. Settle the sample orders
    for (name, order, settlement) in demo.run(scenarios()).await {
        match serde_json::to_string_pretty(&settlement) {
            Ok(json) => println!("{name} (order {}):\n{json}", order.id()),
            Err(error) => tracing::error!(%error, "failed to render settlement"),
        }
    }

    tracing::info!(
        ledger_records = demo.ledger.record_count(),
        contingency_batches = demo.contingency.batch_count(),
        "demo finished"
    );
    println!("{}", metrics_handle.render());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_each_scenario_settles_as_named() {
        let demo = Demo::new(OrchestratorConfig::default());

        let outcomes: Vec<(&str, &str)> = demo
            .run(scenarios())
            .await
            .iter()
            .map(|(name, _, settlement)| (*name, settlement.as_str()))
            .collect();

        assert_eq!(
            outcomes,
            vec![
                ("split", "paid"),
                ("declined", "rejected"),
                ("unknown_instrument", "contingency"),
            ]
        );
        assert_eq!(demo.contingency.batch_count(), 1);
    }

    #[tokio::test]
    async fn test_wallet_outcome_is_not_consumed_early() {
        let demo = Demo::new(OrchestratorConfig::default());

        demo.run(scenarios()).await;

        // split: two charges, declined: two charges, unknown: cash only.
        assert_eq!(demo.wallet.execution_count(), 2);
        assert_eq!(demo.wallet.reversal_calls(), 0);
        assert_eq!(demo.ledger.record_count(), 4);
    }
}
