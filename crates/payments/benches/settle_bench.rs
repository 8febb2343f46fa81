use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use domain::{
    Customer, CustomerId, Order, OrderDetail, OrderId, PaymentDetail, Restaurant, RestaurantId,
};
use payments::{
    DispatchMode, InMemoryContingencySink, InMemoryPaymentLedger, InMemoryProcessor,
    InstrumentKind, OrchestratorConfig, PaymentOrchestrator, ProcessorRegistry, ScriptedOutcome,
};

fn registry(wallet: &InMemoryProcessor) -> ProcessorRegistry {
    ProcessorRegistry::new()
        .register(Arc::new(InMemoryProcessor::new(InstrumentKind::CreditCard)))
        .register(Arc::new(wallet.clone()))
        .register(Arc::new(InMemoryProcessor::new(InstrumentKind::Cash)))
}

fn order(instruments: usize) -> Order {
    let tags = ["credit_card", "wallet", "cash"];
    Order::new(
        OrderId::new(),
        Customer::new(CustomerId::new(), "Bench", "User"),
        Restaurant::new(RestaurantId::new(), "Bench Diner", "0 Loop Rd"),
        vec![OrderDetail::new("Combo", 1, instruments as f64)],
        (0..instruments)
            .map(|i| PaymentDetail::new(tags[i % tags.len()], 1.0))
            .collect(),
    )
    .unwrap()
}

fn bench_settle_paid(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("payments/settle_paid");

    for mode in [DispatchMode::Sequential, DispatchMode::Concurrent] {
        let wallet = InMemoryProcessor::new(InstrumentKind::Wallet);
        let orchestrator = PaymentOrchestrator::with_config(
            registry(&wallet),
            InMemoryPaymentLedger::new(),
            InMemoryContingencySink::new(),
            OrchestratorConfig::default().with_dispatch(mode),
        );
        let order = order(6);

        let id = BenchmarkId::from_parameter(format!("{mode:?}"));
        group.bench_with_input(id, &order, |b, order| {
            b.iter(|| rt.block_on(orchestrator.pay(order)));
        });
    }

    group.finish();
}

fn bench_settle_rejected(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let wallet = InMemoryProcessor::new(InstrumentKind::Wallet);
    let orchestrator = PaymentOrchestrator::new(
        registry(&wallet),
        InMemoryPaymentLedger::new(),
        InMemoryContingencySink::new(),
    );
    let order = order(3);

    c.bench_function("payments/settle_rejected", |b| {
        b.iter(|| {
            wallet.script(ScriptedOutcome::Decline);
            rt.block_on(orchestrator.pay(&order))
        });
    });
}

criterion_group!(benches, bench_settle_paid, bench_settle_rejected);
criterion_main!(benches);
