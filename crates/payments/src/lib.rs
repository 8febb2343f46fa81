//! Order payment orchestration across multiple payment instruments.
//!
//! An order may be split over several instruments (say, part credit card
//! and part wallet). The [`PaymentOrchestrator`] charges each instrument,
//! checks that the approved charges add up to exactly the order total, and
//! otherwise reverses what was approved. When the outcome cannot be decided
//! at all (a gateway failed, an instrument is unknown, the ledger is down)
//! the partial batch is handed to a [`ContingencySink`] for deferred
//! reconciliation instead of being dropped.
//!
//! Collaborators sit behind traits:
//! - [`ProcessorResolver`] maps an instrument type tag to a [`PaymentProcessor`]
//! - [`PaymentLedger`] persists finalized payments
//! - [`ContingencySink`] accepts batches needing out-of-band reconciliation

pub mod config;
pub mod contingency;
pub mod error;
pub mod instrument;
pub mod ledger;
pub mod orchestrator;
pub mod processors;
pub mod resolver;
pub mod settlement;
pub mod state;

pub use config::{DispatchMode, OrchestratorConfig, ReversalFailurePolicy};
pub use contingency::{ContingencyBatch, ContingencySink, InMemoryContingencySink};
pub use error::{PaymentError, Result};
pub use instrument::InstrumentKind;
pub use ledger::{InMemoryPaymentLedger, PaymentLedger};
pub use orchestrator::PaymentOrchestrator;
pub use processors::{InMemoryProcessor, PaymentProcessor, ScriptedOutcome};
pub use resolver::{ProcessorRegistry, ProcessorResolver};
pub use settlement::Settlement;
pub use state::PayPhase;
