//! Payment processor trait and in-memory implementation.

mod in_memory;

pub use in_memory::{InMemoryProcessor, ScriptedOutcome};

use async_trait::async_trait;
use domain::{Charge, Payment, PaymentDetail};

use crate::error::Result;
use crate::instrument::InstrumentKind;

/// Executes and reverses charges against one kind of instrument.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// The instrument kind this processor handles.
    fn kind(&self) -> InstrumentKind;

    /// Charges the instrument described by `detail`.
    ///
    /// Each call hits the gateway exactly once; retrying is the caller's
    /// business. A business decline is returned as a charge with a declined
    /// status. `PaymentError::Gateway` means the call itself did not complete.
    async fn execute_payment(&self, detail: &PaymentDetail) -> Result<Charge>;

    /// Compensates a previously approved payment.
    ///
    /// Must be safe to call on a payment that was declined or already
    /// reversed; those calls are no-ops.
    async fn reverse_payment(&self, payment: &Payment) -> Result<()>;
}
