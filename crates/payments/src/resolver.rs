//! Resolution of instrument type tags to processors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{PaymentError, Result};
use crate::instrument::InstrumentKind;
use crate::processors::PaymentProcessor;

/// Maps an instrument type tag to the processor that handles it.
///
/// Implementations must be pure lookups: safe to call repeatedly and from
/// many orders at once.
pub trait ProcessorResolver: Send + Sync {
    /// Returns the processor for `type_tag`, or
    /// [`PaymentError::UnsupportedInstrument`] if none handles it.
    fn resolve(&self, type_tag: &str) -> Result<Arc<dyn PaymentProcessor>>;
}

/// Registry of processors keyed by instrument kind.
///
/// Read-only once built. Each processor is registered under its own
/// [`PaymentProcessor::kind`], so a processor can never serve a tag it does
/// not handle.
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    processors: HashMap<InstrumentKind, Arc<dyn PaymentProcessor>>,
}

impl ProcessorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a processor, replacing any previous one for the same kind.
    pub fn register(mut self, processor: Arc<dyn PaymentProcessor>) -> Self {
        self.processors.insert(processor.kind(), processor);
        self
    }
}

impl ProcessorResolver for ProcessorRegistry {
    fn resolve(&self, type_tag: &str) -> Result<Arc<dyn PaymentProcessor>> {
        let kind: InstrumentKind = type_tag.parse()?;
        self.processors
            .get(&kind)
            .cloned()
            .ok_or_else(|| PaymentError::UnsupportedInstrument(type_tag.to_string()))
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("kinds", &self.processors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::InMemoryProcessor;

    #[test]
    fn test_resolves_registered_kind() {
        let wallet = InMemoryProcessor::new(InstrumentKind::Wallet);
        let registry = ProcessorRegistry::new().register(Arc::new(wallet));

        let processor = registry.resolve("wallet").unwrap();
        assert_eq!(processor.kind(), InstrumentKind::Wallet);
        assert!(registry.resolve("cash").is_err());
    }

    #[test]
    fn test_unknown_tag_is_unsupported() {
        let registry = ProcessorRegistry::new();
        let err = registry.resolve("crypto").err().unwrap();
        assert!(matches!(err, PaymentError::UnsupportedInstrument(tag) if tag == "crypto"));
    }

    #[test]
    fn test_known_but_unregistered_kind_is_unsupported() {
        let wallet = InMemoryProcessor::new(InstrumentKind::Wallet);
        let registry = ProcessorRegistry::new().register(Arc::new(wallet));
        let err = registry.resolve("cash").err().unwrap();
        assert!(matches!(err, PaymentError::UnsupportedInstrument(tag) if tag == "cash"));
    }

    #[tokio::test]
    async fn test_register_replaces_same_kind() {
        let first = InMemoryProcessor::new(InstrumentKind::Cash);
        let second = InMemoryProcessor::new(InstrumentKind::Cash);
        let registry = ProcessorRegistry::new()
            .register(Arc::new(first.clone()))
            .register(Arc::new(second.clone()));

        let resolved = registry.resolve("cash").unwrap();
        resolved
            .execute_payment(&domain::PaymentDetail::new("cash", 1.0))
            .await
            .unwrap();

        assert_eq!(first.execution_count(), 0);
        assert_eq!(second.execution_count(), 1);
        assert_eq!(format!("{registry:?}"), "ProcessorRegistry { kinds: [Cash] }");
    }
}
