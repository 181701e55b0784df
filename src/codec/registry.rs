//! In-memory codec registry.

use super::{CodecCategory, CodecRegistry, FactoryRef};
use crate::format::TypeInfo;

/// One registered factory with the types it declares.
struct Registration {
    category: CodecCategory,
    /// Accepted input types; empty accepts anything.
    inputs: Vec<TypeInfo>,
    /// Produced output types; empty produces anything.
    outputs: Vec<TypeInfo>,
    factory: FactoryRef,
}

impl Registration {
    fn matches(
        &self,
        category: CodecCategory,
        input: Option<&TypeInfo>,
        output: Option<&TypeInfo>,
    ) -> bool {
        self.category == category
            && accepts(&self.inputs, input)
            && accepts(&self.outputs, output)
    }
}

fn accepts(declared: &[TypeInfo], constraint: Option<&TypeInfo>) -> bool {
    match constraint {
        None => true,
        Some(wanted) => declared.is_empty() || declared.contains(wanted),
    }
}

/// Registry over a fixed list of factories.
///
/// Enumeration returns matching factories in registration order, so
/// resolution over a `StaticCodecRegistry` is deterministic.
#[derive(Default)]
pub struct StaticCodecRegistry {
    entries: Vec<Registration>,
}

impl StaticCodecRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory.
    pub fn register(
        &mut self,
        category: CodecCategory,
        inputs: Vec<TypeInfo>,
        outputs: Vec<TypeInfo>,
        factory: FactoryRef,
    ) {
        self.entries.push(Registration {
            category,
            inputs,
            outputs,
            factory,
        });
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(
        mut self,
        category: CodecCategory,
        inputs: Vec<TypeInfo>,
        outputs: Vec<TypeInfo>,
        factory: FactoryRef,
    ) -> Self {
        self.register(category, inputs, outputs, factory);
        self
    }

    /// Get the number of registered factories.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CodecRegistry for StaticCodecRegistry {
    fn enumerate(
        &self,
        category: CodecCategory,
        input: Option<&TypeInfo>,
        output: Option<&TypeInfo>,
    ) -> Vec<FactoryRef> {
        self.entries
            .iter()
            .filter(|entry| entry.matches(category, input, output))
            .map(|entry| entry.factory.clone())
            .collect()
    }
}

impl std::fmt::Debug for StaticCodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.entries.iter().map(|e| e.factory.name()).collect();
        f.debug_struct("StaticCodecRegistry")
            .field("factories", &names)
            .finish()
    }
}
