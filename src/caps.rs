//! Per-stream capability providers.
//!
//! Every node slot exposes a [`CapabilityProvider`]: it lists the formats
//! the stream can carry, tests compatibility, and holds the current format.
//! Providers are supplied by the concrete node objects (stream descriptors,
//! stream sinks, codec instances); the resolver only talks to this trait.
//!
//! [`FormatList`] is a stock provider over a fixed, ordered list of formats.

use crate::error::FormatError;
use crate::format::FormatDescriptor;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared handle to a capability provider.
pub type CapsRef = Arc<dyn CapabilityProvider>;

/// Format negotiation surface of one stream of a node.
///
/// Implementations must be safe for concurrent read access; `set_current`
/// relies on interior mutability.
pub trait CapabilityProvider: Send + Sync {
    /// Formats this stream can carry, in the provider's order of preference.
    ///
    /// The order is authoritative: the resolver never re-sorts it.
    fn list_formats(&self) -> Vec<FormatDescriptor>;

    /// Whether the stream accepts `format`.
    fn is_compatible(&self, format: &FormatDescriptor) -> bool;

    /// The currently configured format, if any.
    fn current(&self) -> Option<FormatDescriptor>;

    /// Configure the stream to carry `format`.
    fn set_current(&self, format: &FormatDescriptor) -> Result<(), FormatError>;
}

/// Capability provider over a fixed list of formats.
///
/// A format is compatible when it compares as identical or
/// compatible-with-gaps against at least one listed format. Setting an
/// incompatible format fails with [`FormatError::Rejected`].
#[derive(Debug)]
pub struct FormatList {
    formats: Vec<FormatDescriptor>,
    current: Mutex<Option<FormatDescriptor>>,
}

impl FormatList {
    /// Create a provider with no current format.
    pub fn new(formats: Vec<FormatDescriptor>) -> Self {
        Self {
            formats,
            current: Mutex::new(None),
        }
    }

    /// Create a provider that carries exactly one format, already current.
    pub fn fixed(format: FormatDescriptor) -> Self {
        Self {
            formats: vec![format.clone()],
            current: Mutex::new(Some(format)),
        }
    }

    /// Set the initial current format.
    pub fn with_current(self, format: FormatDescriptor) -> Self {
        *self.current.lock() = Some(format);
        self
    }

    /// Wrap into a shared handle.
    pub fn into_ref(self) -> CapsRef {
        Arc::new(self)
    }
}

impl CapabilityProvider for FormatList {
    fn list_formats(&self) -> Vec<FormatDescriptor> {
        self.formats.clone()
    }

    fn is_compatible(&self, format: &FormatDescriptor) -> bool {
        self.formats.iter().any(|f| f.is_compatible_with(format))
    }

    fn current(&self) -> Option<FormatDescriptor> {
        self.current.lock().clone()
    }

    fn set_current(&self, format: &FormatDescriptor) -> Result<(), FormatError> {
        if !self.is_compatible(format) {
            return Err(FormatError::Rejected {
                format: format.to_string(),
            });
        }
        *self.current.lock() = Some(format.clone());
        Ok(())
    }
}
