//! Error types for topoloader.

use thiserror::Error;

pub use crate::resolve::{AllocationError, BuildError, CandidateError, ResolutionError};
pub use crate::topology::GraphError;

/// Result type alias using topoloader's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for topoloader operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Building or editing a topology failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Resolving a topology failed.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

/// A capability provider refused a format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The provider does not accept the format.
    #[error("format rejected: {format}")]
    Rejected {
        /// Display form of the rejected format.
        format: String,
    },

    /// The provider lists no formats and has no current one.
    #[error("stream has no formats")]
    NoFormats,
}

/// A codec factory failed to produce a working instance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to instantiate '{factory}': {reason}")]
pub struct InstantiateError {
    /// Name of the factory.
    pub factory: String,
    /// Reason reported by the factory.
    pub reason: String,
}

impl InstantiateError {
    /// Create a new instantiation error.
    pub fn new(factory: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            factory: factory.into(),
            reason: reason.into(),
        }
    }
}
