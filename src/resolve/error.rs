//! Resolution error types.

use super::Branch;
use crate::codec::CodecCategory;
use crate::error::{FormatError, InstantiateError};
use crate::format::{MajorType, TypeInfo};
use crate::topology::{Endpoint, GraphError, NodeId, SlotDirection};
use thiserror::Error;

/// Node budget or memory exhausted while growing the output topology.
///
/// Always fatal: candidate search never swallows it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("allocation failed: {reason}")]
pub struct AllocationError {
    /// What ran out.
    pub reason: String,
}

impl AllocationError {
    /// Create a new allocation error.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure of the output graph builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Graph edit rejected.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Out of nodes.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Why a single connection attempt failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CandidateError {
    /// A capability provider refused a format.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A codec factory failed.
    #[error(transparent)]
    Instantiate(#[from] InstantiateError),

    /// Graph edit rejected.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The downstream stream does not accept the upstream format.
    #[error("{format} is not accepted by {downstream}")]
    Incompatible {
        /// Display form of the upstream format.
        format: String,
        /// Downstream node and slot.
        downstream: Endpoint,
    },

    /// The registry offered no usable codec.
    #[error("no {category} accepts {input}")]
    NoCandidates {
        /// Queried category.
        category: CodecCategory,
        /// Queried input type.
        input: TypeInfo,
    },

    /// No codec category handles this major kind.
    #[error("no codec category handles {major} streams")]
    NoCategory {
        /// Major kind of the upstream format.
        major: MajorType,
    },

    /// The slot has no capability provider.
    #[error("{direction} slot {endpoint} has no capability provider")]
    MissingCaps {
        /// Node and slot.
        endpoint: Endpoint,
        /// Slot direction.
        direction: SlotDirection,
    },

    /// Out of nodes.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

impl CandidateError {
    /// Whether the error aborts the whole resolution.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Allocation(_))
    }
}

impl From<BuildError> for CandidateError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Graph(e) => Self::Graph(e),
            BuildError::Allocation(e) => Self::Allocation(e),
        }
    }
}

/// Failure of [`TopologyLoader::resolve`](super::TopologyLoader::resolve).
///
/// No output topology exists when this is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The input topology is not resolvable as given.
    #[error("node {node}: {reason}")]
    Precondition {
        /// Offending node.
        node: NodeId,
        /// What is missing.
        reason: String,
    },

    /// The input topology has no source-stream node.
    #[error("topology has no source nodes")]
    NoSources,

    /// No source-stream node has an outgoing connection.
    #[error("no source node is connected")]
    NoConnections,

    /// Every strategy and format failed for a branch.
    #[error("cannot resolve branch {branch}: {cause}")]
    UnresolvableBranch {
        /// The failed branch, in input node ids.
        branch: Branch,
        /// Last candidate failure.
        cause: CandidateError,
    },

    /// Node budget or memory exhausted.
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    /// Graph edit rejected outside branch resolution.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl ResolutionError {
    pub(crate) fn from_branch(branch: Branch, cause: CandidateError) -> Self {
        match cause {
            CandidateError::Allocation(e) => Self::Allocation(e),
            cause => Self::UnresolvableBranch { branch, cause },
        }
    }
}

impl From<BuildError> for ResolutionError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::Graph(e) => Self::Graph(e),
            BuildError::Allocation(e) => Self::Allocation(e),
        }
    }
}
