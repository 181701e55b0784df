//! Graph construction errors.

use super::NodeId;
use std::fmt;
use thiserror::Error;

/// Direction of a node slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotDirection {
    /// Input (downstream-facing) slot.
    Input,
    /// Output (upstream-facing) slot.
    Output,
}

impl fmt::Display for SlotDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Errors raised while building or editing a [`Topology`](super::Topology).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// No node with this id.
    #[error("node {0} not found")]
    UnknownNode(NodeId),

    /// A node with this id already exists.
    #[error("node {0} already exists")]
    DuplicateId(NodeId),

    /// The node has no such slot.
    #[error("node {node} has no {direction} slot {slot}")]
    UnknownSlot {
        /// Node id.
        node: NodeId,
        /// Slot index.
        slot: usize,
        /// Slot direction.
        direction: SlotDirection,
    },

    /// The slot already has a connection.
    #[error("{direction} slot {slot} of node {node} is already connected")]
    SlotOccupied {
        /// Node id.
        node: NodeId,
        /// Slot index.
        slot: usize,
        /// Slot direction.
        direction: SlotDirection,
    },

    /// The slot has no connection.
    #[error("output slot {slot} of node {node} is not connected")]
    NotConnected {
        /// Node id.
        node: NodeId,
        /// Slot index.
        slot: usize,
    },

    /// A codec was bound to a node that is not a transform.
    #[error("node {0} is not a transform")]
    NotATransform(NodeId),

    /// The edge would close a cycle.
    #[error("connecting {from} to {to} would create a cycle")]
    Cycle {
        /// Upstream node.
        from: NodeId,
        /// Downstream node.
        to: NodeId,
    },
}
