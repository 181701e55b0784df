//! Topology graph model.
//!
//! A [`Topology`] is a DAG of [`Node`]s joined by [`Connection`]s between
//! (node, slot) pairs. The same type describes both the partial graph a
//! caller hands to the resolver and the fully connected graph it returns.
//!
//! ```text
//! SourceStream ──▶ Transform ──▶ Output
//!   0 in / 1 out    n in / m out   1 in / 0 out
//! ```

mod error;
mod graph;
mod node;
mod policy;

pub use error::{GraphError, SlotDirection};
pub use graph::{Connection, Topology};
pub use node::{
    Endpoint, Node, NodeId, NodeKind, NodeType, SinkRef, Slot, StreamDescriptor, StreamSink,
    TransformBinding, TransformRole,
};
pub use policy::ConnectPolicy;
