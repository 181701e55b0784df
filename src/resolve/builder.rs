//! Output topology construction.

use super::{AllocationError, BuildError};
use crate::topology::{GraphError, Node, NodeId, Topology};

/// Grows an output topology from an input topology.
///
/// Input nodes are cloned on first reference and keep their ids. Nodes
/// inserted by the resolver get ids above every input id.
#[derive(Debug, Clone, Copy)]
pub struct OutputBuilder<'a> {
    input: &'a Topology,
    max_nodes: Option<usize>,
}

impl<'a> OutputBuilder<'a> {
    /// Create a builder over `input`.
    pub fn new(input: &'a Topology) -> Self {
        Self {
            input,
            max_nodes: None,
        }
    }

    /// Limit the number of nodes in the output topology.
    pub fn with_max_nodes(mut self, max_nodes: Option<usize>) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    /// The input topology.
    pub fn input(&self) -> &'a Topology {
        self.input
    }

    /// Return the output copy of input node `id`, cloning it if needed.
    ///
    /// The clone keeps the node's variant, bound object, metadata,
    /// preferences and policy, but none of its connections. Calling this
    /// again for the same id returns the existing node.
    pub fn clone_into_output(&self, output: &mut Topology, id: NodeId) -> Result<NodeId, BuildError> {
        if output.contains(id) {
            return Ok(id);
        }
        let node = self.input.node(id).ok_or(GraphError::UnknownNode(id))?;
        self.reserve(output)?;
        Ok(output.add_node(node.detached())?)
    }

    /// Add a new node built by `make` under a fresh id.
    pub fn insert(
        &self,
        output: &mut Topology,
        make: impl FnOnce(NodeId) -> Node,
    ) -> Result<NodeId, BuildError> {
        self.reserve(output)?;
        let id = self.next_id(output);
        Ok(output.add_node(make(id))?)
    }

    fn next_id(&self, output: &Topology) -> NodeId {
        let highest = self.input.max_id().max(output.max_id());
        NodeId(highest.map_or(1, |id| id.0 + 1))
    }

    fn reserve(&self, output: &mut Topology) -> Result<(), AllocationError> {
        if let Some(max) = self.max_nodes {
            if output.node_count() >= max {
                return Err(AllocationError::new(format!(
                    "node budget of {max} exhausted"
                )));
            }
        }
        output
            .try_reserve(1)
            .map_err(|e| AllocationError::new(e.to_string()))
    }
}
