//! Topology graph structure using daggy.

use super::{Endpoint, GraphError, Node, NodeId, NodeType, SlotDirection};
use crate::format::FormatDescriptor;
use daggy::petgraph::Direction;
use daggy::petgraph::visit::EdgeRef;
use daggy::{Dag, NodeIndex};
use std::collections::HashMap;
use std::collections::TryReserveError;
use std::fmt::{self, Write as _};

/// A committed link between an output slot and an input slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Upstream node and output slot.
    pub from: Endpoint,
    /// Downstream node and input slot.
    pub to: Endpoint,
    /// Negotiated format; `None` on declared, unresolved connections.
    pub format: Option<FormatDescriptor>,
}

/// A media processing graph represented as a directed acyclic graph.
///
/// Nodes are stored in insertion order and looked up by their stable
/// [`NodeId`]. Each slot carries at most one connection.
#[derive(Clone)]
pub struct Topology {
    /// The DAG structure.
    graph: Dag<Node, Connection>,
    /// Id-to-index mapping for quick lookup.
    index: HashMap<NodeId, NodeIndex>,
}

impl Topology {
    /// Create a new empty topology.
    pub fn new() -> Self {
        Self {
            graph: Dag::new(),
            index: HashMap::new(),
        }
    }

    /// Add a node.
    ///
    /// Fails if a node with the same id already exists.
    pub fn add_node(&mut self, node: Node) -> Result<NodeId, GraphError> {
        let id = node.id();
        if self.index.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        Ok(id)
    }

    /// Reserve room for `additional` more nodes in the id index without
    /// aborting on failure.
    ///
    /// Only the index is reserved fallibly. The node and edge storage of the
    /// underlying DAG still grows through the global allocator, so callers
    /// wanting a hard bound should cap the node count instead.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.index.try_reserve(additional)
    }

    /// Check if a node exists.
    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&idx| &self.graph[idx])
    }

    /// Get a mutable reference to a node by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let idx = *self.index.get(&id)?;
        Some(&mut self.graph[idx])
    }

    /// Iterate over nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.raw_nodes().iter().map(|n| &n.weight)
    }

    /// Iterate over connections.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.graph.raw_edges().iter().map(|e| &e.weight)
    }

    /// Ids of all source-stream nodes, in insertion order.
    pub fn sources(&self) -> Vec<NodeId> {
        self.ids_of(NodeType::SourceStream)
    }

    /// Ids of all output nodes, in insertion order.
    pub fn outputs(&self) -> Vec<NodeId> {
        self.ids_of(NodeType::Output)
    }

    fn ids_of(&self, node_type: NodeType) -> Vec<NodeId> {
        self.nodes()
            .filter(|n| n.node_type() == node_type)
            .map(Node::id)
            .collect()
    }

    /// Highest node id, if any.
    pub fn max_id(&self) -> Option<NodeId> {
        self.index.keys().max().copied()
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the number of connections.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Check if the topology is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Declare a connection without a negotiated format.
    pub fn connect(
        &mut self,
        from: NodeId,
        output: usize,
        to: NodeId,
        input: usize,
    ) -> Result<(), GraphError> {
        self.link(Endpoint::new(from, output), Endpoint::new(to, input), None)
    }

    /// Commit a connection carrying `format`.
    pub fn connect_with_format(
        &mut self,
        from: Endpoint,
        to: Endpoint,
        format: FormatDescriptor,
    ) -> Result<(), GraphError> {
        self.link(from, to, Some(format))
    }

    fn link(
        &mut self,
        from: Endpoint,
        to: Endpoint,
        format: Option<FormatDescriptor>,
    ) -> Result<(), GraphError> {
        let from_idx = self.index_of(from.node)?;
        let to_idx = self.index_of(to.node)?;

        // Validate upstream slot
        let slot = self.graph[from_idx]
            .output_slot(from.slot)
            .ok_or(GraphError::UnknownSlot {
                node: from.node,
                slot: from.slot,
                direction: SlotDirection::Output,
            })?;
        if slot.is_connected() {
            return Err(GraphError::SlotOccupied {
                node: from.node,
                slot: from.slot,
                direction: SlotDirection::Output,
            });
        }

        // Validate downstream slot
        let slot = self.graph[to_idx]
            .input_slot(to.slot)
            .ok_or(GraphError::UnknownSlot {
                node: to.node,
                slot: to.slot,
                direction: SlotDirection::Input,
            })?;
        if slot.is_connected() {
            return Err(GraphError::SlotOccupied {
                node: to.node,
                slot: to.slot,
                direction: SlotDirection::Input,
            });
        }

        // Add edge (daggy ensures no cycles)
        let connection = Connection { from, to, format };
        self.graph
            .add_edge(from_idx, to_idx, connection)
            .map_err(|_| GraphError::Cycle {
                from: from.node,
                to: to.node,
            })?;

        self.graph[from_idx].set_output_peer(from.slot, Some(to));
        self.graph[to_idx].set_input_peer(to.slot, Some(from));
        Ok(())
    }

    /// Remove the connection leaving an output slot.
    pub fn disconnect(&mut self, from: Endpoint) -> Result<Connection, GraphError> {
        let from_idx = self.index_of(from.node)?;
        let not_connected = GraphError::NotConnected {
            node: from.node,
            slot: from.slot,
        };
        let edge = self
            .graph
            .graph()
            .edges_directed(from_idx, Direction::Outgoing)
            .find(|e| e.weight().from.slot == from.slot)
            .map(|e| e.id())
            .ok_or_else(|| not_connected.clone())?;
        let connection = self.graph.remove_edge(edge).ok_or(not_connected)?;

        let to_idx = self.index_of(connection.to.node)?;
        self.graph[from_idx].set_output_peer(from.slot, None);
        self.graph[to_idx].set_input_peer(connection.to.slot, None);
        Ok(connection)
    }

    /// The connection leaving an output slot.
    pub fn connection_from(&self, from: Endpoint) -> Option<&Connection> {
        let idx = *self.index.get(&from.node)?;
        self.graph
            .graph()
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.weight())
            .find(|c| c.from.slot == from.slot)
    }

    /// The connection entering an input slot.
    pub fn connection_to(&self, to: Endpoint) -> Option<&Connection> {
        let idx = *self.index.get(&to.node)?;
        self.graph
            .graph()
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.weight())
            .find(|c| c.to.slot == to.slot)
    }

    fn index_of(&self, id: NodeId) -> Result<NodeIndex, GraphError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(GraphError::UnknownNode(id))
    }

    /// Render the topology in Graphviz DOT format.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph topology {\n");
        for node in self.nodes() {
            let _ = writeln!(out, "    n{} [label=\"{}\"];", node.id().raw(), node.label());
        }
        for c in self.connections() {
            let format = c
                .format
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "unresolved".into());
            let _ = writeln!(
                out,
                "    n{} -> n{} [label=\"{}:{} {}\"];",
                c.from.node.raw(),
                c.to.node.raw(),
                c.from.slot,
                c.to.slot,
                format
            );
        }
        out.push_str("}\n");
        out
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("nodes", &self.node_count())
            .field("edges", &self.edge_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SampleCopier;
    use crate::format::PixelFormat;
    use std::sync::Arc;

    fn nv12() -> FormatDescriptor {
        FormatDescriptor::video_raw(PixelFormat::Nv12, 640, 480)
    }

    fn copier(id: u64) -> Node {
        Node::transform(NodeId(id), Arc::new(SampleCopier::new(nv12(), false)))
    }

    fn chain() -> Topology {
        let mut topo = Topology::new();
        topo.add_node(Node::unbound_source(NodeId(1))).unwrap();
        topo.add_node(copier(2)).unwrap();
        topo.add_node(Node::unbound_output(NodeId(3))).unwrap();
        topo.connect(NodeId(1), 0, NodeId(2), 0).unwrap();
        topo.connect(NodeId(2), 0, NodeId(3), 0).unwrap();
        topo
    }

    #[test]
    fn test_topology_creation() {
        let topo = Topology::new();
        assert!(topo.is_empty());
        assert_eq!(topo.node_count(), 0);
        assert_eq!(topo.max_id(), None);
    }

    #[test]
    fn test_add_nodes() {
        let mut topo = Topology::new();
        topo.add_node(Node::unbound_source(NodeId(7))).unwrap();
        topo.add_node(Node::unbound_output(NodeId(3))).unwrap();

        assert_eq!(topo.node_count(), 2);
        assert!(topo.contains(NodeId(7)));
        assert_eq!(topo.max_id(), Some(NodeId(7)));
        assert_eq!(topo.sources(), vec![NodeId(7)]);
        assert_eq!(topo.outputs(), vec![NodeId(3)]);
    }

    #[test]
    fn test_duplicate_id() {
        let mut topo = Topology::new();
        topo.add_node(Node::unbound_source(NodeId(1))).unwrap();
        let err = topo.add_node(Node::unbound_output(NodeId(1))).unwrap_err();
        assert_eq!(err, GraphError::DuplicateId(NodeId(1)));
    }

    #[test]
    fn test_connect_sets_peers() {
        let topo = chain();
        assert_eq!(topo.edge_count(), 2);

        let source = topo.node(NodeId(1)).unwrap();
        assert_eq!(source.output_slot(0).unwrap().peer(), Some(Endpoint::new(NodeId(2), 0)));
        let transform = topo.node(NodeId(2)).unwrap();
        assert_eq!(transform.input_slot(0).unwrap().peer(), Some(Endpoint::new(NodeId(1), 0)));

        let c = topo.connection_to(Endpoint::new(NodeId(3), 0)).unwrap();
        assert_eq!(c.from, Endpoint::new(NodeId(2), 0));
        assert!(c.format.is_none());
    }

    #[test]
    fn test_occupied_slot() {
        let mut topo = chain();
        topo.add_node(Node::unbound_output(NodeId(4))).unwrap();
        let err = topo.connect(NodeId(2), 0, NodeId(4), 0).unwrap_err();
        assert!(matches!(
            err,
            GraphError::SlotOccupied {
                direction: SlotDirection::Output,
                ..
            }
        ));
        assert_eq!(topo.edge_count(), 2);
    }

    #[test]
    fn test_unknown_slot_and_node() {
        let mut topo = chain();
        assert!(matches!(
            topo.connect(NodeId(3), 0, NodeId(2), 0),
            Err(GraphError::UnknownSlot { .. })
        ));
        assert_eq!(
            topo.connect(NodeId(9), 0, NodeId(2), 0),
            Err(GraphError::UnknownNode(NodeId(9)))
        );
    }

    #[test]
    fn test_cycle_detection() {
        let mut topo = Topology::new();
        topo.add_node(copier(1)).unwrap();
        topo.add_node(copier(2)).unwrap();
        topo.connect(NodeId(1), 0, NodeId(2), 0).unwrap();

        let err = topo.connect(NodeId(2), 0, NodeId(1), 0).unwrap_err();
        assert_eq!(
            err,
            GraphError::Cycle {
                from: NodeId(2),
                to: NodeId(1)
            }
        );
        // Peers stay untouched on failure.
        assert!(!topo.node(NodeId(2)).unwrap().output_slot(0).unwrap().is_connected());
    }

    #[test]
    fn test_disconnect() {
        let mut topo = chain();
        let c = topo.disconnect(Endpoint::new(NodeId(2), 0)).unwrap();
        assert_eq!(c.to, Endpoint::new(NodeId(3), 0));
        assert_eq!(topo.edge_count(), 1);
        assert!(!topo.node(NodeId(3)).unwrap().input_slot(0).unwrap().is_connected());

        let err = topo.disconnect(Endpoint::new(NodeId(2), 0)).unwrap_err();
        assert!(matches!(err, GraphError::NotConnected { .. }));
    }

    #[test]
    fn test_clone_is_independent() {
        let topo = chain();
        let mut scratch = topo.clone();
        scratch.disconnect(Endpoint::new(NodeId(1), 0)).unwrap();
        scratch.add_node(Node::unbound_output(NodeId(10))).unwrap();

        assert_eq!(topo.edge_count(), 2);
        assert_eq!(topo.node_count(), 3);
        assert!(topo.node(NodeId(1)).unwrap().output_slot(0).unwrap().is_connected());
    }

    #[test]
    fn test_try_reserve() {
        let mut topo = chain();
        assert!(topo.try_reserve(4).is_ok());
        assert!(topo.try_reserve(usize::MAX).is_err());
        assert_eq!(topo.node_count(), 3);
    }

    #[test]
    fn test_to_dot() {
        let mut topo = Topology::new();
        topo.add_node(Node::unbound_source(NodeId(1))).unwrap();
        topo.add_node(Node::unbound_output(NodeId(2))).unwrap();
        topo.connect_with_format(
            Endpoint::new(NodeId(1), 0),
            Endpoint::new(NodeId(2), 0),
            nv12(),
        )
        .unwrap();

        let dot = topo.to_dot();
        assert!(dot.starts_with("digraph topology {"));
        assert!(dot.contains("n1 [label=\"source #1\"];"));
        assert!(dot.contains("n1 -> n2 [label=\"0:0 video/Nv12 FrameSize=640x480\"];"));
    }
}
