//! Pending connections and the FIFO work-list.

use crate::topology::{Connection, Endpoint, NodeId, Topology};
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// A connection waiting to be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Branch {
    /// Upstream node and output slot.
    pub upstream: Endpoint,
    /// Downstream node and input slot.
    pub downstream: Endpoint,
}

impl Branch {
    /// Create a new branch.
    pub fn new(upstream: Endpoint, downstream: Endpoint) -> Self {
        Self {
            upstream,
            downstream,
        }
    }
}

impl From<&Connection> for Branch {
    fn from(c: &Connection) -> Self {
        Self::new(c.from, c.to)
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.upstream, self.downstream)
    }
}

/// FIFO queue of branches over an input topology.
///
/// Seeded with the outgoing connections of every source node. A node's
/// outgoing connections are appended the first time it is expanded.
#[derive(Debug)]
pub(crate) struct WorkList {
    queue: VecDeque<Branch>,
    expanded: HashSet<NodeId>,
}

impl WorkList {
    pub fn seed(input: &Topology) -> Self {
        let mut work = Self {
            queue: VecDeque::new(),
            expanded: HashSet::new(),
        };
        for source in input.sources() {
            work.expand(input, source);
        }
        work
    }

    pub fn pop(&mut self) -> Option<Branch> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Append the outgoing connections of `node`, once.
    pub fn expand(&mut self, input: &Topology, node: NodeId) {
        if !self.expanded.insert(node) {
            return;
        }
        let Some(n) = input.node(node) else {
            return;
        };
        for slot in 0..n.outputs().len() {
            if let Some(c) = input.connection_from(Endpoint::new(node, slot)) {
                self.queue.push_back(Branch::from(c));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SampleCopier;
    use crate::format::{FormatDescriptor, PixelFormat};
    use crate::topology::Node;
    use std::sync::Arc;

    fn copier(id: u64) -> Node {
        let format = FormatDescriptor::video_raw(PixelFormat::Nv12, 640, 480);
        Node::transform(NodeId(id), Arc::new(SampleCopier::new(format, false)))
    }

    #[test]
    fn test_fifo_order_and_single_expansion() {
        // 1 -> 3 -> 5
        // 2 -> 4
        let mut input = Topology::new();
        input.add_node(Node::unbound_source(NodeId(1))).unwrap();
        input.add_node(Node::unbound_source(NodeId(2))).unwrap();
        input.add_node(copier(3)).unwrap();
        input.add_node(Node::unbound_output(NodeId(4))).unwrap();
        input.add_node(Node::unbound_output(NodeId(5))).unwrap();
        input.connect(NodeId(1), 0, NodeId(3), 0).unwrap();
        input.connect(NodeId(2), 0, NodeId(4), 0).unwrap();
        input.connect(NodeId(3), 0, NodeId(5), 0).unwrap();

        let mut work = WorkList::seed(&input);
        let first = work.pop().unwrap();
        assert_eq!(first.upstream.node, NodeId(1));
        assert_eq!(first.to_string(), "#1:0 -> #3:0");

        work.expand(&input, NodeId(3));
        work.expand(&input, NodeId(3));

        let rest: Vec<_> = std::iter::from_fn(|| work.pop()).collect();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[0].upstream.node, NodeId(2));
        assert_eq!(rest[1].downstream.node, NodeId(5));
        assert!(work.is_empty());
    }

    #[test]
    fn test_unconnected_source_seeds_nothing() {
        let mut input = Topology::new();
        input.add_node(Node::unbound_source(NodeId(1))).unwrap();
        input.add_node(Node::unbound_output(NodeId(2))).unwrap();

        assert!(WorkList::seed(&input).is_empty());
    }
}
