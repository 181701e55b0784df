//! Topology nodes and their slots.

use super::{ConnectPolicy, GraphError};
use crate::caps::CapsRef;
use crate::codec::{FactoryRef, TransformHandle};
use crate::format::FormatDescriptor;
use smallvec::{SmallVec, smallvec};
use std::fmt;
use std::sync::Arc;

/// Stable identifier of a node within a topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Get the raw value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A (node, slot) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    /// Node id.
    pub node: NodeId,
    /// Slot index.
    pub slot: usize,
}

impl Endpoint {
    /// Create a new endpoint.
    pub fn new(node: NodeId, slot: usize) -> Self {
        Self { node, slot }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node, self.slot)
    }
}

/// One input or output stream of a node.
#[derive(Debug, Clone, Default)]
pub struct Slot {
    preferred: Option<FormatDescriptor>,
    peer: Option<Endpoint>,
}

impl Slot {
    /// Format the node would like on this stream.
    pub fn preferred(&self) -> Option<&FormatDescriptor> {
        self.preferred.as_ref()
    }

    /// The other end of the committed connection.
    pub fn peer(&self) -> Option<Endpoint> {
        self.peer
    }

    /// Whether the slot has a committed connection.
    pub fn is_connected(&self) -> bool {
        self.peer.is_some()
    }
}

type Slots = SmallVec<[Slot; 2]>;

/// A stream offered by a media source.
#[derive(Clone)]
pub struct StreamDescriptor {
    /// Stream identifier within its source.
    pub stream_id: u32,
    /// Formats the stream can deliver.
    pub caps: CapsRef,
    /// Whether samples are delivered in hardware memory.
    pub hardware_resident: bool,
}

impl StreamDescriptor {
    /// Create a system-memory stream.
    pub fn new(stream_id: u32, caps: CapsRef) -> Self {
        Self {
            stream_id,
            caps,
            hardware_resident: false,
        }
    }

    /// Set the memory domain.
    pub fn with_hardware_resident(mut self, hardware_resident: bool) -> Self {
        self.hardware_resident = hardware_resident;
        self
    }
}

impl fmt::Debug for StreamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamDescriptor")
            .field("stream_id", &self.stream_id)
            .field("hardware_resident", &self.hardware_resident)
            .finish_non_exhaustive()
    }
}

/// The consuming end of an output node.
pub trait StreamSink: Send + Sync {
    /// Formats the sink accepts.
    fn caps(&self) -> CapsRef;

    /// Whether the sink expects samples in hardware memory.
    fn hardware_resident(&self) -> bool {
        false
    }
}

/// Shared handle to a stream sink.
pub type SinkRef = Arc<dyn StreamSink>;

/// Codec binding of a transform node.
///
/// A transform left unbound in the input graph carries a factory and is
/// bound when the resolver first reaches it.
#[derive(Clone)]
pub enum TransformBinding {
    /// An instantiated codec.
    Bound(TransformHandle),
    /// A factory instantiated during resolution.
    Deferred(FactoryRef),
}

impl fmt::Debug for TransformBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bound(codec) => f.debug_tuple("Bound").field(&codec.name()).finish(),
            Self::Deferred(factory) => f.debug_tuple("Deferred").field(&factory.name()).finish(),
        }
    }
}

/// Why a transform node is in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformRole {
    /// Placed by the caller.
    #[default]
    Declared,
    /// Inserted to convert between raw formats.
    Converter,
    /// Inserted to decode a compressed format.
    Decoder,
    /// Inserted to move samples between memory domains.
    Copier,
}

/// Variant of a node, with its variant-specific payload.
#[derive(Clone, Debug)]
pub enum NodeKind {
    /// One stream of a media source.
    SourceStream {
        /// Bound stream.
        stream: Option<StreamDescriptor>,
        /// Presentation start time, in 100ns units.
        start_time: Option<u64>,
    },
    /// A codec.
    Transform {
        /// Codec binding.
        binding: TransformBinding,
        /// Why the node exists.
        role: TransformRole,
        /// Name of the factory that produced the codec.
        factory: Option<String>,
    },
    /// A stream sink.
    Output {
        /// Bound sink.
        sink: Option<SinkRef>,
        /// Stream id on the sink.
        stream_id: Option<u32>,
    },
}

/// Discriminant of [`NodeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// See [`NodeKind::SourceStream`].
    SourceStream,
    /// See [`NodeKind::Transform`].
    Transform,
    /// See [`NodeKind::Output`].
    Output,
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceStream => f.write_str("source"),
            Self::Transform => f.write_str("transform"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// A node of a [`Topology`](super::Topology).
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
    inputs: Slots,
    outputs: Slots,
    policy: Option<ConnectPolicy>,
}

impl Node {
    fn with_kind(id: NodeId, kind: NodeKind, inputs: usize, outputs: usize) -> Self {
        Self {
            id,
            kind,
            inputs: smallvec![Slot::default(); inputs],
            outputs: smallvec![Slot::default(); outputs],
            policy: None,
        }
    }

    /// Create a source-stream node.
    pub fn source(id: NodeId, stream: StreamDescriptor) -> Self {
        let kind = NodeKind::SourceStream {
            stream: Some(stream),
            start_time: None,
        };
        Self::with_kind(id, kind, 0, 1)
    }

    /// Create a source-stream node with no stream bound.
    pub fn unbound_source(id: NodeId) -> Self {
        let kind = NodeKind::SourceStream {
            stream: None,
            start_time: None,
        };
        Self::with_kind(id, kind, 0, 1)
    }

    /// Create a transform node around a codec instance.
    pub fn transform(id: NodeId, codec: TransformHandle) -> Self {
        let (inputs, outputs) = (codec.input_count(), codec.output_count());
        let kind = NodeKind::Transform {
            binding: TransformBinding::Bound(codec),
            role: TransformRole::Declared,
            factory: None,
        };
        Self::with_kind(id, kind, inputs, outputs)
    }

    /// Create a transform node whose codec is instantiated during resolution.
    pub fn deferred(id: NodeId, factory: FactoryRef) -> Self {
        let name = factory.name().to_string();
        let kind = NodeKind::Transform {
            binding: TransformBinding::Deferred(factory),
            role: TransformRole::Declared,
            factory: Some(name),
        };
        Self::with_kind(id, kind, 1, 1)
    }

    /// Create a transform node inserted by the resolver.
    pub(crate) fn inserted(
        id: NodeId,
        codec: TransformHandle,
        role: TransformRole,
        factory: &str,
    ) -> Self {
        let mut node = Self::transform(id, codec);
        if let NodeKind::Transform {
            role: r,
            factory: f,
            ..
        } = &mut node.kind
        {
            *r = role;
            *f = Some(factory.to_string());
        }
        node
    }

    /// Create an output node.
    pub fn output(id: NodeId, sink: SinkRef) -> Self {
        let kind = NodeKind::Output {
            sink: Some(sink),
            stream_id: None,
        };
        Self::with_kind(id, kind, 1, 0)
    }

    /// Create an output node with no sink bound.
    pub fn unbound_output(id: NodeId) -> Self {
        let kind = NodeKind::Output {
            sink: None,
            stream_id: None,
        };
        Self::with_kind(id, kind, 1, 0)
    }

    /// Set the connection policy.
    pub fn with_policy(mut self, policy: ConnectPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Set the preferred format of an input slot. Out-of-range slots are ignored.
    pub fn with_input_preference(mut self, slot: usize, format: FormatDescriptor) -> Self {
        if let Some(s) = self.inputs.get_mut(slot) {
            s.preferred = Some(format);
        }
        self
    }

    /// Set the preferred format of an output slot. Out-of-range slots are ignored.
    pub fn with_output_preference(mut self, slot: usize, format: FormatDescriptor) -> Self {
        if let Some(s) = self.outputs.get_mut(slot) {
            s.preferred = Some(format);
        }
        self
    }

    /// Set the start time of a source node.
    pub fn with_start_time(mut self, time: u64) -> Self {
        self.set_start_time(time);
        self
    }

    /// Set the target stream id of an output node.
    pub fn with_stream_id(mut self, id: u32) -> Self {
        self.set_stream_id(id);
        self
    }

    /// Get the node id.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the variant payload.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Get the node type.
    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::SourceStream { .. } => NodeType::SourceStream,
            NodeKind::Transform { .. } => NodeType::Transform,
            NodeKind::Output { .. } => NodeType::Output,
        }
    }

    /// Explicit connection policy, if any.
    pub fn policy(&self) -> Option<ConnectPolicy> {
        self.policy
    }

    /// Set the connection policy.
    pub fn set_policy(&mut self, policy: ConnectPolicy) {
        self.policy = Some(policy);
    }

    /// Input slots.
    pub fn inputs(&self) -> &[Slot] {
        &self.inputs
    }

    /// Output slots.
    pub fn outputs(&self) -> &[Slot] {
        &self.outputs
    }

    /// Get an input slot.
    pub fn input_slot(&self, slot: usize) -> Option<&Slot> {
        self.inputs.get(slot)
    }

    /// Get an output slot.
    pub fn output_slot(&self, slot: usize) -> Option<&Slot> {
        self.outputs.get(slot)
    }

    pub(crate) fn set_input_peer(&mut self, slot: usize, peer: Option<Endpoint>) {
        if let Some(s) = self.inputs.get_mut(slot) {
            s.peer = peer;
        }
    }

    pub(crate) fn set_output_peer(&mut self, slot: usize, peer: Option<Endpoint>) {
        if let Some(s) = self.outputs.get_mut(slot) {
            s.peer = peer;
        }
    }

    /// Capability provider of an input slot.
    pub fn input_caps(&self, slot: usize) -> Option<CapsRef> {
        match &self.kind {
            NodeKind::Output { sink: Some(sink), .. } if slot == 0 => Some(sink.caps()),
            NodeKind::Transform {
                binding: TransformBinding::Bound(codec),
                ..
            } => codec.input_caps(slot),
            _ => None,
        }
    }

    /// Capability provider of an output slot.
    pub fn output_caps(&self, slot: usize) -> Option<CapsRef> {
        match &self.kind {
            NodeKind::SourceStream {
                stream: Some(stream),
                ..
            } if slot == 0 => Some(stream.caps.clone()),
            NodeKind::Transform {
                binding: TransformBinding::Bound(codec),
                ..
            } => codec.output_caps(slot),
            _ => None,
        }
    }

    /// The bound codec of a transform node.
    pub fn codec(&self) -> Option<&TransformHandle> {
        match &self.kind {
            NodeKind::Transform {
                binding: TransformBinding::Bound(codec),
                ..
            } => Some(codec),
            _ => None,
        }
    }

    /// The pending factory of a deferred transform node.
    pub fn deferred_factory(&self) -> Option<&FactoryRef> {
        match &self.kind {
            NodeKind::Transform {
                binding: TransformBinding::Deferred(factory),
                ..
            } => Some(factory),
            _ => None,
        }
    }

    /// Bind a codec to a transform node.
    ///
    /// Slots are resized to the codec's stream counts; existing slots keep
    /// their preferences and connections.
    pub fn set_codec(&mut self, codec: TransformHandle) -> Result<(), GraphError> {
        let NodeKind::Transform { binding, .. } = &mut self.kind else {
            return Err(GraphError::NotATransform(self.id));
        };
        self.inputs.resize(codec.input_count(), Slot::default());
        self.outputs.resize(codec.output_count(), Slot::default());
        *binding = TransformBinding::Bound(codec);
        Ok(())
    }

    /// Role of a transform node.
    pub fn role(&self) -> Option<TransformRole> {
        match &self.kind {
            NodeKind::Transform { role, .. } => Some(*role),
            _ => None,
        }
    }

    /// Whether the node is a resolver-inserted decoder.
    pub fn is_decoder(&self) -> bool {
        self.role() == Some(TransformRole::Decoder)
    }

    /// Name of the factory that produced a transform node's codec.
    pub fn factory_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Transform { factory, .. } => factory.as_deref(),
            _ => None,
        }
    }

    /// The bound stream of a source node.
    pub fn stream(&self) -> Option<&StreamDescriptor> {
        match &self.kind {
            NodeKind::SourceStream { stream, .. } => stream.as_ref(),
            _ => None,
        }
    }

    /// The bound sink of an output node.
    pub fn sink(&self) -> Option<&SinkRef> {
        match &self.kind {
            NodeKind::Output { sink, .. } => sink.as_ref(),
            _ => None,
        }
    }

    /// Whether the node's bound object lives in hardware memory.
    pub fn hardware_resident(&self) -> bool {
        match &self.kind {
            NodeKind::SourceStream {
                stream: Some(stream),
                ..
            } => stream.hardware_resident,
            NodeKind::Output { sink: Some(sink), .. } => sink.hardware_resident(),
            NodeKind::Transform {
                binding: TransformBinding::Bound(codec),
                ..
            } => codec.hardware_resident(),
            _ => false,
        }
    }

    /// Start time of a source node.
    pub fn start_time(&self) -> Option<u64> {
        match &self.kind {
            NodeKind::SourceStream { start_time, .. } => *start_time,
            _ => None,
        }
    }

    /// Set the start time of a source node. No-op on other nodes.
    pub fn set_start_time(&mut self, time: u64) {
        if let NodeKind::SourceStream { start_time, .. } = &mut self.kind {
            *start_time = Some(time);
        }
    }

    /// Target stream id of an output node.
    pub fn stream_id(&self) -> Option<u32> {
        match &self.kind {
            NodeKind::Output { stream_id, .. } => *stream_id,
            _ => None,
        }
    }

    /// Set the target stream id of an output node. No-op on other nodes.
    pub fn set_stream_id(&mut self, id: u32) {
        if let NodeKind::Output { stream_id, .. } = &mut self.kind {
            *stream_id = Some(id);
        }
    }

    /// Copy of this node with every connection cleared.
    pub fn detached(&self) -> Self {
        let mut node = self.clone();
        for slot in node.inputs.iter_mut().chain(node.outputs.iter_mut()) {
            slot.peer = None;
        }
        node
    }

    /// Short label used in logs and DOT output.
    pub fn label(&self) -> String {
        match &self.kind {
            NodeKind::SourceStream { stream, .. } => match stream {
                Some(s) => format!("source {} stream {}", self.id, s.stream_id),
                None => format!("source {}", self.id),
            },
            NodeKind::Transform { binding, role, .. } => {
                let name = match binding {
                    TransformBinding::Bound(codec) => codec.name(),
                    TransformBinding::Deferred(factory) => factory.name(),
                };
                format!("{role:?} {} {name}", self.id).to_lowercase()
            }
            NodeKind::Output { .. } => format!("output {}", self.id),
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl fmt::Debug for dyn StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink")
            .field("hardware_resident", &self.hardware_resident())
            .finish_non_exhaustive()
    }
}
