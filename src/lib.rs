//! # topoloader
//!
//! Media pipeline topology resolution.
//!
//! Callers describe a partial processing graph: source streams, declared
//! transforms and output sinks, each with the formats it can carry. The
//! [`TopologyLoader`] turns it into a fully connected, format-consistent
//! graph by negotiating formats and inserting converters, decoders and
//! memory-domain copiers taken from a pluggable codec registry.
//!
//! ## Features
//!
//! - **Backtracking search**: upstream formats and registry candidates are
//!   tried in order, each on a scratch copy that is dropped on failure
//! - **Atomic results**: either a fully connected graph or an error
//! - **Deterministic**: FIFO work-list, provider and registry order
//! - **Pluggable**: capability providers, codec factories and registries
//!   are traits
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use topoloader::prelude::*;
//!
//! let mut registry = StaticCodecRegistry::new();
//! registry.register(CodecCategory::VideoDecoder, vec![h264], vec![], h264_decoder);
//!
//! let mut partial = Topology::new();
//! partial.add_node(Node::source(NodeId(1), StreamDescriptor::new(0, source_caps)))?;
//! partial.add_node(Node::output(NodeId(2), sink))?;
//! partial.connect(NodeId(1), 0, NodeId(2), 0)?;
//!
//! let resolved = TopologyLoader::new(Arc::new(registry)).resolve(&partial)?;
//! println!("{}", resolved.to_dot());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod caps;
pub mod codec;
pub mod error;
pub mod format;
pub mod observability;
pub mod resolve;
pub mod topology;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::caps::{CapabilityProvider, CapsRef, FormatList};
    pub use crate::codec::{
        CodecCategory, CodecFactory, CodecRegistry, FactoryRef, FnFactory, StaticCodecRegistry,
        Transform, TransformHandle,
    };
    pub use crate::error::{Error, FormatError, InstantiateError, Result};
    pub use crate::format::{FormatDescriptor, FormatMatch, MajorType, TypeInfo};
    pub use crate::resolve::{LoaderConfig, ResolutionError, TopologyLoader};
    pub use crate::topology::{
        ConnectPolicy, Endpoint, Node, NodeId, StreamDescriptor, StreamSink, Topology,
    };
}

pub use error::{Error, Result};
pub use resolve::TopologyLoader;
pub use topology::Topology;
