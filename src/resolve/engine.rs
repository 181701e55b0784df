//! Branch resolution engine.

use super::branch::WorkList;
use super::finalize::finalize;
use super::{Branch, CandidateError, LoaderConfig, OutputBuilder, ResolutionError};
use crate::caps::CapsRef;
use crate::codec::{CodecCategory, CodecRegistry, FactoryRef};
use crate::error::FormatError;
use crate::format::{FormatDescriptor, FormatMatch, TypeInfo};
use crate::observability::{
    record_branch_resolved, record_candidate_rejected, record_node_inserted, record_resolution,
};
use crate::topology::{
    ConnectPolicy, Endpoint, GraphError, Node, NodeId, NodeKind, NodeType, SlotDirection,
    Topology, TransformRole,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Resolves partial topologies into fully connected ones.
///
/// For every connection reachable from a source, the loader negotiates a
/// format directly, or inserts a converter or decoder taken from the
/// injected [`CodecRegistry`]. Candidates are tried in provider and
/// registry order and the first full success wins, so resolution over a
/// deterministic registry is deterministic.
///
/// # Example
///
/// ```rust,ignore
/// let loader = TopologyLoader::new(Arc::new(registry))
///     .with_config(LoaderConfig::default().with_enumerate_source_types(true));
/// let resolved = loader.resolve(&partial)?;
/// ```
pub struct TopologyLoader {
    registry: Arc<dyn CodecRegistry>,
    config: LoaderConfig,
}

impl TopologyLoader {
    /// Create a loader with the default configuration.
    pub fn new(registry: Arc<dyn CodecRegistry>) -> Self {
        Self {
            registry,
            config: LoaderConfig::default(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Resolve `input` into a new, fully connected topology.
    ///
    /// `input` is never modified. On error no output topology exists.
    pub fn resolve(&self, input: &Topology) -> Result<Topology, ResolutionError> {
        let _span = self.config.tracing.enter_resolve(input.node_count());
        let start = Instant::now();
        let result = self.run(input);
        record_resolution(result.is_ok(), start.elapsed());
        match &result {
            Ok(output) => debug!(
                nodes = output.node_count(),
                edges = output.edge_count(),
                "topology resolved"
            ),
            Err(e) => debug!(error = %e, "topology resolution failed"),
        }
        result
    }

    fn run(&self, input: &Topology) -> Result<Topology, ResolutionError> {
        check_preconditions(input)?;

        let builder = OutputBuilder::new(input).with_max_nodes(self.config.max_nodes);
        let mut output = Topology::new();
        let mut work = WorkList::seed(input);
        if work.is_empty() {
            return Err(ResolutionError::NoConnections);
        }

        while let Some(branch) = work.pop() {
            let _span = self.config.tracing.enter_branch(&branch);
            self.resolve_top_level(&builder, &mut output, branch)
                .map_err(|cause| ResolutionError::from_branch(branch, cause))?;
            record_branch_resolved();
            debug!(%branch, "branch resolved");
            work.expand(input, branch.downstream.node);
        }

        for node in input.nodes() {
            if !output.contains(node.id()) {
                warn!(node = %node.id(), "node not reachable from any connected source, skipped");
            }
        }

        finalize(&builder, &mut output, &self.config)?;
        Ok(output)
    }

    fn resolve_top_level(
        &self,
        builder: &OutputBuilder<'_>,
        output: &mut Topology,
        branch: Branch,
    ) -> Result<(), CandidateError> {
        builder.clone_into_output(output, branch.upstream.node)?;
        builder.clone_into_output(output, branch.downstream.node)?;
        activate(output, branch.downstream.node)?;

        let policy = node(output, branch.downstream.node)?
            .policy()
            .unwrap_or(self.config.default_policy);
        let from_source =
            node(output, branch.upstream.node)?.node_type() == NodeType::SourceStream;
        let enumerate = policy.enumerates_upstream()
            || (from_source && self.config.enumerate_source_types);

        self.resolve_branch(builder, output, branch, policy, enumerate)
    }

    /// Connect one branch, trying upstream formats in provider order.
    fn resolve_branch(
        &self,
        builder: &OutputBuilder<'_>,
        topo: &mut Topology,
        branch: Branch,
        policy: ConnectPolicy,
        enumerate: bool,
    ) -> Result<(), CandidateError> {
        let caps = output_caps(topo, branch.upstream)?;

        if !enumerate {
            let format = match caps.current() {
                Some(format) => format,
                None => {
                    let first = caps
                        .list_formats()
                        .into_iter()
                        .next()
                        .ok_or(FormatError::NoFormats)?;
                    caps.set_current(&first)?;
                    first
                }
            };
            return self.connect_format(builder, topo, branch, &format, policy);
        }

        let mut last = CandidateError::Format(FormatError::NoFormats);
        for format in caps.list_formats() {
            trace!(%branch, %format, "trying upstream format");
            if let Err(e) = caps.set_current(&format) {
                last = e.into();
                continue;
            }
            match self.connect_format(builder, topo, branch, &format, policy) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => last = e,
            }
        }
        Err(last)
    }

    /// Direct, then converter, then decoder, as `policy` allows.
    fn connect_format(
        &self,
        builder: &OutputBuilder<'_>,
        topo: &mut Topology,
        branch: Branch,
        format: &FormatDescriptor,
        policy: ConnectPolicy,
    ) -> Result<(), CandidateError> {
        let mut last = match connect_direct(topo, branch, format) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };

        if policy.allows_converter() {
            match self.insert_transform(builder, topo, branch, format, TransformRole::Converter) {
                Ok(()) => return Ok(()),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => last = e,
            }
        }

        if policy.allows_decoder() {
            return self.insert_transform(builder, topo, branch, format, TransformRole::Decoder);
        }
        Err(last)
    }

    /// Try every registry candidate for `role` on a scratch copy of `topo`.
    fn insert_transform(
        &self,
        builder: &OutputBuilder<'_>,
        topo: &mut Topology,
        branch: Branch,
        format: &FormatDescriptor,
        role: TransformRole,
    ) -> Result<(), CandidateError> {
        let major = format.major();
        let category = match role {
            TransformRole::Decoder => CodecCategory::decoder_for(major),
            _ => CodecCategory::converter_for(major),
        }
        .ok_or(CandidateError::NoCategory { major })?;

        let input_type = format.type_info();
        let output_type = match role {
            TransformRole::Decoder => None,
            _ => downstream_type(topo, branch.downstream),
        };
        let factories = self
            .registry
            .enumerate(category, Some(&input_type), output_type.as_ref());

        let mut last = CandidateError::NoCandidates {
            category,
            input: input_type,
        };
        for factory in factories {
            trace!(%branch, factory = factory.name(), %category, "trying candidate");
            let mut scratch = topo.clone();
            match self.try_candidate(builder, &mut scratch, branch, format, &factory, role) {
                Ok(id) => {
                    *topo = scratch;
                    record_node_inserted(role);
                    debug!(node = %id, factory = factory.name(), ?role, %branch, "inserted transform");
                    return Ok(());
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    record_candidate_rejected(category);
                    trace!(factory = factory.name(), error = %e, "candidate rejected");
                    last = e;
                }
            }
        }
        Err(last)
    }

    fn try_candidate(
        &self,
        builder: &OutputBuilder<'_>,
        scratch: &mut Topology,
        branch: Branch,
        format: &FormatDescriptor,
        factory: &FactoryRef,
        role: TransformRole,
    ) -> Result<NodeId, CandidateError> {
        let codec = factory.instantiate()?;
        let id = builder.insert(scratch, |id| Node::inserted(id, codec, role, factory.name()))?;

        let node_in = Endpoint::new(id, 0);
        connect_direct(scratch, Branch::new(branch.upstream, node_in), format)?;

        let sub = Branch::new(Endpoint::new(id, 0), branch.downstream);
        match role {
            TransformRole::Decoder => {
                self.resolve_branch(builder, scratch, sub, ConnectPolicy::ALLOW_CONVERTER, false)?
            }
            _ => self.resolve_branch(builder, scratch, sub, ConnectPolicy::DIRECT, true)?,
        }
        Ok(id)
    }
}

impl std::fmt::Debug for TopologyLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopologyLoader")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn check_preconditions(input: &Topology) -> Result<(), ResolutionError> {
    for node in input.nodes() {
        let reason = match node.kind() {
            NodeKind::SourceStream { stream: None, .. } => "source node has no stream descriptor",
            NodeKind::Output { sink: None, .. } => "output node has no stream sink",
            _ => continue,
        };
        return Err(ResolutionError::Precondition {
            node: node.id(),
            reason: reason.to_string(),
        });
    }
    if input.sources().is_empty() {
        return Err(ResolutionError::NoSources);
    }
    Ok(())
}

/// Instantiate the factory of a deferred transform.
fn activate(topo: &mut Topology, id: NodeId) -> Result<(), CandidateError> {
    let Some(factory) = node(topo, id)?.deferred_factory().cloned() else {
        return Ok(());
    };
    let codec = factory.instantiate()?;
    topo.node_mut(id)
        .ok_or(GraphError::UnknownNode(id))?
        .set_codec(codec)?;
    debug!(node = %id, factory = factory.name(), "activated deferred transform");
    Ok(())
}

/// Commit `branch` carrying `format` if the downstream accepts it.
fn connect_direct(
    topo: &mut Topology,
    branch: Branch,
    format: &FormatDescriptor,
) -> Result<(), CandidateError> {
    let caps = input_caps(topo, branch.downstream)?;
    let identical = caps
        .current()
        .is_some_and(|current| current.compare(format) == FormatMatch::Identical);
    if !identical {
        if !caps.is_compatible(format) {
            return Err(CandidateError::Incompatible {
                format: format.to_string(),
                downstream: branch.downstream,
            });
        }
        caps.set_current(format)?;
    }
    topo.connect_with_format(branch.upstream, branch.downstream, format.clone())?;
    trace!(%branch, %format, "connected");
    Ok(())
}

/// Type the downstream slot wants: its current format, else its preference.
fn downstream_type(topo: &Topology, at: Endpoint) -> Option<TypeInfo> {
    let node = topo.node(at.node)?;
    node.input_caps(at.slot)
        .and_then(|caps| caps.current())
        .or_else(|| node.input_slot(at.slot).and_then(|s| s.preferred().cloned()))
        .map(|format| format.type_info())
}

fn node(topo: &Topology, id: NodeId) -> Result<&Node, CandidateError> {
    Ok(topo.node(id).ok_or(GraphError::UnknownNode(id))?)
}

fn output_caps(topo: &Topology, at: Endpoint) -> Result<CapsRef, CandidateError> {
    node(topo, at.node)?
        .output_caps(at.slot)
        .ok_or(CandidateError::MissingCaps {
            endpoint: at,
            direction: SlotDirection::Output,
        })
}

fn input_caps(topo: &Topology, at: Endpoint) -> Result<CapsRef, CandidateError> {
    node(topo, at.node)?
        .input_caps(at.slot)
        .ok_or(CandidateError::MissingCaps {
            endpoint: at,
            direction: SlotDirection::Input,
        })
}
