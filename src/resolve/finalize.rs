//! Post-resolution pass: default metadata and memory-domain copiers.

use super::{LoaderConfig, OutputBuilder, ResolutionError};
use crate::codec::SampleCopier;
use crate::observability::record_node_inserted;
use crate::topology::{Endpoint, Node, Topology, TransformRole};
use std::sync::Arc;
use tracing::debug;

pub(crate) fn finalize(
    builder: &OutputBuilder<'_>,
    output: &mut Topology,
    config: &LoaderConfig,
) -> Result<(), ResolutionError> {
    for id in output.outputs() {
        if let Some(node) = output.node_mut(id) {
            if node.stream_id().is_none() {
                node.set_stream_id(0);
            }
        }
    }
    for id in output.sources() {
        if let Some(node) = output.node_mut(id) {
            if node.start_time().is_none() {
                node.set_start_time(0);
            }
        }
    }
    if config.insert_copiers {
        insert_copiers(builder, output)?;
    }
    Ok(())
}

/// Put a copier in front of every output whose upstream lives in the other
/// memory domain.
fn insert_copiers(builder: &OutputBuilder<'_>, output: &mut Topology) -> Result<(), ResolutionError> {
    for id in output.outputs() {
        let to = Endpoint::new(id, 0);
        let Some(connection) = output.connection_to(to).cloned() else {
            continue;
        };
        let Some(format) = connection.format else {
            continue;
        };
        let upstream_hw = output
            .node(connection.from.node)
            .is_some_and(Node::hardware_resident);
        let sink_hw = output.node(id).is_some_and(Node::hardware_resident);
        if upstream_hw == sink_hw {
            continue;
        }

        let copier = Arc::new(SampleCopier::new(format.clone(), sink_hw));
        let copier_id = builder.insert(output, |cid| {
            Node::inserted(cid, copier, TransformRole::Copier, SampleCopier::NAME)
        })?;
        output.disconnect(connection.from)?;
        let copier_in = Endpoint::new(copier_id, 0);
        output.connect_with_format(connection.from, copier_in, format.clone())?;
        output.connect_with_format(copier_in, to, format)?;

        record_node_inserted(TransformRole::Copier);
        debug!(
            node = %copier_id,
            upstream = %connection.from,
            output = %id,
            "inserted sample copier"
        );
    }
    Ok(())
}
