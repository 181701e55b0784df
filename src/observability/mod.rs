//! Observability features: metrics and tracing.
//!
//! ## Metrics
//!
//! | Metric | Type | Description |
//! |--------|------|-------------|
//! | `topoloader_resolutions_total` | Counter | Resolutions, labelled by `outcome` |
//! | `topoloader_resolve_time_ns` | Histogram | Wall time of one resolution |
//! | `topoloader_branches_resolved_total` | Counter | Top-level branches connected |
//! | `topoloader_nodes_inserted_total` | Counter | Inserted transforms, labelled by `role` |
//! | `topoloader_candidates_rejected_total` | Counter | Rolled-back candidates, labelled by `category` |
//!
//! ## Tracing
//!
//! The loader emits a `resolve` span per call and, when enabled, a `branch`
//! span per top-level connection. Committed edges and inserted nodes are
//! logged at `debug`, individual candidate attempts at `trace`.

mod metrics;
mod tracing_support;

pub use metrics::{
    init_metrics, record_branch_resolved, record_candidate_rejected, record_node_inserted,
    record_resolution,
};
pub use tracing_support::{TracingConfig, span_branch, span_resolve};
