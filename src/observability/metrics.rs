//! Metrics collection using metrics-rs.

use crate::codec::CodecCategory;
use crate::topology::TransformRole;
use metrics::{Unit, counter, histogram};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Whether metrics have been initialized.
static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

// Metric names as constants for consistency
const RESOLUTIONS: &str = "topoloader_resolutions_total";
const RESOLVE_TIME_NS: &str = "topoloader_resolve_time_ns";
const BRANCHES_RESOLVED: &str = "topoloader_branches_resolved_total";
const NODES_INSERTED: &str = "topoloader_nodes_inserted_total";
const CANDIDATES_REJECTED: &str = "topoloader_candidates_rejected_total";

/// Initialize metrics descriptions.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    metrics::describe_counter!(RESOLUTIONS, Unit::Count, "Resolutions by outcome");
    metrics::describe_histogram!(
        RESOLVE_TIME_NS,
        Unit::Nanoseconds,
        "Wall time of one resolution"
    );
    metrics::describe_counter!(
        BRANCHES_RESOLVED,
        Unit::Count,
        "Top-level branches connected"
    );
    metrics::describe_counter!(
        NODES_INSERTED,
        Unit::Count,
        "Transforms inserted by the resolver, by role"
    );
    metrics::describe_counter!(
        CANDIDATES_REJECTED,
        Unit::Count,
        "Codec candidates rolled back, by category"
    );
}

/// Record the outcome and duration of a resolution.
#[inline]
pub fn record_resolution(success: bool, duration: Duration) {
    let outcome = if success { "ok" } else { "error" };
    counter!(RESOLUTIONS, "outcome" => outcome).increment(1);
    histogram!(RESOLVE_TIME_NS).record(duration.as_nanos() as f64);
}

/// Record a resolved top-level branch.
#[inline]
pub fn record_branch_resolved() {
    counter!(BRANCHES_RESOLVED).increment(1);
}

/// Record a transform inserted by the resolver.
#[inline]
pub fn record_node_inserted(role: TransformRole) {
    let role = match role {
        TransformRole::Declared => "declared",
        TransformRole::Converter => "converter",
        TransformRole::Decoder => "decoder",
        TransformRole::Copier => "copier",
    };
    counter!(NODES_INSERTED, "role" => role).increment(1);
}

/// Record a codec candidate that was rolled back.
#[inline]
pub fn record_candidate_rejected(category: CodecCategory) {
    counter!(CANDIDATES_REJECTED, "category" => category.to_string()).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics() {
        // Should not panic
        init_metrics();
        // Should be idempotent
        init_metrics();
    }

    #[test]
    fn test_global_recording_functions() {
        // These should not panic even without a recorder installed
        record_resolution(true, Duration::from_micros(40));
        record_resolution(false, Duration::from_micros(40));
        record_branch_resolved();
        record_node_inserted(TransformRole::Decoder);
        record_candidate_rejected(CodecCategory::VideoProcessor);
    }
}
