//! Tracing integration for structured logging and spans.

use crate::resolve::Branch;
use tracing::{Level, Span, span};

/// Configuration for tracing behavior.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Whether to create a span per resolution.
    pub resolve_spans: bool,
    /// Whether to create a span per top-level branch.
    pub branch_spans: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            resolve_spans: true,
            branch_spans: false, // One per connection, noisy on large graphs
        }
    }
}

impl TracingConfig {
    /// Create a new tracing config with all spans enabled.
    pub fn all() -> Self {
        Self {
            resolve_spans: true,
            branch_spans: true,
        }
    }

    /// Disable all spans.
    pub fn none() -> Self {
        Self {
            resolve_spans: false,
            branch_spans: false,
        }
    }

    pub(crate) fn enter_resolve(&self, nodes: usize) -> Option<tracing::span::EnteredSpan> {
        self.resolve_spans.then(|| span_resolve(nodes).entered())
    }

    pub(crate) fn enter_branch(&self, branch: &Branch) -> Option<tracing::span::EnteredSpan> {
        self.branch_spans.then(|| span_branch(branch).entered())
    }
}

/// Create a span for one resolution.
///
/// # Example
///
/// ```rust,ignore
/// use topoloader::observability::span_resolve;
///
/// let span = span_resolve(input.node_count());
/// let _guard = span.enter();
/// ```
#[inline]
pub fn span_resolve(nodes: usize) -> Span {
    span!(Level::INFO, "resolve", nodes = nodes)
}

/// Create a span for one top-level branch.
#[inline]
pub fn span_branch(branch: &Branch) -> Span {
    span!(
        Level::DEBUG,
        "branch",
        upstream = %branch.upstream,
        downstream = %branch.downstream
    )
}
