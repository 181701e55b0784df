//! Loader configuration.

use crate::observability::TracingConfig;
use crate::topology::ConnectPolicy;

/// Configuration for [`TopologyLoader`](super::TopologyLoader).
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Policy for downstream nodes that carry none.
    pub default_policy: ConnectPolicy,
    /// Try every format of a source stream, not only its current one.
    pub enumerate_source_types: bool,
    /// Insert copiers where an output and its upstream disagree on memory domain.
    pub insert_copiers: bool,
    /// Upper bound on nodes in the output topology.
    pub max_nodes: Option<usize>,
    /// Span configuration.
    pub tracing: TracingConfig,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_policy: ConnectPolicy::ALLOW_DECODER,
            enumerate_source_types: false,
            insert_copiers: true,
            max_nodes: None,
            tracing: TracingConfig::default(),
        }
    }
}

impl LoaderConfig {
    /// Set the default connection policy.
    pub fn with_default_policy(mut self, policy: ConnectPolicy) -> Self {
        self.default_policy = policy;
        self
    }

    /// Enable or disable source format enumeration.
    pub fn with_enumerate_source_types(mut self, enabled: bool) -> Self {
        self.enumerate_source_types = enabled;
        self
    }

    /// Enable or disable copier insertion.
    pub fn with_insert_copiers(mut self, enabled: bool) -> Self {
        self.insert_copiers = enabled;
        self
    }

    /// Limit the number of nodes in the output topology.
    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = Some(max);
        self
    }

    /// Set the tracing configuration.
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoaderConfig::default();
        assert_eq!(config.default_policy, ConnectPolicy::ALLOW_DECODER);
        assert!(!config.enumerate_source_types);
        assert!(config.insert_copiers);
        assert_eq!(config.max_nodes, None);
    }

    #[test]
    fn test_builders() {
        let config = LoaderConfig::default()
            .with_default_policy(ConnectPolicy::DIRECT)
            .with_enumerate_source_types(true)
            .with_insert_copiers(false)
            .with_max_nodes(8)
            .with_tracing(TracingConfig::none());
        assert_eq!(config.default_policy, ConnectPolicy::DIRECT);
        assert!(config.enumerate_source_types);
        assert!(!config.insert_copiers);
        assert_eq!(config.max_nodes, Some(8));
        assert!(!config.tracing.resolve_spans);
    }
}
