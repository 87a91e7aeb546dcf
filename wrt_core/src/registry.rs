//! Namespace registry
//!
//! Maps namespace names to independent [`FrameGraph`]s. Namespaces are
//! created by their first write and never share frames: `world` in one
//! namespace is unrelated to `world` in another.

use std::sync::Arc;

use dashmap::DashMap;

use crate::config::WrtConfig;
use crate::error::{NameKind, WrtResult};
use crate::graph::{FrameGraph, GraphSnapshot};

/// Concurrent namespace-to-graph map
///
/// Lookups of existing namespaces only take a shard read lock; operations on
/// different namespaces never contend once their graphs are fetched.
pub struct NamespaceRegistry {
    graphs: DashMap<String, Arc<FrameGraph>>,
    config: Arc<WrtConfig>,
}

impl NamespaceRegistry {
    pub fn new(config: WrtConfig) -> Self {
        Self {
            graphs: DashMap::new(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &WrtConfig {
        &self.config
    }

    /// The graph of `namespace`, seeding it with `world` if absent
    ///
    /// Concurrent first calls for the same name all receive the same graph.
    pub fn get_or_create(&self, namespace: &str) -> WrtResult<Arc<FrameGraph>> {
        if let Some(graph) = self.graphs.get(namespace) {
            return Ok(Arc::clone(graph.value()));
        }

        self.config.name_policy.check(NameKind::Namespace, namespace)?;

        let graph = self
            .graphs
            .entry(namespace.to_string())
            .or_insert_with(|| {
                log::info!("Created namespace '{}'", namespace);
                Arc::new(FrameGraph::new(namespace, Arc::clone(&self.config)))
            })
            .value()
            .clone();
        Ok(graph)
    }

    /// The graph of `namespace` if it has been created
    pub fn get(&self, namespace: &str) -> Option<Arc<FrameGraph>> {
        self.graphs.get(namespace).map(|g| Arc::clone(g.value()))
    }

    /// Current snapshot of `namespace`, for reads
    ///
    /// An unknown namespace reads as a fresh tree holding only `world`; the
    /// namespace is not created.
    pub fn snapshot(&self, namespace: &str) -> WrtResult<Arc<GraphSnapshot>> {
        match self.graphs.get(namespace) {
            Some(graph) => Ok(graph.snapshot()),
            None => {
                self.config.name_policy.check(NameKind::Namespace, namespace)?;
                Ok(Arc::new(GraphSnapshot::seeded()))
            }
        }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.graphs.contains_key(namespace)
    }

    /// Names of all created namespaces, sorted
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.graphs.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new(WrtConfig::default())
    }
}

impl std::fmt::Debug for NamespaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NamespaceRegistry")
            .field("namespaces", &self.graphs.len())
            .field("config", &self.config)
            .finish()
    }
}
