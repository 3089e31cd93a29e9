//! Depth-first network construction.
//!
//! The [`NetworkBuilder`] orchestrates codecs and the resolver into a
//! validated [`Network`]: parse a node, resolve its references, recurse into
//! children in reference discovery order, detect cycles, enforce depth and
//! size ceilings, and assemble the immutable result. Any abort-class failure
//! discards the partial network; unresolved references are warning
//! diagnostics and never abort.
//!
//! A builder instance is not reentrant; concurrent builds should use
//! separate instances. The completed [`Network`] is plain data and safe to
//! share.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    codec::CodecRegistry,
    error::{InlayError, SizeScope},
    network::{BuildDiagnostic, Network, NetworkStats},
    paths::normalize,
    properties::{ContentNode, DocFormat, NodeId},
    resolver::{RefResolver, StoreResolver},
    store::DocStore,
};

/// Hard resource ceilings checked during traversal.
///
/// There is no throttling or backpressure in the core; a violated ceiling
/// aborts the whole build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildLimits {
    /// Maximum traversal depth (root is depth 0). A chain exactly at the
    /// limit succeeds; one level deeper fails.
    pub max_depth: usize,
    /// Per-node content ceiling in bytes.
    pub max_node_bytes: u64,
    /// Network-wide node count ceiling.
    pub max_nodes: usize,
    /// Network-wide aggregate content ceiling in bytes.
    pub max_total_bytes: u64,
}

impl Default for BuildLimits {
    fn default() -> Self {
        BuildLimits {
            max_depth: 10,
            max_node_bytes: 10 * 1024 * 1024,
            max_nodes: 1000,
            max_total_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Per-node build lifecycle, tracked for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildState {
    Pending,
    Parsing,
    ResolvingChildren,
    Built,
    Failed,
}

/// Stateful, single-use-at-a-time network builder.
///
/// All collaborators are injected: the backing store, the codec registry,
/// the resolver, and the limits. Tests can swap any of them.
pub struct NetworkBuilder<'a> {
    store: &'a dyn DocStore,
    registry: CodecRegistry,
    resolver: Box<dyn RefResolver + 'a>,
    limits: BuildLimits,
    root_format: Option<DocFormat>,

    // Working state, reset per build() call.
    stack: Vec<NodeId>,
    nodes: BTreeMap<NodeId, ContentNode>,
    diagnostics: Vec<BuildDiagnostic>,
    stats: NetworkStats,
}

impl<'a> NetworkBuilder<'a> {
    pub fn new(store: &'a dyn DocStore) -> Self {
        NetworkBuilder {
            store,
            registry: CodecRegistry::default(),
            resolver: Box::new(StoreResolver),
            limits: BuildLimits::default(),
            root_format: None,
            stack: Vec::new(),
            nodes: BTreeMap::new(),
            diagnostics: Vec::new(),
            stats: NetworkStats::default(),
        }
    }

    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_resolver(mut self, resolver: impl RefResolver + 'a) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_limits(mut self, limits: BuildLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Explicit format override for the root document, bypassing extension
    /// detection and content sniffing.
    pub fn with_root_format(mut self, format: DocFormat) -> Self {
        self.root_format = Some(format);
        self
    }

    fn transition(&self, id: &NodeId, state: BuildState) {
        tracing::debug!("Node '{}' -> {:?}", id, state);
    }

    /// Build the network reachable from `root_path`.
    ///
    /// On any abort-class error the partial network is discarded; no
    /// half-built [`Network`] is ever returned.
    #[tracing::instrument(skip(self))]
    pub fn build(&mut self, root_path: &str) -> Result<Network, InlayError> {
        self.stack.clear();
        self.nodes = BTreeMap::new();
        self.diagnostics = Vec::new();
        self.stats = NetworkStats::default();

        let root_format = self.root_format;
        let root = match self.visit(normalize(root_path), 0, root_format) {
            Ok(root) => root,
            Err(e) => {
                self.nodes = BTreeMap::new();
                return Err(e);
            }
        };

        self.stats.node_count = self.nodes.len();
        if self.stats.node_count > self.limits.max_nodes {
            return Err(InlayError::SizeExceeded {
                scope: SizeScope::Network,
                path: root.to_string(),
                measured: self.stats.node_count as u64,
                limit: self.limits.max_nodes as u64,
            });
        }
        if self.stats.total_bytes > self.limits.max_total_bytes {
            return Err(InlayError::SizeExceeded {
                scope: SizeScope::Network,
                path: root.to_string(),
                measured: self.stats.total_bytes,
                limit: self.limits.max_total_bytes,
            });
        }

        tracing::debug!(
            "Built network from '{}': {} node(s), max depth {}, {} diagnostic(s)",
            root,
            self.stats.node_count,
            self.stats.max_depth,
            self.diagnostics.len()
        );
        Ok(Network::new(
            root,
            std::mem::take(&mut self.nodes),
            self.stats,
            std::mem::take(&mut self.diagnostics),
        ))
    }

    fn visit(
        &mut self,
        location: String,
        depth: usize,
        override_format: Option<DocFormat>,
    ) -> Result<NodeId, InlayError> {
        let id = NodeId::new(location.clone());
        self.transition(&id, BuildState::Pending);

        // A revisit of a node still on the traversal stack is a cycle. A
        // node reached again after being popped is a diamond and is reused.
        if self.stack.contains(&id) {
            let mut stack: Vec<String> = self.stack.iter().map(|n| n.to_string()).collect();
            stack.push(id.to_string());
            self.transition(&id, BuildState::Failed);
            return Err(InlayError::CycleDetected { stack });
        }
        if self.nodes.contains_key(&id) {
            tracing::debug!("Reusing already-built node '{}'", id);
            return Ok(id);
        }
        if depth > self.limits.max_depth {
            self.transition(&id, BuildState::Failed);
            return Err(InlayError::DepthExceeded {
                path: location,
                depth,
                limit: self.limits.max_depth,
            });
        }

        self.transition(&id, BuildState::Parsing);
        let raw = self.store.read_string(&location)?;
        let bytes = raw.len() as u64;
        if bytes > self.limits.max_node_bytes {
            self.transition(&id, BuildState::Failed);
            return Err(InlayError::SizeExceeded {
                scope: SizeScope::Node,
                path: location,
                measured: bytes,
                limit: self.limits.max_node_bytes,
            });
        }
        let codec = self.registry.detect(&location, &raw, override_format)?;
        let format = codec.format();
        let (content, mut references) = codec.parse(&location, &raw)?;

        self.transition(&id, BuildState::ResolvingChildren);
        self.stack.push(id.clone());
        for reference in references.iter_mut() {
            match self.resolver.resolve(self.store, reference, &id) {
                Some(target) => {
                    let child = self.visit(target, depth + 1, None)?;
                    reference.resolved = Some(child);
                }
                None => {
                    tracing::warn!(
                        "Unresolved {} reference '{}' in '{}'",
                        reference.kind,
                        reference.locator,
                        id
                    );
                    self.diagnostics.push(BuildDiagnostic::UnresolvedReference {
                        node: id.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }
        self.stack.pop();

        self.stats.max_depth = self.stats.max_depth.max(depth);
        self.stats.total_bytes += bytes;
        let mut metadata = BTreeMap::new();
        metadata.insert("bytes".to_string(), json!(bytes));
        metadata.insert("depth".to_string(), json!(depth));
        self.transition(&id, BuildState::Built);
        self.nodes.insert(
            id.clone(),
            ContentNode {
                id: id.clone(),
                format,
                content,
                references,
                metadata,
            },
        );
        Ok(id)
    }
}

/// Construction entrypoint with default registry, resolver, and limits.
pub fn build_network(store: &dyn DocStore, root_path: &str) -> Result<Network, InlayError> {
    NetworkBuilder::new(store).build(root_path)
}
