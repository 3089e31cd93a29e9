//! The built document network.
//!
//! A [`Network`] is the output of a successful
//! [`build_network`](crate::builder::build_network) call: an identity-indexed
//! arena of [`ContentNode`]s reachable from one root, plus build statistics
//! and warning-level diagnostics. Nodes refer to each other only by
//! [`NodeId`], never by pointer, so a completed network is plain data and
//! safe to read concurrently from multiple call sites.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::properties::{ContentNode, NodeId, Reference};

/// Aggregate build statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStats {
    /// Number of distinct nodes in the network.
    pub node_count: usize,
    /// Deepest traversal depth reached (root is depth 0).
    pub max_depth: usize,
    /// Sum of node content sizes in bytes.
    pub total_bytes: u64,
}

/// Warning-level diagnostics attached to a built network.
///
/// These never abort a build. Unresolved references are the common case:
/// they stay in the network as explicit `resolved: None` references and are
/// reported here so callers get visibility without re-running.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BuildDiagnostic {
    /// A reference whose target could not be resolved to a store location.
    UnresolvedReference {
        /// The node containing the reference.
        node: NodeId,
        reference: Reference,
    },
    Warning(String),
}

impl fmt::Display for BuildDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildDiagnostic::UnresolvedReference { node, reference } => write!(
                f,
                "Unresolved {} reference '{}' in '{}'",
                reference.kind, reference.locator, node
            ),
            BuildDiagnostic::Warning(msg) => write!(f, "Warning: {msg}"),
        }
    }
}

/// The complete, validated-acyclic set of nodes reachable from a root.
///
/// Built once by [`NetworkBuilder`](crate::builder::NetworkBuilder); read-only
/// to every downstream consumer. Every resolved in-network [`Reference`]
/// points at a key present in `nodes`; every unresolved one appears in
/// `diagnostics`. No traversal path from the root revisits a node already on
/// that path (diamonds are deduplicated into a single arena entry).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub root: NodeId,
    nodes: BTreeMap<NodeId, ContentNode>,
    pub stats: NetworkStats,
    pub diagnostics: Vec<BuildDiagnostic>,
}

impl Network {
    pub(crate) fn new(
        root: NodeId,
        nodes: BTreeMap<NodeId, ContentNode>,
        stats: NetworkStats,
        diagnostics: Vec<BuildDiagnostic>,
    ) -> Self {
        Network {
            root,
            nodes,
            stats,
            diagnostics,
        }
    }

    pub fn node(&self, id: &NodeId) -> Option<&ContentNode> {
        self.nodes.get(id)
    }

    /// The root node. Always present in a successfully built network.
    pub fn root_node(&self) -> &ContentNode {
        self.nodes
            .get(&self.root)
            .expect("a built Network always contains its root node")
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Deterministic (identity-ordered) iteration over all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &ContentNode)> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
