use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use serde_yaml::Error as YamlError;
use thiserror::Error;

/// Which scope a [`InlayError::SizeExceeded`] was measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeScope {
    /// A single node's content exceeded the per-node ceiling.
    Node,
    /// The aggregate network (node count or total bytes) exceeded its ceiling.
    Network,
}

impl fmt::Display for SizeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeScope::Node => write!(f, "node"),
            SizeScope::Network => write!(f, "network"),
        }
    }
}

/// Crate-wide error type.
///
/// The abort-class variants (`Parse`, `CycleDetected`, `DepthExceeded`,
/// `SizeExceeded`, `UnknownFormat`) carry enough context that a human can
/// locate and fix the offending file without re-running with extra verbosity.
/// Unresolved references are deliberately NOT represented here at build time;
/// they surface as warning diagnostics on the [`Network`](crate::network::Network)
/// and only become [`InlayError::UnresolvedReference`] when a renderer runs in
/// strict mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum InlayError {
    #[error("Parse error in '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Cycle detected: {}", stack.join(" -> "))]
    CycleDetected { stack: Vec<String> },

    #[error("Depth limit exceeded at '{path}': attempted depth {depth}, limit {limit}")]
    DepthExceeded {
        path: String,
        depth: usize,
        limit: usize,
    },

    #[error("Size limit exceeded ({scope} scope) at '{path}': measured {measured}, limit {limit}")]
    SizeExceeded {
        scope: SizeScope,
        path: String,
        measured: u64,
        limit: u64,
    },

    #[error("No codec claims '{path}' and no format override was supplied")]
    UnknownFormat { path: String },

    #[error("Unresolved reference '{locator}' in '{node}'")]
    UnresolvedReference { locator: String, node: String },

    #[error("File system error: {0}")]
    Io(String),

    #[error("Item not found: {0}")]
    NotFound(String),

    #[error("(De)serialization error: {0}")]
    Serialization(String),
}

impl InlayError {
    pub(crate) fn parse(path: impl Into<String>, message: impl Into<String>) -> Self {
        InlayError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether this error aborts a `build_network` call.
    pub fn is_abort(&self) -> bool {
        !matches!(self, InlayError::UnresolvedReference { .. })
    }
}

impl From<io::Error> for InlayError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => InlayError::NotFound(format!("{x}")),
            _ => InlayError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<JsonError> for InlayError {
    fn from(src: JsonError) -> Self {
        InlayError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<YamlError> for InlayError {
    fn from(src: YamlError) -> Self {
        InlayError::Serialization(format!("YAML (de)serialization error: {src}"))
    }
}

impl From<regex::Error> for InlayError {
    fn from(src: regex::Error) -> Self {
        InlayError::Serialization(format!("Regex parse failed: {src}"))
    }
}

impl From<fmt::Error> for InlayError {
    fn from(x: fmt::Error) -> Self {
        InlayError::Serialization(format!("{x}"))
    }
}
