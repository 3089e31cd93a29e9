//! Node and reference value types.
//!
//! Everything here is plain data: created by the codecs and the builder while
//! a network is under construction, immutable once the
//! [`Network`](crate::network::Network) is handed to a caller.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::paths::extension;

/// Supported document formats.
///
/// Two structured families (JSON, YAML) whose canonical content is a nested
/// [`serde_json::Value`], and two text families (Markdown, template text)
/// whose canonical content is the raw source string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    Json,
    Yaml,
    Markdown,
    Template,
}

impl DocFormat {
    pub fn is_structured(&self) -> bool {
        matches!(self, DocFormat::Json | DocFormat::Yaml)
    }

    /// Extension-based detection. `None` when the extension is not claimed by
    /// any built-in format.
    pub fn from_location(location: &str) -> Option<DocFormat> {
        match extension(location)?.as_str() {
            "json" => Some(DocFormat::Json),
            "yaml" | "yml" => Some(DocFormat::Yaml),
            "md" | "markdown" => Some(DocFormat::Markdown),
            "tmpl" | "tpl" | "template" => Some(DocFormat::Template),
            _ => None,
        }
    }
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DocFormat::Json => "json",
            DocFormat::Yaml => "yaml",
            DocFormat::Markdown => "markdown",
            DocFormat::Template => "template",
        };
        write!(f, "{s}")
    }
}

/// Stable node identity: the canonical store location the node was built from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(location: impl Into<String>) -> Self {
        NodeId(location.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Which syntax produced a [`Reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RefKind {
    /// Markdown `[label](target)` inline link.
    InlineLink,
    /// `<!-- include: target -->` comment directive in template text.
    TemplateInclude,
    /// Single-reserved-key `{"$ref": "target"}` object in structured content.
    StructuredRef,
}

impl fmt::Display for RefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RefKind::InlineLink => "inline-link",
            RefKind::TemplateInclude => "template-include",
            RefKind::StructuredRef => "structured-ref",
        };
        write!(f, "{s}")
    }
}

/// A pointer from one node's content to another file.
///
/// Produced by a codec while parsing one node. The builder fills in
/// `resolved` once the target location has been canonicalized and recursed
/// into; `None` afterwards means the reference is explicitly unresolved and
/// was reported as a build diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// The locator as written in the source (path or opaque id).
    pub locator: String,
    pub kind: RefKind,
    /// Human-readable label, when the syntax carries one.
    pub label: Option<String>,
    /// Canonical identity of the target node, filled by the builder.
    pub resolved: Option<NodeId>,
}

impl Reference {
    pub fn new(kind: RefKind, locator: impl Into<String>) -> Self {
        Reference {
            locator: locator.into(),
            kind,
            label: None,
            resolved: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Canonical parsed content of one node.
///
/// Invariant: the variant matches the node's [`DocFormat`] tag — structured
/// formats parse to `Structured`, text formats to `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeContent {
    Text(String),
    Structured(Value),
}

impl NodeContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeContent::Text(s) => Some(s),
            NodeContent::Structured(_) => None,
        }
    }

    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            NodeContent::Structured(v) => Some(v),
            NodeContent::Text(_) => None,
        }
    }
}

/// One parsed file: canonical content plus its outgoing references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: NodeId,
    pub format: DocFormat,
    pub content: NodeContent,
    /// Outgoing references in source discovery order.
    pub references: Vec<Reference>,
    /// Arbitrary metadata. The builder records `bytes` and `depth`.
    pub metadata: BTreeMap<String, Value>,
}

impl ContentNode {
    /// References that failed to resolve during the build.
    pub fn unresolved(&self) -> impl Iterator<Item = &Reference> {
        self.references.iter().filter(|r| r.resolved.is_none())
    }
}
