//! Format-aware parsing of source documents into [`ContentNode`] material.
//!
//! One codec per supported format family:
//!
//! - **Structured** (`.json`, `.yaml`) — via [`structured::JsonCodec`] and
//!   [`structured::YamlCodec`]; recognizes the reserved-key reference object
//!   `{"$ref": "path"}` at any nesting depth.
//! - **Markup** (`.md`) — via [`markup::MarkdownCodec`]; recognizes inline
//!   `[label](target)` links, filtering external URIs.
//! - **Template** (`.tmpl`) — via [`template::TemplateCodec`]; recognizes
//!   `<!-- include: path -->` directives and treats all other template
//!   syntax as opaque.
//!
//! Codecs are side-effect-free: they parse the single input they are given
//! and extract references, nothing else.
//!
//! The [`CodecRegistry`] is an explicit, constructed-once, immutable list
//! injected into the [`NetworkBuilder`](crate::builder::NetworkBuilder).
//! Tests can inject a reduced registry; there is no ambient global codec
//! state. Detection precedence is: explicit override, then extension, then
//! content sniffing. When two codecs claim the same file the first
//! registered wins and the conflict is logged as a warning, never a hard
//! failure.

use crate::{
    error::InlayError,
    properties::{DocFormat, NodeContent, Reference},
};

pub mod markup;
pub mod structured;
pub mod template;

pub use markup::MarkdownCodec;
pub use structured::{JsonCodec, YamlCodec, RESERVED_REF_KEY};
pub use template::TemplateCodec;

/// A parser for one document format family.
pub trait DocCodec: Send + Sync {
    /// The format tag this codec produces.
    fn format(&self) -> DocFormat;

    /// Extension-based claim on a store location.
    fn claims_extension(&self, location: &str) -> bool {
        DocFormat::from_location(location) == Some(self.format())
    }

    /// Content-sniffing claim, used only when no extension claim succeeds.
    fn sniffs(&self, content: &str) -> bool;

    /// Parse raw input into canonical content plus the outgoing references
    /// discovered in it, in document order.
    fn parse(
        &self,
        location: &str,
        raw: &str,
    ) -> Result<(NodeContent, Vec<Reference>), InlayError>;

    /// Serialize canonical content into this format's textual surface syntax.
    fn serialize(&self, content: &NodeContent) -> Result<String, InlayError>;
}

impl std::fmt::Debug for dyn DocCodec + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocCodec({})", self.format())
    }
}

/// Immutable, ordered codec list.
pub struct CodecRegistry {
    codecs: Vec<Box<dyn DocCodec>>,
}

impl Default for CodecRegistry {
    /// The built-in registry: JSON, YAML, Markdown, template, in that
    /// registration order.
    fn default() -> Self {
        CodecRegistry {
            codecs: vec![
                Box::new(JsonCodec),
                Box::new(YamlCodec),
                Box::new(MarkdownCodec::default()),
                Box::new(TemplateCodec::default()),
            ],
        }
    }
}

impl CodecRegistry {
    /// A registry with an explicit codec list, for tests or embedders that
    /// want a reduced or extended format set.
    pub fn new(codecs: Vec<Box<dyn DocCodec>>) -> Self {
        CodecRegistry { codecs }
    }

    pub fn for_format(&self, format: DocFormat) -> Option<&dyn DocCodec> {
        self.codecs
            .iter()
            .find(|c| c.format() == format)
            .map(|c| c.as_ref())
    }

    /// Detect the codec responsible for `location`/`content`.
    ///
    /// Precedence: explicit `override_format`, then extension claims, then
    /// content sniffing. Multiple claims at the same precedence level are
    /// logged as a warning and the first registered codec wins.
    pub fn detect(
        &self,
        location: &str,
        content: &str,
        override_format: Option<DocFormat>,
    ) -> Result<&dyn DocCodec, InlayError> {
        if let Some(format) = override_format {
            return self.for_format(format).ok_or_else(|| {
                InlayError::NotFound(format!("No codec registered for format '{format}'"))
            });
        }

        let by_extension: Vec<&dyn DocCodec> = self
            .codecs
            .iter()
            .filter(|c| c.claims_extension(location))
            .map(|c| c.as_ref())
            .collect();
        if let Some(first) = by_extension.first() {
            if by_extension.len() > 1 {
                tracing::warn!(
                    "Multiple codecs claim '{}' by extension ({}); using first registered '{}'",
                    location,
                    by_extension
                        .iter()
                        .map(|c| c.format().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                    first.format()
                );
            }
            return Ok(*first);
        }

        let by_sniff: Vec<&dyn DocCodec> = self
            .codecs
            .iter()
            .filter(|c| c.sniffs(content))
            .map(|c| c.as_ref())
            .collect();
        if let Some(first) = by_sniff.first() {
            if by_sniff.len() > 1 {
                tracing::warn!(
                    "Multiple codecs claim '{}' by content ({}); using first registered '{}'",
                    location,
                    by_sniff
                        .iter()
                        .map(|c| c.format().to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                    first.format()
                );
            }
            return Ok(*first);
        }

        Err(InlayError::UnknownFormat {
            path: location.to_string(),
        })
    }
}
