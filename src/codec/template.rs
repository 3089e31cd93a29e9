//! Template codec.
//!
//! Canonical content is the raw template text. The only syntax this layer
//! understands is the comment-style include directive:
//!
//! ```text
//! <!-- include: partials/header.md -->
//! ```
//!
//! Everything else — `{{name}}` variable placeholders, conditionals, loops —
//! is opaque here and flows through untouched. Variable substitution happens
//! in a collaborator layered above the renderer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    codec::DocCodec,
    error::InlayError,
    properties::{DocFormat, NodeContent, Reference, RefKind},
};

/// Matches `<!-- include: path -->`, capturing the path.
pub(crate) static INCLUDE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<!--\s*include:\s*([^\s>][^>]*?)\s*-->").expect("include directive regex is valid")
});

#[derive(Debug, Default, Clone)]
pub struct TemplateCodec;

impl DocCodec for TemplateCodec {
    fn format(&self) -> DocFormat {
        DocFormat::Template
    }

    fn sniffs(&self, content: &str) -> bool {
        INCLUDE_RE.is_match(content) || content.contains("{{")
    }

    fn parse(
        &self,
        location: &str,
        raw: &str,
    ) -> Result<(NodeContent, Vec<Reference>), InlayError> {
        let refs: Vec<Reference> = INCLUDE_RE
            .captures_iter(raw)
            .map(|caps| Reference::new(RefKind::TemplateInclude, caps[1].to_string()))
            .collect();
        tracing::debug!(
            "Parsed template '{}': {} include directive(s)",
            location,
            refs.len()
        );
        Ok((NodeContent::Text(raw.to_string()), refs))
    }

    fn serialize(&self, content: &NodeContent) -> Result<String, InlayError> {
        match content {
            NodeContent::Text(text) => Ok(text.clone()),
            NodeContent::Structured(_) => Err(InlayError::Serialization(
                "template surface cannot serialize structured content directly".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_include_extraction_order() {
        let raw = "<!-- include: b.tmpl -->\nmiddle\n<!--include:c.md-->\n";
        let (_, refs) = TemplateCodec.parse("a.tmpl", raw).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].locator, "b.tmpl");
        assert_eq!(refs[1].locator, "c.md");
        assert_eq!(refs[0].kind, RefKind::TemplateInclude);
    }

    #[test]
    fn test_variables_are_opaque() {
        let raw = "Hello {{name}}, welcome to {{place}}.";
        let (content, refs) = TemplateCodec.parse("a.tmpl", raw).unwrap();
        assert!(refs.is_empty());
        assert_eq!(content.as_text(), Some(raw));
    }

    #[test]
    fn test_round_trip_exact() {
        let raw = "{{greeting}}\n<!-- a plain comment -->\n";
        let (content, refs) = TemplateCodec.parse("a.tmpl", raw).unwrap();
        assert!(refs.is_empty());
        assert_eq!(TemplateCodec.serialize(&content).unwrap(), raw);
    }
}
