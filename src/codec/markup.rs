//! Prose/markup codec (Markdown).
//!
//! Canonical content is the raw source text; Markdown structure is never
//! rewritten by this layer, so text-format round trips are byte-exact. The
//! codec's only structural concern is discovering inline `[label](target)`
//! links. Links whose destination starts with an external-URI prefix
//! (protocol schemes, mail links, in-document anchors) are not references
//! and are left untouched.

use std::ops::Range;

use pulldown_cmark::{Event as MdEvent, LinkType, Options, Parser as MdParser, Tag as MdTag};

use crate::{
    codec::DocCodec,
    error::InlayError,
    properties::{DocFormat, NodeContent, Reference, RefKind},
};

/// Destination prefixes that mark a link as external rather than a
/// document reference.
pub const EXTERNAL_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "ftp://", "tel:", "#"];

pub fn is_external(locator: &str) -> bool {
    EXTERNAL_PREFIXES.iter().any(|p| locator.starts_with(p))
}

fn markup_options() -> Options {
    let mut md_options = Options::empty();
    // Enabled explicitly rather than via all() for reproducibility.
    md_options.insert(Options::ENABLE_FOOTNOTES);
    md_options.insert(Options::ENABLE_STRIKETHROUGH);
    md_options.insert(Options::ENABLE_TABLES);
    md_options.insert(Options::ENABLE_TASKLISTS);
    md_options
}

/// One inline link occurrence: the byte range of the whole `[label](target)`
/// span in the source, its destination, and its accumulated label text.
#[derive(Debug, Clone)]
pub(crate) struct LinkSpan {
    pub range: Range<usize>,
    pub locator: String,
    pub label: String,
}

/// Scan text for inline links, in document order. External destinations are
/// filtered out here so callers only ever see reference candidates.
pub(crate) fn scan_inline_links(text: &str) -> Vec<LinkSpan> {
    let mut spans = Vec::new();
    let mut current: Option<LinkSpan> = None;
    for (event, range) in MdParser::new_ext(text, markup_options()).into_offset_iter() {
        match event {
            MdEvent::Start(MdTag::Link {
                link_type: LinkType::Inline,
                dest_url,
                ..
            }) => {
                if !is_external(&dest_url) {
                    current = Some(LinkSpan {
                        // The Start event's range covers the entire element.
                        range,
                        locator: dest_url.to_string(),
                        label: String::new(),
                    });
                }
            }
            MdEvent::Text(t) | MdEvent::Code(t) => {
                if let Some(span) = current.as_mut() {
                    span.label.push_str(&t);
                }
            }
            MdEvent::End(pulldown_cmark::TagEnd::Link) => {
                if let Some(span) = current.take() {
                    spans.push(span);
                }
            }
            _ => {}
        }
    }
    spans
}

#[derive(Debug, Default, Clone)]
pub struct MarkdownCodec;

impl DocCodec for MarkdownCodec {
    fn format(&self) -> DocFormat {
        DocFormat::Markdown
    }

    fn sniffs(&self, content: &str) -> bool {
        content.lines().any(|line| {
            let trimmed = line.trim_start();
            trimmed.starts_with('#') && trimmed.chars().nth(1).map(|c| c == ' ').unwrap_or(false)
        }) || !scan_inline_links(content).is_empty()
    }

    fn parse(
        &self,
        location: &str,
        raw: &str,
    ) -> Result<(NodeContent, Vec<Reference>), InlayError> {
        let refs: Vec<Reference> = scan_inline_links(raw)
            .into_iter()
            .map(|span| {
                Reference::new(RefKind::InlineLink, span.locator).with_label(span.label)
            })
            .collect();
        tracing::debug!("Parsed markup '{}': {} reference(s)", location, refs.len());
        Ok((NodeContent::Text(raw.to_string()), refs))
    }

    fn serialize(&self, content: &NodeContent) -> Result<String, InlayError> {
        match content {
            NodeContent::Text(text) => Ok(text.clone()),
            NodeContent::Structured(_) => Err(InlayError::Serialization(
                "markup surface cannot serialize structured content directly".to_string(),
            )),
        }
    }
}
