//! Reference-inlining renderer.
//!
//! Walks a built [`Network`] from a chosen node and produces text in a
//! target format. Two modes:
//!
//! - **file-first**: no recursion; the node's own content, reformatted only
//!   if its declared format differs from the target, with every reference
//!   left as a pointer.
//! - **full**: every reachable reference is recursively substituted with the
//!   rendered content of its target, depth-first, memoized per render call.
//!
//! Substitution is polymorphic over the closed reference-syntax set via
//! [`RefStrategy`]; adding a new syntax means adding one implementation,
//! never touching the builder or the render pass. Strategies are applied in
//! a fixed order (template-include, inline-link, structured-ref) for
//! determinism. Rendering never raises on an unresolved reference unless
//! strict mode is enabled; the original token stays in the output and
//! build-time diagnostics provide visibility.

use std::collections::HashMap;

use serde_json::Value;

use crate::{
    codec::{
        markup::scan_inline_links, structured::as_ref_object, template::INCLUDE_RE, CodecRegistry,
        DocCodec,
    },
    error::InlayError,
    network::Network,
    properties::{ContentNode, DocFormat, NodeContent, NodeId, RefKind, Reference},
};

/// Render mode for [`render_network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Preserve references as pointers; zero recursion.
    FileFirst,
    /// Recursively inline every reachable reference.
    Full,
}

/// One reference-substitution syntax.
///
/// Each concrete strategy does real work in exactly one of the two process
/// methods; the other falls through to the identity default. This lets the
/// render pass apply every strategy to every node uniformly.
pub trait RefStrategy: Send + Sync {
    fn kind(&self) -> RefKind;

    /// Whether this strategy applies to the node's content shape.
    fn can_process(&self, node: &ContentNode) -> bool;

    fn process_text(
        &self,
        text: String,
        _node: &ContentNode,
        _pass: &mut RenderPass<'_>,
    ) -> Result<String, InlayError> {
        Ok(text)
    }

    fn process_structured(
        &self,
        value: Value,
        _node: &ContentNode,
        _pass: &mut RenderPass<'_>,
    ) -> Result<Value, InlayError> {
        Ok(value)
    }
}

fn reference_for<'n>(node: &'n ContentNode, kind: RefKind, locator: &str) -> Option<&'n Reference> {
    node.references
        .iter()
        .find(|r| r.kind == kind && r.locator == locator)
}

/// Replaces `<!-- include: path -->` directives with rendered child content.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateIncludeStrategy;

impl RefStrategy for TemplateIncludeStrategy {
    fn kind(&self) -> RefKind {
        RefKind::TemplateInclude
    }

    fn can_process(&self, node: &ContentNode) -> bool {
        matches!(node.content, NodeContent::Text(_))
    }

    fn process_text(
        &self,
        mut text: String,
        node: &ContentNode,
        pass: &mut RenderPass<'_>,
    ) -> Result<String, InlayError> {
        let mut replacements = Vec::new();
        for caps in INCLUDE_RE.captures_iter(&text) {
            let whole = caps.get(0).expect("capture 0 is the whole match");
            let locator = &caps[1];
            let Some(reference) = reference_for(node, RefKind::TemplateInclude, locator) else {
                continue;
            };
            match &reference.resolved {
                Some(target) => {
                    let target = target.clone();
                    replacements.push((whole.range(), target));
                }
                // Unresolved directives pass through unchanged; they were
                // already surfaced as build-time diagnostics.
                None => pass.check_strict(node, reference)?,
            }
        }
        for (range, target) in replacements.into_iter().rev() {
            let rendered = pass.rendered_text(&target)?;
            text.replace_range(range, &rendered);
        }
        Ok(text)
    }
}

/// Replaces non-external `[label](target)` links with rendered child content.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineLinkStrategy;

impl RefStrategy for InlineLinkStrategy {
    fn kind(&self) -> RefKind {
        RefKind::InlineLink
    }

    fn can_process(&self, node: &ContentNode) -> bool {
        matches!(node.content, NodeContent::Text(_))
    }

    fn process_text(
        &self,
        mut text: String,
        node: &ContentNode,
        pass: &mut RenderPass<'_>,
    ) -> Result<String, InlayError> {
        let mut replacements = Vec::new();
        // External matches never produced a Reference, so the lookup fails
        // and the text is left untouched.
        for span in scan_inline_links(&text) {
            let Some(reference) = reference_for(node, RefKind::InlineLink, &span.locator) else {
                continue;
            };
            match &reference.resolved {
                Some(target) => replacements.push((span.range, target.clone())),
                None => pass.check_strict(node, reference)?,
            }
        }
        for (range, target) in replacements.into_iter().rev() {
            let rendered = pass.rendered_text(&target)?;
            text.replace_range(range, &rendered);
        }
        Ok(text)
    }
}

/// Replaces single-reserved-key `$ref` objects in structured content with
/// the rendered value of their resolved target, at unbounded nesting depth.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredRefStrategy;

impl StructuredRefStrategy {
    fn walk(
        &self,
        value: Value,
        node: &ContentNode,
        pass: &mut RenderPass<'_>,
    ) -> Result<Value, InlayError> {
        if let Some(locator) = as_ref_object(&value) {
            let locator = locator.to_string();
            if let Some(reference) = reference_for(node, RefKind::StructuredRef, &locator) {
                match &reference.resolved {
                    Some(target) => {
                        let target = target.clone();
                        let target_format = pass
                            .network()
                            .node(&target)
                            .map(|n| n.format)
                            .ok_or_else(|| {
                                InlayError::NotFound(format!(
                                    "Resolved reference target '{target}' missing from network"
                                ))
                            })?;
                        // Structured targets splice in as structured values;
                        // text targets splice in as strings.
                        return if target_format.is_structured() {
                            pass.rendered_value(&target)
                        } else {
                            Ok(Value::String(pass.rendered_text(&target)?))
                        };
                    }
                    None => pass.check_strict(node, reference)?,
                }
            }
            return Ok(value);
        }
        match value {
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, child) in map {
                    out.insert(key, self.walk(child, node, pass)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .into_iter()
                .map(|child| self.walk(child, node, pass))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other),
        }
    }
}

impl RefStrategy for StructuredRefStrategy {
    fn kind(&self) -> RefKind {
        RefKind::StructuredRef
    }

    fn can_process(&self, node: &ContentNode) -> bool {
        matches!(node.content, NodeContent::Structured(_))
    }

    fn process_structured(
        &self,
        value: Value,
        node: &ContentNode,
        pass: &mut RenderPass<'_>,
    ) -> Result<Value, InlayError> {
        self.walk(value, node, pass)
    }
}

/// Configured renderer. Reusable across render calls; per-call state lives
/// in [`RenderPass`].
pub struct Renderer {
    registry: CodecRegistry,
    strategies: Vec<Box<dyn RefStrategy>>,
    strict: bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Renderer {
            registry: CodecRegistry::default(),
            // Fixed application order for determinism.
            strategies: vec![
                Box::new(TemplateIncludeStrategy),
                Box::new(InlineLinkStrategy),
                Box::new(StructuredRefStrategy),
            ],
            strict: false,
        }
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Promote unresolved references to fatal errors at render time.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn codec(&self, format: DocFormat) -> Result<&dyn DocCodec, InlayError> {
        self.registry.for_format(format).ok_or_else(|| {
            InlayError::NotFound(format!("No codec registered for format '{format}'"))
        })
    }

    /// Render `node` out of `network` into `target_format`.
    #[tracing::instrument(skip(self, network))]
    pub fn render(
        &self,
        network: &Network,
        node_id: &NodeId,
        target_format: DocFormat,
        mode: RenderMode,
    ) -> Result<String, InlayError> {
        let node = network.node(node_id).ok_or_else(|| {
            InlayError::NotFound(format!("Node '{node_id}' not present in network"))
        })?;
        match mode {
            RenderMode::FileFirst => self.file_first(node, target_format),
            RenderMode::Full => {
                let mut pass = RenderPass::new(self, network, target_format);
                match (&node.content, target_format.is_structured()) {
                    (NodeContent::Structured(_), true) => {
                        let value = pass.rendered_value(node_id)?;
                        self.codec(target_format)?
                            .serialize(&NodeContent::Structured(value))
                    }
                    (NodeContent::Text(_), true) => {
                        let text = pass.rendered_text(node_id)?;
                        self.codec(target_format)?.serialize(&NodeContent::Text(text))
                    }
                    _ => pass.rendered_text(node_id),
                }
            }
        }
    }

    /// File-first: the node's own content, references untouched. Fast path
    /// when the declared format already matches the target.
    fn file_first(&self, node: &ContentNode, target: DocFormat) -> Result<String, InlayError> {
        if node.format == target {
            return self.codec(target)?.serialize(&node.content);
        }
        match (&node.content, target.is_structured()) {
            // Structured value into the other structured surface.
            (NodeContent::Structured(_), true) => self.codec(target)?.serialize(&node.content),
            // Structured value into a text target: the node's own canonical
            // surface text.
            (NodeContent::Structured(_), false) => {
                self.codec(node.format)?.serialize(&node.content)
            }
            // Text into a structured target: a string value in the target
            // surface.
            (NodeContent::Text(_), true) => self.codec(target)?.serialize(&node.content),
            // Text into the other text surface: emitted unmodified.
            (NodeContent::Text(text), false) => Ok(text.clone()),
        }
    }
}

/// Per-call render state: the network under render, the target format, and
/// memo tables so a diamond-shared node is rendered once per call and
/// spliced at each call site. No state survives across render calls.
pub struct RenderPass<'r> {
    renderer: &'r Renderer,
    network: &'r Network,
    target: DocFormat,
    text_memo: HashMap<NodeId, String>,
    value_memo: HashMap<NodeId, Value>,
}

impl<'r> RenderPass<'r> {
    fn new(renderer: &'r Renderer, network: &'r Network, target: DocFormat) -> Self {
        RenderPass {
            renderer,
            network,
            target,
            text_memo: HashMap::new(),
            value_memo: HashMap::new(),
        }
    }

    pub fn network(&self) -> &'r Network {
        self.network
    }

    pub fn target(&self) -> DocFormat {
        self.target
    }

    /// Error in strict mode, no-op otherwise.
    pub fn check_strict(
        &self,
        node: &ContentNode,
        reference: &Reference,
    ) -> Result<(), InlayError> {
        if self.renderer.strict {
            Err(InlayError::UnresolvedReference {
                locator: reference.locator.clone(),
                node: node.id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Fully render a node to text, applying every applicable strategy.
    pub fn rendered_text(&mut self, id: &NodeId) -> Result<String, InlayError> {
        if let Some(hit) = self.text_memo.get(id) {
            return Ok(hit.clone());
        }
        let network = self.network;
        let node = network.node(id).ok_or_else(|| {
            InlayError::NotFound(format!("Node '{id}' not present in network"))
        })?;
        let out = match &node.content {
            NodeContent::Text(text) => {
                let renderer = self.renderer;
                let mut text = text.clone();
                for strategy in &renderer.strategies {
                    if strategy.can_process(node) {
                        text = strategy.process_text(text, node, self)?;
                    }
                }
                text
            }
            NodeContent::Structured(_) => {
                // A structured node inlined into text renders through its
                // own surface unless the whole render targets a structured
                // format, in which case the target surface applies.
                let value = self.rendered_value(id)?;
                let surface = if self.target.is_structured() {
                    self.target
                } else {
                    node.format
                };
                self.renderer
                    .codec(surface)?
                    .serialize(&NodeContent::Structured(value))?
            }
        };
        self.text_memo.insert(id.clone(), out.clone());
        Ok(out)
    }

    /// Fully render a node to a structured value.
    pub fn rendered_value(&mut self, id: &NodeId) -> Result<Value, InlayError> {
        if let Some(hit) = self.value_memo.get(id) {
            return Ok(hit.clone());
        }
        let network = self.network;
        let node = network.node(id).ok_or_else(|| {
            InlayError::NotFound(format!("Node '{id}' not present in network"))
        })?;
        let out = match &node.content {
            NodeContent::Structured(value) => {
                let renderer = self.renderer;
                let mut value = value.clone();
                for strategy in &renderer.strategies {
                    if strategy.can_process(node) {
                        value = strategy.process_structured(value, node, self)?;
                    }
                }
                value
            }
            NodeContent::Text(_) => Value::String(self.rendered_text(id)?),
        };
        self.value_memo.insert(id.clone(), out.clone());
        Ok(out)
    }
}

/// Render entrypoint: render the network's root node.
pub fn render_network(
    network: &Network,
    target_format: DocFormat,
    mode: RenderMode,
) -> Result<String, InlayError> {
    Renderer::default().render(network, &network.root, target_format, mode)
}
