//! Rendering tests: file-first vs full mode, cross-format serialization,
//! strategy behavior, and graceful degradation on unresolved references.

use serde_json::json;
use test_log::test;

use inlay_core::{
    build_network,
    properties::DocFormat,
    render::{render_network, RenderMode},
    store::MemStore,
    InlayError, Renderer,
};

#[test]
fn test_markup_full_and_file_first() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with("a.md", "Intro: [b](b.md)")
        .with("b.md", "hello");
    let network = build_network(&store, "a.md")?;
    assert_eq!(network.len(), 2);

    let full = render_network(&network, DocFormat::Markdown, RenderMode::Full)?;
    assert_eq!(full, "Intro: hello");

    let file_first = render_network(&network, DocFormat::Markdown, RenderMode::FileFirst)?;
    assert_eq!(file_first, "Intro: [b](b.md)");
    Ok(())
}

#[test]
fn test_structured_full_render() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with("a.yaml", "child:\n  $ref: b.yaml\n")
        .with("b.yaml", "value: 1\n");
    let network = build_network(&store, "a.yaml")?;

    let yaml_out = render_network(&network, DocFormat::Yaml, RenderMode::Full)?;
    let reparsed: serde_json::Value = serde_yaml::from_str(&yaml_out).unwrap();
    assert_eq!(reparsed, json!({"child": {"value": 1}}));

    let json_out = render_network(&network, DocFormat::Json, RenderMode::Full)?;
    let reparsed: serde_json::Value = serde_json::from_str(&json_out).unwrap();
    assert_eq!(reparsed, json!({"child": {"value": 1}}));
    Ok(())
}

#[test]
fn test_file_first_idempotence() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with("a.md", "[b](b.md) and [site](https://example.com)")
        .with("b.md", "content");
    let network = build_network(&store, "a.md")?;
    let first = render_network(&network, DocFormat::Markdown, RenderMode::FileFirst)?;
    let second = render_network(&network, DocFormat::Markdown, RenderMode::FileFirst)?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_diamond_inlines_at_each_call_site() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with("root.md", "[l](left.md)\n\n[r](right.md)")
        .with("left.md", "L: [s](shared.md)")
        .with("right.md", "R: [s](shared.md)")
        .with("shared.md", "SHARED");
    let network = build_network(&store, "root.md")?;
    assert_eq!(network.len(), 4);

    let full = render_network(&network, DocFormat::Markdown, RenderMode::Full)?;
    assert_eq!(full.matches("SHARED").count(), 2);
    assert_eq!(full, "L: SHARED\n\nR: SHARED");
    Ok(())
}

#[test]
fn test_template_include_render() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with(
            "page.tmpl",
            "<header>{{title}}</header>\n<!-- include: body.md -->\n<footer/>",
        )
        .with("body.md", "Body text.");
    let network = build_network(&store, "page.tmpl")?;

    let full = render_network(&network, DocFormat::Template, RenderMode::Full)?;
    assert_eq!(full, "<header>{{title}}</header>\nBody text.\n<footer/>");

    // Variable placeholders survive untouched for the substitution layer.
    assert!(full.contains("{{title}}"));
    Ok(())
}

#[test]
fn test_unresolved_reference_degrades_gracefully() -> Result<(), InlayError> {
    let store = MemStore::new().with("a.md", "[gone](missing.md)");
    let network = build_network(&store, "a.md")?;
    assert_eq!(network.diagnostics.len(), 1);

    // Non-strict: the original token stays in the output.
    let full = render_network(&network, DocFormat::Markdown, RenderMode::Full)?;
    assert_eq!(full, "[gone](missing.md)");

    // Strict: promoted to a fatal error.
    let err = Renderer::new()
        .strict(true)
        .render(&network, &network.root, DocFormat::Markdown, RenderMode::Full)
        .unwrap_err();
    match err {
        InlayError::UnresolvedReference { locator, node } => {
            assert_eq!(locator, "missing.md");
            assert_eq!(node, "a.md");
        }
        other => panic!("expected UnresolvedReference, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_external_links_never_substituted() -> Result<(), InlayError> {
    let store = MemStore::new().with("a.md", "[site](https://example.com) [anchor](#top)");
    let network = build_network(&store, "a.md")?;
    assert!(network.diagnostics.is_empty());
    let full = render_network(&network, DocFormat::Markdown, RenderMode::Full)?;
    assert_eq!(full, "[site](https://example.com) [anchor](#top)");
    Ok(())
}

#[test]
fn test_cross_format_file_first() -> Result<(), InlayError> {
    let store = MemStore::new().with("a.yaml", "value: 1\n");
    let network = build_network(&store, "a.yaml")?;

    // Structured node into the other structured surface.
    let json_out = render_network(&network, DocFormat::Json, RenderMode::FileFirst)?;
    let reparsed: serde_json::Value = serde_json::from_str(&json_out).unwrap();
    assert_eq!(reparsed, json!({"value": 1}));

    // Structured node into a text target: its own canonical surface.
    let md_out = render_network(&network, DocFormat::Markdown, RenderMode::FileFirst)?;
    let reparsed: serde_json::Value = serde_yaml::from_str(&md_out).unwrap();
    assert_eq!(reparsed, json!({"value": 1}));
    Ok(())
}

#[test]
fn test_structured_ref_to_text_target_inlines_as_string() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with("a.json", r#"{"prose": {"$ref": "b.md"}}"#)
        .with("b.md", "plain text");
    let network = build_network(&store, "a.json")?;
    let out = render_network(&network, DocFormat::Json, RenderMode::Full)?;
    let reparsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(reparsed, json!({"prose": "plain text"}));
    Ok(())
}

#[test]
fn test_text_root_into_structured_target() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with("a.md", "before [b](b.md) after")
        .with("b.md", "MID");
    let network = build_network(&store, "a.md")?;
    let out = render_network(&network, DocFormat::Json, RenderMode::Full)?;
    let reparsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(reparsed, json!("before MID after"));
    Ok(())
}

#[test]
fn test_nested_inline_chain() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with("a.md", "A[b](b.md)")
        .with("b.md", "B[c](c.md)")
        .with("c.md", "C");
    let network = build_network(&store, "a.md")?;
    let full = render_network(&network, DocFormat::Markdown, RenderMode::Full)?;
    assert_eq!(full, "ABC");
    Ok(())
}
