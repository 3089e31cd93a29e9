//! End-to-end network construction tests against real file trees and the
//! in-memory store.

use std::fs;

use tempfile::tempdir;
use test_log::test;

use inlay_core::{
    build_network,
    builder::NetworkBuilder,
    network::BuildDiagnostic,
    properties::{DocFormat, NodeId, RefKind},
    store::{DiskStore, MemStore},
    BuildLimits, InlayError, SizeScope,
};

#[test]
fn test_acyclic_network_node_count() -> Result<(), InlayError> {
    // Five distinct reachable files, one referenced twice.
    let store = MemStore::new()
        .with("a.md", "[b](b.md) [c](c.md)")
        .with("b.md", "[d](sub/d.md)")
        .with("c.md", "[d](sub/d.md) [e](e.md)")
        .with("sub/d.md", "leaf")
        .with("e.md", "leaf");
    let network = build_network(&store, "a.md")?;
    assert_eq!(network.len(), 5);
    assert_eq!(network.stats.node_count, 5);
    assert_eq!(network.stats.max_depth, 2);
    assert!(network.diagnostics.is_empty());
    Ok(())
}

#[test]
fn test_cycle_reports_exact_stack() {
    let store = MemStore::new()
        .with("a.md", "[b](b.md)")
        .with("b.md", "[a](a.md)");
    let err = build_network(&store, "a.md").unwrap_err();
    match err {
        InlayError::CycleDetected { stack } => {
            assert_eq!(stack, vec!["a.md", "b.md", "a.md"]);
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
}

#[test]
fn test_diamond_builds_one_shared_node() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with("root.md", "[left](left.md) [right](right.md)")
        .with("left.md", "[shared](shared.md)")
        .with("right.md", "[shared](shared.md)")
        .with("shared.md", "shared content");
    let network = build_network(&store, "root.md")?;
    assert_eq!(network.len(), 4);
    let shared = NodeId::from("shared.md");
    assert!(network.contains(&shared));
    // Both parents resolve to the same arena entry.
    let left = network.node(&NodeId::from("left.md")).unwrap();
    let right = network.node(&NodeId::from("right.md")).unwrap();
    assert_eq!(left.references[0].resolved.as_ref(), Some(&shared));
    assert_eq!(right.references[0].resolved.as_ref(), Some(&shared));
    Ok(())
}

#[test]
fn test_depth_boundary() {
    // Chain c0 -> c1 -> c2 -> c3: deepest node sits exactly at depth 3.
    let mut store = MemStore::new();
    for i in 0..3 {
        store.insert(format!("c{i}.md"), format!("[next](c{}.md)", i + 1));
    }
    store.insert("c3.md", "leaf");
    let limits = BuildLimits {
        max_depth: 3,
        ..Default::default()
    };

    let network = NetworkBuilder::new(&store)
        .with_limits(limits)
        .build("c0.md")
        .unwrap();
    assert_eq!(network.stats.max_depth, 3);

    // One level deeper fails.
    store.insert("c3.md", "[next](c4.md)");
    store.insert("c4.md", "leaf");
    let err = NetworkBuilder::new(&store)
        .with_limits(limits)
        .build("c0.md")
        .unwrap_err();
    match err {
        InlayError::DepthExceeded { depth, limit, path } => {
            assert_eq!(depth, 4);
            assert_eq!(limit, 3);
            assert_eq!(path, "c4.md");
        }
        other => panic!("expected DepthExceeded, got {other:?}"),
    }
}

#[test]
fn test_unresolved_reference_is_warning_not_error() -> Result<(), InlayError> {
    let store = MemStore::new().with("a.md", "[gone](missing.md) [b](b.md)").with("b.md", "ok");
    let network = build_network(&store, "a.md")?;
    assert_eq!(network.len(), 2);
    assert_eq!(network.diagnostics.len(), 1);
    match &network.diagnostics[0] {
        BuildDiagnostic::UnresolvedReference { node, reference } => {
            assert_eq!(node.as_str(), "a.md");
            assert_eq!(reference.locator, "missing.md");
            assert!(reference.resolved.is_none());
        }
        other => panic!("expected UnresolvedReference, got {other:?}"),
    }
    // The reference is flagged unresolved on the node itself too.
    let root = network.root_node();
    assert_eq!(root.unresolved().count(), 1);
    Ok(())
}

#[test]
fn test_mixed_format_network() -> Result<(), InlayError> {
    let store = MemStore::new()
        .with("a.yaml", "child:\n  $ref: b.yaml\nprose:\n  $ref: c.md\n")
        .with("b.yaml", "value: 1\n")
        .with("c.md", "# Heading\n\nSome prose.\n");
    let network = build_network(&store, "a.yaml")?;
    assert_eq!(network.len(), 3);
    let root = network.root_node();
    assert_eq!(root.format, DocFormat::Yaml);
    assert_eq!(root.references.len(), 2);
    assert!(root
        .references
        .iter()
        .all(|r| r.kind == RefKind::StructuredRef));
    assert_eq!(
        network.node(&NodeId::from("c.md")).unwrap().format,
        DocFormat::Markdown
    );
    Ok(())
}

#[test]
fn test_network_total_bytes_ceiling() {
    let store = MemStore::new()
        .with("a.md", format!("{} [b](b.md)", "x".repeat(40)))
        .with("b.md", "y".repeat(40));
    let limits = BuildLimits {
        max_total_bytes: 64,
        ..Default::default()
    };
    let err = NetworkBuilder::new(&store)
        .with_limits(limits)
        .build("a.md")
        .unwrap_err();
    match err {
        InlayError::SizeExceeded {
            scope, measured, ..
        } => {
            assert_eq!(scope, SizeScope::Network);
            assert!(measured > 64);
        }
        other => panic!("expected SizeExceeded, got {other:?}"),
    }
}

#[test]
fn test_disk_store_build() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("sub"))?;
    fs::write(dir.path().join("a.md"), "See [b](sub/b.md).")?;
    fs::write(dir.path().join("sub").join("b.md"), "[up](../c.yaml)")?;
    fs::write(dir.path().join("c.yaml"), "value: 1\n")?;

    let store = DiskStore::new(dir.path());
    let network = build_network(&store, "a.md")?;
    assert_eq!(network.len(), 3);
    assert!(network.contains(&NodeId::from("sub/b.md")));
    // The ../ segment collapsed to a root-relative canonical identity.
    assert!(network.contains(&NodeId::from("c.yaml")));
    Ok(())
}

#[test]
fn test_missing_root_fails() {
    let store = MemStore::new();
    let err = build_network(&store, "nope.md").unwrap_err();
    assert!(matches!(err, InlayError::NotFound(_)));
}
