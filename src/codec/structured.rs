//! Structured-data codecs (JSON and YAML).
//!
//! Both parse into a nested [`serde_json::Value`] so the rest of the system
//! has a single canonical structured representation. A reference is an object
//! consisting solely of the reserved `$ref` key whose value is a path:
//!
//! ```yaml
//! child:
//!   $ref: other.yaml
//! ```
//!
//! Reference objects are recognized at any nesting depth and left in place in
//! the canonical content; substitution happens at render time.

use serde_json::Value;

use crate::{
    codec::DocCodec,
    error::InlayError,
    properties::{DocFormat, NodeContent, Reference, RefKind},
};

/// The reserved key marking a structured reference object.
pub const RESERVED_REF_KEY: &str = "$ref";

/// If `value` is an object consisting solely of the reserved key with a
/// string value, return the locator.
pub(crate) fn as_ref_object(value: &Value) -> Option<&str> {
    let map = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    map.get(RESERVED_REF_KEY)?.as_str()
}

/// Collect references in document order via depth-first traversal.
fn collect_refs(value: &Value, refs: &mut Vec<Reference>) {
    if let Some(locator) = as_ref_object(value) {
        refs.push(Reference::new(RefKind::StructuredRef, locator));
        return;
    }
    match value {
        Value::Object(map) => {
            for (_key, child) in map {
                collect_refs(child, refs);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_refs(child, refs);
            }
        }
        _ => {}
    }
}

fn parse_value(
    location: &str,
    value: Value,
) -> Result<(NodeContent, Vec<Reference>), InlayError> {
    let mut refs = Vec::new();
    collect_refs(&value, &mut refs);
    tracing::debug!(
        "Parsed structured '{}': {} reference(s)",
        location,
        refs.len()
    );
    Ok((NodeContent::Structured(value), refs))
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl DocCodec for JsonCodec {
    fn format(&self) -> DocFormat {
        DocFormat::Json
    }

    fn sniffs(&self, content: &str) -> bool {
        let trimmed = content.trim_start();
        (trimmed.starts_with('{') || trimmed.starts_with('['))
            && serde_json::from_str::<Value>(content).is_ok()
    }

    fn parse(
        &self,
        location: &str,
        raw: &str,
    ) -> Result<(NodeContent, Vec<Reference>), InlayError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| InlayError::parse(location, e.to_string()))?;
        parse_value(location, value)
    }

    fn serialize(&self, content: &NodeContent) -> Result<String, InlayError> {
        match content {
            NodeContent::Structured(value) => Ok(serde_json::to_string_pretty(value)?),
            // A text node reformatted into a structured target becomes a
            // string value in the target surface.
            NodeContent::Text(text) => Ok(serde_json::to_string_pretty(&Value::String(
                text.clone(),
            ))?),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct YamlCodec;

impl DocCodec for YamlCodec {
    fn format(&self) -> DocFormat {
        DocFormat::Yaml
    }

    fn sniffs(&self, content: &str) -> bool {
        // Only sniff clearly YAML-shaped text: a document marker or a
        // top-level mapping. Plain prose parses as a YAML scalar, which
        // would shadow the text codecs.
        let trimmed = content.trim_start();
        (trimmed.starts_with("---")
            || trimmed
                .lines()
                .next()
                .map(|l| l.contains(": ") || l.trim_end().ends_with(':'))
                .unwrap_or(false))
            && serde_yaml::from_str::<Value>(content).is_ok()
    }

    fn parse(
        &self,
        location: &str,
        raw: &str,
    ) -> Result<(NodeContent, Vec<Reference>), InlayError> {
        let value: Value = serde_yaml::from_str(raw)
            .map_err(|e| InlayError::parse(location, e.to_string()))?;
        parse_value(location, value)
    }

    fn serialize(&self, content: &NodeContent) -> Result<String, InlayError> {
        match content {
            NodeContent::Structured(value) => Ok(serde_yaml::to_string(value)?),
            NodeContent::Text(text) => Ok(serde_yaml::to_string(&Value::String(text.clone()))?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_ref_extraction_in_document_order() {
        let raw = r#"{"zeta": {"$ref": "first.json"}, "alpha": {"$ref": "second.json"}}"#;
        let (content, refs) = JsonCodec.parse("doc.json", raw).unwrap();
        assert!(matches!(content, NodeContent::Structured(_)));
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].locator, "first.json");
        assert_eq!(refs[1].locator, "second.json");
        assert_eq!(refs[0].kind, RefKind::StructuredRef);
    }

    #[test]
    fn test_nested_and_array_refs() {
        let raw = r#"{"a": {"b": [{"$ref": "deep.yaml"}, 2]}}"#;
        let (_, refs) = JsonCodec.parse("doc.json", raw).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].locator, "deep.yaml");
    }

    #[test]
    fn test_multi_key_object_is_not_a_ref() {
        let raw = r#"{"$ref": "x.json", "other": 1}"#;
        let (_, refs) = JsonCodec.parse("doc.json", raw).unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_yaml_parse_and_ref() {
        let raw = "child:\n  $ref: b.yaml\nvalue: 1\n";
        let (content, refs) = YamlCodec.parse("a.yaml", raw).unwrap();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].locator, "b.yaml");
        let value = content.as_structured().unwrap();
        assert_eq!(value["value"], json!(1));
    }

    #[test]
    fn test_json_round_trip_canonical() {
        let value = json!({"alpha": 1, "beta": [true, null]});
        let raw = serde_json::to_string_pretty(&value).unwrap();
        let (content, _) = JsonCodec.parse("doc.json", &raw).unwrap();
        assert_eq!(JsonCodec.serialize(&content).unwrap(), raw);
    }

    #[test]
    fn test_parse_error_carries_location() {
        let err = JsonCodec.parse("bad.json", "{not json").unwrap_err();
        match err {
            InlayError::Parse { path, .. } => assert_eq!(path, "bad.json"),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }
}
