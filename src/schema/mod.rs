//! Typed records for both dialects and the entry points that read and check them.
//!
//! This layer only deserializes and validates. It knows nothing about dialect
//! detection or migration.

mod canonical;
mod legacy;
mod types;

pub use canonical::*;
pub use legacy::*;
pub use types::*;

use crate::error::SchemaError;
use sha2::{Digest, Sha256};

/// Parses a V1 app definition.
pub fn parse_legacy(bytes: &[u8]) -> Result<LegacyAppDefinition, SchemaError> {
    serde_json::from_slice(bytes).map_err(|e| SchemaError::from_json(e, bytes))
}

/// Parses a V2 app definition.
pub fn parse_canonical(bytes: &[u8]) -> Result<AppGraph, SchemaError> {
    serde_json::from_slice(bytes).map_err(|e| SchemaError::from_json(e, bytes))
}

/// Checks the structural invariants of a canonical graph.
///
/// Every link, volume and expose reference must name a node of the same graph,
/// and every node must be either a container, a pod group, a service identity
/// or a pure scaling declaration.
pub fn validate(graph: &AppGraph) -> Result<(), SchemaError> {
    for (name, node) in graph.iter() {
        if node.image.is_none()
            && !node.is_pod_group()
            && node.expose.is_empty()
            && node.scale.is_none()
        {
            return Err(SchemaError::Validation(format!(
                "node '{}' has no image",
                name
            )));
        }

        for link in &node.links {
            if !graph.contains(link.node.as_str()) {
                return Err(SchemaError::Validation(format!(
                    "node '{}' links to unknown node '{}'",
                    name, link.node
                )));
            }
        }

        for reference in node.volumes.iter().flat_map(|v| v.references()) {
            if !graph.contains(reference) {
                return Err(SchemaError::Validation(format!(
                    "node '{}' uses volumes from unknown node '{}'",
                    name, reference
                )));
            }
        }

        for expose in &node.expose {
            let target = graph.get(expose.node.as_str()).ok_or_else(|| {
                SchemaError::Validation(format!(
                    "node '{}' exposes unknown node '{}'",
                    name, expose.node
                ))
            })?;
            if !target.ports.contains(&expose.target_port) {
                return Err(SchemaError::Validation(format!(
                    "node '{}' exposes port {} which '{}' does not publish",
                    name, expose.target_port, expose.node
                )));
            }
        }

        if let Some(scale) = &node.scale {
            if scale.max.is_some_and(|max| max < scale.min) {
                return Err(SchemaError::Validation(format!(
                    "node '{}' has a scale maximum below its minimum",
                    name
                )));
            }
        }
    }

    Ok(())
}

/// A stable short name for a graph that does not carry one.
///
/// Derived from the sorted node names, so it survives reordering of the input.
pub fn derived_app_name(graph: &AppGraph) -> String {
    let mut hasher = Sha256::new();
    for name in graph.nodes.keys() {
        hasher.update(name.as_str().as_bytes());
        hasher.update(b"\n");
    }
    hasher.finalize()[..4]
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_error_names_offending_character() {
        let err = parse_legacy(b"{\n  \"app_name\": $name\n}").unwrap_err();
        assert!(err.is_syntax());
        match err {
            SchemaError::Syntax {
                message, line, ..
            } => {
                assert!(message.contains("'$'"), "message was: {}", message);
                assert_eq!(line, 2);
            }
            other => panic!("Expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_field_is_structure_error() {
        let err = parse_legacy(br#"{"services": []}"#).unwrap_err();
        assert!(!err.is_syntax());
        assert!(matches!(err, SchemaError::Structure(_)));
    }

    #[test]
    fn test_nodes_alias_is_accepted() {
        let graph = parse_canonical(br#"{"nodes": {"a/b": {"image": "x"}}}"#).unwrap();
        assert!(graph.contains("a/b"));
        assert!(graph.to_json().unwrap().contains("\"components\""));
    }

    #[test]
    fn test_validate_rejects_dangling_link() {
        let graph = parse_canonical(
            br#"{"components": {"a/b": {"image": "x", "links": [{"node": "a/c", "target_port": 80}]}}}"#,
        )
        .unwrap();
        let err = validate(&graph).unwrap_err();
        assert!(err.to_string().contains("a/c"));
    }

    #[test]
    fn test_validate_accepts_self_link() {
        let graph = parse_canonical(
            br#"{"components": {"a/b": {"image": "x", "ports": [80], "links": [{"node": "a/b", "target_port": 80}]}}}"#,
        )
        .unwrap();
        assert!(validate(&graph).is_ok());
    }

    #[test]
    fn test_derived_app_name_is_stable() {
        let first = parse_canonical(br#"{"components": {"a/b": {"image": "x"}, "a/c": {"image": "y"}}}"#)
            .unwrap();
        let second = parse_canonical(br#"{"components": {"a/c": {"image": "z"}, "a/b": {"image": "x"}}}"#)
            .unwrap();
        assert_eq!(derived_app_name(&first), derived_app_name(&second));
        assert_eq!(derived_app_name(&first).len(), 8);
    }
}
