//! End-to-end tests from raw bytes to scheduled instances.
mod common;
use appdef::error::{PipelineError, RepositoryError};
use appdef::prelude::*;
use appdef::schema;
use common::*;
use pretty_assertions::assert_eq;

#[test]
fn test_v1_bytes_to_instances() {
    let pipeline = Pipeline::new();
    let instances = pipeline
        .expand(&deployment(), V1_LINKED_JSON.as_bytes())
        .unwrap();

    let ids: Vec<_> = instances.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(
        ids,
        vec![
            "acme/prod/service_name/component_name#0",
            "acme/prod/service_name/component_name2#0",
        ]
    );

    let dependency = &instances[0].container.discovery.dependencies[0];
    assert_eq!(dependency.name, "myalias");
    assert_eq!(dependency.context, "acme/prod/service_name/component_name2");
    assert_eq!(dependency.port, Port::tcp(80));
}

#[test]
fn test_v2_bytes_are_not_migrated() {
    let (detection, graph) = Pipeline::new()
        .normalize(V2_TWO_NODE_JSON.as_bytes())
        .unwrap();
    assert_eq!(detection.dialect, Dialect::V2);
    assert_eq!(graph, schema::parse_canonical(V2_TWO_NODE_JSON.as_bytes()).unwrap());
}

#[test]
fn test_migration_is_idempotent_through_the_pipeline() {
    let pipeline = Pipeline::new();
    let (_, migrated) = pipeline.normalize(V1_LINKED_JSON.as_bytes()).unwrap();
    let json = migrated.to_json().unwrap();

    let (detection, again) = pipeline.normalize(json.as_bytes()).unwrap();
    assert_eq!(detection.dialect, Dialect::V2);
    assert_eq!(again, migrated);
}

#[test]
fn test_invalid_v2_graph_fails_validation() {
    let bytes = br#"{"components": {"S/a": {"image": "x", "ports": [80], "links": [{"node": "S/b", "target_port": 80}]}}}"#;
    let err = Pipeline::new().normalize(bytes).unwrap_err();
    assert!(matches!(err, PipelineError::Schema(SchemaError::Validation(_))));
}

#[test]
fn test_placeholder_input_fails_after_detection() {
    let pipeline = Pipeline::new();
    assert_eq!(
        pipeline
            .classify(V1_PLACEHOLDER_JSON.as_bytes())
            .unwrap()
            .dialect,
        Dialect::V1
    );
    let err = pipeline.normalize(V1_PLACEHOLDER_JSON.as_bytes()).unwrap_err();
    match err {
        PipelineError::Schema(schema_err) => assert!(schema_err.is_syntax()),
        other => panic!("Expected a schema error, got {:?}", other),
    }
}

#[test]
fn test_app_name() {
    let pipeline = Pipeline::new();
    assert_eq!(pipeline.app_name(V1_LINKED_JSON.as_bytes()).unwrap(), "app_name");
    assert_eq!(pipeline.app_name(V2_TWO_NODE_JSON.as_bytes()).unwrap(), "shop");

    let unnamed = pipeline.app_name(V2_IMAGE_PORTS_JSON.as_bytes()).unwrap();
    assert_eq!(unnamed.len(), 8);
    assert!(unnamed.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(pipeline.app_name(V2_IMAGE_PORTS_JSON.as_bytes()).unwrap(), unnamed);
}

#[test]
fn test_custom_classifier() {
    let pipeline = Pipeline::builder()
        .with_classifier(Classifier::empty())
        .build();
    let err = pipeline.classify(V1_LINKED_JSON.as_bytes()).unwrap_err();
    assert!(matches!(err, PipelineError::Detection(_)));
}

#[test]
fn test_scheduling_into_local_repository() {
    let instances = Pipeline::new()
        .expand(&deployment(), V2_TWO_NODE_JSON.as_bytes())
        .unwrap();

    let mut repository = LocalRepository::new();
    for instance in instances.iter().cloned() {
        repository.schedule(instance).unwrap();
    }
    assert_eq!(repository.len(), 4);

    let err = repository.schedule(instances[0].clone()).unwrap_err();
    assert_eq!(
        err,
        RepositoryError::DuplicateInstance("acme/prod/S/a#0".to_string())
    );
}

#[test]
fn test_self_dependency_survives_normalization() {
    let bytes = br#"{"app_name": "a", "services": [{"service_name": "S", "components": [
        {"component_name": "a", "image": "img", "ports": [80],
         "dependencies": [{"name": "a", "port": 80}]}
    ]}]}"#;
    let (_, graph) = Pipeline::new().normalize(bytes).unwrap();
    assert_eq!(graph.get("S/a").unwrap().links[0].node, node_name("S/a"));
}
