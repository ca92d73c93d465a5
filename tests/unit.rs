//! Unit tests for error messages and value types.
mod common;
use appdef::error::{ExpansionError, PipelineError, TransformError};
use appdef::prelude::*;
use appdef::schema::Protocol;

#[test]
fn test_transform_error_display() {
    let err = TransformError::UnresolvedReference {
        node: "web/api".to_string(),
        reference: "ghost".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Reference 'ghost' used by 'web/api' does not resolve to a known component"
    );
}

#[test]
fn test_pipeline_error_is_transparent() {
    let inner = ExpansionError::InvalidVolumeSize {
        node: "S/a".to_string(),
        value: "lots".to_string(),
    };
    let err = PipelineError::from(inner.clone());
    assert_eq!(err.to_string(), inner.to_string());
}

#[test]
fn test_port_formats() {
    assert_eq!("80".parse::<Port>().unwrap(), Port::tcp(80));
    assert_eq!("53/UDP".parse::<Port>().unwrap().protocol, Protocol::Udp);
    assert_eq!(Port::tcp(443).to_string(), "443/tcp");
    assert!("0".parse::<Port>().is_err());
    assert!("70000".parse::<Port>().is_err());
    assert!("80/sctp".parse::<Port>().is_err());
}

#[test]
fn test_node_name_parts() {
    let name = NodeName::new("web/pod/api").unwrap();
    assert_eq!(name.service(), "web");
    assert_eq!(name.last_segment(), "api");
    assert_eq!(name.segments().count(), 3);
    assert!(NodeName::new("a/b/c/d").is_err());
    assert!(NodeName::new("a//b").is_err());
}

#[test]
fn test_execution_context() {
    let context = DeploymentContext::new("acme", "prod", "shop");
    assert_eq!(
        context.execution_context(&NodeName::new("web/api").unwrap()),
        "acme/prod/web/api"
    );
}
