//! Common test fixtures for app definitions in both dialects.
use appdef::prelude::*;
use appdef::schema::{ComponentDefinition, DependencyDefinition, ServiceDefinition};

/// A complete V1 definition: one service, two components, one dependency.
///
/// `service_name/component_name` depends on `component_name2` on `80/tcp` as `myalias`.
#[allow(dead_code)]
pub const V1_LINKED_JSON: &str = r#"{
    "app_name": "app_name",
    "services": [
        {
            "service_name": "service_name",
            "components": [
                {
                    "component_name": "component_name",
                    "image": "registry.example.com/frontend:1.0",
                    "ports": ["8080/tcp"],
                    "dependencies": [
                        {"name": "component_name2", "port": "80/tcp", "alias": "myalias"}
                    ]
                },
                {
                    "component_name": "component_name2",
                    "image": "registry.example.com/backend:1.0",
                    "ports": ["80/tcp"]
                }
            ]
        }
    ]
}"#;

/// The V1 definition above with `app_name` misspelled.
#[allow(dead_code)]
pub const V1_MISSPELLED_JSON: &str = r#"{
    "appname": "app_name",
    "services": [
        {
            "service_name": "service_name",
            "components": [{"component_name": "component_name", "image": "busybox"}]
        }
    ]
}"#;

/// A V1 definition missing the comma after `app_name`.
#[allow(dead_code)]
pub const V1_MISSING_COMMA_JSON: &str = r#"{
    "app_name": "app_name"
    "services": [
        {
            "service_name": "service_name",
            "components": [{"component_name": "component_name", "image": "busybox"}]
        }
    ]
}"#;

/// A V1 template whose variables were never substituted.
#[allow(dead_code)]
pub const V1_PLACEHOLDER_JSON: &str = r#"{
    "app_name": $APP_NAME,
    "services": [
        {
            "service_name": "service_name",
            "components": [{"component_name": "component_name", "image": "busybox"}]
        }
    ]
}"#;

/// A V2 graph whose first node has an image and ports only.
#[allow(dead_code)]
pub const V2_IMAGE_PORTS_JSON: &str = r#"{
    "components": {
        "web/api": {"image": "shop/api:1", "ports": ["80/tcp"]}
    }
}"#;

/// The two-node graph: `S/a` is scaled to three replicas and links to `S/b`.
#[allow(dead_code)]
pub const V2_TWO_NODE_JSON: &str = r#"{
    "name": "shop",
    "components": {
        "S/a": {
            "image": "img-a",
            "ports": ["80/tcp"],
            "links": [{"node": "S/b", "target_port": "80/tcp"}],
            "scale": {"min": 3}
        },
        "S/b": {
            "image": "img-b",
            "ports": ["80/tcp"]
        }
    }
}"#;

/// Builds a V1 component with an image.
#[allow(dead_code)]
pub fn component(name: &str, image: &str) -> ComponentDefinition {
    ComponentDefinition {
        image: Some(image.to_string()),
        ..ComponentDefinition::new(name)
    }
}

/// Builds a dependency on `name` at a TCP port.
#[allow(dead_code)]
pub fn dependency(name: &str, port: u16, alias: Option<&str>) -> DependencyDefinition {
    DependencyDefinition {
        name: name.to_string(),
        port: Port::tcp(port),
        alias: alias.map(str::to_string),
    }
}

/// Wraps services into a V1 definition named `app`.
#[allow(dead_code)]
pub fn legacy_app(services: Vec<ServiceDefinition>) -> LegacyAppDefinition {
    LegacyAppDefinition {
        app_name: "app".to_string(),
        services,
    }
}

#[allow(dead_code)]
pub fn service(name: &str, components: Vec<ComponentDefinition>) -> ServiceDefinition {
    ServiceDefinition {
        service_name: name.to_string(),
        components,
    }
}

/// The deployment context every expansion test runs in.
#[allow(dead_code)]
pub fn deployment() -> DeploymentContext {
    DeploymentContext::new("acme", "prod", "shop")
}

#[allow(dead_code)]
pub fn node_name(name: &str) -> NodeName {
    NodeName::new(name).expect("fixture node name is valid")
}
