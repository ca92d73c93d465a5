use super::types::{Environment, Port, ScalingPolicy, VolumeDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A V1 app definition: services owning ordered lists of components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyAppDefinition {
    pub app_name: String,
    #[serde(default)]
    pub services: Vec<ServiceDefinition>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub service_name: String,
    #[serde(default)]
    pub components: Vec<ComponentDefinition>,
}

/// A single V1 component.
///
/// Fields this crate does not interpret are collected in `extra` and carried
/// over to the canonical node untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub component_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<DependencyDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling_policy: Option<ScalingPolicy>,
    #[serde(default, skip_serializing_if = "Environment::is_empty")]
    pub env: Environment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domains: BTreeMap<String, Port>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            component_name: name.into(),
            ..Default::default()
        }
    }

    /// The pod group this component belongs to; an empty pod name means none.
    pub fn pod(&self) -> Option<&str> {
        self.pod_name.as_deref().filter(|p| !p.is_empty())
    }
}

/// A V1 dependency on another component, optionally qualified as `service/component`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyDefinition {
    pub name: String,
    pub port: Port,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}
