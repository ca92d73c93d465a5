use super::types::{Environment, NodeName, Port, ScalingPolicy, VolumeDefinition};
use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The canonical (V2) app definition: a flat graph of named nodes.
///
/// Written as `{"components": {...}}`; the older `{"nodes": {...}}` wire shape is
/// accepted when reading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "components", alias = "nodes", default)]
    pub nodes: BTreeMap<NodeName, NodeDefinition>,
}

impl AppGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&NodeDefinition> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeName, &NodeDefinition)> {
        self.nodes.iter()
    }

    /// Serializes the graph into the canonical V2 JSON shape.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        serde_json::to_string_pretty(self).map_err(|e| SchemaError::Structure(e.to_string()))
    }
}

/// Marks a node as the parent of co-scheduled components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PodMode {
    Children,
}

/// A single node of the canonical graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<Link>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<VolumeDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expose: Vec<ExposeDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScalingPolicy>,
    #[serde(default, skip_serializing_if = "Environment::is_empty")]
    pub env: Environment,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domains: BTreeMap<String, Port>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<PodMode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeDefinition {
    pub fn with_image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Default::default()
        }
    }

    /// The synthetic parent node of a pod group.
    pub fn pod_group() -> Self {
        Self {
            pod: Some(PodMode::Children),
            ..Default::default()
        }
    }

    /// The node representing a whole service as one network identity.
    pub fn service_identity(expose: Vec<ExposeDefinition>) -> Self {
        Self {
            expose,
            ..Default::default()
        }
    }

    pub fn is_pod_group(&self) -> bool {
        self.pod.is_some()
    }

    /// Nodes with an image become containers; everything else is structural.
    pub fn is_materializable(&self) -> bool {
        self.image.is_some()
    }
}

/// A resolved reference from one node to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub node: NodeName,
    #[serde(alias = "targetPort")]
    pub target_port: Port,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// A port published by a service, backed by a port of one of its nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposeDefinition {
    pub port: Port,
    pub node: NodeName,
    #[serde(alias = "targetPort")]
    pub target_port: Port,
}
