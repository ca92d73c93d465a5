use crate::schema::{Environment, NodeName, Port};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where an app is being deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentContext {
    pub organization: String,
    pub environment: String,
    pub application: String,
}

impl DeploymentContext {
    pub fn new(
        organization: impl Into<String>,
        environment: impl Into<String>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            organization: organization.into(),
            environment: environment.into(),
            application: application.into(),
        }
    }

    /// The discovery context of a node: `organization/environment/node`.
    pub fn execution_context(&self, node: &NodeName) -> String {
        format!("{}/{}/{}", self.organization, self.environment, node)
    }
}

/// A fully resolved, per-replica deployment unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    pub id: String,
    pub replica: u32,
    pub metadata: InstanceMetadata,
    pub container: ContainerSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMetadata {
    pub organization: String,
    pub environment: String,
    pub application: String,
    pub service: String,
    pub component: NodeName,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub image: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: Environment,
    #[serde(default)]
    pub volumes: Vec<InstanceVolume>,
    pub discovery: Discovery,
}

/// A volume with its size resolved to gigabytes and its sources resolved to contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceVolume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_gb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumes_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discovery {
    /// One entry per replica of the node.
    pub contexts: Vec<String>,
    #[serde(default)]
    pub domains: BTreeMap<String, Port>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// A link rewritten into a reference to the target's execution context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// The link alias, or the last segment of the target's name.
    pub name: String,
    pub node: NodeName,
    pub port: Port,
    pub context: String,
}
