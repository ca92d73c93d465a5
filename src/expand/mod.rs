//! Expansion of a canonical graph into per-replica instance descriptors.

use crate::error::ExpansionError;
use crate::schema::{AppGraph, NodeDefinition, NodeName, ScalingPolicy, VolumeDefinition};
use ahash::AHashMap;
use tracing::{debug, info};

mod instance;
mod repository;
pub mod volume;

pub use instance::*;
pub use repository::{InstanceRepository, LocalRepository};

/// Replicas created for a node that no scaling node refers to.
pub const DEFAULT_REPLICAS: u32 = 1;

/// A node that declares how many replicas of the identically named node to create.
#[derive(Debug, Clone, Copy)]
pub struct ScalingNode<'a> {
    pub name: &'a NodeName,
    pub policy: &'a ScalingPolicy,
}

/// A node that becomes containers.
#[derive(Debug, Clone, Copy)]
pub struct RegularNode<'a> {
    pub name: &'a NodeName,
    pub definition: &'a NodeDefinition,
}

/// Splits a graph into scaling declarations and materializable nodes.
///
/// Within a keyed graph the scaling declaration for a node is the node's own
/// `scale` field, so a node with both an image and a scale shows up on both
/// sides. Nodes without an image (pod groups, service identities, pure scale
/// declarations) are never materialized.
pub fn partition(graph: &AppGraph) -> (Vec<ScalingNode<'_>>, Vec<RegularNode<'_>>) {
    let mut scaling = Vec::new();
    let mut regular = Vec::new();

    for (name, definition) in graph.iter() {
        if let Some(policy) = &definition.scale {
            scaling.push(ScalingNode { name, policy });
        }
        if definition.is_materializable() {
            regular.push(RegularNode { name, definition });
        }
    }

    (scaling, regular)
}

/// Replica count for a node: the first scaling node with the same name wins.
pub fn replica_count(scaling: &[ScalingNode<'_>], name: &NodeName) -> u32 {
    scaling
        .iter()
        .find(|s| s.name == name)
        .map_or(DEFAULT_REPLICAS, |s| s.policy.min)
}

/// Turns a canonical graph into instance descriptors.
#[derive(Debug, Clone, Default)]
pub struct Expander;

impl Expander {
    pub fn new() -> Self {
        Self
    }

    /// Expands every regular node into as many descriptors as its scale asks for.
    ///
    /// All replicas of a node share the same execution context. Any link or
    /// volume source that is not a regular node aborts the whole expansion.
    pub fn expand(
        &self,
        deployment: &DeploymentContext,
        graph: &AppGraph,
    ) -> Result<Vec<InstanceDescriptor>, ExpansionError> {
        let (scaling, regular) = partition(graph);
        let lookup: AHashMap<&str, &RegularNode<'_>> =
            regular.iter().map(|n| (n.name.as_str(), n)).collect();

        let mut instances = Vec::new();
        for node in &regular {
            let replicas = replica_count(&scaling, node.name);
            let context = deployment.execution_context(node.name);
            let dependencies = resolve_dependencies(deployment, node, &lookup)?;
            let volumes = node
                .definition
                .volumes
                .iter()
                .map(|v| resolve_volume(deployment, node.name, v, &lookup))
                .collect::<Result<Vec<_>, _>>()?;

            debug!(node = %node.name, replicas, "expanding node");

            let discovery = Discovery {
                contexts: vec![context.clone(); replicas as usize],
                domains: node.definition.domains.clone(),
                ports: node.definition.ports.clone(),
                dependencies,
            };

            for replica in 0..replicas {
                instances.push(InstanceDescriptor {
                    id: format!("{}#{}", context, replica),
                    replica,
                    metadata: InstanceMetadata {
                        organization: deployment.organization.clone(),
                        environment: deployment.environment.clone(),
                        application: deployment.application.clone(),
                        service: node.name.service().to_string(),
                        component: node.name.clone(),
                    },
                    container: ContainerSpec {
                        image: node.definition.image.clone().unwrap_or_default(),
                        args: node.definition.args.clone(),
                        env: node.definition.env.clone(),
                        volumes: volumes.clone(),
                        discovery: discovery.clone(),
                    },
                });
            }
        }

        info!(
            nodes = regular.len(),
            scaling_nodes = scaling.len(),
            instances = instances.len(),
            "expanded graph"
        );
        Ok(instances)
    }
}

fn resolve_dependencies(
    deployment: &DeploymentContext,
    node: &RegularNode<'_>,
    lookup: &AHashMap<&str, &RegularNode<'_>>,
) -> Result<Vec<Dependency>, ExpansionError> {
    node.definition
        .links
        .iter()
        .map(|link| -> Result<Dependency, ExpansionError> {
            let target = lookup.get(link.node.as_str()).ok_or_else(|| {
                ExpansionError::UnresolvedReference {
                    node: node.name.to_string(),
                    link: link.node.to_string(),
                }
            })?;
            Ok(Dependency {
                name: link
                    .alias
                    .clone()
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| target.name.last_segment().to_string()),
                node: target.name.clone(),
                port: link.target_port,
                context: deployment.execution_context(target.name),
            })
        })
        .collect()
}

fn resolve_volume(
    deployment: &DeploymentContext,
    node: &NodeName,
    volume: &VolumeDefinition,
    lookup: &AHashMap<&str, &RegularNode<'_>>,
) -> Result<InstanceVolume, ExpansionError> {
    let size_gb = volume
        .size
        .as_deref()
        .map(|size| {
            volume::parse_size_gb(size).ok_or_else(|| ExpansionError::InvalidVolumeSize {
                node: node.to_string(),
                value: size.to_string(),
            })
        })
        .transpose()?;

    let context_of = |reference: &Option<String>| {
        reference
            .as_deref()
            .map(|r| {
                lookup
                    .get(r)
                    .map(|target| deployment.execution_context(target.name))
                    .ok_or_else(|| ExpansionError::UnresolvedReference {
                        node: node.to_string(),
                        link: r.to_string(),
                    })
            })
            .transpose()
    };

    Ok(InstanceVolume {
        path: volume.path.clone(),
        size_gb,
        volume_from: context_of(&volume.volume_from)?,
        volumes_from: context_of(&volume.volumes_from)?,
        volume_path: volume.volume_path.clone(),
    })
}
