//! Migration of V1 definitions into the canonical V2 graph.

use crate::error::TransformError;
use crate::schema::{AppGraph, ExposeDefinition, LegacyAppDefinition, NodeDefinition, NodeName, Port};
use ahash::AHashSet;
use std::collections::btree_map::Entry;
use tracing::{debug, info};

mod conversion;
pub mod fields;
pub mod names;

pub use conversion::IntoGraph;
pub use fields::{FIELD_TRANSFERS, FieldTransfer, TransferContext};
pub use names::NameResolver;

/// Ports handed out to published component ports start right above this number.
pub const DEFAULT_PORT_BASE: u16 = 8000;

/// Rewrites a [`LegacyAppDefinition`] into an [`AppGraph`].
#[derive(Debug, Clone)]
pub struct Transformer {
    port_base: u16,
}

impl Default for Transformer {
    fn default() -> Self {
        Self {
            port_base: DEFAULT_PORT_BASE,
        }
    }
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port_base(mut self, port_base: u16) -> Self {
        self.port_base = port_base;
        self
    }

    pub fn port_base(&self) -> u16 {
        self.port_base
    }

    /// Migrates a V1 definition.
    ///
    /// Components are processed in declaration order. Pod group nodes are emitted
    /// the first time one of their members shows up, and every service that
    /// publishes ports gets an extra node named after it holding the `expose` list.
    pub fn transform(&self, definition: &LegacyAppDefinition) -> Result<AppGraph, TransformError> {
        let resolver = NameResolver::build(definition)?;
        let mut graph = AppGraph {
            name: Some(definition.app_name.clone()).filter(|n| !n.is_empty()),
            ..AppGraph::default()
        };
        let mut ports = PortAllocator::new(self.port_base);
        let mut pods = AHashSet::new();

        for service in &definition.services {
            let mut exposed = Vec::new();

            for component in &service.components {
                let name = resolver
                    .canonical_name(&service.service_name, &component.component_name)
                    .cloned()
                    .ok_or_else(|| TransformError::UnresolvedReference {
                        node: service.service_name.clone(),
                        reference: component.component_name.clone(),
                    })?;

                if let Some(pod) = component.pod() {
                    let pod_name = NodeName::from_segments([service.service_name.as_str(), pod])
                        .map_err(|e| TransformError::MalformedPayload {
                            node: name.to_string(),
                            message: e.to_string(),
                        })?;
                    if pods.insert(pod_name.clone()) {
                        debug!(pod = %pod_name, "emitting pod group node");
                        insert_node(&mut graph, pod_name, NodeDefinition::pod_group())?;
                    }
                }

                let ctx = TransferContext {
                    resolver: &resolver,
                    service: &service.service_name,
                    node: &name,
                };
                let mut node = NodeDefinition::default();
                fields::passthrough(&ctx, component, &mut node)?;
                for transfer in FIELD_TRANSFERS {
                    transfer.apply(&ctx, component, &mut node)?;
                }

                for target_port in &component.ports {
                    exposed.push(ExposeDefinition {
                        port: ports.allocate(&name)?,
                        node: name.clone(),
                        target_port: *target_port,
                    });
                }

                insert_node(&mut graph, name, node)?;
            }

            if !exposed.is_empty() {
                let service_name = NodeName::new(service.service_name.as_str()).map_err(|e| {
                    TransformError::MalformedPayload {
                        node: service.service_name.clone(),
                        message: e.to_string(),
                    }
                })?;
                insert_node(
                    &mut graph,
                    service_name,
                    NodeDefinition::service_identity(exposed),
                )?;
            }
        }

        info!(
            services = definition.services.len(),
            components = resolver.len(),
            nodes = graph.len(),
            "migrated V1 definition"
        );
        Ok(graph)
    }
}

fn insert_node(
    graph: &mut AppGraph,
    name: NodeName,
    node: NodeDefinition,
) -> Result<(), TransformError> {
    match graph.nodes.entry(name) {
        Entry::Occupied(entry) => Err(TransformError::NameCollision {
            name: entry.key().to_string(),
        }),
        Entry::Vacant(entry) => {
            entry.insert(node);
            Ok(())
        }
    }
}

/// Hands out consecutive TCP ports, starting right above the base.
struct PortAllocator {
    last: u16,
}

impl PortAllocator {
    fn new(base: u16) -> Self {
        Self { last: base }
    }

    fn allocate(&mut self, node: &NodeName) -> Result<Port, TransformError> {
        self.last = self
            .last
            .checked_add(1)
            .ok_or_else(|| TransformError::PortRangeExhausted {
                node: node.to_string(),
            })?;
        Ok(Port::tcp(self.last))
    }
}
