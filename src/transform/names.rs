use crate::error::TransformError;
use crate::schema::{LegacyAppDefinition, NodeName};
use ahash::AHashMap;

/// Maps every `(service, component)` pair of a V1 definition to its canonical node name.
///
/// Built in full before any link is rewritten, since dependencies may point at
/// components declared further down.
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    names: AHashMap<(String, String), NodeName>,
}

impl NameResolver {
    pub fn build(definition: &LegacyAppDefinition) -> Result<Self, TransformError> {
        let mut names = AHashMap::new();

        for service in &definition.services {
            for component in &service.components {
                let segments = match component.pod() {
                    Some(pod) => vec![
                        service.service_name.as_str(),
                        pod,
                        component.component_name.as_str(),
                    ],
                    None => vec![
                        service.service_name.as_str(),
                        component.component_name.as_str(),
                    ],
                };
                let name = NodeName::from_segments(segments).map_err(|e| {
                    TransformError::MalformedPayload {
                        node: format!("{}/{}", service.service_name, component.component_name),
                        message: e.to_string(),
                    }
                })?;

                let key = (
                    service.service_name.clone(),
                    component.component_name.clone(),
                );
                if names.insert(key, name.clone()).is_some() {
                    return Err(TransformError::NameCollision {
                        name: name.to_string(),
                    });
                }
            }
        }

        Ok(Self { names })
    }

    pub fn canonical_name(&self, service: &str, component: &str) -> Option<&NodeName> {
        self.names.get(&(service.to_string(), component.to_string()))
    }

    /// Resolves a dependency or volume reference made by `node`, which lives in `service`.
    pub fn resolve(
        &self,
        node: &NodeName,
        service: &str,
        reference: &str,
    ) -> Result<&NodeName, TransformError> {
        let (service, component) = split_reference(service, reference);
        self.canonical_name(service, component)
            .ok_or_else(|| TransformError::UnresolvedReference {
                node: node.to_string(),
                reference: reference.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Splits `service/component`; a bare component name belongs to `default_service`.
pub fn split_reference<'a>(default_service: &'a str, reference: &'a str) -> (&'a str, &'a str) {
    reference
        .split_once('/')
        .unwrap_or((default_service, reference))
}
