use super::names::NameResolver;
use crate::error::TransformError;
use crate::schema::{ComponentDefinition, Link, NodeDefinition, NodeName, VolumeDefinition};

/// Canonical keys that a V1 component may not smuggle in through its extra fields.
pub const RESERVED_KEYS: &[&str] = &["links", "scale", "expose", "pod"];

/// What a field transfer needs to know about the component being rewritten.
pub struct TransferContext<'a> {
    pub resolver: &'a NameResolver,
    pub service: &'a str,
    pub node: &'a NodeName,
}

type TransferFn =
    fn(&TransferContext<'_>, &ComponentDefinition, &mut NodeDefinition) -> Result<(), TransformError>;

/// One rewritten field family: read `source` on the component, write `target` on the node.
pub struct FieldTransfer {
    pub source: &'static str,
    pub target: &'static str,
    apply: TransferFn,
}

impl FieldTransfer {
    pub fn apply(
        &self,
        ctx: &TransferContext<'_>,
        component: &ComponentDefinition,
        node: &mut NodeDefinition,
    ) -> Result<(), TransformError> {
        (self.apply)(ctx, component, node)
    }
}

/// The fields whose shape or meaning changes between V1 and V2.
pub const FIELD_TRANSFERS: &[FieldTransfer] = &[
    FieldTransfer {
        source: "dependencies",
        target: "links",
        apply: transfer_links,
    },
    FieldTransfer {
        source: "volumes",
        target: "volumes",
        apply: transfer_volumes,
    },
    FieldTransfer {
        source: "scaling_policy",
        target: "scale",
        apply: transfer_scale,
    },
];

/// Copies every field that means the same in both dialects.
///
/// `component_name` and `pod_name` are dropped; the node name carries them now.
pub fn passthrough(
    ctx: &TransferContext<'_>,
    component: &ComponentDefinition,
    node: &mut NodeDefinition,
) -> Result<(), TransformError> {
    if let Some(key) = RESERVED_KEYS
        .iter()
        .find(|key| component.extra.contains_key(**key))
    {
        return Err(TransformError::MalformedPayload {
            node: ctx.node.to_string(),
            message: format!("field '{}' is reserved in the canonical dialect", key),
        });
    }

    node.image = component.image.clone();
    node.ports = component.ports.clone();
    node.env = component.env.clone();
    node.args = component.args.clone();
    node.domains = component.domains.clone();
    node.extra = component.extra.clone();
    Ok(())
}

fn transfer_links(
    ctx: &TransferContext<'_>,
    component: &ComponentDefinition,
    node: &mut NodeDefinition,
) -> Result<(), TransformError> {
    node.links = component
        .dependencies
        .iter()
        .map(|dep| {
            let target = ctx.resolver.resolve(ctx.node, ctx.service, &dep.name)?;
            Ok(Link {
                node: target.clone(),
                target_port: dep.port,
                alias: dep.alias.clone().filter(|a| !a.is_empty()),
            })
        })
        .collect::<Result<_, TransformError>>()?;
    Ok(())
}

fn transfer_volumes(
    ctx: &TransferContext<'_>,
    component: &ComponentDefinition,
    node: &mut NodeDefinition,
) -> Result<(), TransformError> {
    let resolve = |reference: &Option<String>| -> Result<Option<String>, TransformError> {
        reference
            .as_deref()
            .map(|r| {
                ctx.resolver
                    .resolve(ctx.node, ctx.service, r)
                    .map(|name| name.to_string())
            })
            .transpose()
    };

    node.volumes = component
        .volumes
        .iter()
        .map(|volume| {
            Ok(VolumeDefinition {
                volume_from: resolve(&volume.volume_from)?,
                volumes_from: resolve(&volume.volumes_from)?,
                ..volume.clone()
            })
        })
        .collect::<Result<_, TransformError>>()?;
    Ok(())
}

fn transfer_scale(
    _ctx: &TransferContext<'_>,
    component: &ComponentDefinition,
    node: &mut NodeDefinition,
) -> Result<(), TransformError> {
    node.scale = component.scaling_policy;
    Ok(())
}
