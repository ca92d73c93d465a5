use super::Transformer;
use crate::error::TransformError;
use crate::schema::{AppGraph, LegacyAppDefinition};

/// A trait for app definition formats that can be normalized into the canonical [`AppGraph`].
///
/// This is the extension point for supporting more dialects: implement it on the
/// typed record of your format and the expander can consume the result.
///
/// # Example
///
/// ```rust,no_run
/// use appdef::error::TransformError;
/// use appdef::schema::{AppGraph, NodeDefinition, NodeName};
/// use appdef::transform::IntoGraph;
///
/// struct SingleImage {
///     service: String,
///     image: String,
/// }
///
/// impl IntoGraph for SingleImage {
///     fn into_graph(self) -> Result<AppGraph, TransformError> {
///         let name = NodeName::from_segments([self.service.as_str(), "main"]).map_err(|e| {
///             TransformError::MalformedPayload {
///                 node: self.service.clone(),
///                 message: e.to_string(),
///             }
///         })?;
///         let mut graph = AppGraph::new();
///         graph.nodes.insert(name, NodeDefinition::with_image(self.image));
///         Ok(graph)
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the definition and converts it into a canonical graph.
    fn into_graph(self) -> Result<AppGraph, TransformError>;
}

impl IntoGraph for LegacyAppDefinition {
    /// Migrates with the default port base.
    fn into_graph(self) -> Result<AppGraph, TransformError> {
        Transformer::default().transform(&self)
    }
}

impl IntoGraph for AppGraph {
    fn into_graph(self) -> Result<AppGraph, TransformError> {
        Ok(self)
    }
}
