use crate::dialect::{Classifier, Detection, Dialect, DialectChecker};
use crate::error::PipelineError;
use crate::expand::{DeploymentContext, Expander, InstanceDescriptor};
use crate::schema::{self, AppGraph};
use crate::transform::Transformer;
use tracing::{info, instrument};

/// Runs raw definition bytes through detection, migration, validation and expansion.
///
/// Every stage is available on its own; the pipeline only wires them together
/// so that callers holding bytes do not have to.
#[derive(Default)]
pub struct Pipeline {
    classifier: Classifier,
    transformer: Transformer,
    expander: Expander,
}

pub struct PipelineBuilder {
    classifier: Classifier,
    transformer: Transformer,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            classifier: Classifier::default(),
            transformer: Transformer::default(),
        }
    }

    /// Replaces the whole checker registry.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Registers an additional checker after the ones already present.
    pub fn with_checker(mut self, checker: Box<dyn DialectChecker>) -> Self {
        self.classifier = self.classifier.with_checker(checker);
        self
    }

    pub fn with_port_base(mut self, port_base: u16) -> Self {
        self.transformer = self.transformer.with_port_base(port_base);
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            classifier: self.classifier,
            transformer: self.transformer,
            expander: Expander::new(),
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn transformer(&self) -> &Transformer {
        &self.transformer
    }

    #[instrument(skip_all)]
    pub fn classify(&self, bytes: &[u8]) -> Result<Detection, PipelineError> {
        Ok(self.classifier.classify(bytes)?)
    }

    /// Detects the dialect and returns a validated canonical graph.
    ///
    /// V1 input is migrated; V2 input is parsed as is. Either way the graph
    /// has passed [`schema::validate`].
    #[instrument(skip_all)]
    pub fn normalize(&self, bytes: &[u8]) -> Result<(Detection, AppGraph), PipelineError> {
        let detection = self.classifier.classify(bytes)?;
        let graph = match detection.dialect {
            Dialect::V1 => {
                let definition = schema::parse_legacy(bytes)?;
                self.transformer.transform(&definition)?
            }
            Dialect::V2 => schema::parse_canonical(bytes)?,
        };
        schema::validate(&graph)?;

        info!(
            dialect = %detection.dialect,
            confidence = detection.confidence,
            nodes = graph.len(),
            "normalized definition"
        );
        Ok((detection, graph))
    }

    /// Normalizes the definition and expands it into instance descriptors.
    #[instrument(skip_all)]
    pub fn expand(
        &self,
        deployment: &DeploymentContext,
        bytes: &[u8],
    ) -> Result<Vec<InstanceDescriptor>, PipelineError> {
        let (_, graph) = self.normalize(bytes)?;
        Ok(self.expander.expand(deployment, &graph)?)
    }

    /// The application name carried by the definition.
    ///
    /// V2 graphs without a `name` get one derived from their node names.
    #[instrument(skip_all)]
    pub fn app_name(&self, bytes: &[u8]) -> Result<String, PipelineError> {
        let detection = self.classifier.classify(bytes)?;
        let name = match detection.dialect {
            Dialect::V1 => schema::parse_legacy(bytes)?.app_name,
            Dialect::V2 => {
                let graph = schema::parse_canonical(bytes)?;
                match graph.name.as_deref() {
                    Some(name) if !name.is_empty() => name.to_string(),
                    _ => schema::derived_app_name(&graph),
                }
            }
        };
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1: &str = r#"{
        "app_name": "shop",
        "services": [{
            "service_name": "web",
            "components": [
                {"component_name": "api", "image": "shop/api:1", "ports": ["80/tcp"]}
            ]
        }]
    }"#;

    #[test]
    fn test_normalize_migrates_v1() {
        let (detection, graph) = Pipeline::new().normalize(V1.as_bytes()).unwrap();
        assert_eq!(detection.dialect, Dialect::V1);
        assert_eq!(detection.confidence, 100);
        assert!(graph.contains("web/api"));
        assert!(graph.contains("web"));
    }

    #[test]
    fn test_port_base_reaches_transformer() {
        let pipeline = Pipeline::builder().with_port_base(9000).build();
        let (_, graph) = pipeline.normalize(V1.as_bytes()).unwrap();
        let service = graph.get("web").unwrap();
        assert_eq!(service.expose[0].port.number, 9001);
    }

    #[test]
    fn test_unknown_input_is_detection_error() {
        let err = Pipeline::new().normalize(br#"{"foo": "bar"}"#).unwrap_err();
        assert!(matches!(err, PipelineError::Detection(_)));
    }
}
