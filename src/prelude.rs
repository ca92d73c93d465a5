//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the appdef crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use appdef::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let bytes = std::fs::read("path/to/app.json")?;
//! let detection = Classifier::default().classify(&bytes)?;
//! println!("Detected {} with {}% confidence", detection.dialect, detection.confidence);
//! # Ok(())
//! # }
//! ```

// Detection
pub use crate::dialect::{Classifier, Detection, Dialect, DialectChecker};

// Schema types
pub use crate::schema::{AppGraph, LegacyAppDefinition, NodeDefinition, NodeName, Port};

// Migration and expansion
pub use crate::expand::{
    DeploymentContext, Expander, InstanceDescriptor, InstanceRepository, LocalRepository,
};
pub use crate::pipeline::Pipeline;
pub use crate::transform::{IntoGraph, Transformer};

// Error types
pub use crate::error::{
    DetectionError, ExpansionError, PipelineError, SchemaError, TransformError,
};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
