//! # appdef - App Definition Detection, Migration and Expansion
//!
//! **appdef** reads declarative application definitions written in either of two
//! historical dialects, migrates the old nested one into the flat canonical graph,
//! and expands that graph into one descriptor per container replica.
//!
//! ## Core Workflow
//!
//! 1.  **Detect**: A [`Classifier`](dialect::Classifier) scores the raw bytes against
//!     every registered dialect checker and picks the most confident one.
//! 2.  **Normalize**: V1 definitions (services holding components) are rewritten by the
//!     [`Transformer`](transform::Transformer) into an [`AppGraph`](schema::AppGraph) of
//!     slash-named nodes. V2 definitions are already in that shape.
//! 3.  **Expand**: The [`Expander`](expand::Expander) turns every container node into as
//!     many [`InstanceDescriptor`](expand::InstanceDescriptor)s as its scaling policy asks for,
//!     with links and volume sources rewritten into execution contexts.
//!
//! [`Pipeline`](pipeline::Pipeline) runs all three steps from bytes.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use appdef::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let bytes = std::fs::read("path/to/app.json")?;
//!
//!     let pipeline = Pipeline::builder().with_port_base(9000).build();
//!     let (detection, graph) = pipeline.normalize(&bytes)?;
//!     println!("{} ({}%)", detection.dialect, detection.confidence);
//!     println!("{}", graph.to_json()?);
//!
//!     let deployment = DeploymentContext::new("acme", "prod", pipeline.app_name(&bytes)?);
//!     for instance in pipeline.expand(&deployment, &bytes)? {
//!         println!("{} -> {}", instance.id, instance.container.image);
//!     }
//!     Ok(())
//! }
//! ```

pub mod dialect;
pub mod error;
pub mod expand;
pub mod pipeline;
pub mod prelude;
pub mod schema;
pub mod transform;
