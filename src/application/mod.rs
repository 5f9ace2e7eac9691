//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the quote flow: cached model access, feature engineering and scoring.

pub mod model_cache;
pub mod pipeline;
mod quote;

pub use model_cache::{ModelCache, SharedArtifacts};
pub use pipeline::FeaturePipeline;
pub use quote::{ModelStatus, QuoteService};
