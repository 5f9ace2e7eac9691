//! # Premium Predictor
//!
//! Interactive insurance premium estimates from a pre-trained LightGBM model.
//!
//! This crate provides:
//! - A feature pipeline that turns a customer profile into the model's input row
//! - Native evaluation of LightGBM model dumps
//! - A process-wide model cache with explicit reload
//! - Terminal UI for entering profiles and reading quotes
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (CustomerProfile, FeatureVector, PremiumQuote)
//! - `ports`: Trait definitions for external operations (Regressor, ArtifactStore)
//! - `adapters`: Concrete implementations (LightGBM dump, artifact files)
//! - `application`: Use cases orchestrating domain and ports
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{CustomerProfile, PremiumQuote};

/// Result type for premium predictor operations
pub type Result<T> = std::result::Result<T, PremiumError>;

/// Main error type, tagged by the stage that failed.
#[derive(Debug, thiserror::Error)]
pub enum PremiumError {
    #[error("Model loading failed: {0}")]
    Load(#[from] ports::LoadError),

    #[error("Prediction failed: {0}")]
    Pipeline(#[from] domain::PipelineError),

    #[error("Prediction failed: {0}")]
    Model(#[from] ports::ModelError),
}

impl PremiumError {
    /// Load failures block the whole page; the rest only affect one submission.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Load(_))
    }
}
