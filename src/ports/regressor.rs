//! Regressor port: Trait for scoring a single feature row.
//!
//! This trait abstracts the model format (LightGBM dump) from the application logic.

/// Errors that can occur while evaluating a model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Model expects {expected} features, row has {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("Model produced a non-finite prediction ({0})")]
    NonFiniteOutput(f64),

    #[error("Model evaluation failed: {0}")]
    Evaluation(String),
}

/// Trait for a trained single-output regression model.
///
/// Implementations are immutable once loaded and may be shared across threads.
pub trait Regressor: Send + Sync {
    /// Number of input features (row width) the model was trained on.
    fn num_features(&self) -> usize;

    /// Score one row. Values must be in schema order.
    ///
    /// # Errors
    /// Returns `ModelError` if the row has the wrong width or evaluation fails.
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError>;

    /// Short human-readable description for the UI (model kind, size).
    fn describe(&self) -> String;
}
