//! Artifact store port: Trait for loading the trained model and its column schema.
//!
//! This trait abstracts where and how artifacts are stored (files on disk)
//! from the caching and prediction logic.

use std::path::PathBuf;

use crate::domain::{ExpectedSchema, SchemaError};
use crate::ports::Regressor;

/// Errors that can occur while loading artifacts.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Artifact not found: {0:?}")]
    Missing(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to deserialize {path:?}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Invalid column schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("Model and schema disagree: {0}")]
    Inconsistent(String),

    #[error("Artifact integrity check failed: {0}")]
    Integrity(String),
}

/// A model paired with the schema it was trained against.
///
/// Always loaded, cached and replaced as one unit.
#[derive(Debug)]
pub struct LoadedArtifacts<M> {
    pub model: M,
    pub schema: ExpectedSchema,
}

/// Trait for artifact sources.
pub trait ArtifactStore: Send + Sync {
    /// Concrete model type produced by this store.
    type Model: Regressor;

    /// Read and deserialize both artifacts.
    ///
    /// # Errors
    /// Returns `LoadError` if either artifact is missing, unreadable, corrupt,
    /// or if the two disagree.
    fn load(&self) -> Result<LoadedArtifacts<Self::Model>, LoadError>;

    /// Where artifacts are read from, for messages and logs.
    fn location(&self) -> String;
}
