//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (model format, artifact files).

mod artifact_store;
mod regressor;

pub use artifact_store::{ArtifactStore, LoadError, LoadedArtifacts};
pub use regressor::{ModelError, Regressor};
