//! Adapters layer: Concrete implementations of ports.
//!
//! These modules contain the actual integration with external formats:
//! - `lightgbm`: evaluation of LightGBM `dump_model()` ensembles
//! - `artifacts`: model/schema files on disk, with optional digest manifest

pub mod artifacts;
pub mod lightgbm;

pub use artifacts::FileArtifactStore;
pub use lightgbm::LightGbmModel;
