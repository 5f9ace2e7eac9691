//! File adapter: Implementation of `ArtifactStore` over an artifact directory.
//!
//! The directory holds two files written by the training pipeline:
//!
//! - `new_insurance_model.json`: LightGBM `dump_model()` output
//! - `expected_col.json`: JSON array with the ordered training columns
//!
//! An optional `manifest.json` binds both files to SHA-256 digests. When it is
//! present the bytes that get parsed are the bytes that were hashed.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::adapters::lightgbm::LightGbmModel;
use crate::domain::ExpectedSchema;
use crate::ports::{ArtifactStore, LoadError, LoadedArtifacts, Regressor};

pub const MODEL_FILE: &str = "new_insurance_model.json";
pub const SCHEMA_FILE: &str = "expected_col.json";
pub const MANIFEST_FILE: &str = "manifest.json";

const MANIFEST_VERSION: u32 = 1;

/// Digest manifest for the artifact pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    /// File name (relative to the artifact directory) to lowercase hex SHA-256.
    pub files: BTreeMap<String, String>,
}

impl ArtifactManifest {
    /// Hash the model and schema files currently in `dir`.
    ///
    /// # Errors
    /// Returns `LoadError` if either file cannot be read.
    pub fn for_dir(dir: &Path) -> Result<Self, LoadError> {
        let mut files = BTreeMap::new();
        for name in [MODEL_FILE, SCHEMA_FILE] {
            let bytes = read_artifact(&dir.join(name))?;
            files.insert(name.to_string(), sha256_hex(&bytes));
        }
        Ok(Self {
            version: MANIFEST_VERSION,
            files,
        })
    }

    fn verify(&self, name: &str, bytes: &[u8]) -> Result<(), LoadError> {
        let expected = self.files.get(name).ok_or_else(|| {
            LoadError::Integrity(format!("{MANIFEST_FILE} does not bind {name}"))
        })?;
        if !expected.eq_ignore_ascii_case(&sha256_hex(bytes)) {
            return Err(LoadError::Integrity(format!("digest mismatch for {name}")));
        }
        Ok(())
    }
}

/// Lowercase hex SHA-256 of a byte slice.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn read_artifact(path: &Path) -> Result<Vec<u8>, LoadError> {
    fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::Missing(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Name as LightGBM stores it: whitespace is replaced with underscores.
fn lightgbm_feature_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Artifact store reading from a directory on disk.
#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    dir: PathBuf,
}

impl FileArtifactStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    #[must_use]
    pub fn schema_path(&self) -> PathBuf {
        self.dir.join(SCHEMA_FILE)
    }

    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    fn read_manifest(&self) -> Result<Option<ArtifactManifest>, LoadError> {
        let path = self.manifest_path();
        let bytes = match read_artifact(&path) {
            Ok(b) => b,
            Err(LoadError::Missing(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        let manifest: ArtifactManifest =
            serde_json::from_slice(&bytes).map_err(|e| LoadError::Parse {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        if manifest.version != MANIFEST_VERSION {
            return Err(LoadError::Integrity(format!(
                "unsupported manifest version {}",
                manifest.version
            )));
        }
        Ok(Some(manifest))
    }

    fn check_consistency(model: &LightGbmModel, schema: &ExpectedSchema) -> Result<(), LoadError> {
        if model.num_features() != schema.len() {
            return Err(LoadError::Inconsistent(format!(
                "model expects {} features, schema lists {} columns",
                model.num_features(),
                schema.len()
            )));
        }
        if model.feature_names().is_empty() {
            return Ok(());
        }
        for (i, (trained, column)) in model
            .feature_names()
            .iter()
            .zip(schema.columns())
            .enumerate()
        {
            if *trained != lightgbm_feature_name(column) {
                return Err(LoadError::Inconsistent(format!(
                    "feature {i} is {trained:?} in the model but {column:?} in the schema"
                )));
            }
        }
        Ok(())
    }
}

impl ArtifactStore for FileArtifactStore {
    type Model = LightGbmModel;

    fn load(&self) -> Result<LoadedArtifacts<LightGbmModel>, LoadError> {
        let model_path = self.model_path();
        let schema_path = self.schema_path();

        let model_bytes = read_artifact(&model_path)?;
        let schema_bytes = read_artifact(&schema_path)?;

        match self.read_manifest()? {
            Some(manifest) => {
                manifest.verify(MODEL_FILE, &model_bytes)?;
                manifest.verify(SCHEMA_FILE, &schema_bytes)?;
                tracing::info!("Artifact digests verified against {}", MANIFEST_FILE);
            }
            None => {
                tracing::warn!(
                    "No {} in {:?}; loading artifacts without digest verification",
                    MANIFEST_FILE,
                    self.dir
                );
            }
        }

        let model_json = std::str::from_utf8(&model_bytes).map_err(|e| LoadError::Parse {
            path: model_path.clone(),
            reason: e.to_string(),
        })?;
        let model = LightGbmModel::from_json_str(model_json).map_err(|reason| LoadError::Parse {
            path: model_path.clone(),
            reason,
        })?;

        let columns: Vec<String> =
            serde_json::from_slice(&schema_bytes).map_err(|e| LoadError::Parse {
                path: schema_path.clone(),
                reason: e.to_string(),
            })?;
        let schema = ExpectedSchema::new(columns)?;

        Self::check_consistency(&model, &schema)?;

        tracing::info!(
            "Loaded {} from {:?} with {} expected columns",
            model.describe(),
            model_path,
            schema.len()
        );

        Ok(LoadedArtifacts { model, schema })
    }

    fn location(&self) -> String {
        self.dir.display().to_string()
    }
}
