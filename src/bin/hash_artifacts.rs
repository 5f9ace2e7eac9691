//! Digest manifest writer for the model artifacts.
//!
//! Hashes `new_insurance_model.json` and `expected_col.json` and writes
//! `manifest.json` next to them. The loader refuses artifacts whose digests
//! no longer match.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin hash_artifacts -- [<artifact_dir>]
//! ```

use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use premium_predictor::adapters::artifacts::{ArtifactManifest, MANIFEST_FILE};
use premium_predictor::config::AppConfig;

fn usage() -> String {
    "Usage: hash_artifacts [<artifact_dir>]".to_string()
}

fn parse_args() -> Result<PathBuf> {
    let mut dir: Option<PathBuf> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => bail!(usage()),
            _ if dir.is_none() => dir = Some(PathBuf::from(arg)),
            _ => bail!(usage()),
        }
    }

    Ok(dir.unwrap_or_else(|| AppConfig::from_env().model_dir))
}

fn main() -> Result<()> {
    let dir = parse_args()?;

    let manifest = ArtifactManifest::for_dir(&dir)
        .with_context(|| format!("Failed to hash artifacts in {dir:?}"))?;

    let out_path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(&out_path, json).with_context(|| format!("Failed to write {out_path:?}"))?;

    println!("Wrote {}", out_path.display());
    for (name, digest) in &manifest.files {
        println!("  {digest}  {name}");
    }
    Ok(())
}
