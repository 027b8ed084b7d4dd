//! Manifest sidecars for generated scripts.
//!
//! `write_with_manifest` stores `<file>.manifest.json` next to the script
//! with a blake3 hash of its contents. `verify` recomputes the hash so that
//! hand edits are caught before a stale script is uploaded or re-run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{GenerationMetadata, Script};
use crate::result::{GrabarError, GrabarResult};

/// Sidecar describing one generated file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    /// Manifest format version
    pub manifest_version: u32,
    /// File name of the script
    pub output_path: String,
    /// Blake3 hash of the script contents
    pub output_hash: String,
    /// Action blocks in the script
    pub block_count: usize,
    /// How the script was produced
    pub generation: GenerationMetadata,
}

impl FileManifest {
    /// Current format version
    pub const VERSION: u32 = 1;

    /// Manifest describing `script` written as `output_path`
    #[must_use]
    pub fn for_script(output_path: impl Into<String>, script: &Script) -> Self {
        Self {
            manifest_version: Self::VERSION,
            output_path: output_path.into(),
            output_hash: hash_contents(&script.text),
            block_count: script.block_count,
            generation: script.metadata.clone(),
        }
    }

    /// Sidecar path for a script (`test.py` -> `test.py.manifest.json`)
    #[must_use]
    pub fn manifest_path(script_path: &Path) -> PathBuf {
        let mut name = script_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        name.push_str(".manifest.json");
        script_path.with_file_name(name)
    }

    /// Write as pretty JSON
    pub fn write(&self, path: &Path) -> GrabarResult<()> {
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Read from JSON
    pub fn read(path: &Path) -> GrabarResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Blake3 hex digest of text
#[must_use]
pub fn hash_contents(contents: &str) -> String {
    blake3::hash(contents.as_bytes()).to_hex().to_string()
}

/// Write the script and its manifest; returns the manifest path
pub fn write_with_manifest(path: &Path, script: &Script) -> GrabarResult<PathBuf> {
    std::fs::write(path, &script.text)?;
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let manifest_path = FileManifest::manifest_path(path);
    FileManifest::for_script(name, script).write(&manifest_path)?;
    tracing::info!(path = %path.display(), "script written with manifest");
    Ok(manifest_path)
}

/// Check a script against its manifest
pub fn verify(path: &Path) -> GrabarResult<FileManifest> {
    let manifest_path = FileManifest::manifest_path(path);
    let manifest = FileManifest::read(&manifest_path).map_err(|err| GrabarError::Manifest {
        path: path.display().to_string(),
        reason: format!("cannot read {}: {err}", manifest_path.display()),
    })?;

    let actual = hash_contents(&std::fs::read_to_string(path)?);
    if actual != manifest.output_hash {
        return Err(GrabarError::HashMismatch {
            path: path.display().to_string(),
            expected: manifest.output_hash,
            actual,
        });
    }
    Ok(manifest)
}
