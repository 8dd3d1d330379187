//! Output tree staging and writing.
//!
//! Files are staged in memory keyed by their path relative to the output
//! directory, then written in path order. A file whose bytes already match
//! is left untouched, and files listed in the previous build manifest that
//! the current build no longer produces are removed.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::BuildError;

/// Manifest file name at the output root.
pub const MANIFEST_FILE: &str = "folio-manifest.json";

/// List of emitted files with their content hashes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub files: Vec<ManifestEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the output directory, `/`-separated.
    pub path: String,
    /// Hex SHA-256 of the contents.
    pub sha256: String,
}

impl Manifest {
    /// Read the manifest of a previous build, if there is a readable one.
    #[must_use]
    pub fn read(out_dir: &Path) -> Option<Self> {
        let path = out_dir.join(MANIFEST_FILE);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Ignoring unreadable manifest");
                None
            }
        }
    }
}

/// Counts from writing the output tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Files created or overwritten.
    pub written: usize,
    /// Files whose contents were already up to date.
    pub unchanged: usize,
    /// Stale files from the previous build that were deleted.
    pub removed: usize,
}

/// In-memory output tree.
#[derive(Debug, Default)]
pub(crate) struct SiteOutput {
    files: BTreeMap<String, Vec<u8>>,
}

impl SiteOutput {
    pub fn add(&mut self, path: impl Into<String>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Manifest of the staged files, in path order.
    pub fn manifest(&self) -> Manifest {
        Manifest {
            files: self
                .files
                .iter()
                .map(|(path, contents)| ManifestEntry {
                    path: path.clone(),
                    sha256: hex::encode(Sha256::digest(contents)),
                })
                .collect(),
        }
    }

    /// Write every staged file plus the manifest under `out_dir`.
    pub fn write(mut self, out_dir: &Path) -> Result<WriteStats, BuildError> {
        let previous = Manifest::read(out_dir);
        let manifest = self.manifest();
        let mut json = serde_json::to_string_pretty(&manifest)?;
        json.push('\n');
        self.add(MANIFEST_FILE, json);

        let mut stats = WriteStats::default();
        for (rel, contents) in &self.files {
            let path = out_dir.join(rel);
            if fs::read(&path).is_ok_and(|existing| existing == *contents) {
                stats.unchanged += 1;
                continue;
            }
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
            }
            fs::write(&path, contents).map_err(|source| io_error(&path, source))?;
            tracing::debug!(path = %rel, "Wrote file");
            stats.written += 1;
        }

        for entry in previous.iter().flat_map(|m| &m.files) {
            if self.files.contains_key(&entry.path) {
                continue;
            }
            if !is_inside(&entry.path) {
                tracing::warn!(path = %entry.path, "Skipping manifest path outside the output directory");
                continue;
            }
            let path = out_dir.join(&entry.path);
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %entry.path, "Removed stale file");
                    stats.removed += 1;
                    remove_empty_parents(&path, out_dir);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(io_error(&path, source)),
            }
        }

        Ok(stats)
    }
}

/// Whether a manifest path stays under the output directory.
fn is_inside(rel: &str) -> bool {
    !rel.is_empty()
        && Path::new(rel)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

fn io_error(path: &Path, source: io::Error) -> BuildError {
    BuildError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Remove now-empty directories between `file` and `root`.
fn remove_empty_parents(file: &Path, root: &Path) {
    let mut dir: Option<PathBuf> = file.parent().map(Path::to_path_buf);
    while let Some(current) = dir {
        if current == root || !current.starts_with(root) || fs::remove_dir(&current).is_err() {
            break;
        }
        dir = current.parent().map(Path::to_path_buf);
    }
}
