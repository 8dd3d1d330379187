//! Document discovery by filesystem walking.
//!
//! Discovery only finds candidate files; reading and parsing them is left to
//! [`Corpus::load`](crate::Corpus::load) so it can run in parallel.

use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::ContentError;

/// File extensions treated as documents.
const DOC_EXTENSIONS: [&str; 2] = ["md", "mdx"];

/// Reference to a discovered document file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DocumentRef {
    /// Absolute (or source-dir-joined) file path.
    pub path: PathBuf,
    /// Path relative to the source directory.
    pub rel_path: PathBuf,
}

/// Walks a source directory for Markdown files.
///
/// Hidden entries and `_`-prefixed partials (files or directories) are
/// skipped. `.gitignore` rules are not consulted: the corpus is whatever is
/// on disk.
pub(crate) struct Scanner {
    source_dir: PathBuf,
}

impl Scanner {
    pub fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Scan the source directory and return document references sorted by path.
    pub fn scan(&self) -> Result<Vec<DocumentRef>, ContentError> {
        let walker = WalkBuilder::new(&self.source_dir)
            .standard_filters(false)
            .hidden(true)
            .follow_links(false)
            .filter_entry(|entry| !is_partial(entry.file_name()))
            .build();

        let mut refs = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| ContentError::Walk(e.to_string()))?;
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let path = entry.into_path();
            if !is_document(&path) {
                continue;
            }
            let Ok(rel_path) = path.strip_prefix(&self.source_dir) else {
                continue;
            };
            let rel_path = rel_path.to_path_buf();
            refs.push(DocumentRef { path, rel_path });
        }

        refs.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
        Ok(refs)
    }
}

/// `_`-prefixed names are partials meant for inclusion, not pages.
fn is_partial(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('_')
}

fn is_document(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| DOC_EXTENSIONS.iter().any(|d| ext.eq_ignore_ascii_case(d)))
}
