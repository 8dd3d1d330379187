//! Markdown content corpus for Folio.
//!
//! This crate discovers the documentation tree and turns each file into a
//! [`Document`]:
//!
//! - Recursive directory scanning (hidden entries and `_` partials skipped)
//! - YAML front matter parsing
//! - Document id, route and title derivation
//!
//! # Example
//!
//! ```ignore
//! use folio_content::{Corpus, LoadOptions};
//!
//! let corpus = Corpus::load(Path::new("docs"), &LoadOptions::default())?;
//! for doc in corpus.iter() {
//!     println!("{}: {}", doc.id, doc.title);
//! }
//! ```

mod document;
mod front_matter;
mod route;
mod scanner;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

pub use document::Document;
pub use front_matter::{FrontMatter, FrontMatterError, parse_front_matter, split_front_matter};
pub use route::{doc_id, doc_route, parent_dir, strip_number_prefix, titlecase_from_slug};
use route::normalize_source_path;
use scanner::Scanner;

/// Error loading the content corpus.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Failed to read a document file.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Malformed front matter.
    #[error("{}: {message}", .path.display())]
    FrontMatter {
        /// File with the broken block.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// Two files produce the same document id.
    #[error("duplicate document id '{id}': {first} and {second}")]
    DuplicateId {
        /// The clashing id.
        id: String,
        /// Source path of the first document.
        first: String,
        /// Source path of the second document.
        second: String,
    },
    /// Two documents resolve to the same route.
    #[error("duplicate route '/{route}': {first} and {second}")]
    DuplicateRoute {
        /// The clashing route.
        route: String,
        /// Source path of the first document.
        first: String,
        /// Source path of the second document.
        second: String,
    },
    /// The docs directory doesn't exist.
    #[error("docs directory not found: {}", .0.display())]
    MissingRoot(PathBuf),
    /// Directory traversal failed.
    #[error("failed to walk docs directory: {0}")]
    Walk(String),
}

/// Options for [`Corpus::load`].
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadOptions {
    /// Keep documents with `draft: true` (dev server only).
    pub include_drafts: bool,
}

/// The set of documents making up the site, ordered by id.
#[derive(Debug, Default)]
pub struct Corpus {
    root: PathBuf,
    docs: Vec<Document>,
    by_id: BTreeMap<String, usize>,
    by_source: BTreeMap<String, usize>,
    by_route: BTreeMap<String, usize>,
}

impl Corpus {
    /// Discover and parse every document under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is missing, a file can't be read or has
    /// malformed front matter, or two documents share an id or route.
    pub fn load(root: &Path, options: &LoadOptions) -> Result<Self, ContentError> {
        if !root.is_dir() {
            return Err(ContentError::MissingRoot(root.to_path_buf()));
        }

        let refs = Scanner::new(root.to_path_buf()).scan()?;
        tracing::debug!(count = refs.len(), root = %root.display(), "Scanned docs directory");

        let parsed: Vec<Document> = refs
            .into_par_iter()
            .map(|r| {
                let text = fs::read_to_string(&r.path).map_err(|source| ContentError::Io {
                    path: r.path.clone(),
                    source,
                })?;
                let source_path = normalize_source_path(&r.rel_path);
                tracing::debug!(path = %source_path, "Parsed document");
                Document::parse(&source_path, r.path, &text)
            })
            .collect::<Result<_, _>>()?;

        let total = parsed.len();
        let docs: Vec<Document> = parsed
            .into_iter()
            .filter(|doc| options.include_drafts || !doc.is_draft())
            .collect();
        let drafts = total - docs.len();
        if drafts > 0 {
            tracing::info!(drafts, "Skipped draft documents");
        }

        let mut corpus = Self::from_documents(docs)?;
        corpus.root = root.to_path_buf();
        tracing::info!(documents = corpus.len(), "Loaded content corpus");
        Ok(corpus)
    }

    /// Build a corpus from already-parsed documents.
    ///
    /// # Errors
    ///
    /// Returns an error if two documents share an id or route.
    pub fn from_documents(mut docs: Vec<Document>) -> Result<Self, ContentError> {
        docs.sort_by(|a, b| a.id.cmp(&b.id).then_with(|| a.source_path.cmp(&b.source_path)));

        let mut by_id = BTreeMap::new();
        let mut by_source = BTreeMap::new();
        let mut by_route: BTreeMap<String, usize> = BTreeMap::new();

        for (idx, doc) in docs.iter().enumerate() {
            if let Some(&prev) = by_id.get(&doc.id) {
                let first: &Document = &docs[prev];
                return Err(ContentError::DuplicateId {
                    id: doc.id.clone(),
                    first: first.source_path.clone(),
                    second: doc.source_path.clone(),
                });
            }
            if let Some(&prev) = by_route.get(&doc.route) {
                let first: &Document = &docs[prev];
                return Err(ContentError::DuplicateRoute {
                    route: doc.route.clone(),
                    first: first.source_path.clone(),
                    second: doc.source_path.clone(),
                });
            }
            by_id.insert(doc.id.clone(), idx);
            by_source.insert(doc.source_path.clone(), idx);
            by_route.insert(doc.route.clone(), idx);
        }

        Ok(Self {
            root: PathBuf::new(),
            docs,
            by_id,
            by_source,
            by_route,
        })
    }

    /// Docs directory the corpus was loaded from.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Look up a document by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.by_id.get(id).map(|&i| &self.docs[i])
    }

    /// Look up a document by its relative source path.
    #[must_use]
    pub fn by_source(&self, source_path: &str) -> Option<&Document> {
        self.by_source.get(source_path).map(|&i| &self.docs[i])
    }

    /// Look up a document by route (leading and trailing slashes ignored).
    #[must_use]
    pub fn by_route(&self, route: &str) -> Option<&Document> {
        self.by_route
            .get(route.trim_matches('/'))
            .map(|&i| &self.docs[i])
    }

    /// Documents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }

    /// Documents as a slice, in id order.
    #[must_use]
    pub fn documents(&self) -> &[Document] {
        &self.docs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
