//! Sidebar navigation for Folio.
//!
//! A navigation descriptor (`sidebars.yaml` or `sidebars.json`) maps sidebar
//! names to ordered item lists. [`SidebarsFile::resolve`] checks every doc
//! reference against the [`Corpus`](folio_content::Corpus) and produces a
//! [`NavigationTree`] that answers the questions a page needs: which sidebar
//! it belongs to, its breadcrumbs, and its previous/next neighbours.
//!
//! When no descriptor exists, [`load_navigation`] falls back to a single
//! `docs` sidebar generated from the folder structure.

mod autogen;
mod sidebars;
mod tree;

use std::path::{Path, PathBuf};

use folio_content::Corpus;

pub use sidebars::{CategoryLink, Ordered, SidebarItem, SidebarsFile, SidebarsFormat, TypedItem};
pub use tree::{Breadcrumb, NavNode, NavigationTree, PageLink, Pagination, Sidebar};

/// Error loading or resolving navigation.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// Failed to read the descriptor.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Descriptor is not valid YAML/JSON or has the wrong shape.
    #[error("invalid sidebars{}: {message}", display_path(.path))]
    Parse {
        path: Option<PathBuf>,
        message: String,
    },
    /// Descriptor has an extension other than yaml, yml or json.
    #[error("unsupported sidebars format: {} (expected .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),
    /// Doc references with no matching document.
    #[error("sidebars reference missing documents: {}", .ids.join(", "))]
    MissingDocs { ids: Vec<String> },
    /// Category that resolved to no items.
    #[error("category '{label}' in sidebar '{sidebar}' has no items")]
    EmptyCategory { sidebar: String, label: String },
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" file {}", p.display()))
        .unwrap_or_default()
}

/// Load the descriptor at `path` and resolve it, or autogenerate the
/// navigation when the file doesn't exist.
///
/// # Errors
///
/// Returns an error if the descriptor exists but can't be loaded or
/// resolved.
pub fn load_navigation(path: &Path, corpus: &Corpus) -> Result<NavigationTree, NavError> {
    if !path.exists() {
        tracing::info!(
            path = %path.display(),
            "No sidebars file, generating navigation from folder structure"
        );
        return Ok(NavigationTree::autogenerated(corpus));
    }

    let tree = SidebarsFile::load(path)?.resolve(corpus)?;
    tracing::debug!(
        sidebars = tree.sidebars().len(),
        docs = tree.referenced_docs().len(),
        "Resolved navigation"
    );
    Ok(tree)
}
