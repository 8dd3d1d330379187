//! Static site generation for Folio.
//!
//! [`SiteBuilder`] turns a docs corpus, its navigation descriptor and the
//! site configuration into a static HTML tree:
//!
//! - one page per document (`{route_base}/{route}/index.html`)
//! - landing page, `404.html`, stylesheet, `sitemap.xml`, `.nojekyll`
//! - `folio-manifest.json` listing every emitted file with its SHA-256
//!
//! Internal links are checked against the corpus before anything is
//! written, and [`GitPublisher`] pushes a built tree to a hosting branch.
//!
//! # Example
//!
//! ```ignore
//! use folio_config::Config;
//! use folio_site::SiteBuilder;
//!
//! let config = Config::load(None, None)?;
//! let report = SiteBuilder::new(&config).build()?;
//! println!("{} pages", report.pages);
//! ```

mod assets;
mod builder;
mod deploy;
mod links;
mod output;
mod sitemap;
mod template;
mod urls;

use std::path::PathBuf;

use folio_content::ContentError;
use folio_nav::NavError;

pub use builder::{BuildReport, SiteBuilder};
pub use deploy::{DeployError, DeployOutcome, GitPublisher, PublishConfig};
pub use links::{BrokenLink, BrokenLinkKind, LinkChecker};
pub use output::{MANIFEST_FILE, Manifest, ManifestEntry, WriteStats};
pub use urls::SiteLayout;

/// Error returned by [`SiteBuilder`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Navigation(#[from] NavError),
    /// Links that failed under the `throw` policy.
    #[error("found {} broken link(s):\n{}", .0.len(), list_links(.0))]
    BrokenLinks(Vec<BrokenLink>),
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize build manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

fn list_links(links: &[BrokenLink]) -> String {
    links
        .iter()
        .map(|link| format!("  - {link}"))
        .collect::<Vec<_>>()
        .join("\n")
}
