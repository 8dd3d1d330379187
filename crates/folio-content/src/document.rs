//! Document type.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::ContentError;
use crate::front_matter::{FrontMatter, parse_front_matter};
use crate::route::{doc_id, doc_route, parent_dir, strip_number_prefix, titlecase_from_slug};

static H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#\s+(.+?)(?:\s+#+)?\s*$").expect("valid regex"));

/// A Markdown document in the corpus.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Document id (e.g. `cloud/kubernetes`), unique within the corpus.
    pub id: String,
    /// Source path relative to the docs directory, `/`-separated.
    pub source_path: String,
    /// Path on disk.
    pub file_path: PathBuf,
    /// Parsed front matter.
    pub front_matter: FrontMatter,
    /// Resolved title (front matter > first H1 > file name).
    pub title: String,
    /// Markdown body without the front matter block.
    pub body: String,
    /// Route under the docs base path, without slashes (`""` for the docs root).
    pub route: String,
    /// Ordering number taken from the file name prefix, if any.
    pub number_prefix: Option<u32>,
}

impl Document {
    /// Build a document from its source text.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::FrontMatter` if the front matter is malformed.
    pub fn parse(
        source_path: &str,
        file_path: PathBuf,
        text: &str,
    ) -> Result<Self, ContentError> {
        let (front_matter, body) =
            parse_front_matter(text).map_err(|e| ContentError::FrontMatter {
                path: file_path.clone(),
                message: e.to_string(),
            })?;

        let id = doc_id(source_path, front_matter.id.as_deref());
        let route = doc_route(&id, front_matter.slug.as_deref());

        let file_name = source_path.rsplit('/').next().unwrap_or(source_path);
        let stem = file_name.rsplit_once('.').map_or(file_name, |(s, _)| s);
        let (number_prefix, bare_stem) = strip_number_prefix(stem);

        let title = front_matter
            .title
            .clone()
            .or_else(|| extract_h1(body))
            .unwrap_or_else(|| fallback_title(&id, bare_stem));

        Ok(Self {
            id,
            source_path: source_path.to_owned(),
            file_path,
            front_matter,
            title,
            body: body.to_owned(),
            route,
            number_prefix,
        })
    }

    /// Label for navigation entries.
    #[must_use]
    pub fn sidebar_label(&self) -> &str {
        self.front_matter
            .sidebar_label
            .as_deref()
            .unwrap_or(&self.title)
    }

    /// Position used to order autogenerated sidebars.
    #[must_use]
    pub fn sidebar_position(&self) -> Option<f64> {
        self.front_matter
            .sidebar_position
            .or(self.number_prefix.map(f64::from))
    }

    /// Directory part of the document id.
    #[must_use]
    pub fn id_dir(&self) -> &str {
        parent_dir(&self.id)
    }

    /// Whether this document is a draft.
    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.front_matter.draft
    }
}

/// Extract the first H1 heading outside fenced code blocks.
fn extract_h1(body: &str) -> Option<String> {
    let mut in_fence = false;
    for line in body.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(caps) = H1.captures(line) {
            let title = caps[1].trim();
            if !title.is_empty() {
                return Some(title.to_owned());
            }
        }
    }
    None
}

/// Title from the file name; `index`/`readme` files use their directory name.
fn fallback_title(id: &str, stem: &str) -> String {
    if stem.eq_ignore_ascii_case("index") || stem.eq_ignore_ascii_case("readme") {
        let dir = parent_dir(id);
        let name = dir.rsplit('/').next().unwrap_or(dir);
        if !name.is_empty() {
            return titlecase_from_slug(name);
        }
    }
    titlecase_from_slug(stem)
}
