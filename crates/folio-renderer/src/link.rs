//! Link classification and resolution.

/// Syntactic classification of a link destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind<'a> {
    /// Has a URL scheme (`https:`, `mailto:`) or is protocol-relative (`//cdn`).
    External(&'a str),
    /// Same-page anchor. Value is the anchor without `#`.
    Fragment(&'a str),
    /// Absolute path on this host (`/docs/intro`).
    SiteRoot(&'a str),
    /// Relative to the current file (`./setup.md`, `../faq`).
    FileRelative(&'a str),
}

impl<'a> LinkKind<'a> {
    #[must_use]
    pub fn parse(link: &'a str) -> Self {
        if is_external_link(link) {
            Self::External(link)
        } else if let Some(anchor) = link.strip_prefix('#') {
            Self::Fragment(anchor)
        } else if let Some(anchor) = link.strip_prefix("./#") {
            Self::Fragment(anchor)
        } else if link.starts_with('/') {
            Self::SiteRoot(link)
        } else {
            Self::FileRelative(link)
        }
    }
}

/// Whether a link carries a scheme or starts with `//`.
#[must_use]
pub fn is_external_link(link: &str) -> bool {
    if link.starts_with("//") {
        return true;
    }
    link.find(':').is_some_and(|pos| {
        pos > 0
            && link[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Split a URL into path and fragment (fragment is `""` when absent).
#[must_use]
pub fn split_path_fragment(url: &str) -> (&str, &str) {
    url.split_once('#').unwrap_or((url, ""))
}

/// Whether a path (query and fragment stripped) points at a Markdown file.
#[must_use]
pub fn is_markdown_path(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".md") || lower.ends_with(".mdx")
}

/// Role of a collected link in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LinkRole {
    /// `[text](dest)`.
    Anchor,
    /// `![alt](src)`.
    Image,
}

/// A link destination found while rendering, as written in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedLink {
    pub target: String,
    pub role: LinkRole,
}

/// Maps relative Markdown file links to page URLs.
///
/// `path` is the link's path part with the fragment removed, exactly as
/// written (`../guides/setup.md`). Return `None` when the file is not a
/// known document; the link is then emitted unchanged.
pub trait LinkResolver {
    fn resolve(&self, path: &str) -> Option<String>;
}

impl<F> LinkResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, path: &str) -> Option<String> {
        self(path)
    }
}

/// Join a relative path onto a `/`-separated directory.
///
/// `.` segments are dropped and `..` pops a segment. Returns `None` if the
/// path climbs above the root.
#[must_use]
pub fn join_relative(base_dir: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            _ => segments.push(component),
        }
    }
    Some(segments.join("/"))
}
