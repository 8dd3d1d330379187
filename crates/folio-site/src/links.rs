//! Internal link checking.
//!
//! Every link collected while rendering is classified and, when it points
//! inside the site, resolved against the corpus. Same-page and cross-page
//! anchors are checked against the heading ids of the target page.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use folio_config::{BrokenLinkPolicy, Config};
use folio_content::{Corpus, Document, parent_dir};
use folio_renderer::{
    CollectedLink, LinkKind, LinkRole, is_markdown_path, join_relative, split_path_fragment,
};
use percent_encoding::percent_decode_str;

use crate::urls::SiteLayout;

/// Generated files that site-root links may point at besides documents.
const SITE_FILES: &[&str] = &["", "404.html", "sitemap.xml", "assets/css/folio.css"];

/// Why a link is broken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BrokenLinkKind {
    /// Points at a page that doesn't exist.
    MissingPage,
    /// Relative `.md` link to a file that isn't in the corpus.
    MissingMarkdownFile,
    /// Target page exists but has no heading with that id.
    MissingAnchor,
}

impl BrokenLinkKind {
    /// Policy that governs this kind of breakage.
    ///
    /// Anchor checks only see heading ids, so they never fail a build.
    #[must_use]
    pub fn policy(self, config: &Config) -> BrokenLinkPolicy {
        match self {
            Self::MissingPage => config.on_broken_links,
            Self::MissingMarkdownFile => config.on_broken_markdown_links,
            Self::MissingAnchor => match config.on_broken_links {
                BrokenLinkPolicy::Throw => BrokenLinkPolicy::Warn,
                other => other,
            },
        }
    }
}

impl fmt::Display for BrokenLinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingPage => "page not found",
            Self::MissingMarkdownFile => "markdown file not found",
            Self::MissingAnchor => "anchor not found",
        })
    }
}

/// A link that doesn't resolve.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BrokenLink {
    /// Source path of the document containing the link.
    pub source: String,
    /// Link destination as written.
    pub target: String,
    pub kind: BrokenLinkKind,
}

impl fmt::Display for BrokenLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.source, self.target, self.kind)
    }
}

/// Resolves collected links against the corpus and rendered headings.
pub struct LinkChecker<'a> {
    corpus: &'a Corpus,
    layout: &'a SiteLayout,
    base_url: &'a str,
    anchors: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> LinkChecker<'a> {
    #[must_use]
    pub fn new(corpus: &'a Corpus, layout: &'a SiteLayout, base_url: &'a str) -> Self {
        Self {
            corpus,
            layout,
            base_url,
            anchors: BTreeMap::new(),
        }
    }

    /// Register the heading ids of a rendered document.
    pub fn add_anchors<I>(&mut self, doc_id: &'a str, ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.anchors.entry(doc_id).or_default().extend(ids);
    }

    /// Check every link of `doc`, returning the broken ones in source order.
    #[must_use]
    pub fn check(&self, doc: &Document, links: &[CollectedLink]) -> Vec<BrokenLink> {
        links
            .iter()
            .filter(|link| link.role == LinkRole::Anchor)
            .filter_map(|link| {
                self.check_link(doc, &link.target).map(|kind| BrokenLink {
                    source: doc.source_path.clone(),
                    target: link.target.clone(),
                    kind,
                })
            })
            .collect()
    }

    fn check_link(&self, doc: &Document, target: &str) -> Option<BrokenLinkKind> {
        match LinkKind::parse(target) {
            LinkKind::External(_) => None,
            LinkKind::Fragment(anchor) => self.check_anchor(&doc.id, anchor),
            LinkKind::SiteRoot(link) => {
                let (path, fragment) = split_path_and_fragment(link);
                let Some(site_path) = path.strip_prefix(self.base_url) else {
                    // `/site` without the trailing slash is still the site root
                    return (path != self.base_url.trim_end_matches('/'))
                        .then_some(BrokenLinkKind::MissingPage);
                };
                self.check_site_path(&decode(site_path), fragment)
            }
            LinkKind::FileRelative(link) => {
                let (path, fragment) = split_path_and_fragment(link);
                if is_markdown_path(path) {
                    let source = join_relative(parent_dir(&doc.source_path), &decode(path));
                    let Some(target_doc) = source.and_then(|s| self.corpus.by_source(&s)) else {
                        return Some(BrokenLinkKind::MissingMarkdownFile);
                    };
                    return self.check_anchor(&target_doc.id, fragment);
                }
                if has_asset_extension(path) {
                    return None;
                }
                let page_url = self.layout.page_url(&doc.route);
                let base = if page_url.ends_with('/') || page_url.is_empty() {
                    page_url.as_str()
                } else {
                    parent_dir(&page_url)
                };
                let Some(site_path) = join_relative(base, &decode(path)) else {
                    return Some(BrokenLinkKind::MissingPage);
                };
                self.check_site_path(&site_path, fragment)
            }
        }
    }

    fn check_site_path(&self, site_path: &str, fragment: &str) -> Option<BrokenLinkKind> {
        let trimmed = site_path.trim_matches('/');
        if let Some(route) = self.layout.route_for_url(trimmed)
            && let Some(target) = self.corpus.by_route(route)
        {
            return self.check_anchor(&target.id, fragment);
        }
        if SITE_FILES.contains(&trimmed) || has_asset_extension(trimmed) {
            return None;
        }
        Some(BrokenLinkKind::MissingPage)
    }

    fn check_anchor(&self, doc_id: &str, anchor: &str) -> Option<BrokenLinkKind> {
        if anchor.is_empty() {
            return None;
        }
        let anchor = decode(anchor);
        let found = self
            .anchors
            .get(doc_id)
            .is_some_and(|ids| ids.contains(anchor.as_str()));
        (!found).then_some(BrokenLinkKind::MissingAnchor)
    }
}

/// Path without its query string, and the fragment.
fn split_path_and_fragment(link: &str) -> (&str, &str) {
    let (path, fragment) = split_path_fragment(link);
    (path.split('?').next().unwrap_or(path), fragment)
}

pub(crate) fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Non-page files (images, downloads) are not part of the corpus.
fn has_asset_extension(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && !ext.eq_ignore_ascii_case("html") && !ext.is_empty()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use folio_renderer::MarkdownRenderer;
    use pretty_assertions::assert_eq;

    fn corpus(files: &[(&str, &str)]) -> Corpus {
        let docs = files
            .iter()
            .map(|(path, text)| Document::parse(path, PathBuf::from(path), text).unwrap())
            .collect();
        Corpus::from_documents(docs).unwrap()
    }

    fn check(corpus: &Corpus, base_url: &str, source: &str) -> Vec<(String, BrokenLinkKind)> {
        let layout = SiteLayout::new("docs", true);
        let rendered: Vec<_> = corpus
            .iter()
            .map(|d| (d, MarkdownRenderer::new().render_markdown(&d.body)))
            .collect();
        let mut checker = LinkChecker::new(corpus, &layout, base_url);
        for (doc, result) in &rendered {
            checker.add_anchors(&doc.id, result.heading_ids.iter().map(String::as_str));
        }
        let (doc, result) = rendered
            .iter()
            .find(|(d, _)| d.source_path == source)
            .unwrap();
        checker
            .check(doc, &result.links)
            .into_iter()
            .map(|b| (b.target, b.kind))
            .collect()
    }

    #[test]
    fn test_valid_links() {
        let corpus = corpus(&[
            (
                "intro.md",
                "# Intro\n\n## Setup\n\n[a](#setup) [b](./cloud/helm.md#charts) \
                 [c](/docs/cloud/helm) [d](https://example.com) [e](../cloud/helm/) \
                 [f](/sitemap.xml) [g](./diagram.png) [h](mailto:x@y.z)",
            ),
            ("cloud/helm.md", "# Helm\n\n## Charts"),
        ]);
        assert_eq!(check(&corpus, "/", "intro.md"), vec![]);
    }

    #[test]
    fn test_relative_links_resolve_from_page_url() {
        // intro renders at docs/intro/, so `../cloud/helm` is docs/cloud/helm
        let corpus = corpus(&[
            ("intro.md", "[ok](../cloud/helm) [bad](cloud/helm)"),
            ("cloud/helm.md", "# Helm"),
        ]);
        assert_eq!(
            check(&corpus, "/", "intro.md"),
            vec![("cloud/helm".to_owned(), BrokenLinkKind::MissingPage)]
        );
    }

    #[test]
    fn test_broken_links() {
        let corpus = corpus(&[(
            "guide.md",
            "# Guide\n\n[a](./missing.md) [b](/docs/nowhere) [c](#nope) [d](../../../x.md)",
        )]);
        assert_eq!(
            check(&corpus, "/", "guide.md"),
            vec![
                ("./missing.md".to_owned(), BrokenLinkKind::MissingMarkdownFile),
                ("/docs/nowhere".to_owned(), BrokenLinkKind::MissingPage),
                ("#nope".to_owned(), BrokenLinkKind::MissingAnchor),
                ("../../../x.md".to_owned(), BrokenLinkKind::MissingMarkdownFile),
            ]
        );
    }

    #[test]
    fn test_base_url_prefix() {
        let corpus = corpus(&[
            ("a.md", "[ok](/site/docs/b) [home](/site/) [outside](/docs/b)"),
            ("b.md", "# B"),
        ]);
        assert_eq!(
            check(&corpus, "/site/", "a.md"),
            vec![("/docs/b".to_owned(), BrokenLinkKind::MissingPage)]
        );
    }

    #[test]
    fn test_percent_encoded_and_query() {
        let corpus = corpus(&[
            ("a.md", "[x](./my%20page.md) [y](/docs/b?tab=1)"),
            ("my page.md", "# Spaced"),
            ("b.md", "# B"),
        ]);
        assert_eq!(check(&corpus, "/", "a.md"), vec![]);
    }

    #[test]
    fn test_images_not_checked() {
        let corpus = corpus(&[("a.md", "![d](./img/missing.svg)")]);
        assert_eq!(check(&corpus, "/", "a.md"), vec![]);
    }

    #[test]
    fn test_anchor_policy_never_throws() {
        let mut config = Config::from_toml_str("", std::path::Path::new("/p")).unwrap();
        config.on_broken_links = BrokenLinkPolicy::Throw;
        assert_eq!(
            BrokenLinkKind::MissingAnchor.policy(&config),
            BrokenLinkPolicy::Warn
        );
        assert_eq!(
            BrokenLinkKind::MissingPage.policy(&config),
            BrokenLinkPolicy::Throw
        );
        config.on_broken_links = BrokenLinkPolicy::Ignore;
        assert_eq!(
            BrokenLinkKind::MissingAnchor.policy(&config),
            BrokenLinkPolicy::Ignore
        );
    }

    #[test]
    fn test_broken_link_display() {
        let link = BrokenLink {
            source: "guide.md".to_owned(),
            target: "./x.md".to_owned(),
            kind: BrokenLinkKind::MissingMarkdownFile,
        };
        assert_eq!(link.to_string(), "guide.md: ./x.md (markdown file not found)");
    }
}
