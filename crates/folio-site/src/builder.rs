//! Static site builder.

use std::path::{Path, PathBuf};
use std::time::Instant;

use folio_config::{BrokenLinkPolicy, Config};
use folio_content::{Corpus, Document, LoadOptions, parent_dir};
use folio_nav::{NavigationTree, load_navigation};
use folio_renderer::{KnownLanguages, MarkdownRenderer, RenderResult, join_relative};
use rayon::prelude::*;

use crate::assets::stylesheet;
use crate::links::{BrokenLink, LinkChecker, decode};
use crate::output::{SiteOutput, WriteStats};
use crate::sitemap::sitemap_xml;
use crate::template::{STYLESHEET_PATH, Theme};
use crate::urls::{SiteLayout, href};
use crate::BuildError;

/// Summary of a build or check run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Documents in the corpus.
    pub documents: usize,
    /// Documents referenced by the navigation tree.
    pub referenced_documents: usize,
    /// Document pages produced.
    pub pages: usize,
    /// Output files, including generated ones and the manifest.
    pub files: usize,
    /// Write counts (all zero for [`SiteBuilder::check`]).
    pub written: WriteStats,
    /// Rendering warnings, prefixed with the source path.
    pub warnings: Vec<String>,
    /// Broken links reported under the `warn` policy.
    pub broken_links: Vec<BrokenLink>,
}

/// Builds the static site described by a [`Config`].
pub struct SiteBuilder<'c> {
    config: &'c Config,
    include_drafts: bool,
    out_dir: PathBuf,
}

/// Corpus, navigation and rendered documents, ready for templating.
struct PreparedSite {
    corpus: Corpus,
    nav: NavigationTree,
    layout: SiteLayout,
    /// Rendered bodies, parallel to `corpus.documents()`.
    rendered: Vec<RenderResult>,
    warnings: Vec<String>,
    broken_links: Vec<BrokenLink>,
}

impl<'c> SiteBuilder<'c> {
    /// Builder writing to `config.paths.out_dir`, drafts excluded.
    #[must_use]
    pub fn new(config: &'c Config) -> Self {
        Self {
            config,
            include_drafts: false,
            out_dir: config.paths.out_dir.clone(),
        }
    }

    /// Include `draft: true` documents (dev server).
    #[must_use]
    pub fn with_drafts(mut self, include: bool) -> Self {
        self.include_drafts = include;
        self
    }

    #[must_use]
    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    #[must_use]
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Build the site and write it to the output directory.
    ///
    /// Nothing is written when loading, navigation or link checking fails.
    ///
    /// # Errors
    ///
    /// Returns an error for content or navigation problems, broken links
    /// under the `throw` policy, or write failures.
    pub fn build(&self) -> Result<BuildReport, BuildError> {
        let started = Instant::now();
        let site = self.prepare()?;
        let output = self.stage(&site);
        let mut report = site.report(output.len() + 1);

        report.written = output.write(&self.out_dir)?;
        tracing::info!(
            out_dir = %self.out_dir.display(),
            pages = report.pages,
            written = report.written.written,
            unchanged = report.written.unchanged,
            removed = report.written.removed,
            elapsed_ms = started.elapsed().as_millis(),
            "Site built"
        );
        Ok(report)
    }

    /// Run every build step except writing.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build), minus write failures.
    pub fn check(&self) -> Result<BuildReport, BuildError> {
        let site = self.prepare()?;
        let output = self.stage(&site);
        let report = site.report(output.len() + 1);
        tracing::info!(pages = report.pages, "Site checked");
        Ok(report)
    }

    fn prepare(&self) -> Result<PreparedSite, BuildError> {
        let paths = &self.config.paths;
        let corpus = Corpus::load(
            &paths.source_dir,
            &LoadOptions {
                include_drafts: self.include_drafts,
            },
        )?;
        let nav = load_navigation(&paths.sidebar_path, &corpus)?;
        let layout = SiteLayout::from_config(self.config);
        let languages = KnownLanguages::new(&self.config.theme.prism.additional_languages);

        let rendered: Vec<RenderResult> = corpus
            .documents()
            .par_iter()
            .map(|doc| render_document(doc, &corpus, &layout, &languages))
            .collect();
        tracing::info!(documents = rendered.len(), "Rendered documents");

        let mut warnings = Vec::new();
        for (doc, result) in corpus.iter().zip(&rendered) {
            for warning in &result.warnings {
                tracing::warn!(source = %doc.source_path, "{warning}");
                warnings.push(format!("{}: {warning}", doc.source_path));
            }
        }

        let broken_links = self.check_links(&corpus, &layout, &rendered)?;

        Ok(PreparedSite {
            corpus,
            nav,
            layout,
            rendered,
            warnings,
            broken_links,
        })
    }

    /// Check links and apply the broken-link policies.
    ///
    /// Returns the links kept as warnings.
    fn check_links(
        &self,
        corpus: &Corpus,
        layout: &SiteLayout,
        rendered: &[RenderResult],
    ) -> Result<Vec<BrokenLink>, BuildError> {
        let mut checker = LinkChecker::new(corpus, layout, &self.config.base_url);
        for (doc, result) in corpus.iter().zip(rendered) {
            checker.add_anchors(&doc.id, result.heading_ids.iter().map(String::as_str));
        }

        let mut failures = Vec::new();
        let mut warned = Vec::new();
        for (doc, result) in corpus.iter().zip(rendered) {
            for link in checker.check(doc, &result.links) {
                match link.kind.policy(self.config) {
                    BrokenLinkPolicy::Throw => failures.push(link),
                    BrokenLinkPolicy::Warn => {
                        tracing::warn!(
                            source = %link.source,
                            target = %link.target,
                            "Broken link: {}",
                            link.kind
                        );
                        warned.push(link);
                    }
                    BrokenLinkPolicy::Ignore => {}
                }
            }
        }

        if failures.is_empty() {
            Ok(warned)
        } else {
            Err(BuildError::BrokenLinks(failures))
        }
    }

    /// Render every page and generated file into memory.
    fn stage(&self, site: &PreparedSite) -> SiteOutput {
        let theme = Theme {
            config: self.config,
            corpus: &site.corpus,
            nav: &site.nav,
            layout: &site.layout,
        };

        let pages: Vec<(String, String)> = site
            .corpus
            .documents()
            .par_iter()
            .zip(site.rendered.par_iter())
            .map(|(doc, rendered)| {
                (
                    site.layout.page_file(&doc.route),
                    theme.doc_page(doc, rendered),
                )
            })
            .collect();

        let mut output = SiteOutput::default();
        let mut urls: Vec<String> = Vec::with_capacity(pages.len() + 1);
        for (doc, (file, html)) in site.corpus.iter().zip(pages) {
            output.add(file, html);
            urls.push(site.layout.page_url(&doc.route));
        }

        // A doc routed at the site root replaces the landing page.
        if !output.contains("index.html") {
            output.add("index.html", theme.landing_page());
            urls.push(String::new());
        }
        for (path, contents) in [
            ("404.html", theme.not_found_page()),
            (STYLESHEET_PATH, stylesheet(&self.config.theme)),
            (
                "sitemap.xml",
                sitemap_xml(&self.config.site_url(), urls.iter().map(String::as_str)),
            ),
            (".nojekyll", String::new()),
        ] {
            if output.contains(path) {
                tracing::warn!(path, "Document page shadows a generated file");
                continue;
            }
            output.add(path, contents);
        }
        output
    }
}

impl PreparedSite {
    fn report(self, files: usize) -> BuildReport {
        BuildReport {
            documents: self.corpus.len(),
            referenced_documents: self.nav.referenced_docs().len(),
            pages: self.rendered.len(),
            files,
            written: WriteStats::default(),
            warnings: self.warnings,
            broken_links: self.broken_links,
        }
    }
}

/// Render one document, rewriting relative `.md` links to page hrefs.
fn render_document(
    doc: &Document,
    corpus: &Corpus,
    layout: &SiteLayout,
    languages: &KnownLanguages,
) -> RenderResult {
    let page_url = layout.page_url(&doc.route);
    let source_dir = parent_dir(&doc.source_path);
    let resolve = |path: &str| -> Option<String> {
        let source = join_relative(source_dir, &decode(path))?;
        let target = corpus.by_source(&source)?;
        Some(href(&page_url, &layout.page_url(&target.route)))
    };

    tracing::debug!(id = %doc.id, "Rendering document");
    MarkdownRenderer::new()
        .with_title_extraction()
        .with_link_resolver(&resolve)
        .with_known_languages(languages.clone())
        .render_markdown(&doc.body)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::fs;

    use super::*;
    use crate::BrokenLinkKind;
    use pretty_assertions::assert_eq;

    static_assertions::assert_impl_all!(SiteBuilder<'static>: Send, Sync);

    const CONFIG: &str = r#"
title = "Tutorials"
url = "https://example.github.io"
base_url = "/tutorials/"
"#;

    const SIDEBARS: &str = "
docs:
  - intro
  - type: category
    label: Cloud
    items:
      - cloud/kubernetes
";

    struct Project {
        dir: tempfile::TempDir,
    }

    impl Project {
        fn new(config: &str, sidebars: Option<&str>, docs: &[(&str, &str)]) -> Self {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("folio.toml"), config).unwrap();
            if let Some(sidebars) = sidebars {
                fs::write(dir.path().join("sidebars.yaml"), sidebars).unwrap();
            }
            for (rel, text) in docs {
                let path = dir.path().join("docs").join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, text).unwrap();
            }
            Self { dir }
        }

        fn standard() -> Self {
            Self::new(
                CONFIG,
                Some(SIDEBARS),
                &[
                    (
                        "intro.md",
                        "# Introduction\n\nSee [Kubernetes](./cloud/kubernetes.md#pods).\n",
                    ),
                    ("cloud/kubernetes.md", "# Kubernetes\n\n## Pods\n"),
                    ("unlisted.md", "# Unlisted\n"),
                ],
            )
        }

        fn config(&self) -> Config {
            let text = fs::read_to_string(self.dir.path().join("folio.toml")).unwrap();
            Config::from_toml_str(&text, self.dir.path()).unwrap()
        }

        fn out(&self) -> PathBuf {
            self.dir.path().join("build")
        }

        fn read(&self, rel: &str) -> String {
            fs::read_to_string(self.out().join(rel)).unwrap()
        }
    }

    fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
        let mut files = BTreeMap::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else {
                    let rel = path.strip_prefix(root).unwrap().to_string_lossy().into_owned();
                    files.insert(rel, fs::read(&path).unwrap());
                }
            }
        }
        files
    }

    #[test]
    fn test_build_writes_site() {
        let project = Project::standard();
        let config = project.config();
        let report = SiteBuilder::new(&config).build().unwrap();

        assert_eq!(report.documents, 3);
        assert_eq!(report.referenced_documents, 2);
        assert_eq!(report.pages, 3);
        assert_eq!(report.files, 9);
        assert_eq!(report.written.written, 9);
        for rel in [
            "docs/intro/index.html",
            "docs/cloud/kubernetes/index.html",
            "docs/unlisted/index.html",
            "index.html",
            "404.html",
            "assets/css/folio.css",
            "sitemap.xml",
            ".nojekyll",
            "folio-manifest.json",
        ] {
            assert!(project.out().join(rel).is_file(), "missing {rel}");
        }
    }

    #[test]
    fn test_markdown_links_rewritten_to_pages() {
        let project = Project::standard();
        let config = project.config();
        SiteBuilder::new(&config).build().unwrap();

        let intro = project.read("docs/intro/index.html");
        assert!(intro.contains("<a href=\"../cloud/kubernetes/#pods\">Kubernetes</a>"));
    }

    #[test]
    fn test_sitemap_lists_every_page() {
        let project = Project::standard();
        let config = project.config();
        SiteBuilder::new(&config).build().unwrap();

        let sitemap = project.read("sitemap.xml");
        let locs: Vec<_> = sitemap
            .lines()
            .filter_map(|l| l.trim().strip_prefix("<loc>"))
            .filter_map(|l| l.strip_suffix("</loc>"))
            .collect();
        assert_eq!(
            locs,
            vec![
                "https://example.github.io/tutorials/",
                "https://example.github.io/tutorials/docs/cloud/kubernetes/",
                "https://example.github.io/tutorials/docs/intro/",
                "https://example.github.io/tutorials/docs/unlisted/",
            ]
        );
    }

    #[test]
    fn test_rebuild_is_byte_identical() {
        let project = Project::standard();
        let config = project.config();
        let other = project.dir.path().join("build-2");

        SiteBuilder::new(&config).build().unwrap();
        SiteBuilder::new(&config).with_out_dir(&other).build().unwrap();
        assert_eq!(read_tree(&project.out()), read_tree(&other));

        let again = SiteBuilder::new(&config).build().unwrap();
        assert_eq!(again.written.written, 0);
        assert_eq!(again.written.unchanged, 9);
    }

    #[test]
    fn test_broken_link_fails_without_writing() {
        let project = Project::new(
            CONFIG,
            None,
            &[("intro.md", "# Intro\n\n[gone](/tutorials/docs/gone)\n")],
        );
        let config = project.config();
        let err = SiteBuilder::new(&config).build().unwrap_err();

        match err {
            BuildError::BrokenLinks(links) => {
                assert_eq!(links.len(), 1);
                assert_eq!(links[0].kind, BrokenLinkKind::MissingPage);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!project.out().exists());
    }

    #[test]
    fn test_warn_policies_report_links() {
        let project = Project::new(
            &format!("{CONFIG}on_broken_links = \"warn\"\n"),
            None,
            &[(
                "intro.md",
                "# Intro\n\n[a](/tutorials/docs/gone) [b](./missing.md) [c](#nope)\n",
            )],
        );
        let config = project.config();
        let report = SiteBuilder::new(&config).check().unwrap();
        let kinds: Vec<_> = report.broken_links.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BrokenLinkKind::MissingPage,
                BrokenLinkKind::MissingMarkdownFile,
                BrokenLinkKind::MissingAnchor,
            ]
        );
        assert!(!project.out().exists());
    }

    #[test]
    fn test_missing_sidebar_doc_fails() {
        let project = Project::new(
            CONFIG,
            Some("docs:\n  - intro\n  - ghost\n  - phantom\n"),
            &[("intro.md", "# Intro")],
        );
        let config = project.config();
        let err = SiteBuilder::new(&config).build().unwrap_err();
        assert!(matches!(err, BuildError::Navigation(_)));
        let message = err.to_string();
        assert!(message.contains("ghost"));
        assert!(message.contains("phantom"));
    }

    #[test]
    fn test_malformed_front_matter_fails() {
        let project = Project::new(CONFIG, None, &[("bad.md", "---\ntitle: [\n---\n")]);
        let config = project.config();
        let err = SiteBuilder::new(&config).build().unwrap_err();
        assert!(matches!(err, BuildError::Content(_)));
    }

    #[test]
    fn test_drafts_only_with_dev_option() {
        let project = Project::new(
            CONFIG,
            None,
            &[("intro.md", "# Intro"), ("wip.md", "---\ndraft: true\n---\n# WIP")],
        );
        let config = project.config();

        let report = SiteBuilder::new(&config).build().unwrap();
        assert_eq!(report.pages, 1);
        assert!(!project.out().join("docs/wip/index.html").exists());

        let dev = project.dir.path().join("dev");
        let report = SiteBuilder::new(&config)
            .with_drafts(true)
            .with_out_dir(&dev)
            .build()
            .unwrap();
        assert_eq!(report.pages, 2);
        assert!(dev.join("docs/wip/index.html").is_file());
    }

    #[test]
    fn test_removed_doc_page_deleted_on_rebuild() {
        let project = Project::standard();
        let config = project.config();
        SiteBuilder::new(&config).build().unwrap();
        fs::remove_file(project.dir.path().join("docs/unlisted.md")).unwrap();

        let report = SiteBuilder::new(&config).build().unwrap();
        assert_eq!(report.written.removed, 1);
        assert!(!project.out().join("docs/unlisted").exists());
    }

    #[test]
    fn test_flat_html_files() {
        let project = Project::new(
            &format!("{CONFIG}trailing_slash = false\n"),
            None,
            &[("intro.md", "# Intro\n\n[setup](setup.md)"), ("setup.md", "# Setup")],
        );
        let config = project.config();
        SiteBuilder::new(&config).build().unwrap();

        let intro = project.read("docs/intro.html");
        assert!(intro.contains("<a href=\"setup\">setup</a>"));
        assert!(project.out().join("docs/setup.html").is_file());
    }

    #[test]
    fn test_flat_links_to_category_index() {
        let project = Project::new(
            &format!("{CONFIG}trailing_slash = false\n"),
            None,
            &[
                ("intro.md", "# Intro"),
                ("guides/index.md", "# Guides"),
                ("guides/setup.md", "# Setup\n\n[back](./index.md)\n"),
            ],
        );
        let config = project.config();
        SiteBuilder::new(&config).build().unwrap();

        assert!(project.out().join("docs/guides.html").is_file());
        let setup = project.read("docs/guides/setup.html");
        assert!(setup.contains("<a href=\"../guides\">back</a>"));
        assert!(setup.contains("href=\"../guides\">Guides</a>"));
        assert!(!setup.contains("href=\"./\""));
    }

    #[test]
    fn test_spaces_in_routes_encoded() {
        let project = Project::new(
            CONFIG,
            None,
            &[
                ("intro.md", "# Intro\n\n[start](<getting started.md>)\n"),
                ("getting started.md", "# Getting started"),
            ],
        );
        let config = project.config();
        SiteBuilder::new(&config).build().unwrap();

        let intro = project.read("docs/intro/index.html");
        assert!(intro.contains("<a href=\"../getting%20started/\">start</a>"));
        assert!(project.read("sitemap.xml").contains("docs/getting%20started/</loc>"));
        assert!(project.out().join("docs/getting started/index.html").is_file());
    }

    #[test]
    fn test_root_doc_replaces_landing_page() {
        let project = Project::new(
            &format!("{CONFIG}\n[docs]\nroute_base_path = \"/\"\n"),
            None,
            &[("index.md", "# Welcome"), ("guide.md", "# Guide")],
        );
        let config = project.config();
        SiteBuilder::new(&config).build().unwrap();

        let index = project.read("index.html");
        assert!(index.contains("<title>Welcome | Tutorials</title>"));
        assert!(project.out().join("guide/index.html").is_file());
    }

    #[test]
    fn test_unknown_code_language_warns() {
        let project = Project::new(
            CONFIG,
            None,
            &[("intro.md", "# Intro\n\n```hcl\nx = 1\n```\n")],
        );
        let config = project.config();
        let report = SiteBuilder::new(&config).check().unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("intro.md: code block language 'hcl'"));
    }

    #[test]
    fn test_check_writes_nothing() {
        let project = Project::standard();
        let config = project.config();
        let report = SiteBuilder::new(&config).check().unwrap();
        assert_eq!(report.pages, 3);
        assert_eq!(report.written, WriteStats::default());
        assert!(!project.out().exists());
    }
}
