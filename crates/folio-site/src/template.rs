//! HTML page templates.
//!
//! Pages share one shell: navbar, a three-column layout (sidebar, article,
//! table of contents) and the footer. All URLs are relative to the page so
//! the output works under any `base_url`, except on the 404 page which is
//! served at arbitrary paths.

use std::fmt::Write;

use folio_config::{Config, FooterStyle, NavbarItem, NavbarPosition};
use folio_content::{Corpus, Document};
use folio_nav::{NavNode, NavigationTree};
use folio_renderer::{RenderResult, TocEntry, escape_html as escape, is_external_link};

use crate::urls::{Linker, SiteLayout};

/// Stylesheet location relative to the site root.
pub(crate) const STYLESHEET_PATH: &str = "assets/css/folio.css";

/// Renders full pages for a site.
pub(crate) struct Theme<'a> {
    pub config: &'a Config,
    pub corpus: &'a Corpus,
    pub nav: &'a NavigationTree,
    pub layout: &'a SiteLayout,
}

/// Head metadata for one page.
struct Head<'a> {
    title: String,
    description: Option<&'a str>,
    keywords: &'a [String],
    canonical: Option<String>,
}

impl Theme<'_> {
    /// Render the page of a document.
    pub fn doc_page(&self, doc: &Document, rendered: &RenderResult) -> String {
        let page_url = self.layout.page_url(&doc.route);
        let linker = Linker::Relative { from: &page_url };
        let head = Head {
            title: format!("{} | {}", doc.title, self.config.title),
            description: doc.front_matter.description.as_deref(),
            keywords: &doc.front_matter.keywords,
            canonical: Some(format!("{}{page_url}", self.config.site_url())),
        };

        let mut html = String::with_capacity(rendered.html.len() + 8192);
        self.open(&mut html, &head, linker);

        html.push_str("<div class=\"layout\">\n");
        self.render_sidebar(&mut html, doc, linker);

        html.push_str("<main class=\"doc\">\n");
        self.render_breadcrumbs(&mut html, doc, linker);
        html.push_str("<article class=\"markdown\">\n");
        if rendered.title.is_none() {
            let _ = writeln!(html, "<h1>{}</h1>", escape(&doc.title));
        }
        html.push_str(&rendered.html);
        html.push_str("\n</article>\n");
        self.render_edit_link(&mut html, doc);
        self.render_pagination(&mut html, doc, linker);
        html.push_str("</main>\n");

        if !doc.front_matter.hide_table_of_contents {
            render_toc(&mut html, &rendered.toc);
        }
        html.push_str("</div>\n");

        self.close(&mut html, linker);
        html
    }

    /// Render the landing page at the site root.
    pub fn landing_page(&self) -> String {
        let linker = Linker::Relative { from: "" };
        let head = Head {
            title: self.config.title.clone(),
            description: Some(self.config.tagline.as_str()).filter(|t| !t.is_empty()),
            keywords: &[],
            canonical: Some(self.config.site_url()),
        };

        let mut html = String::with_capacity(4096);
        self.open(&mut html, &head, linker);
        html.push_str("<main class=\"hero\">\n");
        let _ = writeln!(
            html,
            "<h1 class=\"hero-title\">{}</h1>",
            escape(&self.config.title)
        );
        if !self.config.tagline.is_empty() {
            let _ = writeln!(
                html,
                "<p class=\"hero-tagline\">{}</p>",
                escape(&self.config.tagline)
            );
        }
        if let Some(first) = self.nav.first_doc().and_then(|id| self.corpus.get(id)) {
            let _ = writeln!(
                html,
                "<a class=\"button\" href=\"{}\">Get started</a>",
                escape(&linker.to(&self.layout.page_url(&first.route)))
            );
        }
        html.push_str("</main>\n");
        self.close(&mut html, linker);
        html
    }

    /// Render `404.html`.
    pub fn not_found_page(&self) -> String {
        let linker = Linker::Absolute {
            base_url: &self.config.base_url,
        };
        let head = Head {
            title: format!("Page Not Found | {}", self.config.title),
            description: None,
            keywords: &[],
            canonical: None,
        };

        let mut html = String::with_capacity(4096);
        self.open(&mut html, &head, linker);
        html.push_str("<main class=\"hero\">\n");
        html.push_str("<h1 class=\"hero-title\">Page Not Found</h1>\n");
        html.push_str("<p>We could not find what you were looking for.</p>\n");
        let _ = writeln!(
            html,
            "<a class=\"button\" href=\"{}\">Back to home</a>",
            escape(&linker.to(""))
        );
        html.push_str("</main>\n");
        self.close(&mut html, linker);
        html
    }

    /// Document head and navbar.
    fn open(&self, html: &mut String, head: &Head<'_>, linker: Linker<'_>) {
        let _ = writeln!(
            html,
            "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>",
            escape(&self.config.i18n.default_locale)
        );
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        html.push_str("<meta name=\"generator\" content=\"Folio\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape(&head.title));
        if let Some(description) = head.description {
            let _ = writeln!(
                html,
                "<meta name=\"description\" content=\"{}\">",
                escape(description)
            );
        }
        if !head.keywords.is_empty() {
            let _ = writeln!(
                html,
                "<meta name=\"keywords\" content=\"{}\">",
                escape(&head.keywords.join(", "))
            );
        }
        if let Some(canonical) = &head.canonical {
            let _ = writeln!(html, "<link rel=\"canonical\" href=\"{}\">", escape(canonical));
        }
        let _ = writeln!(
            html,
            "<link rel=\"stylesheet\" href=\"{}\">",
            escape(&linker.to(STYLESHEET_PATH))
        );
        self.render_analytics(html);
        html.push_str("</head>\n<body>\n");
        self.render_navbar(html, linker);
    }

    fn close(&self, html: &mut String, linker: Linker<'_>) {
        self.render_footer(html, linker);
        html.push_str("</body>\n</html>\n");
    }

    fn render_analytics(&self, html: &mut String) {
        let Some(analytics) = &self.config.plugins.analytics else {
            return;
        };
        let id = escape(&analytics.tracking_id);
        let _ = writeln!(
            html,
            "<script async src=\"https://www.googletagmanager.com/gtag/js?id={id}\"></script>"
        );
        let _ = writeln!(
            html,
            "<script>window.dataLayer = window.dataLayer || [];\
             function gtag(){{dataLayer.push(arguments);}}\
             gtag('js', new Date());\
             gtag('config', '{id}', {{ 'anonymize_ip': {} }});</script>",
            analytics.anonymize_ip
        );
    }

    fn render_navbar(&self, html: &mut String, linker: Linker<'_>) {
        let navbar = &self.config.theme.navbar;
        html.push_str("<nav class=\"navbar\">\n<div class=\"navbar-items\">\n");
        let _ = write!(html, "<a class=\"navbar-brand\" href=\"{}\">", escape(&linker.to("")));
        if let Some(logo) = &navbar.logo {
            let _ = write!(
                html,
                "<img class=\"navbar-logo\" src=\"{}\" alt=\"\">",
                escape(&site_or_external(logo, linker))
            );
        }
        let brand = navbar.title.as_deref().unwrap_or(&self.config.title);
        let _ = writeln!(html, "<b>{}</b></a>", escape(brand));
        for item in navbar.items.iter().filter(|i| i.position == NavbarPosition::Left) {
            render_navbar_item(html, item, linker);
        }
        html.push_str("</div>\n<div class=\"navbar-items navbar-items-right\">\n");
        for item in navbar.items.iter().filter(|i| i.position == NavbarPosition::Right) {
            render_navbar_item(html, item, linker);
        }
        html.push_str("</div>\n</nav>\n");
    }

    fn render_sidebar(&self, html: &mut String, doc: &Document, linker: Linker<'_>) {
        let Some(sidebar) = self.nav.sidebar_for(&doc.id) else {
            return;
        };
        let _ = writeln!(
            html,
            "<aside class=\"sidebar\" data-sidebar=\"{}\">\n<nav class=\"menu\">\n<ul class=\"menu-list\">",
            escape(&sidebar.name)
        );
        self.render_nav_items(html, &sidebar.items, &doc.id, linker);
        html.push_str("</ul>\n</nav>\n</aside>\n");
    }

    /// Render sidebar items recursively.
    ///
    /// Collapsible categories use `<details>`; they start open when not
    /// collapsed or when they hold the current page.
    fn render_nav_items(
        &self,
        html: &mut String,
        items: &[NavNode],
        active: &str,
        linker: Linker<'_>,
    ) {
        for item in items {
            match item {
                NavNode::Doc { id, label } => {
                    html.push_str("<li class=\"menu-item\">");
                    self.render_doc_link(html, id, label, id == active, linker);
                    html.push_str("</li>\n");
                }
                NavNode::Link { label, href } => {
                    let _ = writeln!(
                        html,
                        "<li class=\"menu-item\"><a class=\"menu-link\" href=\"{}\" \
                         target=\"_blank\" rel=\"noopener noreferrer\">{}</a></li>",
                        escape(href),
                        escape(label)
                    );
                }
                NavNode::Category {
                    label,
                    collapsed,
                    collapsible,
                    link,
                    items,
                } => {
                    html.push_str("<li class=\"menu-category\">\n");
                    let open = !collapsed || item.contains_doc(active);
                    if *collapsible {
                        let _ = write!(html, "<details{}>\n<summary>", if open { " open" } else { "" });
                    } else {
                        html.push_str("<div class=\"menu-category-label\">");
                    }
                    match link {
                        Some(id) => {
                            self.render_doc_link(html, id, label, id == active, linker);
                        }
                        None => {
                            let _ = write!(html, "<span class=\"menu-label\">{}</span>", escape(label));
                        }
                    }
                    html.push_str(if *collapsible { "</summary>\n" } else { "</div>\n" });
                    html.push_str("<ul class=\"menu-list\">\n");
                    self.render_nav_items(html, items, active, linker);
                    html.push_str("</ul>\n");
                    if *collapsible {
                        html.push_str("</details>\n");
                    }
                    html.push_str("</li>\n");
                }
            }
        }
    }

    fn render_doc_link(
        &self,
        html: &mut String,
        id: &str,
        label: &str,
        is_active: bool,
        linker: Linker<'_>,
    ) {
        let Some(target) = self.corpus.get(id) else {
            return;
        };
        let (class, current) = if is_active {
            ("menu-link menu-link-active", " aria-current=\"page\"")
        } else {
            ("menu-link", "")
        };
        let _ = write!(
            html,
            "<a class=\"{class}\" href=\"{}\"{current}>{}</a>",
            escape(&linker.to(&self.layout.page_url(&target.route))),
            escape(label),
        );
    }

    fn render_breadcrumbs(&self, html: &mut String, doc: &Document, linker: Linker<'_>) {
        html.push_str("<nav class=\"breadcrumbs\" aria-label=\"Breadcrumbs\">\n<ol>\n");
        let _ = writeln!(
            html,
            "<li class=\"breadcrumb-item\"><a href=\"{}\">Home</a></li>",
            escape(&linker.to(""))
        );
        for crumb in self.nav.breadcrumbs(&doc.id) {
            match crumb.doc_id.as_deref().and_then(|id| self.corpus.get(id)) {
                Some(target) => {
                    let _ = writeln!(
                        html,
                        "<li class=\"breadcrumb-item\"><a href=\"{}\">{}</a></li>",
                        escape(&linker.to(&self.layout.page_url(&target.route))),
                        escape(&crumb.label)
                    );
                }
                None => {
                    let _ = writeln!(
                        html,
                        "<li class=\"breadcrumb-item\"><span>{}</span></li>",
                        escape(&crumb.label)
                    );
                }
            }
        }
        let _ = writeln!(
            html,
            "<li class=\"breadcrumb-item breadcrumb-item-active\" aria-current=\"page\">{}</li>",
            escape(doc.sidebar_label())
        );
        html.push_str("</ol>\n</nav>\n");
    }

    fn render_edit_link(&self, html: &mut String, doc: &Document) {
        let url = match (&doc.front_matter.custom_edit_url, &self.config.docs.edit_url) {
            (Some(custom), _) => custom.clone(),
            (None, Some(base)) => format!("{}/{}", base.trim_end_matches('/'), doc.source_path),
            (None, None) => return,
        };
        let _ = writeln!(
            html,
            "<div class=\"edit-this-page\"><a href=\"{}\" target=\"_blank\" \
             rel=\"noopener noreferrer\">Edit this page</a></div>",
            escape(&url)
        );
    }

    fn render_pagination(&self, html: &mut String, doc: &Document, linker: Linker<'_>) {
        let pagination = self.nav.pagination(&doc.id);
        if pagination.previous.is_none() && pagination.next.is_none() {
            return;
        }
        html.push_str("<nav class=\"pagination\" aria-label=\"Docs pages\">\n");
        for (link, class, sublabel) in [
            (&pagination.previous, "pagination-prev", "Previous"),
            (&pagination.next, "pagination-next", "Next"),
        ] {
            let Some(link) = link else {
                continue;
            };
            let Some(target) = self.corpus.get(&link.doc_id) else {
                continue;
            };
            let _ = writeln!(
                html,
                "<a class=\"pagination-link {class}\" href=\"{}\">\
                 <span class=\"pagination-sublabel\">{sublabel}</span>\
                 <span class=\"pagination-label\">{}</span></a>",
                escape(&linker.to(&self.layout.page_url(&target.route))),
                escape(&link.label)
            );
        }
        html.push_str("</nav>\n");
    }

    fn render_footer(&self, html: &mut String, linker: Linker<'_>) {
        let footer = &self.config.theme.footer;
        let style = match footer.style {
            FooterStyle::Light => "footer-light",
            FooterStyle::Dark => "footer-dark",
        };
        let _ = writeln!(html, "<footer class=\"footer {style}\">");
        if !footer.links.is_empty() {
            html.push_str("<div class=\"footer-links\">\n");
            for column in &footer.links {
                let _ = writeln!(
                    html,
                    "<div class=\"footer-column\">\n<div class=\"footer-title\">{}</div>\n<ul>",
                    escape(&column.title)
                );
                for link in &column.items {
                    let href = link_target(link.to.as_deref(), link.href.as_deref(), linker);
                    let _ = writeln!(
                        html,
                        "<li><a href=\"{}\">{}</a></li>",
                        escape(&href),
                        escape(&link.label)
                    );
                }
                html.push_str("</ul>\n</div>\n");
            }
            html.push_str("</div>\n");
        }
        if let Some(copyright) = &footer.copyright {
            let _ = writeln!(
                html,
                "<div class=\"footer-copyright\">{}</div>",
                escape(copyright)
            );
        }
        html.push_str("</footer>\n");
    }
}

fn render_navbar_item(html: &mut String, item: &NavbarItem, linker: Linker<'_>) {
    let href = link_target(item.to.as_deref(), item.href.as_deref(), linker);
    let external = if item.href.is_some() {
        " target=\"_blank\" rel=\"noopener noreferrer\""
    } else {
        ""
    };
    let _ = writeln!(
        html,
        "<a class=\"navbar-link\" href=\"{}\"{external}>{}</a>",
        escape(&href),
        escape(&item.label)
    );
}

/// Absolute URLs verbatim, anything else as a path under `base_url`.
fn site_or_external(target: &str, linker: Linker<'_>) -> String {
    if is_external_link(target) {
        target.to_owned()
    } else {
        linker.to(target.trim_start_matches('/'))
    }
}

/// `to` is a site path relative to `base_url`; `href` is used verbatim.
fn link_target(to: Option<&str>, href: Option<&str>, linker: Linker<'_>) -> String {
    match (to, href) {
        (Some(to), _) => linker.to(to.trim_start_matches('/')),
        (None, Some(href)) => href.to_owned(),
        (None, None) => String::new(),
    }
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<aside class=\"toc\">\n");
    html.push_str("<div class=\"toc-title\">On this page</div>\n<ul>\n");
    for entry in toc {
        let indent = if entry.level >= 3 { " class=\"toc-nested\"" } else { "" };
        let _ = writeln!(
            html,
            "<li{indent}><a href=\"#{}\">{}</a></li>",
            escape(&entry.id),
            escape(&entry.title),
        );
    }
    html.push_str("</ul>\n</aside>\n");
}
