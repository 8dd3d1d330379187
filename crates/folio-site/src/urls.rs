//! Page URLs and output file locations.
//!
//! URL paths here are relative to the site root (`base_url`) and carry no
//! leading slash. The landing page is `""`.

use std::borrow::Cow;

use folio_config::Config;
use folio_renderer::relative_path;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Characters escaped in emitted URL paths. `/`, `?`, `#` and `%` pass
/// through so configured targets with queries, fragments or escapes survive.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Maps document routes to URL paths and output files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteLayout {
    route_base: String,
    trailing_slash: bool,
}

impl SiteLayout {
    #[must_use]
    pub fn new(route_base: &str, trailing_slash: bool) -> Self {
        Self {
            route_base: route_base.trim_matches('/').to_owned(),
            trailing_slash,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.docs.route_base(), config.trailing_slash)
    }

    /// URL path of a document route.
    ///
    /// ```
    /// use folio_site::SiteLayout;
    ///
    /// let layout = SiteLayout::new("docs", true);
    /// assert_eq!(layout.page_url("cloud/kubernetes"), "docs/cloud/kubernetes/");
    /// assert_eq!(SiteLayout::new("docs", false).page_url("intro"), "docs/intro");
    /// ```
    #[must_use]
    pub fn page_url(&self, route: &str) -> String {
        let path = self.join_base(route);
        if path.is_empty() || !self.trailing_slash {
            path
        } else {
            format!("{path}/")
        }
    }

    /// Output file of a document route, relative to the output directory.
    #[must_use]
    pub fn page_file(&self, route: &str) -> String {
        let path = self.join_base(route);
        if path.is_empty() {
            "index.html".to_owned()
        } else if self.trailing_slash {
            format!("{path}/index.html")
        } else {
            format!("{path}.html")
        }
    }

    /// Document route addressed by a URL path, if it lies under the route base.
    ///
    /// Accepts both `page/` and `page.html` forms.
    #[must_use]
    pub fn route_for_url<'a>(&self, url_path: &'a str) -> Option<&'a str> {
        let path = url_path.trim_matches('/');
        let path = if let Some(dir) = path.strip_suffix("index.html") {
            dir.trim_end_matches('/')
        } else {
            path.strip_suffix(".html").unwrap_or(path)
        };

        if self.route_base.is_empty() {
            Some(path)
        } else if path == self.route_base {
            Some("")
        } else {
            path.strip_prefix(self.route_base.as_str())?.strip_prefix('/')
        }
    }

    fn join_base(&self, route: &str) -> String {
        let route = route.trim_matches('/');
        match (self.route_base.is_empty(), route.is_empty()) {
            (true, _) => route.to_owned(),
            (false, true) => self.route_base.clone(),
            (false, false) => format!("{}/{route}", self.route_base),
        }
    }
}

/// Produces hrefs from one page to other site paths.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Linker<'a> {
    /// Relative to the page at this URL path.
    Relative { from: &'a str },
    /// Absolute from the site's `base_url`, for pages served at any path.
    Absolute { base_url: &'a str },
}

impl Linker<'_> {
    pub(crate) fn to(self, target: &str) -> String {
        match self {
            Self::Relative { from } => href(from, target),
            Self::Absolute { base_url } => format!("{base_url}{}", encode_path(target)),
        }
    }
}

/// Relative href between two URL paths, keeping a directory's trailing slash.
///
/// A target without a trailing slash is a file (`docs/guides` is written to
/// `docs/guides.html`), so when it names a directory enclosing `from` the
/// href steps out of that directory and names the page instead of `./`.
pub(crate) fn href(from: &str, to: &str) -> String {
    let rel = relative_path(from, to);
    let rel = if to.ends_with('/') {
        if rel.ends_with('/') { rel } else { format!("{rel}/") }
    } else if let Some(name) = to.rsplit('/').next().filter(|n| !n.is_empty())
        && rel.split('/').all(|s| s.is_empty() || s == "." || s == "..")
    {
        let ups = rel.trim_start_matches("./");
        format!("../{ups}{name}")
    } else {
        rel
    };
    encode_path(&rel).into_owned()
}

/// Percent-encode spaces, non-ASCII and other unsafe characters in a URL path.
pub(crate) fn encode_path(path: &str) -> Cow<'_, str> {
    utf8_percent_encode(path, PATH).into()
}
