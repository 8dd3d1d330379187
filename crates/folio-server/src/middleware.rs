//! Request path resolution and response headers.
//!
//! Built sites are addressed under `base_url` and use clean URLs, so
//! requests are mapped onto the output tree before reaching the file
//! service:
//!
//! - `/base/docs/intro` -> `/docs/intro/` when that directory exists
//! - `/base/docs/intro` -> `/docs/intro.html` for `trailing_slash = false`
//! - anything outside `base_url` -> the site's `404.html`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{self, HeaderName};
use axum::http::{HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tower_http::set_header::SetResponseHeaderLayer;

/// Page served for unknown paths.
pub(crate) const NOT_FOUND_PAGE: &str = "404.html";

/// Output directory together with the URL prefix it is served under.
#[derive(Debug)]
pub(crate) struct SiteRoot {
    dir: PathBuf,
    base_url: String,
}

impl SiteRoot {
    pub fn new(dir: &Path, base_url: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            base_url: base_url.to_owned(),
        }
    }

    /// Map a request path to a path inside the output directory.
    ///
    /// Returns `None` for paths outside `base_url`.
    pub fn resolve(&self, path: &str) -> Option<String> {
        let rest = match path.strip_prefix(self.base_url.as_str()) {
            Some(rest) => rest,
            None if path == self.base_url.trim_end_matches('/') => "",
            None => return None,
        };

        if rest.is_empty() || rest.ends_with('/') {
            return Some(format!("/{rest}"));
        }
        let last = rest.rsplit('/').next().unwrap_or(rest);
        if !last.contains('.') && !rest.split('/').any(|segment| segment == "..") {
            if self.dir.join(rest).is_dir() {
                return Some(format!("/{rest}/"));
            }
            if self.dir.join(format!("{rest}.html")).is_file() {
                return Some(format!("/{rest}.html"));
            }
        }
        Some(format!("/{rest}"))
    }

    /// The site's own 404 page, or a bare 404 when the build has none.
    pub async fn not_found(&self) -> Response {
        match tokio::fs::read(self.dir.join(NOT_FOUND_PAGE)).await {
            Ok(body) => (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                body,
            )
                .into_response(),
            Err(_) => StatusCode::NOT_FOUND.into_response(),
        }
    }
}

/// Rewrite the request URI to its location in the output directory.
pub(crate) async fn resolve_site_path(
    State(site): State<Arc<SiteRoot>>,
    mut request: Request,
) -> Result<Request, Response> {
    let Some(path) = site.resolve(request.uri().path()) else {
        return Err(site.not_found().await);
    };
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path,
    };
    match path_and_query.parse::<Uri>() {
        Ok(uri) => {
            *request.uri_mut() = uri;
            Ok(request)
        }
        Err(_) => Err(StatusCode::BAD_REQUEST.into_response()),
    }
}

/// `X-Content-Type-Options: nosniff` on every response.
pub(crate) fn content_type_options_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    )
}

/// Make browsers revalidate so rebuilt pages show up on reload.
pub(crate) fn no_cache_layer() -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::if_not_present(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"))
}
