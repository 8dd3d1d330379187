//! Router construction.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::middleware::{self, NOT_FOUND_PAGE, SiteRoot};

/// Router serving the built site in `site_dir` under `base_url`.
pub(crate) fn create_router(site_dir: &Path, base_url: &str) -> Router {
    let site = Arc::new(SiteRoot::new(site_dir, base_url));
    let files =
        ServeDir::new(site_dir).not_found_service(ServeFile::new(site_dir.join(NOT_FOUND_PAGE)));

    Router::new().fallback_service(files).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(middleware::content_type_options_layer())
            .layer(middleware::no_cache_layer())
            .layer(axum::middleware::map_request_with_state(
                site,
                middleware::resolve_site_path,
            )),
    )
}
