//! Markdown to HTML rendering for Folio.
//!
//! [`MarkdownRenderer`] walks `pulldown-cmark` events and produces semantic
//! HTML5 along with everything the site builder needs from a page:
//!
//! - heading ids (slugified, duplicates suffixed `-1`, `-2`, ...)
//! - the page title from the first H1
//! - an H2/H3 table of contents
//! - every link and image destination, for link checking
//!
//! # Example
//!
//! ```
//! use folio_renderer::MarkdownRenderer;
//!
//! let resolver = |path: &str| (path == "setup.md").then(|| "/docs/setup/".to_owned());
//! let result = MarkdownRenderer::new()
//!     .with_title_extraction()
//!     .with_link_resolver(&resolver)
//!     .render_markdown("# Hello\n\nSee [setup](setup.md).");
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert!(result.html.contains(r#"href="/docs/setup/""#));
//! ```

mod code_block;
mod html;
mod link;
mod renderer;
mod slug;
mod state;
mod util;

pub use code_block::KnownLanguages;
pub use html::{AlertKind, escape_html};
pub use link::{
    CollectedLink, LinkKind, LinkResolver, LinkRole, is_external_link, is_markdown_path,
    join_relative, split_path_fragment,
};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use slug::slugify;
pub use state::TocEntry;
pub use util::relative_path;
