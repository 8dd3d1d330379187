//! `sitemap.xml` generation.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/docs/intro/</loc>
//!   </url>
//! </urlset>
//! ```
//!
//! No `lastmod` is emitted so rebuilds stay byte-identical.

use std::borrow::Cow;

use crate::urls::encode_path;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Render a sitemap for `site_url` + each URL path, sorted and deduplicated.
pub(crate) fn sitemap_xml<'a, I>(site_url: &str, url_paths: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut locs: Vec<String> = url_paths
        .into_iter()
        .map(|path| format!("{site_url}{}", encode_path(path)))
        .collect();
    locs.sort();
    locs.dedup();

    let mut xml = String::with_capacity(128 + locs.len() * 64);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");
    for loc in &locs {
        xml.push_str("  <url>\n    <loc>");
        xml.push_str(&escape_xml(loc));
        xml.push_str("</loc>\n  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sorted_and_deduplicated() {
        let xml = sitemap_xml(
            "https://example.com/site/",
            ["docs/zeta/", "", "docs/alpha/", "docs/alpha/"],
        );
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n  \
             <url>\n    <loc>https://example.com/site/</loc>\n  </url>\n  \
             <url>\n    <loc>https://example.com/site/docs/alpha/</loc>\n  </url>\n  \
             <url>\n    <loc>https://example.com/site/docs/zeta/</loc>\n  </url>\n\
             </urlset>\n"
        );
    }

    #[test]
    fn test_locations_percent_encoded() {
        let xml = sitemap_xml("https://example.com/", ["docs/getting started/", "docs/café/"]);
        assert!(xml.contains("<loc>https://example.com/docs/caf%C3%A9/</loc>"));
        assert!(xml.contains("<loc>https://example.com/docs/getting%20started/</loc>"));
    }

    #[test]
    fn test_empty() {
        let xml = sitemap_xml("https://example.com/", std::iter::empty());
        assert!(xml.contains("<urlset"));
        assert!(!xml.contains("<url>"));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("plain"), "plain");
        assert_eq!(escape_xml("a&b"), "a&amp;b");
        assert_eq!(escape_xml("<'\">"), "&lt;&apos;&quot;&gt;");
    }
}
