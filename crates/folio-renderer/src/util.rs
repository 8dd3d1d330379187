//! URL helpers.

use pulldown_cmark::HeadingLevel;

/// Compute a relative URL from one page URL to another (RFC 3986).
///
/// Both `from` and `to` are URL paths. Per RFC 3986 the last segment of
/// `from` is the current document and the base directory is everything
/// before it; a trailing slash makes `from` a directory.
///
/// # Examples
///
/// ```
/// use folio_renderer::relative_path;
///
/// assert_eq!(relative_path("a/b", "a/c"), "c");
/// assert_eq!(relative_path("", "domains/billing"), "domains/billing");
/// assert_eq!(relative_path("guide", "guide"), "guide");
/// ```
pub fn relative_path(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from_dir.len() - common;
    let remaining = &to_segs[common..];

    let ups_part = "../".repeat(ups);
    let down_part = remaining.join("/");

    let result = format!("{ups_part}{down_part}");
    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}

/// Convert heading level enum to number (1-6).
#[must_use]
pub(crate) fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_between_pages() {
        assert_eq!(relative_path("docs/cloud/k8s", "docs/intro"), "../intro");
        assert_eq!(relative_path("docs/cloud/k8s", "docs/cloud/helm"), "helm");
        assert_eq!(relative_path("docs/intro", "docs/cloud/k8s"), "cloud/k8s");
    }

    #[test]
    fn test_relative_path_directory_pages() {
        assert_eq!(relative_path("docs/cloud/k8s/", "docs/intro/"), "../../intro");
        assert_eq!(relative_path("docs/intro/", "assets/css/folio.css"), "../../assets/css/folio.css");
        assert_eq!(relative_path("docs/", "docs"), "./");
    }

    #[test]
    fn test_relative_path_root() {
        assert_eq!(relative_path("", "docs/intro"), "docs/intro");
        assert_eq!(relative_path("/", "404.html"), "404.html");
        assert_eq!(relative_path("docs/intro/", ""), "../../");
        assert_eq!(relative_path("", ""), "./");
    }
}
