//! Document id and route derivation.
//!
//! Ids and routes are `/`-separated, without leading or trailing slashes.
//! Number prefixes used to order files on disk (`01-intro.md`,
//! `2_setup/`) are stripped from both.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

static NUMBER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*[-_.]\s*(.+)$").expect("valid regex"));

/// Split a leading ordering number from a path segment.
///
/// Returns the number (if any) and the remaining name.
#[must_use]
pub fn strip_number_prefix(segment: &str) -> (Option<u32>, &str) {
    match NUMBER_PREFIX.captures(segment) {
        Some(caps) => {
            let number = caps.get(1).and_then(|m| m.as_str().parse().ok());
            let rest = caps.get(2).map_or(segment, |m| m.as_str());
            (number, rest)
        }
        None => (None, segment),
    }
}

/// Relative source path with `/` separators, regardless of platform.
#[must_use]
pub fn normalize_source_path(rel_path: &Path) -> String {
    rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Directory part of a `/`-separated path (empty at the root).
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Compute a document id from its source path and optional front matter id.
///
/// The extension and number prefixes are removed; `fm_id` replaces the file
/// name part.
#[must_use]
pub fn doc_id(source_path: &str, fm_id: Option<&str>) -> String {
    let mut segments: Vec<&str> = source_path
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let Some(file_name) = segments.pop() else {
        return String::new();
    };

    let mut parts: Vec<&str> = segments.iter().map(|s| strip_number_prefix(s).1).collect();
    let stem = file_stem(file_name);
    parts.push(fm_id.unwrap_or_else(|| strip_number_prefix(stem).1));
    parts.join("/")
}

/// Compute the route for a document.
///
/// `slug` wins when present: absolute slugs are taken from the docs root,
/// relative ones are resolved against the id's directory. Otherwise the id is
/// used, with `index` and `readme` leaf names collapsing to their directory.
#[must_use]
pub fn doc_route(id: &str, slug: Option<&str>) -> String {
    if let Some(slug) = slug {
        let resolved = if let Some(absolute) = slug.strip_prefix('/') {
            absolute.to_owned()
        } else {
            let dir = parent_dir(id);
            if dir.is_empty() {
                slug.to_owned()
            } else {
                format!("{dir}/{slug}")
            }
        };
        return normalize_route(&resolved);
    }

    let (dir, leaf) = id.rsplit_once('/').unwrap_or(("", id));
    if leaf.eq_ignore_ascii_case("index") || leaf.eq_ignore_ascii_case("readme") {
        dir.to_owned()
    } else {
        id.to_owned()
    }
}

/// Remove empty and `.` segments and resolve `..` without escaping the root.
fn normalize_route(route: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in route.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments.join("/")
}

/// File name without its extension.
fn file_stem(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _)| stem)
}

/// Generate a title from a slug-like name (`getting-started` -> `Getting Started`).
#[must_use]
pub fn titlecase_from_slug(slug: &str) -> String {
    let mut result = String::with_capacity(slug.len());
    for word in slug.split(['-', '_', ' ']).filter(|w| !w.is_empty()) {
        if !result.is_empty() {
            result.push(' ');
        }
        capitalize_first_into(word, &mut result);
    }
    result
}

/// Capitalize the first character of a word, appending to `buf`.
fn capitalize_first_into(word: &str, buf: &mut String) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        buf.extend(first.to_uppercase());
        buf.push_str(chars.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_number_prefix() {
        assert_eq!(strip_number_prefix("01-intro"), (Some(1), "intro"));
        assert_eq!(strip_number_prefix("2_setup"), (Some(2), "setup"));
        assert_eq!(strip_number_prefix("10. Advanced"), (Some(10), "Advanced"));
        assert_eq!(strip_number_prefix("intro"), (None, "intro"));
        assert_eq!(strip_number_prefix("2024"), (None, "2024"));
        assert_eq!(strip_number_prefix("3d-graphics"), (None, "3d-graphics"));
    }

    #[test]
    fn test_normalize_source_path() {
        assert_eq!(
            normalize_source_path(Path::new("cloud/k8s/intro.md")),
            "cloud/k8s/intro.md"
        );
    }

    #[test]
    fn test_doc_id() {
        assert_eq!(doc_id("intro.md", None), "intro");
        assert_eq!(doc_id("cloud/k8s.md", None), "cloud/k8s");
        assert_eq!(doc_id("01-basics/02-install.mdx", None), "basics/install");
        assert_eq!(doc_id("cloud/k8s.md", Some("kubernetes")), "cloud/kubernetes");
        assert_eq!(doc_id("guides/index.md", None), "guides/index");
        assert_eq!(doc_id("v1.2-notes.md", None), "v1.2-notes");
    }

    #[test]
    fn test_doc_route_from_id() {
        assert_eq!(doc_route("intro", None), "intro");
        assert_eq!(doc_route("cloud/k8s", None), "cloud/k8s");
        assert_eq!(doc_route("index", None), "");
        assert_eq!(doc_route("guides/index", None), "guides");
        assert_eq!(doc_route("guides/README", None), "guides");
    }

    #[test]
    fn test_doc_route_from_slug() {
        assert_eq!(doc_route("cloud/k8s", Some("/kubernetes")), "kubernetes");
        assert_eq!(doc_route("cloud/k8s", Some("kube")), "cloud/kube");
        assert_eq!(doc_route("intro", Some("start")), "start");
        assert_eq!(doc_route("cloud/k8s", Some("/")), "");
        assert_eq!(doc_route("a/b/c", Some("../d/")), "a/d");
        assert_eq!(doc_route("a", Some("/../../x")), "x");
    }

    #[test]
    fn test_titlecase_from_slug() {
        assert_eq!(titlecase_from_slug("getting-started"), "Getting Started");
        assert_eq!(titlecase_from_slug("snake_case_name"), "Snake Case Name");
        assert_eq!(titlecase_from_slug("vulkan"), "Vulkan");
        assert_eq!(titlecase_from_slug(""), "");
    }
}
