//! Fenced code block metadata and highlighting languages.

use std::collections::BTreeSet;

/// Languages the highlighter bundles without extra configuration, with the
/// aliases it accepts for them.
const DEFAULT_LANGUAGES: &[&str] = &[
    "markup", "html", "xml", "svg", "mathml", "jsx", "tsx", "swift", "kotlin", "kt", "objectivec",
    "objc", "javascript", "js", "typescript", "ts", "reason", "rust", "graphql", "yaml", "yml",
    "go", "cpp", "c", "clike", "markdown", "md", "python", "py", "json", "css",
];

/// Pseudo-languages that disable highlighting.
const PLAIN_LANGUAGES: &[&str] = &["text", "txt", "plain", "plaintext", "none"];

/// Split a fence info string into language and the raw metadata after it.
///
/// `rust title="main.rs" {1,3}` gives `("rust", "title=\"main.rs\" {1,3}")`.
/// A `{...}` directly after the language (`js{2}`) is metadata, not part of
/// the language name.
pub(crate) fn parse_fence_info(info: &str) -> (String, String) {
    let info = info.trim();
    let (head, rest) = info
        .split_once(char::is_whitespace)
        .unwrap_or((info, ""));
    let (lang, inline_meta) = match head.find('{') {
        Some(pos) => (&head[..pos], &head[pos..]),
        None => (head, ""),
    };
    let meta = [inline_meta, rest.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    (lang.to_ascii_lowercase(), meta)
}

/// Set of languages code blocks may use without a warning.
#[derive(Clone, Debug)]
pub struct KnownLanguages {
    extra: BTreeSet<String>,
}

impl KnownLanguages {
    /// Default highlighter set plus `additional` languages.
    pub fn new<I, S>(additional: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extra: additional
                .into_iter()
                .map(|s| s.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    #[must_use]
    pub fn contains(&self, lang: &str) -> bool {
        let lang = lang.to_ascii_lowercase();
        DEFAULT_LANGUAGES.contains(&lang.as_str())
            || PLAIN_LANGUAGES.contains(&lang.as_str())
            || self.extra.contains(&lang)
    }
}

impl Default for KnownLanguages {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}
