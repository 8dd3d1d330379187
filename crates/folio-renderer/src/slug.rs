//! Heading slugs.
//!
//! Slugs follow GitHub's anchor rules so links written against a
//! repository's rendered Markdown keep working on the site: lowercase,
//! letters and digits of any script kept, `-` and `_` kept, each whitespace
//! character becomes `-`, other punctuation is dropped.

use std::collections::HashMap;

/// Id used when a heading has no sluggable characters.
const FALLBACK_SLUG: &str = "section";

/// Convert heading text to an anchor slug.
///
/// ```
/// use folio_renderer::slugify;
///
/// assert_eq!(slugify("What's New?"), "whats-new");
/// assert_eq!(slugify("Über uns"), "über-uns");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
    text.trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c)
            } else if c.is_whitespace() {
                Some('-')
            } else {
                None
            }
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Hands out unique slugs within one document.
#[derive(Debug, Default)]
pub(crate) struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Slug for `text`; repeats get `-1`, `-2`, ... suffixes.
    pub fn slug(&mut self, text: &str) -> String {
        let mut base = slugify(text);
        if base.is_empty() {
            base.push_str(FALLBACK_SLUG);
        }
        let mut candidate = base.clone();
        while self.seen.contains_key(&candidate) {
            let count = self.seen.entry(base.clone()).or_insert(0);
            *count += 1;
            candidate = format!("{base}-{count}");
        }
        self.seen.insert(candidate.clone(), 0);
        candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Trimmed  "), "trimmed");
        assert_eq!(slugify("snake_case and-dash"), "snake_case-and-dash");
        assert_eq!(slugify("C++ & Rust"), "c--rust");
        assert_eq!(slugify("v1.2 (beta)"), "v12-beta");
        assert_eq!(slugify("Überblick"), "überblick");
    }

    #[test]
    fn test_repeated_slugs_numbered() {
        let mut slugger = Slugger::default();
        assert_eq!(slugger.slug("Usage"), "usage");
        assert_eq!(slugger.slug("Usage"), "usage-1");
        assert_eq!(slugger.slug("usage"), "usage-2");
    }

    #[test]
    fn test_suffix_does_not_collide_with_real_heading() {
        let mut slugger = Slugger::default();
        assert_eq!(slugger.slug("Step"), "step");
        assert_eq!(slugger.slug("Step 1"), "step-1");
        assert_eq!(slugger.slug("Step"), "step-2");
    }

    #[test]
    fn test_empty_slug_falls_back() {
        let mut slugger = Slugger::default();
        assert_eq!(slugger.slug("???"), "section");
        assert_eq!(slugger.slug("!!!"), "section-1");
    }
}
