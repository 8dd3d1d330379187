//! YAML front matter parsing.
//!
//! A front matter block is a leading `---` line, YAML, and a closing `---`
//! (or `...`) line. Files without a block get default front matter and their
//! full text as body.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Parsed front matter fields.
///
/// Unknown keys are preserved in [`extra`](Self::extra) so themes and
/// plugins can read them.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Page title, overrides the first H1.
    pub title: Option<String>,
    /// Replaces the last segment of the document id.
    pub id: Option<String>,
    /// Custom route, absolute (`/x`) or relative to the document's directory.
    pub slug: Option<String>,
    /// Label shown in the sidebar instead of the title.
    pub sidebar_label: Option<String>,
    /// Ordering hint for autogenerated sidebars.
    pub sidebar_position: Option<f64>,
    /// Meta description.
    pub description: Option<String>,
    /// Meta keywords.
    pub keywords: Vec<String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Draft documents are only built by the dev server.
    pub draft: bool,
    /// Suppress the table of contents column.
    pub hide_table_of_contents: bool,
    /// Overrides the computed "Edit this page" URL.
    pub custom_edit_url: Option<String>,
    /// Any other keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Error parsing a front matter block.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FrontMatterError(String);

/// Split text into an optional raw front matter block and the body.
///
/// Returns `(None, text)` when the text doesn't open with `---` or the block
/// is never closed.
#[must_use]
pub fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some(first_end) = text.find('\n') else {
        return (None, text);
    };
    if text[..first_end].trim_end() != "---" {
        return (None, text);
    }

    let yaml_start = first_end + 1;
    let mut offset = yaml_start;
    for line in text[yaml_start..].split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &text[yaml_start..offset];
            let body = &text[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, text)
}

/// Parse front matter and return it with the remaining body.
///
/// # Errors
///
/// Returns an error if the block is not valid YAML or not a mapping.
pub fn parse_front_matter(text: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let (raw, body) = split_front_matter(text);
    let Some(raw) = raw else {
        return Ok((FrontMatter::default(), body));
    };

    if raw.trim().is_empty() {
        return Ok((FrontMatter::default(), body));
    }

    let front_matter = serde_yaml::from_str(raw)
        .map_err(|e| FrontMatterError(format!("invalid front matter: {e}")))?;
    Ok((front_matter, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_front_matter() {
        let (fm, body) = parse_front_matter("# Title\n\nBody").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "# Title\n\nBody");
    }

    #[test]
    fn test_simple_front_matter() {
        let text = "---\ntitle: Getting Started\nslug: /start\n---\n# Heading\n";
        let (fm, body) = parse_front_matter(text).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Getting Started"));
        assert_eq!(fm.slug.as_deref(), Some("/start"));
        assert_eq!(body, "# Heading\n");
    }

    #[test]
    fn test_all_known_fields() {
        let text = "---
id: k8s-intro
title: Kubernetes
sidebar_label: Intro
sidebar_position: 2
description: Container orchestration
keywords: [k8s, containers]
tags:
  - cloud-native
draft: true
hide_table_of_contents: true
custom_edit_url: https://example.com/edit
---
Body";
        let (fm, body) = parse_front_matter(text).unwrap();
        assert_eq!(fm.id.as_deref(), Some("k8s-intro"));
        assert_eq!(fm.sidebar_label.as_deref(), Some("Intro"));
        assert_eq!(fm.sidebar_position, Some(2.0));
        assert_eq!(fm.keywords, vec!["k8s".to_owned(), "containers".to_owned()]);
        assert_eq!(fm.tags, vec!["cloud-native".to_owned()]);
        assert!(fm.draft);
        assert!(fm.hide_table_of_contents);
        assert_eq!(
            fm.custom_edit_url.as_deref(),
            Some("https://example.com/edit")
        );
        assert!(fm.extra.is_empty());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_unknown_keys_preserved() {
        let text = "---\ntitle: T\nauthor: Jane\n---\n";
        let (fm, _) = parse_front_matter(text).unwrap();
        assert_eq!(
            fm.extra.get("author"),
            Some(&serde_yaml::Value::String("Jane".to_owned()))
        );
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = parse_front_matter("---\n---\nBody").unwrap();
        assert_eq!(fm, FrontMatter::default());
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "---\r\ntitle: Windows\r\n---\r\nBody\r\n";
        let (fm, body) = parse_front_matter(text).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Windows"));
        assert_eq!(body, "Body\r\n");
    }

    #[test]
    fn test_byte_order_mark() {
        let text = "\u{feff}---\ntitle: BOM\n---\nBody";
        let (fm, _) = parse_front_matter(text).unwrap();
        assert_eq!(fm.title.as_deref(), Some("BOM"));
    }

    #[test]
    fn test_unclosed_block_is_body() {
        let text = "---\ntitle: Nope\n\nText";
        let (raw, body) = split_front_matter(text);
        assert!(raw.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn test_dots_close_block() {
        let (raw, body) = split_front_matter("---\ntitle: T\n...\nBody");
        assert_eq!(raw, Some("title: T\n"));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_malformed_yaml() {
        let err = parse_front_matter("---\ntitle: [unclosed\n---\n").unwrap_err();
        assert!(err.to_string().contains("invalid front matter"));
    }

    #[test]
    fn test_non_mapping_yaml() {
        assert!(parse_front_matter("---\n- a\n- b\n---\n").is_err());
    }

    #[test]
    fn test_wrong_field_type() {
        assert!(parse_front_matter("---\ndraft: maybe\n---\n").is_err());
    }
}
