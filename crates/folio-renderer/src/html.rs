//! HTML fragments emitted by the renderer.

use std::fmt::Write;

use pulldown_cmark::BlockQuoteKind;

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// GitHub-style alert kinds (`> [!NOTE]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

impl AlertKind {
    fn class(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Important => "important",
            Self::Warning => "warning",
            Self::Caution => "caution",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Tip => "Tip",
            Self::Important => "Important",
            Self::Warning => "Warning",
            Self::Caution => "Caution",
        }
    }
}

impl From<BlockQuoteKind> for AlertKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Important,
            BlockQuoteKind::Warning => Self::Warning,
            BlockQuoteKind::Caution => Self::Caution,
        }
    }
}

pub(crate) fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
    if let Some(lang) = lang {
        let lang = escape_html(lang);
        let _ = write!(
            out,
            r#"<pre class="language-{lang}"><code class="language-{lang}">{}</code></pre>"#,
            escape_html(content)
        );
    } else {
        let _ = write!(out, "<pre><code>{}</code></pre>", escape_html(content));
    }
}

pub(crate) fn alert_start(kind: AlertKind, out: &mut String) {
    let _ = write!(
        out,
        r#"<div class="alert alert-{}" role="note"><p class="alert-title">{}</p>"#,
        kind.class(),
        kind.label()
    );
}

pub(crate) fn alert_end(out: &mut String) {
    out.push_str("</div>");
}

pub(crate) fn image(src: &str, alt: &str, title: &str, out: &mut String) {
    let _ = write!(out, r#"<img src="{}" alt="{}""#, escape_html(src), escape_html(alt));
    if !title.is_empty() {
        let _ = write!(out, r#" title="{}""#, escape_html(title));
    }
    out.push_str(r#" loading="lazy">"#);
}

pub(crate) fn task_list_marker(checked: bool, out: &mut String) {
    if checked {
        out.push_str(r#"<input type="checkbox" checked disabled> "#);
    } else {
        out.push_str(r#"<input type="checkbox" disabled> "#);
    }
}
