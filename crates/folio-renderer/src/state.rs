//! Per-construct state of the renderer.
//!
//! Code blocks, images and headings buffer their content until the closing
//! event, since their HTML depends on everything inside them.

use std::ops::RangeInclusive;

use pulldown_cmark::Alignment;

use crate::slug::Slugger;

/// Heading levels listed in the table of contents.
const TOC_LEVELS: RangeInclusive<u8> = 2..=3;

struct PendingCode {
    language: Option<String>,
    text: String,
}

/// Fenced or indented code block being collected.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    current: Option<PendingCode>,
}

impl CodeBlockState {
    pub fn start(&mut self, language: Option<String>) {
        self.current = Some(PendingCode {
            language,
            text: String::new(),
        });
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn push_str(&mut self, text: &str) {
        if let Some(code) = &mut self.current {
            code.text.push_str(text);
        }
    }

    /// Close the block, returning its language and raw text.
    pub fn finish(&mut self) -> Option<(Option<String>, String)> {
        self.current.take().map(|code| (code.language, code.text))
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
enum TableSection {
    #[default]
    Head,
    Body,
}

/// Column tracking for GFM tables.
#[derive(Default)]
pub(crate) struct TableState {
    alignments: Vec<Alignment>,
    section: TableSection,
    column: usize,
}

impl TableState {
    pub fn start(&mut self, alignments: Vec<Alignment>) {
        *self = Self {
            alignments,
            ..Self::default()
        };
    }

    pub fn start_head(&mut self) {
        self.section = TableSection::Head;
        self.column = 0;
    }

    pub fn end_head(&mut self) {
        self.section = TableSection::Body;
    }

    pub fn start_row(&mut self) {
        self.column = 0;
    }

    pub fn next_cell(&mut self) {
        self.column += 1;
    }

    /// `th` in the header row, `td` elsewhere.
    pub fn cell_tag(&self) -> &'static str {
        match self.section {
            TableSection::Head => "th",
            TableSection::Body => "td",
        }
    }

    /// Inline `style` attribute for the current column, if aligned.
    pub fn cell_style(&self) -> &'static str {
        match self.alignments.get(self.column) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Image whose alt text is being collected.
pub(crate) struct PendingImage {
    pub src: String,
    pub title: String,
    pub alt: String,
}

#[derive(Default)]
pub(crate) struct ImageState {
    current: Option<PendingImage>,
}

impl ImageState {
    pub fn start(&mut self, src: String, title: String) {
        self.current = Some(PendingImage {
            src,
            title,
            alt: String::new(),
        });
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Append to the alt text. Markup inside it is flattened to text.
    pub fn push_str(&mut self, text: &str) {
        if let Some(image) = &mut self.current {
            image.alt.push_str(text);
        }
    }

    pub fn finish(&mut self) -> Option<PendingImage> {
        self.current.take()
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (2 or 3).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor id.
    pub id: String,
}

struct OpenHeading {
    level: u8,
    /// Plain text, for the id and the TOC.
    text: String,
    /// Rendered inline HTML.
    html: String,
}

/// A heading ready to be written.
pub(crate) struct CompletedHeading {
    pub level: u8,
    pub id: String,
    pub html: String,
}

/// Heading ids, title extraction and table of contents for one document.
#[derive(Default)]
pub(crate) struct HeadingState {
    extract_title: bool,
    current: Option<OpenHeading>,
    slugger: Slugger,
    title: Option<String>,
    toc: Vec<TocEntry>,
    ids: Vec<String>,
}

impl HeadingState {
    pub fn new(extract_title: bool) -> Self {
        Self {
            extract_title,
            ..Self::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn start_heading(&mut self, level: u8) {
        self.current = Some(OpenHeading {
            level,
            text: String::new(),
            html: String::new(),
        });
    }

    pub fn push_text(&mut self, text: &str) {
        if let Some(heading) = &mut self.current {
            heading.text.push_str(text);
        }
    }

    pub fn push_html(&mut self, html: &str) {
        if let Some(heading) = &mut self.current {
            heading.html.push_str(html);
        }
    }

    /// Close the open heading and assign its id.
    ///
    /// The first H1 becomes the title when extraction is on. It keeps its
    /// id and is still rendered, but stays out of the table of contents.
    pub fn complete_heading(&mut self) -> Option<CompletedHeading> {
        let OpenHeading { level, text, html } = self.current.take()?;
        let text = text.trim();
        let id = self.slugger.slug(text);
        self.ids.push(id.clone());

        if self.extract_title && level == 1 && self.title.is_none() {
            self.title = Some(text.to_owned());
        } else if TOC_LEVELS.contains(&level) {
            self.toc.push(TocEntry {
                level,
                title: text.to_owned(),
                id: id.clone(),
            });
        }

        Some(CompletedHeading { level, id, html })
    }

    pub fn take_title(&mut self) -> Option<String> {
        self.title.take()
    }

    pub fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }

    pub fn take_ids(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ids)
    }
}
