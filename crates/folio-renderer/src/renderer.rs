//! Markdown to HTML renderer.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::code_block::{KnownLanguages, parse_fence_info};
use crate::html::{self, AlertKind, escape_html};
use crate::link::{CollectedLink, LinkKind, LinkResolver, LinkRole, is_markdown_path, split_path_fragment};
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, TocEntry};
use crate::util::heading_level_to_num;

/// Result of rendering a document.
#[derive(Clone, Debug, Default)]
pub struct RenderResult {
    /// Rendered HTML body.
    pub html: String,
    /// Text of the first H1, if title extraction was enabled.
    pub title: Option<String>,
    /// H2/H3 headings for the table of contents.
    pub toc: Vec<TocEntry>,
    /// Every heading id in the page, in order.
    pub heading_ids: Vec<String>,
    /// Link and image destinations as written in the source.
    pub links: Vec<CollectedLink>,
    /// Non-fatal problems (unknown code languages).
    pub warnings: Vec<String>,
}

/// Markdown renderer producing semantic HTML5.
///
/// GitHub Flavored Markdown (tables, strikethrough, task lists, alerts) is
/// enabled by default. Relative links to `.md` files go through the
/// [`LinkResolver`] when one is set.
pub struct MarkdownRenderer<'r> {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    alert_stack: Vec<Option<AlertKind>>,
    links: Vec<CollectedLink>,
    warnings: Vec<String>,
    gfm: bool,
    link_resolver: Option<&'r dyn LinkResolver>,
    known_languages: Option<KnownLanguages>,
}

impl<'r> MarkdownRenderer<'r> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::new(false),
            alert_stack: Vec::new(),
            links: Vec::new(),
            warnings: Vec::new(),
            gfm: true,
            link_resolver: None,
            known_languages: None,
        }
    }

    /// Extract the first H1 as title. It is still rendered.
    #[must_use]
    pub fn with_title_extraction(mut self) -> Self {
        self.heading = HeadingState::new(true);
        self
    }

    /// Rewrite relative Markdown links through `resolver`.
    #[must_use]
    pub fn with_link_resolver(mut self, resolver: &'r dyn LinkResolver) -> Self {
        self.link_resolver = Some(resolver);
        self
    }

    /// Warn about fenced code languages outside `languages`.
    #[must_use]
    pub fn with_known_languages(mut self, languages: KnownLanguages) -> Self {
        self.known_languages = Some(languages);
        self
    }

    /// Enable or disable GitHub Flavored Markdown extensions.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Parse and render Markdown text.
    pub fn render_markdown(&mut self, markdown: &str) -> RenderResult {
        let parser = Parser::new_ext(markdown, self.parser_options());
        self.render(parser)
    }

    /// Render a stream of parser events.
    pub fn render<'a, I>(&mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        RenderResult {
            html: std::mem::take(&mut self.output),
            title: self.heading.take_title(),
            toc: self.heading.take_toc(),
            heading_ids: self.heading.take_ids(),
            links: std::mem::take(&mut self.links),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    /// Push content to the heading buffer when inside a heading.
    ///
    /// Markup inside image alt text is dropped.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => {
                if self.code.is_active() {
                    self.code.push_str("\n");
                } else if self.image.is_active() {
                    self.image.push_str(" ");
                } else {
                    self.push_inline("\n");
                }
            }
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => html::task_list_marker(checked, &mut self.output),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written at the end, once the id is known.
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(kind) => {
                if let Some(kind) = kind {
                    let alert = AlertKind::from(kind);
                    self.alert_stack.push(Some(alert));
                    html::alert_start(alert, &mut self.output);
                } else {
                    self.alert_stack.push(None);
                    self.output.push_str("<blockquote>");
                }
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(ref info) => {
                        let (lang, _meta) = parse_fence_info(info);
                        (!lang.is_empty()).then_some(lang)
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => {
                    let _ = write!(self.output, r#"<ol start="{n}">"#);
                }
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let tag = self.table.cell_tag();
                let style = self.table.cell_style();
                let _ = write!(self.output, "<{tag}{style}>");
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                self.links.push(CollectedLink {
                    target: dest_url.to_string(),
                    role: LinkRole::Anchor,
                });
                let href = self.transform_link(&dest_url);
                let mut tag = format!(r#"<a href="{}""#, escape_html(&href));
                if !title.is_empty() {
                    let _ = write!(tag, r#" title="{}""#, escape_html(&title));
                }
                tag.push('>');
                self.push_inline(&tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.links.push(CollectedLink {
                    target: dest_url.to_string(),
                    role: LinkRole::Image,
                });
                self.image.start(dest_url.to_string(), title.to_string());
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some(heading) = self.heading.complete_heading() {
                    let _ = write!(
                        self.output,
                        r#"<h{level} id="{id}">{html}</h{level}>"#,
                        level = heading.level,
                        id = heading.id,
                        html = heading.html.trim()
                    );
                }
            }
            TagEnd::BlockQuote(_) => match self.alert_stack.pop() {
                Some(Some(_)) => html::alert_end(&mut self.output),
                _ => self.output.push_str("</blockquote>"),
            },
            TagEnd::CodeBlock => {
                let Some((lang, content)) = self.code.finish() else {
                    return;
                };
                if let Some(lang) = lang.as_deref() {
                    self.check_language(lang);
                }
                html::code_block(lang.as_deref(), &content, &mut self.output);
            }
            TagEnd::List(ordered) => self.output.push_str(if ordered { "</ol>" } else { "</ul>" }),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                let _ = write!(self.output, "</{}>", self.table.cell_tag());
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                if let Some(image) = self.image.finish() {
                    let src = self.transform_link(&image.src);
                    let mut img = String::new();
                    html::image(&src, &image.alt, &image.title, &mut img);
                    self.push_inline(&img);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let html = format!("<code>{}</code>", escape_html(code));
        self.push_inline(&html);
    }

    /// Rewrite relative `.md` links to the target page's URL.
    fn transform_link(&self, url: &str) -> String {
        let Some(resolver) = self.link_resolver else {
            return url.to_owned();
        };
        let LinkKind::FileRelative(link) = LinkKind::parse(url) else {
            return url.to_owned();
        };
        let (path, fragment) = split_path_fragment(link);
        if !is_markdown_path(path) {
            return url.to_owned();
        }
        match resolver.resolve(path) {
            Some(resolved) if fragment.is_empty() => resolved,
            Some(resolved) => format!("{resolved}#{fragment}"),
            None => url.to_owned(),
        }
    }

    fn check_language(&mut self, lang: &str) {
        let Some(known) = &self.known_languages else {
            return;
        };
        if known.contains(lang) {
            return;
        }
        let warning = format!(
            "code block language '{lang}' is not highlighted; add it to theme.prism.additional_languages"
        );
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}

impl Default for MarkdownRenderer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(markdown: &str) -> RenderResult {
        MarkdownRenderer::new().render_markdown(markdown)
    }

    #[test]
    fn test_basic_paragraph() {
        assert_eq!(render("Hello, world!").html, "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_with_id() {
        let result = render("## Section Title");
        assert_eq!(result.html, r#"<h2 id="section-title">Section Title</h2>"#);
        assert_eq!(
            result.toc,
            vec![TocEntry {
                level: 2,
                title: "Section Title".to_owned(),
                id: "section-title".to_owned(),
            }]
        );
    }

    #[test]
    fn test_title_extraction_keeps_h1() {
        let result = MarkdownRenderer::new()
            .with_title_extraction()
            .render_markdown("# My Title\n\nSome content\n\n## Section\n\n#### Deep");
        assert_eq!(result.title.as_deref(), Some("My Title"));
        assert!(result.html.contains(r#"<h1 id="my-title">My Title</h1>"#));
        assert_eq!(result.toc.len(), 1);
        assert_eq!(result.heading_ids, vec!["my-title", "section", "deep"]);
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let result = render("## FAQ\n\n## FAQ\n\n### FAQ");
        let ids: Vec<_> = result.toc.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["faq", "faq-1", "faq-2"]);
    }

    #[test]
    fn test_heading_with_inline_code() {
        let result = render("## Install `npm`");
        assert!(result.html.contains("<code>npm</code>"));
        assert_eq!(result.toc[0].title, "Install npm");
        assert_eq!(result.toc[0].id, "install-npm");
    }

    #[test]
    fn test_code_block_language_class() {
        let result = render("```rust title=\"main.rs\"\nfn main() {}\n```");
        assert!(result.html.contains(r#"<code class="language-rust">fn main() {}"#));
    }

    #[test]
    fn test_unknown_language_warns_once() {
        let result = MarkdownRenderer::new()
            .with_known_languages(KnownLanguages::new(["bash"]))
            .render_markdown("```bash\nls\n```\n\n```cobol\nA\n```\n\n```cobol\nB\n```");
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("'cobol'"));
    }

    #[test]
    fn test_languages_unchecked_by_default() {
        assert!(render("```cobol\nA\n```").warnings.is_empty());
    }

    #[test]
    fn test_alerts() {
        let result = render("> [!WARNING]\n> Be careful:\n> - Item 1");
        assert!(result.html.starts_with(r#"<div class="alert alert-warning""#));
        assert!(result.html.contains("<ul><li>Item 1</li></ul>"));
        assert!(result.html.ends_with("</div>"));
    }

    #[test]
    fn test_regular_blockquote() {
        let result = render("> Just a quote");
        assert_eq!(result.html, "<blockquote><p>Just a quote</p></blockquote>");
    }

    #[test]
    fn test_table() {
        let result = render("| A | B |\n|:--|--:|\n| 1 | 2 |");
        assert_eq!(
            result.html,
            concat!(
                r#"<table><thead><tr><th style="text-align:left">A</th><th style="text-align:right">B</th></tr></thead>"#,
                r#"<tbody><tr><td style="text-align:left">1</td><td style="text-align:right">2</td></tr></tbody></table>"#
            )
        );
    }

    #[test]
    fn test_task_list() {
        let result = render("- [ ] Todo\n- [x] Done");
        assert!(result.html.contains(r#"<input type="checkbox" disabled> Todo"#));
        assert!(result.html.contains(r#"<input type="checkbox" checked disabled> Done"#));
    }

    #[test]
    fn test_strikethrough_and_emphasis() {
        let result = render("~~old~~ *new* **bold**");
        assert_eq!(result.html, "<p><s>old</s> <em>new</em> <strong>bold</strong></p>");
    }

    #[test]
    fn test_links_collected_in_order() {
        let result = render("[a](./a.md) ![img](../img/x.png) [ext](https://example.com) [top](#top)");
        let targets: Vec<_> = result
            .links
            .iter()
            .map(|l| (l.target.as_str(), l.role))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("./a.md", LinkRole::Anchor),
                ("../img/x.png", LinkRole::Image),
                ("https://example.com", LinkRole::Anchor),
                ("#top", LinkRole::Anchor),
            ]
        );
    }

    #[test]
    fn test_markdown_links_resolved() {
        let resolver = |path: &str| match path {
            "../setup.md" => Some("/docs/setup/".to_owned()),
            _ => None,
        };
        let result = MarkdownRenderer::new()
            .with_link_resolver(&resolver)
            .render_markdown("[Setup](../setup.md#linux) [Gone](./gone.md) [Img](./x.png)");
        assert!(result.html.contains(r#"<a href="/docs/setup/#linux">Setup</a>"#));
        assert!(result.html.contains(r#"<a href="./gone.md">Gone</a>"#));
        assert!(result.html.contains(r#"<a href="./x.png">Img</a>"#));
        assert_eq!(result.links[0].target, "../setup.md#linux");
    }

    #[test]
    fn test_links_without_resolver_unchanged() {
        let result = render("[Setup](setup.md \"Install guide\")");
        assert_eq!(
            result.html,
            r#"<p><a href="setup.md" title="Install guide">Setup</a></p>"#
        );
    }

    #[test]
    fn test_image_alt_text() {
        let result = render("![An *important* diagram](arch.svg)");
        assert_eq!(
            result.html,
            r#"<p><img src="arch.svg" alt="An important diagram" loading="lazy"></p>"#
        );
    }

    #[test]
    fn test_escapes_text() {
        assert_eq!(render("a < b & c").html, "<p>a &lt; b &amp; c</p>");
    }

    #[test]
    fn test_gfm_disabled() {
        let result = MarkdownRenderer::new()
            .with_gfm(false)
            .render_markdown("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(!result.html.contains("<table>"));
    }

    #[test]
    fn test_ordered_list_start() {
        assert_eq!(render("3. c\n4. d").html, r#"<ol start="3"><li>c</li><li>d</li></ol>"#);
    }
}
