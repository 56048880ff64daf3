//! Markdown to HTML rendering.
//!
//! This module provides the [`MarkdownRenderer`] collaborator interface and a
//! default implementation on top of pulldown-cmark with support for:
//! - GitHub Flavored Markdown (tables, strikethrough, task lists)
//! - Heading attributes (`{#id .class}`) and slug ids for anchor links
//! - Source line mapping for scroll synchronization (live display only)

mod markdown_renderer;
mod traits;

pub use markdown_renderer::PulldownRenderer;
pub use traits::{MarkdownRenderer, RenderError};

use crate::heading::slugify;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};

/// Options for rendering markdown to HTML.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Enable GitHub Flavored Markdown tables
    pub enable_tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub enable_strikethrough: bool,
    /// Enable task list items ([x] and [ ])
    pub enable_tasklists: bool,
    /// Enable heading attributes ({#id .class})
    pub enable_heading_attributes: bool,
    /// Enable footnotes
    pub enable_footnotes: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            enable_tables: true,
            enable_strikethrough: true,
            enable_tasklists: true,
            enable_heading_attributes: true,
            enable_footnotes: true,
        }
    }
}

impl RenderOptions {
    fn to_pulldown_options(&self) -> Options {
        let mut options = Options::empty();
        if self.enable_tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.enable_strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.enable_tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.enable_heading_attributes {
            options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        if self.enable_footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }
}

/// HTML body produced by a renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedHtml {
    /// The rendered HTML content
    pub html: String,
    /// Mapping from rendered top-level element index to source line number
    /// (1-indexed). Empty unless rendered for live display.
    pub line_map: Vec<usize>,
}

/// Byte offset to line number lookup.
struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    fn new(content: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { line_starts }
    }

    /// Convert byte offset to line number (1-indexed).
    fn line_of(&self, byte_offset: usize) -> usize {
        self.line_starts
            .partition_point(|&start| start <= byte_offset)
            .max(1)
    }
}

/// Collects the visible text of a heading, starting right after its start event.
fn heading_text(events: &[(Event<'_>, std::ops::Range<usize>)]) -> String {
    let mut text = String::new();
    for (event, _) in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::End(TagEnd::Heading(_)) => break,
            _ => {}
        }
    }
    text
}

/// Render markdown content to HTML.
///
/// Headings without an explicit id receive their GitHub slug as id. When
/// `track_lines` is set, the 1-indexed source line of every top-level block is
/// recorded in the line map; the HTML itself is identical either way.
///
/// # Example
///
/// ```
/// use mdpanel_core::render::{to_html, RenderOptions};
///
/// let result = to_html("# Hello World\n\nText", &RenderOptions::default(), false);
/// assert!(result.html.contains(r#"<h1 id="hello-world">"#));
/// assert!(result.line_map.is_empty());
/// ```
pub fn to_html(markdown_content: &str, options: &RenderOptions, track_lines: bool) -> RenderedHtml {
    let parser = Parser::new_ext(markdown_content, options.to_pulldown_options());
    let events: Vec<(Event, std::ops::Range<usize>)> = parser.into_offset_iter().collect();
    let line_index = LineIndex::new(markdown_content);

    let mut processed_events = Vec::with_capacity(events.len());
    let mut line_map = Vec::new();

    // Track nesting depth to avoid counting nested blocks
    let mut list_depth: i32 = 0;
    let mut blockquote_depth: i32 = 0;

    for (i, (event, range)) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => list_depth -= 1,
            Event::Start(Tag::BlockQuote) => blockquote_depth += 1,
            Event::End(TagEnd::BlockQuote) => blockquote_depth -= 1,
            _ => {}
        }

        if track_lines {
            let should_track_line = match event {
                Event::Start(Tag::Paragraph) => list_depth == 0 && blockquote_depth == 0,
                Event::Start(Tag::Heading { .. }) => true,
                Event::Start(Tag::BlockQuote) => blockquote_depth == 1,
                Event::Start(Tag::CodeBlock(_)) => list_depth == 0 && blockquote_depth == 0,
                Event::Start(Tag::List(_)) => list_depth == 1,
                Event::Start(Tag::Table(_)) => list_depth == 0 && blockquote_depth == 0,
                _ => false,
            };
            if should_track_line {
                line_map.push(line_index.line_of(range.start));
            }
        }

        match event {
            Event::Start(Tag::Heading {
                level,
                id,
                classes,
                attrs,
            }) => {
                let id = id.clone().or_else(|| {
                    let slug = slugify(&heading_text(&events[i + 1..]));
                    (!slug.is_empty()).then(|| CowStr::from(slug))
                });

                processed_events.push(Event::Start(Tag::Heading {
                    level: *level,
                    id,
                    classes: classes.clone(),
                    attrs: attrs.clone(),
                }));
            }
            other => processed_events.push(other.clone()),
        }
    }

    let mut html_output = String::new();
    pulldown_cmark::html::push_html(&mut html_output, processed_events.into_iter());

    if track_lines {
        tracing::debug!(
            line_map_length = line_map.len(),
            line_map = ?&line_map[..line_map.len().min(20)],
            "Generated line map"
        );
    }

    RenderedHtml {
        html: html_output,
        line_map,
    }
}
