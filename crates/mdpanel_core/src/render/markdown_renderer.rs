//! Default [`MarkdownRenderer`] implementation backed by pulldown-cmark.

use super::traits::{MarkdownRenderer, RenderError};
use super::{to_html, RenderOptions, RenderedHtml};
use std::path::Path;

/// Markdown renderer using pulldown-cmark.
///
/// Converts markdown content to HTML with support for GitHub Flavored Markdown
/// and line mapping for scroll synchronization when rendering for live display.
#[derive(Debug, Clone, Default)]
pub struct PulldownRenderer {
    options: RenderOptions,
}

impl PulldownRenderer {
    /// Create a new markdown renderer with the given options.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl MarkdownRenderer for PulldownRenderer {
    fn render(
        &self,
        markdown: &str,
        source_path: Option<&Path>,
        for_live_display: bool,
    ) -> Result<RenderedHtml, RenderError> {
        tracing::trace!(
            source = ?source_path,
            for_live_display,
            len = markdown.len(),
            "Rendering markdown"
        );
        Ok(to_html(markdown, &self.options, for_live_display))
    }
}
