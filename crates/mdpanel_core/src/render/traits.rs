//! The Markdown renderer collaborator.
//!
//! The include preprocessor hands fully expanded Markdown to a
//! [`MarkdownRenderer`] and treats it as an opaque function from Markdown to
//! HTML. [`super::PulldownRenderer`] is the implementation shipped with the
//! crate; hosts may plug in their own.

use super::RenderedHtml;
use std::path::Path;

/// Error type for rendering operations.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// I/O error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// General rendering error.
    #[error("Render error: {0}")]
    Other(String),
}

/// Converts Markdown to an HTML body fragment.
///
/// Called twice per render cycle: once for live display with the source path,
/// and once for the portable export with no source path.
pub trait MarkdownRenderer: Send + Sync {
    /// Render `markdown` to HTML.
    ///
    /// # Arguments
    ///
    /// * `markdown` - The fully expanded Markdown text
    /// * `source_path` - The document the text came from, `None` for export
    /// * `for_live_display` - Whether the output feeds the interactive display,
    ///   in which case source line tracking is enabled
    fn render(
        &self,
        markdown: &str,
        source_path: Option<&Path>,
        for_live_display: bool,
    ) -> Result<RenderedHtml, RenderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_display() {
        let io_err = RenderError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        assert!(io_err.to_string().contains("IO error"));

        let other_err = RenderError::Other("custom error".to_string());
        assert_eq!(other_err.to_string(), "Render error: custom error");
    }
}
