//! One complete render cycle: validate, expand includes, render, assemble.

use crate::assemble::DocumentAssembler;
use crate::assets::Assets;
use crate::document::{unsupported_extension_message, SupportedExtensions};
use crate::include::IncludeExpander;
use crate::render::{MarkdownRenderer, PulldownRenderer, RenderError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Error writing the export artifact.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create directory {}: {source}", dir.display())]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Immutable output of one render cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    /// Complete page for the display surface.
    pub html_for_display: String,
    /// Portable page written on export.
    pub html_for_export: String,
    /// Display body alone, used for incremental patches.
    pub body_html: String,
    /// Stylesheet alone, used for incremental patches.
    pub style_css: String,
    /// Source line of each top-level block of the display body.
    pub line_map: Vec<usize>,
    /// Document this result was rendered from.
    pub document_path: Option<PathBuf>,
}

impl RenderResult {
    /// Writes the export variant to `path`, creating parent directories.
    pub fn export_to(&self, path: &Path) -> Result<(), ExportError> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| ExportError::CreateDir {
                dir: dir.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, &self.html_for_export).map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Exported HTML");
        Ok(())
    }
}

/// Turns Markdown source into a [`RenderResult`].
///
/// Cheap to clone; clones share the renderer.
#[derive(Clone)]
pub struct RenderPipeline {
    expander: IncludeExpander,
    renderer: Arc<dyn MarkdownRenderer>,
    extensions: SupportedExtensions,
    custom_css: Option<PathBuf>,
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("expander", &self.expander)
            .field("extensions", &self.extensions)
            .field("custom_css", &self.custom_css)
            .finish_non_exhaustive()
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(Arc::new(PulldownRenderer::default()))
    }
}

impl RenderPipeline {
    pub fn new(renderer: Arc<dyn MarkdownRenderer>) -> Self {
        Self {
            expander: IncludeExpander::default(),
            renderer,
            extensions: SupportedExtensions::default(),
            custom_css: None,
        }
    }

    pub fn with_expander(mut self, expander: IncludeExpander) -> Self {
        self.expander = expander;
        self
    }

    pub fn with_extensions(mut self, extensions: SupportedExtensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_custom_css(mut self, custom_css: Option<PathBuf>) -> Self {
        self.custom_css = custom_css;
        self
    }

    pub fn expander(&self) -> &IncludeExpander {
        &self.expander
    }

    /// Expands includes only.
    pub fn expand(&self, text: &str, file_path: Option<&Path>) -> String {
        self.expander.expand(text, file_path)
    }

    /// Runs a full render cycle for `text` loaded from `file_path`.
    ///
    /// The expanded Markdown is rendered twice: with the source path for live
    /// display and without it for the portable export.
    pub fn render(&self, text: &str, file_path: Option<&Path>) -> Result<RenderResult, RenderError> {
        let started = Instant::now();

        let title = file_path
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let css = Assets::stylesheet(self.custom_css.as_deref());

        if !self.extensions.is_supported(file_path) {
            tracing::debug!(?file_path, "Unsupported file extension");
            let body = unsupported_extension_message(&title, &self.extensions);
            let page = DocumentAssembler::export(&title, &css, &body);
            return Ok(RenderResult {
                html_for_display: page.clone(),
                html_for_export: page,
                body_html: body,
                style_css: css,
                line_map: Vec::new(),
                document_path: file_path.map(Path::to_path_buf),
            });
        }

        let expanded = self.expander.expand(text, file_path);
        let expanded_at = started.elapsed();

        let for_display = self.renderer.render(&expanded, file_path, true)?;
        let for_export = self.renderer.render(&expanded, None, false)?;

        let assembled = DocumentAssembler::assemble(
            &title,
            &css,
            &for_display.html,
            &for_export.html,
            file_path,
        );

        tracing::debug!(
            ?file_path,
            ?expanded_at,
            total = ?started.elapsed(),
            "Rendered document"
        );

        Ok(RenderResult {
            html_for_display: assembled.display,
            html_for_export: assembled.export,
            body_html: for_display.html,
            style_css: css,
            line_map: for_display.line_map,
            document_path: file_path.map(Path::to_path_buf),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RenderedHtml;

    struct FailingRenderer;

    impl MarkdownRenderer for FailingRenderer {
        fn render(&self, _: &str, _: Option<&Path>, _: bool) -> Result<RenderedHtml, RenderError> {
            Err(RenderError::Other("boom".into()))
        }
    }

    struct EchoRenderer;

    impl MarkdownRenderer for EchoRenderer {
        fn render(
            &self,
            markdown: &str,
            source_path: Option<&Path>,
            for_live_display: bool,
        ) -> Result<RenderedHtml, RenderError> {
            Ok(RenderedHtml {
                html: format!(
                    "<pre>{markdown}|{}|{for_live_display}</pre>",
                    source_path.is_some()
                ),
                line_map: Vec::new(),
            })
        }
    }

    #[test]
    fn test_renderer_called_twice_with_different_arguments() {
        let pipeline = RenderPipeline::new(Arc::new(EchoRenderer));
        let result = pipeline.render("text", Some(Path::new("doc.md"))).unwrap();
        assert_eq!(result.body_html, "<pre>text|true|true</pre>");
        assert!(result.html_for_export.contains("<pre>text|false|false</pre>"));
        assert!(result.html_for_display.contains("<title>doc.md</title>"));
    }

    #[test]
    fn test_unsupported_extension_replaces_whole_body() {
        let pipeline = RenderPipeline::new(Arc::new(FailingRenderer));
        let result = pipeline
            .render("<!-- @include \"x.md\" -->", Some(Path::new("main.rs")))
            .unwrap();
        assert!(result.body_html.contains("<u>main.rs</u>"));
        assert!(!result.body_html.contains("@include"));
        assert_eq!(result.html_for_display, result.html_for_export);
        assert!(!result.html_for_display.contains("<script"));
    }

    #[test]
    fn test_renderer_error_propagates() {
        let pipeline = RenderPipeline::new(Arc::new(FailingRenderer));
        let err = pipeline.render("# x", None).unwrap_err();
        assert_eq!(err.to_string(), "Render error: boom");
    }

    #[test]
    fn test_export_to_creates_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested").join("out.html");

        let result = RenderPipeline::default().render("# Hi", None).unwrap();
        result.export_to(&out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), result.html_for_export);
    }

    #[test]
    fn test_export_to_reports_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let result = RenderPipeline::default().render("# Hi", None).unwrap();
        let err = result.export_to(tmp.path()).unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
