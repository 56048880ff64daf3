//! HTML file rewritten on every render and opened in the default browser.

use mdpanel_core::assemble::inject_into_head;
use mdpanel_core::display::{diff_strategy, zoom_factor};
use mdpanel_core::{DiffStrategy, DisplayState, DisplaySurface, RenderResult, SurfaceError};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StaticSurfaceOptions {
    /// File the display page is written to.
    pub output_file: PathBuf,
    pub open_browser: bool,
}

impl Default for StaticSurfaceOptions {
    fn default() -> Self {
        Self {
            output_file: std::env::temp_dir().join("mdpanel-preview.html"),
            open_browser: true,
        }
    }
}

/// Display surface writing the display page to a file.
///
/// A file has no incremental updates: every change rewrites it, and the
/// browser has to be refreshed by hand. Scrolling is not supported.
pub struct StaticFileSurface {
    options: StaticSurfaceOptions,
    zoom_level: u32,
    state: Option<DisplayState>,
    last_page: Option<String>,
    opened: bool,
}

impl StaticFileSurface {
    pub fn new(options: StaticSurfaceOptions) -> Self {
        Self {
            options,
            zoom_level: 100,
            state: None,
            last_page: None,
            opened: false,
        }
    }

    pub fn output_file(&self) -> &Path {
        &self.options.output_file
    }

    fn write_page(&mut self) -> Result<(), SurfaceError> {
        let Some(page) = &self.last_page else {
            return Ok(());
        };

        let page = if self.zoom_level == 100 {
            page.clone()
        } else {
            let zoom = format!(
                "<style>body {{ zoom: {}; }}</style>",
                zoom_factor(self.zoom_level)
            );
            inject_into_head(page, &zoom)
        };

        let output_file = &self.options.output_file;
        if let Some(dir) = output_file.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(output_file, page)?;
        tracing::debug!(path = %output_file.display(), "Wrote display page");

        if self.options.open_browser && !self.opened {
            webbrowser::open(&output_file.to_string_lossy())
                .map_err(|err| SurfaceError::Browser(err.to_string()))?;
            self.opened = true;
        }

        Ok(())
    }
}

impl DisplaySurface for StaticFileSurface {
    fn initialize(&mut self, zoom_level: u32) -> Result<(), SurfaceError> {
        self.zoom_level = zoom_level;
        Ok(())
    }

    fn set_content(&mut self, result: &RenderResult) -> Result<DiffStrategy, SurfaceError> {
        let next = DisplayState::from(result);
        let strategy = diff_strategy(self.state.as_ref(), &next);

        if strategy != DiffStrategy::NoChange {
            self.last_page.replace(result.html_for_display.clone());
            self.write_page()?;
        }
        self.state.replace(next);

        Ok(strategy)
    }

    fn scroll_to_line(&mut self, line: usize) -> Result<(), SurfaceError> {
        tracing::trace!(line, "Scrolling is not supported by the static surface");
        Ok(())
    }

    fn screenshot(&mut self) -> Option<Vec<u8>> {
        None
    }

    fn set_zoom(&mut self, zoom_level: u32) -> Result<(), SurfaceError> {
        if self.zoom_level == zoom_level {
            return Ok(());
        }
        self.zoom_level = zoom_level;
        self.write_page()
    }

    fn engine_name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdpanel_core::RenderPipeline;

    fn surface(output_file: PathBuf) -> StaticFileSurface {
        StaticFileSurface::new(StaticSurfaceOptions {
            output_file,
            open_browser: false,
        })
    }

    #[test]
    fn test_writes_display_page() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("preview").join("page.html");
        let mut surface = surface(out.clone());
        surface.initialize(100).unwrap();

        let pipeline = RenderPipeline::default();
        let result = pipeline.render("# One", None).unwrap();
        assert_eq!(surface.set_content(&result).unwrap(), DiffStrategy::FullReload);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), result.html_for_display);

        std::fs::remove_file(&out).unwrap();
        assert_eq!(surface.set_content(&result).unwrap(), DiffStrategy::NoChange);
        assert!(!out.exists());

        let result = pipeline.render("# Two", None).unwrap();
        assert_eq!(surface.set_content(&result).unwrap(), DiffStrategy::PatchBody);
        assert!(std::fs::read_to_string(&out).unwrap().contains("Two"));
    }

    #[test]
    fn test_zoom_rewrites_page() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("page.html");
        let mut surface = surface(out.clone());
        surface.initialize(100).unwrap();

        // Nothing rendered yet, nothing written.
        surface.set_zoom(150).unwrap();
        assert!(!out.exists());

        let result = RenderPipeline::default().render("text", None).unwrap();
        surface.set_content(&result).unwrap();
        assert!(std::fs::read_to_string(&out)
            .unwrap()
            .contains("<style>body { zoom: 1.5; }</style>"));

        surface.set_zoom(100).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), result.html_for_display);
        assert_eq!(surface.engine_name(), "static");
        assert!(surface.screenshot().is_none());
    }
}
