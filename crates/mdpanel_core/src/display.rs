//! Display surfaces and the update strategy between two renders.
//!
//! A surface never diffs on its own: it keeps the last [`DisplayState`] it
//! showed and asks [`diff_strategy`] how to get to the next one.

use crate::pipeline::RenderResult;
use std::path::PathBuf;

/// Error raised by a display surface.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("display surface is not initialized")]
    NotInitialized,
    #[error("failed to open browser: {0}")]
    Browser(String),
}

/// What a surface currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub document_path: Option<PathBuf>,
    pub body: String,
    pub style: String,
}

impl From<&RenderResult> for DisplayState {
    fn from(result: &RenderResult) -> Self {
        Self {
            document_path: result.document_path.clone(),
            body: result.body_html.clone(),
            style: result.style_css.clone(),
        }
    }
}

/// How a surface moves from one [`DisplayState`] to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStrategy {
    /// Navigate to the full document.
    FullReload,
    /// Replace the body in place.
    PatchBody,
    /// Replace the stylesheet in place.
    PatchStyle,
    /// Replace both body and stylesheet in place.
    PatchBodyAndStyle,
    /// Nothing to do.
    NoChange,
}

impl DiffStrategy {
    pub fn patches_body(self) -> bool {
        matches!(self, Self::PatchBody | Self::PatchBodyAndStyle)
    }

    pub fn patches_style(self) -> bool {
        matches!(self, Self::PatchStyle | Self::PatchBodyAndStyle)
    }
}

/// Decides how to update a surface showing `previous` so it shows `next`.
///
/// Showing nothing yet, or a different document, always requires a full
/// reload; otherwise only what changed is patched.
pub fn diff_strategy(previous: Option<&DisplayState>, next: &DisplayState) -> DiffStrategy {
    let Some(previous) = previous else {
        return DiffStrategy::FullReload;
    };

    if previous.document_path != next.document_path {
        return DiffStrategy::FullReload;
    }

    match (previous.body != next.body, previous.style != next.style) {
        (true, true) => DiffStrategy::PatchBodyAndStyle,
        (true, false) => DiffStrategy::PatchBody,
        (false, true) => DiffStrategy::PatchStyle,
        (false, false) => DiffStrategy::NoChange,
    }
}

/// Converts a zoom level in percent into a scale factor.
pub fn zoom_factor(zoom_level: u32) -> f64 {
    f64::from(zoom_level) / 100.0
}

/// A place rendered documents are shown.
///
/// Implementations are driven from a single task; `set_content` is only ever
/// called with a completed [`RenderResult`].
pub trait DisplaySurface: Send {
    /// Prepares the surface before the first document is shown.
    fn initialize(&mut self, zoom_level: u32) -> Result<(), SurfaceError>;

    /// Shows `result`, returning the update that was applied.
    fn set_content(&mut self, result: &RenderResult) -> Result<DiffStrategy, SurfaceError>;

    /// Scrolls to the block rendered from source line `line` (1-indexed).
    fn scroll_to_line(&mut self, line: usize) -> Result<(), SurfaceError>;

    /// PNG snapshot of the current view, if the surface can produce one.
    fn screenshot(&mut self) -> Option<Vec<u8>>;

    fn set_zoom(&mut self, zoom_level: u32) -> Result<(), SurfaceError>;

    /// Short name of the engine behind the surface.
    fn engine_name(&self) -> &'static str;
}
