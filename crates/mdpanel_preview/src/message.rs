use serde::Serialize;

/// Message pushed to every connected browser page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Reload the page from the server.
    FullReload,
    /// Replace the body and/or the stylesheet in place.
    Patch {
        body: Option<String>,
        css: Option<String>,
        line_map: Vec<usize>,
    },
    /// Scroll to the block rendered from the given source line.
    Scroll { line: usize },
    /// Set the page zoom factor.
    Zoom { factor: f64 },
}
