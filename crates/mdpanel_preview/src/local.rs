//! Serving the document directory to the live page.
//!
//! The display variant points its `<base href>` at the document directory as a
//! `file://` URL, which a page served over HTTP may not load. The live surface
//! maps that URL prefix onto its own `/local/` route instead.

use mdpanel_core::assemble::{base_dir_of, file_url_for_dir};
use std::path::{Component, Path, PathBuf};

/// Route prefix the document directory is served under.
pub const LOCAL_ROUTE: &str = "/local/";

/// Mapping between the document directory and [`LOCAL_ROUTE`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualHost {
    root: Option<PathBuf>,
    file_url: Option<String>,
}

impl VirtualHost {
    /// Maps the directory of `document`, if it exists.
    pub fn for_document(document: Option<&Path>) -> Self {
        let Some(root) = document.and_then(base_dir_of) else {
            return Self::default();
        };
        Self {
            file_url: Some(file_url_for_dir(&root)),
            root: Some(root),
        }
    }

    /// Directory served under [`LOCAL_ROUTE`].
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Replaces the `file://` URL of the mapped directory with [`LOCAL_ROUTE`].
    pub fn rewrite(&self, html: &str) -> String {
        match &self.file_url {
            Some(file_url) => html.replace(file_url.as_str(), LOCAL_ROUTE),
            None => html.to_string(),
        }
    }

    /// Resolves a request path below the mapped directory.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let root = self.root.as_ref()?;
        let relative = safe_relative_path(request_path)?;
        Some(root.join(relative))
    }
}

/// Accepts only plain relative paths without `..`, root or prefix components.
fn safe_relative_path(path: &str) -> Option<PathBuf> {
    let path = Path::new(path);
    let is_safe = path.components().next().is_some()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
    is_safe.then(|| path.to_path_buf())
}

/// Content type served for a local file.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("md" | "markdown" | "txt") => "text/plain; charset=utf-8",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
