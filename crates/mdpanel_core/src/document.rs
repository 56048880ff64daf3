//! Source document classification.
//!
//! This module provides [`SupportedExtensions`], the single source of truth
//! for which files are previewed as Markdown, and the full-page message shown
//! for anything else.

use crate::assemble::fill_template;
use std::path::Path;

/// Extensions accepted when no list is configured.
pub const DEFAULT_EXTENSIONS: &str = "md,mkd,mdwn,mdown,mdtxt,markdown,txt";

/// Body shown instead of the document when its extension is not supported.
///
/// Placeholders: `{0}` file name, `{1}` configured extension list.
const MSG_NO_SUPPORTED_FILE_EXT: &str =
    "<h3>The current file <u>{0}</u> has no valid Markdown file extension.</h3><div>Valid file extensions:{1}</div>";

/// Set of file extensions the preview accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedExtensions {
    /// Lowercase extensions without the leading dot.
    extensions: Vec<String>,
    /// Accept every file regardless of extension.
    allow_all: bool,
}

impl Default for SupportedExtensions {
    fn default() -> Self {
        Self::parse(DEFAULT_EXTENSIONS)
    }
}

impl SupportedExtensions {
    /// Parses a comma-separated list such as `"md, markdown,.txt"`.
    ///
    /// Entries are trimmed, lowercased and stripped of a leading dot; empty
    /// entries are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use mdpanel_core::SupportedExtensions;
    /// use std::path::Path;
    ///
    /// let extensions = SupportedExtensions::parse("md, .Markdown");
    /// assert!(extensions.is_supported(Some(Path::new("README.MD"))));
    /// assert!(extensions.is_supported(Some(Path::new("notes.markdown"))));
    /// assert!(!extensions.is_supported(Some(Path::new("main.rs"))));
    /// ```
    pub fn parse(list: &str) -> Self {
        let extensions = list
            .split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self {
            extensions,
            allow_all: false,
        }
    }

    /// Accept every file.
    pub fn allow_all() -> Self {
        Self {
            extensions: Vec::new(),
            allow_all: true,
        }
    }

    /// Returns the configured extensions.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Check whether a document at `path` should be rendered.
    ///
    /// A document without a path (an unsaved buffer) is always accepted.
    pub fn is_supported(&self, path: Option<&Path>) -> bool {
        if self.allow_all {
            return true;
        }
        let Some(path) = path else {
            return true;
        };
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .is_some_and(|ext| self.extensions.iter().any(|e| *e == ext))
    }

    /// Comma-separated list for user-facing messages.
    pub fn display_list(&self) -> String {
        self.extensions.join(",")
    }
}

/// Builds the body that replaces an unsupported document.
pub fn unsupported_extension_message(file_name: &str, extensions: &SupportedExtensions) -> String {
    let list = extensions.display_list();
    fill_template(
        MSG_NO_SUPPORTED_FILE_EXT,
        &[("{0}", file_name), ("{1}", list.as_str())],
    )
}
