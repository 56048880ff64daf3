//! Inline diagnostics substituted for includes that could not be resolved.

use std::fmt;

/// A local resolution failure.
///
/// Rendered as an HTML comment in place of the content it stands for, so a
/// broken include never aborts the surrounding document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// The included file does not exist.
    IncludeNotFound {
        /// File name of the missing include.
        name: String,
    },
    /// The included file exists but the requested section does not.
    SectionNotFound {
        /// `id` or `.class` that was asked for.
        selector: String,
        /// File name of the include.
        name: String,
    },
    /// The directory part of a glob include does not exist.
    GlobDirNotFound {
        /// Directory part as written in the directive.
        dir: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncludeNotFound { name } => write!(f, "<!-- include not found: {name} -->"),
            Self::SectionNotFound { selector, name } => {
                write!(f, "<!-- section not found: {selector} in {name} -->")
            }
            Self::GlobDirNotFound { dir } => write!(f, "<!-- include glob dir not found: {dir} -->"),
        }
    }
}
