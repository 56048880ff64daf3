//! Recursive expansion of `<!-- @include ... -->` directives.
//!
//! Expansion runs in two phases per text: directive occurrences are tokenized
//! first ([`scan_directives`]), then each one is resolved and its output is
//! spliced back at the directive's position. Included files are expanded
//! recursively before section extraction and heading shifting, so nested
//! includes compose.
//!
//! Nothing here fails: unresolved includes become [`Diagnostic`] comments and a
//! branch that exceeds the depth limit is returned verbatim.

mod diagnostic;
mod directive;
mod resolve;
mod spec;

pub use diagnostic::Diagnostic;
pub use directive::{scan_directives, DirectiveMatch};
pub use resolve::{resolve_targets, ResolvedTarget};
pub use spec::{parse_options, IncludeDirective, LEVEL_OPTION};

use crate::heading::shift_heading_levels;
use crate::section::extract_section;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Default recursion limit for nested includes.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Separator placed between the contributions of a multi-file include.
const CONTRIBUTION_SEPARATOR: &str = "\n";

/// Per-call state threaded through the recursion.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionContext<'a> {
    /// File the text being expanded was loaded from, if known.
    pub current_file: Option<&'a Path>,
    /// Number of include levels above this text.
    pub depth: usize,
}

impl<'a> ExpansionContext<'a> {
    /// Context for a top-level document.
    pub fn root(current_file: Option<&'a Path>) -> Self {
        Self {
            current_file,
            depth: 0,
        }
    }

    /// Context for the contents of `file`, one level deeper.
    fn descend<'b>(&self, file: &'b Path) -> ExpansionContext<'b> {
        ExpansionContext {
            current_file: Some(file),
            depth: self.depth + 1,
        }
    }

    /// Directory relative includes are resolved against.
    ///
    /// This is the directory of the current file, or the process working
    /// directory when no file is known.
    pub fn base_dir(&self) -> PathBuf {
        match self.current_file.and_then(Path::parent) {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Expands include directives.
#[derive(Debug, Clone, Copy)]
pub struct IncludeExpander {
    max_depth: usize,
}

impl Default for IncludeExpander {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl IncludeExpander {
    /// Creates an expander that stops descending past `max_depth`.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Returns the configured recursion limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Expands all directives of a top-level document.
    ///
    /// `current_file` is the file `text` was loaded from; relative includes are
    /// resolved against its directory.
    ///
    /// # Example
    ///
    /// ```
    /// use mdpanel_core::include::IncludeExpander;
    ///
    /// let expander = IncludeExpander::default();
    /// let text = "no directives here\n";
    /// assert_eq!(expander.expand(text, None), text);
    /// ```
    pub fn expand(&self, text: &str, current_file: Option<&Path>) -> String {
        self.expand_at(text, &ExpansionContext::root(current_file))
            .into_owned()
    }

    /// Expands all directives of `text` within `ctx`.
    ///
    /// Returns `text` untouched when the depth limit is exceeded.
    pub fn expand_at<'t>(&self, text: &'t str, ctx: &ExpansionContext<'_>) -> Cow<'t, str> {
        if ctx.depth > self.max_depth {
            tracing::debug!(
                depth = ctx.depth,
                max_depth = self.max_depth,
                file = ?ctx.current_file,
                "Include depth limit exceeded, leaving directives in place"
            );
            return Cow::Borrowed(text);
        }

        let directives = scan_directives(text);
        if directives.is_empty() {
            return Cow::Borrowed(text);
        }

        let base_dir = ctx.base_dir();
        let mut expanded = String::with_capacity(text.len());
        let mut last_end = 0;

        for found in directives {
            expanded.push_str(&text[last_end..found.range.start]);
            let directive = IncludeDirective::parse(found.spec, found.opts);
            expanded.push_str(&self.expand_directive(&directive, &base_dir, ctx));
            last_end = found.range.end;
        }
        expanded.push_str(&text[last_end..]);

        Cow::Owned(expanded)
    }

    /// Produces the replacement text for one directive.
    fn expand_directive(
        &self,
        directive: &IncludeDirective,
        base_dir: &Path,
        ctx: &ExpansionContext<'_>,
    ) -> String {
        let targets = match resolve_targets(base_dir, directive) {
            Ok(targets) => targets,
            Err(diagnostic) => {
                tracing::warn!(spec = %directive.raw_spec, %diagnostic, "Include glob unresolved");
                return diagnostic.to_string();
            }
        };

        targets
            .iter()
            .map(|target| match self.include_target(target, directive, ctx) {
                Ok(content) => content,
                Err(diagnostic) => {
                    tracing::warn!(
                        spec = %directive.raw_spec,
                        path = %target.absolute_path.display(),
                        %diagnostic,
                        "Include unresolved"
                    );
                    diagnostic.to_string()
                }
            })
            .filter(|contribution| !contribution.is_empty())
            .collect::<Vec<_>>()
            .join(CONTRIBUTION_SEPARATOR)
    }

    /// Reads, expands, narrows and shifts a single included file.
    fn include_target(
        &self,
        target: &ResolvedTarget,
        directive: &IncludeDirective,
        ctx: &ExpansionContext<'_>,
    ) -> Result<String, Diagnostic> {
        let not_found = || Diagnostic::IncludeNotFound {
            name: target.display_name(),
        };

        if !target.absolute_path.is_file() {
            return Err(not_found());
        }

        let raw = std::fs::read_to_string(&target.absolute_path).map_err(|err| {
            tracing::warn!(?err, path = %target.absolute_path.display(), "Failed to read include");
            not_found()
        })?;

        let nested_ctx = ctx.descend(&target.absolute_path);
        let content = self.expand_at(&raw, &nested_ctx);

        let selector = directive.selector();
        let content = if selector.is_empty() {
            content.as_ref()
        } else {
            extract_section(&content, selector).ok_or_else(|| Diagnostic::SectionNotFound {
                selector: directive.selector_label().unwrap_or_default(),
                name: target.display_name(),
            })?
        };

        Ok(shift_heading_levels(content, directive.heading_level_offset))
    }
}
