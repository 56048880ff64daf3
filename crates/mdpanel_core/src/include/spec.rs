//! Parsing of an include directive's target spec and option bag.
//!
//! Two spec shapes are recognized:
//! - `file#id`: a path with a simple fragment selecting a section by id
//! - `file{#id .class}`: a path with an attribute block selecting by id and/or class
//!
//! Parsing never fails. Anything that doesn't fit one of the shapes is taken
//! as a literal file name without a selector.

use crate::section::SectionSelector;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Option key controlling the heading-level offset.
pub const LEVEL_OPTION: &str = "level";

static OPTION_PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\w+)\s*=\s*(?:"([^"]*)"|(\S+))"#).expect("option pair regex is valid")
});

static BRACE_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<file>[^{}#]+)\{(?P<attrs>[^}]*)\}\s*$").expect("brace spec regex is valid")
});

static ID_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([\w-]+)").expect("id attribute regex is valid"));

static CLASS_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.([\w-]+)").expect("class attribute regex is valid"));

/// Parses `key=value` and `key="value"` pairs.
///
/// Keys are lowercased; a repeated key keeps its last value. Text that is not a
/// pair is ignored.
///
/// # Example
///
/// ```
/// use mdpanel_core::include::parse_options;
///
/// let opts = parse_options(r#"level=2 Title="Hello there" junk"#);
/// assert_eq!(opts.get("level").map(String::as_str), Some("2"));
/// assert_eq!(opts.get("title").map(String::as_str), Some("Hello there"));
/// ```
pub fn parse_options(raw: &str) -> HashMap<String, String> {
    OPTION_PAIR
        .captures_iter(raw)
        .map(|cap| {
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .map_or("", |m| m.as_str());
            (cap[1].to_lowercase(), value.to_string())
        })
        .collect()
}

/// A parsed `@include` directive.
///
/// Immutable once parsed; one instance per directive occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// The spec exactly as written between the quotes (trimmed).
    pub raw_spec: String,
    /// The file or glob path part of the spec.
    pub path: String,
    /// Section id requested via `#id`.
    pub section_id: Option<String>,
    /// Section class requested via `{.class}`.
    pub section_class: Option<String>,
    /// Amount added to the level of every heading of the included text.
    pub heading_level_offset: i32,
    /// Whether the file-name part of `path` contains `*` or `?`.
    pub is_glob: bool,
}

impl IncludeDirective {
    /// Parses a directive's spec and raw options string.
    ///
    /// # Example
    ///
    /// ```
    /// use mdpanel_core::include::IncludeDirective;
    ///
    /// let directive = IncludeDirective::parse("parts/*.md{#setup .tutorial}", "level=1");
    /// assert_eq!(directive.path, "parts/*.md");
    /// assert_eq!(directive.section_id.as_deref(), Some("setup"));
    /// assert_eq!(directive.section_class.as_deref(), Some("tutorial"));
    /// assert_eq!(directive.heading_level_offset, 1);
    /// assert!(directive.is_glob);
    /// ```
    pub fn parse(raw_spec: &str, raw_opts: &str) -> Self {
        let raw_spec = raw_spec.trim();

        let heading_level_offset = parse_options(raw_opts)
            .get(LEVEL_OPTION)
            .and_then(|level| level.trim().parse::<i32>().ok())
            .unwrap_or(0);

        let (path, section_id, section_class) = if let Some(cap) = BRACE_SPEC.captures(raw_spec) {
            let attrs = &cap["attrs"];
            (
                cap["file"].trim().to_string(),
                ID_ATTR.captures(attrs).map(|c| c[1].to_string()),
                CLASS_ATTR.captures(attrs).map(|c| c[1].to_string()),
            )
        } else if let Some((file, id)) = raw_spec.split_once('#') {
            (file.to_string(), Some(id.to_string()), None)
        } else {
            (raw_spec.to_string(), None, None)
        };

        let is_glob = file_name_part(&path).contains(['*', '?']);

        Self {
            raw_spec: raw_spec.to_string(),
            path,
            section_id: section_id.filter(|s| !s.is_empty()),
            section_class: section_class.filter(|s| !s.is_empty()),
            heading_level_offset,
            is_glob,
        }
    }

    /// Returns the section selector, which may be empty.
    pub fn selector(&self) -> SectionSelector<'_> {
        SectionSelector::new(self.section_id.as_deref(), self.section_class.as_deref())
    }

    /// Human-readable selector for diagnostics: `id` if present, else `.class`.
    pub fn selector_label(&self) -> Option<String> {
        self.section_id
            .clone()
            .or_else(|| self.section_class.as_ref().map(|class| format!(".{class}")))
    }
}

/// Returns the part of `path` after the last `/` or `\`.
pub(crate) fn file_name_part(path: &str) -> &str {
    path.rfind(['/', '\\']).map_or(path, |idx| &path[idx + 1..])
}

/// Returns the part of `path` before the last `/` or `\`, or `""`.
pub(crate) fn dir_part(path: &str) -> &str {
    path.rfind(['/', '\\']).map_or("", |idx| &path[..idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path() {
        let directive = IncludeDirective::parse(" notes.md ", "");
        assert_eq!(directive.raw_spec, "notes.md");
        assert_eq!(directive.path, "notes.md");
        assert_eq!(directive.section_id, None);
        assert_eq!(directive.section_class, None);
        assert_eq!(directive.heading_level_offset, 0);
        assert!(!directive.is_glob);
        assert!(directive.selector().is_empty());
    }

    #[test]
    fn test_simple_fragment() {
        let directive = IncludeDirective::parse("notes.md#intro", "");
        assert_eq!(directive.path, "notes.md");
        assert_eq!(directive.section_id.as_deref(), Some("intro"));
        assert_eq!(directive.selector_label().as_deref(), Some("intro"));
    }

    #[test]
    fn test_empty_fragment_is_no_selector() {
        let directive = IncludeDirective::parse("notes.md#", "");
        assert_eq!(directive.path, "notes.md");
        assert_eq!(directive.section_id, None);
    }

    #[test]
    fn test_attribute_block_class_only() {
        let directive = IncludeDirective::parse("guide.md{.tutorial}", "");
        assert_eq!(directive.path, "guide.md");
        assert_eq!(directive.section_id, None);
        assert_eq!(directive.section_class.as_deref(), Some("tutorial"));
        assert_eq!(directive.selector_label().as_deref(), Some(".tutorial"));
    }

    #[test]
    fn test_malformed_brace_is_literal() {
        let directive = IncludeDirective::parse("weird{name.md", "");
        assert_eq!(directive.path, "weird{name.md");
        assert_eq!(directive.section_id, None);
        assert_eq!(directive.section_class, None);
    }

    #[test]
    fn test_glob_only_in_file_name() {
        assert!(IncludeDirective::parse("parts/*.md", "").is_glob);
        assert!(IncludeDirective::parse("part?.md#x", "").is_glob);
        assert!(!IncludeDirective::parse("we*rd/file.md", "").is_glob);
        assert!(!IncludeDirective::parse(r"we?rd\file.md", "").is_glob);
    }

    #[test]
    fn test_level_option() {
        assert_eq!(
            IncludeDirective::parse("a.md", "level=2").heading_level_offset,
            2
        );
        assert_eq!(
            IncludeDirective::parse("a.md", r#"LEVEL="-1""#).heading_level_offset,
            -1
        );
        assert_eq!(
            IncludeDirective::parse("a.md", "level = +3").heading_level_offset,
            3
        );
        assert_eq!(
            IncludeDirective::parse("a.md", "level=two other=1").heading_level_offset,
            0
        );
    }

    #[test]
    fn test_parse_options_ignores_unknown_text() {
        let opts = parse_options("foo=bar baz qux=\"a b\" =broken");
        assert_eq!(opts.len(), 2);
        assert_eq!(opts["foo"], "bar");
        assert_eq!(opts["qux"], "a b");
    }

    #[test]
    fn test_path_parts() {
        assert_eq!(file_name_part("a/b/c.md"), "c.md");
        assert_eq!(file_name_part(r"a\b.md"), "b.md");
        assert_eq!(file_name_part("c.md"), "c.md");
        assert_eq!(dir_part("a/b/c.md"), "a/b");
        assert_eq!(dir_part("c.md"), "");
    }
}
