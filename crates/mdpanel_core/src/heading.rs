//! ATX heading scanning for Markdown documents.
//!
//! This module provides:
//! - Line-level recognition of `#`..`######` headings with an optional trailing
//!   attribute block (`{#id .class}`)
//! - GitHub-style slugs derived from the visible heading title
//! - Heading-level shifting, used when an included document is promoted or
//!   demoted to fit its insertion point
//!
//! Lines inside fenced code blocks are never treated as headings.

use once_cell::sync::Lazy;
use regex::Regex;

/// Smallest ATX heading level.
pub const MIN_LEVEL: usize = 1;

/// Largest ATX heading level.
pub const MAX_LEVEL: usize = 6;

/// Converts heading text to a slug following GitHub's convention.
///
/// 1. Convert to lowercase
/// 2. Remove every character except word characters, hyphens and spaces
/// 3. Replace each run of whitespace with a single hyphen
/// 4. Trim leading and trailing hyphens
///
/// Unlike some TOC generators, runs of hyphens are kept as-is, so `a - b`
/// becomes `a---b` just like on GitHub.
///
/// # Example
///
/// ```
/// use mdpanel_core::heading::slugify;
///
/// assert_eq!(slugify("Getting Started"), "getting-started");
/// assert_eq!(slugify("API Reference (v2)"), "api-reference-v2");
/// ```
pub fn slugify(text: &str) -> String {
    let kept = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || *c == ' ')
        .collect::<String>();

    let mut slug = String::with_capacity(kept.len());
    let mut in_space = false;
    for c in kept.chars() {
        if c == ' ' {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.push(c);
            in_space = false;
        }
    }

    slug.trim_matches('-').to_string()
}

/// A heading found while scanning a document.
///
/// Headings are derived on demand from the text and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level, 1..=6.
    pub level: usize,
    /// Visible title with the attribute block and closing hashes removed.
    pub title: String,
    /// Explicit id from the attribute block, if any.
    pub explicit_id: Option<String>,
    /// Classes from the attribute block.
    pub classes: Vec<String>,
    /// Byte offset of the start of the heading line.
    pub start_offset: usize,
}

impl Heading {
    /// GitHub-style slug of the visible title.
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    /// Returns `true` if the heading carries `class`, compared case-insensitively.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| eq_ignore_case(c, class))
    }

    /// Returns `true` if `id` names this heading, either through its explicit
    /// id or through its slug. The comparison is case-insensitive.
    pub fn is_addressed_by(&self, id: &str) -> bool {
        self.explicit_id
            .as_deref()
            .is_some_and(|explicit| eq_ignore_case(explicit, id))
            || eq_ignore_case(&self.slug(), id)
    }
}

/// Case-insensitive comparison that also folds non-ASCII letters.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

static ATTRIBUTE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([#.])([\w-]+)").expect("attribute token regex is valid"));

/// Parses the inside of an attribute block (`#id .class .other`).
///
/// The last `#id` wins; classes are kept in order of appearance without
/// duplicates.
pub fn parse_attributes(attrs: &str) -> (Option<String>, Vec<String>) {
    let mut id = None;
    let mut classes: Vec<String> = Vec::new();

    for cap in ATTRIBUTE_TOKEN.captures_iter(attrs) {
        let value = cap[2].to_string();
        if &cap[1] == "#" {
            id = Some(value);
        } else if !classes.iter().any(|c| eq_ignore_case(c, &value)) {
            classes.push(value);
        }
    }

    (id, classes)
}

/// Indicates the type of code block fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CodeBlockStart {
    Backticks,
    Tildes,
}

/// Tracks whether the scanner is currently inside a fenced code block.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    code_fence: Option<CodeBlockStart>,
}

impl FenceTracker {
    /// Feeds one line and returns `true` if the line is ordinary Markdown,
    /// i.e. neither a fence delimiter nor part of a fenced block.
    pub(crate) fn is_markdown_line(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        match self.code_fence {
            None => {
                if trimmed.starts_with("```") {
                    self.code_fence = Some(CodeBlockStart::Backticks);
                    false
                } else if trimmed.starts_with("~~~") {
                    self.code_fence = Some(CodeBlockStart::Tildes);
                    false
                } else {
                    true
                }
            }
            Some(code_block_start) => {
                match code_block_start {
                    CodeBlockStart::Backticks if trimmed.starts_with("```") => {
                        self.code_fence.take();
                    }
                    CodeBlockStart::Tildes if trimmed.starts_with("~~~") => {
                        self.code_fence.take();
                    }
                    _ => {}
                }
                false
            }
        }
    }
}

/// Splits a line into its ATX marker length and the remaining text.
///
/// Returns `None` unless the line starts with 1 to 6 `#` followed by a space,
/// a tab or the end of the line.
pub(crate) fn atx_marker(line: &str) -> Option<(usize, &str)> {
    let line = line.trim_end_matches(['\n', '\r']);
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if !(MIN_LEVEL..=MAX_LEVEL).contains(&hashes) {
        return None;
    }
    let rest = &line[hashes..];
    match rest.as_bytes().first() {
        None | Some(b' ') | Some(b'\t') => Some((hashes, rest)),
        _ => None,
    }
}

/// Parses a single line as an ATX heading.
fn parse_heading_line(line: &str, start_offset: usize) -> Option<Heading> {
    let (level, rest) = atx_marker(line)?;
    let mut title = rest.trim();
    let mut explicit_id = None;
    let mut classes = Vec::new();

    if title.ends_with('}') {
        if let Some(open) = title.rfind('{') {
            let attrs = &title[open + 1..title.len() - 1];
            if !attrs.contains('}') {
                (explicit_id, classes) = parse_attributes(attrs);
                title = title[..open].trim_end();
            }
        }
    }

    // Optional closing sequence: `## Title ##`.
    let without_closing = title.trim_end_matches('#');
    if without_closing.len() != title.len()
        && (without_closing.is_empty() || without_closing.ends_with([' ', '\t']))
    {
        title = without_closing.trim_end();
    }

    Some(Heading {
        level,
        title: title.to_string(),
        explicit_id,
        classes,
        start_offset,
    })
}

/// Scans all ATX headings of `text` in document order.
///
/// # Example
///
/// ```
/// use mdpanel_core::heading::scan_headings;
///
/// let headings = scan_headings("# Intro\n\n## Setup {#setup .tutorial}\n");
/// assert_eq!(headings.len(), 2);
/// assert_eq!(headings[1].level, 2);
/// assert_eq!(headings[1].explicit_id.as_deref(), Some("setup"));
/// ```
pub fn scan_headings(text: &str) -> Vec<Heading> {
    let mut fences = FenceTracker::default();
    let mut offset = 0;
    let mut headings = Vec::new();

    for line in text.split_inclusive('\n') {
        if fences.is_markdown_line(line) {
            if let Some(heading) = parse_heading_line(line, offset) {
                headings.push(heading);
            }
        }
        offset += line.len();
    }

    headings
}

/// Shifts every ATX heading of `text` by `offset` levels, clamping the result
/// to `1..=6`.
///
/// Everything except the heading markers is preserved byte for byte.
///
/// # Example
///
/// ```
/// use mdpanel_core::heading::shift_heading_levels;
///
/// assert_eq!(shift_heading_levels("##### Deep\n", 3), "###### Deep\n");
/// assert_eq!(shift_heading_levels("## Up\n", -4), "# Up\n");
/// ```
pub fn shift_heading_levels(text: &str, offset: i32) -> String {
    if offset == 0 {
        return text.to_string();
    }

    let mut fences = FenceTracker::default();
    let mut shifted = String::with_capacity(text.len() + 16);

    for line in text.split_inclusive('\n') {
        match fences
            .is_markdown_line(line)
            .then(|| atx_marker(line))
            .flatten()
        {
            Some((level, _)) => {
                let new_level = (level as i64 + i64::from(offset))
                    .clamp(MIN_LEVEL as i64, MAX_LEVEL as i64) as usize;
                shifted.push_str(&"#".repeat(new_level));
                shifted.push_str(&line[level..]);
            }
            None => shifted.push_str(line),
        }
    }

    shifted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Getting Started"), "getting-started");
        assert_eq!(slugify("Hello,   World!"), "hello-world");
        assert_eq!(slugify("foo_bar"), "foo_bar");
        assert_eq!(slugify("  -Leading and trailing-  "), "leading-and-trailing");
        assert_eq!(slugify("a - b"), "a---b");
        assert_eq!(slugify("Überblick"), "überblick");
    }

    #[test]
    fn test_parse_attributes() {
        let (id, classes) = parse_attributes("#first .tutorial #second .Tutorial .extra");
        assert_eq!(id.as_deref(), Some("second"));
        assert_eq!(classes, vec!["tutorial".to_string(), "extra".to_string()]);
    }

    #[test]
    fn test_atx_marker() {
        assert_eq!(atx_marker("## Title"), Some((2, " Title")));
        assert_eq!(atx_marker("#\n"), Some((1, "")));
        assert_eq!(atx_marker("#hashtag"), None);
        assert_eq!(atx_marker("####### seven"), None);
        assert_eq!(atx_marker(" # indented"), None);
    }

    #[test]
    fn test_scan_headings_with_attributes() {
        let text = "# Title\n\nbody\n\n## Setup {#setup .tutorial .Basics}\n### Closing ###\n";
        let headings = scan_headings(text);
        assert_eq!(headings.len(), 3);

        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[0].title, "Title");
        assert_eq!(headings[0].start_offset, 0);

        assert_eq!(headings[1].title, "Setup");
        assert_eq!(headings[1].explicit_id.as_deref(), Some("setup"));
        assert!(headings[1].has_class("TUTORIAL"));
        assert!(headings[1].has_class("basics"));
        assert_eq!(headings[1].start_offset, text.find("## Setup").unwrap());

        assert_eq!(headings[2].title, "Closing");
    }

    #[test]
    fn test_scan_headings_skips_fenced_code() {
        let text = "# Real\n```bash\n# not a heading\n```\n~~~\n## nope\n~~~\n## Also real\n";
        let titles: Vec<_> = scan_headings(text).into_iter().map(|h| h.title).collect();
        assert_eq!(titles, vec!["Real", "Also real"]);
    }

    #[test]
    fn test_is_addressed_by() {
        let heading = &scan_headings("## Getting Started {#start}\n")[0];
        assert!(heading.is_addressed_by("start"));
        assert!(heading.is_addressed_by("START"));
        assert!(heading.is_addressed_by("getting-started"));
        assert!(!heading.is_addressed_by("getting"));

        let heading = &scan_headings("## Überblick {.Übung}\n")[0];
        assert!(heading.is_addressed_by("Überblick"));
        assert!(heading.is_addressed_by("ÜBERBLICK"));
        assert!(heading.has_class("übung"));
    }

    #[test]
    fn test_shift_heading_levels_clamps() {
        assert_eq!(shift_heading_levels("##### Five\n", 3), "###### Five\n");
        assert_eq!(shift_heading_levels("# One\n## Two\n", 1), "## One\n### Two\n");
        assert_eq!(shift_heading_levels("### Three\n", -5), "# Three\n");
    }

    #[test]
    fn test_shift_heading_levels_preserves_other_lines() {
        let text = "# Title\nnot #a heading\n```\n# comment\n```\n\ttext\r\n## Sub\r\n";
        let expected = "## Title\nnot #a heading\n```\n# comment\n```\n\ttext\r\n### Sub\r\n";
        assert_eq!(shift_heading_levels(text, 1), expected);
        assert_eq!(shift_heading_levels(text, 0), text);
    }
}
