//! Tokenizer for `<!-- @include "<spec>" <opts> -->` directives.
//!
//! Detection is a single forward pass without regular expressions; parsing of
//! the spec and options happens afterwards in [`super::spec`].

use std::ops::Range;

const COMMENT_OPEN: &str = "<!--";
const COMMENT_CLOSE: &str = "-->";
const KEYWORD: &str = "@include";

/// One directive occurrence in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveMatch<'a> {
    /// Byte range of the whole comment, `<!--` through `-->`.
    pub range: Range<usize>,
    /// Text between the quotes.
    pub spec: &'a str,
    /// Raw options between the closing quote and `-->`, trimmed.
    pub opts: &'a str,
}

/// Finds every include directive in `text`, in order of appearance.
///
/// Comments that merely look similar (missing quotes, missing keyword,
/// a `>` before the closing `-->`) are skipped and stay ordinary text.
///
/// # Example
///
/// ```
/// use mdpanel_core::include::scan_directives;
///
/// let text = "before <!-- @include \"a.md#x\" level=1 --> after";
/// let found = scan_directives(text);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].spec, "a.md#x");
/// assert_eq!(found[0].opts, "level=1");
/// assert_eq!(&text[found[0].range.clone()], "<!-- @include \"a.md#x\" level=1 -->");
/// ```
pub fn scan_directives(text: &str) -> Vec<DirectiveMatch<'_>> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(pos) = text[cursor..].find(COMMENT_OPEN) {
        let start = cursor + pos;
        match parse_directive_at(text, start) {
            Some(directive) => {
                cursor = directive.range.end;
                found.push(directive);
            }
            None => cursor = start + COMMENT_OPEN.len(),
        }
    }

    found
}

/// Attempts to parse a directive whose `<!--` begins at `start`.
fn parse_directive_at(text: &str, start: usize) -> Option<DirectiveMatch<'_>> {
    let mut pos = start + COMMENT_OPEN.len();
    pos = skip_whitespace(text, pos);

    let keyword_end = pos + KEYWORD.len();
    if !text
        .get(pos..keyword_end)
        .is_some_and(|word| word.eq_ignore_ascii_case(KEYWORD))
    {
        return None;
    }
    pos = keyword_end;

    let after_space = skip_whitespace(text, pos);
    if after_space == pos {
        return None;
    }
    pos = after_space;

    if !text[pos..].starts_with('"') {
        return None;
    }
    let spec_start = pos + 1;
    let spec_end = spec_start + text[spec_start..].find('"')?;
    if spec_end == spec_start {
        return None;
    }
    let spec = &text[spec_start..spec_end];

    let after_quote = spec_end + 1;
    let gt = after_quote + text[after_quote..].find('>')?;
    let tail = &text[after_quote..=gt];
    if !tail.ends_with(COMMENT_CLOSE) {
        return None;
    }
    let opts = tail[..tail.len() - COMMENT_CLOSE.len()].trim();

    Some(DirectiveMatch {
        range: start..gt + 1,
        spec,
        opts,
    })
}

fn skip_whitespace(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(text.len(), |(idx, _)| pos + idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_directives() {
        assert!(scan_directives("# Plain\n\n<!-- a comment -->\n").is_empty());
        assert!(scan_directives("").is_empty());
    }

    #[test]
    fn test_multiple_directives() {
        let text = "<!--@include \"a.md\"-->\nx\n<!--   @INCLUDE   \"b.md{#id .c}\"   level=\"2\" -->";
        let found = scan_directives(text);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].spec, "a.md");
        assert_eq!(found[0].opts, "");
        assert_eq!(found[0].range, 0..22);
        assert_eq!(found[1].spec, "b.md{#id .c}");
        assert_eq!(found[1].opts, "level=\"2\"");
        assert_eq!(found[1].range.end, text.len());
    }

    #[test]
    fn test_malformed_directives_are_skipped() {
        let texts = [
            "<!-- @include a.md -->",
            "<!-- @include \"\" -->",
            "<!-- @includes \"a.md\" -->",
            "<!-- @include\"a.md\" -->",
            "<!-- @include \"a.md\" x > y -->",
            "<!-- @include \"a.md -->",
            "<!-- include \"a.md\" -->",
        ];
        for text in texts {
            assert!(scan_directives(text).is_empty(), "{text}");
        }
    }

    #[test]
    fn test_recovers_after_malformed_comment() {
        let text = "<!-- @include broken --> <!-- @include \"ok.md\" -->";
        let found = scan_directives(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].spec, "ok.md");
    }

    #[test]
    fn test_multibyte_text_around_directive() {
        let text = "héllo <!-- @include \"ünï.md\" --> wörld";
        let found = scan_directives(text);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].spec, "ünï.md");
        assert_eq!(&text[found[0].range.end..], " wörld");
    }
}
