//! Wrapping rendered HTML bodies into complete documents.
//!
//! Every render produces two documents from the same skeleton:
//! - the display variant, whose head additionally carries a `<base href>` for
//!   the source directory and the enhancement scripts
//! - the export variant, plain portable HTML without any injections

use crate::assets::Assets;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::path::{Path, PathBuf};

/// Page skeleton. The canvas is forced to light mode since the enhancement
/// scripts assume a white background.
const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta http-equiv="X-UA-Compatible" content="IE=edge">
    <meta http-equiv="content-type" content="text/html; charset=utf-8">
    <meta name="color-scheme" content="light">
    <title>/*__TITLE__*/</title>
    <style type="text/css">
      :root { color-scheme: light; }
      html, body { background: #fff !important; color: #111 !important; }
      .mermaid { background: #fff !important; color: #111 !important; }
    </style>
    <style id="markdown-style" type="text/css">
/*__STYLES_CSS__*/
    </style>
  </head>
  <body class="markdown-body">
/*__BODY__*/
  </body>
</html>
"#;

/// Id of the `<style>` element holding the document stylesheet.
pub const STYLE_ELEMENT_ID: &str = "markdown-style";

/// Characters escaped in a `file://` URL path.
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Both variants of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    /// Full page for the interactive display surface.
    pub display: String,
    /// Self-contained page for export.
    pub export: String,
}

/// Escape text for use in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Converts a directory into a `file://` URL ending with `/`.
///
/// Relative directories are resolved against the working directory first.
///
/// # Example
///
/// ```
/// # #[cfg(unix)]
/// # {
/// use mdpanel_core::assemble::file_url_for_dir;
/// use std::path::Path;
///
/// assert_eq!(file_url_for_dir(Path::new("/my docs/#1")), "file:///my%20docs/%231/");
/// # }
/// ```
pub fn file_url_for_dir(dir: &Path) -> String {
    let absolute = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(dir))
            .unwrap_or_else(|_| dir.to_path_buf())
    };

    let mut path = absolute.to_string_lossy().replace('\\', "/");
    if !path.starts_with('/') {
        // Windows drive paths: `C:/docs` -> `/C:/docs`
        path.insert(0, '/');
    }
    if !path.ends_with('/') {
        path.push('/');
    }

    format!("file://{}", utf8_percent_encode(&path, PATH_ESCAPES))
}

/// Directory used for the `<base href>` of `source_path`.
///
/// Returns `None` unless the source file and its directory both exist.
pub fn base_dir_of(source_path: &Path) -> Option<PathBuf> {
    if !source_path.is_file() {
        return None;
    }
    let dir = source_path.parent()?;
    let dir = if dir.as_os_str().is_empty() {
        Path::new(".")
    } else {
        dir
    };
    dir.is_dir().then(|| dir.to_path_buf())
}

/// Builds the `<base href="...">` tag for `source_path`, if it can be resolved.
pub fn base_href(source_path: &Path) -> Option<String> {
    let dir = base_dir_of(source_path)?;
    Some(format!("<base href=\"{}\">", file_url_for_dir(&dir)))
}

/// Inserts `snippet` right before `</head>`.
///
/// Without a closing head tag, a new head is prepended.
pub fn inject_into_head(html: &str, snippet: &str) -> String {
    match html.to_ascii_lowercase().find("</head>") {
        Some(idx) => {
            let mut injected = String::with_capacity(html.len() + snippet.len());
            injected.push_str(&html[..idx]);
            injected.push_str(snippet);
            injected.push_str(&html[idx..]);
            injected
        }
        None => format!("<head>{snippet}</head>{html}"),
    }
}

/// Replaces each placeholder of `template` with its value in one pass.
///
/// Values are inserted verbatim and never scanned for placeholders.
pub(crate) fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut filled = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = slots
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|idx| (idx, *key, *value)))
            .min_by_key(|(idx, _, _)| *idx);
        let Some((idx, key, value)) = next else {
            filled.push_str(rest);
            return filled;
        };
        filled.push_str(&rest[..idx]);
        filled.push_str(value);
        rest = &rest[idx + key.len()..];
    }
}

/// Builds complete HTML documents.
pub struct DocumentAssembler;

impl DocumentAssembler {
    /// Wraps `body` in the page skeleton.
    pub fn page(title: &str, css: &str, body: &str) -> String {
        let title = escape_html(title);
        fill_template(
            HTML_TEMPLATE,
            &[
                ("/*__TITLE__*/", title.as_str()),
                ("/*__STYLES_CSS__*/", css),
                ("/*__BODY__*/", body),
            ],
        )
    }

    /// Everything the display variant adds to the head.
    pub fn display_head(source_path: Option<&Path>) -> String {
        let base = source_path.and_then(base_href).unwrap_or_default();
        format!("{base}\n{}", Assets::enhancement_scripts())
    }

    /// Builds the display variant.
    pub fn display(title: &str, css: &str, body: &str, source_path: Option<&Path>) -> String {
        inject_into_head(
            &Self::page(title, css, body),
            &Self::display_head(source_path),
        )
    }

    /// Builds the export variant.
    pub fn export(title: &str, css: &str, body: &str) -> String {
        Self::page(title, css, body)
    }

    /// Builds both variants at once.
    pub fn assemble(
        title: &str,
        css: &str,
        display_body: &str,
        export_body: &str,
        source_path: Option<&Path>,
    ) -> AssembledDocument {
        AssembledDocument {
            display: Self::display(title, css, display_body, source_path),
            export: Self::export(title, css, export_body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_fills_placeholders() {
        let page = DocumentAssembler::page("a <b>", "p { x: y; }", "<p>hi</p>");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>a &lt;b&gt;</title>"));
        assert!(page.contains("p { x: y; }"));
        assert!(page.contains(&format!("<style id=\"{STYLE_ELEMENT_ID}\"")));
        assert!(page.contains("<p>hi</p>"));
        assert!(page.contains(r#"<meta name="color-scheme" content="light">"#));
        assert!(!page.contains("/*__"));
    }

    #[test]
    fn test_page_does_not_refill_inserted_content() {
        let page = DocumentAssembler::page("/*__BODY__*/", "/* /*__BODY__*/ */", "<p>hi</p>");
        assert!(page.contains("<title>/*__BODY__*/</title>"));
        assert!(page.contains("/* /*__BODY__*/ */"));
        assert_eq!(page.matches("<p>hi</p>").count(), 1);
    }

    #[test]
    fn test_fill_template() {
        assert_eq!(
            fill_template("{0} and {1} and {0}", &[("{0}", "{1}"), ("{1}", "x")]),
            "{1} and x and {1}"
        );
        assert_eq!(fill_template("plain", &[("{0}", "x")]), "plain");
    }

    #[test]
    fn test_inject_into_head() {
        assert_eq!(
            inject_into_head("<html><HEAD><title>t</title></HEAD><body></body>", "<x>"),
            "<html><HEAD><title>t</title><x></HEAD><body></body>"
        );
        assert_eq!(
            inject_into_head("<body>b</body>", "<x>"),
            "<head><x></head><body>b</body>"
        );
    }

    #[test]
    fn test_export_has_no_scripts() {
        let doc = DocumentAssembler::assemble("t", "", "<p>x</p>", "<p>x</p>", None);
        assert!(doc.display.contains("<script"));
        assert!(doc.display.contains("__renderMermaid"));
        assert!(doc.display.contains("MathJax"));
        assert!(!doc.export.contains("<script"));
        assert!(!doc.display.contains("<base"));
        assert!(doc.export.contains("<p>x</p>"));
    }

    #[test]
    fn test_base_href_requires_existing_file() {
        assert_eq!(base_href(Path::new("/no/such/dir/readme.md")), None);

        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("readme.md");
        std::fs::write(&doc, "# x").unwrap();

        let tag = base_href(&doc).unwrap();
        assert!(tag.starts_with("<base href=\"file://"));
        assert!(tag.ends_with("/\">"));

        let display = DocumentAssembler::display("t", "", "", Some(&doc));
        assert!(display.contains(&tag));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_url_escaping() {
        assert_eq!(file_url_for_dir(Path::new("/docs")), "file:///docs/");
        assert_eq!(
            file_url_for_dir(Path::new("/a b/ü%")),
            "file:///a%20b/%C3%BC%25/"
        );
    }
}
