//! Embedded web assets for the rendered document.
//!
//! The display variant of a document carries two enhancement scripts:
//! - Mermaid: turns ```` ```mermaid ```` code blocks into diagrams
//! - MathJax: typesets `$...$`, `$$...$$`, `\(...\)` and `\[...\]`
//!
//! Both install a global entry point (`window.__renderMermaid`,
//! `window.retypesetMath`) so a display surface can re-run them after patching
//! the body or the style in place. Running either twice is harmless.

use std::path::Path;

/// Default stylesheet used when no custom CSS file is configured.
pub const DEFAULT_CSS: &str = include_str!("../assets/markdown.css");

/// Mermaid diagram rendering (light theme).
pub const MERMAID_SCRIPT: &str = r#"<script type="module">
  import mermaid from 'https://cdn.jsdelivr.net/npm/mermaid@11/dist/mermaid.esm.min.mjs';
  window.__renderMermaid = () => {
    document.querySelectorAll('pre code.language-mermaid, pre code.mermaid').forEach(code => {
      const pre = code.closest('pre') || code;
      const div = document.createElement('div');
      div.className = 'mermaid';
      div.textContent = code.textContent;
      pre.replaceWith(div);
    });
    mermaid.initialize({ startOnLoad: false, theme: 'default' });
    return mermaid.run({ querySelector: '.mermaid:not([data-processed])' });
  };
  if (document.readyState === 'loading') {
    document.addEventListener('DOMContentLoaded', () => { try { window.__renderMermaid(); } catch (e) {} });
  } else {
    try { window.__renderMermaid(); } catch (e) {}
  }
</script>"#;

/// MathJax configuration, loader and re-typeset hook.
pub const MATHJAX_SCRIPT: &str = r#"<script>
  window.MathJax = {
    tex: {
      inlineMath: [['$', '$'], ['\\(', '\\)']],
      displayMath: [['$$', '$$'], ['\\[', '\\]']],
      processEscapes: true,
      processEnvironments: true,
      tags: 'ams'
    },
    options: {
      skipHtmlTags: ['script', 'noscript', 'style', 'textarea', 'pre', 'code']
    },
    startup: { typeset: false }
  };
</script>
<script src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js" defer></script>
<script>
  (function waitForMathJax() {
    if (window.MathJax && MathJax.startup && MathJax.typesetPromise) {
      MathJax.startup.promise.then(function () { MathJax.typesetPromise(); });
    } else {
      setTimeout(waitForMathJax, 50);
    }
  })();
  window.retypesetMath = function () {
    if (window.MathJax && MathJax.typesetPromise) {
      return MathJax.typesetPromise();
    }
    return Promise.resolve();
  };
</script>"#;

/// Re-runs Mermaid, then MathJax. Executed by display surfaces after a patch.
pub const RETYPESET_SCRIPT: &str = r#"(async function () {
  try { if (window.__renderMermaid) { await window.__renderMermaid(); } } catch (e) {}
  try {
    if (window.retypesetMath) { await window.retypesetMath(); }
    else if (window.MathJax && MathJax.typesetPromise) { await MathJax.typesetPromise(); }
  } catch (e) {}
})();"#;

/// Provides access to embedded assets.
pub struct Assets;

impl Assets {
    /// Both enhancement script blocks, Mermaid last so MathJax is configured first.
    pub fn enhancement_scripts() -> String {
        format!("{MATHJAX_SCRIPT}\n{MERMAID_SCRIPT}")
    }

    /// Load the stylesheet, preferring `custom_css` when it can be read.
    pub fn stylesheet(custom_css: Option<&Path>) -> String {
        let Some(path) = custom_css else {
            return DEFAULT_CSS.to_string();
        };

        match std::fs::read_to_string(path) {
            Ok(css) => css,
            Err(err) => {
                tracing::warn!(?err, path = %path.display(), "Failed to read custom CSS, using default");
                DEFAULT_CSS.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assets_exist() {
        assert!(DEFAULT_CSS.contains(".markdown-body"));
        assert!(MERMAID_SCRIPT.contains("window.__renderMermaid"));
        assert!(MATHJAX_SCRIPT.contains("window.retypesetMath"));
        assert!(RETYPESET_SCRIPT.contains("__renderMermaid"));
        assert!(RETYPESET_SCRIPT.contains("retypesetMath"));
    }

    #[test]
    fn test_enhancement_scripts_order() {
        let scripts = Assets::enhancement_scripts();
        let mathjax = scripts.find("window.MathJax").unwrap();
        let mermaid = scripts.find("import mermaid").unwrap();
        assert!(mathjax < mermaid);
    }

    #[test]
    fn test_stylesheet_fallback() {
        assert_eq!(Assets::stylesheet(None), DEFAULT_CSS);
        assert_eq!(
            Assets::stylesheet(Some(Path::new("/no/such/style.css"))),
            DEFAULT_CSS
        );

        let tmp = tempfile::tempdir().unwrap();
        let custom = tmp.path().join("custom.css");
        std::fs::write(&custom, "body { color: red; }").unwrap();
        assert_eq!(Assets::stylesheet(Some(&custom)), "body { color: red; }");
    }
}
