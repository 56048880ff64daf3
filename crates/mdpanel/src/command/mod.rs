pub mod expand;
pub mod preview;
pub mod render;

use anyhow::{Context, Result};
use mdpanel_config::RenderConfig;
use mdpanel_core::{IncludeExpander, RenderPipeline};
use std::path::Path;

/// Builds the render pipeline described by `config`.
pub fn pipeline_from_config(config: &RenderConfig) -> RenderPipeline {
    RenderPipeline::default()
        .with_expander(IncludeExpander::new(config.max_include_depth))
        .with_extensions(config.extensions())
        .with_custom_css(config.css_file.clone())
}

pub fn read_document(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_from_config() {
        let config = RenderConfig {
            supported_extensions: "md".into(),
            max_include_depth: 3,
            ..Default::default()
        };
        let pipeline = pipeline_from_config(&config);
        assert_eq!(pipeline.expander().max_depth(), 3);

        let result = pipeline.render("x", Some(Path::new("doc.txt"))).unwrap();
        assert!(result.body_html.contains("Valid file extensions:md"));
    }
}
