use super::{pipeline_from_config, read_document};
use anyhow::{Context, Result};
use clap::Parser;
use mdpanel_config::Config;
use std::io::Write;
use std::path::PathBuf;

/// Renders a document to HTML.
#[derive(Parser, Debug, Clone)]
pub struct Render {
    /// Markdown document to render.
    pub file: PathBuf,

    /// Write the HTML here instead of stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    /// Emit the display variant (base href and enhancement scripts) instead of
    /// the portable export.
    #[clap(long)]
    pub display: bool,
}

impl Render {
    pub fn run(&self, config: &Config) -> Result<()> {
        let text = read_document(&self.file)?;
        let result = pipeline_from_config(&config.render).render(&text, Some(&self.file))?;

        match (&self.output, self.display) {
            (Some(output), false) => result.export_to(output)?,
            (Some(output), true) => std::fs::write(output, &result.html_for_display)
                .with_context(|| format!("failed to write {}", output.display()))?,
            (None, display) => {
                let html = if display {
                    &result.html_for_display
                } else {
                    &result.html_for_export
                };
                std::io::stdout().lock().write_all(html.as_bytes())?;
            }
        }

        Ok(())
    }
}
