use super::{pipeline_from_config, read_document};
use anyhow::Result;
use clap::Parser;
use mdpanel_config::Config;
use std::io::Write;
use std::path::PathBuf;

/// Prints a document with all `@include` directives expanded.
#[derive(Parser, Debug, Clone)]
pub struct Expand {
    /// Markdown document to expand.
    pub file: PathBuf,
}

impl Expand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let text = read_document(&self.file)?;
        let expanded = pipeline_from_config(&config.render).expand(&text, Some(&self.file));
        std::io::stdout().lock().write_all(expanded.as_bytes())?;
        Ok(())
    }
}
