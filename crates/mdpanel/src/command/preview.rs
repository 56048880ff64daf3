use super::pipeline_from_config;
use anyhow::{Context, Result};
use clap::Parser;
use mdpanel_config::Config;
use mdpanel_core::{
    DisplaySurface, FileWatcher, RenderError, RenderResult, RenderSupervisor, Submission,
    WatcherConfig,
};
use std::path::{Path, PathBuf};

type RenderOutcome = Result<RenderResult, RenderError>;

/// Previews a document, re-rendering whenever its directory changes.
#[derive(Parser, Debug, Clone)]
pub struct Preview {
    /// Markdown document to preview.
    pub file: PathBuf,

    /// Scroll to this source line after the first render.
    #[clap(long)]
    pub line: Option<usize>,
}

impl Preview {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let file = self
            .file
            .canonicalize()
            .with_context(|| format!("failed to open {}", self.file.display()))?;

        let pipeline = pipeline_from_config(&config.render);

        let mut surface = mdpanel_preview::create_surface(&config.display, &file);
        surface.initialize(config.display.zoom_level)?;
        tracing::info!(engine = surface.engine_name(), file = %file.display(), "Starting preview");

        let watcher = FileWatcher::new(
            &file,
            WatcherConfig {
                extensions: config.render.extensions(),
                ..Default::default()
            },
        )?;
        let mut watch_rx = watcher.subscribe();

        let mut supervisor = RenderSupervisor::<RenderOutcome>::new();
        let mut pending = true;
        let mut pending_scroll = self.line;

        loop {
            if pending {
                let pipeline = pipeline.clone();
                let path = file.clone();
                let job = move || -> RenderOutcome {
                    let text = std::fs::read_to_string(&path)?;
                    pipeline.render(&text, Some(&path))
                };
                if supervisor.try_submit(job) == Submission::Accepted {
                    pending = false;
                }
            }

            tokio::select! {
                changed = watch_rx.changed() => {
                    if changed.is_err() {
                        tracing::debug!("File watcher closed");
                        break;
                    }
                    tracing::debug!(event = ?*watch_rx.borrow(), "Change detected");
                    pending = true;
                }
                Some(outcome) = supervisor.completed(), if supervisor.is_busy() => {
                    apply_render(surface.as_mut(), outcome, config.display.html_output_file.as_deref());
                    if let Some(line) = pending_scroll.take() {
                        if let Err(err) = surface.scroll_to_line(line) {
                            tracing::warn!(?err, line, "Failed to scroll");
                        }
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Stopping preview");
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Shows a finished render and writes the auto-export, if configured.
fn apply_render(surface: &mut dyn DisplaySurface, outcome: RenderOutcome, html_output_file: Option<&Path>) {
    let result = match outcome {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(?err, "Render failed");
            return;
        }
    };

    match surface.set_content(&result) {
        Ok(strategy) => tracing::debug!(?strategy, "Display updated"),
        Err(err) => tracing::error!(?err, "Failed to update display"),
    }

    if let Some(output) = html_output_file {
        if let Err(err) = result.export_to(output) {
            tracing::warn!(%err, "Failed to write the HTML output file");
        }
    }
}
