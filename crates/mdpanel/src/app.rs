use crate::command;
use crate::logging;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum RunCmd {
    /// Render a document to HTML.
    #[clap(name = "render")]
    Render(command::render::Render),
    /// Print a document with all includes expanded.
    #[clap(name = "expand")]
    Expand(command::expand::Expand),
    /// Preview a document, re-rendering whenever its directory changes.
    #[clap(name = "preview")]
    Preview(command::preview::Preview),
}

/// Global CLI arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Enable the logging system.
    #[clap(long)]
    pub log: Option<PathBuf>,

    /// Specify the path of the config file.
    #[clap(long)]
    pub config_file: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[clap(name = "mdpanel", version)]
pub struct Mdpanel {
    #[clap(flatten)]
    pub args: Args,

    #[clap(subcommand)]
    pub cmd: RunCmd,
}

impl RunCmd {
    pub async fn run(self, args: Args) -> Result<()> {
        let loaded = mdpanel_config::load_config(args.config_file);

        let _log_guard = logging::init(args.log, &loaded.config.log)?;

        if let Some(err) = loaded.maybe_error {
            tracing::warn!(
                path = ?loaded.file_path,
                %err,
                "Invalid config file, using the default config"
            );
        }

        let config = loaded.config;

        match self {
            Self::Render(render) => render.run(&config),
            Self::Expand(expand) => expand.run(&config),
            Self::Preview(preview) => preview.run(&config).await,
        }
    }
}
