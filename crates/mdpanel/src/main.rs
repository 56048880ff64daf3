mod app;
mod command;
mod logging;

use app::Mdpanel;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mdpanel = Mdpanel::parse();

    if let Err(e) = mdpanel.cmd.run(mdpanel.args).await {
        eprintln!("error: {e:?}");
        std::process::exit(1);
    }

    Ok(())
}
