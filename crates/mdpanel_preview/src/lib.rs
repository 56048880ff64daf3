//! Display surfaces of the Markdown panel.
//!
//! Two interchangeable [`DisplaySurface`] implementations are provided:
//! - [`LiveSurface`] serves the page from a local HTTP server and patches it
//!   in place over a websocket
//! - [`StaticFileSurface`] rewrites an HTML file on every change

mod live;
mod local;
mod message;
mod static_file;

pub use self::live::{LiveSurface, LiveSurfaceOptions};
pub use self::local::{VirtualHost, LOCAL_ROUTE};
pub use self::message::Message;
pub use self::static_file::{StaticFileSurface, StaticSurfaceOptions};

use mdpanel_config::{DisplayConfig, DisplayEngine};
use mdpanel_core::DisplaySurface;
use std::path::Path;

/// Creates the surface selected by `config` for previewing `document`.
///
/// The static surface writes next to the system temp dir, named after the
/// document.
pub fn create_surface(config: &DisplayConfig, document: &Path) -> Box<dyn DisplaySurface> {
    match config.engine {
        DisplayEngine::Live => Box::new(LiveSurface::new(LiveSurfaceOptions {
            port: config.port,
            open_browser: config.open_browser,
        })),
        DisplayEngine::Static => {
            let name = document
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "preview".into());
            Box::new(StaticFileSurface::new(StaticSurfaceOptions {
                output_file: std::env::temp_dir().join(format!("mdpanel-{name}.html")),
                open_browser: config.open_browser,
            }))
        }
    }
}
