mod dirs;

pub use self::dirs::Dirs;

use mdpanel_core::document::DEFAULT_EXTENSIONS;
use mdpanel_core::include::DEFAULT_MAX_DEPTH;
use mdpanel_core::SupportedExtensions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Result of reading the config file.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the config was read from, or would have been.
    pub file_path: Option<PathBuf>,
    /// Parse error; `config` holds the defaults when set.
    pub maybe_error: Option<toml::de::Error>,
}

/// Loads the config from `specified_config_file` or the default location.
///
/// A missing or unreadable file yields the defaults. A malformed file also
/// yields the defaults, with the parse error kept for reporting.
pub fn load_config(specified_config_file: Option<PathBuf>) -> LoadedConfig {
    let file_path = specified_config_file.or_else(Dirs::default_config_file);

    let mut maybe_error = None;
    let config = file_path
        .as_ref()
        .and_then(|path| std::fs::read_to_string(path).ok())
        .and_then(|contents| {
            toml::from_str(&contents)
                .map_err(|err| {
                    maybe_error.replace(err);
                })
                .ok()
        })
        .unwrap_or_default();

    LoadedConfig {
        config,
        file_path,
        maybe_error,
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Comma-separated list of file extensions rendered as Markdown.
    pub supported_extensions: String,

    /// Render every file regardless of its extension.
    pub allow_all_extensions: bool,

    /// Custom stylesheet replacing the embedded one.
    ///
    /// The embedded stylesheet is used when the file can not be read.
    pub css_file: Option<PathBuf>,

    /// Nested includes deeper than this are left unexpanded.
    pub max_include_depth: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            supported_extensions: DEFAULT_EXTENSIONS.into(),
            allow_all_extensions: false,
            css_file: None,
            max_include_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderConfig {
    pub fn extensions(&self) -> SupportedExtensions {
        if self.allow_all_extensions {
            SupportedExtensions::allow_all()
        } else {
            SupportedExtensions::parse(&self.supported_extensions)
        }
    }
}

/// Which display surface shows the preview.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayEngine {
    /// Browser page kept up to date over a websocket.
    #[default]
    Live,
    /// HTML file rewritten on every render.
    Static,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct DisplayConfig {
    pub engine: DisplayEngine,

    /// Zoom level in percent.
    pub zoom_level: u32,

    /// When set, the export variant is written here after every render.
    pub html_output_file: Option<PathBuf>,

    /// Port of the live display server, `0` picks a free one.
    pub port: u16,

    /// Open the preview in the default browser.
    pub open_browser: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            engine: DisplayEngine::default(),
            zoom_level: 100,
            html_output_file: None,
            port: 0,
            open_browser: true,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct LogConfig {
    /// Specify the log file path.
    pub log_file: Option<String>,

    /// Specify the max log level.
    pub max_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            max_level: "debug".into(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Render configuration.
    pub render: RenderConfig,

    /// Display configuration.
    pub display: DisplayConfig,

    /// Log configuration.
    pub log: LogConfig,
}
