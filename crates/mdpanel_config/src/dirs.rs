use directories::ProjectDirs;
use std::path::PathBuf;
use std::sync::OnceLock;

pub struct Dirs;

impl Dirs {
    /// Project directory of the Markdown panel, if a home directory is known.
    pub fn project() -> Option<&'static ProjectDirs> {
        static CELL: OnceLock<Option<ProjectDirs>> = OnceLock::new();

        CELL.get_or_init(|| ProjectDirs::from("org", "mdpanel", "Markdown Panel"))
            .as_ref()
    }

    /// Default location of `config.toml`.
    ///
    /// - Linux: `~/.config/markdownpanel/config.toml`
    /// - macOS: `~/Library/Application Support/org.mdpanel.Markdown-Panel/config.toml`
    /// - Windows: `~\AppData\Roaming\mdpanel\Markdown Panel\config\config.toml`
    pub fn default_config_file() -> Option<PathBuf> {
        Self::project().map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
