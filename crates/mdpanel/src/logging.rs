use anyhow::{anyhow, Result};
use mdpanel_config::LogConfig;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;

/// Log files larger than this are removed on startup.
const MAX_LOG_FILE_SIZE: u64 = 8 * 1024 * 1024;

const DEFAULT_DIRECTIVES: &str = "mdpanel=info,mdpanel_core=info,mdpanel_preview=info";

/// Installs the global subscriber.
///
/// The log file is taken from `--log`, then `MDPANEL_LOG_PATH`, then the
/// config. Without one, logs go to stderr filtered by `RUST_LOG`. The returned
/// guard must be kept alive for file logs to be flushed.
pub fn init(log: Option<PathBuf>, config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let maybe_log = if let Some(log_path) = log {
        Some(log_path)
    } else if let Ok(log_path) = std::env::var("MDPANEL_LOG_PATH").map(PathBuf::from) {
        Some(log_path)
    } else {
        config.log_file.as_ref().map(PathBuf::from)
    };

    let Some(log_path) = maybe_log else {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_DIRECTIVES));
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|err| anyhow!("failed to install the logger: {err}"))?;
        return Ok(None);
    };

    if let Ok(metadata) = std::fs::metadata(&log_path) {
        if log_path.is_file() && metadata.len() > MAX_LOG_FILE_SIZE {
            std::fs::remove_file(&log_path)?;
        }
    }

    let file_name = log_path
        .file_name()
        .ok_or_else(|| anyhow!("no file name in {log_path:?}"))?;

    let directory = log_path
        .parent()
        .ok_or_else(|| anyhow!("{log_path:?} has no parent"))?;

    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let max_level = config.max_level.parse().unwrap_or(tracing::Level::DEBUG);

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(max_level)
        .with_line_number(true)
        .with_writer(non_blocking)
        .with_ansi(std::io::stdout().is_terminal())
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(Some(guard))
}
