//! Watching a document directory for edits.
//!
//! The whole directory of the document is watched (non-recursively) so that
//! edits to sibling files pulled in by `@include` also trigger a render.
//! Native notifications are used when available, with a polling fallback.

use crate::document::SupportedExtensions;
use notify::{Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, SystemTime};
use tokio::sync::watch;

#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("{} has no parent directory", .0.display())]
    NoParent(PathBuf),
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("watcher startup timed out")]
    StartupTimeout,
}

/// Events emitted by the watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// Nothing observed yet.
    Idle,
    /// A relevant file was created, modified or removed.
    Changed(PathBuf),
}

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Polling interval for the fallback mode.
    pub poll_interval: Duration,
    /// Sibling files with these extensions are relevant in addition to the
    /// document itself.
    pub extensions: SupportedExtensions,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
            extensions: SupportedExtensions::default(),
        }
    }
}

/// Decides which paths in the watched directory matter.
#[derive(Debug, Clone)]
struct RelevanceFilter {
    document: PathBuf,
    extensions: SupportedExtensions,
}

impl RelevanceFilter {
    fn is_relevant(&self, path: &Path) -> bool {
        if path.file_name() == self.document.file_name() {
            return true;
        }
        path.extension().is_some() && self.extensions.is_supported(Some(path))
    }
}

/// Watches the directory of a document.
pub struct FileWatcher {
    event_rx: watch::Receiver<WatchEvent>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    document: PathBuf,
}

impl FileWatcher {
    /// Starts watching the directory of `document`.
    ///
    /// Must be called from within a tokio runtime, which the polling fallback
    /// runs on.
    pub fn new(document: &Path, config: WatcherConfig) -> Result<Self, WatchError> {
        let document = document.to_path_buf();
        let dir = match document.parent() {
            Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
            Some(parent) => parent.to_path_buf(),
            None => return Err(WatchError::NoParent(document)),
        };
        let filter = RelevanceFilter {
            document: document.clone(),
            extensions: config.extensions.clone(),
        };

        let (event_rx, shutdown_tx) = match Self::spawn_native_watcher(&dir, filter.clone()) {
            Ok(started) => {
                tracing::info!(dir = %dir.display(), "Started native directory watcher");
                started
            }
            Err(err) => {
                tracing::warn!(?err, dir = %dir.display(), "Native watcher failed, falling back to polling");
                Self::spawn_polling_watcher(dir, filter, config.poll_interval)
            }
        };

        Ok(Self {
            event_rx,
            shutdown_tx: Some(shutdown_tx),
            document,
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<WatchEvent> {
        self.event_rx.clone()
    }

    /// The document whose directory is watched.
    pub fn document(&self) -> &Path {
        &self.document
    }

    fn spawn_native_watcher(
        dir: &Path,
        filter: RelevanceFilter,
    ) -> Result<(watch::Receiver<WatchEvent>, mpsc::Sender<()>), WatchError> {
        let (event_tx, event_rx) = watch::channel(WatchEvent::Idle);
        let (shutdown_tx, shutdown_rx) = mpsc::channel();
        let (started_tx, started_rx) = mpsc::channel();
        let dir = dir.to_path_buf();

        std::thread::spawn(move || {
            let handler = move |res: Result<NotifyEvent, notify::Error>| match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create() || event.kind.is_remove()) {
                        return;
                    }
                    if let Some(path) = event.paths.iter().find(|p| filter.is_relevant(p)) {
                        let _ = event_tx.send(WatchEvent::Changed(path.clone()));
                    }
                }
                Err(err) => tracing::error!(?err, "File watcher error"),
            };

            let mut watcher = match RecommendedWatcher::new(handler, notify::Config::default()) {
                Ok(watcher) => watcher,
                Err(err) => {
                    let _ = started_tx.send(Err(err));
                    return;
                }
            };
            if let Err(err) = watcher.watch(&dir, RecursiveMode::NonRecursive) {
                let _ = started_tx.send(Err(err));
                return;
            }
            let _ = started_tx.send(Ok(()));

            // Keep the watcher alive until shutdown.
            loop {
                match shutdown_rx.recv_timeout(Duration::from_secs(1)) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }
            }
        });

        match started_rx.recv_timeout(Duration::from_secs(2)) {
            Ok(Ok(())) => Ok((event_rx, shutdown_tx)),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(WatchError::StartupTimeout),
        }
    }

    fn spawn_polling_watcher(
        dir: PathBuf,
        filter: RelevanceFilter,
        poll_interval: Duration,
    ) -> (watch::Receiver<WatchEvent>, mpsc::Sender<()>) {
        let (event_tx, event_rx) = watch::channel(WatchEvent::Idle);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        tokio::spawn(async move {
            let mut last_seen = latest_mtime(&dir, &filter).map(|(_, mtime)| mtime);

            tracing::info!(dir = %dir.display(), ?poll_interval, "Started polling directory watcher");

            loop {
                match shutdown_rx.try_recv() {
                    Ok(()) | Err(mpsc::TryRecvError::Disconnected) => break,
                    Err(mpsc::TryRecvError::Empty) => {}
                }

                tokio::time::sleep(poll_interval).await;

                if let Some((path, mtime)) = latest_mtime(&dir, &filter) {
                    if last_seen.map_or(true, |last| mtime > last) {
                        last_seen = Some(mtime);
                        let _ = event_tx.send(WatchEvent::Changed(path));
                    }
                }
            }
        });

        (event_rx, shutdown_tx)
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Most recently modified relevant file in `dir`.
fn latest_mtime(dir: &Path, filter: &RelevanceFilter) -> Option<(PathBuf, SystemTime)> {
    std::fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| filter.is_relevant(path))
        .filter_map(|path| {
            let mtime = std::fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((path, mtime))
        })
        .max_by_key(|(_, mtime)| *mtime)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> RelevanceFilter {
        RelevanceFilter {
            document: PathBuf::from("/docs/README"),
            extensions: SupportedExtensions::parse("md"),
        }
    }

    #[test]
    fn test_relevance_filter() {
        let filter = filter();
        assert!(filter.is_relevant(Path::new("/docs/README")));
        assert!(filter.is_relevant(Path::new("/docs/part.md")));
        assert!(!filter.is_relevant(Path::new("/docs/image.png")));
        assert!(!filter.is_relevant(Path::new("/docs/Makefile")));
    }

    #[test]
    fn test_latest_mtime_ignores_irrelevant_files() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.md"), "a").unwrap();
        std::fs::write(tmp.path().join("b.png"), "b").unwrap();

        let filter = RelevanceFilter {
            document: tmp.path().join("main.md"),
            extensions: SupportedExtensions::parse("md"),
        };
        let (path, _) = latest_mtime(tmp.path(), &filter).unwrap();
        assert_eq!(path, tmp.path().join("a.md"));
    }

    #[test]
    fn test_watcher_config_default() {
        let config = WatcherConfig::default();
        assert_eq!(config.poll_interval, Duration::from_millis(500));
        assert!(config.extensions.is_supported(Some(Path::new("x.md"))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_watcher_starts_on_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let doc = tmp.path().join("main.md");
        std::fs::write(&doc, "# x").unwrap();

        let watcher = FileWatcher::new(&doc, WatcherConfig::default()).unwrap();
        assert_eq!(watcher.document(), doc);
        assert_eq!(*watcher.subscribe().borrow(), WatchEvent::Idle);
    }
}
