//! Configuration file watcher for hot reload.
//!
//! Editors commonly save by writing a temp file and renaming it over the
//! original, which drops a watch placed on the file itself. The watch is
//! therefore placed on the parent directory and events are filtered by name.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::parse_config;
use crate::config::schema::RelayConfig;

/// Watches the relay's config file and publishes each valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RelayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end of its updates.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RelayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching.
    ///
    /// The returned handle must be kept alive; dropping it stops the watch.
    /// A reload that fails to parse or validate is logged and the current
    /// configuration stays in place. Saves that leave the content unchanged
    /// are not republished.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path;
        let tx = self.update_tx;
        let watch_dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let last_applied = Mutex::new(std::fs::read_to_string(&path).ok());

        let event_path = path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if concerns(&event, &event_path) => {
                    reload(&event_path, &last_applied, &tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;
        tracing::info!(path = %path.display(), "Config watcher started");
        Ok(watcher)
    }
}

/// Whether `event` modifies or replaces the file at `path`.
fn concerns(event: &Event, path: &Path) -> bool {
    if !(event.kind.is_modify() || event.kind.is_create()) {
        return false;
    }
    let Some(name) = path.file_name() else {
        return false;
    };
    event.paths.iter().any(|p| p.file_name() == Some(name))
}

fn reload(path: &Path, last_applied: &Mutex<Option<String>>, tx: &mpsc::UnboundedSender<RelayConfig>) {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        // Mid-rename; the create event that follows carries the new file.
        Err(e) => {
            tracing::debug!(error = %e, "Config file not readable yet");
            return;
        }
    };

    let mut last = last_applied.lock().unwrap_or_else(|e| e.into_inner());
    if last.as_deref() == Some(content.as_str()) {
        return;
    }

    tracing::info!(path = %path.display(), "Config file changed, reloading");
    match parse_config(&content) {
        Ok(new_config) => {
            *last = Some(content);
            let _ = tx.send(new_config);
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to reload config, keeping current configuration");
        }
    }
}
