//! File watcher that feeds external edits of a stored document into the store.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::channel::file::FileChannel;
use crate::document::SiteConfig;
use crate::store::ConfigurationStore;

/// Watches the file behind a FileChannel key and reloads the store on change.
pub struct DocumentWatcher {
    path: PathBuf,
    store: Arc<ConfigurationStore>,
}

impl DocumentWatcher {
    pub fn new(channel: &FileChannel, key: &str, store: Arc<ConfigurationStore>) -> Self {
        Self {
            path: channel.path_for(key),
            store,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Start watching in a background thread.
    ///
    /// The directory is watched rather than the file so the watch survives
    /// atomic renames and files that do not exist yet. Dropping the returned
    /// watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let directory = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&directory).map_err(notify::Error::io)?;

        let path = self.path.clone();
        let store = self.store.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touched = event.paths.iter().any(|p| p.file_name() == path.file_name());
                    if touched && (event.kind.is_modify() || event.kind.is_create()) {
                        reload_from(&path, &store);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Document watcher started");
        Ok(watcher)
    }
}

/// Read the document at `path` and announce it if it differs from the store.
///
/// Waits for any edit in flight, so an edit never lands on a snapshot the
/// reload already replaced. Returns the new store version when a reload
/// happened.
pub fn reload_from(path: &Path, store: &ConfigurationStore) -> Option<u64> {
    let value = match FileChannel::read_path(path) {
        Ok(Some(value)) => value,
        Ok(None) => return None,
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to read document. Keeping current configuration.");
            return None;
        }
    };

    let site: SiteConfig = match serde_json::from_value(value) {
        Ok(site) => site,
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Failed to parse document. Keeping current configuration.");
            return None;
        }
    };

    let _guard = store.lock_edits();
    if store.get().is_some_and(|current| *current == site) {
        return None;
    }

    tracing::info!(path = ?path, "Document change detected, reloading");
    Some(store.reload(Arc::new(site)))
}
