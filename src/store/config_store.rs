//! Process-wide holder of the current site configuration.

use arc_swap::ArcSwapOption;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::sync::watch;

use crate::document::SiteConfig;
use crate::observability::metrics;

static SHARED: OnceLock<Arc<ConfigurationStore>> = OnceLock::new();

/// What subscribers observe after each announcement.
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    /// Incremented once per announcement, starting at 1.
    pub version: u64,
    /// `None` until a configuration is loaded or created.
    pub site: Option<Arc<SiteConfig>>,
}

/// Reactive holder of exactly one site configuration (or "not yet loaded").
///
/// Readers get an `Arc` to an immutable snapshot. Edits never mutate a
/// snapshot in place: they build a new configuration and `set` it, which
/// notifies every subscriber exactly once.
///
/// Writers that derive the next snapshot from the current one hold
/// [`ConfigurationStore::lock_edits`] from the read until the `set`.
pub struct ConfigurationStore {
    current: ArcSwapOption<SiteConfig>,
    tx: watch::Sender<StoreSnapshot>,
    edits: Mutex<()>,
}

impl ConfigurationStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(StoreSnapshot::default());
        Self {
            current: ArcSwapOption::empty(),
            tx,
            edits: Mutex::new(()),
        }
    }

    /// The single instance shared by the whole process.
    pub fn shared() -> Arc<ConfigurationStore> {
        SHARED.get_or_init(|| Arc::new(ConfigurationStore::new())).clone()
    }

    /// Current snapshot, if any.
    pub fn get(&self) -> Option<Arc<SiteConfig>> {
        self.current.load_full()
    }

    /// Version of the last announcement (0 before the first one).
    pub fn version(&self) -> u64 {
        self.tx.borrow().version
    }

    /// Replace the snapshot and notify subscribers. Returns the new version.
    pub fn set(&self, site: SiteConfig) -> u64 {
        self.announce(Some(Arc::new(site)))
    }

    /// Re-announce a snapshot that was already built elsewhere.
    pub fn reload(&self, site: Arc<SiteConfig>) -> u64 {
        self.announce(Some(site))
    }

    /// Forget the snapshot ("not yet loaded").
    pub fn clear(&self) -> u64 {
        self.announce(None)
    }

    /// Serialize read-modify-set cycles against this store.
    ///
    /// Readers never need it. Not reentrant.
    pub fn lock_edits(&self) -> MutexGuard<'_, ()> {
        self.edits.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to announcements; the receiver sees the current snapshot immediately.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn announce(&self, site: Option<Arc<SiteConfig>>) -> u64 {
        let sections = site.as_ref().map_or(0, |s| s.section_count());
        let mut version = 0;
        // send_modify holds the channel lock, so swap and version bump stay in step.
        self.tx.send_modify(|snapshot| {
            snapshot.version += 1;
            snapshot.site = site.clone();
            self.current.store(site);
            version = snapshot.version;
        });
        metrics::record_store_version(version, sections);
        tracing::debug!(version, sections, "Configuration store updated");
        version
    }
}

impl Default for ConfigurationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConfigurationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationStore")
            .field("version", &self.version())
            .field("loaded", &self.current.load().is_some())
            .finish()
    }
}
