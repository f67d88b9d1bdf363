//! Page builder facade.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::builder::edit::Edit;
use crate::channel::ConfigurationReadChannel;
use crate::document::{validate_document, EntityKind, Page, PageId, Section, SectionId, SiteConfig};
use crate::engine::{self, SectionMove, SectionSetup};
use crate::error::BuilderResult;
use crate::observability::metrics;
use crate::publish::{ConfigurationPublisher, PublishError, PublishHandle};
use crate::store::ConfigurationStore;

/// Entry point for every page layout read and edit.
///
/// Edits are serialized on the store's edit lock: each one clones the
/// current snapshot, applies an engine to the clone, sets the store once and
/// starts its publishes before the lock is released.
pub struct PageBuilder {
    store: Arc<ConfigurationStore>,
    publisher: Arc<ConfigurationPublisher>,
    reader: Arc<dyn ConfigurationReadChannel>,
}

impl PageBuilder {
    pub fn new(
        store: Arc<ConfigurationStore>,
        publisher: Arc<ConfigurationPublisher>,
        reader: Arc<dyn ConfigurationReadChannel>,
    ) -> Self {
        Self {
            store,
            publisher,
            reader,
        }
    }

    pub fn store(&self) -> &Arc<ConfigurationStore> {
        &self.store
    }

    pub fn publisher(&self) -> &Arc<ConfigurationPublisher> {
        &self.publisher
    }

    pub fn snapshot(&self) -> Option<Arc<SiteConfig>> {
        self.store.get()
    }

    // Reads

    pub fn pages(&self) -> BTreeMap<PageId, Page> {
        self.store.get().map(|site| site.pages().clone()).unwrap_or_default()
    }

    pub fn page(&self, page_id: &PageId) -> Option<Page> {
        self.store.get().and_then(|site| site.page(page_id).cloned())
    }

    pub fn section(&self, page_id: &PageId, section_id: &SectionId) -> Option<Section> {
        self.store.get().and_then(|site| site.section(page_id, section_id).cloned())
    }

    /// Sections of a page in display order.
    pub fn ordered_sections(&self, page_id: &PageId) -> Vec<(SectionId, Section)> {
        let Some(site) = self.store.get() else {
            return Vec::new();
        };
        let Some(page) = site.page(page_id) else {
            return Vec::new();
        };
        let Some(sections) = page.sections.as_ref() else {
            return Vec::new();
        };

        page.ordered_section_ids()
            .into_iter()
            .filter_map(|id| sections.get(&id).cloned().map(|section| (id, section)))
            .collect()
    }

    pub fn items_from_section(&self, page_id: &PageId, section_id: &SectionId, kind: EntityKind) -> Vec<String> {
        self.store
            .get()
            .map(|site| engine::items_from_section(&site, page_id, section_id, kind))
            .unwrap_or_default()
    }

    pub fn places_where_item_is_present(&self, item_id: &str, kind: EntityKind) -> BTreeMap<String, String> {
        self.store
            .get()
            .map(|site| engine::places_where_item_is_present(&site, item_id, kind))
            .unwrap_or_default()
    }

    // Edits

    /// Apply the setup form to a section.
    ///
    /// Always republishes the document. Non-empty free text is published
    /// separately; its handle is the edit's value.
    pub fn save_section_setup(
        &self,
        page_id: &PageId,
        section_id: &SectionId,
        setup: &SectionSetup,
    ) -> BuilderResult<Edit<Option<PublishHandle>>> {
        let _guard = self.store.lock_edits();
        let edit = self.apply_locked("save_section_setup", |site| {
            engine::save_section_setup(site, page_id, section_id, setup)?;
            Ok(((), true))
        })?;

        let text = setup
            .text()
            .and_then(|text| self.started(self.publisher.publish_section_text(page_id, section_id, text)));
        Ok(edit.map(|()| text))
    }

    /// Append a section; `None` (and no edit) for an empty title.
    pub fn add_section_to_page(&self, title: &str, page_id: &PageId) -> BuilderResult<Edit<Option<SectionId>>> {
        self.apply("add_section_to_page", |site| {
            let added = engine::add_section_to_page(site, title, page_id)?;
            let changed = added.is_some();
            Ok((added, changed))
        })
    }

    /// Move a section and renumber the page. Always republishes.
    pub fn handle_move(&self, page_id: &PageId, movement: SectionMove) -> BuilderResult<Edit<Vec<SectionId>>> {
        self.apply("handle_move", |site| {
            let order = engine::handle_move(site, page_id, movement)?;
            Ok((order, true))
        })
    }

    /// Delete a section and return it.
    pub fn remove_section(&self, page_id: &PageId, section_id: &SectionId) -> BuilderResult<Edit<Section>> {
        self.apply("remove_section", |site| {
            let removed = engine::remove_section(site, page_id, section_id)?;
            Ok((removed, true))
        })
    }

    pub fn add_item_to_section(
        &self,
        page_id: &PageId,
        section_id: &SectionId,
        item_id: &str,
        kind: EntityKind,
    ) -> BuilderResult<Edit<bool>> {
        self.apply("add_item_to_section", |site| {
            let inserted = engine::add_item_to_section(site, page_id, section_id, item_id, kind)?;
            Ok((inserted, inserted))
        })
    }

    pub fn remove_item_from_section(
        &self,
        page_id: &PageId,
        section_id: &SectionId,
        item_id: &str,
        kind: EntityKind,
    ) -> BuilderResult<Edit<bool>> {
        self.apply("remove_item_from_section", |site| {
            let removed = engine::remove_item_from_section(site, page_id, section_id, item_id, kind)?;
            Ok((removed, removed))
        })
    }

    /// Republish the current document as is.
    ///
    /// Returns `Ok(None)` when nothing is loaded yet.
    pub fn save_content(&self) -> Result<Option<PublishHandle>, PublishError> {
        let _guard = self.store.lock_edits();
        let Some(current) = self.store.get() else {
            return Ok(None);
        };

        let site = if current.extra.contains_key(crate::document::LEGACY_HOMEPAGE_INCLUDE_STALLS) {
            let mut cleaned = (*current).clone();
            cleaned.strip_legacy_fields();
            let cleaned = Arc::new(cleaned);
            self.store.reload(cleaned.clone());
            cleaned
        } else {
            current
        };

        self.publisher.publish_site(&site).map(Some)
    }

    // Channel reads

    /// Fetch the published document into the store.
    ///
    /// Returns the new store version, or `None` if nothing was published yet.
    pub async fn load(&self) -> BuilderResult<Option<u64>> {
        let key = self.publisher.keys().site();
        let Some(value) = self.reader.get(&key).await? else {
            tracing::info!(key = %key, "No configuration published yet");
            return Ok(None);
        };

        let site: SiteConfig = serde_json::from_value(value)?;
        if let Err(problems) = validate_document(&site) {
            for problem in &problems {
                tracing::warn!(key = %key, problem = %problem, "Loaded configuration has a problem");
            }
        }

        let _guard = self.store.lock_edits();
        let version = self.store.set(site);
        tracing::info!(key = %key, version, "Configuration loaded");
        Ok(Some(version))
    }

    /// Fetch the free text published for a section.
    pub async fn section_text(&self, page_id: &PageId, section_id: &SectionId) -> BuilderResult<Option<String>> {
        let key = self.publisher.keys().section_text(page_id, section_id);
        let text = self.reader.get(&key).await?.map(|value| match value {
            Value::String(text) => text,
            other => other.to_string(),
        });
        Ok(text)
    }

    fn apply<T>(
        &self,
        operation: &'static str,
        edit: impl FnOnce(&mut SiteConfig) -> BuilderResult<(T, bool)>,
    ) -> BuilderResult<Edit<T>> {
        let _guard = self.store.lock_edits();
        self.apply_locked(operation, edit)
    }

    /// Caller holds the store's edit lock, so publishes start in edit order.
    fn apply_locked<T>(
        &self,
        operation: &'static str,
        edit: impl FnOnce(&mut SiteConfig) -> BuilderResult<(T, bool)>,
    ) -> BuilderResult<Edit<T>> {
        let mut site = self.store.get().map(|current| (*current).clone()).unwrap_or_default();
        let (value, changed) = edit(&mut site)?;
        if !changed {
            tracing::debug!(operation, "Edit left the configuration unchanged");
            return Ok(Edit::unchanged(value, self.store.version()));
        }

        site.strip_legacy_fields();
        let site = Arc::new(site);
        let version = self.store.reload(site.clone());
        metrics::record_edit(operation);
        tracing::info!(operation, version, "Configuration edited");

        let publish = self.started(self.publisher.publish_site(&site));
        Ok(Edit {
            value,
            version,
            changed: true,
            publish,
        })
    }

    /// Local edits stand even when a publish cannot be started.
    fn started(&self, result: Result<PublishHandle, PublishError>) -> Option<PublishHandle> {
        match result {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!(error = %e, "Could not start publishing configuration");
                None
            }
        }
    }
}

impl std::fmt::Debug for PageBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBuilder")
            .field("store", &self.store)
            .field("publisher", &self.publisher)
            .finish()
    }
}
