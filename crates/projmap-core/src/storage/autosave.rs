//! Periodic project persistence.

use crate::document::ProjectDocument;
use crate::router::InputRouter;
use crate::storage::{FileStorage, Storage, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 5;

/// Key under which the most recent project is always saved.
pub const LAST_DOCUMENT_KEY: &str = "projection-map-project";

/// Saves the project on an interval while it has unsaved changes.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    /// Named project being edited, if the user gave it one.
    current_doc_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
            current_doc_id: None,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_document_id(&mut self, id: Option<String>) {
        self.current_doc_id = id;
    }

    pub fn document_id(&self) -> Option<&str> {
        self.current_doc_id.as_deref()
    }

    /// Dirty and the interval has passed since the last save.
    pub fn should_save(&self) -> bool {
        self.dirty && self.last_save.is_none_or(|last| last.elapsed() >= self.interval)
    }

    /// Save if [`should_save`](Self::should_save). Returns whether a save happened.
    pub async fn maybe_save(&mut self, document: &ProjectDocument) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(document).await?;
        Ok(true)
    }

    /// Timer tick: save the editor's project when due, skipping ticks
    /// that land in the middle of a drag.
    pub async fn tick(&mut self, router: &InputRouter) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        match router.snapshot_if_idle() {
            Some(document) => self.maybe_save(&document).await,
            None => Ok(false),
        }
    }

    /// Save now, under the current id (if any) and [`LAST_DOCUMENT_KEY`].
    pub async fn save(&mut self, document: &ProjectDocument) -> StorageResult<()> {
        if let Some(id) = self.current_doc_id.as_deref() {
            self.storage.save(id, document).await?;
        }
        self.storage.save(LAST_DOCUMENT_KEY, document).await?;
        log::info!(
            "saved project ({} regions, {} masks)",
            document.regions.len(),
            document.masks.len()
        );
        self.last_save = Some(Instant::now());
        self.dirty = false;
        Ok(())
    }

    /// Load a named project and make it current.
    pub async fn load(&mut self, id: &str) -> StorageResult<ProjectDocument> {
        let doc = self.storage.load(id).await?;
        self.current_doc_id = Some(id.to_string());
        self.dirty = false;
        self.last_save = Some(Instant::now());
        Ok(doc)
    }

    /// The most recently saved project, if one loads.
    pub async fn load_last(&mut self) -> Option<ProjectDocument> {
        match self.storage.load(LAST_DOCUMENT_KEY).await {
            Ok(doc) => {
                self.dirty = false;
                self.last_save = Some(Instant::now());
                Some(doc)
            }
            Err(e) => {
                log::warn!("no previous project restored: {e}");
                None
            }
        }
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    /// Saved project ids, without [`LAST_DOCUMENT_KEY`].
    pub async fn list_documents(&self) -> StorageResult<Vec<String>> {
        let mut docs = self.storage.list().await?;
        docs.retain(|id| id != LAST_DOCUMENT_KEY);
        Ok(docs)
    }

    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id).await
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// File storage in the default per-user location.
pub fn create_default_storage() -> StorageResult<Arc<FileStorage>> {
    Ok(Arc::new(FileStorage::default_location()?))
}

/// Auto-save manager over [`create_default_storage`].
pub fn create_autosave_manager() -> StorageResult<AutoSaveManager<FileStorage>> {
    Ok(AutoSaveManager::new(create_default_storage()?))
}
