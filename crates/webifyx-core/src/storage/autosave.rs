//! Auto-save functionality for site persistence.
//!
//! Saves the edited site periodically while it has unsaved changes.

use crate::site::Site;
use crate::storage::{Storage, StorageError, StorageResult};
use crate::store::{BuilderStore, SaveRequest};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// Manages automatic site persistence for a [`BuilderStore`].
pub struct AutoSaveManager<S: Storage + ?Sized> {
    /// Storage backend.
    storage: Arc<S>,
    /// Auto-save interval.
    interval: Duration,
    /// Last successful save or load.
    last_save: Option<Instant>,
}

impl<S: Storage + ?Sized> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
        }
    }

    /// Set the auto-save interval.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Get the auto-save interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// When the site was last saved or loaded.
    pub fn last_save(&self) -> Option<Instant> {
        self.last_save
    }

    /// Check if the store has changes and enough time has passed.
    pub fn should_save(&self, store: &BuilderStore) -> bool {
        if !store.is_dirty() || store.current_site().is_none() {
            return false;
        }

        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save if needed (dirty, site loaded, interval elapsed).
    /// Returns true if a save was performed.
    pub async fn maybe_save(&mut self, store: &mut BuilderStore) -> StorageResult<bool> {
        if !self.should_save(store) {
            return Ok(false);
        }
        self.save(store).await
    }

    /// Save the current site immediately.
    ///
    /// Returns false when no site is loaded. On failure the store stays dirty.
    pub async fn save(&mut self, store: &mut BuilderStore) -> StorageResult<bool> {
        let Some(request) = store.save_request() else {
            return Ok(false);
        };
        let saved = self.persist(&request).await?;
        self.finish(store, &request, saved);
        Ok(true)
    }

    /// Write a snapshot to storage without touching the store, so editing
    /// can continue while the write is in flight. Pair with [`Self::finish`].
    pub async fn persist(&self, request: &SaveRequest) -> StorageResult<Site> {
        match self.storage.save(&request.site_id, &request.site).await {
            Ok(saved) => {
                log::info!("Saved site {} (version {})", saved.id, saved.version);
                Ok(saved)
            }
            Err(e) => {
                log::error!("Failed to save site {}: {}", request.site_id, e);
                Err(e)
            }
        }
    }

    /// Hand a completed save back to the store.
    /// Returns whether the store is clean afterwards.
    pub fn finish(&mut self, store: &mut BuilderStore, request: &SaveRequest, saved: Site) -> bool {
        self.last_save = Some(Instant::now());
        store.apply_saved(request, saved)
    }

    /// Load a site into the store.
    ///
    /// A missing site or one whose elements break the document rules (repeated
    /// ids, children under a leaf kind) is refused and the store is left
    /// untouched.
    pub async fn load_site(&mut self, store: &mut BuilderStore, id: &str) -> StorageResult<()> {
        let site = self.storage.load(id).await.inspect_err(|e| {
            log::error!("Failed to load site {}: {}", id, e);
        })?;
        store.set_current_site(Some(site)).map_err(|e| {
            log::error!("Refusing to load site {}: {}", id, e);
            StorageError::from(e)
        })?;
        self.last_save = Some(Instant::now());
        Ok(())
    }

    /// Delete a site by ID.
    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    /// List all saved site IDs.
    pub async fn list_sites(&self) -> StorageResult<Vec<String>> {
        self.storage.list().await
    }

    /// Check if a site exists.
    pub async fn exists(&self, id: &str) -> StorageResult<bool> {
        self.storage.exists(id).await
    }

    /// Get a reference to the storage backend.
    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}
