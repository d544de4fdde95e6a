//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult, next_revision};
use crate::site::Site;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    sites: RwLock<HashMap<String, Site>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a storage pre-filled with `sites`, keyed by their ids.
    pub fn with_sites(sites: impl IntoIterator<Item = Site>) -> Self {
        let sites = sites.into_iter().map(|site| (site.id.clone(), site)).collect();
        Self {
            sites: RwLock::new(sites),
        }
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, site: &Site) -> BoxFuture<'_, StorageResult<Site>> {
        let id = id.to_string();
        let site = site.clone();
        Box::pin(async move {
            let mut sites = self.sites.write().map_err(lock_error)?;
            let record = next_revision(&id, sites.get(&id), &site)?;
            sites.insert(id, record.clone());
            Ok(record)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Site>> {
        let id = id.to_string();
        Box::pin(async move {
            let sites = self.sites.read().map_err(lock_error)?;
            sites.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut sites = self.sites.write().map_err(lock_error)?;
            match sites.remove(&id) {
                Some(_) => Ok(()),
                None => Err(StorageError::NotFound(id)),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let sites = self.sites.read().map_err(lock_error)?;
            let mut ids: Vec<String> = sites.keys().cloned().collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let sites = self.sites.read().map_err(lock_error)?;
            Ok(sites.contains_key(&id))
        })
    }
}
