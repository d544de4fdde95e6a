//! Storage abstraction for site persistence.

mod autosave;
mod file;
mod memory;

pub use autosave::{AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::error::BuilderError;
use crate::site::Site;
use chrono::Utc;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Site not found: {0}")]
    NotFound(String),
    #[error("Version conflict for {id}: stored {stored}, received {received}")]
    Conflict { id: String, stored: u64, received: u64 },
    #[error("Invalid site content: {0}")]
    Invalid(#[from] BuilderError),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for site storage backends.
///
/// Implementations can keep sites in memory, on the filesystem, or behind a
/// remote API.
pub trait Storage: Send + Sync {
    /// Save a site and return the stored record (with its new version).
    fn save(&self, id: &str, site: &Site) -> BoxFuture<'_, StorageResult<Site>>;

    /// Load a site.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Site>>;

    /// Delete a site.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all site IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a site exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Check `incoming` against the stored record and build the record to write.
///
/// The incoming version must match the stored one exactly. Anything else is
/// either stale or was never handed out by this store.
pub(crate) fn next_revision(id: &str, stored: Option<&Site>, incoming: &Site) -> StorageResult<Site> {
    if let Some(stored) = stored {
        if incoming.version != stored.version {
            return Err(StorageError::Conflict {
                id: id.to_string(),
                stored: stored.version,
                received: incoming.version,
            });
        }
    }

    let mut record = incoming.clone();
    record.id = id.to_string();
    record.version = incoming.version + 1;
    record.updated_at = Utc::now();
    if let Some(stored) = stored {
        record.created_at = stored.created_at;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_revision_bumps_version() {
        let site = Site::new("site-1", "Portfolio", "portfolio.webifyx.com");
        let record = next_revision("site-1", None, &site).unwrap();
        assert_eq!(record.version, 1);
        assert!(record.updated_at >= site.updated_at);

        let again = next_revision("site-1", Some(&record), &record).unwrap();
        assert_eq!(again.version, 2);
        assert_eq!(again.created_at, record.created_at);
    }

    #[test]
    fn test_stale_save_conflicts() {
        let mut stored = Site::new("site-1", "Portfolio", "portfolio.webifyx.com");
        stored.version = 3;
        let mut stale = stored.clone();
        stale.version = 2;

        let err = next_revision("site-1", Some(&stored), &stale).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Conflict { stored: 3, received: 2, .. }
        ));
    }

    #[test]
    fn test_unknown_future_version_conflicts() {
        let mut stored = Site::new("site-1", "Portfolio", "portfolio.webifyx.com");
        stored.version = 3;
        let mut forged = stored.clone();
        forged.version = 1_000;

        let err = next_revision("site-1", Some(&stored), &forged).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Conflict { stored: 3, received: 1_000, .. }
        ));

        // A brand new site may arrive with any version.
        let record = next_revision("site-2", None, &forged).unwrap();
        assert_eq!(record.version, 1_001);
    }
}
