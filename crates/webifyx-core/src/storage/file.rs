//! File-based storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult, next_revision};
use crate::site::Site;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;

/// File-based storage.
///
/// Stores each site as a pretty-printed JSON file in a directory. Writes go
/// through a temp file in the same directory and are renamed into place, so a
/// reader never sees a half-written site.
pub struct FileStorage {
    /// Base directory for site files.
    base_path: PathBuf,
    /// Serializes the read-check-write of `save` and `delete`.
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self {
            base_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Create file storage in the default location.
    ///
    /// On Linux: `~/.local/share/webifyx/sites/`
    /// On Windows: `%LOCALAPPDATA%\webifyx\sites\`
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("webifyx").join("sites"))
    }

    /// Get the file path for a site ID.
    fn site_path(&self, id: &str) -> PathBuf {
        // Keep ids safe for filenames
        let safe_id: String = id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path.join(format!("{}.json", safe_id))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

/// Read a site file. A missing file is `None`.
fn read_site(path: &Path) -> StorageResult<Option<Site>> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StorageError::Io(format!("Failed to read {}: {}", path.display(), e)));
        }
    };
    Site::from_json(&json).map(Some).map_err(|e| {
        StorageError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Write `json` next to `path` and rename it over the old file.
fn write_atomic(dir: &Path, path: &Path, json: &str) -> StorageResult<()> {
    let write_error = |e: io::Error| StorageError::Io(format!("Failed to write {}: {}", path.display(), e));

    let mut file = NamedTempFile::new_in(dir).map_err(write_error)?;
    file.write_all(json.as_bytes()).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

impl Storage for FileStorage {
    fn save(&self, id: &str, site: &Site) -> BoxFuture<'_, StorageResult<Site>> {
        let path = self.site_path(id);
        let id = id.to_string();
        let site = site.clone();

        Box::pin(async move {
            let _guard = self.write_lock.lock().map_err(lock_error)?;
            let stored = read_site(&path)?;
            let record = next_revision(&id, stored.as_ref(), &site)?;
            let json = record
                .to_json()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            write_atomic(&self.base_path, &path, &json)?;
            Ok(record)
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<Site>> {
        let path = self.site_path(id);
        let id = id.to_string();

        Box::pin(async move { read_site(&path)?.ok_or(StorageError::NotFound(id)) })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.site_path(id);
        let id = id.to_string();

        Box::pin(async move {
            let _guard = self.write_lock.lock().map_err(lock_error)?;
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StorageError::NotFound(id)),
                Err(e) => Err(StorageError::Io(format!("Failed to delete {}: {}", path.display(), e))),
            }
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();

        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }

            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

            let mut ids: Vec<String> = entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
                .filter_map(|path| path.file_stem().and_then(|stem| stem.to_str()).map(str::to_string))
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.site_path(id);
        Box::pin(async move { Ok(path.exists()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, ElementKind};
    use pollster::block_on;
    use tempfile::tempdir;

    fn site(id: &str) -> Site {
        Site::new(id, "Test Site", format!("{id}.webifyx.com"))
    }

    #[test]
    fn test_file_storage_save_load() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let site = site("site-1").with_elements(vec![
            Element::with_id("header-1", ElementKind::Header)
                .with_children(vec![Element::with_id("text-1", ElementKind::Text)]),
        ]);

        let saved = block_on(storage.save("site-1", &site)).unwrap();
        let loaded = block_on(storage.load("site-1")).unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.content.elements[0].children[0].id(), "text-1");
    }

    #[test]
    fn test_file_storage_not_found() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let result = block_on(storage.load("nonexistent"));
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_file_storage_list_and_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("site-2", &site("site-2"))).unwrap();
        block_on(storage.save("site-1", &site("site-1"))).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list, vec!["site-1".to_string(), "site-2".to_string()]);

        block_on(storage.delete("site-1")).unwrap();
        assert!(!block_on(storage.exists("site-1")).unwrap());
        assert!(block_on(storage.exists("site-2")).unwrap());

        let again = block_on(storage.delete("site-1"));
        assert!(matches!(again, Err(StorageError::NotFound(ref id)) if id == "site-1"));
    }

    #[test]
    fn test_file_storage_sanitizes_id() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        block_on(storage.save("site/with:odd*chars", &site("x"))).unwrap();

        let loaded = block_on(storage.load("site/with:odd*chars")).unwrap();
        assert_eq!(loaded.id, "site/with:odd*chars");
        assert!(dir.path().join("site_with_odd_chars.json").exists());
    }

    #[test]
    fn test_file_storage_version_conflict() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();

        let first = block_on(storage.save("site-1", &site("site-1"))).unwrap();
        let second = block_on(storage.save("site-1", &first)).unwrap();
        assert_eq!(second.version, 2);

        let result = block_on(storage.save("site-1", &first));
        assert!(matches!(result, Err(StorageError::Conflict { .. })));
    }

    #[test]
    fn test_concurrent_saves_from_one_version() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        let mut base = block_on(storage.save("site-1", &site("site-1"))).unwrap();

        for round in 0..5 {
            let (storage, base_ref) = (&storage, &base);
            let results: Vec<_> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..8)
                    .map(|_| scope.spawn(move || block_on(storage.save("site-1", base_ref))))
                    .collect();
                handles.into_iter().map(|handle| handle.join().unwrap()).collect()
            });

            let saved: Vec<_> = results.iter().filter_map(|result| result.as_ref().ok()).collect();
            assert_eq!(saved.len(), 1, "round {round}");
            assert!(
                results
                    .iter()
                    .filter(|result| result.is_err())
                    .all(|result| matches!(result, Err(StorageError::Conflict { .. })))
            );

            let stored = block_on(storage.load("site-1")).unwrap();
            assert_eq!(stored.version, base.version + 1);
            base = stored;
        }

        // Only the site file is left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        fs::write(dir.path().join("broken.json"), "{ not json").unwrap();

        let result = block_on(storage.load("broken"));
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
