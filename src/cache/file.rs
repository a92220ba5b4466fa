//! File Backend Module
//!
//! Persistent cache storage: one JSON document per entry in a directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::debug;

use crate::cache::{CacheBackend, CacheEntry};
use crate::error::{Error, Result};

const ENTRY_EXTENSION: &str = "json";
const PROBE_FILE: &str = ".probe";

// == File Backend ==
/// Directory-backed cache storage that survives process restarts.
///
/// Files are named by the SHA-256 of the key. Writes land in a temporary
/// file that is renamed over the entry, so readers never observe a partial
/// document from this process.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    tmp_seq: AtomicU64,
}

impl FileBackend {
    /// Opens (creating if needed) a cache directory.
    ///
    /// Fails if the directory cannot be created or written to; callers use
    /// this as the capability check for persistent storage.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;

        let probe = dir.join(PROBE_FILE);
        fs::write(&probe, b"ok").await?;
        fs::remove_file(&probe).await?;

        debug!(dir = %dir.display(), "opened file cache backend");
        Ok(Self {
            dir,
            tmp_seq: AtomicU64::new(0),
        })
    }

    /// Directory holding the entry files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        format!("{hex}.{ENTRY_EXTENSION}")
    }

    /// Path of the file holding `key`'s entry.
    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(Self::file_name(key))
    }

    fn tmp_path(&self, key: &str) -> PathBuf {
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            "{}.tmp.{}.{}",
            Self::file_name(key),
            std::process::id(),
            seq
        ))
    }
}

#[async_trait]
impl CacheBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let bytes = match fs::read(self.entry_path(key)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let entry: CacheEntry = serde_json::from_slice(&bytes)
            .map_err(|err| Error::CorruptEntry(format!("{key}: {err}")))?;

        if entry.key != key {
            return Err(Error::CorruptEntry(format!(
                "{key}: file holds entry for {}",
                entry.key
            )));
        }

        Ok(Some(entry))
    }

    async fn store(&self, entry: CacheEntry) -> Result<()> {
        let serialized = serde_json::to_vec(&entry)
            .map_err(|err| Error::CorruptEntry(format!("{}: {err}", entry.key)))?;

        let tmp = self.tmp_path(&entry.key);
        if let Err(err) = fs::write(&tmp, &serialized).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&tmp, self.entry_path(&entry.key)).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(err.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn entry(key: &str) -> CacheEntry {
        CacheEntry::new(key, json!({"roles": [1, 2]}), 100, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_store_and_load_roundtrip_on_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(tmp.path()).await.unwrap();

        backend.store(entry("roles:42")).await.unwrap();
        assert!(backend.entry_path("roles:42").exists());

        let loaded = backend.load("roles:42").await.unwrap().unwrap();
        assert_eq!(loaded, entry("roles:42"));
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let backend = FileBackend::open(tmp.path()).await.unwrap();
            backend.store(entry("items")).await.unwrap();
        }

        let reopened = FileBackend::open(tmp.path()).await.unwrap();
        assert!(reopened.load("items").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_keys_with_slashes_map_to_flat_files() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(tmp.path()).await.unwrap();

        let path = backend.entry_path("user/2383326/stat");
        assert_eq!(path.parent(), Some(tmp.path()));
        backend.store(entry("user/2383326/stat")).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_missing_entry_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(tmp.path()).await.unwrap();
        assert!(backend.load("absent").await.unwrap().is_none());
        backend.remove("absent").await.unwrap();
    }

    #[tokio::test]
    async fn test_unparsable_file_is_corrupt() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(tmp.path()).await.unwrap();
        std::fs::write(backend.entry_path("items"), b"{not json").unwrap();

        let result = backend.load("items").await;
        assert!(matches!(result, Err(Error::CorruptEntry(_))));
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(tmp.path()).await.unwrap();
        backend.store(entry("a")).await.unwrap();
        backend.store(entry("a")).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names.len(), 1);
        assert!(names[0].ends_with(".json"));
    }

    #[tokio::test]
    async fn test_open_fails_when_path_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file_path = tmp.path().join("not-a-dir");
        std::fs::write(&file_path, b"x").unwrap();

        assert!(FileBackend::open(&file_path).await.is_err());
    }
}
