use std::collections::BTreeMap;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use crate::error::{StorageError, StorageResult};
use crate::storage::repository_storage::{byte_stream, join_path, normalize_relative, read_to_bytes, ByteStream, RepositoryStorage, StorageEntry};

#[derive(Debug, Clone)]
struct TransientFile {
    data: Bytes,
    modified: SystemTime,
}

/// in-memory storage, neither optimized nor particularly robust - for testing purposes.
///
/// Containers exist implicitly as long as there is a file below them.
#[derive(Debug, Default)]
pub struct TransientStorage {
    files: Mutex<BTreeMap<String, TransientFile>>,
}
impl TransientStorage {
    pub const LOCATION: &'static str = "mem://transient";

    pub fn new() -> TransientStorage {
        TransientStorage::default()
    }

    pub async fn put(&self, path: &str, data: impl Into<Bytes>) -> StorageResult<()> {
        let path = normalize_relative(path)?;
        self.files.lock().await
            .insert(path, TransientFile { data: data.into(), modified: SystemTime::now() });
        Ok(())
    }

    pub async fn set_last_modified(&self, path: &str, modified: SystemTime) -> StorageResult<()> {
        let path = normalize_relative(path)?;
        match self.files.lock().await.get_mut(&path) {
            Some(file) => {
                file.modified = modified;
                Ok(())
            }
            None => Err(StorageError::NotFound(path)),
        }
    }

    fn has_children(files: &BTreeMap<String, TransientFile>, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        let prefix = format!("{}/", path);
        files.range(prefix.clone()..)
            .next()
            .map(|(k, _)| k.starts_with(&prefix))
            .unwrap_or(false)
    }
}

#[async_trait]
impl RepositoryStorage for TransientStorage {
    fn location(&self) -> &str {
        TransientStorage::LOCATION
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let path = normalize_relative(path)?;
        let files = self.files.lock().await;
        Ok(files.contains_key(&path) || Self::has_children(&files, &path))
    }

    async fn is_container(&self, path: &str) -> StorageResult<bool> {
        let path = normalize_relative(path)?;
        let files = self.files.lock().await;
        Ok(Self::has_children(&files, &path))
    }

    async fn list(&self, path: &str) -> StorageResult<Vec<StorageEntry>> {
        let path = normalize_relative(path)?;
        let files = self.files.lock().await;
        if !Self::has_children(&files, &path) {
            return Err(StorageError::NotFound(path));
        }

        let prefix = if path.is_empty() { "".to_string() } else { format!("{}/", path) };

        // name -> is_container
        let mut children = BTreeMap::new();
        for remainder in files.keys().filter_map(|k| k.strip_prefix(&prefix)) {
            match remainder.split_once('/') {
                Some((dir, _)) => {
                    children.insert(dir.to_string(), true);
                }
                None => {
                    children.entry(remainder.to_string()).or_insert(false);
                }
            }
        }

        Ok(children.into_iter()
            .map(|(name, is_container)| StorageEntry { path: join_path(&path, &name), is_container })
            .collect())
    }

    async fn last_modified(&self, path: &str) -> StorageResult<SystemTime> {
        let path = normalize_relative(path)?;
        self.files.lock().await
            .get(&path)
            .map(|f| f.modified)
            .ok_or(StorageError::NotFound(path))
    }

    async fn read(&self, path: &str) -> StorageResult<ByteStream> {
        let path = normalize_relative(path)?;
        match self.files.lock().await.get(&path) {
            Some(file) => Ok(byte_stream(file.data.clone())),
            None => Err(StorageError::NotFound(path)),
        }
    }

    async fn write(&self, path: &str, data: ByteStream) -> StorageResult<()> {
        let path = normalize_relative(path)?;
        if path.is_empty() {
            return Err(StorageError::OutsideRoot(path));
        }
        // collect before locking so that readers never see a partial file
        let data = read_to_bytes(data).await?;
        self.files.lock().await
            .insert(path, TransientFile { data, modified: SystemTime::now() });
        Ok(())
    }

    async fn delete(&self, path: &str) -> StorageResult<bool> {
        let path = normalize_relative(path)?;
        if path.is_empty() {
            return Err(StorageError::OutsideRoot(path));
        }
        let prefix = format!("{}/", path);

        let mut files = self.files.lock().await;
        let before = files.len();
        files.retain(|k, _| *k != path && !k.starts_with(&prefix));
        Ok(files.len() != before)
    }
}
