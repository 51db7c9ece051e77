use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::fs::{create_dir_all, metadata, read_dir, remove_dir_all, remove_file, rename, try_exists, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{error, trace};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::storage::repository_storage::{join_path, normalize_relative, ByteStream, RepositoryStorage, StorageEntry};

/// Storage on the local file system, rooted at a directory.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
    location: String,
}
impl FsStorage {
    pub fn new(root: impl Into<PathBuf>) -> FsStorage {
        let root = root.into();
        // an absolute location keeps relative paths from being mistaken for rooted ones
        let root = std::path::absolute(&root).unwrap_or(root);
        let location = root.to_string_lossy().replace('\\', "/");
        FsStorage {
            root,
            location,
        }
    }

    fn file_path(&self, path: &str) -> StorageResult<PathBuf> {
        let relative = normalize_relative(path)?;
        let mut result = self.root.clone();
        for segment in relative.split('/').filter(|s| !s.is_empty()) {
            result.push(segment);
        }
        Ok(result)
    }

    /// sibling of `target` with a unique name, hidden from artifact patterns by its leading '.'
    fn temp_sibling(target: &Path, suffix: &str) -> PathBuf {
        let name = target.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut result = target.to_path_buf();
        result.set_file_name(format!(".{}.{}.{}", name, Uuid::new_v4().as_hyphenated(), suffix));
        result
    }

    async fn do_write(temp_path: &Path, data: ByteStream) -> StorageResult<()> {
        let mut data = data;

        let mut file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(temp_path)
            .await?;

        while let Some(bytes) = data.next().await {
            file.write_all(&bytes?).await?;
        }
        file.flush().await?;
        Ok(())
    }
}

fn not_found_as(path: &str, e: std::io::Error) -> StorageError {
    if e.kind() == ErrorKind::NotFound {
        StorageError::NotFound(path.to_string())
    }
    else {
        StorageError::Io(e)
    }
}

#[async_trait]
impl RepositoryStorage for FsStorage {
    fn location(&self) -> &str {
        &self.location
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(try_exists(self.file_path(path)?).await?)
    }

    async fn is_container(&self, path: &str) -> StorageResult<bool> {
        match metadata(self.file_path(path)?).await {
            Ok(m) => Ok(m.is_dir()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, path: &str) -> StorageResult<Vec<StorageEntry>> {
        let relative = normalize_relative(path)?;
        let directory = self.file_path(&relative)?;
        trace!("listing directory {}", directory.display());

        let mut entries = read_dir(&directory).await
            .map_err(|e| not_found_as(path, e))?;

        let mut result = Vec::new();
        while let Some(dir_entry) = entries.next_entry().await? {
            let name = dir_entry.file_name().to_string_lossy().to_string();
            result.push(StorageEntry {
                path: join_path(&relative, &name),
                is_container: dir_entry.file_type().await?.is_dir(),
            });
        }
        result.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(result)
    }

    async fn last_modified(&self, path: &str) -> StorageResult<SystemTime> {
        let m = metadata(self.file_path(path)?).await
            .map_err(|e| not_found_as(path, e))?;
        Ok(m.modified()?)
    }

    async fn read(&self, path: &str) -> StorageResult<ByteStream> {
        let file_path = self.file_path(path)?;
        trace!("reading file {}", file_path.display());

        let file = OpenOptions::new()
            .read(true)
            .open(&file_path)
            .await
            .map_err(|e| not_found_as(path, e))?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn write(&self, path: &str, data: ByteStream) -> StorageResult<()> {
        let file_path = self.file_path(path)?;
        if file_path == self.root {
            return Err(StorageError::OutsideRoot(path.to_string()));
        }
        trace!("writing file {}", file_path.display());

        if let Some(parent) = file_path.parent() {
            create_dir_all(parent).await?;
        }

        // write to a temporary sibling first and rename so that partial writes are never visible
        let temp_path = Self::temp_sibling(&file_path, "inserting");
        match Self::do_write(&temp_path, data).await {
            Ok(_) => {
                rename(&temp_path, &file_path).await?;
                Ok(())
            }
            Err(e) => {
                if let Err(cleanup) = remove_file(&temp_path).await {
                    error!("error cleaning up {} after failed attempt to write: {}", temp_path.display(), cleanup);
                }
                Err(e)
            }
        }
    }

    async fn delete(&self, path: &str) -> StorageResult<bool> {
        let file_path = self.file_path(path)?;
        trace!("deleting {}", file_path.display());

        let m = match metadata(&file_path).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if m.is_dir() {
            if file_path == self.root {
                return Err(StorageError::OutsideRoot(path.to_string()));
            }

            // First, atomically rename the directory so that a partial delete does not leave
            //  a half-populated directory under its original name.
            let temp_path = Self::temp_sibling(&file_path, "deleting");
            rename(&file_path, &temp_path).await?;
            remove_dir_all(&temp_path).await?;
        }
        else {
            remove_file(&file_path).await?;
        }
        Ok(true)
    }
}
