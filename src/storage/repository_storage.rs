use std::fmt::Debug;
use std::pin::Pin;
use std::time::SystemTime;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures_core::Stream;

use crate::error::{StorageError, StorageResult};

pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send + 'static>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEntry {
    /// relative to the storage root, '/' separated
    pub path: String,
    pub is_container: bool,
}
impl StorageEntry {
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// The only way repository code touches files. All paths are relative to the storage's root and
///  use '/' as separator; the empty path is the root itself.
#[async_trait]
pub trait RepositoryStorage: Debug + Send + Sync {
    /// Location of the root, used for display and to relativize absolute paths
    fn location(&self) -> &str;

    fn resolve(&self, path: &str) -> String {
        format!("{}/{}", self.location().trim_end_matches('/'), path)
    }

    async fn exists(&self, path: &str) -> StorageResult<bool>;

    async fn is_container(&self, path: &str) -> StorageResult<bool>;

    /// Immediate children of a container, sorted by name
    async fn list(&self, path: &str) -> StorageResult<Vec<StorageEntry>>;

    async fn last_modified(&self, path: &str) -> StorageResult<SystemTime>;

    async fn read(&self, path: &str) -> StorageResult<ByteStream>;

    /// Creates missing parent containers. Readers never observe a partially written file.
    async fn write(&self, path: &str, data: ByteStream) -> StorageResult<()>;

    /// Deletes a file or an entire container. Returns false if there was nothing to delete.
    async fn delete(&self, path: &str) -> StorageResult<bool>;
}

pub fn byte_stream(data: impl Into<Bytes>) -> ByteStream {
    let bytes = data.into();
    Box::pin(futures::stream::once(async move { Ok::<_, std::io::Error>(bytes) }))
}

pub async fn read_to_bytes(mut data: ByteStream) -> std::io::Result<Bytes> {
    let mut result = BytesMut::new();
    while let Some(chunk) = data.next().await {
        result.extend_from_slice(&chunk?);
    }
    Ok(result.freeze())
}

/// Canonical form of a relative path: '/' separated, no leading or trailing separators, no '.'
///  segments. '..' is rejected rather than resolved.
pub fn normalize_relative(path: &str) -> StorageResult<String> {
    let normalized = path.replace('\\', "/");
    let mut segments = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(StorageError::OutsideRoot(path.to_string())),
            s => segments.push(s),
        }
    }
    Ok(segments.join("/"))
}

pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    }
    else {
        format!("{}/{}", parent, name)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::plain("a/b/c", "a/b/c")]
    #[case::leading_slash("/a/b/", "a/b")]
    #[case::backslash(r"a\b\c", "a/b/c")]
    #[case::dots("./a/./b", "a/b")]
    #[case::double_slash("a//b", "a/b")]
    #[case::root("", "")]
    fn test_normalize_relative(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(normalize_relative(path).unwrap(), expected);
    }

    #[test]
    fn test_normalize_rejects_parent() {
        assert!(matches!(normalize_relative("a/../../etc"), Err(StorageError::OutsideRoot(_))));
    }

    #[test]
    fn test_entry_name() {
        let entry = StorageEntry { path: "org/example/foo".to_string(), is_container: true };
        assert_eq!(entry.name(), "foo");
    }

    #[tokio::test]
    async fn test_byte_stream_round_trip() {
        let bytes = read_to_bytes(byte_stream("hello")).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }
}
