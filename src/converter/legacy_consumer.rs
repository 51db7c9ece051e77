use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::StorageResult;
use crate::maven::artifact_mapping::ArtifactMappings;
use crate::maven::layout::RepositoryLayout;
use crate::maven::managed_repo::ManagedRepositoryContent;
use crate::scanner::consumer::{ConsumerLifecycle, KnownContentConsumer};
use crate::scanner::summary::ScanSummary;
use crate::storage::RepositoryStorage;

/// checksum files that travel with an artifact
const SIDECAR_EXTENSIONS: &[&str] = &[".md5", ".sha1"];

/// Copies every legacy artifact it is offered to its default layout location in the destination
#[derive(Debug)]
pub struct LegacyConverterConsumer {
    source: Arc<dyn RepositoryStorage>,
    destination: ManagedRepositoryContent,
    mappings: ArtifactMappings,
    excludes: Vec<String>,
    converted: u64,
    failures: Vec<String>,
}

impl LegacyConverterConsumer {
    pub const ID: &'static str = "artifact-legacy-to-default-converter";

    /// `destination` is expected to use the default layout
    pub fn new(source: Arc<dyn RepositoryStorage>, destination: ManagedRepositoryContent, mappings: ArtifactMappings, excludes: Vec<String>) -> LegacyConverterConsumer {
        LegacyConverterConsumer {
            source,
            destination,
            mappings,
            excludes,
            converted: 0,
            failures: vec![],
        }
    }

    pub fn converted(&self) -> u64 {
        self.converted
    }

    /// "<path>: <error>" for every artifact that could not be copied
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn into_failures(self) -> Vec<String> {
        self.failures
    }

    async fn copy(&self, source_path: &str, target_path: &str) -> StorageResult<()> {
        let destination = self.destination.storage();
        let data = self.source.read(source_path).await?;
        destination.write(target_path, data).await?;

        for extension in SIDECAR_EXTENSIONS {
            let sidecar = format!("{}{}", source_path, extension);
            if self.source.exists(&sidecar).await? {
                let data = self.source.read(&sidecar).await?;
                destination.write(&format!("{}{}", target_path, extension), data).await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ConsumerLifecycle for LegacyConverterConsumer {
    fn id(&self) -> &str {
        LegacyConverterConsumer::ID
    }

    async fn begin_scan(&mut self, repository: &ManagedRepositoryContent, _started: SystemTime) -> anyhow::Result<()> {
        self.converted = 0;
        self.failures.clear();
        info!("converting legacy repository {} to {}", repository.storage().location(), self.destination.storage().location());
        Ok(())
    }

    async fn complete_scan(&mut self, _summary: &ScanSummary) -> anyhow::Result<()> {
        info!("converted {} artifact(s), {} failure(s)", self.converted, self.failures.len());
        Ok(())
    }
}

#[async_trait]
impl KnownContentConsumer for LegacyConverterConsumer {
    fn includes(&self) -> Vec<String> {
        vec!["**".to_string()]
    }

    fn excludes(&self) -> Vec<String> {
        self.excludes.clone()
    }

    async fn process_file(&mut self, path: &str) -> anyhow::Result<()> {
        let coordinate = RepositoryLayout::Legacy.parse_path(path, &self.mappings)?;
        let target = self.destination.to_path(&coordinate)?;

        match self.copy(path, &target).await {
            Ok(()) => {
                debug!("converted {} -> {}", path, target);
                self.converted += 1;
                Ok(())
            }
            Err(e) => {
                warn!("failed to convert {}: {}", path, e);
                self.failures.push(format!("{}: {}", path, e));
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use crate::file_types::FileTypes;
    use crate::storage::{read_to_bytes, TransientStorage};

    use super::*;

    fn destination(storage: Arc<TransientStorage>) -> ManagedRepositoryContent {
        ManagedRepositoryContent::new("converted", RepositoryLayout::Default, storage, Arc::new(FileTypes::default()))
    }

    #[tokio::test]
    async fn test_copies_artifact_and_sidecars() {
        let source = Arc::new(TransientStorage::new());
        source.put("org.example/jars/foo-1.0.jar", "jar content").await.unwrap();
        source.put("org.example/jars/foo-1.0.jar.sha1", "abc").await.unwrap();
        let destination = Arc::new(TransientStorage::new());

        let mut consumer = LegacyConverterConsumer::new(source, self::destination(destination.clone()), ArtifactMappings::default(), vec![]);
        consumer.process_file("org.example/jars/foo-1.0.jar").await.unwrap();

        assert_eq!(consumer.converted(), 1);
        let jar = read_to_bytes(destination.read("org/example/foo/1.0/foo-1.0.jar").await.unwrap()).await.unwrap();
        assert_eq!(jar.as_ref(), b"jar content");
        assert!(destination.exists("org/example/foo/1.0/foo-1.0.jar.sha1").await.unwrap());
        assert!(!destination.exists("org/example/foo/1.0/foo-1.0.jar.md5").await.unwrap());
    }

    #[tokio::test]
    async fn test_missing_source_is_recorded() {
        let source = Arc::new(TransientStorage::new());
        let destination = destination(Arc::new(TransientStorage::new()));

        let mut consumer = LegacyConverterConsumer::new(source, destination, ArtifactMappings::default(), vec![]);
        assert!(consumer.process_file("org.example/jars/foo-1.0.jar").await.is_err());

        assert_eq!(consumer.converted(), 0);
        assert_eq!(consumer.failures().len(), 1);
        assert!(consumer.failures()[0].starts_with("org.example/jars/foo-1.0.jar: "));
    }

    #[tokio::test]
    async fn test_unparsable_path_is_an_error() {
        let mut consumer = LegacyConverterConsumer::new(Arc::new(TransientStorage::new()), destination(Arc::new(TransientStorage::new())), ArtifactMappings::default(), vec![]);
        assert!(consumer.process_file("foo-1.0.jar").await.is_err());
        assert!(consumer.failures().is_empty());
    }
}
