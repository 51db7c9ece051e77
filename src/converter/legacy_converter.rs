use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::converter::legacy_consumer::LegacyConverterConsumer;
use crate::error::RepositoryConversionError;
use crate::file_types::{FileTypes, IGNORABLE_CONTENT};
use crate::maven::artifact_mapping::ArtifactMappings;
use crate::maven::layout::RepositoryLayout;
use crate::maven::managed_repo::ManagedRepositoryContent;
use crate::scanner::consumer::KnownContentConsumer;
use crate::scanner::repository_scanner::RepositoryScanner;
use crate::scanner::summary::{ScanMode, ScanSummary};
use crate::storage::{FsStorage, RepositoryStorage};

#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    pub summary: ScanSummary,
    pub converted: u64,
}

/// Rewrites a legacy layout repository on the file system into a default layout repository.
///
/// The legacy repository is only read. Artifacts already present at the destination are
///  overwritten.
#[derive(Debug, Clone, Default)]
pub struct LegacyRepositoryConverter {
    file_types: Arc<FileTypes>,
    mappings: ArtifactMappings,
    scanner: RepositoryScanner,
}

impl LegacyRepositoryConverter {
    pub fn new(file_types: Arc<FileTypes>, mappings: ArtifactMappings) -> LegacyRepositoryConverter {
        LegacyRepositoryConverter {
            file_types,
            mappings,
            scanner: RepositoryScanner::new(),
        }
    }

    pub fn with_scanner(mut self, scanner: RepositoryScanner) -> LegacyRepositoryConverter {
        self.scanner = scanner;
        self
    }

    /// `exclusions` are globs over legacy relative paths of artifacts that are not converted
    pub async fn convert(&self, legacy_directory: &Path, destination_directory: &Path, exclusions: &[String]) -> Result<ConversionReport, RepositoryConversionError> {
        let source: Arc<dyn RepositoryStorage> = Arc::new(FsStorage::new(legacy_directory));
        let destination = ManagedRepositoryContent::new("converted", RepositoryLayout::Default, Arc::new(FsStorage::new(destination_directory)), self.file_types.clone())
            .with_mappings(self.mappings.clone());

        let legacy = ManagedRepositoryContent::new("legacy", RepositoryLayout::Legacy, source.clone(), self.file_types.clone())
            .with_mappings(self.mappings.clone());

        let mut consumer = LegacyConverterConsumer::new(source, destination, self.mappings.clone(), exclusions.to_vec());
        let ignored: Vec<String> = IGNORABLE_CONTENT.iter().map(|s| s.to_string()).collect();

        let summary = self.scanner
            .scan(&legacy, &mut [&mut consumer as &mut dyn KnownContentConsumer], &mut [], &ignored, ScanMode::Fresh)
            .await?;

        let converted = consumer.converted();
        let failures = consumer.into_failures();
        if !failures.is_empty() {
            return Err(RepositoryConversionError::Copy { failures });
        }

        info!("converted {} artifact(s) from {} to {}", converted, legacy_directory.display(), destination_directory.display());
        Ok(ConversionReport { summary, converted })
    }
}
