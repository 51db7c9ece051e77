use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ContentError, ContentResult, MalformedPathError};
use crate::file_types::FileTypes;
use crate::maven::artifact_mapping::ArtifactMappings;
use crate::maven::coordinates::{ArtifactCoordinate, ProjectReference, VersionedReference};
use crate::maven::layout::RepositoryLayout;
use crate::maven::paths;
use crate::storage::{RepositoryStorage, StorageEntry};

/// Coordinate level view of one repository root.
///
/// Immutable once built; cloning is cheap and shares the storage.
#[derive(Debug, Clone)]
pub struct ManagedRepositoryContent {
    id: String,
    layout: RepositoryLayout,
    storage: Arc<dyn RepositoryStorage>,
    file_types: Arc<FileTypes>,
    mappings: ArtifactMappings,
}

impl ManagedRepositoryContent {
    pub fn new(id: &str, layout: RepositoryLayout, storage: Arc<dyn RepositoryStorage>, file_types: Arc<FileTypes>) -> ManagedRepositoryContent {
        ManagedRepositoryContent {
            id: id.to_string(),
            layout,
            storage,
            file_types,
            mappings: ArtifactMappings::default(),
        }
    }

    pub fn with_mappings(mut self, mappings: ArtifactMappings) -> ManagedRepositoryContent {
        self.mappings = mappings;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn layout(&self) -> RepositoryLayout {
        self.layout
    }

    pub fn storage(&self) -> &Arc<dyn RepositoryStorage> {
        &self.storage
    }

    pub fn file_types(&self) -> &FileTypes {
        &self.file_types
    }

    pub fn to_path(&self, coordinate: &ArtifactCoordinate) -> Result<String, MalformedPathError> {
        require_non_blank(&coordinate.to_string(), &[
            ("namespace", coordinate.namespace.as_str()),
            ("project", coordinate.project.as_str()),
            ("base version", coordinate.base_version.as_str()),
            ("version", coordinate.version.as_str()),
            ("extension", coordinate.extension.as_str()),
        ])?;
        Ok(self.layout.format_path(coordinate))
    }

    /// Accepts paths relative to the repository root as well as absolute paths below it
    pub fn to_coordinate(&self, path: &str) -> Result<ArtifactCoordinate, MalformedPathError> {
        self.parse_relative(&self.relativize(path))
    }

    /// `path` must already be relative to the repository root, as storage listings are
    pub(crate) fn parse_relative(&self, path: &str) -> Result<ArtifactCoordinate, MalformedPathError> {
        let mut coordinate = self.layout.parse_path(path, &self.mappings)?;
        coordinate.repository_id = Some(self.id.clone());
        Ok(coordinate)
    }

    fn relativize(&self, path: &str) -> String {
        let normalized = path.replace('\\', "/");
        let location = self.storage.location().trim_end_matches('/');

        let relative = match normalized.strip_prefix(location) {
            Some(rest) if !location.is_empty() && rest.starts_with('/') => rest,
            _ => normalized.as_str(),
        };
        relative.trim_start_matches('/').to_string()
    }

    pub fn metadata_path(&self, project: &ProjectReference, version: Option<&str>) -> ContentResult<String> {
        self.require_version_directories()?;
        Ok(paths::metadata_path(&project.namespace, &project.project, version))
    }

    fn require_version_directories(&self) -> ContentResult<()> {
        if self.layout.has_version_directories() {
            Ok(())
        }
        else {
            Err(ContentError::UnsupportedLayout(self.layout))
        }
    }

    fn project_directory(&self, reference: &ProjectReference) -> ContentResult<String> {
        self.require_version_directories()?;
        require_non_blank(&format!("{}:{}", reference.namespace, reference.project), &[
            ("namespace", reference.namespace.as_str()),
            ("project", reference.project.as_str()),
        ])?;
        Ok(paths::project_directory(&reference.namespace, &reference.project))
    }

    fn version_directory(&self, reference: &VersionedReference) -> ContentResult<String> {
        self.require_version_directories()?;
        require_non_blank(&format!("{}:{}:{}", reference.namespace, reference.project, reference.version), &[
            ("namespace", reference.namespace.as_str()),
            ("project", reference.project.as_str()),
            ("version", reference.version.as_str()),
        ])?;
        Ok(paths::version_directory(&reference.namespace, &reference.project, &reference.version))
    }

    fn group_directory(&self, namespace: &str) -> String {
        match self.layout {
            RepositoryLayout::Default => namespace.replace('.', "/"),
            RepositoryLayout::Legacy => namespace.to_string(),
        }
    }

    async fn require_directory(&self, directory: &str, purpose: &str) -> ContentResult<()> {
        if !self.storage.exists(directory).await? {
            return Err(ContentError::NotFound(format!(
                "unable to {} on a non-existent directory: {}", purpose, self.storage.resolve(directory))));
        }
        if !self.storage.is_container(directory).await? {
            return Err(ContentError::NotFound(format!(
                "unable to {} on a non-directory: {}", purpose, self.storage.resolve(directory))));
        }
        Ok(())
    }

    async fn list_files(&self, directory: &str) -> ContentResult<Vec<StorageEntry>> {
        Ok(self.storage.list(directory).await?
            .into_iter()
            .filter(|e| !e.is_container)
            .collect())
    }

    /// parsable artifact files directly inside a version directory
    async fn artifacts_in(&self, directory: &str) -> ContentResult<Vec<ArtifactCoordinate>> {
        let mut result = Vec::new();
        for entry in self.list_files(directory).await? {
            if self.file_types.matches_default_exclusions(&entry.path) || !self.file_types.matches_artifact_pattern(&entry.path) {
                continue;
            }
            match self.parse_relative(&entry.path) {
                Ok(coordinate) => result.push(coordinate),
                Err(e) => debug!("not processing file that is not an artifact: {}", e),
            }
        }
        Ok(result)
    }

    pub async fn has_artifact(&self, coordinate: &ArtifactCoordinate) -> bool {
        let path = match self.to_path(coordinate) {
            Ok(path) => path,
            Err(_) => return false,
        };

        match (self.storage.exists(&path).await, self.storage.is_container(&path).await) {
            (Ok(exists), Ok(is_container)) => exists && !is_container,
            (Err(e), _) | (_, Err(e)) => {
                warn!("error checking for artifact {}: {}", path, e);
                false
            }
        }
    }

    pub async fn has_project(&self, reference: &ProjectReference) -> bool {
        match self.project_versions(reference).await {
            Ok(versions) => !versions.is_empty(),
            Err(_) => false,
        }
    }

    pub async fn has_version(&self, reference: &VersionedReference) -> bool {
        match self.version_directory(reference) {
            Ok(directory) => self.require_directory(&directory, "check version").await.is_ok()
                && matches!(self.artifacts_in(&directory).await, Ok(artifacts) if !artifacts.is_empty()),
            Err(_) => false,
        }
    }

    /// Names of the project's version directories that contain at least one parsable artifact
    pub async fn project_versions(&self, reference: &ProjectReference) -> ContentResult<BTreeSet<String>> {
        let directory = self.project_directory(reference)?;
        self.require_directory(&directory, "get versions").await?;

        let mut result = BTreeSet::new();
        for entry in self.storage.list(&directory).await? {
            if !entry.is_container {
                continue;
            }
            match self.artifacts_in(&entry.path).await {
                Ok(artifacts) if !artifacts.is_empty() => {
                    result.insert(entry.name().to_string());
                }
                Ok(_) => {}
                Err(e) => warn!("skipping unreadable version directory {}: {}", self.storage.resolve(&entry.path), e),
            }
        }
        Ok(result)
    }

    /// Resolved versions of the artifacts in a version directory. For a snapshot directory these
    ///  are the individual timestamped versions.
    pub async fn resolved_versions(&self, reference: &VersionedReference) -> ContentResult<BTreeSet<String>> {
        let directory = self.version_directory(reference)?;
        self.require_directory(&directory, "get versions").await?;

        Ok(self.artifacts_in(&directory).await?
            .into_iter()
            .map(|c| c.version)
            .collect())
    }

    /// All files next to the given artifact that share its namespace, project and version
    pub async fn related_artifacts(&self, coordinate: &ArtifactCoordinate) -> ContentResult<HashSet<ArtifactCoordinate>> {
        let directory = self.version_directory(&coordinate.versioned_ref())?;
        self.require_directory(&directory, "get related artifacts").await?;

        let mut result = HashSet::new();
        for entry in self.list_files(&directory).await? {
            match self.parse_relative(&entry.path) {
                Ok(candidate) => {
                    if candidate.namespace == coordinate.namespace
                        && candidate.project == coordinate.project
                        && candidate.version == coordinate.version {
                        result.insert(candidate);
                    }
                }
                Err(e) => debug!("not processing file that is not an artifact: {}", e),
            }
        }
        Ok(result)
    }

    /// Deletes the artifact file and its `.md5` / `.sha1` sidecars
    pub async fn delete_artifact(&self, coordinate: &ArtifactCoordinate) -> ContentResult<()> {
        let path = self.to_path(coordinate)?;
        for candidate in [path.clone(), format!("{}.md5", path), format!("{}.sha1", path)] {
            if self.storage.exists(&candidate).await? {
                self.storage.delete(&candidate).await?;
            }
        }
        Ok(())
    }

    pub async fn delete_version(&self, reference: &VersionedReference) -> ContentResult<()> {
        let directory = self.version_directory(reference)?;
        if self.storage.is_container(&directory).await? {
            self.storage.delete(&directory).await?;
        }
        Ok(())
    }

    pub async fn delete_project(&self, reference: &ProjectReference) -> ContentResult<()> {
        let directory = self.project_directory(reference)?;
        if !self.storage.exists(&directory).await? {
            return Err(ContentError::NotFound(format!("cannot find project {}:{}", reference.namespace, reference.project)));
        }

        if self.storage.is_container(&directory).await? {
            self.storage.delete(&directory).await?;
        }
        else {
            warn!("project {}:{} is not a directory", reference.namespace, reference.project);
        }
        Ok(())
    }

    /// Bulk cleanup: failures are logged, never reported
    pub async fn delete_group(&self, namespace: &str) -> ContentResult<()> {
        if namespace.trim().is_empty() {
            return Err(MalformedPathError::new(namespace, "blank namespace").into());
        }

        let directory = self.group_directory(namespace);
        match self.storage.exists(&directory).await {
            Ok(true) => {
                if let Err(e) = self.storage.delete(&directory).await {
                    warn!("skip error deleting directory {}: {}", self.storage.resolve(&directory), e);
                }
            }
            Ok(false) => debug!("group directory {} does not exist", self.storage.resolve(&directory)),
            Err(e) => warn!("skip error deleting directory {}: {}", self.storage.resolve(&directory), e),
        }
        Ok(())
    }
}

/// Blank components would collapse path segments and address a parent directory
fn require_non_blank(description: &str, fields: &[(&str, &str)]) -> Result<(), MalformedPathError> {
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((name, _)) => Err(MalformedPathError::new(description, format!("blank {}", name))),
        None => Ok(()),
    }
}
