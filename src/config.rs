//! Application configuration, read from an optional JSON file.
//!
//! ```json
//! {
//!   "repositories": [ { "id": "internal", "location": "/var/repo/internal", "layout": "default" } ],
//!   "file_types": { "artifact_patterns": ["**/*.jar", "**/*.pom"], "exclusions": [], "checksums_included": false },
//!   "artifact_mappings": [ { "jar": "java-library" } ],
//!   "scan_exclusions": ["**/*.txt"]
//! }
//! ```

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::file_types::{FileTypes, DEFAULT_ARTIFACT_PATTERNS};
use crate::maven::artifact_mapping::{ArtifactMappingProvider, ArtifactMappings, ConfiguredArtifactMappingProvider, DefaultArtifactMappingProvider};
use crate::maven::layout::RepositoryLayout;
use crate::maven::managed_repo::ManagedRepositoryContent;
use crate::storage::FsStorage;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub repositories: Vec<RepositoryConfig>,
    pub file_types: FileTypesConfig,
    /// consulted in order before the built-in mappings, first match wins
    pub artifact_mappings: Vec<HashMap<String, String>>,
    /// globs of files every scan skips
    pub scan_exclusions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    pub id: String,
    pub location: PathBuf,
    #[serde(default)]
    pub layout: RepositoryLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTypesConfig {
    pub artifact_patterns: Vec<String>,
    pub exclusions: Vec<String>,
    pub checksums_included: bool,
}
impl Default for FileTypesConfig {
    fn default() -> Self {
        FileTypesConfig {
            artifact_patterns: DEFAULT_ARTIFACT_PATTERNS.iter().map(|s| s.to_string()).collect(),
            exclusions: vec![],
            checksums_included: false,
        }
    }
}

impl AppConfig {
    /// A missing file yields the default configuration
    pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("no configuration at {}, using defaults", path.display());
                return Ok(AppConfig::default());
            }
            Err(e) => return Err(ConfigError::Io(path.display().to_string(), e)),
        };
        AppConfig::parse(&json)
            .map_err(|e| ConfigError::Json(path.display().to_string(), e))
    }

    pub fn parse(json: &str) -> Result<AppConfig, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn file_types(&self) -> Result<FileTypes, ConfigError> {
        let config = &self.file_types;
        Ok(FileTypes::new(&config.artifact_patterns, &config.exclusions, config.checksums_included)?)
    }

    pub fn artifact_mappings(&self) -> ArtifactMappings {
        let mut providers: Vec<Arc<dyn ArtifactMappingProvider>> = self.artifact_mappings.iter()
            .map(|m| Arc::new(ConfiguredArtifactMappingProvider::new(m.clone())) as Arc<dyn ArtifactMappingProvider>)
            .collect();
        providers.push(Arc::new(DefaultArtifactMappingProvider::default()));
        ArtifactMappings::new(providers)
    }

    pub fn repository(&self, id: &str) -> Result<&RepositoryConfig, ConfigError> {
        self.repositories.iter()
            .find(|r| r.id == id)
            .ok_or_else(|| ConfigError::UnknownRepository(id.to_string()))
    }

    /// Repository content for a configured repository, backed by the file system
    pub fn managed_repository(&self, id: &str) -> Result<ManagedRepositoryContent, ConfigError> {
        let repository = self.repository(id)?;
        Ok(ManagedRepositoryContent::new(
            &repository.id,
            repository.layout,
            Arc::new(FsStorage::new(&repository.location)),
            Arc::new(self.file_types()?),
        ).with_mappings(self.artifact_mappings()))
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use crate::storage::RepositoryStorage;

    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("arti-repo.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(config.file_types().unwrap().matches_artifact_pattern("a/b/1.0/b-1.0.jar"));
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{
            "repositories": [
                {{ "id": "internal", "location": "/var/repo/internal" }},
                {{ "id": "old", "location": "/var/repo/old", "layout": "legacy" }}
            ],
            "file_types": {{ "checksums_included": true }},
            "artifact_mappings": [ {{ "jar": "java-library" }} ],
            "scan_exclusions": ["**/*.txt"]
        }}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.repository("internal").unwrap().layout, RepositoryLayout::Default);
        assert_eq!(config.repository("old").unwrap().layout, RepositoryLayout::Legacy);
        assert_eq!(config.scan_exclusions, vec!["**/*.txt"]);
        assert_eq!(config.file_types.artifact_patterns.len(), DEFAULT_ARTIFACT_PATTERNS.len());

        let file_types = config.file_types().unwrap();
        assert!(!file_types.matches_default_exclusions("a/b/1.0/b-1.0.jar.sha1"));

        let mappings = config.artifact_mappings();
        assert_eq!(mappings.resolve_type(Some("jar")), Some("java-library".to_string()));
        assert_eq!(mappings.resolve_type(Some("tar.gz")), Some("distribution-tgz".to_string()));
        assert_eq!(mappings.resolve_type(Some("pom")), Some("pom".to_string()));
    }

    #[test]
    fn test_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"repositories\": 17 }}").unwrap();
        assert!(matches!(AppConfig::load(file.path()), Err(ConfigError::Json(_, _))));
    }

    #[test]
    fn test_unknown_repository() {
        let config = AppConfig::default();
        assert!(matches!(config.managed_repository("nope"), Err(ConfigError::UnknownRepository(_))));
    }

    #[test]
    fn test_managed_repository() {
        let config = AppConfig::parse(r#"{ "repositories": [ { "id": "internal", "location": "/var/repo/internal" } ] }"#).unwrap();
        let repository = config.managed_repository("internal").unwrap();
        assert_eq!(repository.id(), "internal");
        assert_eq!(repository.storage().location(), "/var/repo/internal");
    }
}
