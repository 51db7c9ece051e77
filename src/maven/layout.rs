use serde::{Deserialize, Serialize};

use crate::error::MalformedPathError;
use crate::maven::artifact_mapping::ArtifactMappings;
use crate::maven::coordinates::ArtifactCoordinate;
use crate::maven::legacy_paths::{as_legacy_path, parse_legacy_path};
use crate::maven::paths::{as_maven_path, parse_maven_path};

/// The convention mapping coordinates to paths inside a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryLayout {
    /// `<group/as/dirs>/<artifactId>/<baseVersion>/<artifactId>-<version>[-<classifier>].<ext>`
    #[default]
    Default,
    /// `<groupId>/<type>s/<artifactId>-<version>[-<classifier>].<ext>`
    Legacy,
}

impl RepositoryLayout {
    /// Artifact mappings only apply to the default layout, legacy types come from the type
    ///  directory.
    pub fn parse_path(&self, path: &str, mappings: &ArtifactMappings) -> Result<ArtifactCoordinate, MalformedPathError> {
        match self {
            RepositoryLayout::Default => parse_maven_path(path, mappings),
            RepositoryLayout::Legacy => parse_legacy_path(path),
        }
    }

    pub fn format_path(&self, coordinate: &ArtifactCoordinate) -> String {
        match self {
            RepositoryLayout::Default => as_maven_path(coordinate),
            RepositoryLayout::Legacy => as_legacy_path(coordinate),
        }
    }

    /// Only the default layout has project and version directories
    pub fn has_version_directories(&self) -> bool {
        *self == RepositoryLayout::Default
    }
}
