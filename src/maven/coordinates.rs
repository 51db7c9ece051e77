use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    static ref UNIQUE_SNAPSHOT_REGEX: Regex = Regex::new(r"^(.*)-(\d{8}\.\d{6})-(\d+)$").unwrap();
}

/// Literal marker at the end of a generic snapshot version
pub const SNAPSHOT_MARKER: &str = "SNAPSHOT";

/// Classification of a version string. This is a pure function of the string, nothing is stored.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum VersionScheme {
    Release,
    /// `<main>-SNAPSHOT`
    GenericSnapshot,
    /// `<main>-<yyyyMMdd.HHmmss>-<buildNumber>`
    UniqueSnapshot,
}
impl VersionScheme {
    pub fn classify(version: &str) -> VersionScheme {
        if UNIQUE_SNAPSHOT_REGEX.is_match(version) {
            VersionScheme::UniqueSnapshot
        }
        else if version.ends_with(SNAPSHOT_MARKER) {
            VersionScheme::GenericSnapshot
        }
        else {
            VersionScheme::Release
        }
    }
}

/// Maps a unique snapshot version to the generic snapshot version of the directory it lives in,
///  e.g. `1.0-20230101.120000-3` to `1.0-SNAPSHOT`. Other versions are returned unchanged.
pub fn base_version_of(version: &str) -> String {
    match UNIQUE_SNAPSHOT_REGEX.captures(version) {
        Some(c) => format!("{}-{}", &c[1], SNAPSHOT_MARKER),
        None => version.to_string(),
    }
}

#[derive(Debug, Eq, PartialEq, Hash, Clone, Serialize)]
pub struct SnapshotBuild {
    /// `yyyyMMdd.HHmmss`
    pub timestamp: String,
    pub build_number: u32,
}

/// Structured identity of a single file in a repository.
///
/// `repository_id` is informational only and does not take part in equality or hashing.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactCoordinate {
    /// dot separated, e.g. `org.apache.maven`
    pub namespace: String,
    pub project: String,
    /// version as declared by the containing directory
    pub base_version: String,
    /// resolved version: differs from `base_version` only for timestamped snapshots
    pub version: String,
    pub classifier: Option<String>,
    /// file extension without the leading '.', e.g. "jar" or "tar.gz"
    pub extension: String,
    pub artifact_type: String,
    pub snapshot: Option<SnapshotBuild>,
    pub repository_id: Option<String>,
}

impl ArtifactCoordinate {
    /// Coordinate for a plain (unclassified) artifact whose type equals its extension.
    pub fn new(namespace: &str, project: &str, version: &str, extension: &str) -> ArtifactCoordinate {
        let snapshot = UNIQUE_SNAPSHOT_REGEX.captures(version)
            .and_then(|c| Some(SnapshotBuild {
                timestamp: c[2].to_string(),
                build_number: c[3].parse().ok()?,
            }));

        ArtifactCoordinate {
            namespace: namespace.to_string(),
            project: project.to_string(),
            base_version: base_version_of(version),
            version: version.to_string(),
            classifier: None,
            extension: extension.to_string(),
            artifact_type: extension.to_string(),
            snapshot,
            repository_id: None,
        }
    }

    pub fn with_classifier(mut self, classifier: &str) -> ArtifactCoordinate {
        self.classifier = Some(classifier.to_string());
        self
    }

    pub fn with_type(mut self, artifact_type: &str) -> ArtifactCoordinate {
        self.artifact_type = artifact_type.to_string();
        self
    }

    pub fn versioned_ref(&self) -> VersionedReference {
        VersionedReference::new(&self.namespace, &self.project, &self.base_version)
    }

    fn identity(&self) -> (&str, &str, &str, &str, Option<&str>, &str, &str) {
        (
            &self.namespace,
            &self.project,
            &self.base_version,
            &self.version,
            self.classifier.as_deref(),
            &self.extension,
            &self.artifact_type,
        )
    }
}

impl PartialEq for ArtifactCoordinate {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for ArtifactCoordinate {}

impl Hash for ArtifactCoordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.project, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        write!(f, ":{}", self.artifact_type)
    }
}

#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct ProjectReference {
    pub namespace: String,
    pub project: String,
}
impl ProjectReference {
    pub fn new(namespace: &str, project: &str) -> ProjectReference {
        ProjectReference {
            namespace: namespace.to_string(),
            project: project.to_string(),
        }
    }
}

/// A project at a base version, i.e. a version directory in the default layout
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct VersionedReference {
    pub namespace: String,
    pub project: String,
    pub version: String,
}
impl VersionedReference {
    pub fn new(namespace: &str, project: &str, version: &str) -> VersionedReference {
        VersionedReference {
            namespace: namespace.to_string(),
            project: project.to_string(),
            version: version.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::release("1.0.0", VersionScheme::Release)]
    #[case::release_qualifier("1.0-beta-2", VersionScheme::Release)]
    #[case::generic("1.0-SNAPSHOT", VersionScheme::GenericSnapshot)]
    #[case::generic_bare("SNAPSHOT", VersionScheme::GenericSnapshot)]
    #[case::unique("1.0-20230101.120000-3", VersionScheme::UniqueSnapshot)]
    #[case::unique_no_main("-20230101.120000-3", VersionScheme::UniqueSnapshot)]
    #[case::lowercase_marker("1.0-snapshot", VersionScheme::Release)]
    #[case::short_timestamp("1.0-2023010.120000-3", VersionScheme::Release)]
    fn test_classify(#[case] version: &str, #[case] expected: VersionScheme) {
        assert_eq!(VersionScheme::classify(version), expected);
    }

    #[test]
    fn test_base_version() {
        assert_eq!(base_version_of("1.0-20230101.120000-3"), "1.0-SNAPSHOT");
        assert_eq!(base_version_of("1.0-SNAPSHOT"), "1.0-SNAPSHOT");
        assert_eq!(base_version_of("2.1"), "2.1");
    }

    #[test]
    fn test_new_unique_snapshot() {
        let coordinate = ArtifactCoordinate::new("org.example", "foo", "1.0-20230101.120000-3", "jar");
        assert_eq!(coordinate.base_version, "1.0-SNAPSHOT");
        assert_eq!(coordinate.snapshot, Some(SnapshotBuild { timestamp: "20230101.120000".to_string(), build_number: 3 }));
    }

    #[test]
    fn test_equality_ignores_repository_id() {
        let mut a = ArtifactCoordinate::new("org.example", "foo", "1.0", "jar");
        let b = a.clone();
        a.repository_id = Some("internal".to_string());
        assert_eq!(a, b);

        let c = b.clone().with_classifier("sources");
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let coordinate = ArtifactCoordinate::new("org.example", "foo", "1.0", "jar").with_classifier("sources");
        assert_eq!(coordinate.to_string(), "org.example:foo:1.0:sources:jar");
    }
}
