//! The legacy (Maven 1) repository layout:
//!  `<groupId>/<type>s/<artifactId>-<version>[-<classifier>].<extension>`
//!
//! The group id is a single directory with its dots kept. There are no version directories, and
//!  classifiers only exist where the type directory implies them (e.g. `java-sources`).

use crate::error::MalformedPathError;
use crate::maven::coordinates::{ArtifactCoordinate, SNAPSHOT_MARKER};
use crate::maven::paths::maven_file_name;

struct TypeDirectory {
    directory: &'static str,
    artifact_type: &'static str,
    extension: &'static str,
    classifier: Option<&'static str>,
}

const TYPE_DIRECTORIES: &[TypeDirectory] = &[
    TypeDirectory { directory: "jars", artifact_type: "jar", extension: "jar", classifier: None },
    TypeDirectory { directory: "poms", artifact_type: "pom", extension: "pom", classifier: None },
    TypeDirectory { directory: "ejbs", artifact_type: "ejb", extension: "jar", classifier: None },
    TypeDirectory { directory: "plugins", artifact_type: "maven-plugin", extension: "jar", classifier: None },
    TypeDirectory { directory: "java-sources", artifact_type: "java-source", extension: "jar", classifier: Some("sources") },
    TypeDirectory { directory: "javadocs", artifact_type: "javadoc", extension: "jar", classifier: Some("javadoc") },
];

const DISTRIBUTIONS_DIRECTORY: &str = "distributions";

/// (extension, type) - longest extensions first so that "tar.gz" is not mistaken for "gz"
const DISTRIBUTION_EXTENSIONS: &[(&str, &str)] = &[
    ("tar.gz", "distribution-tgz"),
    ("tar.bz2", "distribution-bzip"),
    ("zip", "distribution-zip"),
];

pub fn as_legacy_path(coordinate: &ArtifactCoordinate) -> String {
    format!(
        "{}/{}/{}",
        coordinate.namespace,
        legacy_type_directory(&coordinate.artifact_type),
        maven_file_name(coordinate),
    )
}

fn legacy_type_directory(artifact_type: &str) -> String {
    if let Some(known) = TYPE_DIRECTORIES.iter().find(|t| t.artifact_type == artifact_type) {
        return known.directory.to_string();
    }
    if DISTRIBUTION_EXTENSIONS.iter().any(|(_, t)| *t == artifact_type) {
        return DISTRIBUTIONS_DIRECTORY.to_string();
    }
    format!("{}s", artifact_type)
}

pub fn parse_legacy_path(path: &str) -> Result<ArtifactCoordinate, MalformedPathError> {
    if path.trim().is_empty() {
        return Err(MalformedPathError::new(path, "blank path"));
    }

    let normalized = path.replace('\\', "/");
    let segments: Vec<&str> = normalized.split('/').collect();

    let (group_id, type_directory, file_name) = match segments.as_slice() {
        [group_id, type_directory, file_name] => (*group_id, *type_directory, *file_name),
        _ => return Err(MalformedPathError::new(path, "expected <groupId>/<type>s/<filename>")),
    };
    if group_id.is_empty() || file_name.is_empty() {
        return Err(MalformedPathError::new(path, "empty path segment"));
    }

    let (artifact_type, extension, classifier) = resolve_type_directory(type_directory, file_name)
        .map_err(|reason| MalformedPathError::new(path, reason))?;

    let stem = file_name.strip_suffix(extension.as_str())
        .and_then(|s| s.strip_suffix('.'))
        .ok_or_else(|| MalformedPathError::new(path, format!("filename doesn't end with extension '{}'", extension)))?;

    let stem = match classifier {
        Some(c) => stem.strip_suffix(c)
            .and_then(|s| s.strip_suffix('-'))
            .ok_or_else(|| MalformedPathError::new(path, format!("filename doesn't end with classifier '{}'", c)))?,
        None => stem,
    };

    let (artifact_id, version) = split_artifact_and_version(stem)
        .ok_or_else(|| MalformedPathError::new(path, "filename doesn't contain version"))?;

    let mut coordinate = ArtifactCoordinate::new(group_id, artifact_id, version, &extension)
        .with_type(&artifact_type);
    coordinate.classifier = classifier.map(|c| c.to_string());
    Ok(coordinate)
}

/// (type, extension, implied classifier)
fn resolve_type_directory(type_directory: &str, file_name: &str) -> Result<(String, String, Option<&'static str>), String> {
    if type_directory == DISTRIBUTIONS_DIRECTORY {
        return DISTRIBUTION_EXTENSIONS.iter()
            .find(|(extension, _)| file_name.ends_with(&format!(".{}", extension)))
            .map(|(extension, artifact_type)| (artifact_type.to_string(), extension.to_string(), None))
            .ok_or_else(|| format!("unsupported distribution file '{}'", file_name));
    }

    if let Some(known) = TYPE_DIRECTORIES.iter().find(|t| t.directory == type_directory) {
        return Ok((known.artifact_type.to_string(), known.extension.to_string(), known.classifier));
    }

    match type_directory.strip_suffix('s') {
        Some(t) if !t.is_empty() => Ok((t.to_string(), t.to_string(), None)),
        _ => Err(format!("'{}' is not a type directory", type_directory)),
    }
}

/// The version starts after the first '-' that is followed by a digit or by the snapshot marker
fn split_artifact_and_version(stem: &str) -> Option<(&str, &str)> {
    stem.match_indices('-')
        .map(|(idx, _)| stem.split_at(idx))
        .map(|(artifact_id, rest)| (artifact_id, rest.strip_prefix('-').unwrap_or(rest)))
        .find(|(artifact_id, version)| {
            !artifact_id.is_empty()
                && (version.starts_with(|c: char| c.is_ascii_digit()) || version.starts_with(SNAPSHOT_MARKER))
        })
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::jar("org.apache.maven/jars/maven-model-1.0.jar", "org.apache.maven", "maven-model", "1.0", None, "jar", "jar")]
    #[case::pom("org.apache.maven/poms/maven-model-1.0.pom", "org.apache.maven", "maven-model", "1.0", None, "pom", "pom")]
    #[case::ejb("com.acme/ejbs/billing-2.3.jar", "com.acme", "billing", "2.3", None, "jar", "ejb")]
    #[case::plugin("maven/plugins/maven-java-plugin-1.5.jar", "maven", "maven-java-plugin", "1.5", None, "jar", "maven-plugin")]
    #[case::sources("commons-lang/java-sources/commons-lang-2.1-sources.jar", "commons-lang", "commons-lang", "2.1", Some("sources"), "jar", "java-source")]
    #[case::javadoc("commons-lang/javadocs/commons-lang-2.1-javadoc.jar", "commons-lang", "commons-lang", "2.1", Some("javadoc"), "jar", "javadoc")]
    #[case::distribution("maven/distributions/maven-1.0-beta-3.tar.gz", "maven", "maven", "1.0-beta-3", None, "tar.gz", "distribution-tgz")]
    #[case::distribution_zip("maven/distributions/maven-1.0.zip", "maven", "maven", "1.0", None, "zip", "distribution-zip")]
    #[case::generic_type("org.example/wars/webapp-0.9.war", "org.example", "webapp", "0.9", None, "war", "war")]
    #[case::snapshot("org.example/jars/foo-SNAPSHOT.jar", "org.example", "foo", "SNAPSHOT", None, "jar", "jar")]
    #[case::generic_snapshot("org.example/jars/foo-1.0-SNAPSHOT.jar", "org.example", "foo", "1.0-SNAPSHOT", None, "jar", "jar")]
    #[case::digit_in_artifact("org.example/jars/foo2-bar-1.0.jar", "org.example", "foo2-bar", "1.0", None, "jar", "jar")]
    fn test_parse_legacy_path(
        #[case] path: &str,
        #[case] namespace: &str,
        #[case] project: &str,
        #[case] version: &str,
        #[case] classifier: Option<&str>,
        #[case] extension: &str,
        #[case] artifact_type: &str,
    ) {
        let coordinate = parse_legacy_path(path).unwrap();

        assert_eq!(coordinate.namespace, namespace);
        assert_eq!(coordinate.project, project);
        assert_eq!(coordinate.version, version);
        assert_eq!(coordinate.classifier.as_deref(), classifier);
        assert_eq!(coordinate.extension, extension);
        assert_eq!(coordinate.artifact_type, artifact_type);

        assert_eq!(as_legacy_path(&coordinate), path);
    }

    #[test]
    fn test_parse_legacy_unique_snapshot() {
        let coordinate = parse_legacy_path("org.example/jars/foo-1.0-20050611.112233-1.jar").unwrap();
        assert_eq!(coordinate.version, "1.0-20050611.112233-1");
        assert_eq!(coordinate.base_version, "1.0-SNAPSHOT");
        assert_eq!(coordinate.snapshot.map(|s| s.build_number), Some(1));
    }

    #[rstest]
    #[case::too_many_segments("org/example/foo/1.0/foo-1.0.jar")]
    #[case::too_few_segments("jars/foo-1.0.jar")]
    #[case::blank("")]
    #[case::not_a_type_directory("org.example/stuff/foo-1.0.jar")]
    #[case::wrong_extension("org.example/jars/foo-1.0.pom")]
    #[case::missing_classifier("commons-lang/java-sources/commons-lang-2.1.jar")]
    #[case::no_version("org.example/jars/foo.jar")]
    #[case::only_version("org.example/jars/-1.0.jar")]
    #[case::unknown_distribution("maven/distributions/maven-1.0.rpm")]
    fn test_parse_legacy_path_malformed(#[case] path: &str) {
        assert!(parse_legacy_path(path).is_err());
    }
}
