use lazy_static::lazy_static;
use regex::Regex;

use crate::error::MalformedPathError;
use crate::maven::artifact_mapping::ArtifactMappings;
use crate::maven::coordinates::*;

lazy_static! {
    static ref TIMESTAMP_REGEX: Regex = Regex::new(r"^(\d{8}\.\d{6})-(\d+).*$").unwrap();
}

pub const MAVEN_METADATA: &str = "maven-metadata.xml";

pub fn project_directory(namespace: &str, project: &str) -> String {
    format!("{}/{}", namespace.replace('.', "/"), project)
}

pub fn version_directory(namespace: &str, project: &str, base_version: &str) -> String {
    format!("{}/{}", project_directory(namespace, project), base_version)
}

/// `maven-metadata.xml` lives in the project directory, or in the version directory for
///  snapshot metadata
pub fn metadata_path(namespace: &str, project: &str, version: Option<&str>) -> String {
    match version {
        Some(v) => format!("{}/{}", version_directory(namespace, project, v), MAVEN_METADATA),
        None => format!("{}/{}", project_directory(namespace, project), MAVEN_METADATA),
    }
}

pub fn as_maven_path(coordinate: &ArtifactCoordinate) -> String {
    format!(
        "{}/{}",
        version_directory(&coordinate.namespace, &coordinate.project, &coordinate.base_version),
        maven_file_name(coordinate),
    )
}

/// `<project>-<version>[-<classifier>].<extension>`, the inverse of [parse_maven_filename]
pub fn maven_file_name(coordinate: &ArtifactCoordinate) -> String {
    let classifier_string = match &coordinate.classifier {
        None => "".to_string(),
        Some(c) => format!("-{}", c),
    };

    format!("{}-{}{}.{}",
            coordinate.project,
            coordinate.version,
            classifier_string,
            coordinate.extension,
    )
}

/// path is the relative path inside a maven repository, i.e. it starts with something like
///  "org/..." or "com/...". Backslashes are accepted as separators.
pub fn parse_maven_path(path: &str, mappings: &ArtifactMappings) -> Result<ArtifactCoordinate, MalformedPathError> {
    if path.trim().is_empty() {
        return Err(MalformedPathError::new(path, "blank path"));
    }

    let normalized = path.replace('\\', "/");
    let segments: Vec<&str> = normalized.split('/').collect();

    match segments.as_slice() {
        [group_segments @ .., artifact_id, base_version, file_name] if !group_segments.is_empty() => {
            if segments.iter().any(|s| s.is_empty()) {
                return Err(MalformedPathError::new(path, "empty path segment"));
            }

            let parsed = parse_maven_filename(file_name, artifact_id, base_version)
                .map_err(|reason| MalformedPathError::new(path, reason))?;

            let (extension, artifact_type) = match (parsed.extension, mappings.resolve_type(parsed.extension)) {
                (Some(extension), Some(artifact_type)) => (extension.to_string(), artifact_type),
                _ => return Err(MalformedPathError::new(path, "no type")),
            };

            Ok(ArtifactCoordinate {
                namespace: group_segments.join("."),
                project: artifact_id.to_string(),
                base_version: base_version.to_string(),
                version: parsed.version,
                classifier: parsed.classifier.map(|c| c.to_string()),
                extension,
                artifact_type,
                snapshot: parsed.snapshot,
                repository_id: None,
            })
        }
        _ => Err(MalformedPathError::new(path, "not enough directories")),
    }
}

/// Decomposes `<artifactId>-<version>[-<classifier>][.<extension>]`, where the file name's version
///  is either the directory's base version or, for a `-SNAPSHOT` directory, a timestamped
///  `<main>-<yyyyMMdd.HHmmss>-<buildNumber>` version. The build number is written without
///  leading zeros.
///
/// NB: the classifier ends at the first '.' after the version, so classifiers can not contain
///  dots, but extensions can (e.g. "tar.gz")
fn parse_maven_filename<'a>(file_name: &'a str, artifact_id: &str, base_version: &str) -> Result<ParseFilenameResult<'a>, String> {
    let rest = match file_name.strip_prefix(artifact_id).and_then(|s| s.strip_prefix('-')) {
        Some(rest) => rest,
        None => return Err(format!("filename doesn't start with artifact id '{}'", artifact_id)),
    };

    let scheme = VersionScheme::classify(base_version);

    let (version, snapshot) = if rest.starts_with(base_version) && scheme != VersionScheme::UniqueSnapshot {
        // releases and non-timestamped snapshots
        (base_version.to_string(), None)
    }
    else if scheme == VersionScheme::GenericSnapshot {
        // the '-' before the marker stays part of the main version
        let main_version_length = base_version.len() - SNAPSHOT_MARKER.len();
        if main_version_length == 0 {
            return Err("timestamped snapshot must contain main version".to_string());
        }

        let (main_version, captures) = match (rest.get(..main_version_length), rest.get(main_version_length..)) {
            (Some(main_version), Some(timestamped)) => (main_version, TIMESTAMP_REGEX.captures(timestamped)),
            _ => (rest, None),
        };
        let captures = captures
            .ok_or_else(|| format!("filename doesn't match timestamped snapshot '{}'", base_version))?;

        let timestamp = &captures[1];
        let build_number_string = &captures[2];
        let build_number = build_number_string.parse::<u32>()
            .map_err(|_| format!("build number out of range: {}", build_number_string))?;

        (
            format!("{}{}-{}", main_version, timestamp, build_number),
            Some(SnapshotBuild { timestamp: timestamp.to_string(), build_number }),
        )
    }
    else {
        return Err(format!("filename doesn't contain version '{}'", base_version));
    };

    let tail = match rest.get(version.len()..) {
        Some(tail) => tail,
        None => return Err(format!("filename doesn't contain version '{}'", version)),
    };

    let (classifier, extension) = if tail.is_empty() {
        (None, None)
    }
    else if let Some(classified) = tail.strip_prefix('-') {
        match classified.split_once('.') {
            Some((classifier, extension)) => (Some(classifier), Some(extension)),
            None => (Some(classified), None),
        }
    }
    else if let Some(extension) = tail.strip_prefix('.') {
        (None, Some(extension))
    }
    else {
        return Err(format!("expected classifier or extension but got '{}'", tail));
    };

    Ok(ParseFilenameResult {
        version,
        snapshot,
        classifier,
        extension,
    })
}

#[derive(Debug, Eq, PartialEq)]
struct ParseFilenameResult<'a> {
    version: String,
    snapshot: Option<SnapshotBuild>,
    classifier: Option<&'a str>,
    extension: Option<&'a str>, // without leading '.', e.g. "jar"
}
