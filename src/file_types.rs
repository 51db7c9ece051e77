//! File type policy: which relative paths look like artifacts, and which are never of interest.
//!
//! Patterns are ant-style globs: `*` stays within one directory, `**` spans directories.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use lazy_static::lazy_static;

pub const DEFAULT_ARTIFACT_PATTERNS: &[&str] = &[
    "**/*.pom",
    "**/*.jar",
    "**/*.war",
    "**/*.ear",
    "**/*.car",
    "**/*.sar",
    "**/*.mar",
    "**/*.rar",
    "**/*.aar",
    "**/*.nbm",
    "**/*.dtd",
    "**/*.tld",
    "**/*.zip",
    "**/*.tar.gz",
    "**/*.tar.bz2",
];

const VCS_EXCLUSIONS: &[&str] = &[
    "**/.svn/**",
    "**/.git/**",
    "**/.hg/**",
    "**/CVS/**",
    "**/.DAV/**",
];

const LOCK_EXCLUSIONS: &[&str] = &[
    "**/*.lock",
    "**/*.lck",
    // in-flight writes and deletes of FsStorage
    "**/.*.inserting",
    "**/.*.deleting",
];

const CHECKSUM_EXCLUSIONS: &[&str] = &[
    "**/*.md5",
    "**/*.sha1",
    "**/*.sha256",
    "**/*.sha512",
    "**/*.asc",
];

/// Content of a repository that a scan has no business looking at
pub const IGNORABLE_CONTENT: &[&str] = &[
    "bin/**",
    "reports/**",
    ".index",
    ".reports/**",
    ".maven/**",
    "**/*.md5",
    "**/*.MD5",
    "**/*.sha1",
    "**/*.SHA1",
    "**/*snapshot-version",
    "*/website/**",
    "*/licenses/**",
    "*/licences/**",
    "**/.htaccess",
    "**/*.html",
    "**/*.txt",
    "**/README*",
    "**/CHANGELOG*",
    "**/KEYS*",
];

lazy_static! {
    static ref DEFAULT_FILE_TYPES: FileTypes = FileTypes::new(DEFAULT_ARTIFACT_PATTERNS, &[], false).unwrap();
}

/// A compiled set of path globs, matched against '/' separated relative paths
#[derive(Debug, Clone)]
pub struct PathPatterns {
    glob_set: GlobSet,
}
impl PathPatterns {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<PathPatterns, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if !pattern.is_empty() {
                builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
            }
        }
        Ok(PathPatterns {
            glob_set: builder.build()?,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.glob_set.is_match(path)
    }
}

#[derive(Debug, Clone)]
pub struct FileTypes {
    artifact_patterns: PathPatterns,
    default_exclusions: PathPatterns,
}
impl FileTypes {
    /// `extra_exclusions` are added to the built-in version control, lock file and (unless
    ///  `checksums_included`) checksum exclusions.
    pub fn new<S: AsRef<str>>(artifact_patterns: &[S], extra_exclusions: &[S], checksums_included: bool) -> Result<FileTypes, globset::Error> {
        let mut exclusions: Vec<&str> = VCS_EXCLUSIONS.iter()
            .chain(LOCK_EXCLUSIONS.iter())
            .copied()
            .collect();
        if !checksums_included {
            exclusions.extend(CHECKSUM_EXCLUSIONS.iter());
        }
        exclusions.extend(extra_exclusions.iter().map(|s| s.as_ref()));

        Ok(FileTypes {
            artifact_patterns: PathPatterns::new(artifact_patterns)?,
            default_exclusions: PathPatterns::new(&exclusions)?,
        })
    }

    pub fn with_checksums_included() -> FileTypes {
        let mut result = FileTypes::default();
        result.default_exclusions = DEFAULT_CHECKSUMS_INCLUDED.clone();
        result
    }

    pub fn matches_artifact_pattern(&self, path: &str) -> bool {
        self.artifact_patterns.matches(path)
    }

    pub fn matches_default_exclusions(&self, path: &str) -> bool {
        self.default_exclusions.matches(path)
    }
}
impl Default for FileTypes {
    fn default() -> Self {
        DEFAULT_FILE_TYPES.clone()
    }
}

lazy_static! {
    static ref DEFAULT_CHECKSUMS_INCLUDED: PathPatterns = PathPatterns::new(
        &VCS_EXCLUSIONS.iter().chain(LOCK_EXCLUSIONS.iter()).copied().collect::<Vec<_>>()
    ).unwrap();
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case::jar("org/example/foo/1.0/foo-1.0.jar", true)]
    #[case::pom("foo-1.0.pom", true)]
    #[case::tarball("org/example/foo/1.0/foo-1.0-bin.tar.gz", true)]
    #[case::metadata("org/example/foo/maven-metadata.xml", false)]
    #[case::checksum("org/example/foo/1.0/foo-1.0.jar.sha1", false)]
    #[case::text("org/example/foo/1.0/notes.txt", false)]
    fn test_artifact_pattern(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(FileTypes::default().matches_artifact_pattern(path), expected);
    }

    #[rstest]
    #[case::svn("org/example/.svn/entries", true)]
    #[case::git_root(".git/config", true)]
    #[case::lock("org/example/foo/1.0/foo-1.0.jar.lock", true)]
    #[case::md5("org/example/foo/1.0/foo-1.0.jar.md5", true)]
    #[case::sha1("org/example/foo/1.0/foo-1.0.jar.sha1", true)]
    #[case::in_flight("org/example/foo/1.0/.foo-1.0.jar.0c5a.inserting", true)]
    #[case::jar("org/example/foo/1.0/foo-1.0.jar", false)]
    fn test_default_exclusions(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(FileTypes::default().matches_default_exclusions(path), expected);
    }

    #[test]
    fn test_checksums_included() {
        let file_types = FileTypes::with_checksums_included();
        assert!(!file_types.matches_default_exclusions("org/example/foo/1.0/foo-1.0.jar.sha1"));
        assert!(file_types.matches_default_exclusions("org/example/.svn/entries"));
    }

    #[test]
    fn test_extra_exclusions() {
        let file_types = FileTypes::new(DEFAULT_ARTIFACT_PATTERNS, &["**/scratch/**"], false).unwrap();
        assert!(file_types.matches_default_exclusions("org/example/foo/scratch/foo-1.0.jar"));
    }

    #[test]
    fn test_single_star_stays_in_directory() {
        let patterns = PathPatterns::new(&["*/website/**"]).unwrap();
        assert!(patterns.matches("maven/website/index.html"));
        assert!(!patterns.matches("org/maven/website/index.html"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PathPatterns::new(&["a/[b"]).is_err());
    }
}
