use std::path::Path;

use arti_repo::converter::LegacyRepositoryConverter;
use arti_repo::error::RepositoryConversionError;
use tempfile::TempDir;

fn create(root: &Path, files: &[(&str, &str)]) {
    for (f, content) in files {
        let path = root.join(f);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
}

#[tokio::test]
async fn test_convert() {
    let legacy = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    create(legacy.path(), &[
        ("org.example/jars/foo-1.0.jar", "foo jar"),
        ("org.example/jars/foo-1.0.jar.md5", "d41d8cd98f00b204e9800998ecf8427e"),
        ("org.example/poms/foo-1.0.pom", "<project/>"),
        ("org.example/java-sources/foo-1.0-sources.jar", "foo sources"),
        ("org.example/jars/bar-2.1-SNAPSHOT.jar", "bar jar"),
        ("org.example/jars/baz-0.9.jar", "baz jar"),
        ("org.example/README.txt", "ignored"),
        ("bogus.jar", "not an artifact"),
    ]);

    let report = LegacyRepositoryConverter::default()
        .convert(legacy.path(), destination.path(), &["**/baz-*".to_string()])
        .await
        .unwrap();

    assert_eq!(report.converted, 4);
    assert_eq!(report.summary.files_rejected, 1);

    let read = |p: &str| std::fs::read_to_string(destination.path().join(p)).unwrap();
    assert_eq!(read("org/example/foo/1.0/foo-1.0.jar"), "foo jar");
    assert_eq!(read("org/example/foo/1.0/foo-1.0.jar.md5"), "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(read("org/example/foo/1.0/foo-1.0.pom"), "<project/>");
    assert_eq!(read("org/example/foo/1.0/foo-1.0-sources.jar"), "foo sources");
    assert_eq!(read("org/example/bar/2.1-SNAPSHOT/bar-2.1-SNAPSHOT.jar"), "bar jar");
    assert!(!destination.path().join("org/example/baz").exists());
    assert!(!destination.path().join("bogus.jar").exists());

    // the legacy repository is left untouched
    assert!(legacy.path().join("org.example/jars/foo-1.0.jar").exists());
}

#[tokio::test]
async fn test_convert_missing_legacy_repository() {
    let legacy = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();

    let result = LegacyRepositoryConverter::default()
        .convert(&legacy.path().join("missing"), destination.path(), &[])
        .await;
    assert!(matches!(result, Err(RepositoryConversionError::Scan(_))));
}

#[tokio::test]
async fn test_convert_reports_copy_failures() {
    let legacy = TempDir::new().unwrap();
    let destination = TempDir::new().unwrap();
    create(legacy.path(), &[("org.example/jars/foo-1.0.jar", "foo jar")]);
    // a file where the target directory has to go
    create(destination.path(), &[("org", "in the way")]);

    let result = LegacyRepositoryConverter::default()
        .convert(legacy.path(), destination.path(), &[])
        .await;
    match result {
        Err(RepositoryConversionError::Copy { failures }) => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].starts_with("org.example/jars/foo-1.0.jar"));
        }
        other => panic!("expected copy failure, got {:?}", other),
    }
}
