//! Tests for discovery, naming and upload planning

use std::fs;
use std::path::{Path, PathBuf};

use collection_uploader::config::{Config, ConfigOptions, Credentials};
use collection_uploader::discovery::{discover_files, document_name, resolve_roots, SkipRules};
use collection_uploader::upload::plan_uploads;
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, content: &[u8]) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn test_config(sources: Vec<PathBuf>, options: ConfigOptions) -> std::sync::Arc<Config> {
    Config::new(
        "collection_123".to_string(),
        sources,
        Credentials::new("api-key".to_string(), None).unwrap(),
        options,
    )
    .unwrap()
}

#[test]
fn test_document_name_examples() {
    let roots = vec![PathBuf::from("/a/b")];
    assert_eq!(document_name(Path::new("/a/b/c/d.txt"), &roots), "b/c/d.txt");
    assert_eq!(
        document_name(Path::new("/x/y/z.txt"), &roots),
        "files/z.txt"
    );
}

#[test]
fn test_discover_applies_skip_rules() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("docs");
    write_file(&root, "keep.txt", b"hello");
    write_file(&root, "nested/deep/keep.pdf", b"%PDF");
    write_file(&root, ".hidden", b"secret");
    write_file(&root, "nested/.env", b"KEY=1");
    write_file(&root, "debug.LOG", b"log line");
    write_file(&root, "big.bin", &[0u8; 4096]);

    let rules = SkipRules::new([".log", ".env"], Some(1024));
    let files = discover_files(&resolve_roots(&[root.clone()]), &rules);

    let mut names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["keep.pdf", "keep.txt"]);
}

#[test]
fn test_overlapping_roots_upload_each_file_once() {
    let dir = TempDir::new().unwrap();
    let outer = dir.path().join("archive");
    let inner = outer.join("vol08");
    write_file(&outer, "top.txt", b"1");
    write_file(&inner, "a/inner.txt", b"2");

    let config = test_config(vec![outer.clone(), inner.clone()], ConfigOptions::default());
    let tasks = plan_uploads(&config);

    assert_eq!(tasks.len(), 2);
    let mut names: Vec<&str> = tasks.iter().map(|t| t.document_name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["archive/top.txt", "vol08/a/inner.txt"]);
    assert!(tasks.iter().all(|t| t.collection_id == "collection_123"));
}

#[test]
fn test_same_root_listed_twice_is_deduplicated() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("data");
    write_file(&root, "one.txt", b"1");
    write_file(&root, "two.txt", b"2");

    let alias = root.join("..").join("data");
    let config = test_config(vec![root.clone(), alias], ConfigOptions::default());
    assert_eq!(plan_uploads(&config).len(), 2);
}

#[test]
fn test_plan_uses_posix_separators_and_resolved_sources() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("library");
    let file = write_file(&root, "2024/q1/report.md", b"# report");

    let config = test_config(vec![root.clone()], ConfigOptions::default());
    let tasks = plan_uploads(&config);

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].document_name, "library/2024/q1/report.md");
    assert_eq!(tasks[0].source, fs::canonicalize(file).unwrap());
}

#[test]
fn test_plan_respects_configured_extensions_and_size() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("in");
    write_file(&root, "a.csv", b"x,y");
    write_file(&root, "b.txt", b"text");
    write_file(&root, "c.txt", &[b'x'; 200]);

    let config = test_config(
        vec![root],
        ConfigOptions {
            skip_extensions: vec!["csv".to_string()],
            max_file_size: Some(100),
            ..Default::default()
        },
    );
    let tasks = plan_uploads(&config);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].document_name, "in/b.txt");
}

#[test]
fn test_empty_directory_plans_nothing() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("empty");
    fs::create_dir_all(&root).unwrap();

    let config = test_config(vec![root], ConfigOptions::default());
    assert!(plan_uploads(&config).is_empty());
}

#[test]
fn test_default_rules_keep_dotted_local_names() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("cfg");
    write_file(&root, "settings.local", b"debug = true");
    write_file(&root, "build.log", b"noise");

    let config = test_config(vec![root], ConfigOptions::default());
    let tasks = plan_uploads(&config);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].document_name, "cfg/settings.local");
}
