use httpreturncheck::infrastructure::project_loader::ProjectLoader;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn walks_go_files_and_skips_go_tool_ignored_dirs() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "main.go", "package main\n");
    write(root, "internal/api/handler.go", "package api\n");
    write(root, "internal/api/handler_test.go", "package api\n");
    write(root, "internal/api/README.md", "# api\n");
    write(root, "vendor/dep/dep.go", "package dep\n");
    write(root, "testdata/fixture.go", "package fixture\n");
    write(root, ".git/hooks/x.go", "package x\n");
    write(root, "_old/legacy.go", "package legacy\n");

    let files = ProjectLoader::collect_go_files(root).unwrap();
    let rel: Vec<String> = files
        .iter()
        .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        rel,
        vec![
            "internal/api/handler.go",
            "internal/api/handler_test.go",
            "main.go"
        ]
    );
}

#[test]
fn load_mixes_files_and_folders_without_duplicates() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "a.go", "package a\n");
    write(root, "sub/b.go", "package b\n");

    let loaded = ProjectLoader::load(&[
        root.join("a.go"),
        root.to_path_buf(),
        root.join("missing.go"),
    ]);
    assert_eq!(loaded.units.len(), 2);
    assert!(loaded.units[0].path.ends_with("a.go"));
    assert!(loaded.units[1].path.ends_with("b.go"));
    assert_eq!(loaded.units[1].source, "package b\n");
    assert_eq!(loaded.failures.len(), 1);
    assert!(loaded.failures[0].path.ends_with("missing.go"));
}
