use std::fs;
use zipignore_core::ignore::{IgnoreResolver, IgnoreSources};
use zipignore_core::walker::DirectoryWalker;
use zipignore_testing::fixtures::{create_project_tree, create_pruned_tree, PROJECT_TREE_KEPT_FILES};
use zipignore_testing::TestDir;

fn sorted_relative(resolver: &IgnoreResolver, files_only: bool) -> Vec<String> {
    let walker = DirectoryWalker::new(resolver);
    let entries = if files_only {
        walker.files_only(resolver.root()).unwrap()
    } else {
        walker.file_list(resolver.root()).unwrap()
    };
    let mut paths: Vec<String> = entries.into_iter().map(|e| e.relative_path).collect();
    paths.sort();
    paths
}

#[test]
fn test_gitignore_log_rule_end_to_end() {
    let test_dir = TestDir::new().unwrap();
    test_dir.create_file("a.txt", b"a").unwrap();
    test_dir.create_file("b.log", b"b").unwrap();
    test_dir.create_ignore_file(".gitignore", &["*.log"]).unwrap();

    let mut resolver = IgnoreResolver::new(test_dir.path());
    resolver.load_default_files().unwrap();

    assert_eq!(sorted_relative(&resolver, true), vec![".gitignore", "a.txt"]);
}

#[test]
fn test_directory_rule_end_to_end() {
    let test_dir = TestDir::new().unwrap();
    test_dir.create_file("dist/bundle.js", b"x").unwrap();
    test_dir.create_file("src/index.js", b"y").unwrap();
    test_dir.create_ignore_file(".zipignore", &["dist/"]).unwrap();

    let mut resolver = IgnoreResolver::new(test_dir.path());
    resolver.load_default_files().unwrap();

    assert_eq!(
        sorted_relative(&resolver, true),
        vec![".zipignore", "src/index.js"]
    );
}

#[test]
fn test_ignored_directory_is_pruned() {
    let test_dir = TestDir::new().unwrap();
    create_pruned_tree(&test_dir).unwrap();

    let mut resolver = IgnoreResolver::new(test_dir.path());
    resolver.load_default_files().unwrap();

    let all = sorted_relative(&resolver, false);
    assert_eq!(all, vec![".zipignore", "src", "src/lib.rs"]);
    assert!(!all.iter().any(|p| p.starts_with("build")));
}

#[test]
fn test_project_tree() {
    let test_dir = TestDir::new().unwrap();
    create_project_tree(&test_dir).unwrap();

    let resolver = IgnoreSources::default()
        .build_resolver(test_dir.path())
        .unwrap();
    assert_eq!(sorted_relative(&resolver, true), PROJECT_TREE_KEPT_FILES);
}

#[test]
fn test_cli_patterns_override_files() {
    let test_dir = TestDir::new().unwrap();
    create_project_tree(&test_dir).unwrap();

    let sources = IgnoreSources {
        patterns: vec!["!app.log".to_string(), "*.md".to_string()],
        ..IgnoreSources::default()
    };
    let resolver = sources.build_resolver(test_dir.path()).unwrap();
    let files = sorted_relative(&resolver, true);
    assert!(files.contains(&"app.log".to_string()));
    assert!(!files.contains(&"README.md".to_string()));
}

#[test]
fn test_walk_can_stop_early() {
    let test_dir = TestDir::new().unwrap();
    for i in 0..20 {
        test_dir.create_file(&format!("f{i:02}.txt"), b"").unwrap();
    }

    let resolver = IgnoreResolver::new(test_dir.path());
    let first: Vec<String> = DirectoryWalker::new(&resolver)
        .sort_by_name(true)
        .walk(test_dir.path())
        .take(3)
        .map(|e| e.unwrap().relative_path)
        .collect();
    assert_eq!(first, vec!["f00.txt", "f01.txt", "f02.txt"]);
}

#[test]
fn test_skip_current_dir() {
    let test_dir = TestDir::new().unwrap();
    test_dir.create_file("a/inner.txt", b"").unwrap();
    test_dir.create_file("b.txt", b"").unwrap();

    let resolver = IgnoreResolver::new(test_dir.path());
    let mut walk = DirectoryWalker::new(&resolver)
        .sort_by_name(true)
        .walk(test_dir.path());

    let first = walk.next().unwrap().unwrap();
    assert_eq!(first.relative_path, "a");
    walk.skip_current_dir();
    let rest: Vec<String> = walk.map(|e| e.unwrap().relative_path).collect();
    assert_eq!(rest, vec!["b.txt"]);
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use zipignore_testing::fixtures::create_symlink_structure;

    #[test]
    fn test_symlinks_are_leaves() {
        let test_dir = TestDir::new().unwrap();
        create_symlink_structure(&test_dir).unwrap();

        let resolver = IgnoreResolver::new(test_dir.path());
        let entries = DirectoryWalker::new(&resolver)
            .file_list(test_dir.path())
            .unwrap();

        let mut paths: Vec<&str> = entries.iter().map(|e| e.relative_path.as_str()).collect();
        paths.sort();
        assert_eq!(
            paths,
            vec![
                "dangling",
                "file1.txt",
                "link_to_dir",
                "link_to_file1.txt",
                "real_dir",
                "real_dir/inner.txt",
                "real_dir/loop"
            ]
        );

        let link = entries
            .iter()
            .find(|e| e.relative_path == "link_to_dir")
            .unwrap();
        assert!(link.is_symlink());
        assert!(!link.is_dir);
    }

    #[test]
    fn test_unreadable_directory_is_skipped() {
        let test_dir = TestDir::new().unwrap();
        test_dir.create_file("open/a.txt", b"").unwrap();
        let locked = test_dir.create_dir("locked").unwrap();
        test_dir.create_file("locked/secret.txt", b"").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Root ignores permission bits, so only check when they apply
        let readable = fs::read_dir(&locked).is_ok();

        let resolver = IgnoreResolver::new(test_dir.path());
        let result = DirectoryWalker::new(&resolver).files_only(test_dir.path());

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let mut paths: Vec<String> = result.unwrap().into_iter().map(|e| e.relative_path).collect();
        paths.sort();
        if readable {
            assert_eq!(paths, vec!["locked/secret.txt", "open/a.txt"]);
        } else {
            assert_eq!(paths, vec!["open/a.txt"]);
        }
    }

    #[test]
    fn test_ignoring_a_symlink_by_name() {
        let test_dir = TestDir::new().unwrap();
        create_symlink_structure(&test_dir).unwrap();

        let mut resolver = IgnoreResolver::new(test_dir.path());
        resolver.rules_mut().add_pattern("link_*");
        resolver.rules_mut().add_pattern("loop");
        resolver.rules_mut().add_pattern("dangling");
        let mut paths: Vec<String> = DirectoryWalker::new(&resolver)
            .files_only(test_dir.path())
            .unwrap()
            .into_iter()
            .map(|e| e.relative_path)
            .collect();
        paths.sort();
        assert_eq!(paths, vec!["file1.txt", "real_dir/inner.txt"]);
    }
}
