//! End-to-end checks of the `treewalk` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use test_support::TestTree;

fn treewalk() -> Command {
    Command::new(env!("CARGO_BIN_EXE_treewalk"))
}

#[test]
fn help_lists_usage() {
    treewalk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Usage: treewalk"))
        .stdout(predicate::str::contains("--max-depth"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn version_names_the_binary() {
    treewalk()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("treewalk "));
}

#[test]
fn lists_tree_in_sorted_preorder() {
    let tree = TestTree::with_paths(["b.txt", "a/z.txt", "a/y/x.txt"]).expect("tree");
    treewalk()
        .args(["--dirs", "--sort", "asc"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout("a/\na/y/\na/y/x.txt\na/z.txt\nb.txt\n");
}

#[test]
fn exclude_prunes_whole_subtree() {
    let tree = TestTree::with_paths(["keep/a.rs", "vendor/b.rs", "vendor/deep/c.rs"])
        .expect("tree");
    treewalk()
        .args(["--exclude", "vendor", "--sort", "asc"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout("keep/a.rs\n");
}

#[test]
fn dot_files_need_opt_in() {
    let tree = TestTree::with_paths([".hidden.rs", "shown.rs"]).expect("tree");
    treewalk()
        .args(["--include", "*.rs", "--sort", "asc"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout("shown.rs\n");
    treewalk()
        .args(["--include", "*.rs", "--dot", "--sort", "asc"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(".hidden.rs\nshown.rs\n");
}

#[test]
fn json_lines_describe_entries() {
    let tree = TestTree::with_paths(["one/two.txt"]).expect("tree");
    let output = treewalk()
        .args(["--json", "--dirs", "--sort", "asc"])
        .arg(tree.path())
        .output()
        .expect("run treewalk");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let values: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(values.len(), 2);
    assert_eq!(values[0]["kind"], "directory");
    assert_eq!(values[0]["depth"], 1);
    assert_eq!(values[1]["kind"], "file");
    assert_eq!(values[1]["depth"], 2);
}

#[test]
fn ext_report_groups_by_extension() {
    let tree = TestTree::with_paths(["a.rs", "b.RS", "c.md", "Makefile"]).expect("tree");
    treewalk()
        .args(["--report", "ext"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("2\trs"))
        .stdout(predicate::str::contains("1\tmd"));
}

#[cfg(unix)]
#[test]
fn follow_survives_symlink_cycle() {
    let tree = TestTree::with_paths(["loop/file.txt"]).expect("tree");
    tree.symlink("loop/back", "..").expect("symlink");
    treewalk()
        .args(["--follow", "--sort", "asc", "--stats"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("13\tloop/file.txt\n"))
        .stdout(predicate::str::contains("cycles skipped: 1"));
}

#[cfg(unix)]
#[test]
fn follow_with_stats_lists_dangling_links() {
    let tree = TestTree::with_paths(["real.txt"]).expect("tree");
    tree.symlink("broken", tree.join("nowhere")).expect("symlink");
    treewalk()
        .args(["--follow", "--stats", "--sort", "asc"])
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\tbroken\n"))
        .stdout(predicate::str::contains("8\treal.txt\n"));
}
