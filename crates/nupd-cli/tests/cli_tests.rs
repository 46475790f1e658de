//! Integration tests for the nupd CLI binary.
//!
//! These tests exercise the actual compiled binary using assert_cmd.

use assert_cmd::Command;
use nupd_test_utils::TreeFixture;
use predicates::prelude::*;

/// Get a Command for the nupd binary
fn nupd_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("nupd"))
}

/// A config file that keeps scratch space inside the test's own temp dir.
fn isolated_config(scratch: &TreeFixture) -> TreeFixture {
    let config = TreeFixture::new();
    config.write(
        "config.toml",
        &format!("scratch_dir = {:?}\n", scratch.path().display().to_string()),
    );
    config
}

fn update(root: &TreeFixture, source: &TreeFixture, extra: &[&str]) -> assert_cmd::assert::Assert {
    let scratch = TreeFixture::new();
    let config = isolated_config(&scratch);
    nupd_cmd()
        .arg("update")
        .arg("--root")
        .arg(root.path())
        .arg("--source")
        .arg(source.path())
        .arg("--config")
        .arg(config.join("config.toml"))
        .args(extra)
        .assert()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_output() {
    nupd_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("update"))
        .stdout(predicate::str::contains("check"));
}

#[test]
fn test_version_output() {
    nupd_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nupd"));
}

#[test]
fn test_no_command_shows_help_hint() {
    nupd_cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("nupd --help"));
}

#[test]
fn test_completions_bash() {
    nupd_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nupd"));
}

// ============================================================================
// Update Tests
// ============================================================================

#[test]
fn test_update_applies_source() {
    let root = TreeFixture::with_files(&[("a.txt", "a"), ("keep.txt", "k")]);
    let source = TreeFixture::with_files(&[("a.txt", "b"), ("sub/c.txt", "k")]);

    update(&root, &source, &[])
        .success()
        .stdout(predicate::str::contains("Update complete"));

    root.assert_contents("a.txt", "b");
    root.assert_contents("sub/c.txt", "k");
    root.assert_contents("keep.txt", "k");
}

#[test]
fn test_update_twice_reports_up_to_date() {
    let root = TreeFixture::new();
    let source = TreeFixture::with_files(&[("a.txt", "a")]);

    update(&root, &source, &[]).success();
    update(&root, &source, &[])
        .success()
        .stdout(predicate::str::contains("Already up to date"));
}

#[test]
fn test_update_dry_run_changes_nothing() {
    let root = TreeFixture::with_files(&[("a.txt", "a")]);
    let source = TreeFixture::with_files(&[("a.txt", "b")]);

    update(&root, &source, &["--dry-run"])
        .success()
        .stdout(predicate::str::contains("move aside"))
        .stdout(predicate::str::contains("fetch"));

    root.assert_contents("a.txt", "a");
    assert_eq!(root.files().len(), 1);
}

#[test]
fn test_update_json_output() {
    let root = TreeFixture::new();
    let source = TreeFixture::with_files(&[("a.txt", "a")]);

    let output = update(&root, &source, &["--json"]).success().get_output().stdout.clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["filled"][0], "a.txt");
    assert_eq!(report["fetched"][0], "a.txt");
}

#[test]
fn test_update_missing_source_exits_with_fetch_code() {
    let root = TreeFixture::new();
    let source = TreeFixture::new();

    nupd_cmd()
        .args(["update", "--root"])
        .arg(root.path())
        .arg("--source")
        .arg(source.join("absent"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_update_missing_root_exits_with_filesystem_code() {
    let root = TreeFixture::new();
    let source = TreeFixture::with_files(&[("a.txt", "a")]);

    nupd_cmd()
        .args(["update", "--root"])
        .arg(root.join("absent"))
        .arg("--source")
        .arg(source.path())
        .assert()
        .code(2);
}

#[test]
fn test_update_malformed_listing_exits_with_manifest_code() {
    let root = TreeFixture::new();
    let source = TreeFixture::with_files(&[("listfile.psli", "no-digest-here\n")]);

    update(&root, &source, &[]).code(6);
}

// ============================================================================
// Check Tests
// ============================================================================

#[test]
fn test_check_healthy_after_update() {
    let root = TreeFixture::new();
    let source = TreeFixture::with_files(&[("a.txt", "a")]);
    update(&root, &source, &[]).success();

    nupd_cmd()
        .args(["check", "--root"])
        .arg(root.path())
        .arg("--source")
        .arg(source.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn test_check_reports_drift_and_fails() {
    let root = TreeFixture::with_files(&[("a.txt", "changed")]);
    let source = TreeFixture::with_files(&[("a.txt", "a")]);

    nupd_cmd()
        .args(["check", "--json", "--root"])
        .arg(root.path())
        .arg("--source")
        .arg(source.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"Drifted\""));

    root.assert_contents("a.txt", "changed");
}

// ============================================================================
// Manifest Tests
// ============================================================================

#[test]
fn test_manifest_prints_listing() {
    let tree = TreeFixture::with_files(&[("a", "a"), ("d/b", "b")]);

    nupd_cmd()
        .arg("manifest")
        .arg(tree.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "a ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb\nd/b ",
        ));
}

#[test]
fn test_manifest_output_is_used_as_source_listing() {
    let source = TreeFixture::with_files(&[("a.txt", "a")]);
    nupd_cmd()
        .arg("manifest")
        .arg(source.path())
        .arg("--output")
        .arg(source.join("listfile.psli"))
        .assert()
        .success();
    source.assert_contents(
        "listfile.psli",
        "a.txt ca978112ca1bbdcafac231b39a23dc4da786eff8147c4e72b9807785afee48bb\n",
    );

    let root = TreeFixture::new();
    update(&root, &source, &[]).success();

    root.assert_contents("a.txt", "a");
    root.assert_absent("listfile.psli");
}

#[test]
fn test_regenerated_listing_does_not_list_itself() {
    let source = TreeFixture::with_files(&[("f.txt", "one")]);
    let write_listing = || {
        nupd_cmd()
            .arg("manifest")
            .arg(source.path())
            .arg("--output")
            .arg(source.join("listfile.psli"))
            .assert()
            .success();
    };

    write_listing();
    source.write("f.txt", "two");
    write_listing();

    let listing = source.read("listfile.psli");
    assert!(!listing.contains("listfile.psli"), "listing names itself: {listing}");

    let root = TreeFixture::new();
    update(&root, &source, &[]).success();
    root.assert_contents("f.txt", "two");
    root.assert_absent("listfile.psli");
}
