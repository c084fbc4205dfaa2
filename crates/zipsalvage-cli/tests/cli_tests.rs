//! Integration tests for zipsalvage-cli.
//!
//! Note: Tests use `unwrap`/`expect` which is acceptable in test code.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;
use zipsalvage_core::test_utils::ZipFixture;
use zipsalvage_core::test_utils::write_corrupt_archive;

struct Workspace {
    temp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        fs::create_dir_all(temp.path().join("source")).unwrap();
        Self { temp }
    }

    fn source(&self) -> PathBuf {
        self.temp.path().join("source")
    }

    fn output(&self) -> PathBuf {
        self.temp.path().join("output")
    }

    fn logs(&self) -> PathBuf {
        self.temp.path().join("logs")
    }

    fn add(&self, name: &str, fixture: &ZipFixture) -> PathBuf {
        fixture.write_to(self.source().join(name))
    }

    /// Command with the log file redirected into the workspace.
    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("zipsalvage");
        cmd.arg("--log-dir").arg(self.logs());
        cmd
    }

    fn extract(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("extract")
            .arg(self.source())
            .arg("-o")
            .arg(self.output());
        cmd
    }
}

fn zipsalvage_cmd() -> Command {
    cargo_bin_cmd!("zipsalvage")
}

fn traversal_archive() -> ZipFixture {
    ZipFixture::new()
        .file("m1.txt", b"first")
        .file("/etc/../passwd", b"root:x:0:0")
        .file("docs/m3.txt", b"third")
}

fn log_files(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .map(|entries| entries.map(|e| e.unwrap().path()).collect())
        .unwrap_or_default()
}

#[test]
fn test_version_flag() {
    zipsalvage_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("zipsalvage"));
}

#[test]
fn test_help_lists_commands() {
    zipsalvage_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("survey"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn test_extract_help() {
    zipsalvage_cmd()
        .arg("extract")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--recovery-dir"))
        .stdout(predicate::str::contains("--collision"));
}

#[test]
fn test_extract_requires_output() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("extract")
        .arg(ws.source())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--output"));
}

#[test]
fn test_extract_recovers_traversal_member() {
    let ws = Workspace::new();
    ws.add("batch.zip", &traversal_archive());

    ws.extract()
        .assert()
        .success()
        .stdout(predicate::str::contains("Extraction complete"))
        .stdout(predicate::str::contains("Recovered:        1"));

    assert_eq!(fs::read(ws.output().join("m1.txt")).unwrap(), b"first");
    assert_eq!(fs::read(ws.output().join("docs/m3.txt")).unwrap(), b"third");
    assert_eq!(
        fs::read(ws.output().join("_recovered/batch/passwd")).unwrap(),
        b"root:x:0:0"
    );
    assert!(!ws.temp.path().join("etc").exists());
}

#[test]
fn test_extract_custom_recovery_dir_flat() {
    let ws = Workspace::new();
    ws.add("a.zip", &ZipFixture::new().file("../notes.txt", b"a"));
    ws.add("b.zip", &ZipFixture::new().file("../../notes.txt", b"b"));
    let rescue = ws.temp.path().join("rescue");

    ws.extract()
        .arg("--recovery-dir")
        .arg(&rescue)
        .arg("--flat-recovery")
        .assert()
        .success();

    assert_eq!(fs::read(rescue.join("notes.txt")).unwrap(), b"a");
    assert_eq!(fs::read(rescue.join("notes (1).txt")).unwrap(), b"b");
}

#[test]
fn test_extract_allow_absolute_paths() {
    let ws = Workspace::new();
    ws.add("abs.zip", &ZipFixture::new().file("/data/a.txt", b"abs"));

    ws.extract().arg("--allow-absolute-paths").assert().success();

    assert_eq!(fs::read(ws.output().join("data/a.txt")).unwrap(), b"abs");
    assert!(!ws.output().join("_recovered").exists());
}

#[test]
fn test_extract_json_output() {
    let ws = Workspace::new();
    ws.add("batch.zip", &traversal_archive());

    let output = ws.extract().arg("--json").output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["operation"], "extract");
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["files_found"], 3);
    assert_eq!(value["data"]["files_extracted"], 2);
    assert_eq!(value["data"]["files_recovered"], 1);
    assert_eq!(value["data"]["files_still_failed"], 0);
    assert_eq!(value["data"]["archives"][0]["recovered"][0], "/etc/../passwd");
}

#[test]
fn test_extract_corrupt_archive_fails_batch() {
    let ws = Workspace::new();
    ws.add("good.zip", &ZipFixture::new().file("a.txt", b"a"));
    write_corrupt_archive(ws.source().join("bad.zip"));

    ws.extract()
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed archives"))
        .stdout(predicate::str::contains("bad.zip"));

    assert!(ws.output().join("a.txt").exists());
}

#[test]
fn test_extract_missing_source_has_hint() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("extract")
        .arg(ws.temp.path().join("missing"))
        .arg("-o")
        .arg(ws.output())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot scan"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_extract_invalid_pattern() {
    let ws = Workspace::new();
    ws.extract()
        .arg("--pattern")
        .arg("[")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid archive pattern"));
}

#[test]
fn test_extract_empty_source_warns() {
    let ws = Workspace::new();
    ws.extract()
        .assert()
        .success()
        .stdout(predicate::str::contains("No archives matching"));
}

#[test]
fn test_extract_quiet_prints_nothing() {
    let ws = Workspace::new();
    ws.add("batch.zip", &traversal_archive());

    ws.extract()
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_extract_console_summary_logged() {
    let ws = Workspace::new();
    ws.add("a.zip", &ZipFixture::new().file("x/IMG.jpg", b"1"));
    ws.add("b.zip", &ZipFixture::new().file("y/IMG.jpg", b"2"));

    ws.extract()
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Found 2 files total with 1 unique names",
        ));
}

#[test]
fn test_log_file_written() {
    let ws = Workspace::new();
    ws.add("batch.zip", &traversal_archive());

    ws.extract().assert().success();

    let logs = log_files(&ws.logs());
    assert_eq!(logs.len(), 1);
    let name = logs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("zipsalvage_"));
    assert!(name.ends_with(".log"));

    let contents = fs::read_to_string(&logs[0]).unwrap();
    assert!(contents.contains("TRACE"));
    assert!(contents.contains("passwd"));
}

#[test]
fn test_no_log_file() {
    let ws = Workspace::new();
    ws.extract().arg("--no-log-file").assert().success();
    assert!(!ws.logs().exists());
}

#[test]
fn test_survey_counts_unique_names() {
    let ws = Workspace::new();
    ws.add(
        "a.zip",
        &ZipFixture::new()
            .file("2019/IMG_0001.jpg", b"aaaa")
            .file("notes.txt", b"bb"),
    );
    ws.add("b.zip", &ZipFixture::new().file("2020/IMG_0001.jpg", b"cc"));

    ws.cmd()
        .arg("survey")
        .arg(ws.source())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Found 3 files total with 2 unique names.",
        ));

    assert!(!ws.output().exists());
}

#[test]
fn test_survey_json() {
    let ws = Workspace::new();
    ws.add("a.zip", &ZipFixture::new().file("a.txt", b"abc"));
    write_corrupt_archive(ws.source().join("bad.zip"));

    let output = ws
        .cmd()
        .arg("--json")
        .arg("survey")
        .arg(ws.source())
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["operation"], "survey");
    assert_eq!(value["data"]["archives_processed"], 1);
    assert_eq!(value["data"]["archives_failed"], 1);
    assert_eq!(value["data"]["total_uncompressed"], 3);
}

#[test]
fn test_list_short() {
    let ws = Workspace::new();
    let archive = ws.add("batch.zip", &traversal_archive());

    ws.cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .success()
        .stdout(predicate::str::contains("m1.txt"))
        .stdout(predicate::str::contains("/etc/../passwd"))
        .stdout(predicate::str::contains("docs/m3.txt"));
}

#[test]
fn test_list_long_human_readable() {
    let ws = Workspace::new();
    let archive = ws.add(
        "sizes.zip",
        &ZipFixture::new()
            .directory("dir/")
            .file("dir/big.bin", &vec![0_u8; 2048]),
    );

    ws.cmd()
        .arg("list")
        .arg(&archive)
        .arg("--long")
        .arg("--human-readable")
        .assert()
        .success()
        .stdout(predicate::str::contains("2.0 KB"))
        .stdout(predicate::str::contains("2020-09-03 20:03:00"))
        .stdout(predicate::str::contains("Total: 1 files"));
}

#[test]
fn test_list_corrupt_archive() {
    let ws = Workspace::new();
    let archive = write_corrupt_archive(ws.source().join("bad.zip"));

    ws.cmd()
        .arg("list")
        .arg(&archive)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid archive"))
        .stderr(predicate::str::contains("HINT"));
}

#[test]
fn test_completion_bash() {
    zipsalvage_cmd()
        .arg("completion")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("zipsalvage"));
}
