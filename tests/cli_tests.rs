//! End-to-end tests for the docvault binary
//!
//! Every test runs with an isolated HOME and an explicit `--db` so nothing
//! touches the real user configuration.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    tmp: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    fn db(&self) -> PathBuf {
        self.tmp.path().join("store.db")
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.tmp.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("docvault").unwrap();
        cmd.env("HOME", self.tmp.path())
            .env_remove("DOCVAULT_DB")
            .env_remove("RUST_LOG")
            .arg("--db")
            .arg(self.db());
        cmd
    }

    fn store(&self, path: &Path, doc_key: Option<&str>) -> assert_cmd::assert::Assert {
        let mut cmd = self.cmd();
        cmd.arg("store").arg(path);
        if let Some(key) = doc_key {
            cmd.arg(key);
        }
        cmd.assert()
    }
}

#[test]
fn test_store_scenario() {
    let ws = Workspace::new();
    let a1 = ws.file("a1.json", r#"{"a":1}"#);
    let a2 = ws.file("a2.json", r#"{"a":2}"#);

    ws.store(&a1, Some("cfg"))
        .success()
        .stdout(predicate::str::contains("✓ Stored cfg v1 from a1.json"));

    ws.store(&a1, Some("cfg2"))
        .success()
        .stdout(predicate::str::contains(
            "identical content already stored as cfg v1",
        ));

    ws.store(&a2, Some("cfg"))
        .success()
        .stdout(predicate::str::contains("✓ Stored cfg v2 from a2.json"));

    ws.store(&a2, Some("cfg"))
        .success()
        .stdout(predicate::str::contains("latest version of 'cfg' (v2)"));

    ws.cmd()
        .arg("versions")
        .arg("cfg")
        .assert()
        .success()
        .stdout(predicate::str::contains("v1"))
        .stdout(predicate::str::contains("v2"))
        .stdout(predicate::str::contains("a2.json"));
}

#[test]
fn test_store_derives_key_from_file_name() {
    let ws = Workspace::new();
    let path = ws.file("settings.json", r#"{"x":1}"#);

    ws.store(&path, None)
        .success()
        .stdout(predicate::str::contains("✓ Stored settings v1"));

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("settings"))
        .stdout(predicate::str::contains("(1 versions)"));
}

#[test]
fn test_store_json_output() {
    let ws = Workspace::new();
    let path = ws.file("cfg.json", r#"{"a":1}"#);

    let output = ws
        .cmd()
        .arg("--json")
        .arg("store")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["outcome"], "stored");
    assert_eq!(value["doc_key"], "cfg");
    assert_eq!(value["version"], 1);
}

#[test]
fn test_missing_file_fails() {
    let ws = Workspace::new();
    ws.store(&ws.tmp.path().join("absent.json"), None)
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_non_utf8_file_fails() {
    let ws = Workspace::new();
    let path = ws.tmp.path().join("blob.json");
    std::fs::write(&path, [0xffu8, 0xfe]).unwrap();

    ws.store(&path, None)
        .failure()
        .stderr(predicate::str::contains("not valid UTF-8"));
}

#[test]
fn test_unknown_doc_key_is_not_an_error() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("versions")
        .arg("nope")
        .assert()
        .success()
        .stdout(predicate::str::contains("No versions found for 'nope'"));
}

#[test]
fn test_empty_list() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No documents stored yet"));
}

#[test]
fn test_show_prints_content() {
    let ws = Workspace::new();
    let v1 = ws.file("v1/cfg.json", r#"{"a":1}"#);
    let v2 = ws.file("v2/cfg.json", r#"{"a":2}"#);
    ws.store(&v1, None).success();
    ws.store(&v2, None).success();

    ws.cmd()
        .arg("show")
        .arg("cfg")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"a":2}"#));

    ws.cmd()
        .args(["show", "cfg", "--version", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"a":1}"#));

    ws.cmd()
        .args(["show", "cfg", "--version", "7"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Document not found"));
}

#[test]
fn test_import_directory() {
    let ws = Workspace::new();
    ws.file("docs/a/cfg.json", r#"{"v":1}"#);
    ws.file("docs/b/cfg.json", r#"{"v":2}"#);
    ws.file("docs/readme.md", "skip me");

    ws.cmd()
        .arg("import")
        .arg(ws.tmp.path().join("docs"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored: 2"));

    ws.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 versions)"));
}

#[test]
fn test_import_with_bad_file_exits_non_zero() {
    let ws = Workspace::new();
    ws.file("docs/good.json", r#"{"ok":true}"#);
    std::fs::write(ws.tmp.path().join("docs/bad.json"), [0xffu8]).unwrap();

    ws.cmd()
        .arg("import")
        .arg(ws.tmp.path().join("docs"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Stored: 1"))
        .stderr(predicate::str::contains("1 failed file"));
}

#[test]
fn test_init_then_status() {
    let ws = Workspace::new();
    let base = ws.tmp.path().join("vault");

    Command::cargo_bin("docvault")
        .unwrap()
        .env("HOME", ws.tmp.path())
        .env_remove("DOCVAULT_DB")
        .arg("--config")
        .arg(&base)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("initialized successfully"));

    assert!(base.join("config.toml").exists());
    assert!(base.join("docvault.db").exists());

    Command::cargo_bin("docvault")
        .unwrap()
        .env("HOME", ws.tmp.path())
        .env_remove("DOCVAULT_DB")
        .arg("--config")
        .arg(base.join("config.toml"))
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored versions: 0"));
}
