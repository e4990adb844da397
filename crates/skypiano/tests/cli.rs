//! End-to-end tests of the skypiano binary.
//!
//! Every test points the data dir at a temp directory and runs from another,
//! so no real config or keymap store is touched.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SHEET: &str = r#"[{"name":"Two Notes","author":"Anon","bpm":120,
    "songNotes":[{"time":0,"key":"Key0"},{"time":500,"key":"Key1"}]}]"#;

const KEYMAP: &str = r#"{"0":["y"],"500":["u"],"1000":[]}"#;

struct Env {
    data: TempDir,
    work: TempDir,
}

impl Env {
    fn new() -> Self {
        let env = Self {
            data: TempDir::new().unwrap(),
            work: TempDir::new().unwrap(),
        };
        fs::write(env.work.path().join("two.json"), SHEET).unwrap();
        env
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("skypiano").unwrap();
        cmd.current_dir(self.work.path())
            .env("SKYPIANO_DATA_DIR", self.data.path())
            .env_remove("RUST_LOG")
            .env("SKYPIANO_LOG_LEVEL", "warn");
        cmd
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.work.path().join(name)
    }
}

fn keymap_files(dir: &Path) -> usize {
    let keymaps = dir.join("data").join("keymaps");
    fs::read_dir(keymaps)
        .map(|shards| {
            shards
                .filter_map(Result::ok)
                .map(|shard| fs::read_dir(shard.path()).map(|f| f.count()).unwrap_or(0))
                .sum()
        })
        .unwrap_or(0)
}

#[test]
fn compile_prints_keymap() {
    let env = Env::new();
    env.cmd()
        .args(["compile", "two.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(KEYMAP));
}

#[test]
fn compile_rejects_non_sheet() {
    let env = Env::new();
    fs::write(env.path("bad.json"), r#"{"songNotes":[]}"#).unwrap();
    env.cmd()
        .args(["compile", "bad.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Format error"));
}

#[test]
fn import_reports_summary_and_stores_keymap() {
    let env = Env::new();
    fs::write(env.path("broken.json"), "not json at all").unwrap();

    let output = env
        .cmd()
        .args(["import", "two.json", "broken.json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Success: 1. Error: 1"))
        .get_output()
        .stdout
        .clone();

    let line = String::from_utf8(output).unwrap();
    let entry: serde_json::Value = serde_json::from_str(line.trim()).unwrap();
    assert_eq!(entry["name"], "Two Notes");
    assert_eq!(entry["author"], "Anon");
    assert_eq!(keymap_files(env.data.path()), 1);

    // The id plays back from the store
    let id = entry["keyMap"].as_str().unwrap().to_string();
    env.cmd()
        .args(["export", &id, "--out", "out/copy.json", "--name", "Copy"])
        .assert()
        .success();

    let exported: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(env.path("out/copy.json")).unwrap()).unwrap();
    assert_eq!(exported[0]["name"], "Copy");
    assert_eq!(exported[0]["isEncrypted"], false);
    assert_eq!(
        exported[0]["songNotes"],
        serde_json::json!([{"time": 0, "key": "1Key0"}, {"time": 500, "key": "1Key1"}])
    );
}

#[test]
fn import_fails_when_nothing_imports() {
    let env = Env::new();
    env.cmd()
        .args(["import", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Success: 0. Error: 1"));
}

#[test]
fn encrypted_export_decodes() {
    let env = Env::new();
    env.cmd()
        .args(["export", "two.json", "--out", "secret.json", "--encrypt"])
        .assert()
        .success();

    let secret = fs::read_to_string(env.path("secret.json")).unwrap();
    assert!(secret.contains(r#""isEncrypted":true"#));

    env.cmd()
        .args(["decode", "secret.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""key":"1Key0""#));

    env.cmd()
        .args(["compile", "secret.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(KEYMAP));
}

#[test]
fn play_sheet_file_finishes() {
    let env = Env::new();
    env.cmd()
        .args(["play", "two.json", "--speed", "5"])
        .assert()
        .success();
}

#[test]
fn play_unknown_target_fails() {
    let env = Env::new();
    env.cmd()
        .args(["play", "00000000000000000000000000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("neither a stored keymap id"));
}

#[test]
fn config_show_uses_local_file() {
    let env = Env::new();
    fs::write(
        env.path("custom.toml"),
        "[panel]\nspeed = 2.5\nlong_press_mode = true\n",
    )
    .unwrap();

    env.cmd()
        .args(["--config", "custom.toml", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# source: custom.toml"))
        .stdout(predicate::str::contains("speed = 2.5"))
        .stdout(predicate::str::contains("long_press_mode = true"))
        .stdout(predicate::str::contains("# env: SKYPIANO_DATA_DIR"));
}
