//! Integration tests for the savestash CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Env {
    temp: TempDir,
}

impl Env {
    fn new() -> Self {
        let env = Self {
            temp: TempDir::new().unwrap(),
        };
        let saves = env.saves();
        fs::create_dir_all(saves.join("sub")).unwrap();
        fs::write(saves.join("a.txt"), "abc").unwrap();
        fs::write(saves.join("sub").join("b.txt"), "hello").unwrap();
        env
    }

    fn saves(&self) -> PathBuf {
        self.temp.path().join("saves")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("savestash").unwrap();
        cmd.env("SAVESTASH_CONFIG_DIR", self.temp.path().join("config"))
            .env("SAVESTASH_DATA_DIR", self.temp.path().join("data"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn add_game(&self) {
        self.cmd()
            .args(["game", "add", "demo", "--name", "Demo Game", "--save-path"])
            .arg(self.saves())
            .assert()
            .success()
            .stdout(predicate::str::contains("Added game 'demo'"));
    }

    fn backup(&self, description: &str) {
        self.cmd()
            .args(["backup", "create", "demo", "--no-prune", "-d", description])
            .assert()
            .success()
            .stdout(predicate::str::contains("Backup created: backup_"));
    }

    fn list_json(&self) -> Vec<serde_json::Value> {
        let output = self
            .cmd()
            .args(["backup", "list", "demo", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("savestash").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot backups for game save folders"))
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_game_add_and_list() {
    let env = Env::new();
    env.add_game();

    env.cmd()
        .args(["game", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("demo"))
        .stdout(predicate::str::contains("Demo Game"));

    env.cmd()
        .args(["game", "add", "demo", "--name", "Again", "--save-path"])
        .arg(env.saves())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_backup_and_list_json() {
    let env = Env::new();
    env.add_game();
    env.backup("first");

    let listed = env.list_json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["size_bytes"], 8);
    assert_eq!(listed[0]["description"], "first");
    assert_eq!(listed[0]["index"], 1);
}

#[test]
fn test_restore_requires_force() {
    let env = Env::new();
    env.add_game();
    env.backup("before");
    fs::remove_file(env.saves().join("a.txt")).unwrap();

    env.cmd()
        .args(["backup", "restore", "demo", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));
    assert!(!env.saves().join("a.txt").exists());

    env.cmd()
        .args(["backup", "restore", "demo", "latest", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore complete!"));

    assert_eq!(read(&env.saves().join("a.txt")), "abc");
    assert_eq!(read(&env.saves().join("sub").join("b.txt")), "hello");

    // The pre-restore snapshot is listed first
    let listed = env.list_json();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["kind"], "pre_restore");
    assert_eq!(listed[0]["size_bytes"], 5);
}

#[test]
fn test_prune_keeps_most_recent() {
    let env = Env::new();
    env.add_game();
    for i in 0..3 {
        env.backup(&format!("run {}", i));
    }

    env.cmd()
        .args(["backup", "prune", "demo", "--keep", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("run again with --force"));
    assert_eq!(env.list_json().len(), 3);

    env.cmd()
        .args(["backup", "prune", "demo", "--keep", "1", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 2 backup(s)."));

    let listed = env.list_json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["description"], "run 2");
}

#[test]
fn test_delete_and_history() {
    let env = Env::new();
    env.add_game();
    env.backup("doomed");

    env.cmd()
        .args(["backup", "delete", "demo", "1", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted backup_"));
    assert!(env.list_json().is_empty());

    env.cmd()
        .args(["history"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BACKUP"))
        .stdout(predicate::str::contains("DELETE"));
}

#[test]
fn test_unknown_game_fails() {
    let env = Env::new();

    env.cmd()
        .args(["backup", "list", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Game not found: nope"));
}

#[test]
fn test_verify_reports_tampering() {
    let env = Env::new();
    env.add_game();
    env.backup("pristine");

    env.cmd()
        .args(["backup", "verify", "demo", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains(": OK"));

    let path = env.list_json()[0]["path"].as_str().unwrap().to_string();
    fs::write(Path::new(&path).join("a.txt"), "xyz!").unwrap();

    env.cmd()
        .args(["backup", "verify", "demo", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("MODIFIED"));
}

#[test]
fn test_zero_retention_is_rejected() {
    let env = Env::new();

    env.cmd()
        .args(["game", "add", "demo", "--name", "Demo Game", "--max-backups", "0", "--save-path"])
        .arg(env.saves())
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_backups must keep at least one backup"));

    let config_dir = env.temp.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    let document = serde_json::json!({
        "games": {
            "demo": {
                "name": "Demo Game",
                "save_path": env.saves().to_string_lossy(),
                "max_backups": 0
            }
        }
    });
    fs::write(config_dir.join("games_config.json"), document.to_string()).unwrap();

    env.cmd()
        .args(["backup", "create", "demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Game 'demo'"));
    assert!(!env.temp.path().join("data").join("backups").join("demo").exists());
}
