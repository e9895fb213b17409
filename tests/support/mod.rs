#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

use taskboard::persist::DEFAULT_SLOT;
use taskboard::storage::FileSlotStore;
use taskboard::{Board, Persistence, Store, TaskBoard};

/// An isolated data directory for one test.
pub struct TestDataDir {
    dir: TempDir,
}

impl TestDataDir {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn slot_path(&self) -> PathBuf {
        self.dir.path().join(format!("{DEFAULT_SLOT}.json"))
    }

    pub fn write_slot(&self, contents: &str) -> std::io::Result<()> {
        fs::write(self.slot_path(), contents)
    }

    pub fn read_board(&self) -> Result<Board, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(self.slot_path())?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(".taskboard.toml");
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn open_board(&self) -> TaskBoard<FileSlotStore> {
        let slots = FileSlotStore::new(self.dir.path());
        TaskBoard::new(Store::open(Persistence::new(slots, DEFAULT_SLOT)))
    }
}

/// `taskboard` binary pointed at `data`, with env overrides cleared.
pub fn taskboard_cmd(data: &TestDataDir) -> Command {
    let mut cmd = Command::cargo_bin("taskboard").expect("taskboard binary");
    cmd.env_remove("TASKBOARD_CONFIG")
        .env_remove("RUST_LOG")
        .env("TASKBOARD_DIR", data.path());
    cmd
}

/// Run a command with `--json` and return the parsed `data` field.
pub fn json_data(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().expect("run taskboard");
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    let envelope: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json envelope");
    envelope["data"].clone()
}
