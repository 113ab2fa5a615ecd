//! Common test utilities for jsonfield integration tests
//!
//! Every CLI invocation gets its own temporary database so tests stay
//! isolated from each other and from the user's configuration.

#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use tempfile::TempDir;

/// A temporary directory holding a SQLite database for one test
pub struct TestDb {
    dir: TempDir,
}

impl TestDb {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn url(&self) -> String {
        self.dir.path().join("test.db").to_string_lossy().to_string()
    }

    /// Builds a `jsonfield` command pointed at this database
    pub fn cmd(&self) -> Command {
        let mut cmd = jsonfield_cmd();
        cmd.arg("--database-url").arg(self.url());
        cmd
    }
}

/// Builds a `jsonfield` command with a clean environment
pub fn jsonfield_cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("jsonfield");
    cmd.env_remove("DATABASE_URL")
        .env_remove("JSONFIELD_DEFAULT_CHARSET")
        .env_remove("JSONFIELD_DEBUG")
        .env_remove("RUST_LOG");
    cmd
}

/// Runs a command that must succeed and returns its trimmed stdout
pub fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.assert().success().get_output().stdout.clone();
    String::from_utf8(output).unwrap().trim_end().to_string()
}
