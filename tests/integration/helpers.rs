//! Shared helpers for bmk integration tests

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

/// A throwaway project with bundled scripts, an isolated temp dir, and an
/// empty user config home
pub struct Project {
    pub root: TempDir,
    pub tmp: TempDir,
    pub config_home: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let project = Self {
            root: TempDir::new().expect("Failed to create project dir"),
            tmp: TempDir::new().expect("Failed to create temp dir"),
            config_home: TempDir::new().expect("Failed to create config home"),
        };
        fs::create_dir(project.bundled_dir()).expect("Failed to create bundled dir");
        project
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn bundled_dir(&self) -> PathBuf {
        self.root.path().join("bundled")
    }

    pub fn override_dir(&self) -> PathBuf {
        self.root.path().join("makescripts")
    }

    /// Add a bash script to the bundled scripts
    pub fn add_script(&self, name: &str, body: &str) {
        write_script(&self.bundled_dir(), name, body);
    }

    /// Add a bash script to the project's override directory
    pub fn add_override(&self, name: &str, body: &str) {
        fs::create_dir_all(self.override_dir()).expect("Failed to create override dir");
        write_script(&self.override_dir(), name, body);
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.root.path().join("bmk.toml"), content).expect("Failed to write bmk.toml");
    }

    /// `bmk` pointed at this project
    pub fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_bmk"));
        cmd.arg("--project-dir")
            .arg(self.root.path())
            .arg("--stages-dir")
            .arg(self.bundled_dir())
            .args(args)
            .env("TMPDIR", self.tmp.path())
            .env("XDG_CONFIG_HOME", self.config_home.path())
            .env("HOME", self.config_home.path())
            .env("NO_COLOR", "1")
            .env_remove("BMK_LOG")
            .env_remove("RUST_LOG")
            .stdin(Stdio::null());
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().expect("Failed to run bmk")
    }

    pub fn file_exists(&self, name: &str) -> bool {
        self.root.path().join(name).exists()
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.root.path().join(name))
            .unwrap_or_else(|e| panic!("Failed to read {name}: {e}"))
    }

    /// Whether bmk left anything behind in its temp dir
    pub fn tmp_is_empty(&self) -> bool {
        fs::read_dir(self.tmp.path())
            .expect("Failed to read temp dir")
            .next()
            .is_none()
    }
}

pub fn write_script(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), format!("#!/usr/bin/env bash\n{body}\n"))
        .expect("Failed to write script");
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Poll until `path` exists or `limit` passes
pub fn wait_for_file(path: &Path, limit: Duration) -> bool {
    let started = Instant::now();
    while started.elapsed() < limit {
        if path.exists() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    false
}
