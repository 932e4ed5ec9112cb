//! Per-stage output capture for parallel scripts
//!
//! Each parallel stage gets a fresh temporary directory holding one log file
//! per script. The directory is removed when the [`CaptureDir`] is dropped,
//! which covers success, failure and interruption alike.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::discovery::ScriptDescriptor;

/// Captured output beyond this is dropped with a marker line (10MB)
const MAX_OUTPUT_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug)]
pub struct CaptureDir {
    dir: TempDir,
}

impl CaptureDir {
    /// Create a capture directory under `root`, or the system temp dir
    pub fn new(root: Option<&Path>, stage: u32) -> io::Result<Self> {
        let prefix = format!("bmk-stage-{stage}-");
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);
        let dir = match root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        tracing::debug!(path = %dir.path().display(), stage, "created capture directory");
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a fresh log file for the script at `index` in its stage
    pub fn create_log(&self, index: usize, script: &ScriptDescriptor) -> io::Result<(PathBuf, File)> {
        let path = self
            .dir
            .path()
            .join(format!("{index:03}-{}.log", script.file_name));
        let file = File::create(&path)?;
        Ok((path, file))
    }
}

/// Read a log back as lines, decoding invalid UTF-8 lossily
pub fn read_lines(path: &Path) -> Vec<String> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to open capture log");
            return vec!["[error reading output]".to_string()];
        }
    };

    let mut buf = Vec::new();
    let mut limited = file.take(MAX_OUTPUT_SIZE);
    if let Err(e) = limited.read_to_end(&mut buf) {
        tracing::warn!(path = %path.display(), error = %e, "failed to read capture log");
    }

    let mut lines: Vec<String> = String::from_utf8_lossy(&buf)
        .lines()
        .map(str::to_string)
        .collect();

    let truncated = fs::metadata(path)
        .map(|m| m.len() > MAX_OUTPUT_SIZE)
        .unwrap_or(false);
    if truncated {
        lines.push("[output truncated at 10MB]".to_string());
    }
    lines
}
