//! Override directory resolution
//!
//! A project can replace the bundled scripts for a prefix by dropping its
//! own `<prefix>_NN_*.<ext>` files in the override directory. The override
//! is all-or-nothing per prefix: one matching file hides every bundled
//! script for that prefix, whatever its stage.

use std::path::{Path, PathBuf};

use super::locator::{ScriptLocator, StagePattern};
use crate::error::Result;

/// Where the stages for a run come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagesSource {
    Bundled(PathBuf),
    Override(PathBuf),
}

impl StagesSource {
    pub fn dir(&self) -> &Path {
        match self {
            StagesSource::Bundled(dir) | StagesSource::Override(dir) => dir,
        }
    }

    pub fn is_override(&self) -> bool {
        matches!(self, StagesSource::Override(_))
    }
}

/// Pick the effective stages directory for a prefix.
///
/// The override directory wins if it holds at least one script matching
/// `pattern`; otherwise the bundled directory is used unchanged.
pub fn resolve_stages_dir(
    bundled_dir: &Path,
    override_dir: Option<&Path>,
    pattern: &StagePattern,
) -> Result<StagesSource> {
    if let Some(dir) = override_dir {
        if ScriptLocator::new(dir, pattern.clone()).has_scripts()? {
            tracing::debug!(
                prefix = pattern.prefix(),
                dir = %dir.display(),
                "using override scripts"
            );
            return Ok(StagesSource::Override(dir.to_path_buf()));
        }
    }

    Ok(StagesSource::Bundled(bundled_dir.to_path_buf()))
}
