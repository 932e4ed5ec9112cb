//! Error types surfaced before or around script execution
//!
//! Script failures are not errors: they are recorded as exit codes in the
//! run outcome. These variants cover the cases where nothing could run.

use std::path::PathBuf;
use thiserror::Error;

use crate::exit_codes;

#[derive(Debug, Error)]
pub enum BmkError {
    #[error("required input '{name}' is not set")]
    MissingInput { name: &'static str },

    #[error(
        "invalid command name '{name}': only letters, digits, hyphens, and underscores are allowed (must start with a letter or digit)"
    )]
    InvalidCommandName { name: String },

    #[error("override directory '{}' does not exist", path.display())]
    OverrideDirMissing { path: PathBuf },

    #[error("custom command \"{name}\" not found in directory {}", dir.display())]
    CustomCommandNotFound { name: String, dir: PathBuf },

    #[error("invalid script name pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("failed to parse config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl BmkError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        BmkError::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BmkError::MissingInput { .. } | BmkError::Config { .. } | BmkError::Pattern(_) => {
                exit_codes::CONFIG_ERROR
            }
            BmkError::InvalidCommandName { .. } => exit_codes::INVALID_ARGUMENT,
            BmkError::OverrideDirMissing { .. } | BmkError::CustomCommandNotFound { .. } => {
                exit_codes::FILE_NOT_FOUND
            }
            BmkError::Io { .. } => exit_codes::GENERAL_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, BmkError>;
