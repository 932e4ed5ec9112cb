//! Input validation for user-supplied command names.
//!
//! Command names become part of a file-name pattern and of the
//! `BMK_COMMAND_PREFIX` environment variable handed to scripts, so they are
//! restricted before they reach either.

use crate::error::{BmkError, Result};

/// Maximum allowed length for a command name.
pub const MAX_COMMAND_NAME_LENGTH: usize = 128;

/// Validates a custom command name.
///
/// A name is valid if:
/// - It starts with an ASCII letter or digit
/// - It contains only ASCII letters, digits, dashes, and underscores
/// - It is no longer than MAX_COMMAND_NAME_LENGTH characters
///
/// # Examples
///
/// ```
/// use bmk::validation::validate_command_name;
///
/// assert!(validate_command_name("deploy").is_ok());
/// assert!(validate_command_name("db-migrate_2").is_ok());
/// assert!(validate_command_name("").is_err());
/// assert!(validate_command_name("../etc").is_err());
/// assert!(validate_command_name("deploy*").is_err());
/// ```
pub fn validate_command_name(name: &str) -> Result<()> {
    let invalid = || BmkError::InvalidCommandName {
        name: name.to_string(),
    };

    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphanumeric() => {}
        _ => return Err(invalid()),
    }

    if name.len() > MAX_COMMAND_NAME_LENGTH {
        return Err(invalid());
    }

    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(invalid());
    }

    Ok(())
}

/// Clap value parser for command name arguments.
///
/// ```ignore
/// #[arg(value_parser = clap_command_name_validator)]
/// name: String,
/// ```
pub fn clap_command_name_validator(s: &str) -> std::result::Result<String, String> {
    validate_command_name(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_command_name_valid() {
        assert!(validate_command_name("deploy").is_ok());
        assert!(validate_command_name("db_migrate").is_ok());
        assert!(validate_command_name("release-notes").is_ok());
        assert!(validate_command_name("2fa").is_ok());
        assert!(validate_command_name("a").is_ok());
    }

    #[test]
    fn test_validate_command_name_empty() {
        assert!(validate_command_name("").is_err());
    }

    #[test]
    fn test_validate_command_name_bad_first_char() {
        assert!(validate_command_name("-deploy").is_err());
        assert!(validate_command_name("_deploy").is_err());
    }

    #[test]
    fn test_validate_command_name_glob_and_path_chars() {
        assert!(validate_command_name("deploy*").is_err());
        assert!(validate_command_name("dep?oy").is_err());
        assert!(validate_command_name("a/b").is_err());
        assert!(validate_command_name("..").is_err());
        assert!(validate_command_name("a.b").is_err());
        assert!(validate_command_name("a b").is_err());
    }

    #[test]
    fn test_validate_command_name_too_long() {
        let long_name = "a".repeat(MAX_COMMAND_NAME_LENGTH + 1);
        assert!(validate_command_name(&long_name).is_err());
    }

    #[test]
    fn test_clap_validator() {
        assert_eq!(clap_command_name_validator("deploy"), Ok("deploy".to_string()));
        assert!(clap_command_name_validator("de ploy").is_err());
    }
}
