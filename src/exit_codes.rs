//! Exit code table and reporting helpers
//!
//! Codes follow sysexits.h and errno conventions where they apply. Script
//! exit codes are never rewritten: the first failure's code is what the
//! `bmk` process itself exits with.

use std::collections::HashMap;
use std::process::ExitStatus;

pub const SUCCESS: i32 = 0;
pub const GENERAL_ERROR: i32 = 1;
pub const FILE_NOT_FOUND: i32 = 2;
pub const PERMISSION_DENIED: i32 = 13;
pub const INVALID_ARGUMENT: i32 = 22;
pub const CONFIG_ERROR: i32 = 78;
pub const TIMEOUT: i32 = 110;
pub const NOT_EXECUTABLE: i32 = 126;
pub const COMMAND_NOT_FOUND: i32 = 127;
pub const SIGNAL_INT: i32 = 130;
pub const BROKEN_PIPE: i32 = 141;
pub const SIGNAL_TERM: i32 = 143;

/// Offset added to a signal number to form a shell-style exit code
pub const SIGNAL_BASE: i32 = 128;

/// Per-prefix overrides for exit code explanations.
///
/// Keyed by command prefix, then by exit code. Script families own these
/// meanings (exit 1 from `commit` is "nothing to commit", exit 1 from a
/// linter is "violations found").
pub type FamilyExplanations = HashMap<String, HashMap<i32, String>>;

/// Exit code for a signal number, shell convention
pub fn from_signal(signal: i32) -> i32 {
    SIGNAL_BASE + signal
}

/// Convert a child's exit status into the code we record for it.
///
/// A child killed by a signal reports `128 + N`. A status with neither a
/// code nor a signal is recorded as a general error.
pub fn from_status(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return from_signal(signal);
        }
    }

    GENERAL_ERROR
}

/// Human-readable explanation of an exit code
pub fn explain(code: i32) -> String {
    match code {
        SUCCESS => "success".to_string(),
        GENERAL_ERROR => "general error".to_string(),
        FILE_NOT_FOUND => "file not found".to_string(),
        PERMISSION_DENIED => "permission denied".to_string(),
        INVALID_ARGUMENT => "invalid argument".to_string(),
        CONFIG_ERROR => "configuration error".to_string(),
        TIMEOUT => "timed out".to_string(),
        NOT_EXECUTABLE => "script is not executable".to_string(),
        COMMAND_NOT_FOUND => "command not found".to_string(),
        c if c > SIGNAL_BASE && c < SIGNAL_BASE + 65 => {
            format!("terminated by {}", signal_name(c - SIGNAL_BASE))
        }
        c => format!("exit code {c}"),
    }
}

/// Explanation for a code from a given command family, falling back to
/// the generic table.
pub fn explain_for(prefix: &str, code: i32, families: &FamilyExplanations) -> String {
    families
        .get(prefix)
        .and_then(|codes| codes.get(&code))
        .cloned()
        .unwrap_or_else(|| explain(code))
}

/// Process exit code for a list of `(script, code)` failures.
///
/// The first recorded failure wins, unmodified. An empty list still means
/// something failed, so it maps to a general error.
pub fn aggregate(failures: &[(String, i32)]) -> i32 {
    failures
        .first()
        .map(|(_, code)| *code)
        .unwrap_or(GENERAL_ERROR)
}

fn signal_name(signal: i32) -> String {
    match signal {
        1 => "SIGHUP".to_string(),
        2 => "SIGINT".to_string(),
        3 => "SIGQUIT".to_string(),
        6 => "SIGABRT".to_string(),
        9 => "SIGKILL".to_string(),
        11 => "SIGSEGV".to_string(),
        13 => "SIGPIPE".to_string(),
        15 => "SIGTERM".to_string(),
        n => format!("signal {n}"),
    }
}
