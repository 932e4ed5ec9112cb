//! Process utilities for bmk
//!
//! Liveness checks and graceful termination of script processes.

use std::io;
use std::process::{Child, ExitStatus};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Time a child gets between SIGTERM and SIGKILL
pub const KILL_GRACE: Duration = Duration::from_secs(2);

/// How a child was launched, which decides how it is signalled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Child shares our process group; signal the pid only
    Process,
    /// Child leads its own process group; signal the whole group
    Group,
}

/// Check if a process with the given PID is alive
///
/// Uses `nix::sys::signal::kill` with signal `None` (signal 0). `EPERM`
/// means the process exists but belongs to someone else.
#[cfg(unix)]
pub fn is_process_alive(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(pid_i32) = i32::try_from(pid) else {
        return false;
    };

    match kill(Pid::from_raw(pid_i32), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

/// Terminate a child and reap it.
///
/// Sends SIGTERM (to the pid or its whole group), waits up to
/// [`KILL_GRACE`], then escalates to SIGKILL. Always waits for the child so
/// no zombie is left behind.
pub fn terminate(child: &mut Child, scope: Scope) -> io::Result<ExitStatus> {
    if let Some(status) = child.try_wait()? {
        // Leader is gone but the group may still hold grandchildren
        if scope == Scope::Group {
            send(child, scope, Kind::Kill);
        }
        return Ok(status);
    }

    send(child, scope, Kind::Term);
    if let Some(status) = child.wait_timeout(KILL_GRACE)? {
        if scope == Scope::Group {
            send(child, scope, Kind::Kill);
        }
        return Ok(status);
    }

    tracing::debug!(pid = child.id(), "child ignored SIGTERM, sending SIGKILL");
    send(child, scope, Kind::Kill);
    let _ = child.kill();
    child.wait()
}

#[derive(Clone, Copy)]
enum Kind {
    Term,
    Kill,
}

#[cfg(unix)]
fn send(child: &Child, scope: Scope, kind: Kind) {
    use nix::sys::signal::{kill, killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(child.id()) else {
        return;
    };
    let pid = Pid::from_raw(raw);
    let signal = match kind {
        Kind::Term => Signal::SIGTERM,
        Kind::Kill => Signal::SIGKILL,
    };

    // Errors mean the target already exited
    let _ = match scope {
        Scope::Group => killpg(pid, signal),
        Scope::Process => kill(pid, signal),
    };
}

#[cfg(not(unix))]
fn send(child: &mut Child, _scope: Scope, _kind: Kind) {
    let _ = child.kill();
}
