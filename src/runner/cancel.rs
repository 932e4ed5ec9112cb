//! Cancellation on interrupt and termination signals
//!
//! The binary installs a handler once, before any other thread exists. The
//! handler only records which signal arrived; the stage executor notices,
//! terminates its children, and unwinds so scoped resources are released.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use crate::error::{BmkError, Result};

/// SIGINT's number, used where the platform cannot tell signals apart
pub const SIGINT: i32 = 2;

/// Shared flag holding the signal that cancelled the run
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    signal: Arc<AtomicI32>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a cancelling signal. The first signal wins.
    pub fn cancel(&self, signal: i32) {
        let _ = self
            .signal
            .compare_exchange(0, signal, Ordering::SeqCst, Ordering::SeqCst);
    }

    pub fn signal(&self) -> Option<i32> {
        match self.signal.load(Ordering::SeqCst) {
            0 => None,
            signal => Some(signal),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.signal().is_some()
    }
}

/// Route SIGINT, SIGTERM and SIGHUP into `token`.
///
/// The signals are blocked on the calling thread and a dedicated thread
/// waits for them, so this must run before any other thread is spawned.
/// Children get a clean signal mask from `std::process::Command`.
#[cfg(unix)]
pub fn install_signal_handler(token: CancelToken) -> Result<()> {
    use nix::sys::signal::{SigSet, Signal};

    let mut set = SigSet::empty();
    set.add(Signal::SIGINT);
    set.add(Signal::SIGTERM);
    set.add(Signal::SIGHUP);
    set.thread_block()
        .map_err(|e| BmkError::io("failed to block signals", e.into()))?;

    std::thread::Builder::new()
        .name("bmk-signals".to_string())
        .spawn(move || {
            while let Ok(signal) = set.wait() {
                tracing::debug!(?signal, "received signal, cancelling run");
                token.cancel(signal as i32);
            }
        })
        .map_err(|e| BmkError::io("failed to start signal thread", e))?;

    Ok(())
}

/// Route Ctrl+C into `token`. The platform does not report which signal
/// fired, so it is recorded as SIGINT.
#[cfg(not(unix))]
pub fn install_signal_handler(token: CancelToken) -> Result<()> {
    ctrlc::set_handler(move || token.cancel(SIGINT)).map_err(|e| {
        BmkError::io(
            "failed to set Ctrl+C handler",
            std::io::Error::other(e.to_string()),
        )
    })
}
