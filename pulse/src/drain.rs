//! Receiver shutdown: turn an asynchronous termination request into
//! exactly one log flush.
//!
//! The signal handler itself does no I/O and no allocation: it stores
//! the signal number into a process-wide atomic and returns. Handlers
//! are installed without `SA_RESTART`, so a blocking `recv_from` on the
//! main path returns `EINTR` and the receive loop - ordinary sequential
//! context - performs the flush and exits. The flush guard is therefore
//! a plain field: only the main control flow ever reaches it.
//!
//! Unix-only: relies on `sigaction` semantics (the delivered signal is
//! masked for the duration of its own handler, so the store cannot race
//! with itself on one thread).

use crate::log::ArrivalLog;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicI32, Ordering};

/// Signal number delivered by the handler, 0 when none is pending.
static PENDING_SIGNAL: AtomicI32 = AtomicI32::new(0);

extern "C" fn drain_handler(signum: libc::c_int) {
    PENDING_SIGNAL.store(signum, Ordering::Relaxed);
}

/// Shutdown progress. Monotonic: a process passes through each state
/// at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainState {
    Running,
    Draining,
    Terminated,
}

/// Drives the receiver from running to terminated with exactly one
/// flush, whatever mixture of signals and I/O errors triggers it.
pub struct DrainController {
    state: DrainState,
}

impl DrainController {
    /// Install handlers for SIGINT, SIGHUP and SIGTERM.
    pub fn install() -> io::Result<Self> {
        for sig in [libc::SIGINT, libc::SIGHUP, libc::SIGTERM] {
            install_handler(sig)?;
        }
        Ok(Self {
            state: DrainState::Running,
        })
    }

    /// Controller for tests and error-path-only use; installs nothing.
    pub fn unarmed() -> Self {
        Self {
            state: DrainState::Running,
        }
    }

    pub fn state(&self) -> DrainState {
        self.state
    }

    /// Signal delivered since the last check, if any.
    pub fn pending_signal(&self) -> Option<i32> {
        match PENDING_SIGNAL.load(Ordering::Relaxed) {
            0 => None,
            sig => Some(sig),
        }
    }

    /// First call: flush `log` to `path` and move to Draining. Every
    /// later call is a no-op, so a repeated termination trigger cannot
    /// rewrite the file.
    pub fn drain(&mut self, log: &ArrivalLog, path: &Path) -> io::Result<()> {
        if self.state != DrainState::Running {
            trace_warn!("repeat drain trigger ignored; log already flushed");
            return Ok(());
        }
        self.state = DrainState::Draining;
        log.flush_to(path)
    }

    /// Restore the default disposition for `signum` and re-raise it, so
    /// the OS-visible termination cause is the original signal.
    pub fn exit_with_signal(mut self, signum: i32) -> ! {
        self.state = DrainState::Terminated;
        unsafe {
            libc::signal(signum, libc::SIG_DFL);
            libc::raise(signum);
        }
        // Only reached if the signal is discarded (should not happen for
        // the terminating signals we install).
        std::process::exit(128 + signum)
    }

    /// Terminal transition for the fatal-I/O-error path.
    pub fn terminate(&mut self) {
        self.state = DrainState::Terminated;
    }
}

fn install_handler(sig: libc::c_int) -> io::Result<()> {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = drain_handler as *const () as libc::sighandler_t;
        // No SA_RESTART: the blocking recv must come back with EINTR.
        action.sa_flags = 0;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(sig, &action, std::ptr::null_mut()) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::ArrivalRecord;

    #[test]
    fn drain_flushes_once() {
        let mut log = ArrivalLog::new();
        log.append(ArrivalRecord {
            secs: 10,
            millis: 500,
            len: 99,
        });
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server-log.txt");

        let mut drain = DrainController::unarmed();
        assert_eq!(drain.state(), DrainState::Running);
        drain.drain(&log, &path).unwrap();
        assert_eq!(drain.state(), DrainState::Draining);
        let first = std::fs::read_to_string(&path).unwrap();
        assert_eq!(first, "t = 10.500,  len = 99\n");

        // A second trigger arrives while draining: the guard must keep
        // the file from being rewritten with the grown log.
        log.append(ArrivalRecord {
            secs: 11,
            millis: 0,
            len: 1,
        });
        drain.drain(&log, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }

    #[test]
    fn states_are_monotonic() {
        let mut drain = DrainController::unarmed();
        let log = ArrivalLog::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server-log.txt");
        drain.drain(&log, &path).unwrap();
        drain.terminate();
        assert_eq!(drain.state(), DrainState::Terminated);
    }
}
