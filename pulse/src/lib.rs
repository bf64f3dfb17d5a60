//! # pulse
//!
//! UDP load-generation probe.
//!
//! A sender multiplexes many independently-periodic streams onto one
//! discrete clock and emits a random payload per firing; a receiver
//! timestamps every arrival and persists the log even when it is
//! killed mid-run.
//!
//! ## Components
//!
//! - [`Schedule`]: ordered `(period, len)` pairs loaded from a spec file
//! - [`Ticker`]: per-tick dispatch, tick wheel or linear scan
//! - [`PayloadGenerator`]: random printable payloads
//! - [`ProbeSender`] / [`ProbeReceiver`]: UDP plumbing and the
//!   three-message rendezvous
//! - [`ArrivalLog`]: append-only arrival records with a one-shot flush
//! - [`DrainController`]: signal-driven shutdown that flushes exactly once

// Tracing macros - no-op when feature disabled
#[cfg(feature = "tracing")]
macro_rules! trace_debug { ($($arg:tt)*) => { tracing::debug!($($arg)*) } }
#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug { ($($arg:tt)*) => {} }

#[cfg(feature = "tracing")]
macro_rules! trace_warn { ($($arg:tt)*) => { tracing::warn!($($arg)*) } }
#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn { ($($arg:tt)*) => {} }

pub mod drain;
pub mod error;
pub mod log;
pub mod payload;
pub mod schedule;
pub mod scheduler;
pub mod transport;

pub use drain::{DrainController, DrainState};
pub use error::{PulseError, Result};
pub use log::{ArrivalLog, ArrivalRecord, DEFAULT_LOG_PATH};
pub use payload::PayloadGenerator;
pub use schedule::{Schedule, ScheduleEntry, MAX_PAYLOAD};
pub use scheduler::{Ticker, DEFAULT_WHEEL_BUDGET};
pub use transport::{ProbeReceiver, ProbeSender, MAX_DATAGRAM};

#[cfg(test)]
mod tests {
    use crate::schedule::Schedule;
    use crate::scheduler::Ticker;

    #[test]
    fn test_default_schedule_ticks() {
        let schedule = Schedule::default_single();
        let mut ticker = Ticker::new(&schedule);
        let mut due = Vec::new();
        ticker.advance(1, &mut due);
        assert_eq!(due, vec![0]);
    }
}
