//! Stream schedule: the ordered `(period, len)` pairs the sender multiplexes.
//!
//! Loaded once at startup from a spec file (or the built-in default of a
//! single full-size stream at every tick) and immutable afterwards. A
//! stream is identified by its 0-based position in the schedule.

use crate::error::Result;
use std::path::Path;

/// Max payload length accepted from a spec file (Ethernet MTU)
pub const MAX_PAYLOAD: usize = 1500;

/// One periodic stream: fire a `len`-byte datagram every `period` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    /// Ticks between firings, >= 1
    pub period: u32,
    /// Payload length in bytes, <= MAX_PAYLOAD
    pub len: usize,
}

/// Immutable ordered list of streams. Order matters only as the tie-break
/// for streams firing on the same tick.
#[derive(Debug, Clone)]
pub struct Schedule {
    entries: Vec<ScheduleEntry>,
}

impl Schedule {
    pub fn from_entries(entries: Vec<ScheduleEntry>) -> Self {
        Self { entries }
    }

    /// Built-in default: one stream, period 1 tick, len 1500 bytes.
    pub fn default_single() -> Self {
        Self {
            entries: vec![ScheduleEntry {
                period: 1,
                len: MAX_PAYLOAD,
            }],
        }
    }

    /// Load a schedule from a spec file: one `<period> <len>` pair per line.
    ///
    /// Parsing stops at the first line that is not exactly two integers
    /// with `period >= 1` and `len <= 1500`; the schedule is silently
    /// truncated there and the rest of the file is ignored. This mirrors
    /// the original probe's behavior and is deliberately not an error.
    pub fn from_spec_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        for line in text.lines() {
            match parse_line(line) {
                Some(entry) => entries.push(entry),
                None => break,
            }
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Largest period in the schedule, at least 1 even when empty.
    pub fn max_period(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.period)
            .max()
            .unwrap_or(1)
            .max(1)
    }
}

fn parse_line(line: &str) -> Option<ScheduleEntry> {
    let mut fields = line.split_whitespace();
    let period: u32 = fields.next()?.parse().ok()?;
    let len: usize = fields.next()?.parse().ok()?;
    if fields.next().is_some() || period < 1 || len > MAX_PAYLOAD {
        return None;
    }
    Some(ScheduleEntry { period, len })
}
