//! Append-only arrival log on the receiving side.
//!
//! The log grows for the whole run and is written out once, on the way
//! out of the process. Flushing never clears it; a repeat flush is the
//! drain controller's problem, not this module's.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Where the receiver persists its log, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "server-log.txt";

/// Initial backing capacity (the original probe pre-sized for 2000 arrivals)
const INITIAL_CAPACITY: usize = 2000;

/// One received datagram: wall-clock arrival time at millisecond
/// resolution, and its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrivalRecord {
    pub secs: i64,
    pub millis: u16,
    pub len: usize,
}

impl ArrivalRecord {
    /// Stamp an arrival of `len` bytes with the current wall clock.
    pub fn now(len: usize) -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            secs: elapsed.as_secs() as i64,
            millis: elapsed.subsec_millis() as u16,
            len,
        }
    }
}

/// Append-only record store. Backing storage doubles when full and
/// never shrinks. Appends are amortized O(1); a flush triggered while
/// an append is in flight may lose that one record, never an earlier one.
pub struct ArrivalLog {
    records: Vec<ArrivalRecord>,
}

impl ArrivalLog {
    pub fn new() -> Self {
        Self {
            records: Vec::with_capacity(INITIAL_CAPACITY),
        }
    }

    pub fn append(&mut self, record: ArrivalRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every record, in append order, to `path`, replacing any
    /// previous contents.
    pub fn flush_to(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        for r in &self.records {
            writeln!(out, "t = {}.{:03},  len = {}", r.secs, r.millis, r.len)?;
        }
        out.flush()
    }
}

impl Default for ArrivalLog {
    fn default() -> Self {
        Self::new()
    }
}
