//! Error types for pulse.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PulseError>;

#[derive(Error, Debug)]
pub enum PulseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("send failed (tick {tick}, line {line}, len {len}): {source}")]
    Send {
        tick: u64,
        line: usize,
        len: usize,
        source: std::io::Error,
    },
}

impl PulseError {
    pub fn handshake(msg: impl Into<String>) -> Self {
        Self::Handshake(msg.into())
    }
}
