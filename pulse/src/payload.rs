//! Random printable payloads for outgoing datagrams.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Characters a payload byte is drawn from, uniformly and independently.
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789,.-#'?!";

/// Payload source for one sender run. Seeded once from the clock at
/// construction; `fill` reuses an internal buffer, so the hot path does
/// not allocate after the first full-size payload.
pub struct PayloadGenerator {
    rng: StdRng,
    buf: Vec<u8>,
}

impl PayloadGenerator {
    pub fn new() -> Self {
        let micros = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .subsec_micros();
        Self::from_seed(micros as u64)
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            buf: Vec::new(),
        }
    }

    /// Produce exactly `len` random printable bytes.
    pub fn fill(&mut self, len: usize) -> &[u8] {
        self.buf.resize(len, 0);
        for b in &mut self.buf {
            *b = ALPHABET[self.rng.gen_range(0..ALPHABET.len())];
        }
        &self.buf
    }
}

impl Default for PayloadGenerator {
    fn default() -> Self {
        Self::new()
    }
}
