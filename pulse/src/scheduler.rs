//! Per-tick dispatch for a schedule of periodic streams.
//!
//! Two algorithms, chosen once at build time from the schedule's shape:
//!
//! - **Tick wheel**: `max_period` buckets, each holding the stream
//!   indices due on the tick its offset maps to. Every advance drains one
//!   bucket and reinserts each fired stream one period ahead, so the work
//!   per tick is proportional to the streams actually firing - amortized
//!   O(1) per tick over a full wheel revolution. Memory is bounded by
//!   `max_period * N`, which is why it is gated behind a budget.
//! - **Linear scan**: test `tick % period == 0` for every stream, O(N)
//!   per tick and O(N) memory. The fallback when the wheel would blow
//!   the budget (few streams with very large periods).
//!
//! Ticks are 1-based and must be advanced sequentially; the wheel keys
//! its cursor off the call sequence, not the tick argument.

use crate::schedule::Schedule;

/// Wheel memory budget: fall back to the scan when `max_period * N`
/// exceeds this (same ceiling as the original probe, ~25M slots).
pub const DEFAULT_WHEEL_BUDGET: u64 = 25_000_000;

/// Tick dispatcher. Built once per run; `advance` is called for ticks
/// 1, 2, 3, ... in order.
pub enum Ticker {
    Wheel(TickWheel),
    Scan(ScanTicker),
}

impl Ticker {
    pub fn new(schedule: &Schedule) -> Self {
        Self::with_budget(schedule, DEFAULT_WHEEL_BUDGET)
    }

    /// Algorithm selection happens here, once: wheel if it fits the
    /// memory budget, scan otherwise.
    pub fn with_budget(schedule: &Schedule, budget: u64) -> Self {
        let cost = schedule.max_period() as u64 * schedule.len() as u64;
        if cost > budget {
            Ticker::Scan(ScanTicker::new(schedule))
        } else {
            Ticker::Wheel(TickWheel::new(schedule))
        }
    }

    /// Collect into `due` the stream indices firing at `tick` (cleared
    /// first), in ascending stream index. The wheel's internal bucket
    /// order is reinsertion order, which diverges from the scan's after
    /// the first revolution; sorting here keeps the two algorithms
    /// interchangeable tick for tick.
    pub fn advance(&mut self, tick: u64, due: &mut Vec<usize>) {
        match self {
            Ticker::Wheel(w) => {
                w.advance(due);
                due.sort_unstable();
            }
            Ticker::Scan(s) => s.advance(tick, due),
        }
    }

    pub fn is_wheel(&self) -> bool {
        matches!(self, Ticker::Wheel(_))
    }
}

/// Exact algorithm: one bucket per tick offset modulo `max_period`.
///
/// Invariant: between advances every stream index sits in exactly one
/// bucket, so the union of all buckets is always `{0, .., N-1}`.
pub struct TickWheel {
    buckets: Vec<Vec<usize>>,
    periods: Vec<u32>,
    cursor: usize,
}

impl TickWheel {
    pub fn new(schedule: &Schedule) -> Self {
        let max_period = schedule.max_period() as usize;
        let periods: Vec<u32> = schedule.entries().iter().map(|e| e.period).collect();
        let mut buckets = vec![Vec::new(); max_period];
        // Stream i first fires at the smallest tick >= 1 divisible by
        // its period, i.e. at tick `period`, which is bucket offset
        // `period - 1` from the cursor's starting position.
        for (i, &p) in periods.iter().enumerate() {
            buckets[(p as usize - 1) % max_period].push(i);
        }
        Self {
            buckets,
            periods,
            cursor: 0,
        }
    }

    /// Drain the bucket under the cursor into `due` (cleared first), in
    /// raw bucket order, and reschedule every fired stream.
    pub fn advance(&mut self, due: &mut Vec<usize>) {
        due.clear();
        let max_period = self.buckets.len();
        let fired = std::mem::take(&mut self.buckets[self.cursor]);
        for &i in &fired {
            // Reinsert one period ahead. period == max_period lands back
            // in the bucket just drained, due again on the next wrap.
            let slot = (self.cursor + self.periods[i] as usize) % max_period;
            self.buckets[slot].push(i);
        }
        due.extend_from_slice(&fired);
        self.cursor = (self.cursor + 1) % max_period;
    }

    /// Total stream indices across all buckets. Always equals N.
    pub fn population(&self) -> usize {
        self.buckets.iter().map(|b| b.len()).sum()
    }
}

/// Fallback algorithm: divisibility test over every stream, every tick.
pub struct ScanTicker {
    periods: Vec<u32>,
}

impl ScanTicker {
    pub fn new(schedule: &Schedule) -> Self {
        Self {
            periods: schedule.entries().iter().map(|e| e.period).collect(),
        }
    }

    pub fn advance(&mut self, tick: u64, due: &mut Vec<usize>) {
        due.clear();
        for (i, &p) in self.periods.iter().enumerate() {
            if tick % p as u64 == 0 {
                due.push(i);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{Schedule, ScheduleEntry};

    fn schedule(pairs: &[(u32, usize)]) -> Schedule {
        Schedule::from_entries(
            pairs
                .iter()
                .map(|&(period, len)| ScheduleEntry { period, len })
                .collect(),
        )
    }

    #[test]
    fn worked_scenario() {
        // [(2,10),(3,20)]: stream 0 at {2,4,6}, stream 1 at {3,6},
        // tick 6 fires both with stream 0 first.
        let s = schedule(&[(2, 10), (3, 20)]);
        let mut ticker = Ticker::new(&s);
        assert!(ticker.is_wheel());
        let mut due = Vec::new();
        let mut firings = Vec::new();
        for tick in 1..=6 {
            ticker.advance(tick, &mut due);
            firings.push(due.clone());
        }
        assert_eq!(
            firings,
            vec![
                vec![],
                vec![0],
                vec![1],
                vec![0],
                vec![],
                vec![0, 1],
            ]
        );
    }

    #[test]
    fn period_1_fires_every_tick() {
        let s = schedule(&[(1, 100)]);
        let mut ticker = Ticker::new(&s);
        let mut due = Vec::new();
        for tick in 1..=10 {
            ticker.advance(tick, &mut due);
            assert_eq!(due, vec![0], "tick {}", tick);
        }
    }

    #[test]
    fn budget_selects_scan() {
        let s = schedule(&[(1000, 10), (2000, 20)]);
        // max_period * N = 4000 > 100
        assert!(!Ticker::with_budget(&s, 100).is_wheel());
        assert!(Ticker::with_budget(&s, 4000).is_wheel());
    }

    #[test]
    fn wheel_scan_equivalence() {
        let pairs: Vec<(u32, usize)> = vec![
            (1, 10),
            (2, 20),
            (3, 30),
            (5, 40),
            (7, 50),
            (7, 60),
            (12, 70),
            (1, 80),
        ];
        let s = schedule(&pairs);
        let mut wheel = Ticker::with_budget(&s, u64::MAX);
        let mut scan = Ticker::with_budget(&s, 0);
        assert!(wheel.is_wheel());
        assert!(!scan.is_wheel());
        let (mut wheel_due, mut scan_due) = (Vec::new(), Vec::new());
        // Two full revolutions of the largest period plus a remainder.
        for tick in 1..=30 {
            wheel.advance(tick, &mut wheel_due);
            scan.advance(tick, &mut scan_due);
            assert_eq!(wheel_due, scan_due, "tick {}", tick);
        }
    }

    #[test]
    fn raw_bucket_order_diverges_after_reinsertion() {
        // Stream 1 is reinserted at tick 3 and stream 0 at tick 4, so by
        // tick 6 the shared bucket holds [1, 0]. Ticker::advance sorts
        // this back to ascending index; the raw wheel does not.
        let s = schedule(&[(2, 10), (3, 20)]);
        let mut wheel = TickWheel::new(&s);
        let mut due = Vec::new();
        for _ in 1..=6 {
            wheel.advance(&mut due);
        }
        assert_eq!(due, vec![1, 0]);
    }

    #[test]
    fn wheel_population_invariant() {
        let s = schedule(&[(2, 10), (3, 20), (3, 30), (5, 40), (8, 50)]);
        let mut wheel = TickWheel::new(&s);
        assert_eq!(wheel.population(), 5);
        let mut due = Vec::new();
        for _ in 1..=40 {
            wheel.advance(&mut due);
            assert_eq!(wheel.population(), 5);
        }
    }

    #[test]
    fn period_equal_to_max_wraps() {
        // Single stream whose period equals the wheel size: reinsertion
        // lands in the just-drained bucket and fires once per revolution.
        let s = schedule(&[(4, 10)]);
        let mut ticker = Ticker::new(&s);
        let mut due = Vec::new();
        let mut fired_at = Vec::new();
        for tick in 1..=12 {
            ticker.advance(tick, &mut due);
            if !due.is_empty() {
                fired_at.push(tick);
            }
        }
        assert_eq!(fired_at, vec![4, 8, 12]);
    }

    #[test]
    fn empty_schedule_never_fires() {
        let s = schedule(&[]);
        let mut ticker = Ticker::new(&s);
        let mut due = Vec::new();
        for tick in 1..=5 {
            ticker.advance(tick, &mut due);
            assert!(due.is_empty());
        }
    }
}
