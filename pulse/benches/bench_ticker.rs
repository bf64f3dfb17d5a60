//! Ticker benchmark - wheel vs scan dispatch cost per tick.

use criterion::{criterion_group, criterion_main, Criterion};
use pulse::{Schedule, ScheduleEntry, Ticker};
use std::hint::black_box;

/// Streams in the benchmark schedule
const N_STREAMS: u32 = 1000;

fn bench_schedule() -> Schedule {
    Schedule::from_entries(
        (0..N_STREAMS)
            .map(|i| ScheduleEntry {
                period: i % 97 + 1,
                len: 64,
            })
            .collect(),
    )
}

fn bench_advance(c: &mut Criterion) {
    let schedule = bench_schedule();

    c.bench_function("wheel_advance", |b| {
        let mut ticker = Ticker::with_budget(&schedule, u64::MAX);
        assert!(ticker.is_wheel());
        let mut due = Vec::with_capacity(schedule.len());
        let mut tick = 0u64;
        b.iter(|| {
            tick += 1;
            ticker.advance(tick, &mut due);
            black_box(due.len())
        })
    });

    c.bench_function("scan_advance", |b| {
        let mut ticker = Ticker::with_budget(&schedule, 0);
        assert!(!ticker.is_wheel());
        let mut due = Vec::with_capacity(schedule.len());
        let mut tick = 0u64;
        b.iter(|| {
            tick += 1;
            ticker.advance(tick, &mut due);
            black_box(due.len())
        })
    });
}

criterion_group!(benches, bench_advance);
criterion_main!(benches);
