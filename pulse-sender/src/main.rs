//! Pulse sender - UDP load generation on a discrete clock.
//!
//! Usage: pulse-sender -s <server_ip> -p <server_port> [-i <spec_file>]
//!                     [-t <tick_ms>] [-n <max_ticks>] [-m <wheel_budget>]
//!
//! Without `-i` the schedule is a single stream: one 1500-byte datagram
//! every tick.

use pulse::{PayloadGenerator, ProbeSender, PulseError, Schedule, Ticker, DEFAULT_WHEEL_BUDGET};
use std::net::{IpAddr, SocketAddr};
use std::process;
use std::time::Duration;

/// Tick interval when -t is not given
const DEFAULT_TICK_MS: u64 = 100;

/// Run length when -n is not given (the original probe's fixed bound)
const DEFAULT_MAX_TICKS: u64 = 700;

struct Args {
    server_ip: IpAddr,
    server_port: u16,
    spec_file: Option<String>,
    tick_ms: u64,
    max_ticks: u64,
    wheel_budget: u64,
}

fn usage(program: &str) -> ! {
    eprintln!(
        "pulse-sender: Usage: {} -s <server_ip> -p <server_port> \
         [-i <spec_file>] [-t <tick_ms>] [-n <max_ticks>] [-m <wheel_budget>]",
        program
    );
    process::exit(1)
}

fn parse_args() -> Args {
    let argv: Vec<String> = std::env::args().collect();
    let program = argv[0].clone();
    let mut server_ip = None;
    let mut server_port = None;
    let mut spec_file = None;
    let mut tick_ms = DEFAULT_TICK_MS;
    let mut max_ticks = DEFAULT_MAX_TICKS;
    let mut wheel_budget = DEFAULT_WHEEL_BUDGET;

    let mut it = argv.iter().skip(1);
    while let Some(flag) = it.next() {
        let Some(value) = it.next() else {
            usage(&program);
        };
        match flag.as_str() {
            "-s" => server_ip = value.parse().ok().or_else(|| usage(&program)),
            "-p" => server_port = value.parse().ok().or_else(|| usage(&program)),
            "-i" => spec_file = Some(value.clone()),
            "-t" => tick_ms = value.parse().unwrap_or_else(|_| usage(&program)),
            "-n" => max_ticks = value.parse().unwrap_or_else(|_| usage(&program)),
            "-m" => wheel_budget = value.parse().unwrap_or_else(|_| usage(&program)),
            _ => usage(&program),
        }
    }
    let (Some(server_ip), Some(server_port)) = (server_ip, server_port) else {
        usage(&program);
    };
    Args {
        server_ip,
        server_port,
        spec_file,
        tick_ms,
        max_ticks,
        wheel_budget,
    }
}

fn main() {
    let args = parse_args();

    let schedule = match &args.spec_file {
        Some(path) => match Schedule::from_spec_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("pulse-sender: unable to read `{}': {}", path, e);
                process::exit(1);
            }
        },
        None => Schedule::default_single(),
    };

    let peer = SocketAddr::new(args.server_ip, args.server_port);
    let sender = match ProbeSender::connect(peer) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("pulse-sender: socket: {}", e);
            process::exit(1);
        }
    };

    match sender.handshake() {
        Ok(line) => print!("{}", line),
        Err(e) => {
            eprintln!("pulse-sender: handshake: {}", e);
            process::exit(1);
        }
    }

    let mut ticker = Ticker::with_budget(&schedule, args.wheel_budget);
    println!(
        "pulse-sender: {} stream(s) → {} ({}, tick {} ms, {} ticks)",
        schedule.len(),
        peer,
        if ticker.is_wheel() { "wheel" } else { "scan" },
        args.tick_ms,
        args.max_ticks
    );

    let mut gen = PayloadGenerator::new();
    let tick_interval = Duration::from_millis(args.tick_ms);
    let mut due = Vec::with_capacity(schedule.len());

    for tick in 1..=args.max_ticks {
        std::thread::sleep(tick_interval);
        ticker.advance(tick, &mut due);
        for &i in &due {
            let len = schedule.entries()[i].len;
            if let Err(source) = sender.send(gen.fill(len)) {
                // 1-based line number: the stream's position in the spec file.
                let err = PulseError::Send {
                    tick,
                    line: i + 1,
                    len,
                    source,
                };
                eprintln!("pulse-sender: {}", err);
                process::exit(1);
            }
        }
    }
}
