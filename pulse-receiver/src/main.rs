//! Pulse receiver - timestamps arrivals, persists the log on the way out.
//!
//! Usage: pulse-receiver -p <port>
//!
//! One arrival record per datagram after the rendezvous, written to
//! `server-log.txt` exactly once when the process drains - whether the
//! trigger is SIGINT/SIGHUP/SIGTERM or a fatal receive error. On a
//! signal the original signal is re-raised after the flush so the exit
//! status reflects the real termination cause.

use pulse::{
    ArrivalLog, ArrivalRecord, DrainController, ProbeReceiver, DEFAULT_LOG_PATH, MAX_DATAGRAM,
};
use std::io::ErrorKind;
use std::path::Path;
use std::process;

fn usage(program: &str) -> ! {
    eprintln!("pulse-receiver: Usage: {} -p <port>", program);
    process::exit(1)
}

fn parse_port() -> u16 {
    let argv: Vec<String> = std::env::args().collect();
    let program = argv[0].clone();
    let mut port = None;
    let mut it = argv.iter().skip(1);
    while let Some(flag) = it.next() {
        match (flag.as_str(), it.next()) {
            ("-p", Some(value)) => port = value.parse().ok().or_else(|| usage(&program)),
            _ => usage(&program),
        }
    }
    port.unwrap_or_else(|| usage(&program))
}

fn main() {
    let port = parse_port();

    let receiver = match ProbeReceiver::bind(port) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("pulse-receiver: bind: {}", e);
            process::exit(1);
        }
    };

    match receiver.handshake() {
        Ok((peer, line)) => {
            print!("{}", line);
            println!("pulse-receiver: peer {}", peer);
        }
        Err(e) => {
            eprintln!("pulse-receiver: handshake: {}", e);
            process::exit(1);
        }
    }

    let mut drain = match DrainController::install() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("pulse-receiver: sigaction: {}", e);
            process::exit(1);
        }
    };

    let log_path = Path::new(DEFAULT_LOG_PATH);
    let mut log = ArrivalLog::new();
    let mut buf = [0u8; MAX_DATAGRAM];

    loop {
        // A signal may land between receives, not only inside one.
        if let Some(signum) = drain.pending_signal() {
            if let Err(e) = drain.drain(&log, log_path) {
                eprintln!("pulse-receiver: flush: {}", e);
            }
            drain.exit_with_signal(signum);
        }
        match receiver.recv(&mut buf) {
            Ok(len) => log.append(ArrivalRecord::now(len)),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                // Fatal receive error: same drain path as a signal, then
                // a plain failure exit.
                eprintln!("pulse-receiver: recvfrom: {}", e);
                if let Err(e) = drain.drain(&log, log_path) {
                    eprintln!("pulse-receiver: flush: {}", e);
                }
                drain.terminate();
                process::exit(1);
            }
        }
    }
}
