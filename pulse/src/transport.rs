//! UDP plumbing: socket construction and the three-message rendezvous.
//!
//! The rendezvous is line-oriented text; everything after it is raw
//! payload bytes with packet boundaries as the only framing.

use crate::error::{PulseError, Result};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::{SystemTime, UNIX_EPOCH};

/// Max datagram we ever read (matches the original probe's line buffer)
pub const MAX_DATAGRAM: usize = 4096;

/// Socket buffer size (8MB, ample for a full-rate schedule)
const SOCKET_BUFFER_SIZE: usize = 8 * 1024 * 1024;

/// Opening message of the rendezvous.
pub const HELLO: &str = "Hello from client";

fn new_udp_socket(bind: SocketAddrV4) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_send_buffer_size(SOCKET_BUFFER_SIZE)?;
    socket.set_recv_buffer_size(SOCKET_BUFFER_SIZE)?;
    socket.bind(&SocketAddr::V4(bind).into())?;
    Ok(socket.into())
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Sending side: a socket connected to one fixed peer.
pub struct ProbeSender {
    socket: UdpSocket,
}

impl ProbeSender {
    pub fn connect(peer: SocketAddr) -> Result<Self> {
        let socket = new_udp_socket(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0))?;
        socket.connect(peer)?;
        Ok(Self { socket })
    }

    /// Run the client half of the rendezvous. Returns the receipt line
    /// sent back to the server (for the caller to echo to the console).
    pub fn handshake(&self) -> Result<String> {
        self.socket.send(HELLO.as_bytes())?;
        let mut buf = [0u8; MAX_DATAGRAM];
        let _n = self.socket.recv(&mut buf)?;
        trace_debug!(len = _n, "rendezvous response received");
        let msg = format!("client (received): {}\n", epoch_secs());
        self.socket.send(msg.as_bytes())?;
        Ok(msg)
    }

    pub fn send(&self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send(payload)
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

/// Receiving side: a bound socket logging whatever arrives.
pub struct ProbeReceiver {
    socket: UdpSocket,
}

impl ProbeReceiver {
    pub fn bind(port: u16) -> Result<Self> {
        let socket = new_udp_socket(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port))?;
        Ok(Self { socket })
    }

    /// Run the server half of the rendezvous: wait for the hello, reply
    /// with a timestamp line, consume the client's receipt line. Returns
    /// the peer address and the response line for console echo.
    pub fn handshake(&self) -> Result<(SocketAddr, String)> {
        let mut buf = [0u8; MAX_DATAGRAM];
        let (n, peer) = self.socket.recv_from(&mut buf)?;
        if &buf[..n] != HELLO.as_bytes() {
            return Err(PulseError::handshake(format!(
                "unexpected opening message from {}",
                peer
            )));
        }
        let msg = format!("server (response sent): {}\n", epoch_secs());
        self.socket.send_to(msg.as_bytes(), peer)?;
        // Third rendezvous message; arrival records start after it.
        let (_n, _) = self.socket.recv_from(&mut buf)?;
        trace_debug!(len = _n, "rendezvous receipt consumed");
        Ok((peer, msg))
    }

    /// Block for the next datagram; the caller handles EINTR.
    pub fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        let (n, _) = self.socket.recv_from(buf)?;
        Ok(n)
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}
