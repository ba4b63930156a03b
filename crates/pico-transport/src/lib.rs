//! Pico Transport
//!
//! Network transports for the Simarine Pico protocol, built on the
//! `pico-core` codec:
//! - [`TcpChannel`] — request/response control channel (device port 5001)
//! - [`UdpListener`] — broadcast listener (device port 43210)
//!
//! Each transport owns its socket exclusively and releases it on drop. The
//! codec itself stays transport-agnostic.

pub mod error;
pub mod tcp;
pub mod udp;

pub use error::{Result, TransportError};
pub use tcp::{TcpChannel, TcpConfig};
pub use udp::{UdpConfig, UdpListener};
