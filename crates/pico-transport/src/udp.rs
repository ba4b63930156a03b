//! UDP broadcast listener
//!
//! The device broadcasts state frames on UDP port 43210. The listener is
//! receive-only: it binds the wildcard address with the reuse options the
//! vendor app relies on (several listeners may share the port) and yields
//! decoded frames together with the sender address. Datagrams that fail to
//! decode are dropped, not surfaced: the broadcast port sees arbitrary
//! traffic in the field.

use pico_core::Message;
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::error::Result;

/// UDP listener configuration
#[derive(Debug, Clone)]
pub struct UdpConfig {
    /// Receive buffer size; broadcasts larger than this are truncated by
    /// the OS and will fail to decode
    pub recv_buffer_size: usize,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            recv_buffer_size: 8192,
        }
    }
}

/// A bound broadcast listener
///
/// Owns its socket exclusively; the socket closes when the listener drops.
pub struct UdpListener {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpListener {
    /// Bind `0.0.0.0:port` with default configuration.
    pub async fn bind(port: u16) -> Result<Self> {
        Self::bind_with_config(port, UdpConfig::default()).await
    }

    /// Bind with explicit configuration.
    pub async fn bind_with_config(port: u16, config: UdpConfig) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        #[cfg(all(unix, not(any(target_os = "solaris", target_os = "illumos"))))]
        socket.set_reuse_port(true)?;
        socket.set_broadcast(true)?;
        socket.set_nonblocking(true)?;
        socket.bind(&SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port)).into())?;

        let socket = UdpSocket::from_std(socket.into())?;
        info!(
            "Listening for broadcasts on {}",
            socket.local_addr()?
        );

        Ok(Self {
            socket,
            buf: vec![0u8; config.recv_buffer_size],
        })
    }

    /// The bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Receive the next datagram that decodes as a valid frame.
    ///
    /// Invalid datagrams are logged at debug level and skipped; only socket
    /// errors surface.
    pub async fn recv(&mut self) -> Result<(SocketAddr, Message)> {
        loop {
            match self.recv_raw().await? {
                (addr, Ok(msg)) => {
                    debug!("Broadcast {:?} from {}", msg.message_type, addr);
                    return Ok((addr, msg));
                }
                (addr, Err(e)) => {
                    debug!("Dropping undecodable datagram from {}: {}", addr, e);
                }
            }
        }
    }

    /// Receive the next datagram with its decode result, valid or not.
    pub async fn recv_raw(&mut self) -> Result<(SocketAddr, pico_core::Result<Message>)> {
        let (len, addr) = self.socket.recv_from(&mut self.buf).await?;
        Ok((addr, Message::decode(&self.buf[..len])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pico_core::{Field, MessageType};

    async fn bind_loopback() -> (UdpListener, SocketAddr) {
        let listener = UdpListener::bind(0).await.unwrap();
        let mut addr = listener.local_addr().unwrap();
        addr.set_ip(Ipv4Addr::LOCALHOST.into());
        (listener, addr)
    }

    #[tokio::test]
    async fn test_recv_valid_frame() {
        let (mut listener, addr) = bind_loopback().await;

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let broadcast = Message::new(MessageType::SensorState)
            .with_serial(0x84B3_EE93)
            .with_fields(vec![Field::integer(2, -1002)]);
        sender.send_to(&broadcast.encode(), addr).await.unwrap();

        let (from, msg) = listener.recv().await.unwrap();
        assert_eq!(from.port(), sender.local_addr().unwrap().port());
        assert_eq!(msg, broadcast);
    }

    #[tokio::test]
    async fn test_garbage_is_skipped() {
        let (mut listener, addr) = bind_loopback().await;

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(b"not a pico frame", addr).await.unwrap();
        sender.send_to(&[0x00; 20], addr).await.unwrap();

        let valid = Message::new(MessageType::SystemInfo).with_serial(7);
        sender.send_to(&valid.encode(), addr).await.unwrap();

        let (_, msg) = listener.recv().await.unwrap();
        assert_eq!(msg, valid);
    }

    #[tokio::test]
    async fn test_recv_raw_surfaces_decode_errors() {
        let (mut listener, addr) = bind_loopback().await;

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        sender.send_to(b"garbage", addr).await.unwrap();

        let (_, result) = listener.recv_raw().await.unwrap();
        assert!(result.is_err());
    }
}
