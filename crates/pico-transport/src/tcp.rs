//! TCP request/response channel
//!
//! The device speaks strict request/response on its control port: one frame
//! out, one frame back, no pipelining. Frames are length-delimited, so the
//! reader pulls the 13-byte header first, then exactly `length` more bytes.

use pico_core::{Message, MessageType, HEADER_SIZE};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::{Result, TransportError};

/// TCP channel configuration
#[derive(Debug, Clone)]
pub struct TcpConfig {
    /// Deadline for connect and for each request/response exchange
    pub timeout: Duration,
    /// Largest frame the reader will accept
    pub max_frame_size: usize,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_frame_size: 8192,
        }
    }
}

/// A connected request/response channel
///
/// Owns its socket exclusively; the socket closes when the channel drops.
/// `&mut self` on [`request`](Self::request) keeps the channel at one
/// in-flight exchange: the wire carries no correlation id (requests go out
/// with serial 0), so ordering is the only correlation there is.
pub struct TcpChannel {
    stream: TcpStream,
    config: TcpConfig,
    peer: SocketAddr,
}

impl TcpChannel {
    /// Connect with default configuration.
    pub async fn connect(host: &str, port: u16) -> Result<Self> {
        Self::connect_with_config(host, port, TcpConfig::default()).await
    }

    /// Connect with explicit configuration.
    pub async fn connect_with_config(host: &str, port: u16, config: TcpConfig) -> Result<Self> {
        let addr = format!("{}:{}", host, port);
        info!("Connecting to {}", addr);

        let stream = timeout(config.timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| TransportError::Timeout)?
            .map_err(|e| TransportError::Connect(format!("{}: {}", addr, e)))?;

        let peer = stream.peer_addr()?;
        info!("Connected to {}", peer);

        Ok(Self {
            stream,
            config,
            peer,
        })
    }

    /// The remote address.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Send a request and read back one complete frame.
    ///
    /// On timeout the socket is shut down and the channel should be
    /// dropped; a partially read frame is never surfaced.
    pub async fn request(&mut self, msg: &Message) -> Result<Message> {
        let encoded = msg.encode();
        debug!("Sending {:?} frame ({} bytes)", msg.message_type, encoded.len());

        let deadline = self.config.timeout;
        let max_frame_size = self.config.max_frame_size;
        let exchange = async {
            self.stream.write_all(&encoded).await.map_err(map_io)?;
            read_frame(&mut self.stream, max_frame_size).await
        };

        let frame = match timeout(deadline, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                warn!("Request to {} timed out", self.peer);
                let _ = self.stream.shutdown().await;
                return Err(TransportError::Timeout);
            }
        };

        debug!("Received {} bytes", frame.len());
        Ok(Message::decode(&frame)?)
    }

    /// Send a request and require a response of the given type.
    pub async fn request_expecting(
        &mut self,
        msg: &Message,
        expected: MessageType,
    ) -> Result<Message> {
        let response = self.request(msg).await?;
        if response.message_type != expected {
            return Err(TransportError::UnexpectedType {
                expected,
                found: response.message_type,
            });
        }
        Ok(response)
    }

    /// Shut down the channel, flushing the socket first.
    pub async fn shutdown(mut self) -> Result<()> {
        self.stream.shutdown().await.map_err(map_io)?;
        info!("Closed connection to {}", self.peer);
        Ok(())
    }
}

/// Read one length-delimited frame. `read_exact` loops over short reads; a
/// peer close mid-frame surfaces as [`TransportError::Eof`].
async fn read_frame(stream: &mut TcpStream, max_frame_size: usize) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    stream.read_exact(&mut header).await.map_err(map_io)?;

    let length = u16::from_be_bytes([header[11], header[12]]) as usize;
    let total = HEADER_SIZE + length;
    if total > max_frame_size {
        return Err(TransportError::FrameTooLarge {
            size: total,
            max: max_frame_size,
        });
    }

    let mut frame = vec![0u8; total];
    frame[..HEADER_SIZE].copy_from_slice(&header);
    stream.read_exact(&mut frame[HEADER_SIZE..]).await.map_err(map_io)?;

    Ok(frame)
}

fn map_io(e: std::io::Error) -> TransportError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        TransportError::Eof
    } else {
        TransportError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pico_core::{requests, Field, FieldValue, IntBytes, SystemInfo};
    use tokio::net::TcpListener;

    fn system_info_response() -> Message {
        Message::new(MessageType::SystemInfo)
            .with_serial(0x84B3_EE93)
            .with_fields(vec![
                Field::new(1, FieldValue::Integer(IntBytes::new([0x84, 0xB3, 0xEE, 0x93]))),
                Field::new(2, FieldValue::Integer(IntBytes::new([0x00, 0x01, 0x00, 0x15]))),
            ])
    }

    async fn one_shot_server(response: Vec<u8>) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let _ = stream.read(&mut buf).await.unwrap();
            stream.write_all(&response).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_request_response() {
        let addr = one_shot_server(system_info_response().encode().to_vec()).await;

        let mut channel = TcpChannel::connect("127.0.0.1", addr.port()).await.unwrap();
        let response = channel
            .request_expecting(&requests::system_info(), MessageType::SystemInfo)
            .await
            .unwrap();

        let info = SystemInfo::from_message(&response).unwrap();
        assert_eq!(info.serial, 0x84B3_EE93);
        assert_eq!(info.firmware_version(), "1.21");
    }

    #[tokio::test]
    async fn test_short_reads_are_looped() {
        // Server dribbles the response a few bytes at a time.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let _ = stream.read(&mut buf).await.unwrap();
            let response = system_info_response().encode();
            for chunk in response.chunks(5) {
                stream.write_all(chunk).await.unwrap();
                stream.flush().await.unwrap();
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        });

        let mut channel = TcpChannel::connect("127.0.0.1", addr.port()).await.unwrap();
        let response = channel.request(&requests::system_info()).await.unwrap();
        assert_eq!(response.message_type, MessageType::SystemInfo);
    }

    #[tokio::test]
    async fn test_unexpected_type() {
        let addr = one_shot_server(
            Message::new(MessageType::SensorState)
                .with_serial(1)
                .encode()
                .to_vec(),
        )
        .await;

        let mut channel = TcpChannel::connect("127.0.0.1", addr.port()).await.unwrap();
        let err = channel
            .request_expecting(&requests::system_info(), MessageType::SystemInfo)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::UnexpectedType {
                expected: MessageType::SystemInfo,
                found: MessageType::SensorState,
            }
        ));
    }

    #[tokio::test]
    async fn test_peer_close_mid_frame_is_eof() {
        // Server sends only half a frame, then closes.
        let half = system_info_response().encode().to_vec();
        let addr = one_shot_server(half[..10].to_vec()).await;

        let mut channel = TcpChannel::connect("127.0.0.1", addr.port()).await.unwrap();
        let err = channel.request(&requests::system_info()).await.unwrap_err();
        assert!(matches!(err, TransportError::Eof));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        // A header claiming a payload far past the configured cap.
        let mut frame = Message::new(MessageType::SystemInfo).encode().to_vec();
        frame[11] = 0xFF;
        frame[12] = 0xFF;
        let addr = one_shot_server(frame).await;

        let mut channel = TcpChannel::connect_with_config(
            "127.0.0.1",
            addr.port(),
            TcpConfig {
                timeout: Duration::from_secs(1),
                max_frame_size: 1024,
            },
        )
        .await
        .unwrap();

        let err = channel.request(&requests::system_info()).await.unwrap_err();
        assert!(matches!(err, TransportError::FrameTooLarge { .. }));
    }

    #[tokio::test]
    async fn test_timeout_on_silent_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_stream, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let mut channel = TcpChannel::connect_with_config(
            "127.0.0.1",
            addr.port(),
            TcpConfig {
                timeout: Duration::from_millis(50),
                max_frame_size: 8192,
            },
        )
        .await
        .unwrap();

        let err = channel.request(&requests::system_info()).await.unwrap_err();
        assert!(matches!(err, TransportError::Timeout));
    }
}
