//! Pico Discovery
//!
//! Pico devices announce themselves by broadcasting state frames on UDP
//! port 43210, so discovery is passive: bind the broadcast port, wait for
//! the first well-formed frame, record its sender. No probe is sent.
//!
//! The UDP socket lives only for the duration of [`discover`]; the caller
//! then opens a TCP session to the discovered address (see `pico-client`).

pub mod device;
pub mod error;

pub use device::DiscoveredDevice;
pub use error::{DiscoveryError, Result};

use pico_transport::UdpListener;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

/// Discovery configuration
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Broadcast port to listen on
    pub port: u16,
    /// How long to wait for a broadcast; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: pico_core::DEFAULT_UDP_PORT,
            timeout: None,
        }
    }
}

/// Wait for the first valid broadcast and return its sender.
///
/// Broadcasts are unordered and may be lost; the listener simply waits for
/// the next one. Undecodable datagrams never abort the wait.
pub async fn discover(config: &DiscoveryConfig) -> Result<DiscoveredDevice> {
    let mut listener = UdpListener::bind(config.port).await?;

    let (addr, msg) = match config.timeout {
        Some(deadline) => timeout(deadline, listener.recv())
            .await
            .map_err(|_| DiscoveryError::Timeout)??,
        None => listener.recv().await?,
    };

    info!(
        "Discovered device at {} (serial {:#010x})",
        addr, msg.serial
    );

    // Listener drops here: the broadcast socket is released before the
    // caller opens TCP.
    Ok(DiscoveredDevice {
        addr,
        serial: msg.serial,
    })
}
