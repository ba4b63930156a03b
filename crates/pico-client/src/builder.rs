//! Client builder

use crate::client::PicoClient;
use crate::error::Result;
use pico_discovery::{discover, DiscoveryConfig};
use pico_transport::{TcpChannel, TcpConfig};
use std::time::Duration;
use tracing::info;

/// Builder for [`PicoClient`]
///
/// With no host set, [`connect`](Self::connect) discovers the device by
/// waiting for its UDP broadcast first.
pub struct PicoClientBuilder {
    host: Option<String>,
    tcp_port: u16,
    udp_port: u16,
    timeout: Duration,
    discovery_timeout: Option<Duration>,
}

impl PicoClientBuilder {
    pub fn new() -> Self {
        Self {
            host: None,
            tcp_port: pico_core::DEFAULT_TCP_PORT,
            udp_port: pico_core::DEFAULT_UDP_PORT,
            timeout: Duration::from_secs(5),
            discovery_timeout: None,
        }
    }

    /// Set the device address, skipping discovery.
    pub fn host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    /// Set the TCP control port (default 5001).
    pub fn tcp_port(mut self, port: u16) -> Self {
        self.tcp_port = port;
        self
    }

    /// Set the UDP broadcast port used for discovery (default 43210).
    pub fn udp_port(mut self, port: u16) -> Self {
        self.udp_port = port;
        self
    }

    /// Set the request deadline (default 5 s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bound the discovery wait; by default it waits forever.
    pub fn discovery_timeout(mut self, timeout: Duration) -> Self {
        self.discovery_timeout = Some(timeout);
        self
    }

    /// Discover the device if needed, then open the control session.
    pub async fn connect(self) -> Result<PicoClient> {
        let host = match self.host {
            Some(host) => host,
            None => {
                let config = DiscoveryConfig {
                    port: self.udp_port,
                    timeout: self.discovery_timeout,
                };
                let device = discover(&config).await?;
                info!("Using discovered device at {}", device.addr.ip());
                device.addr.ip().to_string()
            }
        };

        let config = TcpConfig {
            timeout: self.timeout,
            ..TcpConfig::default()
        };
        let channel = TcpChannel::connect_with_config(&host, self.tcp_port, config).await?;
        Ok(PicoClient::from_channel(channel))
    }
}

impl Default for PicoClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
