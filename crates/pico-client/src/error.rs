//! Client error types

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("discovery failed: {0}")]
    Discovery(#[from] pico_discovery::DiscoveryError),

    #[error("transport error: {0}")]
    Transport(#[from] pico_transport::TransportError),

    #[error("protocol error: {0}")]
    Protocol(#[from] pico_core::Error),
}
