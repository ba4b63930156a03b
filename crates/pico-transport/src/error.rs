//! Transport error types

use pico_core::MessageType;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransportError>;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("peer closed the connection mid-frame")]
    Eof,

    #[error("operation timed out")]
    Timeout,

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("unexpected response type: expected {expected:?}, got {found:?}")]
    UnexpectedType {
        expected: MessageType,
        found: MessageType,
    },

    #[error("protocol error: {0}")]
    Protocol(#[from] pico_core::Error),
}
