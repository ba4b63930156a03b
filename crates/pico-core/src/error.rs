//! Error types for the Pico codec

use crate::types::MessageType;
use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pico codec error types
///
/// Framing and field errors carry byte offsets for diagnostics. A decode
/// that fails never yields a partially constructed [`Message`](crate::Message).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input shorter than a frame header plus checksum
    #[error("frame too short: {len} bytes")]
    Truncated { len: usize },

    /// Non-zero byte inside the five-byte preamble
    #[error("invalid preamble byte at offset {offset}: expected 0x00, got 0x{found:02x}")]
    Preamble { offset: usize, found: u8 },

    /// Byte 5 is not the header marker
    #[error("invalid header marker: expected 0xff, got 0x{found:02x}")]
    HeaderMarker { found: u8 },

    /// Input size disagrees with the header length field
    #[error("length mismatch: header claims {expected} bytes, frame carries {found}")]
    Length { expected: usize, found: usize },

    /// Byte before the CRC is not the checksum marker
    #[error("invalid checksum marker at offset {offset}: expected 0xff, got 0x{found:02x}")]
    ChecksumMarker { offset: usize, found: u8 },

    /// Trailing CRC does not match the computed one
    #[error("checksum mismatch: expected 0x{expected:04x}, got 0x{found:04x}")]
    Checksum { expected: u16, found: u16 },

    /// Field does not start with the marker byte
    #[error("invalid field marker at offset {offset}: expected 0xff, got 0x{found:02x}")]
    FieldMarker { offset: usize, found: u8 },

    /// Text field is not valid UTF-8
    #[error("invalid utf-8 in text field at offset {offset}")]
    FieldTextEncoding { offset: usize },

    /// Field runs past the end of the payload
    #[error("field truncated at offset {offset}")]
    FieldTruncated { offset: usize },

    /// Unrecognized field type code (strict decode only)
    #[error("unknown field type 0x{type_code:02x} at offset {offset}")]
    UnknownFieldType { offset: usize, type_code: u8 },

    /// Projection needs a field the message does not carry
    #[error("missing field id {id}")]
    MissingField { id: u8 },

    /// Projection applied to the wrong message type
    #[error("wrong message type: expected {expected:?}, got {found:?}")]
    WrongMessageType {
        expected: MessageType,
        found: MessageType,
    },
}
