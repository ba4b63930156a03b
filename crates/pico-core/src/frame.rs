//! Binary frame encoding/decoding
//!
//! Pico frame format (all multi-byte integers big-endian):
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Bytes 0-4:   Preamble (00 00 00 00 00)                      │
//! │ Byte 5:      Marker (0xFF)                                  │
//! │ Byte 6:      Message type                                   │
//! │ Bytes 7-10:  Serial number (uint32)                         │
//! │ Bytes 11-12: Length (uint16) = payload length + 3           │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Payload: field stream (may be empty)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Byte N-3:    Marker (0xFF)                                  │
//! │ Bytes N-2..: CRC-16 over bytes 0..N-3                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The serial number is carried through verbatim: the device stamps its own
//! serial on responses and broadcasts, clients send zero.

use crate::crc::crc16;
use crate::field::{decode_fields, encode_fields, DecodeMode, Field};
use crate::types::MessageType;
use crate::{Error, Result, HEADER_SIZE, MARKER, PREAMBLE};
use bytes::{BufMut, Bytes, BytesMut};

/// Checksum trailer: marker byte plus CRC-16
const TRAILER_SIZE: usize = 3;

/// A Pico protocol message
///
/// Immutable once constructed; build requests with the `with_*` helpers and
/// obtain responses from [`Message::decode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub message_type: MessageType,
    pub serial: u32,
    pub fields: Vec<Field>,
}

impl Message {
    /// Create an empty message with serial 0 (a client request).
    pub fn new(message_type: MessageType) -> Self {
        Self {
            message_type,
            serial: 0,
            fields: Vec::new(),
        }
    }

    pub fn with_serial(mut self, serial: u32) -> Self {
        self.serial = serial;
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    /// First field with the given id, in payload order.
    pub fn field(&self, id: u8) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// All fields with the given id, preserving payload order. Ids are not
    /// unique within a message.
    pub fn fields_with_id(&self, id: u8) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(move |f| f.id == id)
    }

    /// Encode to wire bytes.
    pub fn encode(&self) -> Bytes {
        let payload = encode_fields(&self.fields);
        let length = payload.len() + TRAILER_SIZE;

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + length);
        buf.put_slice(&PREAMBLE);
        buf.put_u8(MARKER);
        buf.put_u8(self.message_type.as_u8());
        buf.put_u32(self.serial);
        buf.put_u16(length as u16);
        buf.put_slice(&payload);

        // The CRC region ends before the checksum marker.
        let crc = crc16(&buf);
        buf.put_u8(MARKER);
        buf.put_u16(crc);

        buf.freeze()
    }

    /// Decode from wire bytes, treating unknown field types leniently.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_mode(bytes, DecodeMode::Lenient)
    }

    /// Decode from wire bytes, failing on unknown field types.
    pub fn decode_strict(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_mode(bytes, DecodeMode::Strict)
    }

    /// Decode from wire bytes with an explicit unknown-field policy.
    ///
    /// Validation order: minimum size, preamble, header marker, length
    /// consistency, checksum marker, CRC, then the field stream. On any
    /// failure no `Message` is produced.
    pub fn decode_with_mode(bytes: &[u8], mode: DecodeMode) -> Result<Self> {
        if bytes.len() < HEADER_SIZE + 2 {
            return Err(Error::Truncated { len: bytes.len() });
        }

        for (offset, &byte) in bytes[..PREAMBLE.len()].iter().enumerate() {
            if byte != 0x00 {
                return Err(Error::Preamble {
                    offset,
                    found: byte,
                });
            }
        }

        if bytes[5] != MARKER {
            return Err(Error::HeaderMarker { found: bytes[5] });
        }

        let message_type = MessageType::from_u8(bytes[6]);
        let serial = u32::from_be_bytes([bytes[7], bytes[8], bytes[9], bytes[10]]);
        let length = u16::from_be_bytes([bytes[11], bytes[12]]) as usize;

        // Distinguishes under-read from over-read via the carried sizes.
        if length < TRAILER_SIZE || bytes.len() != HEADER_SIZE + length {
            return Err(Error::Length {
                expected: HEADER_SIZE + length,
                found: bytes.len(),
            });
        }

        let marker_pos = bytes.len() - TRAILER_SIZE;
        if bytes[marker_pos] != MARKER {
            return Err(Error::ChecksumMarker {
                offset: marker_pos,
                found: bytes[marker_pos],
            });
        }

        let expected = crc16(&bytes[..marker_pos]);
        let found = u16::from_be_bytes([bytes[marker_pos + 1], bytes[marker_pos + 2]]);
        if expected != found {
            return Err(Error::Checksum { expected, found });
        }

        let fields = decode_fields(&bytes[HEADER_SIZE..marker_pos], mode)?;

        Ok(Self {
            message_type,
            serial,
            fields,
        })
    }
}
