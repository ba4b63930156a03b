//! Pico Core
//!
//! Core types, framing, and field codec for the Simarine Pico protocol — a
//! reverse-engineered binary protocol spoken by Simarine marine telemetry
//! devices over TCP (control, port 5001) and UDP (broadcast, port 43210).
//!
//! This crate provides:
//! - CRC-16 checksum ([`crc16`])
//! - Binary frame encoding/decoding ([`Message`])
//! - Typed payload fields ([`Field`], [`FieldValue`])
//! - Known message semantics and domain projections ([`registry`])
//!
//! The codec is pure: no I/O, no shared state. Transports live in
//! `pico-transport`.

pub mod crc;
pub mod error;
pub mod field;
pub mod frame;
pub mod registry;
pub mod types;

pub use crc::crc16;
pub use error::{Error, Result};
pub use field::{decode_fields, encode_fields, DecodeMode, Field, FieldValue, IntBytes};
pub use frame::Message;
pub use registry::{
    requests, sensor_states, DeviceInfo, DeviceSensorCount, SensorInfo, SensorState, SystemInfo,
};
pub use types::{DeviceType, FieldType, MessageType, SensorType};

/// Marker byte separating protocol regions
pub const MARKER: u8 = 0xFF;

/// Fixed five-zero-byte prefix on every frame
pub const PREAMBLE: [u8; 5] = [0x00, 0x00, 0x00, 0x00, 0x00];

/// Frame header size: preamble + marker + type + serial + length
pub const HEADER_SIZE: usize = 13;

/// Smallest valid frame: header plus checksum marker plus CRC-16
pub const MIN_FRAME_SIZE: usize = 16;

/// Default TCP control port
pub const DEFAULT_TCP_PORT: u16 = 5001;

/// Default UDP broadcast port
pub const DEFAULT_UDP_PORT: u16 = 43210;
