//! Known message semantics
//!
//! Maps decoded messages onto the message types the device is known to
//! speak, and builds the corresponding request payloads. Codes outside the
//! registry pass through [`Message`] untouched.
//!
//! Projections locate fields by id. Ids are not unique within a message
//! (DeviceInfo id 1 is both a creation timestamp and the device type, in one
//! field), so projections take the first match and keep everything they did
//! not consume under `extra`, in payload order.

use crate::field::{Field, FieldValue, IntBytes};
use crate::frame::Message;
use crate::types::{DeviceType, MessageType, SensorType};
use crate::{Error, Result};

/// System serial number and firmware version (message type 0x01)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemInfo {
    pub serial: u32,
    pub firmware_major: i16,
    pub firmware_minor: i16,
}

impl SystemInfo {
    pub fn from_message(msg: &Message) -> Result<Self> {
        expect_type(msg, MessageType::SystemInfo)?;
        let serial = int_field(msg, 1)?.as_u32();
        let (firmware_major, firmware_minor) = int_field(msg, 2)?.as_i16_pair();
        Ok(Self {
            serial,
            firmware_major,
            firmware_minor,
        })
    }

    /// Firmware version as displayed by the vendor app, e.g. `1.21`.
    pub fn firmware_version(&self) -> String {
        format!("{}.{}", self.firmware_major, self.firmware_minor)
    }
}

/// Last device id and last sensor id, zero-indexed (message type 0x02)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceSensorCount {
    pub last_device_id: i32,
    pub last_sensor_id: i32,
}

impl DeviceSensorCount {
    pub fn from_message(msg: &Message) -> Result<Self> {
        expect_type(msg, MessageType::DeviceSensorCount)?;
        Ok(Self {
            last_device_id: int_field(msg, 1)?.as_i32(),
            last_sensor_id: int_field(msg, 2)?.as_i32(),
        })
    }
}

/// Per-device descriptor (message type 0x41)
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    pub device_id: i32,
    /// Creation timestamp, from field 1's timestamp half.
    pub created: Option<u32>,
    /// Device type, from field 1's value half.
    pub device_type: Option<DeviceType>,
    /// Device name, when field 3 is textual. Some device types (notably
    /// Inclinometer) reuse field 3 as an integer role code; that stays in
    /// `extra` with its raw bytes.
    pub name: Option<String>,
    /// Every field the projection did not consume, in payload order.
    pub extra: Vec<Field>,
}

impl DeviceInfo {
    pub fn from_message(msg: &Message) -> Result<Self> {
        expect_type(msg, MessageType::DeviceInfo)?;

        let mut device_id = None;
        let mut created = None;
        let mut device_type = None;
        let mut name = None;
        let mut extra = Vec::new();

        for field in &msg.fields {
            match (field.id, &field.value) {
                (0, FieldValue::Integer(raw)) if device_id.is_none() => {
                    device_id = Some(raw.as_i32());
                }
                (1, FieldValue::TimestampedInteger { timestamp, value })
                    if device_type.is_none() =>
                {
                    created = Some(*timestamp);
                    device_type = Some(DeviceType::from_u8(value.as_u32() as u8));
                }
                (3, FieldValue::TimestampedText { text, .. }) if name.is_none() => {
                    name = Some(text.clone());
                }
                _ => extra.push(field.clone()),
            }
        }

        Ok(Self {
            device_id: device_id.ok_or(Error::MissingField { id: 0 })?,
            created,
            device_type,
            name,
            extra,
        })
    }
}

/// Per-sensor descriptor (message type 0x20)
#[derive(Debug, Clone, PartialEq)]
pub struct SensorInfo {
    pub sensor_id: i32,
    pub sensor_type: SensorType,
    pub device_id: i32,
    /// Index of this sensor within its owning device.
    pub device_sensor_id: i32,
    /// Every field the projection did not consume, in payload order.
    pub extra: Vec<Field>,
}

impl SensorInfo {
    pub fn from_message(msg: &Message) -> Result<Self> {
        expect_type(msg, MessageType::SensorInfo)?;

        let sensor_id = int_field(msg, 1)?.as_i32();
        let sensor_type = SensorType::from_u8(int_field(msg, 2)?.as_u32() as u8);
        let device_id = int_field(msg, 3)?.as_i32();
        let device_sensor_id = int_field(msg, 4)?.as_i32();

        let mut consumed = [false; 5];
        let extra = msg
            .fields
            .iter()
            .filter(|f| {
                let id = f.id as usize;
                if (1..=4).contains(&id) && !consumed[id] && f.int_bytes().is_some() {
                    consumed[id] = true;
                    false
                } else {
                    true
                }
            })
            .cloned()
            .collect();

        Ok(Self {
            sensor_id,
            sensor_type,
            device_id,
            device_sensor_id,
            extra,
        })
    }
}

/// One sensor's raw state out of a 0xB0 message
///
/// The field id doubles as the sensor id; the 32 raw bits carry whatever
/// view the sensor type calls for (see [`SensorType::project`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorState {
    pub sensor_id: u8,
    pub raw: IntBytes,
}

/// Project a 0xB0 message into per-sensor raw states, in payload order.
pub fn sensor_states(msg: &Message) -> Result<Vec<SensorState>> {
    expect_type(msg, MessageType::SensorState)?;
    Ok(msg
        .fields
        .iter()
        .filter_map(|f| {
            f.int_bytes().map(|raw| SensorState {
                sensor_id: f.id,
                raw,
            })
        })
        .collect())
}

/// Request builders
///
/// Payload shapes recovered from packet captures of the vendor app. All
/// requests carry serial 0.
pub mod requests {
    use super::*;

    /// System information request (empty payload).
    pub fn system_info() -> Message {
        Message::new(MessageType::SystemInfo)
    }

    /// Device and sensor count request (empty payload).
    pub fn device_sensor_count() -> Message {
        Message::new(MessageType::DeviceSensorCount)
    }

    /// Device descriptor request for one device id.
    pub fn device_info(device_id: u8) -> Message {
        Message::new(MessageType::DeviceInfo).with_fields(vec![
            Field::integer(0, device_id as i32),
            Field::new(
                1,
                FieldValue::TimestampedInteger {
                    timestamp: 0,
                    value: IntBytes::from_i32(0),
                },
            ),
        ])
    }

    /// Sensor descriptor request for one sensor id.
    pub fn sensor_info(sensor_id: u8) -> Message {
        Message::new(MessageType::SensorInfo)
            .with_fields(vec![Field::integer(1, sensor_id as i32), Field::integer(2, 0)])
    }

    /// Sensor state sweep request (empty payload).
    pub fn sensor_state() -> Message {
        Message::new(MessageType::SensorState)
    }
}

fn expect_type(msg: &Message, expected: MessageType) -> Result<()> {
    if msg.message_type != expected {
        return Err(Error::WrongMessageType {
            expected,
            found: msg.message_type,
        });
    }
    Ok(())
}

/// First field with this id that has an integer view.
fn int_field(msg: &Message, id: u8) -> Result<IntBytes> {
    msg.fields
        .iter()
        .filter(|f| f.id == id)
        .find_map(|f| f.int_bytes())
        .ok_or(Error::MissingField { id })
}
