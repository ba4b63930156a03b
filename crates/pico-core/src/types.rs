//! Protocol type codes: messages, fields, devices, sensors
//!
//! All wire enums are open: codes this crate does not know decode to an
//! `Unknown` variant and re-encode verbatim, so forward-compatible traffic
//! survives a round-trip without loss.

use crate::field::IntBytes;

/// Message type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// System serial number and firmware version
    SystemInfo,
    /// Last device id and last sensor id (zero-indexed counts)
    DeviceSensorCount,
    /// Per-sensor descriptor
    SensorInfo,
    /// Per-device descriptor
    DeviceInfo,
    /// Sensor id to raw state map
    SensorState,
    /// Any other code, carried through as opaque
    Unknown(u8),
}

impl MessageType {
    pub fn from_u8(code: u8) -> Self {
        match code {
            0x01 => MessageType::SystemInfo,
            0x02 => MessageType::DeviceSensorCount,
            0x20 => MessageType::SensorInfo,
            0x41 => MessageType::DeviceInfo,
            0xB0 => MessageType::SensorState,
            other => MessageType::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            MessageType::SystemInfo => 0x01,
            MessageType::DeviceSensorCount => 0x02,
            MessageType::SensorInfo => 0x20,
            MessageType::DeviceInfo => 0x41,
            MessageType::SensorState => 0xB0,
            MessageType::Unknown(code) => code,
        }
    }
}

/// Field type codes with a known wire encoding
///
/// The field stream is length-implicit: the type code alone determines how
/// many bytes a field occupies. Codes outside this set cannot be skipped
/// over; see [`DecodeMode`](crate::DecodeMode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    Integer = 0x01,
    TimestampedInteger = 0x03,
    TimestampedText = 0x04,
    Timeseries = 0x0B,
}

impl FieldType {
    pub fn from_u8(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(FieldType::Integer),
            0x03 => Some(FieldType::TimestampedInteger),
            0x04 => Some(FieldType::TimestampedText),
            0x0B => Some(FieldType::Timeseries),
            _ => None,
        }
    }
}

/// Device type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    Null,
    Voltmeter,
    Amperemeter,
    Thermometer,
    Barometer,
    Ohmmeter,
    Time,
    Tank,
    Battery,
    System,
    Inclinometer,
    Unknown(u8),
}

impl DeviceType {
    pub fn from_u8(code: u8) -> Self {
        match code {
            0 => DeviceType::Null,
            1 => DeviceType::Voltmeter,
            2 => DeviceType::Amperemeter,
            3 => DeviceType::Thermometer,
            5 => DeviceType::Barometer,
            6 => DeviceType::Ohmmeter,
            7 => DeviceType::Time,
            8 => DeviceType::Tank,
            9 => DeviceType::Battery,
            10 => DeviceType::System,
            13 => DeviceType::Inclinometer,
            other => DeviceType::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            DeviceType::Null => 0,
            DeviceType::Voltmeter => 1,
            DeviceType::Amperemeter => 2,
            DeviceType::Thermometer => 3,
            DeviceType::Barometer => 5,
            DeviceType::Ohmmeter => 6,
            DeviceType::Time => 7,
            DeviceType::Tank => 8,
            DeviceType::Battery => 9,
            DeviceType::System => 10,
            DeviceType::Inclinometer => 13,
            DeviceType::Unknown(code) => code,
        }
    }
}

/// Sensor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorType {
    None,
    Voltage,
    Current,
    CoulombCounter,
    Temperature,
    Atmosphere,
    AtmosphereTrend,
    Resistance,
    Timestamp,
    StateOfCharge,
    RemainingTime,
    Angle,
    User,
    Unknown(u8),
}

impl SensorType {
    pub fn from_u8(code: u8) -> Self {
        match code {
            0 => SensorType::None,
            1 => SensorType::Voltage,
            2 => SensorType::Current,
            3 => SensorType::CoulombCounter,
            4 => SensorType::Temperature,
            5 => SensorType::Atmosphere,
            6 => SensorType::AtmosphereTrend,
            7 => SensorType::Resistance,
            10 => SensorType::Timestamp,
            11 => SensorType::StateOfCharge,
            13 => SensorType::RemainingTime,
            16 => SensorType::Angle,
            22 => SensorType::User,
            other => SensorType::Unknown(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            SensorType::None => 0,
            SensorType::Voltage => 1,
            SensorType::Current => 2,
            SensorType::CoulombCounter => 3,
            SensorType::Temperature => 4,
            SensorType::Atmosphere => 5,
            SensorType::AtmosphereTrend => 6,
            SensorType::Resistance => 7,
            SensorType::Timestamp => 10,
            SensorType::StateOfCharge => 11,
            SensorType::RemainingTime => 13,
            SensorType::Angle => 16,
            SensorType::User => 22,
            SensorType::Unknown(code) => code,
        }
    }

    /// Physical unit of the projected state, if the type has one.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            SensorType::Voltage => Some("V"),
            SensorType::Current => Some("A"),
            SensorType::CoulombCounter => Some("Ah"),
            SensorType::Temperature => Some("°C"),
            SensorType::Atmosphere => Some("mbar"),
            SensorType::AtmosphereTrend => Some("mbar/h"),
            SensorType::Resistance => Some("Ω"),
            SensorType::Timestamp => Some("s"),
            SensorType::StateOfCharge => Some("%"),
            SensorType::RemainingTime => Some("s"),
            SensorType::Angle => Some("°"),
            SensorType::None | SensorType::User | SensorType::Unknown(_) => None,
        }
    }

    /// Project a raw sensor state onto physical units.
    ///
    /// The raw 32 bits are read through the view this sensor type calls
    /// for: most types scale the signed 32-bit value, `Timestamp` is
    /// unsigned, and `StateOfCharge` uses only the high 16-bit half (the
    /// low half is reserved and left to the caller via [`IntBytes`]).
    pub fn project(self, raw: IntBytes) -> Option<f64> {
        match self {
            SensorType::Voltage => Some(raw.as_i32() as f64 / 1000.0),
            SensorType::Current => Some(raw.as_i32() as f64 / 100.0),
            SensorType::CoulombCounter => Some(raw.as_i32() as f64 / 1000.0),
            SensorType::Temperature => Some(raw.as_i32() as f64 / 10.0),
            SensorType::Atmosphere => Some(raw.as_i32() as f64 / 100.0),
            SensorType::AtmosphereTrend => Some(raw.as_i32() as f64 / 10.0),
            SensorType::Resistance => Some(raw.as_i32() as f64),
            SensorType::Timestamp => Some(raw.as_u32() as f64),
            SensorType::StateOfCharge => Some(raw.as_i16_pair().0 as f64 / 160.0),
            SensorType::RemainingTime => Some(raw.as_i32() as f64),
            SensorType::Angle => Some(raw.as_i32() as f64 / 10.0),
            SensorType::None | SensorType::User | SensorType::Unknown(_) => None,
        }
    }
}
