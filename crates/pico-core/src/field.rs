//! Typed payload fields
//!
//! A frame payload is a sequence of fields. Every field starts with the
//! `0xFF` marker, then a one-byte id, then a one-byte type code; the rest is
//! type-dependent:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │ Byte 0:  Marker (0xFF)                                         │
//! │ Byte 1:  Field id                                              │
//! │ Byte 2:  Field type                                            │
//! ├────────────────────────────────────────────────────────────────┤
//! │ 0x01 Integer:     value (4B)                                   │
//! │ 0x03 Ts-Integer:  timestamp (4B) ‖ FF ‖ value (4B)             │
//! │ 0x04 Ts-Text:     timestamp (4B) ‖ FF ‖ utf-8 ‖ 00             │
//! │ 0x0B Timeseries:  ts1 (4B) ‖ FF ‖ ts2 (4B) ‖ FF ‖ count N (1B) │
//! │                   ‖ N × (FF ‖ u16 ‖ u16) ‖ FF                  │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! There is no length prefix: the type code alone determines a field's
//! extent, so a type code the codec does not know stops the walk (the wire
//! format is not self-delimiting for unknown types).

use crate::types::FieldType;
use crate::{Error, Result, MARKER};
use bytes::{BufMut, Bytes, BytesMut};

/// Raw 4-byte big-endian integer with caller-selected views.
///
/// The wire does not tag signedness, and some fields pack two 16-bit halves
/// into the same 4 bytes. All views stay accessible; picking one is the
/// caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntBytes([u8; 4]);

impl IntBytes {
    pub const fn new(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn from_i32(value: i32) -> Self {
        Self(value.to_be_bytes())
    }

    pub fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    pub fn as_bytes(self) -> [u8; 4] {
        self.0
    }

    pub fn as_i32(self) -> i32 {
        i32::from_be_bytes(self.0)
    }

    pub fn as_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub fn as_i16_pair(self) -> (i16, i16) {
        (
            i16::from_be_bytes([self.0[0], self.0[1]]),
            i16::from_be_bytes([self.0[2], self.0[3]]),
        )
    }

    pub fn as_u16_pair(self) -> (u16, u16) {
        (
            u16::from_be_bytes([self.0[0], self.0[1]]),
            u16::from_be_bytes([self.0[2], self.0[3]]),
        )
    }
}

/// A decoded field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(IntBytes),
    TimestampedInteger { timestamp: u32, value: IntBytes },
    TimestampedText { timestamp: u32, text: String },
    Timeseries {
        start: u32,
        end: u32,
        samples: Vec<(u16, u16)>,
    },
    /// Unrecognized type code; `bytes` is the raw tail after the 3-byte
    /// field header, preserved verbatim.
    Unknown { type_code: u8, bytes: Bytes },
}

/// A `{marker, id, type, data}` unit inside a payload
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub id: u8,
    pub value: FieldValue,
}

impl Field {
    pub fn new(id: u8, value: FieldValue) -> Self {
        Self { id, value }
    }

    /// Convenience constructor for a plain integer field.
    pub fn integer(id: u8, value: i32) -> Self {
        Self::new(id, FieldValue::Integer(IntBytes::from_i32(value)))
    }

    /// The field's wire type code.
    pub fn type_code(&self) -> u8 {
        match &self.value {
            FieldValue::Integer(_) => FieldType::Integer as u8,
            FieldValue::TimestampedInteger { .. } => FieldType::TimestampedInteger as u8,
            FieldValue::TimestampedText { .. } => FieldType::TimestampedText as u8,
            FieldValue::Timeseries { .. } => FieldType::Timeseries as u8,
            FieldValue::Unknown { type_code, .. } => *type_code,
        }
    }

    /// The 4-byte integer view, for Integer and Timestamped Integer fields.
    pub fn int_bytes(&self) -> Option<IntBytes> {
        match &self.value {
            FieldValue::Integer(raw) => Some(*raw),
            FieldValue::TimestampedInteger { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// The embedded Unix timestamp, if the field carries one.
    pub fn timestamp(&self) -> Option<u32> {
        match &self.value {
            FieldValue::TimestampedInteger { timestamp, .. }
            | FieldValue::TimestampedText { timestamp, .. } => Some(*timestamp),
            FieldValue::Timeseries { start, .. } => Some(*start),
            _ => None,
        }
    }

    /// The decoded text, for Timestamped Text fields.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            FieldValue::TimestampedText { text, .. } => Some(text.as_str()),
            _ => None,
        }
    }
}

/// How to treat field type codes the codec does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Stop at the first unknown type code and keep the remaining bytes as
    /// one [`FieldValue::Unknown`] field.
    #[default]
    Lenient,
    /// Fail with [`Error::UnknownFieldType`].
    Strict,
}

/// Decode a payload into its field sequence.
///
/// Offsets in errors are relative to the start of `data`.
pub fn decode_fields(data: &[u8], mode: DecodeMode) -> Result<Vec<Field>> {
    let mut fields = Vec::new();
    let mut pos = 0;

    while pos < data.len() {
        if data[pos] != MARKER {
            return Err(Error::FieldMarker {
                offset: pos,
                found: data[pos],
            });
        }
        if pos + 3 > data.len() {
            return Err(Error::FieldTruncated { offset: pos });
        }

        let id = data[pos + 1];
        let type_code = data[pos + 2];

        let field_type = match FieldType::from_u8(type_code) {
            Some(t) => t,
            None => match mode {
                DecodeMode::Strict => {
                    return Err(Error::UnknownFieldType {
                        offset: pos,
                        type_code,
                    })
                }
                DecodeMode::Lenient => {
                    // Not self-delimiting past this point; keep the tail.
                    fields.push(Field::new(
                        id,
                        FieldValue::Unknown {
                            type_code,
                            bytes: Bytes::copy_from_slice(&data[pos + 3..]),
                        },
                    ));
                    return Ok(fields);
                }
            },
        };

        let (value, len) = decode_value(field_type, data, pos)?;
        fields.push(Field::new(id, value));
        pos += len;
    }

    Ok(fields)
}

/// Decode the value of one field starting at `pos`; returns the value and
/// the field's total wire length including the 3-byte header.
fn decode_value(field_type: FieldType, data: &[u8], pos: usize) -> Result<(FieldValue, usize)> {
    match field_type {
        FieldType::Integer => {
            let raw = int_at(data, pos, pos + 3)?;
            Ok((FieldValue::Integer(raw), 7))
        }
        FieldType::TimestampedInteger => {
            let timestamp = int_at(data, pos, pos + 3)?.as_u32();
            marker_at(data, pos, pos + 7)?;
            let value = int_at(data, pos, pos + 8)?;
            Ok((FieldValue::TimestampedInteger { timestamp, value }, 12))
        }
        FieldType::TimestampedText => {
            let timestamp = int_at(data, pos, pos + 3)?.as_u32();
            marker_at(data, pos, pos + 7)?;
            let text_start = pos + 8;
            let nul = data[text_start..]
                .iter()
                .position(|&b| b == 0x00)
                .ok_or(Error::FieldTruncated { offset: pos })?;
            let text = std::str::from_utf8(&data[text_start..text_start + nul])
                .map_err(|_| Error::FieldTextEncoding { offset: text_start })?
                .to_owned();
            Ok((
                FieldValue::TimestampedText { timestamp, text },
                9 + nul,
            ))
        }
        FieldType::Timeseries => {
            let start = int_at(data, pos, pos + 3)?.as_u32();
            marker_at(data, pos, pos + 7)?;
            let end = int_at(data, pos, pos + 8)?.as_u32();
            marker_at(data, pos, pos + 12)?;
            let count = *data.get(pos + 13).ok_or(Error::FieldTruncated { offset: pos })? as usize;

            let mut samples = Vec::with_capacity(count);
            for i in 0..count {
                let block = pos + 14 + 5 * i;
                marker_at(data, pos, block)?;
                let raw = int_at(data, pos, block + 1)?;
                samples.push(raw.as_u16_pair());
            }
            marker_at(data, pos, pos + 14 + 5 * count)?;

            Ok((
                FieldValue::Timeseries {
                    start,
                    end,
                    samples,
                },
                15 + 5 * count,
            ))
        }
    }
}

fn int_at(data: &[u8], field_start: usize, at: usize) -> Result<IntBytes> {
    let bytes = data
        .get(at..at + 4)
        .ok_or(Error::FieldTruncated { offset: field_start })?;
    Ok(IntBytes::new([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn marker_at(data: &[u8], field_start: usize, at: usize) -> Result<()> {
    match data.get(at) {
        None => Err(Error::FieldTruncated {
            offset: field_start,
        }),
        Some(&MARKER) => Ok(()),
        Some(&found) => Err(Error::FieldMarker { offset: at, found }),
    }
}

/// Encode a field sequence into payload bytes. Exact inverse of
/// [`decode_fields`].
pub fn encode_fields(fields: &[Field]) -> Bytes {
    let mut buf = BytesMut::new();
    for field in fields {
        encode_field(&mut buf, field);
    }
    buf.freeze()
}

fn encode_field(buf: &mut BytesMut, field: &Field) {
    buf.put_u8(MARKER);
    buf.put_u8(field.id);
    buf.put_u8(field.type_code());

    match &field.value {
        FieldValue::Integer(raw) => {
            buf.put_slice(&raw.as_bytes());
        }
        FieldValue::TimestampedInteger { timestamp, value } => {
            buf.put_u32(*timestamp);
            buf.put_u8(MARKER);
            buf.put_slice(&value.as_bytes());
        }
        FieldValue::TimestampedText { timestamp, text } => {
            buf.put_u32(*timestamp);
            buf.put_u8(MARKER);
            buf.put_slice(text.as_bytes());
            buf.put_u8(0x00);
        }
        FieldValue::Timeseries {
            start,
            end,
            samples,
        } => {
            buf.put_u32(*start);
            buf.put_u8(MARKER);
            buf.put_u32(*end);
            buf.put_u8(MARKER);
            buf.put_u8(samples.len() as u8);
            for (hi, lo) in samples {
                buf.put_u8(MARKER);
                buf.put_u16(*hi);
                buf.put_u16(*lo);
            }
            buf.put_u8(MARKER);
        }
        FieldValue::Unknown { bytes, .. } => {
            buf.put_slice(bytes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_bytes_views() {
        let raw = IntBytes::new([0x00, 0x01, 0x00, 0x15]);
        assert_eq!(raw.as_i32(), 0x0001_0015);
        assert_eq!(raw.as_u32(), 0x0001_0015);
        assert_eq!(raw.as_i16_pair(), (1, 21));
        assert_eq!(raw.as_u16_pair(), (1, 21));

        let neg = IntBytes::new([0xFF, 0xFF, 0xFC, 0x16]);
        assert_eq!(neg.as_i32(), -1002);
        assert_eq!(neg.as_u32(), 0xFFFF_FC16);
        assert_eq!(neg.as_i16_pair().0, -1);
    }

    #[test]
    fn test_integer_field_roundtrip() {
        let fields = vec![Field::integer(2, 12589)];
        let encoded = encode_fields(&fields);
        assert_eq!(
            encoded.as_ref(),
            &[0xFF, 0x02, 0x01, 0x00, 0x00, 0x31, 0x2D]
        );
        let decoded = decode_fields(&encoded, DecodeMode::Strict).unwrap();
        assert_eq!(decoded, fields);
    }

    #[test]
    fn test_marker_required_per_field() {
        let mut encoded = encode_fields(&[Field::integer(1, 1), Field::integer(2, 2)]).to_vec();
        encoded[7] = 0xAB; // second field's marker
        let err = decode_fields(&encoded, DecodeMode::Strict).unwrap_err();
        assert_eq!(
            err,
            Error::FieldMarker {
                offset: 7,
                found: 0xAB
            }
        );
    }

    #[test]
    fn test_truncated_integer() {
        let encoded = &[0xFF, 0x01, 0x01, 0x00, 0x00];
        let err = decode_fields(encoded, DecodeMode::Strict).unwrap_err();
        assert_eq!(err, Error::FieldTruncated { offset: 0 });
    }

    #[test]
    fn test_unknown_type_lenient_keeps_tail() {
        let encoded = &[0xFF, 0x09, 0x77, 0xDE, 0xAD, 0xBE, 0xEF];
        let decoded = decode_fields(encoded, DecodeMode::Lenient).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].id, 0x09);
        assert_eq!(
            decoded[0].value,
            FieldValue::Unknown {
                type_code: 0x77,
                bytes: Bytes::from_static(&[0xDE, 0xAD, 0xBE, 0xEF]),
            }
        );
        // and the tail re-encodes verbatim
        assert_eq!(encode_fields(&decoded).as_ref(), encoded);
    }

    #[test]
    fn test_unknown_type_strict_fails() {
        let encoded = &[0xFF, 0x09, 0x77, 0xDE, 0xAD];
        let err = decode_fields(encoded, DecodeMode::Strict).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownFieldType {
                offset: 0,
                type_code: 0x77
            }
        );
    }
}
