//! Field codec tests

use bytes::Bytes;
use pico_core::{
    decode_fields, encode_fields, DecodeMode, Error, Field, FieldValue, IntBytes,
};

#[test]
fn test_all_variants_roundtrip() {
    let fields = vec![
        Field::integer(1, -18000),
        Field::new(
            6,
            FieldValue::TimestampedInteger {
                timestamp: 0x678E_F359,
                value: IntBytes::from_i32(0x11),
            },
        ),
        Field::new(
            3,
            FieldValue::TimestampedText {
                timestamp: 0x6593_2547,
                text: "Bilge Pump".to_string(),
            },
        ),
        Field::new(
            0,
            FieldValue::Timeseries {
                start: 0x691C_89F0,
                end: 0x691C_89F0,
                samples: vec![(0x560B, 0x560A), (0x560F, 0x5611)],
            },
        ),
    ];
    let encoded = encode_fields(&fields);
    let decoded = decode_fields(&encoded, DecodeMode::Strict).expect("decode failed");
    assert_eq!(decoded, fields);
}

#[test]
fn test_timestamped_integer_layout() {
    let field = Field::new(
        1,
        FieldValue::TimestampedInteger {
            timestamp: 0x6593_2547,
            value: IntBytes::from_i32(1),
        },
    );
    let encoded = encode_fields(std::slice::from_ref(&field));
    // ff 01 03 65932547 ff 00000001, as captured
    assert_eq!(
        encoded.as_ref(),
        &[0xFF, 0x01, 0x03, 0x65, 0x93, 0x25, 0x47, 0xFF, 0x00, 0x00, 0x00, 0x01]
    );
    assert_eq!(encoded.len(), 12);
}

#[test]
fn test_text_terminator_excluded() {
    let field = Field::new(
        3,
        FieldValue::TimestampedText {
            timestamp: 0,
            text: "Pico".to_string(),
        },
    );
    let encoded = encode_fields(std::slice::from_ref(&field));
    assert_eq!(encoded.last(), Some(&0x00));
    assert_eq!(encoded.len(), 9 + 4);

    let decoded = decode_fields(&encoded, DecodeMode::Strict).unwrap();
    assert_eq!(decoded[0].text(), Some("Pico"));
}

#[test]
fn test_empty_text() {
    let field = Field::new(
        3,
        FieldValue::TimestampedText {
            timestamp: 7,
            text: String::new(),
        },
    );
    let encoded = encode_fields(std::slice::from_ref(&field));
    assert_eq!(encoded.len(), 9);
    let decoded = decode_fields(&encoded, DecodeMode::Strict).unwrap();
    assert_eq!(decoded[0].text(), Some(""));
}

#[test]
fn test_unterminated_text_is_truncation() {
    // ff 03 04 <ts> ff then text with no NUL
    let bytes = [
        0xFF, 0x03, 0x04, 0x00, 0x00, 0x00, 0x07, 0xFF, b'P', b'i', b'c', b'o',
    ];
    assert_eq!(
        decode_fields(&bytes, DecodeMode::Strict).unwrap_err(),
        Error::FieldTruncated { offset: 0 }
    );
}

#[test]
fn test_invalid_utf8() {
    let bytes = [
        0xFF, 0x03, 0x04, 0x00, 0x00, 0x00, 0x07, 0xFF, 0xC3, 0x28, 0x00,
    ];
    assert_eq!(
        decode_fields(&bytes, DecodeMode::Strict).unwrap_err(),
        Error::FieldTextEncoding { offset: 8 }
    );
}

#[test]
fn test_timeseries_scenario() {
    let field = Field::new(
        7,
        FieldValue::Timeseries {
            start: 1_700_000_000,
            end: 1_700_000_060,
            samples: vec![(10, 20), (30, 40)],
        },
    );
    let encoded = encode_fields(std::slice::from_ref(&field));
    // 3-byte field header + 11 bytes of timestamps/count + 2×5 sample bytes
    // + trailing marker
    assert_eq!(encoded.len(), 3 + 11 + 5 * 2 + 1);

    let decoded = decode_fields(&encoded, DecodeMode::Strict).expect("decode failed");
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0], field);
}

#[test]
fn test_timeseries_empty() {
    let field = Field::new(
        0,
        FieldValue::Timeseries {
            start: 1,
            end: 2,
            samples: vec![],
        },
    );
    let encoded = encode_fields(std::slice::from_ref(&field));
    assert_eq!(encoded.len(), 15);
    let decoded = decode_fields(&encoded, DecodeMode::Strict).unwrap();
    assert_eq!(decoded[0], field);
}

#[test]
fn test_timeseries_bad_sample_marker() {
    let field = Field::new(
        0,
        FieldValue::Timeseries {
            start: 1,
            end: 2,
            samples: vec![(3, 4)],
        },
    );
    let mut bytes = encode_fields(std::slice::from_ref(&field)).to_vec();
    bytes[14] = 0x00; // first sample's marker
    assert_eq!(
        decode_fields(&bytes, DecodeMode::Strict).unwrap_err(),
        Error::FieldMarker {
            offset: 14,
            found: 0x00
        }
    );
}

#[test]
fn test_timeseries_missing_trailer() {
    let field = Field::new(
        0,
        FieldValue::Timeseries {
            start: 1,
            end: 2,
            samples: vec![(3, 4)],
        },
    );
    let mut bytes = encode_fields(std::slice::from_ref(&field)).to_vec();
    bytes.pop();
    assert_eq!(
        decode_fields(&bytes, DecodeMode::Strict).unwrap_err(),
        Error::FieldTruncated { offset: 0 }
    );
}

#[test]
fn test_duplicate_ids_keep_order() {
    let fields = vec![
        Field::integer(5, 1),
        Field::integer(5, 2),
        Field::integer(5, 3),
    ];
    let decoded = decode_fields(&encode_fields(&fields), DecodeMode::Strict).unwrap();
    assert_eq!(decoded, fields);
}

#[test]
fn test_lenient_stops_at_unknown() {
    // A known integer field followed by an unknown type code.
    let mut bytes = encode_fields(&[Field::integer(1, 42)]).to_vec();
    bytes.extend_from_slice(&[0xFF, 0x02, 0x55, 0x01, 0x02, 0x03]);

    let decoded = decode_fields(&bytes, DecodeMode::Lenient).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0], Field::integer(1, 42));
    assert_eq!(
        decoded[1].value,
        FieldValue::Unknown {
            type_code: 0x55,
            bytes: Bytes::from_static(&[0x01, 0x02, 0x03]),
        }
    );

    assert_eq!(
        decode_fields(&bytes, DecodeMode::Strict).unwrap_err(),
        Error::UnknownFieldType {
            offset: 7,
            type_code: 0x55
        }
    );

    // The lenient result still re-encodes to the original bytes.
    assert_eq!(encode_fields(&decoded).as_ref(), &bytes[..]);
}

#[test]
fn test_partial_field_at_end() {
    let mut bytes = encode_fields(&[Field::integer(1, 42)]).to_vec();
    bytes.extend_from_slice(&[0xFF, 0x02]); // marker + id, no type
    assert_eq!(
        decode_fields(&bytes, DecodeMode::Lenient).unwrap_err(),
        Error::FieldTruncated { offset: 7 }
    );
}

#[test]
fn test_garbage_between_fields() {
    let mut bytes = encode_fields(&[Field::integer(1, 42)]).to_vec();
    bytes.push(0x13);
    assert_eq!(
        decode_fields(&bytes, DecodeMode::Lenient).unwrap_err(),
        Error::FieldMarker {
            offset: 7,
            found: 0x13
        }
    );
}
