//! `String` codec: UTF-16BE text, with two Avid escape forms smuggled
//! through the same field for values that don't round-trip through
//! UTF-16BE (a UTF-16LE attribute list, and a byte-reversed `Int32`).

use mxf_core::{Error, Result};

use crate::value::{AvidEscapeKind, RpValue, StringValue};

/// `String` caps matches only these two literal type names.
pub fn is_string(type_name: &str) -> bool {
    type_name == "16 bit Unicode String" || type_name == "UTF-16 char string"
}

/// Leading bytes of the Avid UTF-16LE attribute-list escape.
const UTF16LE_ESCAPE_PREFIX: [u8; 17] = [
    0x4c, 0x00, 0x02, 0x10, 0x01, 0x00, 0x00, 0x00, 0x00, 0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01,
    0x01,
];

/// Leading bytes of the Avid byte-reversed-int32 escape.
const INT32_ESCAPE_PREFIX: [u8; 17] = [
    0x4c, 0x00, 0x07, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x06, 0x0e, 0x2b, 0x34, 0x01, 0x04, 0x01,
    0x01,
];

pub fn read(bytes: &[u8]) -> Result<RpValue> {
    if let Some(text) = decode_utf16be(bytes) {
        return Ok(RpValue::String(StringValue::Unicode(text)));
    }
    if bytes.len() >= 17 && bytes[..17] == UTF16LE_ESCAPE_PREFIX {
        let payload = decode_utf16le_escape(&bytes[17..]);
        return Ok(RpValue::String(StringValue::AvidEscaped {
            kind: AvidEscapeKind::Utf16Le,
            payload,
        }));
    }
    if bytes.len() >= 17 && bytes[..17] == INT32_ESCAPE_PREFIX {
        // Last 4 bytes of the whole value, read little-endian (written in
        // reverse byte order relative to a normal big-endian Int32).
        if bytes.len() < 4 {
            return Err(Error::InvalidBer("Avid int32 escape shorter than 4 bytes".into()));
        }
        let tail = &bytes[bytes.len() - 4..];
        let dur = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
        return Ok(RpValue::String(StringValue::AvidEscaped {
            kind: AvidEscapeKind::Int32,
            payload: dur.to_string(),
        }));
    }
    Ok(RpValue::String(StringValue::Unencodable {
        avid_type_hex: hex(&bytes[..bytes.len().min(17)]),
        raw: bytes.to_vec(),
    }))
}

pub fn write(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::String(StringValue::Unicode(text)) => Ok(encode_utf16be(text)),
        RpValue::String(StringValue::AvidEscaped {
            kind: AvidEscapeKind::Utf16Le,
            payload,
        }) => {
            let mut out = UTF16LE_ESCAPE_PREFIX.to_vec();
            out.extend(encode_utf16le_escape(payload));
            Ok(out)
        }
        RpValue::String(StringValue::AvidEscaped {
            kind: AvidEscapeKind::Int32,
            payload,
        }) => {
            let dur: u32 = payload
                .parse()
                .map_err(|_| Error::WriteEncodeFailure(format!("not a u32: {payload}")))?;
            let mut out = INT32_ESCAPE_PREFIX.to_vec();
            out.extend(dur.to_le_bytes());
            Ok(out)
        }
        RpValue::String(StringValue::Unencodable { avid_type_hex, .. }) => Err(
            Error::WriteEncodeFailure(format!("unencodable Avid string escape a??:{avid_type_hex}")),
        ),
        other => Err(Error::WriteEncodeFailure(format!("expected String value, got {other:?}"))),
    }
}

fn decode_utf16be(bytes: &[u8]) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units: Vec<u16> = bytes.chunks_exact(2).map(|c| u16::from_be_bytes([c[0], c[1]])).collect();
    String::from_utf16(&units).ok()
}

fn encode_utf16be(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.extend(unit.to_be_bytes());
    }
    out
}

/// Decodes a UTF-16LE blob and strips a single trailing NUL character, as
/// written by the Avid attribute-list encoder.
fn decode_utf16le_escape(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let mut text = String::from_utf16_lossy(&units);
    if text.ends_with('\0') {
        text.pop();
    }
    text
}

fn encode_utf16le_escape(payload: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for unit in payload.encode_utf16() {
        out.extend(unit.to_le_bytes());
    }
    out.extend([0u8, 0u8]);
    out
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(text: &str) {
        let value = RpValue::String(StringValue::Unicode(text.to_string()));
        let bytes = write(&value).unwrap();
        assert_eq!(read(&bytes).unwrap(), value);
    }

    #[test]
    fn plain_text_round_trips() {
        round_trip("Toto");
        round_trip("Tete\0toto");
    }

    #[test]
    fn avid_utf16le_escape_round_trips() {
        let value = RpValue::String(StringValue::AvidEscaped {
            kind: AvidEscapeKind::Utf16Le,
            payload: "__AttributeList".to_string(),
        });
        let bytes = write(&value).unwrap();
        assert_eq!(read(&bytes).unwrap(), value);
    }

    #[test]
    fn avid_int32_escape_round_trips() {
        let value = RpValue::String(StringValue::AvidEscaped {
            kind: AvidEscapeKind::Int32,
            payload: "8".to_string(),
        });
        let bytes = write(&value).unwrap();
        assert_eq!(read(&bytes).unwrap(), value);
    }

    #[test]
    fn unencodable_fallback_refuses_to_write() {
        // Odd length: not valid UTF-16BE, doesn't match either Avid prefix.
        let value = read(&[1, 2, 3]).unwrap();
        assert!(matches!(value, RpValue::String(StringValue::Unencodable { .. })));
        assert!(write(&value).is_err());
    }
}
