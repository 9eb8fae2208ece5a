//! Fixed-width scalar codecs: `Integer`, `Boolean`, `Rational`, `Length`,
//! `XID` and `AvidOffset`.

use mxf_core::{Error, Result};

use crate::value::RpValue;

/// Matches `^U?Int ?(8|16|32|64)` case-insensitively and returns the byte
/// width. Trailing characters after the digits are ignored, matching a
/// prefix search rather than a full-string match.
pub fn match_integer_width(type_name: &str) -> Option<u8> {
    let lower = type_name.to_lowercase();
    let rest = lower.strip_prefix('u').unwrap_or(&lower);
    let rest = rest.strip_prefix("int")?;
    let rest = rest.strip_prefix(' ').unwrap_or(rest);
    for bits in [8u32, 16, 32, 64] {
        if rest.starts_with(&bits.to_string()) {
            return Some((bits / 8) as u8);
        }
    }
    None
}

pub fn read_integer(width: u8, bytes: &[u8]) -> Result<RpValue> {
    let value = read_uint(width, bytes)?;
    Ok(RpValue::Integer { width, value })
}

pub fn write_integer(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::Integer { width, value } => Ok(write_uint(*width, *value)),
        other => Err(Error::WriteEncodeFailure(format!("expected Integer value, got {other:?}"))),
    }
}

fn read_uint(width: u8, bytes: &[u8]) -> Result<u64> {
    if bytes.len() != width as usize {
        return Err(Error::InvalidBer(format!(
            "integer value is {} bytes, expected {width}",
            bytes.len()
        )));
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

fn write_uint(width: u8, value: u64) -> Vec<u8> {
    value.to_be_bytes()[8 - width as usize..].to_vec()
}

/// `Boolean` caps is an exact-string match (`"Boolean"`), not a pattern.
pub fn is_boolean(type_name: &str) -> bool {
    type_name == "Boolean"
}

pub fn read_boolean(bytes: &[u8]) -> Result<RpValue> {
    let byte = *bytes
        .first()
        .ok_or_else(|| Error::InvalidBer("Boolean value is empty".into()))?;
    Ok(RpValue::Boolean(byte != 0))
}

pub fn write_boolean(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::Boolean(b) => Ok(vec![if *b { 1 } else { 0 }]),
        other => Err(Error::WriteEncodeFailure(format!("expected Boolean value, got {other:?}"))),
    }
}

/// `Rational` caps is an exact-string match.
pub fn is_rational(type_name: &str) -> bool {
    type_name == "Rational"
}

pub fn read_rational(bytes: &[u8]) -> Result<RpValue> {
    if bytes.len() != 8 {
        return Err(Error::InvalidBer(format!(
            "Rational value is {} bytes, expected 8",
            bytes.len()
        )));
    }
    let numerator = read_uint(4, &bytes[0..4])? as u32;
    let denominator = read_uint(4, &bytes[4..8])? as u32;
    Ok(RpValue::Rational { numerator, denominator })
}

pub fn write_rational(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::Rational { numerator, denominator } => {
            let mut out = write_uint(4, *numerator as u64);
            out.extend(write_uint(4, *denominator as u64));
            Ok(out)
        }
        other => Err(Error::WriteEncodeFailure(format!("expected Rational value, got {other:?}"))),
    }
}

/// `Length`/`Position` caps matches `Length` or `Position` anywhere in the
/// type name; the wire shape is always a plain 8-byte `Int64`.
pub fn is_length(type_name: &str) -> bool {
    type_name.contains("Length") || type_name.contains("Position")
}

pub fn read_length(bytes: &[u8]) -> Result<RpValue> {
    let value = read_uint(8, bytes)?;
    Ok(RpValue::Length(value as i64))
}

pub fn write_length(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::Length(v) => Ok(write_uint(8, *v as u64)),
        other => Err(Error::WriteEncodeFailure(format!("expected Length value, got {other:?}"))),
    }
}

/// `TrackID`/`Track ID` caps matches `Track ?ID` anywhere in the type name;
/// the wire shape is always a plain 4-byte `Int32`.
pub fn is_xid(type_name: &str) -> bool {
    type_name.contains("TrackID") || type_name.contains("Track ID")
}

pub fn read_xid(bytes: &[u8]) -> Result<RpValue> {
    let value = read_uint(4, bytes)?;
    Ok(RpValue::XID(value as u32))
}

pub fn write_xid(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::XID(v) => Ok(write_uint(4, *v as u64)),
        other => Err(Error::WriteEncodeFailure(format!("expected XID value, got {other:?}"))),
    }
}

/// `AvidOffset` caps is an exact-string match.
pub fn is_avid_offset(type_name: &str) -> bool {
    type_name == "AvidOffset"
}

/// 24-byte field; only the last 8 bytes carry the actual offset.
pub fn read_avid_offset(bytes: &[u8]) -> Result<RpValue> {
    if bytes.len() < 8 {
        return Err(Error::InvalidBer(format!(
            "AvidOffset value is {} bytes, need at least 8",
            bytes.len()
        )));
    }
    let tail = &bytes[bytes.len() - 8..];
    Ok(RpValue::AvidOffset(read_uint(8, tail)?))
}

/// Right-justifies the 8-byte offset into a 24-byte field, leading-zero padded.
pub fn write_avid_offset(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::AvidOffset(v) => {
            let mut out = vec![0u8; 16];
            out.extend(write_uint(8, *v));
            Ok(out)
        }
        other => Err(Error::WriteEncodeFailure(format!("expected AvidOffset value, got {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_width_matching() {
        assert_eq!(match_integer_width("UInt32"), Some(4));
        assert_eq!(match_integer_width("Int8"), Some(1));
        assert_eq!(match_integer_width("uint 64"), Some(8));
        assert_eq!(match_integer_width("StrongReference"), None);
    }

    #[test]
    fn integer_round_trip() {
        let value = read_integer(4, &[0, 0, 4, 0]).unwrap();
        assert_eq!(value, RpValue::Integer { width: 4, value: 1024 });
        assert_eq!(write_integer(&value).unwrap(), vec![0, 0, 4, 0]);
    }

    #[test]
    fn boolean_round_trip() {
        assert_eq!(read_boolean(&[0]).unwrap(), RpValue::Boolean(false));
        assert_eq!(read_boolean(&[1]).unwrap(), RpValue::Boolean(true));
        assert_eq!(read_boolean(&[0xff]).unwrap(), RpValue::Boolean(true));
        assert_eq!(write_boolean(&RpValue::Boolean(true)).unwrap(), vec![1]);
    }

    #[test]
    fn rational_round_trip() {
        let bytes = [0, 0, 0, 1, 0, 0, 0, 25];
        let value = read_rational(&bytes).unwrap();
        assert_eq!(
            value,
            RpValue::Rational { numerator: 1, denominator: 25 }
        );
        assert_eq!(write_rational(&value).unwrap(), bytes.to_vec());
    }

    #[test]
    fn length_caps_matches_length_and_position() {
        assert!(is_length("Length"));
        assert!(is_length("Position"));
        assert!(!is_length("UInt64"));
    }

    #[test]
    fn length_round_trip() {
        for v in [0i64, 1, 9, 42, 69, 380, 787, 130556] {
            let value = RpValue::Length(v);
            let bytes = write_length(&value).unwrap();
            assert_eq!(bytes.len(), 8);
            assert_eq!(read_length(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn xid_caps_matches_track_id() {
        assert!(is_xid("TrackID"));
        assert!(is_xid("Track ID"));
    }

    #[test]
    fn avid_offset_round_trip() {
        let value = RpValue::AvidOffset(0x1234_5678);
        let bytes = write_avid_offset(&value).unwrap();
        assert_eq!(bytes.len(), 24);
        assert_eq!(read_avid_offset(&bytes).unwrap(), value);
    }
}
