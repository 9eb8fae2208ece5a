//! Compound fixed-schema codecs: `Version`/`AvidVersion` and `TimeStamp`.

use mxf_core::{Error, Result};

use crate::value::{RpValue, Timestamp};

/// `Version` caps matches `ProductVersion` or `VersionType` appearing
/// anywhere in the type name; which one decides the field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSchema {
    /// `major, minor, patch, build, release`, each a `UInt16`.
    Product,
    /// `major, minor`, each a `UInt8`.
    Type,
}

pub fn match_version_schema(type_name: &str) -> Option<VersionSchema> {
    if type_name.contains("ProductVersion") {
        Some(VersionSchema::Product)
    } else if type_name.contains("VersionType") {
        Some(VersionSchema::Type)
    } else {
        None
    }
}

pub fn read_version(schema: VersionSchema, bytes: &[u8]) -> Result<RpValue> {
    let widths: &[usize] = match schema {
        VersionSchema::Product => &[2, 2, 2, 2, 2],
        VersionSchema::Type => &[1, 1],
    };
    Ok(RpValue::Version(read_fields(widths, bytes)?))
}

pub fn write_version(schema: VersionSchema, value: &RpValue) -> Result<Vec<u8>> {
    let widths: &[usize] = match schema {
        VersionSchema::Product => &[2, 2, 2, 2, 2],
        VersionSchema::Type => &[1, 1],
    };
    match value {
        RpValue::Version(fields) => write_fields(widths, fields),
        other => Err(Error::WriteEncodeFailure(format!("expected Version value, got {other:?}"))),
    }
}

/// `AvidVersion` caps matches `AvidVersion` appearing anywhere in the type
/// name; the schema is `major, minor, tertiary, patch_level` (`UInt16`
/// each) followed by a one-byte `kind`.
pub fn is_avid_version(type_name: &str) -> bool {
    type_name.contains("AvidVersion")
}

const AVID_VERSION_WIDTHS: &[usize] = &[2, 2, 2, 2, 1];

pub fn read_avid_version(bytes: &[u8]) -> Result<RpValue> {
    Ok(RpValue::AvidVersion(read_fields(AVID_VERSION_WIDTHS, bytes)?))
}

pub fn write_avid_version(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::AvidVersion(fields) => write_fields(AVID_VERSION_WIDTHS, fields),
        other => Err(Error::WriteEncodeFailure(format!(
            "expected AvidVersion value, got {other:?}"
        ))),
    }
}

fn read_fields(widths: &[usize], bytes: &[u8]) -> Result<Vec<u32>> {
    let total: usize = widths.iter().sum();
    if bytes.len() != total {
        return Err(Error::InvalidBer(format!(
            "compound value is {} bytes, expected {total}",
            bytes.len()
        )));
    }
    let mut out = Vec::with_capacity(widths.len());
    let mut offset = 0;
    for &w in widths {
        let field = bytes[offset..offset + w]
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | b as u32);
        out.push(field);
        offset += w;
    }
    Ok(out)
}

fn write_fields(widths: &[usize], values: &[u32]) -> Result<Vec<u8>> {
    if values.len() != widths.len() {
        return Err(Error::WriteEncodeFailure(format!(
            "compound value has {} fields, schema needs {}",
            values.len(),
            widths.len()
        )));
    }
    let mut out = Vec::new();
    for (&w, &v) in widths.iter().zip(values) {
        out.extend(v.to_be_bytes()[4 - w..].iter());
    }
    Ok(out)
}

/// `TimeStamp` caps is an exact-string match.
pub fn is_timestamp(type_name: &str) -> bool {
    type_name == "TimeStamp"
}

/// Quantum every microsecond-field byte encodes, as documented in the
/// recognized wire format: one quarter-centisecond unit is 400,000us.
const MICROSECOND_QUANTUM: u32 = 400_000;

pub fn read_timestamp(bytes: &[u8]) -> Result<RpValue> {
    if bytes.len() != 8 {
        return Err(Error::InvalidBer(format!(
            "TimeStamp value is {} bytes, expected 8",
            bytes.len()
        )));
    }
    if bytes.iter().all(|&b| b == 0) {
        return Ok(RpValue::TimeStamp(None));
    }
    let year = i16::from_be_bytes([bytes[0], bytes[1]]);
    let month = bytes[2];
    let day = bytes[3];
    let hour = bytes[4];
    let minute = bytes[5];
    let second = bytes[6];
    let microsecond = bytes[7] as u32 * MICROSECOND_QUANTUM;
    if chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32).is_none() {
        return Err(Error::InvalidBer(format!(
            "TimeStamp has an invalid date {year:04}-{month:02}-{day:02}"
        )));
    }
    Ok(RpValue::TimeStamp(Some(Timestamp {
        year,
        month,
        day,
        hour,
        minute,
        second,
        microsecond,
    })))
}

pub fn write_timestamp(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::TimeStamp(None) => Ok(vec![0u8; 8]),
        RpValue::TimeStamp(Some(ts)) => {
            let mut out = Vec::with_capacity(8);
            out.extend(ts.year.to_be_bytes());
            out.push(ts.month);
            out.push(ts.day);
            out.push(ts.hour);
            out.push(ts.minute);
            out.push(ts.second);
            out.push((ts.microsecond / MICROSECOND_QUANTUM) as u8);
            Ok(out)
        }
        other => Err(Error::WriteEncodeFailure(format!("expected TimeStamp value, got {other:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_schema_matching() {
        assert_eq!(match_version_schema("ProductVersion"), Some(VersionSchema::Product));
        assert_eq!(match_version_schema("VersionType"), Some(VersionSchema::Type));
        assert_eq!(match_version_schema("UInt8"), None);
    }

    #[test]
    fn product_version_round_trip() {
        let value = RpValue::Version(vec![1, 2, 0, 0, 1]);
        let bytes = write_version(VersionSchema::Product, &value).unwrap();
        assert_eq!(bytes.len(), 10);
        assert_eq!(read_version(VersionSchema::Product, &bytes).unwrap(), value);
    }

    #[test]
    fn version_type_round_trip() {
        let value = RpValue::Version(vec![1, 2]);
        let bytes = write_version(VersionSchema::Type, &value).unwrap();
        assert_eq!(bytes.len(), 2);
        assert_eq!(read_version(VersionSchema::Type, &bytes).unwrap(), value);
    }

    #[test]
    fn timestamp_unknown_is_all_zero() {
        let value = RpValue::TimeStamp(None);
        let bytes = write_timestamp(&value).unwrap();
        assert_eq!(bytes, vec![0u8; 8]);
        assert_eq!(read_timestamp(&bytes).unwrap(), value);
    }

    #[test]
    fn timestamp_round_trips_on_quantum_boundaries() {
        for microsecond in [0, 400_000, 800_000] {
            let value = RpValue::TimeStamp(Some(Timestamp {
                year: 2010,
                month: 1,
                day: 1,
                hour: 1,
                minute: 1,
                second: 1,
                microsecond,
            }));
            let bytes = write_timestamp(&value).unwrap();
            assert_eq!(read_timestamp(&bytes).unwrap(), value);
        }
    }

    #[test]
    fn timestamp_rejects_invalid_date() {
        let bytes = [7, 0xda, 13, 40, 1, 1, 1, 0];
        assert!(read_timestamp(&bytes).is_err());
    }
}
