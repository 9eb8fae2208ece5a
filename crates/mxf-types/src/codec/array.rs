//! `Array` and `VariableArray` codecs.
//!
//! `Array` is self-describing on the wire (item count and item byte size
//! both precede the payload); `VariableArray` carries neither and instead
//! delimits its items by convention -- `\x00\x00` separators for strings,
//! fixed-width concatenation for integers.

use mxf_core::{Error, Result};

use crate::codec::reference;
use crate::codec::scalar;
use crate::registry;
use crate::value::RpValue;

/// Matches the fixed-size `Array` family and extracts the item subtype.
pub fn match_subtype(type_name: &str) -> Option<String> {
    for prefix in ["StrongReference", "WeakReference", "AUID"] {
        if type_name.contains(&format!("{prefix}Array")) {
            return Some(prefix.to_string());
        }
    }
    if let Some(idx) = type_name.find("2 element array of ") {
        return Some(type_name[idx + "2 element array of ".len()..].to_string());
    }
    if let Some(rest) = type_name.strip_prefix("Batch of ") {
        return Some(rest.to_string());
    }
    if let Some(rest) = type_name.strip_suffix("Batch") {
        if !rest.is_empty() {
            return Some(rest.to_string());
        }
    }
    None
}

pub fn read(subtype: &str, bytes: &[u8]) -> Result<RpValue> {
    if bytes.len() < 8 {
        return Err(Error::InvalidBer(format!(
            "Array value is {} bytes, need at least 8 for count+item_size",
            bytes.len()
        )));
    }
    let count = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let item_size = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let payload = &bytes[8..];
    if payload.len() != count * item_size {
        return Err(Error::InvalidBer(format!(
            "Array declares {count} items of {item_size} bytes but payload is {} bytes",
            payload.len()
        )));
    }
    let mut items = Vec::with_capacity(count);
    for chunk in payload.chunks(item_size.max(1)).take(count) {
        items.push(registry::read(subtype, chunk)?);
    }
    Ok(RpValue::Array {
        subtype: subtype.to_string(),
        items,
    })
}

pub fn write(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::Array { subtype, items } => {
            let encoded: Vec<Vec<u8>> = items
                .iter()
                .map(|item| registry::write(subtype, item))
                .collect::<Result<_>>()?;
            let item_size = match encoded.first() {
                Some(first) => first.len(),
                None => {
                    if reference::match_kind(subtype).is_some() {
                        16
                    } else {
                        0
                    }
                }
            };
            let mut out = Vec::with_capacity(8 + encoded.len() * item_size);
            out.extend((items.len() as u32).to_be_bytes());
            out.extend((item_size as u32).to_be_bytes());
            for item in encoded {
                out.extend(item);
            }
            Ok(out)
        }
        other => Err(Error::WriteEncodeFailure(format!("expected Array value, got {other:?}"))),
    }
}

/// How a `VariableArray`'s items are delimited on the wire.
enum VariableArrayKind {
    Strings,
    Integers,
}

/// Matches the unsized `VariableArray` family and extracts the item subtype.
fn match_variable(type_name: &str) -> Option<(VariableArrayKind, String)> {
    if type_name.contains("16 bit Unicode String Array") {
        return Some((VariableArrayKind::Strings, "16 bit Unicode String".to_string()));
    }
    if let Some(idx) = type_name.find("Array of ") {
        let rest = &type_name[idx + "Array of ".len()..];
        if scalar::match_integer_width(rest).is_some() {
            return Some((VariableArrayKind::Integers, rest.to_string()));
        }
    }
    None
}

pub fn match_subtype_variable(type_name: &str) -> Option<String> {
    match_variable(type_name).map(|(_, subtype)| subtype)
}

pub fn read_variable(subtype: &str, bytes: &[u8]) -> Result<RpValue> {
    if subtype == "16 bit Unicode String" {
        let body = if bytes.len() >= 2 { &bytes[..bytes.len() - 2] } else { bytes };
        let items = if body.is_empty() {
            Vec::new()
        } else {
            split_on_double_nul(body)
                .into_iter()
                .map(|chunk| registry::read(subtype, chunk))
                .collect::<Result<Vec<_>>>()?
        };
        return Ok(RpValue::VariableArray {
            subtype: subtype.to_string(),
            items,
        });
    }
    let width = scalar::match_integer_width(subtype)
        .ok_or_else(|| Error::NoConverter(format!("VariableArray subtype '{subtype}'")))?
        as usize;
    if bytes.len() % width != 0 {
        return Err(Error::InvalidBer(format!(
            "VariableArray of {subtype} has {} bytes, not a multiple of {width}",
            bytes.len()
        )));
    }
    let items = bytes
        .chunks(width)
        .map(|chunk| registry::read(subtype, chunk))
        .collect::<Result<Vec<_>>>()?;
    Ok(RpValue::VariableArray {
        subtype: subtype.to_string(),
        items,
    })
}

pub fn write_variable(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::VariableArray { subtype, items } if subtype == "16 bit Unicode String" => {
            // `\x00\x00`-joined, with one trailing separator after the
            // last item (not one after every item).
            let mut out = Vec::new();
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.extend([0u8, 0u8]);
                }
                out.extend(registry::write(subtype, item)?);
            }
            out.extend([0u8, 0u8]);
            Ok(out)
        }
        RpValue::VariableArray { subtype, items } => {
            let mut out = Vec::new();
            for item in items {
                out.extend(registry::write(subtype, item)?);
            }
            Ok(out)
        }
        other => Err(Error::WriteEncodeFailure(format!(
            "expected VariableArray value, got {other:?}"
        ))),
    }
}

fn split_on_double_nul(body: &[u8]) -> Vec<&[u8]> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + 1 < body.len() {
        if body[i] == 0 && body[i + 1] == 0 {
            out.push(&body[start..i]);
            i += 2;
            start = i;
        } else {
            i += 2;
        }
    }
    out.push(&body[start..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::StringValue;

    #[test]
    fn array_subtype_matching() {
        assert_eq!(match_subtype("StrongReferenceArray"), Some("StrongReference".to_string()));
        assert_eq!(
            match_subtype("2 element array of Int32"),
            Some("Int32".to_string())
        );
        assert_eq!(match_subtype("Batch of Universal Labels"), Some("Universal Labels".to_string()));
        assert_eq!(match_subtype("IndirectBatch"), Some("Indirect".to_string()));
    }

    #[test]
    fn array_of_int32_round_trips() {
        let value = RpValue::Array {
            subtype: "Int32".to_string(),
            items: vec![
                RpValue::Integer { width: 4, value: 258 },
                RpValue::Integer { width: 4, value: 750 },
            ],
        };
        let bytes = write(&value).unwrap();
        assert_eq!(read("Int32", &bytes).unwrap(), value);
    }

    #[test]
    fn variable_array_of_uint8_round_trips() {
        let items: Vec<RpValue> = (0..16u64).map(|v| RpValue::Integer { width: 1, value: v }).collect();
        let value = RpValue::VariableArray {
            subtype: "UInt8".to_string(),
            items,
        };
        let bytes = write_variable(&value).unwrap();
        assert_eq!(read_variable("UInt8", &bytes).unwrap(), value);
    }

    #[test]
    fn variable_array_of_strings_round_trips() {
        let items = vec!["Toto", "titi", "tata"]
            .into_iter()
            .map(|s| RpValue::String(StringValue::Unicode(s.to_string())))
            .collect();
        let value = RpValue::VariableArray {
            subtype: "16 bit Unicode String".to_string(),
            items,
        };
        let bytes = write_variable(&value).unwrap();
        assert_eq!(read_variable("16 bit Unicode String", &bytes).unwrap(), value);
    }

    #[test]
    fn variable_array_subtype_matching() {
        assert_eq!(
            match_subtype_variable("Array of UInt8"),
            Some("UInt8".to_string())
        );
        assert_eq!(
            match_subtype_variable("16 bit Unicode String Array"),
            Some("16 bit Unicode String".to_string())
        );
    }
}
