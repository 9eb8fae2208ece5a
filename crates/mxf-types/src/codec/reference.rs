//! `Reference`-family codec: strong/weak references, UMIDs, UUIDs, ULs,
//! AUIDs and package IDs all share the same 16-byte wire shape and differ
//! only in which RP 210 type string named them.

use mxf_core::{Error, Result};

use crate::value::{ReferenceKind, RpValue};

/// Matches a `Reference`-family type name and returns the kind it names, or
/// `None` if `type_name` isn't a reference type at all.
pub fn match_kind(type_name: &str) -> Option<ReferenceKind> {
    if type_name.ends_with("StrongReference") {
        Some(ReferenceKind::StrongReference)
    } else if type_name.ends_with("WeakReference") {
        Some(ReferenceKind::WeakReference)
    } else if type_name == "Primary Package" {
        Some(ReferenceKind::Other("Primary Package".to_string()))
    } else if type_name == "As per ISO 11578 standard (Annex A)" {
        Some(ReferenceKind::Other(type_name.to_string()))
    } else if type_name.starts_with("Universal Label") {
        Some(ReferenceKind::Other("Universal Label".to_string()))
    } else if type_name.starts_with("UL") {
        Some(ReferenceKind::Other("UL".to_string()))
    } else if type_name.ends_with("AUID") {
        Some(ReferenceKind::Other("AUID".to_string()))
    } else if type_name.contains("UMID") {
        Some(ReferenceKind::Other("UMID".to_string()))
    } else if type_name.contains("UUID") {
        Some(ReferenceKind::Other("UUID".to_string()))
    } else if type_name.contains("PackageID") {
        Some(ReferenceKind::Other("PackageID".to_string()))
    } else {
        None
    }
}

pub fn read(type_name: &str, bytes: &[u8]) -> Result<RpValue> {
    let kind = match_kind(type_name).expect("caller already matched this as a reference type");
    if bytes.len() != 16 {
        return Err(Error::InvalidBer(format!(
            "reference value is {} bytes, expected 16",
            bytes.len()
        )));
    }
    let mut buf = [0u8; 16];
    buf.copy_from_slice(bytes);
    Ok(RpValue::Reference { bytes: buf, kind })
}

pub fn write(value: &RpValue) -> Result<Vec<u8>> {
    match value {
        RpValue::Reference { bytes, .. } => Ok(bytes.to_vec()),
        other => Err(Error::WriteEncodeFailure(format!(
            "expected Reference value, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_strong_and_weak_suffix() {
        assert_eq!(match_kind("StrongReference"), Some(ReferenceKind::StrongReference));
        assert_eq!(
            match_kind("TimelineTrackStrongReference"),
            Some(ReferenceKind::StrongReference)
        );
        assert_eq!(match_kind("WeakReference"), Some(ReferenceKind::WeakReference));
    }

    #[test]
    fn strong_reference_array_does_not_match_reference() {
        // "...Array" suffix beats the "...Reference" suffix check: this is
        // an Array-family type, handled by codec::array instead.
        assert_eq!(match_kind("StrongReferenceArray"), None);
    }

    #[test]
    fn round_trips_16_bytes() {
        let bytes: [u8; 16] = [
            0xc1, 0x1b, 0xf0, 0x20, 0xcb, 0x1a, 0x44, 0x8c, 0x90, 0x4c, 0x40, 0x13, 0xe5, 0x08,
            0xcb, 0xce,
        ];
        let value = read("UUID", &bytes).unwrap();
        assert_eq!(write(&value).unwrap(), bytes.to_vec());
    }
}
