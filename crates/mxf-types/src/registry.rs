//! Dispatches an RP 210 type name to the codec that claims it.
//!
//! Matching order is fixed, mirroring the order RP 210 type names were
//! historically tried in: `Reference`, `Version`, `Integer`, `Boolean`,
//! `TimeStamp`, `String`, `Rational`, `Length`, `XID`, `Array`,
//! `VariableArray`, `AvidOffset`, `AvidVersion`. First match wins; later
//! entries are never consulted once an earlier one claims the type name.

use mxf_core::{Error, Result};

use crate::codec::{array, compound, reference, scalar, string};
use crate::value::RpValue;

pub fn read(type_name: &str, bytes: &[u8]) -> Result<RpValue> {
    if reference::match_kind(type_name).is_some() {
        return reference::read(type_name, bytes);
    }
    if let Some(schema) = compound::match_version_schema(type_name) {
        return compound::read_version(schema, bytes);
    }
    if let Some(width) = scalar::match_integer_width(type_name) {
        return scalar::read_integer(width, bytes);
    }
    if scalar::is_boolean(type_name) {
        return scalar::read_boolean(bytes);
    }
    if compound::is_timestamp(type_name) {
        return compound::read_timestamp(bytes);
    }
    if string::is_string(type_name) {
        return string::read(bytes);
    }
    if scalar::is_rational(type_name) {
        return scalar::read_rational(bytes);
    }
    if scalar::is_length(type_name) {
        return scalar::read_length(bytes);
    }
    if scalar::is_xid(type_name) {
        return scalar::read_xid(bytes);
    }
    if let Some(subtype) = array::match_subtype(type_name) {
        return array::read(&subtype, bytes);
    }
    if let Some(subtype) = array::match_subtype_variable(type_name) {
        return array::read_variable(&subtype, bytes);
    }
    if scalar::is_avid_offset(type_name) {
        return scalar::read_avid_offset(bytes);
    }
    if compound::is_avid_version(type_name) {
        return compound::read_avid_version(bytes);
    }
    Err(Error::NoConverter(type_name.to_string()))
}

pub fn write(type_name: &str, value: &RpValue) -> Result<Vec<u8>> {
    // A passthrough value always re-encodes to its original bytes,
    // regardless of what the (possibly now-stale) type name claims.
    if let RpValue::Raw(bytes) = value {
        return Ok(bytes.clone());
    }
    if reference::match_kind(type_name).is_some() {
        return reference::write(value);
    }
    if let Some(schema) = compound::match_version_schema(type_name) {
        return compound::write_version(schema, value);
    }
    if scalar::match_integer_width(type_name).is_some() {
        return scalar::write_integer(value);
    }
    if scalar::is_boolean(type_name) {
        return scalar::write_boolean(value);
    }
    if compound::is_timestamp(type_name) {
        return compound::write_timestamp(value);
    }
    if string::is_string(type_name) {
        return string::write(value);
    }
    if scalar::is_rational(type_name) {
        return scalar::write_rational(value);
    }
    if scalar::is_length(type_name) {
        return scalar::write_length(value);
    }
    if scalar::is_xid(type_name) {
        return scalar::write_xid(value);
    }
    if array::match_subtype(type_name).is_some() {
        return array::write(value);
    }
    if array::match_subtype_variable(type_name).is_some() {
        return array::write_variable(value);
    }
    if scalar::is_avid_offset(type_name) {
        return scalar::write_avid_offset(value);
    }
    if compound::is_avid_version(type_name) {
        return compound::write_avid_version(value);
    }
    Err(Error::NoConverter(type_name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_by_type_name() {
        let bytes = scalar::write_integer(&RpValue::Integer { width: 4, value: 42 }).unwrap();
        assert_eq!(
            read("UInt32", &bytes).unwrap(),
            RpValue::Integer { width: 4, value: 42 }
        );
    }

    #[test]
    fn raw_passthrough_ignores_type_name() {
        let value = RpValue::Raw(vec![1, 2, 3]);
        assert_eq!(write("whatever this used to be", &value).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn unknown_type_errors() {
        assert!(read("NoSuchType", &[]).is_err());
    }

    #[test]
    fn reference_beats_array_suffix_ordering() {
        // "StrongReferenceArray" must resolve through the Array family, not
        // be mistaken for a plain Reference despite containing the word.
        let value = RpValue::Array {
            subtype: "StrongReference".to_string(),
            items: vec![],
        };
        let bytes = write("StrongReferenceArray", &value).unwrap();
        assert_eq!(read("StrongReferenceArray", &bytes).unwrap(), value);
    }
}
