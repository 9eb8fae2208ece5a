//! DataSet / Preface decoding: the local-tag triplet walk every header
//! metadata set and pack shares, grounded on the reference `MXFDataSet`.

use indexmap::IndexMap;

use mxf_core::{ber, Error, Result, Ul};
use mxf_primer::PrimerPack;
use mxf_types::{ReferenceKind, RpValue};

/// Local tag `0x3C0A` names a set's instance identifier, the node id used
/// by the object graph.
pub const INSTANCE_UID_TAG: u16 = 0x3c0a;

/// A decoded Set or Pack: an ordered `local_tag -> value` table plus an
/// `element_name -> local_tag` index derived from the Primer/RP 210 lookup
/// performed while decoding.
#[derive(Debug, Clone)]
pub struct DataSet {
    pub key: Ul,
    pub pos: u64,
    pub set_type: String,
    pub dark: bool,
    by_tag: IndexMap<u16, RpValue>,
    element_mapping: IndexMap<String, u16>,
}

impl DataSet {
    /// Decodes `bytes` as a sequence of `(UInt16 local_tag, UInt16
    /// set_size, set_size bytes of value)` triplets. The cursor must land
    /// exactly on `bytes.len()`; any field declaring a size that runs past
    /// the end, or a final field that leaves fewer than 4 trailing bytes,
    /// is a [`Error::TruncatedSet`].
    pub fn decode(key: Ul, pos: u64, set_type: String, dark: bool, bytes: &[u8], primer: &PrimerPack) -> Result<Self> {
        let mut by_tag = IndexMap::new();
        let mut element_mapping = IndexMap::new();
        let declared = bytes.len() as u64;

        let mut offset = 0usize;
        while offset < bytes.len() {
            if offset + 4 > bytes.len() {
                return Err(Error::TruncatedSet {
                    consumed: offset as u64,
                    declared,
                });
            }
            let tag = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]);
            let set_size = u16::from_be_bytes([bytes[offset + 2], bytes[offset + 3]]) as usize;
            if offset + 4 + set_size > bytes.len() {
                return Err(Error::TruncatedSet {
                    consumed: (offset + 4) as u64,
                    declared,
                });
            }
            let localdata = &bytes[offset + 4..offset + 4 + set_size];
            let (element_name, value) = primer.decode_from_local_tag(tag, localdata);
            element_mapping.insert(element_name, tag);
            by_tag.insert(tag, value);
            offset += 4 + set_size;
        }

        if !dark && by_tag.get(&INSTANCE_UID_TAG).is_none() {
            tracing::warn!(key = %key, set_type, "non-dark DataSet has no InstanceUID field");
        }

        Ok(Self {
            key,
            pos,
            set_type,
            dark,
            by_tag,
            element_mapping,
        })
    }

    pub fn get_element(&self, element_name: &str) -> Option<&RpValue> {
        let tag = self.element_mapping.get(element_name)?;
        self.by_tag.get(tag)
    }

    /// Iterates `(element_name, value)` pairs in decode order, for callers
    /// that need the whole table rather than a single named lookup (e.g. a
    /// diagnostic dump).
    pub fn elements(&self) -> impl Iterator<Item = (&str, &RpValue)> {
        self.element_mapping.iter().map(|(name, tag)| (name.as_str(), &self.by_tag[tag]))
    }

    pub fn set_element(&mut self, element_name: &str, value: RpValue) -> bool {
        let Some(&tag) = self.element_mapping.get(element_name) else {
            return false;
        };
        self.by_tag.insert(tag, value);
        true
    }

    pub fn rm_element(&mut self, element_name: &str) -> bool {
        let Some(tag) = self.element_mapping.shift_remove(element_name) else {
            return false;
        };
        self.by_tag.shift_remove(&tag);
        true
    }

    pub fn instance_uid(&self) -> Option<[u8; 16]> {
        match self.by_tag.get(&INSTANCE_UID_TAG) {
            Some(RpValue::Reference { bytes, .. }) => Some(*bytes),
            _ => None,
        }
    }

    /// Flattens every `Reference`/`Array<Reference>` field of sub-kind
    /// `StrongReference` into the list of UUIDs this set owns.
    pub fn get_strong_references(&self) -> Vec<[u8; 16]> {
        let mut out = Vec::new();
        for value in self.by_tag.values() {
            match value {
                RpValue::Reference {
                    bytes,
                    kind: ReferenceKind::StrongReference,
                } => out.push(*bytes),
                RpValue::Array { subtype, items } if subtype == "StrongReference" => {
                    for item in items {
                        if let RpValue::Reference { bytes, .. } = item {
                            out.push(*bytes);
                        }
                    }
                }
                _ => {}
            }
        }
        out
    }

    /// Re-encodes every field in wire order: `tag || 2-byte BER length
    /// (no prefix) || value`.
    pub fn write<W: std::io::Write + std::io::Seek>(&mut self, stream: &mut W, primer: &PrimerPack) -> Result<()> {
        let mut value = Vec::new();
        for (&tag, field) in &self.by_tag {
            let encoded = primer.encode_from_local_tag(tag, field)?;
            value.extend(tag.to_be_bytes());
            value.extend(ber::encode(encoded.len() as u64, Some(2), false)?);
            value.extend(encoded);
        }
        self.pos = stream.stream_position()?;
        mxf_core::klv::write_klv(stream, &self.key, &value)
    }

    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_dict::Rp210Dictionary;
    use std::sync::Arc;

    fn primer_with_instance_uid() -> PrimerPack {
        let dict = Arc::new(Rp210Dictionary::from_rows(vec![(
            Ul::from_hex("060e2b34010101010101150200000000").unwrap(),
            "StrongReference".to_string(),
            "Instance UID".to_string(),
            String::new(),
        )]));
        let mut primer = PrimerPack::new(dict);
        primer.inject([(INSTANCE_UID_TAG, Ul::from_hex("060e2b34010101010101150200000000").unwrap())]);
        primer
    }

    fn field_bytes(tag: u16, value: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend(tag.to_be_bytes());
        out.extend((value.len() as u16).to_be_bytes());
        out.extend(value);
        out
    }

    #[test]
    fn decodes_instance_uid_field() {
        let primer = primer_with_instance_uid();
        let uid = [0xABu8; 16];
        let bytes = field_bytes(INSTANCE_UID_TAG, &uid);
        let set = DataSet::decode(
            Ul::from_hex("060e2b34025301010d01010101010900").unwrap(),
            0,
            "Filler".to_string(),
            false,
            &bytes,
            &primer,
        )
        .unwrap();
        assert_eq!(set.instance_uid(), Some(uid));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn truncated_trailing_bytes_error() {
        let primer = primer_with_instance_uid();
        let mut bytes = field_bytes(INSTANCE_UID_TAG, &[0u8; 16]);
        bytes.push(0xff); // one dangling byte, not a full next triplet
        let result = DataSet::decode(
            Ul::from_hex("060e2b34025301010d01010101010900").unwrap(),
            0,
            "Filler".to_string(),
            false,
            &bytes,
            &primer,
        );
        assert!(matches!(result, Err(Error::TruncatedSet { .. })));
    }

    #[test]
    fn get_set_rm_element_round_trip() {
        let primer = primer_with_instance_uid();
        let bytes = field_bytes(INSTANCE_UID_TAG, &[0u8; 16]);
        let mut set = DataSet::decode(
            Ul::from_hex("060e2b34025301010d01010101010900").unwrap(),
            0,
            "Filler".to_string(),
            false,
            &bytes,
            &primer,
        )
        .unwrap();
        assert!(set.get_element("instance_uid").is_some());
        let new_value = RpValue::Reference {
            bytes: [1u8; 16],
            kind: ReferenceKind::StrongReference,
        };
        assert!(set.set_element("instance_uid", new_value.clone()));
        assert_eq!(set.get_element("instance_uid"), Some(&new_value));
        assert!(set.rm_element("instance_uid"));
        assert!(set.get_element("instance_uid").is_none());
    }
}
