//! Primer Pack: the ordered local-tag -> Universal Label mapping every
//! DataSet's fields are resolved through, plus the RP 210 customization
//! layer that lets a sub-context (e.g. Avid's extra local tags) extend a
//! shared dictionary without mutating it.

use std::sync::Arc;

use indexmap::IndexMap;

use mxf_core::{Error, Result, Ul};
use mxf_dict::Rp210Dictionary;
use mxf_types::{registry, RpValue};

/// Ordered `local_tag -> Universal Label` table, paired with the RP 210
/// dictionary used to resolve those labels into type/name/definition.
#[derive(Debug, Clone)]
pub struct PrimerPack {
    mappings: IndexMap<u16, Ul>,
    dictionary: Arc<Rp210Dictionary>,
}

impl PrimerPack {
    pub fn new(dictionary: Arc<Rp210Dictionary>) -> Self {
        Self {
            mappings: IndexMap::new(),
            dictionary,
        }
    }

    /// Decodes a Primer Pack's value bytes: `UInt32 list_size, UInt32
    /// item_size`, then `list_size` entries of `2-byte local_tag ||
    /// (item_size - 2)-byte UL`.
    pub fn read(bytes: &[u8], dictionary: Arc<Rp210Dictionary>) -> Result<Self> {
        if bytes.len() < 8 {
            return Err(Error::BadPrimerKey(format!(
                "Primer Pack value is {} bytes, need at least 8",
                bytes.len()
            )));
        }
        let list_size = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        let item_size = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let mut mappings = IndexMap::new();
        let mut offset = 8;
        while mappings.len() < list_size {
            if offset + item_size > bytes.len() {
                return Err(Error::BadPrimerKey("Primer Pack entries run past the declared value".into()));
            }
            let tag = u16::from_be_bytes([bytes[offset], bytes[offset + 1]]);
            let ul_bytes = &bytes[offset + 2..offset + item_size];
            let ul = Ul::from_hex(&hex(ul_bytes)).ok_or_else(|| {
                Error::BadPrimerKey(format!("Primer Pack UL field is {} bytes, not 16", ul_bytes.len()))
            })?;
            mappings.insert(tag, ul);
            offset += item_size;
        }
        Ok(Self { mappings, dictionary })
    }

    /// Serializes back to `list_size || item_size || entries`, in
    /// insertion order.
    pub fn write(&self) -> Vec<u8> {
        let item_size = 2 + 16;
        let mut out = Vec::with_capacity(8 + self.mappings.len() * item_size);
        out.extend((self.mappings.len() as u32).to_be_bytes());
        out.extend((item_size as u32).to_be_bytes());
        for (&tag, ul) in &self.mappings {
            out.extend(tag.to_be_bytes());
            out.extend(ul.bytes());
        }
        out
    }

    /// Builds a customized copy of this primer: a fresh dictionary with
    /// `extra_rows` layered on top of the shared one (never mutating the
    /// shared `Arc`), and `extra_mappings` merged into the local-tag table.
    #[must_use]
    pub fn customize(
        &self,
        extra_rows: impl IntoIterator<Item = (Ul, String, String, String)>,
        extra_mappings: impl IntoIterator<Item = (u16, Ul)>,
    ) -> Self {
        let mut dictionary = (*self.dictionary).clone();
        for (ul, type_name, element_name, definition) in extra_rows {
            dictionary = dictionary.with_extra_row(ul, type_name, element_name, definition);
        }
        let mut mappings = self.mappings.clone();
        for (tag, ul) in extra_mappings {
            mappings.insert(tag, ul);
        }
        Self {
            mappings,
            dictionary: Arc::new(dictionary),
        }
    }

    /// Inserts additional local-tag mappings in place.
    pub fn inject(&mut self, mappings: impl IntoIterator<Item = (u16, Ul)>) {
        for (tag, ul) in mappings {
            self.mappings.insert(tag, ul);
        }
    }

    /// Resolves `tag`'s mapped UL, type name and flattened element name.
    pub fn get_mapping(&self, tag: u16) -> Option<(Ul, &mxf_dict::Entry)> {
        let ul = *self.mappings.get(&tag)?;
        self.dictionary.get(&ul).map(|entry| (ul, entry))
    }

    /// Decodes `raw` according to `tag`'s mapping. Both failure modes --
    /// the tag missing from this primer, and the tag's UL missing from the
    /// dictionary -- are recoverable: the value is stored as
    /// [`RpValue::Raw`] and a [`tracing::warn!`] is emitted, matching the
    /// "never silently drop" propagation policy for semantic mismatches.
    pub fn decode_from_local_tag(&self, tag: u16, raw: &[u8]) -> (String, RpValue) {
        let Some(ul) = self.mappings.get(&tag).copied() else {
            tracing::warn!(tag, "local tag not found in primer");
            return (format!("unknown_tag_{tag:04x}"), RpValue::Raw(raw.to_vec()));
        };
        let Some(entry) = self.dictionary.get(&ul) else {
            tracing::warn!(tag, ul = %ul, "primer maps tag to a UL absent from the RP 210 dictionary");
            return (format!("unknown_tag_{tag:04x}"), RpValue::Raw(raw.to_vec()));
        };
        match registry::read(&entry.type_name, raw) {
            Ok(value) => (entry.element_name.clone(), value),
            Err(err) => {
                tracing::warn!(tag, ty = %entry.type_name, %err, "failed to decode field, keeping raw bytes");
                (entry.element_name.clone(), RpValue::Raw(raw.to_vec()))
            }
        }
    }

    /// Re-encodes `value` according to `tag`'s mapping. A [`RpValue::Raw`]
    /// value always re-encodes to its stored bytes verbatim, so unknown
    /// fields still round-trip byte-for-byte.
    pub fn encode_from_local_tag(&self, tag: u16, value: &RpValue) -> Result<Vec<u8>> {
        if let RpValue::Raw(bytes) = value {
            return Ok(bytes.clone());
        }
        let ul = self
            .mappings
            .get(&tag)
            .copied()
            .ok_or_else(|| Error::BadPrimerKey(format!("local tag {tag:04x} not found in primer")))?;
        let entry = self.dictionary.get(&ul).ok_or_else(|| Error::UnknownUl { tag, ul: ul.hex() })?;
        registry::write(&entry.type_name, value)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxf_types::RpValue;

    fn dict() -> Arc<Rp210Dictionary> {
        Arc::new(Rp210Dictionary::synthetic_only())
    }

    #[test]
    fn round_trips_mapping_table() {
        let mut primer = PrimerPack::new(dict());
        primer.inject([(0x3c0au16, Ul::from_hex("060e2b34020501010d01010101010100").unwrap())]);
        let bytes = primer.write();
        let reopened = PrimerPack::read(&bytes, dict()).unwrap();
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get_mapping(0x3c0a).unwrap().0, primer.get_mapping(0x3c0a).unwrap().0);
    }

    #[test]
    fn unmapped_tag_recovers_as_raw() {
        let primer = PrimerPack::new(dict());
        let (name, value) = primer.decode_from_local_tag(0xffff, &[1, 2, 3]);
        assert_eq!(name, "unknown_tag_ffff");
        assert_eq!(value, RpValue::Raw(vec![1, 2, 3]));
    }

    #[test]
    fn customize_does_not_mutate_shared_dictionary() {
        let shared = dict();
        let primer = PrimerPack::new(Arc::clone(&shared));
        let new_ul = Ul::from_hex("00000000000000000000000000000099").unwrap();
        let customized = primer.customize(
            [(new_ul, "UInt8".to_string(), "Custom Field".to_string(), String::new())],
            [(0x1234u16, new_ul)],
        );
        assert!(customized.dictionary.get(&new_ul).is_some());
        assert!(shared.get(&new_ul).is_none());
    }
}
