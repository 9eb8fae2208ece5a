//! Avid extensions: the Object Directory pseudo-index, the Avid metadata
//! dictionary pseudo-Preface, and the primer customizations that let
//! `DataSet` decode Avid-private tags through the ordinary
//! `decode_from_local_tag` path instead of hardcoded per-tag text.

use uuid::Uuid;

use mxf_core::{klv, Error, Result, Ul};
use mxf_primer::PrimerPack;

use crate::keys;

/// A local tag's synthetic UL under the AAF-compatibility convention: the
/// tag's two bytes, left-padded with zeros to 16 bytes. Matches the
/// reference implementation's `tag.rjust(32, '0')` primer-injection trick,
/// which is also how `mxf-dict`'s synthetic seed entries are keyed.
pub fn synthetic_ul_for_tag(tag: u16) -> Ul {
    let mut bytes = [0u8; 16];
    bytes[14..16].copy_from_slice(&tag.to_be_bytes());
    Ul::new(bytes)
}

fn customize_with(primer: &PrimerPack, rows: &[(u16, &str, &str, &str)]) -> PrimerPack {
    let extra_rows = rows
        .iter()
        .map(|&(tag, ty, name, def)| (synthetic_ul_for_tag(tag), ty.to_string(), name.to_string(), def.to_string()));
    let extra_mappings = rows.iter().map(|&(tag, ..)| (tag, synthetic_ul_for_tag(tag)));
    primer.customize(extra_rows, extra_mappings)
}

/// Primer customization for `AvidAAFDefinition` dark KLVs ("416"/"119"
/// chunk class/property/type definitions).
pub fn aaf_definition_primer(primer: &PrimerPack) -> PrimerPack {
    customize_with(
        primer,
        &[
            (0x0003, "StrongReferenceArray", "Avid links to compound types", ""),
            (0x0004, "StrongReferenceArray", "Avid links to simple types", ""),
            (0x0010, "Boolean", "Signedness", ""),
            (0x000f, "UInt8", "Length in bytes", ""),
            (0x001b, "StrongReference", "Unknown data 1", ""),
        ],
    )
}

/// Primer customization for the Avid metadata-dictionary pseudo-Preface.
/// Tags `0003`/`0004` resolve through ordinary primer entries
/// (`AvidOffset`/`UInt32`) rather than the hardcoded placeholder strings
/// an earlier evolution of the reference implementation used.
pub fn avid_metadata_preface_primer(primer: &PrimerPack) -> PrimerPack {
    customize_with(
        primer,
        &[
            (0x0001, "StrongReference", "AAF Metadata", "Avid AAF Metadata Reference"),
            (0x0002, "StrongReference", "Preface", "Avid Preface Reference"),
            (0x0003, "AvidOffset", "Object Directory", "Position of the Object Directory"),
            (0x0004, "UInt32", "Audio Channels", "Number of audio channels in source file"),
        ],
    )
}

/// Primer customization for the Avid-flavored structural sets
/// (CDCIEssenceDescriptor, Identification, MaterialPackage, TaggedValue):
/// the base dictionary already carries the Avid seed rows, only the two
/// Avid version tags need an explicit mapping.
pub fn avid_flavored_primer(primer: &PrimerPack) -> PrimerPack {
    customize_with(
        primer,
        &[
            (0x3c07, "AvidVersion", "Avid Version Tag", ""),
            (0x3c03, "AvidVersion", "Avid Version Tag", ""),
        ],
    )
}

/// Avid's dark Object Directory: `UInt64 count || UInt8 entry_size ||
/// count x (16B UUID || UInt64 offset || UInt8 flag)`.
#[derive(Debug, Clone)]
pub struct AvidObjectDirectory {
    pub key: Ul,
    pub pos: u64,
    pub entries: Vec<(Uuid, u64, u8)>,
}

impl AvidObjectDirectory {
    pub fn read(key: Ul, pos: u64, bytes: &[u8]) -> Result<Self> {
        if key != keys::avid_object_directory_key() {
            return Err(Error::BadObjectDirectoryKey(key.hex()));
        }
        if bytes.len() < 9 {
            return Err(Error::BadPartition("Avid Object Directory shorter than its own header".to_string()));
        }
        let mut count_bytes = [0u8; 8];
        count_bytes.copy_from_slice(&bytes[0..8]);
        let count = u64::from_be_bytes(count_bytes) as usize;
        let item_size = bytes[8] as usize;
        if item_size == 0 {
            return Err(Error::BadPartition("Avid Object Directory item_size is 0".to_string()));
        }

        let mut entries = Vec::with_capacity(count);
        let mut offset = 9usize;
        for _ in 0..count {
            if offset + item_size > bytes.len() {
                return Err(Error::BadPartition("Avid Object Directory entries run past the declared length".to_string()));
            }
            let mut uid = [0u8; 16];
            uid.copy_from_slice(&bytes[offset..offset + 16]);
            let mut off_bytes = [0u8; 8];
            off_bytes.copy_from_slice(&bytes[offset + 16..offset + 24]);
            let flag = bytes[offset + 24];
            entries.push((Uuid::from_bytes(uid), u64::from_be_bytes(off_bytes), flag));
            offset += item_size;
        }
        Ok(Self { key, pos, entries })
    }

    pub fn write<W: std::io::Write + std::io::Seek>(&mut self, stream: &mut W) -> Result<()> {
        let mut body = Vec::with_capacity(25 * self.entries.len());
        for (uid, offset, flag) in &self.entries {
            body.extend(uid.as_bytes());
            body.extend(offset.to_be_bytes());
            body.push(*flag);
        }
        let item_size: u8 = if self.entries.is_empty() { 25 } else { (body.len() / self.entries.len()) as u8 };

        let mut value = Vec::with_capacity(9 + body.len());
        value.extend((self.entries.len() as u64).to_be_bytes());
        value.push(item_size);
        value.extend(body);

        self.pos = stream.stream_position()?;
        klv::write_klv(stream, &self.key, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_directory_round_trips() {
        let key = keys::avid_object_directory_key();
        let entries = vec![(Uuid::from_bytes([1u8; 16]), 100u64, 0u8), (Uuid::from_bytes([2u8; 16]), 4096u64, 0u8)];
        let mut dir = AvidObjectDirectory { key, pos: 0, entries: entries.clone() };
        let mut buf = std::io::Cursor::new(Vec::new());
        dir.write(&mut buf).unwrap();

        let bytes = buf.into_inner();
        let reopened = AvidObjectDirectory::read(key, 0, &bytes[25..]).unwrap();
        assert_eq!(reopened.entries, entries);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let key = Ul::from_hex("00000000000000000000000000000000").unwrap();
        assert!(AvidObjectDirectory::read(key, 0, &[0u8; 9]).is_err());
    }

    #[test]
    fn synthetic_ul_matches_rjust_zero_convention() {
        assert_eq!(synthetic_ul_for_tag(0x0003).hex(), "00000000000000000000000000000003");
        assert_eq!(synthetic_ul_for_tag(0x3c0a).hex(), "00000000000000000000000000003c0a");
    }
}
