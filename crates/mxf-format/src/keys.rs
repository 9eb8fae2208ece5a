//! Fixed Universal Label tables used to classify header/body/footer KLVs.
//!
//! Every constant here is carried verbatim from the reference dispatch
//! tables: the Avid walker's and the OP-1a walker's key sets overlap but
//! are not identical, so each walker gets its own structural-key list
//! instead of one shared list with exceptions.

use mxf_core::Ul;

fn ul(hex: &str) -> Ul {
    Ul::from_hex(hex).expect("key table entry must be a valid 32-hex-digit UL")
}

pub fn klv_fill_keys() -> [Ul; 2] {
    [
        ul("060e2b34010101010201021001000000"),
        ul("060e2b34010101010301021001000000"),
    ]
}

pub fn is_klv_fill(key: &Ul) -> bool {
    klv_fill_keys().contains(key)
}

pub fn primer_pack_key() -> Ul {
    ul("060e2b34020501010d01020101050100")
}

pub fn preface_key() -> Ul {
    ul("060e2b34025301010d01010101012f00")
}

/// The undocumented key Avid writes its metadata-dictionary pseudo-Preface
/// under, in place of the regular SMPTE Preface key.
pub fn avid_preface_key() -> Ul {
    ul("8053080036210804b3b398a51c9011d4")
}

pub fn avid_object_directory_key() -> Ul {
    ul("9613b38a87348746f10296f056e04d2a")
}

pub fn random_index_pack_key() -> Ul {
    ul("060e2b34020501010d01020101110100")
}

/// Footer Partition Pack's fixed key (closed, complete).
pub fn footer_partition_key() -> Ul {
    ul("060e2b34020501010d01020101040400")
}

/// The Avid "416"/"119" dark AAF-definition chunk keys: class/property/type
/// definitions Avid dumps into the header as dark KLVs under a dedicated
/// customized primer, never exposed through the regular RP 210 table.
pub fn avid_aaf_definition_keys() -> [Ul; 21] {
    [
        // 416 chunk
        ul("060e2b34025301010d01010102010000"),
        ul("060e2b34025301010d01010102020000"),
        ul("060e2b34025301010d01010102040000"),
        ul("060e2b34025301010d01010102050000"),
        ul("060e2b34025301010d01010102060000"),
        ul("060e2b34025301010d01010102070000"),
        ul("060e2b34025301010d01010102080000"),
        ul("060e2b34025301010d01010102090000"),
        ul("060e2b34025301010d010101020a0000"),
        ul("060e2b34025301010d010101020b0000"),
        ul("060e2b34025301010d010101020c0000"),
        ul("060e2b34025301010d010101020d0000"),
        ul("060e2b34025301010d010101020e0000"),
        ul("060e2b34025301010d01010102200000"),
        ul("060e2b34025301010d01010102210000"),
        ul("060e2b34025301010d01010102220000"),
        ul("060e2b34025301010d01010102250000"),
        // 119 chunk
        ul("060e2b34025301010d01010101011b00"),
        ul("060e2b34025301010d01010101011f00"),
        ul("060e2b34025301010d01010101012000"),
        ul("060e2b34025301010d01010101012200"),
    ]
}

/// Plain SMPTE structural sets the Avid walker decodes with the unmodified
/// header primer: Filler, Sequence, SourceClip, TimecodeComponent,
/// ContentStorage, EssenceDescription, SourcePackage, TimelineTrack,
/// GenericSoundEssenceDescriptor, MultipleDescriptor, WaveAudioDescriptor.
pub fn avid_plain_structural_keys() -> [Ul; 11] {
    [
        ul("060e2b34025301010d01010101010900"),
        ul("060e2b34025301010d01010101010f00"),
        ul("060e2b34025301010d01010101011100"),
        ul("060e2b34025301010d01010101011400"),
        ul("060e2b34025301010d01010101011800"),
        ul("060e2b34025301010d01010101012e00"),
        ul("060e2b34025301010d01010101013700"),
        ul("060e2b34025301010d01010101013b00"),
        ul("060e2b34025301010d01010101014200"),
        ul("060e2b34025301010d01010101014400"),
        ul("060e2b34025301010d01010101014800"),
    ]
}

/// Structural sets the Avid walker decodes through the Avid-flavored
/// primer/primer customization (`AvidMXFDataSet`): CDCIEssenceDescriptor,
/// Identification, MaterialPackage, and the dark-dictionary TaggedValue
/// set ("Avid Dark 2" in the canonical naming table).
pub fn avid_flavored_structural_keys() -> [Ul; 4] {
    [
        ul("060e2b34025301010d01010101012800"),
        ul("060e2b34025301010d01010101013000"),
        ul("060e2b34025301010d01010101013600"),
        ul("060e2b34025301010d01010101013f00"),
    ]
}

/// Structural sets recognized by the OP-1a walker. A strict superset in
/// coverage but decoded uniformly as plain `DataSet`s -- OP-1a header
/// metadata carries no Avid-flavored primer customization.
pub fn op1a_structural_keys() -> [Ul; 16] {
    [
        ul("060e2b34025301010d01010101010900"),
        ul("060e2b34025301010d01010101010f00"),
        ul("060e2b34025301010d01010101011100"),
        ul("060e2b34025301010d01010101011400"),
        ul("060e2b34025301010d01010101011800"),
        ul("060e2b34025301010d01010101013000"),
        ul("060e2b34025301010d01010101013700"),
        ul("060e2b34025301010d01010101013600"),
        ul("060e2b34025301010d01010101013b00"),
        ul("060e2b34025301010d01010101012300"),
        ul("060e2b34025301010d01010101012800"),
        ul("060e2b34025301010d01010101014200"),
        ul("060e2b34025301010d01010101014400"),
        ul("060e2b34025301010d01010101014700"),
        ul("060e2b34025301010d01010101014800"),
        ul("060e2b34025301010d01010101015100"),
    ]
}

/// The canonical UL -> structural-set-name table (SMPTE sets plus the two
/// Avid dark reuses), used to derive a `DataSet`'s `set_type` string.
pub fn dataset_name(key: &Ul) -> Option<&'static str> {
    match key.hex().as_str() {
        "060e2b34025301010d01010101010900" => Some("Filler"),
        "060e2b34025301010d01010101010f00" => Some("Sequence"),
        "060e2b34025301010d01010101011100" => Some("SourceClip"),
        "060e2b34025301010d01010101011400" => Some("TimecodeComponent"),
        "060e2b34025301010d01010101012300" => Some("EssenceContainerData"),
        "060e2b34025301010d01010101012800" => Some("CDCIEssenceDescriptor"),
        "060e2b34025301010d01010101011800" => Some("ContentStorage"),
        "060e2b34025301010d01010101012e00" => Some("EssenceDescription"),
        "060e2b34025301010d01010101013000" => Some("Identification"),
        "060e2b34025301010d01010101013600" => Some("MaterialPackage"),
        "060e2b34025301010d01010101013700" => Some("SourcePackage"),
        "060e2b34025301010d01010101013b00" => Some("TimelineTrack"),
        "060e2b34025301010d01010101013f00" => Some("TaggedValue"),
        "060e2b34025301010d01010101014200" => Some("GenericSoundEssenceDescriptor"),
        "060e2b34025301010d01010101014400" => Some("MultipleDescriptor"),
        "060e2b34025301010d01010101014700" => Some("AES3PCMDescriptor"),
        "060e2b34025301010d01010101014800" => Some("WaveAudioDescriptor"),
        "060e2b34025301010d01010101015100" => Some("MPEG2VideoDescriptor"),
        _ => None,
    }
}

/// Operational-pattern UL prefixes this driver recognizes. The OP-1a entry
/// carries a `..` wildcard byte (sub-pattern) at offset 13, matched by
/// prefix/suffix instead of a full 16-byte comparison.
pub const AVID_OPERATIONAL_PATTERN: &str = "060e2b34040101030e04020110000000";
pub const OP1A_OPERATIONAL_PATTERN_PREFIX: &str = "060e2b34040101010d0102010101";
pub const OP1A_OPERATIONAL_PATTERN_SUFFIX: &str = "00";

pub fn matches_op1a_pattern(op: &Ul) -> bool {
    let hex = op.hex();
    hex.starts_with(OP1A_OPERATIONAL_PATTERN_PREFIX) && hex.ends_with(OP1A_OPERATIONAL_PATTERN_SUFFIX)
}

/// The run-in window's partition-pack label prefix; the run-in is whatever
/// precedes the first occurrence of this prefix, up to 64 KiB in.
pub const PARTITION_PACK_LABEL_PREFIX: &str = "060e2b34020501010d010201";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn op1a_pattern_matches_wildcard_byte() {
        let op = ul("060e2b34040101010d0102010101ff00");
        assert!(matches_op1a_pattern(&op));
    }

    #[test]
    fn avid_pattern_is_exact() {
        assert_eq!(AVID_OPERATIONAL_PATTERN.len(), 32);
        let op = ul(AVID_OPERATIONAL_PATTERN);
        assert_eq!(op.hex(), AVID_OPERATIONAL_PATTERN);
    }

    #[test]
    fn dataset_name_resolves_known_keys() {
        assert_eq!(
            dataset_name(&ul("060e2b34025301010d01010101013f00")),
            Some("TaggedValue")
        );
        assert_eq!(dataset_name(&ul("00000000000000000000000000000000")), None);
    }
}
