//! Operational-pattern driver: selects a walker from the header's
//! `operational_pattern` UL, then orchestrates Header -> Body -> Footer
//! parsing and the symmetric writer.
//!
//! Grounded on the reference implementation's evolved `MXFParser`/
//! `AvidParser`/`OP1aParser` split (not the earlier monolithic parser,
//! which the design notes explicitly call out for replacement): one
//! driver per operational pattern, chosen once via the header's UL,
//! implementing the same `header_partition_parse` /
//! `header_metadata_parse` / `body_parse` / `footer_partition_parse` /
//! `footer_extra_parse` stages.

use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use mxf_core::{klv, Error, Result, Ul};
use mxf_dict::Rp210Dictionary;
use mxf_primer::PrimerPack;

use crate::avid::{self, AvidObjectDirectory};
use crate::dataset::DataSet;
use crate::keys;
use crate::partition::{Dark, KlvFill, Partition, RandomIndexPack};

/// One header-metadata KLV, tagged with how it was classified so the
/// writer's back-patch stages can find the pieces they need without
/// re-inspecting keys.
/// A Primer Pack captured as a header KLV, so the writer re-emits it in its
/// original position and the `header_byte_count` recompute counts its bytes
/// like every other header KLV.
pub struct PrimerKlv {
    pub key: Ul,
    pub pos: u64,
    pub primer: PrimerPack,
}

impl PrimerKlv {
    fn write<W: Write + Seek>(&mut self, stream: &mut W) -> Result<()> {
        self.pos = stream.stream_position()?;
        klv::write_klv(stream, &self.key, &self.primer.write())
    }
}

pub enum HeaderKlv {
    Fill(KlvFill),
    Primer(PrimerKlv),
    Preface(DataSet),
    AvidPreface(DataSet),
    Structural(DataSet),
    AafDefinition(DataSet),
    ObjectDirectory(AvidObjectDirectory),
    Dark(Dark),
}

impl HeaderKlv {
    pub fn pos(&self) -> u64 {
        match self {
            HeaderKlv::Fill(k) => k.pos,
            HeaderKlv::Primer(p) => p.pos,
            HeaderKlv::Preface(d) | HeaderKlv::AvidPreface(d) | HeaderKlv::Structural(d) | HeaderKlv::AafDefinition(d) => d.pos,
            HeaderKlv::ObjectDirectory(o) => o.pos,
            HeaderKlv::Dark(k) => k.pos,
        }
    }

    fn write<W: Write + Seek>(&mut self, stream: &mut W, primer: &PrimerPack) -> Result<()> {
        match self {
            HeaderKlv::Fill(k) => k.write(stream),
            HeaderKlv::Primer(p) => p.write(stream),
            HeaderKlv::Preface(d) | HeaderKlv::AvidPreface(d) | HeaderKlv::Structural(d) | HeaderKlv::AafDefinition(d) => {
                d.write(stream, primer)
            }
            HeaderKlv::ObjectDirectory(o) => o.write(stream),
            HeaderKlv::Dark(k) => k.write(stream),
        }
    }
}

pub enum FooterKlv {
    Fill(KlvFill),
    Dark(Dark),
}

impl FooterKlv {
    fn write<W: Write + Seek>(&mut self, stream: &mut W) -> Result<()> {
        match self {
            FooterKlv::Fill(k) => k.write(stream),
            FooterKlv::Dark(k) => k.write(stream),
        }
    }
}

/// The full decoded structure of one MXF file: header/body/footer, mirroring
/// the reference parser's `self.data` layout.
pub struct ParsedMxf {
    pub header_partition: Partition,
    pub header_klvs: Vec<HeaderKlv>,
    pub header_primer: PrimerPack,
    pub body_klvs: Vec<Dark>,
    pub footer_partition: Partition,
    pub footer_klvs: Vec<FooterKlv>,
    pub random_index_pack: RandomIndexPack,
    /// Whether this file's operational pattern carries an Avid Object
    /// Directory the writer must back-patch; set once at parse time from
    /// the selected [`Walker`].
    pub has_object_directory: bool,
}

impl ParsedMxf {
    pub fn preface(&self) -> Option<&DataSet> {
        self.header_klvs.iter().find_map(|k| match k {
            HeaderKlv::Preface(d) => Some(d),
            _ => None,
        })
    }

    pub fn avid_preface(&mut self) -> Option<&mut DataSet> {
        self.header_klvs.iter_mut().find_map(|k| match k {
            HeaderKlv::AvidPreface(d) => Some(d),
            _ => None,
        })
    }

    fn object_directory(&self) -> Option<&AvidObjectDirectory> {
        self.header_klvs.iter().find_map(|k| match k {
            HeaderKlv::ObjectDirectory(o) => Some(o),
            _ => None,
        })
    }
}

/// The distinct per-operational-pattern behavior: how header metadata is
/// classified and whether the Avid Object Directory back-patch applies.
pub trait Walker {
    fn header_metadata_parse<R: Read + Seek>(&self, stream: &mut R, header_byte_count: u64, dictionary: &Arc<Rp210Dictionary>) -> Result<(Vec<HeaderKlv>, PrimerPack)>;

    /// Whether this pattern's header carries an Avid Object Directory that
    /// the writer must back-patch.
    fn has_object_directory(&self) -> bool;
}

/// Detects the run-in window and positions `stream` at the first
/// occurrence of the partition-pack label, within the first 64 KiB.
pub fn skip_run_in<R: Read + Seek>(stream: &mut R) -> Result<()> {
    let mut window = vec![0u8; 65536];
    let start = stream.stream_position()?;
    let read = stream.read(&mut window)?;
    window.truncate(read);

    let needle = hex_decode(keys::PARTITION_PACK_LABEL_PREFIX);
    let idx = window
        .windows(needle.len())
        .position(|w| w == needle.as_slice())
        .ok_or(Error::NotMxf)?;

    stream.seek(SeekFrom::Start(start + idx as u64))?;
    Ok(())
}

fn hex_decode(hex: &str) -> Vec<u8> {
    hex.as_bytes()
        .chunks(2)
        .map(|c| u8::from_str_radix(std::str::from_utf8(c).unwrap(), 16).unwrap())
        .collect()
}

/// Reads the header Partition Pack and the optional trailing KLV-Fill
/// (not counted towards `header_byte_count` per SMPTE 377M).
pub fn header_partition_parse<R: Read + Seek>(stream: &mut R) -> Result<(Partition, Option<KlvFill>)> {
    let header = klv::open_klv(stream)?;
    let bytes = klv::read_value(stream, &header)?;
    let partition = Partition::read(header.key, header.pos, &bytes)?;

    let peeked = klv::peek_key(stream)?;
    let fill = if keys::is_klv_fill(&peeked) {
        let fh = klv::open_klv(stream)?;
        let data = klv::read_value(stream, &fh)?;
        Some(KlvFill::new(fh.key, fh.pos, data))
    } else {
        None
    };
    Ok((partition, fill))
}

/// Opaque KLV-by-KLV skip until the footer partition key is reached.
pub fn body_parse<R: Read + Seek>(stream: &mut R) -> Result<Vec<Dark>> {
    let mut klvs = Vec::new();
    loop {
        let peeked = klv::peek_key(stream)?;
        if peeked == keys::footer_partition_key() {
            return Ok(klvs);
        }
        let header = klv::open_klv(stream)?;
        let data = klv::read_value(stream, &header)?;
        klvs.push(Dark::new(header.key, header.pos, data));
    }
}

pub fn footer_partition_parse<R: Read + Seek>(stream: &mut R) -> Result<(Partition, Vec<FooterKlv>)> {
    let header = klv::open_klv(stream)?;
    let bytes = klv::read_value(stream, &header)?;
    let partition = Partition::read(header.key, header.pos, &bytes)?;

    let mut klvs = Vec::new();
    let peeked = klv::peek_key(stream)?;
    if keys::is_klv_fill(&peeked) {
        let fh = klv::open_klv(stream)?;
        let data = klv::read_value(stream, &fh)?;
        klvs.push(FooterKlv::Fill(KlvFill::new(fh.key, fh.pos, data)));
    }
    Ok((partition, klvs))
}

/// Consumes any trailing KLV-Fill / Index Table Segment dark KLVs and the
/// terminating Random Index Pack.
pub fn footer_extra_parse<R: Read + Seek>(stream: &mut R, klvs: &mut Vec<FooterKlv>) -> Result<RandomIndexPack> {
    loop {
        let peeked = klv::peek_key(stream)?;
        if peeked == keys::random_index_pack_key() {
            break;
        }
        let header = klv::open_klv(stream)?;
        let data = klv::read_value(stream, &header)?;
        if keys::is_klv_fill(&header.key) {
            klvs.push(FooterKlv::Fill(KlvFill::new(header.key, header.pos, data)));
        } else {
            klvs.push(FooterKlv::Dark(Dark::new(header.key, header.pos, data)));
        }
    }
    let header = klv::open_klv(stream)?;
    let bytes = klv::read_value(stream, &header)?;
    RandomIndexPack::read(header.key, header.pos, &bytes, header.bytes_num)
}

/// Reads the header's `operational_pattern` and constructs the matching
/// walker, or `None` if no registered pattern matches.
pub enum SelectedWalker {
    Avid(AvidWalker),
    Op1a(Op1aWalker),
}

pub fn select_walker(operational_pattern: &Ul) -> Option<SelectedWalker> {
    if operational_pattern.hex() == keys::AVID_OPERATIONAL_PATTERN {
        Some(SelectedWalker::Avid(AvidWalker))
    } else if keys::matches_op1a_pattern(operational_pattern) {
        Some(SelectedWalker::Op1a(Op1aWalker))
    } else {
        None
    }
}

/// Parses a complete file from `stream`, dispatching header metadata to
/// whichever walker the header's operational pattern selects.
pub fn parse<R: Read + Seek>(stream: &mut R, dictionary: Arc<Rp210Dictionary>) -> Result<ParsedMxf> {
    skip_run_in(stream)?;
    let (header_partition, header_fill) = header_partition_parse(stream)?;

    let walker = select_walker(&header_partition.operational_pattern)
        .ok_or_else(|| Error::BadPartition(format!("unrecognized operational pattern {}", header_partition.operational_pattern)))?;

    let (has_object_directory, mut header_klvs, header_primer) = match &walker {
        SelectedWalker::Avid(w) => {
            let (klvs, primer) = w.header_metadata_parse(stream, header_partition.header_byte_count, &dictionary)?;
            (w.has_object_directory(), klvs, primer)
        }
        SelectedWalker::Op1a(w) => {
            let (klvs, primer) = w.header_metadata_parse(stream, header_partition.header_byte_count, &dictionary)?;
            (w.has_object_directory(), klvs, primer)
        }
    };
    if let Some(fill) = header_fill {
        header_klvs.insert(0, HeaderKlv::Fill(fill));
    }

    let body_klvs = body_parse(stream)?;
    let (footer_partition, mut footer_klvs) = footer_partition_parse(stream)?;
    let random_index_pack = footer_extra_parse(stream, &mut footer_klvs)?;

    Ok(ParsedMxf {
        header_partition,
        header_klvs,
        header_primer,
        body_klvs,
        footer_partition,
        footer_klvs,
        random_index_pack,
        has_object_directory,
    })
}

/// Serializes `parsed` to `stream` in original order, then performs the
/// three write-side back-patches: Avid Object Directory offset (Avid
/// pattern only), header `footer_partition`/`header_byte_count`, and
/// footer `this_partition`/`footer_partition` plus the Random Index
/// Pack's rewritten partition offsets.
pub fn write<W: Write + Seek + Truncate>(parsed: &mut ParsedMxf, stream: &mut W) -> Result<()> {
    let has_object_directory = parsed.has_object_directory;
    parsed.header_partition.write(stream)?;
    let mut header_klv_lengths = Vec::with_capacity(parsed.header_klvs.len());
    for klv in &mut parsed.header_klvs {
        let before = stream.stream_position()?;
        klv.write(stream, &parsed.header_primer)?;
        header_klv_lengths.push(stream.stream_position()? - before);
    }

    for klv in &mut parsed.body_klvs {
        klv.write(stream)?;
    }

    parsed.footer_partition.write(stream)?;
    for klv in &mut parsed.footer_klvs {
        klv.write(stream)?;
    }
    parsed.random_index_pack.write(stream)?;

    if has_object_directory {
        if let Some(object_directory_pos) = parsed.object_directory().map(|o| o.pos) {
            if let Some(avid_preface) = parsed.avid_preface() {
                use mxf_types::RpValue;
                avid_preface.set_element("object_directory", RpValue::AvidOffset(object_directory_pos));
            }
        }
        let primer = parsed.header_primer.clone();
        if let Some(avid_preface) = parsed.avid_preface() {
            stream.seek(SeekFrom::Start(avid_preface.pos))?;
            avid_preface.write(stream, &primer)?;
        }
    }

    stream.seek(SeekFrom::Start(0))?;
    parsed.header_partition.footer_partition = parsed.footer_partition.pos;
    // A leading KLV-Fill (run-in padding to the KAG boundary) is not
    // counted towards header_byte_count; everything else written between
    // the Partition Pack and the body is.
    let skip_first = matches!(parsed.header_klvs.first(), Some(HeaderKlv::Fill(_)));
    parsed.header_partition.header_byte_count = header_klv_lengths
        .iter()
        .enumerate()
        .filter(|&(i, _)| !(skip_first && i == 0))
        .map(|(_, len)| *len)
        .sum();
    parsed.header_partition.write(stream)?;

    stream.seek(SeekFrom::Start(parsed.footer_partition.pos))?;
    parsed.footer_partition.this_partition = parsed.footer_partition.pos;
    parsed.footer_partition.footer_partition = parsed.footer_partition.pos;
    parsed.footer_partition.write(stream)?;

    parsed.random_index_pack.entries = vec![(0, parsed.header_partition.pos), (1, parsed.footer_partition.pos)];
    parsed.random_index_pack.write(stream)?;

    let end = stream.stream_position()?;
    stream.truncate_to(end)?;
    Ok(())
}

/// The handful of destination kinds this writer knows how to truncate
/// after a back-patched rewrite leaves the new file shorter than whatever
/// was previously on disk or in the buffer at that path.
pub trait Truncate {
    fn truncate_to(&mut self, len: u64) -> Result<()>;
}

impl Truncate for std::fs::File {
    fn truncate_to(&mut self, len: u64) -> Result<()> {
        self.set_len(len)?;
        Ok(())
    }
}

impl Truncate for std::io::Cursor<Vec<u8>> {
    fn truncate_to(&mut self, len: u64) -> Result<()> {
        self.get_mut().truncate(len as usize);
        Ok(())
    }
}

pub struct AvidWalker;

impl Walker for AvidWalker {
    fn header_metadata_parse<R: Read + Seek>(
        &self,
        stream: &mut R,
        header_byte_count: u64,
        dictionary: &Arc<Rp210Dictionary>,
    ) -> Result<(Vec<HeaderKlv>, PrimerPack)> {
        let header_start = stream.stream_position()?;
        let header_end = header_start + header_byte_count;

        let mut klvs = Vec::new();
        let mut primer = PrimerPack::new(Arc::clone(dictionary));
        let mut primer_initialized = false;

        while stream.stream_position()? < header_end {
            let header = klv::open_klv(stream)?;
            let bytes = klv::read_value(stream, &header)?;
            let key = header.key;

            if keys::is_klv_fill(&key) {
                klvs.push(HeaderKlv::Fill(KlvFill::new(key, header.pos, bytes)));
            } else if key == keys::primer_pack_key() {
                primer = PrimerPack::read(&bytes, Arc::clone(dictionary))?;
                primer_initialized = true;
                klvs.push(HeaderKlv::Primer(PrimerKlv {
                    key,
                    pos: header.pos,
                    primer: primer.clone(),
                }));
            } else if key == keys::preface_key() {
                let set = DataSet::decode(key, header.pos, "Preface".to_string(), false, &bytes, &primer)?;
                klvs.push(HeaderKlv::Preface(set));
            } else if key == keys::avid_preface_key() {
                let avid_primer = avid::avid_metadata_preface_primer(&primer);
                let set = DataSet::decode(key, header.pos, "AvidMetadataPreface".to_string(), true, &bytes, &avid_primer)?;
                klvs.push(HeaderKlv::AvidPreface(set));
            } else if keys::avid_aaf_definition_keys().contains(&key) {
                let aaf_primer = avid::aaf_definition_primer(&primer);
                let set = DataSet::decode(key, header.pos, "AvidAAFDefinition".to_string(), true, &bytes, &aaf_primer)?;
                klvs.push(HeaderKlv::AafDefinition(set));
            } else if keys::avid_plain_structural_keys().contains(&key) {
                let name = keys::dataset_name(&key).unwrap_or("DataSet").to_string();
                let set = DataSet::decode(key, header.pos, name, false, &bytes, &primer)?;
                klvs.push(HeaderKlv::Structural(set));
            } else if keys::avid_flavored_structural_keys().contains(&key) {
                let avid_primer = avid::avid_flavored_primer(&primer);
                let name = format!("Avid{}", keys::dataset_name(&key).unwrap_or("DataSet"));
                let set = DataSet::decode(key, header.pos, name, true, &bytes, &avid_primer)?;
                klvs.push(HeaderKlv::Structural(set));
            } else if key == keys::avid_object_directory_key() {
                let dir = AvidObjectDirectory::read(key, header.pos, &bytes)?;
                klvs.push(HeaderKlv::ObjectDirectory(dir));
            } else {
                klvs.push(HeaderKlv::Dark(Dark::new(key, header.pos, bytes)));
            }
        }

        if !primer_initialized {
            tracing::warn!("header metadata had no Primer Pack");
        }
        Ok((klvs, primer))
    }

    fn has_object_directory(&self) -> bool {
        true
    }
}

pub struct Op1aWalker;

impl Walker for Op1aWalker {
    fn header_metadata_parse<R: Read + Seek>(
        &self,
        stream: &mut R,
        header_byte_count: u64,
        dictionary: &Arc<Rp210Dictionary>,
    ) -> Result<(Vec<HeaderKlv>, PrimerPack)> {
        let header_start = stream.stream_position()?;
        let header_end = header_start + header_byte_count;

        let mut klvs = Vec::new();
        let mut primer = PrimerPack::new(Arc::clone(dictionary));

        while stream.stream_position()? < header_end {
            let header = klv::open_klv(stream)?;
            let bytes = klv::read_value(stream, &header)?;
            let key = header.key;

            if keys::is_klv_fill(&key) {
                klvs.push(HeaderKlv::Fill(KlvFill::new(key, header.pos, bytes)));
            } else if key == keys::primer_pack_key() {
                primer = PrimerPack::read(&bytes, Arc::clone(dictionary))?;
                klvs.push(HeaderKlv::Primer(PrimerKlv {
                    key,
                    pos: header.pos,
                    primer: primer.clone(),
                }));
            } else if key == keys::preface_key() {
                let set = DataSet::decode(key, header.pos, "Preface".to_string(), false, &bytes, &primer)?;
                klvs.push(HeaderKlv::Preface(set));
            } else if keys::op1a_structural_keys().contains(&key) {
                let name = keys::dataset_name(&key).unwrap_or("DataSet").to_string();
                let set = DataSet::decode(key, header.pos, name, false, &bytes, &primer)?;
                klvs.push(HeaderKlv::Structural(set));
            } else {
                klvs.push(HeaderKlv::Dark(Dark::new(key, header.pos, bytes)));
            }
        }

        Ok((klvs, primer))
    }

    fn has_object_directory(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_avid_walker() {
        let op = Ul::from_hex(keys::AVID_OPERATIONAL_PATTERN).unwrap();
        assert!(matches!(select_walker(&op), Some(SelectedWalker::Avid(_))));
    }

    #[test]
    fn selects_op1a_walker() {
        let op = Ul::from_hex("060e2b34040101010d0102010101ff00").unwrap();
        assert!(matches!(select_walker(&op), Some(SelectedWalker::Op1a(_))));
    }

    #[test]
    fn unrecognized_pattern_selects_nothing() {
        let op = Ul::from_hex("00000000000000000000000000000000").unwrap();
        assert!(select_walker(&op).is_none());
    }

    #[test]
    fn op1a_header_metadata_captures_primer_pack() {
        let dictionary = Arc::new(Rp210Dictionary::synthetic_only());
        let primer = PrimerPack::new(Arc::clone(&dictionary));
        let primer_bytes = primer.write();

        let mut stream = std::io::Cursor::new(Vec::new());
        klv::write_klv(&mut stream, &keys::primer_pack_key(), &primer_bytes).unwrap();
        let header_byte_count = stream.stream_position().unwrap();
        stream.seek(SeekFrom::Start(0)).unwrap();

        let walker = Op1aWalker;
        let (klvs, _) = walker.header_metadata_parse(&mut stream, header_byte_count, &dictionary).unwrap();

        assert_eq!(klvs.len(), 1);
        assert!(matches!(klvs[0], HeaderKlv::Primer(_)));
    }

    #[test]
    fn header_klv_write_reemits_primer_pack_bytes() {
        let dictionary = Arc::new(Rp210Dictionary::synthetic_only());
        let primer = PrimerPack::new(Arc::clone(&dictionary));

        let mut original = HeaderKlv::Primer(PrimerKlv {
            key: keys::primer_pack_key(),
            pos: 0,
            primer: primer.clone(),
        });

        let mut stream = std::io::Cursor::new(Vec::new());
        original.write(&mut stream, &primer).unwrap();

        stream.seek(SeekFrom::Start(0)).unwrap();
        let header = klv::open_klv(&mut stream).unwrap();
        assert_eq!(header.key, keys::primer_pack_key());
        let bytes = klv::read_value(&mut stream, &header).unwrap();
        let read_back = PrimerPack::read(&bytes, Arc::clone(&dictionary)).unwrap();
        assert_eq!(read_back.write(), primer.write());
    }
}
