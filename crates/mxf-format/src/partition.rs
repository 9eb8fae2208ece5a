//! Partition Pack, Random Index Pack, KLV-Fill and opaque Dark KLVs.
//!
//! Grounded on the reference implementation's `MXFPartition`/
//! `RandomIndexMetadata`/`KLVFill`/`KLVDarkComponent`: a fixed compound
//! layout read/written field-by-field, plus a trailing self-describing
//! batch of essence-container labels.

use mxf_core::{klv, Error, Result, Ul};

/// Which of the three partition slots a Partition Pack occupies, derived
/// from key byte 13 (`0x02`/`0x03`/`0x04`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionKind {
    Header,
    Body,
    Footer,
}

#[derive(Debug, Clone)]
pub struct Partition {
    pub key: Ul,
    pub pos: u64,
    pub kind: PartitionKind,
    pub major_version: u16,
    pub minor_version: u16,
    pub kag_size: u32,
    pub this_partition: u64,
    pub previous_partition: u64,
    pub footer_partition: u64,
    pub header_byte_count: u64,
    pub index_byte_count: u64,
    pub index_sid: u32,
    pub body_offset: u64,
    pub body_sid: u32,
    pub operational_pattern: Ul,
    pub essence_containers: Vec<Ul>,
}

const PARTITION_KEY_PREFIX: [u8; 13] = [0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01];

fn partition_kind(key: &Ul) -> Result<PartitionKind> {
    let bytes = key.bytes();
    let kind = match bytes[13] {
        0x02 => PartitionKind::Header,
        0x03 => PartitionKind::Body,
        0x04 => PartitionKind::Footer,
        _ => {
            return Err(Error::BadPartition(format!(
                "not a valid Partition Pack key: {}",
                key.hex()
            )))
        }
    };
    if bytes[0..13] != PARTITION_KEY_PREFIX || bytes[14] > 0x04 || bytes[15] != 0x00 {
        return Err(Error::BadPartition(format!(
            "not a valid Partition Pack key: {}",
            key.hex()
        )));
    }
    Ok(kind)
}

fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}
fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}
fn read_u64(bytes: &[u8]) -> u64 {
    let mut a = [0u8; 8];
    a.copy_from_slice(bytes);
    u64::from_be_bytes(a)
}

impl Partition {
    /// Decodes the fixed compound plus trailing `Batch of Universal
    /// Labels`, then validates it against the SMPTE 377M checks.
    pub fn read(key: Ul, pos: u64, bytes: &[u8]) -> Result<Self> {
        let kind = partition_kind(&key)?;
        if bytes.len() < 64 {
            return Err(Error::BadPartition(format!(
                "Partition Pack value is {} bytes, need at least 64",
                bytes.len()
            )));
        }
        let major_version = read_u16(&bytes[0..2]);
        let minor_version = read_u16(&bytes[2..4]);
        let kag_size = read_u32(&bytes[4..8]);
        let this_partition = read_u64(&bytes[8..16]);
        let previous_partition = read_u64(&bytes[16..24]);
        let footer_partition = read_u64(&bytes[24..32]);
        let header_byte_count = read_u64(&bytes[32..40]);
        let index_byte_count = read_u64(&bytes[40..48]);
        let index_sid = read_u32(&bytes[48..52]);
        let body_offset = read_u64(&bytes[52..60]);
        let body_sid = read_u32(&bytes[60..64]);
        let operational_pattern = Ul::from_hex(&hex(&bytes[64..80])).ok_or_else(|| {
            Error::BadPartition("operational_pattern field is not 16 bytes".to_string())
        })?;

        let essence_containers = read_ul_batch(&bytes[80..])?;

        let partition = Self {
            key,
            pos,
            kind,
            major_version,
            minor_version,
            kag_size,
            this_partition,
            previous_partition,
            footer_partition,
            header_byte_count,
            index_byte_count,
            index_sid,
            body_offset,
            body_sid,
            operational_pattern,
            essence_containers,
        };
        partition.validate()?;
        Ok(partition)
    }

    /// The SMPTE 377M-2004 conformance checks the reference implementation
    /// runs after a successful field-by-field decode.
    fn validate(&self) -> Result<()> {
        if self.major_version != 1 {
            return Err(Error::BadPartition("invalid major version for Partition Pack".to_string()));
        }
        if !matches!(self.minor_version, 2 | 3) {
            return Err(Error::BadPartition("invalid minor version for Partition Pack".to_string()));
        }
        if self.kind == PartitionKind::Header {
            if self.this_partition != 0 {
                return Err(Error::BadPartition(
                    "ThisPartition must be 0 in a Header Partition Pack".to_string(),
                ));
            }
            if self.previous_partition != 0 {
                return Err(Error::BadPartition(
                    "PreviousPartition must be 0 in a Header Partition Pack".to_string(),
                ));
            }
        }
        if self.kind == PartitionKind::Footer && self.key.bytes()[14] & 0xfe == 0 {
            return Err(Error::BadPartition("open Footer Partition is not allowed".to_string()));
        }
        if self.essence_containers.is_empty() && self.body_sid != 0 {
            return Err(Error::BadPartition(
                "BodySID must be 0 when there are no essence containers".to_string(),
            ));
        }
        Ok(())
    }

    pub fn write<W: std::io::Write + std::io::Seek>(&mut self, stream: &mut W) -> Result<()> {
        let mut value = Vec::with_capacity(80 + 16 * self.essence_containers.len());
        value.extend(self.major_version.to_be_bytes());
        value.extend(self.minor_version.to_be_bytes());
        value.extend(self.kag_size.to_be_bytes());
        value.extend(self.this_partition.to_be_bytes());
        value.extend(self.previous_partition.to_be_bytes());
        value.extend(self.footer_partition.to_be_bytes());
        value.extend(self.header_byte_count.to_be_bytes());
        value.extend(self.index_byte_count.to_be_bytes());
        value.extend(self.index_sid.to_be_bytes());
        value.extend(self.body_offset.to_be_bytes());
        value.extend(self.body_sid.to_be_bytes());
        value.extend(self.operational_pattern.bytes());
        value.extend(write_ul_batch(&self.essence_containers));

        self.pos = stream.stream_position()?;
        klv::write_klv(stream, &self.key, &value)?;
        Ok(())
    }
}

fn read_ul_batch(bytes: &[u8]) -> Result<Vec<Ul>> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    if bytes.len() < 8 {
        return Err(Error::BadPartition("essence container batch shorter than its own header".to_string()));
    }
    let count = read_u32(&bytes[0..4]) as usize;
    let item_size = read_u32(&bytes[4..8]) as usize;
    let mut out = Vec::with_capacity(count);
    let mut offset = 8;
    for _ in 0..count {
        if offset + item_size > bytes.len() {
            return Err(Error::BadPartition("essence container batch runs past its declared length".to_string()));
        }
        out.push(
            Ul::from_hex(&hex(&bytes[offset..offset + item_size]))
                .ok_or_else(|| Error::BadPartition("essence container entry is not 16 bytes".to_string()))?,
        );
        offset += item_size;
    }
    Ok(out)
}

/// Always emits the 8-byte `UInt32 count || UInt32 item_size` batch header,
/// even for an empty batch: a Partition Pack's essence-container batch is
/// part of its fixed value region, not an optional trailer.
fn write_ul_batch(items: &[Ul]) -> Vec<u8> {
    let mut out = Vec::with_capacity(8 + 16 * items.len());
    out.extend((items.len() as u32).to_be_bytes());
    out.extend(16u32.to_be_bytes());
    for ul in items {
        out.extend(ul.bytes());
    }
    out
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// KLV-Fill: value bytes carried opaquely, re-emitted byte-for-byte.
#[derive(Debug, Clone)]
pub struct KlvFill {
    pub key: Ul,
    pub pos: u64,
    pub data: Vec<u8>,
}

impl KlvFill {
    pub fn new(key: Ul, pos: u64, data: Vec<u8>) -> Self {
        Self { key, pos, data }
    }

    pub fn write<W: std::io::Write + std::io::Seek>(&mut self, stream: &mut W) -> Result<()> {
        self.pos = stream.stream_position()?;
        klv::write_klv(stream, &self.key, &self.data)
    }
}

/// A KLV whose key is unrecognized by the active walker; preserved
/// opaquely with its original key for diagnostics.
#[derive(Debug, Clone)]
pub struct Dark {
    pub key: Ul,
    pub pos: u64,
    pub data: Vec<u8>,
}

impl Dark {
    pub fn new(key: Ul, pos: u64, data: Vec<u8>) -> Self {
        Self { key, pos, data }
    }

    pub fn write<W: std::io::Write + std::io::Seek>(&mut self, stream: &mut W) -> Result<()> {
        self.pos = stream.stream_position()?;
        klv::write_klv(stream, &self.key, &self.data)
    }
}

/// Random Index Pack: a list of `(body_sid, byte_offset)` entries
/// terminated with a total-length `UInt32` that must cross-check against
/// the KLV's own declared length.
#[derive(Debug, Clone)]
pub struct RandomIndexPack {
    pub key: Ul,
    pub pos: u64,
    pub entries: Vec<(u32, u64)>,
}

impl RandomIndexPack {
    pub fn read(key: Ul, pos: u64, bytes: &[u8], bytes_num: usize) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(Error::BadPartition("Random Index Pack shorter than its trailing length field".to_string()));
        }
        let entry_bytes = bytes.len() - 4;
        if entry_bytes % 12 != 0 {
            return Err(Error::BadPartition("Random Index Pack entry region is not a multiple of 12 bytes".to_string()));
        }
        let mut entries = Vec::with_capacity(entry_bytes / 12);
        let mut offset = 0;
        while offset < entry_bytes {
            let body_sid = read_u32(&bytes[offset..offset + 4]);
            let byte_offset = read_u64(&bytes[offset + 4..offset + 12]);
            entries.push((body_sid, byte_offset));
            offset += 12;
        }
        let total_part_length = read_u32(&bytes[entry_bytes..entry_bytes + 4]) as u64;
        if 16 + bytes_num as u64 + bytes.len() as u64 != total_part_length {
            return Err(Error::BadPartition(
                "Random Index Pack's trailing total length disagrees with the KLV's own length".to_string(),
            ));
        }
        Ok(Self { key, pos, entries })
    }

    pub fn write<W: std::io::Write + std::io::Seek>(&mut self, stream: &mut W) -> Result<()> {
        let mut value = Vec::with_capacity(12 * self.entries.len() + 4);
        for (body_sid, byte_offset) in &self.entries {
            value.extend(body_sid.to_be_bytes());
            value.extend(byte_offset.to_be_bytes());
        }
        // write_klv always frames with an 8-byte fixed-width BER length
        // plus its 1-byte marker, i.e. bytes_num == 9.
        let total_part_length = 16u32 + 9 + 4 + value.len() as u32;
        value.extend(total_part_length.to_be_bytes());

        self.pos = stream.stream_position()?;
        klv::write_klv(stream, &self.key, &value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_partition_bytes(kind_byte: u8, body_sid: u32, essence_containers: &[Ul]) -> (Ul, Vec<u8>) {
        let mut key = [0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, kind_byte, 0x04, 0x00];
        if kind_byte == 0x04 {
            key[14] = 0x04; // closed + complete footer
        }
        let key = Ul::new(key);
        let mut value = Vec::new();
        value.extend(1u16.to_be_bytes()); // major
        value.extend(3u16.to_be_bytes()); // minor
        value.extend(0u32.to_be_bytes()); // kag_size
        value.extend(0u64.to_be_bytes()); // this_partition
        value.extend(0u64.to_be_bytes()); // previous_partition
        value.extend(0u64.to_be_bytes()); // footer_partition
        value.extend(0u64.to_be_bytes()); // header_byte_count
        value.extend(0u64.to_be_bytes()); // index_byte_count
        value.extend(0u32.to_be_bytes()); // index_sid
        value.extend(0u64.to_be_bytes()); // body_offset
        value.extend(body_sid.to_be_bytes());
        value.extend([0u8; 16]); // operational_pattern
        value.extend(write_ul_batch(essence_containers));
        (key, value)
    }

    #[test]
    fn empty_essence_container_batch_always_has_header() {
        let (key, bytes) = sample_partition_bytes(0x02, 0, &[]);
        let mut partition = Partition::read(key, 0, &bytes).unwrap();
        let mut buf = std::io::Cursor::new(Vec::new());
        partition.write(&mut buf).unwrap();
        // 16-byte key + 9-byte write_klv length framing + 80-byte fixed
        // compound + 8-byte empty batch header.
        assert_eq!(buf.into_inner().len(), 16 + 9 + 80 + 8);
    }

    #[test]
    fn header_partition_round_trips() {
        let (key, bytes) = sample_partition_bytes(0x02, 0, &[]);
        let partition = Partition::read(key, 0, &bytes).unwrap();
        assert_eq!(partition.kind, PartitionKind::Header);
        assert_eq!(partition.minor_version, 3);

        let mut buf = std::io::Cursor::new(Vec::new());
        let mut p = partition;
        p.write(&mut buf).unwrap();
        let reopened = Partition::read(key, 0, &buf.into_inner()[25..]).unwrap();
        assert_eq!(reopened.body_sid, 0);
    }

    #[test]
    fn header_partition_rejects_nonzero_this_partition() {
        let (key, mut bytes) = sample_partition_bytes(0x02, 0, &[]);
        bytes[8..16].copy_from_slice(&42u64.to_be_bytes());
        assert!(Partition::read(key, 0, &bytes).is_err());
    }

    #[test]
    fn footer_rejects_open_footer() {
        let mut key = [0x06, 0x0e, 0x2b, 0x34, 0x02, 0x05, 0x01, 0x01, 0x0d, 0x01, 0x02, 0x01, 0x01, 0x04, 0x00, 0x00];
        key[14] = 0x00; // open
        let key = Ul::new(key);
        let (_, bytes) = sample_partition_bytes(0x04, 0, &[]);
        assert!(Partition::read(key, 0, &bytes).is_err());
    }

    #[test]
    fn nonzero_body_sid_requires_essence_containers() {
        let (key, bytes) = sample_partition_bytes(0x03, 1, &[]);
        assert!(Partition::read(key, 0, &bytes).is_err());
    }

    #[test]
    fn random_index_pack_round_trips() {
        let key = Ul::from_hex("060e2b34020501010d01020101110100").unwrap();
        let entries = vec![(0u32, 0u64), (1u32, 4096u64)];
        let mut value = Vec::new();
        for (sid, off) in &entries {
            value.extend(sid.to_be_bytes());
            value.extend(off.to_be_bytes());
        }
        let total = 16 + 9 + 4 + value.len() as u32;
        value.extend(total.to_be_bytes());

        let rip = RandomIndexPack::read(key, 0, &value, 9).unwrap();
        assert_eq!(rip.entries, entries);

        let mut buf = std::io::Cursor::new(Vec::new());
        let mut rip = rip;
        rip.write(&mut buf).unwrap();
        let reopened = RandomIndexPack::read(key, 0, &buf.into_inner()[25..], 9).unwrap();
        assert_eq!(reopened.entries, entries);
    }

    #[test]
    fn random_index_pack_rejects_length_mismatch() {
        let key = Ul::from_hex("060e2b34020501010d01020101110100").unwrap();
        let mut value = vec![0u8; 12];
        value.extend(999u32.to_be_bytes());
        assert!(RandomIndexPack::read(key, 0, &value, 9).is_err());
    }
}
