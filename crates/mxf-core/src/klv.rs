//! KLV (Key-Length-Value) framing over a seekable byte stream.

use std::io::{Read, Seek, SeekFrom};

use crate::ber;
use crate::error::{Error, Result};
use crate::ul::Ul;

/// A framed but not-yet-consumed KLV triplet: the key, the file offset of
/// the key, the declared value length, and the number of bytes the BER
/// length prefix itself occupied.
#[derive(Debug, Clone, Copy)]
pub struct KlvHeader {
    pub key: Ul,
    pub pos: u64,
    pub length: u64,
    pub bytes_num: usize,
}

/// Reads the next 16-byte key without consuming it.
pub fn peek_key<R: Read + Seek>(stream: &mut R) -> Result<Ul> {
    let pos = stream.stream_position()?;
    let mut buf = [0u8; 16];
    stream.read_exact(&mut buf)?;
    stream.seek(SeekFrom::Start(pos))?;
    Ok(Ul(buf))
}

/// Reads a key and a self-describing BER length, leaving the cursor at the
/// start of the value.
pub fn open_klv<R: Read + Seek>(stream: &mut R) -> Result<KlvHeader> {
    let pos = stream.stream_position()?;
    let mut key = [0u8; 16];
    stream.read_exact(&mut key)?;

    let mut first = [0u8; 1];
    stream.read_exact(&mut first)?;
    let (length, bytes_num) = if first[0] & 0x80 == 0 {
        (first[0] as u64, 1)
    } else {
        let n = (first[0] & 0x7f) as usize;
        if n > 8 {
            return Err(Error::InvalidBer(format!("long-form byte count {n} > 8")));
        }
        let mut rest = vec![0u8; n];
        stream.read_exact(&mut rest)?;
        let (value, _) = ber::decode(&rest, Some(n as u8))?;
        (value, 1 + n)
    };

    Ok(KlvHeader {
        key: Ul(key),
        pos,
        length,
        bytes_num,
    })
}

/// Reads exactly `header.length` bytes of value payload.
pub fn read_value<R: Read>(stream: &mut R, header: &KlvHeader) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; header.length as usize];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}

/// Skips `header.length` bytes without reading them, for dark/fill KLVs
/// whose payload is only needed opaquely.
pub fn skip_value<R: Seek>(stream: &mut R, header: &KlvHeader) -> Result<()> {
    stream.seek(SeekFrom::Current(header.length as i64))?;
    Ok(())
}

/// Writes a key + BER-long-form(9 bytes) length + value, matching the fixed
/// 8-byte-width length encoding every writer in this stack uses for
/// top-level KLVs.
pub fn write_klv<W: std::io::Write>(stream: &mut W, key: &Ul, value: &[u8]) -> Result<()> {
    stream.write_all(&key.0)?;
    stream.write_all(&ber::encode(value.len() as u64, Some(8), true)?)?;
    stream.write_all(value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn open_klv_reads_short_form() {
        let mut key = vec![0x06, 0x0e, 0x2b, 0x34];
        key.extend([0u8; 12]);
        key.push(0x05); // length byte
        key.extend(b"hello");
        let mut cur = Cursor::new(key);
        let header = open_klv(&mut cur).unwrap();
        assert_eq!(header.length, 5);
        assert_eq!(header.bytes_num, 1);
        let value = read_value(&mut cur, &header).unwrap();
        assert_eq!(value, b"hello");
    }

    #[test]
    fn write_then_reopen_round_trips() {
        let key = Ul::new([0x06, 0x0e, 0x2b, 0x34, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
        let mut buf = Vec::new();
        write_klv(&mut buf, &key, b"payload").unwrap();
        let mut cur = Cursor::new(buf);
        let header = open_klv(&mut cur).unwrap();
        assert_eq!(header.key, key);
        assert_eq!(header.length, 7);
        assert_eq!(read_value(&mut cur, &header).unwrap(), b"payload");
    }
}
