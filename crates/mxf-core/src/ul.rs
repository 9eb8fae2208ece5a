//! 16-byte Universal Label identifiers.

use std::fmt;

/// A 16-byte SMPTE Universal Label.
///
/// Administration byte `key[4]` and category byte `key[5]` classify the
/// label (`0x02` = set/pack, `0x53` = local-set syntax); byte 13 selects
/// Header/Body/Footer for partition packs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[must_use]
pub struct Ul(pub [u8; 16]);

impl Ul {
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Whether this label begins with the SMPTE `060e2b34` registration prefix.
    pub fn is_smpte(&self) -> bool {
        self.0[0..4] == [0x06, 0x0e, 0x2b, 0x34]
    }

    /// Whether this is an all-zero synthetic placeholder label.
    pub fn is_synthetic_zero(&self) -> bool {
        self.0 == [0u8; 16]
    }

    pub fn hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parses a lowercase/uppercase hex string (no separators) into a label.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 32 {
            return None;
        }
        let mut out = [0u8; 16];
        for (i, chunk) in s.as_bytes().chunks(2).enumerate() {
            let byte_str = std::str::from_utf8(chunk).ok()?;
            out[i] = u8::from_str_radix(byte_str, 16).ok()?;
        }
        Some(Self(out))
    }
}

impl fmt::Debug for Ul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ul({})", self.hex())
    }
}

impl fmt::Display for Ul {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let ul = Ul::from_hex("060e2b34020501010d010201010b0000").unwrap();
        assert_eq!(ul.hex(), "060e2b34020501010d010201010b0000");
        assert!(ul.is_smpte());
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Ul::from_hex("0102").is_none());
    }
}
