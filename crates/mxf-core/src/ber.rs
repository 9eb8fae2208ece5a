//! SMPTE BER length encoding used by every KLV length field.
//!
//! Short form: a single byte `0x00..0x7f` is the length itself. Long form:
//! a leading byte `0x80 | n` (`1 <= n <= 8`) followed by `n` big-endian
//! bytes. `0x80` alone (`n == 0`) is legal short-hand for a zero length;
//! this quirk is preserved rather than rejected.

use crate::error::{Error, Result};

/// Decodes a BER length, optionally with a fixed, non-self-describing
/// width (used for 2-byte local-set length fields and similar).
///
/// Returns `(value, bytes_consumed)`.
pub fn decode(data: &[u8], bytes_num: Option<u8>) -> Result<(u64, usize)> {
    match bytes_num {
        Some(n) => {
            let n = n as usize;
            if n == 0 || n > 8 {
                return Err(Error::InvalidBer(format!("fixed width {n} out of range 1..8")));
            }
            if data.len() < n {
                return Err(Error::InvalidBer(format!(
                    "need {n} bytes for fixed-width length, have {}",
                    data.len()
                )));
            }
            Ok((be_bytes_to_u64(&data[..n]), n))
        }
        None => {
            let first = *data
                .first()
                .ok_or_else(|| Error::InvalidBer("empty length field".into()))?;
            if first & 0x80 == 0 {
                Ok((first as u64, 1))
            } else {
                let n = (first & 0x7f) as usize;
                if n > 8 {
                    return Err(Error::InvalidBer(format!("long-form byte count {n} > 8")));
                }
                if data.len() < 1 + n {
                    return Err(Error::InvalidBer(format!(
                        "need {} bytes for long-form length, have {}",
                        1 + n,
                        data.len()
                    )));
                }
                Ok((be_bytes_to_u64(&data[1..1 + n]), 1 + n))
            }
        }
    }
}

/// Convenience wrapper over [`decode`] that drops the consumed-byte count.
pub fn decode_length(data: &[u8], bytes_num: Option<u8>) -> Result<u64> {
    Ok(decode(data, bytes_num)?.0)
}

/// Encodes `value` as a BER length.
///
/// `bytes_num` forces a fixed width (long form, zero-padded) regardless of
/// `value`'s magnitude. Without it, the minimum width that fits `value` is
/// chosen, and values below 128 always collapse to a single short-form
/// byte (the `prefix` flag has no effect on that case: the short-form byte
/// already doubles as "no marker").
pub fn encode(value: u64, bytes_num: Option<u8>, prefix: bool) -> Result<Vec<u8>> {
    match bytes_num {
        Some(n) => {
            if n == 0 || n > 8 {
                return Err(Error::InvalidBer(format!("fixed width {n} out of range 1..8")));
            }
            let raw = u64_to_be_bytes(value, n as usize);
            if prefix {
                let mut out = Vec::with_capacity(1 + n as usize);
                out.push(0x80 | n);
                out.extend_from_slice(&raw);
                Ok(out)
            } else {
                Ok(raw)
            }
        }
        None => {
            if value < 128 {
                Ok(vec![value as u8])
            } else {
                let n = minimal_width(value);
                let raw = u64_to_be_bytes(value, n);
                if prefix {
                    let mut out = Vec::with_capacity(1 + n);
                    out.push(0x80 | n as u8);
                    out.extend_from_slice(&raw);
                    Ok(out)
                } else {
                    Ok(raw)
                }
            }
        }
    }
}

fn be_bytes_to_u64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

fn u64_to_be_bytes(value: u64, width: usize) -> Vec<u8> {
    let full = value.to_be_bytes();
    full[8 - width..].to_vec()
}

/// Smallest byte count `n` (1..=8) such that `value < 256^n`.
fn minimal_width(value: u64) -> usize {
    let mut n = 1usize;
    while n < 8 && value >> (8 * n) != 0 {
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_form_round_trip() {
        assert_eq!(encode(0, None, true).unwrap(), vec![0x00]);
        assert_eq!(encode(127, None, true).unwrap(), vec![0x7f]);
    }

    #[test]
    fn long_form_round_trip() {
        assert_eq!(encode(128, None, true).unwrap(), vec![0x81, 0x80]);
        assert_eq!(encode(256, None, true).unwrap(), vec![0x82, 0x01, 0x00]);
    }

    #[test]
    fn decode_known_long_form() {
        let bytes = [0x88, 0, 0, 0, 0, 0, 0, 0, 0x1c];
        assert_eq!(decode(&bytes, None).unwrap(), (28, 9));
    }

    #[test]
    fn decode_rejects_width_over_eight() {
        let bytes = [0x89, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert!(decode(&bytes, None).is_err());
    }

    #[test]
    fn decode_0x80_is_bug_compatible_zero() {
        assert_eq!(decode(&[0x80], None).unwrap(), (0, 1));
    }

    #[test]
    fn fixed_width_no_prefix_round_trips() {
        for &n in &[1u8, 2, 3, 4, 8] {
            let encoded = encode(28, Some(n), false).unwrap();
            assert_eq!(encoded.len(), n as usize);
            assert_eq!(decode(&encoded, Some(n)).unwrap().0, 28);
        }
    }

    #[test]
    fn two_byte_local_set_length_has_no_marker() {
        let encoded = encode(485, Some(2), false).unwrap();
        assert_eq!(encoded, vec![0x01, 0xe5]);
    }

    #[test]
    fn fixed_width_rejects_zero_and_over_eight() {
        assert!(encode(1, Some(0), true).is_err());
        assert!(encode(1, Some(9), true).is_err());
        assert!(decode(&[0], Some(0)).is_err());
        assert!(decode(&[0], Some(9)).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn round_trips_for_fixed_widths(value in 0u64..=0xffff_ffffu64, n in 4u8..=8u8) {
            let encoded = encode(value, Some(n), false).unwrap();
            let (decoded, consumed) = decode(&encoded, Some(n)).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert_eq!(consumed, n as usize);
        }

        #[test]
        fn self_describing_round_trips(value in 0u64..=0xffff_ffffu64) {
            let encoded = encode(value, None, true).unwrap();
            let (decoded, consumed) = decode(&encoded, None).unwrap();
            prop_assert_eq!(decoded, value);
            prop_assert_eq!(consumed, encoded.len());
        }
    }
}
