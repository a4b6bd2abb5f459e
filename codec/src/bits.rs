// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Sub-byte bit fields.
//!
//! One numbering convention everywhere: bit 7 is the most significant bit of
//! the byte, and a [`BitRange`]'s `offset` names the highest-order bit of the
//! field, with the field running downward for `count` bits. So
//! `extract(&[0b0011_0000], BitRange::new(5, 2))` yields `0b11`.

use crate::Error;

/// The position of a bit field within a single byte.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct BitRange {
    offset: u8,
    count: u8,
}

impl BitRange {
    pub fn new(offset: u8, count: u8) -> Result<Self, Error> {
        if offset > 7 || count == 0 || count > 8 || count > offset + 1 {
            return Err(Error::BitRangeOutOfBounds { offset, count });
        }
        Ok(Self { offset, count })
    }

    /// The index of the field's highest-order bit (7 = MSB).
    pub fn offset(&self) -> u8 {
        self.offset
    }

    /// The number of bits in the field.
    pub fn count(&self) -> u8 {
        self.count
    }

    fn shift(&self) -> u8 {
        self.offset + 1 - self.count
    }

    fn mask(&self) -> u8 {
        (0xFFu8 >> (8 - self.count)) << self.shift()
    }
}

/// Extract a bit field from a single byte, right-aligned.
pub fn extract(buf: &[u8], range: BitRange) -> Result<u8, Error> {
    let [byte] = buf else {
        return Err(Error::LengthMismatch {
            decoder: "bits",
            expected: "1",
            actual: buf.len(),
        });
    };
    Ok((byte & range.mask()) >> range.shift())
}

/// Merge the low-order `range.count()` bits of `value` into the current byte,
/// leaving every other bit untouched. The write-side mirror of [`extract`].
pub fn set(current: &[u8], value: u64, range: BitRange) -> Result<Vec<u8>, Error> {
    let [byte] = current else {
        return Err(Error::LengthMismatch {
            decoder: "set_bits",
            expected: "1",
            actual: current.len(),
        });
    };
    if value >= 1u64 << range.count() {
        return Err(Error::ValueTooWide {
            value,
            bits: range.count(),
        });
    }
    let merged = (byte & !range.mask()) | ((value as u8) << range.shift());
    Ok(vec![merged])
}

#[cfg(test)]
mod tests {
    use super::extract;
    use super::set;
    use super::BitRange;
    use super::Error;

    #[test]
    fn test_bit_range_bounds() {
        assert!(BitRange::new(7, 8).is_ok());
        assert!(BitRange::new(0, 1).is_ok());
        for (offset, count) in [(8, 1), (7, 0), (7, 9), (3, 5), (0, 2)] {
            assert_eq!(
                BitRange::new(offset, count).unwrap_err(),
                Error::BitRangeOutOfBounds { offset, count }
            );
        }
    }

    #[test]
    fn test_extract() {
        // The worked example from the SFF decode conventions.
        assert_eq!(extract(&[0b0011_0000], BitRange::new(5, 2).unwrap()).unwrap(), 3);
        assert_eq!(extract(&[0b1000_0000], BitRange::new(7, 1).unwrap()).unwrap(), 1);
        assert_eq!(extract(&[0b1000_0000], BitRange::new(6, 7).unwrap()).unwrap(), 0);
        assert_eq!(extract(&[0xA5], BitRange::new(7, 8).unwrap()).unwrap(), 0xA5);
        assert!(matches!(
            extract(&[1, 2], BitRange::new(7, 1).unwrap()).unwrap_err(),
            Error::LengthMismatch { .. }
        ));
    }

    #[test]
    fn test_set_preserves_other_bits() {
        let range = BitRange::new(6, 1).unwrap();
        // Toggle bit 6 on and off; the other seven bits ride along.
        assert_eq!(set(&[0b1010_0101], 1, range).unwrap(), vec![0b1110_0101]);
        assert_eq!(set(&[0b1110_0101], 0, range).unwrap(), vec![0b1010_0101]);

        let nibble = BitRange::new(3, 4).unwrap();
        assert_eq!(set(&[0xF0], 0x5, nibble).unwrap(), vec![0xF5]);
    }

    #[test]
    fn test_set_rejects_wide_values() {
        let range = BitRange::new(5, 2).unwrap();
        assert_eq!(
            set(&[0], 4, range).unwrap_err(),
            Error::ValueTooWide { value: 4, bits: 2 }
        );
        assert_eq!(set(&[0], 3, range).unwrap(), vec![0b0011_0000]);
    }

    #[test]
    fn test_extract_set_roundtrip() {
        let range = BitRange::new(5, 3).unwrap();
        for value in 0..8u64 {
            let merged = set(&[0b1001_0110], value, range).unwrap();
            assert_eq!(u64::from(extract(&merged, range).unwrap()), value);
            // Bits outside the range are untouched.
            assert_eq!(merged[0] & !0b0011_1000, 0b1000_0110);
        }
    }
}
