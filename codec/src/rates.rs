// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! The escape-coded nominal bit rate and its tolerance bounds.
//!
//! SFF-8472 and SFF-8636 both encode the nominal rate as one byte in units
//! of 100 Mb/s, with 0xFF escaping to an extended byte in units of 250 Mb/s.
//! The extended byte lives at a different absolute offset in the two specs
//! (SFP byte 66 against a base of 12; QSFP byte 222 against a base of 140),
//! so the field table hands us a buffer spanning base through extension and
//! the buffer length tells us which layout we were given.

use crate::Error;

// Offset of the extended rate byte within the base-through-extension buffer.
const SFP_EXTENDED: usize = 54;
const QSFP_EXTENDED: usize = 82;

/// Nominal bit rate in Mb/s.
pub fn bit_rate(buf: &[u8]) -> Result<u64, Error> {
    let nominal = *buf.first().ok_or(Error::LengthMismatch {
        decoder: "bit_rate",
        expected: "1, 55 or 83",
        actual: buf.len(),
    })?;
    if nominal != 0xFF {
        return Ok(u64::from(nominal) * 100);
    }
    let extended = match buf.len() {
        55 => buf[SFP_EXTENDED],
        83 => buf[QSFP_EXTENDED],
        actual => {
            return Err(Error::LengthMismatch {
                decoder: "bit_rate",
                expected: "55 or 83",
                actual,
            })
        }
    };
    Ok(u64::from(extended) * 250)
}

fn rate_bounds(buf: &[u8], decoder: &'static str) -> Result<(f64, f64), Error> {
    if buf.len() < 56 {
        return Err(Error::LengthMismatch {
            decoder,
            expected: "56",
            actual: buf.len(),
        });
    }
    let nominal = buf[0];
    if nominal == 0xFF {
        // Escaped: byte 66 is the rate in 250 MBd units, byte 67 the range
        // in units of +/- 1% of that rate.
        let rate = f64::from(buf[54]);
        let tolerance = f64::from(buf[55]);
        Ok((
            rate * (250.0 + 2.5 * tolerance),
            rate * (250.0 - 2.5 * tolerance),
        ))
    } else {
        // Unescaped: bytes 66 and 67 are direct percentages above and below
        // the nominal 100 Mb/s-unit rate.
        let rate = f64::from(nominal);
        Ok((
            rate * (100.0 + f64::from(buf[54])),
            rate * (100.0 - f64::from(buf[55])),
        ))
    }
}

/// Upper bit-rate limit in Mb/s.
pub fn bit_rate_max(buf: &[u8]) -> Result<f64, Error> {
    rate_bounds(buf, "bit_rate_max").map(|(max, _)| max)
}

/// Lower bit-rate limit in Mb/s.
pub fn bit_rate_min(buf: &[u8]) -> Result<f64, Error> {
    rate_bounds(buf, "bit_rate_min").map(|(_, min)| min)
}

#[cfg(test)]
mod tests {
    use super::bit_rate;
    use super::bit_rate_max;
    use super::bit_rate_min;
    use super::Error;

    #[test]
    fn test_bit_rate_unescaped() {
        // 50 * 100 Mb/s, regardless of buffer size.
        assert_eq!(bit_rate(&[50]).unwrap(), 5000);
        let mut buf = vec![0u8; 55];
        buf[0] = 103;
        assert_eq!(bit_rate(&buf).unwrap(), 10300);
    }

    #[test]
    fn test_bit_rate_escaped_sfp() {
        let mut buf = vec![0u8; 55];
        buf[0] = 0xFF;
        buf[54] = 100;
        assert_eq!(bit_rate(&buf).unwrap(), 25000);
    }

    #[test]
    fn test_bit_rate_escaped_qsfp() {
        let mut buf = vec![0u8; 83];
        buf[0] = 0xFF;
        buf[82] = 200;
        assert_eq!(bit_rate(&buf).unwrap(), 50000);
    }

    #[test]
    fn test_bit_rate_escape_needs_extended_buffer() {
        // A 1-byte read cannot resolve the escape.
        assert!(matches!(
            bit_rate(&[0xFF]).unwrap_err(),
            Error::LengthMismatch { .. }
        ));
        assert!(matches!(bit_rate(&[]).unwrap_err(), Error::LengthMismatch { .. }));
    }

    #[test]
    fn test_rate_bounds_unescaped() {
        let mut buf = vec![0u8; 56];
        buf[0] = 103; // 10.3 Gb/s nominal
        buf[54] = 5; // +5%
        buf[55] = 10; // -10%
        assert_eq!(bit_rate_max(&buf).unwrap(), 103.0 * 105.0);
        assert_eq!(bit_rate_min(&buf).unwrap(), 103.0 * 90.0);
    }

    #[test]
    fn test_rate_bounds_escaped() {
        let mut buf = vec![0u8; 56];
        buf[0] = 0xFF;
        buf[54] = 100; // 25 Gb/s in 250 MBd units
        buf[55] = 2; // +/- 2%
        assert_eq!(bit_rate_max(&buf).unwrap(), 100.0 * 255.0);
        assert_eq!(bit_rate_min(&buf).unwrap(), 100.0 * 245.0);
    }

    #[test]
    fn test_rate_bounds_short_buffer() {
        assert!(matches!(
            bit_rate_max(&[0; 55]).unwrap_err(),
            Error::LengthMismatch { .. }
        ));
    }
}
