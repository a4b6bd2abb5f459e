// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Two-byte monitor quantities and plain big-endian integers.

use crate::Error;

fn be16(buf: &[u8], decoder: &'static str) -> Result<u16, Error> {
    match buf {
        [hi, lo] => Ok(u16::from_be_bytes([*hi, *lo])),
        _ => Err(Error::LengthMismatch {
            decoder,
            expected: "2",
            actual: buf.len(),
        }),
    }
}

/// Module temperature in degrees C: signed 1/256 degree per LSB.
pub fn temperature(buf: &[u8]) -> Result<f64, Error> {
    let raw = be16(buf, "temperature")? as i16;
    Ok(f64::from(raw) / 256.0)
}

/// Supply voltage in volts: 0.1 mV per LSB.
pub fn voltage(buf: &[u8]) -> Result<f64, Error> {
    let raw = be16(buf, "voltage")?;
    Ok(f64::from(raw) * 0.1 / 1000.0)
}

/// Optical power in milliwatts: 0.1 uW per LSB.
pub fn power(buf: &[u8]) -> Result<f64, Error> {
    let raw = be16(buf, "power")?;
    Ok(f64::from(raw) * 0.1 / 1000.0)
}

/// Laser bias current in milliamps: 2 uA per LSB.
pub fn current(buf: &[u8]) -> Result<f64, Error> {
    let raw = be16(buf, "current")?;
    Ok(f64::from(raw) / 500.0)
}

/// Signed current (e.g. TEC current) in milliamps: 0.1 mA per LSB.
pub fn signed_current(buf: &[u8]) -> Result<f64, Error> {
    let raw = be16(buf, "signed_current")? as i16;
    Ok(f64::from(raw) / 10.0)
}

/// A big-endian unsigned integer of up to 4 bytes.
pub fn uint(buf: &[u8]) -> Result<u64, Error> {
    if buf.is_empty() || buf.len() > 4 {
        return Err(Error::LengthMismatch {
            decoder: "uint",
            expected: "1 to 4",
            actual: buf.len(),
        });
    }
    Ok(buf.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

/// Render `value` big-endian into a buffer of `len` bytes, the write-side
/// mirror of [`uint`].
pub fn set_uint(len: usize, value: u64) -> Result<Vec<u8>, Error> {
    if len == 0 || len > 4 {
        return Err(Error::LengthMismatch {
            decoder: "set_uint",
            expected: "1 to 4",
            actual: len,
        });
    }
    if len < 8 && value >= 1u64 << (8 * len) {
        return Err(Error::ValueTooLarge { value, len });
    }
    Ok((0..len)
        .rev()
        .map(|i| (value >> (8 * i)) as u8)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::current;
    use super::power;
    use super::set_uint;
    use super::signed_current;
    use super::temperature;
    use super::uint;
    use super::voltage;
    use super::Error;

    #[test]
    fn test_temperature() {
        // Largest positive value: 127 + 255/256 degrees.
        assert_eq!(temperature(&[0x7F, 0xFF]).unwrap(), 127.99609375);
        // Sign bit set: two's-complement.
        assert_eq!(temperature(&[0x80, 0x00]).unwrap(), -128.0);
        assert_eq!(temperature(&[0xFF, 0xFF]).unwrap(), -1.0 / 256.0);
        assert_eq!(temperature(&[0x19, 0x00]).unwrap(), 25.0);
        assert!(matches!(
            temperature(&[0]).unwrap_err(),
            Error::LengthMismatch { .. }
        ));
    }

    #[test]
    fn test_voltage() {
        // Raw 5000 * 0.1 mV = 0.5 V.
        assert!((voltage(&[0x13, 0x88]).unwrap() - 0.5).abs() < 1e-12);
        assert!((voltage(&[0x80, 0xE8]).unwrap() - 3.3).abs() < 1e-12);
    }

    #[test]
    fn test_power() {
        // Raw 10000 * 0.1 uW = 1 mW.
        assert!((power(&[0x27, 0x10]).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(power(&[0, 0]).unwrap(), 0.0);
    }

    #[test]
    fn test_current() {
        // Raw 5000 * 2 uA = 10 mA.
        assert!((current(&[0x13, 0x88]).unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_signed_current() {
        assert_eq!(signed_current(&[0x00, 0x64]).unwrap(), 10.0);
        // 0xFF9C = -100 -> -10 mA.
        assert_eq!(signed_current(&[0xFF, 0x9C]).unwrap(), -10.0);
    }

    #[test]
    fn test_uint() {
        assert_eq!(uint(&[0x03]).unwrap(), 3);
        assert_eq!(uint(&[0x01, 0x02]).unwrap(), 0x0102);
        assert_eq!(uint(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap(), 0xDEADBEEF);
        assert!(matches!(
            uint(&[0; 5]).unwrap_err(),
            Error::LengthMismatch { .. }
        ));
    }

    #[test]
    fn test_set_uint_roundtrip() {
        for value in [0u64, 1, 0xFF, 0x1234, 0xDEADBEEF] {
            let len = if value > 0xFFFF { 4 } else { 2 };
            let bytes = set_uint(len, value).unwrap();
            assert_eq!(uint(&bytes).unwrap(), value);
        }
        assert_eq!(
            set_uint(1, 256).unwrap_err(),
            Error::ValueTooLarge { value: 256, len: 1 }
        );
    }
}
