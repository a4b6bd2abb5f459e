// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Link length, wavelength and cable fields.
//!
//! Several of these are dual-mode: the same bytes mean different things for
//! optical and copper modules, discriminated by a technology-indicator byte
//! that the field's buffer must also span. For SFP (SFF-8472) the indicator
//! is bits 3:2 of byte 8; for QSFP (SFF-8636) it is the transmitter
//! technology nibble, bits 7:4 of byte 147.

use crate::Error;

fn expect_len(buf: &[u8], len: usize, decoder: &'static str, expected: &'static str)
    -> Result<(), Error>
{
    if buf.len() == len {
        Ok(())
    } else {
        Err(Error::LengthMismatch {
            decoder,
            expected,
            actual: buf.len(),
        })
    }
}

// SFF-8472 byte 8 bits 3:2: zero means optical, anything else is a passive
// or active cable.
fn sfp_is_optical(technology: u8) -> bool {
    (technology >> 2) & 0b11 == 0
}

// SFF-8636 byte 147 bits 7:4: values 0xA and up are copper technologies,
// zero is 850 nm VCSEL.
fn qsfp_transmitter_technology(byte: u8) -> u8 {
    byte >> 4
}

/// A single-byte length field with a fixed unit, in meters.
pub fn length(buf: &[u8], unit: u64, decoder: &'static str) -> Result<u64, Error> {
    expect_len(buf, 1, decoder, "1")?;
    Ok(u64::from(buf[0]) * unit)
}

/// SFP dual-mode reach in meters: OM4 fiber (units of 10 m) for optical
/// modules, copper cable length (units of 1 m) otherwise. The buffer spans
/// bytes 8 through 18; byte 8 carries the technology bits and byte 18 the
/// length itself.
pub fn length_om_cu(buf: &[u8]) -> Result<u64, Error> {
    expect_len(buf, 11, "length_om_cu", "11")?;
    if sfp_is_optical(buf[0]) {
        Ok(u64::from(buf[10]) * 10)
    } else {
        Ok(u64::from(buf[10]))
    }
}

/// QSFP dual-mode reach in meters: OM4 fiber (units of 2 m) for 850 nm
/// VCSEL transmitters, copper cable length (units of 1 m) otherwise. The
/// buffer spans bytes 146 and 147.
pub fn length_om_cu_qsfp(buf: &[u8]) -> Result<u64, Error> {
    expect_len(buf, 2, "length_om_cu_qsfp", "2")?;
    if qsfp_transmitter_technology(buf[1]) == 0 {
        Ok(u64::from(buf[0]) * 2)
    } else {
        Ok(u64::from(buf[0]))
    }
}

/// SFP laser wavelength in nanometers. The buffer spans bytes 8 through 61;
/// the wavelength in bytes 60..61 is only meaningful for optical modules,
/// and decodes as zero otherwise.
pub fn wavelength_sfp(buf: &[u8]) -> Result<u64, Error> {
    expect_len(buf, 54, "wavelength_sfp", "54")?;
    if sfp_is_optical(buf[0]) {
        Ok(u64::from(u16::from_be_bytes([buf[52], buf[53]])))
    } else {
        Ok(0)
    }
}

/// QSFP laser wavelength in nanometers, encoded in units of 1/20 nm in
/// bytes 186..187. The buffer spans bytes 147 through 187; copper modules
/// decode as zero.
pub fn wavelength_qsfp(buf: &[u8]) -> Result<f64, Error> {
    expect_len(buf, 41, "wavelength_qsfp", "41")?;
    if qsfp_transmitter_technology(buf[0]) >= 0xA {
        return Ok(0.0);
    }
    let raw = u16::from_be_bytes([buf[39], buf[40]]);
    Ok(f64::from(raw) * 0.05)
}

/// Wavelength tolerance in nanometers: two bytes in units of 1/200 nm.
pub fn wavelength_tolerance(buf: &[u8]) -> Result<f64, Error> {
    expect_len(buf, 2, "wavelength_tolerance", "2")?;
    let raw = u16::from_be_bytes([buf[0], buf[1]]);
    Ok(f64::from(raw) * 0.005)
}

/// SFP passive-cable compliance bytes 60..61, zeroed for optical modules
/// where the aliased bytes carry the wavelength instead.
pub fn cable_spec(buf: &[u8]) -> Result<Vec<u8>, Error> {
    expect_len(buf, 54, "cable_spec", "54")?;
    if sfp_is_optical(buf[0]) {
        Ok(vec![0, 0])
    } else {
        Ok(buf[52..54].to_vec())
    }
}

/// QSFP copper cable attenuation in dB, from the byte at the end of the
/// buffer; optical modules decode as zero. The two attenuation fields
/// (2.5 GHz at byte 186, 5.0 GHz at byte 187) differ only in buffer length.
pub fn copper_attenuation(buf: &[u8], len: usize, decoder: &'static str) -> Result<u64, Error> {
    let expected = if len == 40 { "40" } else { "41" };
    expect_len(buf, len, decoder, expected)?;
    if qsfp_transmitter_technology(buf[0]) >= 0xA {
        Ok(u64::from(buf[len - 1]))
    } else {
        Ok(0)
    }
}
