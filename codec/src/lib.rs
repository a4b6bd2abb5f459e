// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Pure transformations between raw EEPROM bytes and physical values.
//!
//! Every decoder here is a stateless function from a fixed-length byte buffer
//! to a typed [`Value`], reproducing the encodings mandated by SFF-8472,
//! SFF-8636 and the CFP MSA: two's-complement temperatures, escape-coded bit
//! rates, dual-mode optical/copper reach fields, and so on. Encoders are the
//! mirror image for the handful of writable fields, merging a new value into
//! the field's current bytes.
//!
//! Decoders and encoders are named by the [`Decoder`] and [`Encoder`] enums
//! rather than by strings, so a field table referencing a codec that does not
//! exist cannot compile.

use std::fmt;
use thiserror::Error;

pub mod bits;
pub mod rates;
pub mod reach;
pub mod scalars;
pub mod text;

pub use bits::BitRange;

/// An error produced while decoding or encoding a field.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("Decoder {decoder} expects {expected} bytes, got {actual}")]
    LengthMismatch {
        decoder: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("Bit range out of bounds (offset {offset}, count {count})")]
    BitRangeOutOfBounds { offset: u8, count: u8 },

    #[error("A bit range is required to decode a bit field")]
    MissingBitRange,

    #[error("Value {value} does not fit in {bits} bits")]
    ValueTooWide { value: u64, bits: u8 },

    #[error("Value {value} does not fit in {len} bytes")]
    ValueTooLarge { value: u64, len: usize },

    #[error("String of {len} bytes does not fit in a field of {capacity}")]
    TextTooLong { len: usize, capacity: usize },

    #[error("Encoder {encoder} requires a {expected} value, got {actual}")]
    WrongValueKind {
        encoder: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

/// A decoded field value.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    any(feature = "api-traits", test),
    derive(schemars::JsonSchema, serde::Deserialize, serde::Serialize)
)]
#[cfg_attr(any(feature = "api-traits", test), serde(rename_all = "snake_case"))]
pub enum Value {
    /// A scaled physical quantity (volts, milliamps, degrees, ...).
    Float(f64),
    /// An unscaled integer: identifiers, lengths in meters, bit fields.
    Uint(u64),
    /// Raw bytes the standard defines no further structure for.
    Bytes(Vec<u8>),
    /// Fixed-width text, space padding included.
    Text(String),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Float(_) => "float",
            Value::Uint(_) => "uint",
            Value::Bytes(_) => "bytes",
            Value::Text(_) => "text",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Uint(x) => Some(*x as f64),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint(x) => Some(*x),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Float(x) => write!(f, "{x}"),
            Value::Uint(x) => write!(f, "{x}"),
            Value::Bytes(x) => {
                for byte in x {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            Value::Text(x) => write!(f, "{}", x.trim_end()),
        }
    }
}

/// The registry of field decoders.
///
/// A field table names one of these per field; [`Decoder::decode`] dispatches
/// to the corresponding function. The buffer handed in must be exactly the
/// length the field table declares; [`Decoder::accepts_len`] is the length
/// contract, checked by table validation.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(test, derive(strum::EnumIter))]
pub enum Decoder {
    /// 2 bytes, 1/256 degree C per LSB, two's-complement.
    Temperature,
    /// 2 bytes, 0.1 mV per LSB, in volts.
    Voltage,
    /// 2 bytes, 0.1 uW per LSB, in milliwatts.
    Power,
    /// 2 bytes, 2 uA per LSB, in milliamps.
    Current,
    /// 2 bytes, signed, 0.1 mA per LSB, in milliamps.
    SignedCurrent,
    /// Up to 4 bytes, big-endian unsigned.
    Uint,
    /// As `Uint`, scaled by 10 (propagation delay).
    UintTimes10,
    /// Raw bytes, verbatim.
    Bytes,
    /// Fixed-width text, no trimming.
    Text,
    /// A sub-byte bit field; the field spec supplies the bit range.
    Bits,
    /// Escape-coded nominal bit rate, in Mb/s.
    BitRate,
    /// Upper bit-rate limit from the nominal rate and tolerance bytes.
    BitRateMax,
    /// Lower bit-rate limit from the nominal rate and tolerance bytes.
    BitRateMin,
    /// 1 byte, kilometers.
    LengthKm,
    /// 1 byte, units of 100 m.
    Length100m,
    /// 1 byte, units of 10 m.
    Length10m,
    /// 1 byte, units of 2 m.
    Length2m,
    /// SFP dual-mode OM4/copper reach (SFF-8472 bytes 8..18).
    LengthOmCu,
    /// QSFP dual-mode OM4/copper reach (SFF-8636 bytes 146..147).
    LengthOmCuQsfp,
    /// SFP wavelength, gated by the technology bits (bytes 8..61).
    WavelengthSfp,
    /// QSFP wavelength in 1/20 nm, gated by transmitter technology.
    WavelengthQsfp,
    /// 2 bytes, 1/200 nm per LSB.
    WavelengthTolerance,
    /// SFP passive-cable compliance bytes, zeroed for optical modules.
    CableSpec,
    /// QSFP copper attenuation at 2.5 GHz, zero for optical modules.
    CopperAttenuation2g5,
    /// QSFP copper attenuation at 5.0 GHz, zero for optical modules.
    CopperAttenuation5g0,
}

impl Decoder {
    /// Decode `buf` into a value.
    ///
    /// `bit_range` must be `Some` exactly when the decoder is [`Bits`]; it is
    /// part of the field's location, not of the codec.
    ///
    /// [`Bits`]: Decoder::Bits
    pub fn decode(&self, buf: &[u8], bit_range: Option<BitRange>) -> Result<Value, Error> {
        match self {
            Decoder::Temperature => scalars::temperature(buf).map(Value::Float),
            Decoder::Voltage => scalars::voltage(buf).map(Value::Float),
            Decoder::Power => scalars::power(buf).map(Value::Float),
            Decoder::Current => scalars::current(buf).map(Value::Float),
            Decoder::SignedCurrent => scalars::signed_current(buf).map(Value::Float),
            Decoder::Uint => scalars::uint(buf).map(Value::Uint),
            Decoder::UintTimes10 => scalars::uint(buf).map(|x| Value::Uint(x * 10)),
            Decoder::Bytes => Ok(Value::Bytes(buf.to_vec())),
            Decoder::Text => Ok(Value::Text(text::text(buf))),
            Decoder::Bits => {
                let range = bit_range.ok_or(Error::MissingBitRange)?;
                bits::extract(buf, range).map(|x| Value::Uint(x.into()))
            }
            Decoder::BitRate => rates::bit_rate(buf).map(Value::Uint),
            Decoder::BitRateMax => rates::bit_rate_max(buf).map(Value::Float),
            Decoder::BitRateMin => rates::bit_rate_min(buf).map(Value::Float),
            Decoder::LengthKm => reach::length(buf, 1000, "length_km").map(Value::Uint),
            Decoder::Length100m => reach::length(buf, 100, "length_100m").map(Value::Uint),
            Decoder::Length10m => reach::length(buf, 10, "length_10m").map(Value::Uint),
            Decoder::Length2m => reach::length(buf, 2, "length_2m").map(Value::Uint),
            Decoder::LengthOmCu => reach::length_om_cu(buf).map(Value::Uint),
            Decoder::LengthOmCuQsfp => reach::length_om_cu_qsfp(buf).map(Value::Uint),
            Decoder::WavelengthSfp => reach::wavelength_sfp(buf).map(Value::Uint),
            Decoder::WavelengthQsfp => reach::wavelength_qsfp(buf).map(Value::Float),
            Decoder::WavelengthTolerance => reach::wavelength_tolerance(buf).map(Value::Float),
            Decoder::CableSpec => reach::cable_spec(buf).map(Value::Bytes),
            Decoder::CopperAttenuation2g5 => {
                reach::copper_attenuation(buf, 40, "copper_attenuation_2g5").map(Value::Uint)
            }
            Decoder::CopperAttenuation5g0 => {
                reach::copper_attenuation(buf, 41, "copper_attenuation_5g0").map(Value::Uint)
            }
        }
    }

    /// The length contract for this decoder: whether a field of `len` bytes
    /// may name it. Field tables are validated against this.
    pub fn accepts_len(&self, len: usize) -> bool {
        match self {
            Decoder::Temperature
            | Decoder::Voltage
            | Decoder::Power
            | Decoder::Current
            | Decoder::SignedCurrent
            | Decoder::WavelengthTolerance => len == 2,
            Decoder::Uint | Decoder::UintTimes10 => (1..=4).contains(&len),
            Decoder::Bytes | Decoder::Text => len >= 1,
            Decoder::Bits => len == 1,
            // The escape byte's companion lives at a spec-mandated offset
            // within the extended read; the buffer length disambiguates
            // SFP (55) from QSFP (83). A 1-byte field can still decode
            // non-escaped rates.
            Decoder::BitRate => matches!(len, 1 | 55 | 83),
            Decoder::BitRateMax | Decoder::BitRateMin => len == 56,
            Decoder::LengthKm | Decoder::Length100m | Decoder::Length10m | Decoder::Length2m => {
                len == 1
            }
            Decoder::LengthOmCu => len == 11,
            Decoder::LengthOmCuQsfp => len == 2,
            Decoder::WavelengthSfp | Decoder::CableSpec => len == 54,
            Decoder::WavelengthQsfp => len == 41,
            Decoder::CopperAttenuation2g5 => len == 40,
            Decoder::CopperAttenuation5g0 => len == 41,
        }
    }
}

/// The registry of field encoders, for writable fields.
///
/// Encoders never write blind: they merge the new value into the field's
/// current bytes, so that a one-bit write leaves the other seven bits of the
/// byte exactly as the hardware had them.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Encoder {
    /// Render an integer big-endian into the field's current length.
    SetUint,
    /// Merge the low-order bits of an integer into one byte.
    SetBits,
    /// Render fixed-width text, space padded to the field's length.
    SetText,
}

impl Encoder {
    pub fn encode(
        &self,
        current: &[u8],
        value: &Value,
        bit_range: Option<BitRange>,
    ) -> Result<Vec<u8>, Error> {
        match self {
            Encoder::SetUint => {
                let new = value.as_u64().ok_or(Error::WrongValueKind {
                    encoder: "set_uint",
                    expected: "uint",
                    actual: value.kind(),
                })?;
                scalars::set_uint(current.len(), new)
            }
            Encoder::SetBits => {
                let new = value.as_u64().ok_or(Error::WrongValueKind {
                    encoder: "set_bits",
                    expected: "uint",
                    actual: value.kind(),
                })?;
                let range = bit_range.ok_or(Error::MissingBitRange)?;
                bits::set(current, new, range)
            }
            Encoder::SetText => match value {
                Value::Text(s) => text::set_text(current.len(), s),
                _ => Err(Error::WrongValueKind {
                    encoder: "set_text",
                    expected: "text",
                    actual: value.kind(),
                }),
            },
        }
    }
}
