// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Field tables: the data-driven mapping from key names to byte locations
//! and codecs.
//!
//! Three maps make up a module type's catalogue. The [`MemoryMap`] says
//! where each named field lives and how to decode it; the [`FunctionMap`]
//! groups fields into bundles read together; the [`WriteMap`] names an
//! encoder for the writable subset. A port starts from its module type's
//! base tables and may grow addon-merged entries, so maps are cheap to clone
//! and mutate per port.

use optomon_codec::BitRange;
use optomon_codec::Decoder;
use optomon_codec::Encoder;
use optomon_southbound::CFP_BASE_ADDRESS;
use optomon_southbound::MAP_SIZE;
use std::collections::HashMap;
use thiserror::Error;

/// An inconsistency in a field table, caught at validation time.
///
/// These are table-authoring bugs, not runtime conditions: the shipped
/// tables are validated when first built, and panic on failure.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Field \"{key}\" exceeds the device address space")]
    OutOfBounds { key: String },

    #[error("Field \"{key}\" has length {len}, unacceptable to decoder {decoder:?}")]
    WrongLength {
        key: String,
        decoder: Decoder,
        len: usize,
    },

    #[error("Field \"{key}\" and decoder {decoder:?} disagree about a bit range")]
    BitRangeMismatch { key: String, decoder: Decoder },

    #[error("Writable field \"{key}\" has no memory map entry")]
    WriteWithoutLocation { key: String },

    #[error("Bundle \"{bundle}\" references unknown field \"{key}\"")]
    BundleKeyUnknown { bundle: String, key: String },
}

/// Where a field's bytes live.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Location {
    /// An I2C-addressed byte range. Offsets below 128 address the
    /// page-independent low memory and ignore `page`.
    Sff {
        address: u8,
        page: u8,
        offset: u8,
        len: u8,
    },
    /// An MDIO word range. `collapsed` marks registers that carry a single
    /// significant byte in the low half of each 16-bit word.
    Cfp {
        address: u16,
        words: u8,
        collapsed: bool,
    },
}

/// Everything needed to read (and decode) one named field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldSpec {
    /// Whether reads may be served from the page cache. Live telemetry is
    /// marked non-cacheable and always hits the hardware.
    pub cacheable: bool,
    pub decoder: Decoder,
    pub location: Location,
    /// Required iff `decoder` is [`Decoder::Bits`] (and consumed by
    /// [`Encoder::SetBits`] on the write path).
    pub bits: Option<BitRange>,
}

impl FieldSpec {
    /// A byte-range field in SFF-style memory.
    pub fn sff(
        cacheable: bool,
        decoder: Decoder,
        address: u8,
        page: u8,
        offset: u8,
        len: u8,
    ) -> Self {
        Self {
            cacheable,
            decoder,
            location: Location::Sff {
                address,
                page,
                offset,
                len,
            },
            bits: None,
        }
    }

    /// A one-byte bit field in SFF-style memory. Bit numbering is
    /// MSB-relative: `bit_offset` is the field's highest-order bit, 7 = MSB.
    pub fn sff_bits(
        cacheable: bool,
        address: u8,
        page: u8,
        offset: u8,
        bit_offset: u8,
        bit_count: u8,
    ) -> Self {
        Self {
            cacheable,
            decoder: Decoder::Bits,
            location: Location::Sff {
                address,
                page,
                offset,
                len: 1,
            },
            // Validated against the byte by table validation.
            bits: BitRange::new(bit_offset, bit_count).ok(),
        }
    }

    /// A word-range field in CFP register space.
    pub fn cfp(decoder: Decoder, address: u16, words: u8, collapsed: bool) -> Self {
        Self {
            // CFP reads are never cached; see the page-cache module.
            cacheable: false,
            decoder,
            location: Location::Cfp {
                address,
                words,
                collapsed,
            },
            bits: None,
        }
    }

    /// The byte length the decoder will be handed.
    pub fn byte_len(&self) -> usize {
        match self.location {
            Location::Sff { len, .. } => usize::from(len),
            Location::Cfp {
                words, collapsed, ..
            } => {
                if collapsed {
                    usize::from(words)
                } else {
                    usize::from(words) * 2
                }
            }
        }
    }
}

/// Field name -> [`FieldSpec`].
#[derive(Clone, Debug, Default)]
pub struct MemoryMap(HashMap<String, FieldSpec>);

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing any existing entry of the same name.
    pub fn add(&mut self, key: &str, spec: FieldSpec) {
        self.0.insert(key.to_string(), spec);
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn merge(&mut self, other: MemoryMap) {
        self.0.extend(other.0);
    }
}

/// Bundle name -> ordered field names.
#[derive(Clone, Debug, Default)]
pub struct FunctionMap(HashMap<String, Vec<String>>);

impl FunctionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, bundle: &str, keys: &[&str]) {
        self.0
            .insert(bundle.to_string(), keys.iter().map(|k| k.to_string()).collect());
    }

    pub fn get(&self, bundle: &str) -> Option<&[String]> {
        self.0.get(bundle).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn merge(&mut self, other: FunctionMap) {
        self.0.extend(other.0);
    }
}

/// Field name -> [`Encoder`], for the writable subset.
#[derive(Clone, Debug, Default)]
pub struct WriteMap(HashMap<String, Encoder>);

impl WriteMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str, encoder: Encoder) {
        self.0.insert(key.to_string(), encoder);
    }

    pub fn get(&self, key: &str) -> Option<&Encoder> {
        self.0.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn merge(&mut self, other: WriteMap) {
        self.0.extend(other.0);
    }
}

/// The three tables for one module type.
#[derive(Clone, Debug, Default)]
pub struct ModuleTables {
    pub memory: MemoryMap,
    pub function: FunctionMap,
    pub write: WriteMap,
}

impl ModuleTables {
    /// Check the internal consistency of the tables against the governing
    /// address-space and codec contracts.
    pub fn validate(&self) -> Result<(), TableError> {
        for (key, spec) in self.memory.iter() {
            match spec.location {
                Location::Sff { offset, len, .. } => {
                    if len == 0 || u16::from(offset) + u16::from(len) > MAP_SIZE {
                        return Err(TableError::OutOfBounds { key: key.into() });
                    }
                }
                Location::Cfp { address, words, .. } => {
                    if words == 0
                        || address < CFP_BASE_ADDRESS
                        || u32::from(address) + u32::from(words) > 0x1_0000
                    {
                        return Err(TableError::OutOfBounds { key: key.into() });
                    }
                }
            }
            if !spec.decoder.accepts_len(spec.byte_len()) {
                return Err(TableError::WrongLength {
                    key: key.into(),
                    decoder: spec.decoder,
                    len: spec.byte_len(),
                });
            }
            if spec.bits.is_some() != matches!(spec.decoder, Decoder::Bits) {
                return Err(TableError::BitRangeMismatch {
                    key: key.into(),
                    decoder: spec.decoder,
                });
            }
        }
        for key in self.write.keys() {
            if !self.memory.contains(key) {
                return Err(TableError::WriteWithoutLocation { key: key.into() });
            }
        }
        for (bundle, keys) in self.function.iter() {
            for key in keys {
                if !self.memory.contains(key) {
                    return Err(TableError::BundleKeyUnknown {
                        bundle: bundle.into(),
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Decoder;
    use super::Encoder;
    use super::FieldSpec;
    use super::FunctionMap;
    use super::MemoryMap;
    use super::ModuleTables;
    use super::TableError;
    use super::WriteMap;

    fn tables_with(key: &str, spec: FieldSpec) -> ModuleTables {
        let mut memory = MemoryMap::new();
        memory.add(key, spec);
        ModuleTables {
            memory,
            function: FunctionMap::new(),
            write: WriteMap::new(),
        }
    }

    #[test]
    fn test_validate_bounds() {
        let good = tables_with("F", FieldSpec::sff(true, Decoder::Uint, 0xA0, 0, 0, 1));
        assert!(good.validate().is_ok());

        let bad = tables_with("F", FieldSpec::sff(true, Decoder::Bytes, 0xA0, 0, 200, 100));
        assert!(matches!(
            bad.validate().unwrap_err(),
            TableError::OutOfBounds { .. }
        ));

        let bad = tables_with("F", FieldSpec::cfp(Decoder::Uint, 0x7000, 1, true));
        assert!(matches!(
            bad.validate().unwrap_err(),
            TableError::OutOfBounds { .. }
        ));
    }

    #[test]
    fn test_validate_decoder_length() {
        // Temperature requires exactly 2 bytes.
        let bad = tables_with(
            "F",
            FieldSpec::sff(true, Decoder::Temperature, 0xA2, 0, 96, 3),
        );
        assert!(matches!(
            bad.validate().unwrap_err(),
            TableError::WrongLength { .. }
        ));

        // A collapsed CFP word range halves the byte length.
        let good = tables_with("F", FieldSpec::cfp(Decoder::Temperature, 0xA02F, 1, false));
        assert!(good.validate().is_ok());
        let bad = tables_with("F", FieldSpec::cfp(Decoder::Temperature, 0xA02F, 1, true));
        assert!(matches!(
            bad.validate().unwrap_err(),
            TableError::WrongLength { .. }
        ));
    }

    #[test]
    fn test_validate_write_and_bundle_membership() {
        let mut tables = tables_with("F", FieldSpec::sff(true, Decoder::Uint, 0xA0, 0, 0, 1));
        tables.write.add("G", Encoder::SetUint);
        assert!(matches!(
            tables.validate().unwrap_err(),
            TableError::WriteWithoutLocation { .. }
        ));

        let mut tables = tables_with("F", FieldSpec::sff(true, Decoder::Uint, 0xA0, 0, 0, 1));
        tables.function.add("BUNDLE", &["F", "MISSING"]);
        assert!(matches!(
            tables.validate().unwrap_err(),
            TableError::BundleKeyUnknown { .. }
        ));
    }

    #[test]
    fn test_last_write_wins_on_merge() {
        let mut base = MemoryMap::new();
        base.add("F", FieldSpec::sff(true, Decoder::Uint, 0xA0, 0, 0, 1));
        let mut extra = MemoryMap::new();
        extra.add("F", FieldSpec::sff(false, Decoder::Uint, 0xA0, 0, 2, 1));
        base.merge(extra);
        assert!(!base.get("F").unwrap().cacheable);
    }
}
