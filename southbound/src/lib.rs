// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! The southbound contract: raw access to transceiver module memory.
//!
//! Everything above this crate deals in named fields and physical units. This
//! crate defines the boundary below which bytes are bytes: a [`Backend`] is
//! whatever actually moves them (I2C, MDIO, sysfs, a simulator), and the
//! region types validate an access before it ever reaches hardware.

use static_assertions::const_assert_eq;
use thiserror::Error;

pub mod mock;

/// The size of one page of an SFF-style memory map, in bytes.
pub const PAGE_SIZE: u8 = 128;

/// The size of the full memory map visible at one I2C address.
pub const MAP_SIZE: u16 = 256;

/// The first valid word address of a CFP module's MDIO register space.
///
/// Addresses below this are reserved for IEEE 802.3 use, and are not part of
/// the CFP MSA management space.
pub const CFP_BASE_ADDRESS: u16 = 0x8000;

// The map is exactly a lower page plus one mapped-in upper page.
const_assert_eq!(MAP_SIZE, 2 * PAGE_SIZE as u16);

/// An error at the southbound boundary.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("Invalid memory access (offset {offset}, len {len})")]
    InvalidMemoryAccess { offset: u8, len: u8 },

    #[error("Invalid word access (address {address:#06x}, words {words})")]
    InvalidWordAccess { address: u16, words: u8 },

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("Short write: expected {expected} bytes, wrote {actual}")]
    ShortWrite { expected: usize, actual: usize },

    #[error("No port with id {0}")]
    NoSuchPort(u32),

    #[error("Backend failure: {0}")]
    Backend(String),
}

/// The addressing discipline of a module's management interface.
///
/// Every module type is accessed in exactly one of two ways: SFF-style
/// devices (SFP, QSFP and friends) use an I2C address, a page-select and a
/// byte offset; CFP-style devices use a flat 16-bit MDIO word address space.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    any(feature = "api-traits", test),
    derive(schemars::JsonSchema, serde::Deserialize, serde::Serialize)
)]
#[cfg_attr(any(feature = "api-traits", test), serde(rename_all = "snake_case"))]
pub enum DeviceClass {
    /// I2C address + page + byte offset, 128-byte pages.
    Sff,
    /// MDIO, linear 16-bit word address space, no pages.
    Cfp,
}

/// A handle to one physical port, as enumerated by the backend.
///
/// The `id` is opaque to everything north of the backend; it only needs to be
/// stable for the lifetime of the enumeration that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct PortHandle {
    pub id: u32,
    pub name: String,
    pub class: DeviceClass,
}

/// A validated byte-range access into an SFF-style memory map.
///
/// The last accessed byte must fall within the 256-byte address space.
/// Offsets below 128 address the page-independent low memory; the `page`
/// value is irrelevant there, but is carried so that a single region can
/// describe a read straddling the page boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SffRegion {
    address: u8,
    page: u8,
    offset: u8,
    len: u8,
}

impl SffRegion {
    pub fn new(address: u8, page: u8, offset: u8, len: u8) -> Result<Self, Error> {
        if len == 0 || u16::from(offset) + u16::from(len) > MAP_SIZE {
            return Err(Error::InvalidMemoryAccess { offset, len });
        }
        Ok(Self {
            address,
            page,
            offset,
            len,
        })
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn page(&self) -> u8 {
        self.page
    }

    pub fn offset(&self) -> u8 {
        self.offset
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u8 {
        self.len
    }
}

/// A validated word-range access into a CFP module's register space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CfpRegion {
    address: u16,
    words: u8,
}

impl CfpRegion {
    pub fn new(address: u16, words: u8) -> Result<Self, Error> {
        if words == 0
            || address < CFP_BASE_ADDRESS
            || u32::from(address) + u32::from(words) > 0x1_0000
        {
            return Err(Error::InvalidWordAccess { address, words });
        }
        Ok(Self { address, words })
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn words(&self) -> u8 {
        self.words
    }
}

/// The raw transport implemented by the environment.
///
/// Implementations perform the actual hardware transactions. All calls are
/// synchronous and blocking; cancellation and timeouts are the backend's
/// business. A failed call must have no partial effect observable through a
/// subsequent read.
pub trait Backend {
    /// Enumerate the ports this backend can reach.
    fn ports(&self) -> Result<Vec<PortHandle>, Error>;

    /// Count-only probe, for preallocation.
    fn port_count(&self) -> Result<usize, Error> {
        Ok(self.ports()?.len())
    }

    /// Read exactly `region.len()` bytes from an SFF-style device.
    fn read_sff(&self, handle: &PortHandle, region: &SffRegion) -> Result<Vec<u8>, Error>;

    /// Write bytes to an SFF-style device, returning the count written.
    fn write_sff(&self, handle: &PortHandle, region: &SffRegion, data: &[u8])
        -> Result<usize, Error>;

    /// Read exactly `region.words()` 16-bit registers from a CFP device.
    fn read_cfp(&self, handle: &PortHandle, region: &CfpRegion) -> Result<Vec<u16>, Error>;

    /// Write 16-bit registers to a CFP device, returning the count written.
    fn write_cfp(
        &self,
        handle: &PortHandle,
        region: &CfpRegion,
        data: &[u16],
    ) -> Result<usize, Error>;
}

#[cfg(test)]
mod tests {
    use super::CfpRegion;
    use super::Error;
    use super::SffRegion;

    #[test]
    fn test_sff_region() {
        let region = SffRegion::new(0xA0, 0, 0, 128).unwrap();
        assert_eq!(region.address(), 0xA0);
        assert_eq!(region.offset(), 0);
        assert_eq!(region.len(), 128);

        // Reads may span the full 256-byte space, but not beyond it.
        assert!(SffRegion::new(0xA0, 0, 128, 128).is_ok());
        assert!(SffRegion::new(0xA0, 0, 8, 54).is_ok());
        assert!(matches!(
            SffRegion::new(0xA0, 0, 200, 100).unwrap_err(),
            Error::InvalidMemoryAccess { .. }
        ));
        assert!(matches!(
            SffRegion::new(0xA0, 0, 0, 0).unwrap_err(),
            Error::InvalidMemoryAccess { .. }
        ));
    }

    #[test]
    fn test_cfp_region() {
        let region = CfpRegion::new(0x8021, 16).unwrap();
        assert_eq!(region.address(), 0x8021);
        assert_eq!(region.words(), 16);

        // The space below 0x8000 is reserved for IEEE 802.3 use.
        assert!(matches!(
            CfpRegion::new(0x7FFF, 1).unwrap_err(),
            Error::InvalidWordAccess { .. }
        ));
        assert!(CfpRegion::new(0xFFFF, 1).is_ok());
        assert!(matches!(
            CfpRegion::new(0xFFFF, 2).unwrap_err(),
            Error::InvalidWordAccess { .. }
        ));
        assert!(matches!(
            CfpRegion::new(0x8000, 0).unwrap_err(),
            Error::InvalidWordAccess { .. }
        ));
    }

    #[test]
    fn test_device_class_serialization() {
        let ser = serde_json::to_string(&super::DeviceClass::Sff).unwrap();
        assert_eq!(ser, "\"sff\"");
    }
}
