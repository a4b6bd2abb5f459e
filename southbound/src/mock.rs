// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! An in-memory [`Backend`] for tests and demos.
//!
//! Each mock port is a blank memory image that tests populate with
//! [`MockBackend::set_sff`] / [`MockBackend::set_cfp_word`]. The mock counts
//! raw transactions, which is how the page-cache tests assert that redundant
//! hardware reads actually got elided.

use crate::Backend;
use crate::CfpRegion;
use crate::DeviceClass;
use crate::Error;
use crate::PortHandle;
use crate::SffRegion;
use crate::PAGE_SIZE;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;

struct SffSpace {
    low: [u8; PAGE_SIZE as usize],
    pages: HashMap<u8, [u8; PAGE_SIZE as usize]>,
}

// Not derived: std provides `Default` only for arrays of up to 32
// elements, and `low` is a full page.
impl Default for SffSpace {
    fn default() -> Self {
        Self {
            low: [0; PAGE_SIZE as usize],
            pages: HashMap::new(),
        }
    }
}

impl SffSpace {
    fn byte_mut(&mut self, page: u8, offset: u8) -> &mut u8 {
        if offset < PAGE_SIZE {
            &mut self.low[usize::from(offset)]
        } else {
            let block = self.pages.entry(page).or_insert([0; PAGE_SIZE as usize]);
            &mut block[usize::from(offset - PAGE_SIZE)]
        }
    }

    fn byte(&self, page: u8, offset: u8) -> u8 {
        if offset < PAGE_SIZE {
            self.low[usize::from(offset)]
        } else {
            self.pages
                .get(&page)
                .map(|block| block[usize::from(offset - PAGE_SIZE)])
                .unwrap_or(0)
        }
    }
}

#[derive(Default)]
struct Inner {
    ports: Vec<PortHandle>,
    sff: HashMap<(u32, u8), SffSpace>,
    cfp: HashMap<u32, HashMap<u16, u16>>,
    reads: u64,
    writes: u64,
    // I2C addresses whose reads fail, per port.
    broken: HashSet<(u32, u8)>,
}

impl Inner {
    fn check_port(&self, handle: &PortHandle) -> Result<(), Error> {
        if self.ports.iter().any(|p| p.id == handle.id) {
            Ok(())
        } else {
            Err(Error::NoSuchPort(handle.id))
        }
    }
}

/// A deterministic, in-memory southbound backend.
#[derive(Default)]
pub struct MockBackend {
    inner: RefCell<Inner>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an SFF-class (I2C) port, returning its handle.
    pub fn add_sff_port(&self, name: &str) -> PortHandle {
        self.add_port(name, DeviceClass::Sff)
    }

    /// Add a CFP-class (MDIO) port, returning its handle.
    pub fn add_cfp_port(&self, name: &str) -> PortHandle {
        self.add_port(name, DeviceClass::Cfp)
    }

    fn add_port(&self, name: &str, class: DeviceClass) -> PortHandle {
        let mut inner = self.inner.borrow_mut();
        let handle = PortHandle {
            id: inner.ports.len() as u32,
            name: name.to_string(),
            class,
        };
        inner.ports.push(handle.clone());
        handle
    }

    /// Store bytes into a port's SFF memory image, without counting as a
    /// transaction. Offsets below 128 land in low memory regardless of
    /// `page`, matching the device architecture.
    pub fn set_sff(&self, port: u32, address: u8, page: u8, offset: u8, data: &[u8]) {
        let mut inner = self.inner.borrow_mut();
        let space = inner.sff.entry((port, address)).or_default();
        for (i, byte) in data.iter().enumerate() {
            *space.byte_mut(page, offset + i as u8) = *byte;
        }
    }

    /// Store one 16-bit register into a port's CFP image.
    pub fn set_cfp_word(&self, port: u32, address: u16, value: u16) {
        self.inner
            .borrow_mut()
            .cfp
            .entry(port)
            .or_default()
            .insert(address, value);
    }

    /// Store a run of collapsed (one significant byte per word) registers.
    pub fn set_cfp_collapsed(&self, port: u32, address: u16, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.set_cfp_word(port, address + i as u16, u16::from(*byte));
        }
    }

    /// Make every read of the given (port, I2C address) pair fail.
    pub fn break_address(&self, port: u32, address: u8) {
        self.inner.borrow_mut().broken.insert((port, address));
    }

    /// The number of raw read transactions issued so far.
    pub fn read_count(&self) -> u64 {
        self.inner.borrow().reads
    }

    /// The number of raw write transactions issued so far.
    pub fn write_count(&self) -> u64 {
        self.inner.borrow().writes
    }

    pub fn reset_counts(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.reads = 0;
        inner.writes = 0;
    }
}

impl Backend for MockBackend {
    fn ports(&self) -> Result<Vec<PortHandle>, Error> {
        Ok(self.inner.borrow().ports.clone())
    }

    fn read_sff(&self, handle: &PortHandle, region: &SffRegion) -> Result<Vec<u8>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.check_port(handle)?;
        if inner.broken.contains(&(handle.id, region.address())) {
            return Err(Error::Backend(format!(
                "injected failure at address {:#04x}",
                region.address()
            )));
        }
        inner.reads += 1;
        let space = inner
            .sff
            .entry((handle.id, region.address()))
            .or_default();
        let data = (0..region.len())
            .map(|i| space.byte(region.page(), region.offset() + i))
            .collect();
        Ok(data)
    }

    fn write_sff(
        &self,
        handle: &PortHandle,
        region: &SffRegion,
        data: &[u8],
    ) -> Result<usize, Error> {
        if data.len() != usize::from(region.len()) {
            return Err(Error::ShortWrite {
                expected: usize::from(region.len()),
                actual: data.len(),
            });
        }
        let mut inner = self.inner.borrow_mut();
        inner.check_port(handle)?;
        inner.writes += 1;
        let space = inner
            .sff
            .entry((handle.id, region.address()))
            .or_default();
        for (i, byte) in data.iter().enumerate() {
            *space.byte_mut(region.page(), region.offset() + i as u8) = *byte;
        }
        Ok(data.len())
    }

    fn read_cfp(&self, handle: &PortHandle, region: &CfpRegion) -> Result<Vec<u16>, Error> {
        let mut inner = self.inner.borrow_mut();
        inner.check_port(handle)?;
        inner.reads += 1;
        let registers = inner.cfp.entry(handle.id).or_default();
        let data = (0..u16::from(region.words()))
            .map(|i| registers.get(&(region.address() + i)).copied().unwrap_or(0))
            .collect();
        Ok(data)
    }

    fn write_cfp(
        &self,
        handle: &PortHandle,
        region: &CfpRegion,
        data: &[u16],
    ) -> Result<usize, Error> {
        if data.len() != usize::from(region.words()) {
            return Err(Error::ShortWrite {
                expected: usize::from(region.words()),
                actual: data.len(),
            });
        }
        let mut inner = self.inner.borrow_mut();
        inner.check_port(handle)?;
        inner.writes += 1;
        let registers = inner.cfp.entry(handle.id).or_default();
        for (i, word) in data.iter().enumerate() {
            registers.insert(region.address() + i as u16, *word);
        }
        Ok(data.len())
    }
}

#[cfg(test)]
mod tests {
    use super::Backend;
    use super::CfpRegion;
    use super::Error;
    use super::MockBackend;
    use super::SffRegion;

    #[test]
    fn test_sff_roundtrip() {
        let mock = MockBackend::new();
        let handle = mock.add_sff_port("port0");
        mock.set_sff(handle.id, 0xA0, 0, 20, b"ACME OPTICS     ");

        let region = SffRegion::new(0xA0, 0, 20, 16).unwrap();
        let data = mock.read_sff(&handle, &region).unwrap();
        assert_eq!(&data, b"ACME OPTICS     ");
        assert_eq!(mock.read_count(), 1);

        // Unwritten memory reads as zeros.
        let region = SffRegion::new(0xA2, 3, 128, 4).unwrap();
        assert_eq!(mock.read_sff(&handle, &region).unwrap(), vec![0; 4]);
    }

    #[test]
    fn test_low_memory_ignores_page() {
        let mock = MockBackend::new();
        let handle = mock.add_sff_port("port0");
        mock.set_sff(handle.id, 0xA0, 7, 10, &[0xAB]);

        // The same byte is visible through any page value.
        let region = SffRegion::new(0xA0, 0, 10, 1).unwrap();
        assert_eq!(mock.read_sff(&handle, &region).unwrap(), vec![0xAB]);
    }

    #[test]
    fn test_write_counts_and_contents() {
        let mock = MockBackend::new();
        let handle = mock.add_sff_port("port0");
        let region = SffRegion::new(0xA2, 0, 110, 1).unwrap();
        assert_eq!(mock.write_sff(&handle, &region, &[0x40]).unwrap(), 1);
        assert_eq!(mock.write_count(), 1);
        assert_eq!(mock.read_sff(&handle, &region).unwrap(), vec![0x40]);
    }

    #[test]
    fn test_cfp_roundtrip() {
        let mock = MockBackend::new();
        let handle = mock.add_cfp_port("cfp0");
        mock.set_cfp_word(handle.id, 0xA02F, 0x1A00);

        let region = CfpRegion::new(0xA02F, 2).unwrap();
        assert_eq!(mock.read_cfp(&handle, &region).unwrap(), vec![0x1A00, 0]);
    }

    #[test]
    fn test_injected_failure() {
        let mock = MockBackend::new();
        let handle = mock.add_sff_port("port0");
        mock.break_address(handle.id, 0xA2);

        let region = SffRegion::new(0xA2, 0, 96, 2).unwrap();
        assert!(matches!(
            mock.read_sff(&handle, &region).unwrap_err(),
            Error::Backend(_)
        ));
        // Failed reads are not transactions.
        assert_eq!(mock.read_count(), 0);

        let region = SffRegion::new(0xA0, 0, 0, 1).unwrap();
        assert!(mock.read_sff(&handle, &region).is_ok());
    }

    #[test]
    fn test_unknown_port() {
        let mock = MockBackend::new();
        let handle = mock.add_sff_port("port0");
        let mut bogus = handle.clone();
        bogus.id = 99;
        let region = SffRegion::new(0xA0, 0, 0, 1).unwrap();
        assert_eq!(
            mock.read_sff(&bogus, &region).unwrap_err(),
            Error::NoSuchPort(99)
        );
    }
}
