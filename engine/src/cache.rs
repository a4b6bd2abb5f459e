// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! A per-port cache of 128-byte memory pages.
//!
//! SFF-style devices serve their maps through a narrow window: the low 128
//! bytes are page-independent, and the page-select register maps one upper
//! page at a time into offsets 128..=255. Reading a whole page per miss and
//! serving fields out of the cached copy keeps the I2C traffic proportional
//! to the number of pages touched, not the number of fields read.

use optomon_southbound::Backend;
use optomon_southbound::Error;
use optomon_southbound::PortHandle;
use optomon_southbound::SffRegion;
use optomon_southbound::MAP_SIZE;
use optomon_southbound::PAGE_SIZE;
use slog::debug;
use slog::Logger;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// The page-or-low-memory half of a cache key.
///
/// Offsets below 128 see the same bytes regardless of the page-select value,
/// so all such reads share one `LowMemory` entry per device address. Caching
/// them under their nominal page would hold duplicate, independently-stale
/// copies of the same bytes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
enum PageKey {
    LowMemory,
    Page(u8),
}

/// Derive the cache key and the base offset of the page holding `offset`.
fn locate(page: u8, offset: u8) -> (PageKey, u8) {
    if offset < PAGE_SIZE {
        (PageKey::LowMemory, 0)
    } else {
        (PageKey::Page(page), PAGE_SIZE)
    }
}

#[derive(Debug, Default)]
pub struct PageCache {
    pages: HashMap<(u8, PageKey), Vec<u8>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `len` bytes at (`address`, `page`, `offset`), filling pages from
    /// `backend` on a miss.
    ///
    /// A read straddling the low-memory/upper-page boundary is split into two
    /// cached page accesses and reassembled, so a single field spanning the
    /// boundary costs at most two hardware transactions, ever.
    pub fn read(
        &mut self,
        backend: &dyn Backend,
        handle: &PortHandle,
        address: u8,
        page: u8,
        offset: u8,
        len: usize,
        log: &Logger,
    ) -> Result<Vec<u8>, Error> {
        // The last byte must lie within the 256-byte map, exactly as
        // `SffRegion::new` requires. Checked here as well because a cache
        // hit never constructs a region, and the straddle recursion below
        // would otherwise serve bytes of the same page twice.
        if len == 0 || usize::from(offset) + len > usize::from(MAP_SIZE) {
            return Err(Error::InvalidMemoryAccess {
                offset,
                len: u8::try_from(len).unwrap_or(u8::MAX),
            });
        }
        let (key, base) = locate(page, offset);
        let cached = match self.pages.entry((address, key)) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let region = SffRegion::new(address, page, base, PAGE_SIZE)?;
                let data = backend.read_sff(handle, &region)?;
                if data.len() != usize::from(PAGE_SIZE) {
                    return Err(Error::ShortRead {
                        expected: usize::from(PAGE_SIZE),
                        actual: data.len(),
                    });
                }
                debug!(
                    log,
                    "filled page cache";
                    "address" => format!("{address:#04x}"),
                    "page" => page,
                    "low_memory" => key == PageKey::LowMemory,
                );
                entry.insert(data)
            }
        };

        let start = usize::from(offset - base);
        let within = usize::from(PAGE_SIZE) - start;
        if len <= within {
            return Ok(cached[start..start + len].to_vec());
        }

        // Straddle: take the rest of this page, then recurse into the next.
        let mut out = cached[start..].to_vec();
        let rest = self.read(backend, handle, address, page, PAGE_SIZE, len - within, log)?;
        out.extend(rest);
        Ok(out)
    }

    /// Drop the cached page holding (`page`, `offset`), if present. Returns
    /// whether an entry was removed.
    pub fn invalidate(&mut self, address: u8, page: u8, offset: u8) -> bool {
        let (key, _) = locate(page, offset);
        self.pages.remove(&(address, key)).is_some()
    }
}
