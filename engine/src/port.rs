// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! The per-port decode surface: named fields over raw module memory.

use crate::addon::AddonRegistry;
use crate::cache::PageCache;
use crate::keymap::FunctionMap;
use crate::keymap::Location;
use crate::keymap::MemoryMap;
use crate::keymap::WriteMap;
use crate::module_type::ModuleType;
use crate::tables;
use crate::Error;
use optomon_codec::Value;
use optomon_southbound::Backend;
use optomon_southbound::CfpRegion;
use optomon_southbound::DeviceClass;
use optomon_southbound::PortHandle;
use optomon_southbound::SffRegion;
use optomon_southbound::CFP_BASE_ADDRESS;
use slog::debug;
use slog::o;
use slog::warn;
use slog::Logger;
use std::rc::Rc;

/// One field's outcome within a bundle read.
///
/// A bundle never aborts on a single bad field: a module reporting garbage
/// in one monitor should not hide the others.
#[derive(Clone, Debug, PartialEq)]
pub struct BundleEntry {
    pub key: String,
    pub value: Result<Value, Error>,
}

/// Build a [`Port`] for every port the backend can reach.
///
/// Identity is read and tables are installed eagerly, so an unreadable or
/// empty port shows up as [`ModuleType::NotPresent`] rather than as an
/// error; enumeration itself only fails if the backend cannot list its
/// ports at all.
pub fn enumerate(
    backend: Rc<dyn Backend>,
    addons: &AddonRegistry,
    log: &Logger,
) -> Result<Vec<Port>, Error> {
    let handles = backend.ports()?;
    debug!(log, "enumerated ports"; "count" => handles.len());
    Ok(handles
        .into_iter()
        .map(|handle| Port::new(Rc::clone(&backend), handle, addons, log))
        .collect())
}

/// One physical port and everything needed to decode the module in it.
///
/// A port owns its page cache, so reads through `&mut self` never touch
/// another port's state. Construction resolves the module type from the
/// fixed identity register, installs the module type's base field tables,
/// and runs the addon registry over the result.
pub struct Port {
    backend: Rc<dyn Backend>,
    handle: PortHandle,
    module_type: ModuleType,
    memory_map: MemoryMap,
    function_map: FunctionMap,
    write_map: WriteMap,
    cache: PageCache,
    log: Logger,
}

impl Port {
    pub(crate) fn new(
        backend: Rc<dyn Backend>,
        handle: PortHandle,
        addons: &AddonRegistry,
        log: &Logger,
    ) -> Self {
        let log = log.new(o!("port" => handle.name.clone()));
        let module_type = match identify(backend.as_ref(), &handle) {
            Ok(module_type) => module_type,
            Err(e) => {
                warn!(
                    log,
                    "failed to read module identity, treating port as empty";
                    "error" => e.to_string(),
                );
                ModuleType::NotPresent
            }
        };
        debug!(log, "resolved module type"; "module_type" => %module_type);
        let tables = tables::base_tables(module_type).cloned().unwrap_or_default();
        let mut port = Self {
            backend,
            handle,
            module_type,
            memory_map: tables.memory,
            function_map: tables.function,
            write_map: tables.write,
            cache: PageCache::new(),
            log,
        };
        addons.apply(&mut port);
        port
    }

    pub fn handle(&self) -> &PortHandle {
        &self.handle
    }

    pub fn name(&self) -> &str {
        &self.handle.name
    }

    pub fn module_type(&self) -> ModuleType {
        self.module_type
    }

    pub fn device_class(&self) -> Option<DeviceClass> {
        self.module_type.device_class()
    }

    /// The field keys this port knows, sorted.
    pub fn field_names(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.memory_map.keys().map(String::from).collect();
        keys.sort_unstable();
        keys
    }

    /// The bundle keys this port knows, sorted.
    pub fn bundle_names(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.function_map.keys().map(String::from).collect();
        keys.sort_unstable();
        keys
    }

    /// The writable field keys, sorted.
    pub fn writable_names(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.write_map.keys().map(String::from).collect();
        keys.sort_unstable();
        keys
    }

    /// Merge extra table entries into this port, replacing existing entries
    /// of the same name. This is the addon extension point.
    pub fn merge(&mut self, memory: MemoryMap, function: FunctionMap, write: WriteMap) {
        self.memory_map.merge(memory);
        self.function_map.merge(function);
        self.write_map.merge(write);
    }

    /// Read and decode one field.
    ///
    /// Cacheable fields are served from the page cache; fields carrying live
    /// telemetry go to the hardware every time.
    pub fn get(&mut self, key: &str) -> Result<Value, Error> {
        let spec = *self
            .memory_map
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        let buf = self.fetch(&spec, false)?;
        spec.decoder
            .decode(&buf, spec.bits)
            .map_err(|source| Error::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Read a whole bundle of fields.
    ///
    /// Pages backing the bundle's live-telemetry fields are refreshed once
    /// up front and every field then decodes through the cache, so a bundle
    /// costs one hardware read per page touched and its fields come from a
    /// single consistent snapshot. Per-field failures land in the returned
    /// entries; the call itself only fails for an unknown bundle name.
    pub fn get_bundle(&mut self, bundle: &str) -> Result<Vec<BundleEntry>, Error> {
        let keys = self
            .function_map
            .get(bundle)
            .ok_or_else(|| Error::BundleNotFound(bundle.to_string()))?
            .to_vec();
        for key in &keys {
            if let Some(spec) = self.memory_map.get(key) {
                if !spec.cacheable {
                    if let Location::Sff {
                        address,
                        page,
                        offset,
                        ..
                    } = spec.location
                    {
                        self.cache.invalidate(address, page, offset);
                    }
                }
            }
        }
        Ok(keys
            .into_iter()
            .map(|key| {
                let value = self.get_through_cache(&key);
                BundleEntry { key, value }
            })
            .collect())
    }

    fn get_through_cache(&mut self, key: &str) -> Result<Value, Error> {
        let spec = *self
            .memory_map
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        let buf = self.fetch(&spec, true)?;
        spec.decoder
            .decode(&buf, spec.bits)
            .map_err(|source| Error::Decode {
                key: key.to_string(),
                source,
            })
    }

    /// Encode and write one field, returning the number of bytes (SFF) or
    /// words (CFP) written.
    ///
    /// The field's current bytes are read fresh from the hardware first, so
    /// a sub-byte write merges into whatever the module holds right now, not
    /// into a cached copy. The page holding the field is invalidated after
    /// the write.
    pub fn set(&mut self, key: &str, value: &Value) -> Result<usize, Error> {
        let spec = *self
            .memory_map
            .get(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        let encoder = *self
            .write_map
            .get(key)
            .ok_or_else(|| Error::NotWritable(key.to_string()))?;
        let invalid = |source| Error::InvalidValue {
            key: key.to_string(),
            source,
        };
        match spec.location {
            Location::Sff {
                address,
                page,
                offset,
                len,
            } => {
                let region = SffRegion::new(address, page, offset, len)?;
                let current = self.backend.read_sff(&self.handle, &region)?;
                let new = encoder.encode(&current, value, spec.bits).map_err(invalid)?;
                let written = self.backend.write_sff(&self.handle, &region, &new)?;
                self.cache.invalidate(address, page, offset);
                debug!(self.log, "wrote field"; "key" => key, "bytes" => written);
                Ok(written)
            }
            Location::Cfp {
                address,
                words,
                collapsed,
            } => {
                let region = CfpRegion::new(address, words)?;
                let current_words = self.backend.read_cfp(&self.handle, &region)?;
                let current = collapse_words(&current_words, collapsed);
                let new = encoder.encode(&current, value, spec.bits).map_err(invalid)?;
                let new_words = expand_words(&new, collapsed);
                let written = self.backend.write_cfp(&self.handle, &region, &new_words)?;
                debug!(self.log, "wrote field"; "key" => key, "words" => written);
                Ok(written)
            }
        }
    }

    /// Read a field's raw bytes, through the cache or not per its spec.
    fn fetch(&mut self, spec: &crate::FieldSpec, force_cache: bool) -> Result<Vec<u8>, Error> {
        match spec.location {
            Location::Sff {
                address,
                page,
                offset,
                len,
            } => {
                if spec.cacheable || force_cache {
                    Ok(self.cache.read(
                        self.backend.as_ref(),
                        &self.handle,
                        address,
                        page,
                        offset,
                        usize::from(len),
                        &self.log,
                    )?)
                } else {
                    let region = SffRegion::new(address, page, offset, len)?;
                    Ok(self.backend.read_sff(&self.handle, &region)?)
                }
            }
            // CFP register space is flat and uncached; every read is live.
            Location::Cfp {
                address,
                words,
                collapsed,
            } => {
                let region = CfpRegion::new(address, words)?;
                let data = self.backend.read_cfp(&self.handle, &region)?;
                Ok(collapse_words(&data, collapsed))
            }
        }
    }
}

/// Flatten CFP register words into the byte stream the decoders expect.
///
/// Collapsed registers carry one significant byte in the low half of each
/// word; everything else is big-endian word pairs.
fn collapse_words(words: &[u16], collapsed: bool) -> Vec<u8> {
    if collapsed {
        words.iter().map(|w| (w & 0xFF) as u8).collect()
    } else {
        words.iter().flat_map(|w| w.to_be_bytes()).collect()
    }
}

/// The write-side mirror of [`collapse_words`].
fn expand_words(bytes: &[u8], collapsed: bool) -> Vec<u16> {
    if collapsed {
        bytes.iter().map(|b| u16::from(*b)).collect()
    } else {
        bytes
            .chunks(2)
            .map(|pair| match pair {
                [hi, lo] => u16::from_be_bytes([*hi, *lo]),
                [hi] => u16::from_be_bytes([*hi, 0]),
                _ => unreachable!(),
            })
            .collect()
    }
}

/// Read the module's fixed identity register and map it to a type.
fn identify(
    backend: &dyn Backend,
    handle: &PortHandle,
) -> Result<ModuleType, optomon_southbound::Error> {
    match handle.class {
        DeviceClass::Sff => {
            let region = SffRegion::new(0xA0, 0, 0, 1)?;
            let data = backend.read_sff(handle, &region)?;
            match data.first() {
                Some(code) => Ok(ModuleType::from_code(u16::from(*code))),
                None => Err(optomon_southbound::Error::ShortRead {
                    expected: 1,
                    actual: 0,
                }),
            }
        }
        DeviceClass::Cfp => {
            let region = CfpRegion::new(CFP_BASE_ADDRESS, 1)?;
            let data = backend.read_cfp(handle, &region)?;
            match data.first() {
                // The identifier register holds one byte; a nonzero high
                // byte means the module is not answering sensibly.
                Some(word) if *word <= 0xFF => {
                    Ok(ModuleType::from_code(word + 0x100))
                }
                Some(_) => Ok(ModuleType::Invalid),
                None => Err(optomon_southbound::Error::ShortRead {
                    expected: 1,
                    actual: 0,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::enumerate;
    use super::AddonRegistry;
    use super::BundleEntry;
    use super::Port;
    use crate::Decoder;
    use crate::Encoder;
    use crate::Error;
    use crate::FieldSpec;
    use crate::FunctionMap;
    use crate::MemoryMap;
    use crate::ModuleType;
    use crate::Value;
    use crate::WriteMap;
    use optomon_southbound::mock::MockBackend;
    use optomon_southbound::Backend;
    use optomon_southbound::SffRegion;
    use slog::Drain;
    use slog::Logger;
    use std::rc::Rc;

    fn test_logger() -> Logger {
        Logger::root(slog::Discard.fuse(), slog::o!())
    }

    fn sfp_port_with(mock: &Rc<MockBackend>, addons: &AddonRegistry) -> Port {
        let handle = mock.add_sff_port("sfp0");
        mock.set_sff(handle.id, 0xA0, 0, 0, &[0x03]);
        Port::new(Rc::clone(mock) as Rc<dyn Backend>, handle, addons, &test_logger())
    }

    fn sfp_port(mock: &Rc<MockBackend>) -> Port {
        sfp_port_with(mock, &AddonRegistry::new())
    }

    #[test]
    fn test_module_type_resolution() {
        let mock = Rc::new(MockBackend::new());
        let port = sfp_port(&mock);
        assert_eq!(port.module_type(), ModuleType::Sfp);

        let handle = mock.add_cfp_port("cfp0");
        mock.set_cfp_word(handle.id, 0x8000, 0x11);
        let port = Port::new(
            Rc::clone(&mock) as Rc<dyn Backend>,
            handle,
            &AddonRegistry::new(),
            &test_logger(),
        );
        assert_eq!(port.module_type(), ModuleType::Cfp2);
    }

    #[test]
    fn test_unreadable_port_is_not_present() {
        let mock = Rc::new(MockBackend::new());
        let handle = mock.add_sff_port("sfp0");
        mock.break_address(handle.id, 0xA0);
        let port = Port::new(
            Rc::clone(&mock) as Rc<dyn Backend>,
            handle,
            &AddonRegistry::new(),
            &test_logger(),
        );
        assert_eq!(port.module_type(), ModuleType::NotPresent);
        assert!(port.field_names().is_empty());
        assert!(port.bundle_names().is_empty());
    }

    #[test]
    fn test_enumerate() {
        let mock = Rc::new(MockBackend::new());
        let a = mock.add_sff_port("sfp0");
        mock.set_sff(a.id, 0xA0, 0, 0, &[0x03]);
        let b = mock.add_sff_port("qsfp0");
        mock.set_sff(b.id, 0xA0, 0, 0, &[0x0D]);

        let ports = enumerate(
            Rc::clone(&mock) as Rc<dyn Backend>,
            &AddonRegistry::new(),
            &test_logger(),
        )
        .unwrap();
        assert_eq!(ports.len(), 2);
        assert_eq!(ports[0].module_type(), ModuleType::Sfp);
        assert_eq!(ports[1].module_type(), ModuleType::QsfpPlus);
    }

    #[test]
    fn test_static_field_is_cached() {
        let mock = Rc::new(MockBackend::new());
        let mut port = {
            let port = sfp_port(&mock);
            mock.reset_counts();
            port
        };
        mock.set_sff(port.handle().id, 0xA0, 0, 20, b"ACME OPTICS     ");

        let name = port.get("VENDOR_NAME").unwrap();
        assert_eq!(name, Value::Text("ACME OPTICS     ".to_string()));
        assert_eq!(mock.read_count(), 1);

        // Second read, and other fields on the same page, cost nothing.
        port.get("VENDOR_NAME").unwrap();
        port.get("IDENTIFIER").unwrap();
        assert_eq!(mock.read_count(), 1);
    }

    #[test]
    fn test_dynamic_field_reads_fresh() {
        let mock = Rc::new(MockBackend::new());
        let mut port = sfp_port(&mock);
        mock.set_sff(port.handle().id, 0xA2, 0, 96, &[0x19, 0x00]);
        mock.reset_counts();

        assert_eq!(port.get("TEMPERATURE").unwrap(), Value::Float(25.0));
        mock.set_sff(port.handle().id, 0xA2, 0, 96, &[0x1A, 0x00]);
        assert_eq!(port.get("TEMPERATURE").unwrap(), Value::Float(26.0));
        assert_eq!(mock.read_count(), 2);
    }

    #[test]
    fn test_unknown_key() {
        let mock = Rc::new(MockBackend::new());
        let mut port = sfp_port(&mock);
        assert_eq!(
            port.get("NO_SUCH_FIELD").unwrap_err(),
            Error::KeyNotFound("NO_SUCH_FIELD".to_string())
        );
    }

    #[test]
    fn test_dom_bundle() {
        let mock = Rc::new(MockBackend::new());
        let mut port = sfp_port(&mock);
        let id = port.handle().id;
        mock.set_sff(id, 0xA2, 0, 96, &[0x19, 0x00]); // 25 C
        mock.set_sff(id, 0xA2, 0, 98, &[0x80, 0xE8]); // 3.3 V
        mock.set_sff(id, 0xA2, 0, 100, &[0x4E, 0x20]); // 40 mA
        mock.set_sff(id, 0xA2, 0, 102, &[0x13, 0x88]); // 0.5 mW
        mock.set_sff(id, 0xA2, 0, 104, &[0x0F, 0xA0]); // 0.4 mW
        mock.reset_counts();

        let bundle = port.get_bundle("DOM").unwrap();
        let expected = [
            ("TEMPERATURE", 25.0),
            ("VCC", 3.3),
            ("TX_BIAS", 40.0),
            ("TX_POWER", 0.5),
            ("RX_POWER", 0.4),
        ];
        assert_eq!(bundle.len(), expected.len());
        for (entry, (key, value)) in bundle.iter().zip(expected.iter()) {
            assert_eq!(entry.key, *key);
            let decoded = entry.value.as_ref().unwrap().as_f64().unwrap();
            assert!((decoded - value).abs() < 1e-9, "{key} decoded as {decoded}");
        }

        // All five monitors share one page: one hardware read per bundle
        // call, refreshed across calls.
        assert_eq!(mock.read_count(), 1);
        port.get_bundle("DOM").unwrap();
        assert_eq!(mock.read_count(), 2);
    }

    #[test]
    fn test_bundle_survives_one_bad_field() {
        let mock = Rc::new(MockBackend::new());
        // An addon replaces one monitor's spec with a decoder whose length
        // contract the location cannot satisfy.
        let mut addons = AddonRegistry::new();
        addons.register(|port: &mut Port| {
            let mut memory = MemoryMap::new();
            memory.add(
                "TX_BIAS",
                FieldSpec::sff(false, Decoder::WavelengthQsfp, 0xA2, 0, 100, 2),
            );
            port.merge(memory, FunctionMap::new(), WriteMap::new());
        });
        let mut port = sfp_port_with(&mock, &addons);

        let bundle = port.get_bundle("DOM").unwrap();
        assert_eq!(bundle.len(), 5);
        for BundleEntry { key, value } in &bundle {
            if key == "TX_BIAS" {
                assert!(matches!(value, Err(Error::Decode { .. })));
            } else {
                assert!(value.is_ok(), "{key} failed: {value:?}");
            }
        }
    }

    #[test]
    fn test_unknown_bundle() {
        let mock = Rc::new(MockBackend::new());
        let mut port = sfp_port(&mock);
        assert_eq!(
            port.get_bundle("NO_SUCH_BUNDLE").unwrap_err(),
            Error::BundleNotFound("NO_SUCH_BUNDLE".to_string())
        );
    }

    #[test]
    fn test_set_single_bit_preserves_neighbors() {
        let mock = Rc::new(MockBackend::new());
        let mut port = sfp_port(&mock);
        let id = port.handle().id;
        mock.set_sff(id, 0xA2, 0, 110, &[0b0000_0010]);

        let written = port.set("SOFT_TX_DISABLE_SELECT", &Value::Uint(1)).unwrap();
        assert_eq!(written, 1);
        assert_eq!(port.get("SOFT_TX_DISABLE_SELECT").unwrap(), Value::Uint(1));

        // The other bits of the status/control byte are untouched.
        let handle = port.handle().clone();
        let region = SffRegion::new(0xA2, 0, 110, 1).unwrap();
        assert_eq!(mock.read_sff(&handle, &region).unwrap(), [0b0100_0010]);

        port.set("SOFT_TX_DISABLE_SELECT", &Value::Uint(0)).unwrap();
        assert_eq!(mock.read_sff(&handle, &region).unwrap(), [0b0000_0010]);
    }

    #[test]
    fn test_set_rejections() {
        let mock = Rc::new(MockBackend::new());
        let mut port = sfp_port(&mock);
        assert_eq!(
            port.set("VENDOR_NAME", &Value::Text("X".into())).unwrap_err(),
            Error::NotWritable("VENDOR_NAME".to_string())
        );
        assert_eq!(
            port.set("NO_SUCH_FIELD", &Value::Uint(0)).unwrap_err(),
            Error::KeyNotFound("NO_SUCH_FIELD".to_string())
        );
        // A two-bit value cannot land in a one-bit field.
        assert!(matches!(
            port.set("SOFT_TX_DISABLE_SELECT", &Value::Uint(2)).unwrap_err(),
            Error::InvalidValue { .. }
        ));
    }

    #[test]
    fn test_write_invalidates_cached_page() {
        let mock = Rc::new(MockBackend::new());
        let mut addons = AddonRegistry::new();
        addons.register(|port: &mut Port| {
            let mut memory = MemoryMap::new();
            memory.add("CHANNEL_SELECT", FieldSpec::sff(true, Decoder::Uint, 0xA0, 0, 64, 1));
            let mut write = WriteMap::new();
            write.add("CHANNEL_SELECT", Encoder::SetUint);
            port.merge(memory, FunctionMap::new(), write);
        });
        let mut port = sfp_port_with(&mock, &addons);
        mock.reset_counts();

        assert_eq!(port.get("CHANNEL_SELECT").unwrap(), Value::Uint(0));
        port.get("CHANNEL_SELECT").unwrap();
        assert_eq!(mock.read_count(), 1);

        // The write reads the current bytes fresh and evicts the page, so
        // the next read observes what the hardware accepted.
        port.set("CHANNEL_SELECT", &Value::Uint(7)).unwrap();
        assert_eq!(mock.read_count(), 2);
        assert_eq!(port.get("CHANNEL_SELECT").unwrap(), Value::Uint(7));
        assert_eq!(mock.read_count(), 3);
    }

    #[test]
    fn test_addon_extends_only_matching_ports() {
        let mock = Rc::new(MockBackend::new());
        let mut addons = AddonRegistry::new();
        addons.register(|port: &mut Port| {
            if port.module_type() == ModuleType::QsfpPlus {
                let mut memory = MemoryMap::new();
                memory.add(
                    "VENDOR_MAGIC",
                    FieldSpec::sff(true, Decoder::Uint, 0xA0, 0, 127, 1),
                );
                port.merge(memory, FunctionMap::new(), WriteMap::new());
            }
        });

        let sfp = mock.add_sff_port("sfp0");
        mock.set_sff(sfp.id, 0xA0, 0, 0, &[0x03]);
        let qsfp = mock.add_sff_port("qsfp0");
        mock.set_sff(qsfp.id, 0xA0, 0, 0, &[0x0D]);
        mock.set_sff(qsfp.id, 0xA0, 0, 127, &[0x42]);

        let mut ports = enumerate(
            Rc::clone(&mock) as Rc<dyn Backend>,
            &addons,
            &test_logger(),
        )
        .unwrap();
        assert_eq!(
            ports[1].get("VENDOR_MAGIC").unwrap(),
            Value::Uint(0x42)
        );
        assert_eq!(
            ports[0].get("VENDOR_MAGIC").unwrap_err(),
            Error::KeyNotFound("VENDOR_MAGIC".to_string())
        );
    }

    #[test]
    fn test_cfp_fields() {
        let mock = Rc::new(MockBackend::new());
        let handle = mock.add_cfp_port("cfp0");
        mock.set_cfp_word(handle.id, 0x8000, 0x11);
        mock.set_cfp_collapsed(handle.id, 0x8021, b"ACME CFP2       ");
        mock.set_cfp_word(handle.id, 0xA02F, 0x1900);
        let mut port = Port::new(
            Rc::clone(&mock) as Rc<dyn Backend>,
            handle,
            &AddonRegistry::new(),
            &test_logger(),
        );

        assert_eq!(
            port.get("VENDOR_NAME").unwrap(),
            Value::Text("ACME CFP2       ".to_string())
        );
        assert_eq!(port.get("TEMPERATURE").unwrap(), Value::Float(25.0));

        // A collapsed text write lands one byte per word.
        let written = port
            .set("VENDOR_NAME", &Value::Text("ACME".to_string()))
            .unwrap();
        assert_eq!(written, 16);
        assert_eq!(
            port.get("VENDOR_NAME").unwrap(),
            Value::Text("ACME            ".to_string())
        );
    }
}
