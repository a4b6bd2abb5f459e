// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Field tables for the CFP family, per the CFP MSA Management Interface
//! Specification 2.6 (tables 23-32).
//!
//! CFP registers are 16-bit words in a flat MDIO address space. Most
//! registers carry one significant byte in the low half of each word and
//! are marked collapsed; monitor registers like the module temperature use
//! the full word.

use crate::keymap::FieldSpec;
use crate::keymap::FunctionMap;
use crate::keymap::MemoryMap;
use crate::keymap::ModuleTables;
use crate::keymap::WriteMap;
use optomon_codec::Decoder;
use optomon_codec::Encoder;

pub(super) fn tables() -> ModuleTables {
    let mut mm = MemoryMap::new();
    mm.add("IDENTIFIER", FieldSpec::cfp(Decoder::Uint, 0x8000, 1, true));
    mm.add("VENDOR_NAME", FieldSpec::cfp(Decoder::Text, 0x8021, 16, true));
    mm.add("TEMPERATURE", FieldSpec::cfp(Decoder::Temperature, 0xA02F, 1, false));
    mm.add("SUPPLY_VOLTAGE", FieldSpec::cfp(Decoder::Voltage, 0xA030, 1, false));

    let mut fm = FunctionMap::new();
    fm.add("SERIAL_ID", &["IDENTIFIER", "VENDOR_NAME"]);
    fm.add("DOM", &["TEMPERATURE", "SUPPLY_VOLTAGE"]);

    let mut wm = WriteMap::new();
    wm.add("VENDOR_NAME", Encoder::SetText);

    let tables = ModuleTables {
        memory: mm,
        function: fm,
        write: wm,
    };
    if let Err(e) = tables.validate() {
        panic!("CFP base tables are inconsistent: {e}");
    }
    tables
}
