// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Field tables for SFP modules, per SFF-8472 rev 12.2 and SFF-8024.
//!
//! Identity and capability data live in the EEPROM at 0xA0; diagnostics
//! live at 0xA2 and are refreshed by the module in flight, so everything at
//! 0xA2 is marked non-cacheable.

use super::A0;
use super::A2;
use crate::keymap::FieldSpec;
use crate::keymap::FunctionMap;
use crate::keymap::MemoryMap;
use crate::keymap::ModuleTables;
use crate::keymap::WriteMap;
use optomon_codec::Decoder;
use optomon_codec::Encoder;

pub(super) fn tables() -> ModuleTables {
    let mut mm = MemoryMap::new();

    // Serial ID fields (SFF-8472 table 4-1).
    mm.add("IDENTIFIER", FieldSpec::sff(true, Decoder::Uint, A0, 0, 0, 1));
    mm.add("EXT_IDENTIFIER", FieldSpec::sff(true, Decoder::Uint, A0, 0, 1, 1));
    mm.add("CONNECTOR", FieldSpec::sff(true, Decoder::Uint, A0, 0, 2, 1));
    mm.add("TRANSCEIVER", FieldSpec::sff(true, Decoder::Bytes, A0, 0, 3, 8));
    mm.add("ENCODING", FieldSpec::sff(true, Decoder::Uint, A0, 0, 11, 1));
    // The nominal rate's escape byte points at byte 66, so the read spans
    // bytes 12..=66.
    mm.add("BR_NOMINAL", FieldSpec::sff(true, Decoder::BitRate, A0, 0, 12, 55));
    mm.add("RATE_IDENTIFIER", FieldSpec::sff(true, Decoder::Uint, A0, 0, 13, 1));

    mm.add("LENGTH_SMF_KM", FieldSpec::sff(true, Decoder::LengthKm, A0, 0, 14, 1));
    mm.add("LENGTH_SMF", FieldSpec::sff(true, Decoder::Length100m, A0, 0, 15, 1));
    mm.add("LENGTH_50UM", FieldSpec::sff(true, Decoder::Length10m, A0, 0, 16, 1));
    mm.add("LENGTH_62_5UM", FieldSpec::sff(true, Decoder::Length10m, A0, 0, 17, 1));
    // Byte 18 is OM4 reach or copper length depending on the technology
    // bits in byte 8, so the field covers bytes 8..=18.
    mm.add("LENGTH_OM4_OR_CU", FieldSpec::sff(true, Decoder::LengthOmCu, A0, 0, 8, 11));
    mm.add("LENGTH_OM3", FieldSpec::sff(true, Decoder::Length10m, A0, 0, 19, 1));

    mm.add("VENDOR_NAME", FieldSpec::sff(true, Decoder::Text, A0, 0, 20, 16));
    mm.add("TRANSCEIVER_EXT", FieldSpec::sff(true, Decoder::Uint, A0, 0, 36, 1));
    mm.add("VENDOR_OUI", FieldSpec::sff(true, Decoder::Bytes, A0, 0, 37, 3));
    mm.add("VENDOR_PN", FieldSpec::sff(true, Decoder::Text, A0, 0, 40, 16));
    mm.add("VENDOR_REV", FieldSpec::sff(true, Decoder::Text, A0, 0, 56, 4));
    // Bytes 60..=61 are a wavelength for optical modules and compliance
    // codes for passive cables; both keys read bytes 8..=61 and pick.
    mm.add("WAVELENGTH", FieldSpec::sff(true, Decoder::WavelengthSfp, A0, 0, 8, 54));
    mm.add("CABLE_SPEC", FieldSpec::sff(true, Decoder::CableSpec, A0, 0, 8, 54));

    mm.add("OPTIONS", FieldSpec::sff(true, Decoder::Bytes, A0, 0, 64, 2));
    mm.add("BR_MAX", FieldSpec::sff(true, Decoder::BitRateMax, A0, 0, 12, 56));
    mm.add("BR_MIN", FieldSpec::sff(true, Decoder::BitRateMin, A0, 0, 12, 56));
    mm.add("VENDOR_SN", FieldSpec::sff(true, Decoder::Text, A0, 0, 68, 16));
    mm.add("DATE_CODE", FieldSpec::sff(true, Decoder::Text, A0, 0, 84, 8));
    mm.add("DIAGNOSTIC_MONITORING_TYPE", FieldSpec::sff(true, Decoder::Uint, A0, 0, 92, 1));
    mm.add("ENHANCED_OPTIONS", FieldSpec::sff(true, Decoder::Uint, A0, 0, 93, 1));
    mm.add("SFF_8472_COMPLIANCE", FieldSpec::sff(true, Decoder::Uint, A0, 0, 94, 1));
    mm.add("VENDOR_SPECIFIC_96", FieldSpec::sff(true, Decoder::Bytes, A0, 0, 96, 32));

    // Diagnostics (SFF-8472 table 9-11).
    mm.add("TEMPERATURE", FieldSpec::sff(false, Decoder::Temperature, A2, 0, 96, 2));
    mm.add("VCC", FieldSpec::sff(false, Decoder::Voltage, A2, 0, 98, 2));
    mm.add("TX_BIAS", FieldSpec::sff(false, Decoder::Current, A2, 0, 100, 2));
    mm.add("TX_POWER", FieldSpec::sff(false, Decoder::Power, A2, 0, 102, 2));
    mm.add("RX_POWER", FieldSpec::sff(false, Decoder::Power, A2, 0, 104, 2));
    mm.add("OPT_LASER_TEMP", FieldSpec::sff(false, Decoder::Temperature, A2, 0, 106, 2));
    mm.add("OPT_TEC", FieldSpec::sff(false, Decoder::SignedCurrent, A2, 0, 108, 2));

    // Status/control byte (SFF-8472 table 9-11, byte 110).
    mm.add("STATUS_CONTROL", FieldSpec::sff_bits(false, A2, 0, 110, 7, 8));
    mm.add("TX_DISABLE_STATE", FieldSpec::sff_bits(false, A2, 0, 110, 7, 1));
    mm.add("SOFT_TX_DISABLE_SELECT", FieldSpec::sff_bits(false, A2, 0, 110, 6, 1));
    mm.add("RS_1_STATE", FieldSpec::sff_bits(false, A2, 0, 110, 5, 1));
    mm.add("RATE_SELECT_STATE", FieldSpec::sff_bits(false, A2, 0, 110, 4, 1));
    mm.add("SOFT_RATE_SELECT", FieldSpec::sff_bits(false, A2, 0, 110, 3, 1));
    mm.add("TX_FAULT_STATE", FieldSpec::sff_bits(false, A2, 0, 110, 2, 1));
    mm.add("RX_LOS_STATE", FieldSpec::sff_bits(false, A2, 0, 110, 1, 1));
    mm.add("DATA_READY_BAR_STATE", FieldSpec::sff_bits(false, A2, 0, 110, 0, 1));

    let mut fm = FunctionMap::new();
    fm.add(
        "SERIAL_ID",
        &[
            "IDENTIFIER",
            "EXT_IDENTIFIER",
            "CONNECTOR",
            "TRANSCEIVER",
            "ENCODING",
            "BR_NOMINAL",
            "RATE_IDENTIFIER",
            "LENGTH_SMF_KM",
            "LENGTH_SMF",
            "LENGTH_50UM",
            "LENGTH_62_5UM",
            "LENGTH_OM4_OR_CU",
            "LENGTH_OM3",
            "VENDOR_NAME",
            "TRANSCEIVER_EXT",
            "VENDOR_OUI",
            "VENDOR_PN",
            "VENDOR_REV",
            "WAVELENGTH",
            "CABLE_SPEC",
            "OPTIONS",
            "BR_MAX",
            "BR_MIN",
            "VENDOR_SN",
            "DATE_CODE",
            "DIAGNOSTIC_MONITORING_TYPE",
            "ENHANCED_OPTIONS",
            "SFF_8472_COMPLIANCE",
        ],
    );
    fm.add("DOM", &["TEMPERATURE", "VCC", "TX_BIAS", "TX_POWER", "RX_POWER"]);

    let mut wm = WriteMap::new();
    wm.add("SOFT_TX_DISABLE_SELECT", Encoder::SetBits);

    let tables = ModuleTables {
        memory: mm,
        function: fm,
        write: wm,
    };
    if let Err(e) = tables.validate() {
        panic!("SFP base tables are inconsistent: {e}");
    }
    tables
}
