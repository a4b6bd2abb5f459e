// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Field tables for QSFP+ and QSFP28 modules, per SFF-8636 rev 2.6 and
//! SFF-8024.
//!
//! The whole map sits behind one I2C address. Low memory holds live state:
//! interrupt flags, monitors and control bytes, all non-cacheable. The
//! serial ID data lives in upper page 0 and the free-side device properties
//! at bytes 108..=113, which never change while a module is seated.

use super::A0;
use crate::keymap::FieldSpec;
use crate::keymap::FunctionMap;
use crate::keymap::MemoryMap;
use crate::keymap::ModuleTables;
use crate::keymap::WriteMap;
use optomon_codec::Decoder;
use optomon_codec::Encoder;

pub(super) fn tables() -> ModuleTables {
    let mut mm = MemoryMap::new();

    // ID and status bytes (0..=2).
    mm.add("IDENTIFIER", FieldSpec::sff(true, Decoder::Uint, A0, 0, 0, 1));
    mm.add("REV_COMPLIANCE", FieldSpec::sff(true, Decoder::Uint, A0, 0, 1, 1));
    mm.add("FLAT_MEM", FieldSpec::sff_bits(false, A0, 0, 2, 2, 1));
    mm.add("INT_L", FieldSpec::sff_bits(false, A0, 0, 2, 1, 1));
    mm.add("DATA_NOT_READY", FieldSpec::sff_bits(false, A0, 0, 2, 0, 1));

    // Interrupt flag bytes (3..=14). Flags latch and clear on read, so
    // none of these may be served from the cache.
    mm.add("L_TX_RX_LOS", FieldSpec::sff_bits(false, A0, 0, 3, 7, 8));
    mm.add("L_TX4_LOS", FieldSpec::sff_bits(false, A0, 0, 3, 7, 1));
    mm.add("L_TX3_LOS", FieldSpec::sff_bits(false, A0, 0, 3, 6, 1));
    mm.add("L_TX2_LOS", FieldSpec::sff_bits(false, A0, 0, 3, 5, 1));
    mm.add("L_TX1_LOS", FieldSpec::sff_bits(false, A0, 0, 3, 4, 1));
    mm.add("L_RX4_LOS", FieldSpec::sff_bits(false, A0, 0, 3, 3, 1));
    mm.add("L_RX3_LOS", FieldSpec::sff_bits(false, A0, 0, 3, 2, 1));
    mm.add("L_RX2_LOS", FieldSpec::sff_bits(false, A0, 0, 3, 1, 1));
    mm.add("L_RX1_LOS", FieldSpec::sff_bits(false, A0, 0, 3, 0, 1));

    mm.add("L_TX_FAULT", FieldSpec::sff_bits(false, A0, 0, 4, 7, 8));
    mm.add("L_TX4_ADAPT_EQ_FAULT", FieldSpec::sff_bits(false, A0, 0, 4, 7, 1));
    mm.add("L_TX3_ADAPT_EQ_FAULT", FieldSpec::sff_bits(false, A0, 0, 4, 6, 1));
    mm.add("L_TX2_ADAPT_EQ_FAULT", FieldSpec::sff_bits(false, A0, 0, 4, 5, 1));
    mm.add("L_TX1_ADAPT_EQ_FAULT", FieldSpec::sff_bits(false, A0, 0, 4, 4, 1));
    mm.add("L_TX4_FAULT", FieldSpec::sff_bits(false, A0, 0, 4, 3, 1));
    mm.add("L_TX3_FAULT", FieldSpec::sff_bits(false, A0, 0, 4, 2, 1));
    mm.add("L_TX2_FAULT", FieldSpec::sff_bits(false, A0, 0, 4, 1, 1));
    mm.add("L_TX1_FAULT", FieldSpec::sff_bits(false, A0, 0, 4, 0, 1));

    mm.add("L_TX_RX_LOL", FieldSpec::sff_bits(false, A0, 0, 5, 7, 8));
    mm.add("L_TX4_LOL", FieldSpec::sff_bits(false, A0, 0, 5, 7, 1));
    mm.add("L_TX3_LOL", FieldSpec::sff_bits(false, A0, 0, 5, 6, 1));
    mm.add("L_TX2_LOL", FieldSpec::sff_bits(false, A0, 0, 5, 5, 1));
    mm.add("L_TX1_LOL", FieldSpec::sff_bits(false, A0, 0, 5, 4, 1));
    mm.add("L_RX4_LOL", FieldSpec::sff_bits(false, A0, 0, 5, 3, 1));
    mm.add("L_RX3_LOL", FieldSpec::sff_bits(false, A0, 0, 5, 2, 1));
    mm.add("L_RX2_LOL", FieldSpec::sff_bits(false, A0, 0, 5, 1, 1));
    mm.add("L_RX1_LOL", FieldSpec::sff_bits(false, A0, 0, 5, 0, 1));

    mm.add("L_TEMP_ALARM_WARN", FieldSpec::sff_bits(false, A0, 0, 6, 7, 4));
    mm.add("L_TEMP_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 6, 7, 1));
    mm.add("L_TEMP_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 6, 6, 1));
    mm.add("L_TEMP_HIGH_WARNING", FieldSpec::sff_bits(false, A0, 0, 6, 5, 1));
    mm.add("L_TEMP_LOW_WARNING", FieldSpec::sff_bits(false, A0, 0, 6, 4, 1));
    mm.add("INIT_COMPLETE", FieldSpec::sff_bits(false, A0, 0, 6, 0, 1));

    mm.add("L_VCC_ALARM_WARN", FieldSpec::sff_bits(false, A0, 0, 7, 7, 4));
    mm.add("L_VCC_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 7, 7, 1));
    mm.add("L_VCC_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 7, 6, 1));
    mm.add("L_VCC_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 7, 5, 1));
    mm.add("L_VCC_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 7, 4, 1));
    mm.add("VENDOR_SPECIFIC_8", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 8, 1));

    mm.add("L_RX1_RX2_POWER", FieldSpec::sff_bits(false, A0, 0, 9, 7, 8));
    mm.add("L_RX1_POWER_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 9, 7, 1));
    mm.add("L_RX1_POWER_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 9, 6, 1));
    mm.add("L_RX1_POWER_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 9, 5, 1));
    mm.add("L_RX1_POWER_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 9, 4, 1));
    mm.add("L_RX2_POWER_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 9, 3, 1));
    mm.add("L_RX2_POWER_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 9, 2, 1));
    mm.add("L_RX2_POWER_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 9, 1, 1));
    mm.add("L_RX2_POWER_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 9, 0, 1));

    mm.add("L_RX3_RX4_POWER", FieldSpec::sff_bits(false, A0, 0, 10, 7, 8));
    mm.add("L_RX3_POWER_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 10, 7, 1));
    mm.add("L_RX3_POWER_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 10, 6, 1));
    mm.add("L_RX3_POWER_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 10, 5, 1));
    mm.add("L_RX3_POWER_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 10, 4, 1));
    mm.add("L_RX4_POWER_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 10, 3, 1));
    mm.add("L_RX4_POWER_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 10, 2, 1));
    mm.add("L_RX4_POWER_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 10, 1, 1));
    mm.add("L_RX4_POWER_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 10, 0, 1));

    mm.add("L_TX1_TX2_BIAS", FieldSpec::sff_bits(false, A0, 0, 11, 7, 8));
    mm.add("L_TX1_BIAS_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 11, 7, 1));
    mm.add("L_TX1_BIAS_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 11, 6, 1));
    mm.add("L_TX1_BIAS_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 11, 5, 1));
    mm.add("L_TX1_BIAS_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 11, 4, 1));
    mm.add("L_TX2_BIAS_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 11, 3, 1));
    mm.add("L_TX2_BIAS_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 11, 2, 1));
    mm.add("L_TX2_BIAS_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 11, 1, 1));
    mm.add("L_TX2_BIAS_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 11, 0, 1));

    mm.add("L_TX3_TX4_BIAS", FieldSpec::sff_bits(false, A0, 0, 12, 7, 8));
    mm.add("L_TX3_BIAS_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 12, 7, 1));
    mm.add("L_TX3_BIAS_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 12, 6, 1));
    mm.add("L_TX3_BIAS_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 12, 5, 1));
    mm.add("L_TX3_BIAS_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 12, 4, 1));
    mm.add("L_TX4_BIAS_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 12, 3, 1));
    mm.add("L_TX4_BIAS_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 12, 2, 1));
    mm.add("L_TX4_BIAS_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 12, 1, 1));
    mm.add("L_TX4_BIAS_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 12, 0, 1));

    mm.add("L_TX1_TX2_POWER", FieldSpec::sff_bits(false, A0, 0, 13, 7, 8));
    mm.add("L_TX1_POWER_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 13, 7, 1));
    mm.add("L_TX1_POWER_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 13, 6, 1));
    mm.add("L_TX1_POWER_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 13, 5, 1));
    mm.add("L_TX1_POWER_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 13, 4, 1));
    mm.add("L_TX2_POWER_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 13, 3, 1));
    mm.add("L_TX2_POWER_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 13, 2, 1));
    mm.add("L_TX2_POWER_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 13, 1, 1));
    mm.add("L_TX2_POWER_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 13, 0, 1));

    mm.add("L_TX3_TX4_POWER", FieldSpec::sff_bits(false, A0, 0, 14, 7, 8));
    mm.add("L_TX3_POWER_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 14, 7, 1));
    mm.add("L_TX3_POWER_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 14, 6, 1));
    mm.add("L_TX3_POWER_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 14, 5, 1));
    mm.add("L_TX3_POWER_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 14, 4, 1));
    mm.add("L_TX4_POWER_HIGH_ALARM", FieldSpec::sff_bits(false, A0, 0, 14, 3, 1));
    mm.add("L_TX4_POWER_LOW_ALARM", FieldSpec::sff_bits(false, A0, 0, 14, 2, 1));
    mm.add("L_TX4_POWER_HIGH_WARN", FieldSpec::sff_bits(false, A0, 0, 14, 1, 1));
    mm.add("L_TX4_POWER_LOW_WARN", FieldSpec::sff_bits(false, A0, 0, 14, 0, 1));

    mm.add("VENDOR_SPECIFIC_19", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 19, 3));

    // Free side device monitors (22..=33).
    mm.add("TEMPERATURE", FieldSpec::sff(false, Decoder::Temperature, A0, 0, 22, 2));
    mm.add("SUPPLY_VOLTAGE", FieldSpec::sff(false, Decoder::Voltage, A0, 0, 26, 2));
    mm.add("VENDOR_SPECIFIC_30", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 30, 4));

    // Channel monitors (34..=57).
    mm.add("RX1_POWER", FieldSpec::sff(false, Decoder::Power, A0, 0, 34, 2));
    mm.add("RX2_POWER", FieldSpec::sff(false, Decoder::Power, A0, 0, 36, 2));
    mm.add("RX3_POWER", FieldSpec::sff(false, Decoder::Power, A0, 0, 38, 2));
    mm.add("RX4_POWER", FieldSpec::sff(false, Decoder::Power, A0, 0, 40, 2));
    mm.add("TX1_BIAS", FieldSpec::sff(false, Decoder::Current, A0, 0, 42, 2));
    mm.add("TX2_BIAS", FieldSpec::sff(false, Decoder::Current, A0, 0, 44, 2));
    mm.add("TX3_BIAS", FieldSpec::sff(false, Decoder::Current, A0, 0, 46, 2));
    mm.add("TX4_BIAS", FieldSpec::sff(false, Decoder::Current, A0, 0, 48, 2));
    mm.add("TX1_POWER", FieldSpec::sff(false, Decoder::Power, A0, 0, 50, 2));
    mm.add("TX2_POWER", FieldSpec::sff(false, Decoder::Power, A0, 0, 52, 2));
    mm.add("TX3_POWER", FieldSpec::sff(false, Decoder::Power, A0, 0, 54, 2));
    mm.add("TX4_POWER", FieldSpec::sff(false, Decoder::Power, A0, 0, 56, 2));
    mm.add("VENDOR_SPECIFIC_74", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 74, 8));

    // Control bytes (86..=98).
    mm.add("TX_DISABLE", FieldSpec::sff_bits(false, A0, 0, 86, 3, 4));
    mm.add("TX4_DISABLE", FieldSpec::sff_bits(false, A0, 0, 86, 3, 1));
    mm.add("TX3_DISABLE", FieldSpec::sff_bits(false, A0, 0, 86, 2, 1));
    mm.add("TX2_DISABLE", FieldSpec::sff_bits(false, A0, 0, 86, 1, 1));
    mm.add("TX1_DISABLE", FieldSpec::sff_bits(false, A0, 0, 86, 0, 1));

    mm.add("RX_RATE_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 87, 1));
    mm.add("RX4_RATE_SELECT", FieldSpec::sff_bits(false, A0, 0, 87, 7, 2));
    mm.add("RX3_RATE_SELECT", FieldSpec::sff_bits(false, A0, 0, 87, 5, 2));
    mm.add("RX2_RATE_SELECT", FieldSpec::sff_bits(false, A0, 0, 87, 3, 2));
    mm.add("RX1_RATE_SELECT", FieldSpec::sff_bits(false, A0, 0, 87, 1, 2));

    mm.add("TX_RATE_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 88, 1));
    mm.add("TX4_RATE_SELECT", FieldSpec::sff_bits(false, A0, 0, 88, 7, 2));
    mm.add("TX3_RATE_SELECT", FieldSpec::sff_bits(false, A0, 0, 88, 5, 2));
    mm.add("TX2_RATE_SELECT", FieldSpec::sff_bits(false, A0, 0, 88, 3, 2));
    mm.add("TX1_RATE_SELECT", FieldSpec::sff_bits(false, A0, 0, 88, 1, 2));

    mm.add("RX4_APPLICATION_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 89, 1));
    mm.add("RX3_APPLICATION_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 90, 1));
    mm.add("RX2_APPLICATION_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 91, 1));
    mm.add("RX1_APPLICATION_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 92, 1));

    mm.add("HIGH_POWER_CLASS_ENABLE", FieldSpec::sff_bits(false, A0, 0, 93, 2, 1));
    mm.add("POWER_SET", FieldSpec::sff_bits(false, A0, 0, 93, 1, 1));
    mm.add("POWER_OVERRIDE", FieldSpec::sff_bits(false, A0, 0, 93, 0, 1));

    mm.add("TX4_APPLICATION_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 94, 1));
    mm.add("TX3_APPLICATION_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 95, 1));
    mm.add("TX2_APPLICATION_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 96, 1));
    mm.add("TX1_APPLICATION_SELECT", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 97, 1));

    mm.add("TX_RX_CDR_CONTROL", FieldSpec::sff_bits(false, A0, 0, 98, 7, 8));
    mm.add("TX4_CDR_CONTROL", FieldSpec::sff_bits(false, A0, 0, 98, 7, 1));
    mm.add("TX3_CDR_CONTROL", FieldSpec::sff_bits(false, A0, 0, 98, 6, 1));
    mm.add("TX2_CDR_CONTROL", FieldSpec::sff_bits(false, A0, 0, 98, 5, 1));
    mm.add("TX1_CDR_CONTROL", FieldSpec::sff_bits(false, A0, 0, 98, 4, 1));
    mm.add("RX4_CDR_CONTROL", FieldSpec::sff_bits(false, A0, 0, 98, 3, 1));
    mm.add("RX3_CDR_CONTROL", FieldSpec::sff_bits(false, A0, 0, 98, 2, 1));
    mm.add("RX2_CDR_CONTROL", FieldSpec::sff_bits(false, A0, 0, 98, 1, 1));
    mm.add("RX1_CDR_CONTROL", FieldSpec::sff_bits(false, A0, 0, 98, 0, 1));

    // Free side device and channel masks (100..=104).
    mm.add("M_TX_RX_LOS", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 100, 1));
    mm.add("M_TX_ADAPT_EQ_FAULT", FieldSpec::sff_bits(false, A0, 0, 101, 7, 4));
    mm.add("M_TX_FAULT", FieldSpec::sff_bits(false, A0, 0, 101, 3, 4));
    mm.add("M_TX_RX_CDR_LOL", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 102, 1));
    mm.add("M_TEMP_ALARM_WARN", FieldSpec::sff_bits(false, A0, 0, 103, 7, 4));
    mm.add("M_VCC_ALARM_WARN", FieldSpec::sff_bits(false, A0, 0, 104, 7, 4));
    mm.add("VENDOR_SPECIFIC_105", FieldSpec::sff(false, Decoder::Bytes, A0, 0, 105, 2));

    // Free side device properties (108..=113).
    mm.add("PROPAGATION_DELAY", FieldSpec::sff(true, Decoder::UintTimes10, A0, 0, 108, 2));
    mm.add("ADVANCED_LOW_POWER_MODE", FieldSpec::sff_bits(true, A0, 0, 110, 7, 4));
    mm.add("FAR_SIDE_MANAGED", FieldSpec::sff_bits(true, A0, 0, 110, 2, 3));
    mm.add("FAR_END_IMPLEMENT", FieldSpec::sff_bits(true, A0, 0, 113, 6, 3));
    mm.add("NEAR_END_IMPLEMENT", FieldSpec::sff_bits(true, A0, 0, 113, 3, 4));

    // Passwords (119..=126) are write-only; the read side exists to give
    // the encoders a location and length.
    mm.add("PASSWORD_CHANGE", FieldSpec::sff(false, Decoder::Uint, A0, 0, 119, 4));
    mm.add("PASSWORD_ENTRY", FieldSpec::sff(false, Decoder::Uint, A0, 0, 123, 4));

    // Serial ID fields, upper page 0. Byte 128 repeats byte 0 per the
    // spec, so IDENTIFIER is only listed once.
    mm.add("EXT_IDENTIFIER", FieldSpec::sff(true, Decoder::Uint, A0, 0, 129, 1));
    mm.add("CONNECTOR", FieldSpec::sff(true, Decoder::Uint, A0, 0, 130, 1));
    mm.add("SPEC_COMPLIANCE", FieldSpec::sff(true, Decoder::Bytes, A0, 0, 131, 8));
    mm.add("ENCODING", FieldSpec::sff(true, Decoder::Uint, A0, 0, 139, 1));
    // The nominal rate's escape byte points at byte 222, so the read spans
    // bytes 140..=222.
    mm.add("BR_NOMINAL", FieldSpec::sff(true, Decoder::BitRate, A0, 0, 140, 83));
    mm.add("EXT_RATE_COMPLY", FieldSpec::sff_bits(true, A0, 0, 141, 0, 1));

    mm.add("LENGTH_SMF_KM", FieldSpec::sff(true, Decoder::LengthKm, A0, 0, 142, 1));
    mm.add("LENGTH_OM3_50UM", FieldSpec::sff(true, Decoder::Length2m, A0, 0, 143, 1));
    mm.add("LENGTH_OM2_50UM", FieldSpec::sff(true, Decoder::Uint, A0, 0, 144, 1));
    mm.add("LENGTH_OM1_62_5UM", FieldSpec::sff(true, Decoder::Uint, A0, 0, 145, 1));
    // Byte 146 is OM4 reach or copper length depending on the transmitter
    // technology nibble in byte 147.
    mm.add("LENGTH_OM4_OR_CU", FieldSpec::sff(true, Decoder::LengthOmCuQsfp, A0, 0, 146, 2));

    mm.add("DEVICE_TECH", FieldSpec::sff(true, Decoder::Bytes, A0, 0, 147, 1));
    mm.add("VENDOR_NAME", FieldSpec::sff(true, Decoder::Text, A0, 0, 148, 16));
    mm.add("EXTENDED_MODULE", FieldSpec::sff(true, Decoder::Bytes, A0, 0, 164, 1));
    mm.add("VENDOR_OUI", FieldSpec::sff(true, Decoder::Bytes, A0, 0, 165, 3));
    mm.add("VENDOR_PN", FieldSpec::sff(true, Decoder::Text, A0, 0, 168, 16));
    mm.add("VENDOR_REV", FieldSpec::sff(true, Decoder::Text, A0, 0, 184, 2));

    // Bytes 186..=187 hold a wavelength for optical modules and per-rate
    // attenuation for copper; all three keys start at the technology byte.
    mm.add("WAVELENGTH", FieldSpec::sff(true, Decoder::WavelengthQsfp, A0, 0, 147, 41));
    mm.add("CU_ATTENUATE_2_5", FieldSpec::sff(true, Decoder::CopperAttenuation2g5, A0, 0, 147, 40));
    mm.add("CU_ATTENUATE_5_0", FieldSpec::sff(true, Decoder::CopperAttenuation5g0, A0, 0, 147, 41));
    mm.add("WAVELEN_TOLERANCE", FieldSpec::sff(true, Decoder::WavelengthTolerance, A0, 0, 188, 2));
    mm.add("MAX_CASE_TEMP", FieldSpec::sff(true, Decoder::Uint, A0, 0, 190, 1));

    let mut fm = FunctionMap::new();
    fm.add(
        "SERIAL_ID",
        &[
            "IDENTIFIER",
            "EXT_IDENTIFIER",
            "CONNECTOR",
            "SPEC_COMPLIANCE",
            "ENCODING",
            "BR_NOMINAL",
            "EXT_RATE_COMPLY",
            "LENGTH_SMF_KM",
            "LENGTH_OM3_50UM",
            "LENGTH_OM2_50UM",
            "LENGTH_OM1_62_5UM",
            "LENGTH_OM4_OR_CU",
            "DEVICE_TECH",
            "VENDOR_NAME",
            "EXTENDED_MODULE",
            "VENDOR_OUI",
            "VENDOR_PN",
            "VENDOR_REV",
            "WAVELENGTH",
            "CU_ATTENUATE_2_5",
            "CU_ATTENUATE_5_0",
            "WAVELEN_TOLERANCE",
            "MAX_CASE_TEMP",
        ],
    );
    fm.add(
        "DOM",
        &[
            "TEMPERATURE",
            "SUPPLY_VOLTAGE",
            "TX1_BIAS",
            "TX2_BIAS",
            "TX3_BIAS",
            "TX4_BIAS",
            "TX1_POWER",
            "TX2_POWER",
            "TX3_POWER",
            "TX4_POWER",
            "RX1_POWER",
            "RX2_POWER",
            "RX3_POWER",
            "RX4_POWER",
        ],
    );

    let mut wm = WriteMap::new();
    wm.add("TX4_DISABLE", Encoder::SetBits);
    wm.add("TX3_DISABLE", Encoder::SetBits);
    wm.add("TX2_DISABLE", Encoder::SetBits);
    wm.add("TX1_DISABLE", Encoder::SetBits);
    wm.add("PASSWORD_CHANGE", Encoder::SetUint);
    wm.add("PASSWORD_ENTRY", Encoder::SetUint);

    let tables = ModuleTables {
        memory: mm,
        function: fm,
        write: wm,
    };
    if let Err(e) = tables.validate() {
        panic!("QSFP base tables are inconsistent: {e}");
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::tables;
    use crate::keymap::Location;
    use optomon_codec::Decoder;

    #[test]
    fn test_tables_validate() {
        let tables = tables();
        assert!(tables.validate().is_ok());
        assert_eq!(tables.function.get("DOM").unwrap().len(), 14);
    }

    #[test]
    fn test_rate_escape_spans_extended_byte() {
        // A field starting at byte 140 must reach byte 222 to cover the
        // extended rate byte.
        let spec = *tables().memory.get("BR_NOMINAL").unwrap();
        assert_eq!(spec.decoder, Decoder::BitRate);
        let Location::Sff { offset, len, .. } = spec.location else {
            panic!("BR_NOMINAL is not an SFF field");
        };
        assert_eq!(u16::from(offset) + u16::from(len), 223);
    }

    #[test]
    fn test_serial_id_is_static_monitors_are_not() {
        let tables = tables();
        assert!(tables.memory.get("VENDOR_PN").unwrap().cacheable);
        assert!(!tables.memory.get("RX3_POWER").unwrap().cacheable);
        // Latched interrupt flags clear on read.
        assert!(!tables.memory.get("L_TX2_LOS").unwrap().cacheable);
    }

    #[test]
    fn test_per_lane_disable_bits() {
        let tables = tables();
        for (key, expected_bit) in
            [("TX1_DISABLE", 0), ("TX2_DISABLE", 1), ("TX3_DISABLE", 2), ("TX4_DISABLE", 3)]
        {
            let spec = tables.memory.get(key).unwrap();
            let bits = spec.bits.unwrap();
            assert_eq!(bits.count(), 1, "{key}");
            assert_eq!(bits.offset(), expected_bit, "{key}");
            assert!(tables.write.get(key).is_some(), "{key} must be writable");
        }
    }
}
