// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! The base field tables, one set per module family.
//!
//! Module types within a family share a management map: every QSFP variant
//! speaks SFF-8636, every CFP variant speaks the CFP MSA register layout.
//! Tables are built once, validated, and shared; each port clones its
//! family's set so addons can extend one port without touching another.

use crate::keymap::ModuleTables;
use crate::module_type::ModuleType;
use std::sync::OnceLock;

mod cfp;
mod qsfp;
mod sfp;

/// The EEPROM I2C address of SFF-style modules.
pub(crate) const A0: u8 = 0xA0;

/// The diagnostics I2C address of SFP modules (SFF-8472 only).
pub(crate) const A2: u8 = 0xA2;

/// The base tables for a module type, or `None` for types without a
/// supported management map.
pub(crate) fn base_tables(module_type: ModuleType) -> Option<&'static ModuleTables> {
    static SFP: OnceLock<ModuleTables> = OnceLock::new();
    static QSFP: OnceLock<ModuleTables> = OnceLock::new();
    static CFP: OnceLock<ModuleTables> = OnceLock::new();
    match module_type {
        ModuleType::Sfp | ModuleType::DwdmSfp => Some(SFP.get_or_init(sfp::tables)),
        ModuleType::QsfpPlus | ModuleType::Qsfp28 => Some(QSFP.get_or_init(qsfp::tables)),
        ModuleType::Cfp
        | ModuleType::Cfp168Pin5x7
        | ModuleType::Cfp2
        | ModuleType::Cfp4
        | ModuleType::Cfp168Pin4x5
        | ModuleType::Cfp2Aco => Some(CFP.get_or_init(cfp::tables)),
        _ => None,
    }
}
