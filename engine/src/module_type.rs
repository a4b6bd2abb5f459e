// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! The transceiver module-type code and its device-class mapping.

use optomon_southbound::DeviceClass;
use std::fmt;

/// The kind of module in a port, read from its fixed identity byte.
///
/// I2C-class devices report codes `0x00..=0x17` per SFF-8024. CFP-class
/// devices use the CFP MSA identifier table, whose values overlap the
/// SFF-8024 range; those codes carry an offset of 0x100 here so that a
/// single enum covers both families without collision.
///
/// `Invalid` and `NotPresent` are sentinels with no on-module encoding: a
/// port holding one of these has no field tables at all.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(
    any(feature = "api-traits", test),
    derive(schemars::JsonSchema, serde::Deserialize, serde::Serialize)
)]
#[cfg_attr(any(feature = "api-traits", test), serde(rename_all = "snake_case"))]
pub enum ModuleType {
    Unknown,
    Gbic,
    Soldered,
    Sfp,
    Xbi,
    Xenpak,
    Xfp,
    Xff,
    XfpE,
    Xpak,
    X2,
    DwdmSfp,
    Qsfp,
    QsfpPlus,
    Cxp,
    ShieldedMiniHd4x,
    ShieldedMiniHd8x,
    Qsfp28,
    Cxp2,
    Cdfp,
    ShieldedMiniHd4xFanout,
    ShieldedMiniHd8xFanout,
    CdfpStyle3,
    MicroQsfp,
    Cfp,
    Cfp168Pin5x7,
    Cfp2,
    Cfp4,
    Cfp168Pin4x5,
    Cfp2Aco,
    /// A code with no assigned name in either identifier table.
    Other(u16),
    /// The port reported a module but its identity is unusable.
    Invalid,
    /// No module is seated in the port.
    NotPresent,
}

impl ModuleType {
    /// Map an identity code to a module type. CFP-class codes must already
    /// carry the 0x100 offset.
    pub fn from_code(code: u16) -> Self {
        use ModuleType::*;
        match code {
            0x00 => Unknown,
            0x01 => Gbic,
            0x02 => Soldered,
            0x03 => Sfp,
            0x04 => Xbi,
            0x05 => Xenpak,
            0x06 => Xfp,
            0x07 => Xff,
            0x08 => XfpE,
            0x09 => Xpak,
            0x0A => X2,
            0x0B => DwdmSfp,
            0x0C => Qsfp,
            0x0D => QsfpPlus,
            0x0E => Cxp,
            0x0F => ShieldedMiniHd4x,
            0x10 => ShieldedMiniHd8x,
            0x11 => Qsfp28,
            0x12 => Cxp2,
            0x13 => Cdfp,
            0x14 => ShieldedMiniHd4xFanout,
            0x15 => ShieldedMiniHd8xFanout,
            0x16 => CdfpStyle3,
            0x17 => MicroQsfp,
            0x10E => Cfp,
            0x110 => Cfp168Pin5x7,
            0x111 => Cfp2,
            0x112 => Cfp4,
            0x113 => Cfp168Pin4x5,
            0x114 => Cfp2Aco,
            x => Other(x),
        }
    }

    /// The identity code, or `None` for the sentinels.
    pub fn code(&self) -> Option<u16> {
        use ModuleType::*;
        match self {
            Unknown => Some(0x00),
            Gbic => Some(0x01),
            Soldered => Some(0x02),
            Sfp => Some(0x03),
            Xbi => Some(0x04),
            Xenpak => Some(0x05),
            Xfp => Some(0x06),
            Xff => Some(0x07),
            XfpE => Some(0x08),
            Xpak => Some(0x09),
            X2 => Some(0x0A),
            DwdmSfp => Some(0x0B),
            Qsfp => Some(0x0C),
            QsfpPlus => Some(0x0D),
            Cxp => Some(0x0E),
            ShieldedMiniHd4x => Some(0x0F),
            ShieldedMiniHd8x => Some(0x10),
            Qsfp28 => Some(0x11),
            Cxp2 => Some(0x12),
            Cdfp => Some(0x13),
            ShieldedMiniHd4xFanout => Some(0x14),
            ShieldedMiniHd8xFanout => Some(0x15),
            CdfpStyle3 => Some(0x16),
            MicroQsfp => Some(0x17),
            Cfp => Some(0x10E),
            Cfp168Pin5x7 => Some(0x110),
            Cfp2 => Some(0x111),
            Cfp4 => Some(0x112),
            Cfp168Pin4x5 => Some(0x113),
            Cfp2Aco => Some(0x114),
            Other(x) => Some(*x),
            Invalid | NotPresent => None,
        }
    }

    /// The addressing discipline for this module type, or `None` for the
    /// sentinels.
    pub fn device_class(&self) -> Option<DeviceClass> {
        match self.code() {
            Some(code) if code >= 0x100 => Some(DeviceClass::Cfp),
            Some(_) => Some(DeviceClass::Sff),
            None => None,
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ModuleType::*;
        match self {
            Unknown => write!(f, "Unknown or unspecified"),
            Gbic => write!(f, "GBIC"),
            Soldered => write!(f, "Module soldered to motherboard"),
            Sfp => write!(f, "SFP/SFP+/SFP28"),
            Xbi => write!(f, "300-pin XBI"),
            Xenpak => write!(f, "XENPAK"),
            Xfp => write!(f, "XFP"),
            Xff => write!(f, "XFF"),
            XfpE => write!(f, "XFP-E"),
            Xpak => write!(f, "XPAK"),
            X2 => write!(f, "X2"),
            DwdmSfp => write!(f, "DWDM-SFP/SFP+"),
            Qsfp => write!(f, "QSFP"),
            QsfpPlus => write!(f, "QSFP+"),
            Cxp => write!(f, "CXP"),
            ShieldedMiniHd4x => write!(f, "Shielded mini multi-lane HD 4X"),
            ShieldedMiniHd8x => write!(f, "Shielded mini multi-lane HD 8X"),
            Qsfp28 => write!(f, "QSFP28"),
            Cxp2 => write!(f, "CXP2"),
            Cdfp => write!(f, "CDFP (Style 1 or 2)"),
            ShieldedMiniHd4xFanout => write!(f, "Shielded mini multi-lane HD 4X fanout"),
            ShieldedMiniHd8xFanout => write!(f, "Shielded mini multi-lane HD 8X fanout"),
            CdfpStyle3 => write!(f, "CDFP (Style 3)"),
            MicroQsfp => write!(f, "MicroQSFP"),
            Cfp => write!(f, "CFP"),
            Cfp168Pin5x7 => write!(f, "168-pin 5x7"),
            Cfp2 => write!(f, "CFP2"),
            Cfp4 => write!(f, "CFP4"),
            Cfp168Pin4x5 => write!(f, "168-pin 4x5"),
            Cfp2Aco => write!(f, "CFP2-ACO"),
            Other(x) => write!(f, "Unnamed module type ({x:#05x})"),
            Invalid => write!(f, "Invalid"),
            NotPresent => write!(f, "Not present"),
        }
    }
}
