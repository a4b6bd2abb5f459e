// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Key-driven decode of transceiver module memory maps.
//!
//! This crate is the northbound face of the system. Applications call
//! [`enumerate`] to build a [`Port`] per physical port, then deal entirely in
//! named fields ("TEMPERATURE", "VENDOR_SN") and bundles ("DOM",
//! "SERIAL_ID"): the per-module-type field tables map names to byte
//! locations, a per-port page cache bounds the raw hardware traffic, and the
//! codec crate turns the bytes into physical values.
//!
//! Everything here is synchronous and single-threaded: a [`Port`] owns its
//! cache exclusively and must not be shared across threads without external
//! coordination. Callers wanting to poll ports in parallel should give each
//! port its own backend handle.

use thiserror::Error;

mod addon;
mod cache;
mod keymap;
mod module_type;
mod port;
mod tables;

pub use addon::Addon;
pub use addon::AddonRegistry;
pub use keymap::FieldSpec;
pub use keymap::FunctionMap;
pub use keymap::Location;
pub use keymap::MemoryMap;
pub use keymap::ModuleTables;
pub use keymap::TableError;
pub use keymap::WriteMap;
pub use module_type::ModuleType;
pub use optomon_codec::BitRange;
pub use optomon_codec::Decoder;
pub use optomon_codec::Encoder;
pub use optomon_codec::Value;
pub use port::enumerate;
pub use port::BundleEntry;
pub use port::Port;

/// An error from a northbound field or bundle operation.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    #[error("No such field key: \"{0}\"")]
    KeyNotFound(String),

    #[error("No such bundle: \"{0}\"")]
    BundleNotFound(String),

    #[error("Field \"{0}\" is not writable")]
    NotWritable(String),

    #[error("Value rejected for field \"{key}\"")]
    InvalidValue {
        key: String,
        #[source]
        source: optomon_codec::Error,
    },

    #[error("Failed to decode field \"{key}\"")]
    Decode {
        key: String,
        #[source]
        source: optomon_codec::Error,
    },

    #[error("Southbound transport error")]
    Transport(#[from] optomon_southbound::Error),
}
