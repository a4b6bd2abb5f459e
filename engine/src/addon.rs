// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Copyright 2024 Oxide Computer Company

//! Vendor addons: hooks that extend a port's field tables at construction.
//!
//! The base tables cover only what the governing standards mandate. Vendors
//! routinely define extra registers, and an [`Addon`] is how knowledge of
//! those gets in: it inspects the freshly-built port (module type, decoded
//! identity fields) and merges additional table entries. Addons run once,
//! in registration order, after the base tables are installed; a key
//! collision resolves in favor of the addon, and between addons in favor of
//! the one registered last.

use crate::port::Port;

/// A hook extending one port's field tables.
pub trait Addon {
    fn extend(&self, port: &mut Port);
}

impl<F> Addon for F
where
    F: Fn(&mut Port),
{
    fn extend(&self, port: &mut Port) {
        self(port)
    }
}

/// The ordered set of addons applied to every enumerated port.
#[derive(Default)]
pub struct AddonRegistry {
    addons: Vec<Box<dyn Addon>>,
}

impl AddonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, addon: impl Addon + 'static) {
        self.addons.push(Box::new(addon));
    }

    pub fn len(&self) -> usize {
        self.addons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addons.is_empty()
    }

    pub(crate) fn apply(&self, port: &mut Port) {
        for addon in &self.addons {
            addon.extend(port);
        }
    }
}
