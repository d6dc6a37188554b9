// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit scaling between host internal units and export units

use ifc_lite_model::{HostUnits, PropertyKind, UnitConversion, UnitKind};
use rustc_hash::FxHashMap;

/// Converts raw host values into the units written to the IFC file
///
/// Built once per session from the host's declared units and never
/// changed afterwards.
#[derive(Clone, Debug, Default)]
pub struct UnitScaler {
    conversions: FxHashMap<UnitKind, UnitConversion>,
}

impl UnitScaler {
    /// Create a scaler from the host's unit declarations
    pub fn new(units: &HostUnits) -> Self {
        Self {
            conversions: units.iter().collect(),
        }
    }

    /// Scaler that leaves every value untouched
    pub fn identity() -> Self {
        Self::default()
    }

    fn conversion(&self, kind: UnitKind) -> UnitConversion {
        self.conversions.get(&kind).copied().unwrap_or_default()
    }

    /// Convert a host internal value to the export unit
    pub fn scale(&self, kind: UnitKind, value: f64) -> f64 {
        let c = self.conversion(kind);
        value * c.scale + c.offset
    }

    /// Convert an export value back to the host internal unit
    pub fn unscale(&self, kind: UnitKind, value: f64) -> f64 {
        let c = self.conversion(kind);
        if c.scale == 0.0 {
            return value;
        }
        (value - c.offset) / c.scale
    }

    /// Scale a value of a property kind; kinds without a unit pass through
    pub fn scale_property(&self, kind: PropertyKind, value: f64) -> f64 {
        match kind.unit_kind() {
            Some(unit) => self.scale(unit, value),
            None => value,
        }
    }

    /// Export length of one host length unit
    pub fn length_scale(&self) -> f64 {
        self.conversion(UnitKind::Length).scale
    }
}
