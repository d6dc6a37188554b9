// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Unit declarations of the host model
//!
//! The host stores every numeric parameter in a fixed internal unit per
//! physical quantity. [`HostUnits`] declares how each of those converts to
//! the unit written to the IFC file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Physical quantity a numeric value is measured in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UnitKind {
    Length,
    Area,
    Volume,
    PlaneAngle,
    Count,
    Power,
    ThermodynamicTemperature,
    ThermalTransmittance,
    Pressure,
    Force,
    ElectricCurrent,
    ElectricVoltage,
    LuminousFlux,
    LuminousIntensity,
    Illuminance,
    MassDensity,
    Mass,
    LinearVelocity,
    VolumetricFlowRate,
    ColorTemperature,
    ElectricalEfficacy,
    Frequency,
    Currency,
    Time,
}

/// Linear conversion from a host internal unit to an export unit
///
/// `export = internal * scale + offset`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitConversion {
    pub scale: f64,
    #[serde(default)]
    pub offset: f64,
}

impl UnitConversion {
    /// No conversion
    pub const IDENTITY: UnitConversion = UnitConversion {
        scale: 1.0,
        offset: 0.0,
    };

    /// Pure scale factor
    pub fn scale(scale: f64) -> Self {
        Self { scale, offset: 0.0 }
    }

    /// Scale factor with an additive offset (temperatures)
    pub fn affine(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }
}

impl Default for UnitConversion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Common unit scales for reference, in metres
pub mod scales {
    /// Meters to meters (identity)
    pub const METRE: f64 = 1.0;
    /// Millimeters to meters
    pub const MILLIMETRE: f64 = 0.001;
    /// Centimeters to meters
    pub const CENTIMETRE: f64 = 0.01;
    /// Inches to meters
    pub const INCH: f64 = 0.0254;
    /// Feet to meters
    pub const FOOT: f64 = 0.3048;
    /// Kelvin to degrees Celsius offset
    pub const KELVIN_TO_CELSIUS: f64 = -273.15;
}

/// Length unit of the exported file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LengthUnit {
    #[default]
    Millimetre,
    Centimetre,
    Metre,
    Foot,
    Inch,
}

impl LengthUnit {
    /// Size of one unit in metres
    pub fn metres(&self) -> f64 {
        match self {
            LengthUnit::Millimetre => scales::MILLIMETRE,
            LengthUnit::Centimetre => scales::CENTIMETRE,
            LengthUnit::Metre => scales::METRE,
            LengthUnit::Foot => scales::FOOT,
            LengthUnit::Inch => scales::INCH,
        }
    }
}

/// Angle unit of the exported file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AngleUnit {
    #[default]
    Degree,
    Radian,
}

/// Temperature unit of the exported file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TemperatureUnit {
    Kelvin,
    #[default]
    Celsius,
    Fahrenheit,
}

/// Per-quantity conversions declared by the host at session start
///
/// Quantities without a declaration are exported unconverted.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct HostUnits {
    conversions: BTreeMap<UnitKind, UnitConversion>,
}

impl HostUnits {
    /// Every quantity exported as stored
    pub fn identity() -> Self {
        Self::default()
    }

    /// Imperial internal storage (feet, radians, Kelvin) exported as
    /// millimetres, square and cubic metres, degrees and Celsius
    pub fn metric() -> Self {
        Self::identity()
            .with_length(LengthUnit::Millimetre)
            .with_conversion(UnitKind::Area, UnitConversion::scale(scales::FOOT * scales::FOOT))
            .with_conversion(
                UnitKind::Volume,
                UnitConversion::scale(scales::FOOT * scales::FOOT * scales::FOOT),
            )
            .with_angle(AngleUnit::Degree)
            .with_temperature(TemperatureUnit::Celsius)
    }

    /// Declare the conversion for one quantity
    pub fn with_conversion(mut self, kind: UnitKind, conversion: UnitConversion) -> Self {
        self.conversions.insert(kind, conversion);
        self
    }

    /// Export lengths (stored in feet) in `unit`
    pub fn with_length(self, unit: LengthUnit) -> Self {
        self.with_conversion(
            UnitKind::Length,
            UnitConversion::scale(scales::FOOT / unit.metres()),
        )
    }

    /// Export angles (stored in radians) in `unit`
    pub fn with_angle(self, unit: AngleUnit) -> Self {
        let conversion = match unit {
            AngleUnit::Degree => UnitConversion::scale(180.0 / std::f64::consts::PI),
            AngleUnit::Radian => UnitConversion::IDENTITY,
        };
        self.with_conversion(UnitKind::PlaneAngle, conversion)
    }

    /// Export temperatures (stored in Kelvin) in `unit`
    ///
    /// Colour temperatures stay in Kelvin.
    pub fn with_temperature(self, unit: TemperatureUnit) -> Self {
        let conversion = match unit {
            TemperatureUnit::Kelvin => UnitConversion::IDENTITY,
            TemperatureUnit::Celsius => UnitConversion::affine(1.0, scales::KELVIN_TO_CELSIUS),
            TemperatureUnit::Fahrenheit => UnitConversion::affine(1.8, -459.67),
        };
        self.with_conversion(UnitKind::ThermodynamicTemperature, conversion)
    }

    /// Conversion for `kind`, identity when undeclared
    pub fn conversion(&self, kind: UnitKind) -> UnitConversion {
        self.conversions.get(&kind).copied().unwrap_or_default()
    }

    /// Iterate over the declared conversions
    pub fn iter(&self) -> impl Iterator<Item = (UnitKind, UnitConversion)> + '_ {
        self.conversions.iter().map(|(k, v)| (*k, *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_scales() {
        assert!((scales::MILLIMETRE - 0.001).abs() < 1e-10);
        assert!((scales::INCH - 0.0254).abs() < 1e-10);
        assert!((scales::FOOT - 0.3048).abs() < 1e-10);
    }

    #[test]
    fn test_metric_length_is_feet_to_millimetres() {
        let units = HostUnits::metric();
        assert!((units.conversion(UnitKind::Length).scale - 304.8).abs() < 1e-9);
    }

    #[test]
    fn test_undeclared_is_identity() {
        let units = HostUnits::metric();
        assert_eq!(units.conversion(UnitKind::Power), UnitConversion::IDENTITY);
    }
}
