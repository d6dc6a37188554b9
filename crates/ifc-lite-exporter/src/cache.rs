// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session cache of created property values
//!
//! Thousands of elements share a handful of common values (zero, small
//! integers, round lengths, multiples of 15 degrees). Values that fall on a
//! kind-specific grid are keyed by their grid index so that the same IFC
//! property entity is reused. Anything off the grid is never cached.

use crate::units::UnitScaler;
use ifc_lite_model::{EntityId, PropertyKind, UnitKind};
use rustc_hash::FxHashMap;

/// Tolerance used for every grid comparison
pub const EPSILON: f64 = 1e-6;

/// Grid step for plane angles, in radians (15 degrees)
const ANGLE_STEP: f64 = std::f64::consts::PI / 12.0;

/// Quantized cache key
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Index on the kind's grid (or the exact integer / boolean)
    Number(i64),
    /// Exact string
    Text(String),
}

/// A value snapped onto its kind's grid
#[derive(Clone, Debug, PartialEq)]
pub struct Quantized {
    pub key: CacheKey,
    /// Snapped value in export units
    pub value: f64,
}

/// Hit/miss counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

/// Memoization tables, one per kind: property name -> key -> property entity
#[derive(Debug, Default)]
pub struct ValueCache {
    tables: FxHashMap<PropertyKind, FxHashMap<String, FxHashMap<CacheKey, EntityId>>>,
    hits: usize,
    misses: usize,
}

impl ValueCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously created property
    pub fn find(&mut self, kind: PropertyKind, name: &str, key: &CacheKey) -> Option<EntityId> {
        let found = self
            .tables
            .get(&kind)
            .and_then(|names| names.get(name))
            .and_then(|keys| keys.get(key))
            .copied();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    /// Remember a created property
    pub fn add(&mut self, kind: PropertyKind, name: &str, key: CacheKey, id: EntityId) {
        self.tables
            .entry(kind)
            .or_default()
            .entry(name.to_string())
            .or_default()
            .insert(key, id);
    }

    /// Number of cached values
    pub fn len(&self) -> usize {
        self.tables
            .values()
            .flat_map(|names| names.values())
            .map(|keys| keys.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.len(),
        }
    }
}

/// Snap `value` to the nearest multiple of `step`, if within tolerance
fn on_grid(value: f64, step: f64) -> Option<i64> {
    let n = (value / step).round();
    if (value - n * step).abs() < EPSILON {
        Some(n as i64)
    } else {
        None
    }
}

/// Quantize a numeric value for caching
///
/// `raw` is the host internal value and `scaled` the export value. Lengths
/// and angles are quantized on the internal value, everything else on the
/// export value. Returns `None` when the value must not be cached.
pub fn quantize(
    kind: PropertyKind,
    raw: f64,
    scaled: f64,
    scaler: &UnitScaler,
) -> Option<Quantized> {
    match kind {
        PropertyKind::Real => {
            if scaled.abs() < EPSILON {
                return Some(Quantized {
                    key: CacheKey::Number(0),
                    value: 0.0,
                });
            }
            if !(0.0..=10.0).contains(&scaled) {
                return None;
            }
            on_grid(scaled, 0.5).map(|n| Quantized {
                key: CacheKey::Number(n),
                value: n as f64 * 0.5,
            })
        }
        PropertyKind::Length | PropertyKind::PositiveLength => {
            // Both windows share the 0.05 index so keys never collide
            let n = if raw.abs() <= 10.0 {
                on_grid(raw, 0.05)?
            } else if raw.abs() <= 10000.0 {
                on_grid(raw, 50.0)? * 1000
            } else {
                return None;
            };
            Some(Quantized {
                key: CacheKey::Number(n),
                value: scaler.scale(UnitKind::Length, n as f64 * 0.05),
            })
        }
        PropertyKind::PlaneAngle | PropertyKind::PositivePlaneAngle => {
            on_grid(raw, ANGLE_STEP).map(|n| Quantized {
                key: CacheKey::Number(n),
                value: scaler.scale(UnitKind::PlaneAngle, n as f64 * ANGLE_STEP),
            })
        }
        PropertyKind::Power => {
            if scaled < -EPSILON || scaled > 300.0 + EPSILON {
                return None;
            }
            on_grid(scaled, 5.0).map(|n| Quantized {
                key: CacheKey::Number(n),
                value: n as f64 * 5.0,
            })
        }
        PropertyKind::ThermodynamicTemperature => on_grid(scaled, 0.5).map(|n| Quantized {
            key: CacheKey::Number(n),
            value: n as f64 * 0.5,
        }),
        PropertyKind::ThermalTransmittance => {
            if scaled < -EPSILON || scaled > 6.0 + EPSILON {
                return None;
            }
            on_grid(scaled, 0.05).map(|n| Quantized {
                key: CacheKey::Number(n),
                value: n as f64 * 0.05,
            })
        }
        _ => None,
    }
}

/// Cache key for an integer value, only small integers are cached
pub fn integer_key(value: i64) -> Option<CacheKey> {
    (-10..=10).contains(&value).then_some(CacheKey::Number(value))
}

/// Cache key for a string value
///
/// Text is only cached when empty. Labels and identifiers are also cached
/// when they name a referenced element, since those repeat across elements.
pub fn text_key(kind: PropertyKind, value: &str, from_element_reference: bool) -> Option<CacheKey> {
    let cacheable = value.is_empty()
        || (from_element_reference
            && matches!(kind, PropertyKind::Label | PropertyKind::Identifier));
    cacheable.then(|| CacheKey::Text(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ifc_lite_model::HostUnits;

    fn metric() -> UnitScaler {
        UnitScaler::new(&HostUnits::metric())
    }

    fn angle(degrees: f64) -> Option<Quantized> {
        let scaler = metric();
        let raw = degrees.to_radians();
        quantize(
            PropertyKind::PlaneAngle,
            raw,
            scaler.scale(UnitKind::PlaneAngle, raw),
            &scaler,
        )
    }

    #[test]
    fn test_angle_grid() {
        let a = angle(15.0).unwrap();
        let b = angle(14.99999).unwrap();
        let c = angle(14.999999999).unwrap();
        assert_eq!(a.key, b.key);
        assert_eq!(a.key, c.key);
        assert_relative_eq!(b.value, 15.0, epsilon = 1e-9);
        assert!(angle(7.4).is_none());
        assert_eq!(angle(0.0).unwrap().key, CacheKey::Number(0));
    }

    #[test]
    fn test_length_windows() {
        let scaler = metric();
        let small = quantize(PropertyKind::Length, 0.25, 76.2, &scaler).unwrap();
        assert_eq!(small.key, CacheKey::Number(5));
        assert_relative_eq!(small.value, 76.2, epsilon = 1e-9);

        let large = quantize(PropertyKind::Length, 150.0, 45720.0, &scaler).unwrap();
        assert_eq!(large.key, CacheKey::Number(3000));

        assert!(quantize(PropertyKind::Length, 0.26, 79.248, &scaler).is_none());
        assert!(quantize(PropertyKind::Length, 120.0, 36576.0, &scaler).is_none());
        assert!(quantize(PropertyKind::Length, 20000.0, 0.0, &scaler).is_none());
    }

    #[test]
    fn test_real_window() {
        let scaler = UnitScaler::identity();
        assert!(quantize(PropertyKind::Real, 2.5, 2.5, &scaler).is_some());
        assert!(quantize(PropertyKind::Real, 12.0, 12.0, &scaler).is_none());
        assert!(quantize(PropertyKind::Real, -1.0, -1.0, &scaler).is_none());
        assert!(quantize(PropertyKind::Real, 1e-9, 1e-9, &scaler).is_some());
    }

    #[test]
    fn test_power_and_transmittance_windows() {
        let scaler = UnitScaler::identity();
        assert!(quantize(PropertyKind::Power, 250.0, 250.0, &scaler).is_some());
        assert!(quantize(PropertyKind::Power, 305.0, 305.0, &scaler).is_none());
        assert!(quantize(PropertyKind::Power, 12.0, 12.0, &scaler).is_none());
        assert!(quantize(PropertyKind::ThermalTransmittance, 0.35, 0.35, &scaler).is_some());
        assert!(quantize(PropertyKind::ThermalTransmittance, 6.5, 6.5, &scaler).is_none());
    }

    #[test]
    fn test_uncached_kinds() {
        let scaler = UnitScaler::identity();
        assert!(quantize(PropertyKind::Area, 10.0, 10.0, &scaler).is_none());
        assert!(quantize(PropertyKind::Volume, 0.0, 0.0, &scaler).is_none());
    }

    #[test]
    fn test_integer_and_text_keys() {
        assert!(integer_key(10).is_some());
        assert!(integer_key(-11).is_none());
        assert!(text_key(PropertyKind::Text, "", false).is_some());
        assert!(text_key(PropertyKind::Text, "Door", true).is_none());
        assert!(text_key(PropertyKind::Label, "Door", false).is_none());
        assert!(text_key(PropertyKind::Label, "Door", true).is_some());
    }

    #[test]
    fn test_cache_counts_hits() {
        let mut cache = ValueCache::new();
        let key = CacheKey::Number(1);
        assert!(cache.find(PropertyKind::Real, "Factor", &key).is_none());
        cache.add(PropertyKind::Real, "Factor", key.clone(), EntityId(4));
        assert_eq!(cache.find(PropertyKind::Real, "Factor", &key), Some(EntityId(4)));
        assert!(cache.find(PropertyKind::Real, "Other", &key).is_none());
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 2,
                entries: 1
            }
        );
    }
}
