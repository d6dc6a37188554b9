// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property value factory
//!
//! Turns raw host values into IFC properties: converts to the requested
//! kind, scales to export units, enforces value domains and reuses cached
//! property entities where the value is on its kind's grid.
//!
//! Absent or out-of-domain values yield `Ok(None)` and the property is
//! simply left out. Only kind/representation pairs without a handler are
//! errors.

use crate::cache::{self, CacheKey, CacheStats, ValueCache, EPSILON};
use crate::enumeration::Enumeration;
use crate::units::UnitScaler;
use ifc_lite_model::{
    EntityId, ExportError, IfcClassificationReference, IfcEnumeration, IfcProperty, IfcQuantity,
    IfcSchema, IfcValue, IfcWriter, Logical, ParameterValue, PropertyData, PropertyKind,
    QuantityType, Result, ValueRepresentation,
};
use rustc_hash::FxHashMap;

/// A host value on its way to becoming an IFC property
///
/// Doubles are in host internal units.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RawValue {
    pub value: ParameterValue,
    /// Value as formatted by the host
    pub display: Option<String>,
    /// Name of the referenced element, for element-id values
    pub referenced_name: Option<String>,
}

impl RawValue {
    pub fn new(value: ParameterValue) -> Self {
        Self {
            value,
            display: None,
            referenced_name: None,
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ParameterValue::String(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::new(ParameterValue::Integer(value))
    }

    pub fn double(value: f64) -> Self {
        Self::new(ParameterValue::Double(value))
    }

    /// Booleans are stored as 0/1 integers, as the host does
    pub fn boolean(value: bool) -> Self {
        Self::integer(value as i64)
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_referenced_name(mut self, name: impl Into<String>) -> Self {
        self.referenced_name = Some(name.into());
        self
    }

    /// Whether this value came from an element-id parameter
    pub fn is_element_reference(&self) -> bool {
        matches!(self.value, ParameterValue::ElementId(_))
    }

    /// String form for textual kinds
    pub fn as_text(&self) -> Option<String> {
        match &self.value {
            ParameterValue::None => None,
            ParameterValue::String(s) => Some(s.clone()),
            ParameterValue::Integer(i) => {
                Some(self.display.clone().unwrap_or_else(|| i.to_string()))
            }
            ParameterValue::Double(d) => {
                Some(self.display.clone().unwrap_or_else(|| d.to_string()))
            }
            ParameterValue::ElementId(id) => match &self.referenced_name {
                Some(name) => Some(name.clone()),
                None if id.is_valid() => Some(id.to_string()),
                None => None,
            },
        }
    }

    /// Numeric form for measure kinds
    pub fn as_number(&self) -> Option<f64> {
        let value = match &self.value {
            ParameterValue::Double(d) => *d,
            ParameterValue::Integer(i) => *i as f64,
            ParameterValue::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Integer form; doubles must be integral
    pub fn as_integer(&self) -> Option<i64> {
        match &self.value {
            ParameterValue::Integer(i) => Some(*i),
            ParameterValue::Double(d) => {
                let rounded = d.round();
                ((d - rounded).abs() < EPSILON).then_some(rounded as i64)
            }
            ParameterValue::String(s) => {
                let trimmed = s.trim();
                trimmed.parse::<i64>().ok().or_else(|| {
                    let d = trimmed.parse::<f64>().ok()?;
                    ((d - d.round()).abs() < EPSILON).then_some(d.round() as i64)
                })
            }
            _ => None,
        }
    }

    /// Boolean form: non-zero integers and yes/no style strings
    pub fn as_boolean(&self) -> Option<bool> {
        match &self.value {
            ParameterValue::Integer(i) => Some(*i != 0),
            ParameterValue::Double(d) => Some(d.abs() > EPSILON),
            ParameterValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "t" | "y" | "1" => Some(true),
                "false" | "no" | "f" | "n" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Logical form; integers other than 0/1 and "unknown" are UNKNOWN
    pub fn as_logical(&self) -> Option<Logical> {
        match &self.value {
            ParameterValue::Integer(0) => Some(Logical::False),
            ParameterValue::Integer(1) => Some(Logical::True),
            ParameterValue::Integer(_) => Some(Logical::Unknown),
            ParameterValue::String(s)
                if matches!(s.trim().to_ascii_lowercase().as_str(), "unknown" | "u") =>
            {
                Some(Logical::Unknown)
            }
            _ => self.as_boolean().map(Logical::from),
        }
    }
}

impl From<ParameterValue> for RawValue {
    fn from(value: ParameterValue) -> Self {
        Self::new(value)
    }
}

/// Creates IFC properties and quantities for one export session
pub struct PropertyValueFactory {
    schema: IfcSchema,
    scaler: UnitScaler,
    cache: ValueCache,
    /// Enumeration name -> IfcPropertyEnumeration
    enumerations: FxHashMap<String, EntityId>,
}

impl PropertyValueFactory {
    pub fn new(schema: IfcSchema, scaler: UnitScaler) -> Self {
        Self {
            schema,
            scaler,
            cache: ValueCache::new(),
            enumerations: FxHashMap::default(),
        }
    }

    pub fn schema(&self) -> IfcSchema {
        self.schema
    }

    pub fn scaler(&self) -> &UnitScaler {
        &self.scaler
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Check that a kind/representation pair has a handler
    pub fn check_supported(
        name: &str,
        kind: PropertyKind,
        representation: ValueRepresentation,
        enumeration: Option<&Enumeration>,
    ) -> Result<()> {
        let supported = match representation {
            ValueRepresentation::Single => true,
            ValueRepresentation::Enumerated => kind.is_textual() && enumeration.is_some(),
            ValueRepresentation::List => kind != PropertyKind::ClassificationReference,
        };
        if supported {
            Ok(())
        } else {
            Err(ExportError::unsupported(name, kind, representation))
        }
    }

    /// Create a property from a raw value
    ///
    /// Returns `Ok(None)` when the value is absent or outside the kind's
    /// domain.
    pub fn create(
        &mut self,
        writer: &mut dyn IfcWriter,
        kind: PropertyKind,
        name: &str,
        raw: &RawValue,
        representation: ValueRepresentation,
        enumeration: Option<&Enumeration>,
    ) -> Result<Option<EntityId>> {
        Self::check_supported(name, kind, representation, enumeration)?;
        match (representation, enumeration) {
            (ValueRepresentation::Enumerated, Some(enumeration)) => {
                Ok(self.create_enumerated(writer, name, raw, enumeration))
            }
            (ValueRepresentation::List, _) => Ok(self.create_list(writer, kind, name, raw)),
            _ if kind == PropertyKind::ClassificationReference => {
                Ok(self.create_reference(writer, name, raw))
            }
            _ => Ok(self.create_single(writer, kind, name, raw)),
        }
    }

    fn create_single(
        &mut self,
        writer: &mut dyn IfcWriter,
        kind: PropertyKind,
        name: &str,
        raw: &RawValue,
    ) -> Option<EntityId> {
        let (value, key) = match self.convert(kind, raw) {
            Some(converted) => converted,
            None => {
                log::debug!("property '{}' omitted: no {:?} value", name, kind);
                return None;
            }
        };

        if let Some(key) = &key {
            if let Some(id) = self.cache.find(kind, name, key) {
                return Some(id);
            }
        }

        let id = writer.add_property(IfcProperty::single(name, value));
        if let Some(key) = key {
            self.cache.add(kind, name, key, id);
        }
        Some(id)
    }

    /// Convert a raw value to a typed IFC value and its cache key
    fn convert(&self, kind: PropertyKind, raw: &RawValue) -> Option<(IfcValue, Option<CacheKey>)> {
        match kind {
            PropertyKind::Label | PropertyKind::Text | PropertyKind::Identifier => {
                let text = raw.as_text()?;
                let key = cache::text_key(kind, &text, raw.is_element_reference());
                let value = match kind {
                    PropertyKind::Label => IfcValue::Label(text),
                    PropertyKind::Text => IfcValue::Text(text),
                    _ => IfcValue::Identifier(text),
                };
                Some((value, key))
            }
            PropertyKind::Boolean => {
                let b = raw.as_boolean()?;
                Some((IfcValue::Boolean(b), Some(CacheKey::Number(b as i64))))
            }
            PropertyKind::Logical => {
                let l = raw.as_logical()?;
                let n = match l {
                    Logical::False => 0,
                    Logical::True => 1,
                    Logical::Unknown => 2,
                };
                Some((IfcValue::Logical(l), Some(CacheKey::Number(n))))
            }
            PropertyKind::Integer => {
                let i = raw.as_integer()?;
                Some((IfcValue::Integer(i), cache::integer_key(i)))
            }
            PropertyKind::ClassificationReference => None,
            _ => {
                let measure = kind.measure_type(self.schema)?;
                let raw_number = raw.as_number()?;
                let scaled = self.checked_domain(kind, self.scaler.scale_property(kind, raw_number))?;
                match cache::quantize(kind, raw_number, scaled, &self.scaler) {
                    Some(q) => Some((IfcValue::Measure(measure, q.value), Some(q.key))),
                    None => Some((IfcValue::Measure(measure, scaled), None)),
                }
            }
        }
    }

    /// Apply positivity and range rules to an export value
    fn checked_domain(&self, kind: PropertyKind, value: f64) -> Option<f64> {
        match kind {
            PropertyKind::PositiveLength
            | PropertyKind::PositiveRatio
            | PropertyKind::PositivePlaneAngle => (value > EPSILON).then_some(value),
            PropertyKind::ElectricalPhaseAngle if !self.schema.is_ifc4_family() => {
                (value > EPSILON).then_some(value)
            }
            PropertyKind::NormalisedRatio => {
                if value < -EPSILON || value > 1.0 + EPSILON {
                    None
                } else {
                    Some(value.clamp(0.0, 1.0))
                }
            }
            _ => Some(value),
        }
    }

    fn create_enumerated(
        &mut self,
        writer: &mut dyn IfcWriter,
        name: &str,
        raw: &RawValue,
        enumeration: &Enumeration,
    ) -> Option<EntityId> {
        let text = raw.as_text()?;
        let member = match enumeration.find(&text) {
            Some(member) => member.to_string(),
            None => {
                log::debug!(
                    "property '{}' omitted: '{}' is not a member of {}",
                    name,
                    text,
                    enumeration.name
                );
                return None;
            }
        };
        let handle = self.enumeration_handle(writer, enumeration);
        Some(writer.add_property(IfcProperty {
            name: name.to_string(),
            description: None,
            data: PropertyData::Enumerated {
                values: vec![IfcValue::Label(member)],
                enumeration: Some(handle),
            },
        }))
    }

    /// IfcPropertyEnumeration for `enumeration`, written once per session
    pub fn enumeration_handle(
        &mut self,
        writer: &mut dyn IfcWriter,
        enumeration: &Enumeration,
    ) -> EntityId {
        if let Some(id) = self.enumerations.get(&enumeration.name) {
            return *id;
        }
        let id = writer.add_enumeration(IfcEnumeration {
            name: enumeration.name.clone(),
            values: enumeration
                .members
                .iter()
                .map(|m| IfcValue::Label(m.clone()))
                .collect(),
        });
        self.enumerations.insert(enumeration.name.clone(), id);
        id
    }

    fn create_list(
        &mut self,
        writer: &mut dyn IfcWriter,
        kind: PropertyKind,
        name: &str,
        raw: &RawValue,
    ) -> Option<EntityId> {
        let items: Vec<RawValue> = match &raw.value {
            ParameterValue::String(s) => s
                .split(';')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(RawValue::string)
                .collect(),
            ParameterValue::None => Vec::new(),
            _ => vec![raw.clone()],
        };
        let values: Vec<IfcValue> = items
            .iter()
            .filter_map(|item| self.convert(kind, item).map(|(value, _)| value))
            .collect();
        if values.is_empty() {
            log::debug!("list property '{}' omitted: no convertible items", name);
            return None;
        }
        Some(writer.add_property(IfcProperty {
            name: name.to_string(),
            description: None,
            data: PropertyData::List(values),
        }))
    }

    /// Classification reference from "[Source]Code:Name" style text
    fn create_reference(
        &mut self,
        writer: &mut dyn IfcWriter,
        name: &str,
        raw: &RawValue,
    ) -> Option<EntityId> {
        let text = raw.as_text()?;
        let mut rest = text.trim();
        if rest.starts_with('[') {
            if let Some(end) = rest.find(']') {
                rest = rest[end + 1..].trim_start();
            }
        }
        let (code, title) = match rest.split_once(':') {
            Some((code, title)) => (code.trim(), Some(title.trim())),
            None => (rest, None),
        };
        if code.is_empty() {
            return None;
        }
        let reference = writer.add_classification_reference(IfcClassificationReference {
            identification: code.to_string(),
            name: title.filter(|t| !t.is_empty()).map(str::to_string),
        });
        Some(writer.add_property(IfcProperty {
            name: name.to_string(),
            description: None,
            data: PropertyData::Reference {
                usage: None,
                reference,
            },
        }))
    }

    /// Create a physical quantity; non-positive values are omitted
    pub fn create_quantity(
        &mut self,
        writer: &mut dyn IfcWriter,
        name: &str,
        quantity_type: QuantityType,
        raw: &RawValue,
    ) -> Option<EntityId> {
        let value = self
            .scaler
            .scale(quantity_type.unit_kind(), raw.as_number()?);
        if value <= EPSILON {
            log::debug!("quantity '{}' omitted: non-positive value", name);
            return None;
        }
        Some(writer.add_quantity(IfcQuantity {
            name: name.to_string(),
            quantity_type,
            value,
        }))
    }
}
