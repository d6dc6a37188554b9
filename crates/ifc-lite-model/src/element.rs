// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host model elements and their parameters
//!
//! These are read-only snapshots of what the authoring tool stores. The
//! exporter never mutates them.

use crate::{ElementId, UnitKind};
use serde::{Deserialize, Serialize};

/// Stable, non-renameable parameter ids defined by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuiltInParameter {
    FireRating,
    Function,
    WallStructuralSignificant,
    WallStructuralUsage,
    FloorIsStructural,
    CurveElemLength,
    InstanceLength,
    StructuralFramingCutLength,
    StartLevelOffset,
    EndLevelOffset,
    WallUserHeight,
    WallWidth,
    FloorThickness,
    HostAreaComputed,
    HostVolumeComputed,
    HostPerimeterComputed,
    RoofSlope,
    StairsActualNumRisers,
    StairsDesiredNumRisers,
    StairsActualRiserHeight,
    StairsMaxRiserHeight,
    StairsActualTreadDepth,
    StairsHeight,
    RailingHeight,
    RoomArea,
    RoomVolume,
    RoomPerimeter,
    RoomHeight,
    RoomNumber,
    RoomName,
    FamilyHeight,
    FamilyWidth,
    SectionWidth,
    SectionHeight,
    RebarShape,
    HeatTransferCoefficient,
    TypeName,
    TypeMark,
    Mark,
    Description,
    Manufacturer,
    Model,
    Cost,
    Comments,
}

impl BuiltInParameter {
    /// Label the host displays for this parameter
    ///
    /// Used as a by-name lookup when the id itself is not present.
    pub fn label(&self) -> &'static str {
        match self {
            BuiltInParameter::FireRating => "Fire Rating",
            BuiltInParameter::Function => "Function",
            BuiltInParameter::WallStructuralSignificant => "Structural",
            BuiltInParameter::WallStructuralUsage => "Structural Usage",
            BuiltInParameter::FloorIsStructural => "Structural",
            BuiltInParameter::CurveElemLength => "Length",
            BuiltInParameter::InstanceLength => "Length",
            BuiltInParameter::StructuralFramingCutLength => "Cut Length",
            BuiltInParameter::StartLevelOffset => "Start Level Offset",
            BuiltInParameter::EndLevelOffset => "End Level Offset",
            BuiltInParameter::WallUserHeight => "Unconnected Height",
            BuiltInParameter::WallWidth => "Width",
            BuiltInParameter::FloorThickness => "Default Thickness",
            BuiltInParameter::HostAreaComputed => "Area",
            BuiltInParameter::HostVolumeComputed => "Volume",
            BuiltInParameter::HostPerimeterComputed => "Perimeter",
            BuiltInParameter::RoofSlope => "Slope",
            BuiltInParameter::StairsActualNumRisers => "Actual Number of Risers",
            BuiltInParameter::StairsDesiredNumRisers => "Desired Number of Risers",
            BuiltInParameter::StairsActualRiserHeight => "Actual Riser Height",
            BuiltInParameter::StairsMaxRiserHeight => "Maximum Riser Height",
            BuiltInParameter::StairsActualTreadDepth => "Actual Tread Depth",
            BuiltInParameter::StairsHeight => "Desired Stair Height",
            BuiltInParameter::RailingHeight => "Railing Height",
            BuiltInParameter::RoomArea => "Area",
            BuiltInParameter::RoomVolume => "Volume",
            BuiltInParameter::RoomPerimeter => "Perimeter",
            BuiltInParameter::RoomHeight => "Unbounded Height",
            BuiltInParameter::RoomNumber => "Number",
            BuiltInParameter::RoomName => "Name",
            BuiltInParameter::FamilyHeight => "Height",
            BuiltInParameter::FamilyWidth => "Width",
            BuiltInParameter::SectionWidth => "b",
            BuiltInParameter::SectionHeight => "h",
            BuiltInParameter::RebarShape => "Shape",
            BuiltInParameter::HeatTransferCoefficient => "Heat Transfer Coefficient (U)",
            BuiltInParameter::TypeName => "Type Name",
            BuiltInParameter::TypeMark => "Type Mark",
            BuiltInParameter::Mark => "Mark",
            BuiltInParameter::Description => "Description",
            BuiltInParameter::Manufacturer => "Manufacturer",
            BuiltInParameter::Model => "Model",
            BuiltInParameter::Cost => "Cost",
            BuiltInParameter::Comments => "Comments",
        }
    }
}

/// Storage kind of a parameter value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageType {
    None,
    Integer,
    Double,
    String,
    ElementId,
}

/// Raw parameter value as stored by the host
///
/// Doubles are in the host's internal unit for the parameter's quantity.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub enum ParameterValue {
    #[default]
    None,
    Integer(i64),
    Double(f64),
    String(String),
    ElementId(ElementId),
}

impl ParameterValue {
    /// Storage kind of this value
    pub fn storage_type(&self) -> StorageType {
        match self {
            ParameterValue::None => StorageType::None,
            ParameterValue::Integer(_) => StorageType::Integer,
            ParameterValue::Double(_) => StorageType::Double,
            ParameterValue::String(_) => StorageType::String,
            ParameterValue::ElementId(_) => StorageType::ElementId,
        }
    }

    /// Check if this is an empty value
    pub fn is_none(&self) -> bool {
        matches!(self, ParameterValue::None)
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as float; integers widen
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParameterValue::Double(d) => Some(*d),
            ParameterValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as element reference
    pub fn as_element_id(&self) -> Option<ElementId> {
        match self {
            ParameterValue::ElementId(id) if id.is_valid() => Some(*id),
            _ => None,
        }
    }
}

/// A named parameter of a host element
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name as shown to users
    pub name: String,
    /// Stable id, for host-defined parameters
    pub builtin: Option<BuiltInParameter>,
    /// Parameter group ("Dimensions", "Identity Data", ...)
    pub group: Option<String>,
    /// Physical quantity of a double value
    pub unit: Option<UnitKind>,
    /// Stored value
    pub value: ParameterValue,
    /// Value formatted by the host, if it provides one
    pub display: Option<String>,
}

impl Parameter {
    /// Create a parameter with an arbitrary value
    pub fn new(name: impl Into<String>, value: ParameterValue) -> Self {
        Self {
            name: name.into(),
            builtin: None,
            group: None,
            unit: None,
            value,
            display: None,
        }
    }

    /// Create a string parameter
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, ParameterValue::String(value.into()))
    }

    /// Create an integer parameter
    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, ParameterValue::Integer(value))
    }

    /// Create a double parameter
    pub fn double(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, ParameterValue::Double(value))
    }

    /// Create an element reference parameter
    pub fn element_id(name: impl Into<String>, value: ElementId) -> Self {
        Self::new(name, ParameterValue::ElementId(value))
    }

    /// Create a host-defined parameter named after its label
    pub fn builtin(id: BuiltInParameter, value: ParameterValue) -> Self {
        let mut param = Self::new(id.label(), value);
        param.builtin = Some(id);
        param
    }

    /// Set the stable id
    pub fn with_builtin(mut self, id: BuiltInParameter) -> Self {
        self.builtin = Some(id);
        self
    }

    /// Set the parameter group
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Set the physical quantity
    pub fn with_unit(mut self, unit: UnitKind) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Set the host-formatted value
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Whether the parameter holds a value
    pub fn has_value(&self) -> bool {
        !self.value.is_none()
    }
}

/// Snapshot of a host model element or element type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HostElement {
    pub id: ElementId,
    pub name: String,
    /// Category name ("Walls", "Doors", ...)
    pub category: Option<String>,
    /// Type ("symbol") element this instance is based on
    pub type_id: Option<ElementId>,
    /// Whether this element is itself a type
    pub is_type: bool,
    pub parameters: Vec<Parameter>,
}

impl HostElement {
    /// Create an instance element
    pub fn new(id: impl Into<ElementId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: None,
            type_id: None,
            is_type: false,
            parameters: Vec::new(),
        }
    }

    /// Create a type element
    pub fn new_type(id: impl Into<ElementId>, name: impl Into<String>) -> Self {
        let mut element = Self::new(id, name);
        element.is_type = true;
        element
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the type element
    pub fn with_type(mut self, type_id: impl Into<ElementId>) -> Self {
        self.type_id = Some(type_id.into());
        self
    }

    /// Add a parameter
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Find a parameter with a value by exact name
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name == name && p.has_value())
    }

    /// Find a host-defined parameter with a value by id
    pub fn builtin(&self, id: BuiltInParameter) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.builtin == Some(id) && p.has_value())
    }
}

/// A column of a host schedule
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleField {
    /// Column heading, used as the property name
    pub heading: String,
    /// Source parameter name
    pub parameter: String,
    pub builtin: Option<BuiltInParameter>,
    pub unit: Option<UnitKind>,
}

/// A host schedule (tabular view) exported as a custom property set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDefinition {
    pub id: ElementId,
    pub name: String,
    pub fields: Vec<ScheduleField>,
    /// Elements listed by the schedule
    pub elements: Vec<ElementId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_lookup_skips_empty_values() {
        let element = HostElement::new(1, "Wall 1")
            .with_parameter(Parameter::new("FireRating", ParameterValue::None))
            .with_parameter(Parameter::string("FireRating", "F30"));
        assert_eq!(
            element.parameter("FireRating").and_then(|p| p.value.as_str()),
            Some("F30")
        );
    }

    #[test]
    fn test_builtin_lookup() {
        let element = HostElement::new(1, "Wall 1").with_parameter(Parameter::builtin(
            BuiltInParameter::FireRating,
            ParameterValue::String("F90".into()),
        ));
        let param = element.builtin(BuiltInParameter::FireRating).unwrap();
        assert_eq!(param.name, "Fire Rating");
        assert!(element.builtin(BuiltInParameter::Mark).is_none());
    }

    #[test]
    fn test_invalid_element_reference() {
        assert_eq!(ParameterValue::ElementId(ElementId::INVALID).as_element_id(), None);
        assert_eq!(
            ParameterValue::ElementId(ElementId(7)).as_element_id(),
            Some(ElementId(7))
        );
    }
}
