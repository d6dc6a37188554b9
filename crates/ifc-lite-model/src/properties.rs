// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property kinds, typed IFC values and the property/quantity records
//! handed to an [`IfcWriter`](crate::IfcWriter)

use crate::{EntityId, ExportError, IfcSchema, UnitKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic kind of a property value
///
/// This is the data-type tag of a catalog entry. Several kinds are written
/// with the same IFC measure type (see [`PropertyKind::measure_type`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    Label,
    Text,
    Identifier,
    Boolean,
    Logical,
    Integer,
    Real,
    Length,
    PositiveLength,
    Ratio,
    NormalisedRatio,
    PositiveRatio,
    PlaneAngle,
    PositivePlaneAngle,
    Area,
    Volume,
    Count,
    Frequency,
    Force,
    Power,
    Pressure,
    ThermodynamicTemperature,
    ThermalTransmittance,
    ElectricCurrent,
    ElectricVoltage,
    LuminousFlux,
    LuminousIntensity,
    Illuminance,
    MassDensity,
    Mass,
    LinearVelocity,
    VolumetricFlowRate,
    ClassificationReference,
    Monetary,
    ColorTemperature,
    ElectricalEfficacy,
    ElectricalPhaseAngle,
}

const KIND_TAGS: &[(&str, PropertyKind)] = &[
    ("LABEL", PropertyKind::Label),
    ("TEXT", PropertyKind::Text),
    ("IDENTIFIER", PropertyKind::Identifier),
    ("BOOLEAN", PropertyKind::Boolean),
    ("LOGICAL", PropertyKind::Logical),
    ("INTEGER", PropertyKind::Integer),
    ("REAL", PropertyKind::Real),
    ("LENGTH", PropertyKind::Length),
    ("POSITIVELENGTH", PropertyKind::PositiveLength),
    ("RATIO", PropertyKind::Ratio),
    ("NORMALISEDRATIO", PropertyKind::NormalisedRatio),
    ("NORMALIZEDRATIO", PropertyKind::NormalisedRatio),
    ("POSITIVERATIO", PropertyKind::PositiveRatio),
    ("PLANEANGLE", PropertyKind::PlaneAngle),
    ("POSITIVEPLANEANGLE", PropertyKind::PositivePlaneAngle),
    ("AREA", PropertyKind::Area),
    ("VOLUME", PropertyKind::Volume),
    ("COUNT", PropertyKind::Count),
    ("FREQUENCY", PropertyKind::Frequency),
    ("FORCE", PropertyKind::Force),
    ("POWER", PropertyKind::Power),
    ("PRESSURE", PropertyKind::Pressure),
    ("THERMODYNAMICTEMPERATURE", PropertyKind::ThermodynamicTemperature),
    ("TEMPERATURE", PropertyKind::ThermodynamicTemperature),
    ("THERMALTRANSMITTANCE", PropertyKind::ThermalTransmittance),
    ("ELECTRICCURRENT", PropertyKind::ElectricCurrent),
    ("ELECTRICVOLTAGE", PropertyKind::ElectricVoltage),
    ("LUMINOUSFLUX", PropertyKind::LuminousFlux),
    ("LUMINOUSINTENSITY", PropertyKind::LuminousIntensity),
    ("ILLUMINANCE", PropertyKind::Illuminance),
    ("MASSDENSITY", PropertyKind::MassDensity),
    ("MASS", PropertyKind::Mass),
    ("LINEARVELOCITY", PropertyKind::LinearVelocity),
    ("VOLUMETRICFLOWRATE", PropertyKind::VolumetricFlowRate),
    ("CLASSIFICATIONREFERENCE", PropertyKind::ClassificationReference),
    ("MONETARY", PropertyKind::Monetary),
    ("CURRENCY", PropertyKind::Monetary),
    ("COLORTEMPERATURE", PropertyKind::ColorTemperature),
    ("COLOURTEMPERATURE", PropertyKind::ColorTemperature),
    ("ELECTRICALEFFICACY", PropertyKind::ElectricalEfficacy),
    ("ELECTRICALPHASEANGLE", PropertyKind::ElectricalPhaseAngle),
    ("POWERFACTOR", PropertyKind::NormalisedRatio),
];

impl PropertyKind {
    /// Parse a data-type tag
    ///
    /// Accepts bare names (`Length`, `positive_length`) and IFC spellings
    /// (`IfcLengthMeasure`), ignoring case, spaces and underscores.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let mut key: String = tag
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_')
            .collect::<String>()
            .to_ascii_uppercase();
        if let Some(stripped) = key.strip_prefix("IFC") {
            key = stripped.to_string();
        }
        if let Some(stripped) = key.strip_suffix("MEASURE") {
            key = stripped.to_string();
        }
        KIND_TAGS
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, kind)| *kind)
    }

    /// Parse a data-type tag, defaulting to [`PropertyKind::Label`]
    pub fn parse_lenient(tag: &str) -> Self {
        match Self::from_tag(tag) {
            Some(kind) => kind,
            None => {
                log::warn!("unknown property data type '{}', exporting as label", tag);
                PropertyKind::Label
            }
        }
    }

    /// Whether the value is a string
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            PropertyKind::Label | PropertyKind::Text | PropertyKind::Identifier
        )
    }

    /// Whether the value is a floating point measure
    pub fn is_numeric_measure(&self) -> bool {
        self.measure_type(IfcSchema::Ifc4).is_some()
    }

    /// Physical quantity the host value must be converted with
    pub fn unit_kind(&self) -> Option<UnitKind> {
        let unit = match self {
            PropertyKind::Length | PropertyKind::PositiveLength => UnitKind::Length,
            PropertyKind::Area => UnitKind::Area,
            PropertyKind::Volume => UnitKind::Volume,
            PropertyKind::PlaneAngle
            | PropertyKind::PositivePlaneAngle
            | PropertyKind::ElectricalPhaseAngle => UnitKind::PlaneAngle,
            PropertyKind::Count => UnitKind::Count,
            PropertyKind::Frequency => UnitKind::Frequency,
            PropertyKind::Force => UnitKind::Force,
            PropertyKind::Power => UnitKind::Power,
            PropertyKind::Pressure => UnitKind::Pressure,
            PropertyKind::ThermodynamicTemperature => UnitKind::ThermodynamicTemperature,
            PropertyKind::ThermalTransmittance => UnitKind::ThermalTransmittance,
            PropertyKind::ElectricCurrent => UnitKind::ElectricCurrent,
            PropertyKind::ElectricVoltage => UnitKind::ElectricVoltage,
            PropertyKind::LuminousFlux => UnitKind::LuminousFlux,
            PropertyKind::LuminousIntensity => UnitKind::LuminousIntensity,
            PropertyKind::Illuminance => UnitKind::Illuminance,
            PropertyKind::MassDensity => UnitKind::MassDensity,
            PropertyKind::Mass => UnitKind::Mass,
            PropertyKind::LinearVelocity => UnitKind::LinearVelocity,
            PropertyKind::VolumetricFlowRate => UnitKind::VolumetricFlowRate,
            PropertyKind::Monetary => UnitKind::Currency,
            PropertyKind::ColorTemperature => UnitKind::ColorTemperature,
            PropertyKind::ElectricalEfficacy => UnitKind::ElectricalEfficacy,
            _ => return None,
        };
        Some(unit)
    }

    /// Kind used for a host value measured in `unit`
    pub fn from_unit(unit: UnitKind) -> Self {
        match unit {
            UnitKind::Length => PropertyKind::Length,
            UnitKind::Area => PropertyKind::Area,
            UnitKind::Volume => PropertyKind::Volume,
            UnitKind::PlaneAngle => PropertyKind::PlaneAngle,
            UnitKind::Count => PropertyKind::Count,
            UnitKind::Power => PropertyKind::Power,
            UnitKind::ThermodynamicTemperature => PropertyKind::ThermodynamicTemperature,
            UnitKind::ThermalTransmittance => PropertyKind::ThermalTransmittance,
            UnitKind::Pressure => PropertyKind::Pressure,
            UnitKind::Force => PropertyKind::Force,
            UnitKind::ElectricCurrent => PropertyKind::ElectricCurrent,
            UnitKind::ElectricVoltage => PropertyKind::ElectricVoltage,
            UnitKind::LuminousFlux => PropertyKind::LuminousFlux,
            UnitKind::LuminousIntensity => PropertyKind::LuminousIntensity,
            UnitKind::Illuminance => PropertyKind::Illuminance,
            UnitKind::MassDensity => PropertyKind::MassDensity,
            UnitKind::Mass => PropertyKind::Mass,
            UnitKind::LinearVelocity => PropertyKind::LinearVelocity,
            UnitKind::VolumetricFlowRate => PropertyKind::VolumetricFlowRate,
            UnitKind::ColorTemperature => PropertyKind::ColorTemperature,
            UnitKind::ElectricalEfficacy => PropertyKind::ElectricalEfficacy,
            UnitKind::Frequency => PropertyKind::Frequency,
            UnitKind::Currency => PropertyKind::Monetary,
            UnitKind::Time => PropertyKind::Real,
        }
    }

    /// IFC measure type a numeric kind is written as in `schema`
    ///
    /// Returns `None` for non-numeric kinds.
    pub fn measure_type(&self, schema: IfcSchema) -> Option<MeasureType> {
        let measure = match self {
            PropertyKind::Real | PropertyKind::ElectricalEfficacy => MeasureType::Real,
            PropertyKind::Length => MeasureType::Length,
            PropertyKind::PositiveLength => MeasureType::PositiveLength,
            PropertyKind::Ratio => MeasureType::Ratio,
            PropertyKind::NormalisedRatio => MeasureType::NormalisedRatio,
            PropertyKind::PositiveRatio => MeasureType::PositiveRatio,
            PropertyKind::PlaneAngle => MeasureType::PlaneAngle,
            PropertyKind::PositivePlaneAngle => MeasureType::PositivePlaneAngle,
            PropertyKind::ElectricalPhaseAngle if schema.is_ifc4_family() => {
                MeasureType::PlaneAngle
            }
            PropertyKind::ElectricalPhaseAngle => MeasureType::PositivePlaneAngle,
            PropertyKind::Area => MeasureType::Area,
            PropertyKind::Volume => MeasureType::Volume,
            PropertyKind::Count => MeasureType::Count,
            PropertyKind::Frequency => MeasureType::Frequency,
            PropertyKind::Force => MeasureType::Force,
            PropertyKind::Power => MeasureType::Power,
            PropertyKind::Pressure => MeasureType::Pressure,
            PropertyKind::ThermodynamicTemperature | PropertyKind::ColorTemperature => {
                MeasureType::ThermodynamicTemperature
            }
            PropertyKind::ThermalTransmittance => MeasureType::ThermalTransmittance,
            PropertyKind::ElectricCurrent => MeasureType::ElectricCurrent,
            PropertyKind::ElectricVoltage => MeasureType::ElectricVoltage,
            PropertyKind::LuminousFlux => MeasureType::LuminousFlux,
            PropertyKind::LuminousIntensity => MeasureType::LuminousIntensity,
            PropertyKind::Illuminance => MeasureType::Illuminance,
            PropertyKind::MassDensity => MeasureType::MassDensity,
            PropertyKind::Mass => MeasureType::Mass,
            PropertyKind::LinearVelocity => MeasureType::LinearVelocity,
            PropertyKind::VolumetricFlowRate => MeasureType::VolumetricFlowRate,
            PropertyKind::Monetary => MeasureType::Monetary,
            PropertyKind::Label
            | PropertyKind::Text
            | PropertyKind::Identifier
            | PropertyKind::Boolean
            | PropertyKind::Logical
            | PropertyKind::Integer
            | PropertyKind::ClassificationReference => return None,
        };
        Some(measure)
    }
}

impl FromStr for PropertyKind {
    type Err = ExportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| ExportError::other(format!("unknown data type '{}'", s)))
    }
}

/// How a property value is represented in the IFC file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ValueRepresentation {
    /// IfcPropertySingleValue
    #[default]
    Single,
    /// IfcPropertyEnumeratedValue
    Enumerated,
    /// IfcPropertyListValue
    List,
}

/// IFC measure types written for numeric values
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureType {
    Real,
    Length,
    PositiveLength,
    Ratio,
    NormalisedRatio,
    PositiveRatio,
    PlaneAngle,
    PositivePlaneAngle,
    Area,
    Volume,
    Count,
    Frequency,
    Force,
    Power,
    Pressure,
    ThermodynamicTemperature,
    ThermalTransmittance,
    ElectricCurrent,
    ElectricVoltage,
    LuminousFlux,
    LuminousIntensity,
    Illuminance,
    MassDensity,
    Mass,
    LinearVelocity,
    VolumetricFlowRate,
    Monetary,
}

impl MeasureType {
    /// STEP keyword of the defined type
    pub fn step_name(&self) -> &'static str {
        match self {
            MeasureType::Real => "IFCREAL",
            MeasureType::Length => "IFCLENGTHMEASURE",
            MeasureType::PositiveLength => "IFCPOSITIVELENGTHMEASURE",
            MeasureType::Ratio => "IFCRATIOMEASURE",
            MeasureType::NormalisedRatio => "IFCNORMALISEDRATIOMEASURE",
            MeasureType::PositiveRatio => "IFCPOSITIVERATIOMEASURE",
            MeasureType::PlaneAngle => "IFCPLANEANGLEMEASURE",
            MeasureType::PositivePlaneAngle => "IFCPOSITIVEPLANEANGLEMEASURE",
            MeasureType::Area => "IFCAREAMEASURE",
            MeasureType::Volume => "IFCVOLUMEMEASURE",
            MeasureType::Count => "IFCCOUNTMEASURE",
            MeasureType::Frequency => "IFCFREQUENCYMEASURE",
            MeasureType::Force => "IFCFORCEMEASURE",
            MeasureType::Power => "IFCPOWERMEASURE",
            MeasureType::Pressure => "IFCPRESSUREMEASURE",
            MeasureType::ThermodynamicTemperature => "IFCTHERMODYNAMICTEMPERATUREMEASURE",
            MeasureType::ThermalTransmittance => "IFCTHERMALTRANSMITTANCEMEASURE",
            MeasureType::ElectricCurrent => "IFCELECTRICCURRENTMEASURE",
            MeasureType::ElectricVoltage => "IFCELECTRICVOLTAGEMEASURE",
            MeasureType::LuminousFlux => "IFCLUMINOUSFLUXMEASURE",
            MeasureType::LuminousIntensity => "IFCLUMINOUSINTENSITYMEASURE",
            MeasureType::Illuminance => "IFCILLUMINANCEMEASURE",
            MeasureType::MassDensity => "IFCMASSDENSITYMEASURE",
            MeasureType::Mass => "IFCMASSMEASURE",
            MeasureType::LinearVelocity => "IFCLINEARVELOCITYMEASURE",
            MeasureType::VolumetricFlowRate => "IFCVOLUMETRICFLOWRATEMEASURE",
            MeasureType::Monetary => "IFCMONETARYMEASURE",
        }
    }
}

/// Three-valued IFC logical
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Logical {
    True,
    False,
    Unknown,
}

impl From<bool> for Logical {
    fn from(b: bool) -> Self {
        if b {
            Logical::True
        } else {
            Logical::False
        }
    }
}

/// Typed IFC value, immutable once created
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum IfcValue {
    Label(String),
    Text(String),
    Identifier(String),
    Boolean(bool),
    Logical(Logical),
    Integer(i64),
    Measure(MeasureType, f64),
}

impl IfcValue {
    /// STEP keyword of the defined type wrapping this value
    pub fn type_name(&self) -> &'static str {
        match self {
            IfcValue::Label(_) => "IFCLABEL",
            IfcValue::Text(_) => "IFCTEXT",
            IfcValue::Identifier(_) => "IFCIDENTIFIER",
            IfcValue::Boolean(_) => "IFCBOOLEAN",
            IfcValue::Logical(_) => "IFCLOGICAL",
            IfcValue::Integer(_) => "IFCINTEGER",
            IfcValue::Measure(measure, _) => measure.step_name(),
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            IfcValue::Label(s) | IfcValue::Text(s) | IfcValue::Identifier(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            IfcValue::Measure(_, v) => Some(*v),
            IfcValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            IfcValue::Boolean(b) => Some(*b),
            IfcValue::Logical(Logical::True) => Some(true),
            IfcValue::Logical(Logical::False) => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for IfcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IfcValue::Label(s) | IfcValue::Text(s) | IfcValue::Identifier(s) => f.write_str(s),
            IfcValue::Boolean(b) => write!(f, "{}", b),
            IfcValue::Logical(l) => write!(f, "{:?}", l),
            IfcValue::Integer(i) => write!(f, "{}", i),
            IfcValue::Measure(_, v) => write!(f, "{}", v),
        }
    }
}

/// Value part of an IFC property
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PropertyData {
    /// IfcPropertySingleValue
    Single(IfcValue),
    /// IfcPropertyEnumeratedValue with its IfcPropertyEnumeration
    Enumerated {
        values: Vec<IfcValue>,
        enumeration: Option<EntityId>,
    },
    /// IfcPropertyListValue
    List(Vec<IfcValue>),
    /// IfcPropertyReferenceValue pointing at a classification reference
    Reference {
        usage: Option<String>,
        reference: EntityId,
    },
}

/// An IFC property ready to be written
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfcProperty {
    pub name: String,
    pub description: Option<String>,
    pub data: PropertyData,
}

impl IfcProperty {
    /// Create a single-value property
    pub fn single(name: impl Into<String>, value: IfcValue) -> Self {
        Self {
            name: name.into(),
            description: None,
            data: PropertyData::Single(value),
        }
    }

    /// Get the single value, if this is a single-value property
    pub fn single_value(&self) -> Option<&IfcValue> {
        match &self.data {
            PropertyData::Single(value) => Some(value),
            _ => None,
        }
    }
}

/// IfcPropertyEnumeration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfcEnumeration {
    pub name: String,
    pub values: Vec<IfcValue>,
}

/// IfcClassificationReference
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfcClassificationReference {
    pub identification: String,
    pub name: Option<String>,
}

/// IfcPropertySet
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfcPropertySetRecord {
    pub global_id: String,
    pub name: String,
    pub description: Option<String>,
    pub properties: Vec<EntityId>,
}

/// Quantity types supported in IFC
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityType {
    /// Linear measurement (IfcQuantityLength)
    Length,
    /// Area measurement (IfcQuantityArea)
    Area,
    /// Volume measurement (IfcQuantityVolume)
    Volume,
    /// Count (IfcQuantityCount)
    Count,
    /// Weight/mass measurement (IfcQuantityWeight)
    Weight,
    /// Time measurement (IfcQuantityTime)
    Time,
}

impl QuantityType {
    /// STEP keyword of the quantity entity
    pub fn step_name(&self) -> &'static str {
        match self {
            QuantityType::Length => "IFCQUANTITYLENGTH",
            QuantityType::Area => "IFCQUANTITYAREA",
            QuantityType::Volume => "IFCQUANTITYVOLUME",
            QuantityType::Count => "IFCQUANTITYCOUNT",
            QuantityType::Weight => "IFCQUANTITYWEIGHT",
            QuantityType::Time => "IFCQUANTITYTIME",
        }
    }

    /// Physical quantity the host value must be converted with
    pub fn unit_kind(&self) -> UnitKind {
        match self {
            QuantityType::Length => UnitKind::Length,
            QuantityType::Area => UnitKind::Area,
            QuantityType::Volume => UnitKind::Volume,
            QuantityType::Count => UnitKind::Count,
            QuantityType::Weight => UnitKind::Mass,
            QuantityType::Time => UnitKind::Time,
        }
    }

    /// Quantity type matching a property kind, if any
    pub fn from_kind(kind: PropertyKind) -> Option<Self> {
        match kind {
            PropertyKind::Length | PropertyKind::PositiveLength => Some(QuantityType::Length),
            PropertyKind::Area => Some(QuantityType::Area),
            PropertyKind::Volume => Some(QuantityType::Volume),
            PropertyKind::Count | PropertyKind::Integer => Some(QuantityType::Count),
            PropertyKind::Mass => Some(QuantityType::Weight),
            _ => None,
        }
    }
}

/// A physical quantity ready to be written
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfcQuantity {
    pub name: String,
    pub quantity_type: QuantityType,
    pub value: f64,
}

/// IfcElementQuantity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfcElementQuantityRecord {
    pub global_id: String,
    pub name: String,
    pub method_of_measurement: Option<String>,
    pub quantities: Vec<EntityId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_variants() {
        assert_eq!(PropertyKind::from_tag("Length"), Some(PropertyKind::Length));
        assert_eq!(
            PropertyKind::from_tag("IfcPositiveLengthMeasure"),
            Some(PropertyKind::PositiveLength)
        );
        assert_eq!(
            PropertyKind::from_tag("normalised_ratio"),
            Some(PropertyKind::NormalisedRatio)
        );
        assert_eq!(PropertyKind::from_tag("IfcLabel"), Some(PropertyKind::Label));
        assert_eq!(PropertyKind::from_tag("Banana"), None);
    }

    #[test]
    fn test_parse_lenient_defaults_to_label() {
        assert_eq!(PropertyKind::parse_lenient("Banana"), PropertyKind::Label);
        assert_eq!(PropertyKind::parse_lenient("Area"), PropertyKind::Area);
    }

    #[test]
    fn test_phase_angle_depends_on_schema() {
        assert_eq!(
            PropertyKind::ElectricalPhaseAngle.measure_type(IfcSchema::Ifc2x3),
            Some(MeasureType::PositivePlaneAngle)
        );
        assert_eq!(
            PropertyKind::ElectricalPhaseAngle.measure_type(IfcSchema::Ifc4),
            Some(MeasureType::PlaneAngle)
        );
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(IfcValue::Label("x".into()).type_name(), "IFCLABEL");
        assert_eq!(
            IfcValue::Measure(MeasureType::ThermalTransmittance, 0.3).type_name(),
            "IFCTHERMALTRANSMITTANCEMEASURE"
        );
    }
}
