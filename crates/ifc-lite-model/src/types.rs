// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types shared by the host side and the IFC side of an export
//!
//! Identifiers, IFC entity types, schema versions and export languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Handle of an entity written to the IFC object model
///
/// Wraps the STEP instance number (e.g., #123 becomes EntityId(123))
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        EntityId(id)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Identifier of an element in the host model
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default, PartialOrd, Ord)]
pub struct ElementId(pub i64);

impl ElementId {
    /// The host's "no element" sentinel
    pub const INVALID: ElementId = ElementId(-1);

    /// Check whether this id refers to an element at all
    pub fn is_valid(&self) -> bool {
        self.0 >= 0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ElementId {
    fn from(id: i64) -> Self {
        ElementId(id)
    }
}

impl From<i32> for ElementId {
    fn from(id: i32) -> Self {
        ElementId(id as i64)
    }
}

/// IFC schema version being written
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub enum IfcSchema {
    /// IFC2x3 (TC1, coordination view family)
    #[serde(alias = "IFC2X3")]
    Ifc2x3,
    /// IFC4 ADD2 TC1 (reference and design transfer views)
    #[default]
    #[serde(alias = "IFC4")]
    Ifc4,
    /// IFC4x3; property sets follow the IFC4 family
    #[serde(alias = "IFC4X3")]
    Ifc4x3,
}

impl IfcSchema {
    /// Whether this schema belongs to the IFC4 family
    pub fn is_ifc4_family(&self) -> bool {
        matches!(self, IfcSchema::Ifc4 | IfcSchema::Ifc4x3)
    }

    /// FILE_SCHEMA identifier
    pub fn identifier(&self) -> &'static str {
        match self {
            IfcSchema::Ifc2x3 => "IFC2X3",
            IfcSchema::Ifc4 => "IFC4",
            IfcSchema::Ifc4x3 => "IFC4X3",
        }
    }
}

impl FromStr for IfcSchema {
    type Err = crate::ExportError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if upper.starts_with("IFC2X3") {
            Ok(IfcSchema::Ifc2x3)
        } else if upper.starts_with("IFC4X3") {
            Ok(IfcSchema::Ifc4x3)
        } else if upper.starts_with("IFC4") {
            Ok(IfcSchema::Ifc4)
        } else {
            Err(crate::ExportError::UnsupportedSchema(s.to_string()))
        }
    }
}

impl fmt::Display for IfcSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.identifier())
    }
}

/// Schema applicability of a catalog definition
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub enum SchemaGate {
    /// Written for every schema
    #[default]
    All,
    /// Only written for IFC2x3
    Ifc2x3Only,
    /// Only written for the IFC4 family
    Ifc4Only,
}

impl SchemaGate {
    /// Check whether a definition with this gate is written for `schema`
    pub fn admits(&self, schema: IfcSchema) -> bool {
        match self {
            SchemaGate::All => true,
            SchemaGate::Ifc2x3Only => !schema.is_ifc4_family(),
            SchemaGate::Ifc4Only => schema.is_ifc4_family(),
        }
    }
}

/// Language used to look up localized parameter names
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize, Default)]
pub enum Language {
    #[default]
    English,
    German,
    French,
    Italian,
    Spanish,
    Dutch,
    Czech,
    Polish,
    Russian,
    PortugueseBrazil,
    Japanese,
    Korean,
    ChineseSimplified,
    ChineseTraditional,
}

macro_rules! ifc_entity_types {
    ($($variant:ident => $step:literal),* $(,)?) => {
        /// IFC entity types property sets and quantities can be attached to
        ///
        /// Covers the element, type and spatial entities the exporter maps to.
        /// Anything else is captured with its original spelling.
        #[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub enum IfcEntityType {
            $($variant,)*
            /// Unknown type - stores the original type name string
            Unknown(String),
        }

        impl IfcEntityType {
            /// Parse a type name, case-insensitively
            pub fn parse(s: &str) -> Self {
                let trimmed = s.trim();
                match trimmed.to_ascii_uppercase().as_str() {
                    $($step => IfcEntityType::$variant,)*
                    _ => IfcEntityType::Unknown(trimmed.to_string()),
                }
            }

            /// Get the type name in schema spelling (e.g. "IfcWall")
            pub fn name(&self) -> &str {
                match self {
                    $(IfcEntityType::$variant => stringify!($variant),)*
                    IfcEntityType::Unknown(s) => s,
                }
            }

            /// Get the upper-case STEP keyword (e.g. "IFCWALL")
            pub fn step_name(&self) -> String {
                match self {
                    $(IfcEntityType::$variant => $step.to_string(),)*
                    IfcEntityType::Unknown(s) => s.to_ascii_uppercase(),
                }
            }
        }
    };
}

ifc_entity_types! {
    // Spatial structure
    IfcProject => "IFCPROJECT",
    IfcSite => "IFCSITE",
    IfcBuilding => "IFCBUILDING",
    IfcBuildingStorey => "IFCBUILDINGSTOREY",
    IfcSpace => "IFCSPACE",
    IfcZone => "IFCZONE",

    // Building elements
    IfcWall => "IFCWALL",
    IfcWallStandardCase => "IFCWALLSTANDARDCASE",
    IfcCurtainWall => "IFCCURTAINWALL",
    IfcSlab => "IFCSLAB",
    IfcSlabStandardCase => "IFCSLABSTANDARDCASE",
    IfcRoof => "IFCROOF",
    IfcBeam => "IFCBEAM",
    IfcBeamStandardCase => "IFCBEAMSTANDARDCASE",
    IfcColumn => "IFCCOLUMN",
    IfcColumnStandardCase => "IFCCOLUMNSTANDARDCASE",
    IfcMember => "IFCMEMBER",
    IfcMemberStandardCase => "IFCMEMBERSTANDARDCASE",
    IfcPlate => "IFCPLATE",
    IfcPlateStandardCase => "IFCPLATESTANDARDCASE",
    IfcDoor => "IFCDOOR",
    IfcDoorStandardCase => "IFCDOORSTANDARDCASE",
    IfcWindow => "IFCWINDOW",
    IfcWindowStandardCase => "IFCWINDOWSTANDARDCASE",
    IfcStair => "IFCSTAIR",
    IfcStairFlight => "IFCSTAIRFLIGHT",
    IfcRamp => "IFCRAMP",
    IfcRampFlight => "IFCRAMPFLIGHT",
    IfcRailing => "IFCRAILING",
    IfcCovering => "IFCCOVERING",
    IfcFooting => "IFCFOOTING",
    IfcPile => "IFCPILE",
    IfcBuildingElementProxy => "IFCBUILDINGELEMENTPROXY",
    IfcReinforcingBar => "IFCREINFORCINGBAR",
    IfcFurnishingElement => "IFCFURNISHINGELEMENT",
    IfcFurniture => "IFCFURNITURE",

    // Distribution elements
    IfcDistributionElement => "IFCDISTRIBUTIONELEMENT",
    IfcFlowTerminal => "IFCFLOWTERMINAL",
    IfcFlowSegment => "IFCFLOWSEGMENT",
    IfcFlowFitting => "IFCFLOWFITTING",
    IfcFlowController => "IFCFLOWCONTROLLER",
    IfcEnergyConversionDevice => "IFCENERGYCONVERSIONDEVICE",
    IfcSanitaryTerminal => "IFCSANITARYTERMINAL",
    IfcSpaceHeater => "IFCSPACEHEATER",
    IfcElectricAppliance => "IFCELECTRICAPPLIANCE",
    IfcLightFixture => "IFCLIGHTFIXTURE",
    IfcDuctSegment => "IFCDUCTSEGMENT",
    IfcPipeSegment => "IFCPIPESEGMENT",

    // Type objects
    IfcWallType => "IFCWALLTYPE",
    IfcCurtainWallType => "IFCCURTAINWALLTYPE",
    IfcSlabType => "IFCSLABTYPE",
    IfcRoofType => "IFCROOFTYPE",
    IfcBeamType => "IFCBEAMTYPE",
    IfcColumnType => "IFCCOLUMNTYPE",
    IfcMemberType => "IFCMEMBERTYPE",
    IfcPlateType => "IFCPLATETYPE",
    IfcDoorType => "IFCDOORTYPE",
    IfcDoorStyle => "IFCDOORSTYLE",
    IfcWindowType => "IFCWINDOWTYPE",
    IfcWindowStyle => "IFCWINDOWSTYLE",
    IfcStairType => "IFCSTAIRTYPE",
    IfcStairFlightType => "IFCSTAIRFLIGHTTYPE",
    IfcRampType => "IFCRAMPTYPE",
    IfcRampFlightType => "IFCRAMPFLIGHTTYPE",
    IfcRailingType => "IFCRAILINGTYPE",
    IfcCoveringType => "IFCCOVERINGTYPE",
    IfcBuildingElementProxyType => "IFCBUILDINGELEMENTPROXYTYPE",
    IfcReinforcingBarType => "IFCREINFORCINGBARTYPE",
    IfcFurnitureType => "IFCFURNITURETYPE",
    IfcFurnishingElementType => "IFCFURNISHINGELEMENTTYPE",
    IfcSanitaryTerminalType => "IFCSANITARYTERMINALTYPE",
    IfcSpaceHeaterType => "IFCSPACEHEATERTYPE",
    IfcElectricApplianceType => "IFCELECTRICAPPLIANCETYPE",
    IfcLightFixtureType => "IFCLIGHTFIXTURETYPE",
}

impl FromStr for IfcEntityType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl IfcEntityType {
    /// Direct supertype among the known entity types
    ///
    /// Only the links property set applicability depends on are modelled.
    pub fn supertype(&self) -> Option<IfcEntityType> {
        use IfcEntityType::*;
        let parent = match self {
            IfcWallStandardCase => IfcWall,
            IfcSlabStandardCase => IfcSlab,
            IfcBeamStandardCase => IfcBeam,
            IfcColumnStandardCase => IfcColumn,
            IfcMemberStandardCase => IfcMember,
            IfcPlateStandardCase => IfcPlate,
            IfcDoorStandardCase => IfcDoor,
            IfcWindowStandardCase => IfcWindow,
            IfcFurniture => IfcFurnishingElement,
            IfcSanitaryTerminal | IfcSpaceHeater | IfcElectricAppliance | IfcLightFixture => {
                IfcFlowTerminal
            }
            IfcDuctSegment | IfcPipeSegment => IfcFlowSegment,
            IfcFlowTerminal | IfcFlowSegment | IfcFlowFitting | IfcFlowController
            | IfcEnergyConversionDevice => IfcDistributionElement,
            IfcDoorStyle => IfcDoorType,
            IfcWindowStyle => IfcWindowType,
            IfcFurnitureType => IfcFurnishingElementType,
            _ => return None,
        };
        Some(parent)
    }

    /// Check whether `self` is `other` or one of its subtypes
    pub fn is_a(&self, other: &IfcEntityType) -> bool {
        let mut current = Some(self.clone());
        while let Some(ty) = current {
            if &ty == other {
                return true;
            }
            current = ty.supertype();
        }
        false
    }

    /// Check if this is a type object (IfcTypeObject subtype)
    pub fn is_type_object(&self) -> bool {
        let name = self.name();
        name.ends_with("Type") || name.ends_with("Style")
    }

    /// Check if this type is a spatial structure element
    pub fn is_spatial(&self) -> bool {
        matches!(
            self,
            IfcEntityType::IfcProject
                | IfcEntityType::IfcSite
                | IfcEntityType::IfcBuilding
                | IfcEntityType::IfcBuildingStorey
                | IfcEntityType::IfcSpace
                | IfcEntityType::IfcZone
        )
    }
}

impl Default for IfcEntityType {
    fn default() -> Self {
        IfcEntityType::Unknown(String::new())
    }
}

impl fmt::Display for IfcEntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(IfcEntityType::parse("IfcWall"), IfcEntityType::IfcWall);
        assert_eq!(IfcEntityType::parse("IFCWALL"), IfcEntityType::IfcWall);
        assert_eq!(IfcEntityType::parse(" ifcwalltype "), IfcEntityType::IfcWallType);
        assert_eq!(
            IfcEntityType::parse("IfcChimney"),
            IfcEntityType::Unknown("IfcChimney".to_string())
        );
    }

    #[test]
    fn test_names() {
        assert_eq!(IfcEntityType::IfcBuildingStorey.name(), "IfcBuildingStorey");
        assert_eq!(IfcEntityType::IfcBuildingStorey.step_name(), "IFCBUILDINGSTOREY");
    }

    #[test]
    fn test_supertype_chain() {
        assert!(IfcEntityType::IfcWallStandardCase.is_a(&IfcEntityType::IfcWall));
        assert!(IfcEntityType::IfcSanitaryTerminal.is_a(&IfcEntityType::IfcDistributionElement));
        assert!(!IfcEntityType::IfcWall.is_a(&IfcEntityType::IfcSlab));
    }

    #[test]
    fn test_schema_gate() {
        assert!(SchemaGate::All.admits(IfcSchema::Ifc2x3));
        assert!(SchemaGate::Ifc4Only.admits(IfcSchema::Ifc4x3));
        assert!(!SchemaGate::Ifc4Only.admits(IfcSchema::Ifc2x3));
        assert!(!SchemaGate::Ifc2x3Only.admits(IfcSchema::Ifc4));
    }

    #[test]
    fn test_schema_from_str() {
        assert_eq!("IFC2X3".parse::<IfcSchema>().unwrap(), IfcSchema::Ifc2x3);
        assert_eq!("ifc4".parse::<IfcSchema>().unwrap(), IfcSchema::Ifc4);
        assert!("IFC5".parse::<IfcSchema>().is_err());
    }
}
