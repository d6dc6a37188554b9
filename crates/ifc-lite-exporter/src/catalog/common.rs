// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Common property sets (Pset_...Common)

use crate::description::PropertySetDescription;
use crate::entry::PropertySetEntry;
use crate::enumeration::Enumeration;
use ifc_lite_model::{BuiltInParameter, IfcEntityType, Language, PropertyKind};

use IfcEntityType::*;
use PropertyKind::*;

// ============================================================================
// Shared entries
// ============================================================================

fn entry(name: &str, kind: PropertyKind) -> PropertySetEntry {
    PropertySetEntry::new(name, kind)
}

fn reference() -> PropertySetEntry {
    entry("Reference", Identifier)
        .localized(Language::German, "Bauteiltyp")
        .with_calculator("reference")
}

fn status() -> PropertySetEntry {
    PropertySetEntry::label("Status")
        .enumerated(Enumeration::new(
            "PEnum_ElementStatus",
            &["NEW", "EXISTING", "DEMOLISH", "TEMPORARY", "OTHER", "NOTKNOWN", "UNSET"],
        ))
        .ifc4_only()
}

fn is_external() -> PropertySetEntry {
    entry("IsExternal", Boolean)
        .localized(Language::German, "Außenbauteil")
        .with_calculator("is_external")
}

fn load_bearing() -> PropertySetEntry {
    entry("LoadBearing", Boolean)
        .localized(Language::German, "Tragendes Bauteil")
        .with_calculator("load_bearing")
}

fn thermal_transmittance() -> PropertySetEntry {
    entry("ThermalTransmittance", PropertyKind::ThermalTransmittance)
        .localized(Language::German, "U-Wert")
        .with_calculator("thermal_transmittance")
}

fn acoustic_rating() -> PropertySetEntry {
    PropertySetEntry::label("AcousticRating").localized(Language::German, "Schallschutzklasse")
}

fn set(name: &str, entities: &[IfcEntityType]) -> PropertySetDescription {
    entities
        .iter()
        .cloned()
        .fold(PropertySetDescription::new(name), |d, e| d.for_entity(e))
}

fn set_with(
    name: &str,
    entities: &[IfcEntityType],
    entries: Vec<PropertySetEntry>,
) -> PropertySetDescription {
    entries.into_iter().fold(set(name, entities), |d, e| d.entry(e))
}

// ============================================================================
// Building elements
// ============================================================================

fn wall_common() -> PropertySetDescription {
    set_with(
        "Pset_WallCommon",
        &[IfcWall],
        vec![
            reference(),
            acoustic_rating(),
            PropertySetEntry::fire_rating(),
            entry("Combustible", Boolean),
            PropertySetEntry::label("SurfaceSpreadOfFlame"),
            thermal_transmittance(),
            is_external(),
            entry("ExtendToStructure", Boolean),
            load_bearing(),
            entry("Compartmentation", Boolean),
            status(),
        ],
    )
}

fn curtain_wall_common() -> PropertySetDescription {
    set_with(
        "Pset_CurtainWallCommon",
        &[IfcCurtainWall],
        vec![
            reference(),
            acoustic_rating(),
            PropertySetEntry::fire_rating(),
            entry("Combustible", Boolean),
            PropertySetEntry::label("SurfaceSpreadOfFlame"),
            thermal_transmittance(),
            is_external(),
            status(),
        ],
    )
}

fn slab_common() -> PropertySetDescription {
    set_with(
        "Pset_SlabCommon",
        &[IfcSlab],
        vec![
            reference(),
            acoustic_rating(),
            PropertySetEntry::fire_rating(),
            entry("PitchAngle", PlaneAngle).with_calculator("slope"),
            entry("Combustible", Boolean),
            PropertySetEntry::label("SurfaceSpreadOfFlame"),
            thermal_transmittance(),
            is_external(),
            load_bearing(),
            entry("Compartmentation", Boolean),
            status(),
        ],
    )
}

fn roof_common() -> PropertySetDescription {
    set_with(
        "Pset_RoofCommon",
        &[IfcRoof],
        vec![
            reference(),
            PropertySetEntry::fire_rating(),
            thermal_transmittance(),
            is_external(),
            entry("ProjectedArea", Area).ifc2x3_only(),
            entry("TotalArea", Area)
                .with_builtin(BuiltInParameter::HostAreaComputed)
                .ifc2x3_only(),
            status(),
        ],
    )
}

fn beam_common() -> PropertySetDescription {
    set_with(
        "Pset_BeamCommon",
        &[IfcBeam],
        vec![
            reference(),
            entry("Span", PositiveLength).with_calculator("span"),
            entry("Slope", PlaneAngle).with_calculator("slope"),
            entry("Roll", PlaneAngle),
            is_external(),
            thermal_transmittance(),
            load_bearing(),
            PropertySetEntry::fire_rating(),
            status(),
        ],
    )
}

fn column_common() -> PropertySetDescription {
    set_with(
        "Pset_ColumnCommon",
        &[IfcColumn],
        vec![
            reference(),
            entry("Slope", PlaneAngle).with_calculator("slope"),
            entry("Roll", PlaneAngle),
            is_external(),
            thermal_transmittance(),
            load_bearing(),
            PropertySetEntry::fire_rating(),
            status(),
        ],
    )
}

fn member_common() -> PropertySetDescription {
    set_with(
        "Pset_MemberCommon",
        &[IfcMember],
        vec![
            reference(),
            entry("Span", PositiveLength).with_calculator("span"),
            entry("Slope", PlaneAngle).with_calculator("slope"),
            is_external(),
            load_bearing(),
            PropertySetEntry::fire_rating(),
            status(),
        ],
    )
}

fn plate_common() -> PropertySetDescription {
    set_with(
        "Pset_PlateCommon",
        &[IfcPlate],
        vec![
            reference(),
            acoustic_rating(),
            PropertySetEntry::fire_rating(),
            thermal_transmittance(),
            is_external(),
            load_bearing(),
            status(),
        ],
    )
}

fn door_common() -> PropertySetDescription {
    set_with(
        "Pset_DoorCommon",
        &[IfcDoor],
        vec![
            reference(),
            PropertySetEntry::fire_rating(),
            acoustic_rating(),
            PropertySetEntry::label("SecurityRating"),
            is_external(),
            entry("Infiltration", VolumetricFlowRate),
            thermal_transmittance(),
            entry("GlazingAreaFraction", PositiveRatio),
            entry("HandicapAccessible", Boolean),
            entry("FireExit", Boolean),
            entry("SelfClosing", Boolean),
            entry("SmokeStop", Boolean),
            status(),
        ],
    )
}

fn window_common() -> PropertySetDescription {
    set_with(
        "Pset_WindowCommon",
        &[IfcWindow],
        vec![
            reference(),
            acoustic_rating(),
            PropertySetEntry::fire_rating(),
            PropertySetEntry::label("SecurityRating"),
            is_external(),
            entry("Infiltration", VolumetricFlowRate),
            thermal_transmittance(),
            entry("GlazingAreaFraction", PositiveRatio),
            entry("SmokeStop", Boolean),
            entry("FireExit", Boolean),
            status(),
        ],
    )
}

fn stair_common() -> PropertySetDescription {
    set_with(
        "Pset_StairCommon",
        &[IfcStair],
        vec![
            reference(),
            entry("NumberOfRiser", Count)
                .with_builtin(BuiltInParameter::StairsActualNumRisers)
                .with_calculator("stair_risers"),
            entry("NumberOfTreads", Count).with_calculator("stair_risers"),
            entry("RiserHeight", PositiveLength)
                .with_builtin(BuiltInParameter::StairsActualRiserHeight)
                .with_calculator("stair_risers"),
            entry("TreadLength", PositiveLength)
                .with_builtin(BuiltInParameter::StairsActualTreadDepth)
                .with_calculator("stair_risers"),
            PropertySetEntry::fire_rating(),
            is_external(),
            entry("HandicapAccessible", Boolean),
            entry("FireExit", Boolean),
            entry("RequiredHeadroom", PositiveLength),
            status(),
        ],
    )
}

fn stair_flight_common() -> PropertySetDescription {
    set_with(
        "Pset_StairFlightCommon",
        &[IfcStairFlight],
        vec![
            reference(),
            entry("NumberOfRiser", Count)
                .with_builtin(BuiltInParameter::StairsActualNumRisers)
                .with_calculator("stair_risers"),
            entry("NumberOfTreads", Count).with_calculator("stair_risers"),
            entry("RiserHeight", PositiveLength)
                .with_builtin(BuiltInParameter::StairsActualRiserHeight)
                .with_calculator("stair_risers"),
            entry("TreadLength", PositiveLength)
                .with_builtin(BuiltInParameter::StairsActualTreadDepth)
                .with_calculator("stair_risers"),
            entry("NosingLength", Length),
            entry("WalkingLineOffset", PositiveLength),
            entry("TreadLengthAtOffset", PositiveLength),
            entry("Headroom", PositiveLength),
            status(),
        ],
    )
}

fn ramp_common() -> PropertySetDescription {
    set_with(
        "Pset_RampCommon",
        &[IfcRamp],
        vec![
            reference(),
            entry("RequiredHeadroom", PositiveLength),
            entry("RequiredSlope", PlaneAngle),
            entry("HandicapAccessible", Boolean),
            is_external(),
            entry("FireExit", Boolean),
            PropertySetEntry::fire_rating(),
            status(),
        ],
    )
}

fn railing_common() -> PropertySetDescription {
    set_with(
        "Pset_RailingCommon",
        &[IfcRailing],
        vec![
            reference(),
            entry("Height", PositiveLength).with_builtin(BuiltInParameter::RailingHeight),
            entry("Diameter", PositiveLength),
            is_external(),
            status(),
        ],
    )
}

fn covering_common() -> PropertySetDescription {
    set_with(
        "Pset_CoveringCommon",
        &[IfcCovering],
        vec![
            reference(),
            acoustic_rating(),
            PropertySetEntry::label("FlammabilityRating"),
            PropertySetEntry::label("FragilityRating"),
            entry("Combustible", Boolean),
            PropertySetEntry::label("SurfaceSpreadOfFlame"),
            PropertySetEntry::label("Finish"),
            is_external(),
            thermal_transmittance(),
            PropertySetEntry::fire_rating(),
            status(),
        ],
    )
}

/// Space data; IFC2x3 also carries the room finishes here
fn space_common() -> PropertySetDescription {
    set_with(
        "Pset_SpaceCommon",
        &[IfcSpace],
        vec![
            reference(),
            is_external(),
            entry("GrossPlannedArea", Area).with_calculator("space_areas"),
            entry("NetPlannedArea", Area).with_calculator("space_areas"),
            entry("PubliclyAccessible", Boolean),
            entry("HandicapAccessible", Boolean),
            PropertySetEntry::label("FloorCovering").ifc2x3_only(),
            PropertySetEntry::label("WallCovering").ifc2x3_only(),
            PropertySetEntry::label("CeilingCovering").ifc2x3_only(),
            PropertySetEntry::label("SkirtingBoard").ifc2x3_only(),
            entry("ConcealedFlooring", Boolean).ifc2x3_only(),
            entry("ConcealedCeiling", Boolean).ifc2x3_only(),
            status(),
        ],
    )
}

fn proxy_common() -> PropertySetDescription {
    set_with(
        "Pset_BuildingElementProxyCommon",
        &[IfcBuildingElementProxy],
        vec![
            reference(),
            status(),
            is_external().ifc4_only(),
            load_bearing().ifc4_only(),
            thermal_transmittance().ifc4_only(),
        ],
    )
}

// ============================================================================
// Type objects and distribution elements
// ============================================================================

fn sanitary_terminal_bath() -> PropertySetDescription {
    set_with(
        "Pset_SanitaryTerminalTypeBath",
        &[IfcSanitaryTerminalType],
        vec![
            PropertySetEntry::label("BathType").enumerated(Enumeration::new(
                "PEnum_BathType",
                &[
                    "DOMESTIC",
                    "DOMESTICCORNER",
                    "FOOTBATH",
                    "JACUZZI",
                    "PLUNGE",
                    "SITZBATH",
                    "TREATMENT",
                    "WHIRLPOOL",
                    "OTHER",
                    "NOTKNOWN",
                    "UNSET",
                ],
            )),
            entry("DrainSize", PositiveLength),
            entry("HasGrabHandles", Boolean),
        ],
    )
    .for_types()
    .with_predefined_type("BATH")
}

fn space_heater_type_common() -> PropertySetDescription {
    set_with(
        "Pset_SpaceHeaterTypeCommon",
        &[IfcSpaceHeaterType],
        vec![
            reference(),
            PropertySetEntry::label("PlacementType").enumerated(Enumeration::new(
                "PEnum_SpaceHeaterPlacementType",
                &["BASEBOARD", "TOWELWARMER", "SUSPENDED", "WALL", "OTHER", "NOTKNOWN", "UNSET"],
            )),
            PropertySetEntry::label("TemperatureClassification").enumerated(Enumeration::new(
                "PEnum_SpaceHeaterTemperatureClassification",
                &["LOWTEMPERATURE", "HIGHTEMPERATURE", "OTHER", "NOTKNOWN", "UNSET"],
            )),
            PropertySetEntry::label("HeatTransferDimension").enumerated(Enumeration::new(
                "PEnum_HeatTransferDimension",
                &["POINT", "PATH", "SURFACE", "OTHER", "NOTKNOWN", "UNSET"],
            )),
            PropertySetEntry::label("HeatTransferMedium")
                .enumerated(Enumeration::new(
                    "PEnum_HeatTransferMedium",
                    &["WATER", "STEAM", "OTHER", "NOTKNOWN", "UNSET"],
                ))
                .ifc2x3_only(),
            PropertySetEntry::label("EnergySource")
                .enumerated(Enumeration::new(
                    "PEnum_EnergySource",
                    &[
                        "COAL",
                        "COAL_PULVERIZED",
                        "ELECTRICITY",
                        "GAS",
                        "OIL",
                        "PROPANE",
                        "WOOD",
                        "WOOD_CHIP",
                        "WOOD_PELLET",
                        "WOOD_PULVERIZED",
                        "OTHER",
                        "NOTKNOWN",
                        "UNSET",
                    ],
                ))
                .ifc2x3_only(),
            entry("BodyMass", Mass),
            entry("OutputCapacity", Power),
            entry("ThermalEfficiency", NormalisedRatio),
            entry("NumberOfPanels", Integer),
            entry("NumberOfSections", Integer),
            status(),
        ],
    )
    .for_types()
}

fn electric_appliance_type_common() -> PropertySetDescription {
    set_with(
        "Pset_ElectricApplianceTypeCommon",
        &[IfcElectricApplianceType],
        vec![
            reference(),
            PropertySetEntry::label("ApplianceType")
                .enumerated(Enumeration::new(
                    "IfcElectricApplianceTypeEnum",
                    &[
                        "COMPUTER",
                        "DIRECTWATERHEATER",
                        "DISHWASHER",
                        "ELECTRICCOOKER",
                        "ELECTRICHEATER",
                        "FACSIMILE",
                        "FREESTANDINGFAN",
                        "FREEZER",
                        "FRIDGE_FREEZER",
                        "HANDDRYER",
                        "INDIRECTWATERHEATER",
                        "MICROWAVE",
                        "PHOTOCOPIER",
                        "PRINTER",
                        "REFRIGERATOR",
                        "RADIANTHEATER",
                        "SCANNER",
                        "TELEPHONE",
                        "TUMBLEDRYER",
                        "TV",
                        "VENDINGMACHINE",
                        "WASHINGMACHINE",
                        "WATERHEATER",
                        "WATERCOOLER",
                        "USERDEFINED",
                        "NOTDEFINED",
                    ],
                ))
                .ifc2x3_only(),
            status(),
        ],
    )
    .for_types()
}

fn light_fixture_type_common() -> PropertySetDescription {
    set_with(
        "Pset_LightFixtureTypeCommon",
        &[IfcLightFixtureType],
        vec![
            reference(),
            entry("NumberOfSources", Integer),
            entry("TotalWattage", Power),
            PropertySetEntry::label("LightFixtureMountingType")
                .enumerated(Enumeration::new(
                    "PEnum_LightFixtureMountingType",
                    &[
                        "CABLESPANNED",
                        "FREESTANDING",
                        "POLE_SIDE",
                        "POLE_TOP",
                        "RECESSED",
                        "SURFACE",
                        "SUSPENDED",
                        "TRACKMOUNTED",
                        "OTHER",
                        "NOTKNOWN",
                        "UNSET",
                    ],
                ))
                .ifc4_only(),
            PropertySetEntry::label("LightFixturePlacingType")
                .enumerated(Enumeration::new(
                    "PEnum_LightFixturePlacingType",
                    &["CEILING", "FLOOR", "FURNITURE", "POLE", "WALL", "OTHER", "NOTKNOWN", "UNSET"],
                ))
                .ifc4_only(),
            entry("MaintenanceFactor", Real),
            entry("MaximumPlenumSensibleLoad", Power),
            entry("MaximumSpaceSensibleLoad", Power),
            entry("SensibleLoadToRadiant", PositiveRatio),
            status(),
        ],
    )
    .for_types()
}

/// Electrical ratings; the phase angle is positive-only in IFC2x3
fn electrical_device_common() -> PropertySetDescription {
    set_with(
        "Pset_ElectricalDeviceCommon",
        &[IfcDistributionElement],
        vec![
            entry("RatedCurrent", ElectricCurrent),
            entry("RatedVoltage", ElectricVoltage),
            entry("NominalFrequencyRange", Frequency),
            entry("PowerFactor", NormalisedRatio),
            entry("PhaseAngle", ElectricalPhaseAngle),
            entry("NumberOfPoles", Integer),
            entry("HasProtectiveEarth", Boolean).ifc4_only(),
            PropertySetEntry::label("IP_Code").ifc4_only(),
            PropertySetEntry::label("IK_Code").ifc4_only(),
            PropertySetEntry::label("ConductorFunction")
                .enumerated(Enumeration::new(
                    "PEnum_ConductorFunctionEnum",
                    &[
                        "PHASE_L1",
                        "PHASE_L2",
                        "PHASE_L3",
                        "NEUTRAL",
                        "PROTECTIVEEARTH",
                        "PROTECTIVEEARTHNEUTRAL",
                        "OTHER",
                        "NOTKNOWN",
                        "UNSET",
                    ],
                ))
                .ifc4_only(),
        ],
    )
}

fn rebar_bendings_bs8666() -> PropertySetDescription {
    set_with(
        "Pset_ReinforcingBarBendingsBS8666Common",
        &[IfcReinforcingBar],
        vec![
            PropertySetEntry::label("BarShapeCode").with_calculator("shape_code"),
            entry("A", PositiveLength),
            entry("B", PositiveLength),
            entry("C", PositiveLength),
            entry("D", PositiveLength),
            entry("E", PositiveLength),
            entry("R", PositiveLength),
        ],
    )
}

/// Every common property set, in catalog order
pub fn common_property_sets() -> Vec<PropertySetDescription> {
    vec![
        wall_common(),
        curtain_wall_common(),
        slab_common(),
        roof_common(),
        beam_common(),
        column_common(),
        member_common(),
        plate_common(),
        door_common(),
        window_common(),
        stair_common(),
        stair_flight_common(),
        ramp_common(),
        railing_common(),
        covering_common(),
        space_common(),
        proxy_common(),
        sanitary_terminal_bath(),
        space_heater_type_common(),
        electric_appliance_type_common(),
        light_fixture_type_common(),
        electrical_device_common(),
        rebar_bendings_bs8666(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::CalculatorRegistry;
    use crate::description::SetTarget;
    use ifc_lite_model::IfcSchema;

    #[test]
    fn test_names_are_unique() {
        let sets = common_property_sets();
        let mut names: Vec<_> = sets.iter().map(|d| d.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), sets.len());
    }

    #[test]
    fn test_all_entries_validate() {
        let calculators = CalculatorRegistry::new();
        for set in common_property_sets() {
            set.validate(&calculators).unwrap();
        }
    }

    #[test]
    fn test_type_sets() {
        let bath = sanitary_terminal_bath();
        assert_eq!(bath.target, SetTarget::Type);
        assert_eq!(bath.predefined_type.as_deref(), Some("BATH"));
        assert_eq!(wall_common().target, SetTarget::Instance);
    }

    #[test]
    fn test_space_finishes_only_in_ifc2x3() {
        let space = space_common();
        let floor = space
            .entries
            .iter()
            .find(|e| e.name == "FloorCovering")
            .unwrap();
        assert!(floor.schema.admits(IfcSchema::Ifc2x3));
        assert!(!floor.schema.admits(IfcSchema::Ifc4));
    }

    #[test]
    fn test_appliance_enum_has_electric_heater() {
        let appliance = electric_appliance_type_common();
        let entry = appliance
            .entries
            .iter()
            .find(|e| e.name == "ApplianceType")
            .unwrap();
        let enumeration = entry.enumeration.as_ref().unwrap();
        assert_eq!(enumeration.find("Electric Heater"), Some("ELECTRICHEATER"));
    }
}
