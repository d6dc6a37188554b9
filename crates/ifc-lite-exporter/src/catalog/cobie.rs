// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! COBie handover property sets

use crate::description::PropertySetDescription;
use crate::entry::PropertySetEntry;
use ifc_lite_model::{BuiltInParameter, IfcEntityType, PropertyKind};

/// Entities exported as COBie components
fn components() -> Vec<IfcEntityType> {
    use IfcEntityType::*;
    vec![
        IfcWall,
        IfcCurtainWall,
        IfcSlab,
        IfcRoof,
        IfcBeam,
        IfcColumn,
        IfcMember,
        IfcPlate,
        IfcDoor,
        IfcWindow,
        IfcStair,
        IfcRamp,
        IfcRailing,
        IfcCovering,
        IfcBuildingElementProxy,
        IfcFurnishingElement,
        IfcDistributionElement,
    ]
}

fn label(name: &str) -> PropertySetEntry {
    PropertySetEntry::label(name)
}

fn component() -> PropertySetDescription {
    let mut set = PropertySetDescription::new("COBie_Component");
    set.entity_types = components();
    set.entry(
        PropertySetEntry::new("AssetIdentifier", PropertyKind::Identifier)
            .with_builtin(BuiltInParameter::Mark),
    )
    .entry(label("BarCode"))
    .entry(label("InstallationDate"))
    .entry(label("SerialNumber"))
    .entry(label("TagNumber").with_builtin(BuiltInParameter::Mark))
    .entry(label("WarrantyStartDate"))
}

/// Type sets apply to every type object
fn type_set(name: &str) -> PropertySetDescription {
    PropertySetDescription::new(name).for_types()
}

fn cobie_type() -> PropertySetDescription {
    type_set("COBie_Type")
        .entry(label("AssetType"))
        .entry(label("Category"))
        .entry(label("Manufacturer").with_builtin(BuiltInParameter::Manufacturer))
        .entry(label("ModelNumber").with_builtin(BuiltInParameter::Model))
        .entry(label("ModelReference").with_builtin(BuiltInParameter::TypeMark))
        .entry(PropertySetEntry::new("NominalLength", PropertyKind::PositiveLength))
        .entry(
            PropertySetEntry::new("NominalWidth", PropertyKind::PositiveLength)
                .with_builtin(BuiltInParameter::FamilyWidth),
        )
        .entry(
            PropertySetEntry::new("NominalHeight", PropertyKind::PositiveLength)
                .with_builtin(BuiltInParameter::FamilyHeight),
        )
        .entry(label("Shape"))
        .entry(label("Size"))
        .entry(label("Color"))
        .entry(label("Finish"))
        .entry(label("Grade"))
        .entry(label("Material"))
        .entry(label("Constituents"))
        .entry(label("Features"))
        .entry(label("AccessibilityPerformance"))
        .entry(label("CodePerformance"))
        .entry(label("SustainabilityPerformance"))
}

fn space() -> PropertySetDescription {
    PropertySetDescription::new("COBie_Space")
        .for_entity(IfcEntityType::IfcSpace)
        .entry(label("RoomTag").with_builtin(BuiltInParameter::RoomNumber))
        .entry(
            PropertySetEntry::new("UsableHeight", PropertyKind::PositiveLength)
                .with_builtin(BuiltInParameter::RoomHeight),
        )
        .entry(
            PropertySetEntry::new("GrossArea", PropertyKind::Area)
                .with_builtin(BuiltInParameter::RoomArea),
        )
        .entry(
            PropertySetEntry::new("NetArea", PropertyKind::Area)
                .with_builtin(BuiltInParameter::RoomArea),
        )
}

fn warranty() -> PropertySetDescription {
    type_set("COBie_Warranty")
        .entry(label("WarrantyGuarantorParts"))
        .entry(PropertySetEntry::new("WarrantyDurationParts", PropertyKind::Real))
        .entry(label("WarrantyGuarantorLabor"))
        .entry(PropertySetEntry::new("WarrantyDurationLabor", PropertyKind::Real))
        .entry(label("WarrantyDurationUnit"))
        .entry(PropertySetEntry::new("WarrantyDescription", PropertyKind::Text))
}

fn economical_impact_values() -> PropertySetDescription {
    type_set("COBie_EconomicalImpactValues").entry(
        PropertySetEntry::new("ReplacementCost", PropertyKind::Monetary)
            .with_builtin(BuiltInParameter::Cost),
    )
}

fn service_life() -> PropertySetDescription {
    type_set("COBie_ServiceLife")
        .entry(PropertySetEntry::new("ServiceLifeDuration", PropertyKind::Real))
        .entry(label("DurationUnit"))
}

/// Every COBie property set, in catalog order
pub fn cobie_property_sets() -> Vec<PropertySetDescription> {
    vec![
        component(),
        cobie_type(),
        space(),
        warranty(),
        economical_impact_values(),
        service_life(),
    ]
}
