// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Base quantity sets (Qto_...BaseQuantities)

use crate::description::QuantityDescription;
use crate::entry::QuantityEntry;
use ifc_lite_model::{BuiltInParameter as B, IfcEntityType, QuantityType};

fn length(name: &str, id: B) -> QuantityEntry {
    QuantityEntry::builtin(name, QuantityType::Length, id)
}

fn area(name: &str, id: B) -> QuantityEntry {
    QuantityEntry::builtin(name, QuantityType::Area, id)
}

fn volume(name: &str, id: B) -> QuantityEntry {
    QuantityEntry::builtin(name, QuantityType::Volume, id)
}

fn wall() -> QuantityDescription {
    QuantityDescription::base_quantities("Qto_WallBaseQuantities")
        .for_entity(IfcEntityType::IfcWall)
        .entry(length("Length", B::CurveElemLength))
        .entry(length("Width", B::WallWidth))
        .entry(length("Height", B::WallUserHeight))
        .entry(QuantityEntry::calculated(
            "GrossFootprintArea",
            QuantityType::Area,
            "gross_footprint_area",
        ))
        .entry(area("GrossSideArea", B::HostAreaComputed))
        .entry(volume("GrossVolume", B::HostVolumeComputed))
}

fn slab() -> QuantityDescription {
    QuantityDescription::base_quantities("Qto_SlabBaseQuantities")
        .for_entity(IfcEntityType::IfcSlab)
        .entry(length("Width", B::FloorThickness))
        .entry(length("Perimeter", B::HostPerimeterComputed))
        .entry(area("GrossArea", B::HostAreaComputed))
        .entry(volume("GrossVolume", B::HostVolumeComputed))
}

fn beam() -> QuantityDescription {
    QuantityDescription::base_quantities("Qto_BeamBaseQuantities")
        .for_entity(IfcEntityType::IfcBeam)
        .entry(length("Length", B::StructuralFramingCutLength).with_calculator("span"))
        .entry(QuantityEntry::calculated(
            "CrossSectionArea",
            QuantityType::Area,
            "cross_section_area",
        ))
        .entry(volume("GrossVolume", B::HostVolumeComputed))
}

fn column() -> QuantityDescription {
    QuantityDescription::base_quantities("Qto_ColumnBaseQuantities")
        .for_entity(IfcEntityType::IfcColumn)
        .entry(length("Length", B::InstanceLength).with_calculator("span"))
        .entry(QuantityEntry::calculated(
            "CrossSectionArea",
            QuantityType::Area,
            "cross_section_area",
        ))
        .entry(volume("GrossVolume", B::HostVolumeComputed))
}

fn opening(name: &str, entity: IfcEntityType) -> QuantityDescription {
    QuantityDescription::base_quantities(name)
        .for_entity(entity)
        .entry(length("Height", B::FamilyHeight))
        .entry(length("Width", B::FamilyWidth))
        .entry(QuantityEntry::calculated(
            "Area",
            QuantityType::Area,
            "opening_area",
        ))
}

fn space() -> QuantityDescription {
    QuantityDescription::base_quantities("Qto_SpaceBaseQuantities")
        .for_entity(IfcEntityType::IfcSpace)
        .entry(length("Height", B::RoomHeight))
        .entry(length("GrossPerimeter", B::RoomPerimeter))
        .entry(area("GrossFloorArea", B::RoomArea))
        .entry(area("NetFloorArea", B::RoomArea))
        .entry(volume("GrossVolume", B::RoomVolume))
}

/// Every base quantity set, in catalog order
pub fn base_quantities() -> Vec<QuantityDescription> {
    vec![
        wall(),
        slab(),
        beam(),
        column(),
        opening("Qto_DoorBaseQuantities", IfcEntityType::IfcDoor),
        opening("Qto_WindowBaseQuantities", IfcEntityType::IfcWindow),
        space(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_model::IfcSchema;

    #[test]
    fn test_ifc2x3_name() {
        for set in base_quantities() {
            assert_eq!(set.name_for(IfcSchema::Ifc2x3), "BaseQuantities");
            assert!(set.name_for(IfcSchema::Ifc4).starts_with("Qto_"));
        }
    }

    #[test]
    fn test_applicability() {
        let sets = base_quantities();
        let door: Vec<_> = sets
            .iter()
            .filter(|d| d.applicable_to(&IfcEntityType::IfcDoorStandardCase, IfcSchema::Ifc4))
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(door, vec!["Qto_DoorBaseQuantities"]);
    }
}
