// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping from host categories to IFC entity types

use crate::parameters::ParameterResolver;
use ifc_lite_model::{ExportError, HostElement, IfcEntityType, IfcSchema, Result};
use rustc_hash::FxHashMap;

/// Parameter overriding the predefined type
pub const EXPORT_TYPE_PARAMETER: &str = "IfcExportType";
/// Parameter overriding the entity, optionally as `IfcEntity.PREDEFINED`
pub const EXPORT_AS_PARAMETER: &str = "IfcExportAs";

/// IFC entity types an element of some category is exported as
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryMapping {
    /// Instance entity in the IFC4 family
    pub ifc4: IfcEntityType,
    /// Instance entity in IFC2x3
    pub ifc2x3: IfcEntityType,
    /// Type object entity (IFC4 family)
    pub type_entity: IfcEntityType,
}

impl CategoryMapping {
    /// Mapping identical in both schemas
    pub fn new(entity: IfcEntityType, type_entity: IfcEntityType) -> Self {
        Self {
            ifc4: entity.clone(),
            ifc2x3: entity,
            type_entity,
        }
    }

    /// Mapping whose instance entity is new in IFC4
    pub fn with_ifc2x3(mut self, entity: IfcEntityType) -> Self {
        self.ifc2x3 = entity;
        self
    }

    pub fn instance_entity(&self, schema: IfcSchema) -> &IfcEntityType {
        if schema.is_ifc4_family() {
            &self.ifc4
        } else {
            &self.ifc2x3
        }
    }

    /// Type object entity; doors and windows use styles in IFC2x3
    pub fn type_entity(&self, schema: IfcSchema) -> IfcEntityType {
        if schema.is_ifc4_family() {
            return self.type_entity.clone();
        }
        match self.type_entity {
            IfcEntityType::IfcDoorType => IfcEntityType::IfcDoorStyle,
            IfcEntityType::IfcWindowType => IfcEntityType::IfcWindowStyle,
            _ => self.type_entity.clone(),
        }
    }
}

/// Result of categorizing one element
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub entity_type: IfcEntityType,
    pub predefined_type: Option<String>,
    /// Host category name
    pub category: String,
}

impl Classification {
    pub fn new(entity_type: IfcEntityType, category: impl Into<String>) -> Self {
        Self {
            entity_type,
            predefined_type: None,
            category: category.into(),
        }
    }

    pub fn with_predefined_type(mut self, predefined: impl Into<String>) -> Self {
        self.predefined_type = Some(predefined.into());
        self
    }
}

/// Host category -> IFC entity table with user overrides
pub struct CategoryMap {
    /// Lower-case category name -> mapping
    mappings: FxHashMap<String, CategoryMapping>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        use IfcEntityType::*;

        let mut map = Self {
            mappings: FxHashMap::default(),
        };
        map.insert("Walls", CategoryMapping::new(IfcWall, IfcWallType));
        map.insert("Curtain Walls", CategoryMapping::new(IfcCurtainWall, IfcCurtainWallType));
        map.insert("Floors", CategoryMapping::new(IfcSlab, IfcSlabType));
        map.insert("Roofs", CategoryMapping::new(IfcRoof, IfcRoofType));
        map.insert("Ceilings", CategoryMapping::new(IfcCovering, IfcCoveringType));
        map.insert("Structural Framing", CategoryMapping::new(IfcBeam, IfcBeamType));
        map.insert("Structural Columns", CategoryMapping::new(IfcColumn, IfcColumnType));
        map.insert("Columns", CategoryMapping::new(IfcColumn, IfcColumnType));
        map.insert("Structural Rebar", CategoryMapping::new(IfcReinforcingBar, IfcReinforcingBarType));
        map.insert("Doors", CategoryMapping::new(IfcDoor, IfcDoorType));
        map.insert("Windows", CategoryMapping::new(IfcWindow, IfcWindowType));
        map.insert("Stairs", CategoryMapping::new(IfcStair, IfcStairType));
        map.insert("Runs", CategoryMapping::new(IfcStairFlight, IfcStairFlightType));
        map.insert("Ramps", CategoryMapping::new(IfcRamp, IfcRampType));
        map.insert("Railings", CategoryMapping::new(IfcRailing, IfcRailingType));
        map.insert("Rooms", CategoryMapping::new(IfcSpace, IfcBuildingElementProxyType));
        map.insert("Areas", CategoryMapping::new(IfcSpace, IfcBuildingElementProxyType));
        map.insert(
            "Furniture",
            CategoryMapping::new(IfcFurniture, IfcFurnitureType).with_ifc2x3(IfcFurnishingElement),
        );
        map.insert(
            "Plumbing Fixtures",
            CategoryMapping::new(IfcSanitaryTerminal, IfcSanitaryTerminalType)
                .with_ifc2x3(IfcFlowTerminal),
        );
        map.insert(
            "Lighting Fixtures",
            CategoryMapping::new(IfcLightFixture, IfcLightFixtureType).with_ifc2x3(IfcFlowTerminal),
        );
        map.insert(
            "Electrical Equipment",
            CategoryMapping::new(IfcElectricAppliance, IfcElectricApplianceType)
                .with_ifc2x3(IfcFlowTerminal),
        );
        map.insert(
            "Mechanical Equipment",
            CategoryMapping::new(IfcSpaceHeater, IfcSpaceHeaterType)
                .with_ifc2x3(IfcEnergyConversionDevice),
        );
        map.insert(
            "Ducts",
            CategoryMapping::new(IfcDuctSegment, IfcBuildingElementProxyType)
                .with_ifc2x3(IfcFlowSegment),
        );
        map.insert(
            "Pipes",
            CategoryMapping::new(IfcPipeSegment, IfcBuildingElementProxyType)
                .with_ifc2x3(IfcFlowSegment),
        );
        map.insert(
            "Generic Models",
            CategoryMapping::new(IfcBuildingElementProxy, IfcBuildingElementProxyType),
        );
        map
    }
}

impl CategoryMap {
    /// Add or replace a category mapping
    pub fn insert(&mut self, category: &str, mapping: CategoryMapping) {
        self.mappings.insert(category.to_lowercase(), mapping);
    }

    /// Export every element of `category` as `entity` in all schemas
    pub fn with_override(mut self, category: &str, entity: IfcEntityType) -> Self {
        let type_entity = self
            .mappings
            .get(&category.to_lowercase())
            .map(|m| m.type_entity.clone())
            .unwrap_or(IfcEntityType::IfcBuildingElementProxyType);
        self.insert(category, CategoryMapping::new(entity, type_entity));
        self
    }

    pub fn get(&self, category: &str) -> Option<&CategoryMapping> {
        self.mappings.get(&category.to_lowercase())
    }

    fn mapping_or_proxy(&self, category: &str) -> CategoryMapping {
        match self.get(category) {
            Some(mapping) => mapping.clone(),
            None => {
                log::warn!(
                    "category '{}' has no IFC mapping, exporting as IfcBuildingElementProxy",
                    category
                );
                CategoryMapping::new(
                    IfcEntityType::IfcBuildingElementProxy,
                    IfcEntityType::IfcBuildingElementProxyType,
                )
            }
        }
    }

    /// Categorize an instance element
    ///
    /// An element without a category breaks the host's invariants and is
    /// an error.
    pub fn classify(
        &self,
        params: &ParameterResolver<'_>,
        element: &HostElement,
        schema: IfcSchema,
    ) -> Result<Classification> {
        let category = element
            .category
            .clone()
            .ok_or(ExportError::MissingCategory(element.id))?;
        let mapping = self.mapping_or_proxy(&category);
        let default_entity = if element.is_type {
            mapping.type_entity(schema)
        } else {
            mapping.instance_entity(schema).clone()
        };
        Ok(Self::apply_overrides(
            params,
            element,
            Classification::new(default_entity, category),
        ))
    }

    /// Apply `IfcExportAs` and `IfcExportType` (instance then type)
    fn apply_overrides(
        params: &ParameterResolver<'_>,
        element: &HostElement,
        mut classification: Classification,
    ) -> Classification {
        if let Some(export_as) = params.string(element, EXPORT_AS_PARAMETER) {
            let (entity, predefined) = split_export_as(&export_as);
            if !entity.is_empty() {
                classification.entity_type = IfcEntityType::parse(entity);
            }
            if let Some(predefined) = predefined {
                classification.predefined_type = Some(predefined.to_string());
            }
        }
        if let Some(predefined) = params.string(element, EXPORT_TYPE_PARAMETER) {
            let predefined = predefined.trim();
            if !predefined.is_empty() {
                classification.predefined_type = Some(predefined.to_string());
            }
        }
        classification
    }
}

/// Split `IfcWall.SHEAR` into entity and predefined type
fn split_export_as(value: &str) -> (&str, Option<&str>) {
    let value = value.trim();
    match value.split_once('.') {
        Some((entity, predefined)) if !predefined.trim().is_empty() => {
            (entity.trim(), Some(predefined.trim()))
        }
        Some((entity, _)) => (entity.trim(), None),
        None => (value, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotModel;
    use ifc_lite_model::{ElementId, ElementResolver, Language, Parameter};

    fn classify(model: &SnapshotModel, id: i64, schema: IfcSchema) -> Result<Classification> {
        let params = ParameterResolver::new(model, Language::English);
        let element = model.get(ElementId(id)).unwrap();
        CategoryMap::default().classify(&params, &element, schema)
    }

    #[test]
    fn test_missing_category_is_error() {
        let mut model = SnapshotModel::new();
        model.insert(HostElement::new(1, "Orphan"));
        match classify(&model, 1, IfcSchema::Ifc4) {
            Err(ExportError::MissingCategory(id)) => assert_eq!(id, ElementId(1)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_is_proxy() {
        let mut model = SnapshotModel::new();
        model.insert(HostElement::new(1, "Thing").with_category("Planting"));
        let c = classify(&model, 1, IfcSchema::Ifc4).unwrap();
        assert_eq!(c.entity_type, IfcEntityType::IfcBuildingElementProxy);
    }

    #[test]
    fn test_schema_specific_entities() {
        let mut model = SnapshotModel::new();
        model.insert(HostElement::new(1, "Bath").with_category("Plumbing Fixtures"));
        model.insert(HostElement::new_type(2, "Door type").with_category("Doors"));
        assert_eq!(
            classify(&model, 1, IfcSchema::Ifc4).unwrap().entity_type,
            IfcEntityType::IfcSanitaryTerminal
        );
        assert_eq!(
            classify(&model, 1, IfcSchema::Ifc2x3).unwrap().entity_type,
            IfcEntityType::IfcFlowTerminal
        );
        assert_eq!(
            classify(&model, 2, IfcSchema::Ifc2x3).unwrap().entity_type,
            IfcEntityType::IfcDoorStyle
        );
    }

    #[test]
    fn test_export_overrides() {
        let mut model = SnapshotModel::new();
        model.insert(
            HostElement::new_type(10, "Bath type")
                .with_category("Plumbing Fixtures")
                .with_parameter(Parameter::string(EXPORT_TYPE_PARAMETER, "BATH")),
        );
        model.insert(
            HostElement::new(1, "Bath")
                .with_category("Plumbing Fixtures")
                .with_type(10),
        );
        model.insert(
            HostElement::new(2, "Box")
                .with_category("Generic Models")
                .with_parameter(Parameter::string(EXPORT_AS_PARAMETER, "IfcWall.SHEAR")),
        );

        let bath = classify(&model, 1, IfcSchema::Ifc4).unwrap();
        assert_eq!(bath.predefined_type.as_deref(), Some("BATH"));

        let shear = classify(&model, 2, IfcSchema::Ifc4).unwrap();
        assert_eq!(shear.entity_type, IfcEntityType::IfcWall);
        assert_eq!(shear.predefined_type.as_deref(), Some("SHEAR"));
    }

    #[test]
    fn test_user_override() {
        let map = CategoryMap::default().with_override("Generic Models", IfcEntityType::IfcFurniture);
        assert_eq!(
            map.get("generic models").unwrap().instance_entity(IfcSchema::Ifc2x3),
            &IfcEntityType::IfcFurniture
        );
    }

    #[test]
    fn test_split_export_as() {
        assert_eq!(split_export_as("IfcWall"), ("IfcWall", None));
        assert_eq!(split_export_as("IfcWall.SHEAR"), ("IfcWall", Some("SHEAR")));
        assert_eq!(split_export_as("IfcWall."), ("IfcWall", None));
    }
}
