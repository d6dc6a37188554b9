// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Catalog of property set and quantity descriptions
//!
//! The catalog is assembled once per session from up to five sources, in
//! this order: common sets, COBie sets, user-defined sets, schedule sets,
//! and base quantities. Which sources are used depends on the export
//! options. Order matters: when two descriptions produce a set with the
//! same name for one element, the first one wins.

mod cobie;
mod common;
mod quantities;
mod schedules;

pub use cobie::cobie_property_sets;
pub use common::common_property_sets;
pub use quantities::base_quantities;
pub use schedules::schedule_property_set;

use crate::calculators::CalculatorRegistry;
use crate::category::Classification;
use crate::definition::UserDefinedPropertySet;
use crate::description::{PropertySetDescription, QuantityDescription, SetTarget};
use crate::options::ExportOptions;
use ifc_lite_model::{ElementId, IfcEntityType, IfcSchema, Result, ScheduleDefinition};

/// Ordered property set and quantity descriptions
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    property_sets: Vec<PropertySetDescription>,
    quantities: Vec<QuantityDescription>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property_sets(&self) -> &[PropertySetDescription] {
        &self.property_sets
    }

    pub fn quantities(&self) -> &[QuantityDescription] {
        &self.quantities
    }

    pub fn push_property_set(&mut self, description: PropertySetDescription) {
        self.property_sets.push(description);
    }

    pub fn push_quantities(&mut self, description: QuantityDescription) {
        self.quantities.push(description);
    }

    /// Find a property set description by name
    pub fn property_set(&self, name: &str) -> Option<&PropertySetDescription> {
        self.property_sets.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.property_sets.len() + self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.property_sets.is_empty() && self.quantities.is_empty()
    }

    /// Check every entry against the factory and the calculators
    ///
    /// A failure here is a catalog defect and stops the export.
    pub fn validate(&self, calculators: &CalculatorRegistry) -> Result<()> {
        for description in &self.property_sets {
            description.validate(calculators)?;
        }
        for description in &self.quantities {
            description.validate(calculators)?;
        }
        Ok(())
    }

    /// Property set descriptions to build for an element, in catalog order
    pub fn applicable_sets<'c>(
        &'c self,
        element: ElementId,
        classification: &'c Classification,
        schema: IfcSchema,
        target: SetTarget,
    ) -> impl Iterator<Item = &'c PropertySetDescription> + 'c {
        self.property_sets
            .iter()
            .filter(move |d| d.applies_to(element, classification, schema, target))
    }

    /// Quantity descriptions to build for an entity type, in catalog order
    pub fn applicable_quantities<'c>(
        &'c self,
        entity: &'c IfcEntityType,
        schema: IfcSchema,
    ) -> impl Iterator<Item = &'c QuantityDescription> + 'c {
        self.quantities
            .iter()
            .filter(move |d| d.applicable_to(entity, schema))
    }
}

/// Builds the catalog from the export options
pub struct ExporterInitializer;

impl ExporterInitializer {
    /// Assemble the catalog for `schema`
    ///
    /// `definitions` are the parsed user-defined sets and `schedules` the
    /// host schedules; each is only used when its option is enabled.
    pub fn build(
        options: &ExportOptions,
        schema: IfcSchema,
        definitions: &[UserDefinedPropertySet],
        schedules: &[ScheduleDefinition],
    ) -> Result<Catalog> {
        let mut catalog = Catalog::new();
        let keep = |d: &PropertySetDescription| d.schema.admits(schema);

        if options.export_common_psets {
            common_property_sets()
                .into_iter()
                .filter(keep)
                .for_each(|d| catalog.push_property_set(d));
        }
        if options.export_cobie_psets {
            cobie_property_sets()
                .into_iter()
                .filter(keep)
                .for_each(|d| catalog.push_property_set(d));
        }
        if options.export_user_defined_psets {
            definitions
                .iter()
                .cloned()
                .map(UserDefinedPropertySet::into_description)
                .for_each(|d| catalog.push_property_set(d));
        }
        if options.export_schedules_as_psets {
            schedules
                .iter()
                .filter_map(schedule_property_set)
                .for_each(|d| catalog.push_property_set(d));
        }
        if options.export_base_quantities {
            base_quantities()
                .into_iter()
                .filter(|d| d.schema.admits(schema))
                .for_each(|d| catalog.push_quantities(d));
        }

        log::info!(
            "catalog for {}: {} property sets, {} quantity sets",
            schema,
            catalog.property_sets.len(),
            catalog.quantities.len()
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::parse_definitions;
    use crate::description::SetBinding;
    use ifc_lite_model::{ScheduleField, UnitKind};

    fn names(catalog: &Catalog) -> Vec<&str> {
        catalog
            .property_sets()
            .iter()
            .map(|d| d.name.as_str())
            .collect()
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let calculators = CalculatorRegistry::new();
        for schema in [IfcSchema::Ifc2x3, IfcSchema::Ifc4] {
            let options = ExportOptions::new(schema)
                .with_cobie_psets(true)
                .with_base_quantities(true);
            let catalog = ExporterInitializer::build(&options, schema, &[], &[]).unwrap();
            catalog.validate(&calculators).unwrap();
        }
    }

    #[test]
    fn test_source_order() {
        let definitions =
            parse_definitions("PropertySet:\tAcme\tI\tIfcWall\n\tNote\tText\n").unwrap();
        let schedule = ScheduleDefinition {
            id: ElementId(900),
            name: "Door Schedule".into(),
            fields: vec![ScheduleField {
                heading: "Width".into(),
                parameter: "Width".into(),
                builtin: None,
                unit: Some(UnitKind::Length),
            }],
            elements: vec![ElementId(1)],
        };
        let mut options = ExportOptions::default()
            .with_cobie_psets(true)
            .with_schedules_as_psets(true)
            .with_base_quantities(true);
        options.export_user_defined_psets = true;

        let catalog =
            ExporterInitializer::build(&options, IfcSchema::Ifc4, &definitions, &[schedule])
                .unwrap();
        let names = names(&catalog);
        let wall = names.iter().position(|n| *n == "Pset_WallCommon").unwrap();
        let cobie = names.iter().position(|n| *n == "COBie_Component").unwrap();
        let acme = names.iter().position(|n| *n == "Acme").unwrap();
        let schedule = names.iter().position(|n| *n == "Door Schedule").unwrap();
        assert!(wall < cobie && cobie < acme && acme < schedule);
        assert_eq!(schedule, names.len() - 1);
        assert!(!catalog.quantities().is_empty());
        assert!(matches!(
            catalog.property_sets()[schedule].binding,
            SetBinding::Schedule { .. }
        ));
    }

    #[test]
    fn test_disabled_sources() {
        let options = ExportOptions::default().with_common_psets(false);
        let catalog = ExporterInitializer::build(&options, IfcSchema::Ifc4, &[], &[]).unwrap();
        assert!(catalog.is_empty());

        // User-defined sets are ignored unless enabled
        let definitions =
            parse_definitions("PropertySet:\tAcme\tI\tIfcWall\n\tNote\tText\n").unwrap();
        let catalog =
            ExporterInitializer::build(&options, IfcSchema::Ifc4, &definitions, &[]).unwrap();
        assert!(catalog.property_set("Acme").is_none());
    }

    #[test]
    fn test_applicable_sets_follow_classification() {
        let options = ExportOptions::default();
        let catalog = ExporterInitializer::build(&options, IfcSchema::Ifc4, &[], &[]).unwrap();
        let wall = Classification::new(IfcEntityType::IfcWallStandardCase, "Walls");
        let sets: Vec<_> = catalog
            .applicable_sets(ElementId(1), &wall, IfcSchema::Ifc4, SetTarget::Instance)
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(sets, vec!["Pset_WallCommon"]);

        let column = Classification::new(IfcEntityType::IfcColumn, "Columns");
        assert!(catalog
            .applicable_sets(ElementId(1), &column, IfcSchema::Ifc4, SetTarget::Instance)
            .all(|d| d.name != "Pset_WallCommon"));
    }
}
