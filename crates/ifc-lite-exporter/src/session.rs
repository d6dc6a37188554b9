// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export session
//!
//! One session owns everything that lives for a single export: the
//! catalog, the calculators, the value and enumeration caches, and the
//! writer. Nothing is shared between sessions.

use crate::cache::CacheStats;
use crate::calculators::CalculatorRegistry;
use crate::catalog::{Catalog, ExporterInitializer};
use crate::category::{CategoryMap, Classification};
use crate::definition::{load_definitions, UserDefinedPropertySet};
use crate::description::{BuildContext, SetTarget};
use crate::factory::PropertyValueFactory;
use crate::guid::property_set_guid;
use crate::internal::internal_property_sets;
use crate::options::ExportOptions;
use crate::parameters::ParameterResolver;
use crate::units::UnitScaler;
use ifc_lite_model::{
    ElementId, ElementResolver, ElementResolverExt, EntityId, ExportError, HostElement,
    IfcElementQuantityRecord, IfcPropertySetRecord, IfcWriter, Result,
};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// What was written for one element
#[derive(Clone, Debug, PartialEq)]
pub struct ElementExport {
    pub classification: Classification,
    /// Property sets, catalog sets first
    pub property_sets: Vec<EntityId>,
    pub quantities: Vec<EntityId>,
    /// One relation per set, empty when exported without a handle
    pub relations: Vec<EntityId>,
}

impl ElementExport {
    /// All definitions written, property sets then quantities
    pub fn definitions(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.property_sets
            .iter()
            .chain(self.quantities.iter())
            .copied()
    }

    pub fn is_empty(&self) -> bool {
        self.property_sets.is_empty() && self.quantities.is_empty()
    }
}

/// Maps host elements to IFC property sets for one export
///
/// # Example
///
/// ```ignore
/// use ifc_lite_exporter::{ExportOptions, ExportSession, IfcStore, SnapshotModel};
///
/// let model = Arc::new(SnapshotModel::from_path("model.json")?);
/// let options = ExportOptions::new(IfcSchema::Ifc4).with_base_quantities(true);
/// let mut session = ExportSession::new(options, model, IfcStore::new(IfcSchema::Ifc4))?;
/// session.export_element(ElementId(1), Some(EntityId(100)))?;
/// let store = session.finish();
/// println!("{}", store.to_step());
/// ```
pub struct ExportSession<W: IfcWriter> {
    options: ExportOptions,
    model: Arc<dyn ElementResolver>,
    writer: W,
    factory: PropertyValueFactory,
    calculators: CalculatorRegistry,
    categories: CategoryMap,
    catalog: Catalog,
}

impl<W: IfcWriter> ExportSession<W> {
    /// Start a session, reading the user-defined definition file if enabled
    pub fn new(options: ExportOptions, model: Arc<dyn ElementResolver>, writer: W) -> Result<Self> {
        let definitions = match (
            options.export_user_defined_psets,
            &options.user_defined_psets_path,
        ) {
            (true, Some(path)) => load_definitions(path)?,
            _ => Vec::new(),
        };
        Self::with_definitions(options, model, writer, definitions)
    }

    /// Start a session with already parsed user-defined sets
    pub fn with_definitions(
        options: ExportOptions,
        model: Arc<dyn ElementResolver>,
        writer: W,
        definitions: Vec<UserDefinedPropertySet>,
    ) -> Result<Self> {
        Self::with_calculators(
            options,
            model,
            writer,
            definitions,
            CalculatorRegistry::new(),
        )
    }

    /// Start a session with a custom calculator registry
    ///
    /// Fails if any catalog entry names a calculator the registry lacks.
    pub fn with_calculators(
        options: ExportOptions,
        model: Arc<dyn ElementResolver>,
        writer: W,
        definitions: Vec<UserDefinedPropertySet>,
        calculators: CalculatorRegistry,
    ) -> Result<Self> {
        options.validate()?;
        let schema = options.schema;

        let schedules = if options.export_schedules_as_psets {
            model.schedules()
        } else {
            Vec::new()
        };
        let catalog = ExporterInitializer::build(&options, schema, &definitions, &schedules)?;
        catalog.validate(&calculators)?;

        let mut categories = CategoryMap::default();
        for (category, entity) in options.parsed_category_overrides() {
            categories = categories.with_override(category, entity);
        }

        let factory = PropertyValueFactory::new(schema, UnitScaler::new(&model.project_units()));

        Ok(Self {
            options,
            model,
            writer,
            factory,
            calculators,
            categories,
            catalog,
        })
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.factory.cache_stats()
    }

    /// Categorize an element under the session's schema and overrides
    pub fn classify(&self, element: &HostElement) -> Result<Classification> {
        let params = ParameterResolver::new(&*self.model, self.options.language);
        self.categories
            .classify(&params, element, self.options.schema)
    }

    /// Export an instance element
    ///
    /// Sets are related to `handle` when one is given.
    pub fn export_element(
        &mut self,
        id: ElementId,
        handle: Option<EntityId>,
    ) -> Result<ElementExport> {
        let element = self.model.get_or_err(id)?;
        self.export(&element, handle, SetTarget::Instance)
    }

    /// Export a type object; only type sets are built
    pub fn export_type(&mut self, id: ElementId, handle: Option<EntityId>) -> Result<ElementExport> {
        let element = self.model.get_or_err(id)?;
        if !element.is_type {
            return Err(ExportError::other(format!(
                "element {} is not a type object",
                id
            )));
        }
        self.export(&element, handle, SetTarget::Type)
    }

    fn export(
        &mut self,
        element: &HostElement,
        handle: Option<EntityId>,
        target: SetTarget,
    ) -> Result<ElementExport> {
        let classification = self.classify(element)?;
        let property_sets = self.property_sets_for(element, &classification, target)?;
        let quantities = match target {
            SetTarget::Instance => self.quantities_for(element, &classification)?,
            SetTarget::Type => Vec::new(),
        };

        let mut relations = Vec::new();
        if let Some(handle) = handle {
            for definition in property_sets.iter().chain(quantities.iter()) {
                relations.push(self.writer.relate(*definition, &[handle]));
            }
        }

        log::debug!(
            "element {} as {}: {} property sets, {} quantity sets",
            element.id,
            classification.entity_type.name(),
            property_sets.len(),
            quantities.len()
        );
        Ok(ElementExport {
            classification,
            property_sets,
            quantities,
            relations,
        })
    }

    /// Build and write every property set for `element`
    ///
    /// Catalog sets come first, then internal parameter groups when enabled.
    /// A set name is written at most once per element.
    pub fn property_sets_for(
        &mut self,
        element: &HostElement,
        classification: &Classification,
        target: SetTarget,
    ) -> Result<Vec<EntityId>> {
        let schema = self.options.schema;
        let params = ParameterResolver::new(&*self.model, self.options.language);
        let element_type = match target {
            SetTarget::Instance => self.model.type_of(element),
            SetTarget::Type => None,
        };
        let mut ctx = BuildContext {
            params: &params,
            calculators: &self.calculators,
            factory: &mut self.factory,
            writer: &mut self.writer,
            classification,
        };

        let mut produced: FxHashSet<String> = FxHashSet::default();
        let mut sets = Vec::new();
        for description in self
            .catalog
            .applicable_sets(element.id, classification, schema, target)
        {
            let name = description.name_for(schema);
            if produced.contains(name) {
                log::debug!("duplicate set '{}' on element {} skipped", name, element.id);
                continue;
            }
            let properties = description.build_properties(&mut ctx, element, element_type.as_deref())?;
            if properties.is_empty() {
                continue;
            }
            sets.push(ctx.writer.add_property_set(IfcPropertySetRecord {
                global_id: property_set_guid(element.id, name, target),
                name: name.to_string(),
                description: None,
                properties,
            }));
            produced.insert(name.to_string());
        }

        if self.options.export_internal_parameters {
            for set in internal_property_sets(&mut ctx, element, &produced)? {
                sets.push(ctx.writer.add_property_set(IfcPropertySetRecord {
                    global_id: property_set_guid(element.id, &set.name, target),
                    name: set.name,
                    description: None,
                    properties: set.properties,
                }));
            }
        }
        Ok(sets)
    }

    /// Build and write the base quantity sets for an instance element
    pub fn quantities_for(
        &mut self,
        element: &HostElement,
        classification: &Classification,
    ) -> Result<Vec<EntityId>> {
        let schema = self.options.schema;
        let params = ParameterResolver::new(&*self.model, self.options.language);
        let element_type = self.model.type_of(element);
        let mut ctx = BuildContext {
            params: &params,
            calculators: &self.calculators,
            factory: &mut self.factory,
            writer: &mut self.writer,
            classification,
        };

        let mut produced: FxHashSet<&str> = FxHashSet::default();
        let mut sets = Vec::new();
        for description in self
            .catalog
            .applicable_quantities(&classification.entity_type, schema)
        {
            let name = description.name_for(schema);
            if !produced.insert(name) {
                continue;
            }
            let quantities =
                description.build_quantities(&mut ctx, element, element_type.as_deref())?;
            if quantities.is_empty() {
                continue;
            }
            sets.push(ctx.writer.add_element_quantity(IfcElementQuantityRecord {
                global_id: property_set_guid(element.id, name, SetTarget::Instance),
                name: name.to_string(),
                method_of_measurement: description.method_of_measurement.clone(),
                quantities,
            }));
        }
        Ok(sets)
    }

    /// End the session and hand back the writer
    pub fn finish(self) -> W {
        let stats = self.factory.cache_stats();
        log::info!(
            "export finished: {} cached values, {} hits, {} misses",
            stats.entries,
            stats.hits,
            stats.misses
        );
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotModel;
    use crate::store::IfcStore;
    use ifc_lite_model::{
        BuiltInParameter, IfcEntityType, IfcSchema, IfcValue, Parameter, ParameterValue,
        ScheduleDefinition, ScheduleField,
    };

    fn wall_model() -> SnapshotModel {
        let mut model = SnapshotModel::new();
        model.insert(HostElement::new_type(10, "Basic Wall 200").with_category("Walls"));
        for id in [1, 2] {
            model.insert(
                HostElement::new(id, "Wall")
                    .with_category("Walls")
                    .with_type(10)
                    .with_parameter(Parameter::builtin(
                        BuiltInParameter::FireRating,
                        ParameterValue::String("F90".into()),
                    ))
                    .with_parameter(Parameter::builtin(
                        BuiltInParameter::Function,
                        ParameterValue::Integer(1),
                    ))
                    .with_parameter(
                        Parameter::builtin(BuiltInParameter::CurveElemLength, ParameterValue::Double(10.0)),
                    )
                    .with_parameter(
                        Parameter::builtin(BuiltInParameter::WallWidth, ParameterValue::Double(0.5)),
                    ),
            );
        }
        model
    }

    fn session(options: ExportOptions, model: SnapshotModel) -> ExportSession<IfcStore> {
        let schema = options.schema;
        ExportSession::new(options, Arc::new(model), IfcStore::new(schema)).unwrap()
    }

    fn property_names(store: &IfcStore, set: EntityId) -> Vec<String> {
        store
            .property_set(set)
            .unwrap()
            .properties
            .iter()
            .map(|id| store.property(*id).unwrap().name.clone())
            .collect()
    }

    #[test]
    fn test_export_wall() {
        let mut session = session(ExportOptions::new(IfcSchema::Ifc4), wall_model());
        let export = session.export_element(ElementId(1), Some(EntityId(500))).unwrap();
        assert_eq!(export.classification.entity_type, IfcEntityType::IfcWall);
        assert_eq!(export.property_sets.len(), 1);
        assert!(export.quantities.is_empty());
        assert_eq!(export.relations.len(), 1);

        let store = session.finish();
        let set = store.property_set(export.property_sets[0]).unwrap();
        assert_eq!(set.name, "Pset_WallCommon");
        assert_eq!(set.global_id.len(), 22);
        assert_eq!(
            property_names(&store, export.property_sets[0]),
            vec!["Reference", "FireRating", "IsExternal"]
        );
        assert_eq!(store.definitions_of(EntityId(500)), export.property_sets);
    }

    #[test]
    fn test_identical_values_shared() {
        let mut session = session(ExportOptions::new(IfcSchema::Ifc4), wall_model());
        let first = session.export_element(ElementId(1), None).unwrap();
        let second = session.export_element(ElementId(2), None).unwrap();
        assert!(first.relations.is_empty());

        let store = session.writer();
        let a = &store.property_set(first.property_sets[0]).unwrap().properties;
        let b = &store.property_set(second.property_sets[0]).unwrap().properties;
        // Free text is written per element, booleans are shared
        assert_ne!(a[1], b[1]);
        assert_eq!(a[2], b[2]);
        assert_ne!(
            store.property_set(first.property_sets[0]).unwrap().global_id,
            store.property_set(second.property_sets[0]).unwrap().global_id
        );
        assert!(session.cache_stats().hits >= 1);
    }

    #[test]
    fn test_base_quantities() {
        let options = ExportOptions::new(IfcSchema::Ifc2x3).with_base_quantities(true);
        let mut session = session(options, wall_model());
        let export = session.export_element(ElementId(1), Some(EntityId(500))).unwrap();
        assert_eq!(export.quantities.len(), 1);
        assert_eq!(export.relations.len(), 2);

        let store = session.finish();
        let quantities = store.element_quantity(export.quantities[0]).unwrap();
        assert_eq!(quantities.name, "BaseQuantities");
        assert_eq!(quantities.method_of_measurement.as_deref(), Some("BaseQuantities"));
        let names: Vec<_> = quantities
            .quantities
            .iter()
            .map(|id| store.quantity(*id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["Length", "Width", "GrossFootprintArea"]);
    }

    #[test]
    fn test_internal_parameters() {
        let mut model = wall_model();
        model.insert(
            HostElement::new(3, "Wall")
                .with_category("Walls")
                .with_parameter(Parameter::string("Comments", "check").with_group("Identity Data"))
                .with_parameter(Parameter::string("Finish", "paint").with_group("Pset_WallCommon"))
                .with_parameter(Parameter::builtin(
                    BuiltInParameter::FireRating,
                    ParameterValue::String("F30".into()),
                )),
        );
        let options = ExportOptions::new(IfcSchema::Ifc4).with_internal_parameters(true);
        let mut session = session(options, model);
        let export = session.export_element(ElementId(3), None).unwrap();

        let store = session.finish();
        let names: Vec<_> = export
            .property_sets
            .iter()
            .map(|id| store.property_set(*id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["Pset_WallCommon", "Identity Data", "Other"]);
    }

    #[test]
    fn test_export_type() {
        let mut model = SnapshotModel::new();
        model.insert(
            HostElement::new_type(20, "Bathtub 1700")
                .with_category("Plumbing Fixtures")
                .with_parameter(Parameter::string("IfcExportType", "BATH"))
                .with_parameter(Parameter::double("DrainSize", 0.164)),
        );
        model.insert(HostElement::new(21, "Bathtub").with_category("Plumbing Fixtures").with_type(20));
        let mut session = session(ExportOptions::new(IfcSchema::Ifc4), model);

        let export = session.export_type(ElementId(20), None).unwrap();
        let store = session.writer();
        let names: Vec<_> = export
            .property_sets
            .iter()
            .map(|id| store.property_set(*id).unwrap().name.clone())
            .collect();
        assert!(names.contains(&"Pset_SanitaryTerminalTypeBath".to_string()));
        assert!(session.export_type(ElementId(21), None).is_err());
    }

    #[test]
    fn test_schedule_sets() {
        let model = wall_model().with_schedule(ScheduleDefinition {
            id: ElementId(900),
            name: "Wall Schedule".into(),
            fields: vec![ScheduleField {
                heading: "Rating".into(),
                parameter: String::new(),
                builtin: Some(BuiltInParameter::FireRating),
                unit: None,
            }],
            elements: vec![ElementId(2)],
        });
        let options = ExportOptions::new(IfcSchema::Ifc4).with_schedules_as_psets(true);
        let mut session = session(options, model);

        let first = session.export_element(ElementId(1), None).unwrap();
        let second = session.export_element(ElementId(2), None).unwrap();
        assert_eq!(first.property_sets.len(), 1);
        assert_eq!(second.property_sets.len(), 2);
        let store = session.writer();
        let schedule = store.property_set(second.property_sets[1]).unwrap();
        assert_eq!(schedule.name, "Wall Schedule");
        let rating = store.property(schedule.properties[0]).unwrap();
        assert_eq!(rating.name, "Rating");
        assert_eq!(rating.single_value().and_then(IfcValue::as_str), Some("F90"));
    }

    #[test]
    fn test_errors() {
        let mut model = SnapshotModel::new();
        model.insert(HostElement::new(5, "Orphan"));
        let mut session = session(ExportOptions::new(IfcSchema::Ifc4), model);
        assert!(matches!(
            session.export_element(ElementId(5), None),
            Err(ExportError::MissingCategory(_))
        ));
        assert!(matches!(
            session.export_element(ElementId(6), None),
            Err(ExportError::ElementNotFound(_))
        ));
    }

    #[test]
    fn test_unknown_calculator_rejected() {
        let result = ExportSession::with_calculators(
            ExportOptions::new(IfcSchema::Ifc4),
            Arc::new(wall_model()),
            IfcStore::new(IfcSchema::Ifc4),
            Vec::new(),
            CalculatorRegistry::empty(),
        );
        assert!(matches!(
            result,
            Err(ExportError::UnknownCalculator { .. })
        ));
    }
}
