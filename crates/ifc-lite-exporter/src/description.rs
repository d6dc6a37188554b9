// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property set and quantity descriptions
//!
//! A description is a named bundle of entries plus the entity types it
//! applies to. Building it for an element runs every entry through
//! parameter resolution, then the calculator, then the value factory.
//! A description that yields no property produces no set at all.

use crate::calculators::{CalculatedValues, CalculatorInput, CalculatorRegistry};
use crate::category::Classification;
use crate::entry::{PropertySetEntry, QuantityEntry};
use crate::enumeration;
use crate::factory::{PropertyValueFactory, RawValue};
use crate::parameters::ParameterResolver;
use ifc_lite_model::{
    ElementId, EntityId, ExportError, HostElement, IfcEntityType, IfcSchema, IfcWriter, Result,
    SchemaGate,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// Whether a set describes instances or type objects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SetTarget {
    #[default]
    Instance,
    Type,
}

/// Which elements a set may be built for
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum SetBinding {
    /// Any element of a matching entity type
    #[default]
    Element,
    /// Only the elements listed by a host schedule
    Schedule {
        id: ElementId,
        elements: FxHashSet<ElementId>,
    },
}

impl SetBinding {
    pub fn admits(&self, element: ElementId) -> bool {
        match self {
            SetBinding::Element => true,
            SetBinding::Schedule { elements, .. } => elements.contains(&element),
        }
    }
}

/// Shared state for building the sets of one element
pub struct BuildContext<'a, 'm> {
    pub params: &'a ParameterResolver<'m>,
    pub calculators: &'a CalculatorRegistry,
    pub factory: &'a mut PropertyValueFactory,
    pub writer: &'a mut dyn IfcWriter,
    pub classification: &'a Classification,
}

/// Calculator results of one set build, by calculator name
type CalculationMemo = FxHashMap<String, Option<CalculatedValues>>;

impl BuildContext<'_, '_> {
    fn schema(&self) -> IfcSchema {
        self.factory.schema()
    }

    /// Output `output` of `calculator`, running it at most once per build
    fn calculated(
        &self,
        memo: &mut CalculationMemo,
        calculator: &str,
        output: &str,
        element: &HostElement,
        element_type: Option<&HostElement>,
    ) -> Result<Option<RawValue>> {
        if !memo.contains_key(calculator) {
            let f = self
                .calculators
                .get(calculator)
                .ok_or_else(|| ExportError::UnknownCalculator {
                    property: output.to_string(),
                    calculator: calculator.to_string(),
                })?;
            let input = CalculatorInput {
                element,
                element_type,
                params: self.params,
                classification: self.classification,
            };
            memo.insert(calculator.to_string(), f(&input));
        }
        Ok(memo
            .get(calculator)
            .and_then(Option::as_ref)
            .and_then(|values| values.get(output))
            .cloned())
    }

    /// Evaluate one property entry: parameter first, calculator second
    fn evaluate(
        &mut self,
        memo: &mut CalculationMemo,
        entry: &PropertySetEntry,
        element: &HostElement,
        element_type: Option<&HostElement>,
    ) -> Result<Option<EntityId>> {
        if !entry.schema.admits(self.schema()) {
            return Ok(None);
        }

        let resolved = entry
            .lookup(self.params.language())
            .and_then(|lookup| self.params.resolve(element, &lookup));
        let raw = match resolved {
            Some(raw) => Some(raw),
            None => match &entry.calculator {
                Some(calculator) => {
                    self.calculated(memo, calculator, &entry.name, element, element_type)?
                }
                None => None,
            },
        };

        match raw {
            Some(raw) => self.factory.create(
                &mut *self.writer,
                entry.kind,
                &entry.name,
                &raw,
                entry.representation,
                entry.enumeration.as_ref(),
            ),
            None => Ok(None),
        }
    }

    fn evaluate_quantity(
        &mut self,
        memo: &mut CalculationMemo,
        entry: &QuantityEntry,
        element: &HostElement,
        element_type: Option<&HostElement>,
    ) -> Result<Option<EntityId>> {
        if !entry.schema.admits(self.schema()) {
            return Ok(None);
        }

        let resolved = entry
            .lookup()
            .and_then(|lookup| self.params.resolve(element, &lookup));
        let raw = match resolved {
            Some(raw) => Some(raw),
            None => match &entry.calculator {
                Some(calculator) => {
                    self.calculated(memo, calculator, &entry.name, element, element_type)?
                }
                None => None,
            },
        };

        Ok(raw.and_then(|raw| {
            self.factory
                .create_quantity(&mut *self.writer, &entry.name, entry.quantity_type, &raw)
        }))
    }
}

/// A named, schema-aware property set definition
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySetDescription {
    pub name: String,
    /// Name used when exporting IFC2x3, if different
    pub ifc2x3_name: Option<String>,
    /// Entity types (and their subtypes) the set applies to; empty means all
    pub entity_types: Vec<IfcEntityType>,
    pub entries: Vec<PropertySetEntry>,
    pub schema: SchemaGate,
    /// Only applies to elements of this predefined type
    pub predefined_type: Option<String>,
    pub target: SetTarget,
    pub binding: SetBinding,
}

impl PropertySetDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ifc2x3_name: None,
            entity_types: Vec::new(),
            entries: Vec::new(),
            schema: SchemaGate::All,
            predefined_type: None,
            target: SetTarget::Instance,
            binding: SetBinding::Element,
        }
    }

    /// Add an applicable entity type
    pub fn for_entity(mut self, entity: IfcEntityType) -> Self {
        self.entity_types.push(entity);
        self
    }

    /// Describe type objects instead of instances
    pub fn for_types(mut self) -> Self {
        self.target = SetTarget::Type;
        self
    }

    pub fn entry(mut self, entry: PropertySetEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn with_ifc2x3_name(mut self, name: impl Into<String>) -> Self {
        self.ifc2x3_name = Some(name.into());
        self
    }

    pub fn with_predefined_type(mut self, predefined: impl Into<String>) -> Self {
        self.predefined_type = Some(predefined.into());
        self
    }

    pub fn with_schema(mut self, schema: SchemaGate) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_binding(mut self, binding: SetBinding) -> Self {
        self.binding = binding;
        self
    }

    /// Set name written for `schema`
    pub fn name_for(&self, schema: IfcSchema) -> &str {
        match (&self.ifc2x3_name, schema) {
            (Some(name), IfcSchema::Ifc2x3) => name,
            _ => &self.name,
        }
    }

    /// Check the entity type and schema gate
    pub fn applicable_to(&self, entity: &IfcEntityType, schema: IfcSchema) -> bool {
        self.schema.admits(schema)
            && (self.entity_types.is_empty() || self.entity_types.iter().any(|t| entity.is_a(t)))
    }

    /// Check everything that decides whether the set is built for an element
    pub fn applies_to(
        &self,
        element: ElementId,
        classification: &Classification,
        schema: IfcSchema,
        target: SetTarget,
    ) -> bool {
        if self.target != target
            || !self.binding.admits(element)
            || !self.applicable_to(&classification.entity_type, schema)
        {
            return false;
        }
        match (&self.predefined_type, &classification.predefined_type) {
            (None, _) => true,
            (Some(wanted), Some(actual)) => enumeration::matches(wanted, actual),
            (Some(_), None) => false,
        }
    }

    /// Create the properties of this set for one element
    ///
    /// Properties already produced under the same name by an earlier entry
    /// are not repeated.
    pub fn build_properties(
        &self,
        ctx: &mut BuildContext<'_, '_>,
        element: &HostElement,
        element_type: Option<&HostElement>,
    ) -> Result<Vec<EntityId>> {
        let mut memo = CalculationMemo::default();
        let mut produced: FxHashSet<&str> = FxHashSet::default();
        let mut properties = Vec::new();
        for entry in &self.entries {
            if produced.contains(entry.name.as_str()) {
                continue;
            }
            if let Some(id) = ctx.evaluate(&mut memo, entry, element, element_type)? {
                produced.insert(entry.name.as_str());
                properties.push(id);
            }
        }
        Ok(properties)
    }

    /// Check every entry against the factory and the calculator registry
    pub fn validate(&self, calculators: &CalculatorRegistry) -> Result<()> {
        for entry in &self.entries {
            entry.validate()?;
            if let Some(calculator) = &entry.calculator {
                if !calculators.contains(calculator) {
                    return Err(ExportError::UnknownCalculator {
                        property: entry.name.clone(),
                        calculator: calculator.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A named quantity set definition (Qto_...)
#[derive(Clone, Debug, PartialEq)]
pub struct QuantityDescription {
    pub name: String,
    /// IFC2x3 writes every base quantity set as "BaseQuantities"
    pub ifc2x3_name: Option<String>,
    pub method_of_measurement: Option<String>,
    pub entity_types: Vec<IfcEntityType>,
    pub entries: Vec<QuantityEntry>,
    pub schema: SchemaGate,
}

impl QuantityDescription {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ifc2x3_name: None,
            method_of_measurement: None,
            entity_types: Vec::new(),
            entries: Vec::new(),
            schema: SchemaGate::All,
        }
    }

    /// Base quantity set: "BaseQuantities" in IFC2x3
    pub fn base_quantities(name: impl Into<String>) -> Self {
        let mut description = Self::new(name);
        description.ifc2x3_name = Some("BaseQuantities".to_string());
        description.method_of_measurement = Some("BaseQuantities".to_string());
        description
    }

    pub fn for_entity(mut self, entity: IfcEntityType) -> Self {
        self.entity_types.push(entity);
        self
    }

    pub fn entry(mut self, entry: QuantityEntry) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn name_for(&self, schema: IfcSchema) -> &str {
        match (&self.ifc2x3_name, schema) {
            (Some(name), IfcSchema::Ifc2x3) => name,
            _ => &self.name,
        }
    }

    pub fn applicable_to(&self, entity: &IfcEntityType, schema: IfcSchema) -> bool {
        self.schema.admits(schema) && self.entity_types.iter().any(|t| entity.is_a(t))
    }

    /// Create the quantities of this set for one element
    pub fn build_quantities(
        &self,
        ctx: &mut BuildContext<'_, '_>,
        element: &HostElement,
        element_type: Option<&HostElement>,
    ) -> Result<Vec<EntityId>> {
        let mut memo = CalculationMemo::default();
        let mut produced: FxHashSet<&str> = FxHashSet::default();
        let mut quantities = Vec::new();
        for entry in &self.entries {
            if produced.contains(entry.name.as_str()) {
                continue;
            }
            if let Some(id) = ctx.evaluate_quantity(&mut memo, entry, element, element_type)? {
                produced.insert(entry.name.as_str());
                quantities.push(id);
            }
        }
        Ok(quantities)
    }

    pub fn validate(&self, calculators: &CalculatorRegistry) -> Result<()> {
        for entry in &self.entries {
            if let Some(calculator) = &entry.calculator {
                if !calculators.contains(calculator) {
                    return Err(ExportError::UnknownCalculator {
                        property: entry.name.clone(),
                        calculator: calculator.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SnapshotModel;
    use crate::store::IfcStore;
    use crate::units::UnitScaler;
    use ifc_lite_model::{
        BuiltInParameter, ElementResolver, HostUnits, IfcValue, Language, Parameter,
        ParameterValue, PropertyKind, QuantityType,
    };

    struct Fixture {
        model: SnapshotModel,
        store: IfcStore,
        factory: PropertyValueFactory,
        calculators: CalculatorRegistry,
    }

    impl Fixture {
        fn new(schema: IfcSchema, model: SnapshotModel) -> Self {
            Self {
                model,
                store: IfcStore::new(schema),
                factory: PropertyValueFactory::new(schema, UnitScaler::new(&HostUnits::metric())),
                calculators: CalculatorRegistry::new(),
            }
        }

        fn build(
            &mut self,
            description: &PropertySetDescription,
            id: i64,
            classification: &Classification,
        ) -> Vec<EntityId> {
            let params = ParameterResolver::new(&self.model, Language::English);
            let element = self.model.get(ElementId(id)).unwrap();
            let symbol = self.model.type_of(&element);
            let mut ctx = BuildContext {
                params: &params,
                calculators: &self.calculators,
                factory: &mut self.factory,
                writer: &mut self.store,
                classification,
            };
            description
                .build_properties(&mut ctx, &element, symbol.as_deref())
                .unwrap()
        }

        fn label(&self, id: EntityId) -> Option<String> {
            self.store
                .property(id)
                .and_then(|p| p.single_value())
                .and_then(IfcValue::as_str)
                .map(str::to_string)
        }
    }

    fn wall_common() -> PropertySetDescription {
        PropertySetDescription::new("Pset_WallCommon")
            .for_entity(IfcEntityType::IfcWall)
            .entry(PropertySetEntry::fire_rating())
            .entry(PropertySetEntry::label("Status").ifc4_only())
            .entry(PropertySetEntry::label("AcousticRating").ifc2x3_only())
            .entry(PropertySetEntry::calculated(
                "LoadBearing",
                PropertyKind::Boolean,
                "load_bearing",
            ))
    }

    fn wall_model() -> SnapshotModel {
        let mut model = SnapshotModel::new();
        model.insert(
            HostElement::new(1, "Wall")
                .with_category("Walls")
                .with_parameter(Parameter::builtin(
                    BuiltInParameter::FireRating,
                    ParameterValue::String("F90".into()),
                ))
                .with_parameter(Parameter::string("Status", "NEW"))
                .with_parameter(Parameter::string("AcousticRating", "52 dB")),
        );
        model
    }

    #[test]
    fn test_builtin_fire_rating() {
        let mut fx = Fixture::new(IfcSchema::Ifc4, wall_model());
        let classification = Classification::new(IfcEntityType::IfcWall, "Walls");
        let props = fx.build(&wall_common(), 1, &classification);
        let first = fx.store.property(props[0]).unwrap();
        assert_eq!(first.name, "FireRating");
        assert_eq!(fx.label(props[0]), Some("F90".to_string()));
    }

    #[test]
    fn test_schema_gating() {
        let classification = Classification::new(IfcEntityType::IfcWall, "Walls");

        let mut fx = Fixture::new(IfcSchema::Ifc4, wall_model());
        let props = fx.build(&wall_common(), 1, &classification);
        let names: Vec<_> = props
            .iter()
            .map(|id| fx.store.property(*id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["FireRating", "Status"]);

        let mut fx = Fixture::new(IfcSchema::Ifc2x3, wall_model());
        let props = fx.build(&wall_common(), 1, &classification);
        let names: Vec<_> = props
            .iter()
            .map(|id| fx.store.property(*id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["FireRating", "AcousticRating"]);
    }

    #[test]
    fn test_not_applicable_to_other_entities() {
        let description = wall_common();
        assert!(description.applicable_to(&IfcEntityType::IfcWallStandardCase, IfcSchema::Ifc4));
        assert!(!description.applicable_to(&IfcEntityType::IfcSlab, IfcSchema::Ifc4));
        let slab = Classification::new(IfcEntityType::IfcSlab, "Floors");
        assert!(!description.applies_to(ElementId(1), &slab, IfcSchema::Ifc4, SetTarget::Instance));
    }

    #[test]
    fn test_predefined_type_filter() {
        let bath = PropertySetDescription::new("Pset_SanitaryTerminalTypeBath")
            .for_entity(IfcEntityType::IfcSanitaryTerminalType)
            .for_types()
            .with_predefined_type("BATH");
        let typed = Classification::new(IfcEntityType::IfcSanitaryTerminalType, "Plumbing Fixtures")
            .with_predefined_type("bath");
        let sink = typed.clone().with_predefined_type("SINK");
        let untyped = Classification::new(IfcEntityType::IfcSanitaryTerminalType, "Plumbing Fixtures");
        assert!(bath.applies_to(ElementId(1), &typed, IfcSchema::Ifc4, SetTarget::Type));
        assert!(!bath.applies_to(ElementId(1), &typed, IfcSchema::Ifc4, SetTarget::Instance));
        assert!(!bath.applies_to(ElementId(1), &sink, IfcSchema::Ifc4, SetTarget::Type));
        assert!(!bath.applies_to(ElementId(1), &untyped, IfcSchema::Ifc4, SetTarget::Type));
    }

    #[test]
    fn test_empty_result_and_duplicates() {
        let mut model = SnapshotModel::new();
        model.insert(
            HostElement::new(1, "Wall")
                .with_category("Walls")
                .with_parameter(Parameter::string("Mark", "W1"))
                .with_parameter(Parameter::string("Tag", "T1")),
        );
        let mut fx = Fixture::new(IfcSchema::Ifc4, model);
        let classification = Classification::new(IfcEntityType::IfcWall, "Walls");

        let empty = PropertySetDescription::new("Pset_Empty")
            .entry(PropertySetEntry::label("Missing"));
        assert!(fx.build(&empty, 1, &classification).is_empty());

        let twice = PropertySetDescription::new("Pset_Twice")
            .entry(PropertySetEntry::label("Reference").with_parameter("Mark"))
            .entry(PropertySetEntry::label("Reference").with_parameter("Tag"));
        let props = fx.build(&twice, 1, &classification);
        assert_eq!(props.len(), 1);
        assert_eq!(fx.label(props[0]), Some("W1".to_string()));
    }

    #[test]
    fn test_calculator_runs_once_for_several_outputs() {
        let mut model = SnapshotModel::new();
        model.insert(
            HostElement::new(1, "Stair")
                .with_category("Stairs")
                .with_parameter(Parameter::builtin(
                    BuiltInParameter::StairsActualNumRisers,
                    ParameterValue::Integer(12),
                ))
                .with_parameter(Parameter::builtin(
                    BuiltInParameter::StairsHeight,
                    ParameterValue::Double(6.0),
                )),
        );
        let mut fx = Fixture::new(IfcSchema::Ifc4, model);
        let classification = Classification::new(IfcEntityType::IfcStair, "Stairs");
        let description = PropertySetDescription::new("Pset_StairCommon")
            .entry(PropertySetEntry::calculated("NumberOfRiser", PropertyKind::Count, "stair_risers"))
            .entry(PropertySetEntry::calculated(
                "RiserHeight",
                PropertyKind::PositiveLength,
                "stair_risers",
            ));
        let props = fx.build(&description, 1, &classification);
        assert_eq!(props.len(), 2);
        let riser = fx.store.property(props[1]).and_then(|p| p.single_value()).unwrap();
        approx::assert_relative_eq!(riser.as_f64().unwrap(), 0.5 * 304.8, epsilon = 1e-9);
    }

    #[test]
    fn test_unknown_calculator_fails_validation() {
        let description = PropertySetDescription::new("Pset_Broken").entry(
            PropertySetEntry::calculated("Span", PropertyKind::Length, "no_such_calculator"),
        );
        let err = description.validate(&CalculatorRegistry::new()).unwrap_err();
        assert!(err.is_catalog_defect());
    }

    #[test]
    fn test_quantities() {
        let mut model = SnapshotModel::new();
        model.insert(
            HostElement::new(1, "Door")
                .with_category("Doors")
                .with_parameter(Parameter::builtin(
                    BuiltInParameter::FamilyHeight,
                    ParameterValue::Double(7.0),
                ))
                .with_parameter(Parameter::builtin(
                    BuiltInParameter::FamilyWidth,
                    ParameterValue::Double(3.0),
                )),
        );
        let mut fx = Fixture::new(IfcSchema::Ifc2x3, model);
        let classification = Classification::new(IfcEntityType::IfcDoor, "Doors");
        let description = QuantityDescription::base_quantities("Qto_DoorBaseQuantities")
            .for_entity(IfcEntityType::IfcDoor)
            .entry(QuantityEntry::builtin("Height", QuantityType::Length, BuiltInParameter::FamilyHeight))
            .entry(QuantityEntry::calculated("Area", QuantityType::Area, "opening_area"));
        assert_eq!(description.name_for(IfcSchema::Ifc2x3), "BaseQuantities");

        let params = ParameterResolver::new(&fx.model, Language::English);
        let element = fx.model.get(ElementId(1)).unwrap();
        let mut ctx = BuildContext {
            params: &params,
            calculators: &fx.calculators,
            factory: &mut fx.factory,
            writer: &mut fx.store,
            classification: &classification,
        };
        let quantities = description.build_quantities(&mut ctx, &element, None).unwrap();
        assert_eq!(quantities.len(), 2);
        let area = fx.store.quantity(quantities[1]).unwrap();
        approx::assert_relative_eq!(area.value, 21.0 * 0.3048 * 0.3048, epsilon = 1e-9);
    }
}
