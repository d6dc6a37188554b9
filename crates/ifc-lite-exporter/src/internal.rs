// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host parameters exported as-is, one set per parameter group

use crate::description::BuildContext;
use ifc_lite_model::{
    EntityId, HostElement, Parameter, PropertyKind, Result, StorageType, ValueRepresentation,
};
use rustc_hash::FxHashSet;

/// Set name for parameters without a group
pub const DEFAULT_GROUP: &str = "Other";

/// Properties built for one parameter group
#[derive(Clone, Debug, PartialEq)]
pub struct InternalSet {
    pub name: String,
    pub properties: Vec<EntityId>,
}

/// Property kind for a raw host parameter, `None` when it holds no value
pub fn internal_kind(param: &Parameter) -> Option<PropertyKind> {
    match param.value.storage_type() {
        StorageType::None => None,
        StorageType::Integer => Some(PropertyKind::Integer),
        StorageType::Double => Some(
            param
                .unit
                .map(PropertyKind::from_unit)
                .unwrap_or(PropertyKind::Real),
        ),
        StorageType::String => Some(PropertyKind::Text),
        // Written as the referenced element's name
        StorageType::ElementId => Some(PropertyKind::Label),
    }
}

fn group_of(param: &Parameter) -> &str {
    param
        .group
        .as_deref()
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .unwrap_or(DEFAULT_GROUP)
}

/// Build one set per parameter group of `element`
///
/// Groups come out in order of first appearance. A group whose name is in
/// `taken` is skipped, as is a repeated parameter name inside a group.
pub fn internal_property_sets(
    ctx: &mut BuildContext<'_, '_>,
    element: &HostElement,
    taken: &FxHashSet<String>,
) -> Result<Vec<InternalSet>> {
    let mut groups: Vec<(&str, Vec<&Parameter>)> = Vec::new();
    for param in element.parameters.iter().filter(|p| p.has_value()) {
        let group = group_of(param);
        match groups.iter_mut().find(|(name, _)| *name == group) {
            Some((_, params)) => params.push(param),
            None => groups.push((group, vec![param])),
        }
    }

    let mut sets = Vec::new();
    for (group, params) in groups {
        if taken.contains(group) {
            log::debug!("internal set '{}' shadowed by a catalog set", group);
            continue;
        }

        let mut seen = FxHashSet::default();
        let mut properties = Vec::new();
        for param in params {
            if !seen.insert(param.name.as_str()) {
                continue;
            }
            let Some(kind) = internal_kind(param) else {
                continue;
            };
            let raw = ctx.params.raw_value(param);
            let created = ctx.factory.create(
                &mut *ctx.writer,
                kind,
                &param.name,
                &raw,
                ValueRepresentation::Single,
                None,
            )?;
            properties.extend(created);
        }

        if !properties.is_empty() {
            sets.push(InternalSet {
                name: group.to_string(),
                properties,
            });
        }
    }
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::CalculatorRegistry;
    use crate::category::Classification;
    use crate::factory::PropertyValueFactory;
    use crate::model::SnapshotModel;
    use crate::parameters::ParameterResolver;
    use crate::store::IfcStore;
    use crate::units::UnitScaler;
    use ifc_lite_model::{
        ElementId, ElementResolver, HostUnits, IfcEntityType, IfcSchema, IfcValue, Language,
        MeasureType, ParameterValue, UnitKind,
    };

    fn build(model: &SnapshotModel, store: &mut IfcStore, taken: &[&str]) -> Vec<InternalSet> {
        let params = ParameterResolver::new(model, Language::English);
        let calculators = CalculatorRegistry::empty();
        let mut factory =
            PropertyValueFactory::new(IfcSchema::Ifc4, UnitScaler::new(&HostUnits::metric()));
        let classification = Classification::new(IfcEntityType::IfcWall, "Walls");
        let element = model.get(ElementId(1)).unwrap();
        let taken: FxHashSet<String> = taken.iter().map(|s| s.to_string()).collect();
        let mut ctx = BuildContext {
            params: &params,
            calculators: &calculators,
            factory: &mut factory,
            writer: store,
            classification: &classification,
        };
        internal_property_sets(&mut ctx, &element, &taken).unwrap()
    }

    fn model() -> SnapshotModel {
        let mut model = SnapshotModel::new();
        model.insert(HostElement::new(7, "Level 1"));
        model.insert(
            HostElement::new(1, "Wall")
                .with_category("Walls")
                .with_parameter(Parameter::string("Comments", "check").with_group("Identity Data"))
                .with_parameter(Parameter::string("Mark", "W1").with_group("Identity Data"))
                .with_parameter(
                    Parameter::double("Unconnected Height", 10.0)
                        .with_unit(UnitKind::Length)
                        .with_group("Constraints"),
                )
                .with_parameter(
                    Parameter::element_id("Base Constraint", ElementId(7))
                        .with_group("Constraints"),
                )
                .with_parameter(Parameter::integer("Phase Count", 2))
                .with_parameter(Parameter::string("Mark", "again").with_group("Identity Data")),
        );
        model
    }

    #[test]
    fn test_groups_in_order() {
        let mut store = IfcStore::new(IfcSchema::Ifc4);
        let sets = build(&model(), &mut store, &[]);
        let names: Vec<_> = sets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Identity Data", "Constraints", DEFAULT_GROUP]);
        assert_eq!(sets[0].properties.len(), 2);
    }

    #[test]
    fn test_kinds_and_values() {
        let mut store = IfcStore::new(IfcSchema::Ifc4);
        let sets = build(&model(), &mut store, &[]);
        let constraints = &sets[1];
        let height = store.property(constraints.properties[0]).unwrap();
        assert_eq!(height.name, "Unconnected Height");
        assert!(matches!(
            height.single_value(),
            Some(IfcValue::Measure(MeasureType::Length, _))
        ));
        let value = height.single_value().and_then(IfcValue::as_f64).unwrap();
        approx::assert_relative_eq!(value, 3048.0, epsilon = 1e-6);
        let base = store.property(constraints.properties[1]).unwrap();
        assert_eq!(base.single_value().and_then(IfcValue::as_str), Some("Level 1"));
    }

    #[test]
    fn test_taken_group_skipped() {
        let mut store = IfcStore::new(IfcSchema::Ifc4);
        let sets = build(&model(), &mut store, &["Constraints"]);
        assert!(sets.iter().all(|s| s.name != "Constraints"));
        assert_eq!(sets.len(), 2);
    }

    #[test]
    fn test_kind_from_storage() {
        assert_eq!(
            internal_kind(&Parameter::double("Ratio", 0.5)),
            Some(PropertyKind::Real)
        );
        assert_eq!(
            internal_kind(&Parameter::double("Area", 0.5).with_unit(UnitKind::Area)),
            Some(PropertyKind::Area)
        );
        assert_eq!(
            internal_kind(&Parameter::new("Empty", ParameterValue::None)),
            None
        );
    }
}
