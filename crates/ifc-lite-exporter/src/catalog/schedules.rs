// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Host schedules exported as custom property sets

use crate::description::{PropertySetDescription, SetBinding};
use crate::entry::{ParameterRule, PropertySetEntry};
use ifc_lite_model::{PropertyKind, ScheduleDefinition, ScheduleField};

fn field_entry(field: &ScheduleField) -> Option<PropertySetEntry> {
    let heading = [field.heading.trim(), field.parameter.trim()]
        .into_iter()
        .find(|name| !name.is_empty())
        .or_else(|| field.builtin.map(|id| id.label()))?;
    let kind = field
        .unit
        .map(PropertyKind::from_unit)
        .unwrap_or(PropertyKind::Label);

    let mut entry = PropertySetEntry::new(heading, kind);
    entry.rule = Some(match (field.parameter.trim(), field.builtin) {
        ("", Some(id)) => ParameterRule::BuiltIn(id),
        ("", None) => ParameterRule::Named {
            name: heading.to_string(),
            builtin: None,
        },
        (name, builtin) => ParameterRule::Named {
            name: name.to_string(),
            builtin,
        },
    });
    Some(entry)
}

/// Description for one schedule, bound to the elements it lists
///
/// Returns `None` for a schedule without usable fields.
pub fn schedule_property_set(schedule: &ScheduleDefinition) -> Option<PropertySetDescription> {
    let entries: Vec<_> = schedule.fields.iter().filter_map(field_entry).collect();
    if entries.is_empty() {
        log::debug!("schedule '{}' has no exportable fields", schedule.name);
        return None;
    }
    let mut description = PropertySetDescription::new(&schedule.name).with_binding(
        SetBinding::Schedule {
            id: schedule.id,
            elements: schedule.elements.iter().copied().collect(),
        },
    );
    description.entries = entries;
    Some(description)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_model::{BuiltInParameter, ElementId, UnitKind};

    fn field(heading: &str, parameter: &str, unit: Option<UnitKind>) -> ScheduleField {
        ScheduleField {
            heading: heading.into(),
            parameter: parameter.into(),
            builtin: None,
            unit,
        }
    }

    #[test]
    fn test_field_kinds() {
        let schedule = ScheduleDefinition {
            id: ElementId(500),
            name: "Room Schedule".into(),
            fields: vec![
                field("Number", "Number", None),
                field("Area", "Area", Some(UnitKind::Area)),
                field("Budget", "Budget", Some(UnitKind::Currency)),
            ],
            elements: vec![ElementId(1), ElementId(2)],
        };
        let description = schedule_property_set(&schedule).unwrap();
        let kinds: Vec<_> = description.entries.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![PropertyKind::Label, PropertyKind::Area, PropertyKind::Monetary]
        );
        assert!(description.binding.admits(ElementId(2)));
        assert!(!description.binding.admits(ElementId(3)));
        assert!(description.entity_types.is_empty());
    }

    #[test]
    fn test_builtin_field() {
        let mut comments = field("", "", None);
        comments.builtin = Some(BuiltInParameter::Comments);
        let mut mark = field("Tag", "Mark", None);
        mark.builtin = Some(BuiltInParameter::Mark);
        let schedule = ScheduleDefinition {
            id: ElementId(501),
            name: "Doors".into(),
            fields: vec![comments, mark, field(" ", "", None)],
            elements: vec![],
        };
        let description = schedule_property_set(&schedule).unwrap();
        assert_eq!(description.entries.len(), 2);
        assert_eq!(description.entries[0].name, "Comments");
        assert_eq!(
            description.entries[0].rule,
            Some(ParameterRule::BuiltIn(BuiltInParameter::Comments))
        );
        assert_eq!(
            description.entries[1].rule,
            Some(ParameterRule::Named {
                name: "Mark".into(),
                builtin: Some(BuiltInParameter::Mark),
            })
        );
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = ScheduleDefinition {
            id: ElementId(502),
            name: "Empty".into(),
            fields: vec![],
            elements: vec![ElementId(1)],
        };
        assert!(schedule_property_set(&schedule).is_none());
    }
}
