// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! User-defined property set definition files using nom combinators
//!
//! ```text
//! # comment
//! PropertySet:	Acme_Wall	I	IfcWall,IfcWallStandardCase
//! 	FireClass	Label	Acme Fire Class
//! 	Depth	Length
//! ```
//!
//! Lines containing a tab are split on tabs, so names may contain spaces.
//! Other lines are split on runs of whitespace.

use crate::description::{PropertySetDescription, SetTarget};
use crate::entry::PropertySetEntry;
use ifc_lite_model::{ExportError, IfcEntityType, PropertyKind, Result};
use nom::{
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{space0, space1},
    multi::separated_list1,
    sequence::preceded,
    IResult, Parser,
};
use std::path::Path;

const HEADER: &str = "PropertySet:";

/// One property line of a definition file
#[derive(Clone, Debug, PartialEq)]
pub struct UserDefinedProperty {
    pub name: String,
    pub kind: PropertyKind,
    /// Source parameter; the property name when absent
    pub parameter: Option<String>,
}

/// One `PropertySet:` block of a definition file
#[derive(Clone, Debug, PartialEq)]
pub struct UserDefinedPropertySet {
    pub name: String,
    pub target: SetTarget,
    pub entity_types: Vec<IfcEntityType>,
    pub properties: Vec<UserDefinedProperty>,
}

impl UserDefinedPropertySet {
    /// Turn the block into a catalog description
    pub fn into_description(self) -> PropertySetDescription {
        let mut description = PropertySetDescription::new(self.name);
        description.entity_types = self.entity_types;
        description.target = self.target;
        for property in self.properties {
            let mut entry = PropertySetEntry::new(property.name, property.kind);
            if let Some(parameter) = property.parameter {
                entry = entry.with_parameter(parameter);
            }
            description.entries.push(entry);
        }
        description
    }
}

// ============================================================================
// Line parsers
// ============================================================================

/// Tab separated fields; leading indentation is skipped
fn tab_fields(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        take_while(|c: char| c == '\t' || c == ' '),
        separated_list1(
            take_while1(|c: char| c == '\t'),
            take_while1(|c: char| c != '\t'),
        ),
    )
    .parse(input)
}

/// Whitespace separated fields
fn word_fields(input: &str) -> IResult<&str, Vec<&str>> {
    preceded(
        space0,
        separated_list1(space1, take_while1(|c: char| !c.is_whitespace())),
    )
    .parse(input)
}

fn fields(line: &str) -> Vec<&str> {
    let parsed = if line.contains('\t') {
        tab_fields(line)
    } else {
        word_fields(line)
    };
    match parsed {
        Ok((_, fields)) => fields
            .into_iter()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// `PropertySet:` keyword followed by the header fields
fn header(line: &str) -> IResult<&str, &str> {
    preceded(space0, tag(HEADER)).parse(line)
}

fn parse_target(flag: &str, line: usize) -> Result<SetTarget> {
    match flag {
        "I" | "i" => Ok(SetTarget::Instance),
        "T" | "t" => Ok(SetTarget::Type),
        other => Err(ExportError::definition(
            line,
            format!("expected I or T, found '{}'", other),
        )),
    }
}

fn parse_entities(list: &str) -> Vec<IfcEntityType> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let entity = IfcEntityType::parse(name);
            if let IfcEntityType::Unknown(_) = entity {
                log::warn!("property set definition names unknown entity '{}'", name);
            }
            entity
        })
        .collect()
}

/// Parse the content of a definition file
pub fn parse_definitions(content: &str) -> Result<Vec<UserDefinedPropertySet>> {
    let mut sets: Vec<UserDefinedPropertySet> = Vec::new();

    for (index, line) in content.lines().enumerate() {
        let line_no = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Ok((rest, _)) = header(line) {
            let parts = fields(rest);
            if parts.len() < 3 {
                return Err(ExportError::definition(
                    line_no,
                    "expected PropertySet: <name> <I|T> <entities>",
                ));
            }
            let target = parse_target(parts[1], line_no)?;
            // Entity lists split across fields are rejoined
            let entity_types = parse_entities(&parts[2..].join(","));
            sets.push(UserDefinedPropertySet {
                name: parts[0].to_string(),
                target,
                entity_types,
                properties: Vec::new(),
            });
            continue;
        }

        let Some(current) = sets.last_mut() else {
            return Err(ExportError::definition(
                line_no,
                "property defined before any PropertySet",
            ));
        };
        let parts = fields(line);
        if parts.len() < 2 {
            return Err(ExportError::definition(
                line_no,
                "expected <property> <data type> [<parameter>]",
            ));
        }
        let parameter = match parts.get(2..) {
            Some(rest) if !rest.is_empty() => Some(rest.join(" ")),
            _ => None,
        };
        current.properties.push(UserDefinedProperty {
            name: parts[0].to_string(),
            kind: PropertyKind::parse_lenient(parts[1]),
            parameter,
        });
    }

    Ok(sets)
}

/// Read and parse a definition file
pub fn load_definitions(path: impl AsRef<Path>) -> Result<Vec<UserDefinedPropertySet>> {
    let content = std::fs::read_to_string(path)?;
    parse_definitions(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ParameterRule;

    #[test]
    fn test_tab_separated() {
        let content = "# Acme definitions\n\
            PropertySet:\tAcme Wall Data\tI\tIfcWall,IfcSlab\n\
            \tFire Class\tLabel\tAcme Fire Class\n\
            \tDepth\tIfcLengthMeasure\n\
            \n\
            PropertySet:\tAcme_Type\tT\tIfcWallType\n\
            \tCost\tMonetary\n";
        let sets = parse_definitions(content).unwrap();
        assert_eq!(sets.len(), 2);

        let wall = &sets[0];
        assert_eq!(wall.name, "Acme Wall Data");
        assert_eq!(wall.target, SetTarget::Instance);
        assert_eq!(
            wall.entity_types,
            vec![IfcEntityType::IfcWall, IfcEntityType::IfcSlab]
        );
        assert_eq!(wall.properties[0].name, "Fire Class");
        assert_eq!(
            wall.properties[0].parameter.as_deref(),
            Some("Acme Fire Class")
        );
        assert_eq!(wall.properties[1].kind, PropertyKind::Length);
        assert_eq!(wall.properties[1].parameter, None);

        assert_eq!(sets[1].target, SetTarget::Type);
        assert_eq!(sets[1].properties[0].kind, PropertyKind::Monetary);
    }

    #[test]
    fn test_whitespace_separated() {
        let content = "PropertySet: Acme_Door I IfcDoor\n  Width   PositiveLength   DoorWidth\n";
        let sets = parse_definitions(content).unwrap();
        assert_eq!(sets[0].name, "Acme_Door");
        let width = &sets[0].properties[0];
        assert_eq!(width.kind, PropertyKind::PositiveLength);
        assert_eq!(width.parameter.as_deref(), Some("DoorWidth"));
    }

    #[test]
    fn test_unknown_tag_is_label() {
        let sets = parse_definitions("PropertySet:\tX\tI\tIfcWall\n\tNote\tFancyType\n").unwrap();
        assert_eq!(sets[0].properties[0].kind, PropertyKind::Label);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_definitions("\n# c\nPropertySet:\tX\tQ\tIfcWall\n").unwrap_err();
        match err {
            ExportError::DefinitionParse { line, message } => {
                assert_eq!(line, 3);
                assert!(message.contains("'Q'"));
            }
            other => panic!("unexpected {:?}", other),
        }

        let err = parse_definitions("\tOrphan\tLabel\n").unwrap_err();
        assert!(matches!(err, ExportError::DefinitionParse { line: 1, .. }));

        let err = parse_definitions("PropertySet:\tX\tI\n").unwrap_err();
        assert!(matches!(err, ExportError::DefinitionParse { line: 1, .. }));
    }

    #[test]
    fn test_into_description() {
        let sets =
            parse_definitions("PropertySet:\tAcme\tT\tIfcDoorType\n\tMaker\tLabel\tManufacturer\n")
                .unwrap();
        let description = sets.into_iter().next().unwrap().into_description();
        assert_eq!(description.target, SetTarget::Type);
        assert_eq!(description.entries[0].name, "Maker");
        assert_eq!(
            description.entries[0].rule,
            Some(ParameterRule::Named {
                name: "Manufacturer".into(),
                builtin: None,
            })
        );
    }
}
