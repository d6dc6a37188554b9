// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property set and quantity entries
//!
//! An entry names one target property and says where its value comes
//! from: a parameter (by name, falling back to a built-in id), a
//! calculator, or a parameter with a calculator behind it.

use crate::enumeration::Enumeration;
use crate::factory::PropertyValueFactory;
use crate::parameters::ParameterLookup;
use ifc_lite_model::{
    BuiltInParameter, Language, PropertyKind, QuantityType, Result, SchemaGate,
    ValueRepresentation,
};

/// Where a parameter-backed entry reads its value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParameterRule {
    /// A named parameter; the built-in id is tried only after the name
    Named {
        name: String,
        builtin: Option<BuiltInParameter>,
    },
    /// A built-in parameter only
    BuiltIn(BuiltInParameter),
}

impl ParameterRule {
    /// Lookup for this rule, searching `localized` first if given
    pub fn lookup<'a>(&'a self, localized: Option<&'a str>) -> ParameterLookup<'a> {
        let lookup = match self {
            ParameterRule::Named { name, builtin } => ParameterLookup {
                localized: None,
                name: Some(name.as_str()),
                builtin: *builtin,
            },
            ParameterRule::BuiltIn(id) => ParameterLookup::builtin(*id),
        };
        match localized {
            Some(name) => lookup.with_localized(name),
            None => lookup,
        }
    }
}

/// One property of a property set description
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySetEntry {
    /// Property name written to the file
    pub name: String,
    pub kind: PropertyKind,
    pub representation: ValueRepresentation,
    pub rule: Option<ParameterRule>,
    /// Calculator tried when the parameter yields nothing
    pub calculator: Option<String>,
    /// Parameter names per export language
    pub localized: Vec<(Language, String)>,
    pub enumeration: Option<Enumeration>,
    pub schema: SchemaGate,
}

impl PropertySetEntry {
    /// Entry read from a parameter with the same name as the property
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        let name = name.into();
        Self {
            rule: Some(ParameterRule::Named {
                name: name.clone(),
                builtin: None,
            }),
            name,
            kind,
            representation: ValueRepresentation::Single,
            calculator: None,
            localized: Vec::new(),
            enumeration: None,
            schema: SchemaGate::All,
        }
    }

    /// Label entry (the most common kind)
    pub fn label(name: impl Into<String>) -> Self {
        Self::new(name, PropertyKind::Label)
    }

    /// Entry computed only, never read from a parameter
    pub fn calculated(name: impl Into<String>, kind: PropertyKind, calculator: &str) -> Self {
        let mut entry = Self::new(name, kind);
        entry.rule = None;
        entry.calculator = Some(calculator.to_string());
        entry
    }

    /// "FireRating" label, falling back to the built-in fire rating
    pub fn fire_rating() -> Self {
        Self::label("FireRating")
            .with_builtin(BuiltInParameter::FireRating)
            .localized(Language::German, "Feuerwiderstandsklasse")
            .localized(Language::French, "RésistanceAuFeu")
    }

    /// Read from a differently named parameter
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        let builtin = match &self.rule {
            Some(ParameterRule::Named { builtin, .. }) => *builtin,
            _ => None,
        };
        self.rule = Some(ParameterRule::Named {
            name: parameter.into(),
            builtin,
        });
        self
    }

    /// Fall back to a built-in parameter after the name
    pub fn with_builtin(mut self, id: BuiltInParameter) -> Self {
        self.rule = match self.rule.take() {
            Some(ParameterRule::Named { name, .. }) => Some(ParameterRule::Named {
                name,
                builtin: Some(id),
            }),
            _ => Some(ParameterRule::BuiltIn(id)),
        };
        self
    }

    /// Fall back to a calculator after the parameter
    pub fn with_calculator(mut self, calculator: &str) -> Self {
        self.calculator = Some(calculator.to_string());
        self
    }

    /// Parameter name used when exporting in `language`
    pub fn localized(mut self, language: Language, parameter: impl Into<String>) -> Self {
        self.localized.push((language, parameter.into()));
        self
    }

    /// Enumerated value restricted to `enumeration`
    pub fn enumerated(mut self, enumeration: Enumeration) -> Self {
        self.representation = ValueRepresentation::Enumerated;
        self.enumeration = Some(enumeration);
        self
    }

    /// List value split from a `;` separated parameter
    pub fn list(mut self) -> Self {
        self.representation = ValueRepresentation::List;
        self
    }

    pub fn ifc4_only(mut self) -> Self {
        self.schema = SchemaGate::Ifc4Only;
        self
    }

    pub fn ifc2x3_only(mut self) -> Self {
        self.schema = SchemaGate::Ifc2x3Only;
        self
    }

    /// Parameter name for `language`, if one is declared
    pub fn localized_name(&self, language: Language) -> Option<&str> {
        self.localized
            .iter()
            .find(|(l, _)| *l == language)
            .map(|(_, n)| n.as_str())
    }

    /// Lookup for the parameter rule, if any
    pub fn lookup(&self, language: Language) -> Option<ParameterLookup<'_>> {
        self.rule
            .as_ref()
            .map(|rule| rule.lookup(self.localized_name(language)))
    }

    /// Check that the factory can handle this entry
    pub fn validate(&self) -> Result<()> {
        PropertyValueFactory::check_supported(
            &self.name,
            self.kind,
            self.representation,
            self.enumeration.as_ref(),
        )
    }
}

/// One quantity of a quantity description
#[derive(Clone, Debug, PartialEq)]
pub struct QuantityEntry {
    pub name: String,
    pub quantity_type: QuantityType,
    pub rule: Option<ParameterRule>,
    pub calculator: Option<String>,
    pub schema: SchemaGate,
}

impl QuantityEntry {
    /// Quantity read from a built-in parameter
    pub fn builtin(name: impl Into<String>, quantity_type: QuantityType, id: BuiltInParameter) -> Self {
        Self {
            name: name.into(),
            quantity_type,
            rule: Some(ParameterRule::BuiltIn(id)),
            calculator: None,
            schema: SchemaGate::All,
        }
    }

    /// Quantity computed by a calculator
    pub fn calculated(name: impl Into<String>, quantity_type: QuantityType, calculator: &str) -> Self {
        Self {
            name: name.into(),
            quantity_type,
            rule: None,
            calculator: Some(calculator.to_string()),
            schema: SchemaGate::All,
        }
    }

    pub fn with_calculator(mut self, calculator: &str) -> Self {
        self.calculator = Some(calculator.to_string());
        self
    }

    pub fn lookup(&self) -> Option<ParameterLookup<'_>> {
        self.rule.as_ref().map(|rule| rule.lookup(None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fire_rating_lookup() {
        let entry = PropertySetEntry::fire_rating();
        let lookup = entry.lookup(Language::English).unwrap();
        assert_eq!(lookup.name, Some("FireRating"));
        assert_eq!(lookup.builtin, Some(BuiltInParameter::FireRating));
        assert_eq!(lookup.localized, None);

        let german = entry.lookup(Language::German).unwrap();
        assert_eq!(german.localized, Some("Feuerwiderstandsklasse"));
    }

    #[test]
    fn test_builder_rules() {
        let entry = PropertySetEntry::new("Span", PropertyKind::PositiveLength)
            .with_builtin(BuiltInParameter::InstanceLength)
            .with_parameter("Spannweite")
            .with_calculator("span");
        assert_eq!(
            entry.rule,
            Some(ParameterRule::Named {
                name: "Spannweite".into(),
                builtin: Some(BuiltInParameter::InstanceLength),
            })
        );
        assert_eq!(entry.calculator.as_deref(), Some("span"));

        let computed = PropertySetEntry::calculated("LoadBearing", PropertyKind::Boolean, "load_bearing");
        assert!(computed.rule.is_none());
        assert!(computed.lookup(Language::English).is_none());
    }

    #[test]
    fn test_validate() {
        let bad = PropertySetEntry::new("Width", PropertyKind::Length)
            .enumerated(Enumeration::new("PEnum_Width", &["WIDE"]));
        assert!(bad.validate().is_err());
        assert!(PropertySetEntry::label("Status").list().validate().is_ok());
    }
}
