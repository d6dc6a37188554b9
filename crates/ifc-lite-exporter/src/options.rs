// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Export configuration

use ifc_lite_model::{ExportError, IfcEntityType, IfcSchema, Language, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Options for one export session
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub schema: IfcSchema,
    /// Language of localized parameter names
    pub language: Language,
    pub export_base_quantities: bool,
    pub export_common_psets: bool,
    pub export_cobie_psets: bool,
    pub export_user_defined_psets: bool,
    /// Definition file read when user-defined sets are enabled
    pub user_defined_psets_path: Option<PathBuf>,
    pub export_internal_parameters: bool,
    pub export_schedules_as_psets: bool,
    /// Host category -> IFC entity name
    pub category_overrides: BTreeMap<String, String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            schema: IfcSchema::Ifc4,
            language: Language::English,
            export_base_quantities: false,
            export_common_psets: true,
            export_cobie_psets: false,
            export_user_defined_psets: false,
            user_defined_psets_path: None,
            export_internal_parameters: false,
            export_schedules_as_psets: false,
            category_overrides: BTreeMap::new(),
        }
    }
}

impl ExportOptions {
    pub fn new(schema: IfcSchema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Parse options from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_base_quantities(mut self, enabled: bool) -> Self {
        self.export_base_quantities = enabled;
        self
    }

    pub fn with_common_psets(mut self, enabled: bool) -> Self {
        self.export_common_psets = enabled;
        self
    }

    pub fn with_cobie_psets(mut self, enabled: bool) -> Self {
        self.export_cobie_psets = enabled;
        self
    }

    /// Enable user-defined sets read from `path`
    pub fn with_user_defined_psets(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_user_defined_psets = true;
        self.user_defined_psets_path = Some(path.into());
        self
    }

    pub fn with_internal_parameters(mut self, enabled: bool) -> Self {
        self.export_internal_parameters = enabled;
        self
    }

    pub fn with_schedules_as_psets(mut self, enabled: bool) -> Self {
        self.export_schedules_as_psets = enabled;
        self
    }

    /// Export every element of `category` as `entity`
    pub fn with_category_override(mut self, category: &str, entity: &str) -> Self {
        self.category_overrides
            .insert(category.to_string(), entity.to_string());
        self
    }

    /// Check the options for contradictions
    pub fn validate(&self) -> Result<()> {
        for (category, entity) in &self.category_overrides {
            if let IfcEntityType::Unknown(name) = IfcEntityType::parse(entity) {
                return Err(ExportError::InvalidOptions(format!(
                    "category '{}' overridden with unknown entity '{}'",
                    category, name
                )));
            }
        }
        Ok(())
    }

    /// Category overrides as entity types
    pub fn parsed_category_overrides(&self) -> impl Iterator<Item = (&str, IfcEntityType)> {
        self.category_overrides
            .iter()
            .map(|(category, entity)| (category.as_str(), IfcEntityType::parse(entity)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExportOptions::default();
        assert_eq!(options.schema, IfcSchema::Ifc4);
        assert!(options.export_common_psets);
        assert!(!options.export_cobie_psets);
        assert!(!options.export_base_quantities);
    }

    #[test]
    fn test_partial_json() {
        let options = ExportOptions::from_json_str(
            r#"{ "schema": "IFC2X3", "export_cobie_psets": true, "language": "German" }"#,
        )
        .unwrap();
        assert_eq!(options.schema, IfcSchema::Ifc2x3);
        assert_eq!(options.language, Language::German);
        assert!(options.export_cobie_psets);
        assert!(options.export_common_psets);
    }

    #[test]
    fn test_unknown_override_entity() {
        let result = ExportOptions::from_json_str(
            r#"{ "category_overrides": { "Generic Models": "IfcNotAnEntity" } }"#,
        );
        assert!(matches!(result, Err(ExportError::InvalidOptions(_))));

        let options =
            ExportOptions::default().with_category_override("Generic Models", "IfcFurniture");
        assert!(options.validate().is_ok());
    }
}
