// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for property set and quantity export
//!
//! Missing or out-of-domain parameter values are not errors: the affected
//! property is omitted. The variants here are reserved for catalog defects
//! and broken host invariants, which stop the export.

use crate::{ElementId, PropertyKind, ValueRepresentation};
use thiserror::Error;

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while exporting property sets and quantities
#[derive(Error, Debug)]
pub enum ExportError {
    /// A catalog entry uses a kind/representation pair with no handler
    #[error("Property '{property}': no {representation:?} handler for kind {kind:?}")]
    UnsupportedPropertyType {
        property: String,
        kind: PropertyKind,
        representation: ValueRepresentation,
    },

    /// A catalog entry refers to a calculator that is not registered
    #[error("Property '{property}': unknown calculator '{calculator}'")]
    UnknownCalculator { property: String, calculator: String },

    /// The host element has no category
    #[error("Element {0} has no category")]
    MissingCategory(ElementId),

    /// The host element does not exist
    #[error("Element {0} not found")]
    ElementNotFound(ElementId),

    /// Failed to parse a user-defined property set file
    #[error("Definition file line {line}: {message}")]
    DefinitionParse { line: usize, message: String },

    /// Unsupported IFC schema version
    #[error("Unsupported schema version: {0}")]
    UnsupportedSchema(String),

    /// Export options are inconsistent
    #[error("Invalid export options: {0}")]
    InvalidOptions(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl ExportError {
    /// Create an unsupported kind/representation error
    pub fn unsupported(
        property: impl Into<String>,
        kind: PropertyKind,
        representation: ValueRepresentation,
    ) -> Self {
        ExportError::UnsupportedPropertyType {
            property: property.into(),
            kind,
            representation,
        }
    }

    /// Create a definition file parse error
    pub fn definition(line: usize, msg: impl Into<String>) -> Self {
        ExportError::DefinitionParse {
            line,
            message: msg.into(),
        }
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        ExportError::Other(msg.into())
    }

    /// Whether this error stops the whole export rather than one element
    pub fn is_catalog_defect(&self) -> bool {
        matches!(
            self,
            ExportError::UnsupportedPropertyType { .. }
                | ExportError::UnknownCalculator { .. }
                | ExportError::DefinitionParse { .. }
                | ExportError::InvalidOptions(_)
        )
    }
}
