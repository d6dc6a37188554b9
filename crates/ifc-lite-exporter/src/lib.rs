// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Exporter - Property sets and quantities for IFC export
//!
//! This crate maps the parameters of BIM host elements onto IFC property
//! sets and element quantities. It reads the host through the
//! `ElementResolver` trait and writes through `IfcWriter`, both defined in
//! `ifc-lite-model`.
//!
//! # Features
//!
//! - **Catalog** of common, COBie, user-defined, schedule and base quantity
//!   sets, built once per session for IFC2x3 or IFC4
//! - **Unit scaling** from host storage units to export units
//! - **Value cache** sharing identical property values between elements
//! - **Deterministic GlobalIds** so repeated exports are stable
//! - **Definition files** for user-defined property sets, parsed with `nom`
//!
//! # Example
//!
//! ```ignore
//! use ifc_lite_exporter::{ExportOptions, ExportSession, IfcStore, SnapshotModel};
//! use ifc_lite_model::{ElementId, IfcSchema};
//! use std::sync::Arc;
//!
//! let model = Arc::new(SnapshotModel::from_path("snapshot.json")?);
//! let options = ExportOptions::from_path("export.json")?;
//! let mut session = ExportSession::new(options, model, IfcStore::new(IfcSchema::Ifc4))?;
//!
//! let export = session.export_element(ElementId(1234), None)?;
//! println!("{} property sets", export.property_sets.len());
//! ```

pub mod cache;
pub mod calculators;
pub mod catalog;
pub mod category;
pub mod definition;
pub mod description;
pub mod entry;
pub mod enumeration;
pub mod factory;
pub mod guid;
pub mod internal;
mod model;
mod options;
pub mod parameters;
mod session;
mod store;
mod units;

pub use cache::{CacheStats, ValueCache};
pub use calculators::{CalculatedValues, CalculatorInput, CalculatorRegistry};
pub use catalog::{Catalog, ExporterInitializer};
pub use category::{CategoryMap, Classification};
pub use definition::{load_definitions, parse_definitions, UserDefinedPropertySet};
pub use description::{PropertySetDescription, QuantityDescription, SetBinding, SetTarget};
pub use entry::{ParameterRule, PropertySetEntry, QuantityEntry};
pub use enumeration::Enumeration;
pub use factory::{PropertyValueFactory, RawValue};
pub use model::{ModelSnapshot, SnapshotModel};
pub use options::ExportOptions;
pub use parameters::{ParameterLookup, ParameterResolver};
pub use session::{ElementExport, ExportSession};
pub use store::{IfcStore, Relation, StoredEntity};
pub use units::UnitScaler;
