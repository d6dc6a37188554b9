// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Lite Model - Shared types for exporting host models to IFC
//!
//! This crate provides the vocabulary shared by a BIM host and the IFC
//! property exporter: host elements and their parameters, IFC entity types,
//! typed property values, units, and the error type.
//!
//! # Architecture
//!
//! The exporter touches the outside world through two traits:
//!
//! - [`ElementResolver`] - Read-only access to host elements and their types
//! - [`IfcWriter`] - Append-only IFC object model receiving properties,
//!   property sets and quantities
//!
//! # Example
//!
//! ```ignore
//! use ifc_lite_model::{ElementResolver, ElementId, BuiltInParameter};
//!
//! let resolver: &dyn ElementResolver = get_resolver();
//! if let Some(wall) = resolver.get(ElementId(1234)) {
//!     if let Some(param) = wall.builtin(BuiltInParameter::FireRating) {
//!         println!("Fire rating: {:?}", param.value);
//!     }
//! }
//! ```

pub mod element;
pub mod error;
pub mod properties;
pub mod resolver;
pub mod traits;
pub mod types;
pub mod units;

// Re-export all public types
pub use element::*;
pub use error::*;
pub use properties::*;
pub use resolver::*;
pub use traits::*;
pub use types::*;
pub use units::*;
