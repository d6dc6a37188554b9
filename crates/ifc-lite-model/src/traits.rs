// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Output side of an export
//!
//! The IFC object model is append-only: every call allocates a new entity
//! and returns its handle. Nothing is modified once written.

use crate::{
    EntityId, IfcClassificationReference, IfcElementQuantityRecord, IfcEnumeration, IfcProperty,
    IfcPropertySetRecord, IfcQuantity,
};

/// Append-only IFC object model that property sets are written into
///
/// # Example
///
/// ```ignore
/// use ifc_lite_model::{IfcWriter, IfcProperty, IfcValue, IfcPropertySetRecord};
///
/// fn write_fire_rating(writer: &mut dyn IfcWriter, wall: EntityId) {
///     let prop = writer.add_property(IfcProperty::single(
///         "FireRating",
///         IfcValue::Label("F90".into()),
///     ));
///     let pset = writer.add_property_set(IfcPropertySetRecord {
///         global_id: "2O2Fr$t4X7Zf8NOew3FLOH".into(),
///         name: "Pset_WallCommon".into(),
///         description: None,
///         properties: vec![prop],
///     });
///     writer.relate(pset, &[wall]);
/// }
/// ```
pub trait IfcWriter {
    /// Write an IfcPropertySingleValue / EnumeratedValue / ListValue /
    /// ReferenceValue
    fn add_property(&mut self, property: IfcProperty) -> EntityId;

    /// Write an IfcPropertyEnumeration
    fn add_enumeration(&mut self, enumeration: IfcEnumeration) -> EntityId;

    /// Write an IfcClassificationReference
    fn add_classification_reference(&mut self, reference: IfcClassificationReference)
        -> EntityId;

    /// Write an IfcPropertySet
    fn add_property_set(&mut self, set: IfcPropertySetRecord) -> EntityId;

    /// Write an IfcPhysicalSimpleQuantity subtype
    fn add_quantity(&mut self, quantity: IfcQuantity) -> EntityId;

    /// Write an IfcElementQuantity
    fn add_element_quantity(&mut self, set: IfcElementQuantityRecord) -> EntityId;

    /// Attach a property definition to objects (IfcRelDefinesByProperties)
    fn relate(&mut self, definition: EntityId, related: &[EntityId]) -> EntityId;
}
