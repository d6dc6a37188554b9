// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory IFC object model
//!
//! `IfcStore` keeps every written entity in order, answers lookups by
//! handle, and serialises the records as STEP DATA section lines.

use crate::guid::stable_guid;
use ifc_lite_model::{
    EntityId, IfcClassificationReference, IfcElementQuantityRecord, IfcEnumeration, IfcProperty,
    IfcPropertySetRecord, IfcQuantity, IfcSchema, IfcValue, IfcWriter, Logical, PropertyData,
};
use std::fmt::Write as _;
use std::io;

/// IfcRelDefinesByProperties
#[derive(Clone, Debug, PartialEq)]
pub struct Relation {
    pub global_id: String,
    pub definition: EntityId,
    pub related: Vec<EntityId>,
}

/// One written entity
#[derive(Clone, Debug, PartialEq)]
pub enum StoredEntity {
    Property(IfcProperty),
    Enumeration(IfcEnumeration),
    ClassificationReference(IfcClassificationReference),
    PropertySet(IfcPropertySetRecord),
    Quantity(IfcQuantity),
    ElementQuantity(IfcElementQuantityRecord),
    Relation(Relation),
}

/// Reference `IfcWriter` holding entities in memory
#[derive(Clone, Debug)]
pub struct IfcStore {
    schema: IfcSchema,
    /// Id of the first entity written
    first_id: u32,
    owner_history: Option<EntityId>,
    entities: Vec<StoredEntity>,
}

impl IfcStore {
    pub fn new(schema: IfcSchema) -> Self {
        Self {
            schema,
            first_id: 1,
            owner_history: None,
            entities: Vec::new(),
        }
    }

    /// Continue numbering after entities written elsewhere
    pub fn with_first_id(mut self, first_id: u32) -> Self {
        self.first_id = first_id.max(1);
        self
    }

    /// Owner history referenced by sets and relations
    pub fn with_owner_history(mut self, owner_history: EntityId) -> Self {
        self.owner_history = Some(owner_history);
        self
    }

    pub fn schema(&self) -> IfcSchema {
        self.schema
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn push(&mut self, entity: StoredEntity) -> EntityId {
        let id = EntityId(self.first_id + self.entities.len() as u32);
        self.entities.push(entity);
        id
    }

    /// Get an entity by handle
    pub fn get(&self, id: EntityId) -> Option<&StoredEntity> {
        let index = id.0.checked_sub(self.first_id)?;
        self.entities.get(index as usize)
    }

    /// All entities with their handles, in write order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &StoredEntity)> {
        let first = self.first_id;
        self.entities
            .iter()
            .enumerate()
            .map(move |(i, e)| (EntityId(first + i as u32), e))
    }

    pub fn property(&self, id: EntityId) -> Option<&IfcProperty> {
        match self.get(id)? {
            StoredEntity::Property(p) => Some(p),
            _ => None,
        }
    }

    pub fn enumeration(&self, id: EntityId) -> Option<&IfcEnumeration> {
        match self.get(id)? {
            StoredEntity::Enumeration(e) => Some(e),
            _ => None,
        }
    }

    pub fn classification_reference(&self, id: EntityId) -> Option<&IfcClassificationReference> {
        match self.get(id)? {
            StoredEntity::ClassificationReference(r) => Some(r),
            _ => None,
        }
    }

    pub fn quantity(&self, id: EntityId) -> Option<&IfcQuantity> {
        match self.get(id)? {
            StoredEntity::Quantity(q) => Some(q),
            _ => None,
        }
    }

    pub fn property_set(&self, id: EntityId) -> Option<&IfcPropertySetRecord> {
        match self.get(id)? {
            StoredEntity::PropertySet(s) => Some(s),
            _ => None,
        }
    }

    pub fn element_quantity(&self, id: EntityId) -> Option<&IfcElementQuantityRecord> {
        match self.get(id)? {
            StoredEntity::ElementQuantity(s) => Some(s),
            _ => None,
        }
    }

    /// All property sets, in write order
    pub fn property_sets(&self) -> impl Iterator<Item = (EntityId, &IfcPropertySetRecord)> {
        self.iter().filter_map(|(id, e)| match e {
            StoredEntity::PropertySet(s) => Some((id, s)),
            _ => None,
        })
    }

    /// First property set with this name
    pub fn find_property_set(&self, name: &str) -> Option<(EntityId, &IfcPropertySetRecord)> {
        self.property_sets().find(|(_, s)| s.name == name)
    }

    pub fn relations(&self) -> impl Iterator<Item = &Relation> {
        self.entities.iter().filter_map(|e| match e {
            StoredEntity::Relation(r) => Some(r),
            _ => None,
        })
    }

    /// Definitions related to `object`
    pub fn definitions_of(&self, object: EntityId) -> Vec<EntityId> {
        self.relations()
            .filter(|r| r.related.contains(&object))
            .map(|r| r.definition)
            .collect()
    }

    // ========================================================================
    // STEP serialisation
    // ========================================================================

    /// DATA section lines, one entity per line
    pub fn to_step(&self) -> String {
        let mut out = String::new();
        for (id, entity) in self.iter() {
            let _ = writeln!(out, "{}={};", id, self.entity_step(entity));
        }
        out
    }

    /// Write the DATA section lines
    pub fn write_step<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        for (id, entity) in self.iter() {
            writeln!(writer, "{}={};", id, self.entity_step(entity))?;
        }
        Ok(())
    }

    fn owner(&self) -> String {
        ref_or_null(self.owner_history)
    }

    fn entity_step(&self, entity: &StoredEntity) -> String {
        match entity {
            StoredEntity::Property(p) => property_step(p),
            StoredEntity::Enumeration(e) => format!(
                "IFCPROPERTYENUMERATION({},{},$)",
                step_string(&e.name),
                value_list(&e.values)
            ),
            StoredEntity::ClassificationReference(r) => {
                let name = opt_string(r.name.as_deref());
                if self.schema.is_ifc4_family() {
                    format!(
                        "IFCCLASSIFICATIONREFERENCE($,{},{},$,$,$)",
                        step_string(&r.identification),
                        name
                    )
                } else {
                    format!(
                        "IFCCLASSIFICATIONREFERENCE($,{},{},$)",
                        step_string(&r.identification),
                        name
                    )
                }
            }
            StoredEntity::PropertySet(s) => format!(
                "IFCPROPERTYSET({},{},{},{},{})",
                step_string(&s.global_id),
                self.owner(),
                step_string(&s.name),
                opt_string(s.description.as_deref()),
                ref_list(&s.properties)
            ),
            StoredEntity::Quantity(q) => {
                let formula = if self.schema.is_ifc4_family() { ",$" } else { "" };
                format!(
                    "{}({},$,$,{}{})",
                    q.quantity_type.step_name(),
                    step_string(&q.name),
                    step_real(q.value),
                    formula
                )
            }
            StoredEntity::ElementQuantity(s) => format!(
                "IFCELEMENTQUANTITY({},{},{},$,{},{})",
                step_string(&s.global_id),
                self.owner(),
                step_string(&s.name),
                opt_string(s.method_of_measurement.as_deref()),
                ref_list(&s.quantities)
            ),
            StoredEntity::Relation(r) => format!(
                "IFCRELDEFINESBYPROPERTIES({},{},$,$,{},{})",
                step_string(&r.global_id),
                self.owner(),
                ref_list(&r.related),
                r.definition
            ),
        }
    }
}

impl IfcWriter for IfcStore {
    fn add_property(&mut self, property: IfcProperty) -> EntityId {
        self.push(StoredEntity::Property(property))
    }

    fn add_enumeration(&mut self, enumeration: IfcEnumeration) -> EntityId {
        self.push(StoredEntity::Enumeration(enumeration))
    }

    fn add_classification_reference(&mut self, reference: IfcClassificationReference) -> EntityId {
        self.push(StoredEntity::ClassificationReference(reference))
    }

    fn add_property_set(&mut self, set: IfcPropertySetRecord) -> EntityId {
        self.push(StoredEntity::PropertySet(set))
    }

    fn add_quantity(&mut self, quantity: IfcQuantity) -> EntityId {
        self.push(StoredEntity::Quantity(quantity))
    }

    fn add_element_quantity(&mut self, set: IfcElementQuantityRecord) -> EntityId {
        self.push(StoredEntity::ElementQuantity(set))
    }

    fn relate(&mut self, definition: EntityId, related: &[EntityId]) -> EntityId {
        let mut key = vec!["relation".to_string(), definition.0.to_string()];
        key.extend(related.iter().map(|r| r.0.to_string()));
        let parts: Vec<&str> = key.iter().map(String::as_str).collect();
        self.push(StoredEntity::Relation(Relation {
            global_id: stable_guid(&parts),
            definition,
            related: related.to_vec(),
        }))
    }
}

// ============================================================================
// Value encoding
// ============================================================================

fn property_step(p: &IfcProperty) -> String {
    let name = step_string(&p.name);
    let description = opt_string(p.description.as_deref());
    match &p.data {
        PropertyData::Single(value) => format!(
            "IFCPROPERTYSINGLEVALUE({},{},{},$)",
            name,
            description,
            typed_value(value)
        ),
        PropertyData::Enumerated {
            values,
            enumeration,
        } => format!(
            "IFCPROPERTYENUMERATEDVALUE({},{},{},{})",
            name,
            description,
            value_list(values),
            ref_or_null(*enumeration)
        ),
        PropertyData::List(values) => format!(
            "IFCPROPERTYLISTVALUE({},{},{},$)",
            name,
            description,
            value_list(values)
        ),
        PropertyData::Reference { usage, reference } => format!(
            "IFCPROPERTYREFERENCEVALUE({},{},{},{})",
            name,
            description,
            opt_string(usage.as_deref()),
            reference
        ),
    }
}

/// Value wrapped in its defined type, e.g. `IFCLABEL('F90')`
fn typed_value(value: &IfcValue) -> String {
    let inner = match value {
        IfcValue::Label(s) | IfcValue::Text(s) | IfcValue::Identifier(s) => step_string(s),
        IfcValue::Boolean(b) => logical(Logical::from(*b)).to_string(),
        IfcValue::Logical(l) => logical(*l).to_string(),
        IfcValue::Integer(i) => i.to_string(),
        IfcValue::Measure(_, v) => step_real(*v),
    };
    format!("{}({})", value.type_name(), inner)
}

fn logical(value: Logical) -> &'static str {
    match value {
        Logical::True => ".T.",
        Logical::False => ".F.",
        Logical::Unknown => ".U.",
    }
}

fn value_list(values: &[IfcValue]) -> String {
    let items: Vec<String> = values.iter().map(typed_value).collect();
    format!("({})", items.join(","))
}

fn ref_list(ids: &[EntityId]) -> String {
    let items: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("({})", items.join(","))
}

fn ref_or_null(id: Option<EntityId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "$".to_string(),
    }
}

fn opt_string(s: Option<&str>) -> String {
    match s {
        Some(s) => step_string(s),
        None => "$".to_string(),
    }
}

/// STEP real; always carries a decimal point
fn step_real(v: f64) -> String {
    if !v.is_finite() {
        return "0.".to_string();
    }
    let s = v.to_string();
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s
    } else {
        format!("{}.", s)
    }
}

/// Quoted STEP string with `''` quotes and `\X2\` / `\X4\` escapes
fn step_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            c if c.is_ascii() && !c.is_ascii_control() => out.push(c),
            c if (c as u32) <= 0xFFFF => {
                let _ = write!(out, "\\X2\\{:04X}\\X0\\", c as u32);
            }
            c => {
                let _ = write!(out, "\\X4\\{:08X}\\X0\\", c as u32);
            }
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ifc_lite_model::{MeasureType, QuantityType};

    #[test]
    fn test_handles_and_lookup() {
        let mut store = IfcStore::new(IfcSchema::Ifc4).with_first_id(100);
        let prop = store.add_property(IfcProperty::single(
            "FireRating",
            IfcValue::Label("F90".into()),
        ));
        assert_eq!(prop, EntityId(100));
        let pset = store.add_property_set(IfcPropertySetRecord {
            global_id: "0000000000000000000001".into(),
            name: "Pset_WallCommon".into(),
            description: None,
            properties: vec![prop],
        });
        let wall = EntityId(7);
        store.relate(pset, &[wall]);

        assert_eq!(store.len(), 3);
        assert!(store.property(pset).is_none());
        assert_eq!(store.find_property_set("Pset_WallCommon").unwrap().0, pset);
        assert_eq!(store.definitions_of(wall), vec![pset]);
        assert!(store.get(EntityId(99)).is_none());
    }

    #[test]
    fn test_step_lines() {
        let mut store = IfcStore::new(IfcSchema::Ifc2x3).with_owner_history(EntityId(900));
        let a = store.add_property(IfcProperty::single(
            "FireRating",
            IfcValue::Label("F90".into()),
        ));
        store.add_property(IfcProperty::single(
            "PitchAngle",
            IfcValue::Measure(MeasureType::PlaneAngle, 15.0),
        ));
        store.add_property(IfcProperty::single("IsExternal", IfcValue::Boolean(true)));
        store.add_quantity(IfcQuantity {
            name: "Height".into(),
            quantity_type: QuantityType::Length,
            value: 2.1,
        });
        let pset = store.add_property_set(IfcPropertySetRecord {
            global_id: "2O2Fr$t4X7Zf8NOew3FLOH".into(),
            name: "Pset_WallCommon".into(),
            description: None,
            properties: vec![a],
        });
        store.relate(pset, &[EntityId(42)]);

        let step = store.to_step();
        let lines: Vec<&str> = step.lines().collect();
        assert_eq!(
            lines[0],
            "#1=IFCPROPERTYSINGLEVALUE('FireRating',$,IFCLABEL('F90'),$);"
        );
        assert_eq!(
            lines[1],
            "#2=IFCPROPERTYSINGLEVALUE('PitchAngle',$,IFCPLANEANGLEMEASURE(15.),$);"
        );
        assert_eq!(
            lines[2],
            "#3=IFCPROPERTYSINGLEVALUE('IsExternal',$,IFCBOOLEAN(.T.),$);"
        );
        assert_eq!(lines[3], "#4=IFCQUANTITYLENGTH('Height',$,$,2.1);");
        assert_eq!(
            lines[4],
            "#5=IFCPROPERTYSET('2O2Fr$t4X7Zf8NOew3FLOH',#900,'Pset_WallCommon',$,(#1));"
        );
        assert!(lines[5].starts_with("#6=IFCRELDEFINESBYPROPERTIES('"));
        assert!(lines[5].ends_with(",#900,$,$,(#42),#5);"));
    }

    #[test]
    fn test_schema_specific_attributes() {
        let reference = IfcClassificationReference {
            identification: "21.22".into(),
            name: Some("Walls".into()),
        };
        let quantity = IfcQuantity {
            name: "Width".into(),
            quantity_type: QuantityType::Length,
            value: 300.0,
        };

        let mut ifc4 = IfcStore::new(IfcSchema::Ifc4);
        ifc4.add_classification_reference(reference.clone());
        ifc4.add_quantity(quantity.clone());
        let step = ifc4.to_step();
        assert!(step.contains("#1=IFCCLASSIFICATIONREFERENCE($,'21.22','Walls',$,$,$);"));
        assert!(step.contains("#2=IFCQUANTITYLENGTH('Width',$,$,300.,$);"));

        let mut ifc2x3 = IfcStore::new(IfcSchema::Ifc2x3);
        ifc2x3.add_classification_reference(reference);
        ifc2x3.add_quantity(quantity);
        let step = ifc2x3.to_step();
        assert!(step.contains("#1=IFCCLASSIFICATIONREFERENCE($,'21.22','Walls',$);"));
        assert!(step.contains("#2=IFCQUANTITYLENGTH('Width',$,$,300.);"));
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(step_string("O'Neil"), "'O''Neil'");
        assert_eq!(step_string("Wärme"), "'W\\X2\\00E4\\X0\\rme'");
        assert_eq!(step_string("a\\b"), "'a\\\\b'");
        assert_eq!(step_string("\u{1F600}"), "'\\X4\\0001F600\\X0\\'");
    }

    #[test]
    fn test_step_real() {
        assert_eq!(step_real(15.0), "15.");
        assert_eq!(step_real(-0.5), "-0.5");
        assert_eq!(step_real(f64::NAN), "0.");
    }
}
