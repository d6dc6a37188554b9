// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory host model snapshot implementing `ElementResolver`

use ifc_lite_model::{
    ElementId, ElementResolver, HostElement, HostUnits, Result, ScheduleDefinition,
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Serialized form of a snapshot
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSnapshot {
    pub units: HostUnits,
    pub elements: Vec<HostElement>,
    pub schedules: Vec<ScheduleDefinition>,
}

impl Default for ModelSnapshot {
    fn default() -> Self {
        Self {
            units: HostUnits::metric(),
            elements: Vec::new(),
            schedules: Vec::new(),
        }
    }
}

/// Host model captured into memory
///
/// Elements are kept in insertion order and indexed by category.
#[derive(Default)]
pub struct SnapshotModel {
    elements: FxHashMap<ElementId, Arc<HostElement>>,
    /// Insertion order
    order: Vec<ElementId>,
    /// Category name -> element IDs
    category_index: FxHashMap<String, Vec<ElementId>>,
    schedules: Vec<ScheduleDefinition>,
    units: HostUnits,
}

impl SnapshotModel {
    /// Create an empty model with metric export units
    pub fn new() -> Self {
        Self {
            units: HostUnits::metric(),
            ..Self::default()
        }
    }

    /// Build a model from a serialized snapshot
    pub fn from_snapshot(snapshot: ModelSnapshot) -> Self {
        let mut model = Self::new().with_units(snapshot.units);
        for element in snapshot.elements {
            model.insert(element);
        }
        model.schedules = snapshot.schedules;
        model
    }

    /// Parse a JSON snapshot
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: ModelSnapshot = serde_json::from_str(json)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Read a JSON snapshot from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Set the unit declarations
    pub fn with_units(mut self, units: HostUnits) -> Self {
        self.units = units;
        self
    }

    /// Add a schedule
    pub fn with_schedule(mut self, schedule: ScheduleDefinition) -> Self {
        self.schedules.push(schedule);
        self
    }

    /// Add or replace an element
    pub fn insert(&mut self, element: HostElement) {
        let id = element.id;
        if let Some(previous) = self.elements.get(&id) {
            if let Some(category) = &previous.category {
                if let Some(ids) = self.category_index.get_mut(category) {
                    ids.retain(|other| *other != id);
                }
            }
        } else {
            self.order.push(id);
        }
        if let Some(category) = &element.category {
            self.category_index
                .entry(category.clone())
                .or_default()
                .push(id);
        }
        self.elements.insert(id, Arc::new(element));
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl ElementResolver for SnapshotModel {
    fn get(&self, id: ElementId) -> Option<Arc<HostElement>> {
        self.elements.get(&id).cloned()
    }

    fn elements_in_category(&self, category: &str) -> Vec<ElementId> {
        self.category_index
            .get(category)
            .cloned()
            .unwrap_or_default()
    }

    fn all_ids(&self) -> Vec<ElementId> {
        self.order.clone()
    }

    fn schedules(&self) -> Vec<ScheduleDefinition> {
        self.schedules.clone()
    }

    fn project_units(&self) -> HostUnits {
        self.units.clone()
    }
}
