// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Read-only access to the host model being exported

use crate::{ElementId, HostElement, HostUnits, ScheduleDefinition};
use std::sync::Arc;

/// Element lookup in the host model
///
/// Implementations should provide O(1) lookup by element ID. The exporter
/// never writes through this trait.
///
/// # Example
///
/// ```ignore
/// use ifc_lite_model::{ElementResolver, ElementId};
///
/// fn fire_rating(resolver: &dyn ElementResolver, id: ElementId) -> Option<String> {
///     let element = resolver.get(id)?;
///     if let Some(param) = element.parameter("FireRating") {
///         return param.value.as_str().map(str::to_string);
///     }
///     let symbol = resolver.type_of(&element)?;
///     symbol.parameter("FireRating")?.value.as_str().map(str::to_string)
/// }
/// ```
pub trait ElementResolver: Send + Sync {
    /// Get element by ID
    fn get(&self, id: ElementId) -> Option<Arc<HostElement>>;

    /// Get the type ("symbol") element of an instance
    ///
    /// Types have no further types, so this is a single hop.
    fn type_of(&self, element: &HostElement) -> Option<Arc<HostElement>> {
        if element.is_type {
            return None;
        }
        element
            .type_id
            .filter(|id| id.is_valid())
            .and_then(|id| self.get(id))
    }

    /// Get the display name of an element
    fn element_name(&self, id: ElementId) -> Option<String> {
        self.get(id).map(|e| e.name.clone())
    }

    /// Get all element IDs of a category
    fn elements_in_category(&self, category: &str) -> Vec<ElementId>;

    /// Get all element IDs in the model
    fn all_ids(&self) -> Vec<ElementId>;

    /// Schedules that may be exported as property sets
    fn schedules(&self) -> Vec<ScheduleDefinition> {
        Vec::new()
    }

    /// Unit conversions from internal storage to export units
    fn project_units(&self) -> HostUnits {
        HostUnits::metric()
    }
}

/// Extension methods for ElementResolver
pub trait ElementResolverExt: ElementResolver {
    /// Check if an element exists
    fn exists(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Get element or return error
    fn get_or_err(&self, id: ElementId) -> crate::Result<Arc<HostElement>> {
        self.get(id).ok_or(crate::ExportError::ElementNotFound(id))
    }
}

// Blanket implementation for all ElementResolver types
impl<T: ElementResolver + ?Sized> ElementResolverExt for T {}
