// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parameter resolution on host elements
//!
//! A parameter is searched on the instance by localized name, then by
//! canonical name, then by built-in id (and that id's display label). If
//! none of these match, the same search runs once on the element's type.

use crate::factory::RawValue;
use ifc_lite_model::{
    BuiltInParameter, ElementResolver, HostElement, Language, Parameter, ParameterValue,
};

/// What to look for on an element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ParameterLookup<'a> {
    /// Name in the active export language
    pub localized: Option<&'a str>,
    /// Canonical (English) name
    pub name: Option<&'a str>,
    pub builtin: Option<BuiltInParameter>,
}

impl<'a> ParameterLookup<'a> {
    /// Look up by name only
    pub fn named(name: &'a str) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    /// Look up by built-in id only
    pub fn builtin(id: BuiltInParameter) -> Self {
        Self {
            builtin: Some(id),
            ..Self::default()
        }
    }

    pub fn with_builtin(mut self, id: BuiltInParameter) -> Self {
        self.builtin = Some(id);
        self
    }

    pub fn with_localized(mut self, name: &'a str) -> Self {
        self.localized = Some(name);
        self
    }
}

/// Reads raw parameter values from the host model
pub struct ParameterResolver<'m> {
    model: &'m dyn ElementResolver,
    language: Language,
}

impl<'m> ParameterResolver<'m> {
    pub fn new(model: &'m dyn ElementResolver, language: Language) -> Self {
        Self { model, language }
    }

    pub fn model(&self) -> &'m dyn ElementResolver {
        self.model
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Run `f` on the element, then once on its type if that yields nothing
    pub fn resolve_with_type_fallback<T>(
        &self,
        element: &HostElement,
        f: impl Fn(&HostElement) -> Option<T>,
    ) -> Option<T> {
        f(element).or_else(|| {
            let symbol = self.model.type_of(element)?;
            f(&symbol)
        })
    }

    /// Search one element, without type fallback
    pub fn find_on<'e>(
        &self,
        element: &'e HostElement,
        lookup: &ParameterLookup<'_>,
    ) -> Option<&'e Parameter> {
        if let Some(param) = lookup.localized.and_then(|n| element.parameter(n)) {
            return Some(param);
        }
        if let Some(param) = lookup.name.and_then(|n| element.parameter(n)) {
            return Some(param);
        }
        let id = lookup.builtin?;
        element
            .builtin(id)
            .or_else(|| element.parameter(id.label()))
    }

    /// Find a parameter on the element or its type
    pub fn find(&self, element: &HostElement, lookup: &ParameterLookup<'_>) -> Option<Parameter> {
        self.resolve_with_type_fallback(element, |e| self.find_on(e, lookup).cloned())
    }

    /// Resolve a raw value on the element or its type
    pub fn resolve(&self, element: &HostElement, lookup: &ParameterLookup<'_>) -> Option<RawValue> {
        self.find(element, lookup).map(|p| self.raw_value(&p))
    }

    /// Raw value of a parameter, with the referenced element's name filled in
    pub fn raw_value(&self, param: &Parameter) -> RawValue {
        let mut raw = RawValue::new(param.value.clone());
        raw.display = param.display.clone();
        if let ParameterValue::ElementId(id) = param.value {
            if id.is_valid() {
                raw.referenced_name = self.model.element_name(id);
            }
        }
        raw
    }

    /// Double value of a built-in parameter, instance then type
    pub fn double(&self, element: &HostElement, id: BuiltInParameter) -> Option<f64> {
        self.find(element, &ParameterLookup::builtin(id))
            .and_then(|p| p.value.as_f64())
    }

    /// Integer value of a built-in parameter, instance then type
    pub fn integer(&self, element: &HostElement, id: BuiltInParameter) -> Option<i64> {
        self.find(element, &ParameterLookup::builtin(id))
            .and_then(|p| p.value.as_i64())
    }

    /// String value of a named parameter, instance then type
    pub fn string(&self, element: &HostElement, name: &str) -> Option<String> {
        self.find(element, &ParameterLookup::named(name))
            .and_then(|p| p.value.as_str().map(str::to_string))
    }
}
