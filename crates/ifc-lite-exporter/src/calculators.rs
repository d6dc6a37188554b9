// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Computed property values
//!
//! Calculators cover the few properties that cannot be read from a single
//! parameter. Each one is a plain function registered by name. Some
//! produce several named outputs from one pass (riser count and riser
//! height come from the same computation).

use crate::category::Classification;
use crate::factory::RawValue;
use crate::parameters::{ParameterLookup, ParameterResolver};
use ifc_lite_model::{BuiltInParameter, HostElement, IfcEntityType, ParameterValue};
use rustc_hash::FxHashMap;

/// Everything a calculator may look at
pub struct CalculatorInput<'a> {
    pub element: &'a HostElement,
    /// Type of `element`, if it is an instance with a type
    pub element_type: Option<&'a HostElement>,
    pub params: &'a ParameterResolver<'a>,
    pub classification: &'a Classification,
}

impl CalculatorInput<'_> {
    fn double(&self, id: BuiltInParameter) -> Option<f64> {
        self.params.double(self.element, id)
    }

    fn integer(&self, id: BuiltInParameter) -> Option<i64> {
        self.params.integer(self.element, id)
    }

    fn is_a(&self, ty: IfcEntityType) -> bool {
        self.classification.entity_type.is_a(&ty)
    }

    fn in_category(&self, names: &[&str]) -> bool {
        names
            .iter()
            .any(|n| self.classification.category.eq_ignore_ascii_case(n))
    }
}

/// Named outputs of one calculator run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalculatedValues {
    values: Vec<(String, RawValue)>,
}

impl CalculatedValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outputs with a single value
    pub fn single(name: &str, value: RawValue) -> Self {
        Self::new().with(name, value)
    }

    pub fn with(mut self, name: &str, value: RawValue) -> Self {
        self.values.push((name.to_string(), value));
        self
    }

    /// Value for an output name
    ///
    /// A calculator with exactly one output answers for any name.
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        if let [(_, only)] = self.values.as_slice() {
            return Some(only);
        }
        self.values
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Signature of a calculator
pub type CalculatorFn = fn(&CalculatorInput<'_>) -> Option<CalculatedValues>;

/// Calculators by name, built once per session
pub struct CalculatorRegistry {
    calculators: FxHashMap<String, CalculatorFn>,
}

impl Default for CalculatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorRegistry {
    /// Registry with every built-in calculator
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("load_bearing", load_bearing);
        registry.register("is_external", is_external);
        registry.register("span", span);
        registry.register("slope", slope);
        registry.register("stair_risers", stair_risers);
        registry.register("reference", reference);
        registry.register("shape_code", shape_code);
        registry.register("thermal_transmittance", thermal_transmittance);
        registry.register("space_areas", space_areas);
        registry.register("gross_footprint_area", gross_footprint_area);
        registry.register("opening_area", opening_area);
        registry.register("cross_section_area", cross_section_area);
        registry
    }

    /// Registry without any calculator
    pub fn empty() -> Self {
        Self {
            calculators: FxHashMap::default(),
        }
    }

    /// Add or replace a calculator
    pub fn register(&mut self, name: &str, calculator: CalculatorFn) {
        self.calculators.insert(name.to_string(), calculator);
    }

    pub fn get(&self, name: &str) -> Option<CalculatorFn> {
        self.calculators.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.calculators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }
}

// ============================================================================
// Built-in calculators
// ============================================================================

/// Structural flag of walls and floors; structural framing and columns
/// always bear load
fn load_bearing(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let bearing = if input.in_category(&["Structural Framing", "Structural Columns"]) {
        true
    } else if let Some(flag) = input.integer(BuiltInParameter::WallStructuralSignificant) {
        flag != 0
    } else if let Some(usage) = input.integer(BuiltInParameter::WallStructuralUsage) {
        // 0 is non-bearing
        usage != 0
    } else {
        input.integer(BuiltInParameter::FloorIsStructural)? != 0
    };
    Some(CalculatedValues::single("LoadBearing", RawValue::boolean(bearing)))
}

/// Wall and floor function: exterior, foundation, retaining and soffit
/// count as external
fn is_external(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let function = input.integer(BuiltInParameter::Function)?;
    let external = matches!(function, 1..=4);
    Some(CalculatedValues::single("IsExternal", RawValue::boolean(external)))
}

fn span(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let length = input
        .double(BuiltInParameter::StructuralFramingCutLength)
        .or_else(|| input.double(BuiltInParameter::InstanceLength))
        .or_else(|| input.double(BuiltInParameter::CurveElemLength))?;
    Some(CalculatedValues::single("Span", RawValue::double(length)))
}

/// Roof slope, or the inclination of a beam from its level offsets
fn slope(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let angle = if let Some(roof) = input.double(BuiltInParameter::RoofSlope) {
        roof
    } else if input.is_a(IfcEntityType::IfcBeam) || input.is_a(IfcEntityType::IfcMember) {
        let start = input.double(BuiltInParameter::StartLevelOffset)?;
        let end = input.double(BuiltInParameter::EndLevelOffset)?;
        let length = input
            .double(BuiltInParameter::StructuralFramingCutLength)
            .or_else(|| input.double(BuiltInParameter::CurveElemLength))?;
        if length <= 0.0 {
            return None;
        }
        (end - start).abs().atan2(length)
    } else {
        return None;
    };
    Some(
        CalculatedValues::new()
            .with("Slope", RawValue::double(angle))
            .with("PitchAngle", RawValue::double(angle)),
    )
}

/// Riser count, tread count, riser height and tread length of a stair
fn stair_risers(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let height = input.double(BuiltInParameter::StairsHeight);
    let risers = match input.integer(BuiltInParameter::StairsActualNumRisers) {
        Some(count) if count > 0 => count,
        _ => {
            let desired = input.double(BuiltInParameter::StairsMaxRiserHeight)?;
            if desired <= 0.0 {
                return None;
            }
            (height? / desired).ceil() as i64
        }
    };
    if risers <= 0 {
        return None;
    }

    let mut values = CalculatedValues::new()
        .with("NumberOfRiser", RawValue::integer(risers))
        .with("NumberOfTreads", RawValue::integer(risers - 1));

    let riser_height = input
        .double(BuiltInParameter::StairsActualRiserHeight)
        .or_else(|| height.map(|h| h / risers as f64));
    if let Some(riser_height) = riser_height {
        values = values.with("RiserHeight", RawValue::double(riser_height));
    }
    if let Some(tread) = input.double(BuiltInParameter::StairsActualTreadDepth) {
        values = values.with("TreadLength", RawValue::double(tread));
    }
    Some(values)
}

/// Name of the element's type
fn reference(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let name = match input.element_type {
        Some(symbol) => symbol.name.clone(),
        None if input.element.is_type => input.element.name.clone(),
        None => return None,
    };
    if name.is_empty() {
        return None;
    }
    Some(CalculatedValues::single("Reference", RawValue::string(name)))
}

/// Name of the rebar shape element
fn shape_code(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let param = input
        .params
        .find(input.element, &ParameterLookup::builtin(BuiltInParameter::RebarShape))?;
    let name = match &param.value {
        ParameterValue::ElementId(id) => input.params.model().element_name(*id)?,
        ParameterValue::String(s) => s.clone(),
        _ => return None,
    };
    Some(
        CalculatedValues::new()
            .with("ShapeCode", RawValue::string(name.clone()))
            .with("BarShapeCode", RawValue::string(name)),
    )
}

/// Heat transfer coefficient in internal units; scaled like any other
/// thermal transmittance when the property is created
fn thermal_transmittance(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let u = input.double(BuiltInParameter::HeatTransferCoefficient)?;
    Some(CalculatedValues::single(
        "ThermalTransmittance",
        RawValue::double(u),
    ))
}

fn space_areas(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let area = input
        .double(BuiltInParameter::RoomArea)
        .or_else(|| input.double(BuiltInParameter::HostAreaComputed))?;
    Some(
        CalculatedValues::new()
            .with("GrossPlannedArea", RawValue::double(area))
            .with("NetPlannedArea", RawValue::double(area)),
    )
}

fn gross_footprint_area(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let length = input
        .double(BuiltInParameter::CurveElemLength)
        .or_else(|| input.double(BuiltInParameter::InstanceLength))?;
    let width = input
        .double(BuiltInParameter::WallWidth)
        .or_else(|| input.double(BuiltInParameter::FamilyWidth))?;
    Some(CalculatedValues::single(
        "GrossFootprintArea",
        RawValue::double(length * width),
    ))
}

fn opening_area(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let height = input.double(BuiltInParameter::FamilyHeight)?;
    let width = input.double(BuiltInParameter::FamilyWidth)?;
    Some(CalculatedValues::single("Area", RawValue::double(height * width)))
}

fn cross_section_area(input: &CalculatorInput<'_>) -> Option<CalculatedValues> {
    let width = input.double(BuiltInParameter::SectionWidth)?;
    let height = input.double(BuiltInParameter::SectionHeight)?;
    Some(CalculatedValues::single(
        "CrossSectionArea",
        RawValue::double(width * height),
    ))
}
