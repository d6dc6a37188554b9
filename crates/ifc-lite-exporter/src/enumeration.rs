// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Enumerated property values
//!
//! Host parameters hold free text that only approximates a valid
//! enumerant ("Electric Heater" for ELECTRICHEATER), so members are matched
//! after normalization.

use serde::{Deserialize, Serialize};

/// Normalize a name for comparison: upper case, no spaces or underscores
pub fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(|c| c.to_uppercase())
        .collect()
}

/// Check whether two names are equal after normalization
pub fn matches(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// An IFC property enumeration (PEnum_...)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    pub name: String,
    /// Members in declaration order
    pub members: Vec<String>,
}

impl Enumeration {
    pub fn new(name: impl Into<String>, members: &[&str]) -> Self {
        Self {
            name: name.into(),
            members: members.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// Find the member a value stands for
    ///
    /// When several members normalize to the same key the first declared
    /// one wins.
    pub fn find(&self, value: &str) -> Option<&str> {
        let key = normalize(value);
        if key.is_empty() {
            return None;
        }
        self.members
            .iter()
            .find(|m| normalize(m) == key)
            .map(String::as_str)
    }

    /// Check whether a value matches any member
    pub fn contains(&self, value: &str) -> bool {
        self.find(value).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appliance() -> Enumeration {
        Enumeration::new(
            "IfcElectricApplianceTypeEnum",
            &["DISHWASHER", "ELECTRICHEATER", "FRIDGE_FREEZER", "USERDEFINED", "NOTDEFINED"],
        )
    }

    #[test]
    fn test_normalized_match() {
        let e = appliance();
        assert_eq!(e.find("Electric Heater"), Some("ELECTRICHEATER"));
        assert_eq!(e.find("electric_heater"), Some("ELECTRICHEATER"));
        assert_eq!(e.find("Fridge Freezer"), Some("FRIDGE_FREEZER"));
    }

    #[test]
    fn test_no_match_is_none() {
        let e = appliance();
        assert_eq!(e.find("Toaster"), None);
        assert_eq!(e.find("   "), None);
    }

    #[test]
    fn test_first_declared_member_wins() {
        let e = Enumeration::new("PEnum_Test", &["AB_C", "A_BC", "ABC"]);
        assert_eq!(e.find("abc"), Some("AB_C"));
    }
}
