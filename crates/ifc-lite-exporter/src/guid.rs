// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic IFC GlobalIds
//!
//! Ids are name-based UUIDs compressed into the 22 character IFC form, so
//! exporting the same model twice yields the same ids.

use crate::description::SetTarget;
use ifc_lite_model::ElementId;
use uuid::Uuid;

/// IFC base64 alphabet (not RFC 4648)
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz_$";

/// Compress a UUID into a 22 character GlobalId
///
/// The first character holds the top two bits, the other 21 six bits each.
pub fn compress(uuid: &Uuid) -> String {
    let n = uuid.as_u128();
    let mut out = String::with_capacity(22);
    out.push(ALPHABET[(n >> 126) as usize] as char);
    for i in (0..21).rev() {
        out.push(ALPHABET[((n >> (i * 6)) & 0x3f) as usize] as char);
    }
    out
}

/// Expand a 22 character GlobalId back into a UUID
pub fn expand(guid: &str) -> Option<Uuid> {
    if guid.len() != 22 {
        return None;
    }
    let mut n: u128 = 0;
    for (i, c) in guid.bytes().enumerate() {
        let digit = ALPHABET.iter().position(|a| *a == c)? as u128;
        if i == 0 && digit > 3 {
            return None;
        }
        n = (n << 6) | digit;
    }
    Some(Uuid::from_u128(n))
}

/// GlobalId derived from `parts`
pub fn stable_guid(parts: &[&str]) -> String {
    let name = parts.join(":");
    compress(&Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()))
}

fn target_salt(target: SetTarget) -> &'static str {
    match target {
        SetTarget::Instance => "instance",
        SetTarget::Type => "type",
    }
}

/// GlobalId of the set named `set_name` on `element`
pub fn property_set_guid(element: ElementId, set_name: &str, target: SetTarget) -> String {
    stable_guid(&[&element.0.to_string(), set_name, target_salt(target)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_shape() {
        let guid = compress(&Uuid::from_u128(u128::MAX));
        assert_eq!(guid, "3$$$$$$$$$$$$$$$$$$$$$");
        assert_eq!(compress(&Uuid::nil()), "0000000000000000000000");
    }

    #[test]
    fn test_expand_inverts_compress() {
        let uuid = Uuid::new_v5(&Uuid::NAMESPACE_OID, b"wall");
        assert_eq!(expand(&compress(&uuid)), Some(uuid));
        assert_eq!(expand("short"), None);
        assert_eq!(expand("4$$$$$$$$$$$$$$$$$$$$$"), None);
    }

    #[test]
    fn test_stable_and_distinct() {
        let a = property_set_guid(ElementId(42), "Pset_WallCommon", SetTarget::Instance);
        let b = property_set_guid(ElementId(42), "Pset_WallCommon", SetTarget::Instance);
        let c = property_set_guid(ElementId(42), "Pset_WallCommon", SetTarget::Type);
        let d = property_set_guid(ElementId(43), "Pset_WallCommon", SetTarget::Instance);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_eq!(a.len(), 22);
    }
}
