//! Molecule and reaction handles.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle for a molecule species.
///
/// Molecules are numbered `1..=universe_size`; the food set occupies the
/// lowest numbers. Ordering follows the number, which keeps every set and
/// map keyed by molecules deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Molecule(u32);

impl Molecule {
    /// Creates a molecule handle.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the numeric id.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered set of molecules.
pub type MoleculeSet = BTreeSet<Molecule>;

/// Builds a molecule set from raw ids.
pub fn molecules(ids: impl IntoIterator<Item = u32>) -> MoleculeSet {
    ids.into_iter().map(Molecule::new).collect()
}

/// Index of a reaction within its network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionId(u32);

impl ReactionId {
    /// Creates a reaction id.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the index as `usize` for slice access.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn molecules_order_by_number() {
        let set = molecules([10, 2, 7]);
        let ids: Vec<u32> = set.iter().map(|m| m.id()).collect();
        assert_eq!(ids, vec![2, 7, 10]);
    }

    #[test]
    fn molecule_serializes_as_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(Molecule::new(3), 0.5_f64);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"3":0.5}"#);
        let back: std::collections::BTreeMap<Molecule, f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}
