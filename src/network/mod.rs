//! Catalyzed reaction networks (macro layer).
//!
//! A [`ReactionNetwork`] is the immutable output of a [`NetworkGenerator`]:
//! a food set, an ordered list of catalyzed reactions, and the size of the
//! molecule universe. Everything downstream (trajectories, RAF detection,
//! aggregation) reads networks and never mutates them.

mod generator;
mod params;

pub use generator::{NetworkGenerator, TapGenerator};
pub use params::{MacroParams, MAX_SATURATION};

use serde::Serialize;

use crate::error::ValidationError;
use crate::molecule::{Molecule, MoleculeSet, ReactionId};

/// A catalyzed reaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reaction {
    /// Molecules consumed (all must be present to fire).
    pub reactants: MoleculeSet,
    /// Molecules made available by firing.
    pub products: MoleculeSet,
    /// Molecules enabling the reaction (at least one must be present).
    pub catalysts: MoleculeSet,
}

impl Reaction {
    /// Creates a reaction.
    pub fn new(
        reactants: impl IntoIterator<Item = Molecule>,
        products: impl IntoIterator<Item = Molecule>,
        catalysts: impl IntoIterator<Item = Molecule>,
    ) -> Self {
        Self {
            reactants: reactants.into_iter().collect(),
            products: products.into_iter().collect(),
            catalysts: catalysts.into_iter().collect(),
        }
    }

    /// Number of catalysts of this reaction inside `available`.
    #[must_use]
    pub fn catalysts_in(&self, available: &MoleculeSet) -> usize {
        self.catalysts.iter().filter(|c| available.contains(*c)).count()
    }

    /// Returns true if all reactants are available and at least one catalyst is.
    #[must_use]
    pub fn can_fire(&self, available: &MoleculeSet) -> bool {
        self.reactants.is_subset(available) && self.catalysts_in(available) > 0
    }
}

/// Immutable catalyzed reaction network over a food set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactionNetwork {
    food: MoleculeSet,
    reactions: Vec<Reaction>,
    universe_size: u32,
}

impl ReactionNetwork {
    /// Creates a network, checking that every molecule lies in `1..=universe_size`.
    pub fn new(
        food: MoleculeSet,
        reactions: Vec<Reaction>,
        universe_size: u32,
    ) -> Result<Self, ValidationError> {
        let in_universe = |m: Molecule| (1..=universe_size).contains(&m.id());
        if let Some(m) = food.iter().find(|m| !in_universe(**m)) {
            return Err(ValidationError::invalid(
                "food",
                m,
                format!("molecule outside universe 1..={universe_size}"),
            ));
        }
        for (idx, r) in reactions.iter().enumerate() {
            let mut all = r.reactants.iter().chain(&r.products).chain(&r.catalysts);
            if let Some(m) = all.find(|m| !in_universe(**m)) {
                return Err(ValidationError::invalid(
                    format!("reactions[{idx}]"),
                    m,
                    format!("molecule outside universe 1..={universe_size}"),
                ));
            }
        }
        Ok(Self {
            food,
            reactions,
            universe_size,
        })
    }

    /// Food set (present at time 0 in every run).
    #[must_use]
    pub const fn food(&self) -> &MoleculeSet {
        &self.food
    }

    /// Reactions in generation order.
    #[must_use]
    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    /// Looks up a reaction.
    #[must_use]
    pub fn reaction(&self, id: ReactionId) -> Option<&Reaction> {
        self.reactions.get(id.index())
    }

    /// All reaction ids in order.
    pub fn reaction_ids(&self) -> impl Iterator<Item = ReactionId> + '_ {
        (0..self.reactions.len()).map(|i| ReactionId::new(i as u32))
    }

    /// Number of reactions.
    #[must_use]
    pub fn reaction_count(&self) -> usize {
        self.reactions.len()
    }

    /// Size of the molecule universe.
    #[must_use]
    pub const fn universe_size(&self) -> u32 {
        self.universe_size
    }

    /// Iterates the molecule universe in order.
    pub fn molecules(&self) -> impl Iterator<Item = Molecule> {
        (1..=self.universe_size).map(Molecule::new)
    }

    /// Closure of the food set under the given reactions, ignoring catalysis.
    ///
    /// This is the set of molecules obtainable from food by repeatedly firing
    /// any reaction of `subset` whose reactants are all obtainable.
    pub fn closure(&self, subset: impl IntoIterator<Item = ReactionId>) -> MoleculeSet {
        let candidates: Vec<&Reaction> = subset
            .into_iter()
            .filter_map(|id| self.reaction(id))
            .collect();
        let mut reached = self.food.clone();
        let mut changed = true;
        while changed {
            changed = false;
            for r in &candidates {
                if r.reactants.is_subset(&reached) && !r.products.is_subset(&reached) {
                    reached.extend(r.products.iter().copied());
                    changed = true;
                }
            }
        }
        reached
    }

    /// Returns a copy in which every reaction keeps at most one catalyst:
    /// the smallest of its catalysts inside the food-generated closure.
    ///
    /// Reactions with no catalyst in the closure lose all catalysts.
    #[must_use]
    pub fn prune_catalysts(&self) -> Self {
        let closure = self.closure(self.reaction_ids());
        let reactions = self
            .reactions
            .iter()
            .map(|r| Reaction {
                reactants: r.reactants.clone(),
                products: r.products.clone(),
                catalysts: r
                    .catalysts
                    .iter()
                    .find(|c| closure.contains(*c))
                    .copied()
                    .into_iter()
                    .collect(),
            })
            .collect();
        Self {
            food: self.food.clone(),
            reactions,
            universe_size: self.universe_size,
        }
    }

    /// Stable BLAKE3 fingerprint of the canonical encoding (hex).
    ///
    /// Two networks have equal fingerprints iff they are bit-identical.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fn put_set(hasher: &mut blake3::Hasher, set: &MoleculeSet) {
            hasher.update(&(set.len() as u64).to_le_bytes());
            for m in set {
                hasher.update(&m.id().to_le_bytes());
            }
        }

        let mut hasher = blake3::Hasher::new();
        hasher.update(b"rafsim.network.v1");
        hasher.update(&self.universe_size.to_le_bytes());
        put_set(&mut hasher, &self.food);
        hasher.update(&(self.reactions.len() as u64).to_le_bytes());
        for r in &self.reactions {
            put_set(&mut hasher, &r.reactants);
            put_set(&mut hasher, &r.products);
            put_set(&mut hasher, &r.catalysts);
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::molecules;

    fn rx(reactants: &[u32], products: &[u32], catalysts: &[u32]) -> Reaction {
        Reaction {
            reactants: molecules(reactants.iter().copied()),
            products: molecules(products.iter().copied()),
            catalysts: molecules(catalysts.iter().copied()),
        }
    }

    fn chain_network() -> ReactionNetwork {
        // 1 + 2 -> 3 (cat 3), 3 -> 4 (cat 1), 5 -> 6 (cat 4)
        ReactionNetwork::new(
            molecules([1, 2]),
            vec![rx(&[1, 2], &[3], &[3]), rx(&[3], &[4], &[1]), rx(&[5], &[6], &[4])],
            6,
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_molecules_outside_universe() {
        let err = ReactionNetwork::new(molecules([1]), vec![rx(&[1], &[9], &[1])], 4).unwrap_err();
        let ValidationError::InvalidParameter { name, value, .. } = err else {
            panic!("expected InvalidParameter");
        };
        assert_eq!(name, "reactions[0]");
        assert_eq!(value, "9");

        assert!(ReactionNetwork::new(molecules([0]), Vec::new(), 4).is_err());
    }

    #[test]
    fn closure_follows_reactant_availability() {
        let net = chain_network();
        let closure = net.closure(net.reaction_ids());
        assert_eq!(closure, molecules([1, 2, 3, 4]));

        let partial = net.closure([ReactionId::new(1)]);
        assert_eq!(partial, molecules([1, 2]));
    }

    #[test]
    fn can_fire_requires_a_present_catalyst() {
        let r = rx(&[1], &[2], &[3]);
        assert!(!r.can_fire(&molecules([1])));
        assert!(r.can_fire(&molecules([1, 3])));
        assert!(!rx(&[1], &[2], &[]).can_fire(&molecules([1, 2, 3])));
    }

    #[test]
    fn prune_catalysts_keeps_smallest_reachable_catalyst() {
        let net = ReactionNetwork::new(
            molecules([1, 2]),
            vec![rx(&[1], &[3], &[5, 3, 2]), rx(&[3], &[4], &[6])],
            6,
        )
        .unwrap();
        let pruned = net.prune_catalysts();
        assert_eq!(pruned.reactions()[0].catalysts, molecules([2]));
        assert!(pruned.reactions()[1].catalysts.is_empty());
        assert_eq!(pruned.food(), net.food());
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive() {
        let a = chain_network();
        let b = chain_network();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        let c = ReactionNetwork::new(
            molecules([1, 2]),
            vec![rx(&[1, 2], &[3], &[3]), rx(&[3], &[4], &[2]), rx(&[5], &[6], &[4])],
            6,
        )
        .unwrap();
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
