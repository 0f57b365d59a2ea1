//! Maximal RAF detection.
//!
//! A RAF (Reflexively Autocatalytic and Food-generated) set is a set of
//! reactions in which every reactant is obtainable from the food set using
//! the set itself, and every reaction is catalyzed by at least one molecule
//! obtainable the same way. The maximal RAF is found by pruning to a fixed
//! point: compute the food-generated closure of the surviving reactions,
//! drop every reaction that is not supported by it, repeat.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::molecule::{MoleculeSet, ReactionId};
use crate::network::ReactionNetwork;

/// Outcome of a RAF query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RafResult {
    /// True iff the maximal RAF is non-empty.
    pub is_raf: bool,
    /// The maximal RAF (possibly empty).
    pub reactions: BTreeSet<ReactionId>,
    /// Food-generated closure of `reactions`.
    pub closure: MoleculeSet,
    /// Pruning passes performed (at most `candidates + 1`).
    pub iterations: usize,
}

impl RafResult {
    /// True if the maximal RAF is the whole (non-empty) reaction set of `network`.
    #[must_use]
    pub fn covers(&self, network: &ReactionNetwork) -> bool {
        network.reaction_count() > 0 && self.reactions.len() == network.reaction_count()
    }
}

/// Maximal RAF of a full network.
#[must_use]
pub fn detect(network: &ReactionNetwork) -> RafResult {
    detect_within(network, network.reaction_ids())
}

/// Maximal RAF contained in `candidates`.
///
/// Ids not present in `network` are ignored.
pub fn detect_within(
    network: &ReactionNetwork,
    candidates: impl IntoIterator<Item = ReactionId>,
) -> RafResult {
    let mut surviving: BTreeSet<ReactionId> = candidates
        .into_iter()
        .filter(|id| network.reaction(*id).is_some())
        .collect();
    let mut iterations = 0;

    loop {
        iterations += 1;
        let closure = network.closure(surviving.iter().copied());
        let before = surviving.len();
        surviving.retain(|id| {
            network.reaction(*id).is_some_and(|r| {
                r.reactants.is_subset(&closure) && r.catalysts.iter().any(|c| closure.contains(c))
            })
        });
        if surviving.len() == before {
            return RafResult {
                is_raf: !surviving.is_empty(),
                reactions: surviving,
                closure,
                iterations,
            };
        }
    }
}

/// Maximal RAF of the time-sliced sub-network at a snapshot.
///
/// The sub-network holds the reactions whose products are all in `present`,
/// so the answer depends only on the snapshot, not on how it was reached.
#[must_use]
pub fn detect_snapshot(network: &ReactionNetwork, present: &MoleculeSet) -> RafResult {
    let candidates: Vec<ReactionId> = network
        .reaction_ids()
        .filter(|id| {
            network
                .reaction(*id)
                .is_some_and(|r| r.products.is_subset(present))
        })
        .collect();
    detect_within(network, candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::molecules;
    use crate::network::Reaction;

    fn rx(reactants: &[u32], products: &[u32], catalysts: &[u32]) -> Reaction {
        Reaction::new(
            molecules(reactants.iter().copied()),
            molecules(products.iter().copied()),
            molecules(catalysts.iter().copied()),
        )
    }

    fn net(food: &[u32], reactions: Vec<Reaction>, size: u32) -> ReactionNetwork {
        ReactionNetwork::new(molecules(food.iter().copied()), reactions, size).unwrap()
    }

    fn ids(raw: &[u32]) -> BTreeSet<ReactionId> {
        raw.iter().map(|i| ReactionId::new(*i)).collect()
    }

    #[test]
    fn empty_network_is_not_raf() {
        let network = net(&[1, 2], Vec::new(), 2);
        let result = detect(&network);
        assert!(!result.is_raf);
        assert!(result.reactions.is_empty());
        assert_eq!(result.closure, molecules([1, 2]));
        assert!(!result.covers(&network));
    }

    #[test]
    fn autocatalytic_cycle_is_raf() {
        // r0: 1+2 -> 3 catalyzed by 4; r1: 1+3 -> 4 catalyzed by 3.
        let network = net(&[1, 2], vec![rx(&[1, 2], &[3], &[4]), rx(&[1, 3], &[4], &[3])], 4);
        let result = detect(&network);
        assert!(result.is_raf);
        assert_eq!(result.reactions, ids(&[0, 1]));
        assert!(result.covers(&network));
    }

    #[test]
    fn unsupported_reactions_are_pruned() {
        // r0 catalyzed by food: RAF. r1 needs 9 which nothing produces.
        // r2 is catalyzed only by r1's product, so it falls after r1.
        let network = net(
            &[1, 2],
            vec![rx(&[1], &[3], &[2]), rx(&[3, 9], &[4], &[1]), rx(&[3], &[5], &[4])],
            9,
        );
        let result = detect(&network);
        assert_eq!(result.reactions, ids(&[0]));
        assert!(result.iterations >= 2);
        assert!(!result.covers(&network));
    }

    #[test]
    fn uncatalyzed_network_is_not_raf() {
        let network = net(&[1], vec![rx(&[1], &[2], &[]), rx(&[2], &[3], &[5])], 5);
        assert!(!detect(&network).is_raf);
    }

    #[test]
    fn detection_is_idempotent() {
        let network = net(
            &[1, 2],
            vec![
                rx(&[1, 2], &[3], &[4]),
                rx(&[1, 3], &[4], &[3]),
                rx(&[4], &[5], &[6]),
                rx(&[2], &[6], &[1]),
            ],
            6,
        );
        let first = detect(&network);
        let second = detect_within(&network, first.reactions.iter().copied());
        assert_eq!(first.reactions, second.reactions);
        assert_eq!(first.closure, second.closure);
    }

    #[test]
    fn snapshot_only_counts_reactions_with_present_products() {
        let network = net(&[1, 2], vec![rx(&[1], &[3], &[2]), rx(&[3], &[4], &[3])], 4);
        assert!(!detect_snapshot(&network, &molecules([1, 2])).is_raf);

        let partial = detect_snapshot(&network, &molecules([1, 2, 3]));
        assert_eq!(partial.reactions, ids(&[0]));

        let full = detect_snapshot(&network, &molecules([1, 2, 3, 4]));
        assert_eq!(full.reactions, ids(&[0, 1]));
    }

    #[test]
    fn unknown_candidate_ids_are_ignored() {
        let network = net(&[1], vec![rx(&[1], &[2], &[1])], 2);
        let result = detect_within(&network, ids(&[0, 7]));
        assert_eq!(result.reactions, ids(&[0]));
    }
}
