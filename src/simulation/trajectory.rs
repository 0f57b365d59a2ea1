//! Per-run trajectories.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::molecule::{Molecule, MoleculeSet, ReactionId};

/// One reaction firing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiringEvent {
    /// 1-based position in the run.
    pub step: usize,
    /// Normalized time in `(0, 1]`.
    pub time: f64,
    /// Reaction that fired.
    pub reaction: ReactionId,
    /// Products that were not present before this event.
    pub produced: Vec<Molecule>,
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// No eligible reaction was left.
    Quiescent,
    /// The next event would fall after normalized time 1.
    Horizon,
    /// Every reaction of the maximal RAF had fired (`max_raf`).
    RafComplete,
}

/// Monotone record of which molecules are present over normalized time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    /// Run index within the request.
    pub run: usize,
    /// Seed this run was sampled with.
    pub seed: u64,
    /// Firing events in time order.
    pub events: Vec<FiringEvent>,
    /// Earliest normalized time of every molecule that appeared (food at 0.0).
    pub first_hits: BTreeMap<Molecule, f64>,
    /// Requested snapshot times, in request order.
    pub snapshot_times: Vec<f64>,
    /// Present molecules at each snapshot time.
    pub snapshots: Vec<MoleculeSet>,
    /// Why the run stopped.
    pub stop: StopReason,
}

impl Trajectory {
    /// Assembles a trajectory from the food set and the ordered events.
    #[must_use]
    pub fn from_events(
        run: usize,
        seed: u64,
        food: &MoleculeSet,
        events: Vec<FiringEvent>,
        snapshot_times: &[f64],
        stop: StopReason,
    ) -> Self {
        let mut first_hits: BTreeMap<Molecule, f64> = food.iter().map(|m| (*m, 0.0)).collect();
        for event in &events {
            for m in &event.produced {
                first_hits.entry(*m).or_insert(event.time);
            }
        }
        let mut trajectory = Self {
            run,
            seed,
            events,
            first_hits,
            snapshot_times: snapshot_times.to_vec(),
            snapshots: Vec::new(),
            stop,
        };
        trajectory.snapshots = snapshot_times.iter().map(|t| trajectory.present_at(*t)).collect();
        trajectory
    }

    /// Molecules present at or before normalized time `time`.
    #[must_use]
    pub fn present_at(&self, time: f64) -> MoleculeSet {
        self.first_hits
            .iter()
            .filter(|(_, hit)| **hit <= time)
            .map(|(m, _)| *m)
            .collect()
    }

    /// Earliest normalized time `molecule` appeared, if it ever did.
    #[must_use]
    pub fn first_hit(&self, molecule: Molecule) -> Option<f64> {
        self.first_hits.get(&molecule).copied()
    }

    /// Reactions fired at or before `time`, in firing order.
    pub fn fired_until(&self, time: f64) -> impl Iterator<Item = ReactionId> + '_ {
        self.events
            .iter()
            .take_while(move |e| e.time <= time)
            .map(|e| e.reaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::molecules;

    fn sample() -> Trajectory {
        let events = vec![
            FiringEvent {
                step: 1,
                time: 0.2,
                reaction: ReactionId::new(0),
                produced: vec![Molecule::new(3)],
            },
            FiringEvent {
                step: 2,
                time: 0.6,
                reaction: ReactionId::new(2),
                produced: vec![Molecule::new(5)],
            },
        ];
        Trajectory::from_events(0, 11, &molecules([1, 2]), events, &[0.0, 0.5, 1.0], StopReason::Quiescent)
    }

    #[test]
    fn snapshots_are_monotone_prefixes() {
        let t = sample();
        assert_eq!(t.snapshots[0], molecules([1, 2]));
        assert_eq!(t.snapshots[1], molecules([1, 2, 3]));
        assert_eq!(t.snapshots[2], molecules([1, 2, 3, 5]));
        assert!(t.snapshots.windows(2).all(|w| w[0].is_subset(&w[1])));
    }

    #[test]
    fn first_hits_distinguish_absent_from_food() {
        let t = sample();
        assert_eq!(t.first_hit(Molecule::new(1)), Some(0.0));
        assert_eq!(t.first_hit(Molecule::new(5)), Some(0.6));
        assert_eq!(t.first_hit(Molecule::new(4)), None);
    }

    #[test]
    fn fired_until_returns_consistent_prefix() {
        let t = sample();
        assert_eq!(t.fired_until(0.0).count(), 0);
        assert_eq!(t.fired_until(0.5).collect::<Vec<_>>(), vec![ReactionId::new(0)]);
        assert_eq!(t.fired_until(1.0).count(), 2);
    }
}
