//! Registered extras: named pure functions over a [`SampleSet`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::molecule::{Molecule, MoleculeSet, ReactionId};

use super::aggregate::FirstHitAccumulator;
use super::SampleSet;

/// First-hit times of one molecule across runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstHitDistribution {
    /// Sorted first-hit times of the runs where the molecule appeared.
    pub times: Vec<f64>,
    /// Runs where the molecule never appeared.
    pub absent: usize,
}

/// Summary statistics of first-hit times of one molecule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstHitStats {
    /// Runs where the molecule appeared.
    pub count: usize,
    /// Runs where it never appeared.
    pub absent: usize,
    /// Earliest hit.
    pub min: Option<f64>,
    /// Mean hit time over the runs where it appeared.
    pub mean: Option<f64>,
    /// Latest hit.
    pub max: Option<f64>,
}

impl From<&FirstHitDistribution> for FirstHitStats {
    fn from(dist: &FirstHitDistribution) -> Self {
        let count = dist.times.len();
        let mean = (count > 0).then(|| dist.times.iter().sum::<f64>() / count as f64);
        Self {
            count,
            absent: dist.absent,
            min: dist.times.first().copied(),
            mean,
            max: dist.times.last().copied(),
        }
    }
}

/// RAF status of all runs at one snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRaf {
    /// Normalized snapshot time.
    pub time: f64,
    /// Per-run flag, ordered by run index.
    pub runs: Vec<bool>,
    /// Fraction of runs that are RAF at this time.
    pub fraction: f64,
}

/// Network-level RAF facts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkRaf {
    /// The maximal RAF is non-empty.
    pub is_raf: bool,
    /// The maximal RAF is the whole reaction set.
    pub full_network: bool,
    /// Reactions of the maximal RAF.
    pub reactions: Vec<ReactionId>,
}

/// Value of the `is_raf` extra.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RafReport {
    /// One entry per requested snapshot time, in request order.
    pub snapshots: Vec<SnapshotRaf>,
    /// RAF status of the whole network.
    pub network: NetworkRaf,
}

/// Value of the `species` extra.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesReport {
    /// Every molecule of the universe.
    pub universe: Vec<Molecule>,
    /// The food set.
    pub food: MoleculeSet,
}

/// Computed value of one extra.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtraValue {
    /// `first_hits`.
    FirstHits(BTreeMap<Molecule, FirstHitDistribution>),
    /// `first_hit_stats`.
    FirstHitStats(BTreeMap<Molecule, FirstHitStats>),
    /// `is_raf`.
    IsRaf(RafReport),
    /// `species`.
    Species(SpeciesReport),
}

/// An extra: a pure function of the sample set.
pub type ExtraFn = fn(&SampleSet) -> ExtraValue;

const EXTRAS: &[(&str, ExtraFn)] = &[
    ("first_hits", first_hits),
    ("first_hit_stats", first_hit_stats),
    ("is_raf", is_raf),
    ("species", species),
];

/// Looks up an extra by name.
#[must_use]
pub fn lookup_extra(name: &str) -> Option<ExtraFn> {
    EXTRAS.iter().find(|(n, _)| *n == name).map(|(_, f)| *f)
}

/// Names of all registered extras.
pub fn extra_names() -> impl Iterator<Item = &'static str> {
    EXTRAS.iter().map(|(n, _)| *n)
}

fn first_hits(set: &SampleSet) -> ExtraValue {
    ExtraValue::FirstHits(FirstHitAccumulator::from_sample_set(set).finish())
}

fn first_hit_stats(set: &SampleSet) -> ExtraValue {
    let stats = FirstHitAccumulator::from_sample_set(set)
        .finish()
        .iter()
        .map(|(m, dist)| (*m, FirstHitStats::from(dist)))
        .collect();
    ExtraValue::FirstHitStats(stats)
}

fn is_raf(set: &SampleSet) -> ExtraValue {
    let snapshots = set
        .snapshot_times
        .iter()
        .enumerate()
        .map(|(i, time)| {
            let runs: Vec<bool> = set
                .runs
                .iter()
                .map(|r| r.snapshot_raf.get(i).is_some_and(|raf| raf.is_raf))
                .collect();
            let hits = runs.iter().filter(|f| **f).count();
            let fraction = if runs.is_empty() {
                0.0
            } else {
                hits as f64 / runs.len() as f64
            };
            SnapshotRaf {
                time: *time,
                runs,
                fraction,
            }
        })
        .collect();
    ExtraValue::IsRaf(RafReport {
        snapshots,
        network: NetworkRaf {
            is_raf: set.network_raf.is_raf,
            full_network: set.network_raf.covers(&set.network),
            reactions: set.network_raf.reactions.iter().copied().collect(),
        },
    })
}

fn species(set: &SampleSet) -> ExtraValue {
    ExtraValue::Species(SpeciesReport {
        universe: set.network.molecules().collect(),
        food: set.network.food().clone(),
    })
}
