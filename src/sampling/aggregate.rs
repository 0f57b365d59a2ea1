//! Reduction of a sample set into the requested extras.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::warn;

use crate::error::{ExecutionError, SimError};
use crate::molecule::Molecule;
use crate::simulation::Trajectory;

use super::extras::{lookup_extra, ExtraValue, FirstHitDistribution};
use super::SampleSet;

/// Order-independent accumulator of first-hit times.
///
/// `merge` is associative and commutative, and `finish` sorts every hit
/// list, so the result does not depend on the order runs are observed in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FirstHitAccumulator {
    hits: BTreeMap<Molecule, Vec<f64>>,
    absent: BTreeMap<Molecule, usize>,
}

impl FirstHitAccumulator {
    /// Records one run over the given molecule universe.
    pub fn observe(&mut self, universe: impl IntoIterator<Item = Molecule>, trajectory: &Trajectory) {
        for m in universe {
            match trajectory.first_hit(m) {
                Some(t) => self.hits.entry(m).or_default().push(t),
                None => *self.absent.entry(m).or_default() += 1,
            }
        }
    }

    /// Combines two partial accumulations.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (m, times) in other.hits {
            self.hits.entry(m).or_default().extend(times);
        }
        for (m, n) in other.absent {
            *self.absent.entry(m).or_default() += n;
        }
        self
    }

    /// Accumulates every run of `set` in parallel.
    #[must_use]
    pub fn from_sample_set(set: &SampleSet) -> Self {
        set.runs
            .par_iter()
            .fold(Self::default, |mut acc, run| {
                acc.observe(set.network.molecules(), &run.trajectory);
                acc
            })
            .reduce(Self::default, Self::merge)
    }

    /// Per-molecule distributions with sorted hit times.
    #[must_use]
    pub fn finish(self) -> BTreeMap<Molecule, FirstHitDistribution> {
        let mut out: BTreeMap<Molecule, FirstHitDistribution> = BTreeMap::new();
        for (m, mut times) in self.hits {
            times.sort_by(f64::total_cmp);
            out.insert(m, FirstHitDistribution { times, absent: 0 });
        }
        for (m, absent) in self.absent {
            out.entry(m)
                .or_insert_with(|| FirstHitDistribution {
                    times: Vec::new(),
                    absent: 0,
                })
                .absent = absent;
        }
        out
    }
}

/// Extras computed for one sample set.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Values keyed by extra name.
    pub values: BTreeMap<String, ExtraValue>,
    /// One `UnsupportedExtra` error per unknown name.
    pub errors: Vec<SimError>,
}

/// Computes every requested extra; unknown names become errors without
/// preventing the others from being computed.
#[must_use]
pub fn aggregate(set: &SampleSet, extras: &[String]) -> Aggregation {
    let mut aggregation = Aggregation::default();
    let mut unknown: Vec<&str> = Vec::new();
    for name in extras {
        if aggregation.values.contains_key(name) || unknown.contains(&name.as_str()) {
            continue;
        }
        if let Some(extra) = lookup_extra(name) {
            aggregation.values.insert(name.clone(), extra(set));
        } else {
            warn!(extra = %name, "unsupported extra requested");
            unknown.push(name);
            aggregation.errors.push(
                ExecutionError::UnsupportedExtra {
                    name: name.clone(),
                }
                .into(),
            );
        }
    }
    aggregation
}
