//! Sample sets and their reduction into response extras.
//!
//! A [`SampleSet`] gathers every run of one saturation level together with
//! the RAF status of each snapshot. It is built once per request and
//! consumed by [`aggregate`] to produce the requested extras.

mod aggregate;
mod extras;

pub use aggregate::{aggregate, Aggregation, FirstHitAccumulator};
pub use extras::{
    extra_names, lookup_extra, ExtraFn, ExtraValue, FirstHitDistribution, FirstHitStats, NetworkRaf,
    RafReport, SnapshotRaf, SpeciesReport,
};

use rayon::prelude::*;

use crate::network::ReactionNetwork;
use crate::raf::{self, RafResult};
use crate::simulation::Trajectory;

/// One run and the RAF status of each of its snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSample {
    /// The sampled trajectory.
    pub trajectory: Trajectory,
    /// RAF of the time-sliced sub-network at each snapshot time.
    pub snapshot_raf: Vec<RafResult>,
}

impl RunSample {
    /// Evaluates every snapshot of `trajectory` against `network`.
    #[must_use]
    pub fn evaluate(network: &ReactionNetwork, trajectory: Trajectory) -> Self {
        let snapshot_raf = trajectory
            .snapshots
            .iter()
            .map(|present| raf::detect_snapshot(network, present))
            .collect();
        Self {
            trajectory,
            snapshot_raf,
        }
    }
}

/// All runs of one saturation level.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    /// Requested saturation.
    pub saturation: i64,
    /// Network every run was simulated on (after micro preparation).
    pub network: ReactionNetwork,
    /// Maximal RAF of the whole network.
    pub network_raf: RafResult,
    /// Snapshot times shared by every run.
    pub snapshot_times: Vec<f64>,
    /// Runs ordered by run index.
    pub runs: Vec<RunSample>,
}

impl SampleSet {
    /// Builds a sample set, evaluating snapshots in parallel.
    #[must_use]
    pub fn collect(
        saturation: i64,
        network: ReactionNetwork,
        snapshot_times: &[f64],
        trajectories: Vec<Trajectory>,
    ) -> Self {
        let network_raf = raf::detect(&network);
        let mut runs: Vec<RunSample> = trajectories
            .into_par_iter()
            .map(|t| RunSample::evaluate(&network, t))
            .collect();
        runs.sort_by_key(|r| r.trajectory.run);
        Self {
            saturation,
            network,
            network_raf,
            snapshot_times: snapshot_times.to_vec(),
            runs,
        }
    }

    /// Number of runs.
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    /// Trajectories in run order.
    pub fn trajectories(&self) -> impl Iterator<Item = &Trajectory> {
        self.runs.iter().map(|r| &r.trajectory)
    }
}
