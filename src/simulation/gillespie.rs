//! Presence-based Gillespie trajectory simulator.

use std::collections::BTreeSet;

use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::error::{ExecutionError, SimResult, ValidationError};
use crate::molecule::ReactionId;
use crate::network::ReactionNetwork;
use crate::raf;

use super::params::{validate_snapshot_times, Clock, MicroParams};
use super::trajectory::{FiringEvent, StopReason, Trajectory};

/// Samples trajectories over a generated network.
///
/// Implementations must be deterministic per `(network, seed, params)`.
pub trait TrajectorySimulator: Send + Sync {
    /// Short name used in simulator descriptors.
    fn name(&self) -> &'static str;

    /// Samples one run.
    fn simulate_run(
        &self,
        network: &ReactionNetwork,
        run: usize,
        seed: u64,
        snapshot_times: &[f64],
        params: &MicroParams,
    ) -> SimResult<Trajectory>;

    /// Samples one run per seed, in parallel; results are ordered by run index.
    fn simulate(
        &self,
        network: &ReactionNetwork,
        seeds: &[u64],
        snapshot_times: &[f64],
        params: &MicroParams,
    ) -> SimResult<Vec<Trajectory>> {
        if seeds.is_empty() {
            return Err(ValidationError::invalid("runs", 0, "must be >= 1").into());
        }
        validate_snapshot_times(snapshot_times)?;
        params.validate()?;
        seeds
            .par_iter()
            .enumerate()
            .map(|(run, seed)| self.simulate_run(network, run, *seed, snapshot_times, params))
            .collect()
    }
}

/// Fires each reaction at most once, as soon as a stochastic clock allows it.
///
/// A reaction that has not fired yet is eligible when its reactants are all
/// present and at least one catalyst is. Its propensity is `k_cat` times the
/// number of present catalysts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PresenceGillespie;

impl TrajectorySimulator for PresenceGillespie {
    fn name(&self) -> &'static str {
        "presence_gillespie"
    }

    fn simulate_run(
        &self,
        network: &ReactionNetwork,
        run: usize,
        seed: u64,
        snapshot_times: &[f64],
        params: &MicroParams,
    ) -> SimResult<Trajectory> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut present = network.food().clone();
        let mut fired = vec![false; network.reaction_count()];
        let mut pending_raf: Option<BTreeSet<ReactionId>> =
            params.max_raf.then(|| raf::detect(network).reactions);
        let mut events: Vec<FiringEvent> = Vec::new();
        let mut clock = 0.0_f64;

        let stop = loop {
            if pending_raf.as_ref().is_some_and(BTreeSet::is_empty) {
                break StopReason::RafComplete;
            }

            let eligible: Vec<(ReactionId, f64)> = network
                .reaction_ids()
                .zip(network.reactions())
                .filter(|(id, r)| !fired[id.index()] && r.reactants.is_subset(&present))
                .filter_map(|(id, r)| {
                    let catalysts = r.catalysts_in(&present);
                    (catalysts > 0).then(|| (id, params.k_cat * catalysts as f64))
                })
                .collect();
            if eligible.is_empty() {
                break StopReason::Quiescent;
            }
            let total: f64 = eligible.iter().map(|(_, w)| w).sum();

            let step = events.len() + 1;
            let time = match params.clock {
                Clock::Gillespie => {
                    let u: f64 = rng.sample(Open01);
                    clock += -u.ln() / total;
                    clock / params.horizon
                }
                Clock::Steps => step as f64 / params.step_limit as f64,
            };
            if time > 1.0 {
                break StopReason::Horizon;
            }
            if step > params.step_limit {
                return Err(ExecutionError::SimulationDiverged {
                    run,
                    seed,
                    step_limit: params.step_limit,
                }
                .into());
            }

            let mut threshold = rng.gen::<f64>() * total;
            let chosen = eligible
                .iter()
                .find(|(_, w)| {
                    if threshold < *w {
                        return true;
                    }
                    threshold -= w;
                    false
                })
                .or_else(|| eligible.last())
                .map(|(id, _)| *id);
            let Some(reaction_id) = chosen else {
                break StopReason::Quiescent;
            };
            let Some(reaction) = network.reaction(reaction_id) else {
                break StopReason::Quiescent;
            };

            fired[reaction_id.index()] = true;
            let produced: Vec<_> = reaction
                .products
                .iter()
                .copied()
                .filter(|m| present.insert(*m))
                .collect();
            if let Some(pending) = pending_raf.as_mut() {
                pending.remove(&reaction_id);
            }
            trace!(run, step, time, reaction = %reaction_id, "reaction fired");
            events.push(FiringEvent {
                step,
                time,
                reaction: reaction_id,
                produced,
            });
        };

        debug!(run, seed, events = events.len(), ?stop, "run finished");
        Ok(Trajectory::from_events(
            run,
            seed,
            network.food(),
            events,
            snapshot_times,
            stop,
        ))
    }
}
