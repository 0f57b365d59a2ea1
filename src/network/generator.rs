//! Seeded network generators.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::{ExecutionError, SimError, SimResult, ValidationError};
use crate::molecule::{Molecule, MoleculeSet};

use super::params::{MacroParams, MAX_SATURATION};
use super::{Reaction, ReactionNetwork};

/// Builds reaction networks from a saturation level and a seed.
///
/// Implementations must be deterministic: identical
/// `(saturation, seed, params)` yields a bit-identical network.
pub trait NetworkGenerator: Send + Sync {
    /// Short name used in simulator descriptors.
    fn name(&self) -> &'static str;

    /// Grows one process and returns the network at each requested saturation.
    ///
    /// Networks are returned in request order; networks of one chain are
    /// nested prefixes of each other.
    fn generate_chain(
        &self,
        saturations: &[i64],
        seed: u64,
        params: &MacroParams,
    ) -> SimResult<Vec<ReactionNetwork>>;

    /// Generates a single network.
    fn generate(&self, saturation: i64, seed: u64, params: &MacroParams) -> SimResult<ReactionNetwork> {
        self.generate_chain(&[saturation], seed, params)?
            .pop()
            .ok_or_else(|| SimError::internal("generator returned no network"))
    }
}

/// TAP-style growth: each round adds `Poisson(alpha_i * C(Mt, i))` reactions
/// per arity `i`, each producing one fresh molecule, with random catalysis.
#[derive(Debug, Default, Clone, Copy)]
pub struct TapGenerator;

/// In-progress growth state.
struct Growth {
    food_size: u32,
    reactants: Vec<MoleculeSet>,
    catalysts: Vec<MoleculeSet>,
}

impl Growth {
    fn new(food_size: u32) -> Self {
        Self {
            food_size,
            reactants: Vec::new(),
            catalysts: Vec::new(),
        }
    }

    /// Index of the reaction producing `molecule` (food has none).
    fn producer(&self, molecule: u32) -> Option<usize> {
        molecule
            .checked_sub(self.food_size + 1)
            .map(|i| i as usize)
            .filter(|i| *i < self.reactants.len())
    }

    fn snapshot(&self, universe_size: u32) -> SimResult<ReactionNetwork> {
        let food: MoleculeSet = (1..=self.food_size).map(Molecule::new).collect();
        let reactions = self
            .reactants
            .iter()
            .zip(&self.catalysts)
            .enumerate()
            .map(|(i, (reactants, catalysts))| {
                let product = Molecule::new(self.food_size + 1 + i as u32);
                Reaction::new(reactants.iter().copied(), [product], catalysts.iter().copied())
            })
            .collect();
        Ok(ReactionNetwork::new(food, reactions, universe_size)?)
    }
}

impl NetworkGenerator for TapGenerator {
    fn name(&self) -> &'static str {
        "tap"
    }

    fn generate_chain(
        &self,
        saturations: &[i64],
        seed: u64,
        params: &MacroParams,
    ) -> SimResult<Vec<ReactionNetwork>> {
        params.validate()?;
        let targets = saturations
            .iter()
            .map(|&s| params.check_saturation(s))
            .collect::<Result<Vec<u32>, _>>()?;
        let Some(max) = targets.iter().copied().max() else {
            return Err(ValidationError::invalid(
                "saturation",
                "[]",
                "must name at least one saturation",
            )
            .into());
        };

        let generation_error = |reason: String| -> SimError {
            ExecutionError::Generation {
                saturation: i64::from(max),
                reason,
            }
            .into()
        };

        if params.max_arity > max {
            return Err(generation_error(format!(
                "max_arity {} exceeds universe size {max}",
                params.max_arity
            )));
        }
        let applicable = params.max_arity.min(params.food_size);
        if (1..=applicable).all(|i| params.alpha_for(i) <= 0.0) {
            return Err(generation_error(format!(
                "alpha is zero for every arity up to {applicable}; no reaction can be drawn"
            )));
        }

        let mut sorted = targets.clone();
        sorted.sort_unstable();
        sorted.dedup();

        let mut rng = StdRng::seed_from_u64(seed);
        let mut growth = Growth::new(params.food_size);
        let mut snapshots: BTreeMap<u32, ReactionNetwork> = BTreeMap::new();
        let mut next_target = 0;
        let mut mt = params.food_size;
        let mut rounds = 0u32;

        'growth: while mt < max {
            rounds += 1;
            if rounds > params.max_rounds {
                return Err(generation_error(format!(
                    "reached {mt} of {max} molecules after {} rounds",
                    params.max_rounds
                )));
            }

            let mt_prev = mt;
            for arity in 1..=params.max_arity.min(mt_prev) {
                let mean = params.alpha_for(arity) * binomial(mt_prev, arity);
                let room = MAX_SATURATION.unsigned_abs().saturating_sub(u64::from(mt));
                let drawn = sample_poisson(&mut rng, mean, room);
                for _ in 0..drawn {
                    mt += 1;
                    let rid = growth.reactants.len();
                    let reactants: MoleculeSet = index::sample(&mut rng, mt_prev as usize, arity as usize)
                        .into_iter()
                        .map(|i| Molecule::new(i as u32 + 1))
                        .collect();
                    growth.reactants.push(reactants);
                    growth.catalysts.push(MoleculeSet::new());

                    let product = Molecule::new(mt);
                    for y in 1..=mt {
                        if y == mt {
                            if rng.gen_bool(params.catalysis_prob) {
                                growth.catalysts[rid].insert(product);
                            }
                            continue;
                        }
                        if let Some(older) = growth.producer(y) {
                            if rng.gen_bool(params.catalysis_prob) {
                                growth.catalysts[older].insert(product);
                            }
                        }
                        if rng.gen_bool(params.catalysis_prob) {
                            growth.catalysts[rid].insert(Molecule::new(y));
                        }
                    }

                    while next_target < sorted.len() && mt >= sorted[next_target] {
                        snapshots.insert(sorted[next_target], growth.snapshot(mt)?);
                        next_target += 1;
                    }
                    if mt >= max {
                        break 'growth;
                    }
                }
            }
        }

        debug!(seed, max, rounds, reactions = growth.reactants.len(), "network growth finished");

        targets
            .iter()
            .map(|t| {
                snapshots
                    .get(t)
                    .cloned()
                    .ok_or_else(|| SimError::internal(format!("no snapshot emitted for saturation {t}")))
            })
            .collect()
    }
}

/// `C(n, k)` as a float.
fn binomial(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, i| acc * f64::from(n - i) / f64::from(i + 1))
}

/// Poisson draw truncated at `cap`; large means are split into chunks small
/// enough for Knuth's multiplication method (a sum of Poissons is Poisson).
///
/// Growth never needs more than `cap` new reactions, so counting stops there.
/// The cap depends only on the molecules grown so far, which keeps chains of
/// different targets on the same random stream.
fn sample_poisson<R: Rng + ?Sized>(rng: &mut R, mean: f64, cap: u64) -> u64 {
    const CHUNK: f64 = 30.0;

    let mut remaining = mean;
    let mut total = 0;
    while remaining > 0.0 && total < cap {
        let lambda = remaining.min(CHUNK);
        remaining -= lambda;
        let limit = (-lambda).exp();
        let mut product: f64 = rng.gen();
        while product > limit && total < cap {
            total += 1;
            product *= rng.gen::<f64>();
        }
    }
    total
}
