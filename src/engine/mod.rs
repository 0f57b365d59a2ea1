//! Execution engine for generation requests.
//!
//! [`SimEngine`] executes one request synchronously: validate, resolve the
//! simulator, grow the network(s), simulate every run, evaluate RAF status,
//! aggregate extras, and format the response. It keeps no state between
//! requests.

/// Routed runtime isolating cheap requests from expensive sweeps.
pub mod runtime;

pub use runtime::{CostRouter, ExecutionHandle, PoolKind, RequestRouter, SimRuntime};

use std::sync::Arc;

use tracing::{debug, info, info_span};

use crate::config::EngineConfig;
use crate::error::{SimResult, ValidationError};
use crate::registry::{SimulatorDescriptor, SimulatorRegistry};
use crate::request::{GenerateRequest, ValidatedRequest};
use crate::response::{EntryOutput, GenerateResponse};
use crate::sampling::{aggregate, SampleSet};
use crate::simulation::{validate_snapshot_times, Trajectory};

/// Stateless request executor.
#[derive(Debug, Clone)]
pub struct SimEngine {
    registry: Arc<SimulatorRegistry>,
    config: EngineConfig,
}

impl SimEngine {
    /// Create an engine over a registry.
    pub fn new(registry: Arc<SimulatorRegistry>, config: EngineConfig) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    /// Engine over the builtin simulators with default limits.
    #[must_use]
    pub fn with_builtin() -> Self {
        Self {
            registry: Arc::new(SimulatorRegistry::builtin()),
            config: EngineConfig::default(),
        }
    }

    /// The simulator registry.
    #[must_use]
    pub fn registry(&self) -> &SimulatorRegistry {
        &self.registry
    }

    /// Active limits.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Descriptors of the registered simulators.
    #[must_use]
    pub fn list(&self) -> Vec<SimulatorDescriptor> {
        self.registry.list()
    }

    /// Validates and executes a request.
    pub fn generate(&self, request: &GenerateRequest) -> SimResult<GenerateResponse> {
        let validated = request.validate(&self.config)?;
        self.execute(&validated)
    }

    /// Executes an already validated request.
    pub fn execute(&self, request: &ValidatedRequest) -> SimResult<GenerateResponse> {
        let span = info_span!(
            "generate",
            request_id = %request.request_id,
            simulator = %request.simulator_id,
            runs = request.runs,
        );
        let _guard = span.enter();

        let definition = self.registry.resolve(&request.simulator_id)?;
        let networks = definition.generator.generate_chain(
            &request.saturations,
            request.macro_params.seed,
            &request.macro_params,
        )?;

        let mut outputs = Vec::with_capacity(networks.len());
        for (saturation, network) in request.saturations.iter().zip(networks) {
            let network = request.micro_params.prepare(network);
            debug!(
                saturation,
                reactions = network.reaction_count(),
                fingerprint = %network.fingerprint(),
                "network ready"
            );

            let trajectories = if self.config.parallel_runs {
                definition.simulator.simulate(
                    &network,
                    &request.seeds,
                    &request.snapshot_times,
                    &request.micro_params,
                )?
            } else {
                validate_snapshot_times(&request.snapshot_times)?;
                request
                    .seeds
                    .iter()
                    .enumerate()
                    .map(|(run, seed)| {
                        definition.simulator.simulate_run(
                            &network,
                            run,
                            *seed,
                            &request.snapshot_times,
                            &request.micro_params,
                        )
                    })
                    .collect::<SimResult<Vec<Trajectory>>>()?
            };

            let samples = SampleSet::collect(*saturation, network, &request.snapshot_times, trajectories);
            let aggregation = aggregate(&samples, &request.extras);
            outputs.push(EntryOutput { samples, aggregation });
        }

        let response = (definition.response)(request, outputs);
        info!(
            entries = response.entries.len(),
            errors = response.errors.len(),
            "request completed"
        );
        Ok(response)
    }
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(simulator: &str) -> GenerateRequest {
        GenerateRequest::builder()
            .simulator_id(simulator)
            .saturation(12)
            .runs(3)
            .macro_param("seed", 5)
            .extra("is_raf")
            .build()
            .unwrap()
    }

    #[test]
    fn unknown_simulator_is_reported() {
        let err = SimEngine::with_builtin().generate(&request("nope")).unwrap_err();
        assert_eq!(err.kind(), "unknown_simulator");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = EngineConfig {
            max_runs: 0,
            ..EngineConfig::default()
        };
        assert!(SimEngine::new(Arc::new(SimulatorRegistry::builtin()), config).is_err());
    }

    #[test]
    fn sequential_and_parallel_runs_agree() {
        let parallel = SimEngine::with_builtin();
        let sequential = SimEngine::new(
            Arc::new(SimulatorRegistry::builtin()),
            EngineConfig {
                parallel_runs: false,
                ..EngineConfig::default()
            },
        )
        .unwrap();

        let req = request("raf");
        let a = parallel.generate(&req).unwrap();
        let b = sequential.generate(&req).unwrap();
        assert_eq!(a.entries, b.entries);
        assert_eq!(a.request_id, req.request_id);
    }
}
