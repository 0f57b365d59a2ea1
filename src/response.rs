//! Generation responses.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ErrorDetail, SimError};
use crate::molecule::MoleculeSet;
use crate::network::MacroParams;
use crate::request::{SampleParams, Saturation, ValidatedRequest};
use crate::sampling::{Aggregation, ExtraValue, SampleSet};
use crate::simulation::{MicroParams, StopReason};

/// Shape of the network every run of an entry was simulated on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkSummary {
    /// BLAKE3 fingerprint of the network.
    pub fingerprint: String,
    /// Number of molecules.
    pub universe_size: u32,
    /// Food set.
    pub food: MoleculeSet,
    /// Number of reactions.
    pub reaction_count: usize,
    /// Number of reactions in the maximal RAF.
    pub max_raf_size: usize,
}

/// One run, reduced to what callers consume.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryRecord {
    /// Run index.
    pub run: usize,
    /// Seed of the run.
    pub seed: u64,
    /// Present molecules at each snapshot time.
    pub snapshots: Vec<MoleculeSet>,
    /// Number of firing events.
    pub events: usize,
    /// Why the run stopped.
    pub stop: StopReason,
}

/// Results for one saturation level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaturationEntry {
    /// Saturation level.
    pub saturation: i64,
    /// Network summary.
    pub network: NetworkSummary,
    /// Runs in run order.
    pub trajectories: Vec<TrajectoryRecord>,
    /// Requested extras that could be computed.
    pub extras: BTreeMap<String, ExtraValue>,
}

/// Response to a generation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateResponse {
    /// Id of the request this answers.
    pub request_id: Uuid,
    /// When the response was built.
    pub generated_at: DateTime<Utc>,
    /// Simulator that ran.
    pub simulator_id: String,
    /// Saturation as requested.
    pub saturation: Saturation,
    /// Runs per saturation.
    pub runs: usize,
    /// Resolved snapshot times.
    pub snapshot_times: Vec<f64>,
    /// One entry per saturation level, in request order.
    pub entries: Vec<SaturationEntry>,
    /// Partial failures.
    pub errors: Vec<ErrorDetail>,
    /// Macro parameters after defaults.
    pub macro_params: MacroParams,
    /// Micro parameters after defaults.
    pub micro_params: MicroParams,
    /// Sample parameters after defaults.
    pub sample_params: SampleParams,
}

impl GenerateResponse {
    /// Entry for a saturation level, if it was requested.
    #[must_use]
    pub fn entry(&self, saturation: i64) -> Option<&SaturationEntry> {
        self.entries.iter().find(|e| e.saturation == saturation)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, SimError> {
        serde_json::to_string_pretty(self).map_err(|e| SimError::internal(format!("serialize response: {e}")))
    }
}

/// Everything computed for one saturation level.
#[derive(Debug)]
pub struct EntryOutput {
    /// Runs and their RAF status.
    pub samples: SampleSet,
    /// Extras and extra errors.
    pub aggregation: Aggregation,
}

/// Formats the engine output into a response.
pub type ResponseBuilder = fn(&ValidatedRequest, Vec<EntryOutput>) -> GenerateResponse;

/// Response builder of the `raf` simulator.
///
/// Extra errors repeat across saturation levels; each distinct one is
/// reported once.
#[must_use]
pub fn raf_response(request: &ValidatedRequest, outputs: Vec<EntryOutput>) -> GenerateResponse {
    let mut errors: Vec<ErrorDetail> = Vec::new();
    let mut entries = Vec::with_capacity(outputs.len());

    for output in outputs {
        for err in &output.aggregation.errors {
            let detail = ErrorDetail::from(err);
            if !errors.contains(&detail) {
                errors.push(detail);
            }
        }

        let samples = output.samples;
        let network = NetworkSummary {
            fingerprint: samples.network.fingerprint(),
            universe_size: samples.network.universe_size(),
            food: samples.network.food().clone(),
            reaction_count: samples.network.reaction_count(),
            max_raf_size: samples.network_raf.reactions.len(),
        };
        let trajectories = samples
            .trajectories()
            .map(|t| TrajectoryRecord {
                run: t.run,
                seed: t.seed,
                snapshots: t.snapshots.clone(),
                events: t.events.len(),
                stop: t.stop,
            })
            .collect();
        entries.push(SaturationEntry {
            saturation: samples.saturation,
            network,
            trajectories,
            extras: output.aggregation.values,
        });
    }

    GenerateResponse {
        request_id: request.request_id,
        generated_at: Utc::now(),
        simulator_id: request.simulator_id.clone(),
        saturation: request.saturation.clone(),
        runs: request.runs,
        snapshot_times: request.snapshot_times.clone(),
        entries,
        errors,
        macro_params: request.macro_params.clone(),
        micro_params: request.micro_params.clone(),
        sample_params: request.sample_params.clone(),
    }
}
