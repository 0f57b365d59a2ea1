//! # rafsim - RAF chemical-network simulation engine
//!
//! rafsim generates random catalyzed reaction networks, samples which
//! molecules become present over normalized time, finds the maximal RAF
//! (Reflexively Autocatalytic and Food-generated) sub-network, and reduces
//! repeated runs into distributions that evaluation tasks consume.
//!
//! ## Core Concepts
//!
//! - **ReactionNetwork**: food set plus catalyzed reactions, grown from a seed and a saturation level
//! - **Trajectory**: monotone presence of molecules over normalized time `[0, 1]` for one run
//! - **RafResult**: the maximal RAF of a network or of a snapshot of it
//! - **SampleSet**: every run of one saturation, reduced into named extras
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rafsim::{GenerateRequest, SimEngine};
//!
//! let engine = SimEngine::with_builtin();
//! let request = GenerateRequest::builder()
//!     .simulator_id("raf")
//!     .saturation(40)
//!     .runs(16)
//!     .snapshot_times([0.25, 0.5, 1.0])
//!     .extra("first_hits")
//!     .extra("is_raf")
//!     .macro_param("seed", 42)
//!     .build()?;
//!
//! let response = engine.generate(&request)?;
//! println!("{}", response.to_json_pretty()?);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Core types
pub mod error;
pub mod molecule;

// Macro and micro layers
pub mod network;
pub mod raf;
pub mod simulation;

// Sampling and the request/response contract
pub mod config;
pub mod registry;
pub mod request;
pub mod response;
pub mod sampling;

// Execution
pub mod engine;

pub use config::{Config, EngineConfig, RuntimeConfig};
pub use engine::{CostRouter, ExecutionHandle, PoolKind, RequestRouter, SimEngine, SimRuntime};
pub use error::{ErrorDetail, ExecutionError, SimError, SimResult, ValidationError};
pub use molecule::{Molecule, MoleculeSet, ReactionId};
pub use network::{MacroParams, NetworkGenerator, Reaction, ReactionNetwork, TapGenerator};
pub use raf::RafResult;
pub use registry::{SimulatorDefinition, SimulatorDescriptor, SimulatorRegistry};
pub use request::{GenerateRequest, GenerateRequestBuilder, SampleParams, Saturation, ValidatedRequest};
pub use response::{GenerateResponse, SaturationEntry};
pub use sampling::{ExtraValue, SampleSet};
pub use simulation::{Clock, MicroParams, PresenceGillespie, Trajectory, TrajectorySimulator};
