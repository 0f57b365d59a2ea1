//! Simulator registry.
//!
//! Simulators are registered explicitly at startup. The registry is
//! immutable once built and is shared behind an `Arc`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{ExecutionError, SimResult, ValidationError};
use crate::network::{NetworkGenerator, TapGenerator};
use crate::response::{raf_response, ResponseBuilder};
use crate::sampling::extra_names;
use crate::simulation::{PresenceGillespie, TrajectorySimulator};

/// Public description of a registered simulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulatorDescriptor {
    /// Simulator id.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Network generator name.
    pub generator: String,
    /// Trajectory simulator name.
    pub simulator: String,
    /// Extras the simulator can compute.
    pub extras: Vec<String>,
}

/// Generator, simulator and response builder bound to one id.
#[derive(Clone)]
pub struct SimulatorDefinition {
    /// Simulator id.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Macro layer.
    pub generator: Arc<dyn NetworkGenerator>,
    /// Micro layer.
    pub simulator: Arc<dyn TrajectorySimulator>,
    /// Output formatting.
    pub response: ResponseBuilder,
}

impl SimulatorDefinition {
    /// Binds the three components to `id`.
    pub fn new(
        id: impl Into<String>,
        generator: Arc<dyn NetworkGenerator>,
        simulator: Arc<dyn TrajectorySimulator>,
        response: ResponseBuilder,
    ) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            generator,
            simulator,
            response,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Public description.
    #[must_use]
    pub fn descriptor(&self) -> SimulatorDescriptor {
        SimulatorDescriptor {
            id: self.id.clone(),
            description: self.description.clone(),
            generator: self.generator.name().to_string(),
            simulator: self.simulator.name().to_string(),
            extras: extra_names().map(str::to_string).collect(),
        }
    }
}

impl fmt::Debug for SimulatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatorDefinition")
            .field("id", &self.id)
            .field("generator", &self.generator.name())
            .field("simulator", &self.simulator.name())
            .finish_non_exhaustive()
    }
}

/// The `raf` simulator: TAP growth, presence Gillespie, RAF response.
#[must_use]
pub fn raf_definition() -> SimulatorDefinition {
    SimulatorDefinition::new("raf", Arc::new(TapGenerator), Arc::new(PresenceGillespie), raf_response)
        .with_description("Catalyzed reaction network growth with RAF detection")
}

/// Collects definitions, rejecting bad ids as they are registered.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: BTreeMap<String, SimulatorDefinition>,
}

impl RegistryBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition.
    pub fn register(mut self, definition: SimulatorDefinition) -> SimResult<Self> {
        if definition.id.trim().is_empty() {
            return Err(ValidationError::invalid("simulator_id", "\"\"", "must not be empty").into());
        }
        if self.definitions.contains_key(&definition.id) {
            return Err(ExecutionError::DuplicateSimulator { id: definition.id }.into());
        }
        self.definitions.insert(definition.id.clone(), definition);
        Ok(self)
    }

    /// Freezes the registry.
    #[must_use]
    pub fn build(self) -> SimulatorRegistry {
        SimulatorRegistry {
            definitions: self.definitions,
        }
    }
}

/// Immutable id → definition table.
#[derive(Debug)]
pub struct SimulatorRegistry {
    definitions: BTreeMap<String, SimulatorDefinition>,
}

impl SimulatorRegistry {
    /// Starts a registration table.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Registry holding the builtin simulators.
    #[must_use]
    pub fn builtin() -> Self {
        let raf = raf_definition();
        Self {
            definitions: BTreeMap::from([(raf.id.clone(), raf)]),
        }
    }

    /// Looks up a simulator.
    pub fn resolve(&self, id: &str) -> Result<&SimulatorDefinition, ExecutionError> {
        self.definitions
            .get(id)
            .ok_or_else(|| ExecutionError::UnknownSimulator { id: id.to_string() })
    }

    /// Descriptors of every registered simulator, ordered by id.
    #[must_use]
    pub fn list(&self) -> Vec<SimulatorDescriptor> {
        self.definitions.values().map(SimulatorDefinition::descriptor).collect()
    }

    /// Number of registered simulators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
