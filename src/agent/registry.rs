//! Agent registry: name to executable mapping.
//!
//! Populated once at startup. Availability is computed at registration by
//! checking that the executable exists and is never re-checked.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A registered agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDescriptor {
    /// Unique identifier (registry key).
    pub name: String,

    /// Path to the external program implementing the agent.
    pub executable_path: PathBuf,

    /// Human-readable summary, informational only.
    pub description: String,

    /// Whether `executable_path` existed at registration time.
    pub available: bool,

    /// Optional interpreter command line prepended to the invocation.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interpreter: Vec<String>,

    /// Extra environment variables for the agent process.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
}

impl AgentDescriptor {
    /// Describe an agent, computing availability from the filesystem.
    pub fn new(
        name: impl Into<String>,
        executable_path: impl Into<PathBuf>,
        description: impl Into<String>,
    ) -> Self {
        let executable_path = executable_path.into();
        let available = executable_path.exists();
        Self {
            name: name.into(),
            executable_path,
            description: description.into(),
            available,
            interpreter: Vec::new(),
            environment: BTreeMap::new(),
        }
    }

    /// Run the executable through an interpreter (e.g. `python3`).
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Set environment variables merged into the agent process.
    pub fn with_environment(mut self, environment: BTreeMap<String, String>) -> Self {
        self.environment = environment;
        self
    }
}

/// Registry of agents keyed by name.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    agents: BTreeMap<String, AgentDescriptor>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an agent. Re-registering a name overwrites it.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        executable_path: impl AsRef<Path>,
        description: impl Into<String>,
    ) {
        self.insert(AgentDescriptor::new(
            name,
            executable_path.as_ref(),
            description,
        ));
    }

    /// Register a fully built descriptor. Last write wins.
    pub fn insert(&mut self, descriptor: AgentDescriptor) {
        tracing::debug!(
            agent = %descriptor.name,
            path = %descriptor.executable_path.display(),
            available = descriptor.available,
            "registered agent"
        );
        self.agents.insert(descriptor.name.clone(), descriptor);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.agents.contains_key(name)
    }

    pub fn describe(&self, name: &str) -> Option<&AgentDescriptor> {
        self.agents.get(name)
    }

    /// Iterate over agents in name order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
