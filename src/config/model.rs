//! Config file schema.
//!
//! ```yaml
//! workspace: "."
//! events_file: ".conductor/events.ndjson"
//!
//! defaults:
//!   run_timeout_seconds: 60
//!   batch_timeout_seconds: 30
//!   max_concurrency: 4
//!
//! agents:
//!   planner:
//!     path: agents/planner_agent.py
//!     description: "Task planning and breakdown"
//!     interpreter: "python3 -u"
//!     environment:
//!       OLLAMA_HOST: "http://localhost:11434"
//! ```
//!
//! Relative paths resolve against the directory containing the config file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "conductor.yaml";

const DEFAULT_RUN_TIMEOUT_SECONDS: u64 = 60;
const DEFAULT_BATCH_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_MAX_CONCURRENCY: usize = 4;
const DEFAULT_INTERPRETER: &str = "python3";

/// Configuration for conductor.
///
/// Missing top-level fields fall back to [`Config::default`], so a file
/// without an `agents` section gets the built-in agent set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Workspace handed to agents as the `workspace` payload field.
    pub workspace: PathBuf,

    /// Dispatch defaults.
    pub defaults: Defaults,

    /// Agents keyed by name.
    pub agents: BTreeMap<String, AgentEntry>,

    /// Optional NDJSON event log.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_file: Option<PathBuf>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            defaults: Defaults::default(),
            agents: builtin_agents(),
            events_file: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Dispatch defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Timeout for single-agent dispatch.
    pub run_timeout_seconds: u64,

    /// Per-task timeout inside batches and pipeline phases.
    pub batch_timeout_seconds: u64,

    /// Maximum simultaneous agent processes per batch.
    pub max_concurrency: usize,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            run_timeout_seconds: DEFAULT_RUN_TIMEOUT_SECONDS,
            batch_timeout_seconds: DEFAULT_BATCH_TIMEOUT_SECONDS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            extra: BTreeMap::new(),
        }
    }
}

/// One agent executable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentEntry {
    /// Path to the executable or script.
    pub path: PathBuf,

    /// Human-readable summary.
    #[serde(default)]
    pub description: String,

    /// Interpreter command line, e.g. `python3 -u`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<String>,

    /// Environment variables for the agent process.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// The standard developer-assistant agents, run with `python3` from `agents/`.
pub fn builtin_agents() -> BTreeMap<String, AgentEntry> {
    [
        ("planner", "planner_agent.py", "Task planning and breakdown"),
        ("refactor", "refactor_agent.py", "Code refactoring and optimization"),
        ("test_gen", "test_generator_agent.py", "Automated test generation"),
        ("doc_gen", "doc_generator_agent.py", "Documentation generation"),
        ("reviewer", "review_agent.py", "Code review and quality check"),
        ("performance", "performance_agent.py", "Performance monitoring"),
    ]
    .into_iter()
    .map(|(name, script, description)| {
        (
            name.to_string(),
            AgentEntry {
                path: PathBuf::from("agents").join(script),
                description: description.to_string(),
                interpreter: Some(DEFAULT_INTERPRETER.to_string()),
                ..Default::default()
            },
        )
    })
    .collect()
}
