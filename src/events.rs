//! Event logging subsystem for conductor.
//!
//! Optional append-only audit log in NDJSON format (one JSON object per
//! line). Each agent result and each pipeline run is recorded.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The action recorded (agent_complete, pipeline_start, ...)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `agent`: Optional agent name for agent-specific events
//! - `details`: Freeform object with action-specific details

use crate::agent::AgentResult;
use crate::error::{ConductorError, Result};
use crate::orchestrator::PipelineReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// An agent invocation finished (successfully or not)
    AgentComplete,
    /// A feature pipeline started
    PipelineStart,
    /// A feature pipeline finished
    PipelineComplete,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::AgentComplete => write!(f, "agent_complete"),
            EventAction::PipelineStart => write!(f, "pipeline_start"),
            EventAction::PipelineComplete => write!(f, "pipeline_complete"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Optional agent name for agent-specific events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            agent: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Event for a finished agent invocation, stamped with its completion time.
    pub fn agent_complete(result: &AgentResult) -> Self {
        let mut event = Self::new(EventAction::AgentComplete)
            .with_agent(&result.agent_name)
            .with_details(json!({
                "success": result.success,
                "failure": result.failure,
                "exit_code": result.exit_code,
                "duration_ms": result.duration_ms,
            }));
        event.ts = result.timestamp;
        event
    }

    pub fn pipeline_start(feature: &str) -> Self {
        Self::new(EventAction::PipelineStart).with_details(json!({ "feature": feature }))
    }

    pub fn pipeline_complete(report: &PipelineReport) -> Self {
        let phases: Vec<Value> = report
            .phases
            .iter()
            .map(|p| json!({ "phase": p.phase, "success": p.succeeded() }))
            .collect();
        Self::new(EventAction::PipelineComplete).with_details(json!({
            "feature": report.feature,
            "success": report.success,
            "phases": phases,
        }))
    }

    /// Set the agent name for this event.
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            ConductorError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append-only NDJSON event file.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: PathBuf,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single JSON line.
    ///
    /// The parent directory and the file are created if missing.
    pub fn append(&self, event: &Event) -> Result<()> {
        self.append_all(std::slice::from_ref(event))
    }

    /// Append several events with a single open and sync.
    pub fn append_all(&self, events: &[Event]) -> Result<()> {
        let mut lines = String::new();
        for event in events {
            lines.push_str(&event.to_ndjson_line()?);
            lines.push('\n');
        }

        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir).map_err(|e| {
                ConductorError::UserError(format!(
                    "failed to create events directory '{}': {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                ConductorError::UserError(format!(
                    "failed to open events file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        file.write_all(lines.as_bytes()).map_err(|e| {
            ConductorError::UserError(format!(
                "failed to write events to '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        // Sync to disk for durability
        file.sync_all().map_err(|e| {
            ConductorError::UserError(format!(
                "failed to sync events file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Record a completion event for every result.
    pub fn record_results(&self, results: &[AgentResult]) -> Result<()> {
        let events: Vec<Event> = results.iter().map(Event::agent_complete).collect();
        self.append_all(&events)
    }

    /// Read all events back, skipping blank lines.
    pub fn read_all(&self) -> Result<Vec<Event>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ConductorError::UserError(format!(
                    "failed to read events file '{}': {}",
                    self.path.display(),
                    e
                )));
            }
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| {
                    ConductorError::UserError(format!("malformed event line: {}", e))
                })
            })
            .collect()
    }
}
