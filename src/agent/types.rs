//! Task and result records exchanged with agents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Output recorded when a task targets an agent that was never registered.
pub const NOT_REGISTERED_OUTPUT: &str = "agent not registered";

/// Output recorded when an agent is killed for exceeding its timeout.
pub const TIMEOUT_OUTPUT: &str = "execution timeout";

/// Opaque key-value payload handed to an agent as its sole argument.
pub type Payload = Map<String, Value>;

/// A single unit of work: which agent to run and what to hand it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    /// Registered agent name.
    #[serde(rename = "agent")]
    pub agent_name: String,

    /// Payload serialized to the agent's argument.
    #[serde(default)]
    pub payload: Payload,
}

impl TaskRequest {
    /// Create a task for the given agent.
    pub fn new(agent_name: impl Into<String>, payload: Payload) -> Self {
        Self {
            agent_name: agent_name.into(),
            payload,
        }
    }
}

/// Why an agent invocation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The agent name was never registered.
    Unregistered,
    /// The agent's executable was missing at registration time.
    Unavailable,
    /// The OS refused to start the process.
    LaunchFailed,
    /// The process started but its status could not be read.
    WaitFailed,
    /// The agent ran and exited with a non-zero status.
    NonZeroExit,
    /// The agent exceeded its timeout and was killed.
    Timeout,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Unregistered => write!(f, "unregistered"),
            FailureKind::Unavailable => write!(f, "unavailable"),
            FailureKind::LaunchFailed => write!(f, "launch_failed"),
            FailureKind::WaitFailed => write!(f, "wait_failed"),
            FailureKind::NonZeroExit => write!(f, "non_zero_exit"),
            FailureKind::Timeout => write!(f, "timeout"),
        }
    }
}

/// Outcome of one agent invocation.
///
/// Created exactly once when an invocation terminates and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResult {
    /// Echo of the originating task's target.
    #[serde(rename = "agent")]
    pub agent_name: String,

    /// True iff the process exited with status zero within its timeout.
    pub success: bool,

    /// Captured stdout on success; stderr (or stdout) or an error
    /// description on failure.
    pub output: String,

    /// Files the agent is documented to have produced. Not verified.
    #[serde(default)]
    pub artifacts: Vec<String>,

    /// Completion time.
    pub timestamp: DateTime<Utc>,

    /// Failure classification; `None` iff `success`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,

    /// Exit code if the process exited on its own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,

    /// Wall-clock time spent running the agent.
    #[serde(default)]
    pub duration_ms: u64,
}

impl AgentResult {
    /// A successful result carrying the agent's stdout.
    pub fn succeeded(agent_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            success: true,
            output: output.into(),
            artifacts: Vec::new(),
            timestamp: Utc::now(),
            failure: None,
            exit_code: Some(0),
            duration_ms: 0,
        }
    }

    /// A failed result with the given classification.
    pub fn failed(
        agent_name: impl Into<String>,
        kind: FailureKind,
        output: impl Into<String>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            success: false,
            output: output.into(),
            artifacts: Vec::new(),
            timestamp: Utc::now(),
            failure: Some(kind),
            exit_code: None,
            duration_ms: 0,
        }
    }

    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_artifacts(mut self, artifacts: Vec<String>) -> Self {
        self.artifacts = artifacts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_request_parses_agent_and_payload() {
        let task: TaskRequest =
            serde_json::from_value(json!({"agent": "planner", "payload": {"request": "x"}}))
                .unwrap();
        assert_eq!(task.agent_name, "planner");
        assert_eq!(task.payload["request"], "x");
    }

    #[test]
    fn test_task_request_payload_defaults_to_empty() {
        let task: TaskRequest = serde_json::from_value(json!({"agent": "reviewer"})).unwrap();
        assert!(task.payload.is_empty());
    }

    #[test]
    fn test_succeeded_result() {
        let result = AgentResult::succeeded("echo_ok", "hello");
        assert!(result.success);
        assert_eq!(result.output, "hello");
        assert_eq!(result.exit_code, Some(0));
        assert!(result.failure.is_none());
        assert!(result.artifacts.is_empty());
    }

    #[test]
    fn test_failed_result() {
        let result = AgentResult::failed("slow", FailureKind::Timeout, TIMEOUT_OUTPUT)
            .with_duration(Duration::from_millis(1500));
        assert!(!result.success);
        assert_eq!(result.failure, Some(FailureKind::Timeout));
        assert_eq!(result.exit_code, None);
        assert_eq!(result.duration_ms, 1500);
    }

    #[test]
    fn test_result_serializes_iso_timestamp() {
        let result = AgentResult::failed("ghost", FailureKind::Unregistered, NOT_REGISTERED_OUTPUT);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["agent"], "ghost");
        assert_eq!(value["failure"], "unregistered");
        assert!(value.get("exit_code").is_none());

        let ts = value["timestamp"].as_str().unwrap();
        assert!(DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_failure_kind_display_matches_serde() {
        for kind in [
            FailureKind::Unregistered,
            FailureKind::Unavailable,
            FailureKind::LaunchFailed,
            FailureKind::WaitFailed,
            FailureKind::NonZeroExit,
            FailureKind::Timeout,
        ] {
            let serialized = serde_json::to_value(kind).unwrap();
            assert_eq!(serialized, json!(kind.to_string()));
        }
    }
}
