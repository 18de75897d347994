//! Append-only result history and summary statistics.

use crate::agent::{AgentResult, FailureKind};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Every result an orchestrator produced, in the order it was recorded.
#[derive(Debug, Clone, Default)]
pub struct ResultHistory {
    results: Vec<AgentResult>,
}

impl ResultHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: AgentResult) {
        self.results.push(result);
    }

    pub fn extend<I: IntoIterator<Item = AgentResult>>(&mut self, results: I) {
        self.results.extend(results);
    }

    /// Drop all recorded results. Only ever called explicitly by the owner.
    pub fn clear(&mut self) {
        self.results.clear();
    }

    pub fn as_slice(&self) -> &[AgentResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn summary(&self) -> Summary {
        Summary::from_results(&self.results)
    }
}

/// Aggregate statistics over a set of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Percentage of successful results; 0 when there are none.
    pub success_rate: f64,
    pub results: Vec<SummaryEntry>,
}

/// One line of a [`Summary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryEntry {
    pub agent: String,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl Summary {
    pub fn from_results(results: &[AgentResult]) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.success).count();
        let success_rate = if total == 0 {
            0.0
        } else {
            successful as f64 / total as f64 * 100.0
        };

        Self {
            total,
            successful,
            failed: total - successful,
            success_rate,
            results: results
                .iter()
                .map(|r| SummaryEntry {
                    agent: r.agent_name.clone(),
                    success: r.success,
                    timestamp: r.timestamp,
                    failure: r.failure,
                })
                .collect(),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}
