//! Fixed three-phase feature pipeline: plan, implement, review.
//!
//! Phases are barriers: the next phase is dispatched only after every task
//! of the previous one has resolved. A failed planning phase stops the
//! pipeline; a partially failed implementation phase does not stop review,
//! but makes the overall outcome a failure.
//!
//! This is deliberately not a DAG scheduler. There are no retries and no
//! partial re-runs, and no deadline spans the whole pipeline: each task is
//! bounded only by its own timeout.

use crate::agent::{AgentResult, Payload, TaskRequest};
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;
use tracing::{info, warn};

pub const PLANNER: &str = "planner";
pub const REFACTOR: &str = "refactor";
pub const TEST_GEN: &str = "test_gen";
pub const DOC_GEN: &str = "doc_gen";
pub const REVIEWER: &str = "reviewer";

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Planning,
    Implementation,
    Review,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Planning => write!(f, "planning"),
            Phase::Implementation => write!(f, "implementation"),
            Phase::Review => write!(f, "review"),
        }
    }
}

/// Results of one phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub results: Vec<AgentResult>,
}

impl PhaseReport {
    pub fn succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

/// Outcome of a pipeline run. Phases that never ran are absent.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub feature: String,
    pub phases: Vec<PhaseReport>,
    pub success: bool,
}

impl PipelineReport {
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    pub fn results(&self) -> impl Iterator<Item = &AgentResult> {
        self.phases.iter().flat_map(|p| p.results.iter())
    }
}

/// A feature request and the workspace it targets.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    feature: String,
    workspace: PathBuf,
}

impl FeaturePipeline {
    pub fn new(feature: impl Into<String>, workspace: impl Into<PathBuf>) -> Self {
        Self {
            feature: feature.into(),
            workspace: workspace.into(),
        }
    }

    pub fn planning_tasks(&self) -> Vec<TaskRequest> {
        vec![TaskRequest::new(
            PLANNER,
            payload([
                ("request", json!(self.feature)),
                ("workspace", json!(self.workspace.to_string_lossy())),
            ]),
        )]
    }

    /// Implementation tasks. These do not consume the plan's output.
    pub fn implementation_tasks(&self) -> Vec<TaskRequest> {
        vec![
            TaskRequest::new(REFACTOR, payload([("target", json!("code_quality"))])),
            TaskRequest::new(TEST_GEN, payload([("coverage_target", json!(80))])),
            TaskRequest::new(DOC_GEN, payload([("format", json!("markdown"))])),
        ]
    }

    /// Review task referencing each implementation result's artifacts.
    pub fn review_tasks(&self, implementation: &[AgentResult]) -> Vec<TaskRequest> {
        let artifacts: Vec<Value> = implementation
            .iter()
            .map(|r| json!(r.artifacts))
            .collect();
        vec![TaskRequest::new(
            REVIEWER,
            payload([("artifacts", Value::Array(artifacts))]),
        )]
    }

    /// Run all phases through `dispatch`, which must block until the batch
    /// it is given has fully resolved.
    pub fn execute<F>(&self, mut dispatch: F) -> PipelineReport
    where
        F: FnMut(Phase, Vec<TaskRequest>) -> Vec<AgentResult>,
    {
        info!(feature = %self.feature, "starting feature pipeline");
        let mut phases = Vec::with_capacity(3);

        let planning = run_phase(&mut dispatch, Phase::Planning, self.planning_tasks());
        let planned = planning.succeeded();
        phases.push(planning);
        if !planned {
            warn!(feature = %self.feature, "planning phase failed");
            return PipelineReport {
                feature: self.feature.clone(),
                phases,
                success: false,
            };
        }

        let implementation = run_phase(
            &mut dispatch,
            Phase::Implementation,
            self.implementation_tasks(),
        );
        let review = run_phase(
            &mut dispatch,
            Phase::Review,
            self.review_tasks(&implementation.results),
        );

        let success = implementation.succeeded() && review.succeeded();
        phases.push(implementation);
        phases.push(review);

        if success {
            info!(feature = %self.feature, "feature pipeline completed successfully");
        } else {
            warn!(feature = %self.feature, "feature pipeline finished with failures");
        }

        PipelineReport {
            feature: self.feature.clone(),
            phases,
            success,
        }
    }
}

fn run_phase<F>(dispatch: &mut F, phase: Phase, tasks: Vec<TaskRequest>) -> PhaseReport
where
    F: FnMut(Phase, Vec<TaskRequest>) -> Vec<AgentResult>,
{
    info!(%phase, tasks = tasks.len(), "starting phase");
    PhaseReport {
        phase,
        results: dispatch(phase, tasks),
    }
}

fn payload<const N: usize>(entries: [(&str, Value); N]) -> Payload {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::FailureKind;

    fn respond(
        failing: &'static [&'static str],
    ) -> impl FnMut(Phase, Vec<TaskRequest>) -> Vec<AgentResult> {
        move |_, tasks| {
            tasks
                .iter()
                .map(|t| {
                    if failing.contains(&t.agent_name.as_str()) {
                        AgentResult::failed(&t.agent_name, FailureKind::NonZeroExit, "boom")
                    } else {
                        AgentResult::succeeded(&t.agent_name, "ok")
                            .with_artifacts(vec![format!("{}.md", t.agent_name)])
                    }
                })
                .collect()
        }
    }

    #[test]
    fn test_planning_payload_carries_request_and_workspace() {
        let pipeline = FeaturePipeline::new("add login", "/work/app");
        let tasks = pipeline.planning_tasks();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].agent_name, PLANNER);
        assert_eq!(tasks[0].payload["request"], "add login");
        assert_eq!(tasks[0].payload["workspace"], "/work/app");
    }

    #[test]
    fn test_implementation_batch_is_fixed() {
        let pipeline = FeaturePipeline::new("anything", ".");
        let tasks = pipeline.implementation_tasks();

        let names: Vec<_> = tasks.iter().map(|t| t.agent_name.as_str()).collect();
        assert_eq!(names, vec![REFACTOR, TEST_GEN, DOC_GEN]);
        assert_eq!(tasks[0].payload["target"], "code_quality");
        assert_eq!(tasks[1].payload["coverage_target"], 80);
        assert_eq!(tasks[2].payload["format"], "markdown");
    }

    #[test]
    fn test_review_payload_lists_artifacts_per_result() {
        let pipeline = FeaturePipeline::new("anything", ".");
        let implementation = vec![
            AgentResult::succeeded(REFACTOR, "").with_artifacts(vec!["src/lib.rs".into()]),
            AgentResult::succeeded(TEST_GEN, ""),
        ];

        let tasks = pipeline.review_tasks(&implementation);

        assert_eq!(tasks[0].agent_name, REVIEWER);
        assert_eq!(tasks[0].payload["artifacts"], json!([["src/lib.rs"], []]));
    }

    #[test]
    fn test_all_phases_succeed() {
        let report = FeaturePipeline::new("feature", ".").execute(respond(&[]));

        assert!(report.success);
        assert_eq!(report.phases.len(), 3);
        assert_eq!(report.results().count(), 5);
        let review = report.phase(Phase::Review).unwrap();
        assert_eq!(
            review.results[0].agent_name, REVIEWER,
            "review runs after implementation"
        );
    }

    #[test]
    fn test_phases_run_in_order() {
        let mut seen = Vec::new();
        FeaturePipeline::new("feature", ".").execute(|phase, tasks| {
            seen.push(phase);
            tasks
                .iter()
                .map(|t| AgentResult::succeeded(&t.agent_name, "ok"))
                .collect()
        });
        assert_eq!(
            seen,
            vec![Phase::Planning, Phase::Implementation, Phase::Review]
        );
    }

    #[test]
    fn test_planning_failure_stops_pipeline() {
        let report = FeaturePipeline::new("feature", ".").execute(respond(&[PLANNER]));

        assert!(!report.success);
        assert_eq!(report.phases.len(), 1);
        assert!(report.phase(Phase::Implementation).is_none());
        assert!(report.phase(Phase::Review).is_none());
    }

    #[test]
    fn test_review_failure_fails_pipeline() {
        let report = FeaturePipeline::new("feature", ".").execute(respond(&[REVIEWER]));

        assert!(!report.success);
        assert!(report.phase(Phase::Implementation).unwrap().succeeded());
    }

    #[test]
    fn test_implementation_failure_still_reviews() {
        let report = FeaturePipeline::new("feature", ".").execute(respond(&[TEST_GEN]));

        assert!(!report.success);
        let review = report.phase(Phase::Review).unwrap();
        assert!(review.succeeded());
    }
}
