//! Stateful orchestration façade.
//!
//! [`Orchestrator`] owns a runner, the dispatch settings, and the result
//! history. Every result it produces (single runs, batches, and pipeline
//! phases) is appended to the history. The underlying dispatcher and
//! pipeline engine stay stateless.

mod history;
pub mod pipeline;


pub use history::{ResultHistory, Summary};
pub use pipeline::{FeaturePipeline, Phase, PipelineReport};

use crate::agent::{
    AgentDescriptor, AgentRegistry, AgentResult, AgentRunner, DEFAULT_BATCH_TIMEOUT,
    DEFAULT_MAX_WORKERS, DispatchOptions, Payload, ProcessRunner, TaskRequest, dispatch_many,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Default timeout for single-agent dispatch.
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(60);

/// Tunables for an orchestrator instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Workspace handed to agents that need one.
    pub workspace: PathBuf,
    /// Timeout for [`Orchestrator::run`].
    pub run_timeout: Duration,
    /// Per-task timeout for batches and pipeline phases.
    pub batch_timeout: Duration,
    /// Cap on simultaneous agent processes per batch.
    pub max_workers: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            run_timeout: DEFAULT_RUN_TIMEOUT,
            batch_timeout: DEFAULT_BATCH_TIMEOUT,
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl OrchestratorSettings {
    pub fn batch_options(&self) -> DispatchOptions {
        DispatchOptions {
            timeout: self.batch_timeout,
            max_workers: self.max_workers,
        }
    }
}

/// Dispatches tasks through a runner and accumulates every result.
#[derive(Debug)]
pub struct Orchestrator<R = ProcessRunner> {
    runner: R,
    settings: OrchestratorSettings,
    history: ResultHistory,
}

impl Orchestrator<ProcessRunner> {
    /// Orchestrator that launches agents from `registry` as processes.
    pub fn new(registry: AgentRegistry, settings: OrchestratorSettings) -> Self {
        Self::with_runner(ProcessRunner::new(registry), settings)
    }

    /// Register an agent. Must happen before dispatching to it.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        executable_path: impl AsRef<Path>,
        description: impl Into<String>,
    ) {
        self.runner
            .registry_mut()
            .register(name, executable_path, description);
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.runner.registry().is_registered(name)
    }

    pub fn describe(&self, name: &str) -> Option<&AgentDescriptor> {
        self.runner.registry().describe(name)
    }

    pub fn registry(&self) -> &AgentRegistry {
        self.runner.registry()
    }
}

impl<R: AgentRunner> Orchestrator<R> {
    pub fn with_runner(runner: R, settings: OrchestratorSettings) -> Self {
        Self {
            runner,
            settings,
            history: ResultHistory::new(),
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Run a single agent with the single-dispatch timeout.
    pub fn run(&mut self, agent_name: &str, payload: Payload) -> AgentResult {
        let timeout = self.settings.run_timeout;
        self.run_with_timeout(agent_name, payload, timeout)
    }

    pub fn run_with_timeout(
        &mut self,
        agent_name: &str,
        payload: Payload,
        timeout: Duration,
    ) -> AgentResult {
        let result = self
            .runner
            .run(&TaskRequest::new(agent_name, payload), timeout);
        self.history.record(result.clone());
        result
    }

    /// Run a batch with the configured batch timeout and worker cap.
    ///
    /// Results come back in completion order.
    pub fn dispatch_many(&mut self, tasks: Vec<TaskRequest>) -> Vec<AgentResult> {
        let options = self.settings.batch_options();
        self.dispatch_with(tasks, &options)
    }

    pub fn dispatch_with(
        &mut self,
        tasks: Vec<TaskRequest>,
        options: &DispatchOptions,
    ) -> Vec<AgentResult> {
        let results = dispatch_many(&self.runner, tasks, options);
        self.history.extend(results.iter().cloned());
        results
    }

    /// Run the feature pipeline and return its outcome.
    pub fn run_feature_pipeline(&mut self, feature: &str) -> bool {
        self.execute_feature_pipeline(feature).success
    }

    /// Run the feature pipeline and return per-phase results.
    pub fn execute_feature_pipeline(&mut self, feature: &str) -> PipelineReport {
        let pipeline = FeaturePipeline::new(feature, self.settings.workspace.clone());
        let options = self.settings.batch_options();
        pipeline.execute(|phase, tasks| {
            info!(%phase, "dispatching pipeline phase");
            self.dispatch_with(tasks, &options)
        })
    }

    pub fn summary(&self) -> Summary {
        self.history.summary()
    }

    pub fn history(&self) -> &[AgentResult] {
        self.history.as_slice()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
