use crate::agent::{
    AgentDescriptor, AgentRegistry, AgentResult, AgentRunner, FailureKind, TaskRequest,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tempfile::TempDir;

/// Write `body` to `<dir>/<name>.sh` and register it to run under `sh`.
///
/// Going through an interpreter avoids exec'ing a file that may still be
/// open for writing in another test thread (ETXTBSY).
pub(crate) fn register_script(
    registry: &mut AgentRegistry,
    dir: &TempDir,
    name: &str,
    body: &str,
) -> PathBuf {
    let path = dir.path().join(format!("{}.sh", name));
    std::fs::write(&path, format!("{}\n", body)).unwrap();
    registry.insert(
        AgentDescriptor::new(name, &path, format!("{} test agent", name))
            .with_interpreter(vec!["sh".to_string()]),
    );
    path
}

/// Scripted behavior for an [`InstrumentedRunner`] agent.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Behavior {
    Succeed,
    SucceedAfter(Duration),
    Fail,
}

/// In-process runner that records calls and peak concurrency.
pub(crate) struct InstrumentedRunner {
    behaviors: HashMap<String, Behavior>,
    default_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<(String, Duration)>>,
}

impl InstrumentedRunner {
    pub(crate) fn new() -> Self {
        Self {
            behaviors: HashMap::new(),
            default_delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_behavior(mut self, agent: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(agent.to_string(), behavior);
        self
    }

    pub(crate) fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock_calls().iter().map(|(name, _)| name.clone()).collect()
    }

    pub(crate) fn calls_to(&self, agent: &str) -> usize {
        self.lock_calls().iter().filter(|(name, _)| name == agent).count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.lock_calls().len()
    }

    pub(crate) fn timeouts(&self) -> Vec<Duration> {
        self.lock_calls().iter().map(|(_, timeout)| *timeout).collect()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<(String, Duration)>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AgentRunner for InstrumentedRunner {
    fn run(&self, task: &TaskRequest, timeout: Duration) -> AgentResult {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        self.lock_calls().push((task.agent_name.clone(), timeout));

        let behavior = self
            .behaviors
            .get(&task.agent_name)
            .copied()
            .unwrap_or(Behavior::SucceedAfter(self.default_delay));

        let result = match behavior {
            Behavior::Succeed => AgentResult::succeeded(&task.agent_name, "ok"),
            Behavior::SucceedAfter(delay) => {
                std::thread::sleep(delay);
                AgentResult::succeeded(&task.agent_name, "ok")
            }
            Behavior::Fail => {
                AgentResult::failed(&task.agent_name, FailureKind::NonZeroExit, "boom")
                    .with_exit_code(Some(1))
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
