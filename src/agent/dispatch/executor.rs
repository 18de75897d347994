//! Agent subprocess executor.
//!
//! Executes agent commands with timeout, output capture, and error handling.
//! Every code path produces an [`AgentResult`]; nothing escapes as an error.

use crate::agent::registry::{AgentDescriptor, AgentRegistry};
use crate::agent::types::{
    AgentResult, FailureKind, NOT_REGISTERED_OUTPUT, TIMEOUT_OUTPUT, TaskRequest,
};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Default interval between child status polls.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Anything that can run a single task to completion.
///
/// Implementations must never panic or return early without a result: every
/// failure is reported through [`AgentResult::success`].
pub trait AgentRunner: Sync {
    fn run(&self, task: &TaskRequest, timeout: Duration) -> AgentResult;
}

/// Runs registered agents as isolated child processes.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    registry: AgentRegistry,
    poll_interval: Duration,
}

impl ProcessRunner {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AgentRegistry {
        &mut self.registry
    }
}

impl AgentRunner for ProcessRunner {
    fn run(&self, task: &TaskRequest, timeout: Duration) -> AgentResult {
        let start = Instant::now();
        let name = task.agent_name.as_str();

        let Some(agent) = self.registry.describe(name) else {
            warn!(agent = name, "dispatch to unregistered agent");
            return AgentResult::failed(name, FailureKind::Unregistered, NOT_REGISTERED_OUTPUT)
                .with_duration(start.elapsed());
        };

        if !agent.available {
            warn!(agent = name, path = %agent.executable_path.display(), "agent unavailable");
            return AgentResult::failed(
                name,
                FailureKind::Unavailable,
                format!(
                    "agent executable not found: {}",
                    agent.executable_path.display()
                ),
            )
            .with_duration(start.elapsed());
        }

        let encoded = match serde_json::to_string(&task.payload) {
            Ok(encoded) => encoded,
            Err(e) => {
                return AgentResult::failed(
                    name,
                    FailureKind::LaunchFailed,
                    format!("failed to encode payload: {}", e),
                )
                .with_duration(start.elapsed());
            }
        };

        info!(agent = name, description = %agent.description, "spawning agent");
        let result = match execute(agent, &encoded, timeout, self.poll_interval) {
            Ok(Execution::Exited {
                status,
                stdout,
                stderr,
            }) => exited_result(name, status, stdout, stderr),
            Ok(Execution::TimedOut) => {
                warn!(agent = name, timeout_ms = timeout.as_millis() as u64, "agent timed out");
                AgentResult::failed(name, FailureKind::Timeout, TIMEOUT_OUTPUT)
            }
            Err(error) => error_result(name, error),
        };

        result.with_duration(start.elapsed())
    }
}

/// How a launched child process ended.
enum Execution {
    Exited {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    TimedOut,
}

/// Why an agent could not be run to completion. Messages are already
/// formatted for the result.
#[derive(Debug)]
enum ExecError {
    /// The process could not be spawned.
    Launch(String),
    /// The process started but its status could not be read.
    Wait(String),
}

fn error_result(name: &str, error: ExecError) -> AgentResult {
    match error {
        ExecError::Launch(message) => {
            warn!(agent = name, error = %message, "agent launch failed");
            AgentResult::failed(name, FailureKind::LaunchFailed, message)
        }
        ExecError::Wait(message) => {
            warn!(agent = name, error = %message, "lost track of agent process");
            AgentResult::failed(name, FailureKind::WaitFailed, message)
        }
    }
}

/// Launch the agent and wait for it with a timeout.
///
/// The timeout covers both the child's exit and the draining of its output
/// pipes, which stay open as long as any grandchild holds them.
fn execute(
    agent: &AgentDescriptor,
    encoded_payload: &str,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Execution, ExecError> {
    let deadline = Instant::now() + timeout;
    let mut command = build_command(agent, encoded_payload);
    debug!(agent = %agent.name, command = ?command, "launching agent process");

    let mut child = command.spawn().map_err(|e| {
        ExecError::Launch(format!(
            "failed to launch agent '{}' ({}): {}",
            agent.name,
            agent.executable_path.display(),
            e
        ))
    })?;

    // Drain both pipes concurrently so a chatty agent can't block on a full pipe.
    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    // On timeout the readers are detached: grandchildren may still hold the pipes.
    let Some(status) =
        wait_with_timeout(&mut child, timeout, poll_interval).map_err(ExecError::Wait)?
    else {
        return Ok(Execution::TimedOut);
    };

    let stdout = collect(stdout_reader, deadline);
    let stderr = collect(stderr_reader, deadline);
    match (stdout, stderr) {
        (Some(stdout), Some(stderr)) => Ok(Execution::Exited {
            status,
            stdout,
            stderr,
        }),
        _ => {
            debug!(agent = %agent.name, "agent exited but its output pipes outlived the timeout");
            Ok(Execution::TimedOut)
        }
    }
}

fn build_command(agent: &AgentDescriptor, encoded_payload: &str) -> Command {
    let mut command = match agent.interpreter.split_first() {
        Some((program, args)) => {
            let mut command = Command::new(program);
            command.args(args).arg(&agent.executable_path);
            command
        }
        None => Command::new(&agent.executable_path),
    };

    command
        .arg(encoded_payload)
        .envs(&agent.environment)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    command
}

fn exited_result(name: &str, status: ExitStatus, stdout: String, stderr: String) -> AgentResult {
    if status.success() {
        info!(agent = name, "agent completed successfully");
        return AgentResult::succeeded(name, stdout.trim_end());
    }

    warn!(agent = name, exit_code = ?status.code(), "agent failed");
    let output = if stderr.is_empty() {
        stdout
    } else {
        stderr
    };
    AgentResult::failed(name, FailureKind::NonZeroExit, output.trim_end())
        .with_exit_code(status.code())
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<Receiver<String>> {
    pipe.map(|mut pipe| {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
        rx
    })
}

/// Wait for a reader's output until `deadline`.
///
/// Returns `None` if the pipe was still open at the deadline.
fn collect(reader: Option<Receiver<String>>, deadline: Instant) -> Option<String> {
    let Some(reader) = reader else {
        return Some(String::new());
    };
    match reader.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(output) => Some(output),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
    }
}

/// Wait for a child process with timeout.
///
/// Returns `None` if the process was killed for exceeding the timeout.
fn wait_with_timeout(
    child: &mut Child,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Option<ExitStatus>, String> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(Some(status)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_process(child);
                    return Ok(None);
                }
                thread::sleep(poll_interval.min(timeout.saturating_sub(start.elapsed())));
            }
            Err(e) => {
                kill_process(child);
                return Err(format!("failed to check agent process status: {}", e));
            }
        }
    }
}

/// Kill a process and reap it.
fn kill_process(child: &mut Child) {
    // On Unix this is SIGKILL; on Windows it is TerminateProcess.
    let _ = child.kill();
    let _ = child.wait();
}
