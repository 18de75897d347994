//! Command implementations for conductor.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, and the [`Session`] they share: the loaded config, the
//! orchestrator built from it, and the optional event log.

mod agents;
mod dispatch;
mod pipeline;
mod report;
mod run;

use crate::agent::{AgentResult, Payload};
use crate::cli::{Cli, Command, GlobalArgs};
use crate::config::{Config, DEFAULT_CONFIG_FILE};
use crate::error::{ConductorError, Result};
use crate::events::{Event, EventLog};
use crate::orchestrator::Orchestrator;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let session = Session::open(&cli.global)?;

    match cli.command {
        Command::Agents => agents::cmd_agents(&session),
        Command::Run(args) => run::cmd_run(session, args),
        Command::Dispatch(args) => dispatch::cmd_dispatch(session, args),
        Command::Pipeline(args) => pipeline::cmd_pipeline(session, args),
    }
}

/// State shared by one CLI invocation.
pub(crate) struct Session {
    pub(crate) orchestrator: Orchestrator,
    events: Option<EventLog>,
    json: bool,
}

impl Session {
    /// Load configuration and build the orchestrator.
    ///
    /// Agent availability is computed here, before anything is dispatched.
    pub(crate) fn open(global: &GlobalArgs) -> Result<Self> {
        let (config, base_dir) = load_config(global.config.as_deref())?;

        let registry = config.build_registry(&base_dir)?;
        let mut settings = config.settings(&base_dir);
        if let Some(workspace) = &global.workspace {
            settings.workspace = workspace.clone();
        }

        let events = global
            .events
            .clone()
            .or_else(|| config.events_path(&base_dir))
            .map(EventLog::new);

        Ok(Self {
            orchestrator: Orchestrator::new(registry, settings),
            events,
            json: global.json,
        })
    }

    /// Insert the session workspace into a payload that lacks one.
    pub(crate) fn with_workspace(&self, mut payload: Payload) -> Payload {
        let workspace = &self.orchestrator.settings().workspace;
        payload
            .entry("workspace")
            .or_insert_with(|| json!(workspace.to_string_lossy()));
        payload
    }

    /// Append completion events for `results`. Failures only warn.
    pub(crate) fn record(&self, results: &[AgentResult]) {
        if let Some(log) = &self.events
            && let Err(e) = log.record_results(results)
        {
            warn!(error = %e, "failed to record agent events");
            eprintln!("Warning: {}", e);
        }
    }

    /// Append a single event. Failures only warn.
    pub(crate) fn log_event(&self, event: &Event) {
        if let Some(log) = &self.events
            && let Err(e) = log.append(event)
        {
            warn!(error = %e, action = %event.action, "failed to record event");
            eprintln!("Warning: {}", e);
        }
    }

    /// Print the session summary and fail if any agent failed.
    pub(crate) fn finish(&self) -> Result<()> {
        let summary = self.orchestrator.summary();
        report::print_summary(&summary, self.json)?;

        if summary.all_succeeded() {
            Ok(())
        } else {
            Err(ConductorError::AgentFailure(format!(
                "{} of {} agents failed",
                summary.failed, summary.total
            )))
        }
    }
}

/// Load the config file, returning it with the directory relative paths
/// resolve against.
///
/// An explicit path must exist; the default file falls back to the built-in
/// agent set.
fn load_config(explicit: Option<&Path>) -> Result<(Config, PathBuf)> {
    match explicit {
        Some(path) => {
            let config = Config::load(path)?.ok_or_else(|| {
                ConductorError::ConfigError(format!(
                    "config file '{}' not found",
                    path.display()
                ))
            })?;
            Ok((config, base_dir(path)))
        }
        None => match Config::load(DEFAULT_CONFIG_FILE)? {
            Some(config) => Ok((config, PathBuf::from("."))),
            None => {
                debug!("no {} found, using built-in agents", DEFAULT_CONFIG_FILE);
                Ok((Config::default(), PathBuf::from(".")))
            }
        },
    }
}

fn base_dir(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Parse a timeout override, rejecting zero.
pub(crate) fn timeout_override(seconds: Option<u64>) -> Result<Option<std::time::Duration>> {
    match seconds {
        Some(0) => Err(ConductorError::UserError(
            "--timeout must be greater than 0".to_string(),
        )),
        Some(secs) => Ok(Some(std::time::Duration::from_secs(secs))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn global(config: Option<PathBuf>) -> GlobalArgs {
        GlobalArgs {
            config,
            workspace: None,
            events: None,
            json: false,
            verbose: 0,
        }
    }

    #[test]
    fn test_base_dir() {
        assert_eq!(base_dir(Path::new("conductor.yaml")), PathBuf::from("."));
        assert_eq!(
            base_dir(Path::new("ci/conductor.yaml")),
            PathBuf::from("ci")
        );
    }

    #[test]
    fn test_explicit_missing_config_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope.yaml");

        let err = Session::open(&global(Some(missing))).err().unwrap();
        assert!(err.to_string().contains("not found"));
        assert_eq!(err.exit_code(), crate::exit_codes::CONFIG_ERROR);
    }

    #[test]
    fn test_session_resolves_against_config_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("conductor.yaml");
        std::fs::write(
            &config_path,
            "workspace: app\nevents_file: events.ndjson\nagents:\n  planner:\n    path: planner.sh\n",
        )
        .unwrap();
        std::fs::write(temp_dir.path().join("planner.sh"), "echo plan\n").unwrap();

        let session = Session::open(&global(Some(config_path))).unwrap();

        assert!(session.orchestrator.describe("planner").unwrap().available);
        assert_eq!(
            session.orchestrator.settings().workspace,
            temp_dir.path().join("app")
        );
        assert_eq!(
            session.events.as_ref().unwrap().path(),
            temp_dir.path().join("events.ndjson")
        );
    }

    #[test]
    fn test_cli_overrides_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("conductor.yaml");
        std::fs::write(&config_path, "workspace: app\nevents_file: events.ndjson\n").unwrap();

        let mut args = global(Some(config_path));
        args.workspace = Some(PathBuf::from("/srv/other"));
        args.events = Some(temp_dir.path().join("cli.ndjson"));
        let session = Session::open(&args).unwrap();

        assert_eq!(
            session.orchestrator.settings().workspace,
            PathBuf::from("/srv/other")
        );
        assert_eq!(
            session.events.as_ref().unwrap().path(),
            temp_dir.path().join("cli.ndjson")
        );
    }

    #[test]
    fn test_with_workspace_does_not_override() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("conductor.yaml");
        std::fs::write(&config_path, "workspace: /srv/app\n").unwrap();
        let session = Session::open(&global(Some(config_path))).unwrap();

        let filled = session.with_workspace(Payload::new());
        assert_eq!(filled["workspace"], "/srv/app");

        let mut own = Payload::new();
        own.insert("workspace".to_string(), json!("/elsewhere"));
        assert_eq!(session.with_workspace(own)["workspace"], "/elsewhere");
    }

    #[test]
    fn test_timeout_override() {
        assert!(timeout_override(None).unwrap().is_none());
        assert_eq!(
            timeout_override(Some(5)).unwrap(),
            Some(std::time::Duration::from_secs(5))
        );
        assert!(timeout_override(Some(0)).is_err());
    }
}
