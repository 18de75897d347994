//! CLI argument parsing for conductor.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Conductor: process-isolated multi-agent orchestrator.
///
/// Agents are standalone executables invoked with one JSON payload argument.
/// Conductor runs them concurrently with per-agent timeouts and reports a
/// summary of the results.
#[derive(Parser, Debug)]
#[command(name = "conductor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every command.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Config file (default: conductor.yaml, built-in agents if absent).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Workspace handed to agents (overrides config).
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Append NDJSON events to this file (overrides config).
    #[arg(long, global = true)]
    pub events: Option<PathBuf>,

    /// Print the session summary as JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands for conductor.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered agents and their availability.
    Agents,

    /// Run a single agent.
    ///
    /// The payload is passed to the agent as its sole argument.
    Run(RunArgs),

    /// Run a batch of tasks in parallel.
    ///
    /// The tasks file (YAML or JSON) is a list of `{agent, payload}` entries.
    Dispatch(DispatchArgs),

    /// Run the plan -> implement -> review feature pipeline.
    Pipeline(PipelineArgs),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Agent name.
    pub agent: String,

    /// Payload as a JSON object.
    #[arg(short, long)]
    pub payload: Option<String>,

    /// Timeout in seconds (overrides config).
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the `dispatch` command.
#[derive(Parser, Debug)]
pub struct DispatchArgs {
    /// Path to the tasks file.
    pub tasks_file: PathBuf,

    /// Per-task timeout in seconds (overrides config).
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Maximum simultaneous agents (overrides config).
    #[arg(long)]
    pub max_workers: Option<usize>,
}

/// Arguments for the `pipeline` command.
#[derive(Parser, Debug)]
pub struct PipelineArgs {
    /// Natural-language feature description.
    pub feature: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_agents() {
        let cli = Cli::try_parse_from(["conductor", "agents"]).unwrap();
        assert!(matches!(cli.command, Command::Agents));
        assert!(cli.global.config.is_none());
        assert!(!cli.global.json);
        assert_eq!(cli.global.verbose, 0);
    }

    #[test]
    fn parse_run() {
        let cli = Cli::try_parse_from([
            "conductor",
            "run",
            "planner",
            "--payload",
            r#"{"request": "add login"}"#,
            "--timeout",
            "90",
        ])
        .unwrap();
        if let Command::Run(args) = cli.command {
            assert_eq!(args.agent, "planner");
            assert_eq!(args.payload.as_deref(), Some(r#"{"request": "add login"}"#));
            assert_eq!(args.timeout, Some(90));
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_run_without_payload() {
        let cli = Cli::try_parse_from(["conductor", "run", "reviewer"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert!(args.payload.is_none());
            assert!(args.timeout.is_none());
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_dispatch() {
        let cli = Cli::try_parse_from([
            "conductor",
            "dispatch",
            "tasks.yaml",
            "--max-workers",
            "2",
            "--timeout",
            "15",
        ])
        .unwrap();
        if let Command::Dispatch(args) = cli.command {
            assert_eq!(args.tasks_file, PathBuf::from("tasks.yaml"));
            assert_eq!(args.max_workers, Some(2));
            assert_eq!(args.timeout, Some(15));
        } else {
            panic!("Expected Dispatch command");
        }
    }

    #[test]
    fn parse_pipeline() {
        let cli = Cli::try_parse_from(["conductor", "pipeline", "add user search"]).unwrap();
        if let Command::Pipeline(args) = cli.command {
            assert_eq!(args.feature, "add user search");
        } else {
            panic!("Expected Pipeline command");
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "conductor",
            "pipeline",
            "feature",
            "--config",
            "ci/conductor.yaml",
            "--workspace",
            "/srv/app",
            "--events",
            "events.ndjson",
            "--json",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.global.config, Some(PathBuf::from("ci/conductor.yaml")));
        assert_eq!(cli.global.workspace, Some(PathBuf::from("/srv/app")));
        assert_eq!(cli.global.events, Some(PathBuf::from("events.ndjson")));
        assert!(cli.global.json);
        assert_eq!(cli.global.verbose, 2);
    }

    #[test]
    fn run_requires_agent() {
        assert!(Cli::try_parse_from(["conductor", "run"]).is_err());
    }
}
