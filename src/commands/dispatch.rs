//! Implementation of the `conductor dispatch` command.

use super::{Session, report, timeout_override};
use crate::agent::TaskRequest;
use crate::cli::DispatchArgs;
use crate::error::{ConductorError, Result};
use std::path::Path;

/// Run every task in the tasks file in parallel.
pub(crate) fn cmd_dispatch(mut session: Session, args: DispatchArgs) -> Result<()> {
    let tasks: Vec<TaskRequest> = load_tasks(&args.tasks_file)?
        .into_iter()
        .map(|task| TaskRequest::new(task.agent_name, session.with_workspace(task.payload)))
        .collect();

    let mut options = session.orchestrator.settings().batch_options();
    if let Some(timeout) = timeout_override(args.timeout)? {
        options.timeout = timeout;
    }
    match args.max_workers {
        Some(0) => {
            return Err(ConductorError::UserError(
                "--max-workers must be greater than 0".to_string(),
            ));
        }
        Some(max_workers) => options.max_workers = max_workers,
        None => {}
    }

    println!(
        "Dispatching {} tasks ({} at a time)...",
        tasks.len(),
        options.worker_count(tasks.len())
    );
    println!();

    let results = session.orchestrator.dispatch_with(tasks, &options);
    session.record(&results);

    for result in &results {
        report::print_result(result);
    }
    println!();
    session.finish()
}

/// Read a list of `{agent, payload}` entries from a YAML or JSON file.
pub(crate) fn load_tasks(path: &Path) -> Result<Vec<TaskRequest>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ConductorError::UserError(format!(
            "failed to read tasks file '{}': {}",
            path.display(),
            e
        ))
    })?;

    parse_tasks(&content).map_err(|e| {
        ConductorError::UserError(format!(
            "failed to parse tasks file '{}': {}",
            path.display(),
            e
        ))
    })
}

fn parse_tasks(content: &str) -> std::result::Result<Vec<TaskRequest>, serde_yaml::Error> {
    // YAML is a superset of JSON, so one parser covers both formats.
    serde_yaml::from_str(content)
}
