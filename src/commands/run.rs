//! Implementation of the `conductor run` command.

use super::{Session, report, timeout_override};
use crate::agent::Payload;
use crate::cli::RunArgs;
use crate::error::{ConductorError, Result};
use serde_json::Value;

/// Run one agent and print its result and the session summary.
pub(crate) fn cmd_run(mut session: Session, args: RunArgs) -> Result<()> {
    let payload = session.with_workspace(parse_payload(args.payload.as_deref())?);
    let timeout = timeout_override(args.timeout)?
        .unwrap_or(session.orchestrator.settings().run_timeout);

    println!("Running agent {}...", args.agent);
    let result = session
        .orchestrator
        .run_with_timeout(&args.agent, payload, timeout);
    session.record(std::slice::from_ref(&result));

    report::print_result(&result);
    println!();
    session.finish()
}

/// Parse a `--payload` argument, which must be a JSON object.
pub(crate) fn parse_payload(raw: Option<&str>) -> Result<Payload> {
    let Some(raw) = raw else {
        return Ok(Payload::new());
    };

    match serde_json::from_str(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ConductorError::UserError(
            "payload must be a JSON object".to_string(),
        )),
        Err(e) => Err(ConductorError::UserError(format!(
            "failed to parse payload JSON: {}",
            e
        ))),
    }
}
