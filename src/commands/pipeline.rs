//! Implementation of the `conductor pipeline` command.

use super::{Session, report};
use crate::cli::PipelineArgs;
use crate::error::{ConductorError, Result};
use crate::events::Event;

/// Run the feature pipeline, print per-phase results and the summary.
pub(crate) fn cmd_pipeline(mut session: Session, args: PipelineArgs) -> Result<()> {
    session.log_event(&Event::pipeline_start(&args.feature));

    let pipeline_report = session.orchestrator.execute_feature_pipeline(&args.feature);

    let results: Vec<_> = pipeline_report.results().cloned().collect();
    session.record(&results);
    session.log_event(&Event::pipeline_complete(&pipeline_report));

    report::print_pipeline(&pipeline_report);
    let summarized = session.finish();

    if !pipeline_report.success {
        return Err(ConductorError::AgentFailure(format!(
            "feature pipeline failed: {}",
            args.feature
        )));
    }
    summarized
}
