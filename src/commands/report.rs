//! Human-readable and JSON output for results and summaries.

use crate::agent::AgentResult;
use crate::error::{ConductorError, Result};
use crate::orchestrator::{PipelineReport, Summary};

/// Print one result line, followed by its output indented.
pub(crate) fn print_result(result: &AgentResult) {
    let status = match result.failure {
        None => "ok".to_string(),
        Some(kind) => format!("FAILED ({})", kind),
    };
    println!(
        "  {:12} {:24} {:.2}s",
        result.agent_name,
        status,
        result.duration_ms as f64 / 1000.0
    );
    for line in result.output.lines() {
        println!("      {}", line);
    }
}

pub(crate) fn print_pipeline(report: &PipelineReport) {
    println!("Feature Pipeline: {}", report.feature);
    println!();
    for phase in &report.phases {
        let status = if phase.succeeded() { "ok" } else { "FAILED" };
        println!("Phase {} [{}]", phase.phase, status);
        for result in &phase.results {
            print_result(result);
        }
        println!();
    }
    if report.success {
        println!("Pipeline completed successfully.");
    } else {
        println!("WARNING: Pipeline finished with failures - check agent outputs.");
    }
    println!();
}

pub(crate) fn print_summary(summary: &Summary, as_json: bool) -> Result<()> {
    if as_json {
        let rendered = serde_json::to_string_pretty(summary).map_err(|e| {
            ConductorError::UserError(format!("failed to serialize summary: {}", e))
        })?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("Orchestration Summary");
    println!("=====================");
    println!("  Total:        {:>4}", summary.total);
    println!("  Successful:   {:>4}", summary.successful);
    println!("  Failed:       {:>4}", summary.failed);
    println!("  Success rate: {:>5.1}%", summary.success_rate);
    Ok(())
}
