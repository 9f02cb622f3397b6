//! Renders an ordered outcome sequence as a JSON or CSV report.

use crate::core::error::{AppError, Result};
use crate::core::models::{VerificationOutcome, VerificationStatus};
use clap::ValueEnum;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Csv,
}

/// Writes the report to `output`, or to stdout when no path is given.
pub fn write_report(
    outcomes: &[VerificationOutcome],
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let rendered = match format {
        ReportFormat::Json => render_json(outcomes)?,
        ReportFormat::Csv => render_csv(outcomes)?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            tracing::info!("Wrote {} outcome(s) to {}", outcomes.len(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn render_json(outcomes: &[VerificationOutcome]) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}

fn render_csv(outcomes: &[VerificationOutcome]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "email",
        "isValid",
        "status",
        "message",
        "smtpResponse",
        "fromCache",
        "checkedAt",
    ])?;
    for outcome in outcomes {
        let checked_at = outcome.checked_at.to_rfc3339();
        writer.write_record([
            outcome.email.as_str(),
            if outcome.is_valid { "true" } else { "false" },
            outcome.status.as_str(),
            outcome.message.as_str(),
            outcome.smtp_response.as_deref().unwrap_or(""),
            if outcome.from_cache { "true" } else { "false" },
            checked_at.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Task(format!("Failed to flush CSV report: {e}")))?;
    String::from_utf8(bytes).map_err(|e| AppError::Task(format!("CSV report was not UTF-8: {e}")))
}

/// Logs a per-status tally of the run.
pub fn log_summary(outcomes: &[VerificationOutcome]) {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for outcome in outcomes {
        *counts.entry(outcome.status.as_str()).or_default() += 1;
    }
    let deliverable = outcomes
        .iter()
        .filter(|o| o.status == VerificationStatus::Valid)
        .count();

    tracing::info!("Checked {} address(es), {} deliverable", outcomes.len(), deliverable);
    for (status, count) in counts {
        tracing::info!("  {:<20} {}", status, count);
    }
}
