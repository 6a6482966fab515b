use tripcart_core::SyncReport;

use crate::cli::GlobalArgs;
use crate::commands::common::{open_app, short_id};
use crate::error::CliError;

pub async fn run_sync(as_json: bool, global: &GlobalArgs) -> Result<(), CliError> {
    let app = open_app(global).await?;
    if app.backend.is_none() {
        return Err(CliError::BackendNotConfigured);
    }
    if !app.context.is_online() {
        return Err(CliError::Offline);
    }

    let report = app.context.sync().await?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_report_lines(&report) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_report_lines(report: &SyncReport) -> Vec<String> {
    if report.is_empty() {
        return vec!["Nothing to sync.".to_string()];
    }

    let mut lines = vec![format!(
        "Synced {} queued items: {} created, {} updated, {} conflicts, {} unchanged, {} errors",
        report.batch_size,
        report.created,
        report.updated,
        report.conflicts,
        report.unchanged,
        report.errors
    )];
    if !report.failed_ids.is_empty() {
        let failed = report
            .failed_ids
            .iter()
            .map(short_id)
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Failed: {failed}"));
    }
    lines.push(if report.queue_cleared {
        "Offline queue cleared.".to_string()
    } else {
        "Offline queue kept for the next sync.".to_string()
    });
    lines
}
