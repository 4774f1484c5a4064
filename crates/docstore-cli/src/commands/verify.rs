//! Consistency audit command.

use clap::Args;

use docstore_core::config::AppConfig;
use docstore_core::error::AppError;
use docstore_service::ConsistencyReport;

use crate::output::{self, OutputFormat};

/// Arguments for the verify command
#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Delete orphan and unfinished blobs older than the grace period
    #[arg(long)]
    pub prune: bool,
}

/// Execute the verify command. Fails when a record lacks its blob.
pub async fn execute(
    args: &VerifyArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let (state, db) = docstore_api::build_state(config).await?;
    let report = state.documents.verify(args.prune).await;
    db.close().await;
    let report = report?;

    match format {
        OutputFormat::Json => output::print_json(&report),
        OutputFormat::Table => print_report(&report),
    }

    if report.missing_blobs.is_empty() && report.size_mismatches.is_empty() {
        Ok(())
    } else {
        Err(AppError::inconsistent_state(format!(
            "{} record(s) missing content, {} with size mismatches",
            report.missing_blobs.len(),
            report.size_mismatches.len()
        )))
    }
}

fn print_report(report: &ConsistencyReport) {
    println!("Consistency report:");
    output::print_kv("Records checked", &report.records_checked.to_string());
    output::print_kv("Blobs checked", &report.blobs_checked.to_string());

    for missing in &report.missing_blobs {
        output::print_error(&format!(
            "Document {} has no blob ({})",
            missing.id, missing.stored_name
        ));
    }
    for mismatch in &report.size_mismatches {
        output::print_error(&format!(
            "Document {} records {} bytes but blob has {}",
            mismatch.id, mismatch.recorded_bytes, mismatch.actual_bytes
        ));
    }
    for orphan in &report.orphan_blobs {
        output::print_warning(&format!("Orphan blob: {orphan}"));
    }
    for partial in &report.partial_blobs {
        output::print_warning(&format!("Unfinished write: {partial}"));
    }
    for pruned in &report.pruned {
        output::print_kv("Pruned", pruned);
    }

    if report.is_consistent() {
        output::print_success("Registry and blob store agree.");
    }
}
