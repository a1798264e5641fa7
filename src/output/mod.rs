//! Output formatting and display for casemerge.
//!
//! This module handles all user-facing output:
//! - Formatted status messages ([`OutputFormatter`])
//! - Progress reporting ([`progress`])
//! - Per-case lines, dry-run plans and the run summary
//!
//! # Examples
//!
//! ```no_run
//! use casemerge::config::Config;
//! use casemerge::output::OutputFormatter;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Scanning input folders...");
//! # }
//! ```

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{NoProgress, ProgressBar, ProgressSink, ProgressTracker};

use crate::merge::{CaseStatus, MergeResult};
use crate::pipeline::{CasePlan, RunSummary};

/// One-line description of a case outcome.
pub fn describe_case(result: &MergeResult) -> String {
    match result.status {
        CaseStatus::Merged => {
            let target = result
                .final_path()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!(
                "{}: {} document(s), {} page(s) -> {target}",
                result.case_id, result.document_count, result.page_count
            )
        }
        status => format!(
            "{}: rejected ({status}){}",
            result.case_id,
            result
                .failure
                .as_deref()
                .map(|f| format!(": {}", f.lines().next().unwrap_or(f)))
                .unwrap_or_default()
        ),
    }
}

/// Show every case outcome; rejections are warnings.
///
/// In verbose mode a rejection is followed by its full failure text.
pub fn display_case_results(formatter: &OutputFormatter, results: &[MergeResult]) {
    for result in results {
        let line = describe_case(result);
        if result.success() {
            formatter.success(&line);
            continue;
        }
        formatter.warning(&line);
        if let Some(ref failure) = result.failure {
            formatter.debug(failure);
        }
    }
}

/// Show the dry-run plan.
pub fn display_plan(formatter: &OutputFormatter, plans: &[CasePlan]) {
    for plan in plans {
        formatter.section(&format!(
            "{} -> {}",
            plan.case_id,
            plan.output_path.display()
        ));
        for (idx, doc) in plan.documents.iter().enumerate() {
            let date = doc
                .statement_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "undated".to_string());
            let convert = if doc.needs_conversion {
                ", converted first"
            } else {
                ""
            };
            formatter.list_item(
                idx + 1,
                &format!("{} (tier {}, {date}{convert})", doc.file_name, doc.tier),
            );
        }
    }

    let documents: usize = plans.iter().map(|p| p.documents.len()).sum();
    formatter.blank_line();
    formatter.info(&format!(
        "{} case(s), {documents} document(s) would be merged",
        plans.len()
    ));
}

/// Show the totals of a run.
pub fn display_run_summary(formatter: &OutputFormatter, summary: &RunSummary) {
    formatter.blank_line();
    if summary.failed() > 0 {
        formatter.warning(&format!(
            "{} of {} case(s) rejected",
            summary.failed(),
            summary.cases()
        ));
    }

    formatter.info(&format!(
        "Merged {} of {} case(s): {} pages in {:.2}s",
        summary.merged,
        summary.cases(),
        summary.total_pages,
        summary.elapsed.as_secs_f64()
    ));

    if let Some(ref path) = summary.results_path {
        formatter.info(&format!("Results written to {}", path.display()));
    }

    if !formatter.is_verbose() {
        return;
    }
    formatter.detail("Files seen", &summary.scan.files_seen.to_string());
    formatter.detail("Files excluded", &summary.scan.excluded.to_string());
    formatter.detail("Documents", &summary.documents.to_string());
    formatter.detail("Scans converted", &summary.scan.converted.to_string());
    formatter.detail(
        "Conversion failures",
        &summary.scan.conversion_failures.to_string(),
    );
    formatter.detail("Rejected (empty)", &summary.rejected_empty.to_string());
    formatter.detail("Rejected (corrupt)", &summary.rejected_corrupt.to_string());
    formatter.detail("Renamed", &summary.renamed.to_string());
}
