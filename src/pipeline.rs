//! The batch run: scan, order, validate, merge, rename, report.
//!
//! Cases are processed one at a time in ascending case order. A rejected
//! case is recorded and the run moves on; only filesystem failures and bad
//! configuration end a run early.
//!
//! # Examples
//!
//! ```no_run
//! use casemerge::config::Config;
//! use casemerge::output::progress::NoProgress;
//! use casemerge::pipeline::run_batch;
//! use std::path::PathBuf;
//!
//! # fn example() -> casemerge::Result<()> {
//! let config = Config::new(vec![PathBuf::from("scans")], PathBuf::from("merged"));
//! let summary = run_batch(&config, None, &mut NoProgress)?;
//! println!("{} of {} cases merged", summary.merged, summary.cases());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tracing::info;

use crate::config::Config;
use crate::error::{CaseMergeError, Result};
use crate::merge::{CaseMerger, CaseStatus, MergeResult};
use crate::order::{DocumentOrderer, PriorityTable};
use crate::output::progress::{ProgressSink, ProgressTracker};
use crate::report::{CsvReport, ResultsSink};
use crate::resolve::{CaseResolver, FileNumberLookup};
use crate::scan::{CaseScanner, Scan, ScanStatistics, SourceFormat};

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// One entry per case, ascending by case number.
    pub results: Vec<MergeResult>,
    /// Counters from the scan.
    pub scan: ScanStatistics,
    /// Cases written.
    pub merged: usize,
    /// Cases with nothing to merge.
    pub rejected_empty: usize,
    /// Cases with an unreadable document.
    pub rejected_corrupt: usize,
    /// Merged files renamed to a filing number.
    pub renamed: usize,
    /// Pages across all written files.
    pub total_pages: usize,
    /// Documents across all cases.
    pub documents: usize,
    /// Results sheet, when one was written.
    pub results_path: Option<PathBuf>,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl RunSummary {
    fn from_results(results: Vec<MergeResult>, scan: ScanStatistics) -> Self {
        let count = |status: CaseStatus| results.iter().filter(|r| r.status == status).count();

        Self {
            merged: count(CaseStatus::Merged),
            rejected_empty: count(CaseStatus::RejectedEmpty),
            rejected_corrupt: count(CaseStatus::RejectedCorrupt),
            total_pages: results.iter().map(|r| r.page_count).sum(),
            documents: results.iter().map(|r| r.document_count).sum(),
            results,
            scan,
            ..Default::default()
        }
    }

    /// Number of cases attempted.
    pub fn cases(&self) -> usize {
        self.results.len()
    }

    /// Number of cases that were rejected.
    pub fn failed(&self) -> usize {
        self.rejected_empty + self.rejected_corrupt
    }
}

/// One document in a dry-run plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedDocument {
    /// File as found on disk.
    pub path: PathBuf,
    /// File name.
    pub file_name: String,
    /// Priority tier.
    pub tier: usize,
    /// Statement date from the name.
    pub statement_date: Option<NaiveDate>,
    /// Raster scan that a real run would convert first.
    pub needs_conversion: bool,
}

/// Merge order of one case in a dry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePlan {
    /// Case number.
    pub case_id: String,
    /// Documents in merge order.
    pub documents: Vec<PlannedDocument>,
    /// File a real run would write.
    pub output_path: PathBuf,
}

fn validated(config: &Config) -> Result<()> {
    config
        .validate()
        .map_err(|e| CaseMergeError::invalid_config(format!("Configuration validation failed: {e}")))
}

fn orderer(config: &Config) -> DocumentOrderer {
    DocumentOrderer::new(
        PriorityTable::new(&config.settings.priority_keywords),
        config.ordering,
    )
}

fn scan(config: &Config, convert: bool) -> Result<Scan> {
    let mut scanner = CaseScanner::new(&config.settings)?.excluding(&config.output);
    if !convert {
        scanner = scanner.without_conversion();
    }
    scanner.scan(config.inputs(), config.restrict_to.as_ref())
}

/// Work out what a run would merge, without converting or writing anything.
pub fn plan(config: &Config) -> Result<Vec<CasePlan>> {
    validated(config)?;
    let orderer = orderer(config);
    let merger = CaseMerger::new(&config.output);

    let plans = scan(config, false)?
        .cases
        .into_iter()
        .map(|(case_id, documents)| {
            let documents = orderer
                .order(documents)
                .into_iter()
                .map(|doc| PlannedDocument {
                    tier: orderer.tier(&doc),
                    needs_conversion: doc.format == SourceFormat::Raster,
                    path: doc.source_path.unwrap_or(doc.path),
                    file_name: doc.file_name,
                    statement_date: doc.statement_date,
                })
                .collect();
            CasePlan {
                output_path: merger.output_path(&case_id),
                case_id,
                documents,
            }
        })
        .collect();

    Ok(plans)
}

/// Run a batch and write the results sheet into the output directory.
///
/// # Errors
///
/// Fails on invalid configuration, an unusable input root, or a failed
/// write. Rejected cases and lookup failures do not fail the run.
pub fn run_batch(
    config: &Config,
    lookup: Option<&dyn FileNumberLookup>,
    progress: &mut dyn ProgressSink,
) -> Result<RunSummary> {
    let mut report = CsvReport::new(config.results_path());
    let mut summary = run_batch_with(config, lookup, &mut report, progress)?;
    summary.results_path = Some(report.path().to_path_buf());
    Ok(summary)
}

/// Run a batch and hand the per-case outcomes to `sink`.
pub fn run_batch_with(
    config: &Config,
    lookup: Option<&dyn FileNumberLookup>,
    sink: &mut dyn ResultsSink,
    progress: &mut dyn ProgressSink,
) -> Result<RunSummary> {
    let start = Instant::now();
    validated(config)?;

    let scan = scan(config, true)?;
    let orderer = orderer(config);
    let merger = CaseMerger::new(&config.output);

    info!(
        cases = scan.cases.len(),
        documents = scan.document_count(),
        ordering = %orderer.policy(),
        "starting merge"
    );

    let mut tracker = ProgressTracker::new(scan.document_count(), progress);
    let mut results = Vec::with_capacity(scan.cases.len());

    for (case_id, documents) in scan.cases {
        let ordered = orderer.order(documents);
        results.push(merger.merge_case(&case_id, &ordered, &mut tracker)?);
    }

    let renamed = match lookup {
        Some(lookup) => CaseResolver::new(lookup).resolve(&mut results)?,
        None => 0,
    };

    sink.record(&results)?;

    let mut summary = RunSummary::from_results(results, scan.stats);
    summary.renamed = renamed;
    summary.elapsed = start.elapsed();

    info!(
        merged = summary.merged,
        failed = summary.failed(),
        renamed = summary.renamed,
        "run finished"
    );

    Ok(summary)
}
