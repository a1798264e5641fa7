//! Results sheet written at the end of a run.
//!
//! One row per case that was attempted, in ascending case order:
//!
//! ```text
//! Case Number,Merged
//! 111111111,Yes
//! 222222222,
//! ```
//!
//! A blank `Merged` cell means the case was rejected, whatever the reason.

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{CaseMergeError, Result};
use crate::merge::MergeResult;

/// Header of the case column.
pub const CASE_COLUMN: &str = "Case Number";

/// Header of the merged column.
pub const MERGED_COLUMN: &str = "Merged";

/// Destination for per-case outcomes.
pub trait ResultsSink {
    /// Record the outcomes of a run.
    fn record(&mut self, results: &[MergeResult]) -> Result<()>;
}

/// Writes the results sheet as CSV.
#[derive(Debug, Clone)]
pub struct CsvReport {
    path: PathBuf,
}

impl CsvReport {
    /// Create a report written to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Where the sheet is written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize the rows, sorted by case number.
    pub fn render<W: Write>(writer: W, results: &[MergeResult]) -> Result<()> {
        let mut rows: Vec<&MergeResult> = results.iter().collect();
        rows.sort_by(|a, b| a.case_id.cmp(&b.case_id));

        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([CASE_COLUMN, MERGED_COLUMN])?;
        for result in rows {
            let merged = if result.success() { "Yes" } else { "" };
            csv.write_record([result.case_id.as_str(), merged])?;
        }
        csv.flush()?;
        Ok(())
    }

    fn report_error(&self, reason: impl ToString) -> CaseMergeError {
        CaseMergeError::ReportFailed {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ResultsSink for CsvReport {
    fn record(&mut self, results: &[MergeResult]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| self.report_error(e))?;
        }

        let tmp = self.path.with_extension("csv.tmp");
        let written = std::fs::File::create(&tmp)
            .map_err(|e| self.report_error(e))
            .and_then(|file| {
                Self::render(std::io::BufWriter::new(file), results)
                    .map_err(|e| self.report_error(e))
            })
            .and_then(|()| std::fs::rename(&tmp, &self.path).map_err(|e| self.report_error(e)));

        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        written
    }
}

/// Keeps outcomes in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReport {
    /// Everything recorded so far.
    pub results: Vec<MergeResult>,
}

impl ResultsSink for MemoryReport {
    fn record(&mut self, results: &[MergeResult]) -> Result<()> {
        self.results.extend_from_slice(results);
        Ok(())
    }
}
