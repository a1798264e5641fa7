//! Integrity checks run before a case is merged.
//!
//! A document passes when it can be opened and its first page can be
//! reached. Anything else counts as corruption. The check is shallow: it
//! catches truncated scans and non-PDF files renamed to `.pdf`, not every
//! structural defect.
//!
//! # Examples
//!
//! ```no_run
//! use casemerge::validation::IntegrityChecker;
//! use std::path::Path;
//!
//! let checker = IntegrityChecker::new();
//! if !checker.check(Path::new("123456789 - Terms.pdf")) {
//!     eprintln!("corrupt");
//! }
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CaseMergeError, Result};
use crate::io::{LoadedPdf, PdfReader};
use crate::utils::format_file_size;

/// Outcome of checking every document of a case.
#[derive(Debug)]
pub enum CaseValidation {
    /// Every document opened; loaded documents are handed on for merging.
    Valid(Vec<LoadedPdf>),
    /// The first document that failed, and why.
    Corrupt {
        /// Path of the failing document.
        path: PathBuf,
        /// What went wrong.
        error: CaseMergeError,
    },
}

/// Summary of a successful case validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    /// Number of documents checked.
    pub files_validated: usize,
    /// Total pages across them.
    pub total_pages: usize,
    /// Total bytes on disk.
    pub total_size: u64,
}

impl ValidationSummary {
    /// Summarize loaded documents.
    pub fn from_loaded(loaded: &[LoadedPdf]) -> Self {
        Self {
            files_validated: loaded.len(),
            total_pages: loaded.iter().map(|l| l.page_count).sum(),
            total_size: loaded.iter().map(|l| l.file_size).sum(),
        }
    }

    /// Format the total file size as a human-readable string.
    pub fn format_total_size(&self) -> String {
        format_file_size(self.total_size)
    }
}

/// Checks that documents are readable before they are combined.
#[derive(Debug, Clone)]
pub struct IntegrityChecker {
    reader: PdfReader,
}

impl IntegrityChecker {
    /// Create a new checker.
    pub fn new() -> Self {
        Self {
            reader: PdfReader::new(),
        }
    }

    /// Whether the document at `path` can be opened and its first page read.
    pub fn check(&self, path: &Path) -> bool {
        self.inspect(path).is_ok()
    }

    /// Open `path` and reach its first page, returning the loaded document.
    ///
    /// # Errors
    ///
    /// Returns [`CaseMergeError::FailedToLoadPdf`] when the file cannot be
    /// parsed and [`CaseMergeError::CorruptedPdf`] when it has no readable
    /// first page.
    pub fn inspect(&self, path: &Path) -> Result<LoadedPdf> {
        let loaded = self.reader.load(path)?;

        let first_page = loaded
            .document
            .get_pages()
            .into_values()
            .next()
            .ok_or_else(|| CaseMergeError::corrupted_pdf(path.to_path_buf(), "PDF has no pages"))?;

        loaded
            .document
            .get_dictionary(first_page)
            .map_err(|e| {
                CaseMergeError::corrupted_pdf(
                    path.to_path_buf(),
                    format!("first page is unreadable: {e}"),
                )
            })?;

        Ok(loaded)
    }

    /// Check every document of a case, stopping at the first failure.
    pub fn check_case<'a, I>(&self, paths: I) -> CaseValidation
    where
        I: IntoIterator<Item = &'a Path>,
    {
        let mut loaded = Vec::new();

        for path in paths {
            match self.inspect(path) {
                Ok(doc) => {
                    debug!(path = %path.display(), pages = doc.page_count, "document passed integrity check");
                    loaded.push(doc);
                }
                Err(error) => {
                    return CaseValidation::Corrupt {
                        path: path.to_path_buf(),
                        error,
                    };
                }
            }
        }

        CaseValidation::Valid(loaded)
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}
