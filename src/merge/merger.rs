//! Merge engine: one combined PDF per case.
//!
//! Each case goes through `ordered -> validated -> merged | rejected`. Every
//! document is loaded and checked before anything is written, so a case is
//! either merged completely or not at all. The loaded documents are reused
//! for the merge instead of being read twice.

use std::fmt;
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, ObjectId, dictionary};
use tracing::{debug, info, warn};

use crate::error::{CaseMergeError, Result};
use crate::io::{LoadedPdf, PdfWriter};
use crate::merge::pages::PageNormalizer;
use crate::output::progress::ProgressTracker;
use crate::scan::SourceDocument;
use crate::validation::{CaseValidation, IntegrityChecker, ValidationSummary};

/// Terminal status of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    /// `<case>.pdf` was written.
    Merged,
    /// There was nothing to merge.
    RejectedEmpty,
    /// A document failed the integrity check.
    RejectedCorrupt,
}

impl CaseStatus {
    /// Whether an output file was written.
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged)
    }

    /// Short label for display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Merged => "merged",
            Self::RejectedEmpty => "empty",
            Self::RejectedCorrupt => "corrupt",
        }
    }
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Case number.
    pub case_id: String,
    /// Terminal status.
    pub status: CaseStatus,
    /// Written file, for merged cases.
    pub output_path: Option<PathBuf>,
    /// New name after a filing-number rename.
    pub renamed_path: Option<PathBuf>,
    /// Pages in the written file.
    pub page_count: usize,
    /// Documents that went into the case.
    pub document_count: usize,
    /// Why the case was rejected.
    pub failure: Option<String>,
}

impl MergeResult {
    fn rejected(case_id: &str, status: CaseStatus, document_count: usize, failure: String) -> Self {
        Self {
            case_id: case_id.to_string(),
            status,
            output_path: None,
            renamed_path: None,
            page_count: 0,
            document_count,
            failure: Some(failure),
        }
    }

    /// Whether the case merged.
    pub fn success(&self) -> bool {
        self.status.is_merged()
    }

    /// Where the merged file lives now, after any rename.
    pub fn final_path(&self) -> Option<&Path> {
        self.renamed_path.as_deref().or(self.output_path.as_deref())
    }
}

/// Combines the ordered documents of a case into `<case>.pdf`.
#[derive(Debug, Clone)]
pub struct CaseMerger {
    output_dir: PathBuf,
    checker: IntegrityChecker,
    pages: PageNormalizer,
    writer: PdfWriter,
}

impl CaseMerger {
    /// Create a merger writing into `output_dir`.
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            checker: IntegrityChecker::new(),
            pages: PageNormalizer::new(),
            writer: PdfWriter::new(),
        }
    }

    /// Path the merged file for `case_id` is written to.
    pub fn output_path(&self, case_id: &str) -> PathBuf {
        self.output_dir.join(format!("{case_id}.pdf"))
    }

    /// Merge one case.
    ///
    /// `documents` must already be in merge order. Rejections are returned
    /// as a [`MergeResult`] with a rejected status; progress advances by
    /// every document of the case either way.
    ///
    /// A document whose later pages turn out to be unreadable while
    /// combining rejects the case as corrupt.
    ///
    /// # Errors
    ///
    /// Only fails when the output cannot be written. Those errors stop the
    /// run.
    pub fn merge_case(
        &self,
        case_id: &str,
        documents: &[SourceDocument],
        progress: &mut ProgressTracker<'_>,
    ) -> Result<MergeResult> {
        if documents.is_empty() {
            warn!(case = case_id, "case has no documents");
            return Ok(MergeResult::rejected(
                case_id,
                CaseStatus::RejectedEmpty,
                0,
                "no documents".to_string(),
            ));
        }

        let loaded = match self
            .checker
            .check_case(documents.iter().map(|d| d.path.as_path()))
        {
            CaseValidation::Valid(loaded) => loaded,
            CaseValidation::Corrupt { path, error } => {
                warn!(case = case_id, path = %path.display(), error = %error, "case rejected");
                progress.advance(documents.len());
                return Ok(MergeResult::rejected(
                    case_id,
                    CaseStatus::RejectedCorrupt,
                    documents.len(),
                    error.to_string(),
                ));
            }
        };

        let checked = ValidationSummary::from_loaded(&loaded);
        debug!(
            case = case_id,
            documents = checked.files_validated,
            pages = checked.total_pages,
            size = %checked.format_total_size(),
            "case passed integrity check"
        );

        let counted = progress.processed();
        let (mut merged, page_count) = match self.combine(loaded, progress) {
            Ok(combined) => combined,
            Err(error) if error.is_recoverable() => {
                warn!(case = case_id, error = %error, "case rejected while combining");
                let advanced = progress.processed().saturating_sub(counted);
                progress.advance(documents.len().saturating_sub(advanced));
                return Ok(MergeResult::rejected(
                    case_id,
                    CaseStatus::RejectedCorrupt,
                    documents.len(),
                    error.to_string(),
                ));
            }
            Err(error) => return Err(error),
        };

        if page_count == 0 {
            warn!(case = case_id, "case produced no pages");
            return Ok(MergeResult::rejected(
                case_id,
                CaseStatus::RejectedEmpty,
                documents.len(),
                "no pages".to_string(),
            ));
        }

        let output_path = self.output_path(case_id);
        let stats = self.writer.save(&mut merged, &output_path)?;

        info!(
            case = case_id,
            documents = documents.len(),
            pages = page_count,
            size = %stats.format_file_size(),
            "case merged"
        );

        Ok(MergeResult {
            case_id: case_id.to_string(),
            status: CaseStatus::Merged,
            output_path: Some(output_path),
            renamed_path: None,
            page_count,
            document_count: documents.len(),
            failure: None,
        })
    }

    /// Append every page of `loaded`, in order, under one new page tree.
    ///
    /// Returns the merged document and its page count.
    pub fn combine(
        &self,
        loaded: Vec<LoadedPdf>,
        progress: &mut ProgressTracker<'_>,
    ) -> Result<(Document, usize)> {
        let mut merged = Document::with_version("1.5");
        let pages_id = merged.new_object_id();
        let mut max_id = merged.max_id;
        let mut kids: Vec<Object> = Vec::new();

        for LoadedPdf {
            mut document, path, ..
        } in loaded
        {
            // Avoid object id collisions by renumbering the incoming document
            document.renumber_objects_with(max_id + 1);
            max_id = max_id.max(document.max_id);

            let page_ids: Vec<ObjectId> = document.get_pages().into_values().collect();
            for &page_id in &page_ids {
                self.pages.flatten_inherited(&mut document, page_id)?;
            }

            merged.objects.extend(document.objects);

            for page_id in page_ids {
                merged
                    .get_dictionary_mut(page_id)
                    .map_err(|e| {
                        CaseMergeError::merge_failed(format!(
                            "{}: page {page_id:?} is unreadable: {e}",
                            path.display()
                        ))
                    })?
                    .set("Parent", pages_id);
                if self.pages.fix_orientation(&mut merged, page_id)? {
                    debug!(path = %path.display(), "rotated landscape page");
                }
                kids.push(Object::Reference(page_id));
            }

            progress.advance(1);
        }

        merged.max_id = max_id;
        let page_count = kids.len();

        merged.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );

        let catalog_id = merged.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        merged.trailer.set("Root", catalog_id);

        // Catalogs and page-tree nodes of the inputs are now unreachable
        merged.prune_objects();
        merged.renumber_objects();

        Ok((merged, page_count))
    }
}
