//! PDF reading and loading operations.
//!
//! # Examples
//!
//! ```no_run
//! use casemerge::io::reader::PdfReader;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reader = PdfReader::new();
//! let loaded = reader.load(Path::new("123456789.pdf"))?;
//! println!("Loaded {} pages in {:?}", loaded.page_count, loaded.load_time);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{CaseMergeError, Result};

/// A loaded PDF document with metadata.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The PDF document.
    pub document: Document,

    /// Path to the source file.
    pub path: PathBuf,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Time taken to load the document.
    pub load_time: Duration,

    /// File size in bytes.
    pub file_size: u64,
}

impl LoadedPdf {
    fn new(document: Document, path: PathBuf, load_time: Duration) -> Self {
        let page_count = document.get_pages().len();
        let file_size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        Self {
            document,
            path,
            page_count,
            load_time,
            file_size,
        }
    }
}

/// PDF reader that only accepts documents with at least one page.
#[derive(Debug, Clone, Default)]
pub struct PdfReader;

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self
    }

    /// Load a single PDF document.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - File is not a valid PDF
    /// - The page tree is empty
    pub fn load(&self, path: &Path) -> Result<LoadedPdf> {
        let start = Instant::now();

        let document = Document::load(path)
            .map_err(|e| CaseMergeError::failed_to_load_pdf(path.to_path_buf(), e.to_string()))?;

        if document.get_pages().is_empty() {
            return Err(CaseMergeError::corrupted_pdf(
                path.to_path_buf(),
                "PDF has no pages",
            ));
        }

        Ok(LoadedPdf::new(document, path.to_path_buf(), start.elapsed()))
    }
}
