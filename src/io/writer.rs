//! PDF writing and saving operations.
//!
//! Writes are atomic: the document is compressed, serialized to a sibling
//! temp file and renamed over the target, so a failed write never leaves a
//! half-written `<case>.pdf` behind.
//!
//! # Examples
//!
//! ```no_run
//! use casemerge::io::writer::PdfWriter;
//! use lopdf::Document;
//! use std::path::Path;
//!
//! # fn example(mut doc: Document) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! writer.save(&mut doc, Path::new("out/123456789.pdf"))?;
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{CaseMergeError, Result};
use crate::utils::format_file_size;

const BUFFER_SIZE: usize = 8192;

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Atomic PDF writer.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter;

impl PdfWriter {
    /// Create a new PDF writer.
    pub fn new() -> Self {
        Self
    }

    /// Save a PDF document, replacing any existing file at `path`.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created, serialized, flushed
    /// or renamed into place.
    pub fn save(&self, doc: &mut Document, path: &Path) -> Result<WriteStatistics> {
        let start = Instant::now();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| CaseMergeError::FailedToCreateOutput {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        doc.compress();

        let write_path = path.with_extension("pdf.tmp");

        if let Err(err) = write_to(doc, &write_path) {
            let _ = std::fs::remove_file(&write_path);
            return Err(err);
        }

        std::fs::rename(&write_path, path).map_err(|e| {
            let _ = std::fs::remove_file(&write_path);
            CaseMergeError::FailedToWrite {
                path: path.to_path_buf(),
                source: e,
            }
        })?;

        let file_size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        Ok(WriteStatistics {
            write_time: start.elapsed(),
            file_size,
            output_path: path.to_path_buf(),
        })
    }
}

fn write_to(doc: &mut Document, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| CaseMergeError::FailedToCreateOutput {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut writer = std::io::BufWriter::with_capacity(BUFFER_SIZE, file);

    doc.save_to(&mut writer)
        .map_err(|e| CaseMergeError::FailedToWrite {
            path: path.to_path_buf(),
            source: std::io::Error::other(e),
        })?;

    writer.flush().map_err(|e| CaseMergeError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
