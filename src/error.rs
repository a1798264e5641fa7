//! Error types for casemerge.
//!
//! Per-case problems (a corrupt document, a case with no pages) are not
//! errors at this level: the merge engine turns them into a rejected
//! [`CaseStatus`](crate::merge::CaseStatus) and the batch keeps going. The
//! variants below are what surfaces to the caller, either from a component
//! used on its own or as the single terminal failure of a run.

use std::io;
use std::path::PathBuf;

/// Result type alias for casemerge operations.
pub type Result<T> = std::result::Result<T, CaseMergeError>;

/// Main error type for casemerge operations.
#[derive(Debug, thiserror::Error)]
pub enum CaseMergeError {
    /// Input path was not found.
    #[error("Path not found: {}", path.display())]
    FileNotFound {
        /// Path that was not found.
        path: PathBuf,
    },

    /// An input root is not a directory.
    #[error("Not a directory: {}", path.display())]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// Failed to load a PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {reason}", path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF opened but its page tree could not be read.
    #[error("Corrupted or invalid PDF: {}\n  Details: {details}", path.display())]
    CorruptedPdf {
        /// Path to the corrupted PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// A raster image could not be decoded or converted.
    #[error("Failed to convert image: {}\n  Reason: {reason}", path.display())]
    FailedToConvertImage {
        /// Path to the source image.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A filename matched a naming convention but carried an impossible date.
    #[error("Invalid date '{value}' in file name: {name}")]
    InvalidFileNameDate {
        /// The file name being parsed.
        name: String,
        /// The date text that failed to parse.
        value: String,
    },

    /// Walking an input root failed.
    #[error("Failed to scan {}\n  Reason: {source}", path.display())]
    ScanFailed {
        /// Root or entry being walked.
        path: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },

    /// Failed to create an output file.
    #[error("Failed to create output file: {}\n  Reason: {source}", path.display())]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to an output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to read the case list file.
    #[error("Failed to read case list file: {}\n  Reason: {source}", path.display())]
    FailedToReadCaseList {
        /// Path to the case list file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Case list contains something that is not a case number.
    #[error(
        "Invalid entry in case list file: {} at line {line_number}\n  Details: {details}",
        path.display()
    )]
    InvalidCaseList {
        /// Path to the case list file.
        path: PathBuf,
        /// Line number with the error.
        line_number: usize,
        /// Details about what's invalid.
        details: String,
    },

    /// The filing-number lookup could not be completed.
    #[error("Filing number lookup failed: {reason}")]
    LookupFailed {
        /// Description of the failure.
        reason: String,
    },

    /// Writing the results sheet failed.
    #[error("Failed to write results to {}\n  Reason: {reason}", path.display())]
    ReportFailed {
        /// Results file path.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Merge operation failed.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for CaseMergeError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<walkdir::Error> for CaseMergeError {
    fn from(err: walkdir::Error) -> Self {
        Self::ScanFailed {
            path: err.path().map(PathBuf::from).unwrap_or_default(),
            source: err,
        }
    }
}

impl From<image::ImageError> for CaseMergeError {
    fn from(err: image::ImageError) -> Self {
        Self::other(format!("image error: {err}"))
    }
}

impl From<csv::Error> for CaseMergeError {
    fn from(err: csv::Error) -> Self {
        Self::other(format!("CSV error: {err}"))
    }
}

impl From<serde_json::Error> for CaseMergeError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl From<anyhow::Error> for CaseMergeError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl CaseMergeError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotADirectory error.
    pub fn not_a_directory(path: PathBuf) -> Self {
        Self::NotADirectory { path }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a CorruptedPdf error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create a FailedToConvertImage error.
    pub fn failed_to_convert(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToConvertImage {
            path,
            reason: reason.into(),
        }
    }

    /// Create a LookupFailed error.
    pub fn lookup_failed(reason: impl Into<String>) -> Self {
        Self::LookupFailed {
            reason: reason.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error only affects a single document or case.
    ///
    /// Recoverable errors are folded into a rejected case by the merger;
    /// everything else stops the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FailedToLoadPdf { .. }
                | Self::CorruptedPdf { .. }
                | Self::FailedToConvertImage { .. }
                | Self::InvalidFileNameDate { .. }
                | Self::MergeFailed { .. }
                | Self::LookupFailed { .. }
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotADirectory { .. } => 2,
            Self::FailedToReadCaseList { .. } => 2,
            Self::ScanFailed { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::FailedToConvertImage { .. } => 3,
            Self::InvalidFileNameDate { .. } => 3,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::ReportFailed { .. } => 5,
            Self::Io { .. } => 5,
            Self::MergeFailed { .. } => 6,
            Self::LookupFailed { .. } => 7,
            Self::InvalidCaseList { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::Other { .. } => 1,
        }
    }
}
