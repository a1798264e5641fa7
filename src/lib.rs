//! casemerge - Merge scanned case documents into one PDF per case.
//!
//! Court and collections paperwork arrives as loose scans and PDFs whose
//! names carry a 9-digit case number. This library turns a pile of them
//! into one ordered PDF per case:
//!
//! - Recursive scanning with filename-convention parsing
//! - TIFF/JPEG conversion to single-page PDFs
//! - Document-type and statement-date ordering
//! - Integrity checks before anything is written
//! - Portrait normalization of landscape pages
//! - Optional renaming to filing numbers
//! - A CSV results sheet per run
//!
//! # Examples
//!
//! ## Batch Run
//!
//! ```no_run
//! use casemerge::config::Config;
//! use casemerge::output::NoProgress;
//! use casemerge::pipeline;
//! use std::path::PathBuf;
//!
//! # fn example() -> casemerge::Result<()> {
//! let config = Config::new(vec![PathBuf::from("scans")], PathBuf::from("merged"));
//! let summary = pipeline::run_batch(&config, None, &mut NoProgress)?;
//! println!("{} case(s) merged", summary.merged);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Individual Components
//!
//! ```no_run
//! use casemerge::config::Settings;
//! use casemerge::order::{DocumentOrderer, OrderingPolicy, PriorityTable};
//! use casemerge::scan::CaseScanner;
//! use std::path::PathBuf;
//!
//! # fn example() -> casemerge::Result<()> {
//! let scan = CaseScanner::new(&Settings::default())?
//!     .without_conversion()
//!     .scan(&[PathBuf::from("scans")], None)?;
//!
//! let orderer = DocumentOrderer::new(PriorityTable::default(), OrderingPolicy::default());
//! for (case_id, documents) in scan.cases {
//!     let ordered = orderer.order(documents);
//!     println!("{case_id}: {} document(s)", ordered.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod merge;
pub mod naming;
pub mod order;
pub mod output;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod scan;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{CaseMergeError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
