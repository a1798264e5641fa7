//! Combining a case's documents into one PDF.
//!
//! - [`merger`]: the per-case merge engine
//! - [`pages`]: page-tree fix-ups applied while merging

pub mod merger;
pub mod pages;

pub use merger::{CaseMerger, CaseStatus, MergeResult};
pub use pages::{PageNormalizer, PageRotation};
