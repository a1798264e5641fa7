//! Renaming merged files after their external filing number.
//!
//! The filing numbers come from a [`FileNumberLookup`], queried once for
//! every case that merged in the run. A merged `<case>.pdf` with a match is
//! renamed to `<filing>-doc seq.pdf`, or to the first free
//! `<filing>-doc seq_N.pdf` when that name is taken. Existing files are
//! never overwritten.
//!
//! A failing lookup never undoes or aborts the merges: it is logged and no
//! renames happen.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{CaseMergeError, Result};
use crate::merge::MergeResult;

/// Suffix of a renamed file's stem.
pub const RENAMED_STEM_SUFFIX: &str = "-doc seq";

/// Batched case-number to filing-number query.
pub trait FileNumberLookup {
    /// Filing numbers for the given case numbers. Case numbers without a
    /// filing number are simply absent from the map.
    fn lookup(&self, case_ids: &BTreeSet<String>) -> Result<BTreeMap<String, String>>;
}

/// Lookup backed by a map held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLookup {
    entries: BTreeMap<String, String>,
}

impl InMemoryLookup {
    /// Create a lookup from `(case, filing)` pairs.
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl FileNumberLookup for InMemoryLookup {
    fn lookup(&self, case_ids: &BTreeSet<String>) -> Result<BTreeMap<String, String>> {
        Ok(case_ids
            .iter()
            .filter_map(|id| self.entries.get(id).map(|f| (id.clone(), f.clone())))
            .collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FilingNumber {
    Text(String),
    Number(u64),
}

impl FilingNumber {
    fn into_string(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Number(n) => n.to_string(),
        }
    }
}

/// Lookup read from a JSON object of `"case": "filing"` pairs.
///
/// The file is read when the lookup runs, not when it is created. Filing
/// numbers may be strings or non-negative integers.
#[derive(Debug, Clone)]
pub struct JsonFileLookup {
    path: PathBuf,
}

impl JsonFileLookup {
    /// Create a lookup reading `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FileNumberLookup for JsonFileLookup {
    fn lookup(&self, case_ids: &BTreeSet<String>) -> Result<BTreeMap<String, String>> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            CaseMergeError::lookup_failed(format!("cannot read {}: {e}", self.path.display()))
        })?;
        let table: BTreeMap<String, FilingNumber> = serde_json::from_str(&text).map_err(|e| {
            CaseMergeError::lookup_failed(format!("cannot parse {}: {e}", self.path.display()))
        })?;

        Ok(table
            .into_iter()
            .filter(|(case_id, _)| case_ids.contains(case_id))
            .map(|(case_id, filing)| (case_id, filing.into_string()))
            .collect())
    }
}

/// Applies filing-number renames to merged cases.
pub struct CaseResolver<'a> {
    lookup: &'a dyn FileNumberLookup,
}

impl<'a> CaseResolver<'a> {
    /// Create a resolver around a lookup.
    pub fn new(lookup: &'a dyn FileNumberLookup) -> Self {
        Self { lookup }
    }

    /// Rename merged outputs that have a filing number and return how many
    /// were renamed.
    ///
    /// The lookup is skipped entirely when nothing merged.
    ///
    /// # Errors
    ///
    /// Fails only when a rename on disk fails. Lookup failures are logged
    /// and result in no renames.
    pub fn resolve(&self, results: &mut [MergeResult]) -> Result<usize> {
        let merged: BTreeSet<String> = results
            .iter()
            .filter(|r| r.success())
            .map(|r| r.case_id.clone())
            .collect();

        if merged.is_empty() {
            return Ok(0);
        }

        let filings = match self.lookup.lookup(&merged) {
            Ok(filings) => filings,
            Err(e) => {
                warn!(error = %e, "filing number lookup failed, keeping case-number file names");
                return Ok(0);
            }
        };

        let mut renamed = 0;
        for result in results.iter_mut().filter(|r| r.success()) {
            let (Some(filing), Some(current)) =
                (filings.get(&result.case_id), result.output_path.as_deref())
            else {
                continue;
            };

            if !is_usable_filing_number(filing) {
                warn!(case = %result.case_id, filing = %filing, "ignoring unusable filing number");
                continue;
            }

            let dir = current.parent().unwrap_or(Path::new(""));
            let target = unique_target(dir, filing);
            std::fs::rename(current, &target).map_err(|e| CaseMergeError::FailedToWrite {
                path: target.clone(),
                source: e,
            })?;

            info!(case = %result.case_id, target = %target.display(), "renamed to filing number");
            result.renamed_path = Some(target);
            renamed += 1;
        }

        Ok(renamed)
    }
}

/// Filing numbers end up in a file name, so they must not be able to
/// leave the output directory.
fn is_usable_filing_number(filing: &str) -> bool {
    let filing = filing.trim();
    !filing.is_empty() && filing != "." && filing != ".." && !filing.contains(['/', '\\'])
}

/// First of `<filing>-doc seq.pdf`, `<filing>-doc seq_1.pdf`, ... that does
/// not exist in `dir`.
pub fn unique_target(dir: &Path, filing: &str) -> PathBuf {
    let stem = format!("{}{RENAMED_STEM_SUFFIX}", filing.trim());
    let first = dir.join(format!("{stem}.pdf"));
    if !first.exists() {
        return first;
    }

    (1..)
        .map(|n| dir.join(format!("{stem}_{n}.pdf")))
        .find(|candidate| !candidate.exists())
        .unwrap_or(first)
}
