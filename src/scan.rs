//! Case scanner: walks input roots and groups documents by case number.
//!
//! The scan runs in three passes:
//!
//! 1. Every input root is walked in lexicographic order and all regular
//!    files are collected. Nothing is converted yet, so files written during
//!    the scan are never picked up by it.
//! 2. Each path is admitted or excluded: skip extensions first, then
//!    accepted extensions, stale conversions, the filename parser and the
//!    restriction set.
//! 3. Admitted raster scans are converted and everything is folded into a
//!    [`CaseMap`] keyed by case number.
//!
//! A case number found under several roots is one case.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::Settings;
use crate::error::{CaseMergeError, Result};
use crate::io::RasterConverter;
use crate::naming::parse_file_name;

/// Documents grouped by case number, cases in ascending order.
pub type CaseMap = BTreeMap<String, Vec<SourceDocument>>;

/// Format of the file a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Page-based document.
    Pdf,
    /// Single-page raster scan.
    Raster,
}

/// One input file admitted to a case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File that is merged. For a converted scan this is the converted PDF.
    pub path: PathBuf,
    /// Nine-digit case number taken from the file name.
    pub case_id: String,
    /// File name as found on disk.
    pub file_name: String,
    /// Document type from the structured naming template.
    pub document_type: Option<String>,
    /// Statement date from the file name.
    pub statement_date: Option<NaiveDate>,
    /// Format of the original file.
    pub format: SourceFormat,
    /// Original raster file, for scans.
    pub source_path: Option<PathBuf>,
}

impl SourceDocument {
    /// Whether this is a raster scan that has a converted PDF to merge.
    pub fn is_converted(&self) -> bool {
        self.format == SourceFormat::Raster
            && self.source_path.as_deref().is_some_and(|src| src != self.path)
    }
}

/// Why a file did not make it into a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Extension is on the skip list.
    SkippedExtension,
    /// Extension is neither a document nor a raster extension.
    Unsupported,
    /// A converted PDF left next to its raster by an earlier run.
    StaleConversion,
    /// No nine-digit case number in the name.
    NoCaseId,
    /// Case number is not in the restriction set.
    NotRequested,
    /// Name carries a date that does not exist.
    InvalidDate,
}

/// Counters collected during a scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStatistics {
    /// Regular files found under the roots.
    pub files_seen: usize,
    /// Files admitted to a case.
    pub documents: usize,
    /// Raster scans converted to PDF.
    pub converted: usize,
    /// Raster scans that could not be converted.
    pub conversion_failures: usize,
    /// Files excluded for any reason.
    pub excluded: usize,
}

/// Result of a scan.
#[derive(Debug, Clone, Default)]
pub struct Scan {
    /// Documents per case, in discovery order.
    pub cases: CaseMap,
    /// What the scan saw.
    pub stats: ScanStatistics,
}

impl Scan {
    /// Total number of documents across all cases.
    pub fn document_count(&self) -> usize {
        self.cases.values().map(Vec::len).sum()
    }
}

enum Admission {
    Admitted(SourceDocument),
    Excluded(Exclusion),
}

/// Walks input roots and groups admitted files by case number.
#[derive(Debug, Clone)]
pub struct CaseScanner {
    skip: GlobSet,
    documents: GlobSet,
    rasters: GlobSet,
    converter: RasterConverter,
    convert: bool,
    excluded_dirs: Vec<PathBuf>,
}

impl CaseScanner {
    /// Build a scanner from the filename conventions.
    ///
    /// # Errors
    ///
    /// Returns [`CaseMergeError::InvalidConfig`] if an extension does not
    /// form a valid glob.
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            skip: extension_set(&settings.skip_extensions)?,
            documents: extension_set(&settings.document_extensions)?,
            rasters: extension_set(&settings.raster_extensions)?,
            converter: RasterConverter::new(settings.converted_suffix.clone()),
            convert: true,
            excluded_dirs: Vec::new(),
        })
    }

    /// Leave raster scans unconverted. Used for dry runs.
    pub fn without_conversion(mut self) -> Self {
        self.convert = false;
        self
    }

    /// Never descend into `dir`. Used to keep merged outputs that live
    /// under an input root out of later scans.
    pub fn excluding(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded_dirs.push(dir.into());
        self
    }

    /// Scan every root and group the admitted files by case number.
    ///
    /// With a restriction set, files of other cases are dropped before any
    /// conversion happens.
    ///
    /// # Errors
    ///
    /// Fails if a root is missing or not a directory, or if walking it
    /// fails. Per-file problems only exclude that file.
    pub fn scan(&self, roots: &[PathBuf], restrict_to: Option<&BTreeSet<String>>) -> Result<Scan> {
        let paths = collect_files(roots, &self.excluded_dirs)?;
        let files_seen = paths.len();
        let conversions = self.conversion_targets(&paths);

        let (cases, mut stats) = paths
            .into_iter()
            .map(|path| self.admit(path, &conversions, restrict_to))
            .fold(
                (CaseMap::new(), ScanStatistics::default()),
                |(mut cases, mut stats), admission| {
                    match admission {
                        Admission::Admitted(doc) => {
                            if doc.format == SourceFormat::Raster && self.convert {
                                if doc.is_converted() {
                                    stats.converted += 1;
                                } else {
                                    stats.conversion_failures += 1;
                                }
                            }
                            stats.documents += 1;
                            cases.entry(doc.case_id.clone()).or_default().push(doc);
                        }
                        Admission::Excluded(reason) => {
                            debug!(?reason, "file excluded");
                            stats.excluded += 1;
                        }
                    }
                    (cases, stats)
                },
            );
        stats.files_seen = files_seen;

        debug!(
            files = stats.files_seen,
            documents = stats.documents,
            cases = cases.len(),
            "scan finished"
        );

        Ok(Scan { cases, stats })
    }

    fn admit(
        &self,
        path: PathBuf,
        conversions: &HashSet<PathBuf>,
        restrict_to: Option<&BTreeSet<String>>,
    ) -> Admission {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Admission::Excluded(Exclusion::Unsupported);
        };

        if self.skip.is_match(&file_name) {
            return Admission::Excluded(Exclusion::SkippedExtension);
        }

        let format = if self.documents.is_match(&file_name) {
            SourceFormat::Pdf
        } else if self.rasters.is_match(&file_name) {
            SourceFormat::Raster
        } else {
            return Admission::Excluded(Exclusion::Unsupported);
        };

        if format == SourceFormat::Pdf && conversions.contains(&path) {
            debug!(path = %path.display(), "skipping output of an earlier conversion");
            return Admission::Excluded(Exclusion::StaleConversion);
        }

        let parsed = match parse_file_name(&file_name) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "excluding file with an invalid date");
                return Admission::Excluded(Exclusion::InvalidDate);
            }
        };

        let document_type = parsed.document_type().map(str::to_string);
        let Some(case_id) = parsed.case_id else {
            return Admission::Excluded(Exclusion::NoCaseId);
        };

        if let Some(allowed) = restrict_to
            && !allowed.contains(&case_id)
        {
            return Admission::Excluded(Exclusion::NotRequested);
        }

        let (merge_path, source_path) = match format {
            SourceFormat::Pdf => (path, None),
            SourceFormat::Raster => (self.convert_raster(&path), Some(path)),
        };

        Admission::Admitted(SourceDocument {
            path: merge_path,
            case_id,
            file_name,
            document_type,
            statement_date: parsed.statement_date,
            format,
            source_path,
        })
    }

    /// Converted PDF path, or the raster path itself when conversion is off
    /// or fails. An unconverted raster fails the integrity check later and
    /// takes its case down with it.
    fn convert_raster(&self, path: &Path) -> PathBuf {
        if !self.convert {
            return path.to_path_buf();
        }

        match self.converter.convert(path) {
            Ok(converted) => converted,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "raster conversion failed");
                path.to_path_buf()
            }
        }
    }

    /// Where every collected raster would be converted to. A PDF at one of
    /// these paths is the output of an earlier run.
    fn conversion_targets(&self, paths: &[PathBuf]) -> HashSet<PathBuf> {
        paths
            .iter()
            .filter(|p| p.file_name().is_some_and(|n| self.rasters.is_match(n)))
            .map(|p| self.converter.converted_path(p))
            .collect()
    }
}

/// Case-insensitive `*.<ext>` matcher for a list of extensions.
fn extension_set(extensions: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for ext in extensions {
        let ext = ext.trim_start_matches('.');
        let glob = GlobBuilder::new(&format!("*.{ext}"))
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|e| CaseMergeError::invalid_config(format!("Invalid extension '{ext}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| CaseMergeError::invalid_config(e.to_string()))
}

/// All regular files under the roots, each root walked in file-name order.
fn collect_files(roots: &[PathBuf], excluded_dirs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    // Directories that do not exist yet cannot hold anything to skip
    let excluded: Vec<PathBuf> = excluded_dirs
        .iter()
        .filter_map(|dir| dir.canonicalize().ok())
        .collect();
    let mut files = Vec::new();

    for root in roots {
        if !root.exists() {
            return Err(CaseMergeError::file_not_found(root.clone()));
        }
        if !root.is_dir() {
            return Err(CaseMergeError::not_a_directory(root.clone()));
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !entry.file_type().is_dir()
                    || !entry
                        .path()
                        .canonicalize()
                        .is_ok_and(|dir| excluded.contains(&dir))
            });

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
    }

    Ok(files)
}
