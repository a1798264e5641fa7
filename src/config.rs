//! Configuration module for casemerge.
//!
//! This module turns CLI arguments into a validated, normalized configuration
//! that drives a batch run. It handles:
//! - Validation of argument combinations
//! - The fixed filename conventions ([`Settings`]) and their JSON overrides
//! - Application of defaults

use anyhow::{Result, bail};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::naming::is_case_id;
use crate::order::OrderingPolicy;

/// Document-type keywords, most preferred first.
pub const DEFAULT_PRIORITY_KEYWORDS: &[&str] = &[
    "Terms",
    "Supplemental Borrower",
    "Bill Statement - CHARGE OFF",
    "Bill Statement",
    "Pay History",
    "Sales Memo",
    "GOODBYE",
    "OwnershipChain",
    "DataString",
];

/// Extensions ignored outright, whatever the name contains.
pub const DEFAULT_SKIP_EXTENSIONS: &[&str] = &["eml", "htm", "html", "xlsx"];

/// Page-based document extensions.
pub const DEFAULT_DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];

/// Single-page raster extensions converted during the scan.
pub const DEFAULT_RASTER_EXTENSIONS: &[&str] = &["tif", "tiff", "jpg", "jpeg"];

/// Default name of the results sheet written to the output directory.
pub const DEFAULT_RESULTS_FILE: &str = "merge_results.csv";

/// Default suffix appended to the stem of a converted raster file.
pub const DEFAULT_CONVERTED_SUFFIX: &str = "_converted";

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Filename conventions of the document system.
///
/// Every field has a default, so a settings file only needs the keys it
/// changes:
///
/// ```
/// use casemerge::config::Settings;
///
/// let settings: Settings =
///     serde_json::from_str(r#"{ "results_file": "results.csv" }"#).unwrap();
/// assert_eq!(settings.results_file, "results.csv");
/// assert_eq!(settings.priority_keywords[0], "Terms");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Ordered document-type keywords.
    pub priority_keywords: Vec<String>,
    /// Extensions (without dot) that are never considered.
    pub skip_extensions: Vec<String>,
    /// Page-based document extensions.
    pub document_extensions: Vec<String>,
    /// Raster image extensions.
    pub raster_extensions: Vec<String>,
    /// File name of the results sheet.
    pub results_file: String,
    /// Suffix for converted raster files.
    pub converted_suffix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            priority_keywords: owned(DEFAULT_PRIORITY_KEYWORDS),
            skip_extensions: owned(DEFAULT_SKIP_EXTENSIONS),
            document_extensions: owned(DEFAULT_DOCUMENT_EXTENSIONS),
            raster_extensions: owned(DEFAULT_RASTER_EXTENSIONS),
            results_file: DEFAULT_RESULTS_FILE.to_string(),
            converted_suffix: DEFAULT_CONVERTED_SUFFIX.to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file, falling back to defaults for missing keys.
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            crate::CaseMergeError::invalid_config(format!(
                "Cannot read settings file {}: {e}",
                path.display()
            ))
        })?;
        let settings = serde_json::from_str(&text)?;
        Ok(settings)
    }

    /// Validate the conventions.
    pub fn validate(&self) -> Result<()> {
        if self.priority_keywords.iter().any(|k| k.trim().is_empty()) {
            bail!("Priority keywords cannot be empty");
        }

        if self.document_extensions.is_empty() && self.raster_extensions.is_empty() {
            bail!("At least one document or raster extension is required");
        }

        if self.results_file.trim().is_empty() {
            bail!("Results file name cannot be empty");
        }

        if self.converted_suffix.is_empty() {
            bail!("Converted file suffix cannot be empty");
        }

        Ok(())
    }
}

/// Complete configuration for one batch run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input root directories.
    pub inputs: Vec<PathBuf>,

    /// Output directory for merged files and the results sheet.
    pub output: PathBuf,

    /// Only merge these case numbers, when set.
    pub restrict_to: Option<BTreeSet<String>>,

    /// How documents inside a case are ordered.
    pub ordering: OrderingPolicy,

    /// JSON file mapping case numbers to filing numbers.
    pub lookup: Option<PathBuf>,

    /// Filename conventions.
    pub settings: Settings,

    /// Dry run mode - plan without converting or writing.
    pub dry_run: bool,

    /// Open the output directory when the run finishes.
    pub open_output: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,
}

impl Config {
    /// Create a configuration with default conventions.
    pub fn new(inputs: Vec<PathBuf>, output: PathBuf) -> Self {
        Self {
            inputs,
            output,
            restrict_to: None,
            ordering: OrderingPolicy::default(),
            lookup: None,
            settings: Settings::default(),
            dry_run: false,
            open_output: false,
            verbose: false,
            quiet: false,
        }
    }

    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Path of the results sheet.
    pub fn results_path(&self) -> PathBuf {
        self.output.join(&self.settings.results_file)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input roots are specified
    /// - Verbose and quiet modes are both enabled
    /// - The output directory is one of the input roots
    /// - A restriction entry is not a 9-digit case number
    /// - The settings are invalid
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input directories specified");
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        for input in &self.inputs {
            if input == &self.output {
                bail!(
                    "Output directory cannot be the same as an input directory: {}",
                    self.output.display()
                );
            }
        }

        if let Some(ref cases) = self.restrict_to
            && let Some(bad) = cases.iter().find(|c| !is_case_id(c))
        {
            bail!("Not a 9-digit case number: '{bad}'");
        }

        self.settings.validate()?;

        Ok(())
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}
