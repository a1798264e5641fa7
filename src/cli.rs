//! CLI argument parsing for casemerge.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.
//!
//! # Examples
//!
//! ```no_run
//! use casemerge::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Scanning {} input folder(s)", cli.inputs.len());
//! ```

use clap::Parser;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{Config, Settings};
use crate::error::{CaseMergeError, Result};
use crate::order::OrderingPolicy;
use crate::utils::{expand_inputs, read_case_list};

/// Merge scanned case documents into one PDF per case.
///
/// casemerge walks the input folders, groups every file by the 9-digit
/// case number in its name, orders each group by document type and
/// statement date, and writes `<case>.pdf` plus a results sheet to the
/// output folder.
#[derive(Parser, Debug)]
#[command(name = "casemerge")]
#[command(version)]
#[command(about = "Merge scanned case documents into one PDF per case", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input folders to scan recursively
    ///
    /// Glob patterns are expanded.
    ///
    /// Examples:
    ///   casemerge scans/ -o merged/
    ///   casemerge "batches/2024-*" -o merged/
    #[arg(required = true, value_name = "DIR")]
    pub inputs: Vec<String>,

    /// Output folder for merged files and the results sheet
    #[arg(short, long, value_name = "DIR", env = "CASEMERGE_OUTPUT")]
    pub output: PathBuf,

    /// Only merge these case numbers (comma-separated)
    #[arg(long, value_name = "CASES", value_delimiter = ',')]
    pub cases: Vec<String>,

    /// Read case numbers to merge from a file
    ///
    /// One or more comma-separated case numbers per line. Lines starting
    /// with '#' are ignored. Combined with --cases when both are given.
    #[arg(long, value_name = "FILE")]
    pub case_list: Option<PathBuf>,

    /// How documents inside a case are ordered
    ///
    /// - date-desc: document type, then newest statement first (default)
    /// - keyword-grouped: document type blocks, dates ignored
    #[arg(long, value_name = "POLICY", default_value = "date-desc")]
    #[arg(value_parser = ["date-desc", "keyword-grouped"])]
    pub ordering: String,

    /// JSON file mapping case numbers to filing numbers
    ///
    /// Merged files whose case has a filing number are renamed to
    /// "<filing>-doc seq.pdf".
    #[arg(long, value_name = "FILE", env = "CASEMERGE_LOOKUP")]
    pub lookup: Option<PathBuf>,

    /// JSON file overriding the filename conventions
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Dry run - show the merge order of every case without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Open the output folder when the run finishes
    #[arg(long)]
    pub open: bool,

    /// Verbose output - show per-file details and run statistics
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// Expands input patterns, reads the case list and settings file, and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An input pattern matches nothing
    /// - The case list or settings file cannot be read
    /// - The ordering policy is unknown
    /// - Configuration validation fails
    pub fn to_config(&self) -> Result<Config> {
        let ordering = OrderingPolicy::from_str(&self.ordering)?;

        let settings = match self.settings {
            Some(ref path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        let config = Config {
            inputs: expand_inputs(&self.inputs)?,
            output: self.output.clone(),
            restrict_to: self.restriction()?,
            ordering,
            lookup: self.lookup.clone(),
            settings,
            dry_run: self.dry_run,
            open_output: self.open,
            verbose: self.verbose,
            quiet: self.quiet,
        };

        config.validate().map_err(|e| {
            CaseMergeError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Case numbers from `--cases` and `--case-list`, or `None` when neither
    /// was given.
    pub fn restriction(&self) -> Result<Option<BTreeSet<String>>> {
        if self.cases.is_empty() && self.case_list.is_none() {
            return Ok(None);
        }

        let mut cases: BTreeSet<String> = self
            .cases
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();

        if let Some(ref path) = self.case_list {
            cases.extend(read_case_list(path)?);
        }

        Ok(Some(cases))
    }

    /// Validate CLI arguments before processing.
    ///
    /// Checks that need no file I/O.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(CaseMergeError::invalid_config(
                "No input folders specified",
            ));
        }

        if self.inputs.iter().any(|i| i.trim().is_empty()) {
            return Err(CaseMergeError::invalid_config("Input folder cannot be empty"));
        }

        OrderingPolicy::from_str(&self.ordering)?;

        Ok(())
    }
}
