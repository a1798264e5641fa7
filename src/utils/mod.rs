//! Helpers shared by the library and the binary.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{CaseMergeError, Result};
use crate::naming::is_case_id;

/// Format a byte count as a human-readable size.
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}

/// Expand glob patterns into input roots.
///
/// A pattern without glob metacharacters is kept as-is even when it does
/// not exist, so the scanner reports the missing path. A glob that matches
/// nothing is an error.
pub fn expand_inputs<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved = Vec::new();

    for pattern in patterns {
        let pattern = pattern.as_ref();

        if !pattern.contains(['*', '?', '[']) {
            resolved.push(PathBuf::from(pattern));
            continue;
        }

        let paths = glob::glob(pattern).map_err(|e| {
            CaseMergeError::invalid_config(format!("Invalid input pattern '{pattern}': {e}"))
        })?;

        let before = resolved.len();
        for entry in paths {
            let path = entry.map_err(|e| CaseMergeError::other(e.to_string()))?;
            resolved.push(path);
        }

        if resolved.len() == before {
            return Err(CaseMergeError::file_not_found(PathBuf::from(pattern)));
        }
    }

    Ok(resolved)
}

/// Parse case numbers from text.
///
/// Entries are separated by newlines or commas. Blank entries and lines
/// starting with `#` are skipped.
pub fn parse_case_list(text: &str, source: &Path) -> Result<BTreeSet<String>> {
    let mut cases = BTreeSet::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        for entry in line.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            if !is_case_id(entry) {
                return Err(CaseMergeError::InvalidCaseList {
                    path: source.to_path_buf(),
                    line_number: idx + 1,
                    details: format!("'{entry}' is not a 9-digit case number"),
                });
            }
            cases.insert(entry.to_string());
        }
    }

    Ok(cases)
}

/// Read case numbers from a file. See [`parse_case_list`].
pub fn read_case_list(path: &Path) -> Result<BTreeSet<String>> {
    let text = std::fs::read_to_string(path).map_err(|e| CaseMergeError::FailedToReadCaseList {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_case_list(&text, path)
}

/// Open a directory in the platform file browser.
///
/// Failure is logged and otherwise ignored. Returns whether the browser
/// was launched.
pub fn open_folder(path: &Path) -> bool {
    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    match Command::new(program).arg(path).spawn() {
        Ok(_) => {
            debug!(path = %path.display(), program, "opened output folder");
            true
        }
        Err(e) => {
            warn!(path = %path.display(), program, error = %e, "could not open output folder");
            false
        }
    }
}
