//! Filename conventions for scanned case documents.
//!
//! Every usable file carries a 9-digit case number somewhere in its name.
//! Files exported by the document system additionally follow a structured
//! template:
//!
//! ```text
//! 123456789 - Pay History - 1_1_2020 - Stm. Date - 5_1_2020 - 123456789.pdf
//! ```
//!
//! from which a document type and the statement date can be read. Dates are
//! written `M_D_YYYY` with one- or two-digit month and day.
//!
//! # Examples
//!
//! ```
//! use casemerge::naming::parse_file_name;
//!
//! let parsed = parse_file_name(
//!     "123456789 - Terms - 1_1_2020 - Stm. Date - 6_1_2020 - 123456789.pdf",
//! )
//! .unwrap();
//! assert_eq!(parsed.case_id.as_deref(), Some("123456789"));
//! assert_eq!(parsed.document_type(), Some("Terms"));
//! ```

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{CaseMergeError, Result};

/// Length of a case number.
pub const CASE_ID_LEN: usize = 9;

const DATE_FORMAT: &str = "%m_%d_%Y";

static STRUCTURED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(\d{9}) - (.+?) - (\d{1,2}_\d{1,2}_\d{4}) - Stm\. Date - (\d{1,2}_\d{1,2}_\d{4}) - (\d{9})",
    )
    .expect("structured name pattern is valid")
});

static STATEMENT_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Stm\. Date - (\d{1,2}_\d{1,2}_\d{4})").expect("statement date pattern is valid")
});

/// Fields of a name that follows the structured template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredName {
    /// Leading case number.
    pub leading_id: String,
    /// Free-text document type, e.g. `Bill Statement`.
    pub document_type: String,
    /// First date in the template.
    pub document_date: NaiveDate,
    /// Date following `Stm. Date`.
    pub statement_date: NaiveDate,
    /// Trailing case number.
    pub trailing_id: String,
}

/// Everything the filename tells us about a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedName {
    /// First run of exactly nine digits, if any.
    pub case_id: Option<String>,
    /// Present only when the whole structured template matched.
    pub structured: Option<StructuredName>,
    /// Statement date, read independently of the structured template.
    pub statement_date: Option<NaiveDate>,
}

impl ParsedName {
    /// Document type label from the structured template.
    pub fn document_type(&self) -> Option<&str> {
        self.structured.as_ref().map(|s| s.document_type.as_str())
    }
}

/// Parse a filename into its case number, document type and statement date.
///
/// A name without a case number parses successfully with `case_id: None`;
/// the caller excludes such files. A date that matches the `M_D_YYYY` shape
/// but is not a real calendar date is an error for that file.
pub fn parse_file_name(name: &str) -> Result<ParsedName> {
    let case_id = extract_case_id(name).map(str::to_string);

    let structured = match STRUCTURED_NAME.captures(name) {
        Some(caps) => Some(StructuredName {
            leading_id: caps[1].to_string(),
            document_type: caps[2].to_string(),
            document_date: parse_date(name, &caps[3])?,
            statement_date: parse_date(name, &caps[4])?,
            trailing_id: caps[5].to_string(),
        }),
        None => None,
    };

    let statement_date = match STATEMENT_DATE.captures(name) {
        Some(caps) => Some(parse_date(name, &caps[1])?),
        None => None,
    };

    Ok(ParsedName {
        case_id,
        structured,
        statement_date,
    })
}

/// Return the first run of exactly nine consecutive ASCII digits.
///
/// Longer digit runs do not count; `1234567890` holds no case number.
pub fn extract_case_id(name: &str) -> Option<&str> {
    name.split(|c: char| !c.is_ascii_digit())
        .find(|run| run.len() == CASE_ID_LEN)
}

/// Check that a string is a bare case number.
pub fn is_case_id(value: &str) -> bool {
    value.len() == CASE_ID_LEN && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_date(name: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        CaseMergeError::InvalidFileNameDate {
            name: name.to_string(),
            value: value.to_string(),
        }
    })
}
