//! Ordering of documents inside a case.
//!
//! The primary key is always the priority tier: the index of the first
//! keyword in the [`PriorityTable`] found in the filename (case-insensitive),
//! or the table length when nothing matches. What happens inside a tier is
//! decided by the [`OrderingPolicy`].
//!
//! Both policies use a stable sort, so documents with equal keys keep the
//! order in which the scan discovered them (lexicographic path order).

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::{CaseMergeError, Result};
use crate::scan::SourceDocument;

/// Ordered list of document-type keywords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTable {
    /// Lowercased keywords, most preferred first.
    keywords: Vec<String>,
}

impl PriorityTable {
    /// Build a table from keywords, most preferred first.
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Tier of a filename; lower sorts earlier.
    ///
    /// The first keyword contained in the name wins. Names matching no
    /// keyword get `self.len()`, after every keyword tier.
    pub fn priority_of(&self, file_name: &str) -> usize {
        let name = file_name.to_lowercase();
        self.keywords
            .iter()
            .position(|keyword| name.contains(keyword.as_str()))
            .unwrap_or(self.keywords.len())
    }

    /// Number of keyword tiers.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Whether the table has no keywords.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl Default for PriorityTable {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_PRIORITY_KEYWORDS)
    }
}

/// Strategy for ordering documents within a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingPolicy {
    /// Tier first, then statement date, most recent first. Undated
    /// documents go last within their tier.
    #[default]
    DateDescending,
    /// Keyword tiers form contiguous blocks in keyword order, everything
    /// unmatched follows; dates are ignored.
    KeywordGrouped,
}

impl OrderingPolicy {
    /// Name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateDescending => "date-desc",
            Self::KeywordGrouped => "keyword-grouped",
        }
    }
}

impl FromStr for OrderingPolicy {
    type Err = CaseMergeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "date-desc" => Ok(Self::DateDescending),
            "keyword-grouped" => Ok(Self::KeywordGrouped),
            _ => Err(CaseMergeError::invalid_config(format!(
                "Invalid ordering: {s}. Must be one of: date-desc, keyword-grouped"
            ))),
        }
    }
}

impl fmt::Display for OrderingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort key derived from a document; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct OrderingKey {
    /// Priority tier.
    pub tier: usize,
    /// `true` sorts after `false`, so undated documents trail their tier.
    pub undated: bool,
    /// Reversed so later dates come first.
    pub date: Reverse<Option<NaiveDate>>,
}

/// Orders the documents of one case.
#[derive(Debug, Clone, Default)]
pub struct DocumentOrderer {
    table: PriorityTable,
    policy: OrderingPolicy,
}

impl DocumentOrderer {
    /// Create an orderer from a keyword table and a policy.
    pub fn new(table: PriorityTable, policy: OrderingPolicy) -> Self {
        Self { table, policy }
    }

    /// The active policy.
    pub fn policy(&self) -> OrderingPolicy {
        self.policy
    }

    /// Tier of a document.
    pub fn tier(&self, document: &SourceDocument) -> usize {
        self.table.priority_of(&document.file_name)
    }

    /// Compute the sort key of a document under the active policy.
    pub fn key(&self, document: &SourceDocument) -> OrderingKey {
        let tier = self.tier(document);
        match self.policy {
            OrderingPolicy::DateDescending => OrderingKey {
                tier,
                undated: document.statement_date.is_none(),
                date: Reverse(document.statement_date),
            },
            OrderingPolicy::KeywordGrouped => OrderingKey {
                tier,
                undated: false,
                date: Reverse(None),
            },
        }
    }

    /// Return the documents in merge order.
    ///
    /// Ordering an already ordered list returns it unchanged.
    pub fn order(&self, mut documents: Vec<SourceDocument>) -> Vec<SourceDocument> {
        documents.sort_by_cached_key(|doc| self.key(doc));
        documents
    }
}
