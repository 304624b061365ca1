//! Scope export rows and snapshots.
//!
//! A scope export is a CSV with one asset per row. Only four columns are
//! inspected; the rest are carried along so that row equality covers the
//! whole record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, ScopeError};

pub const IDENTIFIER_COLUMN: &str = "identifier";
pub const ASSET_TYPE_COLUMN: &str = "asset_type";
pub const BOUNTY_COLUMN: &str = "eligible_for_bounty";
pub const SUBMISSION_COLUMN: &str = "eligible_for_submission";

/// Columns every scope export must have.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    IDENTIFIER_COLUMN,
    ASSET_TYPE_COLUMN,
    BOUNTY_COLUMN,
    SUBMISSION_COLUMN,
];

/// Asset type of web targets.
pub const URL_ASSET_TYPE: &str = "URL";

/// One asset entry of a scope export.
///
/// Equality and hashing cover every column, with booleans normalized and
/// surrounding whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeRow {
    pub identifier: String,
    pub asset_type: String,
    pub eligible_for_bounty: bool,
    pub eligible_for_submission: bool,
    /// Remaining columns keyed by header name.
    pub extra: BTreeMap<String, String>,
}

impl ScopeRow {
    /// Create a row with no passthrough columns.
    pub fn new(identifier: &str, asset_type: &str, bounty: bool, submission: bool) -> Self {
        Self {
            identifier: identifier.to_string(),
            asset_type: asset_type.to_string(),
            eligible_for_bounty: bounty,
            eligible_for_submission: submission,
            extra: BTreeMap::new(),
        }
    }

    /// Eligible for both bounty payment and submission.
    pub fn is_eligible(&self) -> bool {
        self.eligible_for_bounty && self.eligible_for_submission
    }

    pub fn is_url(&self) -> bool {
        self.asset_type == URL_ASSET_TYPE
    }
}

/// Parse a boolean cell the way exports spell them.
///
/// Empty cells count as false.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" | "" => Some(false),
        _ => None,
    }
}

/// A program's scope at a point in time.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeSnapshot {
    pub program: String,
    /// Header row, in file order.
    pub columns: Vec<String>,
    pub rows: Vec<ScopeRow>,
    pub captured_at: DateTime<Utc>,
}

impl ScopeSnapshot {
    /// Parse a CSV scope export.
    pub fn from_csv(program: &str, body: &str, captured_at: DateTime<Utc>) -> Result<Self> {
        let body = body.strip_prefix('\u{feff}').unwrap_or(body);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(body.as_bytes());

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| ScopeError::parse(program, e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let index_of = |name: &str| -> Result<usize> {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| ScopeError::parse(program, format!("missing column {}", name)))
        };
        let identifier_idx = index_of(IDENTIFIER_COLUMN)?;
        let asset_type_idx = index_of(ASSET_TYPE_COLUMN)?;
        let bounty_idx = index_of(BOUNTY_COLUMN)?;
        let submission_idx = index_of(SUBMISSION_COLUMN)?;

        let mut rows = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| ScopeError::parse(program, e.to_string()))?;
            let cell = |idx: usize| record.get(idx).unwrap_or("").trim();

            let flag = |idx: usize, column: &str| -> Result<bool> {
                parse_bool(cell(idx)).ok_or_else(|| {
                    ScopeError::parse(
                        program,
                        format!(
                            "row {}: {} is not a boolean: '{}'",
                            line + 1,
                            column,
                            cell(idx)
                        ),
                    )
                })
            };

            let extra = columns
                .iter()
                .enumerate()
                .filter(|(idx, _)| {
                    ![identifier_idx, asset_type_idx, bounty_idx, submission_idx].contains(idx)
                })
                .map(|(idx, name)| (name.clone(), cell(idx).to_string()))
                .collect();

            rows.push(ScopeRow {
                identifier: cell(identifier_idx).to_string(),
                asset_type: cell(asset_type_idx).to_string(),
                eligible_for_bounty: flag(bounty_idx, BOUNTY_COLUMN)?,
                eligible_for_submission: flag(submission_idx, SUBMISSION_COLUMN)?,
                extra,
            });
        }

        Ok(Self {
            program: program.to_string(),
            columns,
            rows,
            captured_at,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
