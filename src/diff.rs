//! Snapshot comparison.
//!
//! Rows are compared by full value. A row value present in both snapshots
//! drops out entirely, however many times it occurs on either side; a row
//! value present on one side only is kept with all of its occurrences.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::ScopeRow;

/// Rows present in exactly one of two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeDiff {
    /// Rows only in the new snapshot, in new-snapshot order.
    pub added: Vec<ScopeRow>,
    /// Rows only in the old snapshot, in old-snapshot order.
    pub removed: Vec<ScopeRow>,
}

impl ScopeDiff {
    /// No update between the two snapshots.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }

    /// All differing rows: new-side rows first, then old-side rows.
    pub fn rows(&self) -> impl Iterator<Item = &ScopeRow> {
        self.added.iter().chain(self.removed.iter())
    }
}

/// Compute the symmetric difference between two snapshots' rows.
pub fn compare(old: &[ScopeRow], new: &[ScopeRow]) -> ScopeDiff {
    let old_rows: HashSet<&ScopeRow> = old.iter().collect();
    let new_rows: HashSet<&ScopeRow> = new.iter().collect();

    ScopeDiff {
        added: new
            .iter()
            .filter(|row| !old_rows.contains(row))
            .cloned()
            .collect(),
        removed: old
            .iter()
            .filter(|row| !new_rows.contains(row))
            .cloned()
            .collect(),
    }
}
