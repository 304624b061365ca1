//! Manifest entries identifying each program's stored snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The snapshot currently retained for a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// File name inside the program directory.
    pub file_name: String,
    /// When the export was fetched.
    pub captured_at: DateTime<Utc>,
    /// SHA-256 of the raw export body.
    pub sha256: String,
    /// Number of data rows.
    pub rows: usize,
}

impl SnapshotEntry {
    pub fn new(file_name: String, body: &[u8], captured_at: DateTime<Utc>, rows: usize) -> Self {
        Self {
            file_name,
            captured_at,
            sha256: Self::compute_hash(body),
            rows,
        }
    }

    /// Compute SHA-256 hash of content.
    pub fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }
}
