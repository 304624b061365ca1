//! On-disk snapshot storage.
//!
//! Layout:
//! `{state_dir}/manifest.json` records which file is each program's current
//! snapshot, and `{state_dir}/{program}/{filename}` holds the export itself.
//! Directories without a manifest entry fall back to the most recently
//! modified file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScopeError};
use crate::fetcher::FetchedScope;
use crate::models::{ScopeSnapshot, SnapshotEntry};

pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Program name to current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub programs: BTreeMap<String, SnapshotEntry>,
}

/// Where a program's prior snapshot lives and when it was taken.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviousSnapshot {
    pub path: PathBuf,
    pub captured_at: DateTime<Utc>,
    /// Whether the manifest (rather than a directory scan) identified it.
    pub from_manifest: bool,
}

/// Make a name safe to use as a single path component.
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = sanitized
        .trim()
        .trim_start_matches(['.', '_'])
        .trim_end_matches('_');
    if trimmed.is_empty() {
        "scope".to_string()
    } else {
        trimmed.chars().take(150).collect()
    }
}

/// Check that a program name can be used as its own directory name.
///
/// Names that `sanitize_filename` would rewrite are rejected, so two
/// programs can never share a directory or a manifest entry.
pub fn validate_program_name(program: &str) -> Result<()> {
    if program.trim().is_empty() {
        return Err(ScopeError::BadArgument("program name is empty".to_string()));
    }
    if sanitize_filename(program) != program {
        return Err(ScopeError::BadArgument(format!(
            "program name '{}' is not usable as a directory name",
            program
        )));
    }
    Ok(())
}

/// Snapshot directories and manifest under one state directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    state_dir: PathBuf,
}

impl SnapshotStore {
    /// Open a store, creating the state directory if needed.
    pub fn open(state_dir: impl Into<PathBuf>) -> Result<Self> {
        let state_dir = state_dir.into();
        fs::create_dir_all(&state_dir).map_err(|e| ScopeError::io(&state_dir, e))?;
        Ok(Self { state_dir })
    }

    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }

    pub fn program_dir(&self, program: &str) -> PathBuf {
        self.state_dir.join(sanitize_filename(program))
    }

    fn manifest_path(&self) -> PathBuf {
        self.state_dir.join(MANIFEST_FILENAME)
    }

    /// Locate or create a program's snapshot directory.
    pub fn ensure_program_dir(&self, program: &str) -> Result<PathBuf> {
        validate_program_name(program)?;
        let dir = self.program_dir(program);
        fs::create_dir_all(&dir).map_err(|e| ScopeError::io(&dir, e))?;
        Ok(dir)
    }

    /// Load the manifest. A missing or unreadable manifest is treated as empty.
    pub fn load_manifest(&self) -> Manifest {
        let path = self.manifest_path();
        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Manifest::default(),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return Manifest::default();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(
                "Ignoring corrupt manifest {}: {}; falling back to directory scan",
                path.display(),
                e
            );
            Manifest::default()
        })
    }

    /// Write the manifest via a temp file and rename.
    fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        let path = self.manifest_path();
        let tmp = self.state_dir.join(format!("{}.tmp", MANIFEST_FILENAME));
        let json = serde_json::to_string_pretty(manifest).map_err(|e| {
            ScopeError::io(&path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        fs::write(&tmp, json).map_err(|e| ScopeError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| ScopeError::io(&path, e))
    }

    /// Snapshot files currently in a program's directory.
    pub fn snapshot_files(&self, program: &str) -> Result<Vec<PathBuf>> {
        let dir = self.program_dir(program);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|e| ScopeError::io(&dir, e))? {
            let entry = entry.map_err(|e| ScopeError::io(&dir, e))?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    /// Find the program's prior snapshot, if any.
    pub fn previous(&self, program: &str) -> Result<Option<PreviousSnapshot>> {
        if let Some(entry) = self.load_manifest().programs.get(program) {
            let path = self.program_dir(program).join(&entry.file_name);
            if path.is_file() {
                return Ok(Some(PreviousSnapshot {
                    path,
                    captured_at: entry.captured_at,
                    from_manifest: true,
                }));
            }
            tracing::warn!(
                "Manifest entry for {} points at missing file {}",
                program,
                path.display()
            );
        }

        let mut newest: Option<(PathBuf, std::time::SystemTime)> = None;
        for path in self.snapshot_files(program)? {
            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .map_err(|e| ScopeError::io(&path, e))?;
            if newest.as_ref().map_or(true, |(_, t)| modified > *t) {
                newest = Some((path, modified));
            }
        }

        Ok(newest.map(|(path, modified)| PreviousSnapshot {
            path,
            captured_at: DateTime::<Utc>::from(modified),
            from_manifest: false,
        }))
    }

    /// Read and parse a prior snapshot.
    pub fn load(&self, program: &str, previous: &PreviousSnapshot) -> Result<ScopeSnapshot> {
        let body =
            fs::read_to_string(&previous.path).map_err(|e| ScopeError::io(&previous.path, e))?;
        ScopeSnapshot::from_csv(program, &body, previous.captured_at)
    }

    /// Persist a fetched export as the program's current snapshot.
    pub fn persist(&self, fetched: &FetchedScope, rows: usize) -> Result<PathBuf> {
        let dir = self.ensure_program_dir(&fetched.program)?;
        let file_name = sanitize_filename(&fetched.filename);
        let path = dir.join(&file_name);
        fs::write(&path, fetched.body.as_bytes()).map_err(|e| ScopeError::io(&path, e))?;

        let mut manifest = self.load_manifest();
        manifest.programs.insert(
            fetched.program.clone(),
            SnapshotEntry::new(file_name, fetched.body.as_bytes(), fetched.fetched_at, rows),
        );
        self.save_manifest(&manifest)?;

        tracing::debug!("Stored {} snapshot at {}", fetched.program, path.display());
        Ok(path)
    }

    /// Delete every snapshot file of a program except `keep`.
    /// Returns the removed paths.
    pub fn prune(&self, program: &str, keep: &Path) -> Result<Vec<PathBuf>> {
        let mut removed = Vec::new();
        for path in self.snapshot_files(program)? {
            if path == keep {
                continue;
            }
            fs::remove_file(&path).map_err(|e| ScopeError::io(&path, e))?;
            tracing::debug!("Removed old snapshot {}", path.display());
            removed.push(path);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const EXPORT: &str = "identifier,asset_type,eligible_for_bounty,eligible_for_submission\na.com,URL,true,true\n";

    fn fetched(program: &str, filename: &str) -> FetchedScope {
        FetchedScope::new(program, EXPORT.to_string(), Some(filename.to_string()))
    }

    #[test]
    fn test_validate_program_name() {
        assert!(validate_program_name("dyson").is_ok());
        assert!(validate_program_name("security-team_2").is_ok());
        for bad in ["", "  ", "a:b", "../dyson", ".hidden", "a/b"] {
            let err = validate_program_name(bad).unwrap_err();
            assert!(matches!(err, ScopeError::BadArgument(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_colliding_names_cannot_share_directory() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();

        let err = store.persist(&fetched("a:b", "a:b.csv"), 1).unwrap_err();
        assert!(matches!(err, ScopeError::BadArgument(_)));

        assert!(store.previous("a_b").unwrap().is_none());
        assert!(store.load_manifest().programs.is_empty());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("dyson.csv"), "dyson.csv");
        assert_eq!(sanitize_filename("../secret"), "secret");
        assert_eq!(sanitize_filename("a/b:c.csv"), "a_b_c.csv");
        assert_eq!(sanitize_filename(".."), "scope");
        assert_eq!(sanitize_filename(""), "scope");
    }

    #[test]
    fn test_no_previous_for_new_program() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        store.ensure_program_dir("dyson").unwrap();
        assert_eq!(store.previous("dyson").unwrap(), None);
    }

    #[test]
    fn test_persist_records_manifest_entry() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        let scope = fetched("dyson", "scopes_dyson.csv");

        let path = store.persist(&scope, 1).unwrap();
        assert_eq!(path, dir.path().join("dyson").join("scopes_dyson.csv"));

        let manifest = store.load_manifest();
        let entry = manifest.programs.get("dyson").unwrap();
        assert_eq!(entry.file_name, "scopes_dyson.csv");
        assert_eq!(entry.rows, 1);
        assert_eq!(entry.captured_at, scope.fetched_at);

        let previous = store.previous("dyson").unwrap().unwrap();
        assert!(previous.from_manifest);
        assert_eq!(previous.path, path);
        assert_eq!(store.load("dyson", &previous).unwrap().len(), 1);
    }

    #[test]
    fn test_previous_falls_back_to_newest_file() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        let program_dir = store.ensure_program_dir("legacy").unwrap();

        let older = program_dir.join("old.csv");
        let newer = program_dir.join("new.csv");
        fs::write(&older, EXPORT).unwrap();
        fs::write(&newer, EXPORT).unwrap();
        let past = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
        fs::File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let previous = store.previous("legacy").unwrap().unwrap();
        assert!(!previous.from_manifest);
        assert_eq!(previous.path, newer);
    }

    #[test]
    fn test_corrupt_manifest_is_ignored() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        fs::write(dir.path().join(MANIFEST_FILENAME), "{not json").unwrap();
        assert_eq!(store.load_manifest(), Manifest::default());

        store.persist(&fetched("dyson", "dyson.csv"), 1).unwrap();
        assert!(store.load_manifest().programs.contains_key("dyson"));
    }

    #[test]
    fn test_prune_keeps_only_current() {
        let dir = tempdir().unwrap();
        let store = SnapshotStore::open(dir.path()).unwrap();
        let first = store.persist(&fetched("dyson", "one.csv"), 1).unwrap();
        let second = store.persist(&fetched("dyson", "two.csv"), 1).unwrap();

        let removed = store.prune("dyson", &second).unwrap();
        assert_eq!(removed, vec![first]);
        assert_eq!(store.snapshot_files("dyson").unwrap(), vec![second]);
    }
}
