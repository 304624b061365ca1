//! Program watching: fetch, snapshot, compare, filter.

use std::path::PathBuf;

use crate::diff::{self, ScopeDiff};
use crate::eligibility::eligible_identifiers;
use crate::error::{Result, ScopeError};
use crate::fetcher::ScopeSource;
use crate::storage::SnapshotStore;

/// Result of checking one program.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// First time this program was seen; its scope was stored as the baseline.
    NewProgram { snapshot: PathBuf },
    /// Scope unchanged since the last check.
    NoUpdate { snapshot: PathBuf },
    /// Scope changed. `identifiers` are the eligible changed assets.
    Updated {
        snapshot: PathBuf,
        diff: ScopeDiff,
        identifiers: Vec<String>,
    },
}

impl CheckOutcome {
    /// Path of the snapshot retained after the check.
    pub fn snapshot(&self) -> &PathBuf {
        match self {
            Self::NewProgram { snapshot }
            | Self::NoUpdate { snapshot }
            | Self::Updated { snapshot, .. } => snapshot,
        }
    }

    /// Eligible changed identifiers (empty unless updated).
    pub fn identifiers(&self) -> &[String] {
        match self {
            Self::Updated { identifiers, .. } => identifiers,
            _ => &[],
        }
    }
}

/// Outcome for a single program within a watch run.
#[derive(Debug)]
pub struct ProgramReport {
    pub program: String,
    pub result: Result<CheckOutcome>,
}

/// Progress notifications emitted while watching.
#[derive(Debug)]
pub enum WatchEvent<'a> {
    Checking(&'a str),
    Finished(&'a ProgramReport),
}

/// Results of a full watch run, in configured program order.
#[derive(Debug, Default)]
pub struct WatchReport {
    pub programs: Vec<ProgramReport>,
}

impl WatchReport {
    /// Programs whose check failed.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ScopeError)> {
        self.programs.iter().filter_map(|report| match &report.result {
            Err(e) => Some((report.program.as_str(), e)),
            Ok(_) => None,
        })
    }

    /// All eligible changed identifiers across programs.
    pub fn identifiers(&self) -> Vec<&str> {
        self.programs
            .iter()
            .filter_map(|report| report.result.as_ref().ok())
            .flat_map(|outcome| outcome.identifiers().iter().map(String::as_str))
            .collect()
    }
}

/// Checks programs against their stored snapshots.
pub struct ProgramWatcher<S> {
    source: S,
    store: SnapshotStore,
}

impl<S: ScopeSource> ProgramWatcher<S> {
    pub fn new(source: S, store: SnapshotStore) -> Self {
        Self { source, store }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Check one program for scope updates.
    ///
    /// The new export is parsed before anything on disk changes, so a
    /// malformed export leaves the prior snapshot in place. Afterwards the
    /// program directory holds exactly the newly fetched snapshot.
    pub async fn check_program(&self, program: &str) -> Result<CheckOutcome> {
        self.store.ensure_program_dir(program)?;
        let previous = self.store.previous(program)?;

        let fetched = self.source.fetch(program).await?;
        let current = fetched.parse()?;

        let Some(previous) = previous else {
            let snapshot = self.store.persist(&fetched, current.len())?;
            self.store.prune(program, &snapshot)?;
            tracing::info!("Recorded baseline for new program {}", program);
            return Ok(CheckOutcome::NewProgram { snapshot });
        };

        let prior = self.store.load(program, &previous);
        let snapshot = self.store.persist(&fetched, current.len())?;
        self.store.prune(program, &snapshot)?;
        let prior = prior?;

        let diff = diff::compare(&prior.rows, &current.rows);
        if diff.is_empty() {
            tracing::info!("No scope changes for {}", program);
            return Ok(CheckOutcome::NoUpdate { snapshot });
        }

        let identifiers = eligible_identifiers(diff.rows());
        tracing::info!(
            "{}: {} added, {} removed, {} eligible",
            program,
            diff.added.len(),
            diff.removed.len(),
            identifiers.len()
        );
        Ok(CheckOutcome::Updated {
            snapshot,
            diff,
            identifiers,
        })
    }

    /// Check every program in order. A failing program is recorded and skipped.
    pub async fn watch_all(&self, programs: &[String]) -> WatchReport {
        self.watch_all_with(programs, |_| {}).await
    }

    /// Like [`watch_all`](Self::watch_all), reporting progress as it goes.
    pub async fn watch_all_with<F>(&self, programs: &[String], mut on_event: F) -> WatchReport
    where
        F: FnMut(WatchEvent<'_>),
    {
        let mut report = WatchReport::default();
        for program in programs {
            on_event(WatchEvent::Checking(program));
            let result = self.check_program(program).await;
            if let Err(ref e) = result {
                tracing::warn!("Skipping {}: {}", program, e);
            }
            let program_report = ProgramReport {
                program: program.clone(),
                result,
            };
            on_event(WatchEvent::Finished(&program_report));
            report.programs.push(program_report);
        }
        report
    }
}
