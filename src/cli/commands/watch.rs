//! Watch all configured programs for scope updates.

use console::style;
use indicatif::ProgressBar;

use scopewatch::config::{Config, Settings};
use scopewatch::fetcher::ScopeFetcher;
use scopewatch::storage::SnapshotStore;
use scopewatch::watcher::{CheckOutcome, ProgramWatcher, WatchEvent};

use crate::cli::output::capitalize;
use crate::cli::Output;

/// Check every program in `hackerone.watch` against its stored snapshot.
pub async fn cmd_watch(settings: &Settings, config: &Config, out: &Output) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let programs = &config.hackerone.watch;
    if programs.is_empty() {
        out.message(format!(
            "{} No programs configured under hackerone.watch",
            style("!").yellow()
        ));
        return Ok(());
    }

    let fetcher = ScopeFetcher::from_config(config, settings)?;
    let store = SnapshotStore::open(&settings.state_dir)?;
    let watcher = ProgramWatcher::new(fetcher, store);

    let mut spinner: Option<ProgressBar> = None;
    let report = watcher
        .watch_all_with(programs, |event| match event {
            WatchEvent::Checking(program) => {
                out.message(format!("Checking Updates for {}", capitalize(program)));
                spinner = Some(out.spinner(format!("Fetching {}...", program)));
            }
            WatchEvent::Finished(report) => {
                if let Some(pb) = spinner.take() {
                    pb.finish_and_clear();
                }
                let name = capitalize(&report.program);
                match &report.result {
                    Ok(CheckOutcome::NewProgram { .. }) => {
                        out.message(format!(" - - Recently added program: {}\n", report.program));
                    }
                    Ok(CheckOutcome::NoUpdate { .. }) => {
                        out.message(format!("No updates on {}!\n", name));
                    }
                    Ok(CheckOutcome::Updated { identifiers, .. }) => {
                        out.message(format!("{}\n", style(format!("Updates on {}!", name)).green()));
                        for identifier in identifiers {
                            out.update(identifier);
                        }
                    }
                    Err(e) => {
                        let hint = if e.is_retryable() { " (retryable)" } else { "" };
                        out.error(format!("{}{}", e, hint));
                    }
                }
            }
        })
        .await;

    let failed = report.failures().count();
    if failed > 0 {
        tracing::warn!(
            "{} of {} programs could not be checked",
            failed,
            report.programs.len()
        );
    }

    Ok(())
}
