//! Single program scope view.

use console::style;

use scopewatch::config::{Config, Settings};
use scopewatch::eligibility::active_url_identifiers;
use scopewatch::error::ScopeError;
use scopewatch::fetcher::{ScopeFetcher, ScopeSource};
use scopewatch::platform::{Platform, ProgramSelector};

use crate::cli::Output;

/// Print the eligible URL assets of one program, optionally saving the export.
pub async fn cmd_scope(
    settings: &Settings,
    config: &Config,
    out: &Output,
    selector: &str,
    save_csv: bool,
) -> anyhow::Result<()> {
    let selector: ProgramSelector = match selector.parse() {
        Ok(sel) => sel,
        Err(e @ ScopeError::UnsupportedPlatform(_)) => {
            out.message(format!(
                "\nUse:\n\t{} for {} | Ex: scopewatch -s h1:dyson",
                Platform::HackerOne.as_str(),
                Platform::HackerOne.display_name()
            ));
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let fetcher = ScopeFetcher::from_config(config, settings)?;
    let pb = out.spinner(format!(
        "Fetching {} scope for {}...",
        selector.platform, selector.program
    ));
    let fetched = fetcher.fetch(&selector.program).await;
    pb.finish_and_clear();
    let fetched = fetched?;

    if save_csv {
        let cwd = std::env::current_dir()?;
        let path = fetched.save_to(&cwd)?;
        out.message(format!(
            "{} Saved {}",
            style("✓").green(),
            path.display()
        ));
    }

    let snapshot = fetched.parse()?;
    let identifiers = active_url_identifiers(&snapshot.rows);
    tracing::info!(
        "{}: {} rows, {} active URLs",
        selector.program,
        snapshot.len(),
        identifiers.len()
    );

    for identifier in identifiers {
        out.update(identifier);
    }

    Ok(())
}
