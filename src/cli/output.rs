//! Terminal output honouring `--only-updates`.

use std::fmt::Display;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const BANNER: &str = r"
 ___  ___ ___  _ __   _____      ____ _| |_ ___| |__
/ __|/ __/ _ \| '_ \ / _ \ \ /\ / / _` | __/ __| '_ \
\__ \ (_| (_) | |_) |  __/\ V  V / (_| | || (__| | | |
|___/\___\___/| .__/ \___| \_/\_/ \__,_|\__\___|_| |_|
              |_|
";

/// Console output. In quiet mode only update notices reach stdout.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    quiet: bool,
}

impl Output {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    pub fn banner(&self) {
        if !self.quiet {
            println!("{}", style(BANNER).cyan());
        }
    }

    /// Informational message, suppressed in quiet mode.
    pub fn message(&self, msg: impl Display) {
        if !self.quiet {
            println!("{}", msg);
        }
    }

    pub fn blank(&self) {
        self.message("");
    }

    /// An update notice. Always printed.
    pub fn update(&self, msg: impl Display) {
        println!("{}", msg);
    }

    /// Error line on stderr. Always printed.
    pub fn error(&self, msg: impl Display) {
        eprintln!("{} {}", style("✗").red(), msg);
    }

    /// Spinner while waiting on the network; hidden in quiet mode.
    pub fn spinner(&self, msg: String) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(msg);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

/// Uppercase the first letter and lowercase the rest, for program headings.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
