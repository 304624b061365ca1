//! List monitored programs.

use console::style;

use scopewatch::config::Config;
use scopewatch::platform::Platform;

use crate::cli::Output;

/// Print the configured watch list.
pub fn cmd_actives(config: &Config, out: &Output) {
    out.message(format!("{}:", style(Platform::HackerOne.display_name()).bold()));
    if config.hackerone.watch.is_empty() {
        out.message(format!(
            "  {} No programs configured under hackerone.watch",
            style("!").yellow()
        ));
    }
    for program in &config.hackerone.watch {
        out.message(format!(" * {}", program));
    }
    out.blank();
}
