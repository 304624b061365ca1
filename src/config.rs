//! Configuration management for scopewatch.
//!
//! The config file is read once at startup into a [`Config`], then folded into
//! [`Settings`] which carries resolved paths and request options. Both are
//! passed explicitly to the fetcher and watcher.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScopeError};

/// Application name, used for the config directory.
pub const APP_NAME: &str = "scopewatch";

/// Placeholder substituted with the program name in `hackerone.baseUrl`.
pub const PROGRAM_PLACEHOLDER: &str = "$PROGRAM$";

/// Default config filename, both in the config dir and as the bundled default.
pub const DEFAULT_CONFIG_FILENAME: &str = "config.yaml";

/// Snapshot state subdirectory inside the config dir.
const STATE_SUBDIR: &str = "db";

/// Default request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// HackerOne platform section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HackerOneConfig {
    /// Scope export URL template containing `$PROGRAM$`.
    #[serde(rename = "baseUrl", alias = "base_url")]
    pub base_url: String,
    /// Programs polled in watch mode, in order.
    #[serde(default)]
    pub watch: Vec<String>,
}

impl HackerOneConfig {
    /// Build the export URL for a program.
    pub fn scope_url(&self, program: &str) -> String {
        self.base_url
            .replace(PROGRAM_PLACEHOLDER, &urlencoding::encode(program))
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub hackerone: HackerOneConfig,
    /// Snapshot state directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// User agent sent with export requests; unset for `scopewatch/<version>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a specific file path.
    /// YAML is the default; TOML and JSON are picked by file extension.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScopeError::ConfigMissing {
                    path: path.to_path_buf(),
                }
            } else {
                ScopeError::io(path, e)
            }
        })?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse config contents, using `path` for format detection and errors.
    pub fn parse(contents: &str, path: &Path) -> Result<Self> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");
        let parse_err = |message: String| ScopeError::ConfigParse {
            path: path.to_path_buf(),
            message,
        };

        let config: Config = match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| parse_err(format!("Failed to parse TOML config: {}", e)))?,
            "json" => serde_json::from_str(contents)
                .map_err(|e| parse_err(format!("Failed to parse JSON config: {}", e)))?,
            _ => serde_yaml::from_str(contents)
                .map_err(|e| parse_err(format!("Failed to parse YAML config: {}", e)))?,
        };

        if !config.hackerone.base_url.contains(PROGRAM_PLACEHOLDER) {
            return Err(parse_err(format!(
                "hackerone.baseUrl must contain {}",
                PROGRAM_PLACEHOLDER
            )));
        }

        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref state_dir) = self.state_dir {
            settings.state_dir = self.resolve_path(state_dir, base_dir);
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
    }
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the user's config file.
    pub config_dir: PathBuf,
    /// Directory holding per-program snapshot directories and the manifest.
    pub state_dir: PathBuf,
    /// User agent override (see `http_client::USER_AGENT` for the default).
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    pub request_timeout: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let config_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_NAME);
        Self::with_config_dir(config_dir)
    }
}

impl Settings {
    /// Create settings rooted at a custom config directory.
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        Self {
            state_dir: config_dir.join(STATE_SUBDIR),
            config_dir,
            user_agent: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Path of the user's config file.
    pub fn default_config_path(&self) -> PathBuf {
        self.config_dir.join(DEFAULT_CONFIG_FILENAME)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Ensure the state directory exists.
    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.state_dir).map_err(|e| ScopeError::io(&self.state_dir, e))
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (relative paths resolve from CWD).
    pub config_path: Option<PathBuf>,
    /// Override for the user config directory (defaults to `~/.config/scopewatch`).
    pub config_dir: Option<PathBuf>,
    /// Bundled default copied into the config dir on first run
    /// (defaults to `config.yaml` in the CWD).
    pub bundled_default: Option<PathBuf>,
    /// State directory taking precedence over the config file
    /// (relative paths resolve from CWD).
    pub state_dir: Option<PathBuf>,
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Find the config file to load, bootstrapping the user copy if needed.
///
/// An explicit path must exist. Otherwise the user config is used, copied
/// from the bundled default when it does not exist yet.
pub fn locate_config(options: &LoadOptions, settings: &Settings) -> Result<PathBuf> {
    if let Some(ref path) = options.config_path {
        let path = if path.is_absolute() {
            path.clone()
        } else {
            current_dir().join(path)
        };
        if !path.is_file() {
            return Err(ScopeError::ConfigMissing { path });
        }
        return Ok(path);
    }

    let config_file = settings.default_config_path();
    if config_file.is_file() {
        return Ok(config_file);
    }

    fs::create_dir_all(&settings.config_dir).map_err(|e| ScopeError::io(&settings.config_dir, e))?;

    let bundled = options
        .bundled_default
        .clone()
        .unwrap_or_else(|| current_dir().join(DEFAULT_CONFIG_FILENAME));
    if !bundled.is_file() {
        return Err(ScopeError::ConfigMissing { path: config_file });
    }

    fs::copy(&bundled, &config_file).map_err(|e| ScopeError::io(&config_file, e))?;
    tracing::info!(
        "Copied default config {} to {}",
        bundled.display(),
        config_file.display()
    );

    Ok(config_file)
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub fn load_settings_with_options(options: LoadOptions) -> Result<(Settings, Config)> {
    let mut settings = match options.config_dir {
        Some(ref dir) => Settings::with_config_dir(dir.clone()),
        None => Settings::default(),
    };

    let config_path = locate_config(&options, &settings)?;
    tracing::debug!("Loading config from {}", config_path.display());
    let config = Config::load_from_path(&config_path)?;

    let base_dir = config.base_dir().unwrap_or_else(current_dir);
    config.apply_to_settings(&mut settings, &base_dir);

    if let Some(ref state_dir) = options.state_dir {
        tracing::debug!("Using state directory override: {}", state_dir.display());
        settings.state_dir = config.resolve_path(&state_dir.to_string_lossy(), &current_dir());
    }

    Ok((settings, config))
}
