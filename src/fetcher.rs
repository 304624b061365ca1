//! Scope export fetching.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::config::{Config, HackerOneConfig, Settings};
use crate::error::{Result, ScopeError};
use crate::http_client::HttpClient;
use crate::models::ScopeSnapshot;
use crate::storage::sanitize_filename;

/// A scope export as downloaded, before parsing.
#[derive(Debug, Clone)]
pub struct FetchedScope {
    pub program: String,
    /// Raw CSV body.
    pub body: String,
    /// Suggested filename: Content-Disposition if present, else `<program>.csv`.
    pub filename: String,
    pub fetched_at: DateTime<Utc>,
}

impl FetchedScope {
    pub fn new(program: &str, body: String, filename: Option<String>) -> Self {
        Self {
            program: program.to_string(),
            body,
            filename: filename.unwrap_or_else(|| default_filename(program)),
            fetched_at: Utc::now(),
        }
    }

    /// Parse the body into a snapshot.
    pub fn parse(&self) -> Result<ScopeSnapshot> {
        ScopeSnapshot::from_csv(&self.program, &self.body, self.fetched_at)
    }

    /// Write the raw body into `dir` under the suggested filename.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(sanitize_filename(&self.filename));
        std::fs::write(&path, self.body.as_bytes()).map_err(|e| ScopeError::io(&path, e))?;
        Ok(path)
    }
}

/// Fallback filename for an export.
pub fn default_filename(program: &str) -> String {
    format!("{}.csv", program)
}

/// Anything that can produce a program's current scope export.
#[async_trait]
pub trait ScopeSource: Send + Sync {
    async fn fetch(&self, program: &str) -> Result<FetchedScope>;
}

#[async_trait]
impl<T: ScopeSource + ?Sized> ScopeSource for Arc<T> {
    async fn fetch(&self, program: &str) -> Result<FetchedScope> {
        (**self).fetch(program).await
    }
}

/// Fetches HackerOne scope exports over HTTP.
pub struct ScopeFetcher {
    client: HttpClient,
    hackerone: HackerOneConfig,
}

impl ScopeFetcher {
    pub fn new(client: HttpClient, hackerone: HackerOneConfig) -> Self {
        Self { client, hackerone }
    }

    pub fn from_config(config: &Config, settings: &Settings) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            HttpClient::from_settings(settings)?,
            config.hackerone.clone(),
        ))
    }

    pub fn scope_url(&self, program: &str) -> String {
        self.hackerone.scope_url(program)
    }
}

#[async_trait]
impl ScopeSource for ScopeFetcher {
    async fn fetch(&self, program: &str) -> Result<FetchedScope> {
        if program.trim().is_empty() {
            return Err(ScopeError::BadArgument("program name is empty".to_string()));
        }

        let url = self.scope_url(program);
        tracing::info!("Fetching scope for {} from {}", program, url);

        let transport = |source: reqwest::Error| ScopeError::Transport {
            program: program.to_string(),
            retryable: source.is_timeout() || source.is_connect() || source.is_request(),
            source,
        };

        let response = self.client.get(&url).await.map_err(transport)?;
        if !response.is_success() {
            return Err(ScopeError::Fetch {
                program: program.to_string(),
                status: response.status,
            });
        }

        if let Some(content_type) = response.content_type() {
            tracing::debug!("{} export content-type: {}", program, content_type);
        }
        let filename = response.content_disposition_filename();
        let bytes = response.bytes().await.map_err(transport)?;
        let body = String::from_utf8(bytes)
            .map_err(|e| ScopeError::parse(program, format!("body is not UTF-8: {}", e)))?;

        Ok(FetchedScope::new(program, body, filename))
    }
}
