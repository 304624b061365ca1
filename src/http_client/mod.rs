//! HTTP client for scope exports.

mod response;

pub use response::{parse_content_disposition_filename, HttpResponse};

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::Client;

use crate::config::Settings;

/// Sent unless the config names a different agent.
pub const USER_AGENT: &str = concat!("scopewatch/", env!("CARGO_PKG_VERSION"));

/// Thin reqwest wrapper with a timeout, user agent and header capture.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client. A blank `user_agent` falls back to [`USER_AGENT`].
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self, reqwest::Error> {
        let user_agent = user_agent
            .map(str::trim)
            .filter(|ua| !ua.is_empty())
            .unwrap_or(USER_AGENT);
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self { client })
    }

    /// Create a client from resolved settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        Self::new(settings.request_timeout(), settings.user_agent.as_deref())
    }

    /// Make a GET request, capturing response headers with lowercase names.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        let duration = start.elapsed();

        tracing::debug!(
            "GET {} -> {} in {}ms",
            url,
            response.status().as_u16(),
            duration.as_millis()
        );

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }

        Ok(HttpResponse {
            status: response.status(),
            headers,
            response,
        })
    }
}
