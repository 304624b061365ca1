//! HTTP response wrapper.

use std::collections::HashMap;

use reqwest::{Response, StatusCode};

/// HTTP response wrapper.
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HashMap<String, String>,
    pub(crate) response: Response,
}

impl HttpResponse {
    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(|s| s.as_str())
    }

    /// Get the filename from Content-Disposition header.
    pub fn content_disposition_filename(&self) -> Option<String> {
        self.headers
            .get("content-disposition")
            .and_then(|h| parse_content_disposition_filename(h))
    }

    /// Get response body as raw bytes.
    pub async fn bytes(self) -> Result<Vec<u8>, reqwest::Error> {
        self.response.bytes().await.map(|b| b.to_vec())
    }
}

/// Suggested filename from a Content-Disposition header value.
///
/// Accepts `filename*=UTF-8''name.csv` (preferred) and `filename="name.csv"`.
/// Only the last path component is returned; a value with nothing left after
/// its final `/` or `\` yields no suggestion.
pub fn parse_content_disposition_filename(header: &str) -> Option<String> {
    let encoded = header.find("filename*=").and_then(|start| {
        let rest = &header[start + 10..];
        let value = rest[rest.find("''")? + 2..].split([';', ' ']).next()?;
        urlencoding::decode(value)
            .ok()
            .map(|decoded| decoded.trim_matches('"').to_string())
    });
    if let Some(name) = encoded.as_deref().and_then(final_component) {
        return Some(name);
    }

    let start = header.find("filename=")?;
    let rest = &header[start + 9..];
    let value = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next()?,
        None => rest.split([';', ' ']).next()?,
    };
    final_component(value)
}

fn final_component(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next()?.trim();
    match name {
        "" | "." | ".." => None,
        name => Some(name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_disposition_quoted() {
        let header = r#"attachment; filename="scopes_for_dyson_at_2024-05-01_10_00_00_UTC.csv""#;
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("scopes_for_dyson_at_2024-05-01_10_00_00_UTC.csv".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_unquoted() {
        let header = "attachment; filename=dyson.csv";
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("dyson.csv".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_rfc5987() {
        let header = "attachment; filename*=UTF-8''dyson%20scope.csv";
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("dyson scope.csv".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_both_formats() {
        let header = r#"attachment; filename="fallback.csv"; filename*=UTF-8''preferred.csv"#;
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("preferred.csv".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_none() {
        assert_eq!(parse_content_disposition_filename("attachment"), None);
        assert_eq!(parse_content_disposition_filename("attachment; filename=\"\""), None);
    }

    #[test]
    fn test_parse_content_disposition_drops_directories() {
        let header = r#"attachment; filename="../../exports/scopes_for_dyson.csv""#;
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("scopes_for_dyson.csv".to_string())
        );

        let header = "attachment; filename*=UTF-8''..%2F..%2Fdyson.csv";
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("dyson.csv".to_string())
        );

        let header = r#"attachment; filename="C:\scopes\dyson.csv""#;
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("dyson.csv".to_string())
        );
    }

    #[test]
    fn test_parse_content_disposition_directory_only() {
        assert_eq!(parse_content_disposition_filename(r#"attachment; filename="exports/""#), None);
        assert_eq!(parse_content_disposition_filename("attachment; filename=.."), None);
    }

    #[test]
    fn test_bad_encoded_name_falls_back_to_plain() {
        let header = r#"attachment; filename="dyson.csv"; filename*=UTF-8''exports%2F"#;
        assert_eq!(
            parse_content_disposition_filename(header),
            Some("dyson.csv".to_string())
        );
    }
}
