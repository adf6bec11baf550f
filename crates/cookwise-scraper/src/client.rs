//! HTTP fetch collaborator shared by both source adapters.
//!
//! Callers await each request to completion before issuing the next one;
//! nothing here runs requests concurrently.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};

use crate::error::ScraperError;

const HTML_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const JSON_ACCEPT: &str = "application/json";

/// HTTP client with the fixed header set and per-call timeout both sources use.
///
/// Non-2xx responses surface as [`ScraperError::UnexpectedStatus`]; timeouts
/// and transport failures as [`ScraperError::Http`]. Nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    accept_language: String,
}

impl HttpFetcher {
    /// Creates a fetcher with the given overall timeout, `User-Agent`, and
    /// `Accept-Language`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        accept_language: &str,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            accept_language: accept_language.to_owned(),
        })
    }

    /// Fetches an HTML page as text.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx status.
    /// - [`ScraperError::Http`] on timeout or network failure.
    pub async fn get_html(&self, url: &str) -> Result<String, ScraperError> {
        let request = self.client.get(url).header(reqwest::header::ACCEPT, HTML_ACCEPT);
        let response = self.send(request, url).await?;
        Ok(response.text().await?)
    }

    /// Fetches a JSON document with `GET`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx status.
    /// - [`ScraperError::Http`] on timeout or network failure.
    /// - [`ScraperError::Deserialize`] if the body is not JSON.
    pub async fn get_json(&self, url: &str) -> Result<serde_json::Value, ScraperError> {
        let request = self.client.get(url).header(reqwest::header::ACCEPT, JSON_ACCEPT);
        let response = self.send(request, url).await?;
        Self::decode_json(response, url).await
    }

    /// Sends `body` as JSON with `POST` and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] for any non-2xx status.
    /// - [`ScraperError::Http`] on timeout or network failure.
    /// - [`ScraperError::Deserialize`] if the body is not JSON.
    pub async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ScraperError> {
        let request = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, JSON_ACCEPT)
            .json(body);
        let response = self.send(request, url).await?;
        Self::decode_json(response, url).await
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response, ScraperError> {
        let response = request
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.accept_language)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        Ok(response)
    }

    async fn decode_json(
        response: Response,
        url: &str,
    ) -> Result<serde_json::Value, ScraperError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ScraperError::Deserialize {
            context: format!("response from {url}"),
            source: e,
        })
    }
}

/// Joins an origin and an absolute path, tolerating a trailing slash on the
/// origin. Absolute URLs in `path` are returned unchanged.
///
/// # Errors
///
/// Returns [`ScraperError::InvalidUrl`] if the result does not parse as a URL.
pub fn join_url(base: &str, path: &str) -> Result<String, ScraperError> {
    let joined = if path.starts_with("http://") || path.starts_with("https://") {
        path.to_owned()
    } else {
        format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    };

    reqwest::Url::parse(&joined).map_err(|e| ScraperError::InvalidUrl {
        url: joined.clone(),
        reason: e.to_string(),
    })?;

    Ok(joined)
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
