use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::types::{ErrorEnvelope, PlaylistItemListResponse, VideoListResponse};
use super::VideoApi;
use crate::model::{PlaylistPage, VideoMetadata};

/// Production endpoint of the YouTube Data API.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors returned by the YouTube API client.
///
/// Every variant is fatal for the run: the pipeline neither retries nor
/// recovers partial results.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Request exceeded the 30-second timeout
    #[error("Request timed out")]
    Timeout,
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {status}{}", format_message(.message))]
    HttpStatus { status: u16, message: Option<String> },
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
    /// EDGE-005: Connection closed before Content-Length bytes arrived
    #[error("Incomplete response: expected {expected} bytes, received {received}")]
    IncompleteResponse { expected: u64, received: usize },
    /// Response body was not the expected JSON shape
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// Response decoded but carried unusable values
    #[error("Malformed response: {0}")]
    Malformed(String),
    /// The configured base URL could not be parsed
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    /// SEC-002: The API key would be sent over plain HTTP
    #[error("Insecure API base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

fn format_message(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(" ({m})"))
        .unwrap_or_default()
}

/// HTTP client for the two YouTube endpoints the pipeline uses.
///
/// The API key travels as the `key` query parameter. It is never logged:
/// request URLs are not traced and transport errors are stripped of their
/// URL before being returned.
pub struct YouTubeClient {
    http: reqwest::Client,
    base: String,
    api_key: SecretString,
}

/// SEC-015: Mask the API key in Debug output.
impl std::fmt::Debug for YouTubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YouTubeClient")
            .field("base", &self.base)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl YouTubeClient {
    /// Creates a client for the production API.
    pub fn new(http: reqwest::Client, api_key: SecretString) -> Result<Self, ApiError> {
        Self::with_base_url(http, api_key, DEFAULT_API_BASE)
    }

    /// Creates a client for a custom API base URL.
    ///
    /// The base must be HTTPS; plain HTTP is only accepted for `localhost`
    /// and `127.0.0.1`, which tests use for mock servers.
    pub fn with_base_url(
        http: reqwest::Client,
        api_key: SecretString,
        base_url: &str,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        match parsed.scheme() {
            "https" => {}
            "http" if matches!(parsed.host_str(), Some("localhost" | "127.0.0.1")) => {
                tracing::warn!(base_url = %base_url, "Using non-HTTPS API base URL (localhost only)");
            }
            _ => {
                tracing::error!(base_url = %base_url, "Rejecting non-HTTPS API base URL");
                return Err(ApiError::InsecureBaseUrl);
            }
        }

        if base_url != DEFAULT_API_BASE {
            tracing::info!(base_url = %base_url, "Using custom YouTube API base URL");
        }

        Ok(Self {
            http,
            base: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/{}", self.base, resource))
            .map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))?;
        url.query_pairs_mut()
            .extend_pairs(params)
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.http.get(url).send())
            .await
            .map_err(|_| ApiError::Timeout)?
            .map_err(|e| ApiError::Network(e.without_url()))?;

        let status = response.status();
        let bytes = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorEnvelope>(&bytes)
                .ok()
                .map(|envelope| envelope.error.message)
                .filter(|m| !m.is_empty());
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl VideoApi for YouTubeClient {
    async fn playlist_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
        max_results: u32,
    ) -> Result<PlaylistPage, ApiError> {
        let max_results = max_results.to_string();
        let mut params = vec![
            ("part", "contentDetails"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        tracing::debug!(
            playlist_id = %playlist_id,
            page_token = ?page_token,
            "Requesting playlist page"
        );

        let url = self.endpoint("playlistItems", &params)?;
        let response: PlaylistItemListResponse = self.get_json(url).await?;
        PlaylistPage::try_from(response)
    }

    async fn videos(&self, ids: &[String]) -> Result<Vec<VideoMetadata>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let joined = ids.join(",");
        tracing::debug!(count = ids.len(), "Requesting video metadata");

        let url = self.endpoint(
            "videos",
            &[("part", "snippet,contentDetails"), ("id", joined.as_str())],
        )?;
        let response: VideoListResponse = self.get_json(url).await?;
        response.into_videos()
    }
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, ApiError> {
    let expected_length = response.content_length();

    // Fast path: check Content-Length header
    if let Some(len) = expected_length {
        if len > limit as u64 {
            return Err(ApiError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ApiError::Network(e.without_url()))?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    ensure_complete(expected_length, bytes.len())?;
    Ok(bytes)
}

/// EDGE-005: A body shorter than its Content-Length was cut off in transit.
fn ensure_complete(expected_length: Option<u64>, received: usize) -> Result<(), ApiError> {
    match expected_length {
        Some(expected) if (received as u64) < expected => {
            Err(ApiError::IncompleteResponse { expected, received })
        }
        _ => Ok(()),
    }
}
