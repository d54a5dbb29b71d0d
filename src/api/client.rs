//! HTTP client for the remote content API.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::time::sleep;

use crate::api::types::{
    PostResponse, ProfileInfo, ProfilePageResponse, ProfileResponse, TagPageResponse,
};
use crate::error::{Error, Result};
use crate::media::MediaRecord;
use crate::pages::Page;

/// Default API base URL.
const API_BASE: &str = "https://www.instagram.com";

/// Number of items requested per page.
pub const PAGE_SIZE: u32 = 50;

/// Query hash for profile timeline pagination.
const PROFILE_QUERY_HASH: &str = "472f257a40c653c64c666ce877d59d2b";

/// Query hash for tag feed pagination.
const TAG_QUERY_HASH: &str = "298b92c8d7cad703f7565aa892ede943";

/// Explicit retry policy for remote fetches.
///
/// Transient failures (connect errors, 5xx, 429) are retried up to
/// `attempts` times with a jittered delay growing linearly per attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Sleep before the given retry attempt (1-based).
    async fn backoff(&self, attempt: u32) {
        let base = self.base_delay.as_millis() as u64 * attempt as u64;
        let jitter = rand::thread_rng().gen_range(0..=base / 2 + 1);
        sleep(Duration::from_millis(base + jitter)).await;
    }
}

/// Single-item detailed record lookup.
///
/// Used by the discovery engine to replace summary records with their
/// detailed form, and by single-post sources.
#[async_trait]
pub trait PostInfoSource: Send + Sync {
    async fn get_post_info(&self, shortcode: &str) -> Result<MediaRecord>;
}

/// API client shared by the discovery thread and all download workers.
///
/// The underlying `reqwest::Client` is safe for concurrent use, so one
/// instance serves the whole pool.
pub struct ApiClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl ApiClient {
    /// Create a new client with the given user agent, request timeout and
    /// retry policy.
    pub fn new(user_agent: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: API_BASE.to_string(),
            retry,
        })
    }

    /// Point the client at a different base URL. Used by tests.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Resolve a username to its profile info (owner ID).
    pub async fn resolve_profile(&self, username: &str) -> Result<ProfileInfo> {
        let url = format!("{}/{}/?__a=1", self.base_url, username);
        let response = self.get_with_retry(&url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::AccountNotFound(username.to_string()));
        }

        let body: ProfileResponse = Self::decode(response).await?;
        Ok(body.graphql.user)
    }

    /// Fetch one page of a profile timeline.
    pub async fn profile_page(&self, owner_id: &str, cursor: Option<&str>) -> Result<Page> {
        let variables = json!({
            "id": owner_id,
            "first": PAGE_SIZE,
            "after": cursor,
        });
        let url = self.graphql_url(PROFILE_QUERY_HASH, &variables)?;

        let response = self.get_with_retry(&url).await?;
        let body: ProfilePageResponse = Self::decode(response).await?;
        Ok(body.data.user.edge_owner_to_timeline_media.into_page())
    }

    /// Fetch one page of a tag feed.
    pub async fn tag_page(&self, tag: &str, cursor: Option<&str>) -> Result<Page> {
        let variables = json!({
            "tag_name": tag,
            "first": PAGE_SIZE,
            "after": cursor,
        });
        let url = self.graphql_url(TAG_QUERY_HASH, &variables)?;

        let response = self.get_with_retry(&url).await?;
        let body: TagPageResponse = Self::decode(response).await?;
        Ok(body.data.hashtag.edge_hashtag_to_media.into_page())
    }

    /// Fetch a binary payload. The response is streamed by the caller.
    pub async fn fetch(&self, url: &str) -> Result<Response> {
        let response = self.get_with_retry(url).await?;
        response
            .error_for_status()
            .map_err(|e| Error::DownloadFailed(format!("{}: {}", url, e)))
    }

    fn graphql_url(&self, query_hash: &str, variables: &serde_json::Value) -> Result<String> {
        let mut url = url::Url::parse(&format!("{}/graphql/query/", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("query_hash", query_hash)
            .append_pair("variables", &variables.to_string());
        Ok(url.into())
    }

    /// Issue a GET, retrying transient failures per the retry policy.
    async fn get_with_retry(&self, url: &str) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;

            let result = self.client.get(url).send().await;
            match result {
                Ok(response) if is_transient(response.status()) => {
                    if attempt > self.retry.attempts {
                        return Err(Error::SourceUnavailable(format!(
                            "{} returned {} after {} attempts",
                            url,
                            response.status(),
                            attempt
                        )));
                    }
                    tracing::debug!(
                        "Transient status {} from {}, retrying ({}/{})",
                        response.status(),
                        url,
                        attempt,
                        self.retry.attempts
                    );
                }
                Ok(response) => return Ok(response),
                Err(e) if attempt > self.retry.attempts => {
                    return Err(Error::SourceUnavailable(format!("{}: {}", url, e)));
                }
                Err(e) => {
                    tracing::debug!(
                        "Request to {} failed ({}), retrying ({}/{})",
                        url,
                        e,
                        attempt,
                        self.retry.attempts
                    );
                }
            }

            self.retry.backoff(attempt).await;
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = response
            .error_for_status()
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;
        response
            .json::<T>()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("malformed response: {}", e)))
    }
}

#[async_trait]
impl PostInfoSource for ApiClient {
    async fn get_post_info(&self, shortcode: &str) -> Result<MediaRecord> {
        let url = format!("{}/p/{}/?__a=1", self.base_url, shortcode);

        let fetch = async {
            let response = self.get_with_retry(&url).await?;
            let body: PostResponse = Self::decode(response).await?;
            body.into_record()
        };

        fetch.await.map_err(|e| Error::ItemFetchFailed {
            shortcode: shortcode.to_string(),
            message: e.to_string(),
        })
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}
