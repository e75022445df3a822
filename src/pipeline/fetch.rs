//! Board-page retrieval.
//!
//! The fetch stage is the first of the two fatal phases: if the board
//! page cannot be retrieved, the run aborts before any geocoding happens.
//! A not-found response is distinguished from other transport failures
//! only for messaging — both abort the run.
//!
//! The stage is a trait so tests and embedders can feed the pipeline a
//! canned page body without a server.

use crate::error::MapinterestError;
use async_trait::async_trait;
use tracing::{debug, info};

/// Retrieves the raw HTML body of a board page.
///
/// Returns the body as a string rather than a parsed document: the
/// extraction stage parses and immediately materialises typed records, so
/// no document handle needs to live across an await point.
#[async_trait]
pub trait BoardFetcher: Send + Sync {
    async fn fetch(&self, username: &str, board: &str) -> Result<String, MapinterestError>;
}

/// HTTP implementation of [`BoardFetcher`] against a configurable base URL.
pub struct HttpBoardFetcher {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl HttpBoardFetcher {
    /// Build a fetcher with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, MapinterestError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| MapinterestError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            timeout_secs,
        })
    }

    fn board_url(&self, username: &str, board: &str) -> String {
        format!(
            "{}/{}/{}/",
            self.base_url.trim_end_matches('/'),
            username,
            board
        )
    }
}

#[async_trait]
impl BoardFetcher for HttpBoardFetcher {
    async fn fetch(&self, username: &str, board: &str) -> Result<String, MapinterestError> {
        let url = self.board_url(username, board);
        info!("Fetching board page: {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                MapinterestError::FetchTimeout {
                    url: url.clone(),
                    secs: self.timeout_secs,
                }
            } else {
                MapinterestError::FetchFailed {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            }
        })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(MapinterestError::BoardNotFound {
                username: username.to_string(),
                board: board.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(MapinterestError::FetchFailed {
                url: url.clone(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| MapinterestError::FetchFailed {
                url,
                reason: e.to_string(),
            })?;

        debug!("Fetched {} bytes of board markup", body.len());
        Ok(body)
    }
}
