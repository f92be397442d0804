// chirp-gate-mcp/src/platform_http.rs
// ============================================================================
// Module: HTTP Platform Adapter
// Description: reqwest-backed platform connector for Chirp Gate.
// Purpose: Build one authenticated platform session per tool call.
// Dependencies: chirp-gate-core, chirp-gate-config, reqwest
// ============================================================================

//! ## Overview
//! The HTTP adapter implements the platform capability seam over a
//! gateway-style REST mapping. `connect` builds a fresh session carrying the
//! credential cookie pair; the session lives for one tool call and holds no
//! state beyond its own credentials. Status mapping is a trust boundary:
//! 401/403 become [`UpstreamError::Forbidden`] so the router can demand
//! re-authentication, and every other failure stays opaque.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use chirp_gate_core::CredentialPair;
use chirp_gate_core::PlatformConnector;
use chirp_gate_core::PlatformSession;
use chirp_gate_core::ProfileRecord;
use chirp_gate_core::SearchMode;
use chirp_gate_core::TimelineFeed;
use chirp_gate_core::TrendCategory;
use chirp_gate_core::TrendRecord;
use chirp_gate_core::TweetRecord;
use chirp_gate_core::UpstreamError;
use reqwest::Client;
use reqwest::Response;
use reqwest::StatusCode;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::header::COOKIE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::config::PlatformConfig;

// ============================================================================
// SECTION: Connector
// ============================================================================

/// reqwest-backed platform connector.
pub struct HttpPlatformConnector {
    /// HTTP client configured with timeouts, shared across sessions.
    client: Client,
    /// Platform base URL (no trailing slash).
    base_url: String,
    /// Language tag sent with each session.
    language: String,
}

impl HttpPlatformConnector {
    /// Builds a connector from platform configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformHttpError`] when the HTTP client cannot be built.
    pub fn from_config(config: &PlatformConfig) -> Result<Self, PlatformHttpError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| PlatformHttpError::Init(err.to_string()))?;
        let mut base_url = config.base_url.clone();
        let trimmed_len = base_url.trim_end_matches('/').len();
        base_url.truncate(trimmed_len);
        Ok(Self {
            client,
            base_url,
            language: config.language.clone(),
        })
    }
}

impl PlatformConnector for HttpPlatformConnector {
    fn connect(&self, credentials: &CredentialPair) -> Box<dyn PlatformSession> {
        Box::new(HttpPlatformSession {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            language: self.language.clone(),
            cookie: format!(
                "auth_token={}; ct0={}",
                credentials.auth_token(),
                credentials.csrf_token()
            ),
            csrf_token: credentials.csrf_token().to_string(),
        })
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// One-call platform session carrying the caller's credential headers.
struct HttpPlatformSession {
    /// Shared HTTP client.
    client: Client,
    /// Platform base URL (no trailing slash).
    base_url: String,
    /// Language tag for this session.
    language: String,
    /// Session cookie header value built from the credential pair.
    cookie: String,
    /// CSRF token header value.
    csrf_token: String,
}

impl HttpPlatformSession {
    /// Builds the credential headers for one platform request.
    fn headers(&self) -> Result<HeaderMap, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&self.cookie)
                .map_err(|_| UpstreamError::Upstream("invalid credential bytes".to_string()))?,
        );
        headers.insert(
            "x-csrf-token",
            HeaderValue::from_str(&self.csrf_token)
                .map_err(|_| UpstreamError::Upstream("invalid credential bytes".to_string()))?,
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&self.language)
                .map_err(|_| UpstreamError::Upstream("invalid language tag".to_string()))?,
        );
        Ok(headers)
    }

    /// Issues a GET request and decodes the JSON response body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .get(url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .map_err(|err| UpstreamError::Upstream(err.to_string()))?;
        let response = check_status(response)?;
        response.json::<T>().await.map_err(|err| UpstreamError::Upstream(err.to_string()))
    }

    /// Issues a POST request and discards the response body.
    async fn post_ack(&self, path: &str, body: Option<Value>) -> Result<(), UpstreamError> {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.post(url).headers(self.headers()?);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response =
            request.send().await.map_err(|err| UpstreamError::Upstream(err.to_string()))?;
        check_status(response)?;
        Ok(())
    }
}

#[async_trait]
impl PlatformSession for HttpPlatformSession {
    async fn user_by_name(&self, username: &str) -> Result<ProfileRecord, UpstreamError> {
        self.get_json(
            &format!("/users/by-name/{username}"),
            &[],
        )
        .await
    }

    async fn user_tweets(
        &self,
        user_id: &str,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError> {
        self.get_json(
            &format!("/users/{user_id}/tweets"),
            &[("count", count.to_string())],
        )
        .await
    }

    async fn search_tweets(
        &self,
        query: &str,
        mode: SearchMode,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError> {
        self.get_json(
            "/tweets/search",
            &[
                ("query", query.to_string()),
                ("mode", mode.as_str().to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }

    async fn favorite_tweet(&self, tweet_id: &str) -> Result<(), UpstreamError> {
        self.post_ack(&format!("/tweets/{tweet_id}/favorite"), None).await
    }

    async fn unfavorite_tweet(&self, tweet_id: &str) -> Result<(), UpstreamError> {
        self.post_ack(&format!("/tweets/{tweet_id}/unfavorite"), None).await
    }

    async fn retweet(&self, tweet_id: &str) -> Result<(), UpstreamError> {
        self.post_ack(&format!("/tweets/{tweet_id}/retweet"), None).await
    }

    async fn undo_retweet(&self, tweet_id: &str) -> Result<(), UpstreamError> {
        self.post_ack(&format!("/tweets/{tweet_id}/unretweet"), None).await
    }

    async fn create_post(&self, text: &str, reply_to: Option<&str>) -> Result<(), UpstreamError> {
        let mut body = json!({ "text": text });
        if let Some(reply_to) = reply_to {
            body["reply_to_tweet_id"] = Value::String(reply_to.to_string());
        }
        self.post_ack("/tweets", Some(body)).await
    }

    async fn trends(
        &self,
        category: TrendCategory,
        count: usize,
    ) -> Result<Vec<TrendRecord>, UpstreamError> {
        self.get_json(
            "/trends",
            &[
                ("category", category.as_str().to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }

    async fn timeline(
        &self,
        feed: TimelineFeed,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError> {
        self.get_json(
            "/timeline",
            &[
                ("feed", feed.as_str().to_string()),
                ("count", count.to_string()),
            ],
        )
        .await
    }

    async fn follow_user(&self, user_id: &str) -> Result<(), UpstreamError> {
        self.post_ack(&format!("/users/{user_id}/follow"), None).await
    }

    async fn unfollow_user(&self, user_id: &str) -> Result<(), UpstreamError> {
        self.post_ack(&format!("/users/{user_id}/unfollow"), None).await
    }

    async fn tweet_replies(
        &self,
        tweet_id: &str,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError> {
        self.get_json(
            &format!("/tweets/{tweet_id}/replies"),
            &[("count", count.to_string())],
        )
        .await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps platform response status codes to upstream failures.
fn check_status(response: Response) -> Result<Response, UpstreamError> {
    match response.status() {
        status if status.is_success() => Ok(response),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(UpstreamError::Forbidden),
        status => Err(UpstreamError::Upstream(format!("platform error: status {status}"))),
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Platform adapter initialization failures.
#[derive(Debug, Error)]
pub enum PlatformHttpError {
    /// The HTTP client could not be built.
    #[error("platform client init failed: {0}")]
    Init(String),
}
