// chirp-gate-mcp/src/tools/tests.rs
// ============================================================================
// Module: MCP Tool Router Unit Tests
// Description: Unit tests for tool routing and credential propagation.
// Purpose: Validate tool flows, context isolation, and error mapping.
// Dependencies: chirp-gate-mcp, chirp-gate-core, tokio
// ============================================================================

//! ## Overview
//! Exercises tool routing behavior with a recording fake platform connector.
//! The fake records, for every platform operation, the credentials of the
//! session that performed it, so the tests can prove a call only ever runs
//! under its own request's credentials and that no platform call happens
//! before validation and authentication succeed.

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;
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
use serde_json::json;

use super::ToolError;
use super::ToolName;
use super::ToolRouter;
use crate::audit::NoopAuditSink;
use crate::auth::RequestAuthContext;
use crate::auth::extract_credentials;
use crate::config::MissingCredentialPolicy;
use crate::config::ServerTransport;
use crate::validation::ValidationError;

// ============================================================================
// SECTION: Fake Platform
// ============================================================================

/// One recorded platform operation with the session credentials that ran it.
#[derive(Debug, Clone)]
struct CallRecord {
    /// Platform operation name.
    operation: &'static str,
    /// Operation argument used to correlate records with tool calls.
    detail: String,
    /// Auth token of the session that performed the operation.
    auth_token: String,
}

/// Scripted fake behavior for every platform operation.
#[derive(Debug, Clone, Copy)]
enum FakeBehavior {
    /// Operations succeed with sample data.
    Succeed,
    /// Operations fail with `Forbidden`.
    Forbidden,
    /// Operations fail with an opaque upstream error.
    UpstreamFailure,
}

/// Recording connector handing out one fake session per call.
struct FakeConnector {
    /// Scripted behavior for sessions built by this connector.
    behavior: FakeBehavior,
    /// Shared operation log.
    log: Arc<Mutex<Vec<CallRecord>>>,
}

impl FakeConnector {
    /// Builds a connector with the given scripted behavior.
    fn new(behavior: FakeBehavior) -> Self {
        Self {
            behavior,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a handle onto the shared operation log.
    fn log(&self) -> Arc<Mutex<Vec<CallRecord>>> {
        Arc::clone(&self.log)
    }
}

impl PlatformConnector for FakeConnector {
    fn connect(&self, credentials: &CredentialPair) -> Box<dyn PlatformSession> {
        Box::new(FakeSession {
            auth_token: credentials.auth_token().to_string(),
            behavior: self.behavior,
            log: Arc::clone(&self.log),
        })
    }
}

/// Fake session recording every operation with its own credentials.
struct FakeSession {
    /// Auth token this session was built from.
    auth_token: String,
    /// Scripted behavior.
    behavior: FakeBehavior,
    /// Shared operation log.
    log: Arc<Mutex<Vec<CallRecord>>>,
}

impl FakeSession {
    /// Records one operation after a suspension point, then applies the
    /// scripted behavior. The sleep forces interleaving between concurrent
    /// calls so isolation failures would surface as crossed records.
    async fn record(&self, operation: &'static str, detail: &str) -> Result<(), UpstreamError> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.log.lock().expect("log lock").push(CallRecord {
            operation,
            detail: detail.to_string(),
            auth_token: self.auth_token.clone(),
        });
        match self.behavior {
            FakeBehavior::Succeed => Ok(()),
            FakeBehavior::Forbidden => Err(UpstreamError::Forbidden),
            FakeBehavior::UpstreamFailure => {
                Err(UpstreamError::Upstream("platform unavailable".to_string()))
            }
        }
    }
}

#[async_trait]
impl PlatformSession for FakeSession {
    async fn user_by_name(&self, username: &str) -> Result<ProfileRecord, UpstreamError> {
        self.record("user_by_name", username).await?;
        Ok(sample_profile(username))
    }

    async fn user_tweets(
        &self,
        user_id: &str,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError> {
        self.record("user_tweets", &format!("{user_id}:{count}")).await?;
        Ok(vec![sample_tweet()])
    }

    async fn search_tweets(
        &self,
        query: &str,
        mode: SearchMode,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError> {
        self.record("search_tweets", &format!("{query}:{}:{count}", mode.as_str())).await?;
        Ok(vec![sample_tweet()])
    }

    async fn favorite_tweet(&self, tweet_id: &str) -> Result<(), UpstreamError> {
        self.record("favorite_tweet", tweet_id).await
    }

    async fn unfavorite_tweet(&self, tweet_id: &str) -> Result<(), UpstreamError> {
        self.record("unfavorite_tweet", tweet_id).await
    }

    async fn retweet(&self, tweet_id: &str) -> Result<(), UpstreamError> {
        self.record("retweet", tweet_id).await
    }

    async fn undo_retweet(&self, tweet_id: &str) -> Result<(), UpstreamError> {
        self.record("undo_retweet", tweet_id).await
    }

    async fn create_post(&self, text: &str, reply_to: Option<&str>) -> Result<(), UpstreamError> {
        self.record("create_post", &format!("{text}:{}", reply_to.unwrap_or("none"))).await
    }

    async fn trends(
        &self,
        category: TrendCategory,
        count: usize,
    ) -> Result<Vec<TrendRecord>, UpstreamError> {
        self.record("trends", &format!("{}:{count}", category.as_str())).await?;
        Ok(vec![sample_trend()])
    }

    async fn timeline(
        &self,
        feed: TimelineFeed,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError> {
        self.record("timeline", &format!("{}:{count}", feed.as_str())).await?;
        Ok(vec![sample_tweet()])
    }

    async fn follow_user(&self, user_id: &str) -> Result<(), UpstreamError> {
        self.record("follow_user", user_id).await
    }

    async fn unfollow_user(&self, user_id: &str) -> Result<(), UpstreamError> {
        self.record("unfollow_user", user_id).await
    }

    async fn tweet_replies(
        &self,
        tweet_id: &str,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError> {
        self.record("tweet_replies", &format!("{tweet_id}:{count}")).await?;
        Ok(vec![sample_tweet()])
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Builds a sample profile for the given screen name.
fn sample_profile(username: &str) -> ProfileRecord {
    ProfileRecord {
        id: format!("id-{username}"),
        name: "Sample User".to_string(),
        username: username.to_string(),
        created_at: "Mon Jan 01 00:00:00 +0000 2024".to_string(),
        profile_image_url: "https://example.test/avatar.png".to_string(),
        url: None,
        location: Some("Somewhere".to_string()),
        description: "sample".to_string(),
        description_urls: Vec::new(),
        is_blue_verified: false,
        verified: false,
        possibly_sensitive: false,
        can_dm: true,
        followers_count: 10,
        fast_followers_count: 1,
        normal_followers_count: 9,
        following_count: 5,
    }
}

/// Builds a sample tweet record.
fn sample_tweet() -> TweetRecord {
    TweetRecord {
        id: "t1".to_string(),
        in_reply_to: None,
        author_username: "alice".to_string(),
        text: "hello".to_string(),
        lang: "en".to_string(),
        created_at: "Mon Jan 01 00:00:00 +0000 2024".to_string(),
        view_count: Some(100),
        favorite_count: 3,
        reply_count: 1,
        retweet_count: 2,
    }
}

/// Builds a sample trend record.
fn sample_trend() -> TrendRecord {
    TrendRecord {
        name: "#sample".to_string(),
        tweet_count: Some(1234),
        grouped_trends: Vec::new(),
        domain_context: Some("Trending".to_string()),
    }
}

/// Builds a router over a fake connector with the given behavior.
fn router_with(behavior: FakeBehavior) -> (ToolRouter, Arc<Mutex<Vec<CallRecord>>>) {
    let connector = FakeConnector::new(behavior);
    let log = connector.log();
    let router = ToolRouter::new(Arc::new(connector), Arc::new(NoopAuditSink))
        .expect("catalog schemas compile");
    (router, log)
}

/// Builds an authenticated HTTP request context with the given auth token.
fn authed_context(auth_token: &str) -> RequestAuthContext {
    let pair = CredentialPair::new(auth_token, "csrf").expect("valid pair");
    RequestAuthContext::http(ServerTransport::Http, None, Some(pair))
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn catalog_lists_every_tool() {
    let (router, _log) = router_with(FakeBehavior::Succeed);
    let tools = router.list_tools();
    assert_eq!(tools.len(), ToolName::ALL.len());
    for (definition, expected) in tools.iter().zip(ToolName::ALL) {
        assert_eq!(definition.name, expected);
    }
}

#[tokio::test]
async fn unknown_tool_is_rejected() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");
    let result = router.handle_tool_call(&context, "get_direct_messages", json!({})).await;
    assert!(matches!(result, Err(ToolError::UnknownTool)));
    assert!(log.lock().expect("log lock").is_empty());
}

#[tokio::test]
async fn missing_credentials_fail_before_any_platform_call() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = RequestAuthContext::stdio();
    for (name, arguments) in [
        ("get_tweets", json!({ "username": "alice" })),
        ("get_profile", json!({ "username": "alice" })),
        ("search_tweets", json!({ "query": "#rust" })),
        ("like_tweet", json!({ "tweet_id": "t1" })),
        ("retweet", json!({ "tweet_id": "t1" })),
        ("post_tweet", json!({ "text": "hello" })),
        ("get_trends", json!({})),
        ("get_timeline", json!({})),
        ("follow_user", json!({ "username": "alice" })),
        ("get_replies", json!({ "tweet_id": "t1" })),
    ] {
        let result = router.handle_tool_call(&context, name, arguments).await;
        let error = result.expect_err("anonymous call must fail");
        assert!(matches!(error, ToolError::Unauthenticated), "tool {name}");
        assert!(error.to_string().contains("AUTH_REQUIRED"), "tool {name}");
    }
    assert!(log.lock().expect("log lock").is_empty());
}

#[tokio::test]
async fn validation_failures_precede_platform_calls() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");

    let result = router
        .handle_tool_call(&context, "get_tweets", json!({ "username": "alice", "count": "0" }))
        .await;
    assert!(matches!(
        result,
        Err(ToolError::Validation(ValidationError::TooSmall { .. }))
    ));

    let result = router
        .handle_tool_call(&context, "get_tweets", json!({ "username": "alice", "count": "51" }))
        .await;
    assert!(matches!(
        result,
        Err(ToolError::Validation(ValidationError::TooLarge { .. }))
    ));

    let result = router
        .handle_tool_call(
            &context,
            "get_tweets",
            json!({ "username": "alice", "count": "thirty" }),
        )
        .await;
    assert!(matches!(
        result,
        Err(ToolError::Validation(ValidationError::NotANumber { .. }))
    ));

    assert!(log.lock().expect("log lock").is_empty());
}

#[tokio::test]
async fn invalid_action_choice_is_rejected_before_dispatch() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");
    let result = router
        .handle_tool_call(&context, "follow_user", json!({ "username": "alice", "action": "mute" }))
        .await;
    assert!(matches!(result, Err(ToolError::InvalidParams(_))), "schema catches enum literals");
    assert!(log.lock().expect("log lock").is_empty());
}

#[tokio::test]
async fn schema_rejects_missing_required_and_unknown_fields() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");

    let result = router.handle_tool_call(&context, "get_profile", json!({})).await;
    assert!(matches!(result, Err(ToolError::InvalidParams(_))));

    let result = router
        .handle_tool_call(&context, "get_profile", json!({ "username": "alice", "extra": 1 }))
        .await;
    assert!(matches!(result, Err(ToolError::InvalidParams(_))));

    assert!(log.lock().expect("log lock").is_empty());
}

#[tokio::test]
async fn profile_success_returns_declared_fields() {
    let (router, _log) = router_with(FakeBehavior::Succeed);
    let header = "Bearer abc123:xyz789";
    let pair = extract_credentials(
        Some(header),
        "/mcp",
        MissingCredentialPolicy::Anonymous,
        &[],
    )
    .expect("extraction succeeds");
    let context = RequestAuthContext::http(ServerTransport::Http, None, pair);
    let result = router
        .handle_tool_call(&context, "get_profile", json!({ "username": "alice" }))
        .await
        .expect("profile call succeeds");
    assert_eq!(result["username"], "alice");
    assert_eq!(result["id"], "id-alice");
    assert_eq!(result["followers_count"], 10);
    assert_eq!(result["can_dm"], true);
}

#[tokio::test]
async fn empty_auth_token_rejects_before_capability_is_invoked() {
    let (_router, log) = router_with(FakeBehavior::Succeed);
    let result = extract_credentials(
        Some("Bearer :xyz789"),
        "/mcp",
        MissingCredentialPolicy::Anonymous,
        &[],
    );
    assert!(result.is_err());
    assert!(log.lock().expect("log lock").is_empty());
}

#[tokio::test]
async fn get_tweets_resolves_user_then_fetches_bounded_timeline() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");
    let result = router
        .handle_tool_call(&context, "get_tweets", json!({ "username": "alice", "count": "5" }))
        .await
        .expect("call succeeds");
    assert!(result.is_array());
    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].operation, "user_by_name");
    assert_eq!(log[0].detail, "alice");
    assert_eq!(log[1].operation, "user_tweets");
    assert_eq!(log[1].detail, "id-alice:5");
}

#[tokio::test]
async fn follow_user_resolves_user_then_follows_by_id() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");
    let result = router
        .handle_tool_call(
            &context,
            "follow_user",
            json!({ "username": "bob", "action": "unfollow" }),
        )
        .await
        .expect("call succeeds");
    assert_eq!(result, json!({ "status": "success" }));
    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].operation, "user_by_name");
    assert_eq!(log[1].operation, "unfollow_user");
    assert_eq!(log[1].detail, "id-bob");
}

#[tokio::test]
async fn mutating_tools_invoke_the_platform_exactly_once() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");
    let result = router
        .handle_tool_call(&context, "like_tweet", json!({ "tweet_id": "t9" }))
        .await
        .expect("call succeeds");
    assert_eq!(result, json!({ "status": "success" }));
    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].operation, "favorite_tweet");
    assert_eq!(log[0].detail, "t9");
}

#[tokio::test]
async fn post_tweet_treats_empty_reply_id_as_standalone_post() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");
    router
        .handle_tool_call(&context, "post_tweet", json!({ "text": "hello" }))
        .await
        .expect("call succeeds");
    router
        .handle_tool_call(
            &context,
            "post_tweet",
            json!({ "text": "hi", "reply_to_tweet_id": "t1" }),
        )
        .await
        .expect("call succeeds");
    let log = log.lock().expect("log lock");
    assert_eq!(log[0].detail, "hello:none");
    assert_eq!(log[1].detail, "hi:t1");
}

#[tokio::test]
async fn omitted_arguments_default_to_an_empty_object() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");
    router
        .handle_tool_call(&context, "get_trends", serde_json::Value::Null)
        .await
        .expect("call succeeds");
    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].operation, "trends");
    assert_eq!(log[0].detail, "trending:30");
}

#[tokio::test]
async fn timeline_defaults_apply_before_dispatch() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context = authed_context("token");
    router
        .handle_tool_call(&context, "get_timeline", json!({}))
        .await
        .expect("call succeeds");
    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].operation, "timeline");
    assert_eq!(log[0].detail, "for-you:40");
}

#[tokio::test]
async fn forbidden_surfaces_as_auth_required_for_every_tool() {
    let (router, _log) = router_with(FakeBehavior::Forbidden);
    let context = authed_context("token");
    for (name, arguments) in [
        ("get_tweets", json!({ "username": "alice" })),
        ("get_profile", json!({ "username": "alice" })),
        ("search_tweets", json!({ "query": "#rust" })),
        ("like_tweet", json!({ "tweet_id": "t1" })),
        ("retweet", json!({ "tweet_id": "t1", "action": "undo" })),
        ("post_tweet", json!({ "text": "hello" })),
        ("get_trends", json!({ "category": "news" })),
        ("get_timeline", json!({ "category": "following" })),
        ("follow_user", json!({ "username": "alice" })),
        ("get_replies", json!({ "tweet_id": "t1" })),
    ] {
        let result = router.handle_tool_call(&context, name, arguments).await;
        let error = result.expect_err("forbidden must fail the call");
        assert!(matches!(error, ToolError::Unauthenticated), "tool {name}");
        assert!(error.to_string().contains("AUTH_REQUIRED"), "tool {name}");
    }
}

#[tokio::test]
async fn other_upstream_failures_stay_opaque() {
    let (router, _log) = router_with(FakeBehavior::UpstreamFailure);
    let context = authed_context("token");
    let result = router
        .handle_tool_call(&context, "get_trends", json!({}))
        .await;
    let error = result.expect_err("upstream failure must fail the call");
    assert!(matches!(error, ToolError::Upstream(_)));
    assert!(!error.to_string().contains("AUTH_REQUIRED"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_observe_only_their_own_credentials() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let context_a = authed_context("token-a");
    let context_b = authed_context("token-b");

    let call_a = router.handle_tool_call(
        &context_a,
        "get_profile",
        json!({ "username": "alice" }),
    );
    let call_b = router.handle_tool_call(
        &context_b,
        "get_profile",
        json!({ "username": "bob" }),
    );
    let (result_a, result_b) = tokio::join!(call_a, call_b);
    result_a.expect("call a succeeds");
    result_b.expect("call b succeeds");

    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 2);
    for record in log.iter() {
        match record.detail.as_str() {
            "alice" => assert_eq!(record.auth_token, "token-a"),
            "bob" => assert_eq!(record.auth_token, "token-b"),
            other => panic!("unexpected operation detail: {other}"),
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_interleaved_calls_never_cross_credentials() {
    let (router, log) = router_with(FakeBehavior::Succeed);
    let mut handles = Vec::new();
    for index in 0..16 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let token = format!("token-{index}");
            let username = format!("user-{index}");
            let context = authed_context(&token);
            router
                .handle_tool_call(&context, "get_profile", json!({ "username": username }))
                .await
        }));
    }
    for handle in handles {
        handle.await.expect("task join").expect("call succeeds");
    }
    let log = log.lock().expect("log lock");
    assert_eq!(log.len(), 16);
    for record in log.iter() {
        let suffix = record.detail.strip_prefix("user-").expect("detail is a username");
        assert_eq!(record.auth_token, format!("token-{suffix}"));
    }
}
