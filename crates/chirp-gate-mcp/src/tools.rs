// chirp-gate-mcp/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Tool catalog and routing for the Chirp Gate MCP server.
// Purpose: Expose thin wrappers over the platform capability seam.
// Dependencies: chirp-gate-core, jsonschema, serde
// ============================================================================

//! ## Overview
//! The tool router dispatches MCP tool calls to the external platform. Every
//! tool follows the same contract: validate arguments, require bound
//! credentials, build one ephemeral platform session, invoke the matching
//! platform operation, and shape the result into the tool's declared field
//! set. An upstream `Forbidden` maps to the `AUTH_REQUIRED` signal; any other
//! upstream failure propagates opaquely.
//!
//! ## Invariants
//! - Argument validation completes before any platform call.
//! - A tool call without bound credentials never reaches the platform.
//! - Sessions are built per call from the calling request's own context and
//!   dropped when the call completes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use chirp_gate_core::PlatformConnector;
use chirp_gate_core::PlatformSession;
use chirp_gate_core::SearchMode;
use chirp_gate_core::TimelineFeed;
use chirp_gate_core::TrendCategory;
use chirp_gate_core::UpstreamError;
use jsonschema::Draft;
use jsonschema::Validator;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::ToolAuditEvent;
use crate::auth::RequestAuthContext;
use crate::validation::ValidationError;
use crate::validation::bounded_count;

// ============================================================================
// SECTION: Tool Names
// ============================================================================

/// Names of the tools exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ToolName {
    /// Recent tweets from a user.
    GetTweets,
    /// User profile lookup.
    GetProfile,
    /// Tweet search.
    SearchTweets,
    /// Like or unlike a tweet.
    LikeTweet,
    /// Retweet or undo a retweet.
    Retweet,
    /// Post a new tweet.
    PostTweet,
    /// Trending topics.
    GetTrends,
    /// Home timeline.
    GetTimeline,
    /// Follow or unfollow a user.
    FollowUser,
    /// Replies under a tweet.
    GetReplies,
}

impl ToolName {
    /// Every tool in catalog order.
    pub const ALL: [Self; 10] = [
        Self::GetTweets,
        Self::GetProfile,
        Self::SearchTweets,
        Self::LikeTweet,
        Self::Retweet,
        Self::PostTweet,
        Self::GetTrends,
        Self::GetTimeline,
        Self::FollowUser,
        Self::GetReplies,
    ];

    /// Parses a caller-supplied tool name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "get_tweets" => Some(Self::GetTweets),
            "get_profile" => Some(Self::GetProfile),
            "search_tweets" => Some(Self::SearchTweets),
            "like_tweet" => Some(Self::LikeTweet),
            "retweet" => Some(Self::Retweet),
            "post_tweet" => Some(Self::PostTweet),
            "get_trends" => Some(Self::GetTrends),
            "get_timeline" => Some(Self::GetTimeline),
            "follow_user" => Some(Self::FollowUser),
            "get_replies" => Some(Self::GetReplies),
            _ => None,
        }
    }

    /// Returns the stable wire name for this tool.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GetTweets => "get_tweets",
            Self::GetProfile => "get_profile",
            Self::SearchTweets => "search_tweets",
            Self::LikeTweet => "like_tweet",
            Self::Retweet => "retweet",
            Self::PostTweet => "post_tweet",
            Self::GetTrends => "get_trends",
            Self::GetTimeline => "get_timeline",
            Self::FollowUser => "follow_user",
            Self::GetReplies => "get_replies",
        }
    }
}

impl Serialize for ToolName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tool Catalog
// ============================================================================

/// Tool definition used by MCP tool listing.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    /// MCP tool name.
    pub name: ToolName,
    /// Tool description for clients.
    pub description: &'static str,
    /// JSON schema for tool input.
    pub input_schema: Value,
}

/// Returns the fixed tool catalog.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: ToolName::GetTweets,
            description: "Get recent tweets from a user",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "username": {
                        "type": "string",
                        "description": "Username of the user (without @)"
                    },
                    "count": {
                        "type": "string",
                        "description": "Number of tweets to retrieve (default: 30, max: 50)"
                    }
                },
                "required": ["username"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: ToolName::GetProfile,
            description: "Get a user's profile information",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "username": {
                        "type": "string",
                        "description": "Username of the user (without @)"
                    }
                },
                "required": ["username"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: ToolName::SearchTweets,
            description: "Search for tweets by hashtag or keyword",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query (hashtag or keyword). For hashtags, include the # symbol"
                    },
                    "mode": {
                        "type": "string",
                        "enum": ["Latest", "Top"],
                        "description": "'Latest' for most recent tweets or 'Top' for most relevant tweets (default: 'Top')"
                    },
                    "count": {
                        "type": "string",
                        "description": "Number of tweets to retrieve (default: 30, max: 50)"
                    }
                },
                "required": ["query"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: ToolName::LikeTweet,
            description: "Like or unlike a tweet",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "tweet_id": {
                        "type": "string",
                        "description": "ID of the tweet to like/unlike"
                    },
                    "action": {
                        "type": "string",
                        "enum": ["like", "unlike"],
                        "description": "Whether to \"like\" or \"unlike\" the tweet"
                    }
                },
                "required": ["tweet_id"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: ToolName::Retweet,
            description: "Retweet or undo retweet of a tweet",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "tweet_id": {
                        "type": "string",
                        "description": "ID of the tweet to retweet/undo retweet"
                    },
                    "action": {
                        "type": "string",
                        "enum": ["retweet", "undo"],
                        "description": "Whether to \"retweet\" or \"undo\" the retweet"
                    }
                },
                "required": ["tweet_id"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: ToolName::PostTweet,
            description: "Post a new tweet, optionally as a reply",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "The text content of the tweet limited to 280 characters"
                    },
                    "reply_to_tweet_id": {
                        "type": "string",
                        "description": "Optional ID of the tweet to reply to"
                    }
                },
                "required": ["text"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: ToolName::GetTrends,
            description: "Get current trending topics",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "enum": ["trending", "for-you", "news", "sports", "entertainment"],
                        "description": "'trending' for overall trends, or a more specific category (default: 'trending')"
                    },
                    "count": {
                        "type": "string",
                        "description": "Number of trends to retrieve (default: 30, max: 50)"
                    }
                },
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: ToolName::GetTimeline,
            description: "Get tweets from the caller's home timeline",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "enum": ["for-you", "following"],
                        "description": "'for-you' for the personalized feed, 'following' for the following timeline (default: 'for-you')"
                    },
                    "count": {
                        "type": "string",
                        "description": "Number of tweets to retrieve (default: 40, max: 50)"
                    }
                },
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: ToolName::FollowUser,
            description: "Follow or unfollow a user",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "username": {
                        "type": "string",
                        "description": "Username of the user to follow/unfollow (without @)"
                    },
                    "action": {
                        "type": "string",
                        "enum": ["follow", "unfollow"],
                        "description": "Whether to follow or unfollow the user"
                    }
                },
                "required": ["username"],
                "additionalProperties": false
            }),
        },
        ToolDefinition {
            name: ToolName::GetReplies,
            description: "Read replies under a post",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "tweet_id": {
                        "type": "string",
                        "description": "ID of the tweet to get replies of"
                    },
                    "count": {
                        "type": "string",
                        "description": "Number of replies to retrieve (default: 30, max: 50)"
                    }
                },
                "required": ["tweet_id"],
                "additionalProperties": false
            }),
        },
    ]
}

// ============================================================================
// SECTION: Tool Router
// ============================================================================

/// Tool router for MCP requests.
#[derive(Clone)]
pub struct ToolRouter {
    /// Connector building one platform session per call.
    connector: Arc<dyn PlatformConnector>,
    /// Audit sink for tool call outcomes.
    audit: Arc<dyn AuditSink>,
    /// Compiled input schema validators, one per tool.
    validators: Arc<BTreeMap<ToolName, Validator>>,
}

impl ToolRouter {
    /// Creates a new tool router, compiling the catalog input schemas.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when a catalog schema fails to compile.
    pub fn new(
        connector: Arc<dyn PlatformConnector>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self, ToolError> {
        let mut validators = BTreeMap::new();
        for definition in tool_definitions() {
            let validator = compile_schema(&definition.input_schema)?;
            validators.insert(definition.name, validator);
        }
        Ok(Self {
            connector,
            audit,
            validators: Arc::new(validators),
        })
    }

    /// Lists the MCP tools supported by this server.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Dispatches one tool call under the calling request's context.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when validation, authentication, or the
    /// platform call fails.
    pub async fn handle_tool_call(
        &self,
        context: &RequestAuthContext,
        name: &str,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let result = self.dispatch(context, name, payload).await;
        match &result {
            Ok(_) => self.audit.record_tool(&ToolAuditEvent::succeeded(context, name)),
            Err(err) => {
                self.audit.record_tool(&ToolAuditEvent::failed(context, name, err.kind_label()));
            }
        }
        result
    }

    /// Routes a validated tool call to its handler.
    async fn dispatch(
        &self,
        context: &RequestAuthContext,
        name: &str,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let tool = ToolName::parse(name).ok_or(ToolError::UnknownTool)?;
        // Omitted arguments arrive as null; tools with all-optional
        // parameters treat that as an empty object.
        let payload = if payload.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            payload
        };
        self.validate_arguments(tool, &payload)?;
        match tool {
            ToolName::GetTweets => self.handle_get_tweets(context, payload).await,
            ToolName::GetProfile => self.handle_get_profile(context, payload).await,
            ToolName::SearchTweets => self.handle_search_tweets(context, payload).await,
            ToolName::LikeTweet => self.handle_like_tweet(context, payload).await,
            ToolName::Retweet => self.handle_retweet(context, payload).await,
            ToolName::PostTweet => self.handle_post_tweet(context, payload).await,
            ToolName::GetTrends => self.handle_get_trends(context, payload).await,
            ToolName::GetTimeline => self.handle_get_timeline(context, payload).await,
            ToolName::FollowUser => self.handle_follow_user(context, payload).await,
            ToolName::GetReplies => self.handle_get_replies(context, payload).await,
        }
    }

    /// Validates raw arguments against the tool's declared input schema.
    fn validate_arguments(&self, tool: ToolName, payload: &Value) -> Result<(), ToolError> {
        let Some(validator) = self.validators.get(&tool) else {
            return Err(ToolError::Internal("validator missing".to_string()));
        };
        if !validator.is_valid(payload) {
            let message = validator
                .iter_errors(payload)
                .next()
                .map_or_else(|| "schema validation failed".to_string(), |err| err.to_string());
            return Err(ToolError::InvalidParams(message));
        }
        Ok(())
    }

    /// Builds one platform session from the request's bound credentials.
    ///
    /// Fails closed with the `AUTH_REQUIRED` signal when the request carries
    /// no credentials; no platform call is attempted in that case.
    fn session(&self, context: &RequestAuthContext) -> Result<Box<dyn PlatformSession>, ToolError> {
        let pair = context.credentials().ok_or(ToolError::Unauthenticated)?;
        Ok(self.connector.connect(pair))
    }

    // ------------------------------------------------------------------
    // Tool implementations
    // ------------------------------------------------------------------

    /// Handles recent-tweets requests.
    async fn handle_get_tweets(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: GetTweetsParams = decode(payload)?;
        let count = bounded_count("count", &params.count)?;
        let session = self.session(context)?;
        let user = map_upstream(session.user_by_name(&params.username).await)?;
        let tweets = map_upstream(session.user_tweets(&user.id, count).await)?;
        to_value(&tweets)
    }

    /// Handles profile lookup requests.
    async fn handle_get_profile(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: GetProfileParams = decode(payload)?;
        let session = self.session(context)?;
        let profile = map_upstream(session.user_by_name(&params.username).await)?;
        to_value(&profile)
    }

    /// Handles tweet search requests.
    async fn handle_search_tweets(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: SearchTweetsParams = decode(payload)?;
        let mode = SearchMode::parse(&params.mode)
            .ok_or_else(|| ValidationError::invalid_choice("mode", &["Latest", "Top"]))?;
        let count = bounded_count("count", &params.count)?;
        let session = self.session(context)?;
        let tweets = map_upstream(session.search_tweets(&params.query, mode, count).await)?;
        to_value(&tweets)
    }

    /// Handles like/unlike requests.
    async fn handle_like_tweet(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: LikeTweetParams = decode(payload)?;
        let action = LikeAction::parse(&params.action)
            .ok_or_else(|| ValidationError::invalid_choice("action", &["like", "unlike"]))?;
        let session = self.session(context)?;
        match action {
            LikeAction::Like => map_upstream(session.favorite_tweet(&params.tweet_id).await)?,
            LikeAction::Unlike => map_upstream(session.unfavorite_tweet(&params.tweet_id).await)?,
        }
        Ok(status_ok())
    }

    /// Handles retweet/undo requests.
    async fn handle_retweet(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: RetweetParams = decode(payload)?;
        let action = RetweetAction::parse(&params.action)
            .ok_or_else(|| ValidationError::invalid_choice("action", &["retweet", "undo"]))?;
        let session = self.session(context)?;
        match action {
            RetweetAction::Retweet => map_upstream(session.retweet(&params.tweet_id).await)?,
            RetweetAction::Undo => map_upstream(session.undo_retweet(&params.tweet_id).await)?,
        }
        Ok(status_ok())
    }

    /// Handles post requests.
    async fn handle_post_tweet(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: PostTweetParams = decode(payload)?;
        let session = self.session(context)?;
        let reply_to = if params.reply_to_tweet_id.is_empty() {
            None
        } else {
            Some(params.reply_to_tweet_id.as_str())
        };
        map_upstream(session.create_post(&params.text, reply_to).await)?;
        Ok(status_ok())
    }

    /// Handles trend listing requests.
    async fn handle_get_trends(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: GetTrendsParams = decode(payload)?;
        let category = TrendCategory::parse(&params.category).ok_or_else(|| {
            ValidationError::invalid_choice(
                "category",
                &["trending", "for-you", "news", "sports", "entertainment"],
            )
        })?;
        let count = bounded_count("count", &params.count)?;
        let session = self.session(context)?;
        let trends = map_upstream(session.trends(category, count).await)?;
        to_value(&trends)
    }

    /// Handles home timeline requests.
    async fn handle_get_timeline(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: GetTimelineParams = decode(payload)?;
        let feed = TimelineFeed::parse(&params.category).ok_or_else(|| {
            ValidationError::invalid_choice("category", &["for-you", "following"])
        })?;
        let count = bounded_count("count", &params.count)?;
        let session = self.session(context)?;
        let tweets = map_upstream(session.timeline(feed, count).await)?;
        to_value(&tweets)
    }

    /// Handles follow/unfollow requests.
    async fn handle_follow_user(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: FollowUserParams = decode(payload)?;
        let action = FollowAction::parse(&params.action)
            .ok_or_else(|| ValidationError::invalid_choice("action", &["follow", "unfollow"]))?;
        let session = self.session(context)?;
        let user = map_upstream(session.user_by_name(&params.username).await)?;
        match action {
            FollowAction::Follow => map_upstream(session.follow_user(&user.id).await)?,
            FollowAction::Unfollow => map_upstream(session.unfollow_user(&user.id).await)?,
        }
        Ok(status_ok())
    }

    /// Handles reply listing requests.
    async fn handle_get_replies(
        &self,
        context: &RequestAuthContext,
        payload: Value,
    ) -> Result<Value, ToolError> {
        let params: GetRepliesParams = decode(payload)?;
        let count = bounded_count("count", &params.count)?;
        let session = self.session(context)?;
        let replies = map_upstream(session.tweet_replies(&params.tweet_id, count).await)?;
        to_value(&replies)
    }
}

// ============================================================================
// SECTION: Tool Parameters
// ============================================================================

/// Default count literal for most listing tools.
fn default_count_thirty() -> String {
    "30".to_string()
}

/// Default count literal for the timeline tool.
fn default_count_forty() -> String {
    "40".to_string()
}

/// Default search mode literal.
fn default_search_mode() -> String {
    "Top".to_string()
}

/// Default like action literal.
fn default_like_action() -> String {
    "like".to_string()
}

/// Default retweet action literal.
fn default_retweet_action() -> String {
    "retweet".to_string()
}

/// Default trend category literal.
fn default_trend_category() -> String {
    "trending".to_string()
}

/// Default timeline feed literal.
fn default_timeline_feed() -> String {
    "for-you".to_string()
}

/// Default follow action literal.
fn default_follow_action() -> String {
    "follow".to_string()
}

/// Arguments for the recent-tweets tool.
#[derive(Debug, Deserialize)]
struct GetTweetsParams {
    /// Screen name to fetch tweets for.
    username: String,
    /// Count literal, bounds-checked before use.
    #[serde(default = "default_count_thirty")]
    count: String,
}

/// Arguments for the profile tool.
#[derive(Debug, Deserialize)]
struct GetProfileParams {
    /// Screen name to look up.
    username: String,
}

/// Arguments for the search tool.
#[derive(Debug, Deserialize)]
struct SearchTweetsParams {
    /// Search query.
    query: String,
    /// Ranking mode literal.
    #[serde(default = "default_search_mode")]
    mode: String,
    /// Count literal, bounds-checked before use.
    #[serde(default = "default_count_thirty")]
    count: String,
}

/// Arguments for the like tool.
#[derive(Debug, Deserialize)]
struct LikeTweetParams {
    /// Target tweet identifier.
    tweet_id: String,
    /// Action literal.
    #[serde(default = "default_like_action")]
    action: String,
}

/// Arguments for the retweet tool.
#[derive(Debug, Deserialize)]
struct RetweetParams {
    /// Target tweet identifier.
    tweet_id: String,
    /// Action literal.
    #[serde(default = "default_retweet_action")]
    action: String,
}

/// Arguments for the post tool.
#[derive(Debug, Deserialize)]
struct PostTweetParams {
    /// Tweet text content.
    text: String,
    /// Optional tweet identifier to reply to; empty means a standalone post.
    #[serde(default)]
    reply_to_tweet_id: String,
}

/// Arguments for the trends tool.
#[derive(Debug, Deserialize)]
struct GetTrendsParams {
    /// Trend category literal.
    #[serde(default = "default_trend_category")]
    category: String,
    /// Count literal, bounds-checked before use.
    #[serde(default = "default_count_thirty")]
    count: String,
}

/// Arguments for the timeline tool.
#[derive(Debug, Deserialize)]
struct GetTimelineParams {
    /// Feed selection literal.
    #[serde(default = "default_timeline_feed")]
    category: String,
    /// Count literal, bounds-checked before use.
    #[serde(default = "default_count_forty")]
    count: String,
}

/// Arguments for the follow tool.
#[derive(Debug, Deserialize)]
struct FollowUserParams {
    /// Screen name to follow or unfollow.
    username: String,
    /// Action literal.
    #[serde(default = "default_follow_action")]
    action: String,
}

/// Arguments for the replies tool.
#[derive(Debug, Deserialize)]
struct GetRepliesParams {
    /// Tweet identifier to list replies of.
    tweet_id: String,
    /// Count literal, bounds-checked before use.
    #[serde(default = "default_count_thirty")]
    count: String,
}

// ============================================================================
// SECTION: Action Vocabulary
// ============================================================================

/// Like tool action.
#[derive(Debug, Clone, Copy)]
enum LikeAction {
    /// Favorite the tweet.
    Like,
    /// Remove the favorite.
    Unlike,
}

impl LikeAction {
    /// Parses a caller-supplied action literal.
    fn parse(value: &str) -> Option<Self> {
        match value {
            "like" => Some(Self::Like),
            "unlike" => Some(Self::Unlike),
            _ => None,
        }
    }
}

/// Retweet tool action.
#[derive(Debug, Clone, Copy)]
enum RetweetAction {
    /// Retweet the tweet.
    Retweet,
    /// Undo the retweet.
    Undo,
}

impl RetweetAction {
    /// Parses a caller-supplied action literal.
    fn parse(value: &str) -> Option<Self> {
        match value {
            "retweet" => Some(Self::Retweet),
            "undo" => Some(Self::Undo),
            _ => None,
        }
    }
}

/// Follow tool action.
#[derive(Debug, Clone, Copy)]
enum FollowAction {
    /// Follow the user.
    Follow,
    /// Unfollow the user.
    Unfollow,
}

impl FollowAction {
    /// Parses a caller-supplied action literal.
    fn parse(value: &str) -> Option<Self> {
        match value {
            "follow" => Some(Self::Follow),
            "unfollow" => Some(Self::Unfollow),
            _ => None,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Decodes a JSON value into a typed request payload.
fn decode<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, ToolError> {
    serde_json::from_value(payload).map_err(|err| ToolError::InvalidParams(err.to_string()))
}

/// Serializes a tool result into its wire shape.
fn to_value<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|_| ToolError::Serialization)
}

/// Maps platform failures into tool failures; `Forbidden` means the bound
/// credentials are presumed stale and the caller must re-authenticate.
fn map_upstream<T>(result: Result<T, UpstreamError>) -> Result<T, ToolError> {
    result.map_err(|err| match err {
        UpstreamError::Forbidden => ToolError::Unauthenticated,
        UpstreamError::Upstream(message) => ToolError::Upstream(message),
    })
}

/// Builds the acknowledgement payload for mutating tools.
fn status_ok() -> Value {
    json!({ "status": "success" })
}

/// Compiles a catalog input schema.
fn compile_schema(schema: &Value) -> Result<Validator, ToolError> {
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(schema)
        .map_err(|err| ToolError::Internal(format!("invalid tool schema: {err}")))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool routing errors.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Tool name not recognized.
    #[error("unknown tool")]
    UnknownTool,
    /// No credentials bound for the request, or the platform rejected them.
    #[error("authentication required: AUTH_REQUIRED")]
    Unauthenticated,
    /// Tool payload does not match the declared schema.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    /// Tool argument failed bounds or enumeration checks.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Opaque platform failure.
    #[error("upstream error: {0}")]
    Upstream(String),
    /// Tool payload serialization failed.
    #[error("serialization failure")]
    Serialization,
    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Returns a stable label for audit events.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::UnknownTool => "unknown_tool",
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidParams(_) => "invalid_params",
            Self::Validation(_) => "validation",
            Self::Upstream(_) => "upstream",
            Self::Serialization => "serialization",
            Self::Internal(_) => "internal",
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
