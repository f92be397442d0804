// chirp-gate-core/src/platform.rs
// ============================================================================
// Module: Platform Capability
// Description: Record types and capability traits for the external platform.
// Purpose: Define the seam the tool router dispatches through, one session per call.
// Dependencies: async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! The external social platform is reached through a two-level capability
//! seam: a process-wide [`PlatformConnector`] builds one [`PlatformSession`]
//! per tool call from a [`CredentialPair`], and the session exposes the async
//! platform operations. Sessions are ephemeral by contract; they are never
//! cached or shared between calls, so a session can only ever act under the
//! credentials of the request that created it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::credentials::CredentialPair;

// ============================================================================
// SECTION: Record Types
// ============================================================================

/// Tweet fields surfaced by timeline, search, and reply tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRecord {
    /// Tweet identifier.
    pub id: String,
    /// Identifier of the tweet this one replies to, when any.
    pub in_reply_to: Option<String>,
    /// Screen name of the tweet author.
    pub author_username: String,
    /// Tweet text content.
    pub text: String,
    /// Tweet language code.
    pub lang: String,
    /// Platform-formatted creation timestamp.
    pub created_at: String,
    /// View count when the platform discloses it.
    pub view_count: Option<u64>,
    /// Favorite count.
    pub favorite_count: u64,
    /// Reply count.
    pub reply_count: u64,
    /// Retweet count.
    pub retweet_count: u64,
}

/// Profile fields surfaced by the profile tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// User identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Screen name without the leading `@`.
    pub username: String,
    /// Platform-formatted account creation timestamp.
    pub created_at: String,
    /// Avatar image URL.
    pub profile_image_url: String,
    /// Profile link, when set.
    pub url: Option<String>,
    /// Free-form location, when set.
    pub location: Option<String>,
    /// Profile description text.
    pub description: String,
    /// URLs embedded in the profile description.
    pub description_urls: Vec<String>,
    /// Paid verification badge.
    pub is_blue_verified: bool,
    /// Legacy verification badge.
    pub verified: bool,
    /// Whether the platform flags the account as possibly sensitive.
    pub possibly_sensitive: bool,
    /// Whether the account accepts direct messages.
    pub can_dm: bool,
    /// Total follower count.
    pub followers_count: u64,
    /// Fast follower count.
    pub fast_followers_count: u64,
    /// Normal follower count.
    pub normal_followers_count: u64,
    /// Following count.
    pub following_count: u64,
}

/// Trend fields surfaced by the trends tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    /// Trend name.
    pub name: String,
    /// Tweet volume when the platform discloses it.
    pub tweet_count: Option<u64>,
    /// Related trend names grouped under this trend.
    pub grouped_trends: Vec<String>,
    /// Platform domain context label, when any.
    pub domain_context: Option<String>,
}

// ============================================================================
// SECTION: Operation Vocabulary
// ============================================================================

/// Search ranking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    /// Most relevant tweets.
    Top,
    /// Most recent tweets.
    Latest,
}

impl SearchMode {
    /// Parses a caller-supplied mode literal.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Top" => Some(Self::Top),
            "Latest" => Some(Self::Latest),
            _ => None,
        }
    }

    /// Returns the stable literal for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "Top",
            Self::Latest => "Latest",
        }
    }
}

/// Trend listing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendCategory {
    /// Overall trending topics.
    Trending,
    /// Personalized trends.
    ForYou,
    /// News trends.
    News,
    /// Sports trends.
    Sports,
    /// Entertainment trends.
    Entertainment,
}

impl TrendCategory {
    /// Parses a caller-supplied category literal.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "trending" => Some(Self::Trending),
            "for-you" => Some(Self::ForYou),
            "news" => Some(Self::News),
            "sports" => Some(Self::Sports),
            "entertainment" => Some(Self::Entertainment),
            _ => None,
        }
    }

    /// Returns the stable literal for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trending => "trending",
            Self::ForYou => "for-you",
            Self::News => "news",
            Self::Sports => "sports",
            Self::Entertainment => "entertainment",
        }
    }
}

/// Home timeline feed selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineFeed {
    /// Personalized for-you feed.
    ForYou,
    /// Chronological following feed.
    Following,
}

impl TimelineFeed {
    /// Parses a caller-supplied feed literal.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "for-you" => Some(Self::ForYou),
            "following" => Some(Self::Following),
            _ => None,
        }
    }

    /// Returns the stable literal for this feed.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ForYou => "for-you",
            Self::Following => "following",
        }
    }
}

// ============================================================================
// SECTION: Capability Traits
// ============================================================================

/// Factory building one authenticated platform session per tool call.
pub trait PlatformConnector: Send + Sync {
    /// Builds an ephemeral session bound to the given credentials.
    fn connect(&self, credentials: &CredentialPair) -> Box<dyn PlatformSession>;
}

/// Ephemeral authenticated handle into the external platform.
///
/// # Invariants
/// - A session acts only under the credentials it was built from.
/// - Sessions are used for a single tool call and then dropped.
#[async_trait]
pub trait PlatformSession: Send + Sync {
    /// Fetches a user profile by screen name.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn user_by_name(&self, username: &str) -> Result<ProfileRecord, UpstreamError>;

    /// Fetches recent tweets authored by a user.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn user_tweets(
        &self,
        user_id: &str,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError>;

    /// Searches tweets by query.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn search_tweets(
        &self,
        query: &str,
        mode: SearchMode,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError>;

    /// Favorites a tweet.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn favorite_tweet(&self, tweet_id: &str) -> Result<(), UpstreamError>;

    /// Removes a favorite from a tweet.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn unfavorite_tweet(&self, tweet_id: &str) -> Result<(), UpstreamError>;

    /// Retweets a tweet.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn retweet(&self, tweet_id: &str) -> Result<(), UpstreamError>;

    /// Undoes a retweet.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn undo_retweet(&self, tweet_id: &str) -> Result<(), UpstreamError>;

    /// Posts a new tweet, optionally as a reply.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn create_post(&self, text: &str, reply_to: Option<&str>) -> Result<(), UpstreamError>;

    /// Fetches trending topics for a category.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn trends(
        &self,
        category: TrendCategory,
        count: usize,
    ) -> Result<Vec<TrendRecord>, UpstreamError>;

    /// Fetches the caller's home timeline.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn timeline(
        &self,
        feed: TimelineFeed,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError>;

    /// Follows a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn follow_user(&self, user_id: &str) -> Result<(), UpstreamError>;

    /// Unfollows a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn unfollow_user(&self, user_id: &str) -> Result<(), UpstreamError>;

    /// Fetches replies under a tweet.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] when the platform call fails.
    async fn tweet_replies(
        &self,
        tweet_id: &str,
        count: usize,
    ) -> Result<Vec<TweetRecord>, UpstreamError>;
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Platform operation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UpstreamError {
    /// The platform rejected the session credentials.
    #[error("forbidden")]
    Forbidden,
    /// Any other platform failure, surfaced opaquely.
    #[error("upstream error: {0}")]
    Upstream(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::missing_docs_in_private_items,
        reason = "Test-only panic-based assertions."
    )]

    use super::SearchMode;
    use super::TimelineFeed;
    use super::TrendCategory;

    #[test]
    fn search_mode_round_trips_literals() {
        for mode in [SearchMode::Top, SearchMode::Latest] {
            assert_eq!(SearchMode::parse(mode.as_str()), Some(mode));
        }
        assert_eq!(SearchMode::parse("top"), None);
    }

    #[test]
    fn trend_category_round_trips_literals() {
        for category in [
            TrendCategory::Trending,
            TrendCategory::ForYou,
            TrendCategory::News,
            TrendCategory::Sports,
            TrendCategory::Entertainment,
        ] {
            assert_eq!(TrendCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(TrendCategory::parse("Trending"), None);
    }

    #[test]
    fn timeline_feed_round_trips_literals() {
        for feed in [TimelineFeed::ForYou, TimelineFeed::Following] {
            assert_eq!(TimelineFeed::parse(feed.as_str()), Some(feed));
        }
        assert_eq!(TimelineFeed::parse("latest"), None);
    }
}
