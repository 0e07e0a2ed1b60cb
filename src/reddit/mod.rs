//! Reddit API client and feed types.

pub mod client;
pub mod types;

pub use client::RedditClient;
pub use types::{Post, PostMedia};

use async_trait::async_trait;

use crate::error::Result;

/// Source of candidate posts for the pipeline.
///
/// The production implementation is [`RedditClient`]; tests substitute a
/// fake so pipeline behavior can be exercised without the network.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// List the authenticated user's upvoted posts.
    async fn upvoted(&self) -> Result<Vec<Post>>;
}
