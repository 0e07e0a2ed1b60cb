//! RedGifs hosted-media resolution.

pub mod client;

pub use client::RedgifsClient;

use async_trait::async_trait;

use crate::error::Result;

/// Path marker preceding the media id in RedGifs embed markup.
const EMBED_PATH_MARKER: &str = "/ifr/";

/// Resolves a hosted-media id to a directly fetchable URL.
#[async_trait]
pub trait HostedMedia: Send + Sync {
    /// Look up the highest-quality direct media URL for `media_id`.
    async fn resolve_hd_url(&self, media_id: &str) -> Result<String>;
}

/// Extract the media id from embed iframe markup.
///
/// The id sits between the `/ifr/` path segment and the closing quote of
/// the iframe src attribute.
pub fn extract_embed_id(html: &str) -> Option<&str> {
    let start = html.find(EMBED_PATH_MARKER)? + EMBED_PATH_MARKER.len();
    let rest = &html[start..];
    let end = rest.find('"')?;
    let id = &rest[..end];

    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
