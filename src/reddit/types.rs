//! Reddit API response type definitions.

use serde::Deserialize;

/// Generic listing envelope: `{"kind": "Listing", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct Listing {
    pub data: ListingData,
}

/// Listing payload with pagination cursor.
#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Vec<Thing>,
    pub after: Option<String>,
}

/// A wrapped item in a listing: `{"kind": "t3", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct Thing {
    pub data: Post,
}

/// A single feed post. Read-only to the pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub url: String,
    pub domain: String,
    #[serde(default)]
    pub is_video: bool,
    pub post_hint: Option<String>,
    pub media: Option<PostMedia>,
}

/// Media descriptor attached to a post.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostMedia {
    pub reddit_video: Option<RedditVideo>,
    pub oembed: Option<Oembed>,
}

/// Native Reddit-hosted video descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditVideo {
    pub fallback_url: String,
}

/// Embed markup for third-party hosted media.
#[derive(Debug, Clone, Deserialize)]
pub struct Oembed {
    pub html: String,
}

impl Post {
    /// Direct URL of the native video stream, if the post carries one.
    pub fn native_video_url(&self) -> Option<&str> {
        self.media
            .as_ref()
            .and_then(|media| media.reddit_video.as_ref())
            .map(|video| video.fallback_url.as_str())
    }

    /// Embed markup for third-party hosted media, if present.
    pub fn embed_html(&self) -> Option<&str> {
        self.media
            .as_ref()
            .and_then(|media| media.oembed.as_ref())
            .map(|oembed| oembed.html.as_str())
    }
}
