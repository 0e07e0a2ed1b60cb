//! Category-specific retrieval, transform and delivery routines.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::classify::PostKind;
use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::fs::{remove_if_exists, Storage};
use crate::redgifs::{extract_embed_id, HostedMedia};
use crate::reddit::Post;
use crate::remux::Remuxer;
use crate::telegram::Messenger;

/// Exclusion reason recorded for posts no handler supports.
pub const UNSUPPORTED_REASON: &str = "Unsupported post type";

/// Result of handling one post. Handlers never let errors escape; anything
/// that goes wrong inside becomes a `Failure` with a readable reason.
#[derive(Debug)]
pub enum Outcome {
    Success {
        source_url: String,
        local_path: PathBuf,
    },
    Failure {
        reason: String,
    },
}

/// A delivered artifact, before it's committed to the ledger.
struct Delivered {
    source_url: String,
    local_path: PathBuf,
}

/// The per-category handlers with their injected collaborators.
pub struct Handlers {
    fetcher: Arc<dyn Fetcher>,
    messenger: Arc<dyn Messenger>,
    remuxer: Arc<dyn Remuxer>,
    hosted: Arc<dyn HostedMedia>,
    storage: Storage,
    chat_id: String,
    max_file_size: u64,
    save_files: bool,
}

impl Handlers {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        messenger: Arc<dyn Messenger>,
        remuxer: Arc<dyn Remuxer>,
        hosted: Arc<dyn HostedMedia>,
        storage: Storage,
        chat_id: String,
        max_file_size: u64,
        save_files: bool,
    ) -> Self {
        Self {
            fetcher,
            messenger,
            remuxer,
            hosted,
            storage,
            chat_id,
            max_file_size,
            save_files,
        }
    }

    /// Run the handler for `kind` and convert any error into a `Failure`.
    pub async fn handle(&self, kind: PostKind, post: &Post) -> Outcome {
        let result = match kind {
            PostKind::NativeVideo => self.native_video(post).await,
            PostKind::InlineGif => self.inline_gif(post).await,
            PostKind::HostedVideo => self.hosted_video(post).await,
            PostKind::Unsupported => {
                return Outcome::Failure {
                    reason: UNSUPPORTED_REASON.to_string(),
                }
            }
        };

        match result {
            Ok(delivered) => Outcome::Success {
                source_url: delivered.source_url,
                local_path: delivered.local_path,
            },
            Err(e) => {
                tracing::error!("Error processing post {}: {}", post.id, e);
                Outcome::Failure {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Reddit-hosted video: separate DASH video/audio streams, muxed when
    /// an audio track exists.
    async fn native_video(&self, post: &Post) -> Result<Delivered> {
        let video_url = post
            .native_video_url()
            .ok_or_else(|| Error::Api("Post has no native video descriptor".into()))?
            .to_string();
        let audio_url = audio_url_for(&video_url);

        let temp_video = self.storage.temp_video_path(&post.id);
        let temp_audio = self.storage.temp_audio_path(&post.id);
        let final_video = self.storage.video_path(&post.id);

        self.fetcher.fetch(&video_url, &temp_video).await?;

        let have_audio = match self.fetcher.fetch(&audio_url, &temp_audio).await {
            Ok(_) => true,
            Err(e) if e.is_access_denied() => {
                tracing::info!("No audio for post {}", post.id);
                false
            }
            Err(e) => {
                tracing::warn!(
                    "Audio fetch failed for post {} ({}); sending video only",
                    post.id,
                    e
                );
                false
            }
        };

        if have_audio {
            self.remuxer
                .merge(&temp_video, &temp_audio, &final_video)
                .await?;
        } else {
            tokio::fs::rename(&temp_video, &final_video).await?;
        }

        self.deliver_sized(&final_video, &post.title).await?;

        remove_if_exists(&temp_video).await?;
        remove_if_exists(&temp_audio).await?;
        if !self.save_files {
            remove_if_exists(&final_video).await?;
        }

        Ok(Delivered {
            source_url: video_url,
            local_path: final_video,
        })
    }

    /// Directly linked GIF, delivered as an animation.
    async fn inline_gif(&self, post: &Post) -> Result<Delivered> {
        let gif_path = self.storage.gif_path(&post.id);

        self.fetcher.fetch(&post.url, &gif_path).await?;
        self.messenger
            .send_animation(&self.chat_id, &gif_path, &post.title)
            .await?;

        if !self.save_files {
            remove_if_exists(&gif_path).await?;
        }

        Ok(Delivered {
            source_url: post.url.clone(),
            local_path: gif_path,
        })
    }

    /// Third-party hosted video: resolve the embed id to a direct URL via
    /// the host's API, then fetch and deliver like any other video.
    async fn hosted_video(&self, post: &Post) -> Result<Delivered> {
        let html = post
            .embed_html()
            .ok_or_else(|| Error::Api("Post has no embed markup".into()))?;
        let media_id = extract_embed_id(html)
            .ok_or_else(|| Error::Api("Embed markup has no media id".into()))?;

        let media_url = self.hosted.resolve_hd_url(media_id).await?;

        let video_path = self.storage.video_path(&post.id);
        self.fetcher.fetch(&media_url, &video_path).await?;

        self.deliver_sized(&video_path, &post.title).await?;

        if !self.save_files {
            remove_if_exists(&video_path).await?;
        }

        Ok(Delivered {
            source_url: media_url,
            local_path: video_path,
        })
    }

    /// Deliver a file, routing by size: up to the configured limit it goes
    /// as a playable video, above that as a generic document.
    async fn deliver_sized(&self, path: &Path, caption: &str) -> Result<()> {
        let size = tokio::fs::metadata(path).await?.len();

        if size <= self.max_file_size {
            self.messenger.send_video(&self.chat_id, path, caption).await
        } else {
            tracing::debug!(
                "{} is {} bytes, over the video limit; sending as document",
                path.display(),
                size
            );
            self.messenger
                .send_document(&self.chat_id, path, caption)
                .await
        }
    }
}

/// Derive the DASH audio stream URL from a video stream URL.
///
/// The audio track lives next to the video under the same path prefix:
/// everything before `DASH_` plus `audio`.
pub fn audio_url_for(video_url: &str) -> String {
    let prefix = video_url.split("DASH_").next().unwrap_or(video_url);
    format!("{}audio", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fakes::*;

    const VIDEO_URL: &str = "https://v.redd.it/xyz/DASH_720.mp4";
    const AUDIO_URL: &str = "https://v.redd.it/xyz/audio";

    fn native_video_post() -> Post {
        let json = format!(
            r#"{{
                "id": "abc123",
                "title": "a video",
                "url": "https://v.redd.it/xyz",
                "domain": "v.redd.it",
                "is_video": true,
                "media": {{"reddit_video": {{"fallback_url": "{}"}}}}
            }}"#,
            VIDEO_URL
        );
        serde_json::from_str(&json).unwrap()
    }

    fn hosted_video_post() -> Post {
        let json = r#"{
            "id": "abc123",
            "title": "hosted",
            "url": "https://redgifs.com/watch/someid",
            "domain": "redgifs.com",
            "post_hint": "rich:video",
            "media": {"oembed": {"html": "<iframe src=\"https://www.redgifs.com/ifr/someid\"></iframe>"}}
        }"#;
        serde_json::from_str(json).unwrap()
    }

    fn gif_post() -> Post {
        Post {
            id: "abc123".to_string(),
            title: "a gif".to_string(),
            url: "https://i.redd.it/thing.gif".to_string(),
            domain: "i.redd.it".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_audio_url_derivation() {
        assert_eq!(audio_url_for(VIDEO_URL), AUDIO_URL);
        assert_eq!(
            audio_url_for("https://v.redd.it/abc/DASH_1080.mp4?source=fallback"),
            "https://v.redd.it/abc/audio"
        );
    }

    #[tokio::test]
    async fn test_native_video_with_audio_remuxes() {
        let env = TestEnv::new();
        env.fetcher.respond(VIDEO_URL, FetchResult::Bytes(1_000));
        env.fetcher.respond(AUDIO_URL, FetchResult::Bytes(100));

        let outcome = env.handlers().handle(PostKind::NativeVideo, &native_video_post()).await;

        let Outcome::Success { source_url, local_path } = outcome else {
            panic!("expected success");
        };
        assert_eq!(source_url, VIDEO_URL);
        assert_eq!(local_path, env.storage().video_path("abc123"));
        assert_eq!(env.remuxer.call_count(), 1);
        assert_eq!(env.messenger.methods(), vec!["sendVideo"]);
        // Temps are gone, artifact is kept.
        assert!(!env.storage().temp_video_path("abc123").exists());
        assert!(!env.storage().temp_audio_path("abc123").exists());
        assert!(local_path.exists());
    }

    #[tokio::test]
    async fn test_native_video_silent_when_audio_denied() {
        let env = TestEnv::new();
        env.fetcher.respond(VIDEO_URL, FetchResult::Bytes(1_000));
        env.fetcher.respond(AUDIO_URL, FetchResult::Status(403));

        let outcome = env.handlers().handle(PostKind::NativeVideo, &native_video_post()).await;

        let Outcome::Success { local_path, .. } = outcome else {
            panic!("expected success");
        };
        // Video-only artifact, no remux.
        assert_eq!(env.remuxer.call_count(), 0);
        assert_eq!(local_path, env.storage().video_path("abc123"));
        assert!(local_path.exists());
        assert_eq!(env.messenger.methods(), vec!["sendVideo"]);
    }

    #[tokio::test]
    async fn test_native_video_other_audio_error_falls_back() {
        let env = TestEnv::new();
        env.fetcher.respond(VIDEO_URL, FetchResult::Bytes(1_000));
        env.fetcher.respond(AUDIO_URL, FetchResult::Status(500));

        let outcome = env.handlers().handle(PostKind::NativeVideo, &native_video_post()).await;

        assert!(matches!(outcome, Outcome::Success { .. }));
        assert_eq!(env.remuxer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_native_video_fetch_failure_is_failure() {
        let env = TestEnv::new();
        env.fetcher.respond(VIDEO_URL, FetchResult::Status(500));

        let outcome = env.handlers().handle(PostKind::NativeVideo, &native_video_post()).await;

        let Outcome::Failure { reason } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(reason, format!("HTTP 500 while fetching {}", VIDEO_URL));
    }

    #[tokio::test]
    async fn test_remux_failure_is_failure() {
        let env = TestEnv::new();
        env.fetcher.respond(VIDEO_URL, FetchResult::Bytes(1_000));
        env.fetcher.respond(AUDIO_URL, FetchResult::Bytes(100));
        env.remuxer.fail_with("merge blew up");

        let outcome = env.handlers().handle(PostKind::NativeVideo, &native_video_post()).await;

        let Outcome::Failure { reason } = outcome else {
            panic!("expected failure");
        };
        assert!(reason.contains("merge blew up"));
        assert!(env.messenger.methods().is_empty());
    }

    #[tokio::test]
    async fn test_gif_delivered_as_animation() {
        let env = TestEnv::new();
        let post = gif_post();
        env.fetcher.respond(&post.url, FetchResult::Bytes(500));

        let outcome = env.handlers().handle(PostKind::InlineGif, &post).await;

        let Outcome::Success { source_url, local_path } = outcome else {
            panic!("expected success");
        };
        assert_eq!(source_url, post.url);
        assert_eq!(local_path, env.storage().gif_path("abc123"));

        let sent = env.messenger.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, "sendAnimation");
        assert_eq!(sent[0].caption, "a gif");
        assert_eq!(sent[0].path, env.storage().gif_path("abc123"));
    }

    #[tokio::test]
    async fn test_retention_off_removes_artifact() {
        let mut env = TestEnv::new();
        env.save_files = false;
        let post = gif_post();
        env.fetcher.respond(&post.url, FetchResult::Bytes(500));

        let outcome = env.handlers().handle(PostKind::InlineGif, &post).await;

        let Outcome::Success { local_path, .. } = outcome else {
            panic!("expected success");
        };
        assert!(!local_path.exists());
    }

    #[tokio::test]
    async fn test_hosted_video_resolves_and_delivers() {
        let env = TestEnv::new();
        env.hosted.resolve_to("https://media.example/someid-hd.mp4");
        env.fetcher
            .respond("https://media.example/someid-hd.mp4", FetchResult::Bytes(2_000));

        let outcome = env.handlers().handle(PostKind::HostedVideo, &hosted_video_post()).await;

        let Outcome::Success { source_url, .. } = outcome else {
            panic!("expected success");
        };
        assert_eq!(source_url, "https://media.example/someid-hd.mp4");
        assert_eq!(env.hosted.requested_ids(), vec!["someid"]);
        assert_eq!(env.messenger.methods(), vec!["sendVideo"]);
    }

    #[tokio::test]
    async fn test_hosted_video_resolver_failure_is_failure() {
        let env = TestEnv::new();
        env.hosted.fail_with("Failed to get token");

        let outcome = env.handlers().handle(PostKind::HostedVideo, &hosted_video_post()).await;

        let Outcome::Failure { reason } = outcome else {
            panic!("expected failure");
        };
        assert!(reason.contains("Failed to get token"));
    }

    #[tokio::test]
    async fn test_size_routing_at_threshold() {
        // Exactly at the limit goes as video...
        let env = TestEnv::new();
        let post = hosted_video_post();
        env.hosted.resolve_to("https://media.example/big.mp4");
        env.fetcher.respond(
            "https://media.example/big.mp4",
            FetchResult::Bytes(52_428_800),
        );
        env.handlers().handle(PostKind::HostedVideo, &post).await;
        assert_eq!(env.messenger.methods(), vec!["sendVideo"]);

        // ...one byte over goes as document.
        let env = TestEnv::new();
        env.hosted.resolve_to("https://media.example/big.mp4");
        env.fetcher.respond(
            "https://media.example/big.mp4",
            FetchResult::Bytes(52_428_801),
        );
        env.handlers().handle(PostKind::HostedVideo, &post).await;
        assert_eq!(env.messenger.methods(), vec!["sendDocument"]);
    }
}
