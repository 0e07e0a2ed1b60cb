//! Post classification.
//!
//! Maps a post to the handler that knows how to retrieve its media. The
//! checks overlap (a native video post can also carry a `.gif` URL), so the
//! order is significant: first match wins.

use crate::reddit::Post;

/// The hint value Reddit puts on embedded third-party video posts.
const RICH_VIDEO_HINT: &str = "rich:video";

/// Handler category for a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostKind {
    /// Reddit-hosted video with separate DASH video/audio streams.
    NativeVideo,
    /// Directly linked GIF (or imgur gifv).
    InlineGif,
    /// Video embedded from a known third-party host.
    HostedVideo,
    /// Nothing we can retrieve.
    Unsupported,
}

/// Classify a post. Pure function of the post's declared attributes.
pub fn classify(post: &Post, video_hosts: &[String]) -> PostKind {
    if post.is_video {
        return PostKind::NativeVideo;
    }

    if post.url.ends_with(".gif") || post.url.contains("gifv") {
        return PostKind::InlineGif;
    }

    let is_video_host = video_hosts.iter().any(|host| post.domain == *host);
    if is_video_host && post.post_hint.as_deref() == Some(RICH_VIDEO_HINT) {
        return PostKind::HostedVideo;
    }

    PostKind::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> Vec<String> {
        vec!["redgifs.com".to_string(), "v3.redgifs.com".to_string()]
    }

    fn post(url: &str, domain: &str) -> Post {
        Post {
            id: "abc123".to_string(),
            title: "a post".to_string(),
            url: url.to_string(),
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_native_video() {
        let mut p = post("https://v.redd.it/xyz", "v.redd.it");
        p.is_video = true;
        assert_eq!(classify(&p, &hosts()), PostKind::NativeVideo);
    }

    #[test]
    fn test_native_video_wins_over_gif_url() {
        // Order matters: the is_video flag takes precedence over the URL.
        let mut p = post("https://i.imgur.com/thing.gif", "i.imgur.com");
        p.is_video = true;
        assert_eq!(classify(&p, &hosts()), PostKind::NativeVideo);
    }

    #[test]
    fn test_gif_by_extension() {
        let p = post("https://i.redd.it/thing.gif", "i.redd.it");
        assert_eq!(classify(&p, &hosts()), PostKind::InlineGif);
    }

    #[test]
    fn test_gif_by_gifv_substring() {
        let p = post("https://i.imgur.com/thing.gifv", "i.imgur.com");
        assert_eq!(classify(&p, &hosts()), PostKind::InlineGif);
    }

    #[test]
    fn test_hosted_video_needs_domain_and_hint() {
        let mut p = post("https://redgifs.com/watch/thing", "redgifs.com");
        assert_eq!(classify(&p, &hosts()), PostKind::Unsupported);

        p.post_hint = Some("rich:video".to_string());
        assert_eq!(classify(&p, &hosts()), PostKind::HostedVideo);

        // Right hint, wrong domain
        let mut q = post("https://example.com/watch/thing", "example.com");
        q.post_hint = Some("rich:video".to_string());
        assert_eq!(classify(&q, &hosts()), PostKind::Unsupported);
    }

    #[test]
    fn test_alternate_host_domain() {
        let mut p = post("https://v3.redgifs.com/watch/thing", "v3.redgifs.com");
        p.post_hint = Some("rich:video".to_string());
        assert_eq!(classify(&p, &hosts()), PostKind::HostedVideo);
    }

    #[test]
    fn test_plain_link_is_unsupported() {
        let p = post("https://example.com/article", "example.com");
        assert_eq!(classify(&p, &hosts()), PostKind::Unsupported);
    }

    #[test]
    fn test_classification_is_stable() {
        let mut p = post("https://i.redd.it/thing.gif", "i.redd.it");
        p.post_hint = Some("image".to_string());
        let first = classify(&p, &hosts());
        for _ in 0..10 {
            assert_eq!(classify(&p, &hosts()), first);
        }
    }
}
