//! Staging path construction.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Storage root under which fetched media and remuxed outputs are staged.
///
/// Owned by the pipeline driver; handlers are given concrete paths built
/// here, never the root itself.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Create the storage root if needed.
    pub fn create(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Staging path for a native video stream before muxing.
    pub fn temp_video_path(&self, post_id: &str) -> PathBuf {
        self.root.join(format!("temp_video_{}.mp4", post_id))
    }

    /// Staging path for a native audio stream before muxing.
    pub fn temp_audio_path(&self, post_id: &str) -> PathBuf {
        self.root.join(format!("temp_audio_{}.mp4", post_id))
    }

    /// Final artifact path for a video post.
    pub fn video_path(&self, post_id: &str) -> PathBuf {
        self.root.join(format!("video_{}.mp4", post_id))
    }

    /// Final artifact path for a GIF post.
    pub fn gif_path(&self, post_id: &str) -> PathBuf {
        self.root.join(format!("gif_{}.gif", post_id))
    }
}

/// Remove a file, ignoring it if it's already gone.
pub async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_paths_are_per_post() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::create(dir.path()).unwrap();

        assert_eq!(
            storage.temp_video_path("abc123"),
            dir.path().join("temp_video_abc123.mp4")
        );
        assert_eq!(
            storage.temp_audio_path("abc123"),
            dir.path().join("temp_audio_abc123.mp4")
        );
        assert_eq!(
            storage.video_path("abc123"),
            dir.path().join("video_abc123.mp4")
        );
        assert_eq!(storage.gif_path("abc123"), dir.path().join("gif_abc123.gif"));
    }

    #[test]
    fn test_create_makes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("media").join("staging");
        Storage::create(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_remove_if_exists_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.mp4");
        assert!(remove_if_exists(&path).await.is_ok());

        std::fs::write(&path, b"data").unwrap();
        remove_if_exists(&path).await.unwrap();
        assert!(!path.exists());
    }
}
