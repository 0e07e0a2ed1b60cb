//! Muxing separate video and audio streams with ffmpeg.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Combines a video stream and an audio stream into one container.
#[async_trait]
pub trait Remuxer: Send + Sync {
    /// Mux `video` and `audio` into `output`.
    async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<()>;
}

/// Remuxer shelling out to ffmpeg.
pub struct FfmpegRemuxer;

#[async_trait]
impl Remuxer for FfmpegRemuxer {
    async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        let video_str = path_str(video)?;
        let audio_str = path_str(audio)?;
        let output_str = path_str(output)?;

        tracing::debug!("Muxing {} + {} -> {}", video_str, audio_str, output_str);

        let status = Command::new("ffmpeg")
            .args([
                "-y",
                "-i",
                video_str,
                "-i",
                audio_str,
                "-c:v",
                "copy",
                "-c:a",
                "aac",
                output_str,
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::FfmpegNotFound
                } else {
                    Error::Ffmpeg(format!("Failed to run ffmpeg: {}", e))
                }
            })?;

        if !status.success() {
            return Err(Error::Ffmpeg(format!(
                "ffmpeg exited with status: {}",
                status
            )));
        }

        Ok(())
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::Ffmpeg(format!("Invalid path encoding: {}", path.display())))
}
