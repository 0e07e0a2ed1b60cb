//! Telegram Bot API client.

pub mod client;

pub use client::TelegramBot;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;

/// Messaging destination for delivered media.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a file as a playable video.
    async fn send_video(&self, chat_id: &str, file: &Path, caption: &str) -> Result<()>;

    /// Send a file as an animation (GIF).
    async fn send_animation(&self, chat_id: &str, file: &Path, caption: &str) -> Result<()>;

    /// Send a file as a generic document.
    async fn send_document(&self, chat_id: &str, file: &Path, caption: &str) -> Result<()>;
}
