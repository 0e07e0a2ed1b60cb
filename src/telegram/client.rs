//! Telegram Bot API HTTP client.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::Deserialize;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::{Error, Result};
use crate::telegram::Messenger;

/// Telegram Bot API base URL.
const API_BASE: &str = "https://api.telegram.org";

/// Bot API response envelope.
#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

/// Bot identity from `getMe`.
#[derive(Debug, Deserialize)]
pub struct BotInfo {
    pub username: Option<String>,
}

/// Telegram bot client.
pub struct TelegramBot {
    client: Client,
    token: String,
}

impl TelegramBot {
    /// Create a new bot client.
    pub fn new(token: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Delivery(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, token })
    }

    /// Validate the token by fetching the bot's identity.
    pub async fn get_me(&self) -> Result<BotInfo> {
        let url = self.method_url("getMe");
        let response = self.client.get(&url).send().await?;
        let reply: ApiReply<BotInfo> = response.json().await.map_err(|e| {
            Error::Authentication(format!("Failed to parse getMe response: {}", e))
        })?;

        if !reply.ok {
            return Err(Error::Authentication(format!(
                "getMe rejected: {}",
                reply.description.unwrap_or_else(|| "unknown error".into())
            )));
        }

        reply
            .result
            .ok_or_else(|| Error::Authentication("getMe returned no result".into()))
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    /// Upload a file via multipart and check the API reply.
    async fn send_file(
        &self,
        method: &str,
        field: &str,
        chat_id: &str,
        path: &Path,
        caption: &str,
    ) -> Result<()> {
        let file = File::open(path).await?;
        let length = file.metadata().await?.len();

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
            .file_name(filename);

        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part(field.to_string(), part);

        tracing::debug!("POST {} ({} bytes)", method, length);

        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let reply: ApiReply<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| Error::Delivery(format!("Failed to parse {} response: {}", method, e)))?;

        if !status.is_success() || !reply.ok {
            return Err(Error::Delivery(format!(
                "{} failed (HTTP {}): {}",
                method,
                status,
                reply.description.unwrap_or_else(|| "unknown error".into())
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramBot {
    async fn send_video(&self, chat_id: &str, file: &Path, caption: &str) -> Result<()> {
        self.send_file("sendVideo", "video", chat_id, file, caption)
            .await
    }

    async fn send_animation(&self, chat_id: &str, file: &Path, caption: &str) -> Result<()> {
        self.send_file("sendAnimation", "animation", chat_id, file, caption)
            .await
    }

    async fn send_document(&self, chat_id: &str, file: &Path, caption: &str) -> Result<()> {
        self.send_file("sendDocument", "document", chat_id, file, caption)
            .await
    }
}
