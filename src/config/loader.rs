//! Configuration structures and loading logic.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reddit: RedditConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// Reddit script-app credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct RedditConfig {
    /// OAuth client id of the script application.
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret of the script application.
    #[serde(default)]
    pub client_secret: String,

    /// Account username (also the account whose upvotes are polled).
    #[serde(default)]
    pub username: String,

    /// Account password.
    #[serde(default)]
    pub password: String,

    /// User agent sent on every request. Reddit requires a descriptive one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Telegram bot credentials and destination.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token from @BotFather.
    #[serde(default)]
    pub bot_token: String,

    /// Destination chat id.
    #[serde(default)]
    pub chat_id: String,
}

/// Pipeline options.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionsConfig {
    /// Seconds to wait between polling passes, and after a failed pass.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,

    /// Largest file size (bytes) delivered as video/animation; anything
    /// bigger is sent as a document.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Whether to keep delivered files on disk.
    #[serde(default = "default_true")]
    pub save_files: bool,

    /// Directory where fetched media is staged.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Domains treated as third-party video hosts.
    #[serde(default = "default_video_hosts")]
    pub video_hosts: Vec<String>,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval(),
            max_file_size: default_max_file_size(),
            save_files: true,
            storage_path: default_storage_path(),
            video_hosts: default_video_hosts(),
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            username: String::new(),
            password: String::new(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("reddit-forwarder/{}", env!("CARGO_PKG_VERSION"))
}

fn default_poll_interval() -> u64 {
    60
}

fn default_max_file_size() -> u64 {
    // Telegram bot API upload cap.
    50 * 1024 * 1024
}

fn default_true() -> bool {
    true
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("data")
}

fn default_video_hosts() -> Vec<String> {
    vec!["redgifs.com".to_string(), "v3.redgifs.com".to_string()]
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Path of the persisted ledger file under the storage root.
    pub fn ledger_path(&self) -> PathBuf {
        self.options.storage_path.join("posts.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.options.poll_interval_seconds, 60);
        assert_eq!(config.options.max_file_size, 52_428_800);
        assert!(config.options.save_files);
        assert_eq!(config.options.storage_path, PathBuf::from("data"));
        assert_eq!(
            config.options.video_hosts,
            vec!["redgifs.com", "v3.redgifs.com"]
        );
    }

    #[test]
    fn test_load_overrides() {
        let config: Config = toml::from_str(
            r#"
            [reddit]
            client_id = "cid"
            client_secret = "secret"
            username = "someone"
            password = "hunter2"

            [telegram]
            bot_token = "123:abc"
            chat_id = "-100123"

            [options]
            poll_interval_seconds = 300
            save_files = false
            storage_path = "/tmp/media"
            "#,
        )
        .unwrap();

        assert_eq!(config.reddit.username, "someone");
        assert_eq!(config.telegram.chat_id, "-100123");
        assert_eq!(config.options.poll_interval_seconds, 300);
        assert!(!config.options.save_files);
        assert_eq!(config.ledger_path(), PathBuf::from("/tmp/media/posts.json"));
    }
}
