//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;

/// Reddit-to-Telegram media forwarder CLI.
#[derive(Parser, Debug)]
#[command(
    name = "reddit-forwarder",
    version,
    about = "Forward upvoted Reddit media posts to a Telegram chat",
    long_about = "A daemon that polls your upvoted Reddit posts, downloads native videos,\n\
                  GIFs and RedGifs-hosted videos, and forwards them to a Telegram chat.\n\n\
                  Every post is recorded in a persistent ledger so it is handled at most once."
)]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Reddit script-app client id.
    #[arg(long, env = "REDDIT_CLIENT_ID")]
    pub reddit_client_id: Option<String>,

    /// Reddit script-app client secret.
    #[arg(long, env = "REDDIT_CLIENT_SECRET")]
    pub reddit_client_secret: Option<String>,

    /// Reddit account username.
    #[arg(long, env = "REDDIT_USERNAME")]
    pub reddit_username: Option<String>,

    /// Reddit account password.
    #[arg(long, env = "REDDIT_PASSWORD")]
    pub reddit_password: Option<String>,

    /// Telegram bot API token.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN")]
    pub bot_token: Option<String>,

    /// Telegram destination chat id.
    #[arg(long, env = "TELEGRAM_CHAT_ID")]
    pub chat_id: Option<String>,

    /// Directory where fetched media is staged.
    #[arg(short = 'd', long = "storage")]
    pub storage_path: Option<PathBuf>,

    /// Seconds between polling passes.
    #[arg(long)]
    pub interval: Option<u64>,

    /// Largest file size (bytes) delivered as video/animation.
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Delete delivered files instead of keeping them.
    #[arg(long)]
    pub no_save_files: bool,

    /// What to run.
    #[arg(long, value_enum, default_value = "run")]
    pub mode: ModeArg,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI run mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Run the polling pipeline until terminated.
    Run,
    /// Discard the ledger's excluded list (keeps downloads) and exit.
    ResetLedger,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(client_id) = self.reddit_client_id {
            config.reddit.client_id = client_id;
        }

        if let Some(client_secret) = self.reddit_client_secret {
            config.reddit.client_secret = client_secret;
        }

        if let Some(username) = self.reddit_username {
            config.reddit.username = username;
        }

        if let Some(password) = self.reddit_password {
            config.reddit.password = password;
        }

        if let Some(bot_token) = self.bot_token {
            config.telegram.bot_token = bot_token;
        }

        if let Some(chat_id) = self.chat_id {
            config.telegram.chat_id = chat_id;
        }

        if let Some(storage_path) = self.storage_path {
            config.options.storage_path = storage_path;
        }

        if let Some(interval) = self.interval {
            config.options.poll_interval_seconds = interval;
        }

        if let Some(max_file_size) = self.max_file_size {
            config.options.max_file_size = max_file_size;
        }

        if self.no_save_files {
            config.options.save_files = false;
        }
    }
}
