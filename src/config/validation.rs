//! Configuration validation logic.

use regex::Regex;

use crate::config::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_reddit_credentials(config)?;
    validate_telegram_credentials(config)?;
    validate_options(config)?;

    Ok(())
}

/// Validate the Reddit script-app credentials.
fn validate_reddit_credentials(config: &Config) -> Result<()> {
    let reddit = &config.reddit;

    require_field("reddit.client_id", &reddit.client_id)?;
    require_field("reddit.client_secret", &reddit.client_secret)?;
    require_field("reddit.username", &reddit.username)?;
    require_field("reddit.password", &reddit.password)?;

    // Reddit usernames: 3-20 chars, alphanumeric, hyphens, underscores
    let username_pattern = Regex::new(r"^[a-zA-Z0-9_-]{3,20}$").unwrap();
    let clean_username = reddit.username.trim_start_matches("u/");
    if !username_pattern.is_match(clean_username) {
        return Err(Error::ConfigValidation {
            field: "reddit.username".to_string(),
            message: format!("'{}' is not a valid Reddit username", reddit.username),
        });
    }

    Ok(())
}

/// Validate the Telegram bot token and chat id.
fn validate_telegram_credentials(config: &Config) -> Result<()> {
    let telegram = &config.telegram;

    require_field("telegram.bot_token", &telegram.bot_token)?;
    require_field("telegram.chat_id", &telegram.chat_id)?;

    // Bot tokens look like "<numeric id>:<35-char secret>"
    let token_pattern = Regex::new(r"^\d+:[A-Za-z0-9_-]{30,}$").unwrap();
    if !token_pattern.is_match(&telegram.bot_token) {
        return Err(Error::ConfigValidation {
            field: "telegram.bot_token".to_string(),
            message: "Token does not look like a bot token (expected '<id>:<secret>')".to_string(),
        });
    }

    Ok(())
}

/// Validate pipeline options.
fn validate_options(config: &Config) -> Result<()> {
    if config.options.poll_interval_seconds == 0 {
        return Err(Error::ConfigValidation {
            field: "options.poll_interval_seconds".to_string(),
            message: "Poll interval must be at least 1 second".to_string(),
        });
    }

    if config.options.max_file_size == 0 {
        return Err(Error::ConfigValidation {
            field: "options.max_file_size".to_string(),
            message: "Max file size must be positive".to_string(),
        });
    }

    if config.options.video_hosts.is_empty() {
        return Err(Error::ConfigValidation {
            field: "options.video_hosts".to_string(),
            message: "At least one video host domain is required".to_string(),
        });
    }

    Ok(())
}

/// Reject empty and placeholder values.
fn require_field(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::MissingConfig(field.to_string()));
    }

    let lower = value.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your_") || lower == "changeme" {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: format!("'{}' appears to be a placeholder value", value),
        });
    }

    Ok(())
}
