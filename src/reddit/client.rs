//! Reddit API HTTP client.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::config::RedditConfig;
use crate::error::{Error, Result};
use crate::reddit::types::{Listing, Post};
use crate::reddit::FeedSource;

/// OAuth token endpoint host.
const AUTH_BASE: &str = "https://www.reddit.com";

/// Authenticated API host.
const API_BASE: &str = "https://oauth.reddit.com";

/// Page size for listing requests.
const PAGE_LIMIT: u32 = 100;

/// Refresh the token this long before its reported expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

#[derive(Debug, Clone)]
struct BearerToken {
    value: String,
    expires_at: Instant,
}

impl BearerToken {
    fn is_expired(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN >= self.expires_at
    }
}

/// Reddit API client using script-app password-grant authentication.
pub struct RedditClient {
    client: Client,
    config: RedditConfig,
    token: RwLock<Option<BearerToken>>,
}

impl RedditClient {
    /// Create a new API client. Does not authenticate yet; the first
    /// request fetches a token.
    pub fn new(config: RedditConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            token: RwLock::new(None),
        })
    }

    /// Fetch a token now, verifying the credentials work.
    pub async fn validate_credentials(&self) -> Result<()> {
        self.bearer_token().await.map(|_| ())
    }

    /// Get a valid bearer token, refreshing if missing or near expiry.
    async fn bearer_token(&self) -> Result<String> {
        {
            let token = self.token.read().await;
            if let Some(token) = token.as_ref() {
                if !token.is_expired() {
                    return Ok(token.value.clone());
                }
            }
        }

        let mut token = self.token.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(token) = token.as_ref() {
            if !token.is_expired() {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let value = fresh.value.clone();
        *token = Some(fresh);
        Ok(value)
    }

    /// Request a fresh token via the password grant.
    async fn fetch_token(&self) -> Result<BearerToken> {
        let url = format!("{}/api/v1/access_token", AUTH_BASE);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Authentication(format!(
                "Token request failed: HTTP {}",
                status
            )));
        }

        let token: TokenResponse = response.json().await?;
        if let Some(error) = token.error {
            return Err(Error::Authentication(format!(
                "Token request rejected: {}",
                error
            )));
        }

        let value = token
            .access_token
            .ok_or_else(|| Error::Authentication("Token response had no access_token".into()))?;
        let expires_in = token.expires_in.unwrap_or(3600);

        tracing::debug!("Obtained bearer token, expires in {}s", expires_in);

        Ok(BearerToken {
            value,
            expires_at: Instant::now() + Duration::from_secs(expires_in),
        })
    }

    /// Make an authenticated GET request and return the response body.
    async fn get(&self, path: &str) -> Result<String> {
        let token = self.bearer_token().await?;
        let url = format!("{}{}", API_BASE, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == 401 || status == 403 {
            return Err(Error::Authentication(format!("HTTP {} for {}", status, url)));
        }
        if !status.is_success() {
            return Err(Error::Api(format!("HTTP {} for {}", status, url)));
        }

        Ok(response.text().await?)
    }

    /// Fetch one page of the upvoted listing.
    async fn upvoted_page(&self, after: Option<&str>) -> Result<Listing> {
        let mut path = format!(
            "/user/{}/upvoted?limit={}&raw_json=1",
            self.config.username, PAGE_LIMIT
        );
        if let Some(cursor) = after {
            path.push_str(&format!("&after={}", cursor));
        }

        let text = self.get(&path).await?;
        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse upvoted listing: {} - Response: {}",
                e,
                &text[..text.len().min(500)]
            ))
        })
    }
}

#[async_trait]
impl FeedSource for RedditClient {
    /// List all upvoted posts, following pagination cursors to the end.
    async fn upvoted(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let listing = self.upvoted_page(after.as_deref()).await?;
            posts.extend(listing.data.children.into_iter().map(|thing| thing.data));

            match listing.data.after {
                Some(cursor) if !cursor.is_empty() => after = Some(cursor),
                _ => break,
            }
        }

        tracing::debug!("Fetched {} upvoted posts", posts.len());
        Ok(posts)
    }
}
