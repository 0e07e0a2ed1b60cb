//! RedGifs API HTTP client.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::redgifs::HostedMedia;

/// RedGifs API base URL.
const API_BASE: &str = "https://api.redgifs.com";

/// The API refuses requests that don't look like they come from the site.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GifResponse {
    gif: GifInfo,
}

#[derive(Debug, Deserialize)]
struct GifInfo {
    urls: GifUrls,
}

#[derive(Debug, Deserialize)]
struct GifUrls {
    hd: Option<String>,
    sd: Option<String>,
}

/// RedGifs API client using short-lived temporary tokens.
pub struct RedgifsClient {
    client: Client,
}

impl RedgifsClient {
    /// Create a new API client.
    pub fn new() -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, "application/json".parse().unwrap());
        headers.insert(header::ORIGIN, "https://www.redgifs.com".parse().unwrap());
        headers.insert(header::REFERER, "https://www.redgifs.com/".parse().unwrap());

        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Obtain a short-lived bearer token from the public auth endpoint.
    async fn temporary_token(&self) -> Result<String> {
        let url = format!("{}/v2/auth/temporary", API_BASE);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Authentication(format!(
                "Temporary token request failed: HTTP {}",
                status
            )));
        }

        let token: TokenResponse = response.json().await?;
        token
            .token
            .ok_or_else(|| Error::Authentication("Token response had no token".into()))
    }
}

#[async_trait]
impl HostedMedia for RedgifsClient {
    async fn resolve_hd_url(&self, media_id: &str) -> Result<String> {
        let token = self.temporary_token().await?;

        let url = format!("{}/v2/gifs/{}", API_BASE, media_id);
        tracing::debug!("GET {}", url);

        let response = self.client.get(&url).bearer_auth(&token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Api(format!(
                "Media lookup failed: HTTP {} for {}",
                status, media_id
            )));
        }

        let text = response.text().await?;
        let info: GifResponse = serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse media info: {} - Response: {}",
                e,
                &text[..text.len().min(500)]
            ))
        })?;

        info.gif
            .urls
            .hd
            .or(info.gif.urls.sd)
            .ok_or_else(|| Error::Api(format!("No media URL for {}", media_id)))
    }
}
