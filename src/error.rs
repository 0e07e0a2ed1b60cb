//! Error types for the reddit-forwarder application.

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // API errors
    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    // Download errors
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Download failed: {0}")]
    Download(String),

    // Delivery errors
    #[error("Delivery failed: {0}")]
    Delivery(String),

    // External tool errors
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    #[error("FFmpeg not found. Please install ffmpeg and ensure it's in your PATH.")]
    FfmpegNotFound,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error is an HTTP 403 on a fetch.
    ///
    /// Reddit serves silent native videos without a DASH audio track; the
    /// CDN answers 403 for the derived audio URL in that case, so the video
    /// handler treats this as an expected condition rather than a failure.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Error::HttpStatus { status: 403, .. })
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const LEDGER_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_denied_matches_403_only() {
        let forbidden = Error::HttpStatus {
            status: 403,
            url: "https://v.redd.it/abc/DASH_audio".into(),
        };
        assert!(forbidden.is_access_denied());

        let not_found = Error::HttpStatus {
            status: 404,
            url: "https://v.redd.it/abc/DASH_audio".into(),
        };
        assert!(!not_found.is_access_denied());

        assert!(!Error::Download("connection reset".into()).is_access_denied());
    }
}
