//! Reddit Forwarder - forwards upvoted Reddit media posts to Telegram.
//!
//! The pipeline polls the authenticated user's upvoted posts, classifies
//! each one by media type, downloads (and for native video, remuxes) the
//! media, delivers it to a Telegram chat, and records every decision in a
//! persistent ledger so no post is handled twice.
//!
//! # Features
//!
//! - Native Reddit video with DASH audio muxing (silent videos handled)
//! - Direct GIF links and imgur gifv
//! - RedGifs-hosted video via the public token API
//! - Size-based delivery routing (video vs. document)
//! - Crash-safe dedup ledger, flushed on every decision
//! - Quarantine-and-continue: one bad post never stops the pipeline
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use reddit_forwarder::{Config, Ledger};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let ledger = Ledger::open(&config.ledger_path())?;
//!     println!("{} posts forwarded so far", ledger.downloaded_count());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod fs;
pub mod ledger;
pub mod output;
pub mod pipeline;
pub mod reddit;
pub mod redgifs;
pub mod remux;
pub mod telegram;

// Re-exports for convenience
pub use classify::{classify, PostKind};
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::Ledger;
pub use pipeline::{Handlers, Outcome, Pipeline};
pub use reddit::{FeedSource, Post, RedditClient};
