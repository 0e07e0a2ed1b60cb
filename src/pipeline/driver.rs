//! The polling pipeline driver.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::classify::{classify, PostKind};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::pipeline::handlers::{Handlers, Outcome, UNSUPPORTED_REASON};
use crate::reddit::{FeedSource, Post};

/// Timed-wait abstraction so tests can drive the loop without real delays.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Production sleeper backed by the tokio timer.
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Counters for one full pass over the candidate posts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassStats {
    pub downloaded: u64,
    pub excluded: u64,
    pub skipped: u64,
}

/// Polls the feed and drives each new post through classify → handle →
/// ledger commit. Owns the ledger; handlers never touch it.
pub struct Pipeline {
    feed: Arc<dyn FeedSource>,
    handlers: Handlers,
    ledger: Ledger,
    video_hosts: Vec<String>,
    poll_interval: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl Pipeline {
    pub fn new(
        feed: Arc<dyn FeedSource>,
        handlers: Handlers,
        ledger: Ledger,
        video_hosts: Vec<String>,
        poll_interval: Duration,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            feed,
            handlers,
            ledger,
            video_hosts,
            poll_interval,
            sleeper,
        }
    }

    /// Run until `shutdown` is cancelled. Iteration-level failures are
    /// logged and retried after the poll interval; they never escape.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        loop {
            if shutdown.is_cancelled() {
                break;
            }

            match self.run_pass().await {
                Ok(stats) => {
                    tracing::info!(
                        "Pass complete: {} forwarded, {} excluded, {} skipped",
                        stats.downloaded,
                        stats.excluded,
                        stats.skipped
                    );
                }
                Err(e) => {
                    tracing::error!("Error in polling pass: {}", e);
                }
            }

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = self.sleeper.sleep(self.poll_interval) => {}
            }
        }

        tracing::info!("Shutting down");
    }

    /// One full pass: list candidates and dispatch each in turn.
    async fn run_pass(&mut self) -> Result<PassStats> {
        let posts = self.feed.upvoted().await?;
        tracing::debug!("Listing returned {} candidate posts", posts.len());

        let mut stats = PassStats::default();
        for post in &posts {
            self.dispatch(post, &mut stats).await?;
        }

        Ok(stats)
    }

    /// Handle one post and commit the outcome. Per-post failures end up in
    /// the excluded list; only ledger IO errors propagate.
    async fn dispatch(&mut self, post: &Post, stats: &mut PassStats) -> Result<()> {
        if self.ledger.contains(&post.id) {
            tracing::debug!("Post {} already handled, skipping", post.id);
            stats.skipped += 1;
            return Ok(());
        }

        let kind = classify(post, &self.video_hosts);
        tracing::info!("Processing post {} ({:?}): {}", post.id, kind, post.title);

        if kind == PostKind::Unsupported {
            self.ledger
                .add_excluded(&post.id, &post.title, UNSUPPORTED_REASON)?;
            stats.excluded += 1;
            return Ok(());
        }

        match self.handlers.handle(kind, post).await {
            Outcome::Success {
                source_url,
                local_path,
            } => {
                self.ledger.add_downloaded(
                    &post.id,
                    &post.title,
                    &source_url,
                    Some(&local_path),
                )?;
                stats.downloaded += 1;
            }
            Outcome::Failure { reason } => {
                self.ledger.add_excluded(&post.id, &post.title, &reason)?;
                stats.excluded += 1;
            }
        }

        Ok(())
    }

    /// The ledger, for inspection.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
