//! In-memory collaborator fakes for pipeline tests.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};
use crate::fetch::Fetcher;
use crate::fs::Storage;
use crate::pipeline::driver::Sleeper;
use crate::pipeline::Handlers;
use crate::redgifs::HostedMedia;
use crate::reddit::{FeedSource, Post};
use crate::remux::Remuxer;
use crate::telegram::Messenger;

/// Scripted response for a fetch URL.
#[derive(Debug, Clone, Copy)]
pub enum FetchResult {
    /// Produce a file of this many bytes.
    Bytes(u64),
    /// Fail with this HTTP status.
    Status(u16),
}

/// Fetcher that produces files of scripted sizes without the network.
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, FetchResult>>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn respond(&self, url: &str, result: FetchResult) {
        self.responses.lock().unwrap().insert(url.to_string(), result);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64> {
        self.calls.lock().unwrap().push(url.to_string());

        let result = self.responses.lock().unwrap().get(url).copied();
        match result {
            Some(FetchResult::Status(status)) => Err(Error::HttpStatus {
                status,
                url: url.to_string(),
            }),
            Some(FetchResult::Bytes(size)) => {
                // Sparse file: right length without allocating the bytes.
                let file = std::fs::File::create(dest)?;
                file.set_len(size)?;
                Ok(size)
            }
            None => Err(Error::Download(format!("no fake response for {}", url))),
        }
    }
}

/// Messenger that records which delivery method was used.
#[derive(Default)]
pub struct FakeMessenger {
    sent: Mutex<Vec<SentFile>>,
}

#[derive(Debug, Clone)]
pub struct SentFile {
    pub method: &'static str,
    pub path: PathBuf,
    pub caption: String,
}

impl FakeMessenger {
    fn record(&self, method: &'static str, path: &Path, caption: &str) {
        self.sent.lock().unwrap().push(SentFile {
            method,
            path: path.to_path_buf(),
            caption: caption.to_string(),
        });
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.sent.lock().unwrap().iter().map(|s| s.method).collect()
    }

    pub fn sent(&self) -> Vec<SentFile> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for FakeMessenger {
    async fn send_video(&self, _chat_id: &str, file: &Path, caption: &str) -> Result<()> {
        self.record("sendVideo", file, caption);
        Ok(())
    }

    async fn send_animation(&self, _chat_id: &str, file: &Path, caption: &str) -> Result<()> {
        self.record("sendAnimation", file, caption);
        Ok(())
    }

    async fn send_document(&self, _chat_id: &str, file: &Path, caption: &str) -> Result<()> {
        self.record("sendDocument", file, caption);
        Ok(())
    }
}

/// Remuxer that concatenates file lengths instead of running ffmpeg.
#[derive(Default)]
pub struct FakeRemuxer {
    calls: AtomicUsize,
    fail: Mutex<Option<String>>,
}

impl FakeRemuxer {
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_with(&self, message: &str) {
        *self.fail.lock().unwrap() = Some(message.to_string());
    }
}

#[async_trait]
impl Remuxer for FakeRemuxer {
    async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = self.fail.lock().unwrap().clone() {
            return Err(Error::Ffmpeg(message));
        }

        let size = std::fs::metadata(video)?.len() + std::fs::metadata(audio)?.len();
        let file = std::fs::File::create(output)?;
        file.set_len(size)?;
        Ok(())
    }
}

/// Hosted-media resolver returning a scripted URL.
#[derive(Default)]
pub struct FakeHosted {
    url: Mutex<Option<String>>,
    fail: Mutex<Option<String>>,
    requested: Mutex<Vec<String>>,
}

impl FakeHosted {
    pub fn resolve_to(&self, url: &str) {
        *self.url.lock().unwrap() = Some(url.to_string());
    }

    pub fn fail_with(&self, message: &str) {
        *self.fail.lock().unwrap() = Some(message.to_string());
    }

    pub fn requested_ids(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HostedMedia for FakeHosted {
    async fn resolve_hd_url(&self, media_id: &str) -> Result<String> {
        self.requested.lock().unwrap().push(media_id.to_string());

        if let Some(message) = self.fail.lock().unwrap().clone() {
            return Err(Error::Authentication(message));
        }

        self.url
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::Api("no fake media url configured".into()))
    }
}

/// Feed returning scripted posts, optionally failing first.
#[derive(Default)]
pub struct FakeFeed {
    posts: Mutex<Vec<Post>>,
    failures: AtomicUsize,
    calls: AtomicUsize,
}

impl FakeFeed {
    pub fn with_posts(posts: Vec<Post>) -> Self {
        Self {
            posts: Mutex::new(posts),
            ..Default::default()
        }
    }

    /// Make the next `n` listing calls fail.
    pub fn fail_next(&self, n: usize) {
        self.failures.store(n, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for FakeFeed {
    async fn upvoted(&self) -> Result<Vec<Post>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::Api("listing failed".into()));
        }

        Ok(self.posts.lock().unwrap().clone())
    }
}

/// Sleeper that returns instantly, recording requested durations. Can
/// cancel a token on sleep so driver loops exit deterministically.
#[derive(Default)]
pub struct FakeSleeper {
    slept: Mutex<Vec<Duration>>,
    cancel: Mutex<Option<CancellationToken>>,
}

impl FakeSleeper {
    /// Cancel `token` whenever the driver goes to sleep.
    pub fn cancel_on_sleep(&self, token: CancellationToken) {
        *self.cancel.lock().unwrap() = Some(token);
    }

    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for FakeSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
        if let Some(token) = self.cancel.lock().unwrap().as_ref() {
            token.cancel();
        }
    }
}

/// Bundle of fakes plus handler configuration for tests.
pub struct TestEnv {
    pub dir: tempfile::TempDir,
    pub fetcher: Arc<FakeFetcher>,
    pub messenger: Arc<FakeMessenger>,
    pub remuxer: Arc<FakeRemuxer>,
    pub hosted: Arc<FakeHosted>,
    pub max_file_size: u64,
    pub save_files: bool,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            fetcher: Arc::new(FakeFetcher::default()),
            messenger: Arc::new(FakeMessenger::default()),
            remuxer: Arc::new(FakeRemuxer::default()),
            hosted: Arc::new(FakeHosted::default()),
            max_file_size: 52_428_800,
            save_files: true,
        }
    }

    pub fn storage(&self) -> Storage {
        Storage::create(self.dir.path()).unwrap()
    }

    pub fn handlers(&self) -> Handlers {
        Handlers::new(
            self.fetcher.clone(),
            self.messenger.clone(),
            self.remuxer.clone(),
            self.hosted.clone(),
            self.storage(),
            "chat".to_string(),
            self.max_file_size,
            self.save_files,
        )
    }
}
