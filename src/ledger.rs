//! Persistent processing ledger.
//!
//! The ledger is the sole source of truth for "has this post already been
//! handled." It keeps two lists — successfully forwarded posts and excluded
//! posts — and rewrites its backing JSON file on every mutation, so a crash
//! between pipeline steps never loses a committed decision.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A post that was downloaded and forwarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadedEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    /// Where the final artifact was staged. The file itself may have been
    /// removed afterwards when `save_files` is off.
    pub file_path: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A post that was quarantined and will never be retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExcludedEntry {
    pub id: String,
    pub title: String,
    pub reason: String,
    pub timestamp: DateTime<Utc>,
}

/// Persisted ledger shape: `{"downloaded": [...], "excluded": [...]}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerData {
    #[serde(default)]
    downloaded: Vec<DownloadedEntry>,
    #[serde(default)]
    excluded: Vec<ExcludedEntry>,
}

/// Dedup ledger backed by a JSON file.
#[derive(Debug)]
pub struct Ledger {
    path: PathBuf,
    data: LedgerData,
}

impl Ledger {
    /// Open the ledger at `path`, creating an empty one if the file does
    /// not exist.
    ///
    /// A file that fails to parse resets the ledger to empty. This discards
    /// prior history, which means already-forwarded posts will be delivered
    /// again on the next pass; the warning makes the rebuilt state visible.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = if path.exists() {
            let content = fs::read_to_string(path)?;
            match serde_json::from_str::<LedgerData>(&content) {
                Ok(data) => data,
                Err(e) => {
                    tracing::warn!(
                        "Ledger file {} is corrupt ({}); rebuilding empty ledger",
                        path.display(),
                        e
                    );
                    LedgerData::default()
                }
            }
        } else {
            LedgerData::default()
        };

        let ledger = Self {
            path: path.to_path_buf(),
            data,
        };
        ledger.flush()?;

        Ok(ledger)
    }

    /// Whether a post id has been handled, either way.
    pub fn contains(&self, id: &str) -> bool {
        self.is_downloaded(id) || self.is_excluded(id)
    }

    /// Whether a post id is in the downloaded list.
    pub fn is_downloaded(&self, id: &str) -> bool {
        self.data.downloaded.iter().any(|entry| entry.id == id)
    }

    /// Whether a post id is in the excluded list.
    pub fn is_excluded(&self, id: &str) -> bool {
        self.data.excluded.iter().any(|entry| entry.id == id)
    }

    /// Record a successful download.
    ///
    /// No-op if the id is already present in either list: an id lives in at
    /// most one list, at most once.
    pub fn add_downloaded(
        &mut self,
        id: &str,
        title: &str,
        url: &str,
        file_path: Option<&Path>,
    ) -> Result<()> {
        if self.contains(id) {
            return Ok(());
        }

        self.data.downloaded.push(DownloadedEntry {
            id: id.to_string(),
            title: title.to_string(),
            url: url.to_string(),
            file_path: file_path.map(|p| p.display().to_string()),
            timestamp: Utc::now(),
        });
        self.flush()
    }

    /// Record an exclusion. Same single-membership rule as `add_downloaded`.
    pub fn add_excluded(&mut self, id: &str, title: &str, reason: &str) -> Result<()> {
        if self.contains(id) {
            return Ok(());
        }

        self.data.excluded.push(ExcludedEntry {
            id: id.to_string(),
            title: title.to_string(),
            reason: reason.to_string(),
            timestamp: Utc::now(),
        });
        self.flush()
    }

    /// Maintenance operation: keep the downloaded list, discard exclusions.
    ///
    /// Used to recover when transient errors were recorded as permanent
    /// exclusions. Returns the number of entries discarded.
    pub fn reset_excluded(&mut self) -> Result<usize> {
        let discarded = self.data.excluded.len();
        self.data.excluded.clear();
        self.flush()?;
        Ok(discarded)
    }

    /// Number of downloaded entries.
    pub fn downloaded_count(&self) -> usize {
        self.data.downloaded.len()
    }

    /// Number of excluded entries.
    pub fn excluded_count(&self) -> usize {
        self.data.excluded.len()
    }

    /// Excluded entries, oldest first.
    pub fn excluded_entries(&self) -> &[ExcludedEntry] {
        &self.data.excluded
    }

    /// Reason recorded for an excluded post, if any.
    pub fn exclusion_reason(&self, id: &str) -> Option<&str> {
        self.data
            .excluded
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| entry.reason.as_str())
    }

    /// Rewrite the backing file in full.
    fn flush(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_ledger() -> (tempfile::TempDir, Ledger) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(&dir.path().join("posts.json")).unwrap();
        (dir, ledger)
    }

    #[test]
    fn test_open_creates_empty_ledger() {
        let (dir, ledger) = temp_ledger();
        assert_eq!(ledger.downloaded_count(), 0);
        assert_eq!(ledger.excluded_count(), 0);
        assert!(dir.path().join("posts.json").exists());
    }

    #[test]
    fn test_add_downloaded_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");

        {
            let mut ledger = Ledger::open(&path).unwrap();
            ledger
                .add_downloaded("abc123", "a title", "https://v.redd.it/x", None)
                .unwrap();
        }

        let ledger = Ledger::open(&path).unwrap();
        assert!(ledger.is_downloaded("abc123"));
        assert!(!ledger.is_excluded("abc123"));
        assert_eq!(ledger.downloaded_count(), 1);
    }

    #[test]
    fn test_re_adding_same_id_is_noop() {
        let (_dir, mut ledger) = temp_ledger();
        ledger
            .add_downloaded("abc123", "a title", "https://v.redd.it/x", None)
            .unwrap();
        ledger
            .add_downloaded("abc123", "a title", "https://v.redd.it/x", None)
            .unwrap();
        assert_eq!(ledger.downloaded_count(), 1);

        ledger.add_excluded("def456", "other", "broken").unwrap();
        ledger.add_excluded("def456", "other", "broken").unwrap();
        assert_eq!(ledger.excluded_count(), 1);
    }

    #[test]
    fn test_lists_are_mutually_exclusive() {
        let (_dir, mut ledger) = temp_ledger();
        ledger
            .add_downloaded("abc123", "a title", "https://v.redd.it/x", None)
            .unwrap();
        ledger
            .add_excluded("abc123", "a title", "late failure")
            .unwrap();
        assert!(ledger.is_downloaded("abc123"));
        assert!(!ledger.is_excluded("abc123"));

        ledger.add_excluded("def456", "other", "broken").unwrap();
        ledger
            .add_downloaded("def456", "other", "https://v.redd.it/y", None)
            .unwrap();
        assert!(ledger.is_excluded("def456"));
        assert!(!ledger.is_downloaded("def456"));
    }

    #[test]
    fn test_reset_excluded_keeps_downloads() {
        let (_dir, mut ledger) = temp_ledger();
        for i in 0..3 {
            ledger
                .add_downloaded(&format!("dl{}", i), "t", "https://v.redd.it/x", None)
                .unwrap();
        }
        for i in 0..2 {
            ledger
                .add_excluded(&format!("ex{}", i), "t", "failed")
                .unwrap();
        }

        let discarded = ledger.reset_excluded().unwrap();
        assert_eq!(discarded, 2);
        assert_eq!(ledger.downloaded_count(), 3);
        assert_eq!(ledger.excluded_count(), 0);
    }

    #[test]
    fn test_corrupt_file_resets_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(&path, "{not valid json").unwrap();

        let ledger = Ledger::open(&path).unwrap();
        assert_eq!(ledger.downloaded_count(), 0);
        assert_eq!(ledger.excluded_count(), 0);

        // The rebuilt state is persisted immediately.
        let reread: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reread["downloaded"], serde_json::json!([]));
        assert_eq!(reread["excluded"], serde_json::json!([]));
    }

    #[test]
    fn test_exclusion_reason_is_preserved() {
        let (_dir, mut ledger) = temp_ledger();
        ledger
            .add_excluded("abc123", "a title", "HTTP 500 while fetching x")
            .unwrap();
        assert_eq!(
            ledger.exclusion_reason("abc123"),
            Some("HTTP 500 while fetching x")
        );
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.json");
        fs::write(&path, r#"{"downloaded": []}"#).unwrap();

        let ledger = Ledger::open(&path).unwrap();
        assert_eq!(ledger.excluded_count(), 0);
    }
}
