use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use super::rules::{self, MAX_LEADERBOARD_SIZE};
use super::{LeaderboardEntry, LeaderboardSubmission};
use crate::config::REQUEST_TIMEOUT_MS;
use crate::protocol::messages::RawLeaderboardResponse;

/// Offline-first leaderboard client.
///
/// With a base URL configured it talks to the remote API under a bounded
/// timeout and reconciles every successful response with the local cache
/// file; without one (or whenever the remote misbehaves) it runs purely on
/// the cache. Gameplay never sees an error from here — the worst case is a
/// local-only ranking.
pub struct LeaderboardService {
    base_url: Option<String>,
    cache_path: PathBuf,
    client: reqwest::Client,
}

impl LeaderboardService {
    pub fn new(base_url: Option<String>, cache_path: impl Into<PathBuf>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
            .build()
            .expect("failed to build HTTP client");
        LeaderboardService {
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
            cache_path: cache_path.into(),
            client,
        }
    }

    /// Top `limit` entries, remote when possible, cache otherwise.
    pub async fn fetch(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let limit = limit.clamp(1, MAX_LEADERBOARD_SIZE);
        let Some(base) = &self.base_url else {
            let mut local = self.read_cache().await;
            local.truncate(limit);
            return local;
        };

        let request = self.client.get(format!("{base}/leaderboard?limit={limit}"));
        match self.request_entries(request).await {
            Ok(remote) => {
                let mut merged = self.merge_with_cache(remote).await;
                merged.truncate(limit);
                merged
            }
            Err(err) => {
                warn!(%err, "leaderboard API unavailable, using local fallback");
                let mut local = self.read_cache().await;
                local.truncate(limit);
                local
            }
        }
    }

    /// Submit a finished run. Invalid payloads are rejected before any I/O;
    /// a failed remote call records the score locally so the player still
    /// sees it, and the next successful sync deduplicates.
    pub async fn submit(
        &self,
        submission: &LeaderboardSubmission,
    ) -> Result<Vec<LeaderboardEntry>, String> {
        if !rules::is_valid_submission(submission) {
            return Err("invalid leaderboard submission".to_string());
        }
        let normalized = rules::normalize_submission(submission);

        let Some(base) = &self.base_url else {
            return Ok(self.record_locally(&normalized).await);
        };

        let request = self
            .client
            .post(format!("{base}/leaderboard"))
            .json(&normalized);
        match self.request_entries(request).await {
            Ok(remote) => Ok(self.merge_with_cache(remote).await),
            Err(err) => {
                warn!(%err, "score submission failed, keeping local copy");
                Ok(self.record_locally(&normalized).await)
            }
        }
    }

    async fn request_entries(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<LeaderboardEntry>, String> {
        let response = request.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("request failed with status {status}"));
        }
        let body: RawLeaderboardResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(rules::normalize_entries(&body.entries))
    }

    /// Offline-tolerant merge: remote wins ranking, the cache keeps scores
    /// the server hasn't seen yet, identity dedup stops them doubling up
    /// once it has. The merged snapshot becomes the new cache.
    async fn merge_with_cache(&self, remote: Vec<LeaderboardEntry>) -> Vec<LeaderboardEntry> {
        let mut merged = remote;
        merged.extend(self.read_cache().await);
        rules::sort_leaderboard(&mut merged);
        let mut seen = HashSet::new();
        merged.retain(|entry| seen.insert(entry.id.clone()));
        merged.truncate(MAX_LEADERBOARD_SIZE);
        self.write_cache(&merged).await;
        merged
    }

    async fn record_locally(&self, normalized: &LeaderboardSubmission) -> Vec<LeaderboardEntry> {
        let mut merged = vec![rules::entry_from_submission(normalized)];
        merged.extend(self.read_cache().await);
        rules::sort_leaderboard(&mut merged);
        merged.truncate(MAX_LEADERBOARD_SIZE);
        self.write_cache(&merged).await;
        merged
    }

    async fn read_cache(&self) -> Vec<LeaderboardEntry> {
        match tokio::fs::read_to_string(&self.cache_path).await {
            Ok(raw) => rules::parse_entries_json(&raw),
            Err(_) => Vec::new(),
        }
    }

    /// Best effort: a cache we cannot write is a warning, not a failure.
    async fn write_cache(&self, entries: &[LeaderboardEntry]) {
        if let Some(dir) = self.cache_path.parent() {
            if !dir.as_os_str().is_empty() {
                let _ = tokio::fs::create_dir_all(dir).await;
            }
        }
        match serde_json::to_string(entries) {
            Ok(json) => {
                if let Err(err) = tokio::fs::write(&self.cache_path, json).await {
                    warn!(%err, "failed to write local leaderboard cache");
                }
            }
            Err(err) => warn!(%err, "failed to encode local leaderboard cache"),
        }
    }
}
