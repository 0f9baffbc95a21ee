use std::path::PathBuf;

use tokio::sync::Mutex;
use tracing::warn;

use super::rules::{self, MAX_LEADERBOARD_SIZE};
use super::{LeaderboardEntry, LeaderboardSubmission};

/// Durable leaderboard repository backed by a single JSON document.
///
/// Mutations run their whole read-merge-sort-truncate-persist cycle under
/// `write_lock` (a fair queue, so concurrent adds land one after another and
/// none gets lost). Reads skip the queue entirely and may observe either
/// side of an in-flight write.
pub struct LeaderboardStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        LeaderboardStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Top `limit` entries (clamped to 1..=50) in ranked order.
    pub async fn list(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let limit = limit.clamp(1, MAX_LEADERBOARD_SIZE);
        let mut entries = self.read_entries().await;
        entries.truncate(limit);
        entries
    }

    /// Append a submission (caller has already validated it) and return the
    /// full re-ranked snapshot.
    pub async fn add(
        &self,
        submission: &LeaderboardSubmission,
    ) -> Result<Vec<LeaderboardEntry>, String> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.read_entries().await;
        entries.push(rules::entry_from_submission(submission));
        rules::sort_leaderboard(&mut entries);
        entries.truncate(MAX_LEADERBOARD_SIZE);
        self.persist(&entries).await?;
        Ok(entries)
    }

    /// Missing file is an empty board; an unparsable one is reset to empty
    /// (the next successful `add` rewrites it) rather than failing the read.
    async fn read_entries(&self) -> Vec<LeaderboardEntry> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => return Vec::new(),
        };
        let entries = rules::parse_entries_json(&raw);
        if entries.is_empty() && !raw.trim().is_empty() && raw.trim() != "[]" {
            warn!(path = %self.path.display(), "leaderboard store unreadable, treating as empty");
        }
        entries
    }

    async fn persist(&self, entries: &[LeaderboardEntry]) -> Result<(), String> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .map_err(|e| format!("create data dir: {e}"))?;
            }
        }
        let json =
            serde_json::to_string_pretty(entries).map_err(|e| format!("encode leaderboard: {e}"))?;
        // write-then-rename keeps a crash from leaving a half-written board
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| format!("write leaderboard: {e}"))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| format!("replace leaderboard: {e}"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaderboard::InputMode;
    use std::sync::Arc;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("dojo-leaderboard-{}.json", Uuid::new_v4()))
    }

    fn submission(player: &str, score: f64) -> LeaderboardSubmission {
        LeaderboardSubmission {
            player: player.to_string(),
            score,
            accuracy: 65.0,
            max_combo: 2.0,
            input_mode: InputMode::Camera,
        }
    }

    #[tokio::test]
    async fn stores_and_ranks_entries() {
        let path = temp_path();
        let store = LeaderboardStore::new(&path);

        store.add(&submission("Alpha", 20.0)).await.unwrap();
        store.add(&submission("Beta", 60.0)).await.unwrap();

        let entries = store.list(10).await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].player, "Beta");
        assert_eq!(entries[1].player, "Alpha");

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let store = LeaderboardStore::new(temp_path());
        assert!(store.list(10).await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_resets_to_empty_and_heals_on_add() {
        let path = temp_path();
        tokio::fs::write(&path, "{definitely not json")
            .await
            .unwrap();

        let store = LeaderboardStore::new(&path);
        assert!(store.list(10).await.is_empty());

        let entries = store.add(&submission("Phoenix", 30.0)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(store.list(10).await.len(), 1);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn list_clamps_its_limit() {
        let path = temp_path();
        let store = LeaderboardStore::new(&path);
        for i in 0..3 {
            store
                .add(&submission(&format!("Player {i}"), i as f64 * 10.0))
                .await
                .unwrap();
        }
        assert_eq!(store.list(0).await.len(), 1);
        assert_eq!(store.list(500).await.len(), 3);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn concurrent_adds_all_land() {
        let path = temp_path();
        let store = Arc::new(LeaderboardStore::new(&path));

        let mut handles = Vec::new();
        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .add(&submission(&format!("Racer {i}"), i as f64))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.list(50).await.len(), 10, "no write may be lost");

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn board_never_grows_past_the_cap() {
        let path = temp_path();
        let store = LeaderboardStore::new(&path);
        for i in 0..55 {
            store
                .add(&submission(&format!("Player {i}"), i as f64))
                .await
                .unwrap();
        }
        let entries = store.list(50).await;
        assert_eq!(entries.len(), MAX_LEADERBOARD_SIZE);
        assert_eq!(entries[0].score, 54);
        // the lowest five were truncated away
        assert!(entries.iter().all(|e| e.score >= 5));

        let _ = tokio::fs::remove_file(&path).await;
    }
}
