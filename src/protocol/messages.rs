use serde::{Deserialize, Serialize};

use crate::leaderboard::LeaderboardEntry;

// ── Server → Client ──

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

/// Payload of both leaderboard routes.
#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
    pub total: usize,
}

/// Client-side view of the same payload. Entries stay raw JSON until
/// `rules::normalize_entries` has vetted them; a response without the field
/// is simply an empty board.
#[derive(Debug, Deserialize)]
pub struct RawLeaderboardResponse {
    #[serde(default)]
    pub entries: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
