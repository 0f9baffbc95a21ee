pub mod rules;
pub mod service;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::engine::GameStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Camera,
    Pointer,
}

/// What a client sends after game over. Numbers arrive as raw JSON floats
/// and stay that way until `rules::normalize_submission` pins them down;
/// nothing here is trusted until `rules::is_valid_submission` says so.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardSubmission {
    pub player: String,
    pub score: f64,
    pub accuracy: f64,
    pub max_combo: f64,
    pub input_mode: InputMode,
}

impl LeaderboardSubmission {
    /// Bridge from a finished session to the wire payload.
    pub fn from_stats(player: impl Into<String>, stats: &GameStats, input_mode: InputMode) -> Self {
        LeaderboardSubmission {
            player: player.into(),
            score: stats.score as f64,
            accuracy: stats.accuracy() as f64,
            max_combo: stats.max_combo as f64,
            input_mode,
        }
    }
}

/// A ranked row. Immutable once created; ordering is defined by
/// `rules::sort_leaderboard` alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub id: String,
    pub player: String,
    pub score: u32,
    pub accuracy: u8,
    pub max_combo: u32,
    pub input_mode: InputMode,
    pub created_at: DateTime<Utc>,
}
