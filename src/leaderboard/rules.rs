use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::{InputMode, LeaderboardEntry, LeaderboardSubmission};

pub const MIN_PLAYER_LENGTH: usize = 2;
pub const MAX_PLAYER_LENGTH: usize = 24;
pub const MAX_SCORE: f64 = 999_999.0;
pub const MAX_COMBO: f64 = 999.0;
pub const MAX_LEADERBOARD_SIZE: usize = 50;

/// Trim, collapse internal whitespace runs to single spaces, cap at
/// `MAX_PLAYER_LENGTH` characters.
pub fn sanitize_player_name(value: &str) -> String {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(MAX_PLAYER_LENGTH).collect()
}

/// Request gate: bounds and shape only, no mutation, no errors. The
/// input-mode tag is already typed, so only the numerics and the name can
/// disqualify a payload.
pub fn is_valid_submission(submission: &LeaderboardSubmission) -> bool {
    let player_len = sanitize_player_name(&submission.player).chars().count();
    if !(MIN_PLAYER_LENGTH..=MAX_PLAYER_LENGTH).contains(&player_len) {
        return false;
    }
    let bounded = |value: f64, max: f64| value.is_finite() && value >= 0.0 && value <= max;
    bounded(submission.score, MAX_SCORE)
        && bounded(submission.accuracy, 100.0)
        && bounded(submission.max_combo, MAX_COMBO)
}

/// Pin a (valid) submission to canonical values: floored score and combo,
/// rounded accuracy, everything clamped, name sanitized. Idempotent.
pub fn normalize_submission(submission: &LeaderboardSubmission) -> LeaderboardSubmission {
    LeaderboardSubmission {
        player: sanitize_player_name(&submission.player),
        score: submission.score.floor().clamp(0.0, MAX_SCORE),
        accuracy: submission.accuracy.round().clamp(0.0, 100.0),
        max_combo: submission.max_combo.floor().clamp(0.0, MAX_COMBO),
        input_mode: submission.input_mode,
    }
}

/// Mint a ranked row from a submission (normalizing defensively) with a
/// fresh identity and timestamp.
pub fn entry_from_submission(submission: &LeaderboardSubmission) -> LeaderboardEntry {
    let normalized = normalize_submission(submission);
    LeaderboardEntry {
        id: Uuid::new_v4().to_string(),
        player: normalized.player,
        score: normalized.score as u32,
        accuracy: normalized.accuracy as u8,
        max_combo: normalized.max_combo as u32,
        input_mode: normalized.input_mode,
        created_at: Utc::now(),
    }
}

/// Total order: score desc, accuracy desc, max combo desc, then earliest
/// timestamp first so the earlier achiever of a tie ranks higher.
pub fn sort_leaderboard(entries: &mut [LeaderboardEntry]) {
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.accuracy.cmp(&a.accuracy))
            .then(b.max_combo.cmp(&a.max_combo))
            .then(a.created_at.cmp(&b.created_at))
    });
}

/// The boundary between untrusted bytes (disk, network) and trusted
/// in-memory state. Malformed items are dropped, absent identity and
/// timestamps are minted fresh, and the survivors come back sorted and
/// capped. Never fails, whatever the input looks like.
pub fn normalize_entries(raw: &Value) -> Vec<LeaderboardEntry> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    let mut entries: Vec<LeaderboardEntry> = items.iter().filter_map(normalize_entry).collect();
    sort_leaderboard(&mut entries);
    entries.truncate(MAX_LEADERBOARD_SIZE);
    entries
}

/// Parse a persisted JSON document leniently: unreadable or non-array
/// content is an empty board, not an error.
pub fn parse_entries_json(raw: &str) -> Vec<LeaderboardEntry> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => normalize_entries(&value),
        Err(_) => Vec::new(),
    }
}

fn normalize_entry(item: &Value) -> Option<LeaderboardEntry> {
    let obj = item.as_object()?;
    let input_mode = match obj.get("inputMode").and_then(Value::as_str) {
        Some("camera") => InputMode::Camera,
        Some("pointer") => InputMode::Pointer,
        _ => return None,
    };
    let number = |key: &str| obj.get(key).and_then(Value::as_f64).unwrap_or(f64::NAN);
    let submission = LeaderboardSubmission {
        player: obj
            .get("player")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        score: number("score"),
        accuracy: number("accuracy"),
        max_combo: number("maxCombo"),
        input_mode,
    };
    if !is_valid_submission(&submission) {
        return None;
    }
    let normalized = normalize_submission(&submission);

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let created_at = obj
        .get("createdAt")
        .and_then(Value::as_str)
        .and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|value| value.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    Some(LeaderboardEntry {
        id,
        player: normalized.player,
        score: normalized.score as u32,
        accuracy: normalized.accuracy as u8,
        max_combo: normalized.max_combo as u32,
        input_mode: normalized.input_mode,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(player: &str, score: f64, accuracy: f64, max_combo: f64) -> LeaderboardSubmission {
        LeaderboardSubmission {
            player: player.to_string(),
            score,
            accuracy,
            max_combo,
            input_mode: InputMode::Camera,
        }
    }

    #[test]
    fn sanitizes_names_and_caps_length() {
        assert_eq!(sanitize_player_name("   Ana    Silva   "), "Ana Silva");
        assert_eq!(sanitize_player_name(&"x".repeat(100)).chars().count(), 24);
        assert_eq!(sanitize_player_name("\tNinja\n Master "), "Ninja Master");
    }

    #[test]
    fn validates_strict_bounds() {
        assert!(is_valid_submission(&submission("Ninja", 120.0, 85.0, 4.0)));

        assert!(!is_valid_submission(&submission("A", 120.0, 85.0, 4.0)));
        assert!(!is_valid_submission(&submission("Ninja", -1.0, 85.0, 4.0)));
        assert!(!is_valid_submission(&submission("Ninja", 120.0, 120.0, 4.0)));
        assert!(!is_valid_submission(&submission("Ninja", 120.0, 85.0, 1000.0)));
        assert!(!is_valid_submission(&submission(
            "Ninja",
            f64::NAN,
            85.0,
            4.0
        )));
        assert!(!is_valid_submission(&submission(
            "Ninja",
            1_000_000.0,
            85.0,
            4.0
        )));
    }

    #[test]
    fn normalization_floors_rounds_and_clamps() {
        let normalized = normalize_submission(&LeaderboardSubmission {
            player: "  Player   One ".to_string(),
            score: 10.9,
            accuracy: 88.6,
            max_combo: 3.4,
            input_mode: InputMode::Pointer,
        });
        assert_eq!(normalized.player, "Player One");
        assert_eq!(normalized.score, 10.0);
        assert_eq!(normalized.accuracy, 89.0);
        assert_eq!(normalized.max_combo, 3.0);
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_submission(&submission("  Fruit   Fan  ", 42.7, 66.4, 7.9));
        let twice = normalize_submission(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn sort_breaks_ties_by_accuracy_then_combo_then_age() {
        let mut entries = normalize_entries(&json!([
            {"id": "a", "player": "A", "score": 50, "accuracy": 70, "maxCombo": 3,
             "inputMode": "camera", "createdAt": "2026-01-01T00:00:00Z"},
            {"id": "b", "player": "B", "score": 50, "accuracy": 80, "maxCombo": 2,
             "inputMode": "camera", "createdAt": "2026-01-01T00:00:01Z"},
            {"id": "c", "player": "C", "score": 70, "accuracy": 60, "maxCombo": 1,
             "inputMode": "pointer", "createdAt": "2026-01-01T00:00:02Z"},
        ]));
        let order: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, ["c", "b", "a"]);

        // equal rows rank the earlier achiever first
        entries = normalize_entries(&json!([
            {"id": "late", "player": "L", "score": 10, "accuracy": 50, "maxCombo": 1,
             "inputMode": "camera", "createdAt": "2026-01-02T00:00:00Z"},
            {"id": "early", "player": "E", "score": 10, "accuracy": 50, "maxCombo": 1,
             "inputMode": "camera", "createdAt": "2026-01-01T00:00:00Z"},
        ]));
        assert_eq!(entries[0].id, "early");
    }

    #[test]
    fn normalize_entries_discards_garbage() {
        let entries = normalize_entries(&json!([
            {"player": "Valid Player", "score": 30, "accuracy": 90, "maxCombo": 2,
             "inputMode": "camera"},
            {"player": "No Mode", "score": 30, "accuracy": 90, "maxCombo": 2},
            {"player": "Bad Score", "score": "lots", "accuracy": 90, "maxCombo": 2,
             "inputMode": "camera"},
            42,
            null,
            {"player": "X", "score": 1, "accuracy": 1, "maxCombo": 1, "inputMode": "camera"},
        ]));
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].player, "Valid Player");
        assert!(!entries[0].id.is_empty(), "fresh id minted when absent");
    }

    #[test]
    fn normalize_entries_never_panics_on_non_arrays() {
        assert!(normalize_entries(&json!({"entries": []})).is_empty());
        assert!(normalize_entries(&json!("corrupt")).is_empty());
        assert!(normalize_entries(&Value::Null).is_empty());
        assert!(parse_entries_json("{not json").is_empty());
    }

    #[test]
    fn normalize_entries_is_stable_under_renormalization() {
        let first = normalize_entries(&json!([
            {"id": "1", "player": "Ana Silva", "score": 50, "accuracy": 70, "maxCombo": 3,
             "inputMode": "camera", "createdAt": "2026-01-01T00:00:00Z"},
            {"id": "2", "player": "Bea", "score": 70, "accuracy": 60, "maxCombo": 4,
             "inputMode": "pointer", "createdAt": "2026-01-01T00:00:01Z"},
        ]));
        let round_tripped = serde_json::to_value(&first).unwrap();
        let second = normalize_entries(&round_tripped);
        assert_eq!(first, second);
    }

    #[test]
    fn normalize_entries_caps_the_list() {
        let rows: Vec<Value> = (0..80)
            .map(|i| {
                json!({"player": format!("Player {i}"), "score": i, "accuracy": 50,
                       "maxCombo": 1, "inputMode": "camera"})
            })
            .collect();
        let entries = normalize_entries(&Value::Array(rows));
        assert_eq!(entries.len(), MAX_LEADERBOARD_SIZE);
        assert_eq!(entries[0].score, 79, "highest score first after the cap");
    }
}
