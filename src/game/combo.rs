use crate::config::{COMBO_CAP, COMBO_TIMEOUT, COMBO_WINDOW};

/// Slice-chaining state. Times are monotonic milliseconds on the session
/// clock; a fresh state has `last_slice_ms` at negative infinity so the
/// first slice always starts a new chain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComboState {
    pub combo: u32,
    pub max_combo: u32,
    pub last_slice_ms: f64,
}

impl ComboState {
    pub fn new() -> Self {
        ComboState {
            combo: 0,
            max_combo: 0,
            last_slice_ms: f64::NEG_INFINITY,
        }
    }
}

impl Default for ComboState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceOutcome {
    pub state: ComboState,
    pub score_delta: u32,
}

/// Advance the chain for a slice landing at `now_ms`. Within the window the
/// combo climbs (capped); outside it the chain restarts at 1, never 0. The
/// score awarded for the slice equals the resulting combo.
pub fn update_on_slice(state: ComboState, now_ms: f64) -> SliceOutcome {
    let gap_secs = (now_ms - state.last_slice_ms) / 1000.0;
    let combo = if gap_secs <= COMBO_WINDOW {
        (state.combo + 1).min(COMBO_CAP)
    } else {
        1
    };
    SliceOutcome {
        state: ComboState {
            combo,
            max_combo: state.max_combo.max(combo),
            last_slice_ms: now_ms,
        },
        score_delta: combo,
    }
}

/// Passive per-tick check: true once the idle gap exceeds the timeout.
/// The timeout is longer than the chaining window on purpose.
pub fn should_reset(now_ms: f64, last_slice_ms: f64) -> bool {
    now_ms - last_slice_ms > COMBO_TIMEOUT * 1000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissOutcome {
    pub lives: u32,
    pub game_over: bool,
}

/// Burn one life; the count never goes negative.
pub fn apply_miss(lives: u32) -> MissOutcome {
    let lives = lives.saturating_sub(1);
    MissOutcome {
        lives,
        game_over: lives == 0,
    }
}
