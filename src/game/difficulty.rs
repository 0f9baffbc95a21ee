use crate::config::*;

/// Seconds to wait between spawn waves at the given score.
///
/// The interval shrinks by one frame per `SPAWN_SCORE_STEP` points and is
/// floored at `MIN_SPAWN_FRAMES`.
pub fn spawn_interval(score: u32) -> f64 {
    let frames = BASE_SPAWN_FRAMES
        .saturating_sub(score / SPAWN_SCORE_STEP)
        .max(MIN_SPAWN_FRAMES);
    frames as f64 / TARGET_FPS
}

/// Probability that a spawned item is a bomb. Linear ramp, capped.
pub fn bomb_chance(score: u32) -> f64 {
    (BOMB_CHANCE_BASE + score as f64 * BOMB_CHANCE_SLOPE).min(BOMB_CHANCE_MAX)
}

/// Launch-velocity multiplier. Ramps from 1.0 and saturates once the score
/// reaches `SPEED_RAMP_SCORE`.
pub fn speed_multiplier(score: u32) -> f64 {
    let ramp = (score as f64 / SPEED_RAMP_SCORE).min(1.0);
    1.0 + ramp * SPEED_GAIN_MAX
}
