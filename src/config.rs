use std::path::PathBuf;

// Frame pacing
pub const TARGET_FPS: f64 = 60.0;
pub const MAX_DELTA: f64 = 0.05; // seconds; caps the dt spike after a tab resume

// Spawning
pub const BASE_SPAWN_FRAMES: u32 = 60;
pub const MIN_SPAWN_FRAMES: u32 = 18;
pub const SPAWN_SCORE_STEP: u32 = 4; // one frame shaved off the interval per this many points
pub const WAVE_MAX_FRUITS: u32 = 3;
pub const WAVE_SPACING_FRAC: f64 = 0.12; // horizontal gap between wave slots, fraction of width
pub const SPAWN_EDGE_MARGIN: f64 = 50.0;

// Ballistics. Gravity scales with the viewport so arcs look the same at any
// resolution; apex height is picked per wave as a fraction of the height.
pub const GRAVITY_FACTOR: f64 = 1.9; // px/s^2 per pixel of viewport height
pub const APEX_MIN_FRAC: f64 = 0.15;
pub const APEX_MAX_FRAC: f64 = 0.40;
pub const APEX_X_JITTER_FRAC: f64 = 0.08;

// Fruit shape
pub const FRUIT_RADIUS_BASE: f64 = 35.0;
pub const FRUIT_RADIUS_JITTER: f64 = 20.0;
pub const BOMB_RADIUS: f64 = 40.0;
pub const FRUIT_MAX_SPIN: f64 = 6.0; // rad/s

// Difficulty ramps
pub const BOMB_CHANCE_BASE: f64 = 0.12;
pub const BOMB_CHANCE_MAX: f64 = 0.22;
pub const BOMB_CHANCE_SLOPE: f64 = 0.0015; // per point of score
pub const SPEED_GAIN_MAX: f64 = 0.35;
pub const SPEED_RAMP_SCORE: f64 = 120.0; // score at which the speed ramp saturates

// Combo machine. The slice-to-slice chaining window is deliberately shorter
// than the passive idle timeout; a slice between the two restarts at 1.
pub const COMBO_WINDOW: f64 = 0.9; // seconds
pub const COMBO_TIMEOUT: f64 = 1.4; // seconds
pub const COMBO_CAP: u32 = 5;

pub const MAX_LIVES: u32 = 3;

// Slicing
pub const HIT_MARGIN: f64 = 10.0; // px added to the fruit radius, forgives fast swipes
pub const MISS_MARGIN: f64 = 50.0; // px past the bottom edge before a fruit counts as missed
pub const TRAIL_LENGTH: usize = 10;
pub const TRAIL_LENGTH_LOW_VFX: usize = 6;
pub const TRAIL_DEAD_ZONE: f64 = 2.0; // px; jitter below this never extends the trail

// Particles
pub const PARTICLE_GRAVITY_FACTOR: f64 = 0.4; // fraction of fruit gravity
pub const PARTICLE_FADE: f64 = 1.2; // life per second
pub const PARTICLE_MIN_SPEED: f64 = 120.0;
pub const PARTICLE_MAX_SPEED: f64 = 420.0;
pub const PARTICLE_BURST_FRUIT: usize = 10;
pub const PARTICLE_BURST_BOMB: usize = 30;

// Server
pub const SERVER_PORT: u16 = 3333;
pub const API_PREFIX: &str = "/api/v1";
pub const DEFAULT_LIST_LIMIT: usize = 10;
pub const MAX_BODY_BYTES: usize = 16 * 1024;
pub const RATE_WINDOW_SECS: u64 = 60;
pub const RATE_MAX_REQUESTS: u32 = 120;

// Leaderboard client
pub const REQUEST_TIMEOUT_MS: u64 = 3500;

pub const DATA_DIR: &str = "data";

pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(SERVER_PORT)
}

/// Comma-separated allow-list from `CORS_ORIGIN`; empty means every origin.
pub fn allowed_origins() -> Vec<String> {
    std::env::var("CORS_ORIGIN")
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

pub fn leaderboard_path() -> PathBuf {
    std::env::var("LEADERBOARD_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DATA_DIR).join("leaderboard.json"))
}
