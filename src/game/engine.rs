use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use serde::Serialize;

use crate::config::*;
use crate::game::combo::{self, ComboState};
use crate::game::difficulty;
use crate::game::fruit::{Fruit, FruitKind, Particle, BOMB_PARTICLE_COLOR};
use crate::game::physics;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Latest published result from the tracking collaborator, in normalized
/// [0,1] screen space. Landmarks ride along for skeleton rendering and never
/// influence the simulation.
#[derive(Debug, Clone, Default)]
pub struct TrackedInput {
    pub x: f64,
    pub y: f64,
    pub landmarks: Vec<Point>,
}

impl TrackedInput {
    pub fn at(x: f64, y: f64) -> Self {
        TrackedInput {
            x,
            y,
            landmarks: Vec::new(),
        }
    }
}

/// Per-frame effect knobs owned by the caller; `low_vfx` trims the trail and
/// particle budgets, `show_trail` is advisory for the renderer only (the
/// trail keeps feeding the collision segment either way).
#[derive(Debug, Clone, Copy)]
pub struct GameSettings {
    pub show_trail: bool,
    pub low_vfx: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            show_trail: true,
            low_vfx: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub score: u32,
    pub lives: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub sliced: u32,
    pub missed: u32,
}

impl GameStats {
    pub fn new() -> Self {
        GameStats {
            score: 0,
            lives: MAX_LIVES,
            combo: 0,
            max_combo: 0,
            sliced: 0,
            missed: 0,
        }
    }

    /// Rounded percentage of resolved fruit that was sliced rather than
    /// dropped. An untouched session reads as 100.
    pub fn accuracy(&self) -> u32 {
        let resolved = self.sliced + self.missed;
        if resolved == 0 {
            return 100;
        }
        ((self.sliced as f64 / resolved as f64) * 100.0).round() as u32
    }
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    Stats(GameStats),
    GameOver { score: u32 },
}

/// One play session: the mutable arena for fruits, particles and the swipe
/// trail, advanced one tick per animation frame. The caller owns the frame
/// callback and the input source; the session owns everything else and hands
/// out read-only snapshots for rendering.
pub struct GameSession {
    width: f64,
    height: f64,
    gravity: f64,
    rng: Pcg64Mcg,
    fruits: Vec<Fruit>,
    particles: Vec<Particle>,
    trail: VecDeque<Point>,
    combo: ComboState,
    stats: GameStats,
    spawn_accumulator: f64,
    clock_ms: f64,
    next_fruit_id: u64,
    over: bool,
}

impl GameSession {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_rng(width, height, Pcg64Mcg::from_entropy())
    }

    /// Deterministic session for tests and replays.
    pub fn with_seed(width: f64, height: f64, seed: u64) -> Self {
        Self::with_rng(width, height, Pcg64Mcg::seed_from_u64(seed))
    }

    fn with_rng(width: f64, height: f64, rng: Pcg64Mcg) -> Self {
        GameSession {
            width,
            height,
            gravity: height * GRAVITY_FACTOR,
            rng,
            fruits: Vec::new(),
            particles: Vec::new(),
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
            combo: ComboState::new(),
            stats: GameStats::new(),
            spawn_accumulator: 0.0,
            clock_ms: 0.0,
            next_fruit_id: 1,
            over: false,
        }
    }

    /// Wipe all owned state for a fresh run. A finished session never
    /// resumes on its own; this is the only way back to playing.
    pub fn reset(&mut self) {
        self.fruits.clear();
        self.particles.clear();
        self.trail.clear();
        self.combo = ComboState::new();
        self.stats = GameStats::new();
        self.spawn_accumulator = 0.0;
        self.clock_ms = 0.0;
        self.over = false;
    }

    pub fn stats(&self) -> GameStats {
        self.stats
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn fruits(&self) -> &[Fruit] {
        &self.fruits
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn trail(&self) -> impl Iterator<Item = &Point> {
        self.trail.iter()
    }

    /// Advance one frame. `dt` is wall seconds since the previous frame
    /// (clamped, so a backgrounded tab can't explode the physics); `input`
    /// is the latest tracked point, if any. Events report stats changes and
    /// the terminal game-over; after game-over the tick is a no-op.
    pub fn tick(
        &mut self,
        dt: f64,
        input: Option<&TrackedInput>,
        settings: &GameSettings,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.over {
            return events;
        }
        let dt = dt.clamp(0.0, MAX_DELTA);
        self.clock_ms += dt * 1000.0;

        self.update_trail(input, settings);

        // Passive decay: an idle chain drops to zero between slices.
        if self.combo.combo > 0 && combo::should_reset(self.clock_ms, self.combo.last_slice_ms) {
            self.combo.combo = 0;
            self.stats.combo = 0;
            events.push(SessionEvent::Stats(self.stats));
        }

        // The accumulator keeps its remainder across frames so variable
        // frame rates don't drift the spawn cadence.
        self.spawn_accumulator += dt;
        let interval = difficulty::spawn_interval(self.stats.score);
        while self.spawn_accumulator >= interval {
            self.spawn_wave();
            self.spawn_accumulator -= interval;
        }

        for fruit in &mut self.fruits {
            fruit.x += fruit.vx * dt;
            fruit.y += fruit.vy * dt;
            fruit.vy += self.gravity * dt;
            fruit.rotation += fruit.rotation_speed * dt;
        }

        if self.resolve_hits(&mut events, settings) {
            return events;
        }
        if self.resolve_misses(&mut events) {
            return events;
        }

        let particle_gravity = self.gravity * PARTICLE_GRAVITY_FACTOR;
        self.particles.retain_mut(|p| {
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.vy += particle_gravity * dt;
            p.life -= PARTICLE_FADE * dt;
            p.life > 0.0
        });

        events
    }

    fn update_trail(&mut self, input: Option<&TrackedInput>, settings: &GameSettings) {
        match input {
            Some(input) => {
                let point = Point {
                    x: input.x * self.width,
                    y: input.y * self.height,
                };
                let moved = self.trail.back().map_or(true, |last| {
                    let dx = point.x - last.x;
                    let dy = point.y - last.y;
                    dx * dx + dy * dy >= TRAIL_DEAD_ZONE * TRAIL_DEAD_ZONE
                });
                if moved {
                    self.trail.push_back(point);
                }
                let cap = if settings.low_vfx {
                    TRAIL_LENGTH_LOW_VFX
                } else {
                    TRAIL_LENGTH
                };
                while self.trail.len() > cap {
                    self.trail.pop_front();
                }
            }
            // Hand lost or pointer gone: bleed one sample per tick until the
            // segment disappears and collisions stop on their own.
            None => {
                self.trail.pop_front();
            }
        }
    }

    /// The collision segment is the last two trail samples, or the single
    /// newest sample against itself when only one exists.
    fn trail_segment(&self) -> Option<(Point, Point)> {
        let tip = *self.trail.back()?;
        let prev = if self.trail.len() >= 2 {
            self.trail[self.trail.len() - 2]
        } else {
            tip
        };
        Some((prev, tip))
    }

    /// Returns true when a bomb ended the session; every overlapping fruit
    /// in the same sweep is sliced, but a bomb halts the tick outright.
    fn resolve_hits(&mut self, events: &mut Vec<SessionEvent>, settings: &GameSettings) -> bool {
        let Some((prev, tip)) = self.trail_segment() else {
            return false;
        };

        let mut i = 0;
        while i < self.fruits.len() {
            let (fx, fy, radius, kind, color, sliced) = {
                let f = &self.fruits[i];
                (f.x, f.y, f.radius, f.kind, f.color, f.sliced)
            };
            if sliced {
                i += 1;
                continue;
            }
            let hit_radius = radius + HIT_MARGIN;
            let dist_sq = physics::distance_to_segment_sq(fx, fy, prev.x, prev.y, tip.x, tip.y);
            if dist_sq >= hit_radius * hit_radius {
                i += 1;
                continue;
            }

            if kind == FruitKind::Bomb {
                self.spawn_burst(fx, fy, BOMB_PARTICLE_COLOR, PARTICLE_BURST_BOMB);
                self.over = true;
                events.push(SessionEvent::GameOver {
                    score: self.stats.score,
                });
                return true;
            }

            self.fruits[i].sliced = true;
            let outcome = combo::update_on_slice(self.combo, self.clock_ms);
            self.combo = outcome.state;
            self.stats.score += outcome.score_delta;
            self.stats.combo = outcome.state.combo;
            self.stats.max_combo = outcome.state.max_combo;
            self.stats.sliced += 1;

            let burst = if settings.low_vfx {
                PARTICLE_BURST_FRUIT / 2
            } else {
                PARTICLE_BURST_FRUIT
            };
            self.spawn_burst(fx, fy, color, burst);
            self.fruits.swap_remove(i);
            events.push(SessionEvent::Stats(self.stats));
            // swap_remove moved a new fruit into slot i; recheck it
        }
        false
    }

    /// Returns true when the last life was lost. Bombs that fall off screen
    /// vanish quietly; only live fruit costs a life.
    fn resolve_misses(&mut self, events: &mut Vec<SessionEvent>) -> bool {
        let mut i = 0;
        while i < self.fruits.len() {
            let f = &self.fruits[i];
            if f.y <= self.height + f.radius + MISS_MARGIN {
                i += 1;
                continue;
            }
            let counts = f.kind == FruitKind::Fruit && !f.sliced;
            self.fruits.swap_remove(i);
            if !counts {
                continue;
            }

            self.stats.missed += 1;
            let outcome = combo::apply_miss(self.stats.lives);
            self.stats.lives = outcome.lives;
            events.push(SessionEvent::Stats(self.stats));
            if outcome.game_over {
                self.over = true;
                events.push(SessionEvent::GameOver {
                    score: self.stats.score,
                });
                return true;
            }
        }
        false
    }

    fn spawn_wave(&mut self) {
        let score = self.stats.score;
        let speed = difficulty::speed_multiplier(score);
        let margin = SPAWN_EDGE_MARGIN.min(self.width / 2.0);
        let count = self.rng.gen_range(1..=WAVE_MAX_FRUITS) as usize;
        let center_x = self.rng.gen_range(self.width * 0.3..self.width * 0.7);
        let spacing = self.width * WAVE_SPACING_FRAC;

        let mut slots = Vec::with_capacity(count);
        if count % 2 == 1 {
            slots.push(center_x);
        }
        for pair in 1..=(count / 2) {
            let offset = pair as f64 * spacing;
            slots.push(center_x - offset);
            slots.push(center_x + offset);
        }

        let apex_y =
            self.height * physics::lerp(APEX_MIN_FRAC, APEX_MAX_FRAC, self.rng.gen::<f64>());
        for x in slots {
            let x = x.clamp(margin, self.width - margin);
            let kind = if self.rng.gen::<f64>() < difficulty::bomb_chance(score) {
                FruitKind::Bomb
            } else {
                FruitKind::Fruit
            };
            let apex_x =
                x + self.width * self.rng.gen_range(-APEX_X_JITTER_FRAC..APEX_X_JITTER_FRAC);
            let id = self.next_fruit_id;
            self.next_fruit_id += 1;
            self.fruits.push(Fruit::launch(
                &mut self.rng,
                id,
                kind,
                x,
                self.height,
                apex_x,
                apex_y,
                self.gravity,
                speed,
            ));
        }
    }

    fn spawn_burst(&mut self, x: f64, y: f64, color: &'static str, count: usize) {
        for _ in 0..count {
            let angle = self.rng.gen_range(0.0..std::f64::consts::TAU);
            let speed = self.rng.gen_range(PARTICLE_MIN_SPEED..PARTICLE_MAX_SPEED);
            self.particles.push(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                color,
                life: 1.0,
                size: self.rng.gen_range(2.0..7.0),
            });
        }
    }
}
