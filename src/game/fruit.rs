use crate::config::*;
use rand::Rng;
use rand_pcg::Pcg64Mcg;

pub const FRUIT_COLORS: [&str; 3] = ["#EF4444", "#F97316", "#22C55E"];
pub const BOMB_COLOR: &str = "#1F2937";
pub const BOMB_PARTICLE_COLOR: &str = "#4B5563";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FruitKind {
    Fruit,
    Bomb,
}

#[derive(Debug, Clone)]
pub struct Fruit {
    pub id: u64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub radius: f64,
    pub color: &'static str,
    pub kind: FruitKind,
    pub rotation: f64,
    pub rotation_speed: f64,
    pub sliced: bool,
}

impl Fruit {
    /// Launch one item from below the bottom edge on an arc that peaks at
    /// `(apex_x, apex_y)`. Vertical velocity is solved back from the apex
    /// so the arc stays on screen regardless of viewport size; the
    /// difficulty multiplier then scales the whole launch vector.
    pub fn launch(
        rng: &mut Pcg64Mcg,
        id: u64,
        kind: FruitKind,
        x: f64,
        height: f64,
        apex_x: f64,
        apex_y: f64,
        gravity: f64,
        speed_multiplier: f64,
    ) -> Self {
        let radius = match kind {
            FruitKind::Bomb => BOMB_RADIUS,
            FruitKind::Fruit => FRUIT_RADIUS_BASE + rng.gen_range(0.0..FRUIT_RADIUS_JITTER),
        };
        let color = match kind {
            FruitKind::Bomb => BOMB_COLOR,
            FruitKind::Fruit => FRUIT_COLORS[rng.gen_range(0..FRUIT_COLORS.len())],
        };

        let y = height + radius;
        let rise = (y - apex_y).max(1.0);
        let time_to_apex = (2.0 * rise / gravity).sqrt().max(0.05);

        Fruit {
            id,
            x,
            y,
            vx: (apex_x - x) / time_to_apex * speed_multiplier,
            vy: -(gravity * time_to_apex) * speed_multiplier,
            radius,
            color,
            kind,
            rotation: 0.0,
            rotation_speed: rng.gen_range(-FRUIT_MAX_SPIN..FRUIT_MAX_SPIN),
            sliced: false,
        }
    }
}

/// Cosmetic debris from a slice or bomb blast. Life runs 1.0 → 0.0.
#[derive(Debug, Clone)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub color: &'static str,
    pub life: f64,
    pub size: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn launch_aims_upward_toward_apex() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let fruit = Fruit::launch(
            &mut rng,
            1,
            FruitKind::Fruit,
            400.0,
            600.0,
            420.0,
            150.0,
            600.0 * GRAVITY_FACTOR,
            1.0,
        );
        assert!(fruit.vy < 0.0, "fruit must launch upward");
        assert!(fruit.vx > 0.0, "apex right of spawn pulls right");
        assert!(fruit.y > 600.0, "spawns below the bottom edge");
        assert!(!fruit.sliced);
        assert_eq!(fruit.kind, FruitKind::Fruit);
    }

    #[test]
    fn speed_multiplier_scales_launch_vector() {
        let base = {
            let mut rng = Pcg64Mcg::seed_from_u64(3);
            Fruit::launch(
                &mut rng,
                1,
                FruitKind::Bomb,
                100.0,
                600.0,
                120.0,
                200.0,
                1140.0,
                1.0,
            )
        };
        let boosted = {
            let mut rng = Pcg64Mcg::seed_from_u64(3);
            Fruit::launch(
                &mut rng,
                1,
                FruitKind::Bomb,
                100.0,
                600.0,
                120.0,
                200.0,
                1140.0,
                1.35,
            )
        };
        assert!((boosted.vy - base.vy * 1.35).abs() < 1e-9);
        assert!((boosted.vx - base.vx * 1.35).abs() < 1e-9);
        assert_eq!(base.radius, BOMB_RADIUS);
        assert_eq!(base.color, BOMB_COLOR);
    }
}
