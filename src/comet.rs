use kurbo::{Point, Vec2};

use crate::{config::CometConfig, core::Viewport, rng::Rng64, sprite::wrap_y};

/// A transient streak falling through the field. Spawned above the viewport,
/// travels along a fixed angle at a fixed speed, removed once strictly beyond
/// the bottom or right edge plus the configured margin.
#[derive(Clone, Copy, Debug)]
pub struct Comet {
    pub pos: Point,
    /// Radians from +x toward +y; pi/2 is straight down.
    pub angle: f64,
    pub speed: f64,
    pub trail_length: f64,
    pub special: bool,
}

impl Comet {
    pub fn spawn(rng: &mut Rng64, viewport: Viewport, cfg: &CometConfig) -> Self {
        let special = rng.chance(cfg.special_probability);
        let speed_range = if special {
            cfg.special_speed_range
        } else {
            cfg.speed_range
        };
        Self {
            pos: Point::new(rng.next_f64_01() * viewport.width_f64(), -cfg.spawn_height),
            angle: rng.in_range(cfg.angle_range[0], cfg.angle_range[1]),
            speed: rng.in_range(speed_range[0], speed_range[1]),
            trail_length: rng.in_range(cfg.trail_length_range[0], cfg.trail_length_range[1]),
            special,
        }
    }

    /// Per-tick displacement.
    pub fn velocity(&self) -> Vec2 {
        Vec2::new(self.angle.cos(), self.angle.sin()) * self.speed
    }

    pub fn advance(&mut self) {
        self.pos += self.velocity();
    }

    /// Removal law: strictly beyond the bottom or the right edge, with margin.
    pub fn has_exited(&self, viewport: Viewport, margin: f64) -> bool {
        self.pos.y > viewport.height_f64() + margin || self.pos.x > viewport.width_f64() + margin
    }

    /// Scroll shift, same modular wrap law as the persistent entities.
    pub fn shift_y(&mut self, shift: f64, height: f64) {
        self.pos.y = wrap_y(self.pos.y - shift, height);
    }
}
