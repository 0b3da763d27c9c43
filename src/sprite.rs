use kurbo::{Point, Vec2};

use crate::{
    config::{FieldConfig, FieldMode},
    core::Viewport,
    rng::Rng64,
};

/// Wrap a y-coordinate into [0, height) by true modular arithmetic.
///
/// `f64::rem_euclid` may round to exactly `height` for tiny negative inputs,
/// which would break the half-open interval; fold that case back to 0.
pub(crate) fn wrap_y(y: f64, height: f64) -> f64 {
    if height <= 0.0 {
        return y;
    }
    let w = y.rem_euclid(height);
    if w >= height { 0.0 } else { w }
}

/// A drifting dot that bounces elastically off the surface edges.
#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub pos: Point,
    pub vel: Vec2,
    pub size: f64,
}

impl Particle {
    pub fn spawn(rng: &mut Rng64, viewport: Viewport, cfg: &FieldConfig) -> Self {
        Self {
            pos: Point::new(
                rng.next_f64_01() * viewport.width_f64(),
                rng.next_f64_01() * viewport.height_f64(),
            ),
            vel: Vec2::new(
                (rng.next_f64_01() - 0.5) * cfg.velocity_scale,
                (rng.next_f64_01() - 0.5) * cfg.velocity_scale,
            ),
            size: rng.in_range(cfg.size_range[0], cfg.size_range[1]),
        }
    }

    /// Integrate one tick, then negate a velocity component for each axis
    /// whose bound the new position lies beyond.
    pub fn advance(&mut self, viewport: Viewport) {
        self.pos += self.vel;

        if self.pos.x < 0.0 || self.pos.x > viewport.width_f64() {
            self.vel.x = -self.vel.x;
        }
        if self.pos.y < 0.0 || self.pos.y > viewport.height_f64() {
            self.vel.y = -self.vel.y;
        }
    }
}

/// A stationary dot whose opacity ping-pongs between 0 and 1.
#[derive(Clone, Copy, Debug)]
pub struct Star {
    pub pos: Point,
    pub size: f64,
    pub opacity: f64,
    pub fade: f64,
}

impl Star {
    pub fn spawn(rng: &mut Rng64, viewport: Viewport, cfg: &FieldConfig) -> Self {
        let magnitude = rng.in_range(cfg.fade_speed_range[0], cfg.fade_speed_range[1]);
        let fade = if rng.chance(0.5) { magnitude } else { -magnitude };
        Self {
            pos: Point::new(
                rng.next_f64_01() * viewport.width_f64(),
                rng.next_f64_01() * viewport.height_f64(),
            ),
            size: rng.in_range(cfg.size_range[0], cfg.size_range[1]),
            opacity: rng.next_f64_01(),
            fade,
        }
    }

    /// Add the fade speed; on crossing 0 or 1, clamp to the bound and
    /// reverse direction so opacity never leaves [0, 1].
    pub fn advance(&mut self) {
        self.opacity += self.fade;
        if self.opacity > 1.0 {
            self.opacity = 1.0;
            self.fade = -self.fade;
        } else if self.opacity < 0.0 {
            self.opacity = 0.0;
            self.fade = -self.fade;
        }
    }
}

/// Persistent entity, dispatched uniformly by the per-frame loop.
#[derive(Clone, Copy, Debug)]
pub enum Sprite {
    Particle(Particle),
    Star(Star),
}

impl Sprite {
    pub fn spawn(rng: &mut Rng64, viewport: Viewport, cfg: &FieldConfig) -> Self {
        match cfg.mode {
            FieldMode::ParticleNetwork => Self::Particle(Particle::spawn(rng, viewport, cfg)),
            FieldMode::Starfield => Self::Star(Star::spawn(rng, viewport, cfg)),
        }
    }

    pub fn advance(&mut self, viewport: Viewport) {
        match self {
            Self::Particle(p) => p.advance(viewport),
            Self::Star(s) => s.advance(),
        }
    }

    /// Shift y by `-shift` and wrap into [0, height).
    pub fn shift_y(&mut self, shift: f64, height: f64) {
        let pos = match self {
            Self::Particle(p) => &mut p.pos,
            Self::Star(s) => &mut s.pos,
        };
        pos.y = wrap_y(pos.y - shift, height);
    }

    pub fn pos(&self) -> Point {
        match self {
            Self::Particle(p) => p.pos,
            Self::Star(s) => s.pos,
        }
    }
}
