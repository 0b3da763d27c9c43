use kurbo::Point;

use crate::{
    comet::Comet,
    config::{CometConfig, FieldConfig, FieldMode},
    core::{Rgba8, Viewport},
    engine::Engine,
    sprite::Sprite,
};

/// Backend-agnostic draw op: absolute coordinates, final straight-alpha color.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Disc {
        center: Point,
        radius: f64,
        color: Rgba8,
    },
    Segment {
        from: Point,
        to: Point,
        width: f64,
        color: Rgba8,
    },
}

/// One frame's ops in paint order: sprites, then links, then comets.
#[derive(Clone, Debug)]
pub struct Scene {
    pub viewport: Viewport,
    pub background: Rgba8,
    pub ops: Vec<DrawOp>,
}

/// Sub-segments per comet trail; alpha steps down toward the tail.
const TRAIL_STEPS: usize = 8;
const GLOW_RADIUS_FACTOR: f64 = 2.5;
const GLOW_ALPHA: f64 = 0.25;

/// Snapshot the engine state into draw ops. Pure; no IO, no mutation.
pub fn build_scene(engine: &Engine) -> Scene {
    let field = engine.field();
    let sprites = engine.sprites();
    let mut ops = Vec::with_capacity(sprites.len());

    for sprite in sprites {
        ops.push(sprite_op(sprite, field));
    }

    if field.mode == FieldMode::ParticleNetwork {
        push_link_ops(&mut ops, sprites, field);
    }

    for comet in engine.comets() {
        push_comet_ops(&mut ops, comet, engine.comet_config());
    }

    Scene {
        viewport: engine.viewport(),
        background: engine.background(),
        ops,
    }
}

fn sprite_op(sprite: &Sprite, field: &FieldConfig) -> DrawOp {
    match sprite {
        Sprite::Particle(p) => DrawOp::Disc {
            center: p.pos,
            radius: p.size,
            color: field.base_color.scale_alpha(field.fill_alpha),
        },
        Sprite::Star(s) => DrawOp::Disc {
            center: s.pos,
            radius: s.size,
            color: field.base_color.scale_alpha(s.opacity),
        },
    }
}

/// One segment per unordered pair closer than the cutoff, alpha fading
/// linearly from `link_alpha` at zero distance to zero at the cutoff.
fn push_link_ops(ops: &mut Vec<DrawOp>, sprites: &[Sprite], field: &FieldConfig) {
    for (i, a) in sprites.iter().enumerate() {
        for b in &sprites[i + 1..] {
            let distance = a.pos().distance(b.pos());
            if distance < field.connection_distance {
                let alpha = (1.0 - distance / field.connection_distance) * field.link_alpha;
                ops.push(DrawOp::Segment {
                    from: a.pos(),
                    to: b.pos(),
                    width: 1.0,
                    color: field.base_color.scale_alpha(alpha),
                });
            }
        }
    }
}

/// Trail sub-segments from the head backward, then a soft glow disc under a
/// solid core.
fn push_comet_ops(ops: &mut Vec<DrawOp>, comet: &Comet, cfg: &CometConfig) {
    let color = if comet.special {
        cfg.special_color
    } else {
        cfg.color
    };

    let velocity = comet.velocity();
    let speed = velocity.hypot();
    if speed > 0.0 {
        let dir = velocity / speed;
        let step = comet.trail_length / TRAIL_STEPS as f64;
        let mut head = comet.pos;
        for k in 0..TRAIL_STEPS {
            let tail = head - dir * step;
            let fade = 1.0 - (k as f64 + 1.0) / (TRAIL_STEPS as f64 + 1.0);
            ops.push(DrawOp::Segment {
                from: head,
                to: tail,
                width: cfg.head_radius,
                color: color.scale_alpha(fade),
            });
            head = tail;
        }
    }

    ops.push(DrawOp::Disc {
        center: comet.pos,
        radius: cfg.head_radius * GLOW_RADIUS_FACTOR,
        color: color.scale_alpha(GLOW_ALPHA),
    });
    ops.push(DrawOp::Disc {
        center: comet.pos,
        radius: cfg.head_radius,
        color,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Scenario, sprite::Particle};
    use kurbo::Vec2;

    fn particle_at(x: f64, y: f64) -> Sprite {
        Sprite::Particle(Particle {
            pos: Point::new(x, y),
            vel: Vec2::ZERO,
            size: 2.0,
        })
    }

    #[test]
    fn links_follow_the_distance_alpha_formula() {
        let field = FieldConfig::particle_network();
        let sprites = vec![
            particle_at(0.0, 0.0),
            particle_at(75.0, 0.0),  // distance 75 from the first
            particle_at(300.0, 0.0), // beyond the cutoff from both
        ];

        let mut ops = Vec::new();
        push_link_ops(&mut ops, &sprites, &field);

        assert_eq!(ops.len(), 1);
        let DrawOp::Segment { width, color, .. } = &ops[0] else {
            panic!("expected a link segment");
        };
        assert_eq!(*width, 1.0);
        // (1 - 75/150) * 0.2 = 0.1 of the base alpha 255.
        let expected = field.base_color.scale_alpha(0.1);
        assert_eq!(*color, expected);
    }

    #[test]
    fn link_at_the_cutoff_is_not_drawn() {
        let field = FieldConfig::particle_network();
        let sprites = vec![particle_at(0.0, 0.0), particle_at(150.0, 0.0)];
        let mut ops = Vec::new();
        push_link_ops(&mut ops, &sprites, &field);
        assert!(ops.is_empty());
    }

    #[test]
    fn starfield_scene_has_no_links() {
        let mut s = Scenario::starfield(Viewport::new(800, 600));
        s.comets.spawn_probability = 0.0;
        let engine = Engine::new(&s).unwrap();
        let scene = build_scene(&engine);

        assert_eq!(scene.ops.len(), s.field.count as usize);
        assert!(scene
            .ops
            .iter()
            .all(|op| matches!(op, DrawOp::Disc { .. })));
    }

    #[test]
    fn particle_scene_puts_discs_before_links() {
        let mut s = Scenario::particle_network(Viewport::new(800, 600));
        s.comets.spawn_probability = 0.0;
        let engine = Engine::new(&s).unwrap();
        let scene = build_scene(&engine);

        assert!(scene.ops.len() >= 60);
        assert!(scene.ops[..60]
            .iter()
            .all(|op| matches!(op, DrawOp::Disc { .. })));
        assert!(scene.ops[60..]
            .iter()
            .all(|op| matches!(op, DrawOp::Segment { .. })));
    }

    #[test]
    fn comet_trail_fades_backward_from_the_head() {
        let cfg = CometConfig::default();
        let comet = Comet {
            pos: Point::new(400.0, 300.0),
            angle: 0.0, // moving right, so the trail extends left
            speed: 4.0,
            trail_length: 80.0,
            special: false,
        };

        let mut ops = Vec::new();
        push_comet_ops(&mut ops, &comet, &cfg);
        assert_eq!(ops.len(), TRAIL_STEPS + 2);

        let mut last_alpha = u8::MAX;
        for op in &ops[..TRAIL_STEPS] {
            let DrawOp::Segment {
                from, to, color, ..
            } = op
            else {
                panic!("expected trail segment");
            };
            assert!(to.x < from.x, "trail must extend behind the head");
            assert!(color.a < last_alpha, "trail alpha must step down");
            last_alpha = color.a;
        }

        // Glow under core, core drawn last at full color.
        let DrawOp::Disc { radius: glow_r, color: glow_c, .. } = &ops[TRAIL_STEPS] else {
            panic!("expected glow disc");
        };
        let DrawOp::Disc { radius: core_r, color: core_c, .. } = &ops[TRAIL_STEPS + 1] else {
            panic!("expected core disc");
        };
        assert!(glow_r > core_r);
        assert!(glow_c.a < core_c.a);
        assert_eq!(*core_c, cfg.color);
    }

    #[test]
    fn special_comets_use_the_special_color() {
        let cfg = CometConfig::default();
        let comet = Comet {
            pos: Point::new(0.0, 0.0),
            angle: std::f64::consts::FRAC_PI_2,
            speed: 7.0,
            trail_length: 80.0,
            special: true,
        };
        let mut ops = Vec::new();
        push_comet_ops(&mut ops, &comet, &cfg);
        let Some(DrawOp::Disc { color, .. }) = ops.last() else {
            panic!("expected core disc");
        };
        assert_eq!(*color, cfg.special_color);
    }

    #[test]
    fn star_discs_use_their_own_opacity() {
        let field = FieldConfig::starfield();
        let star = Sprite::Star(crate::sprite::Star {
            pos: Point::new(1.0, 2.0),
            size: 1.5,
            opacity: 0.25,
            fade: 0.01,
        });
        let DrawOp::Disc { color, .. } = sprite_op(&star, &field) else {
            panic!("expected disc");
        };
        assert_eq!(color, field.base_color.scale_alpha(0.25));
    }
}
