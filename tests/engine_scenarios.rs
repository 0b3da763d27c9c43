use driftfield::{
    Comet, Engine, Event, FieldMode, FrameIndex, Point, Scenario, Sprite, Viewport,
};

fn particle_scenario() -> Scenario {
    Scenario::particle_network(Viewport::new(800, 600))
}

fn star_scenario() -> Scenario {
    Scenario::starfield(Viewport::new(800, 600))
}

#[test]
fn init_produces_exactly_sixty_particles_within_the_viewport() {
    let engine = Engine::new(&particle_scenario()).unwrap();

    assert_eq!(engine.sprites().len(), 60);
    for sprite in engine.sprites() {
        assert!(matches!(sprite, Sprite::Particle(_)));
        let p = sprite.pos();
        assert!((0.0..800.0).contains(&p.x), "x out of bounds: {}", p.x);
        assert!((0.0..600.0).contains(&p.y), "y out of bounds: {}", p.y);
    }
}

#[test]
fn particles_reflect_elastically_and_stay_near_the_field() {
    let mut s = particle_scenario();
    s.comets.spawn_probability = 0.0;
    let mut engine = Engine::new(&s).unwrap();

    // Velocities are at most 0.25 px/tick, so a particle can only ever be a
    // single step beyond a bound before the reflected velocity pulls it back.
    for _ in 0..20_000 {
        engine.tick();
        for sprite in engine.sprites() {
            let p = sprite.pos();
            assert!((-0.25..800.25).contains(&p.x));
            assert!((-0.25..600.25).contains(&p.y));
        }
    }
}

#[test]
fn star_opacity_obeys_the_ping_pong_law() {
    let mut engine = Engine::new(&star_scenario()).unwrap();

    for _ in 0..10_000 {
        engine.tick();
        for sprite in engine.sprites() {
            let Sprite::Star(star) = sprite else {
                panic!("starfield must contain only stars");
            };
            assert!(
                (0.0..=1.0).contains(&star.opacity),
                "opacity escaped: {}",
                star.opacity
            );
        }
    }
}

#[test]
fn zero_delta_scroll_is_idempotent() {
    let mut engine = Engine::new(&star_scenario()).unwrap();
    engine.handle_event(Event::Scroll { offset: 250.0 });
    let before: Vec<Point> = engine.sprites().iter().map(|s| s.pos()).collect();

    // Same absolute offset again: delta 0, nothing moves.
    engine.handle_event(Event::Scroll { offset: 250.0 });
    let after: Vec<Point> = engine.sprites().iter().map(|s| s.pos()).collect();
    assert_eq!(before, after);
}

#[test]
fn scroll_shifts_every_star_by_half_the_delta_mod_height() {
    // Parallax 0.5: a +100 scroll moves every sprite up by exactly 50.
    let mut s = particle_scenario();
    assert_eq!(s.field.parallax, 0.5);
    s.comets.spawn_probability = 0.0;
    let mut engine = Engine::new(&s).unwrap();

    let before: Vec<f64> = engine.sprites().iter().map(|p| p.pos().y).collect();
    engine.handle_event(Event::Scroll { offset: 100.0 });

    for (sprite, y0) in engine.sprites().iter().zip(before) {
        let expected = (y0 - 50.0).rem_euclid(600.0);
        assert!(
            (sprite.pos().y - expected).abs() < 1e-9,
            "expected {expected}, got {}",
            sprite.pos().y
        );
    }
}

#[test]
fn wrap_law_holds_for_arbitrarily_large_scroll_deltas() {
    let mut engine = Engine::new(&particle_scenario()).unwrap();

    for offset in [1.0e6, -4.2e7, 3.3e9, 0.0, -1.0] {
        engine.handle_event(Event::Scroll { offset });
        for sprite in engine.sprites() {
            let y = sprite.pos().y;
            assert!((0.0..600.0).contains(&y), "offset {offset} left y at {y}");
        }
    }
}

#[test]
fn forced_spawn_probability_adds_exactly_one_comet_per_tick() {
    let mut s = particle_scenario();
    s.comets.spawn_probability = 1.0;
    let mut engine = Engine::new(&s).unwrap();

    engine.tick();
    assert_eq!(engine.comets().len(), 1);
    assert_eq!(engine.stats().comets_spawned, 1);
}

#[test]
fn comet_at_850_610_survives_until_a_threshold_is_exceeded() {
    // Removal triggers only once x > 900 or y > 700 on an 800x600 surface.
    let c = Comet {
        pos: Point::new(850.0, 610.0),
        angle: std::f64::consts::FRAC_PI_2,
        speed: 4.0,
        trail_length: 100.0,
        special: false,
    };
    let viewport = Viewport::new(800, 600);
    assert!(!c.has_exited(viewport, 100.0));

    let mut c = c;
    while !c.has_exited(viewport, 100.0) {
        c.advance();
    }
    assert!(c.pos.y > 700.0);
}

#[test]
fn comets_never_linger_beyond_the_margin_across_a_long_run() {
    let mut s = particle_scenario();
    s.comets.spawn_probability = 1.0;
    let mut engine = Engine::new(&s).unwrap();

    for _ in 0..2_000 {
        engine.tick();
        for comet in engine.comets() {
            assert!(comet.pos.y <= 700.0, "expired comet retained: y={}", comet.pos.y);
            assert!(comet.pos.x <= 900.0, "expired comet retained: x={}", comet.pos.x);
        }
    }

    let stats = engine.stats();
    assert!(stats.comets_spawned > 0);
    assert!(stats.comets_retired > 0);
    assert_eq!(
        stats.comets_spawned,
        stats.comets_retired + engine.comets().len() as u64
    );
}

#[test]
fn resize_regenerates_the_full_population_at_the_new_size() {
    let mut engine = Engine::new(&star_scenario()).unwrap();
    let count = engine.sprites().len();
    let before: Vec<Point> = engine.sprites().iter().map(|s| s.pos()).collect();

    engine.handle_event(Event::Resize {
        width: 400,
        height: 300,
    });

    assert_eq!(engine.sprites().len(), count);
    let after: Vec<Point> = engine.sprites().iter().map(|s| s.pos()).collect();
    assert_ne!(before, after, "resize must discard the old population");
    for p in &after {
        assert!((0.0..400.0).contains(&p.x));
        assert!((0.0..300.0).contains(&p.y));
    }
}

#[test]
fn starfield_mode_spawns_stars_not_particles() {
    let engine = Engine::new(&star_scenario()).unwrap();
    assert_eq!(engine.field().mode, FieldMode::Starfield);
    assert!(engine.sprites().iter().all(|s| matches!(s, Sprite::Star(_))));
}

#[test]
fn runs_with_the_same_seed_are_identical() {
    let mut s = particle_scenario();
    s.comets.spawn_probability = 0.2;
    s.duration = FrameIndex(300);

    let mut a = Engine::new(&s).unwrap();
    let mut b = Engine::new(&s).unwrap();
    for i in 0..300 {
        if i == 120 {
            a.handle_event(Event::Scroll { offset: 80.0 });
            b.handle_event(Event::Scroll { offset: 80.0 });
        }
        a.tick();
        b.tick();
    }

    let pa: Vec<Point> = a.sprites().iter().map(|s| s.pos()).collect();
    let pb: Vec<Point> = b.sprites().iter().map(|s| s.pos()).collect();
    assert_eq!(pa, pb);
    assert_eq!(a.stats(), b.stats());
}
