use crate::{
    comet::Comet,
    config::{CometConfig, FieldConfig, Scenario},
    core::{Rgba8, Viewport},
    error::DriftfieldResult,
    rng::Rng64,
    sprite::Sprite,
};

/// Viewport signal delivered by the hosting environment between ticks.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Event {
    /// The surface changed size; the population is regenerated wholesale.
    Resize { width: u32, height: u32 },
    /// The page scrolled to a new absolute offset; entities shift by
    /// `-(offset - last_offset) * parallax` with modular vertical wrap.
    Scroll { offset: f64 },
}

/// Counters accumulated across a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ticks: u64,
    pub comets_spawned: u64,
    pub comets_retired: u64,
}

/// The animation state machine. Owns every piece of mutable state the
/// original kept in page-lifetime globals: the entity collections, the last
/// observed scroll offset, the surface dimensions, and the RNG.
///
/// The engine never schedules itself; an external driver calls [`tick`] once
/// per display frame and [`handle_event`] for resize/scroll notifications in
/// delivery order. After construction it is infallible.
///
/// [`tick`]: Engine::tick
/// [`handle_event`]: Engine::handle_event
pub struct Engine {
    field: FieldConfig,
    comet_cfg: CometConfig,
    background: Rgba8,
    viewport: Viewport,
    sprites: Vec<Sprite>,
    comets: Vec<Comet>,
    scroll_offset: f64,
    rng: Rng64,
    stats: EngineStats,
}

impl Engine {
    #[tracing::instrument(skip(scenario), fields(seed = scenario.seed))]
    pub fn new(scenario: &Scenario) -> DriftfieldResult<Self> {
        scenario.validate()?;
        let mut engine = Self {
            field: scenario.field.clone(),
            comet_cfg: scenario.comets.clone(),
            background: scenario.background,
            viewport: scenario.viewport,
            sprites: Vec::with_capacity(scenario.field.count as usize),
            comets: Vec::new(),
            scroll_offset: 0.0,
            rng: Rng64::new(scenario.seed),
            stats: EngineStats::default(),
        };
        engine.populate();
        Ok(engine)
    }

    /// Replace the whole persistent population with freshly randomized
    /// entities. A degenerate viewport leaves the field empty: without a
    /// usable surface the feature is silently disabled.
    fn populate(&mut self) {
        self.sprites.clear();
        if self.viewport.is_degenerate() {
            return;
        }
        for _ in 0..self.field.count {
            self.sprites
                .push(Sprite::spawn(&mut self.rng, self.viewport, &self.field));
        }
    }

    /// Service one resize or scroll notification. Callbacks run to
    /// completion in delivery order; no event ever errors.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Resize { width, height } => {
                self.viewport = Viewport::new(width, height);
                self.populate();
                tracing::debug!(width, height, "resized; population regenerated");
            }
            Event::Scroll { offset } => {
                let delta = offset - self.scroll_offset;
                self.scroll_offset = offset;
                if delta == 0.0 {
                    return;
                }

                let height = self.viewport.height_f64();
                let sprite_shift = delta * self.field.parallax;
                let comet_shift = delta * self.comet_cfg.parallax;
                for sprite in &mut self.sprites {
                    sprite.shift_y(sprite_shift, height);
                }
                for comet in &mut self.comets {
                    comet.shift_y(comet_shift, height);
                }
            }
        }
    }

    /// Advance the simulation one display frame:
    /// persistent entities first, then at most one probabilistic comet
    /// spawn, then comet motion with synchronous removal of everything
    /// beyond the exit margin. Expired comets never survive into the next
    /// frame's draw.
    pub fn tick(&mut self) {
        for sprite in &mut self.sprites {
            sprite.advance(self.viewport);
        }

        if !self.viewport.is_degenerate() && self.rng.chance(self.comet_cfg.spawn_probability) {
            let comet = Comet::spawn(&mut self.rng, self.viewport, &self.comet_cfg);
            tracing::debug!(
                x = comet.pos.x,
                speed = comet.speed,
                special = comet.special,
                "comet spawned"
            );
            self.comets.push(comet);
            self.stats.comets_spawned += 1;
        }

        for comet in &mut self.comets {
            comet.advance();
        }
        let live_before = self.comets.len();
        let viewport = self.viewport;
        let margin = self.comet_cfg.margin;
        self.comets.retain(|c| !c.has_exited(viewport, margin));
        self.stats.comets_retired += (live_before - self.comets.len()) as u64;

        self.stats.ticks += 1;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn background(&self) -> Rgba8 {
        self.background
    }

    pub fn field(&self) -> &FieldConfig {
        &self.field
    }

    pub fn comet_config(&self) -> &CometConfig {
        &self.comet_cfg
    }

    pub fn sprites(&self) -> &[Sprite] {
        &self.sprites
    }

    pub fn comets(&self) -> &[Comet] {
        &self.comets
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}
