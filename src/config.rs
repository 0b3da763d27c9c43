use crate::{
    core::{FrameIndex, Fps, Rgba8, Viewport},
    engine::Event,
    error::{DriftfieldError, DriftfieldResult},
};

/// Which persistent-entity class the field is populated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMode {
    /// Drifting dots joined by distance-faded links.
    ParticleNetwork,
    /// Twinkling stars; no links.
    Starfield,
}

/// Tuning for the persistent entity population.
///
/// Fields that only apply to one mode (`connection_distance`, `link_alpha`,
/// `fade_speed_range`, ...) are carried unconditionally so a scenario can
/// switch modes without re-authoring the rest.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct FieldConfig {
    pub mode: FieldMode,
    /// Population size; regeneration on resize recreates exactly this many.
    pub count: u32,
    /// Scroll-shift multiplier for persistent entities.
    pub parallax: f64,
    pub base_color: Rgba8,
    /// Disc radius range, pixels.
    pub size_range: [f64; 2],
    /// Particle velocity components are uniform in ±velocity_scale/2 px/tick.
    pub velocity_scale: f64,
    /// Disc alpha for particles; stars use their oscillating opacity instead.
    pub fill_alpha: f64,
    /// Link cutoff distance in pixels (particle-network mode only).
    pub connection_distance: f64,
    /// Link alpha at zero distance; fades linearly to zero at the cutoff.
    pub link_alpha: f64,
    /// Star fade-speed magnitude range, opacity units per tick.
    pub fade_speed_range: [f64; 2],
}

impl FieldConfig {
    /// The original page's look: 60 cyan dots with distance-faded links.
    pub fn particle_network() -> Self {
        Self {
            mode: FieldMode::ParticleNetwork,
            count: 60,
            parallax: 0.5,
            base_color: Rgba8::new(0, 243, 255, 255),
            size_range: [1.0, 3.0],
            velocity_scale: 0.5,
            fill_alpha: 0.5,
            connection_distance: 150.0,
            link_alpha: 0.2,
            fade_speed_range: [0.002, 0.012],
        }
    }

    /// A denser field of small stars that fade in and out.
    pub fn starfield() -> Self {
        Self {
            mode: FieldMode::Starfield,
            count: 120,
            parallax: 0.3,
            base_color: Rgba8::new(210, 235, 255, 255),
            size_range: [0.5, 2.0],
            velocity_scale: 0.0,
            fill_alpha: 1.0,
            connection_distance: 150.0,
            link_alpha: 0.2,
            fade_speed_range: [0.002, 0.012],
        }
    }
}

/// Tuning for transient comets.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CometConfig {
    /// Per-tick probability of spawning one comet.
    pub spawn_probability: f64,
    /// Probability that a spawned comet is the special variant.
    pub special_probability: f64,
    /// Speed range in px/tick for ordinary comets.
    pub speed_range: [f64; 2],
    /// Speed range for special comets; faster to read as "closer".
    pub special_speed_range: [f64; 2],
    /// Trail extent behind the head, pixels.
    pub trail_length_range: [f64; 2],
    /// Travel direction range in radians from +x toward +y, so pi/2 is
    /// straight down. Keep inside (0, pi) for the downward bias.
    pub angle_range: [f64; 2],
    pub head_radius: f64,
    pub color: Rgba8,
    pub special_color: Rgba8,
    /// Scroll-shift multiplier; larger than the field's to imply depth.
    pub parallax: f64,
    /// Spawn y sits this many pixels above the top edge.
    pub spawn_height: f64,
    /// Removal margin beyond the bottom/right edges, pixels.
    pub margin: f64,
}

impl Default for CometConfig {
    fn default() -> Self {
        Self {
            spawn_probability: 0.012,
            special_probability: 0.1,
            speed_range: [2.0, 5.0],
            special_speed_range: [5.0, 9.0],
            trail_length_range: [60.0, 140.0],
            angle_range: [std::f64::consts::FRAC_PI_3, 2.0 * std::f64::consts::FRAC_PI_3],
            head_radius: 2.0,
            color: Rgba8::new(235, 245, 255, 255),
            special_color: Rgba8::new(255, 105, 180, 255),
            parallax: 0.8,
            spawn_height: 20.0,
            margin: 100.0,
        }
    }
}

/// A scripted engine event, applied before the tick of `frame` in offline
/// renders. Lets a scenario exercise parallax and resize without a host.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct TimedEvent {
    pub frame: u64,
    pub event: Event,
}

/// Everything needed to reproduce an animation run: surface, timing, seed,
/// population tuning, and any scripted events.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Scenario {
    pub viewport: Viewport,
    pub fps: Fps,
    pub duration: FrameIndex, // total frames for offline renders
    pub seed: u64,            // global determinism seed
    pub background: Rgba8,
    pub field: FieldConfig,
    pub comets: CometConfig,
    #[serde(default)]
    pub events: Vec<TimedEvent>,
}

impl Scenario {
    pub fn particle_network(viewport: Viewport) -> Self {
        Self {
            viewport,
            fps: Fps { num: 60, den: 1 },
            duration: FrameIndex(600),
            seed: 7,
            background: Rgba8::new(5, 10, 20, 255),
            field: FieldConfig::particle_network(),
            comets: CometConfig::default(),
            events: Vec::new(),
        }
    }

    pub fn starfield(viewport: Viewport) -> Self {
        Self {
            field: FieldConfig::starfield(),
            ..Self::particle_network(viewport)
        }
    }

    pub fn validate(&self) -> DriftfieldResult<()> {
        if self.viewport.is_degenerate() {
            return Err(DriftfieldError::validation(
                "viewport width/height must be > 0",
            ));
        }
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(DriftfieldError::validation("fps must have num>0 and den>0"));
        }
        if self.duration.0 == 0 {
            return Err(DriftfieldError::validation("duration must be > 0 frames"));
        }

        self.field.validate()?;
        self.comets.validate()?;
        Ok(())
    }
}

impl FieldConfig {
    pub fn validate(&self) -> DriftfieldResult<()> {
        ordered_range("field size_range", self.size_range)?;
        ordered_range("field fade_speed_range", self.fade_speed_range)?;
        if self.fade_speed_range[0] < 0.0 {
            return Err(DriftfieldError::validation(
                "field fade_speed_range must be non-negative",
            ));
        }
        finite_non_negative("field parallax", self.parallax)?;
        finite_non_negative("field velocity_scale", self.velocity_scale)?;
        unit_interval("field fill_alpha", self.fill_alpha)?;
        unit_interval("field link_alpha", self.link_alpha)?;
        if self.mode == FieldMode::ParticleNetwork && self.connection_distance <= 0.0 {
            return Err(DriftfieldError::validation(
                "field connection_distance must be > 0 in particle_network mode",
            ));
        }
        Ok(())
    }
}

impl CometConfig {
    pub fn validate(&self) -> DriftfieldResult<()> {
        unit_interval("comet spawn_probability", self.spawn_probability)?;
        unit_interval("comet special_probability", self.special_probability)?;
        ordered_range("comet speed_range", self.speed_range)?;
        ordered_range("comet special_speed_range", self.special_speed_range)?;
        ordered_range("comet trail_length_range", self.trail_length_range)?;
        ordered_range("comet angle_range", self.angle_range)?;
        if self.head_radius <= 0.0 || !self.head_radius.is_finite() {
            return Err(DriftfieldError::validation("comet head_radius must be > 0"));
        }
        finite_non_negative("comet parallax", self.parallax)?;
        finite_non_negative("comet spawn_height", self.spawn_height)?;
        finite_non_negative("comet margin", self.margin)?;
        Ok(())
    }
}

fn ordered_range(name: &str, r: [f64; 2]) -> DriftfieldResult<()> {
    if !r[0].is_finite() || !r[1].is_finite() || r[0] > r[1] {
        return Err(DriftfieldError::validation(format!(
            "{name} must be a finite [lo, hi] with lo <= hi"
        )));
    }
    Ok(())
}

fn unit_interval(name: &str, v: f64) -> DriftfieldResult<()> {
    if !v.is_finite() || !(0.0..=1.0).contains(&v) {
        return Err(DriftfieldError::validation(format!(
            "{name} must be within [0, 1]"
        )));
    }
    Ok(())
}

fn finite_non_negative(name: &str, v: f64) -> DriftfieldResult<()> {
    if !v.is_finite() || v < 0.0 {
        return Err(DriftfieldError::validation(format!(
            "{name} must be finite and >= 0"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_scenario() -> Scenario {
        Scenario::particle_network(Viewport::new(800, 600))
    }

    #[test]
    fn presets_validate() {
        basic_scenario().validate().unwrap();
        Scenario::starfield(Viewport::new(1920, 1080))
            .validate()
            .unwrap();
    }

    #[test]
    fn validate_rejects_degenerate_viewport() {
        let mut s = basic_scenario();
        s.viewport = Viewport::new(0, 600);
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_duration() {
        let mut s = basic_scenario();
        s.duration = FrameIndex(0);
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_probability() {
        let mut s = basic_scenario();
        s.comets.spawn_probability = 1.5;
        assert!(s.validate().is_err());

        let mut s = basic_scenario();
        s.comets.special_probability = -0.1;
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let mut s = basic_scenario();
        s.field.size_range = [3.0, 1.0];
        assert!(s.validate().is_err());

        let mut s = basic_scenario();
        s.comets.speed_range = [5.0, 2.0];
        assert!(s.validate().is_err());
    }

    #[test]
    fn validate_rejects_nonsense_connection_distance() {
        let mut s = basic_scenario();
        s.field.connection_distance = 0.0;
        assert!(s.validate().is_err());

        // Starfield mode never draws links, so the cutoff is not checked.
        s.field.mode = FieldMode::Starfield;
        s.validate().unwrap();
    }

    #[test]
    fn json_roundtrip_is_stable() {
        let mut s = basic_scenario();
        s.events.push(TimedEvent {
            frame: 30,
            event: Event::Scroll { offset: 120.0 },
        });
        s.events.push(TimedEvent {
            frame: 60,
            event: Event::Resize {
                width: 1024,
                height: 768,
            },
        });

        let json = serde_json::to_string_pretty(&s).unwrap();
        let back: Scenario = serde_json::from_str(&json).unwrap();
        assert_eq!(json, serde_json::to_string_pretty(&back).unwrap());
        back.validate().unwrap();
    }

    #[test]
    fn events_field_is_optional_in_json() {
        let mut value = serde_json::to_value(basic_scenario()).unwrap();
        value.as_object_mut().unwrap().remove("events");
        let back: Scenario = serde_json::from_value(value).unwrap();
        assert!(back.events.is_empty());
    }
}
