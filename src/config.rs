use serde::Deserialize;
use tracing::warn;

/// Physics timing (one simulation step per tick; every coefficient below is per-step).
pub const PHYSICS_HZ: f64 = 60.0;

/// Initial viewport used until the window reports its real size.
pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

/// Ball defaults
pub const BALL_RADIUS: f32 = 25.0;
pub const BALL_MASS: f32 = 0.6;
pub const BALL_INITIAL_VELOCITY: (f32, f32) = (2.0, 0.0);
pub const GRAVITY: f32 = 0.5;
pub const RESTITUTION: f32 = 0.8;
pub const AIR_DENSITY: f32 = 0.001;
pub const DRAG_COEFFICIENT: f32 = 0.47; // sphere
pub const ROTATION_FRICTION: f32 = 0.98;

/// Ground strip ("tarmac") at the bottom of the play field
pub const GROUND_THICKNESS: f32 = 10.0;
pub const GROUND_FRICTION: f32 = 0.98;
pub const GROUND_JITTER: f32 = 0.05;
pub const PLATFORM_JITTER: f32 = 0.03;

/// Charge-and-launch gesture
pub const CHARGE_MIN_LENGTH: f32 = 20.0;
pub const CHARGE_MAX_LENGTH: f32 = 150.0;
pub const CHARGE_MAX_POWER: f32 = 40.0;

/// Motion trail
pub const TRAIL_MAX_LENGTH: usize = 25;
pub const TRAIL_FADE_RATE: f32 = 0.85;
pub const TRAIL_SCALE_RATE: f32 = 0.9;
pub const TRAIL_MIN_OPACITY: f32 = 0.1;
pub const TRAIL_SPEED_THRESHOLD: f32 = 3.0;

/// Ragdoll
pub const RAGDOLL_GRAVITY: f32 = 0.5;
pub const RAGDOLL_FRICTION: f32 = 0.98;
pub const RAGDOLL_AIR_DENSITY: f32 = 0.0003;
pub const RAGDOLL_RESTITUTION: f32 = 0.5;
pub const HEAD_RADIUS: f32 = 15.0;

/// How many Gauss–Seidel iterations to run per tick
pub const CONSTRAINT_ITERATIONS: usize = 5;

/// Tap impulse: force = min(MAX, FALLOFF / (distance + SOFTENING)) * multiplier
pub const IMPULSE_MAX_FORCE: f32 = 10.0;
pub const IMPULSE_FALLOFF: f32 = 100.0;
pub const IMPULSE_SOFTENING: f32 = 10.0;

/// Level layout
pub const MOBILE_WIDTH_THRESHOLD: f32 = 768.0;
pub const PLATFORM_COUNT: usize = 3;

/// Everything a `Simulation` needs to know up front.
///
/// Missing fields in a TOML file fall back to the constants above.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for platform layout and jitter; `None` draws one from the OS.
    pub seed: Option<u64>,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub ball: BallConfig,
    pub surface: SurfaceConfig,
    pub charge: ChargeConfig,
    pub trail: TrailConfig,
    pub ragdoll: RagdollConfig,
    pub level: LevelConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            ball: BallConfig::default(),
            surface: SurfaceConfig::default(),
            charge: ChargeConfig::default(),
            trail: TrailConfig::default(),
            ragdoll: RagdollConfig::default(),
            level: LevelConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load config from environment or TOML file, falling back to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("BOUNCE_PLAYGROUND_CONFIG") {
            if let Some(config) = Self::read(&path) {
                return config;
            }
        }
        Self::read("config/playground.toml").unwrap_or_default()
    }

    fn read(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        match toml::from_str::<Self>(&contents) {
            Ok(config) => Some(config),
            Err(err) => {
                warn!(path, %err, "ignoring malformed config file");
                None
            }
        }
    }

    /// Same config with a fixed seed; used by tests and the benchmark.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub radius: f32,
    pub mass: f32,
    pub initial_vx: f32,
    pub initial_vy: f32,
    pub gravity: f32,
    pub restitution: f32,
    pub air_density: f32,
    pub drag_coefficient: f32,
    pub rotation_friction: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            radius: BALL_RADIUS,
            mass: BALL_MASS,
            initial_vx: BALL_INITIAL_VELOCITY.0,
            initial_vy: BALL_INITIAL_VELOCITY.1,
            gravity: GRAVITY,
            restitution: RESTITUTION,
            air_density: AIR_DENSITY,
            drag_coefficient: DRAG_COEFFICIENT,
            rotation_friction: ROTATION_FRICTION,
        }
    }
}

impl BallConfig {
    /// Cross-section area, scaled down so drag stays a visual effect.
    pub fn area(&self) -> f32 {
        std::f32::consts::PI * self.radius * self.radius / 1000.0
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub ground_thickness: f32,
    pub ground_friction: f32,
    pub ground_jitter: f32,
    pub platform_jitter: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            ground_thickness: GROUND_THICKNESS,
            ground_friction: GROUND_FRICTION,
            ground_jitter: GROUND_JITTER,
            platform_jitter: PLATFORM_JITTER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    pub min_length: f32,
    pub max_length: f32,
    pub max_power: f32,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        Self {
            min_length: CHARGE_MIN_LENGTH,
            max_length: CHARGE_MAX_LENGTH,
            max_power: CHARGE_MAX_POWER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub max_length: usize,
    pub fade_rate: f32,
    pub scale_rate: f32,
    pub min_opacity: f32,
    pub speed_threshold: f32,
    pub start_opacity: f32,
    /// Fraction of the ball radius a fresh trail point starts with.
    pub start_radius_factor: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            max_length: TRAIL_MAX_LENGTH,
            fade_rate: TRAIL_FADE_RATE,
            scale_rate: TRAIL_SCALE_RATE,
            min_opacity: TRAIL_MIN_OPACITY,
            speed_threshold: TRAIL_SPEED_THRESHOLD,
            start_opacity: 0.7,
            start_radius_factor: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RagdollConfig {
    pub gravity: f32,
    pub friction: f32,
    pub air_density: f32,
    pub drag_coefficient: f32,
    pub restitution: f32,
    pub iterations: usize,
    pub head_radius: f32,
    pub impulse_max_force: f32,
    pub impulse_falloff: f32,
    pub impulse_softening: f32,
    pub head_impulse_multiplier: f32,
    pub joint_impulse_multiplier: f32,
}

impl Default for RagdollConfig {
    fn default() -> Self {
        Self {
            gravity: RAGDOLL_GRAVITY,
            friction: RAGDOLL_FRICTION,
            air_density: RAGDOLL_AIR_DENSITY,
            drag_coefficient: DRAG_COEFFICIENT,
            restitution: RAGDOLL_RESTITUTION,
            iterations: CONSTRAINT_ITERATIONS,
            head_radius: HEAD_RADIUS,
            impulse_max_force: IMPULSE_MAX_FORCE,
            impulse_falloff: IMPULSE_FALLOFF,
            impulse_softening: IMPULSE_SOFTENING,
            head_impulse_multiplier: 1.0,
            joint_impulse_multiplier: 0.8,
        }
    }
}

/// Random platform layout ranges. Widths depend on whether the viewport
/// counts as a phone-sized screen.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub platform_count: usize,
    pub mobile_width_threshold: f32,
    pub mobile_width_range: (f32, f32),
    pub desktop_width_range: (f32, f32),
    pub height_range: (f32, f32),
    pub max_rotation: f32,
    pub friction_range: (f32, f32),
    pub restitution_range: (f32, f32),
    pub corner_radius: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            platform_count: PLATFORM_COUNT,
            mobile_width_threshold: MOBILE_WIDTH_THRESHOLD,
            mobile_width_range: (80.0, 140.0),
            desktop_width_range: (120.0, 240.0),
            height_range: (14.0, 22.0),
            max_rotation: 0.35,
            friction_range: (0.90, 0.98),
            restitution_range: (0.55, 0.8),
            corner_radius: 6.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: SimConfig = toml::from_str(
            r#"
            seed = 7

            [ball]
            radius = 40.0

            [level]
            platform_count = 0
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.seed, Some(7));
        assert_eq!(config.ball.radius, 40.0);
        assert_eq!(config.ball.gravity, GRAVITY);
        assert_eq!(config.level.platform_count, 0);
        assert_eq!(config.trail, TrailConfig::default());
    }

    #[test]
    fn area_scales_with_radius_squared() {
        let ball = BallConfig::default();
        let expected = std::f32::consts::PI * 625.0 / 1000.0;
        assert!((ball.area() - expected).abs() < 1e-6);
    }
}
