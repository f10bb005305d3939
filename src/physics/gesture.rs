use bevy::math::Vec2;
use rand::Rng;
use tracing::{debug, info};

use super::ball::Ball;
use super::noise::jitter;
use crate::config::ChargeConfig;

const LAUNCH_SPIN_FACTOR: f32 = 0.03;
const LAUNCH_SPIN_JITTER: f32 = 0.02;

/// Colour bucket for the aiming arrow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChargeBand {
    Weak,
    Medium,
    Strong,
}

/// Press-drag-release launcher. While active the ball is frozen; the drag
/// vector (current - start) becomes the launch direction on release.
#[derive(Clone, Debug, PartialEq)]
pub struct ChargeGesture {
    active: bool,
    start: Vec2,
    current: Vec2,
    config: ChargeConfig,
}

impl ChargeGesture {
    pub fn new(config: ChargeConfig) -> Self {
        Self {
            active: false,
            start: Vec2::ZERO,
            current: Vec2::ZERO,
            config,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn start(&self) -> Vec2 {
        self.start
    }

    pub fn current(&self) -> Vec2 {
        self.current
    }

    pub fn drag(&self) -> Vec2 {
        self.current - self.start
    }

    /// `min(length / max_length, 1)`, zero when idle.
    pub fn power_fraction(&self) -> f32 {
        if !self.active || self.config.max_length <= 0.0 {
            return 0.0;
        }
        (self.drag().length() / self.config.max_length).min(1.0)
    }

    /// Launch speed the current drag would produce, in `[0, max_power]`.
    pub fn power(&self) -> f32 {
        self.power_fraction() * self.config.max_power
    }

    pub fn band(&self) -> ChargeBand {
        match self.power_fraction() {
            f if f < 0.33 => ChargeBand::Weak,
            f if f < 0.66 => ChargeBand::Medium,
            _ => ChargeBand::Strong,
        }
    }

    /// Tip of the aiming arrow: only once the drag is long enough to launch,
    /// and never longer than `max_length`.
    pub fn arrow_end(&self) -> Option<Vec2> {
        if !self.active {
            return None;
        }
        let drag = self.drag();
        let length = drag.length();
        if length < self.config.min_length || length == 0.0 {
            return None;
        }
        Some(self.start + drag / length * length.min(self.config.max_length))
    }

    /// Start charging if `point` is on the ball. Returns whether it started.
    pub fn press(&mut self, point: Vec2, ball: &Ball) -> bool {
        if !ball.contains(point) {
            return false;
        }
        self.active = true;
        self.start = point;
        self.current = point;
        debug!(x = point.x, y = point.y, "charge started");
        true
    }

    pub fn move_to(&mut self, point: Vec2) {
        if self.active {
            self.current = point;
        }
    }

    /// Finish the gesture. A long enough drag sets the ball's velocity and
    /// spin; a short one is dropped. Returns the launch velocity, if any.
    pub fn release<R: Rng + ?Sized>(&mut self, ball: &mut Ball, rng: &mut R) -> Option<Vec2> {
        if !self.active {
            return None;
        }

        let drag = self.drag();
        let length = drag.length();
        let launch = if length >= self.config.min_length && length > 0.0 {
            let velocity = drag / length * self.power();
            let spin = velocity.x * LAUNCH_SPIN_FACTOR + jitter(rng, LAUNCH_SPIN_JITTER);
            ball.launch(velocity, spin);
            info!(speed = velocity.length(), length, "ball launched");
            Some(velocity)
        } else {
            debug!(length, "charge too short, discarded");
            None
        };

        self.clear();
        launch
    }

    /// Pointer left the surface: drop the gesture without launching.
    pub fn cancel(&mut self) {
        if self.active {
            debug!("charge cancelled");
        }
        self.clear();
    }

    fn clear(&mut self) {
        self.active = false;
        self.start = Vec2::ZERO;
        self.current = Vec2::ZERO;
    }
}
