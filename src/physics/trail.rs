use std::collections::VecDeque;

use bevy::math::Vec2;

use crate::config::TrailConfig;

/// Points smaller than this are dropped regardless of opacity.
const MIN_RADIUS: f32 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub position: Vec2,
    pub radius: f32,
    pub opacity: f32,
}

/// Recent ball positions, newest first, each fading and shrinking every frame.
#[derive(Clone, Debug)]
pub struct TrailBuffer {
    points: VecDeque<TrailPoint>,
    config: TrailConfig,
}

impl TrailBuffer {
    pub fn new(config: TrailConfig) -> Self {
        Self {
            points: VecDeque::with_capacity(config.max_length + 1),
            config,
        }
    }

    /// Newest first.
    pub fn points(&self) -> impl ExactSizeIterator<Item = &TrailPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Record the ball (if it is moving fast and not held), then decay every point.
    pub fn update(&mut self, position: Vec2, speed: f32, ball_radius: f32, charging: bool) {
        if !charging && speed > self.config.speed_threshold {
            self.points.push_front(TrailPoint {
                position,
                radius: ball_radius * self.config.start_radius_factor,
                opacity: self.config.start_opacity,
            });
            self.points.truncate(self.config.max_length);
        }

        let TrailConfig {
            fade_rate,
            scale_rate,
            min_opacity,
            ..
        } = self.config;
        self.points.retain_mut(|point| {
            point.opacity *= fade_rate;
            point.radius *= scale_rate;
            point.opacity >= min_opacity && point.radius >= MIN_RADIUS
        });
    }
}
