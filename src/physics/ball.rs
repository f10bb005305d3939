use bevy::math::Vec2;
use rand::Rng;

use super::noise::jitter;
use super::platform::Platform;
use crate::config::{BallConfig, SurfaceConfig};

/// How close (in units) the ball's bottom edge must be to a surface to count as resting on it.
pub const SUPPORT_EPSILON: f32 = 1.0;
/// Below this vertical speed a supported ball stops bouncing.
pub const REST_SPEED: f32 = 0.5;
/// Horizontal speed under which surface jitter is not applied.
const JITTER_MIN_SPEED: f32 = 0.1;
/// Extra push-out distance after a platform hit.
const PLATFORM_SEPARATION: f32 = 1.0;

/// Spin picked up from horizontal speed on a rolling contact.
const ROLL_SPIN_FACTOR: f32 = 0.05;
const CEILING_SPIN_DAMPING: f32 = -0.8;
const WALL_SPIN_DAMPING: f32 = -0.7;
const RESTING_SPIN_DAMPING: f32 = 0.95;
const GROUND_KICK_JITTER: f32 = 0.5;
const GROUND_SPIN_JITTER: f32 = 0.01;
const PLATFORM_SPIN_JITTER: f32 = 0.02;

/// Axis-aligned limits for the ball's *centre*.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Boundaries {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Boundaries {
    /// Viewport minus the ball radius on every side, and minus the ground strip at the bottom.
    pub fn from_viewport(width: f32, height: f32, radius: f32, ground_thickness: f32) -> Self {
        Self {
            left: radius,
            right: width - radius,
            top: radius,
            bottom: height - ground_thickness - radius,
        }
    }
}

/// What the ball collides with during one update.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings<'a> {
    pub platforms: &'a [Platform],
    pub boundaries: Boundaries,
    pub surface: &'a SurfaceConfig,
}

/// The resolved outcome of a platform hit (world-space normal).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatformContact {
    pub normal: Vec2,
    pub penetration: f32,
    /// Landed on the top face, within the platform's width.
    pub supporting: bool,
}

/// A single spinning point mass with a radius. Positions are in drawing
/// space: origin top-left, +y down, so gravity is positive.
#[derive(Clone, Debug, PartialEq)]
pub struct Ball {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Accumulated angle (radians), purely visual.
    pub rotation: f32,
    /// Radians per step.
    pub rotation_speed: f32,
    radius: f32,
    mass: f32,
    gravity: f32,
    drag_coefficient: f32,
    air_density: f32,
    area: f32,
    restitution: f32,
    rotation_friction: f32,
}

impl Ball {
    pub fn from_config(config: &BallConfig, position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::new(config.initial_vx, config.initial_vy),
            rotation: 0.0,
            rotation_speed: 0.0,
            radius: config.radius,
            mass: config.mass,
            gravity: config.gravity,
            drag_coefficient: config.drag_coefficient,
            air_density: config.air_density,
            area: config.area(),
            restitution: config.restitution,
            rotation_friction: config.rotation_friction,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    /// Always derived from the current velocity.
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Hit test used to start a charge gesture.
    pub fn contains(&self, point: Vec2) -> bool {
        self.position.distance(point) <= self.radius
    }

    pub fn is_on_ground(&self, boundaries: &Boundaries) -> bool {
        self.position.y >= boundaries.bottom - SUPPORT_EPSILON
    }

    /// Bottom edge within [`SUPPORT_EPSILON`] of the platform's top face
    /// (local `-half_height`, +y is down) and centre inside its width.
    pub fn is_on_platform(&self, platform: &Platform) -> bool {
        let local = platform.to_local(self.position);
        (local.y + self.radius + platform.half_height).abs() <= SUPPORT_EPSILON
            && local.x >= -platform.half_width
            && local.x <= platform.half_width
    }

    /// First platform the ball rests on, in list order.
    pub fn supporting_platform<'p>(&self, platforms: &'p [Platform]) -> Option<&'p Platform> {
        platforms.iter().find(|p| self.is_on_platform(p))
    }

    /// One full step: forces, surface friction, motion, platforms, walls, rest clamp.
    /// The caller skips this while a charge gesture holds the ball.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R, env: &Surroundings<'_>) {
        self.apply_forces();
        self.apply_surface_friction(rng, env);

        self.position += self.velocity;
        self.rotation += self.rotation_speed;
        self.rotation_speed *= self.rotation_friction;

        let mut landed_on = None;
        for platform in env.platforms {
            if let Some(contact) = self.collide_platform(rng, platform) {
                if contact.supporting && landed_on.is_none() {
                    landed_on = Some(platform);
                }
            }
        }
        self.collide_boundaries(rng, &env.boundaries);
        self.settle(env, landed_on);
    }

    /// Gravity, then quadratic drag `0.5 * rho * v^2 * Cd * A` against the motion.
    pub fn apply_forces(&mut self) {
        self.velocity.y += self.gravity;

        let speed = self.speed();
        if speed > 0.0 {
            let drag =
                0.5 * self.air_density * speed * speed * self.drag_coefficient * self.area;
            self.velocity -= drag * (self.velocity / speed) / self.mass;
        }
    }

    fn apply_surface_friction<R: Rng + ?Sized>(&mut self, rng: &mut R, env: &Surroundings<'_>) {
        let (friction, amplitude) = if let Some(platform) = self.supporting_platform(env.platforms)
        {
            (platform.friction, env.surface.platform_jitter)
        } else if self.is_on_ground(&env.boundaries) {
            (env.surface.ground_friction, env.surface.ground_jitter)
        } else {
            return;
        };

        self.velocity.x *= friction;
        if self.velocity.x.abs() > JITTER_MIN_SPEED {
            self.velocity.x += jitter(rng, amplitude);
        }
    }

    /// Circle vs oriented box. Resolves only when the ball moves into the
    /// surface; returns the contact that was resolved.
    pub fn collide_platform<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        platform: &Platform,
    ) -> Option<PlatformContact> {
        let local = platform.to_local(self.position);
        let closest = platform.closest_local_point(local);
        let offset = local - closest;
        let distance = offset.length();
        if distance >= self.radius {
            return None;
        }

        let normal = if distance == 0.0 {
            platform.interior_normal(local)
        } else {
            offset / distance
        };

        let local_velocity = platform.to_local_vector(self.velocity);
        let approach = local_velocity.dot(normal);
        if approach >= 0.0 {
            return None;
        }

        let reflected = (local_velocity - 2.0 * approach * normal) * platform.restitution;
        self.velocity = platform.to_world_vector(reflected);

        let penetration = self.radius - distance;
        let world_normal = platform.to_world_vector(normal);
        self.position += world_normal * (penetration + PLATFORM_SEPARATION);

        if normal.y.abs() > normal.x.abs() {
            self.rotation_speed = self.velocity.x * ROLL_SPIN_FACTOR;
        } else {
            self.rotation_speed *= WALL_SPIN_DAMPING;
        }
        self.rotation_speed += jitter(rng, PLATFORM_SPIN_JITTER);

        Some(PlatformContact {
            normal: world_normal,
            penetration,
            supporting: normal.y < 0.0
                && normal.y.abs() > normal.x.abs()
                && local.x.abs() <= platform.half_width,
        })
    }

    /// Clamp to the play field and bounce off whichever edges were crossed.
    pub fn collide_boundaries<R: Rng + ?Sized>(&mut self, rng: &mut R, bounds: &Boundaries) {
        if self.position.y >= bounds.bottom {
            self.position.y = bounds.bottom;
            let impact = self.velocity.y;
            self.velocity.y = -impact * self.restitution;
            if impact.abs() > REST_SPEED {
                self.velocity.x += jitter(rng, GROUND_KICK_JITTER);
            }
            self.rotation_speed =
                self.velocity.x * ROLL_SPIN_FACTOR + jitter(rng, GROUND_SPIN_JITTER);
        }

        if self.position.y <= bounds.top {
            self.position.y = bounds.top;
            self.velocity.y = -self.velocity.y * self.restitution;
            self.rotation_speed *= CEILING_SPIN_DAMPING;
        }

        if self.position.x >= bounds.right {
            self.position.x = bounds.right;
            self.velocity.x = -self.velocity.x * self.restitution;
            self.rotation_speed *= WALL_SPIN_DAMPING;
        }

        if self.position.x <= bounds.left {
            self.position.x = bounds.left;
            self.velocity.x = -self.velocity.x * self.restitution;
            self.rotation_speed *= WALL_SPIN_DAMPING;
        }
    }

    /// Kill residual bouncing on whatever surface holds the ball. A platform
    /// landed on this step counts as support even if the push-out left the
    /// ball just past [`SUPPORT_EPSILON`].
    fn settle(&mut self, env: &Surroundings<'_>, landed_on: Option<&Platform>) {
        if self.velocity.y.abs() >= REST_SPEED {
            return;
        }

        if self.is_on_ground(&env.boundaries) {
            self.position.y = env.boundaries.bottom;
        } else if let Some(platform) =
            landed_on.or_else(|| self.supporting_platform(env.platforms))
        {
            let mut local = platform.to_local(self.position);
            local.y = -platform.half_height - self.radius;
            self.position = platform.to_world(local);
        } else {
            return;
        }

        self.velocity.y = 0.0;
        if self.velocity.x.abs() < REST_SPEED {
            self.rotation_speed *= RESTING_SPIN_DAMPING;
        }
    }

    /// Replace velocity and spin at the instant a charge is released.
    pub fn launch(&mut self, velocity: Vec2, rotation_speed: f32) {
        self.velocity = velocity;
        self.rotation_speed = rotation_speed;
    }

    /// Pull the ball back inside after the viewport shrinks.
    pub fn clamp_into(&mut self, bounds: &Boundaries) {
        self.position.x = self.position.x.min(bounds.right).max(bounds.left);
        self.position.y = self.position.y.min(bounds.bottom).max(bounds.top);
    }
}
