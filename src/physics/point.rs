use bevy::math::Vec2;

/// A ragdoll point mass ("joint"). Unlike the ball it carries explicit
/// velocity; the solver nudges both position and velocity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    /// Pinned points never move and never pick up velocity.
    pub fixed: bool,
    /// Collision radius against the play field; only the head has one.
    pub radius: f32,
}

impl Default for Point {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 1.0,
            fixed: false,
            radius: 0.0,
        }
    }
}

/// Per-step forces shared by every point of one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointForces {
    pub gravity: f32,
    pub air_density: f32,
    pub drag_coefficient: f32,
}

/// Floor and side walls for ragdoll points, plus how they bounce.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointBounds {
    pub left: f32,
    pub right: f32,
    pub floor: f32,
    pub restitution: f32,
    pub friction: f32,
}

impl Point {
    pub fn new(position: Vec2, mass: f32) -> Self {
        Self {
            position,
            mass,
            ..Default::default()
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Explicit Euler step: `vy += g * m`, quadratic drag scaled by `1/m`, then `x += v`.
    pub fn integrate(&mut self, forces: &PointForces) {
        if self.fixed {
            self.velocity = Vec2::ZERO;
            return;
        }

        self.velocity.y += forces.gravity * self.mass;

        let speed = self.velocity.length();
        if speed > 0.0 {
            let drag = 0.5 * forces.air_density * speed * speed * forces.drag_coefficient;
            self.velocity -= drag * (self.velocity / speed) / self.mass;
        }

        self.position += self.velocity;
    }

    /// Clamp to the floor and walls (inset by `radius`) and reflect the
    /// crossing velocity component. Returns true on floor contact.
    pub fn bounce_in_bounds(&mut self, bounds: &PointBounds) -> bool {
        let floor = bounds.floor - self.radius;
        let left = bounds.left + self.radius;
        let right = bounds.right - self.radius;

        let mut grounded = false;
        if self.position.y > floor {
            self.position.y = floor;
            self.velocity.y = -self.velocity.y * bounds.restitution;
            self.velocity.x *= bounds.friction;
            grounded = true;
        }

        if self.position.x < left {
            self.position.x = left;
            self.velocity.x = -self.velocity.x * bounds.restitution;
        } else if self.position.x > right {
            self.position.x = right;
            self.velocity.x = -self.velocity.x * bounds.restitution;
        }
        grounded
    }

    /// Keep inside the play field without reflecting (viewport shrank).
    pub fn clamp_to_bounds(&mut self, bounds: &PointBounds) {
        let min_x = bounds.left + self.radius;
        let max_x = (bounds.right - self.radius).max(min_x);
        self.position.x = self.position.x.clamp(min_x, max_x);
        self.position.y = self.position.y.min(bounds.floor - self.radius);
    }

    /// Radial push away from `origin`, strongest up close:
    /// `min(max_force, falloff / (d + softening)) * multiplier`.
    pub fn push_away_from(
        &mut self,
        origin: Vec2,
        max_force: f32,
        falloff: f32,
        softening: f32,
        multiplier: f32,
    ) -> bool {
        if self.fixed {
            return false;
        }
        let diff = self.position - origin;
        let distance = diff.length();
        if distance <= 0.0 {
            return false;
        }
        let force = max_force.min(falloff / (distance + softening)) * multiplier;
        self.velocity += diff / distance * force;
        true
    }

    /// Rotate position about `pivot` and velocity about the origin by `angle`.
    pub fn rotate_about(&mut self, pivot: Vec2, angle: f32) {
        let rotation = Vec2::from_angle(angle);
        self.position = pivot + rotation.rotate(self.position - pivot);
        self.velocity = rotation.rotate(self.velocity);
    }
}
