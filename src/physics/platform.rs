use bevy::math::Vec2;
use rand::Rng;
use tracing::debug;

use super::noise::in_range;
use crate::config::LevelConfig;

/// Hue/saturation/lightness, handed to the renderer untouched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlatformColor {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

/// A static oriented rectangle the ball bounces off.
///
/// Collision math happens in the platform's own frame: translate by `-center`,
/// then rotate by `-rotation`. In that frame the platform is the axis-aligned
/// box `[-half_width, half_width] x [-half_height, half_height]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Platform {
    pub center: Vec2,
    pub half_width: f32,
    pub half_height: f32,
    /// Radians, same sense as the drawing surface (y-down).
    pub rotation: f32,
    pub friction: f32,
    pub restitution: f32,
    /// Cosmetic only.
    pub corner_radius: f32,
    pub color: PlatformColor,
}

impl Platform {
    pub fn new(center: Vec2, half_extents: Vec2, rotation: f32) -> Self {
        Self {
            center,
            half_width: half_extents.x,
            half_height: half_extents.y,
            rotation,
            friction: 0.95,
            restitution: 0.7,
            corner_radius: 0.0,
            color: PlatformColor {
                hue: 200.0,
                saturation: 0.7,
                lightness: 0.6,
            },
        }
    }

    pub fn with_surface(mut self, friction: f32, restitution: f32) -> Self {
        self.friction = friction;
        self.restitution = restitution;
        self
    }

    pub fn half_extents(&self) -> Vec2 {
        Vec2::new(self.half_width, self.half_height)
    }

    /// World point -> platform frame.
    #[inline]
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        self.to_local_vector(world - self.center)
    }

    /// World direction -> platform frame (no translation).
    #[inline]
    pub fn to_local_vector(&self, v: Vec2) -> Vec2 {
        Vec2::from_angle(-self.rotation).rotate(v)
    }

    /// Platform frame point -> world.
    #[inline]
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.center + self.to_world_vector(local)
    }

    /// Platform frame direction -> world (no translation).
    #[inline]
    pub fn to_world_vector(&self, v: Vec2) -> Vec2 {
        Vec2::from_angle(self.rotation).rotate(v)
    }

    /// Closest point of the box to `local`, in the platform frame.
    #[inline]
    pub fn closest_local_point(&self, local: Vec2) -> Vec2 {
        local.clamp(-self.half_extents(), self.half_extents())
    }

    /// Face normal for a centre that sits on or inside the box: the face
    /// with the smallest penetration wins, ties resolved left, right, top, bottom.
    pub fn interior_normal(&self, local: Vec2) -> Vec2 {
        let left = (local.x + self.half_width).abs();
        let right = (local.x - self.half_width).abs();
        let top = (local.y + self.half_height).abs();
        let bottom = (local.y - self.half_height).abs();
        let min = left.min(right).min(top).min(bottom);

        if min == left {
            Vec2::NEG_X
        } else if min == right {
            Vec2::X
        } else if min == top {
            Vec2::NEG_Y
        } else {
            Vec2::Y
        }
    }
}

/// Scatter `level.platform_count` platforms over the middle band of the
/// viewport, one per equal-width column so they never stack on each other.
pub fn generate_platforms<R: Rng + ?Sized>(
    rng: &mut R,
    level: &LevelConfig,
    width: f32,
    height: f32,
) -> Vec<Platform> {
    let count = level.platform_count;
    if count == 0 || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    let mobile = width < level.mobile_width_threshold;
    let width_range = if mobile {
        level.mobile_width_range
    } else {
        level.desktop_width_range
    };

    let column = width / count as f32;
    let mut platforms = Vec::with_capacity(count);
    for i in 0..count {
        // never wider than the column it lives in
        let full_width = in_range(rng, width_range).min(column * 0.9);
        let full_height = in_range(rng, level.height_range);
        let half = Vec2::new(full_width, full_height) * 0.5;

        let column_left = column * i as f32;
        let x = column_left + column * 0.5 + in_range(rng, (-0.2, 0.2)) * column * 0.5;
        let y = height * in_range(rng, (0.45, 0.75));
        let rotation = in_range(rng, (-level.max_rotation, level.max_rotation));

        let mut platform = Platform::new(Vec2::new(x, y), half, rotation).with_surface(
            in_range(rng, level.friction_range),
            in_range(rng, level.restitution_range),
        );
        platform.corner_radius = level.corner_radius.min(half.y);
        platform.color = PlatformColor {
            hue: in_range(rng, (0.0, 360.0)),
            saturation: 0.7,
            lightness: 0.55,
        };
        platforms.push(platform);
    }

    debug!(count, mobile, width, height, "generated platform layout");
    platforms
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn local_frame_round_trips() {
        let p = Platform::new(Vec2::new(100.0, 50.0), Vec2::new(40.0, 8.0), 0.6);
        let world = Vec2::new(130.0, 20.0);
        let back = p.to_world(p.to_local(world));
        assert!((back - world).length() < 1e-4, "got {back:?}");
    }

    #[test]
    fn quarter_turn_swaps_axes() {
        let p = Platform::new(Vec2::ZERO, Vec2::new(40.0, 8.0), std::f32::consts::FRAC_PI_2);
        let local = p.to_local(Vec2::new(0.0, 10.0));
        assert!((local - Vec2::new(10.0, 0.0)).length() < 1e-5, "got {local:?}");
    }

    #[test]
    fn interior_normal_picks_nearest_face() {
        let p = Platform::new(Vec2::ZERO, Vec2::new(40.0, 8.0), 0.0);
        assert_eq!(p.interior_normal(Vec2::new(38.0, 0.0)), Vec2::X);
        assert_eq!(p.interior_normal(Vec2::new(-39.0, 0.0)), Vec2::NEG_X);
        assert_eq!(p.interior_normal(Vec2::new(0.0, -7.0)), Vec2::NEG_Y);
        assert_eq!(p.interior_normal(Vec2::new(0.0, 6.0)), Vec2::Y);
    }

    #[test]
    fn layout_is_reproducible_and_inside_viewport() {
        let level = LevelConfig::default();
        let a = generate_platforms(&mut StdRng::seed_from_u64(11), &level, 1280.0, 720.0);
        let b = generate_platforms(&mut StdRng::seed_from_u64(11), &level, 1280.0, 720.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), level.platform_count);
        for p in &a {
            assert!(p.center.x > 0.0 && p.center.x < 1280.0);
            assert!(p.center.y > 0.0 && p.center.y < 720.0);
            assert!(p.rotation.abs() <= level.max_rotation);
            assert!(p.half_width * 2.0 <= level.desktop_width_range.1 + 1e-3);
        }
    }

    #[test]
    fn narrow_viewport_uses_mobile_widths() {
        let level = LevelConfig::default();
        let platforms = generate_platforms(&mut StdRng::seed_from_u64(5), &level, 600.0, 900.0);
        for p in &platforms {
            assert!(p.half_width * 2.0 <= level.mobile_width_range.1 + 1e-3);
        }
    }

    #[test]
    fn corner_radius_never_exceeds_half_height() {
        let mut level = LevelConfig::default();
        let platforms = generate_platforms(&mut StdRng::seed_from_u64(3), &level, 1280.0, 720.0);
        for p in &platforms {
            assert_eq!(p.corner_radius, level.corner_radius.min(p.half_height));
            assert!(p.corner_radius > 0.0);
        }

        level.corner_radius = 50.0;
        let platforms = generate_platforms(&mut StdRng::seed_from_u64(3), &level, 1280.0, 720.0);
        for p in &platforms {
            assert_eq!(p.corner_radius, p.half_height);
        }
    }
}
