use bevy::prelude::*;

use crate::physics::gesture::ChargeBand;
use crate::physics::simulation::{FrameSnapshot, Simulation};

const GROUND_COLOR: Color = Color::srgb(0.35, 0.35, 0.4);
const BALL_COLOR: Color = Color::WHITE;
const RAGDOLL_COLOR: Color = Color::srgb(0.9, 0.8, 0.6);

/// Maps the simulation's top-left, y-down space onto Bevy's centred, y-up 2D world.
#[derive(Clone, Copy, Debug)]
struct ScreenToWorld {
    half: Vec2,
}

impl ScreenToWorld {
    fn new(snapshot: &FrameSnapshot) -> Self {
        Self {
            half: Vec2::new(snapshot.viewport.width, snapshot.viewport.height) * 0.5,
        }
    }

    fn point(self, p: Vec2) -> Vec2 {
        Vec2::new(p.x - self.half.x, self.half.y - p.y)
    }

    /// Flipping y reverses the sense of rotation.
    fn angle(self, radians: f32) -> Rot2 {
        Rot2::radians(-radians)
    }
}

fn band_color(band: ChargeBand) -> Color {
    match band {
        ChargeBand::Weak => Color::srgb(0.3, 0.9, 0.4),
        ChargeBand::Medium => Color::srgb(1.0, 0.8, 0.2),
        ChargeBand::Strong => Color::srgb(1.0, 0.3, 0.25),
    }
}

/// Draw the whole scene as immediate-mode gizmos from one snapshot.
pub fn draw_scene(mut gizmos: Gizmos, sim: Res<Simulation>) {
    let snap = sim.snapshot();
    let map = ScreenToWorld::new(&snap);
    let width = snap.viewport.width;
    let height = snap.viewport.height;

    // ground strip
    let ground_center = Vec2::new(width * 0.5, (snap.ground_top + height) * 0.5);
    gizmos.rect_2d(
        Isometry2d::from_translation(map.point(ground_center)),
        Vec2::new(width, height - snap.ground_top),
        GROUND_COLOR,
    );

    for platform in &snap.platforms {
        let color = Color::hsl(
            platform.color.hue,
            platform.color.saturation,
            platform.color.lightness,
        );
        gizmos
            .rounded_rect_2d(
                Isometry2d::new(map.point(platform.center), map.angle(platform.rotation)),
                platform.half_extents() * 2.0,
                color,
            )
            .corner_radius(platform.corner_radius);
    }

    for point in &snap.trail {
        gizmos.circle_2d(
            map.point(point.position),
            point.radius,
            Color::srgba(1.0, 1.0, 1.0, point.opacity),
        );
    }

    let ball = map.point(snap.ball.position);
    gizmos.circle_2d(ball, snap.ball.radius, BALL_COLOR);
    let marker = map.angle(snap.ball.rotation) * Vec2::X * snap.ball.radius;
    gizmos.line_2d(ball, ball + marker, BALL_COLOR);

    if snap.charge.active {
        let color = band_color(snap.charge.band);
        gizmos.line_2d(
            map.point(snap.charge.start),
            map.point(snap.charge.current),
            color.with_alpha(0.25),
        );
        if let Some(end) = snap.charge.arrow_end {
            gizmos.arrow_2d(map.point(snap.charge.start), map.point(end), color);
        }
    }

    for (a, b) in &snap.ragdoll.segments {
        gizmos.line_2d(map.point(*a), map.point(*b), RAGDOLL_COLOR);
    }
    if let Some((head, radius)) = snap.ragdoll.head {
        gizmos.circle_2d(map.point(head), radius, RAGDOLL_COLOR);
    }
}
