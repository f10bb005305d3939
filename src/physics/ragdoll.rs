use std::f32::consts::{PI, TAU};

use bevy::math::Vec2;
use rand::Rng;
use tracing::debug;

use super::error::TopologyError;
use super::noise::jitter;
use super::point::{Point, PointBounds, PointForces};
use crate::config::RagdollConfig;

/// Named slots of the humanoid ragdoll. The head is slot 0 in the same
/// dense array as every other joint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JointId {
    Head,
    Neck,
    Shoulder,
    LeftElbow,
    RightElbow,
    Pelvis,
    LeftKnee,
    RightKnee,
    LeftHand,
    RightHand,
    LeftFoot,
    RightFoot,
}

impl JointId {
    pub const ALL: [Self; 12] = [
        Self::Head,
        Self::Neck,
        Self::Shoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::Pelvis,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftHand,
        Self::RightHand,
        Self::LeftFoot,
        Self::RightFoot,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Stick between two points: pulls them toward `rest_length` and damps
/// their relative velocity along the stick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceConstraint {
    pub a: usize,
    pub b: usize,
    pub rest_length: f32,
    pub stiffness: f32,
    pub damping: f32,
}

impl DistanceConstraint {
    pub fn new(a: JointId, b: JointId, rest_length: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            a: a.index(),
            b: b.index(),
            rest_length,
            stiffness,
            damping,
        }
    }
}

/// Bend limit at `pivot`, measured from the `first` arm to the `last` arm in
/// `[0, 2π)`. Violations rotate `last` about `pivot`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleConstraint {
    pub first: usize,
    pub pivot: usize,
    pub last: usize,
    pub min_angle: f32,
    pub max_angle: f32,
    pub stiffness: f32,
}

impl AngleConstraint {
    pub fn new(
        first: JointId,
        pivot: JointId,
        last: JointId,
        (min_angle, max_angle): (f32, f32),
        stiffness: f32,
    ) -> Self {
        Self {
            first: first.index(),
            pivot: pivot.index(),
            last: last.index(),
            min_angle,
            max_angle,
            stiffness,
        }
    }
}

/// Articulated body relaxed with a fixed number of Gauss–Seidel passes per
/// step. Constraint order is part of the behaviour: each correction sees the
/// positions left by the one before it.
#[derive(Clone, Debug)]
pub struct Ragdoll {
    points: Vec<Point>,
    distance_constraints: Vec<DistanceConstraint>,
    angle_constraints: Vec<AngleConstraint>,
    config: RagdollConfig,
}

impl Ragdoll {
    /// Validate the topology once; nothing is checked per step after this.
    pub fn new(
        points: Vec<Point>,
        distance_constraints: Vec<DistanceConstraint>,
        angle_constraints: Vec<AngleConstraint>,
        config: RagdollConfig,
    ) -> Result<Self, TopologyError> {
        let joints = points.len();
        for (joint, point) in points.iter().enumerate() {
            if point.mass <= 0.0 {
                return Err(TopologyError::NonPositiveMass {
                    joint,
                    mass: point.mass,
                });
            }
        }

        let in_range = |constraint: usize, joint: usize| {
            if joint < joints {
                Ok(())
            } else {
                Err(TopologyError::JointOutOfRange {
                    constraint,
                    joint,
                    joints,
                })
            }
        };
        let unit = |constraint: usize, field: &'static str, value: f32| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(TopologyError::CoefficientOutOfRange {
                    constraint,
                    field,
                    value,
                })
            }
        };

        for (i, c) in distance_constraints.iter().enumerate() {
            in_range(i, c.a)?;
            in_range(i, c.b)?;
            if c.a == c.b {
                return Err(TopologyError::SelfConstraint {
                    constraint: i,
                    joint: c.a,
                });
            }
            unit(i, "stiffness", c.stiffness)?;
            unit(i, "damping", c.damping)?;
        }

        for (i, c) in angle_constraints.iter().enumerate() {
            for joint in [c.first, c.pivot, c.last] {
                in_range(i, joint)?;
            }
            if c.pivot == c.first || c.pivot == c.last {
                return Err(TopologyError::SelfConstraint {
                    constraint: i,
                    joint: c.pivot,
                });
            }
            if c.min_angle > c.max_angle {
                return Err(TopologyError::EmptyAngleRange {
                    constraint: i,
                    min: c.min_angle,
                    max: c.max_angle,
                });
            }
            unit(i, "stiffness", c.stiffness)?;
        }

        Ok(Self {
            points,
            distance_constraints,
            angle_constraints,
            config,
        })
    }

    /// Stick figure standing on `feet` (the point between its feet), with a
    /// random sideways toss and an upward kick.
    pub fn humanoid<R: Rng + ?Sized>(
        feet: Vec2,
        config: RagdollConfig,
        rng: &mut R,
    ) -> Result<Self, TopologyError> {
        use JointId::*;

        let layout = |id: JointId| -> (Vec2, f32) {
            match id {
                Head => (Vec2::new(0.0, -115.0), 0.3),
                Neck => (Vec2::new(0.0, -100.0), 0.1),
                Shoulder => (Vec2::new(0.0, -80.0), 0.2),
                LeftElbow => (Vec2::new(-15.0, -80.0), 0.1),
                RightElbow => (Vec2::new(15.0, -80.0), 0.1),
                Pelvis => (Vec2::new(0.0, -50.0), 0.3),
                LeftKnee => (Vec2::new(-10.0, -25.0), 0.1),
                RightKnee => (Vec2::new(10.0, -25.0), 0.1),
                LeftHand => (Vec2::new(-30.0, -75.0), 0.05),
                RightHand => (Vec2::new(30.0, -75.0), 0.05),
                LeftFoot => (Vec2::new(-20.0, 0.0), 0.05),
                RightFoot => (Vec2::new(20.0, 0.0), 0.05),
            }
        };

        let mut points: Vec<Point> = JointId::ALL
            .iter()
            .map(|&id| {
                let (offset, mass) = layout(id);
                Point::new(feet + offset, mass)
            })
            .collect();
        points[Head.index()].radius = config.head_radius;

        let distance_constraints = vec![
            DistanceConstraint::new(Head, Neck, 15.0, 0.8, 0.3),
            DistanceConstraint::new(Neck, Shoulder, 20.0, 0.9, 0.5),
            DistanceConstraint::new(Shoulder, Pelvis, 30.0, 0.9, 0.5),
            DistanceConstraint::new(Shoulder, LeftElbow, 15.0, 0.7, 0.3),
            DistanceConstraint::new(LeftElbow, LeftHand, 15.0, 0.7, 0.3),
            DistanceConstraint::new(Shoulder, RightElbow, 15.0, 0.7, 0.3),
            DistanceConstraint::new(RightElbow, RightHand, 15.0, 0.7, 0.3),
            DistanceConstraint::new(Pelvis, LeftKnee, 25.0, 0.8, 0.4),
            DistanceConstraint::new(LeftKnee, LeftFoot, 25.0, 0.8, 0.4),
            DistanceConstraint::new(Pelvis, RightKnee, 25.0, 0.8, 0.4),
            DistanceConstraint::new(RightKnee, RightFoot, 25.0, 0.8, 0.4),
        ];

        let angle_constraints = vec![
            AngleConstraint::new(Shoulder, LeftElbow, LeftHand, (PI * 0.5, PI * 1.8), 0.5),
            AngleConstraint::new(Shoulder, RightElbow, RightHand, (PI * 0.2, PI * 1.5), 0.5),
            AngleConstraint::new(Pelvis, LeftKnee, LeftFoot, (PI * 0.5, PI * 1.8), 0.7),
            AngleConstraint::new(Pelvis, RightKnee, RightFoot, (PI * 0.5, PI * 1.8), 0.7),
            AngleConstraint::new(Shoulder, Neck, Head, (PI * 0.7, PI * 1.3), 0.8),
            AngleConstraint::new(Neck, Shoulder, Pelvis, (PI * 0.7, PI * 1.3), 0.9),
        ];

        let kick = Vec2::new(jitter(rng, 2.0), -5.0);
        for (i, point) in points.iter_mut().enumerate() {
            point.velocity = if i == Head.index() { kick } else { kick * 0.9 };
        }

        Self::new(points, distance_constraints, angle_constraints, config)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// `None` only for custom topologies with fewer points than the humanoid.
    pub fn point(&self, id: JointId) -> Option<&Point> {
        self.points.get(id.index())
    }

    pub fn head(&self) -> Option<&Point> {
        self.point(JointId::Head)
    }

    pub fn distance_constraints(&self) -> &[DistanceConstraint] {
        &self.distance_constraints
    }

    pub fn angle_constraints(&self) -> &[AngleConstraint] {
        &self.angle_constraints
    }

    /// Endpoints of every stick, in constraint order, for line drawing.
    pub fn segments(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        self.distance_constraints
            .iter()
            .map(|c| (self.points[c.a].position, self.points[c.b].position))
    }

    pub fn pin(&mut self, id: JointId, fixed: bool) {
        if let Some(point) = self.points.get_mut(id.index()) {
            point.fixed = fixed;
            point.velocity = Vec2::ZERO;
        }
    }

    fn forces(&self) -> PointForces {
        PointForces {
            gravity: self.config.gravity,
            air_density: self.config.air_density,
            drag_coefficient: self.config.drag_coefficient,
        }
    }

    /// Play-field limits for a viewport with a ground strip at the bottom.
    pub fn bounds_for(&self, width: f32, height: f32, ground_thickness: f32) -> PointBounds {
        PointBounds {
            left: 0.0,
            right: width,
            floor: height - ground_thickness,
            restitution: self.config.restitution,
            friction: self.config.friction,
        }
    }

    /// Integrate every point, then run the relaxation passes.
    pub fn update(&mut self, bounds: &PointBounds) {
        let forces = self.forces();
        for point in &mut self.points {
            point.integrate(&forces);
            point.bounce_in_bounds(bounds);
        }

        for _ in 0..self.config.iterations {
            self.relax();
        }
    }

    /// One Gauss–Seidel pass: all sticks in order, then all bend limits in order.
    pub fn relax(&mut self) {
        for constraint in &self.distance_constraints {
            satisfy_distance(&mut self.points, constraint);
        }
        for constraint in &self.angle_constraints {
            satisfy_angle(&mut self.points, constraint);
        }
    }

    /// Tap at `origin`: every point gets a radial velocity kick that falls off with distance.
    pub fn apply_impulse(&mut self, origin: Vec2) {
        let RagdollConfig {
            impulse_max_force,
            impulse_falloff,
            impulse_softening,
            head_impulse_multiplier,
            joint_impulse_multiplier,
            ..
        } = self.config;

        for (i, point) in self.points.iter_mut().enumerate() {
            let multiplier = if i == JointId::Head.index() {
                head_impulse_multiplier
            } else {
                joint_impulse_multiplier
            };
            point.push_away_from(
                origin,
                impulse_max_force,
                impulse_falloff,
                impulse_softening,
                multiplier,
            );
        }
        debug!(x = origin.x, y = origin.y, "ragdoll poked");
    }

    /// Pull every point back inside after the viewport shrinks.
    pub fn clamp_to(&mut self, bounds: &PointBounds) {
        for point in &mut self.points {
            point.clamp_to_bounds(bounds);
        }
    }
}

/// Two distinct points by index. Indices were validated at construction.
fn pair_mut(points: &mut [Point], a: usize, b: usize) -> (&mut Point, &mut Point) {
    if a < b {
        let (lo, hi) = points.split_at_mut(b);
        (&mut lo[a], &mut hi[0])
    } else {
        let (lo, hi) = points.split_at_mut(a);
        (&mut hi[0], &mut lo[b])
    }
}

/// Move both ends toward the rest length and damp their relative velocity
/// along the stick. Each end takes the other end's share of the total mass,
/// so the heavier end moves less; a pinned end keeps its share to itself.
pub fn satisfy_distance(points: &mut [Point], constraint: &DistanceConstraint) {
    let (a, b) = pair_mut(points, constraint.a, constraint.b);
    if a.fixed && b.fixed {
        return;
    }

    let delta = b.position - a.position;
    let distance = delta.length();
    if distance <= 0.0 {
        return;
    }
    let total = a.mass + b.mass;
    let share_a = b.mass / total;
    let share_b = a.mass / total;

    let normal = delta / distance;
    let correction = normal * (distance - constraint.rest_length) * constraint.stiffness;
    let closing = (b.velocity - a.velocity).dot(normal);
    let damping = normal * closing * constraint.damping;

    if !a.fixed {
        a.position += correction * share_a;
        a.velocity += damping * share_a;
    }
    if !b.fixed {
        b.position -= correction * share_b;
        b.velocity -= damping * share_b;
    }
}

/// Angle from `pivot -> first` to `pivot -> last`, in `[0, 2π)`: the
/// unsigned angle from the dot product, mirrored when the cross product is
/// negative. `None` when either arm has zero length.
pub fn joint_angle(first: Vec2, pivot: Vec2, last: Vec2) -> Option<f32> {
    let u = first - pivot;
    let v = last - pivot;
    let lengths = u.length() * v.length();
    if lengths <= 0.0 {
        return None;
    }
    let angle = (u.dot(v) / lengths).clamp(-1.0, 1.0).acos();
    if u.perp_dot(v) < 0.0 {
        Some(TAU - angle)
    } else {
        Some(angle)
    }
}

/// Rotate the `last` point about `pivot` toward the violated bound.
/// Returns whether a correction was applied.
pub fn satisfy_angle(points: &mut [Point], constraint: &AngleConstraint) -> bool {
    let first = points[constraint.first].position;
    let pivot = points[constraint.pivot].position;
    let last = &mut points[constraint.last];
    if last.fixed {
        return false;
    }
    let Some(angle) = joint_angle(first, pivot, last.position) else {
        return false;
    };

    let target = if angle < constraint.min_angle {
        constraint.min_angle
    } else if angle > constraint.max_angle {
        constraint.max_angle
    } else {
        return false;
    };

    last.rotate_about(pivot, (target - angle) * constraint.stiffness);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn free_pair(distance: f32) -> Vec<Point> {
        vec![
            Point::new(Vec2::new(0.0, 0.0), 0.2),
            Point::new(Vec2::new(distance, 0.0), 0.2),
        ]
    }

    fn stick(rest_length: f32, stiffness: f32, damping: f32) -> DistanceConstraint {
        DistanceConstraint {
            a: 0,
            b: 1,
            rest_length,
            stiffness,
            damping,
        }
    }

    #[test]
    fn full_stiffness_equal_masses_hits_rest_length() {
        let mut points = free_pair(40.0);
        satisfy_distance(&mut points, &stick(20.0, 1.0, 0.0));
        let d = points[0].position.distance(points[1].position);
        assert!((d - 20.0).abs() < 1e-5, "distance {d}");
        // both ends moved the same amount
        assert!((points[0].position.x - 10.0).abs() < 1e-5);
    }

    #[test]
    fn heavier_end_moves_less() {
        let mut points = free_pair(40.0);
        points[1].mass = 0.6;
        satisfy_distance(&mut points, &stick(20.0, 1.0, 0.0));
        let moved_a = points[0].position.x;
        let moved_b = 40.0 - points[1].position.x;
        assert!((moved_a - 15.0).abs() < 1e-4);
        assert!((moved_b - 5.0).abs() < 1e-4);
    }

    #[test]
    fn pinned_end_never_moves() {
        let mut points = free_pair(40.0);
        points[0].fixed = true;
        points[1].velocity = Vec2::new(3.0, 0.0);
        satisfy_distance(&mut points, &stick(20.0, 1.0, 0.5));
        assert_eq!(points[0].position, Vec2::ZERO);
        assert_eq!(points[0].velocity, Vec2::ZERO);
        // the free end only takes its own half of the correction
        assert!((points[1].position.x - 30.0).abs() < 1e-5);
        assert!((points[1].velocity.x - 2.25).abs() < 1e-5);
    }

    #[test]
    fn pinned_end_leaves_heavier_free_end_a_small_share() {
        let mut points = free_pair(40.0);
        points[0].fixed = true;
        points[1].mass = 0.6;
        satisfy_distance(&mut points, &stick(20.0, 1.0, 0.0));
        assert_eq!(points[0].position, Vec2::ZERO);
        // 0.2 / (0.2 + 0.6) of the 20 unit stretch
        assert!((points[1].position.x - 35.0).abs() < 1e-4, "x = {}", points[1].position.x);
    }

    #[test]
    fn both_ends_pinned_is_a_no_op() {
        let mut points = free_pair(40.0);
        points[0].fixed = true;
        points[1].fixed = true;
        points[1].velocity = Vec2::new(3.0, 0.0);
        satisfy_distance(&mut points, &stick(20.0, 1.0, 0.5));
        assert_eq!(points[1].position, Vec2::new(40.0, 0.0));
        assert_eq!(points[1].velocity, Vec2::new(3.0, 0.0));
    }

    #[test]
    fn pinned_neck_holds_while_the_body_hangs() {
        let mut rng = StdRng::seed_from_u64(5);
        let feet = Vec2::new(400.0, 400.0);
        let mut body =
            Ragdoll::humanoid(feet, RagdollConfig::default(), &mut rng).expect("valid topology");
        body.pin(JointId::Neck, true);
        let neck = body.point(JointId::Neck).expect("neck").position;
        let pelvis = body.point(JointId::Pelvis).expect("pelvis").position;
        let bounds = body.bounds_for(800.0, 600.0, 10.0);

        for _ in 0..30 {
            body.update(&bounds);
            let pinned = body.point(JointId::Neck).expect("neck");
            assert_eq!(pinned.position, neck);
            assert_eq!(pinned.velocity, Vec2::ZERO);
        }
        let moved = body.point(JointId::Pelvis).expect("pelvis").position;
        assert!(moved.distance(pelvis) > 1.0, "pelvis stayed at {moved:?}");

        body.pin(JointId::Neck, false);
        body.update(&bounds);
        assert_ne!(body.point(JointId::Neck).expect("neck").position, neck);
    }

    #[test]
    fn coincident_points_are_left_alone() {
        let mut points = free_pair(0.0);
        satisfy_distance(&mut points, &stick(20.0, 1.0, 0.5));
        assert_eq!(points[0].position, points[1].position);
    }

    #[test]
    fn angle_is_measured_from_first_arm_toward_last() {
        let pivot = Vec2::ZERO;
        let first = Vec2::X;
        let quarter = joint_angle(first, pivot, Vec2::Y).expect("angle");
        assert!((quarter - PI * 0.5).abs() < 1e-5);
        let three_quarters = joint_angle(first, pivot, Vec2::NEG_Y).expect("angle");
        assert!((three_quarters - PI * 1.5).abs() < 1e-5);
        assert!(joint_angle(first, pivot, pivot).is_none());
    }

    #[test]
    fn violated_angle_rotates_last_point_toward_bound() {
        let mut points = vec![
            Point::new(Vec2::new(10.0, 0.0), 0.1),
            Point::new(Vec2::ZERO, 0.1),
            Point::new(Vec2::new(0.0, 10.0), 0.1),
        ];
        let limit = AngleConstraint {
            first: 0,
            pivot: 1,
            last: 2,
            min_angle: PI,
            max_angle: PI * 1.5,
            stiffness: 1.0,
        };
        assert!(satisfy_angle(&mut points, &limit));
        let angle = joint_angle(points[0].position, points[1].position, points[2].position)
            .expect("angle");
        assert!((angle - PI).abs() < 1e-4, "angle {angle}");
        assert!((points[2].position.length() - 10.0).abs() < 1e-4);
    }

    #[test]
    fn humanoid_topology_is_valid_and_reproducible() {
        let feet = Vec2::new(400.0, 500.0);
        let config = RagdollConfig::default();
        let a = Ragdoll::humanoid(feet, config.clone(), &mut StdRng::seed_from_u64(1))
            .expect("valid topology");
        let b = Ragdoll::humanoid(feet, config, &mut StdRng::seed_from_u64(1))
            .expect("valid topology");

        assert_eq!(a.points().len(), 12);
        assert_eq!(a.distance_constraints().len(), 11);
        assert_eq!(a.angle_constraints().len(), 6);
        assert_eq!(a.points(), b.points());

        let head = a.head().expect("head");
        assert_eq!(head.radius, 15.0);
        assert_eq!(head.velocity.y, -5.0);
        let neck = a.point(JointId::Neck).expect("neck").velocity;
        assert!((neck - head.velocity * 0.9).length() < 1e-6);
    }

    #[test]
    fn dangling_reference_fails_at_construction() {
        let err = Ragdoll::new(
            free_pair(10.0),
            vec![DistanceConstraint {
                a: 0,
                b: 5,
                rest_length: 10.0,
                stiffness: 0.5,
                damping: 0.1,
            }],
            Vec::new(),
            RagdollConfig::default(),
        )
        .expect_err("index 5 does not exist");
        assert_eq!(
            err,
            TopologyError::JointOutOfRange {
                constraint: 0,
                joint: 5,
                joints: 2
            }
        );
    }

    #[test]
    fn bad_coefficients_fail_at_construction() {
        let err = Ragdoll::new(
            free_pair(10.0),
            vec![stick(10.0, 1.5, 0.0)],
            Vec::new(),
            RagdollConfig::default(),
        )
        .expect_err("stiffness above 1");
        assert!(matches!(
            err,
            TopologyError::CoefficientOutOfRange {
                field: "stiffness",
                ..
            }
        ));

        let bend = AngleConstraint {
            first: 0,
            pivot: 1,
            last: 0,
            min_angle: 2.0,
            max_angle: 1.0,
            stiffness: 0.5,
        };
        let err = Ragdoll::new(
            free_pair(10.0),
            vec![stick(10.0, 0.5, 0.0)],
            vec![bend],
            RagdollConfig::default(),
        )
        .expect_err("empty interval");
        assert!(matches!(err, TopologyError::EmptyAngleRange { .. }));
    }

    #[test]
    fn tap_pushes_points_away() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ragdoll =
            Ragdoll::humanoid(Vec2::new(400.0, 500.0), RagdollConfig::default(), &mut rng)
                .expect("valid topology");
        let before: Vec<Vec2> = ragdoll.points().iter().map(|p| p.velocity).collect();
        ragdoll.apply_impulse(Vec2::new(300.0, 450.0));
        for (p, v0) in ragdoll.points().iter().zip(before) {
            let away = (p.position - Vec2::new(300.0, 450.0)).normalize();
            assert!((p.velocity - v0).dot(away) > 0.0);
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn one_pass_moves_toward_rest_length(
                start in 1.0f32..200.0,
                rest in 1.0f32..200.0,
                stiffness in 0.05f32..0.95,
            ) {
                let mut points = free_pair(start);
                satisfy_distance(&mut points, &stick(rest, stiffness, 0.0));
                let d = points[0].position.distance(points[1].position);
                prop_assert!((d - rest).abs() <= (start - rest).abs() + 1e-3);
                if (start - rest).abs() > 1e-2 {
                    prop_assert!((d - rest).abs() < (start - rest).abs());
                }
            }

            #[test]
            fn angle_inside_limits_is_untouched(
                angle in 0.6f32..5.6,
                arm in 5.0f32..50.0,
                velocity in (-5.0f32..5.0, -5.0f32..5.0),
            ) {
                let mut points = vec![
                    Point::new(Vec2::new(arm, 0.0), 0.1),
                    Point::new(Vec2::ZERO, 0.1),
                    Point::new(Vec2::from_angle(angle) * arm, 0.1),
                ];
                points[2].velocity = Vec2::new(velocity.0, velocity.1);
                let before = points.clone();
                let limit = AngleConstraint {
                    first: 0,
                    pivot: 1,
                    last: 2,
                    min_angle: 0.5,
                    max_angle: 5.7,
                    stiffness: 0.8,
                };
                prop_assert!(!satisfy_angle(&mut points, &limit));
                prop_assert_eq!(points, before);
            }
        }
    }
}
