use bevy::math::Vec2;
use bounce_playground::config::SimConfig;
use bounce_playground::physics::{InputEvent, Simulation, Viewport};

const WIDTH: f32 = 800.0;
const HEIGHT: f32 = 600.0;

fn empty_room(seed: u64) -> SimConfig {
    let mut config = SimConfig::default().with_seed(seed);
    config.viewport_width = WIDTH;
    config.viewport_height = HEIGHT;
    config.level.platform_count = 0;
    config
}

#[test]
fn dropped_ball_bounces_then_comes_to_rest() {
    let mut sim = Simulation::new(empty_room(1)).expect("simulation");
    let bottom = sim.state().boundaries.bottom;

    let mut touched_ground = None;
    for frame in 0..120 {
        sim.step();
        if sim.state().ball.position.y >= bottom - 1.0 {
            touched_ground = Some(frame);
            break;
        }
    }
    assert!(touched_ground.is_some(), "ball never reached the ground");

    // first rebound heads back up
    sim.step();
    assert!(sim.state().ball.velocity.y < 0.0);

    for _ in 0..1200 {
        sim.step();
    }
    let ball = &sim.state().ball;
    assert_eq!(ball.velocity.y, 0.0, "ball still bouncing: {:?}", ball.velocity);
    assert!(
        (ball.position.y - bottom).abs() < 1e-3,
        "ball resting at {} instead of {}",
        ball.position.y,
        bottom
    );
}

#[test]
fn flick_from_rest_sends_ball_upward() {
    let mut sim = Simulation::new(empty_room(2)).expect("simulation");
    for _ in 0..1500 {
        sim.step();
    }
    let rest = sim.state().ball.position;

    sim.push_input(InputEvent::PressAt(rest));
    sim.push_input(InputEvent::MoveTo(rest - Vec2::new(0.0, 120.0)));
    sim.step();
    assert!(sim.state().charge.is_active());
    assert_eq!(sim.state().ball.position, rest);

    sim.push_input(InputEvent::Release);
    for _ in 0..5 {
        sim.step();
    }
    let ball = &sim.state().ball;
    assert!(
        ball.position.y < rest.y - 50.0,
        "ball did not rise: {:?} from {:?}",
        ball.position,
        rest
    );
    assert!(!sim.snapshot().trail.is_empty());
}

#[test]
fn poked_ragdoll_stays_in_one_piece_inside_the_room() {
    let mut sim = Simulation::new(empty_room(3)).expect("simulation");
    let floor = HEIGHT - sim.config().surface.ground_thickness;

    for frame in 0..900 {
        if frame % 90 == 45 {
            let head = sim.state().ragdoll.head().expect("head").position;
            sim.push_input(InputEvent::TapAt(head + Vec2::new(20.0, 10.0)));
        }
        sim.step();
    }
    // let it settle after the last poke
    for _ in 0..300 {
        sim.step();
    }

    let ragdoll = &sim.state().ragdoll;
    for point in ragdoll.points() {
        let p = point.position;
        assert!(p.is_finite(), "joint blew up: {p:?}");
        assert!((-20.0..=WIDTH + 20.0).contains(&p.x), "joint outside walls: {p:?}");
        assert!(p.y <= floor + 20.0, "joint through the floor: {p:?}");
    }
    for stick in ragdoll.distance_constraints() {
        let a = ragdoll.points()[stick.a].position;
        let b = ragdoll.points()[stick.b].position;
        let length = a.distance(b);
        assert!(
            length > stick.rest_length * 0.25 && length < stick.rest_length * 2.5,
            "stick {}-{} is {length} long, rest {}",
            stick.a,
            stick.b,
            stick.rest_length
        );
    }
}

#[test]
fn runs_are_reproducible_from_the_seed() {
    let mut config = empty_room(99);
    config.level.platform_count = 3;

    let run = |config: SimConfig| {
        let mut sim = Simulation::new(config).expect("simulation");
        sim.reset_layout(Viewport::new(1024.0, 768.0)).expect("layout");
        for frame in 0..400 {
            if frame == 100 {
                sim.push_input(InputEvent::TapAt(Vec2::new(500.0, 400.0)));
            }
            sim.step();
        }
        sim.snapshot()
    };

    let a = run(config.clone());
    let b = run(config.clone());
    assert_eq!(a, b);

    let other = run(config.with_seed(100));
    assert_ne!(a.platforms, other.platforms);
}

#[test]
fn ball_stays_inside_through_resizes() {
    let mut config = empty_room(5);
    config.level.platform_count = 3;
    let mut sim = Simulation::new(config).expect("simulation");

    let sizes = [(800.0, 600.0), (420.0, 700.0), (1200.0, 500.0), (360.0, 360.0)];
    for (width, height) in sizes {
        sim.resize(Viewport::new(width, height));
        for _ in 0..120 {
            sim.step();
            let bounds = sim.state().boundaries;
            let p = sim.state().ball.position;
            assert!(p.x >= bounds.left - 1e-3 && p.x <= bounds.right + 1e-3, "{p:?}");
            assert!(p.y >= bounds.top - 1e-3 && p.y <= bounds.bottom + 1e-3, "{p:?}");
        }
    }
}
