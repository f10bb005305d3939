//! Headless run of the full simulation, for timing the fixed step without a window.
//!
//! `cargo run --release --bin benchmark -- [frames] [seed]`

use std::time::Instant;

use bevy::math::Vec2;
use bounce_playground::config::SimConfig;
use bounce_playground::physics::{InputEvent, Simulation, TopologyError};

fn main() -> Result<(), TopologyError> {
    let mut args = std::env::args().skip(1);
    let frames: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(10_000);
    let seed: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(42);

    let mut sim = Simulation::new(SimConfig::load().with_seed(seed))?;
    let viewport = sim.viewport();
    let centre = Vec2::new(viewport.width * 0.5, viewport.height * 0.5);

    let started = Instant::now();
    let mut slowest = 0.0f64;
    for frame in 0..frames {
        // poke the ragdoll and fling the ball every few seconds of sim time
        if frame % 180 == 0 {
            sim.push_input(InputEvent::TapAt(centre));
            let ball = sim.state().ball.position;
            sim.push_input(InputEvent::PressAt(ball));
            sim.push_input(InputEvent::MoveTo(ball + Vec2::new(-80.0, 120.0)));
            sim.push_input(InputEvent::Release);
        }
        let tick = Instant::now();
        sim.step();
        slowest = slowest.max(tick.elapsed().as_secs_f64());
    }
    let total = started.elapsed().as_secs_f64();

    let snapshot = sim.snapshot();
    println!("frames:        {frames}");
    println!("seed:          {seed}");
    println!("total:         {:.3} s", total);
    println!("mean step:     {:.2} us", total / frames.max(1) as f64 * 1e6);
    println!("slowest step:  {:.2} us", slowest * 1e6);
    println!(
        "final ball:    ({:.1}, {:.1})",
        snapshot.ball.position.x, snapshot.ball.position.y
    );
    println!("trail points:  {}", snapshot.trail.len());
    Ok(())
}
