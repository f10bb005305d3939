use std::collections::VecDeque;

use bevy::math::Vec2;
use bevy::prelude::Resource;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, trace};

use super::ball::{Ball, Boundaries, Surroundings};
use super::error::TopologyError;
use super::gesture::{ChargeBand, ChargeGesture};
use super::platform::{Platform, generate_platforms};
use super::point::PointBounds;
use super::ragdoll::Ragdoll;
use super::trail::{TrailBuffer, TrailPoint};
use crate::config::SimConfig;

/// Pointer input, in the same y-down space as every body position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PressAt(Vec2),
    MoveTo(Vec2),
    Release,
    /// Pointer left the tracking area.
    Cancel,
    /// Poke the ragdoll.
    TapAt(Vec2),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Everything that moves or is collided with, owned by one `Simulation`.
#[derive(Clone, Debug)]
pub struct SimulationState {
    pub ball: Ball,
    pub platforms: Vec<Platform>,
    pub boundaries: Boundaries,
    pub charge: ChargeGesture,
    pub trail: TrailBuffer,
    pub ragdoll: Ragdoll,
}

/// Read-only copy of one frame for a renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub viewport: Viewport,
    /// y of the ground strip's top edge.
    pub ground_top: f32,
    pub boundaries: Boundaries,
    pub ball: BallSnapshot,
    pub platforms: Vec<Platform>,
    /// Newest first.
    pub trail: Vec<TrailPoint>,
    pub charge: ChargeSnapshot,
    pub ragdoll: RagdollSnapshot,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BallSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub rotation: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargeSnapshot {
    pub active: bool,
    pub start: Vec2,
    pub current: Vec2,
    pub arrow_end: Option<Vec2>,
    pub power: f32,
    pub power_fraction: f32,
    pub band: ChargeBand,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RagdollSnapshot {
    pub head: Option<(Vec2, f32)>,
    pub joints: Vec<Vec2>,
    pub segments: Vec<(Vec2, Vec2)>,
}

/// Ball, platforms, trail, gesture and ragdoll, advanced one frame at a
/// time. Input is queued and only applied at the start of [`Simulation::step`].
#[derive(Resource)]
pub struct Simulation {
    state: SimulationState,
    config: SimConfig,
    viewport: Viewport,
    rng: StdRng,
    pending: VecDeque<InputEvent>,
    frame: u64,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, TopologyError> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let viewport = Viewport::new(config.viewport_width, config.viewport_height);
        let state = build_state(&config, viewport, &mut rng)?;
        info!(
            width = viewport.width,
            height = viewport.height,
            seed = ?config.seed,
            "simulation created"
        );

        Ok(Self {
            state,
            config,
            viewport,
            rng,
            pending: VecDeque::new(),
            frame: 0,
        })
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// For tests and tools that need to poke bodies directly.
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Queue input; it takes effect at the start of the next step.
    pub fn push_input(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    /// Input, ball, ragdoll, trail. The ball is frozen while a charge is held.
    pub fn step(&mut self) {
        self.frame += 1;
        while let Some(event) = self.pending.pop_front() {
            self.apply_input(event);
        }

        let charging = self.state.charge.is_active();
        if !charging {
            let env = Surroundings {
                platforms: &self.state.platforms,
                boundaries: self.state.boundaries,
                surface: &self.config.surface,
            };
            self.state.ball.update(&mut self.rng, &env);
        }

        let bounds = self.ragdoll_bounds();
        self.state.ragdoll.update(&bounds);

        let ball = &self.state.ball;
        self.state
            .trail
            .update(ball.position, ball.speed(), ball.radius(), charging);

        trace!(
            frame = self.frame,
            x = ball.position.x,
            y = ball.position.y,
            "step"
        );
    }

    fn apply_input(&mut self, event: InputEvent) {
        let state = &mut self.state;
        match event {
            InputEvent::PressAt(point) => {
                state.charge.press(point, &state.ball);
            }
            InputEvent::MoveTo(point) => state.charge.move_to(point),
            InputEvent::Release => {
                state.charge.release(&mut state.ball, &mut self.rng);
            }
            InputEvent::Cancel => state.charge.cancel(),
            InputEvent::TapAt(point) => state.ragdoll.apply_impulse(point),
        }
    }

    fn ragdoll_bounds(&self) -> PointBounds {
        self.state.ragdoll.bounds_for(
            self.viewport.width,
            self.viewport.height,
            self.config.surface.ground_thickness,
        )
    }

    /// Viewport changed size: new boundaries, bodies pulled back inside.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.state.boundaries = boundaries_for(&self.config, viewport);
        self.state.ball.clamp_into(&self.state.boundaries);
        let bounds = self.ragdoll_bounds();
        self.state.ragdoll.clamp_to(&bounds);
        info!(width = viewport.width, height = viewport.height, "viewport resized");
    }

    /// Initial setup for a viewport: fresh platform layout, ball and ragdoll
    /// back at their starting spots, trail and gesture cleared.
    pub fn reset_layout(&mut self, viewport: Viewport) -> Result<(), TopologyError> {
        self.viewport = viewport;
        self.state = build_state(&self.config, viewport, &mut self.rng)?;
        self.pending.clear();
        info!(
            width = viewport.width,
            height = viewport.height,
            platforms = self.state.platforms.len(),
            "layout reset"
        );
        Ok(())
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let state = &self.state;
        let ragdoll = &state.ragdoll;
        FrameSnapshot {
            frame: self.frame,
            viewport: self.viewport,
            ground_top: self.viewport.height - self.config.surface.ground_thickness,
            boundaries: state.boundaries,
            ball: BallSnapshot {
                position: state.ball.position,
                velocity: state.ball.velocity,
                radius: state.ball.radius(),
                rotation: state.ball.rotation,
            },
            platforms: state.platforms.clone(),
            trail: state.trail.points().copied().collect(),
            charge: ChargeSnapshot {
                active: state.charge.is_active(),
                start: state.charge.start(),
                current: state.charge.current(),
                arrow_end: state.charge.arrow_end(),
                power: state.charge.power(),
                power_fraction: state.charge.power_fraction(),
                band: state.charge.band(),
            },
            ragdoll: RagdollSnapshot {
                head: ragdoll.head().map(|h| (h.position, h.radius)),
                joints: ragdoll.points().iter().map(|p| p.position).collect(),
                segments: ragdoll.segments().collect(),
            },
        }
    }
}

fn boundaries_for(config: &SimConfig, viewport: Viewport) -> Boundaries {
    Boundaries::from_viewport(
        viewport.width,
        viewport.height,
        config.ball.radius,
        config.surface.ground_thickness,
    )
}

fn build_state(
    config: &SimConfig,
    viewport: Viewport,
    rng: &mut StdRng,
) -> Result<SimulationState, TopologyError> {
    let Viewport { width, height } = viewport;
    let platforms = generate_platforms(rng, &config.level, width, height);
    let ball = Ball::from_config(&config.ball, Vec2::new(width / 2.0, height / 3.0));
    let ragdoll = Ragdoll::humanoid(
        Vec2::new(width / 2.0, height / 2.0 + 15.0),
        config.ragdoll.clone(),
        rng,
    )?;

    Ok(SimulationState {
        ball,
        platforms,
        boundaries: boundaries_for(config, viewport),
        charge: ChargeGesture::new(config.charge.clone()),
        trail: TrailBuffer::new(config.trail.clone()),
        ragdoll,
    })
}
