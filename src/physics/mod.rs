use bevy::prelude::*;

pub mod ball;
pub mod debug;
pub mod error;
pub mod gesture;
pub mod noise;
pub mod platform;
pub mod point;
pub mod ragdoll;
pub mod simulation;
pub mod systems;
pub mod trail;

pub use error::TopologyError;
pub use simulation::{FrameSnapshot, InputEvent, Simulation, Viewport};

use systems::{collect_pointer_input, exit_on_esc_or_q_if_native, step_simulation, sync_viewport};

/// Plug this into your App with `.add_plugins(PhysicsPlugin)`.
///
/// Expects a [`Simulation`] resource to already be inserted.
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            // window size and pointer state feed the simulation's input queue
            .add_systems(
                Update,
                (
                    sync_viewport,
                    collect_pointer_input.after(sync_viewport),
                    debug::draw_scene.after(sync_viewport),
                    exit_on_esc_or_q_if_native,
                ),
            )
            // one simulation frame per fixed tick (rate set in main via Time::<Fixed>)
            .add_systems(FixedUpdate, step_simulation);
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}
