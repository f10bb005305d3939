use bevy::prelude::*;

use bounce_playground::config::{PHYSICS_HZ, SimConfig};
use bounce_playground::physics::{PhysicsPlugin, Simulation, TopologyError};

fn main() -> Result<(), TopologyError> {
    let simulation = Simulation::new(SimConfig::load())?;

    App::new()
        // Solid black background
        .insert_resource(ClearColor(Color::BLACK))
        // Configure the fixed timestep clock (used in FixedUpdate)
        .insert_resource(Time::<Fixed>::from_hz(PHYSICS_HZ))
        .add_plugins(DefaultPlugins)
        .insert_resource(simulation)
        .add_plugins(PhysicsPlugin)
        .run();
    Ok(())
}
