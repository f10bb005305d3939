use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use tracing::error;

use crate::physics::simulation::{InputEvent, Simulation, Viewport};

/// Native-only quit: press Esc or Q to exit the app.
/// (No-op on wasm32.)
pub fn exit_on_esc_or_q_if_native(
    keys: Res<ButtonInput<KeyCode>>,
    mut exit: MessageWriter<AppExit>,
) {
    if cfg!(not(target_arch = "wasm32")) && keys.any_just_pressed([KeyCode::Escape, KeyCode::KeyQ])
    {
        exit.write(AppExit::Success);
    }
}

/// Follow the primary window's logical size. The first size seen lays out
/// the level; later changes only resize.
pub fn sync_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut sim: ResMut<Simulation>,
    mut laid_out: Local<bool>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let viewport = Viewport::new(window.width(), window.height());
    // minimised
    if viewport.width <= 0.0 || viewport.height <= 0.0 {
        return;
    }

    if !*laid_out {
        *laid_out = true;
        if let Err(err) = sim.reset_layout(viewport) {
            error!(%err, "could not lay out the level");
        }
    } else if sim.viewport() != viewport {
        sim.resize(viewport);
    }
}

/// Turn mouse state into queued simulation input.
///
/// Window cursor coordinates are already top-left origin, y-down, which is
/// the simulation's own space, so no camera mapping is needed here.
pub fn collect_pointer_input(
    windows: Query<&Window, With<PrimaryWindow>>,
    buttons: Res<ButtonInput<MouseButton>>,
    mut sim: ResMut<Simulation>,
    mut last_cursor: Local<Option<Vec2>>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        // pointer left the window
        if last_cursor.take().is_some() {
            sim.push_input(InputEvent::Cancel);
        }
        return;
    };

    if buttons.just_pressed(MouseButton::Left) {
        sim.push_input(InputEvent::PressAt(cursor));
    }
    if buttons.pressed(MouseButton::Left) && *last_cursor != Some(cursor) {
        sim.push_input(InputEvent::MoveTo(cursor));
    }
    if buttons.just_released(MouseButton::Left) {
        sim.push_input(InputEvent::Release);
    }
    if buttons.just_pressed(MouseButton::Right) {
        sim.push_input(InputEvent::TapAt(cursor));
    }

    *last_cursor = Some(cursor);
}

/// One simulation frame per fixed tick (rate set in main via `Time::<Fixed>`).
pub fn step_simulation(mut sim: ResMut<Simulation>) {
    sim.step();
}
