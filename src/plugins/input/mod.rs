//! Player input: action bindings, cursor capture and the per-tick [`InputSnapshot`].

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use crate::plugins::first_person_controller::ControllerConfig;

#[derive(Debug)]
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugin(InputManagerPlugin::<Actions>::default())
            .add_startup_system(lock_cursor_on_start)
            .add_system(toggle_mouse_capture);
    }
}

#[derive(Actionlike, PartialEq, Eq, Clone, Copy, Hash, Debug)]
pub enum Actions {
    Forward,
    Backwards,
    StrafeLeft,
    StrafeRight,
    Sprint,
    Jump,
    Fire,
    Aim,
}

pub fn default_input_map() -> InputMap<Actions> {
    let mut map = InputMap::new([
        (KeyCode::W, Actions::Forward),
        (KeyCode::S, Actions::Backwards),
        (KeyCode::A, Actions::StrafeLeft),
        (KeyCode::D, Actions::StrafeRight),
        (KeyCode::LShift, Actions::Sprint),
        (KeyCode::Space, Actions::Jump),
    ]);
    map.insert(MouseButton::Left, Actions::Fire);
    map.insert(DualAxis::mouse_motion(), Actions::Aim);
    map
}

/// Everything the controller reads from the player in one tick.
///
/// `pointer_delta` is in yaw/tilt space: positive x turns counter-clockwise around the
/// body up axis, positive y looks up. `movement` is `(right, forward)` in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub pointer_delta: Vec2,
    pub movement: Vec2,
    pub any_movement_key: bool,
    pub sprint_held: bool,
    pub jump_pressed: bool,
    pub fire_pressed: bool,
}

impl InputSnapshot {
    pub fn from_action_state(actions: &ActionState<Actions>, pointer_scale: f32) -> Self {
        let axis = |positive: Actions, negative: Actions| -> f32 {
            match (actions.pressed(positive), actions.pressed(negative)) {
                (true, false) => 1.,
                (false, true) => -1.,
                _ => 0.,
            }
        };
        let pointer_delta = actions
            .axis_pair(Actions::Aim)
            .map(|motion| Vec2::new(-motion.x(), -motion.y()) * pointer_scale)
            .unwrap_or(Vec2::ZERO);
        let any_movement_key = [
            Actions::Forward,
            Actions::Backwards,
            Actions::StrafeLeft,
            Actions::StrafeRight,
        ]
        .into_iter()
        .any(|action| actions.pressed(action));

        InputSnapshot {
            pointer_delta,
            movement: Vec2::new(
                axis(Actions::StrafeRight, Actions::StrafeLeft),
                axis(Actions::Forward, Actions::Backwards),
            ),
            any_movement_key,
            sprint_held: actions.pressed(Actions::Sprint),
            jump_pressed: actions.just_pressed(Actions::Jump),
            fire_pressed: actions.just_pressed(Actions::Fire),
        }
    }
}

fn lock_cursor_on_start(mut windows: ResMut<Windows>, config: Res<ControllerConfig>) {
    if !config.lock_cursor {
        return;
    }
    if let Some(window) = windows.get_primary_mut() {
        window.set_cursor_visibility(false);
        window.set_cursor_grab_mode(bevy::window::CursorGrabMode::Locked);
    }
}

fn toggle_mouse_capture(mut windows: ResMut<Windows>, keys: Res<Input<KeyCode>>) {
    if !keys.just_pressed(KeyCode::Tab) {
        return;
    }
    if let Some(window) = windows.get_primary_mut() {
        let locked = window.cursor_grab_mode() != bevy::window::CursorGrabMode::None;
        window.set_cursor_visibility(locked);
        window.set_cursor_grab_mode(if locked {
            bevy::window::CursorGrabMode::None
        } else {
            bevy::window::CursorGrabMode::Locked
        });
    }
}
