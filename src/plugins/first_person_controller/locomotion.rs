//! Horizontal movement and the velocity handed to the physics body.
//!
//! Velocities here are in the body frame: the physics phase rotates them by the body
//! orientation before applying them, so the same code works on walls and planets.

use bevy::prelude::*;

use super::config::MovementConfig;
use crate::util::math::smooth_damp_vec3;

/// Walk and sprint speeds are divided by this before use. Movement tuning depends on it.
pub const SPEED_OFFSET: f32 = 2.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Locomotion {
    /// Smoothed horizontal velocity, with the falling velocity in `y`.
    pub velocity: Vec3,
    smoothing_velocity: Vec3,
    pub current_speed: f32,
    pub sprinting: bool,
}

impl Locomotion {
    pub fn new(config: &MovementConfig) -> Self {
        Locomotion {
            velocity: Vec3::ZERO,
            smoothing_velocity: Vec3::ZERO,
            current_speed: config.walk_speed,
            sprinting: false,
        }
    }

    /// Body frame velocity the current input asks for.
    pub fn target_velocity(&self, input: Vec2, facing_yaw: f32, config: &MovementConfig) -> Vec3 {
        // Input is (right, forward) and forward is -Z.
        let direction = Vec3::new(input.x, 0., -input.y).normalize_or_zero();
        let facing = Quat::from_rotation_y(facing_yaw.to_radians());
        facing * (direction * config.walk_speed) * self.current_speed
    }

    /// Advance the horizontal velocity by one frame and return it. `y` is left untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        input: Vec2,
        facing_yaw: f32,
        sprint_held: bool,
        grounded: bool,
        jumping: bool,
        config: &MovementConfig,
        dt: f32,
    ) -> Vec3 {
        if sprint_held && grounded {
            self.sprinting = true;
            self.current_speed = config.sprint_speed / SPEED_OFFSET;
        } else if !jumping {
            self.sprinting = false;
            self.current_speed = config.walk_speed / SPEED_OFFSET;
        }

        let target = self.target_velocity(input, facing_yaw, config);
        let horizontal = Vec3::new(self.velocity.x, 0., self.velocity.z);
        let smoothed = smooth_damp_vec3(
            horizontal,
            target,
            &mut self.smoothing_velocity,
            config.movement_smooth_time,
            dt,
        );
        self.velocity.x = smoothed.x;
        self.velocity.z = smoothed.z;
        Vec3::new(smoothed.x, 0., smoothed.z)
    }

    /// Set the vertical component from the gravity state.
    pub fn set_falling_velocity(&mut self, falling_velocity: f32) {
        self.velocity.y = falling_velocity;
    }
}

/// What the physics phase asks the rigid body to do in one fixed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsCommand {
    /// Instant change of linear velocity.
    pub velocity_change: Vec3,
    /// Continuous force for the step.
    pub force: Vec3,
}

/// Turn the body frame velocity into a velocity change plus the gravity force.
pub fn physics_command(
    body_rotation: Quat,
    local_velocity: Vec3,
    current_velocity: Vec3,
    mass: f32,
    gravity_force: f32,
) -> PhysicsCommand {
    let world_velocity = body_rotation * local_velocity;
    let up = body_rotation * Vec3::Y;
    PhysicsCommand {
        velocity_change: world_velocity - current_velocity,
        force: -up * mass * gravity_force,
    }
}
