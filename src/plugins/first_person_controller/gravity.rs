//! Vertical velocity: gravity, jumping and ground snapping.

use bevy::prelude::*;

use super::config::MovementConfig;

/// Falling velocity forced when the head touches a ceiling.
pub const CEILING_PUSH: f32 = -1.;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    Grounded,
    Jumping,
    Airborne,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GravityState {
    /// Positive goes up along the body up axis.
    pub falling_velocity: f32,
    pub jumping: bool,
    pub last_grounded_time: f32,
}

impl GravityState {
    pub fn update(
        &mut self,
        jump_pressed: bool,
        grounded: bool,
        config: &MovementConfig,
        dt: f32,
        now: f32,
    ) -> f32 {
        self.falling_velocity -= config.gravity_force * dt;

        if jump_pressed && grounded && config.allow_jumping {
            debug!("Jumping with impulse {}", config.jump_force);
            self.jumping = true;
            self.falling_velocity = config.jump_force;
        } else if grounded && self.falling_velocity <= 0. {
            self.jumping = false;
            self.last_grounded_time = now;
            self.falling_velocity = 0.;
        }

        self.falling_velocity
    }

    /// Stop any upward motion so the body cannot climb through a low ceiling.
    pub fn hit_ceiling(&mut self) {
        self.falling_velocity = CEILING_PUSH;
    }

    pub fn phase(&self, grounded: bool) -> MotionPhase {
        if !grounded {
            MotionPhase::Airborne
        } else if self.jumping {
            MotionPhase::Jumping
        } else {
            MotionPhase::Grounded
        }
    }
}
