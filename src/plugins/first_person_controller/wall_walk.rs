//! Walking on walls: the body up axis follows the surfaces it runs into.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Group;

use super::config::WallWalkConfig;
use crate::{plugins::physics::PhysicsWorld, util::math::round_vec3};

/// The surface probe starts this far below the body origin.
const PROBE_DROP: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallWalk {
    /// Normal of the surface the body stands on. The body up axis is aligned to it.
    pub surface_direction: Vec3,
}

impl Default for WallWalk {
    fn default() -> Self {
        WallWalk {
            surface_direction: Vec3::Y,
        }
    }
}

impl WallWalk {
    pub fn new(surface_direction: Vec3) -> Self {
        WallWalk { surface_direction }
    }

    /// Normal of the ground surface in front of the moving body, snapped to the closest axes.
    pub fn sense_surface<W: PhysicsWorld + ?Sized>(
        world: &W,
        position: Vec3,
        world_velocity: Vec3,
        range: f32,
        ground_layers: Group,
    ) -> Option<Vec3> {
        let direction = world_velocity.try_normalize()?;
        let origin = position - Vec3::Y * PROBE_DROP;
        let hit = world.cast_ray(origin, direction, range, Some(ground_layers))?;
        Some(round_vec3(hit.normal.normalize_or_zero()))
    }

    /// Move the surface direction towards `candidate` and return the realigned body rotation.
    pub fn align(&mut self, candidate: Option<Vec3>, rotation: Quat, config: &WallWalkConfig, dt: f32) -> Quat {
        if let Some(candidate) = candidate {
            let t = (config.gravity_rotation_speed * dt).clamp(0., 1.);
            self.surface_direction = self.surface_direction.lerp(candidate, t);
        }
        let Some(target_up) = self.surface_direction.try_normalize() else {
            return rotation;
        };
        let up = (rotation * Vec3::Y).normalize();
        Quat::from_rotation_arc(up, target_up) * rotation
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update<W: PhysicsWorld + ?Sized>(
        &mut self,
        world: Option<&W>,
        position: Vec3,
        rotation: Quat,
        local_velocity: Vec3,
        ground_layers: Group,
        config: &WallWalkConfig,
        dt: f32,
    ) -> Quat {
        let candidate = world.and_then(|world| {
            Self::sense_surface(
                world,
                position,
                rotation * local_velocity,
                config.detection_range,
                ground_layers,
            )
        });
        self.align(candidate, rotation, config, dt)
    }
}
