//! Ground and ceiling probes.

use bevy::prelude::*;

use crate::plugins::physics::PhysicsWorld;

/// Offset of the two side probes from the body center.
pub const SIDE_PROBE_OFFSET: f32 = 0.25;
const SIDE_PROBE_MARGIN: f32 = 0.05;
const CENTER_PROBE_MARGIN: f32 = 0.025;
const SLOPE_PROBE_MARGIN: f32 = 0.5;
const SPHERICAL_PROBE_LENGTH: f32 = 0.1;
const CEILING_PROBE_MARGIN: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProbeMode {
    /// Three short probes: center and both sides.
    #[default]
    Flat,
    /// One long probe that keeps contact on inclines.
    Slopes,
    /// One very short probe from the body origin, for bodies standing on a planet.
    Spherical,
}

/// A single downward or upward ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Probe {
    pub origin: Vec3,
    pub direction: Vec3,
    pub length: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundingSensor {
    /// Distance from the body origin to the bottom of its collider.
    pub half_height: f32,
    pub mode: ProbeMode,
}

impl GroundingSensor {
    pub fn new(half_height: f32, mode: ProbeMode) -> Self {
        GroundingSensor { half_height, mode }
    }

    pub fn ground_probes(&self, position: Vec3, rotation: Quat) -> Vec<Probe> {
        let down = rotation * Vec3::NEG_Y;
        match self.mode {
            ProbeMode::Slopes => vec![Probe {
                origin: position,
                direction: down,
                length: self.half_height + SLOPE_PROBE_MARGIN,
            }],
            ProbeMode::Spherical => vec![Probe {
                origin: position,
                direction: down,
                length: SPHERICAL_PROBE_LENGTH,
            }],
            ProbeMode::Flat => {
                let side = rotation * Vec3::X * SIDE_PROBE_OFFSET;
                vec![
                    Probe {
                        origin: position + side,
                        direction: down,
                        length: self.half_height + SIDE_PROBE_MARGIN,
                    },
                    Probe {
                        origin: position - side,
                        direction: down,
                        length: self.half_height + SIDE_PROBE_MARGIN,
                    },
                    Probe {
                        origin: position,
                        direction: down,
                        length: self.half_height + CENTER_PROBE_MARGIN,
                    },
                ]
            }
        }
    }

    pub fn ceiling_probe(&self, position: Vec3, rotation: Quat) -> Probe {
        Probe {
            origin: position,
            direction: rotation * Vec3::Y,
            length: self.half_height + CEILING_PROBE_MARGIN,
        }
    }

    /// Whether any ground probe touches the world. Without a world this is always false.
    pub fn is_grounded<W: PhysicsWorld + ?Sized>(
        &self,
        world: Option<&W>,
        position: Vec3,
        rotation: Quat,
    ) -> bool {
        let Some(world) = world else {
            return false;
        };
        self.ground_probes(position, rotation)
            .iter()
            .any(|probe| world.ray_hits(probe.origin, probe.direction, probe.length))
    }

    pub fn is_ceiling_hit<W: PhysicsWorld + ?Sized>(
        &self,
        world: Option<&W>,
        position: Vec3,
        rotation: Quat,
    ) -> bool {
        let Some(world) = world else {
            return false;
        };
        let probe = self.ceiling_probe(position, rotation);
        world.ray_hits(probe.origin, probe.direction, probe.length)
    }
}
