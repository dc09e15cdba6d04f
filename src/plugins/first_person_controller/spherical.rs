use bevy::prelude::*;

/// Marks the body the controller stands on when spherical movement is enabled.
#[derive(Debug, Default, Component, Reflect)]
#[reflect(Component)]
pub struct Planet;

/// Tilt the body towards standing upright on a planet centered at `planet_center`.
///
/// `blend` is the slerp factor for one frame.
pub fn planet_alignment(position: Vec3, rotation: Quat, planet_center: Vec3, blend: f32) -> Quat {
    let Some(outward) = (position - planet_center).try_normalize() else {
        return rotation;
    };
    let up = (rotation * Vec3::Y).normalize();
    let upright = Quat::from_rotation_arc(up, outward) * rotation;
    rotation.slerp(upright, blend.clamp(0., 1.))
}
