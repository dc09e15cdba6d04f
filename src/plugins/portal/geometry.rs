use std::f32::consts::PI;

use bevy::prelude::*;

/// Maps a transform in front of `entry` to the matching transform in front of `exit`.
pub fn portal_to_portal(entry: &Transform, exit: &Transform) -> Transform {
    let rot = Transform::from_rotation(Quat::from_rotation_y(PI));
    *exit * rot * Transform::from_matrix(entry.compute_matrix().inverse())
}

/// Where a body with `body` transform arrives after going through `entry`.
pub fn destination(entry: &Transform, exit: &Transform, body: &Transform) -> (Vec3, Quat) {
    let arrival = portal_to_portal(entry, exit).mul_transform(*body);
    (arrival.translation, arrival.rotation)
}

/// Whether `position` is close to `portal` and has passed its surface.
///
/// Portals face their wall, so a traveller is through once it is on the forward side.
pub fn has_crossed(portal: &Transform, position: Vec3, proximity: f32) -> bool {
    let offset = position - portal.translation;
    offset.length() < proximity && offset.dot(portal.forward()) > 0.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrival_is_mirrored_in_front_of_exit() {
        let entry = Transform::from_xyz(0., 1., -5.);
        let exit = Transform::from_xyz(10., 1., 0.);
        let body = Transform::from_xyz(0., 1., -5.2);
        let (position, rotation) = destination(&entry, &exit, &body);
        // 0.2 past the entry surface ends up 0.2 out of the exit surface.
        assert!((position - Vec3::new(10., 1., 0.2)).length() < 1e-4);
        assert!((rotation * Vec3::NEG_Z - Vec3::Z).length() < 1e-4);
    }

    #[test]
    fn crossing_needs_proximity_and_side() {
        let portal = Transform::from_xyz(0., 1., -5.);
        assert!(has_crossed(&portal, Vec3::new(0., 1., -5.1), 1.));
        assert!(!has_crossed(&portal, Vec3::new(0., 1., -4.9), 1.));
        assert!(!has_crossed(&portal, Vec3::new(0., 1., -7.), 1.));
    }
}
