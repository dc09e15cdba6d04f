//! Carrying a body's pose, view and momentum through a portal pair.

use bevy::prelude::*;

use crate::util::math::{delta_angle, euler_degrees, quat_from_euler_degrees, signed_angle, yaw_degrees};

/// Exit portals pitched or rolled by more than this many degrees are treated as tilted.
const TILT_TOLERANCE: f32 = 1.;
/// Half width of the yaw windows that trigger the half turn correction.
const YAW_WINDOW: f32 = 1.;

/// Entry and exit portal transforms, valid for a single teleport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalPair {
    pub entry: Transform,
    pub exit: Transform,
}

impl PortalPair {
    pub fn new(entry: Transform, exit: Transform) -> Self {
        PortalPair { entry, exit }
    }

    /// Express `velocity` relative to the entry portal, then re-emit it from the exit portal.
    /// The sign flip makes the body keep going through the portal instead of bouncing back.
    pub fn transfer_velocity(&self, velocity: Vec3) -> Vec3 {
        let entry_local = self.entry.rotation.inverse() * -velocity / self.entry.scale;
        self.exit.rotation * (entry_local * self.exit.scale)
    }

    pub fn exit_is_tilted(&self) -> bool {
        let exit = euler_degrees(self.exit.rotation);
        signed_angle(exit.x).abs() > TILT_TOLERANCE || signed_angle(exit.z).abs() > TILT_TOLERANCE
    }
}

/// Body state the teleport reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportSubject {
    pub rotation: Quat,
    /// World rotation of the camera yaw pivot.
    pub pivot_rotation: Quat,
    pub pan_smooth: f32,
    pub velocity: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeleportOutcome {
    pub position: Vec3,
    pub rotation: Quat,
    /// Add to both raw and smoothed camera pan.
    pub pan_shift: f32,
    pub velocity: Vec3,
    pub tilted: bool,
}

/// Turn a spawn that would face straight back into the portal around.
///
/// The three windows overlap the yaw values `0` and `±180` that come out of the euler subtraction.
pub fn correct_exit_yaw(yaw: f32) -> f32 {
    let within = |center: f32| yaw > center - YAW_WINDOW && yaw < center + YAW_WINDOW;
    if within(0.) || within(-180.) || within(180.) {
        yaw + 180.
    } else {
        yaw
    }
}

pub fn teleport(
    pair: &PortalPair,
    destination_position: Vec3,
    destination_rotation: Quat,
    subject: &TeleportSubject,
) -> TeleportOutcome {
    let tilted = pair.exit_is_tilted();
    let (rotation, pan_shift) = if tilted {
        let exit_euler = euler_degrees(pair.exit.rotation);

        let mut relative = euler_degrees(subject.rotation) - exit_euler;
        relative.y = correct_exit_yaw(relative.y);

        let camera_relative = euler_degrees(subject.pivot_rotation) - exit_euler;
        let target_view = pair.exit.rotation * quat_from_euler_degrees(camera_relative);
        let pan_shift = delta_angle(subject.pan_smooth, yaw_degrees(target_view));

        (quat_from_euler_degrees(relative), pan_shift)
    } else {
        let pan_shift = delta_angle(subject.pan_smooth, yaw_degrees(destination_rotation));
        (Quat::IDENTITY, pan_shift)
    };

    TeleportOutcome {
        position: destination_position,
        rotation,
        pan_shift,
        velocity: pair.transfer_velocity(subject.velocity),
        tilted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(velocity: Vec3) -> TeleportSubject {
        TeleportSubject {
            rotation: Quat::IDENTITY,
            pivot_rotation: Quat::IDENTITY,
            pan_smooth: 0.,
            velocity,
        }
    }

    #[test]
    fn flat_portal_carries_velocity_through() {
        let pair = PortalPair::new(Transform::IDENTITY, Transform::IDENTITY);
        let destination = Vec3::new(4., 1., -2.);
        let outcome = teleport(&pair, destination, Quat::IDENTITY, &subject(Vec3::new(0., 0., 5.)));
        assert!(!outcome.tilted);
        assert!((outcome.velocity - Vec3::new(0., 0., -5.)).length() < 1e-5);
        assert_eq!(outcome.position, destination);
        assert_eq!(outcome.rotation, Quat::IDENTITY);
    }

    #[test]
    fn flat_portal_turns_view_to_destination_yaw() {
        let pair = PortalPair::new(Transform::IDENTITY, Transform::from_rotation(Quat::from_rotation_y(1.)));
        let mut body = subject(Vec3::ZERO);
        body.pan_smooth = 350.;
        body.rotation = Quat::from_rotation_z(0.3);
        let destination_rotation = Quat::from_rotation_y(30f32.to_radians());
        let outcome = teleport(&pair, Vec3::ZERO, destination_rotation, &body);
        assert!((outcome.pan_shift - 40.).abs() < 1e-3);
        assert_eq!(outcome.rotation, Quat::IDENTITY);
    }

    #[test]
    fn velocity_is_mapped_between_portal_frames() {
        let pair = PortalPair::new(
            Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
            Transform::IDENTITY,
        );
        // World +X is +Z in the entry portal frame, and comes out reversed.
        let v = pair.transfer_velocity(Vec3::new(3., 0., 0.));
        assert!((v - Vec3::new(0., 0., -3.)).length() < 1e-5);
    }

    #[test]
    fn tilt_detection() {
        let flat = PortalPair::new(Transform::IDENTITY, Transform::from_rotation(Quat::from_rotation_y(2.)));
        assert!(!flat.exit_is_tilted());
        let nearly = PortalPair::new(
            Transform::IDENTITY,
            Transform::from_rotation(Quat::from_rotation_x(-0.5f32.to_radians())),
        );
        assert!(!nearly.exit_is_tilted());
        let tilted = PortalPair::new(
            Transform::IDENTITY,
            Transform::from_rotation(Quat::from_rotation_x(-45f32.to_radians())),
        );
        assert!(tilted.exit_is_tilted());
    }

    #[test]
    fn yaw_correction_windows() {
        assert_eq!(correct_exit_yaw(0.5), 180.5);
        assert_eq!(correct_exit_yaw(2.), 2.);
        assert_eq!(correct_exit_yaw(-179.5), 0.5);
        assert_eq!(correct_exit_yaw(179.5), 359.5);
        assert_eq!(correct_exit_yaw(-0.5), 179.5);
        assert_eq!(correct_exit_yaw(90.), 90.);
    }

    #[test]
    fn tilted_portal_keeps_roll_and_shifts_pan() {
        let exit_rotation = Quat::from_rotation_x(-60f32.to_radians());
        let pair = PortalPair::new(Transform::IDENTITY, Transform::from_rotation(exit_rotation));
        let body = TeleportSubject {
            rotation: Quat::from_rotation_y(45f32.to_radians()),
            pivot_rotation: Quat::from_rotation_y(45f32.to_radians()),
            pan_smooth: 45.,
            velocity: Vec3::ZERO,
        };
        let outcome = teleport(&pair, Vec3::ONE, Quat::IDENTITY, &body);
        assert!(outcome.tilted);
        assert_eq!(outcome.position, Vec3::ONE);

        let exit_euler = euler_degrees(exit_rotation);
        let mut relative = euler_degrees(body.rotation) - exit_euler;
        relative.y = correct_exit_yaw(relative.y);
        assert!(outcome.rotation.abs_diff_eq(quat_from_euler_degrees(relative), 1e-5));

        let target_view = exit_rotation * quat_from_euler_degrees(euler_degrees(body.pivot_rotation) - exit_euler);
        let new_pan = body.pan_smooth + outcome.pan_shift;
        assert!(delta_angle(new_pan, yaw_degrees(target_view)).abs() < 1e-3);
        assert!(outcome.pan_shift > -180. && outcome.pan_shift <= 180.);
    }
}
