//! Angle and interpolation helpers shared by the controller components.
//!
//! Angles in this module are expressed in degrees. Euler triples are stored as
//! `Vec3(pitch, yaw, roll)` and compose as yaw, then pitch, then roll, which is the
//! `EulerRot::YXZ` order.

use bevy::prelude::*;

/// Smallest smoothing time accepted by the smooth-damp functions.
const MIN_SMOOTH_TIME: f32 = 0.0001;

/// Wrap `t` into `[0, length)`.
pub fn repeat(t: f32, length: f32) -> f32 {
    (t - (t / length).floor() * length).clamp(0., length)
}

/// Signed shortest difference from `current` to `target`, in `(-180, 180]`.
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = repeat(target - current, 360.);
    if delta >= 360. {
        delta -= 360.;
    }
    if delta > 180. {
        delta -= 360.;
    }
    delta
}

/// Map any angle into `(-180, 180]`.
pub fn signed_angle(angle: f32) -> f32 {
    delta_angle(0., angle)
}

/// Map any angle into `[0, 360)`.
pub fn positive_angle(angle: f32) -> f32 {
    let wrapped = repeat(angle, 360.);
    if wrapped >= 360. {
        0.
    } else {
        wrapped
    }
}

/// Exponential factor of the critically damped spring used by the smooth-damp family.
fn damping(omega: f32, dt: f32) -> f32 {
    let x = omega * dt;
    1. / (1. + x + 0.48 * x * x + 0.235 * x * x * x)
}

/// Critically damped move of `current` towards `target`.
///
/// `velocity` carries the spring state between calls and must be kept by the caller.
/// The result never passes `target`.
pub fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    if dt <= 0. {
        return current;
    }
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2. / smooth_time;
    let exp = damping(omega, dt);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current > 0.) == (output > target) {
        output = target;
        *velocity = 0.;
    }
    output
}

/// [`smooth_damp`] along the shortest arc between two angles.
pub fn smooth_damp_angle(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    dt: f32,
) -> f32 {
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}

/// Vector version of [`smooth_damp`]. Overshoot is detected along the direction of travel.
pub fn smooth_damp_vec3(
    current: Vec3,
    target: Vec3,
    velocity: &mut Vec3,
    smooth_time: f32,
    dt: f32,
) -> Vec3 {
    if dt <= 0. {
        return current;
    }
    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2. / smooth_time;
    let exp = damping(omega, dt);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    if (target - current).dot(output - target) > 0. {
        output = target;
        *velocity = Vec3::ZERO;
    }
    output
}

/// Round every component to the nearest integer.
pub fn round_vec3(v: Vec3) -> Vec3 {
    Vec3::new(v.x.round(), v.y.round(), v.z.round())
}

/// Decompose a rotation into `(pitch, yaw, roll)` degrees, each in `[0, 360)`.
pub fn euler_degrees(rotation: Quat) -> Vec3 {
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(
        positive_angle(pitch.to_degrees()),
        positive_angle(yaw.to_degrees()),
        positive_angle(roll.to_degrees()),
    )
}

/// Build a rotation from `(pitch, yaw, roll)` degrees.
pub fn quat_from_euler_degrees(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    )
}

/// Rotation around the vertical axis, in degrees.
pub fn yaw_degrees(rotation: Quat) -> f32 {
    euler_degrees(rotation).y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_angle_stays_in_half_open_range() {
        let mut a = -720.;
        while a <= 720. {
            let mut b = -540.;
            while b <= 540. {
                let d = delta_angle(a, b);
                assert!(d > -180. && d <= 180., "delta_angle({a}, {b}) = {d}");
                let reached = positive_angle(a + d);
                let expected = positive_angle(b);
                let err = delta_angle(reached, expected).abs();
                assert!(err < 1e-3, "{a} + {d} does not reach {b}");
                b += 17.5;
            }
            a += 22.5;
        }
    }

    #[test]
    fn delta_angle_picks_positive_half_turn() {
        assert_eq!(delta_angle(0., 180.), 180.);
        assert_eq!(delta_angle(0., -180.), 180.);
        assert_eq!(delta_angle(350., 10.), 20.);
        assert_eq!(delta_angle(10., 350.), -20.);
    }

    #[test]
    fn smooth_damp_converges_without_overshoot() {
        let mut velocity = 0.;
        let mut value = 0.;
        for _ in 0..600 {
            value = smooth_damp(value, 10., &mut velocity, 0.1, 1. / 60.);
            assert!(value <= 10.);
        }
        assert!((value - 10.).abs() < 1e-3);
    }

    #[test]
    fn smooth_damp_angle_takes_short_way() {
        let mut velocity = 0.;
        let value = smooth_damp_angle(350., 10., &mut velocity, 0.1, 1. / 60.);
        assert!(value > 350.);
        assert!(velocity > 0.);
    }

    #[test]
    fn smooth_damp_ignores_empty_step() {
        let mut velocity = Vec3::ZERO;
        let v = smooth_damp_vec3(Vec3::X, Vec3::ZERO, &mut velocity, 0.1, 0.);
        assert_eq!(v, Vec3::X);
    }

    #[test]
    fn euler_round_trip() {
        let euler = Vec3::new(20., 135., 10.);
        let back = euler_degrees(quat_from_euler_degrees(euler));
        assert!((back - euler).abs().max_element() < 1e-3, "{back:?}");
    }

    #[test]
    fn rounding_snaps_axes() {
        assert_eq!(round_vec3(Vec3::new(0.49, -0.51, 0.9)), Vec3::new(0., -1., 1.));
    }
}
