//! Mouse driven camera pan and tilt.
//!
//! The raw angles follow the pointer directly; the smoothed angles chase them with a
//! critically damped spring and are the ones applied to the camera pivot and camera.

use bevy::prelude::*;
use euclid::Angle;

use super::config::CameraConfig;
use crate::util::math::smooth_damp_angle;

/// Degrees of rotation per unit of pointer delta, per unit of sensitivity, per second.
const SENSITIVITY_SCALE: f32 = 100.;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraOrientation {
    pub pan: Angle<f32>,
    pub tilt: Angle<f32>,
}

impl CameraOrientation {
    /// Local rotation of the yaw pivot.
    pub fn pivot_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.pan.radians)
    }

    /// Local rotation of the camera below the pivot. Positive tilt looks down.
    pub fn camera_rotation(&self) -> Quat {
        Quat::from_rotation_x(-self.tilt.radians)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraRig {
    pub pan: f32,
    pub pan_smooth: f32,
    pan_velocity: f32,
    pub tilt: f32,
    pub tilt_smooth: f32,
    tilt_velocity: f32,
}

impl CameraRig {
    pub fn new(pan: f32, tilt: f32) -> Self {
        CameraRig {
            pan,
            pan_smooth: pan,
            tilt,
            tilt_smooth: tilt,
            ..default()
        }
    }

    pub fn update(&mut self, pointer_delta: Vec2, config: &CameraConfig, dt: f32) -> CameraOrientation {
        // The first frames after focus report huge jumps.
        let delta = if pointer_delta.length() > config.spurious_delta_threshold {
            Vec2::ZERO
        } else {
            pointer_delta
        };

        let gain = config.mouse_sensitivity * SENSITIVITY_SCALE * dt;
        self.pan += delta.x * gain;
        self.tilt -= delta.y * gain;
        let [min_tilt, max_tilt] = config.tilt_range;
        self.tilt = self.tilt.clamp(min_tilt, max_tilt);

        self.tilt_smooth = smooth_damp_angle(
            self.tilt_smooth,
            self.tilt,
            &mut self.tilt_velocity,
            config.rotation_smooth_time,
            dt,
        );
        self.pan_smooth = smooth_damp_angle(
            self.pan_smooth,
            self.pan,
            &mut self.pan_velocity,
            config.rotation_smooth_time,
            dt,
        );

        self.orientation()
    }

    pub fn orientation(&self) -> CameraOrientation {
        CameraOrientation {
            pan: Angle::degrees(self.pan_smooth),
            tilt: Angle::degrees(self.tilt_smooth),
        }
    }

    /// Turn raw and smoothed pan together, so the spring does not see the jump.
    pub fn shift_pan(&mut self, delta: f32) {
        self.pan += delta;
        self.pan_smooth += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1. / 60.;

    #[test]
    fn tilt_is_clamped_for_any_delta() {
        let config = CameraConfig::default();
        let mut rig = CameraRig::default();
        for step in -40..40 {
            let delta = Vec2::new(0., step as f32 * 0.12);
            rig.update(delta, &config, DT);
            assert!(rig.tilt >= config.tilt_range[0] && rig.tilt <= config.tilt_range[1]);
        }
        for _ in 0..200 {
            rig.update(Vec2::new(0., -4.9), &config, DT);
        }
        assert_eq!(rig.tilt, config.tilt_range[1]);
    }

    #[test]
    fn spurious_delta_is_dropped() {
        let config = CameraConfig::default();
        let mut rig = CameraRig::default();
        rig.update(Vec2::new(4., 4.), &config, DT);
        assert_eq!(rig.pan, 0.);
        assert_eq!(rig.tilt, 0.);
    }

    #[test]
    fn pan_accumulates_and_smoothing_lags() {
        let config = CameraConfig::default();
        let mut rig = CameraRig::default();
        let orientation = rig.update(Vec2::new(1., 0.), &config, DT);
        let expected = config.mouse_sensitivity * 100. * DT;
        assert!((rig.pan - expected).abs() < 1e-4);
        assert!(orientation.pan.to_degrees() > 0.);
        assert!(orientation.pan.to_degrees() < rig.pan);

        for _ in 0..300 {
            rig.update(Vec2::ZERO, &config, DT);
        }
        assert!((rig.pan_smooth - rig.pan).abs() < 1e-2);
    }

    #[test]
    fn pointer_up_raises_view() {
        let config = CameraConfig::default();
        let mut rig = CameraRig::default();
        rig.update(Vec2::new(0., 1.), &config, DT);
        assert!(rig.tilt < 0.);
    }

    #[test]
    fn shift_pan_moves_both_angles() {
        let mut rig = CameraRig::new(10., 0.);
        rig.shift_pan(-30.);
        assert_eq!(rig.pan, -20.);
        assert_eq!(rig.pan_smooth, -20.);
    }
}
