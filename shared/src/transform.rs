//! Value-style pose records and the canonical rotation convention.
//!
//! # Rotation convention
//! Orientation is a single yaw angle in radians about +Y. The avatar only
//! ever rotates about the vertical axis, so this is lossless for the scope of
//! the simulation. On the wire, rotation travels as an Euler XYZ triple
//! `[0.0, yaw, 0.0]` (see [`yaw_to_euler`] / [`yaw_from_euler`]); the physics
//! engine receives the equivalent unit quaternion from [`yaw_quat`].
//!
//! # Forward convention
//! The forward-facing unit vector is the yaw rotation applied to +Z, matching
//! the render engine's world-direction convention: yaw 0 faces +Z, a positive
//! (leftward) yaw turns the forward vector toward +X.

use nalgebra as na;

pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// Pose of one model/body pair as a plain value.
///
/// Engine handles (render transform, rigid body) are written from this record
/// only at defined synchronization points, never mutated piecemeal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    /// Rotation about +Y in radians.
    pub yaw: f32,
}

impl Transform {
    pub fn new(translation: Vec3, yaw: f32) -> Self {
        Self { translation, yaw }
    }

    /// Identity pose at the world origin.
    pub fn identity() -> Self {
        Self::new(Vec3::zeros(), 0.0)
    }

    /// Orientation as a unit quaternion, for engine handles that want one.
    #[inline]
    pub fn rotation_quat(&self) -> Quat {
        yaw_quat(self.yaw)
    }

    /// Forward-facing unit vector for the current orientation.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        forward_from_yaw(self.yaw)
    }

    /// Translation as the wire-format coordinate triple.
    #[inline]
    pub fn wire_position(&self) -> [f32; 3] {
        [self.translation.x, self.translation.y, self.translation.z]
    }

    /// Rotation as the wire-format Euler triple.
    #[inline]
    pub fn wire_rotation(&self) -> [f32; 3] {
        yaw_to_euler(self.yaw)
    }
}

/// Unit quaternion for a rotation of `yaw` radians about +Y.
#[inline]
pub fn yaw_quat(yaw: f32) -> Quat {
    na::UnitQuaternion::from_axis_angle(&na::Vector3::y_axis(), yaw)
}

/// Forward unit vector for a yaw angle: `R_y(yaw) * +Z`.
#[inline]
pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    yaw_quat(yaw) * Vec3::z()
}

/// Canonical Euler XYZ wire form of a yaw-only rotation.
#[inline]
pub fn yaw_to_euler(yaw: f32) -> [f32; 3] {
    [0.0, yaw, 0.0]
}

/// Yaw component of a wire Euler triple. Roll/pitch are out of scope and
/// ignored by construction.
#[inline]
pub fn yaw_from_euler(euler: [f32; 3]) -> f32 {
    euler[1]
}

/// Apply a local-frame offset to a pose and return the resulting world point.
///
/// Used for the third-person camera: `offset` rotates with the avatar, then
/// translates with it.
#[inline]
pub fn apply_local_offset(transform: &Transform, offset: Vec3) -> Vec3 {
    transform.rotation_quat() * offset + transform.translation
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) {
        assert!((a - b).norm() < 1.0e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn zero_yaw_faces_positive_z() {
        approx(forward_from_yaw(0.0), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn quarter_turn_left_faces_positive_x() {
        // Positive yaw = left turn, which rotates +Z toward +X.
        approx(forward_from_yaw(FRAC_PI_2), Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn euler_round_trip_preserves_yaw() {
        let yaw = 1.234;
        assert_eq!(yaw_from_euler(yaw_to_euler(yaw)), yaw);
    }

    #[test]
    fn wire_rotation_is_yaw_only() {
        let t = Transform::new(Vec3::zeros(), 0.5);
        assert_eq!(t.wire_rotation(), [0.0, 0.5, 0.0]);
    }

    #[test]
    fn local_offset_rotates_with_the_pose() {
        // A pure-Z local offset on a quarter-turned pose lands on the X axis.
        let t = Transform::new(Vec3::new(1.0, 0.0, 0.0), FRAC_PI_2);
        approx(
            apply_local_offset(&t, Vec3::new(0.0, 0.0, 2.0)),
            Vec3::new(3.0, 0.0, 0.0),
        );
    }
}
