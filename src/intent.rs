//! Per-frame input snapshot and camera-relative intent derivation.
//!
//! The snapshot is the immutable value handed to the update cycle each
//! frame: raw move axes, the jump edge, and the camera's current look
//! rotation. The derivation turns it into world-space move and look
//! vectors, rotating planar intent by the camera yaw so "forward" always
//! means "away from the camera".

use bevy::prelude::*;

/// Per-frame player intent for one character.
///
/// Produced once per frame by the input routing and consumed (jump edge
/// cleared) by the character update cycle.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct PlayerInputSnapshot {
    /// Forward move axis in `[-1, 1]`.
    pub move_forward: f32,
    /// Right move axis in `[-1, 1]`.
    pub move_right: f32,
    /// Whether jump was pressed this frame. Cleared on consumption.
    pub jump_pressed: bool,
    /// Camera look yaw in degrees, `[0, 360)`.
    pub camera_yaw: f32,
    /// Camera look pitch in degrees, within the camera's clamp range.
    pub camera_pitch: f32,
}

impl PlayerInputSnapshot {
    /// Set the move axes. Values are clamped to `[-1, 1]`.
    pub fn set_move(&mut self, forward: f32, right: f32) {
        self.move_forward = forward.clamp(-1.0, 1.0);
        self.move_right = right.clamp(-1.0, 1.0);
    }
}

/// Yaw-only rotation about the character's up axis for the given camera
/// yaw (degrees). This is the planar frame move intent is expressed in.
pub fn camera_planar_rotation(camera_yaw_degrees: f32, up: Vec3) -> Quat {
    let axis = up.normalize_or_zero();
    if axis == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_axis_angle(axis, camera_yaw_degrees.to_radians())
}

/// World-space move intent: the raw axes assembled in the camera's planar
/// frame, magnitude-clamped to 1 (preserves analog stick gradation better
/// than normalizing).
pub fn world_move_vector(snapshot: &PlayerInputSnapshot, up: Vec3) -> Vec3 {
    let local = Vec3::new(snapshot.move_right, 0.0, -snapshot.move_forward).clamp_length_max(1.0);
    camera_planar_rotation(snapshot.camera_yaw, up) * local
}

/// World-space look direction: the camera's planar forward. This is what
/// the orientation solver steers the facing toward.
pub fn world_look_vector(snapshot: &PlayerInputSnapshot, up: Vec3) -> Vec3 {
    camera_planar_rotation(snapshot.camera_yaw, up) * Vec3::NEG_Z
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn set_move_clamps_axes() {
        let mut snapshot = PlayerInputSnapshot::default();
        snapshot.set_move(2.0, -3.0);
        assert_eq!(snapshot.move_forward, 1.0);
        assert_eq!(snapshot.move_right, -1.0);
    }

    #[test]
    fn move_vector_magnitude_never_exceeds_one() {
        let mut snapshot = PlayerInputSnapshot::default();
        snapshot.set_move(1.0, 1.0); // diagonal input
        let v = world_move_vector(&snapshot, Vec3::Y);
        assert!(v.length() <= 1.0 + EPSILON);
    }

    #[test]
    fn partial_stick_deflection_is_preserved() {
        let mut snapshot = PlayerInputSnapshot::default();
        snapshot.set_move(0.5, 0.0);
        let v = world_move_vector(&snapshot, Vec3::Y);
        assert!((v.length() - 0.5).abs() < EPSILON);
    }

    #[test]
    fn zero_yaw_forward_matches_world_forward() {
        let mut snapshot = PlayerInputSnapshot::default();
        snapshot.set_move(1.0, 0.0);
        let v = world_move_vector(&snapshot, Vec3::Y);
        assert!((v - Vec3::NEG_Z).length() < EPSILON);
        assert!((world_look_vector(&snapshot, Vec3::Y) - Vec3::NEG_Z).length() < EPSILON);
    }

    #[test]
    fn move_and_look_share_the_camera_frame() {
        // Full forward input must always push along the camera's planar
        // forward, whatever the yaw.
        for yaw in [0.0, 45.0, 90.0, 180.0, 271.5] {
            let snapshot = PlayerInputSnapshot {
                move_forward: 1.0,
                camera_yaw: yaw,
                ..Default::default()
            };
            let movement = world_move_vector(&snapshot, Vec3::Y);
            let look = world_look_vector(&snapshot, Vec3::Y);
            assert!(
                movement.dot(look) > 1.0 - 1e-4,
                "yaw {yaw}: move {movement} diverges from look {look}"
            );
        }
    }

    #[test]
    fn move_vector_stays_planar() {
        let snapshot = PlayerInputSnapshot {
            move_forward: 1.0,
            move_right: 0.3,
            camera_yaw: 123.0,
            ..Default::default()
        };
        let v = world_move_vector(&snapshot, Vec3::Y);
        assert!(v.y.abs() < EPSILON);
    }

    #[test]
    fn degenerate_up_yields_identity_frame() {
        let snapshot = PlayerInputSnapshot {
            move_forward: 1.0,
            camera_yaw: 90.0,
            ..Default::default()
        };
        let v = world_move_vector(&snapshot, Vec3::ZERO);
        assert!((v - Vec3::NEG_Z).length() < EPSILON);
    }
}
