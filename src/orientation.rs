//! Facing orientation solver.
//!
//! Rotates the character's facing toward the camera-derived look direction
//! with exponential smoothing, so convergence speed is independent of frame
//! rate. Forward follows the Bevy convention (`-Z`).

use bevy::prelude::*;

/// Smoothly rotate `current` so its forward axis approaches `look_direction`.
///
/// The blend factor is `1 - e^(-turn_speed * dt)`: a partial spherical
/// interpolation of the forward vector toward the look direction, kept in
/// the plane structure of a look-rotation about `up`.
///
/// Returns `current` unchanged when the look direction is zero-length, the
/// turn speed is non-positive, or `dt` is non-positive.
pub fn update_rotation(
    current: Quat,
    look_direction: Vec3,
    up: Vec3,
    turn_speed: f32,
    dt: f32,
) -> Quat {
    let look_direction = look_direction.normalize_or_zero();
    if look_direction == Vec3::ZERO || turn_speed <= 0.0 || dt <= 0.0 {
        return current;
    }

    let forward = (current * Vec3::NEG_Z).normalize_or_zero();
    if forward == Vec3::ZERO {
        return current;
    }

    // Spherical interpolation of the forward vector itself: rotate partway
    // along the arc from the current forward to the look direction.
    let t = 1.0 - (-turn_speed * dt).exp();
    let full_arc = Quat::from_rotation_arc(forward, look_direction);
    let partial_arc = Quat::IDENTITY.slerp(full_arc, t);
    let smoothed = (partial_arc * forward).normalize_or_zero();
    if smoothed == Vec3::ZERO {
        return current;
    }

    Transform::IDENTITY.looking_to(smoothed, up).rotation
}
