//! Quake-style velocity integration.
//!
//! Pure functions turning current velocity plus move intent into next
//! velocity. Friction scales speed down without changing direction;
//! acceleration is clamped so the projection of velocity onto the input
//! direction never exceeds the mode's speed cap, which caps input-driven
//! speed without touching speed gained from other sources (falling,
//! knockback).
//!
//! All functions treat a non-positive `dt` as a no-op frame.

use bevy::prelude::*;

use crate::config::MotionParams;

/// Rotate `direction` to lie in the plane tangent to `surface_normal`,
/// preserving its handedness relative to `up`. Returns a unit vector, or
/// zero when the inputs are degenerate (zero direction, direction parallel
/// to up).
pub fn tangent_to_surface(direction: Vec3, surface_normal: Vec3, up: Vec3) -> Vec3 {
    let right = direction.cross(up);
    surface_normal.cross(right).normalize_or_zero()
}

/// Apply friction to `velocity`: `speed -= speed * friction * dt`, floored
/// at zero. Direction is preserved; zero velocity stays zero.
pub fn apply_friction(velocity: Vec3, friction: f32, dt: f32) -> Vec3 {
    if dt <= 0.0 {
        return velocity;
    }
    let speed = velocity.length();
    if speed == 0.0 {
        return velocity;
    }
    let drop = speed * friction * dt;
    velocity * ((speed - drop).max(0.0) / speed)
}

/// Accelerate `velocity` along `accel_dir` (magnitude <= 1), clamping the
/// step so the projection onto `accel_dir` does not exceed `max_speed`.
///
/// The clamp delta can go negative when the projected speed is already over
/// the cap, decelerating the projected component only.
pub fn apply_acceleration(
    velocity: Vec3,
    accel_dir: Vec3,
    acceleration: f32,
    max_speed: f32,
    dt: f32,
) -> Vec3 {
    if dt <= 0.0 {
        return velocity;
    }
    let projected = velocity.dot(accel_dir);
    let mut accel_delta = acceleration * dt;
    if projected + accel_delta > max_speed {
        accel_delta = max_speed - projected;
    }
    velocity + accel_dir * accel_delta
}

/// Ground-mode integration step.
///
/// Both the current velocity and the move input are reprojected onto the
/// plane tangent to `ground_normal` (magnitudes preserved) so speed carries
/// across slope seams, then friction and acceleration apply with the
/// ground coefficients.
pub fn integrate_ground(
    velocity: Vec3,
    move_input: Vec3,
    ground_normal: Vec3,
    up: Vec3,
    params: &MotionParams,
    dt: f32,
) -> Vec3 {
    if dt <= 0.0 {
        return velocity;
    }
    let reoriented = tangent_to_surface(velocity, ground_normal, up) * velocity.length();
    let accel_dir = tangent_to_surface(move_input, ground_normal, up) * move_input.length();

    let velocity = apply_friction(reoriented, params.friction, dt);
    apply_acceleration(velocity, accel_dir, params.acceleration, params.max_speed, dt)
}

/// Air-mode integration step.
///
/// Friction and acceleration apply only to the component of velocity in the
/// plane perpendicular to `up`; the vertical component passes through
/// untouched, then gravity is added.
pub fn integrate_air(
    velocity: Vec3,
    move_input: Vec3,
    up: Vec3,
    gravity: Vec3,
    params: &MotionParams,
    dt: f32,
) -> Vec3 {
    if dt <= 0.0 {
        return velocity;
    }
    let vertical = up * velocity.dot(up);
    let planar = velocity - vertical;

    let planar = apply_friction(planar, params.friction, dt);
    let planar = apply_acceleration(planar, move_input, params.acceleration, params.max_speed, dt);

    planar + vertical + gravity * dt
}
