//! Collision-aware orbit camera.
//!
//! The rig keeps a target yaw/pitch/distance driven by look and zoom
//! input, and resolves the actual follow distance against world geometry:
//! a rate-limited sphere cast from the follow point back toward the camera
//! finds the closest non-ignored obstruction, and the current distance
//! smooths toward either that hit or the target distance. Rotation, follow
//! position, and distance all use the same exponential smoothing
//! (`1 - e^(-speed * dt)`), so convergence is frame-rate independent.

use bevy::log::debug;
use bevy::prelude::*;

use crate::backend::{CharacterMotorBackend, SphereCastHit};

/// Orbit camera tunables.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OrbitCamera {
    /// View offset from the follow point, in camera-space right/up units.
    pub view_offset: Vec2,
    /// Convergence rate of the smoothed follow position.
    pub follow_interp_speed: f32,
    /// Invert the horizontal look axis.
    pub invert_x: bool,
    /// Invert the vertical look axis.
    pub invert_y: bool,
    /// Lowest allowed pitch in degrees (negative looks up).
    pub min_pitch: f32,
    /// Highest allowed pitch in degrees (positive looks down).
    pub max_pitch: f32,
    /// Degrees of yaw/pitch per unit of look input.
    pub look_sensitivity: f32,
    /// Convergence rate of the camera rotation toward its target.
    pub look_interp_speed: f32,
    /// Follow distance before any zoom input.
    pub default_distance: f32,
    /// Closest the camera may zoom in.
    pub min_distance: f32,
    /// Furthest the camera may zoom out.
    pub max_distance: f32,
    /// Distance change per unit of zoom input.
    pub distance_speed: f32,
    /// Convergence rate of the distance toward the zoom target.
    pub distance_interp_speed: f32,
    /// Radius of the obstruction-check sphere cast.
    pub obstruction_radius: f32,
    /// Collision-layer mask passed to the backend's sphere cast.
    pub obstruction_mask: u32,
    /// Minimum seconds between obstruction checks while unobstructed.
    pub obstruction_check_rate: f32,
    /// Target distance below which unobstructed checks are skipped entirely.
    pub obstruction_check_threshold: f32,
    /// Convergence rate of the distance toward an obstruction hit.
    pub obstruction_interp_speed: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            view_offset: Vec2::ZERO,
            follow_interp_speed: 10_000.0,
            invert_x: false,
            invert_y: false,
            min_pitch: -90.0,
            max_pitch: 90.0,
            look_sensitivity: 2.0,
            look_interp_speed: 10_000.0,
            default_distance: 5.0,
            min_distance: 0.0,
            max_distance: 10.0,
            distance_speed: 5.0,
            distance_interp_speed: 10.0,
            obstruction_radius: 0.2,
            obstruction_mask: u32::MAX,
            obstruction_check_rate: 0.04,
            obstruction_check_threshold: 0.0,
            obstruction_interp_speed: 50.0,
        }
    }
}

impl OrbitCamera {
    /// Builder: set the pitch clamp range, reordered so min <= max.
    pub fn with_pitch_limits(mut self, min: f32, max: f32) -> Self {
        self.min_pitch = min.min(max);
        self.max_pitch = max.max(min);
        self
    }

    /// Builder: set the distance range and clamp the default into it.
    pub fn with_distance_range(mut self, min: f32, max: f32) -> Self {
        self.min_distance = min.min(max);
        self.max_distance = max.max(min);
        self.default_distance = self.default_distance.clamp(self.min_distance, self.max_distance);
        self
    }

    /// Builder: set the look sensitivity.
    pub fn with_look_sensitivity(mut self, sensitivity: f32) -> Self {
        self.look_sensitivity = sensitivity;
        self
    }

    /// Builder: set the axis inversion flags.
    pub fn with_inverted_axes(mut self, invert_x: bool, invert_y: bool) -> Self {
        self.invert_x = invert_x;
        self.invert_y = invert_y;
        self
    }

    /// Builder: set the view offset.
    pub fn with_view_offset(mut self, offset: Vec2) -> Self {
        self.view_offset = offset;
        self
    }
}

/// Mutable rig state owned by the orbit camera, persisted across frames.
#[derive(Component, Reflect, Debug, Clone, Default)]
#[reflect(Component)]
pub struct OrbitCameraState {
    /// The entity this camera orbits, if any. Look and zoom input is
    /// ignored until a follow target is set.
    pub follow_target: Option<Entity>,
    /// Target yaw in degrees, always wrapped to `[0, 360)`.
    pub target_yaw: f32,
    /// Target pitch in degrees, always within the configured clamp range.
    /// Positive looks down.
    pub target_pitch: f32,
    /// Zoom target distance.
    pub target_distance: f32,
    /// Smoothed actual distance. Tracks the obstruction distance while
    /// obstructed, the target distance otherwise.
    pub current_distance: f32,
    /// Whether the last obstruction check found a blocking hit.
    pub is_obstructed: bool,
    /// Distance of the last resolved obstruction. Holds its value across
    /// skipped-check frames and keeps serving as the smoothing target.
    pub obstruction_distance: f32,
    /// Elapsed-time stamp of the last obstruction check.
    pub last_obstruction_check: f32,
    /// Smoothed follow position.
    pub current_follow_position: Vec3,
    /// Colliders excluded from obstruction checks (typically the followed
    /// character's own).
    pub ignored_colliders: Vec<Entity>,
}

impl OrbitCameraState {
    /// Create rig state with distances seeded from the config.
    pub fn new(config: &OrbitCamera) -> Self {
        let distance = config
            .default_distance
            .clamp(config.min_distance, config.max_distance);
        Self {
            target_distance: distance,
            current_distance: distance,
            ..Default::default()
        }
    }

    /// Set the entity to orbit and face it with the given initial yaw.
    pub fn follow(&mut self, target: Entity, initial_yaw: f32) {
        self.follow_target = Some(target);
        self.target_yaw = wrap_degrees(initial_yaw);
    }

    /// Exclude a collider from obstruction checks.
    pub fn add_ignored_collider(&mut self, collider: Entity) {
        self.ignored_colliders.push(collider);
    }

    /// Exclude several colliders from obstruction checks.
    pub fn add_ignored_colliders(&mut self, colliders: impl IntoIterator<Item = Entity>) {
        self.ignored_colliders.extend(colliders);
    }

    /// Apply raw look input: yaw accumulates and wraps, pitch accumulates
    /// and clamps. Inversion flags and sensitivity come from the config.
    pub fn apply_look_input(&mut self, config: &OrbitCamera, raw: Vec2) {
        let mut raw = raw;
        if config.invert_x {
            raw.x = -raw.x;
        }
        if config.invert_y {
            raw.y = -raw.y;
        }

        self.target_yaw = wrap_degrees(self.target_yaw + raw.x * config.look_sensitivity);
        self.target_pitch = (self.target_pitch - raw.y * config.look_sensitivity)
            .clamp(config.min_pitch, config.max_pitch);
    }

    /// Apply zoom input to the target distance.
    ///
    /// While obstructed, the target first snaps to the current (resolved)
    /// distance so zooming out of an obstruction does not pop.
    pub fn apply_zoom(&mut self, config: &OrbitCamera, zoom: f32) {
        if zoom.abs() <= f32::EPSILON {
            return;
        }
        if self.is_obstructed {
            self.target_distance = self.current_distance;
        }
        self.target_distance = (self.target_distance + zoom * config.distance_speed)
            .clamp(config.min_distance, config.max_distance);
    }

    /// The target orientation: yaw about the world up axis composed with
    /// pitch about the camera's right axis.
    pub fn target_orientation(&self) -> Quat {
        Quat::from_rotation_y(self.target_yaw.to_radians())
            * Quat::from_rotation_x(-self.target_pitch.to_radians())
    }

    /// Whether an obstruction check is due this frame.
    fn obstruction_check_due(&self, config: &OrbitCamera, now: f32) -> bool {
        self.is_obstructed
            || (self.target_distance > config.obstruction_check_threshold
                && now - self.last_obstruction_check > config.obstruction_check_rate)
    }
}

/// Look/zoom input accumulated for a camera over the current frame.
/// Cleared by the camera update after consumption.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct CameraInput {
    /// Accumulated look delta.
    pub look: Vec2,
    /// Accumulated zoom input. Positive zooms out.
    pub zoom: f32,
}

impl CameraInput {
    /// Accumulate a look delta.
    pub fn add_look(&mut self, delta: Vec2) {
        self.look += delta;
    }

    /// Accumulate zoom input.
    pub fn add_zoom(&mut self, zoom: f32) {
        self.zoom += zoom;
    }

    /// Reset the accumulated input.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Pick the closest obstruction among sphere-cast hits: smallest positive
/// distance whose collider is not in the ignore list.
pub fn closest_obstruction(
    hits: &[SphereCastHit],
    ignored: &[Entity],
) -> Option<SphereCastHit> {
    let mut closest: Option<SphereCastHit> = None;
    for hit in hits {
        if hit.distance <= 0.0 {
            continue;
        }
        if let Some(entity) = hit.entity {
            if ignored.contains(&entity) {
                continue;
            }
        }
        if closest.is_none_or(|best| hit.distance < best.distance) {
            closest = Some(*hit);
        }
    }
    closest
}

/// Per-frame orbit camera update: look input, rotation smoothing, follow
/// smoothing, zoom, obstruction resolution, and final placement.
pub fn update_orbit_camera<B: CharacterMotorBackend>(world: &mut World) {
    let (dt, now) = {
        let time = world.resource::<Time>();
        (time.delta_secs(), time.elapsed_secs())
    };
    if dt <= 0.0 {
        return;
    }

    let cameras: Vec<(Entity, OrbitCamera, CameraInput, Quat)> = world
        .query::<(Entity, &OrbitCamera, &CameraInput, &Transform)>()
        .iter(world)
        .map(|(entity, config, input, transform)| (entity, *config, *input, transform.rotation))
        .collect();

    for (entity, config, input, current_rotation) in cameras {
        // Input is consumed this frame whether or not the rig can use it;
        // a camera without a follow target discards it rather than letting
        // deltas pile up and apply as one burst once a target appears.
        if let Some(mut stored_input) = world.get_mut::<CameraInput>(entity) {
            stored_input.clear();
        }

        let Some(mut state) = world.get::<OrbitCameraState>(entity).cloned() else {
            continue;
        };
        let Some(target) = state.follow_target else {
            continue;
        };
        let Some(follow_position) = world.get::<Transform>(target).map(|t| t.translation) else {
            continue;
        };

        state.apply_look_input(&config, input.look);

        let look_blend = 1.0 - (-config.look_interp_speed * dt).exp();
        let rotation = current_rotation.slerp(state.target_orientation(), look_blend);

        let follow_blend = 1.0 - (-config.follow_interp_speed * dt).exp();
        state.current_follow_position = state
            .current_follow_position
            .lerp(follow_position, follow_blend);

        state.apply_zoom(&config, input.zoom);

        if state.obstruction_check_due(&config, now) {
            // Cast from the follow point back toward the camera.
            let direction = -(rotation * Vec3::NEG_Z);
            let hits = B::sphere_cast(
                world,
                state.current_follow_position,
                config.obstruction_radius,
                direction,
                state.target_distance,
                config.obstruction_mask,
            );
            let was_obstructed = state.is_obstructed;
            match closest_obstruction(&hits, &state.ignored_colliders) {
                Some(hit) => {
                    state.is_obstructed = true;
                    state.obstruction_distance = hit.distance;
                }
                None => {
                    state.is_obstructed = false;
                }
            }
            if state.is_obstructed != was_obstructed {
                debug!(
                    "camera {entity} obstruction {}",
                    if state.is_obstructed { "entered" } else { "cleared" }
                );
            }
            state.last_obstruction_check = now;
        }

        let (distance_goal, interp_speed) = if state.is_obstructed {
            (state.obstruction_distance, config.obstruction_interp_speed)
        } else {
            (state.target_distance, config.distance_interp_speed)
        };
        let distance_blend = 1.0 - (-interp_speed * dt).exp();
        state.current_distance += (distance_goal - state.current_distance) * distance_blend;

        let forward = rotation * Vec3::NEG_Z;
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        let translation = state.current_follow_position - forward * state.current_distance
            + right * config.view_offset.x
            + up * config.view_offset.y;

        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.rotation = rotation;
            transform.translation = translation;
        }
        if let Some(mut stored) = world.get_mut::<OrbitCameraState>(entity) {
            *stored = state;
        }
    }
}

/// Feed each camera's target look rotation into the snapshot of the
/// character it follows, so planar move intent rotates with the camera.
pub fn sync_camera_rotation_to_snapshots(
    cameras: Query<&OrbitCameraState>,
    mut snapshots: Query<&mut crate::intent::PlayerInputSnapshot>,
) {
    for state in &cameras {
        let Some(target) = state.follow_target else {
            continue;
        };
        if let Ok(mut snapshot) = snapshots.get_mut(target) {
            snapshot.camera_yaw = state.target_yaw;
            snapshot.camera_pitch = state.target_pitch;
        }
    }
}
