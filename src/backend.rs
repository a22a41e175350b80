//! Motor backend abstraction.
//!
//! This module defines the trait that rigid-body motors must implement to
//! drive the character controller. The controller never resolves collisions
//! itself; it consumes per-frame grounding state from the motor and hands
//! the computed velocity and rotation back for integration.

use bevy::prelude::*;

/// Per-frame grounding state reported by the motor.
///
/// Refreshed by the motor before the controller's velocity update runs.
/// The controller only reads this; it never writes it.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct GroundingReport {
    /// Whether the character rests on a walkable surface (slope within the
    /// motor's stability tolerance).
    pub is_stable_on_ground: bool,
    /// Whether the character touches *any* surface, walkable or not.
    pub found_any_ground: bool,
    /// Unit normal of the touched surface. Meaningful only when
    /// `found_any_ground` is true.
    pub ground_normal: Vec3,
}

impl Default for GroundingReport {
    fn default() -> Self {
        Self {
            is_stable_on_ground: false,
            found_any_ground: false,
            ground_normal: Vec3::Y,
        }
    }
}

impl GroundingReport {
    /// Report for a character resting on flat, stable ground.
    pub fn stable() -> Self {
        Self {
            is_stable_on_ground: true,
            found_any_ground: true,
            ground_normal: Vec3::Y,
        }
    }

    /// Report for a fully airborne character.
    pub fn airborne() -> Self {
        Self::default()
    }

    /// Report for contact with a surface too steep to stand on.
    pub fn sliding(normal: Vec3) -> Self {
        Self {
            is_stable_on_ground: false,
            found_any_ground: true,
            ground_normal: normal.normalize_or_zero(),
        }
    }
}

/// A single hit returned by a sphere cast.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphereCastHit {
    /// Distance from the cast origin to the hit.
    pub distance: f32,
    /// Surface normal at the hit point.
    pub normal: Vec3,
    /// World position of the hit point.
    pub point: Vec3,
    /// Collider entity that was hit (if the backend tracks one).
    pub entity: Option<Entity>,
}

impl SphereCastHit {
    /// Create a hit at the given distance against the given collider.
    pub fn new(distance: f32, entity: Option<Entity>) -> Self {
        Self {
            distance,
            entity,
            ..Default::default()
        }
    }
}

/// Trait for rigid-body motor implementations.
///
/// Implement this trait to integrate a kinematic motor or physics engine
/// with the character controller. The controller systems are generic over
/// it, so motors can be swapped without touching movement logic.
///
/// Velocity and rotation are read once and written once per update cycle;
/// the controller is the single writer for both during its update.
pub trait CharacterMotorBackend: 'static + Send + Sync {
    /// Returns the plugin that sets up this backend.
    ///
    /// The backend's own integration step (applying velocity to transforms,
    /// collision sweeps, ground probing) must run in
    /// [`CharacterControllerSet::Motor`](crate::CharacterControllerSet::Motor)
    /// so that the after-update reconciliation sees post-move state.
    fn plugin() -> impl Plugin;

    /// Read the motor's grounding report for an entity.
    fn grounding(world: &World, entity: Entity) -> GroundingReport;

    /// Get the current velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec3;

    /// Set the velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3);

    /// Get the current rotation of an entity.
    fn get_rotation(world: &World, entity: Entity) -> Quat;

    /// Set the rotation of an entity.
    fn set_rotation(world: &mut World, entity: Entity, rotation: Quat);

    /// Make the motor skip ground probing/snapping on its next update.
    ///
    /// Without this, a jump impulse would be cancelled immediately by the
    /// motor snapping the character back onto the ground.
    fn force_unground(world: &mut World, entity: Entity);

    /// Sweep a sphere through the world and return every hit within
    /// `max_distance`, unordered. Used by the orbit camera for obstruction
    /// checks.
    ///
    /// `mask` is a backend-defined collision-layer filter; backends that do
    /// not support layers may ignore it.
    fn sphere_cast(
        world: &World,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
    ) -> Vec<SphereCastHit>;

    /// The character's up axis, derived from its current rotation.
    fn character_up(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.rotation * Vec3::Y)
            .unwrap_or(Vec3::Y)
    }

    /// The character's forward axis, derived from its current rotation.
    fn character_forward(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<Transform>(entity)
            .map(|t| t.rotation * Vec3::NEG_Z)
            .unwrap_or(Vec3::NEG_Z)
    }
}

/// Empty plugin for backends that don't need additional setup.
pub struct NoOpBackendPlugin;

impl Plugin for NoOpBackendPlugin {
    fn build(&self, _app: &mut App) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounding_report_default_is_airborne() {
        let report = GroundingReport::default();
        assert!(!report.is_stable_on_ground);
        assert!(!report.found_any_ground);
        assert_eq!(report.ground_normal, Vec3::Y);
    }

    #[test]
    fn grounding_report_stable() {
        let report = GroundingReport::stable();
        assert!(report.is_stable_on_ground);
        assert!(report.found_any_ground);
    }

    #[test]
    fn grounding_report_sliding_normalizes() {
        let report = GroundingReport::sliding(Vec3::new(0.0, 2.0, 0.0));
        assert!(report.found_any_ground);
        assert!(!report.is_stable_on_ground);
        assert!((report.ground_normal - Vec3::Y).length() < 1e-6);
    }

    #[test]
    fn sphere_cast_hit_new() {
        let hit = SphereCastHit::new(5.0, None);
        assert_eq!(hit.distance, 5.0);
        assert!(hit.entity.is_none());
    }
}
