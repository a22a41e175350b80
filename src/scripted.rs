//! Scripted reference motor.
//!
//! A minimal [`CharacterMotorBackend`] with no collision resolution:
//! grounding state and sphere-cast hits are supplied by test or demo code
//! through [`ScriptedGrounding`] and [`ScriptedSphereCastHits`], and the
//! integration step simply advances transforms by the stored velocity.
//! It exists so controller behavior can be exercised without a physics
//! engine; real games plug in a physics-backed motor instead.

use bevy::prelude::*;

use crate::backend::{CharacterMotorBackend, GroundingReport, SphereCastHit};
use crate::CharacterControllerSet;

/// Scripted grounding state for one character.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct ScriptedGrounding(pub GroundingReport);

impl ScriptedGrounding {
    pub fn stable() -> Self {
        Self(GroundingReport::stable())
    }

    pub fn airborne() -> Self {
        Self(GroundingReport::airborne())
    }

    pub fn sliding(normal: Vec3) -> Self {
        Self(GroundingReport::sliding(normal))
    }
}

/// Velocity integrated by the scripted motor each fixed step.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct MotorVelocity(pub Vec3);

/// Hits the scripted motor returns from sphere casts, regardless of the
/// cast origin or direction. Hits beyond the cast's max distance are
/// filtered out.
#[derive(Resource, Debug, Clone, Default)]
pub struct ScriptedSphereCastHits(pub Vec<SphereCastHit>);

/// The scripted backend marker type.
pub struct ScriptedMotor;

impl CharacterMotorBackend for ScriptedMotor {
    fn plugin() -> impl Plugin {
        ScriptedMotorPlugin
    }

    fn grounding(world: &World, entity: Entity) -> GroundingReport {
        world
            .get::<ScriptedGrounding>(entity)
            .map(|grounding| grounding.0)
            .unwrap_or_default()
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec3 {
        world
            .get::<MotorVelocity>(entity)
            .map(|velocity| velocity.0)
            .unwrap_or(Vec3::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec3) {
        if let Some(mut stored) = world.get_mut::<MotorVelocity>(entity) {
            stored.0 = velocity;
        }
    }

    fn get_rotation(world: &World, entity: Entity) -> Quat {
        world
            .get::<Transform>(entity)
            .map(|transform| transform.rotation)
            .unwrap_or(Quat::IDENTITY)
    }

    fn set_rotation(world: &mut World, entity: Entity, rotation: Quat) {
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.rotation = rotation;
        }
    }

    fn force_unground(world: &mut World, entity: Entity) {
        if let Some(mut grounding) = world.get_mut::<ScriptedGrounding>(entity) {
            grounding.0.is_stable_on_ground = false;
            grounding.0.found_any_ground = false;
        }
    }

    fn sphere_cast(
        world: &World,
        _origin: Vec3,
        _radius: f32,
        _direction: Vec3,
        max_distance: f32,
        _mask: u32,
    ) -> Vec<SphereCastHit> {
        world
            .get_resource::<ScriptedSphereCastHits>()
            .map(|hits| {
                hits.0
                    .iter()
                    .filter(|hit| hit.distance <= max_distance)
                    .copied()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Registers scripted motor components and its integration step.
pub struct ScriptedMotorPlugin;

impl Plugin for ScriptedMotorPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<ScriptedGrounding>()
            .register_type::<MotorVelocity>()
            .init_resource::<ScriptedSphereCastHits>()
            .add_systems(
                FixedUpdate,
                integrate_scripted_motion.in_set(CharacterControllerSet::Motor),
            );
    }
}

/// Advance transforms by the stored velocity. No collision response.
fn integrate_scripted_motion(
    time: Res<Time>,
    mut query: Query<(&MotorVelocity, &mut Transform)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }
    for (velocity, mut transform) in &mut query {
        transform.translation += velocity.0 * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_round_trips_through_backend() {
        let mut world = World::new();
        let entity = world.spawn(MotorVelocity::default()).id();

        ScriptedMotor::set_velocity(&mut world, entity, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(
            ScriptedMotor::get_velocity(&world, entity),
            Vec3::new(1.0, 2.0, 3.0)
        );
    }

    #[test]
    fn missing_components_fall_back_to_defaults() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();

        assert_eq!(ScriptedMotor::get_velocity(&world, entity), Vec3::ZERO);
        assert_eq!(ScriptedMotor::get_rotation(&world, entity), Quat::IDENTITY);
        let grounding = ScriptedMotor::grounding(&world, entity);
        assert!(!grounding.found_any_ground);
    }

    #[test]
    fn force_unground_clears_ground_flags() {
        let mut world = World::new();
        let entity = world.spawn(ScriptedGrounding::stable()).id();

        ScriptedMotor::force_unground(&mut world, entity);
        let grounding = ScriptedMotor::grounding(&world, entity);
        assert!(!grounding.is_stable_on_ground);
        assert!(!grounding.found_any_ground);
    }

    #[test]
    fn sphere_cast_filters_by_max_distance() {
        let mut world = World::new();
        world.insert_resource(ScriptedSphereCastHits(vec![
            SphereCastHit::new(2.0, None),
            SphereCastHit::new(6.0, None),
        ]));

        let hits = ScriptedMotor::sphere_cast(&world, Vec3::ZERO, 0.2, Vec3::Z, 4.0, u32::MAX);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].distance, 2.0);
    }
}
