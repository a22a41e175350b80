//! The per-frame character update cycle.
//!
//! This module binds motion, jump, and orientation to the motor backend in
//! a fixed order: inputs are buffered, rotation updates (the only point the
//! facing changes), velocity updates (the only point velocity changes,
//! motion integration then jump check), and, once the motor has moved the
//! character, the jump state reconciles. Velocity and rotation flow
//! through explicit return values, so the single-writer contract is
//! enforced structurally rather than by convention.

use bevy::log::debug;
use bevy::prelude::*;

use crate::backend::CharacterMotorBackend;
use crate::config::{JumpConfig, MovementConfig};
use crate::intent::{world_look_vector, world_move_vector, PlayerInputSnapshot};
use crate::jump::JumpState;
use crate::{motion, orientation};

/// Core character controller component.
///
/// Buffers the world-space move and look vectors derived from the current
/// input snapshot; the update cycle reads them every fixed tick.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct CharacterController {
    pub(crate) move_input: Vec3,
    pub(crate) look_input: Vec3,
}

impl CharacterController {
    /// Create a controller with no buffered intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer the world-space intent vectors for this frame.
    ///
    /// Move input is magnitude-clamped and rotated into the camera's planar
    /// frame; look input is the camera's planar forward.
    pub fn set_inputs(&mut self, snapshot: &PlayerInputSnapshot, up: Vec3) {
        self.move_input = world_move_vector(snapshot, up);
        self.look_input = world_look_vector(snapshot, up);
    }

    /// The buffered world-space move intent (magnitude <= 1).
    pub fn move_input(&self) -> Vec3 {
        self.move_input
    }

    /// The buffered world-space look direction.
    pub fn look_input(&self) -> Vec3 {
        self.look_input
    }
}

/// The motor reported a ground contact for a character. Pass-through
/// extension point; the controller itself does not react to it.
#[derive(Event, Debug, Clone, Copy)]
pub struct GroundHitEvent {
    pub character: Entity,
    pub collider: Option<Entity>,
    pub point: Vec3,
    pub normal: Vec3,
}

/// The motor reported a hit during its movement sweep. Pass-through
/// extension point; the controller itself does not react to it.
#[derive(Event, Debug, Clone, Copy)]
pub struct MovementHitEvent {
    pub character: Entity,
    pub collider: Option<Entity>,
    pub point: Vec3,
    pub normal: Vec3,
}

/// The motor detected a discrete (overlap) collision. Pass-through
/// extension point; the controller itself does not react to it.
#[derive(Event, Debug, Clone, Copy)]
pub struct DiscreteCollisionEvent {
    pub character: Entity,
    pub collider: Option<Entity>,
}

/// Buffer each character's intent vectors from its input snapshot and
/// latch jump presses. Consumes the snapshot's jump edge.
pub fn apply_player_inputs(
    mut query: Query<(
        &mut CharacterController,
        &mut PlayerInputSnapshot,
        &mut JumpState,
        &Transform,
    )>,
) {
    for (mut controller, mut snapshot, mut jump, transform) in &mut query {
        let up = transform.rotation * Vec3::Y;
        controller.set_inputs(&snapshot, up);
        if snapshot.jump_pressed {
            jump.press();
            snapshot.jump_pressed = false;
        }
    }
}

/// Rotation and velocity update for every character, in motor callback
/// order. Runs before the backend's own integration step.
pub fn character_update_cycle<B: CharacterMotorBackend>(world: &mut World) {
    let dt = fixed_delta(world);
    if dt <= 0.0 {
        return;
    }

    let entities: Vec<(Entity, CharacterController, MovementConfig, Option<JumpConfig>)> = world
        .query::<(
            Entity,
            &CharacterController,
            &MovementConfig,
            Option<&JumpConfig>,
        )>()
        .iter(world)
        .map(|(entity, controller, movement, jump)| (entity, *controller, *movement, jump.copied()))
        .collect();

    for (entity, controller, movement, jump_config) in entities {
        let grounding = B::grounding(world, entity);
        let up = B::character_up(world, entity);

        // Rotation: the only place the facing changes.
        let rotation = B::get_rotation(world, entity);
        let rotation = orientation::update_rotation(
            rotation,
            controller.look_input,
            up,
            movement.turn_speed,
            dt,
        );
        B::set_rotation(world, entity, rotation);

        // Velocity: motion integration by grounding mode, then the jump
        // check on the integrated result.
        let velocity = B::get_velocity(world, entity);
        let mut velocity = if grounding.is_stable_on_ground {
            motion::integrate_ground(
                velocity,
                controller.move_input,
                grounding.ground_normal,
                up,
                &movement.ground,
                dt,
            )
        } else {
            motion::integrate_air(
                velocity,
                controller.move_input,
                up,
                movement.gravity,
                &movement.air,
                dt,
            )
        };

        if let (Some(jump_config), Some(mut jump_state)) =
            (jump_config, world.get::<JumpState>(entity).copied())
        {
            if let Some(jumped) = jump_state.check_jump(velocity, &grounding, up, &jump_config) {
                velocity = jumped;
                // Skip ground snapping next motor update, or the impulse
                // would be cancelled immediately.
                B::force_unground(world, entity);
                debug!(
                    "character {entity} jump impulse fired (count {})",
                    jump_state.current_count
                );
            }
            if let Some(mut state) = world.get_mut::<JumpState>(entity) {
                *state = jump_state;
            }
        }

        B::set_velocity(world, entity, velocity);
    }
}

/// Post-move reconciliation: advance the jump timers against the motor's
/// fresh grounding report. Runs after the backend's integration step.
pub fn character_after_update<B: CharacterMotorBackend>(world: &mut World) {
    let dt = fixed_delta(world);
    if dt <= 0.0 {
        return;
    }

    let entities: Vec<(Entity, JumpConfig)> = world
        .query_filtered::<(Entity, &JumpConfig), With<JumpState>>()
        .iter(world)
        .map(|(entity, config)| (entity, *config))
        .collect();

    for (entity, config) in entities {
        let grounding = B::grounding(world, entity);
        if let Some(mut state) = world.get_mut::<JumpState>(entity) {
            state.finish_frame(&grounding, &config, dt);
        }
    }
}

fn fixed_delta(world: &World) -> f32 {
    world
        .get_resource::<Time<Fixed>>()
        .map(|time| time.delta_secs())
        .unwrap_or(0.0)
}
