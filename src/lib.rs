//! # `orbit_character_controller`
//!
//! A Quake-style third-person character controller with an
//! obstruction-aware orbit camera, abstracted over the rigid-body motor.
//!
//! This crate provides a responsive, tuneable controller that:
//! - Accelerates with classic ground friction and capped air control
//! - Preserves speed across slope seams by reprojecting onto the surface
//! - Supports multi-jump with pre- and post-grounding grace windows
//! - Turns the character smoothly toward the camera's look direction
//! - Orbits a camera that zooms, follows, and pulls in around geometry
//! - Abstracts the motor so any physics engine can drive it
//!
//! ## Architecture
//!
//! Movement runs in `FixedUpdate` in a strict order:
//! 1. Buffered input snapshots become per-character intent
//! 2. The update cycle computes rotation, velocity, and jump impulses
//! 3. The motor backend integrates and resolves collisions
//! 4. Jump timers advance against the post-move grounding state
//!
//! The camera runs in `Update` at render rate, smoothing rotation, follow
//! position, and distance with frame-rate-independent exponential blends.
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use orbit_character_controller::prelude::*;
//!
//! // Components for a player character
//! let controller = CharacterController::new();
//! let movement = MovementConfig::player();
//! let jump = JumpConfig::default().with_max_jump_count(2);
//! let snapshot = PlayerInputSnapshot::default();
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod camera;
pub mod character;
pub mod config;
pub mod input;
pub mod intent;
pub mod jump;
pub mod motion;
pub mod orientation;
pub mod scripted;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::{CharacterMotorBackend, GroundingReport, SphereCastHit};
    pub use crate::camera::{CameraInput, OrbitCamera, OrbitCameraState};
    pub use crate::character::{
        CharacterController, DiscreteCollisionEvent, GroundHitEvent, MovementHitEvent,
    };
    pub use crate::config::{JumpConfig, MotionParams, MovementConfig};
    pub use crate::input::{ActionInput, AxisInput, AxisPairInput, ButtonEdge, InputBindings};
    pub use crate::intent::PlayerInputSnapshot;
    pub use crate::jump::JumpState;
    pub use crate::scripted::{MotorVelocity, ScriptedGrounding, ScriptedMotor};
    pub use crate::{CharacterControllerPlugin, CharacterControllerSet};
}

/// Fixed-update phases of the controller, chained in declaration order.
///
/// `BeforeUpdate` and `AfterUpdate` are empty extension points for game
/// systems that need to run against pre- or post-move state; the motor
/// backend schedules its integration in `Motor`.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterControllerSet {
    /// Buffered input becomes per-character intent.
    ApplyInputs,
    /// Extension point before the velocity update.
    BeforeUpdate,
    /// Rotation, velocity, and jump resolution.
    UpdateCycle,
    /// Motor integration and collision resolution.
    Motor,
    /// Jump timers advance against post-move grounding.
    AfterUpdate,
}

/// Main plugin for the character controller and orbit camera.
///
/// Generic over a motor backend `B`, which supplies grounding state,
/// velocity storage, and sphere casts. The bundled [`ScriptedMotor`]
/// backend integrates transforms directly with no collision response;
/// physics-engine motors implement [`CharacterMotorBackend`] themselves.
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use orbit_character_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(CharacterControllerPlugin::<ScriptedMotor>::default())
///     .run();
/// ```
///
/// [`ScriptedMotor`]: crate::scripted::ScriptedMotor
pub struct CharacterControllerPlugin<B: backend::CharacterMotorBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::CharacterMotorBackend> Default for CharacterControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::CharacterMotorBackend> Plugin for CharacterControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        // Register core types
        app.register_type::<character::CharacterController>();
        app.register_type::<config::MotionParams>();
        app.register_type::<config::MovementConfig>();
        app.register_type::<config::JumpConfig>();
        app.register_type::<intent::PlayerInputSnapshot>();
        app.register_type::<jump::JumpState>();
        app.register_type::<camera::OrbitCamera>();
        app.register_type::<camera::OrbitCameraState>();
        app.register_type::<camera::CameraInput>();

        app.init_resource::<input::InputBindings>();

        app.add_event::<input::AxisInput>();
        app.add_event::<input::AxisPairInput>();
        app.add_event::<input::ActionInput>();
        app.add_event::<character::GroundHitEvent>();
        app.add_event::<character::MovementHitEvent>();
        app.add_event::<character::DiscreteCollisionEvent>();

        // Add the motor backend plugin
        app.add_plugins(B::plugin());

        app.configure_sets(
            FixedUpdate,
            (
                CharacterControllerSet::ApplyInputs,
                CharacterControllerSet::BeforeUpdate,
                CharacterControllerSet::UpdateCycle,
                CharacterControllerSet::Motor,
                CharacterControllerSet::AfterUpdate,
            )
                .chain(),
        );

        // Route named input events and mirror camera look angles into
        // snapshots before the fixed step consumes them.
        app.add_systems(
            PreUpdate,
            (
                input::route_inputs,
                camera::sync_camera_rotation_to_snapshots,
            )
                .chain(),
        );

        app.add_systems(
            FixedUpdate,
            (
                character::apply_player_inputs.in_set(CharacterControllerSet::ApplyInputs),
                character::character_update_cycle::<B>.in_set(CharacterControllerSet::UpdateCycle),
                character::character_after_update::<B>.in_set(CharacterControllerSet::AfterUpdate),
            ),
        );

        app.add_systems(Update, camera::update_orbit_camera::<B>);
    }
}
