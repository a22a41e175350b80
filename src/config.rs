//! Controller configuration components.
//!
//! All tunables are load-time constants grouped per concern: motion
//! coefficients per mode, and jump timing/budget. Defaults match a
//! responsive third-person character (ground speed cap 12, single jump,
//! 0.1 s grace windows either side of landing).

use bevy::prelude::*;

/// Acceleration/friction/speed-cap triple for one movement mode.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionParams {
    /// Acceleration rate along the input direction (units/s^2).
    pub acceleration: f32,
    /// Friction coefficient: speed drops by `speed * friction * dt` each frame.
    pub friction: f32,
    /// Speed cap along the input direction (units/s).
    pub max_speed: f32,
}

impl MotionParams {
    /// Create a new parameter set. Negative values are clamped to zero.
    pub fn new(acceleration: f32, friction: f32, max_speed: f32) -> Self {
        Self {
            acceleration: acceleration.max(0.0),
            friction: friction.max(0.0),
            max_speed: max_speed.max(0.0),
        }
    }
}

/// Movement tunables for a character.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementConfig {
    /// Coefficients applied while stable on ground.
    pub ground: MotionParams,
    /// Coefficients applied to the planar velocity component while airborne.
    pub air: MotionParams,
    /// Gravity acceleration, added every airborne frame.
    pub gravity: Vec3,
    /// Convergence rate of the facing toward the look direction
    /// (exponential smoothing, frame-rate independent).
    pub turn_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            ground: MotionParams::new(10.0, 6.0, 12.0),
            air: MotionParams::new(1.0, 2.0, 10.0),
            gravity: Vec3::new(0.0, -9.81, 0.0),
            turn_speed: 50.0,
        }
    }
}

impl MovementConfig {
    /// Config tuned for responsive player control. Same as [`Default`];
    /// kept as an explicit entry point for callers that want to start
    /// from the player baseline and tweak.
    pub fn player() -> Self {
        Self::default()
    }

    /// Builder: set the ground motion parameters.
    pub fn with_ground(mut self, params: MotionParams) -> Self {
        self.ground = params;
        self
    }

    /// Builder: set the air motion parameters.
    pub fn with_air(mut self, params: MotionParams) -> Self {
        self.air = params;
        self
    }

    /// Builder: set the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Builder: set the facing turn speed.
    pub fn with_turn_speed(mut self, turn_speed: f32) -> Self {
        self.turn_speed = turn_speed;
        self
    }
}

/// Jump tunables for a character.
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JumpConfig {
    /// Speed added along the jump direction when the impulse fires.
    pub jump_speed: f32,
    /// Total jump budget before the character must touch ground again.
    /// Always at least 1; values above 1 enable multi-jumping.
    pub max_jump_count: u32,
    /// If true, touching any ground (even unstable/sliding contact) makes
    /// the character eligible for a ground jump.
    pub allow_jumping_when_sliding: bool,
    /// A press this long before landing still fires once grounded.
    pub pre_grounding_grace: f32,
    /// A press this long after leaving ground still counts as a ground jump.
    pub post_grounding_grace: f32,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            jump_speed: 4.0,
            max_jump_count: 1,
            allow_jumping_when_sliding: false,
            pre_grounding_grace: 0.1,
            post_grounding_grace: 0.1,
        }
    }
}

impl JumpConfig {
    /// Builder: set the jump impulse speed.
    pub fn with_jump_speed(mut self, speed: f32) -> Self {
        self.jump_speed = speed;
        self
    }

    /// Builder: set the jump budget. Clamped to at least 1.
    pub fn with_max_jump_count(mut self, count: u32) -> Self {
        self.max_jump_count = count.max(1);
        self
    }

    /// Builder: allow jumping off unstable (sliding) contact.
    pub fn with_jumping_when_sliding(mut self, allow: bool) -> Self {
        self.allow_jumping_when_sliding = allow;
        self
    }

    /// Builder: set the pre-grounding grace window (seconds).
    pub fn with_pre_grounding_grace(mut self, seconds: f32) -> Self {
        self.pre_grounding_grace = seconds.max(0.0);
        self
    }

    /// Builder: set the post-grounding grace window (seconds).
    pub fn with_post_grounding_grace(mut self, seconds: f32) -> Self {
        self.post_grounding_grace = seconds.max(0.0);
        self
    }
}
