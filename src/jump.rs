//! Jump state machine.
//!
//! A press is latched as [`JumpPhase::Requested`] and stays latched until
//! the impulse fires or the pre-grounding grace window expires. Two timers
//! give the machine its hysteresis: `time_since_requested` implements the
//! pre-grounding grace (press shortly before landing still fires), and
//! `time_since_allowed` implements the post-grounding grace (press shortly
//! after walking off a ledge still counts as a ground jump).
//!
//! The ordering quirks of the update are load-bearing: the pre-emptive
//! count increment in [`JumpState::check_jump`] means stepping off a ledge
//! outside the post-grounding grace consumes the ground jump slot, so with
//! `max_jump_count == 1` no air jump is available afterwards.

use bevy::prelude::*;

use crate::backend::GroundingReport;
use crate::config::JumpConfig;

/// Where the jump machine is within its press/fire/reset cycle.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JumpPhase {
    /// No press pending.
    #[default]
    Idle,
    /// A press is latched but the impulse has not fired.
    Requested,
    /// The impulse fired this frame; cleared by [`JumpState::finish_frame`].
    Executed,
}

/// Mutable jump state, persisted across frames for the character's lifetime.
///
/// Invariant: with `max_jump_count >= 1` (enforced by [`JumpConfig`]),
/// `current_count` stays within `[0, max_jump_count]` after every frame.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct JumpState {
    /// Current phase of the machine.
    pub phase: JumpPhase,
    /// Jumps consumed since the character was last grounded long enough.
    pub current_count: u32,
    /// Seconds since the most recent press. Compared against the
    /// pre-grounding grace window.
    pub time_since_requested: f32,
    /// Seconds since the character was last eligible to jump from ground.
    /// Compared against the post-grounding grace window.
    pub time_since_allowed: f32,
}

impl JumpState {
    /// Latch a jump press and restart the request timer.
    ///
    /// A press arriving in the same frame as an executed jump is swallowed,
    /// matching the sticky-press semantics: the executed jump already
    /// consumed it.
    pub fn press(&mut self) {
        self.time_since_requested = 0.0;
        if self.phase != JumpPhase::Executed {
            self.phase = JumpPhase::Requested;
        }
    }

    /// Whether a press is currently latched.
    pub fn is_requested(&self) -> bool {
        self.phase == JumpPhase::Requested
    }

    /// Whether the impulse fired this frame.
    pub fn executed_this_frame(&self) -> bool {
        self.phase == JumpPhase::Executed
    }

    /// Run the pre-impulse check and, if allowed, fire the jump.
    ///
    /// Called during the velocity update, after motion integration. Returns
    /// the post-impulse velocity when the jump fired; the caller must then
    /// force the motor to unground. Returns `None` otherwise.
    ///
    /// A first jump attempted while fully airborne and outside the
    /// post-grounding grace pre-emptively consumes the ground jump slot
    /// before the budget check.
    pub fn check_jump(
        &mut self,
        velocity: Vec3,
        grounding: &GroundingReport,
        up: Vec3,
        config: &JumpConfig,
    ) -> Option<Vec3> {
        if self.phase != JumpPhase::Requested {
            return None;
        }

        let is_first_jump = self.current_count == 0;
        let is_in_air = !grounding.found_any_ground
            && self.time_since_allowed > config.post_grounding_grace;
        if is_first_jump && is_in_air {
            self.current_count += 1;
        }

        if self.current_count < config.max_jump_count {
            let velocity = jump_impulse(velocity, grounding, up, config.jump_speed);
            self.current_count += 1;
            self.phase = JumpPhase::Executed;
            Some(velocity)
        } else {
            None
        }
    }

    /// Reconcile after the motor has integrated the frame.
    ///
    /// Clears the executed flag, resets the jump budget when the character
    /// is eligible to jump from its current ground, drops stale presses
    /// whose pre-grounding grace has expired, and advances both timers.
    pub fn finish_frame(&mut self, grounding: &GroundingReport, config: &JumpConfig, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.time_since_requested += dt;

        if self.phase == JumpPhase::Executed {
            self.phase = JumpPhase::Idle;
        } else if ground_eligible(grounding, config) {
            self.current_count = 0;
            self.time_since_allowed = 0.0;

            let within_pre_grounding_grace =
                self.time_since_requested < config.pre_grounding_grace;
            if self.phase == JumpPhase::Requested && !within_pre_grounding_grace {
                self.phase = JumpPhase::Idle;
            }
        } else {
            self.time_since_allowed += dt;
        }
    }

    /// Drop any latched press and, when eligible, restore the jump budget.
    pub fn reset(&mut self, grounding: &GroundingReport, config: &JumpConfig) {
        self.phase = JumpPhase::Idle;
        if ground_eligible(grounding, config) {
            self.current_count = 0;
            self.time_since_allowed = 0.0;
        }
    }
}

/// Whether the current grounding makes the character eligible for a ground
/// jump: stable contact, or any contact when jumping-while-sliding is on.
pub fn ground_eligible(grounding: &GroundingReport, config: &JumpConfig) -> bool {
    if config.allow_jumping_when_sliding {
        grounding.found_any_ground
    } else {
        grounding.is_stable_on_ground
    }
}

/// Compute the post-impulse velocity.
///
/// The jump direction is the character's up axis, except on unstable
/// contact where the ground normal pushes the character away from the
/// slope. The vertical component is zeroed first so residual fall speed
/// does not eat the impulse.
fn jump_impulse(velocity: Vec3, grounding: &GroundingReport, up: Vec3, jump_speed: f32) -> Vec3 {
    let direction = if grounding.found_any_ground && !grounding.is_stable_on_ground {
        grounding.ground_normal
    } else {
        up
    };

    let without_vertical = velocity - up * velocity.dot(up);
    without_vertical + direction * jump_speed
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn config() -> JumpConfig {
        JumpConfig::default()
    }

    fn frame(
        state: &mut JumpState,
        velocity: Vec3,
        grounding: &GroundingReport,
        config: &JumpConfig,
    ) -> (Vec3, bool) {
        let fired = state.check_jump(velocity, grounding, Vec3::Y, config);
        let velocity = fired.unwrap_or(velocity);
        state.finish_frame(grounding, config, DT);
        (velocity, fired.is_some())
    }

    #[test]
    fn grounded_press_fires_once() {
        let mut state = JumpState::default();
        let config = config();
        let grounded = GroundingReport::stable();

        state.press();
        let (velocity, fired) = frame(&mut state, Vec3::ZERO, &grounded, &config);
        assert!(fired);
        assert!((velocity.y - config.jump_speed).abs() < 1e-6);
        assert_eq!(state.phase, JumpPhase::Idle);

        // Press consumed: the next frame must not fire again.
        let (_, fired) = frame(&mut state, velocity, &grounded, &config);
        assert!(!fired);
    }

    #[test]
    fn impulse_cancels_residual_fall() {
        let mut state = JumpState::default();
        let config = config();
        let grounded = GroundingReport::stable();

        state.press();
        let falling = Vec3::new(2.0, -10.0, 0.0);
        let (velocity, fired) = frame(&mut state, falling, &grounded, &config);
        assert!(fired);
        // Downward momentum zeroed before the impulse, planar kept.
        assert!((velocity.y - config.jump_speed).abs() < 1e-6);
        assert!((velocity.x - 2.0).abs() < 1e-6);
    }

    #[test]
    fn unstable_contact_jumps_along_ground_normal() {
        let mut state = JumpState::default();
        let config = JumpConfig::default().with_jumping_when_sliding(true);
        let normal = Vec3::new(-1.0, 1.0, 0.0).normalize();
        let sliding = GroundingReport::sliding(normal);

        state.press();
        let (velocity, fired) = frame(&mut state, Vec3::ZERO, &sliding, &config);
        assert!(fired);
        assert!(velocity.normalize().dot(normal) > 0.99);
    }

    #[test]
    fn airborne_press_is_denied_with_single_jump() {
        let mut state = JumpState::default();
        let config = config();
        let airborne = GroundingReport::airborne();

        // Well past the post-grounding grace.
        for _ in 0..30 {
            state.finish_frame(&airborne, &config, DT);
        }

        state.press();
        let (_, fired) = frame(&mut state, Vec3::ZERO, &airborne, &config);
        assert!(!fired);
        // Stepping off a ledge consumed the ground jump slot.
        assert_eq!(state.current_count, 1);
    }

    #[test]
    fn post_grounding_grace_allows_late_ground_jump() {
        let mut state = JumpState::default();
        let config = config();
        let grounded = GroundingReport::stable();
        let airborne = GroundingReport::airborne();

        // Grounded for a while, then walk off the ledge.
        for _ in 0..10 {
            state.finish_frame(&grounded, &config, DT);
        }
        // Three airborne frames: 3 * DT = 0.05 s, within the 0.1 s grace.
        for _ in 0..3 {
            state.finish_frame(&airborne, &config, DT);
        }

        state.press();
        let (_, fired) = frame(&mut state, Vec3::ZERO, &airborne, &config);
        assert!(fired, "press within post-grounding grace must fire");
        assert_eq!(state.current_count, 1);
    }

    #[test]
    fn press_after_post_grounding_grace_is_an_air_jump() {
        let mut state = JumpState::default();
        let config = JumpConfig::default().with_max_jump_count(2);
        let grounded = GroundingReport::stable();
        let airborne = GroundingReport::airborne();

        for _ in 0..10 {
            state.finish_frame(&grounded, &config, DT);
        }
        // Past the grace: 10 * DT ~ 0.167 s > 0.1 s.
        for _ in 0..10 {
            state.finish_frame(&airborne, &config, DT);
        }

        state.press();
        let (_, fired) = frame(&mut state, Vec3::ZERO, &airborne, &config);
        // Ground slot consumed pre-emptively, then the second slot fires.
        assert!(fired);
        assert_eq!(state.current_count, 2);

        // Budget exhausted.
        state.press();
        let (_, fired) = frame(&mut state, Vec3::ZERO, &airborne, &config);
        assert!(!fired);
    }

    #[test]
    fn pre_grounding_grace_fires_on_landing() {
        let mut state = JumpState::default();
        let config = config();
        let grounded = GroundingReport::stable();
        let airborne = GroundingReport::airborne();

        // Airborne with a jump already spent.
        state.current_count = 1;
        for _ in 0..10 {
            state.finish_frame(&airborne, &config, DT);
        }

        // Press 2 frames (~0.033 s < 0.1 s grace) before landing.
        state.press();
        let (_, fired) = frame(&mut state, Vec3::ZERO, &airborne, &config);
        assert!(!fired);
        let (_, fired) = frame(&mut state, Vec3::ZERO, &airborne, &config);
        assert!(!fired);
        assert!(state.is_requested(), "press must stay latched through the fall");

        // Land: the budget resets during this frame's reconciliation, and
        // the latched press fires on the following velocity update.
        let (_, fired) = frame(&mut state, Vec3::ZERO, &grounded, &config);
        let fired_late = if fired {
            true
        } else {
            let (_, fired) = frame(&mut state, Vec3::ZERO, &grounded, &config);
            fired
        };
        assert!(fired_late, "buffered press must fire exactly once on landing");

        let (_, fired) = frame(&mut state, Vec3::ZERO, &grounded, &config);
        assert!(!fired, "buffered press must not fire twice");
    }

    #[test]
    fn stale_press_is_dropped_after_pre_grounding_grace() {
        let mut state = JumpState::default();
        let config = config();
        let grounded = GroundingReport::stable();
        let airborne = GroundingReport::airborne();

        // Airborne with the budget spent; press far too early.
        state.current_count = 1;
        state.press();
        for _ in 0..30 {
            // 0.5 s falling, way past the 0.1 s pre-grounding grace.
            state.check_jump(Vec3::ZERO, &airborne, Vec3::Y, &config);
            state.finish_frame(&airborne, &config, DT);
        }

        // Landing must clear the stale press without firing.
        let (_, fired) = frame(&mut state, Vec3::ZERO, &grounded, &config);
        assert!(!fired);
        assert_eq!(state.phase, JumpPhase::Idle);
        let (_, fired) = frame(&mut state, Vec3::ZERO, &grounded, &config);
        assert!(!fired);
    }

    #[test]
    fn count_invariant_holds_over_arbitrary_sequences() {
        let config = JumpConfig::default().with_max_jump_count(2);
        let grounded = GroundingReport::stable();
        let airborne = GroundingReport::airborne();

        let mut state = JumpState::default();
        // Pseudo-random-ish press/ground pattern.
        for i in 0..500 {
            if i % 7 == 0 || i % 11 == 3 {
                state.press();
            }
            let grounding = if (i / 13) % 2 == 0 { &grounded } else { &airborne };
            state.check_jump(Vec3::ZERO, grounding, Vec3::Y, &config);
            state.finish_frame(grounding, &config, DT);

            assert!(
                state.current_count <= config.max_jump_count,
                "count {} exceeded budget at step {}",
                state.current_count,
                i
            );
        }
    }

    #[test]
    fn sliding_eligibility_follows_config() {
        let sliding = GroundingReport::sliding(Vec3::new(1.0, 1.0, 0.0).normalize());
        assert!(!ground_eligible(&sliding, &JumpConfig::default()));
        assert!(ground_eligible(
            &sliding,
            &JumpConfig::default().with_jumping_when_sliding(true)
        ));
    }

    #[test]
    fn reset_drops_press_and_restores_budget_on_ground() {
        let mut state = JumpState {
            phase: JumpPhase::Requested,
            current_count: 1,
            time_since_requested: 0.0,
            time_since_allowed: 0.5,
        };
        state.reset(&GroundingReport::stable(), &config());
        assert_eq!(state.phase, JumpPhase::Idle);
        assert_eq!(state.current_count, 0);
        assert_eq!(state.time_since_allowed, 0.0);

        // Airborne reset keeps the spent count.
        let mut state = JumpState {
            phase: JumpPhase::Requested,
            current_count: 1,
            ..Default::default()
        };
        state.reset(&GroundingReport::airborne(), &config());
        assert_eq!(state.phase, JumpPhase::Idle);
        assert_eq!(state.current_count, 1);
    }

    #[test]
    fn finish_frame_nonpositive_dt_is_noop() {
        let mut state = JumpState {
            phase: JumpPhase::Executed,
            current_count: 1,
            time_since_requested: 0.3,
            time_since_allowed: 0.2,
        };
        let before = state;
        state.finish_frame(&GroundingReport::stable(), &config(), 0.0);
        assert_eq!(state.phase, before.phase);
        assert_eq!(state.time_since_requested, before.time_since_requested);
    }
}
