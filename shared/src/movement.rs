//! Per-tick movement for the locally-controlled avatar.
//!
//! [`step_movement`] is a pure function: it takes the current pose and control
//! state and returns a value record describing the new pose, the jump impulse
//! to fire, and the animation directive. The caller commits the result to the
//! render model and the physics body together (never independently) and emits
//! the network update at most once per tick.

use crate::config::GameConfig;
use crate::constants::{ANIM_COEFFICIENT, BLOCK_PROXIMITY_RADIUS, INPUT_COEFFICIENT};
use crate::controls::Controls;
use crate::transform::{Transform, Vec3};

/// Inputs for one movement tick.
#[derive(Clone, Copy, Debug)]
pub struct StepInput<'a> {
    /// Current avatar pose.
    pub transform: Transform,
    /// Whether the avatar is already mid-jump (debounces the impulse).
    pub jumping: bool,
    pub config: &'a GameConfig,
    /// Elapsed frame time in seconds. Only the animation advance scales with
    /// it; displacement is per-tick.
    pub delta: f32,
    /// Centers of nearby dynamic blocks used for the proximity gate.
    pub block_positions: &'a [Vec3],
    pub controls: Controls,
    /// Movement is a no-op entirely while the client has no input focus.
    pub focused: bool,
}

/// What the animation mixer should do after this tick. Purely cosmetic.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimationDirective {
    /// Advance the run clip by `step` and keep it playing.
    Advance { step: f32 },
    /// Stop the run clip.
    Stop,
}

/// Output of one movement tick.
#[derive(Clone, Copy, Debug)]
pub struct StepOutput {
    /// New pose. Equal to the input pose when nothing moved.
    pub transform: Transform,
    /// True when translation or rotation changed; gates the commit/emit.
    pub moved: bool,
    /// Upward impulse magnitude to apply, at most once per jump. The caller
    /// sets the jumping flag when firing it; clearing the flag on landing is
    /// an external concern.
    pub jump_impulse: Option<f32>,
    pub animation: AnimationDirective,
}

/// Advance the avatar one tick from the current control state.
pub fn step_movement(input: StepInput<'_>) -> StepOutput {
    let StepInput {
        transform,
        jumping,
        config,
        delta,
        block_positions,
        controls,
        focused,
    } = input;

    if !focused {
        return StepOutput {
            transform,
            moved: false,
            jump_impulse: None,
            animation: AnimationDirective::Stop,
        };
    }

    let mut next = transform;
    let mut moved = false;

    // Forward/backward apply in sequence; simultaneous up+down is allowed and
    // cancels out only coincidentally.
    let step_len = config.move_speed * INPUT_COEFFICIENT;
    if controls.up {
        let candidate = next.translation + next.forward() * step_len;
        if !near_any_block(candidate, block_positions) {
            next.translation = candidate;
            moved = true;
        }
    }
    if controls.down {
        let candidate = next.translation - next.forward() * step_len;
        if !near_any_block(candidate, block_positions) {
            next.translation = candidate;
            moved = true;
        }
    }

    if controls.left {
        next.yaw += config.rotate_speed * INPUT_COEFFICIENT;
        moved = true;
    }
    if controls.right {
        next.yaw -= config.rotate_speed * INPUT_COEFFICIENT;
        moved = true;
    }

    let jump_impulse = if controls.jump && !jumping {
        Some(config.jump_speed * INPUT_COEFFICIENT)
    } else {
        None
    };

    // Zero-delta ticks still evaluate controls but never advance the clip.
    let animation = if controls.any_active() && delta > 0.0 {
        AnimationDirective::Advance {
            step: delta * config.move_speed * ANIM_COEFFICIENT,
        }
    } else {
        AnimationDirective::Stop
    };

    StepOutput {
        transform: next,
        moved,
        jump_impulse,
        animation,
    }
}

/// Binary go/no-go proximity gate: is the candidate position within the block
/// radius of any block center?
#[inline]
fn near_any_block(candidate: Vec3, blocks: &[Vec3]) -> bool {
    blocks
        .iter()
        .any(|block| (block - candidate).norm() < BLOCK_PROXIMITY_RADIUS)
}
