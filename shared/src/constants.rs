use std::time::Duration;

/// Per-tick coefficient applied to every tuning speed before it becomes a
/// displacement, rotation, or impulse.
///
/// Convention: a tuning speed of `40` with this coefficient moves the avatar
/// `0.4` world units per simulation tick. Displacement is deliberately
/// per-tick rather than per-second, matching the render-loop coupling the
/// tuning values were chosen for.
pub const INPUT_COEFFICIENT: f32 = 0.01;

/// Coefficient applied on top of the movement speed when advancing the
/// animation mixer: `delta * move_speed * ANIM_COEFFICIENT`.
pub const ANIM_COEFFICIENT: f32 = 0.1;

/// Center-to-center proximity radius (world units) that gates forward and
/// backward movement against blocks.
///
/// This is a coarse broad-phase test on purpose: a candidate position closer
/// than this to any block center is rejected outright. No swept or
/// shape-aware query is involved.
pub const BLOCK_PROXIMITY_RADIUS: f32 = 2.5;

/// Default minimum interval between outbound `user:change` pushes (~30 Hz).
pub const UPDATE_SEND_INTERVAL: Duration = Duration::from_millis(33);

/// Fastest outbound rate a session may be configured with (~60 Hz).
pub const UPDATE_SEND_INTERVAL_MIN: Duration = Duration::from_millis(16);

/// Guest names are synthesized as `Guest<0..GUEST_NAME_RANGE>`.
pub const GUEST_NAME_RANGE: u32 = 1000;

/// Height (world units) at which a freshly spawned avatar is placed.
pub const AVATAR_SPAWN_HEIGHT: f32 = 1.0;

/// Fixed timestep used when advancing the physics pipeline (seconds).
pub const PHYSICS_DT: f32 = 1.0 / 60.0;
