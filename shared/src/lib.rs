pub mod config;
pub mod constants;
pub mod controls;
pub mod movement;
pub mod physics;
pub mod protocol;
pub mod transform;

pub use config::GameConfig;
pub use constants::{
    ANIM_COEFFICIENT, AVATAR_SPAWN_HEIGHT, BLOCK_PROXIMITY_RADIUS, GUEST_NAME_RANGE,
    INPUT_COEFFICIENT, PHYSICS_DT, UPDATE_SEND_INTERVAL, UPDATE_SEND_INTERVAL_MIN,
};
pub use controls::Controls;
pub use movement::{AnimationDirective, StepInput, StepOutput, step_movement};
pub use physics::{BodyKind, BodyOptions, BodyShape, BodySize, PhysicsHandles, PhysicsWorld};
pub use transform::{
    Quat, Transform, Vec3, apply_local_offset, forward_from_yaw, yaw_from_euler, yaw_quat,
    yaw_to_euler,
};

// Re-export Rapier so downstream crates can use Rapier types (handles and
// vectors in particular) without depending on `rapier3d` directly.
pub use rapier3d;
