use crate::transform::Vec3;

/// Process-wide tuning values, initialized once at startup.
///
/// The movement step treats this as read-only. All speeds are per-tick
/// magnitudes once scaled by [`crate::constants::INPUT_COEFFICIENT`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameConfig {
    /// Forward/backward speed.
    pub move_speed: f32,
    /// Yaw speed (radians, pre-coefficient).
    pub rotate_speed: f32,
    /// Upward impulse magnitude for a jump (pre-coefficient).
    pub jump_speed: f32,
    /// Downward gravity magnitude fed to the physics world (m/s^2).
    pub gravity: f32,
    /// Side length of the square ground plane (world units).
    pub world_size: f32,
    /// Whether world-build records debug outlines for collider bodies.
    pub show_body_helpers: bool,
    /// Third-person camera offset in the avatar's local frame.
    pub camera_offset: Vec3,
    /// Third-person camera aim point in the avatar's local frame.
    pub camera_look_at: Vec3,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            move_speed: 40.0,
            rotate_speed: 5.0,
            jump_speed: 45.0,
            gravity: 25.0,
            world_size: 500.0,
            show_body_helpers: true,
            camera_offset: Vec3::new(0.0, 4.0, -22.0),
            camera_look_at: Vec3::new(0.0, 10.0, 50.0),
        }
    }
}
