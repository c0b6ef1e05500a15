/// Transient boolean control flags.
///
/// Recomputed on every input event (keyboard or gamepad), read once per
/// simulation tick, never persisted. Both input sources write into the same
/// record; the last writer wins per flag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub jump: bool,
}

impl Controls {
    /// True when any control flag is held.
    #[inline]
    pub fn any_active(&self) -> bool {
        self.left || self.right || self.up || self.down || self.jump
    }
}
