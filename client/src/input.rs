//! Raw input → control-flag mapping.
//!
//! Keyboard and gamepad both write into the same [`Controls`] record through
//! a fixed table; the last writer wins per flag and no source-priority
//! arbitration takes place.

use shared::Controls;

/// Pressed-state snapshot of the gamepad buttons movement cares about.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GamepadButtons {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// The accept/jump face button.
    pub a: bool,
}

/// Update one control flag from a raw key identifier. Unmapped keys are
/// ignored.
pub fn set_key_state(controls: &mut Controls, key: &str, pressed: bool) {
    match key {
        "ArrowLeft" | "a" => controls.left = pressed,
        "ArrowRight" | "d" => controls.right = pressed,
        "ArrowUp" | "w" => controls.up = pressed,
        "ArrowDown" | "s" => controls.down = pressed,
        // Browsers report the space bar as " "; accept the named form too.
        " " | "Space" => controls.jump = pressed,
        _ => {}
    }
}

/// Overwrite every control flag from a gamepad snapshot.
pub fn set_gamepad_buttons(controls: &mut Controls, buttons: &GamepadButtons) {
    controls.left = buttons.left;
    controls.right = buttons.right;
    controls.up = buttons.up;
    controls.down = buttons.down;
    controls.jump = buttons.a;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys_and_wasd_map_to_the_same_flags() {
        for (key, alias) in [
            ("ArrowLeft", "a"),
            ("ArrowRight", "d"),
            ("ArrowUp", "w"),
            ("ArrowDown", "s"),
        ] {
            let mut via_arrow = Controls::default();
            let mut via_letter = Controls::default();
            set_key_state(&mut via_arrow, key, true);
            set_key_state(&mut via_letter, alias, true);
            assert_eq!(via_arrow, via_letter, "{key} vs {alias}");
            assert!(via_arrow.any_active());
        }
    }

    #[test]
    fn space_maps_to_jump() {
        let mut controls = Controls::default();
        set_key_state(&mut controls, " ", true);
        assert!(controls.jump);
        set_key_state(&mut controls, " ", false);
        assert!(!controls.jump);
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        let mut controls = Controls::default();
        set_key_state(&mut controls, "Escape", true);
        set_key_state(&mut controls, "q", true);
        assert_eq!(controls, Controls::default());
    }

    #[test]
    fn release_clears_only_the_released_flag() {
        let mut controls = Controls::default();
        set_key_state(&mut controls, "ArrowUp", true);
        set_key_state(&mut controls, "ArrowLeft", true);
        set_key_state(&mut controls, "ArrowUp", false);
        assert!(!controls.up);
        assert!(controls.left);
    }

    #[test]
    fn gamepad_snapshot_overwrites_keyboard_state() {
        // Last writer wins per flag: an idle gamepad poll releases a key-held
        // flag, and vice versa a later key event overrides the pad.
        let mut controls = Controls::default();
        set_key_state(&mut controls, "w", true);
        set_gamepad_buttons(&mut controls, &GamepadButtons::default());
        assert!(!controls.up);

        set_gamepad_buttons(
            &mut controls,
            &GamepadButtons {
                a: true,
                ..GamepadButtons::default()
            },
        );
        assert!(controls.jump);
        set_key_state(&mut controls, " ", false);
        assert!(!controls.jump);
    }
}
