//! Session-scoped game context: owns the world, avatar, controls, and the
//! network session, and drives one simulation tick at a time.
//!
//! Everything runs on one thread: within a tick the movement step (emit
//! included) always completes before any inbound relay message is handled,
//! so the avatar's transform can never tear mid-frame.

use std::time::Instant;

use shared::movement::{StepInput, step_movement};
use shared::protocol::ServerEvent;
use shared::{AVATAR_SPAWN_HEIGHT, Controls, GameConfig, Vec3, apply_local_offset};
use thiserror::Error;

use crate::assets::{AssetError, ModelSource};
use crate::input::{GamepadButtons, set_gamepad_buttons, set_key_state};
use crate::player::Avatar;
use crate::session::{ConnectionState, Session};
use crate::storage::{PreferenceStore, StorageError, display_name};
use crate::transport::{Transport, TransportError};
use crate::world::{GameBlock, World};

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct Game<T: Transport> {
    pub world: World,
    pub avatar: Avatar,
    pub controls: Controls,
    pub session: Session,
    pub transport: T,
    pub focused: bool,
    config: GameConfig,
}

impl<T: Transport> Game<T> {
    /// Build the world, spawn the avatar, and create the session under the
    /// persisted (or guest) display name.
    pub fn new(
        config: GameConfig,
        transport: T,
        store: &dyn PreferenceStore,
        models: &dyn ModelSource,
        level: &[GameBlock],
    ) -> Result<Self, GameError> {
        let mut world = World::build(&config, level);
        let avatar = Avatar::spawn(&mut world, models, &config)?;
        let session = Session::new(display_name(store));
        Ok(Self {
            world,
            avatar,
            controls: Controls::default(),
            session,
            transport,
            focused: true,
            config,
        })
    }

    /// One simulation tick.
    ///
    /// Order: connection lifecycle, movement step + commit/emit, throttle
    /// flush, physics, then inbound messages.
    pub fn tick(&mut self, delta: f32, now: Instant) {
        self.sync_connection();

        let blocks = self.world.block_positions();
        let output = step_movement(StepInput {
            transform: self.avatar.transform,
            jumping: self.avatar.jumping,
            config: &self.config,
            delta,
            block_positions: &blocks,
            controls: self.controls,
            focused: self.focused,
        });

        let Self {
            world,
            avatar,
            session,
            transport,
            ..
        } = self;
        avatar.apply_step(&mut world.physics, output, |transform| {
            session.update_user_data(transform, transport, now);
        });
        session.flush_updates(transport, now);

        world.physics.step(delta.max(0.0));
        world.sync_character_models();

        // The heavy avatar body barely leaves the ground; once it is back at
        // spawn height the next jump is allowed again.
        if avatar.jumping {
            if let Some(position) = world.physics.translation(avatar.handles.body) {
                if position.y <= AVATAR_SPAWN_HEIGHT + 1.0e-3 {
                    avatar.land();
                }
            }
        }

        let events = self.transport.poll();
        for event in events {
            self.dispatch(event);
        }
    }

    fn sync_connection(&mut self) {
        let connected = self.transport.is_connected();
        match (connected, self.session.state()) {
            (true, ConnectionState::Disconnected) => {
                self.session.handle_connect(&mut self.transport);
            }
            (false, state) if state != ConnectionState::Disconnected => {
                self.session.handle_disconnect();
            }
            _ => {}
        }
    }

    fn dispatch(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::UserCreated(ack) => self.session.handle_create_ack(ack.seq, ack.user),
            ServerEvent::UserList(roster) => self.session.handle_user_list(roster),
            ServerEvent::MessageCreated(message) => self.session.handle_message_created(message),
        }
    }

    // ----- imperative surface for UI collaborators -----

    pub fn key_event(&mut self, key: &str, pressed: bool) {
        set_key_state(&mut self.controls, key, pressed);
    }

    pub fn gamepad_event(&mut self, buttons: &GamepadButtons) {
        set_gamepad_buttons(&mut self.controls, buttons);
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn change_user_name(&mut self, name: String) {
        self.session.change_user_name(name, &mut self.transport);
    }

    pub fn send_message(&mut self, text: String) {
        self.session.send_message(text, &mut self.transport);
    }

    /// Third-person camera pose for the current avatar transform:
    /// `(eye position, look-at point)`, both in world space.
    pub fn camera_pose(&self) -> (Vec3, Vec3) {
        let eye = apply_local_offset(&self.avatar.transform, self.config.camera_offset);
        let target = apply_local_offset(&self.avatar.transform, self.config.camera_look_at);
        (eye, target)
    }
}
