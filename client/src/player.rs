//! The locally-controlled avatar: model transform, rigid body, animation
//! state, and the commit path for movement-step results.

use shared::movement::{AnimationDirective, StepOutput};
use shared::{PhysicsHandles, PhysicsWorld, Transform, Vec3};

use crate::assets::{AnimationClip, AssetError, ModelSource, PLAYER_MODEL, RUN_CLIP};
use crate::world::World;

/// Minimal animation mixer: one active clip, wrapped clock, play/stop.
/// Purely cosmetic; it never feeds back into physical state.
#[derive(Clone, Debug)]
pub struct AnimationMixer {
    clip: AnimationClip,
    pub time: f32,
    pub running: bool,
}

impl AnimationMixer {
    pub fn new(clip: AnimationClip) -> Self {
        Self {
            clip,
            time: 0.0,
            running: false,
        }
    }

    /// Name of the clip this mixer drives.
    pub fn clip_name(&self) -> &str {
        &self.clip.name
    }

    pub fn apply(&mut self, directive: AnimationDirective) {
        match directive {
            AnimationDirective::Advance { step } => {
                self.time = (self.time + step) % self.clip.duration;
                self.running = true;
            }
            AnimationDirective::Stop => self.running = false,
        }
    }
}

/// Local avatar state. The model transform and the physics body are written
/// together in [`apply_step`](Self::apply_step), never independently.
pub struct Avatar {
    pub transform: Transform,
    pub handles: PhysicsHandles,
    /// Debounces the jump impulse. Cleared by [`land`](Self::land); landing
    /// detection itself is an external concern.
    pub jumping: bool,
    pub mixer: AnimationMixer,
}

impl Avatar {
    /// Load the player model, register its dynamic body, and wire up the run
    /// clip. A missing model or clip is fatal to world build.
    pub fn spawn(
        world: &mut World,
        models: &dyn ModelSource,
        config: &shared::GameConfig,
    ) -> Result<Self, AssetError> {
        let model = models.load(PLAYER_MODEL)?;
        let run = model
            .clips
            .get(RUN_CLIP)
            .cloned()
            .ok_or_else(|| AssetError::MissingClip(PLAYER_MODEL.into(), RUN_CLIP.into()))?;

        let handles = world.spawn_avatar(config, model.size);
        let base = world
            .bodies
            .characters
            .last()
            .map(|object| object.model)
            .unwrap_or_else(Transform::identity);
        // The GLTF root carries the model's own origin offset; compose it
        // with the spawn pose.
        let transform = Transform::new(
            base.translation + model.root.translation,
            base.yaw + model.root.yaw,
        );

        Ok(Self {
            transform,
            handles,
            jumping: false,
            mixer: AnimationMixer::new(run),
        })
    }

    /// Commit one movement-step result.
    ///
    /// - Model transform and physics body are updated together when movement
    ///   occurred.
    /// - The jump impulse fires at most once and sets the jumping flag.
    /// - `emit` is invoked at most once per tick, with the committed pose.
    pub fn apply_step(
        &mut self,
        physics: &mut PhysicsWorld,
        output: StepOutput,
        emit: impl FnOnce(&Transform),
    ) {
        if output.moved {
            self.transform = output.transform;
            physics.set_translation(self.handles.body, self.transform.translation);
            physics.set_rotation(self.handles.body, self.transform.rotation_quat());
        }

        if let Some(impulse) = output.jump_impulse {
            physics.apply_impulse(self.handles.body, Vec3::new(0.0, impulse, 0.0));
            self.jumping = true;
        }

        self.mixer.apply(output.animation);

        if output.moved {
            emit(&self.transform);
        }
    }

    /// Clear the jumping flag once ground contact is re-established.
    pub fn land(&mut self) {
        self.jumping = false;
    }
}
