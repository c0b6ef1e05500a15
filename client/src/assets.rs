//! Model/animation loading seam.
//!
//! The real asset pipeline (GLTF fetch + parse) lives outside the core; the
//! world build only needs a scene-graph root, the model's bounding size, and
//! the named animation clips. A load failure is fatal to world build for
//! that asset — there is no retry.

use std::collections::HashMap;

use shared::{Transform, Vec3};
use thiserror::Error;

/// Resource path of the player avatar model.
pub const PLAYER_MODEL: &str = "models/player.glb";
/// Clip played while any control flag is held.
pub const RUN_CLIP: &str = "run";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("model '{0}' not found")]
    NotFound(String),
    #[error("model '{0}' is missing the '{1}' animation clip")]
    MissingClip(String, String),
}

/// Named animation clip metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    /// Clip length in seconds; mixer time wraps at this.
    pub duration: f32,
}

/// A loaded scene-graph handle: root pose, bounding size, named clips.
#[derive(Clone, Debug)]
pub struct LoadedModel {
    pub root: Transform,
    pub size: Vec3,
    pub clips: HashMap<String, AnimationClip>,
}

pub trait ModelSource {
    fn load(&self, path: &str) -> Result<LoadedModel, AssetError>;
}

/// Manifest-backed source: a fixed set of models registered up front. Stands
/// in for the GLTF pipeline in headless runs and tests.
#[derive(Default)]
pub struct ManifestSource {
    models: HashMap<String, LoadedModel>,
}

impl ManifestSource {
    /// Source pre-loaded with the player avatar: roughly human-sized with a
    /// run clip, matching the proportions the scaled GLTF resolves to.
    pub fn with_player_model() -> Self {
        let mut source = Self::default();
        let mut clips = HashMap::new();
        for (name, duration) in [("idle", 2.0), ("run", 0.8), ("jump", 1.2)] {
            clips.insert(
                name.to_string(),
                AnimationClip {
                    name: name.to_string(),
                    duration,
                },
            );
        }
        source.register(
            PLAYER_MODEL,
            LoadedModel {
                root: Transform::identity(),
                size: Vec3::new(1.0, 2.0, 1.0),
                clips,
            },
        );
        source
    }

    pub fn register(&mut self, path: &str, model: LoadedModel) {
        self.models.insert(path.to_string(), model);
    }
}

impl ModelSource for ManifestSource {
    fn load(&self, path: &str) -> Result<LoadedModel, AssetError> {
        self.models
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_model_carries_a_run_clip() {
        let source = ManifestSource::with_player_model();
        let model = source.load(PLAYER_MODEL).unwrap();
        assert!(model.clips.contains_key(RUN_CLIP));
        assert!(model.size.y > model.size.x);
    }

    #[test]
    fn unknown_paths_fail_the_load() {
        let source = ManifestSource::with_player_model();
        assert!(matches!(
            source.load("models/missing.glb"),
            Err(AssetError::NotFound(_))
        ));
    }
}
