//! World build: ground, the block manifest, and avatar bodies.
//!
//! The category lists in [`DynamicBodies`] are appended at build time from a
//! single call site per category and only read afterwards; entries are never
//! removed individually. A full reset clears the whole world.

use shared::{
    AVATAR_SPAWN_HEIGHT, BodyKind, BodyOptions, BodySize, GameConfig, PhysicsHandles,
    PhysicsWorld, Transform, Vec3,
};

/// World-obstacle flavor. Created once at world build, never mutated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Brick,
    Coin,
    Question,
}

impl BlockKind {
    /// Visual edge size the collider is derived from.
    fn size(self) -> f32 {
        match self {
            BlockKind::Brick | BlockKind::Question => 2.5,
            BlockKind::Coin => 1.25,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GameBlock {
    pub position: Vec3,
    pub kind: BlockKind,
}

/// Debug-visualization record for a collider outline, kept only when
/// `show_body_helpers` is on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugOutline {
    pub half_extents: Vec3,
}

/// Pairing of a model transform with its rigid-body/collider handles.
pub struct PhysicObject {
    pub model: Transform,
    pub handles: PhysicsHandles,
    pub debug: Option<DebugOutline>,
}

/// Per-category object lists. The world-build step exclusively owns these.
#[derive(Default)]
pub struct DynamicBodies {
    pub ground: Vec<PhysicObject>,
    pub characters: Vec<PhysicObject>,
    pub blocks: Vec<PhysicObject>,
}

/// Physics world plus the per-category object registry.
pub struct World {
    pub physics: PhysicsWorld,
    pub bodies: DynamicBodies,
}

impl World {
    /// Build the scene: ground plane first, then every block in the manifest.
    pub fn build(config: &GameConfig, level: &[GameBlock]) -> Self {
        let mut world = Self {
            physics: PhysicsWorld::new(config.gravity),
            bodies: DynamicBodies::default(),
        };
        world.rebuild(config, level);
        world
    }

    /// Tear the scene down and rebuild it from a level manifest. Avatars are
    /// dropped too; callers respawn them afterwards.
    pub fn rebuild(&mut self, config: &GameConfig, level: &[GameBlock]) {
        self.reset();
        self.spawn_ground(config);
        for block in level {
            self.spawn_block(config, block);
        }
    }

    fn spawn_ground(&mut self, config: &GameConfig) {
        let position = Vec3::new(1.0, -1.0, 1.0);
        let size = [config.world_size, 0.0, config.world_size];
        let options = BodyOptions {
            boundary: 0.8,
            ..BodyOptions::default()
        };
        let handles = self.physics.insert_body(position, BodySize::Extents(size), &options);
        self.bodies.ground.push(PhysicObject {
            model: Transform::new(position, 0.0),
            handles,
            debug: debug_outline(config, size),
        });
    }

    fn spawn_block(&mut self, config: &GameConfig, block: &GameBlock) {
        let edge = block.kind.size();
        let size = [edge, edge, edge];
        let options = BodyOptions {
            boundary: 0.8,
            ..BodyOptions::default()
        };
        let handles = self
            .physics
            .insert_body(block.position, BodySize::Extents(size), &options);
        self.bodies.blocks.push(PhysicObject {
            model: Transform::new(block.position, 0.0),
            handles,
            debug: debug_outline(config, size),
        });
    }

    /// Create the dynamic body for one avatar and register it under the
    /// characters category. `size` comes from the loaded model's bounds.
    pub fn spawn_avatar(&mut self, config: &GameConfig, size: Vec3) -> PhysicsHandles {
        let position = Vec3::new(0.0, AVATAR_SPAWN_HEIGHT, 0.0);
        let extents = [size.x, size.y, size.z];
        let options = BodyOptions {
            boundary: 0.8,
            friction: 0.5,
            restitution: 0.0,
            density: Some(10.0),
            dominance: Some(10),
            kind: BodyKind::Dynamic,
            ..BodyOptions::default()
        };
        let handles = self
            .physics
            .insert_body(position, BodySize::Extents(extents), &options);
        self.bodies.characters.push(PhysicObject {
            model: Transform::new(position, 0.0),
            handles,
            debug: debug_outline(config, extents),
        });
        handles
    }

    /// Copy post-step body translations back into the character records so
    /// the scene-graph side of each model/body pair stays paired.
    pub fn sync_character_models(&mut self) {
        for object in &mut self.bodies.characters {
            if let Some(translation) = self.physics.translation(object.handles.body) {
                object.model.translation = translation;
            }
        }
    }

    /// Block centers for the movement step's proximity gate.
    pub fn block_positions(&self) -> Vec<Vec3> {
        self.bodies
            .blocks
            .iter()
            .map(|object| object.model.translation)
            .collect()
    }

    /// Full world reset: drops every body, collider, and category entry.
    pub fn reset(&mut self) {
        self.physics.reset();
        self.bodies = DynamicBodies::default();
    }
}

fn debug_outline(config: &GameConfig, size: [f32; 3]) -> Option<DebugOutline> {
    config.show_body_helpers.then(|| DebugOutline {
        half_extents: Vec3::new(size[0], size[1], size[2]) * 0.5,
    })
}

/// Fixed level manifest: a brick corridor, a coin run above it, and a pair of
/// question blocks. Positions leave the spawn point clear of the proximity
/// gate.
pub fn default_level() -> Vec<GameBlock> {
    let mut level = Vec::new();
    for i in 0..4 {
        level.push(GameBlock {
            position: Vec3::new(-6.0, 1.25, 12.0 + 3.0 * i as f32),
            kind: BlockKind::Brick,
        });
        level.push(GameBlock {
            position: Vec3::new(6.0, 1.25, 12.0 + 3.0 * i as f32),
            kind: BlockKind::Brick,
        });
    }
    for i in 0..3 {
        level.push(GameBlock {
            position: Vec3::new(0.0, 6.0, 16.0 + 4.0 * i as f32),
            kind: BlockKind::Coin,
        });
    }
    level.push(GameBlock {
        position: Vec3::new(-3.0, 4.0, 24.0),
        kind: BlockKind::Question,
    });
    level.push(GameBlock {
        position: Vec3::new(3.0, 4.0, 24.0),
        kind: BlockKind::Question,
    });
    level
}
