//! Thin façade over the Rapier rigid-body engine.
//!
//! The world builder creates body/collider pairs for ground, blocks, and
//! characters; the simulation writes translations/rotations and applies jump
//! impulses through the handles returned here. Nothing in this module touches
//! a render scene; pairing physics handles with model transforms is the
//! caller's job.
//!
//! Failure mode: a malformed size for the chosen shape (scalar size with a
//! cuboid, extents with a ball) is a programming error and panics. It must be
//! avoided by construction; no recovery path exists.

use rapier3d::na::{Translation3, UnitQuaternion, Vector3};
use rapier3d::prelude::*;

use crate::constants::PHYSICS_DT;

/// Whether a body participates in dynamics or stays pinned in place.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves under simulation.
    #[default]
    Fixed,
    /// Responds to impulses and translation writes.
    Dynamic,
}

/// Collider shape selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyShape {
    #[default]
    Cuboid,
    Ball,
}

/// Visual size of the object the collider is derived from.
///
/// Cuboids require [`BodySize::Extents`]; balls require [`BodySize::Uniform`]
/// (the radius).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BodySize {
    Uniform(f32),
    Extents([f32; 3]),
}

/// Options record for [`PhysicsWorld::insert_body`].
///
/// Defaults produce a fixed cuboid with a full-size collider, which is what
/// plain world blocks use.
#[derive(Clone, Copy, Debug)]
pub struct BodyOptions {
    /// Collider scale relative to the visual size (1.0 = exact fit).
    pub boundary: f32,
    pub restitution: f32,
    pub friction: f32,
    /// Initial orientation; `None` means identity.
    pub rotation: Option<UnitQuaternion<f32>>,
    /// Explicit collider mass; overrides density-derived mass when set.
    pub mass: Option<f32>,
    pub density: Option<f32>,
    /// Dominance group for dynamic bodies (higher pushes lower).
    pub dominance: Option<i8>,
    pub kind: BodyKind,
    pub shape: BodyShape,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            boundary: 1.0,
            restitution: 0.0,
            friction: 0.5,
            rotation: None,
            mass: None,
            density: None,
            dominance: None,
            kind: BodyKind::Fixed,
            shape: BodyShape::Cuboid,
        }
    }
}

/// Body/collider pair registered with a [`PhysicsWorld`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicsHandles {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// Owns the Rapier sets and the dynamics pipeline.
///
/// Bodies are only ever added through [`insert_body`](Self::insert_body);
/// individual removal is not part of the scope, a world reset clears
/// everything at once.
pub struct PhysicsWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    gravity: Vector3<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
}

impl PhysicsWorld {
    /// Create an empty world with downward gravity of magnitude `gravity`.
    pub fn new(gravity: f32) -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            gravity: Vector3::new(0.0, -gravity, 0.0),
            integration_parameters: IntegrationParameters {
                dt: PHYSICS_DT,
                ..IntegrationParameters::default()
            },
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
        }
    }

    /// Create a rigid body + collider pair and register both with the world.
    ///
    /// # Panics
    /// Panics when `size` does not match `options.shape` (see module docs).
    pub fn insert_body(
        &mut self,
        position: Vector3<f32>,
        size: BodySize,
        options: &BodyOptions,
    ) -> PhysicsHandles {
        let rotation = options.rotation.unwrap_or_else(UnitQuaternion::identity);
        let iso = Isometry::from_parts(Translation3::from(position), rotation);

        let mut builder = match options.kind {
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        }
        .pose(iso);
        if let Some(group) = options.dominance {
            builder = builder.dominance_group(group);
        }
        let body = self.bodies.insert(builder.build());

        let collider = collider_from_parts(size, options);
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);

        PhysicsHandles { body, collider }
    }

    /// Write a body's translation. Missing handles are ignored.
    pub fn set_translation(&mut self, handle: RigidBodyHandle, translation: Vector3<f32>) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_translation(translation, true);
        }
    }

    /// Write a body's orientation. Missing handles are ignored.
    pub fn set_rotation(&mut self, handle: RigidBodyHandle, rotation: UnitQuaternion<f32>) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_rotation(rotation, true);
        }
    }

    /// Apply an instantaneous impulse to a dynamic body.
    pub fn apply_impulse(&mut self, handle: RigidBodyHandle, impulse: Vector3<f32>) {
        if let Some(body) = self.bodies.get_mut(handle) {
            body.apply_impulse(impulse, true);
        }
    }

    /// Current translation of a body, if the handle is live.
    pub fn translation(&self, handle: RigidBodyHandle) -> Option<Vector3<f32>> {
        self.bodies.get(handle).map(|body| *body.translation())
    }

    /// Advance dynamics by `dt` seconds (gravity, impulses, contacts).
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// Drop every body and collider (full world reset).
    pub fn reset(&mut self) {
        let gravity = -self.gravity.y;
        *self = Self::new(gravity);
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

/// Build the collider for a body from its visual size and options.
fn collider_from_parts(size: BodySize, options: &BodyOptions) -> Collider {
    let scale = options.boundary;
    let builder = match (options.shape, size) {
        (BodyShape::Cuboid, BodySize::Extents([x, y, z])) => {
            ColliderBuilder::cuboid(x * 0.5 * scale, y * 0.5 * scale, z * 0.5 * scale)
        }
        (BodyShape::Ball, BodySize::Uniform(radius)) => ColliderBuilder::ball(radius * scale),
        (BodyShape::Cuboid, BodySize::Uniform(_)) => {
            panic!("cuboid collider requires extents, got a scalar size")
        }
        (BodyShape::Ball, BodySize::Extents(_)) => {
            panic!("ball collider requires a scalar radius, got extents")
        }
    };

    let mut builder = builder
        .restitution(options.restitution)
        .friction(options.friction);
    if let Some(density) = options.density {
        builder = builder.density(density);
    }
    if let Some(mass) = options.mass {
        builder = builder.mass(mass);
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_cuboid() -> BodyOptions {
        BodyOptions {
            boundary: 0.8,
            ..BodyOptions::default()
        }
    }

    #[test]
    fn inserted_body_reports_its_position() {
        let mut world = PhysicsWorld::new(25.0);
        let handles = world.insert_body(
            Vector3::new(1.0, 2.0, 3.0),
            BodySize::Extents([2.5, 2.5, 2.5]),
            &fixed_cuboid(),
        );
        assert_eq!(world.translation(handles.body), Some(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(world.body_count(), 1);
    }

    #[test]
    fn fixed_bodies_do_not_fall_under_gravity() {
        let mut world = PhysicsWorld::new(25.0);
        let handles = world.insert_body(
            Vector3::new(0.0, 5.0, 0.0),
            BodySize::Extents([1.0, 1.0, 1.0]),
            &fixed_cuboid(),
        );
        for _ in 0..60 {
            world.step(PHYSICS_DT);
        }
        let pos = world.translation(handles.body).unwrap();
        assert!((pos.y - 5.0).abs() < 1.0e-6);
    }

    #[test]
    fn upward_impulse_moves_a_dynamic_ball() {
        let mut world = PhysicsWorld::new(25.0);
        let handles = world.insert_body(
            Vector3::new(0.0, 1.0, 0.0),
            BodySize::Uniform(0.5),
            &BodyOptions {
                kind: BodyKind::Dynamic,
                shape: BodyShape::Ball,
                mass: Some(1.0),
                ..BodyOptions::default()
            },
        );
        world.apply_impulse(handles.body, Vector3::new(0.0, 10.0, 0.0));
        world.step(PHYSICS_DT);
        let pos = world.translation(handles.body).unwrap();
        assert!(pos.y > 1.0, "impulse should lift the body, got y={}", pos.y);
    }

    #[test]
    fn translation_writes_reach_the_body() {
        let mut world = PhysicsWorld::new(25.0);
        let handles = world.insert_body(
            Vector3::zeros(),
            BodySize::Extents([1.0, 1.0, 1.0]),
            &BodyOptions {
                kind: BodyKind::Dynamic,
                ..BodyOptions::default()
            },
        );
        world.set_translation(handles.body, Vector3::new(0.0, 0.0, 0.4));
        assert_eq!(
            world.translation(handles.body),
            Some(Vector3::new(0.0, 0.0, 0.4))
        );
    }

    #[test]
    #[should_panic(expected = "cuboid collider requires extents")]
    fn scalar_size_with_cuboid_shape_is_a_programming_error() {
        let mut world = PhysicsWorld::new(25.0);
        world.insert_body(Vector3::zeros(), BodySize::Uniform(1.0), &BodyOptions::default());
    }

    #[test]
    #[should_panic(expected = "ball collider requires a scalar radius")]
    fn extents_with_ball_shape_is_a_programming_error() {
        let mut world = PhysicsWorld::new(25.0);
        world.insert_body(
            Vector3::zeros(),
            BodySize::Extents([1.0, 1.0, 1.0]),
            &BodyOptions {
                shape: BodyShape::Ball,
                ..BodyOptions::default()
            },
        );
    }

    #[test]
    fn reset_clears_every_body() {
        let mut world = PhysicsWorld::new(25.0);
        world.insert_body(
            Vector3::zeros(),
            BodySize::Extents([1.0, 1.0, 1.0]),
            &fixed_cuboid(),
        );
        world.reset();
        assert_eq!(world.body_count(), 0);
    }
}
