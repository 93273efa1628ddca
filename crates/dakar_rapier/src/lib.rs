//! `PhysicsWorld` on top of rapier2d.
//!
//! Handles handed to the core are plain counters mapped onto rapier's
//! generational handles, so stale handles are detected instead of aliasing
//! a recycled slot.
//!
//! Negative collision groups are mapped onto two interaction groups: every
//! fixture with a negative group ignores every other one, and all of them
//! still touch ungrouped geometry such as the terrain.

use dakar_core::error::{CoreError, Result};
use dakar_core::PhysicsWorld;
use dakar_data::{
    BodyDef, BodyHandle, BodyKind, CollisionFilter, FixtureDef, JointHandle, RevoluteJointDef,
    Shape, Vec2,
};
use rapier2d::prelude::*;
use std::collections::HashMap;

const GROUND_GROUP: Group = Group::GROUP_1;
const VEHICLE_GROUP: Group = Group::GROUP_2;

/// Gain of the force-based wheel motor; the torque cap does the limiting.
const MOTOR_DAMPING: Real = 1.0e4;

pub struct RapierWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    body_handles: HashMap<BodyHandle, RigidBodyHandle>,
    joint_handles: HashMap<JointHandle, ImpulseJointHandle>,
    next_body: u64,
    next_joint: u64,
}

impl RapierWorld {
    #[must_use]
    pub fn new(gravity: Vec2) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![gravity.x as Real, gravity.y as Real],
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            body_handles: HashMap::new(),
            joint_handles: HashMap::new(),
            next_body: 1,
            next_joint: 1,
        }
    }

    #[must_use]
    pub fn body_count(&self) -> usize {
        self.body_handles.len()
    }

    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joint_handles.len()
    }

    fn rigid_body(&self, body: BodyHandle) -> Result<&RigidBody> {
        self.body_handles
            .get(&body)
            .and_then(|h| self.bodies.get(*h))
            .ok_or(CoreError::UnknownBody(body))
    }

    fn collider(fixture: &FixtureDef) -> Result<Collider> {
        let builder = match &fixture.shape {
            Shape::Circle { radius } => ColliderBuilder::ball(*radius as Real),
            Shape::Polygon { vertices } => {
                let points: Vec<Point<Real>> = vertices
                    .iter()
                    .map(|v| point![v.x as Real, v.y as Real])
                    .collect();
                ColliderBuilder::convex_hull(&points)
                    .ok_or_else(|| CoreError::engine("degenerate polygon fixture"))?
            }
        };
        Ok(builder
            .density(fixture.density as Real)
            .friction(fixture.friction as Real)
            .restitution(fixture.restitution as Real)
            .collision_groups(interaction_groups(fixture.filter))
            .build())
    }
}

fn interaction_groups(filter: CollisionFilter) -> InteractionGroups {
    if filter.group_index < 0 {
        InteractionGroups::new(VEHICLE_GROUP, GROUND_GROUP)
    } else {
        InteractionGroups::new(GROUND_GROUP, Group::ALL)
    }
}

fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(f64::from(v.x), f64::from(v.y))
}

impl PhysicsWorld for RapierWorld {
    fn gravity(&self) -> Vec2 {
        to_vec2(&self.gravity)
    }

    fn create_body(&mut self, def: &BodyDef) -> Result<BodyHandle> {
        let colliders = def
            .fixtures
            .iter()
            .map(Self::collider)
            .collect::<Result<Vec<_>>>()?;

        let builder = match def.kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let body = builder
            .translation(vector![def.position.x as Real, def.position.y as Real])
            .rotation(def.angle as Real)
            .build();
        let rigid = self.bodies.insert(body);
        for collider in colliders {
            self.colliders
                .insert_with_parent(collider, rigid, &mut self.bodies);
        }

        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.body_handles.insert(handle, rigid);
        Ok(handle)
    }

    fn create_revolute_joint(&mut self, def: &RevoluteJointDef) -> Result<JointHandle> {
        let a = *self
            .body_handles
            .get(&def.body_a)
            .ok_or(CoreError::UnknownBody(def.body_a))?;
        let b = *self
            .body_handles
            .get(&def.body_b)
            .ok_or(CoreError::UnknownBody(def.body_b))?;

        let mut joint = RevoluteJointBuilder::new()
            .local_anchor1(point![def.local_anchor_a.x as Real, def.local_anchor_a.y as Real])
            .local_anchor2(point![def.local_anchor_b.x as Real, def.local_anchor_b.y as Real])
            .contacts_enabled(def.collide_connected);
        if def.enable_motor {
            joint = joint
                .motor_model(MotorModel::ForceBased)
                .motor_velocity(def.motor_speed as Real, MOTOR_DAMPING)
                .motor_max_force(def.max_motor_torque as Real);
        }

        let rigid = self.impulse_joints.insert(a, b, joint, true);
        let handle = JointHandle(self.next_joint);
        self.next_joint += 1;
        self.joint_handles.insert(handle, rigid);
        Ok(handle)
    }

    fn step(&mut self, dt: f64, velocity_iterations: u32, position_iterations: u32) {
        self.integration_parameters.dt = dt as Real;
        self.integration_parameters.num_solver_iterations = velocity_iterations.max(1) as usize;
        self.integration_parameters.num_internal_stabilization_iterations =
            position_iterations.max(1) as usize;

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
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

    fn body_position(&self, body: BodyHandle) -> Result<Vec2> {
        Ok(to_vec2(self.rigid_body(body)?.translation()))
    }

    fn body_world_center(&self, body: BodyHandle) -> Result<Vec2> {
        let center = self.rigid_body(body)?.center_of_mass();
        Ok(Vec2::new(f64::from(center.x), f64::from(center.y)))
    }

    fn body_linear_velocity(&self, body: BodyHandle) -> Result<Vec2> {
        Ok(to_vec2(self.rigid_body(body)?.linvel()))
    }

    fn destroy_body(&mut self, body: BodyHandle) -> Result<()> {
        let rigid = self
            .body_handles
            .remove(&body)
            .ok_or(CoreError::UnknownBody(body))?;
        self.bodies
            .remove(
                rigid,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .ok_or(CoreError::UnknownBody(body))?;

        let joints = &self.impulse_joints;
        self.joint_handles.retain(|_, h| joints.get(*h).is_some());
        tracing::trace!(%body, "Body destroyed");
        Ok(())
    }
}
