//! In-memory physics double for tests and benchmarks.
//!
//! Bodies move at constant scripted velocities; there is no collision or
//! gravity integration. Destruction is tracked so tests can assert that rigs
//! are released exactly once.

use crate::error::{CoreError, Result};
use crate::physics::PhysicsWorld;
use dakar_data::{BodyDef, BodyHandle, BodyKind, JointHandle, RevoluteJointDef, Vec2};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct ScriptedBody {
    def: BodyDef,
    position: Vec2,
    velocity: Vec2,
}

#[derive(Debug, Clone)]
pub struct ScriptedWorld {
    gravity: Vec2,
    default_velocity: Vec2,
    bodies: BTreeMap<BodyHandle, ScriptedBody>,
    joints: BTreeMap<JointHandle, RevoluteJointDef>,
    next_body: u64,
    next_joint: u64,
    destroyed: u64,
    steps: u64,
}

impl Default for ScriptedWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedWorld {
    /// Standard gravity, dynamic bodies at rest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            default_velocity: Vec2::ZERO,
            bodies: BTreeMap::new(),
            joints: BTreeMap::new(),
            next_body: 1,
            next_joint: 1,
            destroyed: 0,
            steps: 0,
        }
    }

    /// Velocity given to every dynamic body created from now on.
    #[must_use]
    pub fn with_default_velocity(mut self, velocity: Vec2) -> Self {
        self.default_velocity = velocity;
        self
    }

    #[must_use]
    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn set_default_velocity(&mut self, velocity: Vec2) {
        self.default_velocity = velocity;
    }

    pub fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> Result<()> {
        let entry = self
            .bodies
            .get_mut(&body)
            .ok_or(CoreError::UnknownBody(body))?;
        entry.velocity = velocity;
        Ok(())
    }

    /// Overrides the velocity of every live dynamic body.
    pub fn set_all_velocities(&mut self, velocity: Vec2) {
        for body in self.bodies.values_mut() {
            if body.def.kind == BodyKind::Dynamic {
                body.velocity = velocity;
            }
        }
    }

    #[must_use]
    pub fn body(&self, body: BodyHandle) -> Option<&BodyDef> {
        self.bodies.get(&body).map(|b| &b.def)
    }

    #[must_use]
    pub fn joint(&self, joint: JointHandle) -> Option<&RevoluteJointDef> {
        self.joints.get(&joint)
    }

    #[must_use]
    pub fn live_bodies(&self) -> usize {
        self.bodies.len()
    }

    #[must_use]
    pub fn live_dynamic_bodies(&self) -> usize {
        self.bodies
            .values()
            .filter(|b| b.def.kind == BodyKind::Dynamic)
            .count()
    }

    #[must_use]
    pub fn live_joints(&self) -> usize {
        self.joints.len()
    }

    /// Bodies destroyed so far.
    #[must_use]
    pub fn destroyed(&self) -> u64 {
        self.destroyed
    }

    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn gravity(&self) -> Vec2 {
        self.gravity
    }

    fn create_body(&mut self, def: &BodyDef) -> Result<BodyHandle> {
        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        let velocity = match def.kind {
            BodyKind::Dynamic => self.default_velocity,
            BodyKind::Static => Vec2::ZERO,
        };
        self.bodies.insert(
            handle,
            ScriptedBody {
                def: def.clone(),
                position: def.position,
                velocity,
            },
        );
        Ok(handle)
    }

    fn create_revolute_joint(&mut self, def: &RevoluteJointDef) -> Result<JointHandle> {
        for body in [def.body_a, def.body_b] {
            if !self.bodies.contains_key(&body) {
                return Err(CoreError::UnknownBody(body));
            }
        }
        let handle = JointHandle(self.next_joint);
        self.next_joint += 1;
        self.joints.insert(handle, def.clone());
        Ok(handle)
    }

    fn step(&mut self, dt: f64, _velocity_iterations: u32, _position_iterations: u32) {
        for body in self.bodies.values_mut() {
            if body.def.kind == BodyKind::Dynamic {
                body.position += body.velocity * dt;
            }
        }
        self.steps += 1;
    }

    fn body_position(&self, body: BodyHandle) -> Result<Vec2> {
        self.bodies
            .get(&body)
            .map(|b| b.position)
            .ok_or(CoreError::UnknownBody(body))
    }

    fn body_world_center(&self, body: BodyHandle) -> Result<Vec2> {
        self.body_position(body)
    }

    fn body_linear_velocity(&self, body: BodyHandle) -> Result<Vec2> {
        self.bodies
            .get(&body)
            .map(|b| b.velocity)
            .ok_or(CoreError::UnknownBody(body))
    }

    fn destroy_body(&mut self, body: BodyHandle) -> Result<()> {
        self.bodies
            .remove(&body)
            .ok_or(CoreError::UnknownBody(body))?;
        self.joints
            .retain(|_, j| j.body_a != body && j.body_b != body);
        self.destroyed += 1;
        Ok(())
    }
}
