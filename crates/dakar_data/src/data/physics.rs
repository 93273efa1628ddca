use crate::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a body living inside a physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle(pub u64);

/// Opaque handle to a joint living inside a physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JointHandle(pub u64);

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

impl fmt::Display for JointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "joint#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Immovable geometry (terrain).
    Static,
    /// Fully simulated body (chassis, wheels).
    Dynamic,
}

/// Collision shape in body-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// Convex polygon, vertices in the order they were supplied.
    Polygon { vertices: Vec<Vec2> },
    Circle { radius: f64 },
}

/// Group-based collision filtering.
///
/// Fixtures sharing a negative group index never collide with each other;
/// zero means "no group".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub group_index: i16,
}

impl CollisionFilter {
    #[must_use]
    pub fn excludes(&self, other: &CollisionFilter) -> bool {
        self.group_index < 0 && self.group_index == other.group_index
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureDef {
    pub shape: Shape,
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    pub filter: CollisionFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub position: Vec2,
    pub angle: f64,
    pub fixtures: Vec<FixtureDef>,
}

/// Motorised hinge between two bodies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevoluteJointDef {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub local_anchor_a: Vec2,
    pub local_anchor_b: Vec2,
    pub max_motor_torque: f64,
    /// Target angular speed in rad/s; negative spins clockwise.
    pub motor_speed: f64,
    pub enable_motor: bool,
    pub collide_connected: bool,
}
