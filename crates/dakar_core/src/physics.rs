//! The narrow capability set the core needs from a rigid-body engine.
//!
//! Adapters (rapier, the scripted test double) implement [`PhysicsWorld`];
//! nothing in the core names a concrete engine type.

use crate::error::Result;
use dakar_data::{
    BodyDef, BodyHandle, FixtureDef, JointHandle, RevoluteJointDef, Shape, Vec2,
};

/// Rigid-body world as seen by the simulation core.
///
/// The trait is object safe so reproduction policies can receive
/// `&mut dyn PhysicsWorld`.
pub trait PhysicsWorld {
    /// Gravity vector, used to scale motor torque with rig weight.
    fn gravity(&self) -> Vec2;

    fn create_body(&mut self, def: &BodyDef) -> Result<BodyHandle>;

    fn create_revolute_joint(&mut self, def: &RevoluteJointDef) -> Result<JointHandle>;

    /// Advances the world by one fixed step.
    fn step(&mut self, dt: f64, velocity_iterations: u32, position_iterations: u32);

    /// Origin of the body frame in world coordinates.
    fn body_position(&self, body: BodyHandle) -> Result<Vec2>;

    /// Centre of mass in world coordinates.
    fn body_world_center(&self, body: BodyHandle) -> Result<Vec2>;

    fn body_linear_velocity(&self, body: BodyHandle) -> Result<Vec2>;

    /// Removes the body together with its fixtures and every joint attached
    /// to it. Destroying an unknown handle is an error.
    fn destroy_body(&mut self, body: BodyHandle) -> Result<()>;
}

/// Mass computed from geometry, independent of the engine.
pub trait MassProperties {
    fn area(&self) -> f64;
    fn mass(&self) -> f64;
}

impl MassProperties for Shape {
    fn area(&self) -> f64 {
        match self {
            Shape::Circle { radius } => std::f64::consts::PI * radius * radius,
            Shape::Polygon { vertices } => polygon_area(vertices),
        }
    }

    /// Unit-density mass, i.e. the area.
    fn mass(&self) -> f64 {
        self.area()
    }
}

impl MassProperties for FixtureDef {
    fn area(&self) -> f64 {
        self.shape.area()
    }

    fn mass(&self) -> f64 {
        self.shape.area() * self.density
    }
}

impl MassProperties for BodyDef {
    fn area(&self) -> f64 {
        self.fixtures.iter().map(MassProperties::area).sum()
    }

    fn mass(&self) -> f64 {
        self.fixtures.iter().map(MassProperties::mass).sum()
    }
}

/// Unsigned shoelace area.
fn polygon_area(vertices: &[Vec2]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let twice: f64 = vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| a.cross(*b))
        .sum();
    twice.abs() * 0.5
}
