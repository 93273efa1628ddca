//! Turns a genome into physical bodies and joints.

use crate::config::{ChassisConfig, VehicleConfig, WheelConfig};
use crate::error::Result;
use crate::genome::validate_genome;
use crate::physics::{MassProperties, PhysicsWorld};
use crate::vehicle::{HealthRules, VehicleRuntime};
use dakar_data::{
    BodyDef, BodyHandle, BodyKind, CarGenome, CollisionFilter, FixtureDef, JointHandle,
    RevoluteJointDef, Shape, Vec2, WHEEL_COUNT,
};

/// The bodies and joints of one car, released as a unit.
///
/// Not `Clone`: [`Rig::release`] consumes the value, so a rig can be torn
/// down at most once.
#[derive(Debug, PartialEq)]
pub struct Rig {
    chassis: BodyHandle,
    wheels: [BodyHandle; WHEEL_COUNT],
    joints: [JointHandle; WHEEL_COUNT],
    mass: f64,
    torques: [f64; WHEEL_COUNT],
}

impl Rig {
    #[must_use]
    pub fn chassis(&self) -> BodyHandle {
        self.chassis
    }

    #[must_use]
    pub fn wheels(&self) -> [BodyHandle; WHEEL_COUNT] {
        self.wheels
    }

    #[must_use]
    pub fn joints(&self) -> [JointHandle; WHEEL_COUNT] {
        self.joints
    }

    /// Chassis plus both wheels.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Maximum motor torque of each wheel joint.
    #[must_use]
    pub fn torques(&self) -> [f64; WHEEL_COUNT] {
        self.torques
    }

    /// Chassis position and forward velocity, as fed to the health rule.
    pub fn read_motion<W: PhysicsWorld + ?Sized>(&self, world: &W) -> Result<(Vec2, f64)> {
        let position = world.body_position(self.chassis)?;
        let velocity = world.body_linear_velocity(self.chassis)?;
        Ok((position, velocity.x))
    }

    /// Destroys every body of the rig. Joints go with their bodies.
    pub fn release<W: PhysicsWorld + ?Sized>(self, world: &mut W) -> Result<()> {
        for wheel in self.wheels {
            world.destroy_body(wheel)?;
        }
        world.destroy_body(self.chassis)?;
        tracing::trace!(chassis = %self.chassis, "Rig released");
        Ok(())
    }
}

/// Builds rigs with shared material constants.
#[derive(Debug, Clone, Default)]
pub struct RigBuilder {
    chassis: ChassisConfig,
    wheel: WheelConfig,
    vehicle: VehicleConfig,
}

impl RigBuilder {
    #[must_use]
    pub fn new(chassis: ChassisConfig, wheel: WheelConfig, vehicle: VehicleConfig) -> Self {
        Self {
            chassis,
            wheel,
            vehicle,
        }
    }

    #[must_use]
    pub fn chassis_config(&self) -> &ChassisConfig {
        &self.chassis
    }

    #[must_use]
    pub fn wheel_config(&self) -> &WheelConfig {
        &self.wheel
    }

    #[must_use]
    pub fn vehicle_config(&self) -> &VehicleConfig {
        &self.vehicle
    }

    /// Instantiates `genome` at `start` and wraps it in a fresh runtime.
    pub fn instantiate<W: PhysicsWorld + ?Sized>(
        &self,
        genome: CarGenome,
        world: &mut W,
        start: Vec2,
    ) -> Result<VehicleRuntime> {
        let rig = self.build_rig(&genome, world, start)?;
        Ok(VehicleRuntime::new(
            genome,
            Some(rig),
            start,
            HealthRules::from(&self.vehicle),
        ))
    }

    /// Creates the bodies and joints of `genome` without a runtime.
    pub fn build_rig<W: PhysicsWorld + ?Sized>(
        &self,
        genome: &CarGenome,
        world: &mut W,
        start: Vec2,
    ) -> Result<Rig> {
        validate_genome(genome)?;

        let chassis_def = self.chassis_def(genome, start);
        let wheel_defs = genome.wheel_radii.iter().map(|&r| self.wheel_def(r, start));
        let wheel_defs: Vec<BodyDef> = wheel_defs.collect();

        let mass = chassis_def.mass() + wheel_defs.iter().map(MassProperties::mass).sum::<f64>();
        let weight = mass * world.gravity().y.abs();

        let chassis = world.create_body(&chassis_def)?;
        let mut wheels = [chassis; WHEEL_COUNT];
        for (slot, def) in wheels.iter_mut().zip(&wheel_defs) {
            *slot = world.create_body(def)?;
        }

        let mut torques = [0.0; WHEEL_COUNT];
        let mut joints = [JointHandle(0); WHEEL_COUNT];
        for wheel in 0..WHEEL_COUNT {
            let radius = genome.wheel_radii[wheel];
            let anchor = genome.chassis_vertices[genome.wheel_vertices[wheel]];
            torques[wheel] = weight / radius;
            joints[wheel] = world.create_revolute_joint(&RevoluteJointDef {
                body_a: chassis,
                body_b: wheels[wheel],
                local_anchor_a: anchor,
                local_anchor_b: Vec2::ZERO,
                max_motor_torque: torques[wheel],
                motor_speed: -self.vehicle.motor_speed,
                enable_motor: wheel == genome.motor_wheel_index,
                collide_connected: false,
            })?;
        }

        tracing::trace!(%chassis, mass, "Rig built");
        Ok(Rig {
            chassis,
            wheels,
            joints,
            mass,
            torques,
        })
    }

    /// One triangle per consecutive vertex pair, fanned through the origin.
    fn chassis_def(&self, genome: &CarGenome, start: Vec2) -> BodyDef {
        let vertices = &genome.chassis_vertices;
        let fixtures = (0..vertices.len())
            .map(|i| FixtureDef {
                shape: Shape::Polygon {
                    vertices: vec![vertices[i], vertices[(i + 1) % vertices.len()], Vec2::ZERO],
                },
                density: self.chassis.density,
                friction: self.chassis.friction,
                restitution: self.chassis.restitution,
                filter: CollisionFilter {
                    group_index: self.chassis.collision_group,
                },
            })
            .collect();
        BodyDef {
            kind: BodyKind::Dynamic,
            position: start,
            angle: 0.0,
            fixtures,
        }
    }

    fn wheel_def(&self, radius: f64, start: Vec2) -> BodyDef {
        BodyDef {
            kind: BodyKind::Dynamic,
            position: start,
            angle: 0.0,
            fixtures: vec![FixtureDef {
                shape: Shape::Circle { radius },
                density: self.wheel.density,
                friction: self.wheel.friction,
                restitution: self.wheel.restitution,
                filter: CollisionFilter {
                    group_index: self.wheel.collision_group,
                },
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::testing::ScriptedWorld;

    fn diamond() -> CarGenome {
        CarGenome {
            wheel_radii: vec![0.5, 0.25],
            wheel_vertices: vec![3, 1],
            motor_wheel_index: 1,
            chassis_vertices: vec![
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(-1.0, 0.0),
                Vec2::new(0.0, -1.0),
            ],
        }
    }

    #[test]
    fn test_rig_mass_and_torque() {
        let mut world = ScriptedWorld::new();
        let rig = RigBuilder::default()
            .build_rig(&diamond(), &mut world, Vec2::new(1.0, 2.0))
            .expect("rig");

        // Diamond of area 2 at density 5, two discs at density 2.
        let pi = std::f64::consts::PI;
        let expected = 2.0 * 5.0 + 2.0 * pi * (0.25 + 0.0625);
        assert!((rig.mass() - expected).abs() < 1e-9);

        let weight = expected * 9.81;
        assert!((rig.torques()[0] - weight / 0.5).abs() < 1e-9);
        assert!((rig.torques()[1] - weight / 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_only_motor_wheel_is_driven() {
        let mut world = ScriptedWorld::new();
        let rig = RigBuilder::default()
            .build_rig(&diamond(), &mut world, Vec2::new(1.0, 2.0))
            .expect("rig");

        let idle = world.joint(rig.joints()[0]).expect("joint 0");
        let motor = world.joint(rig.joints()[1]).expect("joint 1");
        assert!(!idle.enable_motor);
        assert!(motor.enable_motor);
        assert_eq!(motor.motor_speed, -25.0);
        assert_eq!(idle.local_anchor_a, Vec2::new(0.0, -1.0));
        assert_eq!(motor.local_anchor_a, Vec2::new(0.0, 1.0));
        assert!(!motor.collide_connected);
    }

    #[test]
    fn test_chassis_is_fan_of_four_triangles() {
        let mut world = ScriptedWorld::new();
        let rig = RigBuilder::default()
            .build_rig(&diamond(), &mut world, Vec2::new(1.0, 2.0))
            .expect("rig");
        let body = world.body(rig.chassis()).expect("chassis");
        assert_eq!(body.fixtures.len(), 4);
        for fixture in &body.fixtures {
            assert_eq!(fixture.filter.group_index, -1);
            match &fixture.shape {
                Shape::Polygon { vertices } => assert_eq!(vertices[2], Vec2::ZERO),
                Shape::Circle { .. } => panic!("chassis fixture must be a polygon"),
            }
        }
    }

    #[test]
    fn test_invalid_genome_creates_nothing() {
        let mut world = ScriptedWorld::new();
        let mut genome = diamond();
        genome.wheel_vertices = vec![0];
        let err = RigBuilder::default()
            .build_rig(&genome, &mut world, Vec2::ZERO)
            .expect_err("must fail");
        assert!(matches!(err, CoreError::InvalidGenome(_)));
        assert_eq!(world.live_bodies(), 0);
    }

    #[test]
    fn test_release_destroys_all_bodies() {
        let mut world = ScriptedWorld::new();
        let mut vehicle = RigBuilder::default()
            .instantiate(diamond(), &mut world, Vec2::new(1.0, 2.0))
            .expect("vehicle");
        assert_eq!(world.live_bodies(), 3);

        let rig = vehicle.take_rig().expect("rig present");
        rig.release(&mut world).expect("release");
        assert_eq!(world.live_bodies(), 0);
        assert_eq!(world.live_joints(), 0);
        assert!(vehicle.take_rig().is_none());
    }
}
