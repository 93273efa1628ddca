use crate::Vec2;
use serde::{Deserialize, Serialize};

/// Number of wheels every car carries.
pub const WHEEL_COUNT: usize = 2;
/// Number of chassis vertices, one per axis-aligned direction.
pub const CHASSIS_VERTEX_COUNT: usize = 4;

/// The immutable parameter set describing one car.
///
/// Counts are kept as vectors so that genomes coming from outside the
/// sampler (config files, custom reproduction policies) can be checked
/// before they reach the rig builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarGenome {
    /// Radius of each wheel, in metres.
    pub wheel_radii: Vec<f64>,
    /// Chassis vertex index each wheel is attached to.
    pub wheel_vertices: Vec<usize>,
    /// Which wheel receives the driving torque.
    pub motor_wheel_index: usize,
    /// Chassis outline in body-local coordinates: +x, +y, -x, -y.
    pub chassis_vertices: Vec<Vec2>,
}

impl CarGenome {
    #[must_use]
    pub fn wheel_count(&self) -> usize {
        self.wheel_radii.len()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.chassis_vertices.len()
    }

    /// Chassis vertex the given wheel hangs from, if both indices are valid.
    #[must_use]
    pub fn attachment_point(&self, wheel: usize) -> Option<Vec2> {
        let vertex = *self.wheel_vertices.get(wheel)?;
        self.chassis_vertices.get(vertex).copied()
    }
}
