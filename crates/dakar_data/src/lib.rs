//! Plain data types shared by the Dakar crates.
//!
//! Nothing in here talks to a physics engine or owns simulation state; the
//! behaviour lives in `dakar_core`.

pub mod data;

pub use data::genome::{CarGenome, CHASSIS_VERTEX_COUNT, WHEEL_COUNT};
pub use data::geometry::Vec2;
pub use data::physics::{
    BodyDef, BodyHandle, BodyKind, CollisionFilter, FixtureDef, JointHandle, RevoluteJointDef,
    Shape,
};
pub use data::report::{
    GameReport, GenerationReport, RoundOutcome, TournamentReport, VehicleSnapshot,
};
pub use data::terrain::{TerrainStrip, TilePlacement};
