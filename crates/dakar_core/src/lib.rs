//! # Dakar Core
//!
//! The deterministic core of the Dakar vehicle-evolution simulation.
//!
//! This crate contains:
//! - Seam-continuous procedural terrain
//! - Seeded genome sampling and rig construction
//! - The per-vehicle health state machine
//! - The round-based population controller and reproduction policies
//! - Configuration, metrics and structured logging
//!
//! ## Architecture
//!
//! The core never names a physics engine. It talks to the world through the
//! [`physics::PhysicsWorld`] trait; `dakar_rapier` implements it on rapier2d
//! and [`testing::ScriptedWorld`] (feature `testing`) is an in-memory double.
//!
//! ## Example
//!
//! ```
//! use dakar_core::config::{ChassisConfig, WheelConfig};
//! use dakar_core::genome::{build_random_genome, validate_genome};
//!
//! let genome = build_random_genome(666, 3, &ChassisConfig::default(), &WheelConfig::default());
//! assert!(validate_genome(&genome).is_ok());
//! assert_eq!(genome.wheel_radii.len(), 2);
//! ```

/// Wall-clock source for round deadlines
pub mod clock;
/// Configuration management for simulation parameters
pub mod config;
/// Error taxonomy
pub mod error;
/// Random genome sampling and validation
pub mod genome;
/// Run counters and logging setup
pub mod metrics;
/// Physics engine capability trait and mass properties
pub mod physics;
/// Round controller
pub mod population;
/// Read-only presentation seam
pub mod presenter;
/// Next-generation policies
pub mod reproduction;
/// Genome to bodies and joints
pub mod rig;
/// Procedural ground strip
pub mod terrain;
/// Vehicle runtime and health rule
pub mod vehicle;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::AppConfig;
pub use error::{CoreError, Result};
pub use physics::PhysicsWorld;
pub use population::GenerationController;
pub use reproduction::ReproductionPolicy;
pub use rig::{Rig, RigBuilder};
pub use terrain::TerrainGenerator;
pub use vehicle::{LifeState, VehicleRuntime};
