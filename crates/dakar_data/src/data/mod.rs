//! Core data structures for the Dakar simulation.

pub mod genome;
pub mod geometry;
pub mod physics;
pub mod report;
pub mod terrain;
