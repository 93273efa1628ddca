//! Dakar: populations of two-wheeled cars evolving over procedural terrain.
//!
//! The simulation core lives in `dakar_core`; this crate wires it into
//! games, tournaments and the command line.

pub mod app;

pub use app::{Game, ShutdownManager, Tournament};
