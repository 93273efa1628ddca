//! Error types for dakar_core.
//!
//! Every variant is a broken contract rather than an expected runtime event:
//! the sampler only produces valid genomes, and the controller releases each
//! rig exactly once. None of them is retried.

use dakar_data::{BodyHandle, JointHandle};
use thiserror::Error;

/// Main error type for dakar_core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A genome violated the structural contract (counts, indices, radii).
    #[error("Invalid genome: {0}")]
    InvalidGenome(String),

    /// The engine does not know this body (already destroyed, or foreign).
    #[error("Unknown body: {0}")]
    UnknownBody(BodyHandle),

    /// The engine does not know this joint.
    #[error("Unknown joint: {0}")]
    UnknownJoint(JointHandle),

    /// Any other failure reported by the physics engine adapter.
    #[error("Physics engine error: {0}")]
    Engine(String),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for dakar_core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    #[must_use]
    pub fn invalid_genome<S: Into<String>>(msg: S) -> Self {
        Self::InvalidGenome(msg.into())
    }

    #[must_use]
    pub fn engine<S: Into<String>>(msg: S) -> Self {
        Self::Engine(msg.into())
    }
}
