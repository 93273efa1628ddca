pub mod game;
pub mod shutdown;
pub mod tournament;

pub use game::Game;
pub use shutdown::ShutdownManager;
pub use tournament::Tournament;

/// World used by the binary: rapier when the `rapier` feature is on.
#[cfg(feature = "rapier")]
pub fn default_world(config: &dakar_core::config::WorldConfig) -> dakar_rapier::RapierWorld {
    dakar_rapier::RapierWorld::new(config.gravity)
}
