//! Repeated independent games; the final score is their mean.

use crate::app::game::Game;
use crate::app::shutdown::ShutdownManager;
use anyhow::Result;
use dakar_core::clock::Clock;
use dakar_core::presenter::Presenter;
use dakar_core::reproduction::policy_from_config;
use dakar_core::{AppConfig, PhysicsWorld};
use dakar_data::{GameReport, TournamentReport};

pub struct Tournament {
    config: AppConfig,
    shutdown: ShutdownManager,
}

impl Tournament {
    pub fn new(config: AppConfig, shutdown: ShutdownManager) -> Self {
        Self { config, shutdown }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Plays `game.games` games, each in a fresh world from `make_world`.
    ///
    /// Every game uses the same terrain and car seeds. The evolution seed is
    /// offset by the game index so stochastic policies differ between games.
    pub fn run<W, F, C>(
        &self,
        mut make_world: F,
        presenter: &mut dyn Presenter,
        clock: &C,
    ) -> Result<TournamentReport>
    where
        W: PhysicsWorld,
        F: FnMut(&AppConfig) -> W,
        C: Clock + ?Sized,
    {
        tracing::info!(
            games = self.config.game.games,
            fingerprint = %self.config.fingerprint(),
            "Tournament started"
        );

        let mut games: Vec<GameReport> = Vec::with_capacity(self.config.game.games);
        for index in 0..self.config.game.games {
            if self.shutdown.is_shutdown_requested() {
                break;
            }

            let mut config = self.config.clone();
            config.evolution.seed = config.evolution.seed.wrapping_add(index as u64);

            tracing::info!(game = index + 1, "Game started");
            let mut world = make_world(&config);
            let policy = policy_from_config(&config);
            let report = Game::new(&config, self.shutdown.clone()).run(
                &mut world,
                policy,
                presenter,
                clock,
            )?;
            tracing::info!(game = index + 1, score = report.score, "Game score");

            let interrupted = report.interrupted;
            games.push(report);
            if interrupted {
                break;
            }
        }

        let mut report = TournamentReport::from_games(&games);
        report.interrupted |= self.shutdown.is_shutdown_requested();
        tracing::info!(
            final_score = report.final_score,
            games = report.game_scores.len(),
            interrupted = report.interrupted,
            "Tournament finished"
        );
        Ok(report)
    }
}
