//! One game: a terrain, a first generation, and a fixed number of rounds.

use crate::app::shutdown::ShutdownManager;
use anyhow::{Context, Result};
use dakar_core::clock::Clock;
use dakar_core::genome::build_random_genome;
use dakar_core::presenter::{FrameView, Presenter};
use dakar_core::terrain::{register_terrain, TerrainGenerator};
use dakar_core::{AppConfig, GenerationController, PhysicsWorld, ReproductionPolicy, RigBuilder};
use dakar_data::GameReport;

pub struct Game<'a> {
    config: &'a AppConfig,
    shutdown: ShutdownManager,
}

impl<'a> Game<'a> {
    pub fn new(config: &'a AppConfig, shutdown: ShutdownManager) -> Self {
        Self { config, shutdown }
    }

    /// Plays the game in `world`, which must be empty.
    ///
    /// Per frame: shutdown check, controller tick, presenter, physics step.
    /// Stops after `game.generations` rounds or on shutdown; an interrupted
    /// game reports the rounds it completed.
    pub fn run<W, C>(
        &self,
        world: &mut W,
        policy: Box<dyn ReproductionPolicy>,
        presenter: &mut dyn Presenter,
        clock: &C,
    ) -> Result<GameReport>
    where
        W: PhysicsWorld,
        C: Clock + ?Sized,
    {
        let config = self.config;
        config.validate().context("Invalid configuration")?;

        let strip = TerrainGenerator::new(config.terrain.clone())
            .generate(config.terrain.seed, config.terrain.tile_count);
        register_terrain(world, &strip, config.terrain.friction)
            .context("Failed to register terrain")?;

        let builder = RigBuilder::new(
            config.chassis.clone(),
            config.wheel.clone(),
            config.vehicle.clone(),
        );
        let population = (0..config.game.population_size)
            .map(|i| {
                let genome =
                    build_random_genome(config.game.car_seed, i, &config.chassis, &config.wheel);
                builder.instantiate(genome, &mut *world, config.vehicle.start_position)
            })
            .collect::<dakar_core::Result<Vec<_>>>()
            .context("Failed to build the first generation")?;

        tracing::info!(
            terrain_seed = config.terrain.seed,
            car_seed = config.game.car_seed,
            population = population.len(),
            generations = config.game.generations,
            "Game started"
        );

        let mut controller = GenerationController::new(
            population,
            policy,
            config.game.max_round_duration(),
            clock.now(),
        );
        let mut report = GameReport::default();

        loop {
            if self.shutdown.is_shutdown_requested() {
                report.interrupted = true;
                break;
            }

            if let Some(round) = controller.tick(world, clock.now())? {
                presenter.on_generation(&round);
                report.generation_scores.push(round.best_distance);
                if report.generation_scores.len() >= config.game.generations {
                    break;
                }
            }

            if presenter.wants_frame(report.ticks) {
                let leader_center = match controller.leader_vehicle().and_then(|v| v.rig()) {
                    Some(rig) => Some(world.body_world_center(rig.chassis())?),
                    None => None,
                };
                presenter.on_frame(&FrameView {
                    frame: report.ticks,
                    generation: controller.generation(),
                    vehicles: controller.snapshots(),
                    leader: controller.leader(),
                    leader_center,
                    top_distances: controller.top_distances(config.game.scoreboard_top),
                    terrain: &strip.tiles,
                });
            }

            world.step(
                config.world.time_step,
                config.world.velocity_iterations,
                config.world.position_iterations,
            );
            clock.on_frame();
            report.ticks += 1;
        }

        controller.release_all(world)?;
        report.score = controller.overall_best();

        tracing::info!(
            score = report.score,
            generations = report.generation_scores.len(),
            ticks = report.ticks,
            interrupted = report.interrupted,
            "Game finished"
        );
        presenter.on_game(&report);
        Ok(report)
    }
}
