pub mod macros;

use dakar_core::clock::ManualClock;
use dakar_core::config::AppConfig;
use dakar_core::genome::build_random_genome;
use dakar_core::presenter::{FrameView, Presenter};
use dakar_core::reproduction::{policy_from_config, IdentityPolicy};
use dakar_core::testing::ScriptedWorld;
use dakar_core::{GenerationController, RigBuilder, VehicleRuntime};
use dakar_data::{GameReport, GenerationReport, Vec2};
use dakar_lib::{Game, ShutdownManager};
use std::time::{Duration, Instant};

/// One frame at the default 60 Hz step.
#[allow(dead_code)]
pub const FRAME: Duration = Duration::from_nanos(16_666_667);

#[allow(dead_code)]
pub fn rig_builder(config: &AppConfig) -> RigBuilder {
    RigBuilder::new(
        config.chassis.clone(),
        config.wheel.clone(),
        config.vehicle.clone(),
    )
}

/// First generation exactly as a game builds it.
#[allow(dead_code)]
pub fn spawn_population(world: &mut ScriptedWorld, config: &AppConfig) -> Vec<VehicleRuntime> {
    let builder = rig_builder(config);
    (0..config.game.population_size)
        .map(|i| {
            let genome =
                build_random_genome(config.game.car_seed, i, &config.chassis, &config.wheel);
            builder
                .instantiate(genome, &mut *world, config.vehicle.start_position)
                .expect("Failed to instantiate vehicle in test helper")
        })
        .collect()
}

#[allow(dead_code)]
pub fn identity_controller(
    world: &mut ScriptedWorld,
    config: &AppConfig,
    now: Instant,
) -> GenerationController {
    let population = spawn_population(world, config);
    GenerationController::new(
        population,
        Box::new(IdentityPolicy::new(rig_builder(config))),
        config.game.max_round_duration(),
        now,
    )
}

/// Builds and plays a game on a scripted world with simulated time.
#[allow(dead_code)]
pub struct GameBuilder {
    config: AppConfig,
    velocity: Vec2,
    shutdown: ShutdownManager,
}

#[allow(dead_code)]
impl GameBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            velocity: Vec2::ZERO,
            shutdown: ShutdownManager::new(),
        }
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    /// Velocity every car body keeps for the whole game.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownManager) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn run(self, presenter: &mut dyn Presenter) -> (GameReport, ScriptedWorld) {
        let mut world = ScriptedWorld::new()
            .with_gravity(self.config.world.gravity)
            .with_default_velocity(self.velocity);
        let clock = ManualClock::new(Duration::from_secs_f64(self.config.world.time_step));
        let policy = policy_from_config(&self.config);
        let report = Game::new(&self.config, self.shutdown)
            .run(&mut world, policy, presenter, &clock)
            .expect("Game failed in test builder");
        (report, world)
    }
}

/// Keeps every report it sees; optionally requests shutdown after a number
/// of generations.
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingPresenter {
    pub generations: Vec<GenerationReport>,
    pub games: Vec<GameReport>,
    pub frames: u64,
    pub max_alive_seen: usize,
    stop_after: Option<(usize, ShutdownManager)>,
}

#[allow(dead_code)]
impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stopping_after(generations: usize, shutdown: ShutdownManager) -> Self {
        Self {
            stop_after: Some((generations, shutdown)),
            ..Self::default()
        }
    }
}

impl Presenter for RecordingPresenter {
    fn on_frame(&mut self, view: &FrameView<'_>) {
        self.frames += 1;
        self.max_alive_seen = self.max_alive_seen.max(view.alive_count());
    }

    fn on_generation(&mut self, report: &GenerationReport) {
        self.generations.push(report.clone());
        if let Some((limit, shutdown)) = &self.stop_after {
            if self.generations.len() >= *limit {
                shutdown.request_shutdown();
            }
        }
    }

    fn on_game(&mut self, report: &GameReport) {
        self.games.push(report.clone());
    }
}
