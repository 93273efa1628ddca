//! Per-vehicle runtime state and the health/liveness rule.

use crate::config::{FitnessMode, VehicleConfig};
use crate::rig::Rig;
use dakar_data::{CarGenome, VehicleSnapshot, Vec2};

/// Liveness of a vehicle. `Dead` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifeState {
    Alive,
    Dead,
}

/// Constants of the health rule, lifted from [`VehicleConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthRules {
    pub max_health: i32,
    pub health_step: i32,
    pub stall_epsilon: f64,
    pub fitness: FitnessMode,
}

impl From<&VehicleConfig> for HealthRules {
    fn from(config: &VehicleConfig) -> Self {
        Self {
            max_health: config.max_health,
            health_step: config.health_step,
            stall_epsilon: config.stall_epsilon,
            fitness: config.fitness,
        }
    }
}

impl Default for HealthRules {
    fn default() -> Self {
        Self::from(&VehicleConfig::default())
    }
}

/// A genome instantiated in the world, with its mutable round state.
#[derive(Debug)]
pub struct VehicleRuntime {
    genome: CarGenome,
    rig: Option<Rig>,
    state: LifeState,
    health: i32,
    position: Vec2,
    velocity_x: f64,
    distance: f64,
    start: Vec2,
    rules: HealthRules,
}

impl VehicleRuntime {
    /// Fresh runtime at full health. `rig` is `None` only for vehicles that
    /// never had physical resources, such as state-machine tests.
    #[must_use]
    pub fn new(genome: CarGenome, rig: Option<Rig>, start: Vec2, rules: HealthRules) -> Self {
        Self {
            genome,
            rig,
            state: LifeState::Alive,
            health: rules.max_health,
            position: start,
            velocity_x: 0.0,
            distance: 0.0,
            start,
            rules,
        }
    }

    /// Feeds the latest chassis position and forward velocity.
    ///
    /// Records the forward displacement, then charges one health step if the
    /// vehicle is stalled. Returns `true` on the tick the vehicle dies.
    /// Does nothing once dead.
    pub fn update(&mut self, position: Vec2, velocity_x: f64) -> bool {
        if self.state == LifeState::Dead {
            return false;
        }

        self.position = position;
        self.velocity_x = velocity_x;

        let displacement = position.x - self.start.x;
        self.distance = match self.rules.fitness {
            FitnessMode::LastDisplacement => displacement,
            FitnessMode::RunningMax => self.distance.max(displacement),
        };

        if velocity_x.abs() < self.rules.stall_epsilon {
            self.health -= self.rules.health_step;
            if self.health <= 0 {
                return self.kill();
            }
        }
        false
    }

    /// Forces the vehicle dead. Returns `true` if it was alive.
    pub fn kill(&mut self) -> bool {
        let was_alive = self.is_alive();
        self.health = 0;
        self.state = LifeState::Dead;
        was_alive
    }

    /// Hands the rig over for release. Yields it at most once.
    pub fn take_rig(&mut self) -> Option<Rig> {
        self.rig.take()
    }

    #[must_use]
    pub fn rig(&self) -> Option<&Rig> {
        self.rig.as_ref()
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.state == LifeState::Alive
    }

    #[must_use]
    pub fn state(&self) -> LifeState {
        self.state
    }

    #[must_use]
    pub fn health(&self) -> i32 {
        self.health
    }

    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[must_use]
    pub fn velocity_x(&self) -> f64 {
        self.velocity_x
    }

    /// Forward displacement from the start position, frozen at death.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance
    }

    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.start
    }

    #[must_use]
    pub fn genome(&self) -> &CarGenome {
        &self.genome
    }

    #[must_use]
    pub fn snapshot(&self, index: usize) -> VehicleSnapshot {
        VehicleSnapshot {
            index,
            position: self.position,
            alive: self.is_alive(),
            health: self.health,
            distance: self.distance,
        }
    }
}
