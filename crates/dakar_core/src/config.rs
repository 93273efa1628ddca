//! Configuration management for simulation parameters.
//!
//! Strongly-typed sections that map onto a `config.toml` file. Every section
//! has a `Default` reproducing the reference track and car parameters, and
//! every field may be omitted from the file.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [terrain]
//! seed = 42
//! tile_count = 200
//!
//! [game]
//! car_seed = 666
//! population_size = 20
//! generations = 6
//! max_round_secs = 120.0
//!
//! [evolution]
//! policy = "elitist"
//! ```

use crate::error::{CoreError, Result};
use dakar_data::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Physics world parameters handed to the engine adapter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: Vec2,
    /// Fixed simulation step, in seconds.
    pub time_step: f64,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            time_step: 1.0 / 60.0,
            velocity_iterations: 10,
            position_iterations: 10,
        }
    }
}

/// Ground strip generation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    pub seed: u64,
    pub tile_count: usize,
    pub tile_width: f64,
    pub tile_height: f64,
    pub start_position: Vec2,
    pub friction: f64,
    /// Upper bound of the rotation envelope reached by the last tile.
    pub max_angle_factor: f64,
    /// Width of the raw draw, centred on zero (`r * spread - spread / 2`).
    pub angle_spread: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tile_count: 200,
            tile_width: 1.5,
            tile_height: 0.15,
            start_position: Vec2::new(-1.0, 0.0),
            friction: 0.5,
            max_angle_factor: 1.2,
            angle_spread: 3.0,
        }
    }
}

/// How a vehicle's fitness distance is recorded each tick.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FitnessMode {
    /// Latest forward displacement, frozen at death.
    #[default]
    LastDisplacement,
    /// Greatest forward displacement seen while alive.
    RunningMax,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VehicleConfig {
    /// Shared spawn point of every rig.
    pub start_position: Vec2,
    pub max_health: i32,
    /// Health lost per stalled tick.
    pub health_step: i32,
    /// Speeds below this count as stalled.
    pub stall_epsilon: f64,
    /// Magnitude of the motor target speed, in rad/s.
    pub motor_speed: f64,
    pub fitness: FitnessMode,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            start_position: Vec2::new(1.0, 2.0),
            max_health: 100,
            health_step: 2,
            stall_epsilon: 1e-4,
            motor_speed: 25.0,
            fitness: FitnessMode::LastDisplacement,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChassisConfig {
    /// Smallest distance of a chassis vertex from the body origin.
    pub min_axis: f64,
    /// Vertex magnitudes are drawn from `[min_axis, min_axis + axis_span)`.
    pub axis_span: f64,
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    pub collision_group: i16,
}

impl Default for ChassisConfig {
    fn default() -> Self {
        Self {
            min_axis: 0.1,
            axis_span: 1.1,
            density: 5.0,
            friction: 10.0,
            restitution: 0.0,
            collision_group: -1,
        }
    }
}

impl ChassisConfig {
    #[must_use]
    pub fn max_axis(&self) -> f64 {
        self.min_axis + self.axis_span
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WheelConfig {
    pub min_radius: f64,
    pub max_radius: f64,
    pub density: f64,
    pub friction: f64,
    pub restitution: f64,
    pub collision_group: i16,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            min_radius: 0.2,
            max_radius: 0.7,
            density: 2.0,
            friction: 1.0,
            restitution: 0.2,
            collision_group: -1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub car_seed: u64,
    pub population_size: usize,
    /// Generations per game.
    pub generations: usize,
    /// Independent games per tournament.
    pub games: usize,
    pub max_round_secs: f64,
    /// Frames between two scoreboard lines.
    pub scoreboard_interval: u64,
    pub scoreboard_top: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            car_seed: 666,
            population_size: 20,
            generations: 6,
            games: 5,
            max_round_secs: 120.0,
            scoreboard_interval: 60,
            scoreboard_top: 5,
        }
    }
}

/// Longest accepted round, in seconds (about 31 years).
pub const MAX_ROUND_SECS: f64 = 1.0e9;

impl GameConfig {
    /// Round limit as a `Duration`, capped at [`MAX_ROUND_SECS`]. Values
    /// `validate` would reject never panic here; they map to zero.
    #[must_use]
    pub fn max_round_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_round_secs.min(MAX_ROUND_SECS))
            .unwrap_or(Duration::ZERO)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Next generation is the current one, re-instantiated unchanged.
    #[default]
    Identity,
    /// Keep the best genomes, fill up with mutated copies.
    Elitist,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EvolutionConfig {
    pub policy: PolicyKind,
    pub elite_count: usize,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Perturbation size as a fraction of each gene's allowed range.
    pub mutation_scale: f64,
    pub seed: u64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            policy: PolicyKind::Identity,
            elite_count: 4,
            mutation_rate: 0.2,
            mutation_scale: 0.1,
            seed: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub terrain: TerrainConfig,
    pub vehicle: VehicleConfig,
    pub chassis: ChassisConfig,
    pub wheel: WheelConfig,
    pub game: GameConfig,
    pub evolution: EvolutionConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // World validation
        anyhow::ensure!(
            self.world.gravity.is_finite(),
            "Gravity must be finite"
        );
        anyhow::ensure!(
            self.world.time_step > 0.0 && self.world.time_step <= 1.0,
            "Time step must be in (0.0, 1.0]"
        );
        anyhow::ensure!(
            self.world.velocity_iterations > 0 && self.world.position_iterations > 0,
            "Solver iteration counts must be positive"
        );

        // Terrain validation
        anyhow::ensure!(self.terrain.tile_count > 0, "Tile count must be positive");
        anyhow::ensure!(
            self.terrain.tile_count <= 100_000,
            "Tile count too large (max 100000)"
        );
        anyhow::ensure!(
            self.terrain.tile_width > 0.0 && self.terrain.tile_height > 0.0,
            "Tile dimensions must be positive"
        );
        anyhow::ensure!(
            self.terrain.friction >= 0.0,
            "Terrain friction must be non-negative"
        );
        anyhow::ensure!(
            self.terrain.max_angle_factor >= 0.0 && self.terrain.angle_spread >= 0.0,
            "Terrain angle parameters must be non-negative"
        );

        // Vehicle validation
        anyhow::ensure!(self.vehicle.max_health > 0, "Max health must be positive");
        anyhow::ensure!(self.vehicle.health_step > 0, "Health step must be positive");
        anyhow::ensure!(
            self.vehicle.stall_epsilon >= 0.0,
            "Stall epsilon must be non-negative"
        );
        anyhow::ensure!(
            self.vehicle.motor_speed.is_finite(),
            "Motor speed must be finite"
        );

        // Shape validation
        anyhow::ensure!(self.chassis.min_axis > 0.0, "Chassis min axis must be positive");
        anyhow::ensure!(
            self.chassis.axis_span >= 0.0,
            "Chassis axis span must be non-negative"
        );
        anyhow::ensure!(self.chassis.density > 0.0, "Chassis density must be positive");
        anyhow::ensure!(self.wheel.min_radius > 0.0, "Wheel min radius must be positive");
        anyhow::ensure!(
            self.wheel.max_radius >= self.wheel.min_radius,
            "Wheel max radius must not be below min radius"
        );
        anyhow::ensure!(self.wheel.density > 0.0, "Wheel density must be positive");
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.chassis.restitution)
                && (0.0..=1.0).contains(&self.wheel.restitution),
            "Restitution must be in [0.0, 1.0]"
        );

        // Game validation
        anyhow::ensure!(
            self.game.population_size > 0,
            "Population size must be positive"
        );
        anyhow::ensure!(
            self.game.population_size <= 10_000,
            "Population size too large (max 10000)"
        );
        anyhow::ensure!(self.game.generations > 0, "Generation count must be positive");
        anyhow::ensure!(self.game.games > 0, "Game count must be positive");
        anyhow::ensure!(
            self.game.max_round_secs > 0.0,
            "Max round duration must be positive"
        );
        anyhow::ensure!(
            self.game.max_round_secs <= MAX_ROUND_SECS,
            "Max round duration too large (max {MAX_ROUND_SECS} s)"
        );
        anyhow::ensure!(
            self.game.scoreboard_interval > 0,
            "Scoreboard interval must be positive"
        );

        // Evolution validation
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.evolution.mutation_rate),
            "Mutation rate must be in [0.0, 1.0]"
        );
        anyhow::ensure!(
            self.evolution.mutation_scale >= 0.0,
            "Mutation scale must be non-negative"
        );

        Ok(())
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Validation for core entry points that cannot use `anyhow`.
    pub fn checked(&self) -> Result<&Self> {
        self.validate()
            .map_err(|e| CoreError::InvalidConfig(e.to_string()))?;
        Ok(self)
    }

    /// Hash of every section that influences simulation results.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.world).as_bytes());
        hasher.update(format!("{:?}", self.terrain).as_bytes());
        hasher.update(format!("{:?}", self.vehicle).as_bytes());
        hasher.update(format!("{:?}", self.chassis).as_bytes());
        hasher.update(format!("{:?}", self.wheel).as_bytes());
        hasher.update(format!("{:?}", self.evolution).as_bytes());
        hasher.update(self.game.car_seed.to_le_bytes());
        hasher.update(self.game.population_size.to_le_bytes());
        hex::encode(hasher.finalize())
    }
}
