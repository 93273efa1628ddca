//! Pluggable next-generation policies.
//!
//! The controller hands the finished population to a [`ReproductionPolicy`]
//! once per round. Every rig in that population has already been released;
//! the policy instantiates whatever it returns.

use crate::config::{AppConfig, ChassisConfig, EvolutionConfig, PolicyKind, WheelConfig};
use crate::error::Result;
use crate::genome::draw_attachments;
use crate::physics::PhysicsWorld;
use crate::rig::RigBuilder;
use crate::vehicle::VehicleRuntime;
use dakar_data::{CarGenome, CHASSIS_VERTEX_COUNT, WHEEL_COUNT};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub trait ReproductionPolicy {
    /// Derives the next population from the one that just finished.
    /// Size may differ from the input.
    fn next_generation(
        &mut self,
        world: &mut dyn PhysicsWorld,
        population: &[VehicleRuntime],
    ) -> Result<Vec<VehicleRuntime>>;
}

impl<F> ReproductionPolicy for F
where
    F: FnMut(&mut dyn PhysicsWorld, &[VehicleRuntime]) -> Result<Vec<VehicleRuntime>>,
{
    fn next_generation(
        &mut self,
        world: &mut dyn PhysicsWorld,
        population: &[VehicleRuntime],
    ) -> Result<Vec<VehicleRuntime>> {
        self(world, population)
    }
}

/// Best `n` vehicles by distance, best first. Ties keep population order.
#[must_use]
pub fn top_vehicles(population: &[VehicleRuntime], n: usize) -> Vec<&VehicleRuntime> {
    let mut ranked: Vec<&VehicleRuntime> = population.iter().collect();
    ranked.sort_by(|a, b| b.distance().total_cmp(&a.distance()));
    ranked.truncate(n);
    ranked
}

/// Re-instantiates every genome unchanged, in order.
#[derive(Debug, Clone, Default)]
pub struct IdentityPolicy {
    builder: RigBuilder,
}

impl IdentityPolicy {
    #[must_use]
    pub fn new(builder: RigBuilder) -> Self {
        Self { builder }
    }
}

impl ReproductionPolicy for IdentityPolicy {
    fn next_generation(
        &mut self,
        world: &mut dyn PhysicsWorld,
        population: &[VehicleRuntime],
    ) -> Result<Vec<VehicleRuntime>> {
        population
            .iter()
            .map(|v| self.builder.instantiate(v.genome().clone(), &mut *world, v.start()))
            .collect()
    }
}

/// Keeps the best genomes and fills the population with mutated copies of
/// them.
#[derive(Debug, Clone)]
pub struct ElitistPolicy {
    builder: RigBuilder,
    elite_count: usize,
    mutation_rate: f64,
    mutation_scale: f64,
    rng: ChaCha8Rng,
}

impl ElitistPolicy {
    #[must_use]
    pub fn new(builder: RigBuilder, evolution: &EvolutionConfig) -> Self {
        Self {
            builder,
            elite_count: evolution.elite_count,
            mutation_rate: evolution.mutation_rate,
            mutation_scale: evolution.mutation_scale,
            rng: ChaCha8Rng::seed_from_u64(evolution.seed),
        }
    }

    /// Copy of `parent` with each gene perturbed with probability
    /// `mutation_rate`. Results stay inside the configured ranges.
    pub fn mutate(&mut self, parent: &CarGenome) -> CarGenome {
        let wheel: &WheelConfig = self.builder.wheel_config();
        let chassis: &ChassisConfig = self.builder.chassis_config();
        let mut child = parent.clone();

        let radius_span = wheel.max_radius - wheel.min_radius;
        for radius in &mut child.wheel_radii {
            if self.rng.gen_bool(self.mutation_rate) {
                let delta = self.rng.gen_range(-1.0..=1.0) * self.mutation_scale * radius_span;
                *radius = (*radius + delta).clamp(wheel.min_radius, wheel.max_radius);
            }
        }

        for vertex in &mut child.chassis_vertices {
            if self.rng.gen_bool(self.mutation_rate) {
                let length = vertex.length();
                if length > 0.0 {
                    let delta =
                        self.rng.gen_range(-1.0..=1.0) * self.mutation_scale * chassis.axis_span;
                    let target = (length + delta).clamp(chassis.min_axis, chassis.max_axis());
                    *vertex = *vertex * (target / length);
                }
            }
        }

        if self.rng.gen_bool(self.mutation_rate) {
            child.motor_wheel_index = (child.motor_wheel_index + 1) % WHEEL_COUNT;
        }

        if self.rng.gen_bool(self.mutation_rate) {
            child.wheel_vertices = draw_attachments(&mut self.rng, CHASSIS_VERTEX_COUNT, WHEEL_COUNT);
        }

        child
    }
}

impl ReproductionPolicy for ElitistPolicy {
    fn next_generation(
        &mut self,
        world: &mut dyn PhysicsWorld,
        population: &[VehicleRuntime],
    ) -> Result<Vec<VehicleRuntime>> {
        let Some(start) = population.first().map(VehicleRuntime::start) else {
            return Ok(Vec::new());
        };

        let ranked = top_vehicles(population, population.len());
        let elites: Vec<CarGenome> = ranked
            .iter()
            .take(self.elite_count.max(1))
            .map(|v| v.genome().clone())
            .collect();

        let mut genomes = elites.clone();
        let mut parent = 0;
        while genomes.len() < population.len() {
            let child = self.mutate(&elites[parent % elites.len()]);
            genomes.push(child);
            parent += 1;
        }
        genomes.truncate(population.len());

        tracing::debug!(
            elites = elites.len(),
            children = genomes.len() - elites.len().min(genomes.len()),
            "Elitist generation bred"
        );

        genomes
            .into_iter()
            .map(|genome| self.builder.instantiate(genome, &mut *world, start))
            .collect()
    }
}

/// Policy selected by `[evolution] policy`.
#[must_use]
pub fn policy_from_config(config: &AppConfig) -> Box<dyn ReproductionPolicy> {
    let builder = RigBuilder::new(
        config.chassis.clone(),
        config.wheel.clone(),
        config.vehicle.clone(),
    );
    match config.evolution.policy {
        PolicyKind::Identity => Box::new(IdentityPolicy::new(builder)),
        PolicyKind::Elitist => Box::new(ElitistPolicy::new(builder, &config.evolution)),
    }
}
