//! Round-based population controller.
//!
//! One call to [`GenerationController::tick`] per physics frame. Within a
//! tick the order is fixed: vehicle updates, death cleanup, leader scan,
//! round-end check.

use crate::error::Result;
use crate::metrics::Metrics;
use crate::physics::PhysicsWorld;
use crate::reproduction::{top_vehicles, ReproductionPolicy};
use crate::vehicle::VehicleRuntime;
use dakar_data::{GenerationReport, RoundOutcome, VehicleSnapshot};
use std::time::{Duration, Instant};

pub struct GenerationController {
    population: Vec<VehicleRuntime>,
    policy: Box<dyn ReproductionPolicy>,
    generation: usize,
    killed: usize,
    deadline: Instant,
    max_round: Duration,
    leader: Option<usize>,
    overall_best: f64,
    round_ticks: u64,
    metrics: Metrics,
}

impl GenerationController {
    /// Starts generation 0 with `population`; the first deadline is
    /// `now + max_round`.
    #[must_use]
    pub fn new(
        population: Vec<VehicleRuntime>,
        policy: Box<dyn ReproductionPolicy>,
        max_round: Duration,
        now: Instant,
    ) -> Self {
        tracing::info!(generation = 0, population = population.len(), "Generation started");
        Self {
            population,
            policy,
            generation: 0,
            killed: 0,
            deadline: now + max_round,
            max_round,
            leader: None,
            overall_best: 0.0,
            round_ticks: 0,
            metrics: Metrics::new(),
        }
    }

    /// Advances the controller by one frame. Returns the report of the round
    /// that ended on this tick, if any; the next generation is already in
    /// place when it does.
    pub fn tick(
        &mut self,
        world: &mut dyn PhysicsWorld,
        now: Instant,
    ) -> Result<Option<GenerationReport>> {
        let started = Instant::now();

        let mut died = Vec::new();
        let mut failure = None;
        for (index, vehicle) in self.population.iter_mut().enumerate() {
            if !vehicle.is_alive() {
                continue;
            }
            let Some(rig) = vehicle.rig() else {
                continue;
            };
            match rig.read_motion(&*world) {
                Ok((position, velocity_x)) => {
                    if vehicle.update(position, velocity_x) {
                        died.push(index);
                    }
                }
                Err(err) => {
                    failure = Some(err);
                    break;
                }
            }
        }

        // Deaths recorded before a failed read are still released.
        self.release_dead(world, &died)?;
        self.metrics.record_kills(died.len());
        if let Some(err) = failure {
            return Err(err);
        }

        self.update_leader();
        self.round_ticks += 1;
        self.metrics.record_tick(
            started.elapsed(),
            self.alive_count(),
            self.leader_vehicle().map_or(0.0, VehicleRuntime::distance),
        );

        if self.killed >= self.population.len() {
            return self.end_round(world, now, RoundOutcome::AllKilled).map(Some);
        }
        if now > self.deadline {
            return self.end_round(world, now, RoundOutcome::TimedOut).map(Some);
        }
        Ok(None)
    }

    fn release_dead(&mut self, world: &mut dyn PhysicsWorld, died: &[usize]) -> Result<()> {
        for &index in died {
            if let Some(rig) = self.population[index].take_rig() {
                rig.release(&mut *world)?;
            }
            self.killed += 1;
            tracing::info!(
                generation = self.generation,
                vehicle = index,
                distance = self.population[index].distance(),
                killed = self.killed,
                "Vehicle killed"
            );
        }
        Ok(())
    }

    /// Best alive vehicle by distance; later index wins ties. Kept unchanged
    /// when nobody is alive.
    fn update_leader(&mut self) {
        let mut best: Option<(usize, f64)> = None;
        for (index, vehicle) in self.population.iter().enumerate() {
            if !vehicle.is_alive() {
                continue;
            }
            match best {
                Some((_, distance)) if vehicle.distance() < distance => {}
                _ => best = Some((index, vehicle.distance())),
            }
        }
        if let Some((index, _)) = best {
            self.leader = Some(index);
        }
    }

    fn end_round(
        &mut self,
        world: &mut dyn PhysicsWorld,
        now: Instant,
        outcome: RoundOutcome,
    ) -> Result<GenerationReport> {
        // Survivors of a timed-out round are retired so no rig outlives it.
        for vehicle in &mut self.population {
            if vehicle.kill() {
                if let Some(rig) = vehicle.take_rig() {
                    rig.release(&mut *world)?;
                }
            }
        }

        let best_distance = self
            .population
            .iter()
            .map(VehicleRuntime::distance)
            .fold(0.0, f64::max);
        self.overall_best = self.overall_best.max(best_distance);

        let report = GenerationReport {
            generation: self.generation,
            outcome,
            best_distance,
            overall_best: self.overall_best,
            killed: self.killed,
            population: self.population.len(),
            ticks: self.round_ticks,
        };
        tracing::info!(
            generation = report.generation,
            outcome = ?report.outcome,
            best_distance = report.best_distance,
            overall_best = report.overall_best,
            killed = report.killed,
            ticks = report.ticks,
            "Generation finished"
        );

        let next = self.policy.next_generation(world, &self.population)?;
        if next.is_empty() {
            tracing::warn!(
                generation = self.generation + 1,
                "Reproduction policy returned an empty population"
            );
        }

        self.population = next;
        self.killed = 0;
        self.deadline = now + self.max_round;
        self.generation += 1;
        self.leader = None;
        self.round_ticks = 0;
        self.metrics.record_generation();

        tracing::info!(
            generation = self.generation,
            population = self.population.len(),
            "Generation started"
        );
        Ok(report)
    }

    /// Releases every rig still held by the current population.
    pub fn release_all(&mut self, world: &mut dyn PhysicsWorld) -> Result<()> {
        for vehicle in &mut self.population {
            vehicle.kill();
            if let Some(rig) = vehicle.take_rig() {
                rig.release(&mut *world)?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn population(&self) -> &[VehicleRuntime] {
        &self.population
    }

    /// Zero-based index of the running generation.
    #[must_use]
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Vehicles killed so far this round.
    #[must_use]
    pub fn killed(&self) -> usize {
        self.killed
    }

    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    #[must_use]
    pub fn leader(&self) -> Option<usize> {
        self.leader
    }

    #[must_use]
    pub fn leader_vehicle(&self) -> Option<&VehicleRuntime> {
        self.leader.and_then(|i| self.population.get(i))
    }

    /// Best round distance over every completed round.
    #[must_use]
    pub fn overall_best(&self) -> f64 {
        self.overall_best
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.population.iter().filter(|v| v.is_alive()).count()
    }

    #[must_use]
    pub fn round_ticks(&self) -> u64 {
        self.round_ticks
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    #[must_use]
    pub fn snapshots(&self) -> Vec<VehicleSnapshot> {
        self.population
            .iter()
            .enumerate()
            .map(|(i, v)| v.snapshot(i))
            .collect()
    }

    /// Current distances of the best `n` vehicles, best first.
    #[must_use]
    pub fn top_distances(&self, n: usize) -> Vec<f64> {
        top_vehicles(&self.population, n)
            .into_iter()
            .map(VehicleRuntime::distance)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::build_random_genome;
    use crate::config::{ChassisConfig, WheelConfig};
    use crate::reproduction::IdentityPolicy;
    use crate::rig::RigBuilder;
    use crate::testing::ScriptedWorld;
    use dakar_data::Vec2;

    const ROUND: Duration = Duration::from_secs(120);

    fn spawn(world: &mut ScriptedWorld, n: usize) -> Vec<VehicleRuntime> {
        let builder = RigBuilder::default();
        (0..n)
            .map(|i| {
                let genome =
                    build_random_genome(666, i, &ChassisConfig::default(), &WheelConfig::default());
                builder
                    .instantiate(genome, &mut *world, Vec2::new(1.0, 2.0))
                    .expect("instantiate")
            })
            .collect()
    }

    fn controller(world: &mut ScriptedWorld, n: usize, t0: Instant) -> GenerationController {
        let population = spawn(world, n);
        GenerationController::new(population, Box::new(IdentityPolicy::default()), ROUND, t0)
    }

    #[test]
    fn test_stalled_round_ends_by_kills() {
        let mut world = ScriptedWorld::new();
        let t0 = Instant::now();
        let mut ctl = controller(&mut world, 4, t0);

        for _ in 0..49 {
            assert!(ctl.tick(&mut world, t0).expect("tick").is_none());
        }
        let report = ctl.tick(&mut world, t0).expect("tick").expect("round over");
        assert_eq!(report.outcome, RoundOutcome::AllKilled);
        assert_eq!(report.killed, 4);
        assert_eq!(report.ticks, 50);
        assert_eq!(report.best_distance, 0.0);
        assert_eq!(ctl.generation(), 1);
        assert_eq!(ctl.killed(), 0);
        assert_eq!(ctl.alive_count(), 4);
        // Old rigs released, new ones built.
        assert_eq!(world.live_dynamic_bodies(), 12);
        assert_eq!(world.destroyed(), 12);
    }

    #[test]
    fn test_round_ends_on_deadline() {
        let mut world = ScriptedWorld::new().with_default_velocity(Vec2::new(2.0, 0.0));
        let t0 = Instant::now();
        let mut ctl = controller(&mut world, 3, t0);

        assert!(ctl.tick(&mut world, t0 + ROUND).expect("tick").is_none());
        world.step(0.5, 10, 10);
        let report = ctl
            .tick(&mut world, t0 + ROUND + Duration::from_millis(1))
            .expect("tick")
            .expect("timed out");
        assert_eq!(report.outcome, RoundOutcome::TimedOut);
        assert_eq!(report.killed, 0);
        assert!((report.best_distance - 1.0).abs() < 1e-9);
        assert!((ctl.overall_best() - 1.0).abs() < 1e-9);
        assert_eq!(
            ctl.deadline(),
            t0 + ROUND + Duration::from_millis(1) + ROUND
        );
        // Survivors were retired before the policy rebuilt them.
        assert_eq!(world.destroyed(), 9);
        assert_eq!(world.live_dynamic_bodies(), 9);
    }

    #[test]
    fn test_leader_prefers_later_on_ties() {
        let mut world = ScriptedWorld::new().with_default_velocity(Vec2::new(1.0, 0.0));
        let t0 = Instant::now();
        let mut ctl = controller(&mut world, 3, t0);
        world.step(1.0, 10, 10);
        ctl.tick(&mut world, t0).expect("tick");
        assert_eq!(ctl.leader(), Some(2));
    }

    #[test]
    fn test_leader_tracks_furthest() {
        let mut world = ScriptedWorld::new();
        let t0 = Instant::now();
        let mut ctl = controller(&mut world, 3, t0);
        let chassis = ctl.population()[0].rig().expect("rig").chassis();
        world
            .set_linear_velocity(chassis, Vec2::new(3.0, 0.0))
            .expect("velocity");
        world.step(1.0, 10, 10);
        ctl.tick(&mut world, t0).expect("tick");
        assert_eq!(ctl.leader(), Some(0));
        assert_eq!(ctl.top_distances(2), vec![3.0, 0.0]);
    }

    #[test]
    fn test_overall_best_never_decreases() {
        let mut world = ScriptedWorld::new().with_default_velocity(Vec2::new(4.0, 0.0));
        let t0 = Instant::now();
        let mut ctl = controller(&mut world, 2, t0);
        world.step(1.0, 10, 10);
        let first = ctl
            .tick(&mut world, t0 + ROUND * 2)
            .expect("tick")
            .expect("timeout");
        assert!((first.overall_best - 4.0).abs() < 1e-9);

        // Second round: everyone stalls at the start.
        world.set_all_velocities(Vec2::ZERO);
        let mut second = None;
        for _ in 0..50 {
            second = ctl.tick(&mut world, t0 + ROUND * 2).expect("tick");
        }
        let second = second.expect("all killed");
        assert_eq!(second.best_distance, 0.0);
        assert!((second.overall_best - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_policy_output_ends_next_round_at_once() {
        let mut world = ScriptedWorld::new();
        let t0 = Instant::now();
        let population = spawn(&mut world, 1);
        let policy = |_: &mut dyn PhysicsWorld, _: &[VehicleRuntime]| -> Result<Vec<VehicleRuntime>> {
            Ok(Vec::new())
        };
        let mut ctl = GenerationController::new(population, Box::new(policy), ROUND, t0);
        let mut reports = 0;
        for _ in 0..50 {
            if ctl.tick(&mut world, t0).expect("tick").is_some() {
                reports += 1;
            }
        }
        assert_eq!(reports, 1);
        let empty = ctl.tick(&mut world, t0).expect("tick").expect("ends");
        assert_eq!(empty.population, 0);
        assert_eq!(empty.best_distance, 0.0);
    }

    #[test]
    fn test_failed_read_still_releases_earlier_deaths() {
        let mut world = ScriptedWorld::new();
        let t0 = Instant::now();
        let mut ctl = controller(&mut world, 3, t0);
        for _ in 0..49 {
            assert!(ctl.tick(&mut world, t0).expect("tick").is_none());
        }

        let lost = ctl.population()[2].rig().expect("rig").chassis();
        world.destroy_body(lost).expect("destroy");

        let err = ctl.tick(&mut world, t0).expect_err("chassis is gone");
        assert_eq!(err, crate::error::CoreError::UnknownBody(lost));
        assert_eq!(ctl.killed(), 2);
        assert!(ctl.population()[0].rig().is_none());
        assert!(ctl.population()[1].rig().is_none());
        // Only the orphaned wheels of the third car remain.
        assert_eq!(world.live_dynamic_bodies(), 2);
        assert_eq!(world.destroyed(), 7);
    }

    #[test]
    fn test_release_all_empties_world() {
        let mut world = ScriptedWorld::new();
        let t0 = Instant::now();
        let mut ctl = controller(&mut world, 5, t0);
        ctl.release_all(&mut world).expect("release");
        ctl.release_all(&mut world).expect("second call is a no-op");
        assert_eq!(world.live_bodies(), 0);
        assert_eq!(ctl.alive_count(), 0);
    }
}
