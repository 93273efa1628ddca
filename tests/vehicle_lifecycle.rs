use dakar_core::config::{ChassisConfig, FitnessMode, VehicleConfig, WheelConfig};
use dakar_core::genome::build_random_genome;
use dakar_core::testing::ScriptedWorld;
use dakar_core::vehicle::HealthRules;
use dakar_core::{LifeState, PhysicsWorld, RigBuilder, VehicleRuntime};
use dakar_data::Vec2;
use proptest::prelude::*;

mod common;

fn bare_vehicle(rules: HealthRules) -> VehicleRuntime {
    let genome = build_random_genome(666, 1, &ChassisConfig::default(), &WheelConfig::default());
    VehicleRuntime::new(genome, None, Vec2::new(1.0, 2.0), rules)
}

#[test]
fn test_stalled_vehicle_dies_on_fiftieth_tick() {
    let mut vehicle = bare_vehicle(HealthRules::default());
    for tick in 1..50 {
        assert!(!vehicle.update(Vec2::new(1.0, 2.0), 0.0), "died early at {tick}");
        assert_eq!(vehicle.health(), 100 - 2 * tick);
    }
    assert!(vehicle.update(Vec2::new(1.0, 2.0), 0.0));
    assert_eq!(vehicle.state(), LifeState::Dead);
    assert_eq!(vehicle.health(), 0);
}

#[test]
fn test_moving_vehicle_keeps_health() {
    let mut vehicle = bare_vehicle(HealthRules::default());
    for tick in 0..1000 {
        let x = 1.0 + tick as f64 * 0.1;
        assert!(!vehicle.update(Vec2::new(x, 2.0), 6.0));
    }
    assert!(vehicle.is_alive());
    assert_eq!(vehicle.health(), 100);
    assert_close!(vehicle.distance(), 99.9, 1e-9);
}

#[test]
fn test_reversing_counts_as_moving_with_negative_distance() {
    let mut vehicle = bare_vehicle(HealthRules::default());
    vehicle.update(Vec2::new(-2.0, 2.0), -3.0);
    assert!(vehicle.is_alive());
    assert_eq!(vehicle.health(), 100);
    assert_close!(vehicle.distance(), -3.0);
}

#[test]
fn test_stall_threshold_is_strict() {
    let rules = HealthRules {
        stall_epsilon: 0.5,
        ..HealthRules::default()
    };
    let mut vehicle = bare_vehicle(rules);
    vehicle.update(Vec2::new(1.0, 2.0), 0.5);
    assert_eq!(vehicle.health(), 100);
    vehicle.update(Vec2::new(1.0, 2.0), -0.49);
    assert_eq!(vehicle.health(), 98);
}

#[test]
fn test_running_max_keeps_best_displacement() {
    let rules = HealthRules {
        fitness: FitnessMode::RunningMax,
        ..HealthRules::default()
    };
    let mut vehicle = bare_vehicle(rules);
    vehicle.update(Vec2::new(6.0, 2.0), 1.0);
    vehicle.update(Vec2::new(3.0, 2.0), -1.0);
    assert_close!(vehicle.distance(), 5.0);
}

#[test]
fn test_rig_in_stalled_world_dies_and_releases_once() {
    let mut world = ScriptedWorld::new();
    let genome = build_random_genome(42, 3, &ChassisConfig::default(), &WheelConfig::default());
    let mut vehicle = RigBuilder::default()
        .instantiate(genome, &mut world, VehicleConfig::default().start_position)
        .expect("rig builds");
    assert_live_rigs!(world, 1);

    let mut died_at = None;
    for tick in 1..=60 {
        let (position, velocity_x) = vehicle
            .rig()
            .expect("rig held while alive")
            .read_motion(&world)
            .expect("rig bodies exist");
        if vehicle.update(position, velocity_x) {
            died_at = Some(tick);
            break;
        }
        world.step(1.0 / 60.0, 20, 20);
    }
    assert_eq!(died_at, Some(50));

    let rig = vehicle.take_rig().expect("rig yielded once");
    assert!(vehicle.take_rig().is_none());
    rig.release(&mut world).expect("release succeeds");
    assert_live_rigs!(world, 0);
    assert_eq!(world.live_joints(), 0);
}

#[test]
fn test_kill_reports_previous_state() {
    let mut vehicle = bare_vehicle(HealthRules::default());
    assert!(vehicle.kill());
    assert!(!vehicle.kill());
    assert!(!vehicle.is_alive());
}

#[derive(Debug, Clone)]
enum Input {
    Moving(f64, f64),
    Stalled(f64),
    Kill,
}

fn arb_input() -> impl Strategy<Value = Input> {
    prop_oneof![
        6 => (-50.0f64..50.0, prop_oneof![-10.0f64..-0.01, 0.01f64..10.0])
            .prop_map(|(x, v)| Input::Moving(x, v)),
        3 => (-50.0f64..50.0).prop_map(Input::Stalled),
        1 => Just(Input::Kill),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_health_state_machine_invariants(
        inputs in prop::collection::vec(arb_input(), 0..200)
    ) {
        let mut vehicle = bare_vehicle(HealthRules::default());
        let mut was_dead = false;
        let mut frozen_distance = None;

        for input in inputs {
            let before = vehicle.health();
            let died = match input {
                Input::Moving(x, v) => vehicle.update(Vec2::new(x, 0.0), v),
                Input::Stalled(x) => vehicle.update(Vec2::new(x, 0.0), 0.0),
                Input::Kill => {
                    vehicle.kill();
                    false
                }
            };

            prop_assert!(vehicle.health() <= before);
            prop_assert!(vehicle.health() >= 0);
            if died {
                prop_assert!(!was_dead);
                prop_assert_eq!(vehicle.health(), 0);
            }
            if was_dead {
                prop_assert_eq!(vehicle.state(), LifeState::Dead);
                prop_assert_eq!(Some(vehicle.distance()), frozen_distance);
            }
            if !vehicle.is_alive() && !was_dead {
                was_dead = true;
                frozen_distance = Some(vehicle.distance());
            }
        }
    }
}
