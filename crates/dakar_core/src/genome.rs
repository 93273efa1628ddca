//! Seeded genome sampling and structural validation.

use crate::config::{ChassisConfig, WheelConfig};
use crate::error::{CoreError, Result};
use dakar_data::{CarGenome, Vec2, CHASSIS_VERTEX_COUNT, WHEEL_COUNT};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Samples the genome of car `index` from `seed`.
///
/// The stream is seeded with `seed * index` (wrapping), so every index at a
/// fixed seed gets its own reproducible genome. Draw order: motor wheel,
/// wheel radii, chassis axes (+x, +y, -x, -y), attachment vertices.
#[must_use]
pub fn build_random_genome(
    seed: u64,
    index: usize,
    chassis: &ChassisConfig,
    wheel: &WheelConfig,
) -> CarGenome {
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_mul(index as u64));

    let motor_wheel_index = rng.gen_range(0..WHEEL_COUNT);

    let radius_span = wheel.max_radius - wheel.min_radius;
    let wheel_radii = (0..WHEEL_COUNT)
        .map(|_| wheel.min_radius + rng.gen::<f64>() * radius_span)
        .collect();

    let mut axis = || chassis.min_axis + rng.gen::<f64>() * chassis.axis_span;
    let chassis_vertices = vec![
        Vec2::new(axis(), 0.0),
        Vec2::new(0.0, axis()),
        Vec2::new(-axis(), 0.0),
        Vec2::new(0.0, -axis()),
    ];

    let wheel_vertices = draw_attachments(&mut rng, CHASSIS_VERTEX_COUNT, WHEEL_COUNT);

    CarGenome {
        wheel_radii,
        wheel_vertices,
        motor_wheel_index,
        chassis_vertices,
    }
}

/// Draws `count` distinct indices from `0..pool_size`, each uniformly over
/// the indices not chosen yet. Order-sensitive: the first draw sees the
/// full pool.
pub fn draw_attachments<R: Rng + ?Sized>(rng: &mut R, pool_size: usize, count: usize) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..pool_size).collect();
    let mut chosen = Vec::with_capacity(count.min(pool_size));
    while chosen.len() < count && !pool.is_empty() {
        let slot = rng.gen_range(0..pool.len());
        chosen.push(pool.remove(slot));
    }
    chosen
}

/// Checks the structural contract every rig relies on.
pub fn validate_genome(genome: &CarGenome) -> Result<()> {
    if genome.wheel_count() != WHEEL_COUNT {
        return Err(CoreError::invalid_genome(format!(
            "expected {WHEEL_COUNT} wheel radii, got {}",
            genome.wheel_count()
        )));
    }
    if genome.wheel_vertices.len() != WHEEL_COUNT {
        return Err(CoreError::invalid_genome(format!(
            "expected {WHEEL_COUNT} attachment vertices, got {}",
            genome.wheel_vertices.len()
        )));
    }
    if genome.vertex_count() != CHASSIS_VERTEX_COUNT {
        return Err(CoreError::invalid_genome(format!(
            "expected {CHASSIS_VERTEX_COUNT} chassis vertices, got {}",
            genome.vertex_count()
        )));
    }
    if genome.motor_wheel_index >= WHEEL_COUNT {
        return Err(CoreError::invalid_genome(format!(
            "motor wheel index {} out of range",
            genome.motor_wheel_index
        )));
    }
    for (wheel, &vertex) in genome.wheel_vertices.iter().enumerate() {
        if vertex >= CHASSIS_VERTEX_COUNT {
            return Err(CoreError::invalid_genome(format!(
                "wheel {wheel} attached to missing vertex {vertex}"
            )));
        }
        if genome.wheel_vertices[..wheel].contains(&vertex) {
            return Err(CoreError::invalid_genome(format!(
                "vertex {vertex} carries more than one wheel"
            )));
        }
    }
    if let Some(radius) = genome
        .wheel_radii
        .iter()
        .find(|r| !(r.is_finite() && **r > 0.0))
    {
        return Err(CoreError::invalid_genome(format!("wheel radius {radius} not positive")));
    }
    if genome.chassis_vertices.iter().any(|v| !v.is_finite()) {
        return Err(CoreError::invalid_genome("chassis vertex not finite"));
    }
    Ok(())
}
