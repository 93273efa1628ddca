use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dakar_core::config::{ChassisConfig, TerrainConfig, WheelConfig};
use dakar_core::genome::{build_random_genome, validate_genome};
use dakar_core::terrain::TerrainGenerator;

fn bench_terrain_generate(c: &mut Criterion) {
    let generator = TerrainGenerator::new(TerrainConfig::default());

    c.bench_function("terrain_generate_200", |b| {
        b.iter(|| black_box(generator.generate(black_box(42), 200)))
    });

    c.bench_function("terrain_generate_10000", |b| {
        b.iter(|| black_box(generator.generate(black_box(42), 10_000)))
    });
}

fn bench_genome_population(c: &mut Criterion) {
    let chassis = ChassisConfig::default();
    let wheel = WheelConfig::default();

    c.bench_function("genome_sample_population_20", |b| {
        b.iter(|| {
            let genomes: Vec<_> = (0..20)
                .map(|i| build_random_genome(black_box(666), i, &chassis, &wheel))
                .collect();
            black_box(genomes)
        })
    });

    let genome = build_random_genome(666, 1, &chassis, &wheel);
    c.bench_function("genome_validate", |b| {
        b.iter(|| black_box(validate_genome(black_box(&genome)).is_ok()))
    });
}

criterion_group!(benches, bench_terrain_generate, bench_genome_population);
criterion_main!(benches);
