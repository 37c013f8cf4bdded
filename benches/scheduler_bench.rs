//! Scheduler throughput benchmark: a packed system
//! of hard spheres driven through many events, comparing the heap and
//! calendar-queue FEL disciplines at increasing particle counts. Scenario E
//! asks that total CPU time scale sub-linearly in `N` per event; this
//! benchmark group lets `cargo bench` track that across commits rather than
//! asserting it (criterion reports distributions, not pass/fail booleans).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use edmd::config::{
    BoundaryConfig, Config, DynamicsConfig, DynamicsKind, EnsembleConfig, EnsembleKind,
    InteractionConfig, ParticlesConfig, SchedulerConfig,
};
use edmd::engine::Simulation;
use edmd::fel::SchedulerKind;
use edmd::particle::SpeciesProperties;
use edmd::rng::seeded;
use edmd::systems::Halt;
use edmd::vector::Vec3;
use rand::Rng;

/// Builds a cubic box of `n` hard spheres at packing fraction `phi` on a
/// simple-cubic lattice with small random velocity perturbations, the same
/// shape of setup scenario E describes (10 000 spheres at `phi = 0.3`,
/// scaled down here so the benchmark itself stays fast).
fn packed_hard_spheres(n: usize, phi: f64, sorter: SchedulerKind) -> Config {
    let diameter = 1.0_f64;
    let sphere_volume = std::f64::consts::PI / 6.0 * diameter.powi(3);
    let box_volume = n as f64 * sphere_volume / phi;
    let side = box_volume.cbrt();

    let per_axis = (n as f64).cbrt().ceil() as usize;
    let spacing = side / per_axis as f64;

    let mut rng = seeded(0);
    let mut positions = Vec::with_capacity(n);
    let mut velocities = Vec::with_capacity(n);
    'outer: for ix in 0..per_axis {
        for iy in 0..per_axis {
            for iz in 0..per_axis {
                if positions.len() == n {
                    break 'outer;
                }
                positions.push(Vec3::new(
                    (ix as f64 + 0.5) * spacing,
                    (iy as f64 + 0.5) * spacing,
                    (iz as f64 + 0.5) * spacing,
                ));
                velocities.push(Vec3::new(
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                    rng.random_range(-1.0..1.0),
                ));
            }
        }
    }

    Config {
        particles: ParticlesConfig {
            species: vec![SpeciesProperties { name: "A".into(), mass: 1.0, diameter }],
            positions,
            velocities,
            species_of: vec![0; n],
        },
        interactions: vec![InteractionConfig::HardSphere { a: 0, b: 0, diameter }],
        systems: vec![],
        dynamics: DynamicsConfig { kind: DynamicsKind::Newtonian, overlap_squash: false },
        boundary: BoundaryConfig::Periodic { box_size: Vec3::new(side, side, side) },
        scheduler: SchedulerConfig { sorter },
        ensemble: EnsembleConfig { kind: EnsembleKind::Nve },
    }
}

fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler_throughput");

    for &n in &[32usize, 128, 512] {
        for sorter in [SchedulerKind::Heap, SchedulerKind::Calendar] {
            let label = match sorter {
                SchedulerKind::Heap => "heap",
                SchedulerKind::Calendar => "calendar",
            };
            group.bench_with_input(BenchmarkId::new(label, n), &n, |b, &n| {
                b.iter(|| {
                    let config = packed_hard_spheres(n, 0.3, sorter);
                    let mut simulation = Simulation::new(&config, Halt::AfterEvents(2_000), seeded(1)).unwrap();
                    black_box(simulation.run());
                });
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_scheduler);
criterion_main!(benches);
