use criterion::{criterion_group, criterion_main, Criterion};
use dem::{AaWall, ContactParams, ParticleConfig, SimConfig, Simulation, Vec3};

fn packed_box(per_edge: usize) -> Simulation {
    let mut sim = Simulation::new(SimConfig {
        delta_t: 1e-4,
        cells_per_edge: 20,
        ..SimConfig::default()
    })
    .unwrap();
    sim.set_contact_params(
        ContactParams::new(1e5).with_restitution(0.8).with_friction(0.3, 5e4),
        ContactParams::new(1e5).with_restitution(0.8).with_friction(0.3, 5e4),
    )
    .unwrap();

    let h = 0.45;
    sim.add_walls([
        AaWall::new(Vec3::new(-h, -h, -h), Vec3::new(h, -h, h)).unwrap(),
        AaWall::new(Vec3::new(-h, h, -h), Vec3::new(h, h, h)).unwrap(),
        AaWall::new(Vec3::new(-h, -h, -h), Vec3::new(-h, h, h)).unwrap(),
        AaWall::new(Vec3::new(h, -h, -h), Vec3::new(h, h, h)).unwrap(),
        AaWall::new(Vec3::new(-h, -h, -h), Vec3::new(h, h, -h)).unwrap(),
        AaWall::new(Vec3::new(-h, -h, h), Vec3::new(h, h, h)).unwrap(),
    ]);

    let spacing = 0.8 / per_edge as f64;
    for i in 0..per_edge {
        for j in 0..per_edge {
            for k in 0..per_edge {
                let position = Vec3::new(i as f64, j as f64, k as f64) * spacing
                    - Vec3::splat(0.4 - 0.5 * spacing);
                let config = ParticleConfig::new(position, Vec3::new(0.1, 0.0, -0.1))
                    .diameter(0.9 * spacing.min(0.05))
                    .low_memory();
                sim.add_particle(config).unwrap();
            }
        }
    }
    sim
}

fn bench_step(c: &mut Criterion) {
    let mut sim = packed_box(10);
    c.bench_function("step_1000_particles", |b| b.iter(|| sim.step().unwrap()));
}

fn bench_run(c: &mut Criterion) {
    c.bench_function("run_125_particles_100_steps", |b| {
        b.iter(|| {
            let mut sim = packed_box(5);
            sim.run(100).unwrap();
        })
    });
}

criterion_group!(benches, bench_step, bench_run);
criterion_main!(benches);
