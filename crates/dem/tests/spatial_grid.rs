use std::collections::HashSet;

use dem::{pair_key, BroadPhaseGrid, Particle, ParticleConfig, Vec3};

fn particle_at(pid: u64, position: Vec3) -> Particle {
    Particle::new(pid, ParticleConfig::new(position, Vec3::ZERO).diameter(0.05)).unwrap()
}

/// Deterministic pseudo-random positions in [lo, hi)^3.
fn scattered(count: usize, lo: f64, hi: f64) -> Vec<Particle> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        #[allow(clippy::cast_precision_loss)]
        let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
        lo + unit * (hi - lo)
    };
    (0..count)
        .map(|i| particle_at(i as u64, Vec3::new(next(), next(), next())))
        .collect()
}

#[test]
fn candidate_pairs_are_unique_and_never_self() {
    let particles = scattered(400, 0.0, 1.0);
    let mut grid = BroadPhaseGrid::new(8, 0.0, 1.0).unwrap();
    assert_eq!(grid.assign(&particles), particles.len());

    let pairs = grid.candidate_pairs();
    assert!(!pairs.is_empty());
    let mut seen = HashSet::new();
    for pair in &pairs {
        assert_ne!(pair.first, pair.second, "self pair emitted");
        let (a, b) = (particles[pair.first].id(), particles[pair.second].id());
        assert!(a < b, "first slot must hold the lower id");
        assert_eq!(pair.key, pair_key(a, b));
        assert!(seen.insert((a, b)), "pair ({a}, {b}) emitted twice");
    }
}

#[test]
fn every_pair_within_one_cell_is_proposed() {
    let particles = scattered(300, 0.0, 1.0);
    let mut grid = BroadPhaseGrid::new(6, 0.0, 1.0).unwrap();
    grid.assign(&particles);
    let cell = grid.cell_size();

    let proposed: HashSet<u128> = grid.candidate_pairs().iter().map(|p| p.key).collect();
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            if (a.position() - b.position()).length() <= cell {
                assert!(
                    proposed.contains(&pair_key(a.id(), b.id())),
                    "neighbours {} and {} were not proposed",
                    a.id(),
                    b.id()
                );
            }
        }
    }
}

#[test]
fn crowded_cell_pairs_once() {
    let particles: Vec<_> = (0..5)
        .map(|i| particle_at(i, Vec3::new(0.51, 0.52, 0.53 + 0.001 * i as f64)))
        .collect();
    let mut grid = BroadPhaseGrid::new(4, 0.0, 1.0).unwrap();
    grid.assign(&particles);
    assert_eq!(grid.candidate_pairs().len(), 5 * 4 / 2);
}

#[test]
fn neighbourhood_is_clipped_and_limited_to_adjacent_cells() {
    let particles = vec![
        particle_at(0, Vec3::new(0.05, 0.05, 0.05)), // cell (0, 0, 0)
        particle_at(1, Vec3::new(0.15, 0.15, 0.15)), // cell (1, 1, 1)
        particle_at(2, Vec3::new(0.25, 0.05, 0.05)), // cell (2, 0, 0)
    ];
    let mut grid = BroadPhaseGrid::new(10, 0.0, 1.0).unwrap();
    grid.assign(&particles);
    assert_eq!(grid.cell([0, 0, 0]), &[0]);

    let keys: HashSet<u128> = grid.candidate_pairs().iter().map(|p| p.key).collect();
    assert!(keys.contains(&pair_key(0, 1)));
    assert!(keys.contains(&pair_key(1, 2)));
    assert!(!keys.contains(&pair_key(0, 2)), "cells two apart must not pair");
}

#[test]
fn out_of_domain_particles_are_excluded() {
    let particles = vec![
        particle_at(0, Vec3::new(0.5, 0.5, 0.5)),
        particle_at(1, Vec3::new(0.52, 0.5, 0.5)),
        particle_at(2, Vec3::new(1.5, 0.5, 0.5)),
        particle_at(3, Vec3::new(0.5, -0.01, 0.5)),
    ];
    let mut grid = BroadPhaseGrid::new(5, 0.0, 1.0).unwrap();
    assert_eq!(grid.assign(&particles), 2);
    assert_eq!(grid.excluded(), 2);

    let pairs = grid.candidate_pairs();
    assert_eq!(pairs.len(), 1);
    assert_eq!(pairs[0].key, pair_key(0, 1));

    grid.reset();
    grid.assign(&particles);
    assert_eq!(grid.excluded_total(), 4);
}

#[test]
fn reset_clears_all_cells() {
    let particles = scattered(50, 0.0, 1.0);
    let mut grid = BroadPhaseGrid::new(4, 0.0, 1.0).unwrap();
    grid.assign(&particles);
    let stats = grid.stats();
    assert_eq!(stats.total_entries, 50);
    assert!(stats.occupied_cells > 0);

    grid.reset();
    assert_eq!(grid.stats().occupied_cells, 0);
    assert!(grid.candidate_pairs().is_empty());
    assert_eq!(grid.excluded(), 0);
}
