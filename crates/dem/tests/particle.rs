use std::f64::consts::PI;

use dem::{
    ConstantGravity, DemError, Particle, ParticleConfig, RotatingGravity, StillFluid, Vec3,
};

fn sphere(velocity: Vec3) -> Particle {
    let config = ParticleConfig::new(Vec3::new(0.0, 10.0, 0.0), velocity)
        .diameter(0.1)
        .density(2000.0);
    Particle::new(7, config).unwrap()
}

#[test]
fn derived_quantities() {
    let p = sphere(Vec3::new(3.0, 4.0, 0.0));
    let mass = 2000.0 * PI * 0.001 / 6.0;
    assert_eq!(p.id(), 7);
    assert!((p.mass() - mass).abs() < 1e-12);
    assert!((p.tau() - 2000.0 * 0.01 / (18.0 * 1.93e-5)).abs() < 1e-6);
    assert!((p.speed() - 5.0).abs() < 1e-12);
    assert!((p.kinetic_energy() - 0.5 * mass * 25.0).abs() < 1e-12);
    assert!((p.radius() - 0.05).abs() < 1e-15);
}

#[test]
fn free_fall_matches_analytic() {
    // tau is large enough that drag is negligible over one second.
    let mut p = sphere(Vec3::ZERO);
    let dt = 0.01;
    for _ in 0..100 {
        p.integrate(dt, false, Vec3::ZERO).unwrap();
    }
    let expected = 10.0 - 0.5 * 9.81 * 1.0;
    let diff = (p.position().y - expected).abs();
    assert!(diff < 1e-3, "diff={diff}");
}

#[test]
fn contact_force_accelerates_by_inverse_mass() {
    let config = ParticleConfig::new(Vec3::ZERO, Vec3::ZERO)
        .diameter(0.1)
        .gravity(ConstantGravity(Vec3::ZERO));
    let mut p = Particle::new(0, config).unwrap();
    let force = Vec3::new(p.mass(), 0.0, 0.0);
    p.integrate(1e-3, false, force).unwrap();
    assert!((p.velocity().x - 1e-3).abs() < 1e-12);
    assert!((p.position().x - 0.5e-6).abs() < 1e-15);
}

#[test]
fn zero_step_changes_nothing() {
    let mut p = sphere(Vec3::new(1.0, 0.0, 0.0));
    p.integrate(0.0, true, Vec3::new(5.0, 5.0, 5.0)).unwrap();
    assert_eq!(p.time(), 0.0);
    assert_eq!(p.position(), Vec3::new(0.0, 10.0, 0.0));
    assert_eq!(p.velocity(), Vec3::new(1.0, 0.0, 0.0));
    assert!(p.history().unwrap().is_empty());
}

#[test]
fn negative_step_is_rejected() {
    let mut p = sphere(Vec3::ZERO);
    let err = p.integrate(-1e-3, true, Vec3::ZERO).unwrap_err();
    assert!(matches!(err, DemError::InvalidParameter { name: "delta_t", .. }));
    assert!(p.integrate(f64::NAN, true, Vec3::ZERO).is_err());
}

#[test]
fn invalid_physical_parameters_fail_at_construction() {
    let base = ParticleConfig::default();
    assert!(Particle::new(0, base.clone().diameter(0.0)).is_err());
    assert!(Particle::new(0, base.clone().density(-1.0)).is_err());
    assert!(Particle::new(0, base.clone().fluid_viscosity(0.0)).is_err());
    assert!(Particle::new(0, base.fluid(StillFluid)).is_ok());
}

#[test]
fn history_records_each_step() {
    let mut p = sphere(Vec3::ZERO);
    for _ in 0..4 {
        p.integrate(0.25, true, Vec3::ZERO).unwrap();
    }
    let history = p.history().unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history.times, vec![0.25, 0.5, 0.75, 1.0]);
    assert_eq!(p.speed_at_index(3), Some(p.speed()));
    assert_eq!(p.speed_at_index(4), None);
    assert!((p.speed_at_time(0.5) - history.velocities[1].length()).abs() < 1e-15);
    assert_eq!(p.speed_at_time(0.6), 0.0);
}

#[test]
fn low_memory_particle_keeps_no_history() {
    let config = ParticleConfig::default().low_memory();
    let mut p = Particle::new(0, config).unwrap();
    p.integrate(0.1, true, Vec3::ZERO).unwrap();
    assert!(p.history().is_none());
    assert_eq!(p.speed_at_index(0), None);
    assert_eq!(p.speed_at_time(0.1), 0.0);
}

#[test]
fn gravity_field_sees_the_advanced_time() {
    let gravity = RotatingGravity {
        magnitude: 1.0,
        rate: 1.0,
    };
    let config = ParticleConfig::new(Vec3::ZERO, Vec3::ZERO)
        .diameter(0.1)
        .gravity(gravity);
    let mut p = Particle::new(0, config).unwrap();
    let t = (std::f64::consts::FRAC_PI_2).sqrt();
    p.integrate(t, false, Vec3::ZERO).unwrap();
    // Gravity is sampled at the end of the step, where the angle t^2 is pi/2.
    assert!(p.velocity().x > 0.99 * t, "vx = {}", p.velocity().x);
    assert!(p.velocity().y.abs() < 1e-9);
}
