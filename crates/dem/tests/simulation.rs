use dem::{
    ConstantGravity, ContactParams, DemError, ParticleConfig, SimConfig, Simulation, StepPhase,
    Vec3,
};

fn weightless(position: Vec3, velocity: Vec3) -> ParticleConfig {
    ParticleConfig::new(position, velocity)
        .diameter(0.1)
        .gravity(ConstantGravity(Vec3::ZERO))
        .low_memory()
}

fn sim_with_dt(delta_t: f64) -> Simulation {
    Simulation::new(SimConfig {
        delta_t,
        ..SimConfig::default()
    })
    .unwrap()
}

#[test]
fn ids_are_sequential() -> anyhow::Result<()> {
    let mut sim = sim_with_dt(1e-3);
    for expected in 0..3 {
        let pid = sim.add_particle(weightless(Vec3::splat(0.1 * expected as f64), Vec3::ZERO))?;
        assert_eq!(pid, expected);
    }
    assert_eq!(sim.particle_by_id(2).map(|p| p.id()), Some(2));
    assert!(sim.particle_by_id(3).is_none());
    Ok(())
}

#[test]
fn oversized_particles_are_rejected() {
    let mut sim = sim_with_dt(1e-3);
    let err = sim
        .add_particle(weightless(Vec3::ZERO, Vec3::ZERO).diameter(0.2))
        .unwrap_err();
    assert!(matches!(err, DemError::InvalidParameter { name: "diameter", .. }));
    assert!(sim.particles().is_empty());
}

#[test]
fn bad_configuration_is_rejected() {
    let zero_step = Simulation::new(SimConfig {
        delta_t: 0.0,
        ..SimConfig::default()
    });
    assert!(zero_step.is_err());

    let inverted = Simulation::new(SimConfig {
        domain_min: 1.0,
        domain_max: -1.0,
        ..SimConfig::default()
    });
    assert!(inverted.is_err());

    let mut sim = sim_with_dt(1e-3);
    assert!(sim
        .set_contact_params(ContactParams::new(-1.0), ContactParams::default())
        .is_err());
    assert!(sim
        .set_contact_params(ContactParams::default(), ContactParams::new(1.0).with_restitution(1.5))
        .is_err());
    assert!(matches!(
        sim.particle_mut(99),
        Err(DemError::UnknownParticle(99))
    ));
}

#[test]
fn step_returns_to_idle_and_advances_time() -> anyhow::Result<()> {
    let mut sim = sim_with_dt(1e-3);
    sim.add_particle(weightless(Vec3::ZERO, Vec3::X))?;
    assert_eq!(sim.phase(), StepPhase::Idle);

    let report = sim.step()?;
    assert_eq!(sim.phase(), StepPhase::Idle);
    assert_eq!(report.step, 1);
    assert_eq!(sim.steps(), 1);
    assert!((sim.time() - 1e-3).abs() < 1e-15);
    assert!((sim.particles()[0].time() - sim.time()).abs() < 1e-15);
    assert_eq!(report.grid.total_entries, 1);
    Ok(())
}

#[test]
fn head_on_collision_conserves_momentum() -> anyhow::Result<()> {
    let mut sim = sim_with_dt(1e-5);
    let params = ContactParams::new(1e5).with_restitution(0.8);
    sim.set_contact_params(params, params)?;
    sim.add_particle(weightless(Vec3::new(-0.06, 0.0, 0.0), Vec3::X))?;
    sim.add_particle(weightless(Vec3::new(0.06, 0.0, 0.0), -Vec3::X))?;

    let mut saw_contact = false;
    for _ in 0..3000 {
        let report = sim.step()?;
        saw_contact |= report.particle_contacts > 0;
    }
    assert!(saw_contact, "particles never touched");
    assert_eq!(sim.active_contacts(), 0, "contact outlived separation");

    let (a, b) = (&sim.particles()[0], &sim.particles()[1]);
    let momentum = a.velocity() * a.mass() + b.velocity() * b.mass();
    assert!(momentum.length() < 1e-12, "momentum = {momentum:?}");
    assert!(a.velocity().x < 0.0 && b.velocity().x > 0.0);
    let rebound = (b.velocity().x - a.velocity().x) / 2.0;
    assert!((rebound - 0.8).abs() < 0.03, "rebound = {rebound}");
    Ok(())
}

#[test]
fn out_of_domain_particles_are_counted() -> anyhow::Result<()> {
    let mut sim = sim_with_dt(0.01);
    sim.add_particle(weightless(Vec3::new(0.45, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)))?;
    sim.add_particle(weightless(Vec3::ZERO, Vec3::ZERO))?;

    let first = sim.step()?;
    assert_eq!(first.excluded, 0);
    let last = sim.run(4)?.expect("four steps ran");
    assert_eq!(last.excluded, 1);
    assert_eq!(sim.excluded_total(), 4);
    // The escaped particle keeps integrating.
    assert!(sim.particles()[0].position().x > 0.9);
    Ok(())
}

#[test]
fn run_until_stops_at_the_requested_time() -> anyhow::Result<()> {
    let mut sim = sim_with_dt(5e-4);
    sim.add_particle(weightless(Vec3::ZERO, Vec3::ZERO))?;

    let report = sim.run_until(0.01)?;
    assert_eq!(sim.steps(), 20);
    assert_eq!(report.map(|r| r.step), Some(20));
    assert!(sim.run_until(0.005)?.is_none());
    assert!(sim.run(0)?.is_none());
    Ok(())
}

#[test]
fn kinetic_energy_sums_particles() -> anyhow::Result<()> {
    let mut sim = sim_with_dt(1e-3);
    sim.add_particle(weightless(Vec3::new(-0.2, 0.0, 0.0), Vec3::X))?;
    sim.add_particle(weightless(Vec3::new(0.2, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)))?;
    let m = sim.particles()[0].mass();
    assert!((sim.kinetic_energy() - 0.5 * m * 5.0).abs() < 1e-12);
    Ok(())
}
