//! # Run Loop
//!
//! Loads the scenario named on the command line, steps it to the requested
//! length while logging progress, then writes the requested exports.

use std::time::Instant;

use anyhow::{Context, Result};
use demsim::export::{self, Snapshot};
use demsim::Args;
use dem::Simulation;
use scenario::{RunLength, Scenario};

/// # Errors
///
/// Returns scenario loading, simulation and export failures.
pub fn run(args: &Args) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .init();

    let mut scenario = Scenario::load(&args.scenario)?;
    args.apply(&mut scenario);
    let length = scenario.settings.run_length();
    let mut sim = scenario.into_sim().context("building simulation")?;

    tracing::info!(
        scenario = %args.scenario.display(),
        particles = sim.particles().len(),
        walls = sim.walls().len(),
        delta_t = sim.config().delta_t,
        ?length,
        "starting simulation"
    );

    let started = Instant::now();
    advance(&mut sim, length, args.log_every)?;

    tracing::info!(
        steps = sim.steps(),
        time = sim.time(),
        kinetic_energy = sim.kinetic_energy(),
        excluded = sim.excluded_total(),
        elapsed = ?started.elapsed(),
        "simulation finished"
    );

    if let Some(path) = &args.snapshot {
        Snapshot::capture(&sim).save(path)?;
        tracing::info!(path = %path.display(), "snapshot written");
    }
    if let Some(path) = &args.raw {
        export::save_raw(&sim, path)?;
        tracing::info!(path = %path.display(), "raw export written");
    }
    Ok(())
}

fn advance(sim: &mut Simulation, length: RunLength, log_every: u64) -> Result<()> {
    let half_step = 0.5 * sim.config().delta_t;
    let finished = |sim: &Simulation| match length {
        RunLength::Steps(steps) => sim.steps() >= steps,
        RunLength::Until(max_time) => sim.time() + half_step >= max_time,
    };

    while !finished(sim) {
        let report = sim.step()?;
        if log_every > 0 && report.step % log_every == 0 {
            tracing::info!(
                step = report.step,
                time = report.time,
                contacts = report.particle_contacts,
                wall_contacts = report.wall_contacts,
                kinetic_energy = sim.kinetic_energy(),
                "progress"
            );
        }
    }
    Ok(())
}
