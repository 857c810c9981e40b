//! # Exports
//!
//! Final-state dumps for post-processing: a self-describing JSON snapshot
//! and a compact binary file of native-endian `f32` records, four per
//! particle (`x, y, z, speed`).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use dem::{ParticleId, Simulation};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ParticleRecord {
    pub id: ParticleId,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub speed: f64,
    pub diameter: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub step: u64,
    pub time: f64,
    pub kinetic_energy: f64,
    pub particles: Vec<ParticleRecord>,
}

impl Snapshot {
    #[must_use]
    pub fn capture(sim: &Simulation) -> Self {
        let particles = sim
            .particles()
            .iter()
            .map(|p| ParticleRecord {
                id: p.id(),
                position: p.position().to_array(),
                velocity: p.velocity().to_array(),
                speed: p.speed(),
                diameter: p.diameter(),
            })
            .collect();
        Self {
            step: sim.steps(),
            time: sim.time(),
            kinetic_energy: sim.kinetic_energy(),
            particles,
        }
    }

    /// # Errors
    ///
    /// Propagates serialization and I/O failures.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating snapshot {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        self.write_json(&mut writer)
            .with_context(|| format!("writing snapshot {}", path.display()))?;
        writer.flush()?;
        Ok(())
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct RawRecord {
    pub position: [f32; 3],
    pub speed: f32,
}

#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn raw_records(sim: &Simulation) -> Vec<RawRecord> {
    sim.particles()
        .iter()
        .map(|p| RawRecord {
            position: p.position().as_vec3().to_array(),
            speed: p.speed() as f32,
        })
        .collect()
}

/// # Errors
///
/// Propagates I/O failures from `writer`.
pub fn write_raw<W: Write>(sim: &Simulation, mut writer: W) -> Result<()> {
    let records = raw_records(sim);
    writer.write_all(bytemuck::cast_slice(&records))?;
    Ok(())
}

/// # Errors
///
/// Fails if the file cannot be created or written.
pub fn save_raw(sim: &Simulation, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating raw export {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_raw(sim, &mut writer)?;
    writer.flush()?;
    Ok(())
}
