//! # Simulation Step
//!
//! [`Simulation`] owns the particles, walls, broad-phase grid and persistent
//! contacts, and advances them one timestep at a time. Each step runs its
//! phases strictly in order:
//!
//! 1. **Broad phase**: bin particles into the grid and enumerate candidate pairs.
//! 2. **Contact resolution**: resolve particle-particle and particle-wall
//!    contacts into a fresh [`ForceBuffer`].
//! 3. **Integration**: reduce the buffer to one net force per particle and
//!    integrate every particle.
//!
//! No particle moves before every contact of the step has been resolved.
//! The grid is reset once integration has finished.

use std::collections::HashMap;

use crate::contact::{ContactParams, ForceBuffer, ParticleContact, WallContact};
use crate::error::{require_positive, DemError};
use crate::grid::{pair_key, BroadPhaseGrid, GridStats};
use crate::particle::{Particle, ParticleConfig, ParticleId};
use crate::wall::AaWall;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimConfig {
    /// Fixed timestep.
    pub delta_t: f64,
    /// Treat Stokes drag implicitly during integration.
    pub implicit_drag: bool,
    /// Broad-phase cells along each edge of the cubic domain.
    pub cells_per_edge: usize,
    pub domain_min: f64,
    pub domain_max: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            delta_t: 5e-4,
            implicit_drag: true,
            cells_per_edge: 10,
            domain_min: -0.5,
            domain_max: 0.5,
        }
    }
}

/// Phase the orchestrator is currently in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepPhase {
    Idle,
    BroadPhase,
    ContactResolution,
    Integration,
}

/// Summary of one completed step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    pub step: u64,
    pub time: f64,
    pub candidate_pairs: usize,
    pub particle_contacts: usize,
    pub wall_contacts: usize,
    /// Particles left out of the broad phase for being outside the domain.
    pub excluded: usize,
    pub grid: GridStats,
}

#[derive(Debug)]
pub struct Simulation {
    config: SimConfig,
    particles: Vec<Particle>,
    walls: Vec<AaWall>,
    particle_contact: ContactParams,
    wall_contact: ContactParams,
    grid: BroadPhaseGrid,
    contacts: HashMap<u128, ParticleContact>,
    wall_contacts: HashMap<(ParticleId, usize), WallContact>,
    next_id: ParticleId,
    phase: StepPhase,
    steps: u64,
    time: f64,
}

impl Simulation {
    /// # Errors
    ///
    /// Returns [`DemError::InvalidParameter`] for a non-positive timestep or
    /// an invalid grid configuration.
    pub fn new(config: SimConfig) -> Result<Self, DemError> {
        require_positive("delta_t", config.delta_t)?;
        let grid = BroadPhaseGrid::new(config.cells_per_edge, config.domain_min, config.domain_max)?;

        Ok(Self {
            config,
            particles: Vec::new(),
            walls: Vec::new(),
            particle_contact: ContactParams::default(),
            wall_contact: ContactParams::default(),
            grid,
            contacts: HashMap::new(),
            wall_contacts: HashMap::new(),
            next_id: 0,
            phase: StepPhase::Idle,
            steps: 0,
            time: 0.0,
        })
    }

    /// Sets the contact laws for particle-particle and particle-wall contacts.
    ///
    /// # Errors
    ///
    /// Returns [`DemError::InvalidParameter`] if either parameter set fails
    /// [`ContactParams::validate`].
    pub fn set_contact_params(
        &mut self,
        particle: ContactParams,
        wall: ContactParams,
    ) -> Result<(), DemError> {
        particle.validate()?;
        wall.validate()?;
        self.particle_contact = particle;
        self.wall_contact = wall;
        self.contacts.clear();
        self.wall_contacts.clear();
        Ok(())
    }

    /// Creates a particle with the next free id.
    ///
    /// # Errors
    ///
    /// Returns [`DemError::InvalidParameter`] for invalid physical
    /// parameters, or for a diameter larger than the broad-phase cell, which
    /// would let contacts span more than one cell.
    pub fn add_particle(&mut self, config: ParticleConfig) -> Result<ParticleId, DemError> {
        let cell_size = self.grid.cell_size();
        if config.diameter > cell_size {
            return Err(DemError::invalid(
                "diameter",
                format!(
                    "{} exceeds the broad-phase cell size {cell_size}",
                    config.diameter
                ),
            ));
        }
        let pid = self.next_id;
        let particle = Particle::new(pid, config)?;
        self.next_id += 1;
        self.particles.push(particle);
        Ok(pid)
    }

    pub fn add_wall(&mut self, wall: AaWall) -> usize {
        self.walls.push(wall);
        self.walls.len() - 1
    }

    pub fn add_walls(&mut self, walls: impl IntoIterator<Item = AaWall>) {
        self.walls.extend(walls);
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// # Errors
    ///
    /// Returns [`DemError::UnknownParticle`] for a slot past the end.
    pub fn particle_mut(&mut self, slot: usize) -> Result<&mut Particle, DemError> {
        self.particles
            .get_mut(slot)
            .ok_or(DemError::UnknownParticle(slot))
    }

    #[must_use]
    pub fn particle_by_id(&self, pid: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id() == pid)
    }

    #[must_use]
    pub fn walls(&self) -> &[AaWall] {
        &self.walls
    }

    #[must_use]
    pub fn phase(&self) -> StepPhase {
        self.phase
    }

    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Particle-particle contacts carried into the next step.
    #[must_use]
    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }

    /// The persistent contact between two particles, if they touched during
    /// the last step.
    #[must_use]
    pub fn contact_between(&self, a: ParticleId, b: ParticleId) -> Option<&ParticleContact> {
        self.contacts.get(&pair_key(a, b))
    }

    /// Particle-wall contacts carried into the next step.
    #[must_use]
    pub fn active_wall_contacts(&self) -> usize {
        self.wall_contacts.len()
    }

    /// Particles ever skipped by the broad phase for leaving the domain.
    #[must_use]
    pub fn excluded_total(&self) -> u64 {
        self.grid.excluded_total()
    }

    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    fn enter(&mut self, phase: StepPhase) {
        tracing::trace!(step = self.steps, from = ?self.phase, to = ?phase, "phase transition");
        self.phase = phase;
    }

    /// Advances the whole system by one timestep.
    ///
    /// # Errors
    ///
    /// Propagates integration errors; with a validated configuration none
    /// are expected.
    pub fn step(&mut self) -> Result<StepReport, DemError> {
        let delta_t = self.config.delta_t;

        self.enter(StepPhase::BroadPhase);
        self.grid.assign(&self.particles);
        let pairs = self.grid.candidate_pairs();
        let grid = self.grid.stats();
        let excluded = self.grid.excluded();

        self.enter(StepPhase::ContactResolution);
        let mut forces = ForceBuffer::new(self.particles.len());

        let mut previous = std::mem::take(&mut self.contacts);
        let mut created = 0usize;
        for pair in &pairs {
            let p1 = &self.particles[pair.first];
            let p2 = &self.particles[pair.second];
            let mut contact = match previous.remove(&pair.key) {
                Some(contact) => contact,
                None => {
                    if ParticleContact::overlap(p1, p2) <= 0.0 {
                        continue;
                    }
                    created += 1;
                    ParticleContact::new(p1, p2, &self.particle_contact)
                }
            };
            if contact.apply((pair.first, p1), (pair.second, p2), delta_t, &mut forces) {
                self.contacts.insert(pair.key, contact);
            }
        }
        if created > 0 || !previous.is_empty() {
            tracing::debug!(
                step = self.steps,
                created,
                retired = previous.len(),
                active = self.contacts.len(),
                "particle contacts updated"
            );
        }

        let mut previous_walls = std::mem::take(&mut self.wall_contacts);
        for (slot, particle) in self.particles.iter().enumerate() {
            for (wall_index, wall) in self.walls.iter().enumerate() {
                let key = (particle.id(), wall_index);
                let mut contact = match previous_walls.remove(&key) {
                    Some(contact) => contact,
                    None if WallContact::is_active(particle, wall) => {
                        WallContact::new(particle, &self.wall_contact)
                    }
                    None => continue,
                };
                if contact.apply((slot, particle), wall, delta_t, &mut forces) {
                    self.wall_contacts.insert(key, contact);
                }
            }
        }

        self.enter(StepPhase::Integration);
        let implicit_drag = self.config.implicit_drag;
        for (particle, force) in self.particles.iter_mut().zip(forces.into_totals()) {
            particle.integrate(delta_t, implicit_drag, force)?;
        }

        self.grid.reset();
        self.steps += 1;
        self.time += delta_t;
        self.enter(StepPhase::Idle);

        Ok(StepReport {
            step: self.steps,
            time: self.time,
            candidate_pairs: pairs.len(),
            particle_contacts: self.contacts.len(),
            wall_contacts: self.wall_contacts.len(),
            excluded,
            grid,
        })
    }

    /// Runs `steps` timesteps and returns the last report, if any step ran.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first step error.
    pub fn run(&mut self, steps: u64) -> Result<Option<StepReport>, DemError> {
        let mut last = None;
        for _ in 0..steps {
            last = Some(self.step()?);
        }
        Ok(last)
    }

    /// Steps until the simulated time reaches `max_time`.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first step error.
    pub fn run_until(&mut self, max_time: f64) -> Result<Option<StepReport>, DemError> {
        let half_step = 0.5 * self.config.delta_t;
        let mut last = None;
        while self.time + half_step < max_time {
            last = Some(self.step()?);
        }
        Ok(last)
    }
}
