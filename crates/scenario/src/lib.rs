#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Scenario Files
//!
//! JSON description of a DEM run: timestep and grid settings, contact laws,
//! the external fluid and gravity fields, walls, and the particles to seed.
//! [`Scenario::into_sim`] turns a parsed document into a ready-to-step
//! [`dem::Simulation`].
//!
//! Every section is optional:
//!
//! ```
//! use scenario::Scenario;
//!
//! let scenario: Scenario = r#"{
//!     "settings": { "delta_t": 1e-4, "steps": 10 },
//!     "box": { "length": 0.8 },
//!     "particles": [ { "position": [0.0, 0.1, 0.0], "diameter": 0.05 } ]
//! }"#
//! .parse()?;
//! let mut sim = scenario.into_sim()?;
//! sim.run(10)?;
//! assert_eq!(sim.walls().len(), 6);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod generators;

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use dem::{
    AaWall, ConstantGravity, ContactParams, FluidField, GravityField, ParticleConfig,
    RotatingGravity, SimConfig, Simulation, StillFluid, TaylorGreenVortex, UniformFlow, Vec3,
};
use serde::Deserialize;

pub use generators::{closed_box, lattice, lattice_len, open_box, MAX_LATTICE_POINTS};

/// Run length used when neither the file nor the caller picks one.
pub const DEFAULT_STEPS: u64 = 1000;

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Scenario {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub particle_contact: ContactDef,
    #[serde(default)]
    pub wall_contact: ContactDef,
    #[serde(default)]
    pub fluid: FluidDef,
    #[serde(default)]
    pub gravity: GravityDef,
    #[serde(default)]
    pub walls: Vec<WallDef>,
    #[serde(default, rename = "box")]
    pub enclosure: Option<BoxDef>,
    #[serde(default)]
    pub particles: Vec<ParticleDef>,
    #[serde(default)]
    pub lattice: Vec<LatticeDef>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub delta_t: f64,
    pub implicit_drag: bool,
    pub cells_per_edge: usize,
    pub domain_min: f64,
    pub domain_max: f64,
    pub record_history: bool,
    pub steps: Option<u64>,
    pub max_time: Option<f64>,
}

impl Default for Settings {
    fn default() -> Self {
        let sim = SimConfig::default();
        Self {
            delta_t: sim.delta_t,
            implicit_drag: sim.implicit_drag,
            cells_per_edge: sim.cells_per_edge,
            domain_min: sim.domain_min,
            domain_max: sim.domain_max,
            record_history: true,
            steps: None,
            max_time: None,
        }
    }
}

/// How long a scenario should run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunLength {
    Steps(u64),
    Until(f64),
}

impl Settings {
    #[must_use]
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            delta_t: self.delta_t,
            implicit_drag: self.implicit_drag,
            cells_per_edge: self.cells_per_edge,
            domain_min: self.domain_min,
            domain_max: self.domain_max,
        }
    }

    /// An explicit step count wins over `max_time`.
    #[must_use]
    pub fn run_length(&self) -> RunLength {
        match (self.steps, self.max_time) {
            (Some(steps), _) => RunLength::Steps(steps),
            (None, Some(time)) => RunLength::Until(time),
            (None, None) => RunLength::Steps(DEFAULT_STEPS),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ContactDef {
    pub stiffness: f64,
    #[serde(default)]
    pub damping: Option<f64>,
    #[serde(default)]
    pub restitution: Option<f64>,
    #[serde(default)]
    pub friction: Option<FrictionDef>,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FrictionDef {
    pub coefficient: f64,
    pub stiffness: f64,
}

impl Default for ContactDef {
    fn default() -> Self {
        Self {
            stiffness: ContactParams::default().stiffness,
            damping: None,
            restitution: None,
            friction: None,
        }
    }
}

impl ContactDef {
    /// # Errors
    ///
    /// Fails when both `damping` and `restitution` are given, or when the
    /// resulting parameters are out of range.
    pub fn params(&self) -> Result<ContactParams> {
        let mut params = ContactParams::new(self.stiffness);
        params = match (self.damping, self.restitution) {
            (Some(_), Some(_)) => bail!("set either `damping` or `restitution`, not both"),
            (Some(c), None) => params.with_damping(c),
            (None, Some(e)) => params.with_restitution(e),
            (None, None) => params,
        };
        if let Some(friction) = self.friction {
            params = params.with_friction(friction.coefficient, friction.stiffness);
        }
        params.validate()?;
        Ok(params)
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FluidDef {
    #[default]
    Still,
    Uniform {
        velocity: [f64; 3],
    },
    TaylorGreen {
        #[serde(default = "default_vortex_amplitude")]
        amplitude: f64,
        #[serde(default = "one")]
        wavenumber: f64,
    },
}

impl FluidDef {
    #[must_use]
    pub fn build(&self) -> Arc<dyn FluidField> {
        match *self {
            FluidDef::Still => Arc::new(StillFluid),
            FluidDef::Uniform { velocity } => Arc::new(UniformFlow(velocity.into())),
            FluidDef::TaylorGreen {
                amplitude,
                wavenumber,
            } => Arc::new(TaylorGreenVortex {
                amplitude,
                wavenumber,
            }),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GravityDef {
    Constant {
        #[serde(default = "standard_gravity")]
        acceleration: [f64; 3],
    },
    Rotating {
        #[serde(default = "standard_gravity_magnitude")]
        magnitude: f64,
        #[serde(default = "default_rotation_rate")]
        rate: f64,
    },
}

impl Default for GravityDef {
    fn default() -> Self {
        GravityDef::Constant {
            acceleration: standard_gravity(),
        }
    }
}

impl GravityDef {
    #[must_use]
    pub fn build(&self) -> Arc<dyn GravityField> {
        match *self {
            GravityDef::Constant { acceleration } => Arc::new(ConstantGravity(acceleration.into())),
            GravityDef::Rotating { magnitude, rate } => {
                Arc::new(RotatingGravity { magnitude, rate })
            }
        }
    }
}

/// A wall given by two opposite corners.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct WallDef {
    pub first: [f64; 3],
    pub second: [f64; 3],
}

/// Cube of walls; `open` leaves out the +y lid.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoxDef {
    pub length: f64,
    #[serde(default)]
    pub center: [f64; 3],
    #[serde(default)]
    pub open: bool,
}

impl BoxDef {
    /// # Errors
    ///
    /// Fails for a non-positive or non-finite edge length.
    pub fn walls(&self) -> Result<Vec<AaWall>> {
        let center = Vec3::from(self.center);
        if self.open {
            open_box(self.length, center)
        } else {
            closed_box(self.length, center)
        }
    }
}

/// Physical properties shared by explicit particles and lattices.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct Material {
    pub diameter: f64,
    pub density: f64,
    pub fluid_viscosity: f64,
}

impl Default for Material {
    fn default() -> Self {
        let config = ParticleConfig::default();
        Self {
            diameter: config.diameter,
            density: config.density,
            fluid_viscosity: config.fluid_viscosity,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ParticleDef {
    pub position: [f64; 3],
    #[serde(default)]
    pub velocity: [f64; 3],
    #[serde(flatten)]
    pub material: Material,
}

/// Evenly spaced particles filling `[min, max]`.
///
/// Each particle starts at `velocity + velocity_gradient * position`,
/// component-wise, so a gradient of `[1, 0, 1]` seeds `[x, 0, z]`.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct LatticeDef {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub spacing: f64,
    #[serde(default)]
    pub velocity: [f64; 3],
    #[serde(default)]
    pub velocity_gradient: [f64; 3],
    #[serde(flatten)]
    pub material: Material,
}

impl LatticeDef {
    #[must_use]
    pub fn velocity_at(&self, position: Vec3) -> Vec3 {
        Vec3::from(self.velocity) + Vec3::from(self.velocity_gradient) * position
    }
}

fn default_vortex_amplitude() -> f64 {
    TaylorGreenVortex::default().amplitude
}

fn one() -> f64 {
    1.0
}

fn standard_gravity() -> [f64; 3] {
    dem::STANDARD_GRAVITY.to_array()
}

fn standard_gravity_magnitude() -> f64 {
    dem::STANDARD_GRAVITY.length()
}

fn default_rotation_rate() -> f64 {
    RotatingGravity::default().rate
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Scenario {
    /// Reads and parses a scenario file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not a valid scenario.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        json.parse::<Self>()
            .with_context(|| format!("parsing scenario {}", path.display()))
    }

    /// Total particles the scenario will seed, explicit and generated.
    ///
    /// # Errors
    ///
    /// Fails for a lattice with invalid bounds or spacing, or one too large to seed.
    pub fn particle_count(&self) -> Result<usize> {
        let mut count = self.particles.len();
        for def in &self.lattice {
            count += lattice_len(def.min.into(), def.max.into(), def.spacing)?;
        }
        Ok(count)
    }

    /// Builds the simulation: settings first, then contact laws, walls and
    /// finally particles, so ids follow file order with lattices last.
    ///
    /// # Errors
    ///
    /// Fails on the first invalid setting, wall or particle.
    pub fn into_sim(self) -> Result<Simulation> {
        let mut sim = Simulation::new(self.settings.sim_config()).context("invalid settings")?;
        sim.set_contact_params(
            self.particle_contact
                .params()
                .context("invalid particle_contact")?,
            self.wall_contact.params().context("invalid wall_contact")?,
        )?;

        for (index, wall) in self.walls.iter().enumerate() {
            let wall = AaWall::new(wall.first.into(), wall.second.into())
                .with_context(|| format!("wall {index}"))?;
            sim.add_wall(wall);
        }
        if let Some(enclosure) = &self.enclosure {
            sim.add_walls(enclosure.walls().context("invalid box")?);
        }

        let fluid = self.fluid.build();
        let gravity = self.gravity.build();
        let record_history = self.settings.record_history;
        let template = |position: Vec3, velocity: Vec3, material: &Material| ParticleConfig {
            position,
            velocity,
            diameter: material.diameter,
            density: material.density,
            fluid_viscosity: material.fluid_viscosity,
            fluid: Arc::clone(&fluid),
            gravity: Arc::clone(&gravity),
            record_history,
        };

        for (index, def) in self.particles.iter().enumerate() {
            let config = template(def.position.into(), def.velocity.into(), &def.material);
            sim.add_particle(config)
                .with_context(|| format!("particle {index}"))?;
        }
        for (index, def) in self.lattice.iter().enumerate() {
            let positions = lattice(def.min.into(), def.max.into(), def.spacing)
                .with_context(|| format!("lattice {index}"))?;
            for position in positions {
                sim.add_particle(template(position, def.velocity_at(position), &def.material))
                    .with_context(|| format!("lattice {index}"))?;
            }
        }

        tracing::debug!(
            particles = sim.particles().len(),
            walls = sim.walls().len(),
            "scenario built"
        );
        Ok(sim)
    }
}
