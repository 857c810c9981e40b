#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # DEM Core
//!
//! A Discrete Element Method engine for dense granular flow of spherical,
//! non-rotating particles suspended in a prescribed fluid velocity field.
//!
//! ## Key Components
//!
//! -   **Particles:** [`Particle`] carries position, velocity and the immutable
//!     physical parameters, and integrates itself under Stokes drag, gravity
//!     and a summed contact force. Drag can be treated implicitly for
//!     timesteps longer than the relaxation time.
//! -   **Walls:** [`AaWall`] is a finite axis-aligned rectangle built from two
//!     corners.
//! -   **Contacts:** [`ParticleContact`] and [`WallContact`] implement a
//!     linear spring-dashpot with Coulomb friction; forces are collected in a
//!     [`ForceBuffer`].
//! -   **Broad phase:** [`BroadPhaseGrid`] bins particles into a uniform grid
//!     and proposes each neighbouring pair exactly once.
//! -   **Simulation:** [`Simulation`] sequences broad phase, contact
//!     resolution and integration for every step.
//!
//! ## Usage
//!
//! ```rust
//! use dem::{AaWall, ContactParams, ParticleConfig, SimConfig, Simulation, Vec3};
//!
//! let mut sim = Simulation::new(SimConfig::default())?;
//! sim.set_contact_params(
//!     ContactParams::new(1e5).with_restitution(0.8),
//!     ContactParams::new(1e5).with_restitution(0.8).with_friction(0.4, 5e4),
//! )?;
//! sim.add_wall(AaWall::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::new(0.5, -0.5, 0.5))?);
//! sim.add_particle(ParticleConfig::new(Vec3::new(0.0, 0.2, 0.0), Vec3::ZERO).diameter(0.05))?;
//!
//! sim.run(100)?;
//! assert!(sim.particles()[0].position().y < 0.2);
//! # Ok::<(), dem::DemError>(())
//! ```

pub mod contact;
pub mod error;
pub mod field;
pub mod grid;
pub mod particle;
pub mod simulation;
pub mod vector;
pub mod wall;

/// Double-precision 3-vector used throughout the engine.
pub type Vec3 = glam::DVec3;

pub use contact::{
    ContactForce, ContactParams, Damping, ForceBuffer, Friction, ParticleContact, WallContact,
};
pub use error::DemError;
pub use field::{
    ConstantGravity, FluidField, GravityField, ParticleState, RotatingGravity, StillFluid,
    TaylorGreenVortex, UniformFlow, STANDARD_GRAVITY,
};
pub use grid::{pair_key, BroadPhaseGrid, CandidatePair, GridStats};
pub use particle::{Particle, ParticleConfig, ParticleHistory, ParticleId};
pub use simulation::{SimConfig, Simulation, StepPhase, StepReport};
pub use wall::{AaWall, Axis};
