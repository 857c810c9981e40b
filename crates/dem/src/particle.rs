//! # Particles
//!
//! Spherical, non-rotating particles carrying their own kinetic state. The
//! contact model never touches a particle directly: forces are gathered in a
//! [`ForceBuffer`](crate::ForceBuffer) and handed to [`Particle::integrate`]
//! as a single summed vector.

use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::error::{require_positive, DemError};
use crate::field::{ConstantGravity, FluidField, GravityField, ParticleState, StillFluid};
use crate::Vec3;

/// Stable particle identifier, unique within a simulation and never reused.
pub type ParticleId = u64;

/// Construction parameters for a [`Particle`].
#[derive(Clone)]
pub struct ParticleConfig {
    pub position: Vec3,
    pub velocity: Vec3,
    pub diameter: f64,
    pub density: f64,
    pub fluid_viscosity: f64,
    pub fluid: Arc<dyn FluidField>,
    pub gravity: Arc<dyn GravityField>,
    /// Keep per-step position/velocity/time records. Disable for long runs
    /// where only the current state matters.
    pub record_history: bool,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            diameter: 0.001,
            density: 2000.0,
            fluid_viscosity: 1.93e-5,
            fluid: Arc::new(StillFluid),
            gravity: Arc::new(ConstantGravity::default()),
            record_history: true,
        }
    }
}

impl ParticleConfig {
    #[must_use]
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }

    #[must_use]
    pub fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    #[must_use]
    pub fn fluid_viscosity(mut self, fluid_viscosity: f64) -> Self {
        self.fluid_viscosity = fluid_viscosity;
        self
    }

    #[must_use]
    pub fn fluid(mut self, fluid: impl FluidField + 'static) -> Self {
        self.fluid = Arc::new(fluid);
        self
    }

    #[must_use]
    pub fn gravity(mut self, gravity: impl GravityField + 'static) -> Self {
        self.gravity = Arc::new(gravity);
        self
    }

    #[must_use]
    pub fn low_memory(mut self) -> Self {
        self.record_history = false;
        self
    }
}

impl fmt::Debug for ParticleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleConfig")
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("diameter", &self.diameter)
            .field("density", &self.density)
            .field("fluid_viscosity", &self.fluid_viscosity)
            .field("fluid", &self.fluid)
            .field("gravity", &self.gravity)
            .field("record_history", &self.record_history)
            .finish()
    }
}

/// Recorded state after every integration step.
#[derive(Clone, Debug, Default)]
pub struct ParticleHistory {
    pub times: Vec<f64>,
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
}

impl ParticleHistory {
    fn record(&mut self, time: f64, position: Vec3, velocity: Vec3) {
        self.times.push(time);
        self.positions.push(position);
        self.velocities.push(velocity);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }
}

#[derive(Debug)]
pub struct Particle {
    pid: ParticleId,
    position: Vec3,
    velocity: Vec3,
    diameter: f64,
    density: f64,
    fluid_viscosity: f64,
    time: f64,
    fluid: Arc<dyn FluidField>,
    gravity: Arc<dyn GravityField>,
    history: Option<ParticleHistory>,
}

impl Particle {
    /// # Errors
    ///
    /// Returns [`DemError::InvalidParameter`] if the diameter, density or
    /// fluid viscosity is not strictly positive, since mass and the drag
    /// relaxation time would otherwise vanish or divide by zero.
    pub fn new(pid: ParticleId, config: ParticleConfig) -> Result<Self, DemError> {
        require_positive("diameter", config.diameter)?;
        require_positive("density", config.density)?;
        require_positive("fluid_viscosity", config.fluid_viscosity)?;
        if !config.position.is_finite() || !config.velocity.is_finite() {
            return Err(DemError::invalid(
                "position/velocity",
                "initial kinetic state must be finite",
            ));
        }

        Ok(Self {
            pid,
            position: config.position,
            velocity: config.velocity,
            diameter: config.diameter,
            density: config.density,
            fluid_viscosity: config.fluid_viscosity,
            time: 0.0,
            fluid: config.fluid,
            gravity: config.gravity,
            history: config.record_history.then(ParticleHistory::default),
        })
    }

    #[must_use]
    pub fn id(&self) -> ParticleId {
        self.pid
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    #[must_use]
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.diameter * 0.5
    }

    #[must_use]
    pub fn density(&self) -> f64 {
        self.density
    }

    #[must_use]
    pub fn fluid_viscosity(&self) -> f64 {
        self.fluid_viscosity
    }

    /// Simulated time this particle has been advanced to.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// `density · π · d³ / 6`, always derived from the immutable parameters.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.density * PI * self.diameter.powi(3) / 6.0
    }

    /// Stokes drag relaxation time `ρ d² / (18 μ)`.
    #[must_use]
    pub fn tau(&self) -> f64 {
        self.density * self.diameter * self.diameter / (18.0 * self.fluid_viscosity)
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.mass() * self.velocity.length_squared()
    }

    #[must_use]
    pub fn state(&self) -> ParticleState {
        ParticleState {
            position: self.position,
            velocity: self.velocity,
            time: self.time,
        }
    }

    #[must_use]
    pub fn fluid_velocity(&self) -> Vec3 {
        self.fluid.velocity_at(&self.state())
    }

    #[must_use]
    pub fn gravity(&self) -> Vec3 {
        self.gravity.acceleration_at(&self.state(), self.time)
    }

    /// Acceleration from drag, contacts and gravity at the current state.
    ///
    /// With `implicit_drag` the drag term is treated implicitly, which keeps
    /// the update bounded for any `delta_t`, including `delta_t >> τ`.
    #[must_use]
    pub fn acceleration(&self, contact_force: Vec3, delta_t: f64, implicit_drag: bool) -> Vec3 {
        let tau = self.tau();
        let slip = self.fluid_velocity() - self.velocity;
        let body = contact_force / self.mass() + self.gravity();
        if implicit_drag {
            (slip + body * tau) / (tau + delta_t)
        } else {
            slip / tau + body
        }
    }

    /// Advances the particle by `delta_t` under `contact_force`, the sum of
    /// every contact contribution gathered for this step.
    ///
    /// Velocity is updated semi-implicitly, position with the trapezoidal
    /// rule. A zero `delta_t` leaves the particle untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DemError::InvalidParameter`] for a negative or non-finite
    /// `delta_t`.
    pub fn integrate(
        &mut self,
        delta_t: f64,
        implicit_drag: bool,
        contact_force: Vec3,
    ) -> Result<(), DemError> {
        if !delta_t.is_finite() || delta_t < 0.0 {
            return Err(DemError::invalid(
                "delta_t",
                format!("must be finite and >= 0, got {delta_t}"),
            ));
        }
        if delta_t == 0.0 {
            return Ok(());
        }

        self.time += delta_t;
        let accel = self.acceleration(contact_force, delta_t, implicit_drag);
        let next_velocity = self.velocity + accel * delta_t;
        self.position += (next_velocity + self.velocity) * (0.5 * delta_t);
        self.velocity = next_velocity;

        if let Some(history) = self.history.as_mut() {
            history.record(self.time, self.position, self.velocity);
        }
        Ok(())
    }

    /// Recorded history, or `None` for a low-memory particle.
    #[must_use]
    pub fn history(&self) -> Option<&ParticleHistory> {
        self.history.as_ref()
    }

    /// Speed after the `index`-th recorded step.
    #[must_use]
    pub fn speed_at_index(&self, index: usize) -> Option<f64> {
        self.history
            .as_ref()
            .and_then(|h| h.velocities.get(index))
            .map(|v| v.length())
    }

    /// Speed at a recorded time, or `0.0` if that time was never recorded.
    #[must_use]
    pub fn speed_at_time(&self, time: f64) -> f64 {
        let Some(history) = self.history.as_ref() else {
            return 0.0;
        };
        let tolerance = 1e-9 * time.abs().max(1.0);
        let index = history.times.partition_point(|&t| t < time - tolerance);
        match history.times.get(index) {
            Some(&t) if (t - time).abs() <= tolerance => history.velocities[index].length(),
            _ => 0.0,
        }
    }
}
