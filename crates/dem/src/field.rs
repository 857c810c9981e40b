//! # External Fields
//!
//! Fluid velocity and gravity are supplied by the scenario as capabilities
//! evaluated against the particle's current state. Both traits are object
//! safe; particles hold them behind an [`Arc`](std::sync::Arc) so one field
//! can be shared by every particle in a scene.

use std::f64::consts::FRAC_PI_2;
use std::fmt::Debug;

use crate::Vec3;

/// Standard gravitational acceleration used by [`ConstantGravity::default`].
pub const STANDARD_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

/// Snapshot of the kinetic state a field is evaluated against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleState {
    pub position: Vec3,
    pub velocity: Vec3,
    pub time: f64,
}

/// Velocity of the surrounding fluid at the particle.
pub trait FluidField: Send + Sync + Debug {
    fn velocity_at(&self, state: &ParticleState) -> Vec3;
}

/// Gravitational acceleration acting on the particle at `time`.
pub trait GravityField: Send + Sync + Debug {
    fn acceleration_at(&self, state: &ParticleState, time: f64) -> Vec3;
}

/// Quiescent fluid.
#[derive(Clone, Copy, Debug, Default)]
pub struct StillFluid;

impl FluidField for StillFluid {
    fn velocity_at(&self, _state: &ParticleState) -> Vec3 {
        Vec3::ZERO
    }
}

/// Spatially and temporally uniform flow.
#[derive(Clone, Copy, Debug)]
pub struct UniformFlow(pub Vec3);

impl FluidField for UniformFlow {
    fn velocity_at(&self, _state: &ParticleState) -> Vec3 {
        self.0
    }
}

/// Steady 3D Taylor-Green vortex cells.
///
/// The position is phase-shifted by a quarter period so the flow is
/// tangential and continuous across cell boundaries at multiples of pi.
#[derive(Clone, Copy, Debug)]
pub struct TaylorGreenVortex {
    pub amplitude: f64,
    pub wavenumber: f64,
}

impl Default for TaylorGreenVortex {
    fn default() -> Self {
        Self {
            amplitude: 0.14,
            wavenumber: 1.0,
        }
    }
}

impl FluidField for TaylorGreenVortex {
    fn velocity_at(&self, state: &ParticleState) -> Vec3 {
        let k = self.wavenumber;
        let shift = FRAC_PI_2 / k;
        let p = (state.position + Vec3::splat(shift)) * k;
        let (sx, cx) = p.x.sin_cos();
        let (sy, cy) = p.y.sin_cos();
        let (sz, cz) = p.z.sin_cos();
        let a = self.amplitude;
        Vec3::new(a * cx * sy * sz, a * sx * cy * sz, -2.0 * a * sx * sy * cz)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ConstantGravity(pub Vec3);

impl Default for ConstantGravity {
    fn default() -> Self {
        Self(STANDARD_GRAVITY)
    }
}

impl GravityField for ConstantGravity {
    fn acceleration_at(&self, _state: &ParticleState, _time: f64) -> Vec3 {
        self.0
    }
}

/// Gravity of fixed magnitude whose direction sweeps around the z axis with
/// angle `rate · t²`, starting straight down.
#[derive(Clone, Copy, Debug)]
pub struct RotatingGravity {
    pub magnitude: f64,
    pub rate: f64,
}

impl Default for RotatingGravity {
    fn default() -> Self {
        Self {
            magnitude: 9.81,
            rate: 0.25,
        }
    }
}

impl GravityField for RotatingGravity {
    fn acceleration_at(&self, _state: &ParticleState, time: f64) -> Vec3 {
        let (s, c) = (self.rate * time * time).sin_cos();
        Vec3::new(self.magnitude * s, -self.magnitude * c, 0.0)
    }
}
