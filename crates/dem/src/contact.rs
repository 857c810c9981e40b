//! # Contact Model
//!
//! Linear spring-dashpot normal forces with optional Coulomb friction, for
//! particle-particle and particle-wall contacts.
//!
//! Contacts never write to particles. Each resolved contact appends its
//! forces to a [`ForceBuffer`], which the orchestrator reduces into one total
//! per particle before integration. Contacts are persistent: the same
//! [`ParticleContact`] or [`WallContact`] is carried across steps while the
//! bodies overlap, so the accumulated tangential displacement driving
//! static friction survives from one step to the next.

use crate::error::{require_positive, DemError};
use crate::particle::Particle;
use crate::vector::{magnitude, project_onto, reject_from, try_unit, unit_or_zero};
use crate::wall::AaWall;
use crate::Vec3;

/// How the dashpot coefficient of a contact is obtained.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Damping {
    /// Explicit dashpot coefficient.
    Coefficient(f64),
    /// Target coefficient of restitution in `(0, 1]`; the dashpot
    /// coefficient is derived from the effective mass of each contact.
    Restitution(f64),
}

impl Default for Damping {
    fn default() -> Self {
        Damping::Coefficient(1.0)
    }
}

impl Damping {
    /// Dashpot coefficient for a contact of the given effective mass.
    #[must_use]
    pub fn coefficient(self, effective_mass: f64, stiffness: f64) -> f64 {
        match self {
            Damping::Coefficient(c) => c,
            Damping::Restitution(e) => damping_from_restitution(e, effective_mass, stiffness),
        }
    }
}

/// Dashpot coefficient giving restitution `e` for a linear spring-dashpot:
/// `c = -2 ln(e) sqrt(m k / (π² + ln(e)²))`.
#[must_use]
pub fn damping_from_restitution(restitution: f64, effective_mass: f64, stiffness: f64) -> f64 {
    let ln_e = restitution.ln();
    -2.0 * ln_e * (effective_mass * stiffness / (std::f64::consts::PI.powi(2) + ln_e * ln_e)).sqrt()
}

/// `m1 m2 / (m1 + m2)`.
#[must_use]
pub fn reduced_mass(m1: f64, m2: f64) -> f64 {
    m1 * m2 / (m1 + m2)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Friction {
    /// Coulomb coefficient `μ`.
    pub coefficient: f64,
    /// Tangential spring stiffness `k_t` of the static regime.
    pub stiffness: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactParams {
    pub stiffness: f64,
    pub damping: Damping,
    pub friction: Option<Friction>,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            stiffness: 1.0,
            damping: Damping::default(),
            friction: None,
        }
    }
}

impl ContactParams {
    #[must_use]
    pub fn new(stiffness: f64) -> Self {
        Self {
            stiffness,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_restitution(mut self, restitution: f64) -> Self {
        self.damping = Damping::Restitution(restitution);
        self
    }

    #[must_use]
    pub fn with_damping(mut self, coefficient: f64) -> Self {
        self.damping = Damping::Coefficient(coefficient);
        self
    }

    #[must_use]
    pub fn with_friction(mut self, coefficient: f64, stiffness: f64) -> Self {
        self.friction = Some(Friction {
            coefficient,
            stiffness,
        });
        self
    }

    /// # Errors
    ///
    /// Returns [`DemError::InvalidParameter`] for a non-positive stiffness,
    /// a negative damping coefficient, a restitution outside `(0, 1]`, or
    /// non-positive friction parameters.
    pub fn validate(&self) -> Result<(), DemError> {
        require_positive("stiffness", self.stiffness)?;
        match self.damping {
            Damping::Coefficient(c) if !(c.is_finite() && c >= 0.0) => {
                return Err(DemError::invalid(
                    "damping",
                    format!("coefficient must be finite and >= 0, got {c}"),
                ));
            }
            Damping::Restitution(e) if !(e > 0.0 && e <= 1.0) => {
                return Err(DemError::invalid(
                    "restitution",
                    format!("must lie in (0, 1], got {e}"),
                ));
            }
            _ => {}
        }
        if let Some(friction) = self.friction {
            require_positive("friction_coefficient", friction.coefficient)?;
            require_positive("friction_stiffness", friction.stiffness)?;
        }
        Ok(())
    }
}

/// Per-step scratch buffer of contact forces keyed by particle slot.
///
/// Contributions are kept in the order contacts appended them. The buffer is
/// consumed by [`ForceBuffer::into_totals`], so a fresh, empty buffer is
/// needed for every step.
#[derive(Debug)]
pub struct ForceBuffer {
    particle_count: usize,
    contributions: Vec<(usize, Vec3)>,
}

impl ForceBuffer {
    #[must_use]
    pub fn new(particle_count: usize) -> Self {
        Self {
            particle_count,
            contributions: Vec::new(),
        }
    }

    pub fn push(&mut self, slot: usize, force: Vec3) {
        debug_assert!(slot < self.particle_count, "force for unknown slot {slot}");
        self.contributions.push((slot, force));
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    #[must_use]
    pub fn contributions(&self) -> &[(usize, Vec3)] {
        &self.contributions
    }

    /// Forces appended for one particle, in append order.
    pub fn forces_on(&self, slot: usize) -> impl Iterator<Item = Vec3> + '_ {
        self.contributions
            .iter()
            .filter(move |(s, _)| *s == slot)
            .map(|&(_, f)| f)
    }

    /// Sums the contributions into one net force per particle slot.
    #[must_use]
    pub fn into_totals(self) -> Vec<Vec3> {
        let mut totals = vec![Vec3::ZERO; self.particle_count];
        for (slot, force) in self.contributions {
            totals[slot] += force;
        }
        totals
    }
}

/// Forces produced by one active contact during one step, as acting on the
/// second body (or on the particle, for wall contacts).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactForce {
    pub normal: Vec3,
    pub friction: Vec3,
}

impl ContactForce {
    #[must_use]
    pub fn total(&self) -> Vec3 {
        self.normal + self.friction
    }
}

/// Normal spring-dashpot force along the unit normal `n`.
fn normal_force(stiffness: f64, damping: f64, overlap: f64, n: Vec3, v_rel: Vec3) -> Vec3 {
    n * (stiffness * overlap) - project_onto(v_rel, n) * damping
}

/// Coulomb friction opposing the tangential part of `v_rel`.
///
/// The static candidate is a tangential spring on the accumulated sliding
/// distance, the dynamic candidate is `μ |F_n|`; the smaller one acts. When
/// sliding, the stored displacement is held at the Coulomb limit.
fn friction_force(
    friction: &Friction,
    displacement: &mut f64,
    normal: Vec3,
    normal_force: Vec3,
    v_rel: Vec3,
    delta_t: f64,
) -> Vec3 {
    let v_tangential = reject_from(v_rel, normal);
    let Some(t) = try_unit(v_tangential) else {
        return Vec3::ZERO;
    };

    *displacement += magnitude(v_tangential) * delta_t;
    let dynamic = friction.coefficient * magnitude(normal_force);
    let spring = friction.stiffness * *displacement;
    if spring <= dynamic {
        -t * spring
    } else {
        *displacement = dynamic / friction.stiffness;
        -t * dynamic
    }
}

/// Unit contact normal along `direction`. A degenerate direction is
/// reported through [`unit_or_zero`] and yields `None`, so the caller skips
/// the force instead of applying NaN.
fn contact_normal(direction: Vec3) -> Option<Vec3> {
    let n = unit_or_zero(direction);
    (n != Vec3::ZERO).then_some(n)
}

/// Persistent contact between two particles.
#[derive(Clone, Debug)]
pub struct ParticleContact {
    params: ContactParams,
    damping: f64,
    tangential_displacement: f64,
}

impl ParticleContact {
    /// Creates the contact for a pair, deriving the dashpot coefficient from
    /// the pair's reduced mass when a restitution is configured.
    #[must_use]
    pub fn new(p1: &Particle, p2: &Particle, params: &ContactParams) -> Self {
        let effective_mass = reduced_mass(p1.mass(), p2.mass());
        Self {
            params: *params,
            damping: params.damping.coefficient(effective_mass, params.stiffness),
            tangential_displacement: 0.0,
        }
    }

    #[must_use]
    pub fn damping_coefficient(&self) -> f64 {
        self.damping
    }

    #[must_use]
    pub fn tangential_displacement(&self) -> f64 {
        self.tangential_displacement
    }

    /// Radii sum minus centre separation; positive while the spheres overlap.
    #[must_use]
    pub fn overlap(p1: &Particle, p2: &Particle) -> f64 {
        p1.radius() + p2.radius() - (p2.position() - p1.position()).length()
    }

    /// Force on `p2` for this step (the reaction on `p1` is its negation),
    /// or `None` when the pair does not overlap or the centres coincide.
    pub fn resolve(&mut self, p1: &Particle, p2: &Particle, delta_t: f64) -> Option<ContactForce> {
        let overlap = Self::overlap(p1, p2);
        if overlap <= 0.0 {
            return None;
        }
        let n = contact_normal(p2.position() - p1.position())?;
        let v_rel = p2.velocity() - p1.velocity();

        let normal = normal_force(self.params.stiffness, self.damping, overlap, n, v_rel);
        let friction = self.params.friction.map_or(Vec3::ZERO, |friction| {
            friction_force(
                &friction,
                &mut self.tangential_displacement,
                n,
                normal,
                v_rel,
                delta_t,
            )
        });
        Some(ContactForce { normal, friction })
    }

    /// Resolves the contact and appends equal and opposite forces for both
    /// particles, normal first and friction second. Returns whether the
    /// contact was active.
    pub fn apply(
        &mut self,
        (slot1, p1): (usize, &Particle),
        (slot2, p2): (usize, &Particle),
        delta_t: f64,
        forces: &mut ForceBuffer,
    ) -> bool {
        let Some(force) = self.resolve(p1, p2, delta_t) else {
            return false;
        };
        forces.push(slot1, -force.normal);
        forces.push(slot2, force.normal);
        if self.params.friction.is_some() {
            forces.push(slot1, -force.friction);
            forces.push(slot2, force.friction);
        }
        true
    }
}

/// Persistent contact between a particle and an infinite-mass wall.
#[derive(Clone, Debug)]
pub struct WallContact {
    params: ContactParams,
    damping: f64,
    tangential_displacement: f64,
}

impl WallContact {
    #[must_use]
    pub fn new(particle: &Particle, params: &ContactParams) -> Self {
        Self {
            params: *params,
            damping: params.damping.coefficient(particle.mass(), params.stiffness),
            tangential_displacement: 0.0,
        }
    }

    #[must_use]
    pub fn damping_coefficient(&self) -> f64 {
        self.damping
    }

    #[must_use]
    pub fn tangential_displacement(&self) -> f64 {
        self.tangential_displacement
    }

    /// Radius minus distance from the wall plane.
    #[must_use]
    pub fn overlap(particle: &Particle, wall: &AaWall) -> f64 {
        particle.radius() - wall.signed_distance(particle.position()).abs()
    }

    /// Active only while the particle overlaps the plane and its projection
    /// falls on the finite rectangle.
    #[must_use]
    pub fn is_active(particle: &Particle, wall: &AaWall) -> bool {
        Self::overlap(particle, wall) > 0.0 && wall.contains_projection(particle.position())
    }

    /// Force on the particle for this step, or `None` when inactive or when
    /// the particle centre lies exactly on the wall plane.
    pub fn resolve(&mut self, particle: &Particle, wall: &AaWall, delta_t: f64) -> Option<ContactForce> {
        if !Self::is_active(particle, wall) {
            return None;
        }
        let overlap = Self::overlap(particle, wall);
        let n = contact_normal(wall.normal() * wall.signed_distance(particle.position()))?;
        let v_rel = particle.velocity();

        let normal = normal_force(self.params.stiffness, self.damping, overlap, n, v_rel);
        let friction = self.params.friction.map_or(Vec3::ZERO, |friction| {
            friction_force(
                &friction,
                &mut self.tangential_displacement,
                n,
                normal,
                v_rel,
                delta_t,
            )
        });
        Some(ContactForce { normal, friction })
    }

    /// Resolves the contact and appends its forces to the particle only.
    pub fn apply(
        &mut self,
        (slot, particle): (usize, &Particle),
        wall: &AaWall,
        delta_t: f64,
        forces: &mut ForceBuffer,
    ) -> bool {
        let Some(force) = self.resolve(particle, wall, delta_t) else {
            return false;
        };
        forces.push(slot, force.normal);
        if self.params.friction.is_some() {
            forces.push(slot, force.friction);
        }
        true
    }
}
