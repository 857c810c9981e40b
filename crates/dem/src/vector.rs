//! # Vector Math
//!
//! Thin helpers over [`glam::DVec3`]: magnitudes, guarded normalisation and
//! projections used by the contact model.

use crate::Vec3;

/// Euclidean length.
#[inline]
#[must_use]
pub fn magnitude(v: Vec3) -> f64 {
    v.length()
}

#[inline]
#[must_use]
pub fn magnitude_squared(v: Vec3) -> f64 {
    v.length_squared()
}

/// Unit vector in the direction of `v`, or `None` when `v` has no direction
/// (zero length or non-finite components).
#[inline]
#[must_use]
pub fn try_unit(v: Vec3) -> Option<Vec3> {
    let len_sq = magnitude_squared(v);
    if len_sq > 0.0 && len_sq.is_finite() {
        Some(v / len_sq.sqrt())
    } else {
        None
    }
}

/// Unit vector in the direction of `v`. A zero-length input yields the zero
/// vector and a warning; it never produces NaN.
#[must_use]
pub fn unit_or_zero(v: Vec3) -> Vec3 {
    try_unit(v).unwrap_or_else(|| {
        tracing::warn!(vector = ?v, "zero-length vector encountered while normalizing");
        Vec3::ZERO
    })
}

/// Component of `v` along the unit direction `n`, as a vector.
#[inline]
#[must_use]
pub fn project_onto(v: Vec3, n: Vec3) -> Vec3 {
    n * v.dot(n)
}

/// `v` with its component along the unit direction `n` removed.
#[inline]
#[must_use]
pub fn reject_from(v: Vec3, n: Vec3) -> Vec3 {
    v - project_onto(v, n)
}
