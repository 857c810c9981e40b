//! # Axis-Aligned Walls
//!
//! A wall is a finite rectangle lying in a plane perpendicular to one of the
//! coordinate axes, built from two opposite corners.

use crate::error::DemError;
use crate::Vec3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[must_use]
    pub const fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AaWall {
    axis: Axis,
    normal: Vec3,
    min: Vec3,
    max: Vec3,
}

impl AaWall {
    /// Builds the wall spanned by two opposite corners.
    ///
    /// The corners must agree on exactly one coordinate; that axis becomes
    /// the wall normal.
    ///
    /// # Errors
    ///
    /// Returns [`DemError::Geometry`] when the corners share zero, two or
    /// three coordinates, or are not finite.
    pub fn new(first: Vec3, second: Vec3) -> Result<Self, DemError> {
        let geometry = || DemError::Geometry { first, second };
        if !first.is_finite() || !second.is_finite() {
            return Err(geometry());
        }

        #[allow(clippy::float_cmp)]
        let shared = (first.x == second.x, first.y == second.y, first.z == second.z);
        let axis = match shared {
            (true, false, false) => Axis::X,
            (false, true, false) => Axis::Y,
            (false, false, true) => Axis::Z,
            _ => return Err(geometry()),
        };

        Ok(Self {
            axis,
            normal: axis.unit(),
            min: first.min(second),
            max: first.max(second),
        })
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Unit normal along the wall's fixed axis, pointing in +axis.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    #[must_use]
    pub fn min(&self) -> Vec3 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Signed distance of `point` from the wall plane along [`Self::normal`].
    #[must_use]
    pub fn signed_distance(&self, point: Vec3) -> f64 {
        (point - self.max).dot(self.normal)
    }

    /// Whether the in-plane projection of `point` lies on the rectangle.
    ///
    /// The normal component of the offsets is discarded, so only the two
    /// tangential axes are compared against `[min, max]`.
    #[must_use]
    pub fn contains_projection(&self, point: Vec3) -> bool {
        let to_max = self.max - point;
        let from_min = point - self.min;
        let tangential_to_max = to_max - to_max * self.normal;
        let tangential_from_min = from_min - from_min * self.normal;
        tangential_to_max.cmpge(Vec3::ZERO).all() && tangential_from_min.cmpge(Vec3::ZERO).all()
    }
}
