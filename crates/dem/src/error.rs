use thiserror::Error;

use crate::Vec3;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DemError {
    /// Wall corners that do not span an axis-aligned plane.
    #[error("wall corners {first:?} and {second:?} are not in the same axis-aligned plane")]
    Geometry { first: Vec3, second: Vec3 },
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },
    #[error("no particle at slot {0}")]
    UnknownParticle(usize),
}

impl DemError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        DemError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Fails with [`DemError::InvalidParameter`] unless `value` is finite and strictly positive.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), DemError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DemError::invalid(name, format!("must be finite and > 0, got {value}")))
    }
}
