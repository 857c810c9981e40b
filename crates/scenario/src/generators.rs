//! Wall and particle layouts used to seed scenarios.

use anyhow::{ensure, Context, Result};
use dem::{AaWall, Vec3};

/// The six walls of a cube with edge `length` centred on `center`.
///
/// # Errors
///
/// Fails for a non-positive or non-finite `length`.
pub fn closed_box(length: f64, center: Vec3) -> Result<Vec<AaWall>> {
    let mut walls = open_box(length, center)?;
    let half = Vec3::splat(length / 2.0);
    let (lo, hi) = (center - half, center + half);
    walls.push(AaWall::new(
        Vec3::new(lo.x, hi.y, lo.z),
        Vec3::new(hi.x, hi.y, hi.z),
    )?);
    Ok(walls)
}

/// Like [`closed_box`] without the lid, the face at `+y`.
///
/// # Errors
///
/// Fails for a non-positive or non-finite `length`.
pub fn open_box(length: f64, center: Vec3) -> Result<Vec<AaWall>> {
    ensure!(
        length.is_finite() && length > 0.0,
        "box length must be finite and > 0, got {length}"
    );
    let half = Vec3::splat(length / 2.0);
    let (lo, hi) = (center - half, center + half);
    Ok(vec![
        AaWall::new(lo, Vec3::new(lo.x, hi.y, hi.z))?,
        AaWall::new(Vec3::new(hi.x, lo.y, lo.z), hi)?,
        AaWall::new(lo, Vec3::new(hi.x, lo.y, hi.z))?,
        AaWall::new(lo, Vec3::new(hi.x, hi.y, lo.z))?,
        AaWall::new(Vec3::new(lo.x, lo.y, hi.z), hi)?,
    ])
}

/// Upper bound on the points a single lattice may generate.
pub const MAX_LATTICE_POINTS: usize = 1_000_000;

/// Points `min + spacing · (i, j, k)` that stay inside `[min, max]`,
/// ordered x fastest, then y, then z.
///
/// # Errors
///
/// Fails for a non-positive spacing, bounds with `max < min`, or more than
/// [`MAX_LATTICE_POINTS`] points.
#[allow(clippy::cast_precision_loss)]
pub fn lattice(min: Vec3, max: Vec3, spacing: f64) -> Result<Vec<Vec3>> {
    let ([nx, ny, nz], total) = lattice_shape(min, max, spacing)?;

    let mut points = Vec::with_capacity(total);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                points.push(min + Vec3::new(i as f64, j as f64, k as f64) * spacing);
            }
        }
    }
    Ok(points)
}

/// Number of points [`lattice`] would generate, without generating them.
///
/// # Errors
///
/// Same as [`lattice`].
pub fn lattice_len(min: Vec3, max: Vec3, spacing: f64) -> Result<usize> {
    Ok(lattice_shape(min, max, spacing)?.1)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn lattice_shape(min: Vec3, max: Vec3, spacing: f64) -> Result<([usize; 3], usize)> {
    ensure!(
        spacing.is_finite() && spacing > 0.0,
        "lattice spacing must be finite and > 0, got {spacing}"
    );
    ensure!(
        min.is_finite() && max.is_finite() && min.cmple(max).all(),
        "lattice bounds {min} .. {max} are not ordered"
    );

    // Absorbs rounding in span / spacing so the far bound is kept.
    let counts = ((max - min) / spacing + Vec3::splat(1e-9)).floor() + Vec3::ONE;
    ensure!(
        counts.is_finite() && counts.max_element() <= MAX_LATTICE_POINTS as f64,
        "lattice spacing {spacing} is too fine for bounds {min} .. {max}"
    );
    let [nx, ny, nz] = counts.to_array().map(|c| c as usize);
    let total = nx
        .checked_mul(ny)
        .and_then(|n| n.checked_mul(nz))
        .filter(|&n| n <= MAX_LATTICE_POINTS)
        .with_context(|| {
            format!("lattice of {nx} x {ny} x {nz} points exceeds {MAX_LATTICE_POINTS}")
        })?;
    Ok(([nx, ny, nz], total))
}
