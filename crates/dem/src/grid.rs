//! # Broad Phase
//!
//! Uniform grid over a cubic domain. Particles are binned by the cell that
//! contains their centre, and candidate contact pairs are drawn from each
//! occupied cell's 3×3×3 neighbourhood. The cell edge must be at least the
//! largest particle diameter, otherwise touching particles can sit two
//! cells apart and their contact is never proposed.

use std::collections::HashSet;

use crate::error::DemError;
use crate::particle::{Particle, ParticleId};

/// Commutative Cantor pairing of two particle ids.
///
/// `pair_key(a, b) == pair_key(b, a)`, and distinct unordered pairs map to
/// distinct keys.
#[must_use]
pub fn pair_key(a: ParticleId, b: ParticleId) -> u128 {
    let (i, j) = if a <= b { (a, b) } else { (b, a) };
    let (i, j) = (u128::from(i), u128::from(j));
    (i + j) * (i + j + 1) / 2 + j
}

/// A deduplicated candidate pair. Slots index the particle slice passed to
/// [`BroadPhaseGrid::assign`]; `first` always holds the lower particle id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CandidatePair {
    pub first: usize,
    pub second: usize,
    pub key: u128,
}

/// Occupancy statistics for the current step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridStats {
    pub occupied_cells: usize,
    pub total_entries: usize,
    pub average_entries_per_cell: f64,
}

#[derive(Debug)]
pub struct BroadPhaseGrid {
    cells_per_edge: usize,
    min: f64,
    max: f64,
    cell_size: f64,
    /// Flat cell storage indexed by `i + N·j + N²·k`; entries are particle slots.
    cells: Vec<Vec<usize>>,
    /// Linear indices of non-empty cells, ascending after `assign`.
    occupied: Vec<usize>,
    /// Particle id per slot, captured at assignment.
    ids: Vec<ParticleId>,
    excluded: usize,
    excluded_total: u64,
}

impl BroadPhaseGrid {
    /// # Errors
    ///
    /// Returns [`DemError::InvalidParameter`] for zero cells or a domain
    /// whose span is not strictly positive.
    pub fn new(cells_per_edge: usize, min: f64, max: f64) -> Result<Self, DemError> {
        if cells_per_edge == 0 {
            return Err(DemError::invalid("cells_per_edge", "must be at least 1"));
        }
        if !(min.is_finite() && max.is_finite() && max > min) {
            return Err(DemError::invalid(
                "domain",
                format!("expected finite min < max, got [{min}, {max}]"),
            ));
        }
        let cell_count = cells_per_edge
            .checked_pow(3)
            .ok_or_else(|| DemError::invalid("cells_per_edge", "cell count overflows"))?;

        #[allow(clippy::cast_precision_loss)]
        let cell_size = (max - min) / cells_per_edge as f64;
        Ok(Self {
            cells_per_edge,
            min,
            max,
            cell_size,
            cells: vec![Vec::new(); cell_count],
            occupied: Vec::new(),
            ids: Vec::new(),
            excluded: 0,
            excluded_total: 0,
        })
    }

    #[must_use]
    pub fn cells_per_edge(&self) -> usize {
        self.cells_per_edge
    }

    #[must_use]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Integer cell of a position, or `None` outside `[0, N-1]` on any axis.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn cell_coords(&self, position: crate::Vec3) -> Option<[usize; 3]> {
        let limit = self.cells_per_edge as f64;
        let mut coords = [0usize; 3];
        for (slot, value) in coords.iter_mut().zip(position.to_array()) {
            let index = ((value - self.min) / self.cell_size).floor();
            if !(index >= 0.0 && index < limit) {
                return None;
            }
            *slot = index as usize;
        }
        Some(coords)
    }

    #[must_use]
    pub fn linear_index(&self, [i, j, k]: [usize; 3]) -> usize {
        let n = self.cells_per_edge;
        i + n * j + n * n * k
    }

    /// Particle slots binned into a cell.
    #[must_use]
    pub fn cell(&self, coords: [usize; 3]) -> &[usize] {
        &self.cells[self.linear_index(coords)]
    }

    /// Bins every particle by the cell containing its centre. Particles outside
    /// the domain are left out for this step and counted. Returns how many
    /// particles were binned.
    pub fn assign(&mut self, particles: &[Particle]) -> usize {
        if !self.occupied.is_empty() {
            tracing::warn!("broad phase assigned without reset; clearing stale cells");
            self.reset();
        }

        self.ids.clear();
        self.ids.extend(particles.iter().map(Particle::id));

        for (slot, particle) in particles.iter().enumerate() {
            let Some(coords) = self.cell_coords(particle.position()) else {
                self.excluded += 1;
                continue;
            };
            let index = self.linear_index(coords);
            let cell = &mut self.cells[index];
            if cell.is_empty() {
                self.occupied.push(index);
            }
            cell.push(slot);
        }
        self.occupied.sort_unstable();

        if self.excluded > 0 {
            self.excluded_total += self.excluded as u64;
            tracing::warn!(
                excluded = self.excluded,
                "particles outside the broad-phase domain skipped this step"
            );
        }
        particles.len() - self.excluded
    }

    /// Every unordered pair of distinct particles sharing a 3×3×3 cell
    /// neighbourhood, each reported once.
    #[must_use]
    pub fn candidate_pairs(&self) -> Vec<CandidatePair> {
        let n = self.cells_per_edge;
        let mut seen: HashSet<u128> = HashSet::new();
        let mut pairs = Vec::new();
        let mut neighbourhood: Vec<usize> = Vec::new();

        for &index in &self.occupied {
            let (i, j, k) = (index % n, (index / n) % n, index / (n * n));

            neighbourhood.clear();
            for nk in k.saturating_sub(1)..=(k + 1).min(n - 1) {
                for nj in j.saturating_sub(1)..=(j + 1).min(n - 1) {
                    for ni in i.saturating_sub(1)..=(i + 1).min(n - 1) {
                        neighbourhood.extend_from_slice(self.cell([ni, nj, nk]));
                    }
                }
            }

            for &p in &self.cells[index] {
                for &q in &neighbourhood {
                    if p == q {
                        continue;
                    }
                    let (id_p, id_q) = (self.ids[p], self.ids[q]);
                    if id_p == id_q {
                        continue;
                    }
                    let key = pair_key(id_p, id_q);
                    if seen.insert(key) {
                        let (first, second) = if id_p < id_q { (p, q) } else { (q, p) };
                        pairs.push(CandidatePair { first, second, key });
                    }
                }
            }
        }
        pairs
    }

    /// Empties every cell touched by the last assignment.
    pub fn reset(&mut self) {
        for &index in &self.occupied {
            self.cells[index].clear();
        }
        self.occupied.clear();
        self.ids.clear();
        self.excluded = 0;
    }

    /// Particles skipped by the last assignment.
    #[must_use]
    pub fn excluded(&self) -> usize {
        self.excluded
    }

    /// Particles skipped across every assignment since construction.
    #[must_use]
    pub fn excluded_total(&self) -> u64 {
        self.excluded_total
    }

    #[must_use]
    pub fn stats(&self) -> GridStats {
        let occupied_cells = self.occupied.len();
        let total_entries: usize = self.occupied.iter().map(|&i| self.cells[i].len()).sum();

        #[allow(clippy::cast_precision_loss)]
        let average_entries_per_cell = if occupied_cells > 0 {
            total_entries as f64 / occupied_cells as f64
        } else {
            0.0
        };

        GridStats {
            occupied_cells,
            total_entries,
            average_entries_per_cell,
        }
    }
}
