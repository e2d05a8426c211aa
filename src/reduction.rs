//! Reduction of the stacked state to wet degrees of freedom.
//!
//! Land entries of the full [u, v, h] vector are identically zero for
//! the whole run, so the solved system only carries the wet entries.
//! The index mappings between the two representations are computed once
//! from the mask and stored; they are the authoritative full ↔ reduced
//! correspondence for the run.
//!
//! Wetness follows the staggering convention:
//! - a u-entry is active iff its cell and its eastern neighbor are ocean,
//! - a v-entry is active iff its cell and its northern neighbor are ocean,
//! - an h-entry is active iff its cell is ocean.

use crate::error::{ModelError, Result};
use crate::grid::StaggeredGrid;
use crate::mask::LandMask;

/// Index mappings between the full padded state (length 3n) and the
/// reduced wet-only state.
#[derive(Clone, Debug)]
pub struct DofMap {
    n: usize,
    wet_indices: Vec<usize>,
    full_to_reduced: Vec<Option<usize>>,
    u_keep: Vec<bool>,
    v_keep: Vec<bool>,
    h_keep: Vec<bool>,
}

impl DofMap {
    /// Classify every entry of the stacked state and build the
    /// mappings. A mask with no wet entries leaves nothing to solve
    /// and is rejected here, before any factorization is attempted.
    pub fn build(grid: &StaggeredGrid, mask: &LandMask) -> Result<Self> {
        let n = grid.n();
        let u_keep: Vec<bool> = (0..n)
            .map(|k| mask.is_wet(k) && mask.is_wet(grid.east(k)))
            .collect();
        let v_keep: Vec<bool> = (0..n)
            .map(|k| mask.is_wet(k) && mask.is_wet(grid.north(k)))
            .collect();
        let h_keep: Vec<bool> = (0..n).map(|k| mask.is_wet(k)).collect();

        let keep = u_keep.iter().chain(&v_keep).chain(&h_keep);
        let mut wet_indices = Vec::new();
        let mut full_to_reduced = vec![None; 3 * n];
        for (full, &kept) in keep.enumerate() {
            if kept {
                full_to_reduced[full] = Some(wet_indices.len());
                wet_indices.push(full);
            }
        }

        if wet_indices.is_empty() {
            return Err(ModelError::Configuration(
                "mask yields zero wet degrees of freedom".into(),
            ));
        }

        Ok(Self {
            n,
            wet_indices,
            full_to_reduced,
            u_keep,
            v_keep,
            h_keep,
        })
    }

    /// Points per field (nx·ny).
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Length of the full padded vector (3n).
    #[inline]
    pub fn n_full(&self) -> usize {
        3 * self.n
    }

    /// Number of wet degrees of freedom.
    #[inline]
    pub fn n_reduced(&self) -> usize {
        self.wet_indices.len()
    }

    /// Ordered wet indices into the full vector; strictly increasing.
    #[inline]
    pub fn wet_indices(&self) -> &[usize] {
        &self.wet_indices
    }

    /// Full index → reduced index, `None` for dead entries.
    #[inline]
    pub fn full_to_reduced(&self) -> &[Option<usize>] {
        &self.full_to_reduced
    }

    /// Active u-entries within a flattened field.
    #[inline]
    pub fn u_keep(&self) -> &[bool] {
        &self.u_keep
    }

    /// Active v-entries within a flattened field.
    #[inline]
    pub fn v_keep(&self) -> &[bool] {
        &self.v_keep
    }

    /// Active h-entries within a flattened field.
    #[inline]
    pub fn h_keep(&self) -> &[bool] {
        &self.h_keep
    }

    /// Gather the wet entries of a full vector into reduced order.
    pub fn reduce(&self, full: &[f64]) -> Vec<f64> {
        assert_eq!(full.len(), self.n_full(), "full vector length mismatch");
        self.wet_indices.iter().map(|&k| full[k]).collect()
    }

    /// Scatter a reduced vector back into the full representation,
    /// writing exact zeros into every dead entry.
    pub fn expand(&self, reduced: &[f64], full: &mut [f64]) {
        assert_eq!(reduced.len(), self.n_reduced(), "reduced vector length mismatch");
        assert_eq!(full.len(), self.n_full(), "full vector length mismatch");
        full.fill(0.0);
        for (r, &k) in self.wet_indices.iter().enumerate() {
            full[k] = reduced[r];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(nx: usize, ny: usize) -> (StaggeredGrid, LandMask, DofMap) {
        let grid = StaggeredGrid::new(nx, ny, 100.0 * nx as f64, 100.0 * ny as f64).unwrap();
        let mask = LandMask::closed_basin(nx, ny);
        let dofs = DofMap::build(&grid, &mask).unwrap();
        (grid, mask, dofs)
    }

    #[test]
    fn wet_counts_follow_staggering() {
        let (_, _, dofs) = setup(5, 4);
        // closed 5x4 basin: 4x3 ocean cells; u active on 3x3 faces,
        // v active on 4x2 faces.
        assert_eq!(dofs.h_keep().iter().filter(|&&k| k).count(), 12);
        assert_eq!(dofs.u_keep().iter().filter(|&&k| k).count(), 9);
        assert_eq!(dofs.v_keep().iter().filter(|&&k| k).count(), 8);
        assert_eq!(dofs.n_reduced(), 29);
    }

    #[test]
    fn wet_indices_strictly_increasing() {
        let (_, _, dofs) = setup(6, 6);
        let idx = dofs.wet_indices();
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        for (r, &k) in idx.iter().enumerate() {
            assert_eq!(dofs.full_to_reduced()[k], Some(r));
        }
    }

    #[test]
    fn reduce_expand_round_trip() {
        let (_, _, dofs) = setup(7, 5);
        let m = dofs.n_reduced();
        let reduced: Vec<f64> = (0..m).map(|i| (i as f64 * 0.37).sin()).collect();

        let mut full = vec![f64::NAN; dofs.n_full()];
        dofs.expand(&reduced, &mut full);
        // dead entries are exactly zero after expansion
        for (k, &v) in full.iter().enumerate() {
            if dofs.full_to_reduced()[k].is_none() {
                assert_eq!(v, 0.0);
            }
        }
        // round trip is the identity
        assert_eq!(dofs.reduce(&full), reduced);
    }

    #[test]
    fn expand_reduce_is_identity_on_clean_full_vectors() {
        let (_, _, dofs) = setup(4, 4);
        let mut full = vec![0.0; dofs.n_full()];
        for (k, slot) in full.iter_mut().enumerate() {
            if dofs.full_to_reduced()[k].is_some() {
                *slot = k as f64 + 0.5;
            }
        }
        let reduced = dofs.reduce(&full);
        let mut back = vec![0.0; dofs.n_full()];
        dofs.expand(&reduced, &mut back);
        assert_eq!(back, full);
    }

    #[test]
    fn all_land_mask_is_a_configuration_error() {
        let grid = StaggeredGrid::new(4, 4, 400.0, 400.0).unwrap();
        let mask = LandMask::new(4, 4, vec![false; 16]).unwrap();
        let err = DofMap::build(&grid, &mask).unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }
}
