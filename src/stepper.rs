//! Semi-implicit Crank–Nicolson time stepping.
//!
//! The pair A = I + (dt/2)·L, B = I − (dt/2)·L is formed once,
//! restricted to the wet degrees of freedom, and A is LU-factorized a
//! single time. Every step is then one cheap solve
//!
//! ```text
//! A·s_{n+1} = B·s_n
//! ```
//!
//! through the cached factorization; the factorization is never
//! recomputed during a run. The averaging of the implicit and explicit
//! operators makes the scheme unconditionally stable for this linear
//! system, and the chosen dt = 0.5·dx/c keeps gravity waves
//! well-resolved anyway.
//!
//! The sparse factorization itself is an opaque capability provided by
//! faer; this module is the only place that touches it.

use faer::prelude::*;
use faer::sparse::linalg::solvers::Lu;
use faer::sparse::{SparseColMat, Triplet};
use faer::Mat;

use crate::error::{ModelError, Result};
use crate::reduction::DofMap;
use crate::sparse::SparseOp;

/// The factorized Crank–Nicolson pair on the reduced space.
#[derive(Debug)]
pub struct CrankNicolson {
    dt: f64,
    n_reduced: usize,
    b_reduced: SparseOp,
    solver: Lu<usize, f64>,
}

impl CrankNicolson {
    /// Form and factorize the implicit matrix. Fails loudly with
    /// [`ModelError::SingularSystem`] if A cannot be factorized; that
    /// indicates a modeling error, not something to retry.
    pub fn new(l: &SparseOp, dofs: &DofMap, dt: f64) -> Result<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(ModelError::Configuration(format!(
                "time step must be positive and finite, got {dt}"
            )));
        }
        if l.nrows() != dofs.n_full() || l.ncols() != dofs.n_full() {
            return Err(ModelError::Configuration(format!(
                "operator is {}x{} but the state has {} entries",
                l.nrows(),
                l.ncols(),
                dofs.n_full()
            )));
        }

        let identity = SparseOp::identity(dofs.n_full());
        let half = l.scaled(0.5 * dt);
        let m = dofs.n_reduced();
        let a_reduced = identity.add(&half).restrict(dofs.full_to_reduced(), m);
        let b_reduced = identity.sub(&half).restrict(dofs.full_to_reduced(), m);

        let triplets: Vec<Triplet<usize, usize, f64>> = a_reduced
            .triplets()
            .map(|(i, j, v)| Triplet::new(i, j, v))
            .collect();
        let a = SparseColMat::<usize, f64>::try_new_from_triplets(m, m, &triplets)
            .map_err(|e| {
                ModelError::Configuration(format!("implicit matrix assembly failed: {e:?}"))
            })?;

        let solver = a
            .as_ref()
            .sp_lu()
            .map_err(|e| ModelError::SingularSystem(format!("sparse LU failed: {e:?}")))?;

        Ok(Self {
            dt,
            n_reduced: m,
            b_reduced,
            solver,
        })
    }

    /// The fixed time step (s).
    #[inline]
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Size of the reduced system.
    #[inline]
    pub fn n_reduced(&self) -> usize {
        self.n_reduced
    }

    /// Advance the reduced state by one step: solve A·s' = B·s through
    /// the cached factorization.
    pub fn advance(&self, s: &[f64]) -> Result<Vec<f64>> {
        let rhs_vec = self.b_reduced.matvec(s);
        let rhs = Mat::from_fn(self.n_reduced, 1, |i, _| rhs_vec[i]);
        let solution = self.solver.solve(&rhs);

        let next: Vec<f64> = (0..self.n_reduced).map(|i| solution[(i, 0)]).collect();
        if next.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::SolveFailure(
                "solution contains non-finite values".into(),
            ));
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::StaggeredGrid;
    use crate::mask::LandMask;
    use crate::operators::Operators;
    use crate::params::{DerivedParams, ModelConfig};
    use crate::system::assemble;

    fn small_problem() -> (SparseOp, DofMap, f64) {
        let config = ModelConfig {
            nx: 9,
            ny: 9,
            lx: 900e3,
            ly: 900e3,
            ..ModelConfig::default()
        };
        let grid = StaggeredGrid::new(config.nx, config.ny, config.lx, config.ly).unwrap();
        let mask = LandMask::closed_basin(config.nx, config.ny);
        let ops = Operators::build(&grid, &mask).unwrap();
        let derived = DerivedParams::from_config(&config).unwrap();
        let l = assemble(&grid, &ops, &derived, config.depth, config.viscosity);
        let dofs = DofMap::build(&grid, &mask).unwrap();
        let dt = 0.5 * grid.dx / derived.cg;
        (l, dofs, dt)
    }

    #[test]
    fn zero_operator_gives_identity_stepping() {
        let (_, dofs, dt) = small_problem();
        let zero = SparseOp::from_triplets(dofs.n_full(), dofs.n_full(), Vec::new());
        let cn = CrankNicolson::new(&zero, &dofs, dt).unwrap();
        let s: Vec<f64> = (0..cn.n_reduced()).map(|i| (i as f64 * 0.11).cos()).collect();
        let next = cn.advance(&s).unwrap();
        for (a, b) in s.iter().zip(&next) {
            assert!((a - b).abs() < 1e-13);
        }
    }

    #[test]
    fn advance_is_deterministic() {
        let (l, dofs, dt) = small_problem();
        let cn = CrankNicolson::new(&l, &dofs, dt).unwrap();
        let s: Vec<f64> = (0..cn.n_reduced()).map(|i| (i as f64 * 0.03).sin()).collect();
        let a = cn.advance(&s).unwrap();
        let b = cn.advance(&s).unwrap();
        assert_eq!(a, b, "repeated solves must be bit-for-bit identical");
    }

    #[test]
    fn rejects_invalid_dt() {
        let (l, dofs, _) = small_problem();
        assert!(CrankNicolson::new(&l, &dofs, 0.0).is_err());
        assert!(CrankNicolson::new(&l, &dofs, f64::NAN).is_err());
        assert!(CrankNicolson::new(&l, &dofs, -5.0).is_err());
    }

    #[test]
    fn rejects_mismatched_operator() {
        let (_, dofs, dt) = small_problem();
        let wrong = SparseOp::identity(10);
        assert!(CrankNicolson::new(&wrong, &dofs, dt).is_err());
    }
}
