//! Staggered-grid finite-difference operators as sparse matrices.
//!
//! All operators act on length-n flattened fields (n = nx·ny, index
//! k = iy·nx + ix). The building blocks are the cyclic index shifts
//! IE/IW/IN/IS; from them:
//!
//! - `DX = (IE − I)/dx`, `DY = (IN − I)/dy` difference h-point values
//!   onto u-/v-points;
//! - `DIV = [(I − IW)/dx, (I − IS)/dy]` differences face velocities back
//!   onto h-points, and is the exact negative adjoint of
//!   `GRAD = [DX; DY]` on the cyclic grid;
//! - the h-equation divergence weights u and v by their face wetness
//!   first, so no volume flux crosses land;
//! - the viscous Laplacians are `DIV ∘ GRAD` with a boundary-aware GRAD
//!   enforcing no-slip. Per cell pair (k, neighbor) the normal
//!   derivative stencil has three cases:
//!   wet/wet      →  (x[nb] − x[k])/Δ      (plain shift difference)
//!   wet/land     →  −2·x[k]/Δ             (velocity mirrored across wall)
//!   land/wet     →  +2·x[nb]/Δ
//!   The factor of 2 reflects the wall sitting half a step from the
//!   velocity point;
//! - the averaging operators interpolate each velocity onto the other
//!   velocity's points (4-point mean, land contributions zeroed), for
//!   the Coriolis coupling.

use crate::error::{ModelError, Result};
use crate::grid::StaggeredGrid;
use crate::mask::LandMask;
use crate::sparse::SparseOp;

/// The full set of sparse operators derived from a grid and mask.
///
/// Built once at setup, immutable afterwards.
#[derive(Clone, Debug)]
pub struct Operators {
    /// Cyclic eastward shift: (IE·x)[k] = x[east(k)].
    pub shift_e: SparseOp,
    /// Cyclic westward shift.
    pub shift_w: SparseOp,
    /// Cyclic northward shift.
    pub shift_n: SparseOp,
    /// Cyclic southward shift.
    pub shift_s: SparseOp,
    /// Forward x-difference (IE − I)/dx, h-points → u-points.
    pub ddx: SparseOp,
    /// Forward y-difference (IN − I)/dy, h-points → v-points.
    pub ddy: SparseOp,
    /// Gradient [DX; DY], n → 2n.
    pub grad: SparseOp,
    /// Divergence [(I − IW)/dx, (I − IS)/dy], 2n → n.
    pub div: SparseOp,
    /// Boundary-masked divergence for the thickness equation, 2n → n.
    pub div_noflux: SparseOp,
    /// No-slip Laplacian acting on u.
    pub del2_u: SparseOp,
    /// No-slip Laplacian acting on v.
    pub del2_v: SparseOp,
    /// v interpolated onto u-points (masked 4-point average).
    pub v_at_u: SparseOp,
    /// u interpolated onto v-points (masked 4-point average).
    pub u_at_v: SparseOp,
    /// u-point wetness weights: 1 where the cell and its eastern
    /// neighbor are both ocean.
    pub u_wet: Vec<f64>,
    /// v-point wetness weights: 1 where the cell and its northern
    /// neighbor are both ocean.
    pub v_wet: Vec<f64>,
}

impl Operators {
    /// Construct every operator for the given grid and mask.
    pub fn build(grid: &StaggeredGrid, mask: &LandMask) -> Result<Self> {
        if mask.nx() != grid.nx || mask.ny() != grid.ny {
            return Err(ModelError::Configuration(format!(
                "mask is {}x{} but grid is {}x{}",
                mask.nx(),
                mask.ny(),
                grid.nx,
                grid.ny
            )));
        }
        let n = grid.n();
        let (dx, dy) = (grid.dx, grid.dy);

        let shift_e = shift_operator(n, |k| grid.east(k));
        let shift_w = shift_operator(n, |k| grid.west(k));
        let shift_n = shift_operator(n, |k| grid.north(k));
        let shift_s = shift_operator(n, |k| grid.south(k));

        let identity = SparseOp::identity(n);
        let ddx = shift_e.sub(&identity).scaled(1.0 / dx);
        let ddy = shift_n.sub(&identity).scaled(1.0 / dy);
        let grad = ddx.vstack(&ddy);

        let back_x = identity.sub(&shift_w).scaled(1.0 / dx);
        let back_y = identity.sub(&shift_s).scaled(1.0 / dy);
        let div = back_x.hstack(&back_y);

        // Face wetness: a velocity point is active only when the cells
        // on both of its sides are ocean.
        let u_wet: Vec<f64> = (0..n).map(|k| mask.value(k) * mask.value(grid.east(k))).collect();
        let v_wet: Vec<f64> = (0..n).map(|k| mask.value(k) * mask.value(grid.north(k))).collect();

        let div_noflux = back_x
            .matmul(&SparseOp::diagonal(&u_wet))
            .hstack(&back_y.matmul(&SparseOp::diagonal(&v_wet)));

        // No-slip gradient for v: the x-derivative switches stencil at
        // east-west walls, the y-derivative is the plain difference.
        let dx0 = no_slip_difference(n, dx, mask, |k| grid.east(k));
        let grad_v = dx0.vstack(&ddy);
        let del2_v = div.matmul(&grad_v);

        // No-slip gradient for u: the y-derivative switches at
        // north-south walls.
        let dy0 = no_slip_difference(n, dy, mask, |k| grid.north(k));
        let grad_u = ddx.vstack(&dy0);
        let del2_u = div.matmul(&grad_u);

        // The four v-points surrounding the u-point at k are
        // {k, E, S, SE}; the four u-points around the v-point at k are
        // {k, N, W, NW}. Contributions from inactive faces are zeroed.
        let v_at_u = masked_average(
            n,
            &v_wet,
            |k| [k, grid.east(k), grid.south(k), grid.east(grid.south(k))],
        );
        let u_at_v = masked_average(
            n,
            &u_wet,
            |k| [k, grid.north(k), grid.west(k), grid.west(grid.north(k))],
        );

        Ok(Self {
            shift_e,
            shift_w,
            shift_n,
            shift_s,
            ddx,
            ddy,
            grad,
            div,
            div_noflux,
            del2_u,
            del2_v,
            v_at_u,
            u_at_v,
            u_wet,
            v_wet,
        })
    }
}

/// Permutation matrix for a cyclic index shift: row k picks up the
/// value at `neighbor(k)`.
fn shift_operator(n: usize, neighbor: impl Fn(usize) -> usize) -> SparseOp {
    let triplets = (0..n).map(|k| (k, neighbor(k), 1.0)).collect();
    SparseOp::from_triplets(n, n, triplets)
}

/// One-directional difference with the three-case no-slip stencil.
///
/// `neighbor` selects the forward neighbor (east for an x-derivative,
/// north for a y-derivative); `delta` is the spacing in that direction.
fn no_slip_difference(
    n: usize,
    delta: f64,
    mask: &LandMask,
    neighbor: impl Fn(usize) -> usize,
) -> SparseOp {
    let mut triplets = Vec::with_capacity(2 * n);
    for k in 0..n {
        let nb = neighbor(k);
        match (mask.is_wet(k), mask.is_wet(nb)) {
            (true, true) => {
                triplets.push((k, nb, 1.0 / delta));
                triplets.push((k, k, -1.0 / delta));
            }
            (true, false) => triplets.push((k, k, -2.0 / delta)),
            (false, true) => triplets.push((k, nb, 2.0 / delta)),
            (false, false) => {}
        }
    }
    SparseOp::from_triplets(n, n, triplets)
}

/// 4-point average over `stencil(k)`, each contribution weighted by the
/// source field's wetness.
fn masked_average(
    n: usize,
    source_wet: &[f64],
    stencil: impl Fn(usize) -> [usize; 4],
) -> SparseOp {
    let mut triplets = Vec::with_capacity(4 * n);
    for k in 0..n {
        for col in stencil(k) {
            if source_wet[col] != 0.0 {
                triplets.push((k, col, 0.25 * source_wet[col]));
            }
        }
    }
    SparseOp::from_triplets(n, n, triplets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(nx: usize, ny: usize) -> (StaggeredGrid, LandMask, Operators) {
        let grid = StaggeredGrid::new(nx, ny, 100.0 * nx as f64, 100.0 * ny as f64).unwrap();
        let mask = LandMask::closed_basin(nx, ny);
        let ops = Operators::build(&grid, &mask).unwrap();
        (grid, mask, ops)
    }

    /// Deterministic but irregular test vector.
    fn wiggle(n: usize, seed: f64) -> Vec<f64> {
        (0..n)
            .map(|k| (seed + 1.3 * k as f64).sin() + 0.5 * (seed * 0.7 + 2.1 * k as f64).cos())
            .collect()
    }

    fn inner(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn shifts_are_permutations() {
        let (grid, _, ops) = setup(5, 4);
        let x = wiggle(grid.n(), 0.3);
        let shifted = ops.shift_e.matvec(&x);
        for k in 0..grid.n() {
            assert_eq!(shifted[k], x[grid.east(k)]);
        }
        // west undoes east
        let back = ops.shift_w.matvec(&shifted);
        for k in 0..grid.n() {
            assert_eq!(back[k], x[k]);
        }
    }

    #[test]
    fn gradient_of_constant_vanishes() {
        let (grid, _, ops) = setup(6, 5);
        let c = vec![3.25; grid.n()];
        for v in ops.grad.matvec(&c) {
            assert_eq!(v, 0.0);
        }
        for v in ops.div.matvec(&vec![1.5; 2 * grid.n()]) {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn divergence_is_negative_adjoint_of_gradient() {
        // <DIV y, x> = -<y, GRAD x> exactly on the cyclic grid.
        let (grid, _, ops) = setup(7, 6);
        let n = grid.n();
        let x = wiggle(n, 1.7);
        let y = wiggle(2 * n, 4.1);
        let lhs = inner(&ops.div.matvec(&y), &x);
        let rhs = -inner(&y, &ops.grad.matvec(&x));
        assert!(
            (lhs - rhs).abs() < 1e-12 * lhs.abs().max(1.0),
            "mimetic adjoint violated: {lhs} vs {rhs}"
        );
    }

    #[test]
    fn masked_divergence_adjoint_on_wet_faces() {
        // For u supported on active u-points and arbitrary h:
        // <DIVnf [u; 0], h> = -<u, DX h>, and the v analogue.
        let (grid, _, ops) = setup(8, 7);
        let n = grid.n();
        let h = wiggle(n, 2.9);

        let mut u = wiggle(n, 5.3);
        for k in 0..n {
            u[k] *= ops.u_wet[k];
        }
        let mut uv = u.clone();
        uv.extend(std::iter::repeat(0.0).take(n));
        let lhs = inner(&ops.div_noflux.matvec(&uv), &h);
        let rhs = -inner(&u, &ops.ddx.matvec(&h));
        assert!((lhs - rhs).abs() < 1e-12 * lhs.abs().max(1.0));

        let mut v = wiggle(n, 6.1);
        for k in 0..n {
            v[k] *= ops.v_wet[k];
        }
        let mut uv = vec![0.0; n];
        uv.extend(v.iter().copied());
        let lhs = inner(&ops.div_noflux.matvec(&uv), &h);
        let rhs = -inner(&v, &ops.ddy.matvec(&h));
        assert!((lhs - rhs).abs() < 1e-12 * lhs.abs().max(1.0));
    }

    #[test]
    fn no_flux_through_land() {
        // A uniform velocity field produces no thickness tendency in
        // the basin interior away from walls, and the masked divergence
        // never draws on land-adjacent faces.
        let (grid, _, ops) = setup(6, 6);
        let n = grid.n();
        let uv = vec![1.0; 2 * n];
        let tendency = ops.div_noflux.matvec(&uv);
        // interior cell far from walls: fluxes cancel
        let k = grid.index(2, 2);
        assert!(tendency[k].abs() < 1e-14);
        // total volume is conserved: sum of tendencies over all cells
        // telescopes to zero because every active face appears twice
        // with opposite signs.
        let total: f64 = tendency.iter().sum();
        assert!(total.abs() < 1e-12);
    }

    #[test]
    fn no_slip_stencil_cases() {
        let (grid, mask, _) = setup(4, 4);
        let n = grid.n();
        let dx = grid.dx;
        let op = no_slip_difference(n, dx, &mask, |k| grid.east(k));

        let mut row = vec![vec![0.0; n]; n];
        for (i, j, v) in op.triplets() {
            row[i][j] += v;
        }

        // wet cell with wet eastern neighbor: centered pair
        let k = grid.index(0, 0);
        assert_eq!(row[k][grid.east(k)], 1.0 / dx);
        assert_eq!(row[k][k], -1.0 / dx);

        // wet cell against the eastern wall: one-sided, factor 2
        let k = grid.index(2, 1);
        assert!(!mask.is_wet(grid.east(k)));
        assert_eq!(row[k][k], -2.0 / dx);
        assert_eq!(row[k][grid.east(k)], 0.0);

        // land cell with wet eastern neighbor (wrap-around column):
        // mirrored, factor 2
        let k = grid.index(3, 1);
        assert!(!mask.is_wet(k) && mask.is_wet(grid.east(k)));
        assert_eq!(row[k][grid.east(k)], 2.0 / dx);
        assert_eq!(row[k][k], 0.0);
    }

    #[test]
    fn averaging_row_sums() {
        let (grid, _, ops) = setup(6, 6);
        let n = grid.n();
        let ones = vec![1.0; n];
        let avg = ops.v_at_u.matvec(&ones);
        // u-point with all four surrounding v-points active: mean of
        // four ones is one.
        let k = grid.index(2, 2);
        assert!((avg[k] - 1.0).abs() < 1e-14);
        // u-point whose stencil touches the wall: land faces drop out,
        // so the weight is strictly less than one.
        let k = grid.index(2, grid.ny - 2);
        assert!(avg[k] < 1.0);
    }

    #[test]
    fn mask_shape_mismatch_is_rejected() {
        let grid = StaggeredGrid::new(4, 4, 400.0, 400.0).unwrap();
        let mask = LandMask::closed_basin(5, 4);
        assert!(Operators::build(&grid, &mask).is_err());
    }
}
