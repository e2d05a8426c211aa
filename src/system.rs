//! Assembly of the coupled linear shallow-water operator.
//!
//! The state vector stacks the flattened fields as [u, v, h] and
//! evolves by ds/dt = −L·s with
//!
//! ```text
//! L = [ -Ah·DEL2u        -diag(fu)·v_at_u    g'·DX ]
//!     [  diag(fv)·u_at_v  -Ah·DEL2v          g'·DY ]
//!     [  H·DIVnf_u        H·DIVnf_v          0     ]
//! ```
//!
//! so the momentum rows carry viscosity, the Coriolis coupling
//! (interpolated onto the opposite velocity's points on a beta plane)
//! and the pressure gradient, and the thickness row carries the
//! no-flux mass divergence. Built once; immutable.

use crate::grid::StaggeredGrid;
use crate::operators::Operators;
use crate::params::DerivedParams;
use crate::sparse::SparseOp;

/// Coriolis parameter f0 + β·y sampled at every u-point.
pub fn coriolis_at_u(grid: &StaggeredGrid, derived: &DerivedParams) -> Vec<f64> {
    (0..grid.n())
        .map(|k| derived.f0 + derived.beta * grid.u_point(k).1)
        .collect()
}

/// Coriolis parameter f0 + β·y sampled at every v-point.
pub fn coriolis_at_v(grid: &StaggeredGrid, derived: &DerivedParams) -> Vec<f64> {
    (0..grid.n())
        .map(|k| derived.f0 + derived.beta * grid.v_point(k).1)
        .collect()
}

/// Assemble the 3n × 3n evolution operator from the difference
/// operators, the Coriolis fields, the viscosity Ah, the reduced
/// gravity g' and the reference thickness H.
pub fn assemble(
    grid: &StaggeredGrid,
    ops: &Operators,
    derived: &DerivedParams,
    depth: f64,
    viscosity: f64,
) -> SparseOp {
    let n = grid.n();
    let fu = coriolis_at_u(grid, derived);
    let fv = coriolis_at_v(grid, derived);

    let blocks: [(usize, usize, SparseOp); 6] = [
        (0, 0, ops.del2_u.scaled(-viscosity)),
        (0, 1, ops.v_at_u.scale_rows(&fu).scaled(-1.0)),
        (0, 2, ops.ddx.scaled(derived.gp)),
        (1, 0, ops.u_at_v.scale_rows(&fv)),
        (1, 1, ops.del2_v.scaled(-viscosity)),
        (1, 2, ops.ddy.scaled(derived.gp)),
    ];

    let mut triplets = Vec::new();
    for (bi, bj, block) in &blocks {
        triplets.extend(
            block
                .triplets()
                .map(|(i, j, v)| (bi * n + i, bj * n + j, v)),
        );
    }
    // Thickness row: H·DIVnf spans the u and v columns directly.
    triplets.extend(
        ops.div_noflux
            .triplets()
            .map(|(i, j, v)| (2 * n + i, j, depth * v)),
    );

    SparseOp::from_triplets(3 * n, 3 * n, triplets)
}
