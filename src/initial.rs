//! Initial conditions for the geostrophic-adjustment experiment.

use faer::Mat;

use crate::grid::StaggeredGrid;

/// Gaussian thickness perturbation centered in the domain:
/// a·exp(−((x − Lx/2)² + (y − Ly/2)²)/r²), sampled at h-points and
/// shaped (ny, nx).
pub fn gaussian_bump(grid: &StaggeredGrid, amplitude: f64, radius: f64) -> Mat<f64> {
    let x0 = grid.lx / 2.0;
    let y0 = grid.ly / 2.0;
    let r2 = radius * radius;
    Mat::from_fn(grid.ny, grid.nx, |iy, ix| {
        let dx = grid.xh[ix] - x0;
        let dy = grid.yh[iy] - y0;
        amplitude * (-(dx * dx + dy * dy) / r2).exp()
    })
}

/// A velocity field at rest, shaped (ny, nx).
pub fn at_rest(grid: &StaggeredGrid) -> Mat<f64> {
    Mat::zeros(grid.ny, grid.nx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_peaks_at_center_and_decays() {
        let grid = StaggeredGrid::new(21, 21, 2000e3, 2000e3).unwrap();
        let h0 = gaussian_bump(&grid, 10.0, 300e3);
        let center = h0[(10, 10)];
        assert!(center > 9.0 && center <= 10.0);
        assert!(h0[(0, 0)] < center);
        assert!(h0[(0, 0)] >= 0.0);
        // radially symmetric about the center cell
        assert!((h0[(10, 3)] - h0[(3, 10)]).abs() < 1e-12);
    }

    #[test]
    fn rest_field_is_zero() {
        let grid = StaggeredGrid::new(5, 4, 500.0, 400.0).unwrap();
        let u0 = at_rest(&grid);
        assert_eq!(u0.nrows(), 4);
        assert_eq!(u0.ncols(), 5);
        for iy in 0..4 {
            for ix in 0..5 {
                assert_eq!(u0[(iy, ix)], 0.0);
            }
        }
    }
}
