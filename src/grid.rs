//! Arakawa-C staggered grid.
//!
//! Thickness h lives at cell centers, zonal velocity u at east cell
//! faces, meridional velocity v at north cell faces:
//!
//! ```text
//!        +----v----+
//!        |         |
//!        |    h    u      v offset +dy/2, u offset +dx/2
//!        |         |
//!        +---------+
//! ```
//!
//! All three point sets have the same cardinality n = nx·ny and share
//! the flattened index k = iy·nx + ix over a (ny, nx) field. Neighbor
//! lookups are cyclic; the closed-basin land ring (see
//! [`crate::mask::LandMask`]) is what keeps the wrap-around physically
//! inert.

use crate::error::{ModelError, Result};

/// Staggered grid geometry for a rectangular domain.
#[derive(Clone, Debug)]
pub struct StaggeredGrid {
    /// Number of grid points in x.
    pub nx: usize,
    /// Number of grid points in y.
    pub ny: usize,
    /// East-west domain size (m).
    pub lx: f64,
    /// North-south domain size (m).
    pub ly: f64,
    /// Grid spacing in x (m).
    pub dx: f64,
    /// Grid spacing in y (m).
    pub dy: f64,
    /// x-coordinates of h-points (cell centers), length nx.
    pub xh: Vec<f64>,
    /// y-coordinates of h-points, length ny.
    pub yh: Vec<f64>,
    /// x-coordinates of u-points (east faces), length nx.
    pub xu: Vec<f64>,
    /// y-coordinates of u-points, length ny.
    pub yu: Vec<f64>,
    /// x-coordinates of v-points, length nx.
    pub xv: Vec<f64>,
    /// y-coordinates of v-points (north faces), length ny.
    pub yv: Vec<f64>,
}

impl StaggeredGrid {
    /// Build the staggered coordinate arrays for an nx × ny grid over a
    /// domain of physical extent lx × ly.
    pub fn new(nx: usize, ny: usize, lx: f64, ly: f64) -> Result<Self> {
        if nx < 2 || ny < 2 {
            return Err(ModelError::Configuration(format!(
                "grid must be at least 2x2, got {nx}x{ny}"
            )));
        }
        if !lx.is_finite() || lx <= 0.0 || !ly.is_finite() || ly <= 0.0 {
            return Err(ModelError::Configuration(format!(
                "domain extents must be positive and finite, got {lx} x {ly}"
            )));
        }
        let dx = lx / nx as f64;
        let dy = ly / ny as f64;

        let xh: Vec<f64> = (0..nx).map(|i| (i as f64 + 0.5) * dx).collect();
        let yh: Vec<f64> = (0..ny).map(|j| (j as f64 + 0.5) * dy).collect();
        let xu: Vec<f64> = (0..nx).map(|i| (i as f64 + 1.0) * dx).collect();
        let yv: Vec<f64> = (0..ny).map(|j| (j as f64 + 1.0) * dy).collect();

        Ok(Self {
            nx,
            ny,
            lx,
            ly,
            dx,
            dy,
            xu,
            yu: yh.clone(),
            xv: xh.clone(),
            xh,
            yh,
            yv,
        })
    }

    /// Number of points in each of the three point sets.
    #[inline]
    pub fn n(&self) -> usize {
        self.nx * self.ny
    }

    /// Flattened index of cell (ix, iy).
    #[inline]
    pub fn index(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx + ix
    }

    /// Cyclic eastern neighbor of flattened index k.
    #[inline]
    pub fn east(&self, k: usize) -> usize {
        let (ix, iy) = (k % self.nx, k / self.nx);
        iy * self.nx + (ix + 1) % self.nx
    }

    /// Cyclic western neighbor of flattened index k.
    #[inline]
    pub fn west(&self, k: usize) -> usize {
        let (ix, iy) = (k % self.nx, k / self.nx);
        iy * self.nx + (ix + self.nx - 1) % self.nx
    }

    /// Cyclic northern neighbor of flattened index k.
    #[inline]
    pub fn north(&self, k: usize) -> usize {
        let (ix, iy) = (k % self.nx, k / self.nx);
        ((iy + 1) % self.ny) * self.nx + ix
    }

    /// Cyclic southern neighbor of flattened index k.
    #[inline]
    pub fn south(&self, k: usize) -> usize {
        let (ix, iy) = (k % self.nx, k / self.nx);
        ((iy + self.ny - 1) % self.ny) * self.nx + ix
    }

    /// Physical coordinates of the h-point with flattened index k.
    #[inline]
    pub fn h_point(&self, k: usize) -> (f64, f64) {
        (self.xh[k % self.nx], self.yh[k / self.nx])
    }

    /// Physical coordinates of the u-point with flattened index k.
    #[inline]
    pub fn u_point(&self, k: usize) -> (f64, f64) {
        (self.xu[k % self.nx], self.yu[k / self.nx])
    }

    /// Physical coordinates of the v-point with flattened index k.
    #[inline]
    pub fn v_point(&self, k: usize) -> (f64, f64) {
        (self.xv[k % self.nx], self.yv[k / self.nx])
    }
}
