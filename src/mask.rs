//! Land-sea mask defined on h-points.
//!
//! 1 = ocean point, 0 = land point. The mask is immutable after setup;
//! the closed-basin variant marks the last column and last row as land,
//! which turns the cyclic shift operators into a closed domain.

use crate::error::{ModelError, Result};

/// Ocean/land classification of every h-point.
#[derive(Clone, Debug)]
pub struct LandMask {
    nx: usize,
    ny: usize,
    wet: Vec<bool>,
}

impl LandMask {
    /// Build a mask from an explicit wet/dry field, flattened with
    /// k = iy·nx + ix.
    pub fn new(nx: usize, ny: usize, wet: Vec<bool>) -> Result<Self> {
        if wet.len() != nx * ny {
            return Err(ModelError::Configuration(format!(
                "mask length {} does not match {}x{} grid",
                wet.len(),
                nx,
                ny
            )));
        }
        Ok(Self { nx, ny, wet })
    }

    /// The reference closed basin: ocean everywhere except the last
    /// column and last row, which absorb the cyclic wrap-around.
    pub fn closed_basin(nx: usize, ny: usize) -> Self {
        let mut wet = vec![true; nx * ny];
        for iy in 0..ny {
            wet[iy * nx + (nx - 1)] = false;
        }
        for ix in 0..nx {
            wet[(ny - 1) * nx + ix] = false;
        }
        Self { nx, ny, wet }
    }

    /// Whether the h-point with flattened index k is ocean.
    #[inline]
    pub fn is_wet(&self, k: usize) -> bool {
        self.wet[k]
    }

    /// The mask value at k as 0.0 or 1.0, for operator weighting.
    #[inline]
    pub fn value(&self, k: usize) -> f64 {
        if self.wet[k] {
            1.0
        } else {
            0.0
        }
    }

    /// Number of h-points.
    #[inline]
    pub fn len(&self) -> usize {
        self.wet.len()
    }

    /// Whether the mask has no points at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.wet.is_empty()
    }

    /// Number of ocean points.
    pub fn wet_count(&self) -> usize {
        self.wet.iter().filter(|&&w| w).count()
    }

    /// Grid width this mask was built for.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Grid height this mask was built for.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }
}
