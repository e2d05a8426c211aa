//! Model configuration and derived physical parameters.
//!
//! The configuration carries the quantities a caller chooses (grid
//! resolution, domain size, reference latitude, Rossby radius, reference
//! thickness, viscosity); the derived set (Coriolis parameter, beta,
//! reduced gravity, gravity-wave speed) is computed once at construction
//! and held fixed for the run.

use std::f64::consts::PI;

use crate::error::{ModelError, Result};

/// Earth's radius (m).
pub const EARTH_RADIUS: f64 = 6370e3;

/// Earth's rotational frequency, 2π per day (1/s).
pub const EARTH_ROTATION_RATE: f64 = 2.0 * PI / (24.0 * 60.0 * 60.0);

/// Caller-supplied model configuration.
///
/// All quantities are validated by [`ModelConfig::validate`] before any
/// grid or operator construction happens.
#[derive(Clone, Copy, Debug)]
pub struct ModelConfig {
    /// Number of grid points in the x-direction.
    pub nx: usize,
    /// Number of grid points in the y-direction.
    pub ny: usize,
    /// East-west domain size (m).
    pub lx: f64,
    /// North-south domain size (m).
    pub ly: f64,
    /// Reference latitude (degrees).
    pub latitude_deg: f64,
    /// Rossby radius of deformation (m).
    pub rossby_radius: f64,
    /// Reference layer thickness H (m).
    pub depth: f64,
    /// Lateral eddy viscosity Ah (m²/s).
    pub viscosity: f64,
    /// Planetary radius (m).
    pub earth_radius: f64,
    /// Planetary rotational frequency (1/s).
    pub rotation_rate: f64,
}

impl Default for ModelConfig {
    /// The reference geostrophic-adjustment experiment: a 2000 km
    /// closed basin at 30°N with a 600 m active layer.
    fn default() -> Self {
        Self {
            nx: 101,
            ny: 101,
            lx: 2000e3,
            ly: 2000e3,
            latitude_deg: 30.0,
            rossby_radius: 100e3,
            depth: 600.0,
            viscosity: 1e4,
            earth_radius: EARTH_RADIUS,
            rotation_rate: EARTH_ROTATION_RATE,
        }
    }
}

impl ModelConfig {
    /// Check that the configuration describes a solvable model.
    ///
    /// Grid dimensions below 2 make the cyclic shift operators
    /// degenerate and are rejected along with non-positive or
    /// non-finite physical extents.
    pub fn validate(&self) -> Result<()> {
        if self.nx < 2 || self.ny < 2 {
            return Err(ModelError::Configuration(format!(
                "grid must be at least 2x2, got {}x{}",
                self.nx, self.ny
            )));
        }
        for (name, value) in [
            ("lx", self.lx),
            ("ly", self.ly),
            ("rossby_radius", self.rossby_radius),
            ("depth", self.depth),
            ("earth_radius", self.earth_radius),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ModelError::Configuration(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        if !self.viscosity.is_finite() || self.viscosity < 0.0 {
            return Err(ModelError::Configuration(format!(
                "viscosity must be non-negative, got {}",
                self.viscosity
            )));
        }
        if !self.latitude_deg.is_finite() || self.latitude_deg.abs() > 90.0 {
            return Err(ModelError::Configuration(format!(
                "latitude must lie in [-90, 90] degrees, got {}",
                self.latitude_deg
            )));
        }
        if !self.rotation_rate.is_finite() || self.rotation_rate < 0.0 {
            return Err(ModelError::Configuration(format!(
                "rotation rate must be non-negative, got {}",
                self.rotation_rate
            )));
        }
        Ok(())
    }
}

/// Physical parameters derived once from a [`ModelConfig`].
#[derive(Clone, Copy, Debug)]
pub struct DerivedParams {
    /// Reference latitude (radians).
    pub phi0: f64,
    /// Coriolis parameter f0 = 2Ω sin(φ0) (1/s).
    pub f0: f64,
    /// Beta-plane parameter β = 2Ω cos(φ0)/a (1/(m·s)).
    pub beta: f64,
    /// Reduced gravity g' (m/s²).
    pub gp: f64,
    /// Gravity-wave speed c = √(g'H) (m/s).
    pub cg: f64,
}

impl DerivedParams {
    /// Compute the derived set from a validated configuration.
    ///
    /// The reduced gravity follows from the prescribed Rossby radius:
    /// g' = (f0·Rd)²/H on an f-plane away from the equator, and
    /// g' = Rd²·β/H when f0 vanishes. Both branches use the instance's
    /// reference thickness. A non-positive wave speed leaves the model
    /// without a CFL scale and is a configuration error.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let phi0 = PI * config.latitude_deg / 180.0;
        let f0 = 2.0 * config.rotation_rate * phi0.sin();
        let beta = 2.0 * config.rotation_rate / config.earth_radius * phi0.cos();
        let rd = config.rossby_radius;
        let gp = if f0 == 0.0 {
            rd * rd * beta / config.depth
        } else {
            (f0 * rd) * (f0 * rd) / config.depth
        };
        if !gp.is_finite() || gp <= 0.0 {
            return Err(ModelError::Configuration(format!(
                "derived reduced gravity must be positive, got {gp} \
                 (latitude {} deg, rotation rate {})",
                config.latitude_deg, config.rotation_rate
            )));
        }
        let cg = (gp * config.depth).sqrt();
        Ok(Self {
            phi0,
            f0,
            beta,
            gp,
            cg,
        })
    }
}
