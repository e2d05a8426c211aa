//! The engine handle: setup, stepping, and field snapshots.
//!
//! Construction performs the whole setup chain — grid, mask, operators,
//! system assembly, degree-of-freedom reduction, factorization — and
//! yields a handle that is immutable except for the evolving state
//! vector. The one-time factorization amortizes over thousands of
//! cheap per-step solves.
//!
//! The engine is single-threaded and synchronous; independent instances
//! own all of their state and can run side by side, but a single
//! instance is not internally parallel.

use faer::Mat;

use crate::error::{ModelError, Result};
use crate::grid::StaggeredGrid;
use crate::initial::{at_rest, gaussian_bump};
use crate::mask::LandMask;
use crate::operators::Operators;
use crate::params::{DerivedParams, ModelConfig};
use crate::reduction::DofMap;
use crate::sparse::SparseOp;
use crate::stepper::CrankNicolson;
use crate::system::assemble;

/// Amplitude (m) of the reference initial thickness bump.
const BUMP_AMPLITUDE: f64 = 10.0;

/// A ready-to-step shallow-water model instance.
#[derive(Debug)]
pub struct Engine {
    config: ModelConfig,
    derived: DerivedParams,
    grid: StaggeredGrid,
    mask: LandMask,
    dofs: DofMap,
    stepper: CrankNicolson,
    /// Reduced state, the only per-step mutable data.
    s: Vec<f64>,
    /// Scratch full vector for unpacking.
    full: Vec<f64>,
    u: Mat<f64>,
    v: Mat<f64>,
    h: Mat<f64>,
    h0: Mat<f64>,
    time: f64,
    steps: u64,
}

impl Engine {
    /// Initialize the reference geostrophic-adjustment experiment: a
    /// closed basin, a Gaussian thickness bump of Rossby-radius width
    /// centered in the domain, and velocities at rest.
    pub fn new(config: ModelConfig) -> Result<Self> {
        config.validate()?;
        let grid = StaggeredGrid::new(config.nx, config.ny, config.lx, config.ly)?;
        let mask = LandMask::closed_basin(config.nx, config.ny);
        let h0 = gaussian_bump(&grid, BUMP_AMPLITUDE, config.rossby_radius);
        let u0 = at_rest(&grid);
        let v0 = at_rest(&grid);
        Self::with_initial_state(config, mask, h0, u0, v0)
    }

    /// Initialize with a caller-supplied mask and initial fields, each
    /// shaped (ny, nx).
    pub fn with_initial_state(
        config: ModelConfig,
        mask: LandMask,
        h0: Mat<f64>,
        u0: Mat<f64>,
        v0: Mat<f64>,
    ) -> Result<Self> {
        config.validate()?;
        let derived = DerivedParams::from_config(&config)?;
        let grid = StaggeredGrid::new(config.nx, config.ny, config.lx, config.ly)?;
        for (name, field) in [("h0", &h0), ("u0", &u0), ("v0", &v0)] {
            if field.nrows() != grid.ny || field.ncols() != grid.nx {
                return Err(ModelError::Configuration(format!(
                    "{name} is {}x{} but the grid is {}x{} (ny x nx)",
                    field.nrows(),
                    field.ncols(),
                    grid.ny,
                    grid.nx
                )));
            }
        }

        let ops = Operators::build(&grid, &mask)?;
        let l = assemble(&grid, &ops, &derived, config.depth, config.viscosity);
        let dofs = DofMap::build(&grid, &mask)?;
        let dt = 0.5 * grid.dx / derived.cg;
        let stepper = CrankNicolson::new(&l, &dofs, dt)?;

        let n = grid.n();
        let mut state = vec![0.0; 3 * n];
        for iy in 0..grid.ny {
            for ix in 0..grid.nx {
                let k = grid.index(ix, iy);
                state[k] = u0[(iy, ix)];
                state[n + k] = v0[(iy, ix)];
                state[2 * n + k] = h0[(iy, ix)];
            }
        }
        let s = dofs.reduce(&state);
        let mut full = vec![0.0; 3 * n];
        dofs.expand(&s, &mut full);

        let mut engine = Self {
            config,
            derived,
            grid,
            mask,
            dofs,
            stepper,
            s,
            full,
            u: Mat::zeros(config.ny, config.nx),
            v: Mat::zeros(config.ny, config.nx),
            h: Mat::zeros(config.ny, config.nx),
            h0,
            time: 0.0,
            steps: 0,
        };
        engine.refresh_snapshots();
        Ok(engine)
    }

    /// Advance the state by one time step.
    ///
    /// On failure nothing public is mutated; a solve failure is fatal
    /// for the instance.
    pub fn step(&mut self) -> Result<()> {
        let next = self.stepper.advance(&self.s)?;
        self.s = next;
        self.dofs.expand(&self.s, &mut self.full);
        self.refresh_snapshots();
        self.steps += 1;
        self.time += self.stepper.dt();
        Ok(())
    }

    fn refresh_snapshots(&mut self) {
        let n = self.grid.n();
        for iy in 0..self.grid.ny {
            for ix in 0..self.grid.nx {
                let k = self.grid.index(ix, iy);
                self.u[(iy, ix)] = self.full[k];
                self.v[(iy, ix)] = self.full[n + k];
                self.h[(iy, ix)] = self.full[2 * n + k];
            }
        }
    }

    /// Current (U, V, H) snapshots, each shaped (ny, nx). Land entries
    /// are exactly zero.
    pub fn fields(&self) -> (&Mat<f64>, &Mat<f64>, &Mat<f64>) {
        (&self.u, &self.v, &self.h)
    }

    /// The fixed initial thickness field, for reference overlays.
    pub fn initial_thickness(&self) -> &Mat<f64> {
        &self.h0
    }

    /// The fixed time step (s).
    pub fn dt(&self) -> f64 {
        self.stepper.dt()
    }

    /// Model time (s) since initialization.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The grid geometry.
    pub fn grid(&self) -> &StaggeredGrid {
        &self.grid
    }

    /// The land-sea mask.
    pub fn mask(&self) -> &LandMask {
        &self.mask
    }

    /// Number of wet degrees of freedom in the solved system.
    pub fn dof_count(&self) -> usize {
        self.dofs.n_reduced()
    }

    /// The derived physical parameters held fixed for the run.
    pub fn derived(&self) -> &DerivedParams {
        &self.derived
    }

    /// Total energy over wet points (J per unit density):
    /// Σ dx·dy·(H(u² + v²)/2 + g'·h²/2). Approximately conserved for
    /// an inviscid closed basin.
    pub fn energy(&self) -> f64 {
        let n = self.grid.n();
        let half_h = 0.5 * self.config.depth;
        let half_gp = 0.5 * self.derived.gp;
        let mut sum = 0.0;
        for k in 0..n {
            let u = self.full[k];
            let v = self.full[n + k];
            let h = self.full[2 * n + k];
            sum += half_h * (u * u + v * v) + half_gp * h * h;
        }
        sum * self.grid.dx * self.grid.dy
    }

    /// Total thickness anomaly volume over ocean cells: Σ dx·dy·h.
    pub fn mass(&self) -> f64 {
        let n = self.grid.n();
        let sum: f64 = (0..n).map(|k| self.full[2 * n + k]).sum();
        sum * self.grid.dx * self.grid.dy
    }

    /// The assembled evolution operator for this configuration, exposed
    /// for diagnostics and property tests.
    pub fn operator(config: &ModelConfig) -> Result<SparseOp> {
        config.validate()?;
        let derived = DerivedParams::from_config(config)?;
        let grid = StaggeredGrid::new(config.nx, config.ny, config.lx, config.ly)?;
        let mask = LandMask::closed_basin(config.nx, config.ny);
        let ops = Operators::build(&grid, &mask)?;
        Ok(assemble(&grid, &ops, &derived, config.depth, config.viscosity))
    }
}
