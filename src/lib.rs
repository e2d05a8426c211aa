//! # rgswm
//!
//! A linearized reduced-gravity shallow-water model on an Arakawa-C
//! staggered grid, for geostrophic-adjustment experiments.
//!
//! This crate provides the core building blocks of the model:
//! - Staggered grid and land-sea mask construction
//! - Sparse finite-difference operators (shifts, gradient, divergence,
//!   masked Laplacians, masked averaging)
//! - Assembly of the coupled linear (u, v, h) evolution operator
//! - Reduction of the state to wet (ocean) degrees of freedom
//! - Semi-implicit Crank–Nicolson time stepping with a one-time sparse
//!   LU factorization
//!
//! The engine is a pure in-process numerical component: it produces
//! velocity and thickness fields as 2-D arrays and leaves rendering,
//! animation, and parameter UI to the caller.
//!
//! # Example
//!
//! ```
//! use rgswm::{Engine, ModelConfig};
//!
//! let config = ModelConfig {
//!     nx: 21,
//!     ny: 21,
//!     ..ModelConfig::default()
//! };
//! let mut engine = Engine::new(config).unwrap();
//! engine.step().unwrap();
//! let (u, v, h) = engine.fields();
//! assert_eq!(h.nrows(), 21);
//! assert_eq!(u.ncols(), 21);
//! assert_eq!(v.nrows(), 21);
//! ```

pub mod engine;
pub mod error;
pub mod grid;
pub mod initial;
pub mod mask;
pub mod operators;
pub mod params;
pub mod reduction;
pub mod sparse;
pub mod stepper;
pub mod system;

pub use engine::Engine;
pub use error::{ModelError, Result};
pub use grid::StaggeredGrid;
pub use initial::{at_rest, gaussian_bump};
pub use mask::LandMask;
pub use operators::Operators;
pub use params::{DerivedParams, ModelConfig};
pub use reduction::DofMap;
pub use sparse::SparseOp;
pub use stepper::CrankNicolson;
pub use system::{assemble, coriolis_at_u, coriolis_at_v};
