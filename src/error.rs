//! Error types for model construction and time stepping.
//!
//! There is no local recovery path for any of these: all propagate to
//! the caller, who decides whether to abort or report.

use thiserror::Error;

/// Errors that can occur while building or running the model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Invalid grid/domain parameters, or a mask producing zero wet
    /// degrees of freedom. Detected at construction.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The implicit Crank–Nicolson matrix failed to factorize.
    /// Detected at construction, fatal.
    #[error("implicit matrix is singular: {0}")]
    SingularSystem(String),

    /// A per-step solve produced non-finite values. Fatal for the
    /// instance: the cached factorization and operator are the root
    /// cause, not a transient condition.
    #[error("time step solve failed: {0}")]
    SolveFailure(String),
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, ModelError>;
