use thiserror::Error;

use crate::core::ode_solvers::OdeSolverError;

/// Everything that can end a simulation or export run. None of these are retried.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid physical parameters: {0}")]
    InvalidParameters(String),

    #[error("invalid time grid: {0}")]
    InvalidTimeGrid(String),

    /// The integrator diverged or hit a non-finite value, e.g. a vanishing
    /// denominator in the equations of motion.
    #[error("numerical fault at t = {time}: {source}")]
    NumericalFault {
        time: f64,
        #[source]
        source: OdeSolverError,
    },

    #[error("video encoding failed: {0}")]
    EncodingFault(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<OdeSolverError> for SimulationError {
    fn from(source: OdeSolverError) -> Self {
        SimulationError::NumericalFault {
            time: source.time().unwrap_or(f64::NAN),
            source,
        }
    }
}
