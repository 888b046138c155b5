//! Performance calculation errors.

use cf_fluids::FluidError;
use thiserror::Error;

/// Result type for performance operations.
pub type PerfResult<T> = Result<T, PerfError>;

#[derive(Error, Debug)]
pub enum PerfError {
    /// Impeller geometry is mandatory wherever dimensionless coefficients
    /// are involved.
    #[error("Arguments b and D are required")]
    MissingGeometry,

    #[error("Invalid argument: {what}")]
    InvalidInput { what: &'static str },

    /// An iterative resolution exceeded its iteration cap. The partial
    /// result is discarded, never returned.
    #[error("Convergence failed for {what} after {iterations} iterations")]
    Convergence {
        what: &'static str,
        iterations: usize,
    },

    #[error(transparent)]
    Fluid(#[from] FluidError),

    #[error("Interpolation error: {message}")]
    Interpolation { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_geometry_message() {
        let err = PerfError::MissingGeometry;
        assert!(err.to_string().contains("b and D are required"));
    }

    #[test]
    fn fluid_errors_convert() {
        let fluid_err = FluidError::InvalidFluid {
            name: "fake_name".into(),
        };
        let err: PerfError = fluid_err.into();
        assert!(err.to_string().contains("fake_name"));
    }
}
