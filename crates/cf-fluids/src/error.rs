//! Fluid property errors.

use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors that can occur while defining states or querying properties.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// A named component is not resolvable by the equation-of-state backend.
    #[error("Fluid {name} not available")]
    InvalidFluid { name: String },

    /// Fewer than two independent properties were given for a state.
    #[error("State is underspecified: {what}")]
    Underspecified { what: &'static str },

    /// Non-physical values (negative density, pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// The requested property pair is thermodynamically infeasible for
    /// this composition (target outside the reachable range).
    #[error("Value out of range for {what}")]
    OutOfRange { what: &'static str },

    /// Equation-of-state backend error.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Iterative flash did not meet tolerance within the iteration cap.
    #[error("Convergence failed for {what}")]
    Convergence { what: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::InvalidFluid {
            name: "fake_name".into(),
        };
        assert!(err.to_string().contains("fake_name"));
        assert!(err.to_string().contains("not available"));

        let err = FluidError::Backend {
            message: "CoolProp failed".into(),
        };
        assert!(err.to_string().contains("CoolProp"));
    }
}
