//! Equation-of-state model trait.

use crate::composition::Composition;
use crate::error::FluidResult;
use cf_core::units::{Density, DynVisc, Pressure, Temperature, Velocity};

/// Specific enthalpy [J/kg].
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEnthalpy = f64;

/// Specific entropy [J/(kg·K)].
pub type SpecEntropy = f64;

/// Specific heat capacity [J/(kg·K)].
pub type SpecHeatCapacity = f64;

/// Input specification for defining a thermodynamic state.
///
/// Any of these pairs, together with a composition, pins the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateInput {
    /// Pressure and temperature.
    PT { p: Pressure, t: Temperature },
    /// Pressure and specific enthalpy.
    PH { p: Pressure, h: SpecEnthalpy },
    /// Pressure and specific entropy.
    PS { p: Pressure, s: SpecEntropy },
    /// Specific enthalpy and specific entropy.
    HS { h: SpecEnthalpy, s: SpecEntropy },
    /// Density and temperature.
    RhoT { rho: Density, t: Temperature },
    /// Density and pressure.
    RhoP { rho: Density, p: Pressure },
}

/// Bulk thermodynamic properties evaluated at one state.
///
/// Evaluating everything in one backend call avoids repeated flashes when a
/// calculation needs several properties of the same state.
#[derive(Debug, Clone, Copy)]
pub struct PropertySet {
    /// Pressure [Pa]
    pub p: Pressure,
    /// Temperature [K]
    pub t: Temperature,
    /// Density [kg/m³]
    pub rho: Density,
    /// Specific enthalpy [J/kg]
    pub h: SpecEnthalpy,
    /// Specific entropy [J/(kg·K)]
    pub s: SpecEntropy,
    /// Specific heat capacity at constant pressure [J/(kg·K)]
    pub cp: SpecHeatCapacity,
    /// Speed of sound [m/s]
    pub speed_of_sound: Velocity,
}

/// Trait for equation-of-state backends.
///
/// Implementations must be thread-safe (Send + Sync): distinct states may be
/// resolved concurrently when building or converting whole curves.
pub trait EosModel: Send + Sync {
    /// Backend name (for debugging/logging).
    fn name(&self) -> &str;

    /// Check whether this backend can represent the given composition.
    fn supports(&self, comp: &Composition) -> bool;

    /// Resolve an input pair to the canonical (pressure, temperature) pair.
    ///
    /// Pairs other than PT are solved iteratively; implementations must
    /// bound the iteration count and fail with `FluidError::Convergence`
    /// rather than loop unboundedly.
    fn flash(&self, input: StateInput, comp: &Composition) -> FluidResult<(Pressure, Temperature)>;

    /// Evaluate bulk properties at a (p, T) state.
    fn props(&self, p: Pressure, t: Temperature, comp: &Composition) -> FluidResult<PropertySet>;

    /// Dynamic viscosity at a (p, T) state.
    ///
    /// Kept separate from [`EosModel::props`]: transport properties are not
    /// available for every mixture, and callers that only need bulk
    /// properties should not fail because of that.
    fn dynamic_viscosity(
        &self,
        p: Pressure,
        t: Temperature,
        comp: &Composition,
    ) -> FluidResult<DynVisc>;
}

pub(crate) mod validation {
    use super::*;
    use crate::error::FluidError;

    pub fn validate_pressure(p: Pressure) -> FluidResult<()> {
        if !p.value.is_finite() || p.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "pressure must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_temperature(t: Temperature) -> FluidResult<()> {
        if !t.value.is_finite() || t.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "temperature must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_density(rho: Density) -> FluidResult<()> {
        if !rho.value.is_finite() || rho.value <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        Ok(())
    }

    pub fn validate_enthalpy(h: SpecEnthalpy) -> FluidResult<()> {
        if !h.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "enthalpy must be finite",
            });
        }
        Ok(())
    }

    pub fn validate_entropy(s: SpecEntropy) -> FluidResult<()> {
        if !s.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "entropy must be finite",
            });
        }
        Ok(())
    }
}
