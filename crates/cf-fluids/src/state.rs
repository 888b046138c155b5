//! Thermodynamic state wrapper over an equation-of-state backend.

use std::sync::Arc;

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{EosModel, PropertySet, SpecEnthalpy, SpecEntropy, StateInput};
use cf_core::numeric::{Tolerances, nearly_equal};
use cf_core::units::{Density, DynVisc, Pressure, Temperature, Velocity};

/// A thermodynamic state: composition plus the canonical (p, T) pair.
///
/// Any valid [`StateInput`] pair is flashed to (p, T) at definition time.
/// Derived properties are evaluated on demand from the backing model and are
/// never cached, so an [`State::update`] can never leave stale values behind.
///
/// Cloning duplicates the defining values without aliasing mutable state;
/// the backend handle itself is shared (backends are stateless).
#[derive(Clone)]
pub struct State {
    p: Pressure,
    t: Temperature,
    comp: Composition,
    model: Arc<dyn EosModel>,
}

impl State {
    /// Define a state from an input pair and a composition.
    ///
    /// Fails with [`FluidError::Underspecified`] when the composition is
    /// empty, and with whatever the backend reports when the pair is
    /// infeasible.
    pub fn define(
        model: Arc<dyn EosModel>,
        input: StateInput,
        comp: Composition,
    ) -> FluidResult<Self> {
        if comp.is_empty() {
            return Err(FluidError::Underspecified {
                what: "a fluid composition is required",
            });
        }
        if !model.supports(&comp) {
            return Err(FluidError::InvalidFluid {
                name: "composition not supported by backend".to_string(),
            });
        }
        let (p, t) = model.flash(input, &comp)?;
        Ok(Self { p, t, comp, model })
    }

    /// Re-flash this state in place with a new property pair.
    ///
    /// Composition and backend are retained. Not safe for concurrent use on
    /// the same instance; callers that need the original must clone first.
    pub fn update(&mut self, input: StateInput) -> FluidResult<()> {
        let (p, t) = self.model.flash(input, &self.comp)?;
        self.p = p;
        self.t = t;
        Ok(())
    }

    /// Pure variant of [`State::update`]: returns a new state at the given
    /// input pair, leaving `self` untouched.
    pub fn with_input(&self, input: StateInput) -> FluidResult<Self> {
        let mut copy = self.clone();
        copy.update(input)?;
        Ok(copy)
    }

    pub fn pressure(&self) -> Pressure {
        self.p
    }

    pub fn temperature(&self) -> Temperature {
        self.t
    }

    pub fn composition(&self) -> &Composition {
        &self.comp
    }

    pub fn model(&self) -> Arc<dyn EosModel> {
        Arc::clone(&self.model)
    }

    /// All bulk properties in one backend evaluation.
    pub fn props(&self) -> FluidResult<PropertySet> {
        self.model.props(self.p, self.t, &self.comp)
    }

    pub fn rho(&self) -> FluidResult<Density> {
        Ok(self.props()?.rho)
    }

    /// Specific volume [m³/kg].
    pub fn v(&self) -> FluidResult<f64> {
        Ok(1.0 / self.props()?.rho.value)
    }

    pub fn h(&self) -> FluidResult<SpecEnthalpy> {
        Ok(self.props()?.h)
    }

    pub fn s(&self) -> FluidResult<SpecEntropy> {
        Ok(self.props()?.s)
    }

    pub fn speed_of_sound(&self) -> FluidResult<Velocity> {
        Ok(self.props()?.speed_of_sound)
    }

    /// Dynamic viscosity. Fallible independently of bulk properties:
    /// transport models are not available for every mixture.
    pub fn dynamic_viscosity(&self) -> FluidResult<DynVisc> {
        self.model.dynamic_viscosity(self.p, self.t, &self.comp)
    }

    /// Molar mass [kg/kmol].
    pub fn molar_mass(&self) -> f64 {
        self.comp.molar_mass()
    }

    /// Specific gas constant [J/(kg K)].
    pub fn gas_constant(&self) -> f64 {
        self.comp.specific_gas_constant()
    }

    /// Compressibility factor z = p / (rho R T).
    pub fn z(&self) -> FluidResult<f64> {
        let props = self.props()?;
        Ok(props.p.value / (props.rho.value * self.gas_constant() * props.t.value))
    }

    /// Isentropic volume exponent kv = rho a² / p.
    pub fn isentropic_volume_exponent(&self) -> FluidResult<f64> {
        let props = self.props()?;
        let a = props.speed_of_sound.value;
        Ok(props.rho.value * a * a / props.p.value)
    }

    /// Tolerance-based equality on the defining values.
    pub fn approx_eq(&self, other: &Self, tol: Tolerances) -> bool {
        self.comp.approx_eq(&other.comp, tol)
            && nearly_equal(self.p.value, other.p.value, tol)
            && nearly_equal(self.t.value, other.t.value, tol)
    }
}

impl PartialEq for State {
    /// Equality compares composition and the canonical (p, T) pair to a
    /// solver-level floating tolerance; the backend identity is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.approx_eq(other, Tolerances::solver())
    }
}

impl std::fmt::Debug for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("p_pa", &self.p.value)
            .field("t_k", &self.t.value)
            .field("comp", &self.comp)
            .field("model", &self.model.name())
            .finish()
    }
}
