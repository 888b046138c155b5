//! CoolProp-based equation-of-state backend.

use std::collections::HashMap;

use crate::composition::Composition;
use crate::error::{FluidError, FluidResult};
use crate::model::{EosModel, PropertySet, StateInput, validation};
use cf_core::units::{Density, DynVisc, Pressure, Temperature, kelvin, kg_per_m3, m_per_sec, pa, pa_sec};
use rfluids::prelude::*;
use rfluids::substance::CustomMix;

// Search window for iterative flashes. Bounds are pulled inward when the
// backend refuses to evaluate at an endpoint (two-phase or out of table).
const T_MIN: f64 = 150.0;
const T_MAX: f64 = 1500.0;
const P_MIN: f64 = 1.0e3;
const P_MAX: f64 = 1.0e8;
const MAX_ITER: usize = 100;
const BOUND_STEPS: usize = 24;

fn backend_err(context: &str, e: impl std::fmt::Display) -> FluidError {
    FluidError::Backend {
        message: format!("rfluids error {context}: {e}"),
    }
}

/// Raw property bundle read from a single backend state.
struct RawProps {
    p: f64,
    t: f64,
    rho: f64,
    h: f64,
    s: f64,
    cp: f64,
    a: f64,
}

macro_rules! read_state {
    ($fluid:expr, $in1:expr, $in2:expr) => {{
        let mut fluid = $fluid
            .in_state($in1, $in2)
            .map_err(|e| backend_err("defining state", e))?;
        RawProps {
            p: fluid.pressure().map_err(|e| backend_err("getting pressure", e))?,
            t: fluid
                .temperature()
                .map_err(|e| backend_err("getting temperature", e))?,
            rho: fluid.density().map_err(|e| backend_err("getting density", e))?,
            h: fluid.enthalpy().map_err(|e| backend_err("getting enthalpy", e))?,
            s: fluid.entropy().map_err(|e| backend_err("getting entropy", e))?,
            cp: fluid
                .specific_heat()
                .map_err(|e| backend_err("getting specific heat", e))?,
            a: fluid
                .sound_speed()
                .map_err(|e| backend_err("getting sound speed", e))?,
        }
    }};
}

macro_rules! read_viscosity {
    ($fluid:expr, $in1:expr, $in2:expr) => {{
        let mut fluid = $fluid
            .in_state($in1, $in2)
            .map_err(|e| backend_err("defining state", e))?;
        fluid
            .dynamic_viscosity()
            .map_err(|e| backend_err("getting dynamic viscosity", e))?
    }};
}

/// CoolProp backend.
///
/// Pure components map straight onto backend fluids; multi-component
/// compositions go through CoolProp custom mole-based mixtures. Instances
/// hold no state, so one model can serve any number of threads.
pub struct CoolPropModel {
    _private: (),
}

impl CoolPropModel {
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn custom_mix(&self, comp: &Composition) -> FluidResult<CustomMix> {
        let mut fractions = HashMap::new();
        for (species, x) in comp.iter() {
            fractions.insert(species.backend_pure(), x);
        }
        CustomMix::mole_based(fractions).map_err(|e| backend_err("building custom mixture", e))
    }

    fn raw_props(
        &self,
        comp: &Composition,
        in1: FluidInput,
        in2: FluidInput,
    ) -> FluidResult<RawProps> {
        match comp.single_species() {
            Some(species) => {
                let fluid = Fluid::from(species.backend_pure());
                Ok(read_state!(fluid, in1, in2))
            }
            None => {
                let fluid = Fluid::try_from(self.custom_mix(comp)?)
                    .map_err(|e| backend_err("building custom mixture", e))?;
                Ok(read_state!(fluid, in1, in2))
            }
        }
    }

    fn props_at_pt(&self, comp: &Composition, p_pa: f64, t_k: f64) -> FluidResult<RawProps> {
        self.raw_props(
            comp,
            FluidInput::pressure(p_pa),
            FluidInput::temperature(t_k),
        )
    }

    /// Walks a bound inward until the backend accepts the state.
    ///
    /// The nominal search window is generous and may start inside a solid
    /// or two-phase region for some compositions.
    fn valid_t_bound(
        &self,
        comp: &Composition,
        p_pa: f64,
        start: f64,
        toward: f64,
    ) -> FluidResult<(f64, RawProps)> {
        let mut t = start;
        for _ in 0..BOUND_STEPS {
            match self.props_at_pt(comp, p_pa, t) {
                Ok(props) => return Ok((t, props)),
                Err(_) => t += (toward - t) * 0.2,
            }
        }
        Err(FluidError::OutOfRange {
            what: "no valid temperature window at given pressure",
        })
    }

    /// Bisection on temperature at fixed pressure until `extract` meets the
    /// target. Works for any property monotonic in temperature (enthalpy,
    /// entropy, density).
    fn solve_t_at_p(
        &self,
        comp: &Composition,
        p_pa: f64,
        target: f64,
        what: &'static str,
        extract: impl Fn(&RawProps) -> f64,
    ) -> FluidResult<f64> {
        let (mut t_lo, lo_props) = self.valid_t_bound(comp, p_pa, T_MIN, T_MAX)?;
        let (mut t_hi, hi_props) = self.valid_t_bound(comp, p_pa, T_MAX, t_lo)?;

        let scale = target.abs().max(1.0);
        let tol = 1e-9 * scale;

        let mut r_lo = extract(&lo_props) - target;
        let r_hi = extract(&hi_props) - target;
        if r_lo.abs() <= tol {
            return Ok(t_lo);
        }
        if r_hi.abs() <= tol {
            return Ok(t_hi);
        }
        if r_lo.signum() == r_hi.signum() {
            return Err(FluidError::OutOfRange { what });
        }

        for _ in 0..MAX_ITER {
            let t_mid = 0.5 * (t_lo + t_hi);
            let mid = self.props_at_pt(comp, p_pa, t_mid)?;
            let r_mid = extract(&mid) - target;

            if r_mid.abs() <= tol || (t_hi - t_lo) < 1e-8 {
                return Ok(t_mid);
            }

            if r_mid.signum() == r_lo.signum() {
                t_lo = t_mid;
                r_lo = r_mid;
            } else {
                t_hi = t_mid;
            }
        }

        Err(FluidError::Convergence { what })
    }

    /// Nested bisection for the (h, s) pair: the outer loop walks pressure,
    /// the inner loop recovers temperature from entropy.
    fn solve_pt_for_hs(
        &self,
        comp: &Composition,
        h_target: f64,
        s_target: f64,
    ) -> FluidResult<(f64, f64)> {
        let eval = |p_pa: f64| -> FluidResult<(f64, f64)> {
            let t = self.solve_t_at_p(comp, p_pa, s_target, "entropy at trial pressure", |r| r.s)?;
            let props = self.props_at_pt(comp, p_pa, t)?;
            Ok((t, props.h))
        };

        let mut p_lo = P_MIN;
        let mut p_hi = P_MAX;
        let mut lo = None;
        for _ in 0..BOUND_STEPS {
            match eval(p_lo) {
                Ok(v) => {
                    lo = Some(v);
                    break;
                }
                Err(_) => p_lo *= 4.0,
            }
        }
        let mut hi = None;
        for _ in 0..BOUND_STEPS {
            match eval(p_hi) {
                Ok(v) => {
                    hi = Some(v);
                    break;
                }
                Err(_) => p_hi /= 4.0,
            }
        }
        let (Some((t_lo, h_lo)), Some((_t_hi, h_hi))) = (lo, hi) else {
            return Err(FluidError::OutOfRange {
                what: "no valid pressure window for h-s flash",
            });
        };

        let scale = h_target.abs().max(1.0);
        let tol = 1e-9 * scale;
        let mut r_lo = h_lo - h_target;
        let r_hi = h_hi - h_target;
        if r_lo.abs() <= tol {
            return Ok((p_lo, t_lo));
        }
        if r_lo.signum() == r_hi.signum() {
            return Err(FluidError::OutOfRange {
                what: "enthalpy unreachable at given entropy",
            });
        }

        for _ in 0..MAX_ITER {
            let p_mid = (p_lo * p_hi).sqrt();
            let (t_mid, h_mid) = eval(p_mid)?;
            let r_mid = h_mid - h_target;

            if r_mid.abs() <= tol || (p_hi - p_lo) < 1e-6 * p_mid {
                return Ok((p_mid, t_mid));
            }

            if r_mid.signum() == r_lo.signum() {
                p_lo = p_mid;
                r_lo = r_mid;
            } else {
                p_hi = p_mid;
            }
        }

        Err(FluidError::Convergence {
            what: "h-s flash pressure iteration",
        })
    }
}

impl Default for CoolPropModel {
    fn default() -> Self {
        Self::new()
    }
}

impl EosModel for CoolPropModel {
    fn name(&self) -> &str {
        "CoolProp"
    }

    fn supports(&self, comp: &Composition) -> bool {
        !comp.is_empty()
    }

    fn flash(&self, input: StateInput, comp: &Composition) -> FluidResult<(Pressure, Temperature)> {
        match input {
            StateInput::PT { p, t } => {
                validation::validate_pressure(p)?;
                validation::validate_temperature(t)?;
                // Validate that the backend accepts this state.
                self.props_at_pt(comp, p.value, t.value)?;
                Ok((p, t))
            }
            StateInput::PH { p, h } => {
                validation::validate_pressure(p)?;
                validation::validate_enthalpy(h)?;
                let t_k =
                    self.solve_t_at_p(comp, p.value, h, "enthalpy at given pressure", |r| r.h)?;
                Ok((p, kelvin(t_k)))
            }
            StateInput::PS { p, s } => {
                validation::validate_pressure(p)?;
                validation::validate_entropy(s)?;
                let t_k =
                    self.solve_t_at_p(comp, p.value, s, "entropy at given pressure", |r| r.s)?;
                Ok((p, kelvin(t_k)))
            }
            StateInput::HS { h, s } => {
                validation::validate_enthalpy(h)?;
                validation::validate_entropy(s)?;
                let (p_pa, t_k) = self.solve_pt_for_hs(comp, h, s)?;
                Ok((pa(p_pa), kelvin(t_k)))
            }
            StateInput::RhoT { rho, t } => {
                validation::validate_density(rho)?;
                validation::validate_temperature(t)?;
                let props = self.raw_props(
                    comp,
                    FluidInput::density(rho.value),
                    FluidInput::temperature(t.value),
                )?;
                Ok((pa(props.p), t))
            }
            StateInput::RhoP { rho, p } => {
                validation::validate_density(rho)?;
                validation::validate_pressure(p)?;
                let t_k = self.solve_t_at_p(
                    comp,
                    p.value,
                    rho.value,
                    "density at given pressure",
                    |r| r.rho,
                )?;
                Ok((p, kelvin(t_k)))
            }
        }
    }

    fn props(&self, p: Pressure, t: Temperature, comp: &Composition) -> FluidResult<PropertySet> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        let raw = self.props_at_pt(comp, p.value, t.value)?;

        let rho: Density = kg_per_m3(raw.rho);
        validation::validate_density(rho)?;
        validation::validate_enthalpy(raw.h)?;
        validation::validate_entropy(raw.s)?;

        Ok(PropertySet {
            p,
            t,
            rho,
            h: raw.h,
            s: raw.s,
            cp: raw.cp,
            speed_of_sound: m_per_sec(raw.a),
        })
    }

    fn dynamic_viscosity(
        &self,
        p: Pressure,
        t: Temperature,
        comp: &Composition,
    ) -> FluidResult<DynVisc> {
        validation::validate_pressure(p)?;
        validation::validate_temperature(t)?;
        let in1 = FluidInput::pressure(p.value);
        let in2 = FluidInput::temperature(t.value);
        let mu = match comp.single_species() {
            Some(species) => {
                let fluid = Fluid::from(species.backend_pure());
                read_viscosity!(fluid, in1, in2)
            }
            None => {
                let fluid = Fluid::try_from(self.custom_mix(comp)?)
                    .map_err(|e| backend_err("building custom mixture", e))?;
                read_viscosity!(fluid, in1, in2)
            }
        };
        if !mu.is_finite() || mu <= 0.0 {
            return Err(FluidError::NonPhysical {
                what: "dynamic viscosity must be positive and finite",
            });
        }
        Ok(pa_sec(mu))
    }
}
