//! Polytropic and isentropic head/efficiency from a pair of states.
//!
//! All functions are pure in the states they receive: nothing is cached, so
//! recomputing after either endpoint changes always reflects the current
//! equation-of-state properties.

use crate::error::{PerfError, PerfResult};
use cf_core::numeric::relative_diff;
use cf_fluids::{State, StateInput};
use serde::{Deserialize, Serialize};

/// Which polytropic formulation a point is resolved with.
///
/// Fixed at point construction; every head/efficiency the point reports is
/// consistent with the one selected method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PolytropicMethod {
    /// Polytropic head with the Schultz real-gas correction factor.
    #[default]
    Schultz,
    /// Mallen-Saville direct formulation.
    MallenSaville,
    /// Base polytropic formula, no correction.
    Base,
}

/// Polytropic volume exponent n = ln(p2/p1) / ln(v1/v2).
pub fn n_exp(suc: &State, disch: &State) -> PerfResult<f64> {
    let s1 = suc.props()?;
    let s2 = disch.props()?;
    let vol_ln = (s2.rho.value / s1.rho.value).ln();
    if vol_ln.abs() < 1e-12 {
        return Err(PerfError::InvalidInput {
            what: "suction and discharge volumes must differ",
        });
    }
    Ok((s2.p.value / s1.p.value).ln() / vol_ln)
}

/// Base polytropic head: n/(n-1) * (p2 v2 - p1 v1)  [J/kg].
pub fn head_polytropic(suc: &State, disch: &State) -> PerfResult<f64> {
    let s1 = suc.props()?;
    let s2 = disch.props()?;
    let n = n_exp(suc, disch)?;
    if relative_diff(n, 1.0) < 1e-12 {
        return Err(PerfError::InvalidInput {
            what: "polytropic exponent of one",
        });
    }
    let v1 = 1.0 / s1.rho.value;
    let v2 = 1.0 / s2.rho.value;
    Ok(n / (n - 1.0) * (s2.p.value * v2 - s1.p.value * v1))
}

/// The hypothetical discharge state at (p2, s1).
fn isentropic_discharge(suc: &State, disch: &State) -> PerfResult<State> {
    let s = suc.s()?;
    Ok(suc.with_input(StateInput::PS {
        p: disch.pressure(),
        s,
    })?)
}

/// Isentropic head: the polytropic formula evaluated along the constant
/// entropy path from suction to discharge pressure [J/kg].
pub fn head_isentropic(suc: &State, disch: &State) -> PerfResult<f64> {
    let disch_s = isentropic_discharge(suc, disch)?;
    head_polytropic(suc, &disch_s)
}

/// Schultz correction factor: (h(p2,s1) - h1) / head_isentropic.
pub fn schultz_f(suc: &State, disch: &State) -> PerfResult<f64> {
    let disch_s = isentropic_discharge(suc, disch)?;
    let dh_isen = disch_s.h()? - suc.h()?;
    let head_isen = head_polytropic(suc, &disch_s)?;
    Ok(dh_isen / head_isen)
}

/// Schultz-corrected polytropic head [J/kg].
pub fn head_pol_schultz(suc: &State, disch: &State) -> PerfResult<f64> {
    Ok(schultz_f(suc, disch)? * head_polytropic(suc, disch)?)
}

/// Mallen-Saville head: (h2 - h1) - (s2 - s1)(T2 - T1)/ln(T2/T1)  [J/kg].
pub fn head_pol_mallen_saville(suc: &State, disch: &State) -> PerfResult<f64> {
    let s1 = suc.props()?;
    let s2 = disch.props()?;
    let t1 = s1.t.value;
    let t2 = s2.t.value;
    // Logarithmic mean temperature, with its T2 -> T1 limit.
    let t_mean = if relative_diff(t1, t2) < 1e-12 {
        t1
    } else {
        (t2 - t1) / (t2 / t1).ln()
    };
    Ok((s2.h - s1.h) - (s2.s - s1.s) * t_mean)
}

fn enthalpy_rise(suc: &State, disch: &State) -> PerfResult<f64> {
    let dh = disch.h()? - suc.h()?;
    if dh <= 0.0 {
        return Err(PerfError::InvalidInput {
            what: "discharge enthalpy must exceed suction enthalpy",
        });
    }
    Ok(dh)
}

pub fn eff_polytropic(suc: &State, disch: &State) -> PerfResult<f64> {
    Ok(head_polytropic(suc, disch)? / enthalpy_rise(suc, disch)?)
}

pub fn eff_pol_schultz(suc: &State, disch: &State) -> PerfResult<f64> {
    Ok(head_pol_schultz(suc, disch)? / enthalpy_rise(suc, disch)?)
}

pub fn eff_pol_mallen_saville(suc: &State, disch: &State) -> PerfResult<f64> {
    Ok(head_pol_mallen_saville(suc, disch)? / enthalpy_rise(suc, disch)?)
}

pub fn eff_isentropic(suc: &State, disch: &State) -> PerfResult<f64> {
    Ok(head_isentropic(suc, disch)? / enthalpy_rise(suc, disch)?)
}

/// Head for the selected method [J/kg].
pub fn head(method: PolytropicMethod, suc: &State, disch: &State) -> PerfResult<f64> {
    match method {
        PolytropicMethod::Schultz => head_pol_schultz(suc, disch),
        PolytropicMethod::MallenSaville => head_pol_mallen_saville(suc, disch),
        PolytropicMethod::Base => head_polytropic(suc, disch),
    }
}

/// Head and efficiency for the selected method.
pub fn head_and_eff(
    method: PolytropicMethod,
    suc: &State,
    disch: &State,
) -> PerfResult<(f64, f64)> {
    let head = head(method, suc, disch)?;
    Ok((head, head / enthalpy_rise(suc, disch)?))
}
