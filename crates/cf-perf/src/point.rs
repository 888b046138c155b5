//! A single compressor operating condition.
//!
//! A [`Point`] is resolved once from one of three closure modes and is
//! immutable afterwards; a converted point is always a new instance.

use std::f64::consts::PI;

use crate::error::{PerfError, PerfResult};
use crate::polytropic::{self, PolytropicMethod};
use crate::solve::{SolverConfig, bisect_root};
use cf_core::numeric::{Tolerances, nearly_equal};
use cf_core::units::{
    AngVel, Length, MassRate, Power, Pressure, VolumeRate, kelvin, kg_per_m3, kg_per_sec,
    m3_per_sec, pa, rad_per_sec, watt,
};
use cf_fluids::{State, StateInput};
use tracing::debug;

/// Flow given either as mass or volumetric rate; the other is derived from
/// the suction density.
#[derive(Debug, Clone, Copy)]
pub enum FlowSpec {
    Mass(MassRate),
    Volumetric(VolumeRate),
}

/// The authoritative input subset that closes a point.
///
/// Exactly one mode is chosen per construction; every other performance
/// quantity is derived from it and the suction state.
#[derive(Debug, Clone)]
pub enum PointMode {
    /// Discharge state measured directly.
    Discharge {
        disch: State,
        flow: FlowSpec,
        speed: AngVel,
    },
    /// Head [J/kg] and polytropic efficiency known; the discharge state is
    /// recovered by iterating on discharge pressure.
    HeadEff {
        head: f64,
        eff: f64,
        flow: FlowSpec,
        speed: AngVel,
    },
    /// Dimensionless coefficients known (the similarity-conversion path);
    /// speed and flow are derived from them.
    Coefficients {
        phi: f64,
        psi: f64,
        eff: f64,
        volume_ratio: f64,
    },
}

/// Inputs to [`Point::resolve`].
#[derive(Debug, Clone)]
pub struct PointInput {
    pub suc: State,
    pub mode: PointMode,
    /// Impeller exit width.
    pub b: Option<Length>,
    /// Impeller diameter.
    pub d: Option<Length>,
    pub method: PolytropicMethod,
}

/// A resolved operating point.
///
/// All derived values are mutually consistent with the equation of state at
/// the suction and discharge states and with the selected polytropic method.
#[derive(Debug, Clone)]
pub struct Point {
    suc: State,
    disch: State,
    flow_v: VolumeRate,
    flow_m: MassRate,
    speed: AngVel,
    b: Length,
    d: Length,
    method: PolytropicMethod,
    head: f64,
    eff: f64,
    power: Power,
    phi: f64,
    psi: f64,
    volume_ratio: f64,
}

impl Point {
    /// Resolve a point from its authoritative inputs.
    ///
    /// Geometry is mandatory: the dimensionless coefficients cannot be
    /// formed without `b` and `D`, so their absence fails immediately with
    /// [`PerfError::MissingGeometry`].
    pub fn resolve(input: PointInput) -> PerfResult<Self> {
        let (Some(b), Some(d)) = (input.b, input.d) else {
            return Err(PerfError::MissingGeometry);
        };
        if !(b.value > 0.0 && d.value > 0.0) {
            return Err(PerfError::InvalidInput {
                what: "b and D must be positive",
            });
        }

        let suc = input.suc;
        let method = input.method;
        let rho1 = suc.rho()?.value;

        let (disch, flow_v, speed) = match input.mode {
            PointMode::Discharge { disch, flow, speed } => {
                if !suc.composition().approx_eq(disch.composition(), Tolerances::default()) {
                    return Err(PerfError::InvalidInput {
                        what: "suction and discharge must share a composition",
                    });
                }
                (disch, volumetric(flow, rho1), speed)
            }
            PointMode::HeadEff {
                head,
                eff,
                flow,
                speed,
            } => {
                let disch = solve_discharge_from_head_eff(&suc, method, head, eff)?;
                (disch, volumetric(flow, rho1), speed)
            }
            PointMode::Coefficients {
                phi,
                psi,
                eff,
                volume_ratio,
            } => {
                let disch = solve_discharge_from_coefficients(&suc, method, eff, volume_ratio)?;
                let (head, _) = polytropic::head_and_eff(method, &suc, &disch)?;
                if !(psi > 0.0) {
                    return Err(PerfError::InvalidInput {
                        what: "psi must be positive",
                    });
                }
                // psi = 2 H / u², u = omega D / 2.
                let u = (2.0 * head / psi).sqrt();
                let speed = rad_per_sec(2.0 * u / d.value);
                let flow_v = m3_per_sec(phi * PI / 4.0 * d.value * d.value * u);
                (disch, flow_v, speed)
            }
        };

        if !(speed.value > 0.0) {
            return Err(PerfError::InvalidInput {
                what: "speed must be positive",
            });
        }
        if !(flow_v.value > 0.0) {
            return Err(PerfError::InvalidInput {
                what: "flow must be positive",
            });
        }

        let (head, eff) = polytropic::head_and_eff(method, &suc, &disch)?;
        let flow_m = kg_per_sec(flow_v.value * rho1);
        let dh = disch.h()? - suc.h()?;
        let power = watt(flow_m.value * dh);

        let u = speed.value * d.value / 2.0;
        let phi = flow_v.value / (PI / 4.0 * d.value * d.value * u);
        let psi = 2.0 * head / (u * u);
        let volume_ratio = disch.rho()?.value / rho1;

        debug!(
            target: "cf_perf::point",
            head, eff, phi, psi, speed = speed.value,
            "point resolved"
        );

        Ok(Self {
            suc,
            disch,
            flow_v,
            flow_m,
            speed,
            b,
            d,
            method,
            head,
            eff,
            power,
            phi,
            psi,
            volume_ratio,
        })
    }

    /// Point from a measured discharge state.
    pub fn from_discharge(
        suc: State,
        disch: State,
        flow: FlowSpec,
        speed: AngVel,
        b: Length,
        d: Length,
        method: PolytropicMethod,
    ) -> PerfResult<Self> {
        Self::resolve(PointInput {
            suc,
            mode: PointMode::Discharge { disch, flow, speed },
            b: Some(b),
            d: Some(d),
            method,
        })
    }

    /// Point from a target head [J/kg] and efficiency.
    pub fn from_head_eff(
        suc: State,
        head: f64,
        eff: f64,
        flow: FlowSpec,
        speed: AngVel,
        b: Length,
        d: Length,
        method: PolytropicMethod,
    ) -> PerfResult<Self> {
        Self::resolve(PointInput {
            suc,
            mode: PointMode::HeadEff {
                head,
                eff,
                flow,
                speed,
            },
            b: Some(b),
            d: Some(d),
            method,
        })
    }

    pub fn suc(&self) -> &State {
        &self.suc
    }

    pub fn disch(&self) -> &State {
        &self.disch
    }

    pub fn flow_v(&self) -> VolumeRate {
        self.flow_v
    }

    pub fn flow_m(&self) -> MassRate {
        self.flow_m
    }

    pub fn speed(&self) -> AngVel {
        self.speed
    }

    pub fn b(&self) -> Length {
        self.b
    }

    pub fn d(&self) -> Length {
        self.d
    }

    pub fn method(&self) -> PolytropicMethod {
        self.method
    }

    /// Polytropic head for the selected method [J/kg].
    pub fn head(&self) -> f64 {
        self.head
    }

    /// Polytropic efficiency for the selected method.
    pub fn eff(&self) -> f64 {
        self.eff
    }

    /// Gas power, mechanical losses excluded.
    pub fn power(&self) -> Power {
        self.power
    }

    /// Flow coefficient phi = Q / (pi/4 D² u).
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Head coefficient psi = 2 H / u².
    pub fn psi(&self) -> f64 {
        self.psi
    }

    /// Discharge-to-suction density ratio.
    pub fn volume_ratio(&self) -> f64 {
        self.volume_ratio
    }

    pub fn pressure_ratio(&self) -> f64 {
        self.disch.pressure().value / self.suc.pressure().value
    }

    pub fn discharge_pressure(&self) -> Pressure {
        self.disch.pressure()
    }

    /// Tip Mach number u / a1.
    pub fn mach(&self) -> PerfResult<f64> {
        let a1 = self.suc.speed_of_sound()?.value;
        Ok(self.tip_speed() / a1)
    }

    /// Machine Reynolds number u b rho1 / mu1.
    ///
    /// Fallible independently of the bulk properties: transport models are
    /// not available for every mixture.
    pub fn reynolds(&self) -> PerfResult<f64> {
        let rho1 = self.suc.rho()?.value;
        let mu1 = self.suc.dynamic_viscosity()?.value;
        Ok(self.tip_speed() * self.b.value * rho1 / mu1)
    }

    fn tip_speed(&self) -> f64 {
        self.speed.value * self.d.value / 2.0
    }
}

impl PartialEq for Point {
    /// Equality compares suction and discharge states, geometry, and speed
    /// to solver tolerance. The remaining fields are derived from these.
    fn eq(&self, other: &Self) -> bool {
        let tol = Tolerances::solver();
        self.suc == other.suc
            && self.disch == other.disch
            && nearly_equal(self.speed.value, other.speed.value, tol)
            && nearly_equal(self.b.value, other.b.value, tol)
            && nearly_equal(self.d.value, other.d.value, tol)
    }
}

fn volumetric(flow: FlowSpec, rho1: f64) -> VolumeRate {
    match flow {
        FlowSpec::Volumetric(q) => q,
        FlowSpec::Mass(m) => m3_per_sec(m.value / rho1),
    }
}

/// Recovers the discharge state from (head, eff) by bisecting on discharge
/// pressure. The discharge enthalpy is pinned by h2 = h1 + head/eff, so each
/// candidate pressure is a single (p, h) flash.
fn solve_discharge_from_head_eff(
    suc: &State,
    method: PolytropicMethod,
    head: f64,
    eff: f64,
) -> PerfResult<State> {
    if !(head > 0.0) {
        return Err(PerfError::InvalidInput {
            what: "head must be positive",
        });
    }
    if !(eff > 0.0 && eff <= 1.0) {
        return Err(PerfError::InvalidInput {
            what: "efficiency must be in (0, 1]",
        });
    }
    let h2 = suc.h()? + head / eff;
    let p1 = suc.pressure().value;

    let cfg = SolverConfig::default();
    let p2 = bisect_root(
        |p| {
            let disch = suc.with_input(StateInput::PH { p: pa(p), h: h2 })?;
            let (head_calc, _) = polytropic::head_and_eff(method, suc, &disch)?;
            Ok(head_calc - head)
        },
        p1 * 1.0001,
        p1 * 2.0,
        head,
        &cfg,
        "discharge pressure from head and efficiency",
    )?;

    Ok(suc.with_input(StateInput::PH { p: pa(p2), h: h2 })?)
}

/// Recovers the discharge state from (eff, volume_ratio) by bisecting on
/// discharge temperature at the pinned discharge density rho2 = rho1 * vr.
fn solve_discharge_from_coefficients(
    suc: &State,
    method: PolytropicMethod,
    eff: f64,
    volume_ratio: f64,
) -> PerfResult<State> {
    if !(eff > 0.0 && eff <= 1.0) {
        return Err(PerfError::InvalidInput {
            what: "efficiency must be in (0, 1]",
        });
    }
    if !(volume_ratio > 1.0) {
        return Err(PerfError::InvalidInput {
            what: "volume ratio must exceed one for compression",
        });
    }
    let rho2 = suc.rho()?.value * volume_ratio;
    let t1 = suc.temperature().value;

    let cfg = SolverConfig::default();
    let h1 = suc.h()?;
    let t2 = bisect_root(
        |t| {
            let disch = suc.with_input(StateInput::RhoT {
                rho: kg_per_m3(rho2),
                t: kelvin(t),
            })?;
            let dh = disch.h()? - h1;
            if dh <= f64::EPSILON {
                // No enthalpy rise yet: efficiency is unboundedly high on
                // this side of the bracket.
                return Ok(1.0);
            }
            Ok(polytropic::head(method, suc, &disch)? / dh - eff)
        },
        t1 * 1.0001,
        t1 * 1.6,
        eff,
        &cfg,
        "discharge temperature from coefficients",
    )?;

    Ok(suc.with_input(StateInput::RhoT {
        rho: kg_per_m3(rho2),
        t: kelvin(t2),
    })?)
}
