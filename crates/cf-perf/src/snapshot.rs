//! Serializable snapshots of points and impellers.
//!
//! A snapshot carries the defining values only, in SI base units; every
//! derived quantity is recomputed against an equation-of-state backend on
//! restore, so a round trip reproduces the original object exactly up to
//! floating tolerance.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::PerfResult;
use crate::impeller::Impeller;
use crate::point::{FlowSpec, Point};
use crate::polytropic::PolytropicMethod;
use cf_core::units::{kelvin, m3_per_sec, meter, pa, rad_per_sec};
use cf_fluids::{Composition, EosModel, State, StateInput};
use serde::{Deserialize, Serialize};

/// Defining values of a [`State`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub p_pa: f64,
    pub t_k: f64,
    /// Species key to mole fraction. Ordered map, so serialization is
    /// deterministic.
    pub fluid: BTreeMap<String, f64>,
}

impl StateSnapshot {
    pub fn of(state: &State) -> Self {
        Self {
            p_pa: state.pressure().value,
            t_k: state.temperature().value,
            fluid: state
                .composition()
                .iter()
                .map(|(species, x)| (species.key().to_string(), x))
                .collect(),
        }
    }

    /// Rebuild the state against the given backend.
    pub fn restore(&self, model: Arc<dyn EosModel>) -> PerfResult<State> {
        let entries: Vec<(&str, f64)> = self
            .fluid
            .iter()
            .map(|(name, x)| (name.as_str(), *x))
            .collect();
        let comp = Composition::from_names(&entries)?;
        Ok(State::define(
            model,
            StateInput::PT {
                p: pa(self.p_pa),
                t: kelvin(self.t_k),
            },
            comp,
        )?)
    }
}

/// Defining values of a [`Point`], sufficient for exact reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSnapshot {
    pub suc: StateSnapshot,
    pub disch: StateSnapshot,
    pub flow_v_m3_s: f64,
    pub speed_rad_s: f64,
    pub b_m: f64,
    pub d_m: f64,
    pub method: PolytropicMethod,
}

impl PointSnapshot {
    pub fn of(point: &Point) -> Self {
        Self {
            suc: StateSnapshot::of(point.suc()),
            disch: StateSnapshot::of(point.disch()),
            flow_v_m3_s: point.flow_v().value,
            speed_rad_s: point.speed().value,
            b_m: point.b().value,
            d_m: point.d().value,
            method: point.method(),
        }
    }

    pub fn restore(&self, model: Arc<dyn EosModel>) -> PerfResult<Point> {
        Point::from_discharge(
            self.suc.restore(Arc::clone(&model))?,
            self.disch.restore(model)?,
            FlowSpec::Volumetric(m3_per_sec(self.flow_v_m3_s)),
            rad_per_sec(self.speed_rad_s),
            meter(self.b_m),
            meter(self.d_m),
            self.method,
        )
    }
}

/// An impeller as a flat list of point snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpellerSnapshot {
    pub points: Vec<PointSnapshot>,
}

impl ImpellerSnapshot {
    pub fn of(impeller: &Impeller) -> Self {
        Self {
            points: impeller.points().map(PointSnapshot::of).collect(),
        }
    }

    pub fn restore(&self, model: Arc<dyn EosModel>) -> PerfResult<Impeller> {
        let points = self
            .points
            .iter()
            .map(|p| p.restore(Arc::clone(&model)))
            .collect::<PerfResult<Vec<_>>>()?;
        Impeller::new(points)
    }
}
