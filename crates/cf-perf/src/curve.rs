//! A constant-speed performance curve: ordered points, interpolated by flow.

use crate::error::{PerfError, PerfResult};
use crate::point::Point;
use cf_core::numeric::{Tolerances, nearly_equal};
use cf_core::units::{AngVel, VolumeRate};
use ndarray::Array1;
use ninterp::interpolator::Extrapolate;
use ninterp::prelude::{Interp1DOwned, Interpolator};
use ninterp::strategy::enums::Strategy1DEnum;
use tracing::warn;

/// An interpolated value, flagged when it came from outside the measured
/// flow range. Extrapolation is reported, never refused.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolated {
    pub value: f64,
    pub extrapolated: bool,
}

/// Points measured at one speed, ordered by volumetric flow.
#[derive(Debug, Clone)]
pub struct Curve {
    points: Vec<Point>,
    speed: AngVel,
}

impl Curve {
    /// Build a curve from points sharing a speed.
    ///
    /// Points need not arrive sorted; the curve orders them by flow. Fails
    /// when fewer than two points are supplied, the speeds disagree, or the
    /// points do not share suction, geometry and polytropic method — the
    /// coefficient interpolants are meaningless across mixed machines.
    pub fn new(mut points: Vec<Point>) -> PerfResult<Self> {
        if points.len() < 2 {
            return Err(PerfError::InvalidInput {
                what: "at least 2 points are required to build a curve",
            });
        }
        let tol = Tolerances::solver();
        let speed = points[0].speed();
        if !points
            .iter()
            .all(|p| nearly_equal(p.speed().value, speed.value, tol))
        {
            return Err(PerfError::InvalidInput {
                what: "all points in a curve must share the same speed",
            });
        }
        let first = &points[0];
        let (suc, b, d, method) = (
            first.suc().clone(),
            first.b(),
            first.d(),
            first.method(),
        );
        if !points.iter().all(|p| {
            *p.suc() == suc
                && nearly_equal(p.b().value, b.value, tol)
                && nearly_equal(p.d().value, d.value, tol)
                && p.method() == method
        }) {
            return Err(PerfError::InvalidInput {
                what: "all points in a curve must share suction, geometry and method",
            });
        }
        points.sort_by(|a, b| a.flow_v().value.total_cmp(&b.flow_v().value));
        Ok(Self { points, speed })
    }

    pub fn speed(&self) -> AngVel {
        self.speed
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Measured volumetric flow range.
    pub fn flow_range(&self) -> (VolumeRate, VolumeRate) {
        (
            self.points[0].flow_v(),
            self.points[self.points.len() - 1].flow_v(),
        )
    }

    /// Polytropic head [J/kg] at an arbitrary flow.
    pub fn head_at(&self, flow_v: VolumeRate) -> PerfResult<Interpolated> {
        self.interp_flow(flow_v, |p| p.head(), "head")
    }

    /// Polytropic efficiency at an arbitrary flow.
    pub fn eff_at(&self, flow_v: VolumeRate) -> PerfResult<Interpolated> {
        self.interp_flow(flow_v, |p| p.eff(), "efficiency")
    }

    /// Gas power [W] at an arbitrary flow.
    pub fn power_at(&self, flow_v: VolumeRate) -> PerfResult<Interpolated> {
        self.interp_flow(flow_v, |p| p.power().value, "power")
    }

    /// Discharge pressure [Pa] at an arbitrary flow.
    pub fn disch_pressure_at(&self, flow_v: VolumeRate) -> PerfResult<Interpolated> {
        self.interp_flow(flow_v, |p| p.disch().pressure().value, "discharge pressure")
    }

    /// Discharge temperature [K] at an arbitrary flow.
    pub fn disch_temperature_at(&self, flow_v: VolumeRate) -> PerfResult<Interpolated> {
        self.interp_flow(
            flow_v,
            |p| p.disch().temperature().value,
            "discharge temperature",
        )
    }

    /// Head coefficient at an arbitrary flow coefficient. Used when curves
    /// at different speeds are compared in coefficient space.
    pub fn psi_at_phi(&self, phi: f64) -> PerfResult<Interpolated> {
        self.interp_phi(phi, |p| p.psi(), "head coefficient")
    }

    /// Efficiency at an arbitrary flow coefficient.
    pub fn eff_at_phi(&self, phi: f64) -> PerfResult<Interpolated> {
        self.interp_phi(phi, |p| p.eff(), "efficiency")
    }

    /// Discharge-to-suction density ratio at an arbitrary flow coefficient.
    pub fn volume_ratio_at_phi(&self, phi: f64) -> PerfResult<Interpolated> {
        self.interp_phi(phi, |p| p.volume_ratio(), "volume ratio")
    }

    fn interp_flow(
        &self,
        flow_v: VolumeRate,
        value: impl Fn(&Point) -> f64,
        what: &'static str,
    ) -> PerfResult<Interpolated> {
        let x: Vec<f64> = self.points.iter().map(|p| p.flow_v().value).collect();
        interp_1d(&x, self.points.iter().map(value).collect(), flow_v.value, what)
    }

    fn interp_phi(
        &self,
        phi: f64,
        value: impl Fn(&Point) -> f64,
        what: &'static str,
    ) -> PerfResult<Interpolated> {
        // phi is monotone in flow at fixed speed and geometry, so the
        // flow-sorted order carries over.
        let x: Vec<f64> = self.points.iter().map(Point::phi).collect();
        interp_1d(&x, self.points.iter().map(value).collect(), phi, what)
    }
}

impl std::ops::Index<usize> for Curve {
    type Output = Point;

    fn index(&self, index: usize) -> &Point {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a Curve {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Linear interpolation with enabled extrapolation; queries outside the
/// sample range are logged and flagged but still answered.
pub(crate) fn interp_1d(
    x: &[f64],
    f_x: Vec<f64>,
    at: f64,
    what: &'static str,
) -> PerfResult<Interpolated> {
    let extrapolated = at < x[0] || at > x[x.len() - 1];
    if extrapolated {
        warn!(target: "cf_perf::curve", what, at, "expected point is being extrapolated");
    }

    let interp: Interp1DOwned<f64, Strategy1DEnum> = Interp1DOwned::new(
        Array1::from(x.to_vec()).into(),
        Array1::from(f_x).into(),
        ninterp::strategy::Linear.into(),
        Extrapolate::Enable.into(),
    )
    .map_err(|e| PerfError::Interpolation {
        message: e.to_string(),
    })?;
    let value = interp
        .interpolate(&[at])
        .map_err(|e| PerfError::Interpolation {
            message: e.to_string(),
        })?;

    Ok(Interpolated {
        value,
        extrapolated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::FlowSpec;
    use crate::polytropic::PolytropicMethod;
    use approx::assert_relative_eq;
    use cf_core::units::{bar, kelvin, m3_per_sec, meter, rad_per_sec};
    use cf_fluids::{Composition, CoolPropModel, EosModel, Species, State, StateInput};
    use std::sync::Arc;

    fn model() -> Arc<dyn EosModel> {
        Arc::new(CoolPropModel::new())
    }

    fn co2_point(flow_v: f64, disch_t: f64, speed: f64) -> Point {
        let comp = Composition::pure(Species::CO2);
        let suc = State::define(
            model(),
            StateInput::PT {
                p: bar(1.0),
                t: kelvin(300.0),
            },
            comp.clone(),
        )
        .unwrap();
        let disch = State::define(
            model(),
            StateInput::PT {
                p: bar(2.0),
                t: kelvin(disch_t),
            },
            comp,
        )
        .unwrap();
        Point::from_discharge(
            suc,
            disch,
            FlowSpec::Volumetric(m3_per_sec(flow_v)),
            rad_per_sec(speed),
            meter(0.028),
            meter(0.365),
            PolytropicMethod::Schultz,
        )
        .unwrap()
    }

    fn co2_curve() -> Curve {
        // Deliberately out of flow order.
        Curve::new(vec![
            co2_point(1.2, 372.0, 1000.0),
            co2_point(0.8, 366.0, 1000.0),
            co2_point(1.0, 369.0, 1000.0),
        ])
        .unwrap()
    }

    #[test]
    fn single_point_curve_is_rejected() {
        let err = Curve::new(vec![co2_point(1.0, 370.0, 1000.0)]).unwrap_err();
        assert!(err.to_string().contains("at least 2 points"));
    }

    #[test]
    fn mixed_speeds_are_rejected() {
        let err = Curve::new(vec![
            co2_point(0.8, 366.0, 1000.0),
            co2_point(1.2, 372.0, 1100.0),
        ])
        .unwrap_err();
        assert!(matches!(err, PerfError::InvalidInput { .. }));
    }

    #[test]
    fn mixed_impeller_geometry_is_rejected() {
        let base = co2_point(0.8, 366.0, 1000.0);
        let other_wheel = Point::from_discharge(
            base.suc().clone(),
            base.disch().clone(),
            FlowSpec::Volumetric(m3_per_sec(1.2)),
            rad_per_sec(1000.0),
            meter(0.028),
            meter(0.40),
            PolytropicMethod::Schultz,
        )
        .unwrap();
        let err = Curve::new(vec![base, other_wheel]).unwrap_err();
        assert!(err.to_string().contains("share suction, geometry"));
    }

    #[test]
    fn points_are_sorted_by_flow() {
        let curve = co2_curve();
        let flows: Vec<f64> = curve.iter().map(|p| p.flow_v().value).collect();
        assert_eq!(flows, vec![0.8, 1.0, 1.2]);
        let (min, max) = curve.flow_range();
        assert_relative_eq!(min.value, 0.8, max_relative = 1e-12);
        assert_relative_eq!(max.value, 1.2, max_relative = 1e-12);
    }

    #[test]
    fn interpolation_hits_measured_points_and_midpoints() {
        let curve = co2_curve();

        let at_point = curve.head_at(m3_per_sec(1.0)).unwrap();
        assert!(!at_point.extrapolated);
        assert_relative_eq!(at_point.value, curve[1].head(), max_relative = 1e-10);

        let mid = curve.head_at(m3_per_sec(0.9)).unwrap();
        assert!(!mid.extrapolated);
        let expected = 0.5 * (curve[0].head() + curve[1].head());
        assert_relative_eq!(mid.value, expected, max_relative = 1e-10);
    }

    #[test]
    fn extrapolation_is_flagged_and_still_answered() {
        let curve = co2_curve();
        let outside = curve.head_at(m3_per_sec(1.5)).unwrap();
        assert!(outside.extrapolated);
        assert!(outside.value.is_finite());

        let below = curve.eff_at(m3_per_sec(0.5)).unwrap();
        assert!(below.extrapolated);
        assert!(below.value.is_finite());
    }

    #[test]
    fn discharge_conditions_interpolate_by_flow() {
        let curve = co2_curve();
        let t = curve.disch_temperature_at(m3_per_sec(0.9)).unwrap();
        assert_relative_eq!(t.value, 0.5 * (366.0 + 369.0), max_relative = 1e-10);
        let p = curve.disch_pressure_at(m3_per_sec(1.0)).unwrap();
        assert_relative_eq!(p.value, 200_000.0, max_relative = 1e-10);
    }
}
