//! A performance map across speeds: one curve per distinct speed.

use std::f64::consts::PI;

use crate::convert::{Converted, Find};
use crate::curve::{Curve, interp_1d};
use crate::error::{PerfError, PerfResult};
use crate::point::{FlowSpec, Point};
use cf_core::numeric::{Tolerances, nearly_equal};
use cf_core::units::{AngVel, MassRate, VolumeRate, m3_per_sec, rad_per_sec};
use cf_fluids::State;
use rayon::prelude::*;
use tracing::warn;

/// Curves at distinct speeds, queried in (flow, speed) space.
///
/// Queries interpolate dimensionless coefficients: within each curve by flow
/// coefficient, then across curves by speed. With a single speed the map
/// degrades to 1-D interpolation, a reduced-accuracy mode announced at
/// construction.
#[derive(Debug, Clone)]
pub struct Impeller {
    curves: Vec<Curve>,
}

impl Impeller {
    /// Group a flat list of points by speed into curves.
    ///
    /// All points must share the suction state, geometry and polytropic
    /// method; each distinct speed needs at least two points.
    pub fn new(points: Vec<Point>) -> PerfResult<Self> {
        let Some(first) = points.first() else {
            return Err(PerfError::InvalidInput {
                what: "an impeller requires at least one curve of points",
            });
        };
        let (suc, b, d, method) = (
            first.suc().clone(),
            first.b(),
            first.d(),
            first.method(),
        );
        let tol = Tolerances::solver();
        for point in &points {
            let same = *point.suc() == suc
                && nearly_equal(point.b().value, b.value, tol)
                && nearly_equal(point.d().value, d.value, tol)
                && point.method() == method;
            if !same {
                return Err(PerfError::InvalidInput {
                    what: "all impeller points must share suction, geometry and method",
                });
            }
        }

        let mut groups: Vec<Vec<Point>> = Vec::new();
        for point in points {
            match groups
                .iter_mut()
                .find(|g| nearly_equal(g[0].speed().value, point.speed().value, tol))
            {
                Some(group) => group.push(point),
                None => groups.push(vec![point]),
            }
        }

        let mut curves = groups
            .into_iter()
            .map(Curve::new)
            .collect::<PerfResult<Vec<_>>>()?;
        curves.sort_by(|a, b| a.speed().value.total_cmp(&b.speed().value));

        if curves.len() < 2 {
            warn!(
                target: "cf_perf::impeller",
                "single speed available, falling back to 1-D interpolation"
            );
        }

        Ok(Self { curves })
    }

    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// All points in curve order, curves ordered by speed.
    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.curves.iter().flat_map(Curve::iter)
    }

    pub fn speeds(&self) -> Vec<AngVel> {
        self.curves.iter().map(Curve::speed).collect()
    }

    /// Performance point at an arbitrary (volumetric flow, speed).
    pub fn point(&self, flow_v: VolumeRate, speed: AngVel) -> PerfResult<Point> {
        let rep = &self.curves[0][0];
        if !(speed.value > 0.0) {
            return Err(PerfError::InvalidInput {
                what: "speed must be positive",
            });
        }
        let d = rep.d();
        let u = speed.value * d.value / 2.0;
        let phi = flow_v.value / (PI / 4.0 * d.value * d.value * u);

        let (psi, eff) = self.coefficients_at(phi, speed)?;
        let head = psi * u * u / 2.0;
        Point::from_head_eff(
            rep.suc().clone(),
            head,
            eff,
            FlowSpec::Volumetric(flow_v),
            speed,
            rep.b(),
            d,
            rep.method(),
        )
    }

    /// Performance point at an arbitrary (mass flow, speed); the volumetric
    /// flow follows from the suction density.
    pub fn point_with_mass_flow(&self, flow_m: MassRate, speed: AngVel) -> PerfResult<Point> {
        let rho1 = self.curves[0][0].suc().rho()?.value;
        self.point(m3_per_sec(flow_m.value / rho1), speed)
    }

    /// Synthesize a whole curve at an arbitrary speed, sampling the flow
    /// coefficients of the measured curve nearest in speed.
    pub fn curve(&self, speed: AngVel) -> PerfResult<Curve> {
        let nearest = self
            .curves
            .iter()
            .min_by(|a, b| {
                (a.speed().value - speed.value)
                    .abs()
                    .total_cmp(&(b.speed().value - speed.value).abs())
            })
            .ok_or(PerfError::InvalidInput {
                what: "an impeller requires at least one curve of points",
            })?;

        let d = nearest[0].d();
        let u = speed.value * d.value / 2.0;
        let points = nearest
            .iter()
            .map(|p| {
                let flow_v = m3_per_sec(p.phi() * PI / 4.0 * d.value * d.value * u);
                self.point(flow_v, speed)
            })
            .collect::<PerfResult<Vec<_>>>()?;
        Curve::new(points)
    }

    /// Convert the whole map to a new suction condition, point by point.
    ///
    /// Point conversions are independent and run in parallel. When the
    /// conversion finds a new speed, the points of a curve land on slightly
    /// different speeds; each is then rescaled to the curve mean through the
    /// affinity relations so the converted curves stay iso-speed.
    pub fn convert_from(&self, suc: &State, find: Find) -> PerfResult<Self> {
        let curves = self
            .curves
            .iter()
            .map(|curve| convert_curve(curve, suc, find))
            .collect::<PerfResult<Vec<_>>>()?;
        Ok(Self { curves })
    }

    fn coefficients_at(&self, phi: f64, speed: AngVel) -> PerfResult<(f64, f64)> {
        if self.curves.len() == 1 {
            let curve = &self.curves[0];
            return Ok((curve.psi_at_phi(phi)?.value, curve.eff_at_phi(phi)?.value));
        }

        let speeds: Vec<f64> = self.curves.iter().map(|c| c.speed().value).collect();
        let psis = self
            .curves
            .iter()
            .map(|c| Ok(c.psi_at_phi(phi)?.value))
            .collect::<PerfResult<Vec<_>>>()?;
        let effs = self
            .curves
            .iter()
            .map(|c| Ok(c.eff_at_phi(phi)?.value))
            .collect::<PerfResult<Vec<_>>>()?;

        let psi = interp_1d(&speeds, psis, speed.value, "head coefficient")?.value;
        let eff = interp_1d(&speeds, effs, speed.value, "efficiency")?.value;
        Ok((psi, eff))
    }
}

impl std::ops::Index<usize> for Impeller {
    type Output = Point;

    /// Flat point index across curves, curves ordered by speed.
    fn index(&self, mut index: usize) -> &Point {
        for curve in &self.curves {
            if index < curve.len() {
                return &curve[index];
            }
            index -= curve.len();
        }
        panic!("point index {index} out of bounds");
    }
}

fn convert_curve(curve: &Curve, suc: &State, find: Find) -> PerfResult<Curve> {
    let converted = curve
        .points()
        .par_iter()
        .map(|p| Point::convert_from(p, suc.clone(), find))
        .collect::<PerfResult<Vec<Converted>>>()?;

    match find {
        // The speed was held, so the converted points are iso-speed already.
        Find::Flow => Curve::new(converted.into_iter().map(|c| c.point).collect()),
        Find::Speed => {
            let mean = converted
                .iter()
                .map(|c| c.point.speed().value)
                .sum::<f64>()
                / converted.len() as f64;
            let points = converted
                .iter()
                .map(|c| {
                    let p = &c.point;
                    let factor = mean / p.speed().value;
                    Point::from_head_eff(
                        p.suc().clone(),
                        p.head() * factor * factor,
                        p.eff(),
                        FlowSpec::Volumetric(m3_per_sec(p.flow_v().value * factor)),
                        rad_per_sec(mean),
                        p.b(),
                        p.d(),
                        p.method(),
                    )
                })
                .collect::<PerfResult<Vec<_>>>()?;
            Curve::new(points)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polytropic::PolytropicMethod;
    use approx::assert_relative_eq;
    use cf_core::units::{kelvin, meter, pa};
    use cf_fluids::{Composition, CoolPropModel, EosModel, Species, StateInput};
    use std::sync::Arc;

    fn model() -> Arc<dyn EosModel> {
        Arc::new(CoolPropModel::new())
    }

    fn air_suction() -> State {
        State::define(
            model(),
            StateInput::PT {
                p: pa(100_663.0),
                t: kelvin(305.0),
            },
            Composition::pure(Species::Air),
        )
        .unwrap()
    }

    fn air_point(speed: f64, flow_v: f64, head: f64, eff: f64) -> Point {
        Point::from_head_eff(
            air_suction(),
            head,
            eff,
            FlowSpec::Volumetric(m3_per_sec(flow_v)),
            rad_per_sec(speed),
            meter(0.010_745),
            meter(0.325_60),
            PolytropicMethod::Schultz,
        )
        .unwrap()
    }

    /// Two-speed air impeller, measured values from Ludtke.
    fn air_impeller() -> Impeller {
        Impeller::new(vec![
            air_point(1263.0, 1.15, 147_634.0, 0.819),
            air_point(1263.0, 1.26, 144_664.0, 0.829),
            air_point(1263.0, 1.36, 139_945.0, 0.831),
            air_point(1337.0, 1.22, 166_686.0, 0.814),
            air_point(1337.0, 1.35, 163_620.0, 0.825),
            air_point(1337.0, 1.48, 158_536.0, 0.830),
        ])
        .unwrap()
    }

    #[test]
    fn points_group_into_speed_sorted_curves() {
        let imp = air_impeller();
        assert_eq!(imp.curves().len(), 2);
        assert_relative_eq!(imp.curves()[0].speed().value, 1263.0, max_relative = 1e-12);
        assert_relative_eq!(imp.curves()[1].speed().value, 1337.0, max_relative = 1e-12);
        assert_eq!(imp.curves()[0].len(), 3);
        // Flat indexing follows curve order.
        assert_relative_eq!(imp[3].speed().value, 1337.0, max_relative = 1e-12);
    }

    #[test]
    fn discharge_temperatures_match_references() {
        let imp = air_impeller();
        let expected = [
            [482.850_310, 477.243_856, 471.295_33],
            [506.668_177, 500.418_404, 493.309_93],
        ];
        for (curve, temps) in imp.curves().iter().zip(expected) {
            for (point, t) in curve.iter().zip(temps) {
                assert_relative_eq!(
                    point.disch().temperature().value,
                    t,
                    max_relative = 1e-3
                );
            }
        }
    }

    #[test]
    fn point_reproduces_measured_samples() {
        let imp = air_impeller();
        let p = imp.point(m3_per_sec(1.15), rad_per_sec(1263.0)).unwrap();
        assert_relative_eq!(p.head(), 147_634.0, max_relative = 1e-4);
        assert_relative_eq!(p.eff(), 0.819, max_relative = 1e-4);
    }

    #[test]
    fn point_interpolates_between_speeds() {
        let imp = air_impeller();
        let p = imp.point(m3_per_sec(1.25), rad_per_sec(1300.0)).unwrap();
        assert!(p.head() > 139_945.0 && p.head() < 166_686.0);
        assert!(p.eff() > 0.80 && p.eff() < 0.84);
    }

    #[test]
    fn synthesized_curve_keeps_point_count() {
        let imp = air_impeller();
        let curve = imp.curve(rad_per_sec(1300.0)).unwrap();
        assert_eq!(curve.len(), 3);
        assert_relative_eq!(curve.speed().value, 1300.0, max_relative = 1e-12);
        for pair in curve.points().windows(2) {
            assert!(pair[0].flow_v().value < pair[1].flow_v().value);
        }
    }

    #[test]
    fn single_speed_impeller_degrades_to_one_dimension() {
        let imp = Impeller::new(vec![
            air_point(1263.0, 1.15, 147_634.0, 0.819),
            air_point(1263.0, 1.26, 144_664.0, 0.829),
            air_point(1263.0, 1.36, 139_945.0, 0.831),
        ])
        .unwrap();
        assert_eq!(imp.curves().len(), 1);

        // Query at the measured speed reads straight off the one curve.
        let p = imp.point(m3_per_sec(1.26), rad_per_sec(1263.0)).unwrap();
        assert_relative_eq!(p.head(), 144_664.0, max_relative = 1e-4);
        assert_relative_eq!(p.eff(), 0.829, max_relative = 1e-4);

        // Off-speed queries still answer through the coefficient curve.
        let q = imp.point(m3_per_sec(1.30), rad_per_sec(1300.0)).unwrap();
        assert!(q.head().is_finite() && q.head() > 0.0);
        assert!(q.eff() > 0.80 && q.eff() < 0.84);

        let curve = imp.curve(rad_per_sec(1300.0)).unwrap();
        assert_eq!(curve.len(), 3);
        assert_relative_eq!(curve.speed().value, 1300.0, max_relative = 1e-12);
    }

    #[test]
    fn conversion_to_nitrogen_matches_references() {
        let imp = air_impeller();
        let new_suc = State::define(
            model(),
            StateInput::PT {
                p: pa(200_000.0),
                t: kelvin(301.58),
            },
            Composition::pure(Species::N2),
        )
        .unwrap();

        let converted = imp.convert_from(&new_suc, Find::Speed).unwrap();
        let p0 = &imp[0];
        let new_p0 = &converted[0];

        assert_relative_eq!(new_p0.eff(), p0.eff(), max_relative = 1e-3);
        assert_relative_eq!(new_p0.phi(), p0.phi(), max_relative = 1e-2);
        assert_relative_eq!(new_p0.psi(), p0.psi(), max_relative = 1e-2);
        assert_relative_eq!(new_p0.head(), 151_889.637, max_relative = 1e-2);
        assert_relative_eq!(new_p0.power().value, 483_519.884, max_relative = 1e-2);
        assert_relative_eq!(new_p0.speed().value, 1281.074, max_relative = 1e-2);
    }

    #[test]
    fn converted_curves_stay_iso_speed() {
        let imp = air_impeller();
        let new_suc = State::define(
            model(),
            StateInput::PT {
                p: pa(200_000.0),
                t: kelvin(301.58),
            },
            Composition::pure(Species::N2),
        )
        .unwrap();
        let converted = imp.convert_from(&new_suc, Find::Speed).unwrap();
        assert_eq!(converted.curves().len(), 2);
        for curve in converted.curves() {
            for point in curve {
                assert_relative_eq!(
                    point.speed().value,
                    curve.speed().value,
                    max_relative = 1e-6
                );
            }
        }
    }

    #[test]
    fn mixed_geometry_is_rejected() {
        let mut points = vec![
            air_point(1263.0, 1.15, 147_634.0, 0.819),
            air_point(1263.0, 1.26, 144_664.0, 0.829),
        ];
        points.push(
            Point::from_head_eff(
                air_suction(),
                139_945.0,
                0.831,
                FlowSpec::Volumetric(m3_per_sec(1.36)),
                rad_per_sec(1263.0),
                meter(0.010_745),
                meter(0.40),
                PolytropicMethod::Schultz,
            )
            .unwrap(),
        );
        let err = Impeller::new(points).unwrap_err();
        assert!(matches!(err, PerfError::InvalidInput { .. }));
    }
}
