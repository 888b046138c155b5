//! Single-section compressor with balance-line and seal-gas leakage.
//!
//! Flange measurements see the main flow only; the rotor additionally sees
//! the end-seal leakage recirculated from discharge and part of the seal
//! gas. Mixing those streams gives an effective rotor inlet condition.

use crate::error::{PerfError, PerfResult};
use crate::point::{FlowSpec, Point};
use cf_core::units::{MassRate, Temperature, kelvin, kg_per_sec};
use cf_fluids::StateInput;

/// Seal-gas split fraction that reaches the rotor inlet side.
const SEAL_SPLIT: f64 = 0.95;

/// Measured leakage streams around one section.
#[derive(Debug, Clone, Copy)]
pub struct SectionStreams {
    /// Balance line flow, routed from discharge back to suction.
    pub balance_line_flow: MassRate,
    /// Seal gas injection flow.
    pub seal_gas_flow: MassRate,
    /// Seal gas injection temperature.
    pub seal_gas_temperature: Temperature,
}

/// Which mass balance defines the rotor inlet flow, and which pressure the
/// leakage constant is referenced to.
///
/// Both formulations are in use; they are not equivalent, so the caller
/// must pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotorFlowModel {
    /// Rotor flow is main flow plus end-seal leakage; `k_end` is referenced
    /// to the discharge pressure.
    EndSeal,
    /// Rotor flow is main flow plus the full balance-line and seal-gas
    /// streams; `k_end` is referenced to the suction pressure.
    FullBalance,
}

/// A flange point extended with its leakage balance.
#[derive(Debug, Clone)]
pub struct SectionPoint {
    point: Point,
    streams: SectionStreams,
    rotor_model: RotorFlowModel,
    mend: MassRate,
    rotor_flow: MassRate,
    rotor_inlet_temperature: Temperature,
    k_end: f64,
}

impl SectionPoint {
    /// Close the leakage mass and energy balance around a flange point.
    ///
    /// The end-seal leakage temperature comes from an isenthalpic expansion
    /// of discharge gas back to the suction pressure.
    pub fn new(
        point: Point,
        streams: SectionStreams,
        rotor_model: RotorFlowModel,
    ) -> PerfResult<Self> {
        let mbal = streams.balance_line_flow.value;
        let mseal = streams.seal_gas_flow.value;
        if mbal < 0.0 || mseal < 0.0 {
            return Err(PerfError::InvalidInput {
                what: "leakage flows must be non-negative",
            });
        }
        let ps = point.suc().pressure().value;
        let pd = point.disch().pressure().value;
        if pd <= ps {
            return Err(PerfError::InvalidInput {
                what: "discharge pressure must exceed suction pressure",
            });
        }

        let ms1f = point.flow_m().value;
        let mend = mbal - SEAL_SPLIT * mseal / 2.0;

        let end_state = point.disch().with_input(StateInput::PH {
            p: point.suc().pressure(),
            h: point.disch().h()?,
        })?;
        let t_end = end_state.temperature().value;
        let t_main = point.suc().temperature().value;
        let t_seal = streams.seal_gas_temperature.value;
        let rotor_inlet_temperature = (ms1f * t_main
            + mend * t_end
            + SEAL_SPLIT * mseal * t_seal)
            / (ms1f + mend + SEAL_SPLIT * mseal);

        let rotor_flow = match rotor_model {
            RotorFlowModel::EndSeal => ms1f + mend,
            RotorFlowModel::FullBalance => ms1f + mbal + SEAL_SPLIT * mseal / 2.0,
        };

        let disch = point.disch();
        let zd = disch.z()?;
        let td = disch.temperature().value;
        let mw = disch.molar_mass();
        let p_ref = match rotor_model {
            RotorFlowModel::EndSeal => pd,
            RotorFlowModel::FullBalance => ps,
        };
        let k_end = mend * (zd * td / mw).sqrt() / (p_ref * (1.0 - (ps / pd).powi(2)).sqrt());

        Ok(Self {
            point,
            streams,
            rotor_model,
            mend: kg_per_sec(mend),
            rotor_flow: kg_per_sec(rotor_flow),
            rotor_inlet_temperature: kelvin(rotor_inlet_temperature),
            k_end,
        })
    }

    /// The flange point the balance was closed around.
    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn streams(&self) -> &SectionStreams {
        &self.streams
    }

    pub fn rotor_model(&self) -> RotorFlowModel {
        self.rotor_model
    }

    /// End-seal leakage flow.
    pub fn mend(&self) -> MassRate {
        self.mend
    }

    /// Effective rotor inlet flow.
    pub fn rotor_flow(&self) -> MassRate {
        self.rotor_flow
    }

    /// Flow-weighted rotor inlet temperature.
    pub fn rotor_inlet_temperature(&self) -> Temperature {
        self.rotor_inlet_temperature
    }

    /// Leakage constant used to re-derive the end-seal flow at converted
    /// operating conditions without re-measuring it.
    pub fn k_end(&self) -> f64 {
        self.k_end
    }
}

/// A straight-through (single section) compressor: a guarantee point plus
/// test points, each seen at flange and rotor conditions.
#[derive(Debug, Clone)]
pub struct StraightThrough {
    guarantee_point: Point,
    flange_points: Vec<SectionPoint>,
    rotor_points: Vec<Point>,
}

impl StraightThrough {
    /// Derive the rotor-condition points from the flange test points.
    ///
    /// Each rotor point keeps the flange discharge state but sees the mixed
    /// suction temperature and the rotor mass flow.
    pub fn new(guarantee_point: Point, test_points: Vec<SectionPoint>) -> PerfResult<Self> {
        let rotor_points = test_points
            .iter()
            .map(|sp| {
                let flange = sp.point();
                let suc_rotor = flange.suc().with_input(StateInput::PT {
                    p: flange.suc().pressure(),
                    t: sp.rotor_inlet_temperature(),
                })?;
                Point::from_discharge(
                    suc_rotor,
                    flange.disch().clone(),
                    FlowSpec::Mass(sp.rotor_flow()),
                    flange.speed(),
                    flange.b(),
                    flange.d(),
                    flange.method(),
                )
            })
            .collect::<PerfResult<Vec<_>>>()?;

        Ok(Self {
            guarantee_point,
            flange_points: test_points,
            rotor_points,
        })
    }

    pub fn guarantee_point(&self) -> &Point {
        &self.guarantee_point
    }

    pub fn flange_points(&self) -> &[SectionPoint] {
        &self.flange_points
    }

    pub fn rotor_points(&self) -> &[Point] {
        &self.rotor_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polytropic::PolytropicMethod;
    use approx::assert_relative_eq;
    use cf_core::units::{bar, m3_per_sec, meter, rad_per_sec};
    use cf_fluids::{Composition, CoolPropModel, EosModel, Species, State};
    use std::sync::Arc;

    fn model() -> Arc<dyn EosModel> {
        Arc::new(CoolPropModel::new())
    }

    fn co2_point() -> Point {
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
                t: kelvin(370.0),
            },
            comp,
        )
        .unwrap();
        Point::from_discharge(
            suc,
            disch,
            FlowSpec::Volumetric(m3_per_sec(1.0)),
            rad_per_sec(1000.0),
            meter(0.028),
            meter(0.365),
            PolytropicMethod::Schultz,
        )
        .unwrap()
    }

    fn streams() -> SectionStreams {
        SectionStreams {
            balance_line_flow: kg_per_sec(0.2),
            seal_gas_flow: kg_per_sec(0.1),
            seal_gas_temperature: kelvin(300.0),
        }
    }

    #[test]
    fn end_seal_leakage_balance() {
        let sp = SectionPoint::new(co2_point(), streams(), RotorFlowModel::EndSeal).unwrap();

        // mend = mbal - 0.95 mseal / 2
        assert_relative_eq!(sp.mend().value, 0.2 - 0.95 * 0.1 / 2.0, max_relative = 1e-12);
        assert_relative_eq!(
            sp.rotor_flow().value,
            sp.point().flow_m().value + sp.mend().value,
            max_relative = 1e-12
        );
    }

    #[test]
    fn full_balance_uses_the_whole_balance_line() {
        let sp = SectionPoint::new(co2_point(), streams(), RotorFlowModel::FullBalance).unwrap();
        assert_relative_eq!(
            sp.rotor_flow().value,
            sp.point().flow_m().value + 0.2 + 0.95 * 0.1 / 2.0,
            max_relative = 1e-12
        );
    }

    #[test]
    fn rotor_inlet_temperature_is_a_weighted_mix() {
        let point = co2_point();
        let sp = SectionPoint::new(point.clone(), streams(), RotorFlowModel::EndSeal).unwrap();

        let end_state = point
            .disch()
            .with_input(StateInput::PH {
                p: point.suc().pressure(),
                h: point.disch().h().unwrap(),
            })
            .unwrap();
        let t_end = end_state.temperature().value;
        let ms1f = point.flow_m().value;
        let mend = sp.mend().value;
        let mseal = 0.1;
        let expected =
            (ms1f * 300.0 + mend * t_end + 0.95 * mseal * 300.0) / (ms1f + mend + 0.95 * mseal);
        assert_relative_eq!(
            sp.rotor_inlet_temperature().value,
            expected,
            max_relative = 1e-9
        );
        // Leakage is hot discharge gas, so the mix runs warmer than the
        // flange suction.
        assert!(sp.rotor_inlet_temperature().value > 300.0);
    }

    #[test]
    fn k_end_reference_pressure_differs_between_models() {
        let end = SectionPoint::new(co2_point(), streams(), RotorFlowModel::EndSeal).unwrap();
        let full = SectionPoint::new(co2_point(), streams(), RotorFlowModel::FullBalance).unwrap();

        assert!(end.k_end() > 0.0);
        // Suction-referenced constant is larger by the pressure ratio.
        assert_relative_eq!(
            full.k_end() / end.k_end(),
            2.0,
            max_relative = 1e-9
        );
    }

    #[test]
    fn rotor_points_see_mixed_suction_and_rotor_flow() {
        let guarantee = co2_point();
        let sp = SectionPoint::new(co2_point(), streams(), RotorFlowModel::EndSeal).unwrap();
        let expected_t = sp.rotor_inlet_temperature().value;
        let expected_m = sp.rotor_flow().value;

        let st = StraightThrough::new(guarantee, vec![sp]).unwrap();
        assert_eq!(st.rotor_points().len(), 1);
        let rotor = &st.rotor_points()[0];
        assert_relative_eq!(
            rotor.suc().temperature().value,
            expected_t,
            max_relative = 1e-9
        );
        assert_relative_eq!(rotor.flow_m().value, expected_m, max_relative = 1e-9);
        // Same discharge, hotter suction: less head than at the flange.
        assert!(rotor.head() < st.flange_points()[0].point().head());
    }

    #[test]
    fn negative_streams_are_rejected() {
        let err = SectionPoint::new(
            co2_point(),
            SectionStreams {
                balance_line_flow: kg_per_sec(-0.1),
                seal_gas_flow: kg_per_sec(0.1),
                seal_gas_temperature: kelvin(300.0),
            },
            RotorFlowModel::EndSeal,
        )
        .unwrap_err();
        assert!(matches!(err, PerfError::InvalidInput { .. }));
    }
}
