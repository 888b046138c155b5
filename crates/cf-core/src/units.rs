// cf-core/src/units.rs

use uom::si::f64::{
    AngularVelocity as UomAngularVelocity, DynamicViscosity as UomDynamicViscosity,
    Length as UomLength, MassDensity as UomMassDensity, MassRate as UomMassRate,
    Power as UomPower, Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Velocity as UomVelocity,
    VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type AngVel = UomAngularVelocity;
pub type DynVisc = UomDynamicViscosity;
pub type Length = UomLength;
pub type Density = UomMassDensity;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Velocity = UomVelocity;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn kpa(v: f64) -> Pressure {
    use uom::si::pressure::kilopascal;
    Pressure::new::<kilopascal>(v)
}

#[inline]
pub fn kelvin(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn kg_per_m3(v: f64) -> Density {
    use uom::si::mass_density::kilogram_per_cubic_meter;
    Density::new::<kilogram_per_cubic_meter>(v)
}

#[inline]
pub fn kg_per_sec(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn m3_per_sec(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v)
}

#[inline]
pub fn m3_per_hour(v: f64) -> VolumeRate {
    m3_per_sec(v / 3600.0)
}

#[inline]
pub fn meter(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn millimeter(v: f64) -> Length {
    use uom::si::length::millimeter;
    Length::new::<millimeter>(v)
}

#[inline]
pub fn rad_per_sec(v: f64) -> AngVel {
    use uom::si::angular_velocity::radian_per_second;
    AngVel::new::<radian_per_second>(v)
}

#[inline]
pub fn rpm(v: f64) -> AngVel {
    use uom::si::angular_velocity::revolution_per_minute;
    AngVel::new::<revolution_per_minute>(v)
}

#[inline]
pub fn watt(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn m_per_sec(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn pa_sec(v: f64) -> DynVisc {
    use uom::si::dynamic_viscosity::pascal_second;
    DynVisc::new::<pascal_second>(v)
}

pub mod constants {
    /// Universal gas constant [J/(mol K)].
    pub const R_UNIVERSAL: f64 = 8.314_462_618;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _t = kelvin(300.0);
        let _rho = kg_per_m3(1.2);
        let _mdot = kg_per_sec(1.2);
        let _q = m3_per_sec(2.0);
        let _l = meter(0.3);
        let _w = rad_per_sec(1200.0);
        let _pw = watt(1.0e6);
        let _u = m_per_sec(250.0);
        let _mu = pa_sec(1.8e-5);
    }

    #[test]
    fn pressure_base_unit_is_pascal() {
        assert!((bar(1.0).value - 100_000.0).abs() < 1e-9);
        assert!((kpa(3876.0).value - 3_876_000.0).abs() < 1e-6);
    }

    #[test]
    fn celsius_converts_to_kelvin() {
        assert!((celsius(26.85).value - 300.0).abs() < 1e-9);
    }

    #[test]
    fn rpm_converts_to_rad_per_sec() {
        let w = rpm(11_145.0);
        assert!((w.value - 11_145.0 * std::f64::consts::PI / 30.0).abs() < 1e-6);
    }

    #[test]
    fn volume_rate_per_hour() {
        assert!((m3_per_hour(3600.0).value - 1.0).abs() < 1e-12);
    }
}
