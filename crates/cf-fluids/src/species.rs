//! Chemical species definitions.

/// Gas components encountered in centrifugal compressor service:
/// natural gas fractions, inerts, sour components and common test gases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Species {
    /// Methane (CH₄)
    CH4,
    /// Ethane
    Ethane,
    /// Ethylene
    Ethylene,
    /// Propane
    Propane,
    /// Propylene
    Propylene,
    /// n-Butane
    NButane,
    /// Isobutane
    Isobutane,
    /// n-Pentane
    NPentane,
    /// Isopentane
    Isopentane,
    /// n-Hexane
    NHexane,
    /// Nitrogen (N₂)
    N2,
    /// Oxygen (O₂)
    O2,
    /// Carbon dioxide (CO₂)
    CO2,
    /// Carbon monoxide (CO)
    CO,
    /// Hydrogen sulfide (H₂S)
    H2S,
    /// Hydrogen (H₂)
    H2,
    /// Helium
    He,
    /// Argon
    Ar,
    /// Water (H₂O)
    H2O,
    /// Air (pseudo-pure backend fluid)
    Air,
    /// Refrigerant R134a
    R134a,
}

impl Species {
    pub const ALL: [Species; 21] = [
        Species::CH4,
        Species::Ethane,
        Species::Ethylene,
        Species::Propane,
        Species::Propylene,
        Species::NButane,
        Species::Isobutane,
        Species::NPentane,
        Species::Isopentane,
        Species::NHexane,
        Species::N2,
        Species::O2,
        Species::CO2,
        Species::CO,
        Species::H2S,
        Species::H2,
        Species::He,
        Species::Ar,
        Species::H2O,
        Species::Air,
        Species::R134a,
    ];

    /// Canonical key used in snapshots and composition maps.
    pub fn key(&self) -> &'static str {
        match self {
            Species::CH4 => "CH4",
            Species::Ethane => "Ethane",
            Species::Ethylene => "Ethylene",
            Species::Propane => "Propane",
            Species::Propylene => "Propylene",
            Species::NButane => "nButane",
            Species::Isobutane => "Isobutane",
            Species::NPentane => "nPentane",
            Species::Isopentane => "Isopentane",
            Species::NHexane => "nHexane",
            Species::N2 => "N2",
            Species::O2 => "O2",
            Species::CO2 => "CO2",
            Species::CO => "CO",
            Species::H2S => "H2S",
            Species::H2 => "H2",
            Species::He => "He",
            Species::Ar => "Ar",
            Species::H2O => "H2O",
            Species::Air => "Air",
            Species::R134a => "R134a",
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::CH4 => "Methane",
            Species::Ethane => "Ethane",
            Species::Ethylene => "Ethylene",
            Species::Propane => "Propane",
            Species::Propylene => "Propylene",
            Species::NButane => "n-Butane",
            Species::Isobutane => "Isobutane",
            Species::NPentane => "n-Pentane",
            Species::Isopentane => "Isopentane",
            Species::NHexane => "n-Hexane",
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::CO2 => "Carbon Dioxide",
            Species::CO => "Carbon Monoxide",
            Species::H2S => "Hydrogen Sulfide",
            Species::H2 => "Hydrogen",
            Species::He => "Helium",
            Species::Ar => "Argon",
            Species::H2O => "Water",
            Species::Air => "Air",
            Species::R134a => "R134a",
        }
    }

    /// Get molar mass [kg/kmol] for this species.
    ///
    /// Values sourced from standard reference data (e.g., NIST).
    pub fn molar_mass(&self) -> f64 {
        match self {
            Species::CH4 => 16.043,
            Species::Ethane => 30.070,
            Species::Ethylene => 28.054,
            Species::Propane => 44.097,
            Species::Propylene => 42.081,
            Species::NButane => 58.124,
            Species::Isobutane => 58.124,
            Species::NPentane => 72.151,
            Species::Isopentane => 72.151,
            Species::NHexane => 86.178,
            Species::N2 => 28.014,
            Species::O2 => 31.999,
            Species::CO2 => 44.010,
            Species::CO => 28.010,
            Species::H2S => 34.081,
            Species::H2 => 2.016,
            Species::He => 4.003,
            Species::Ar => 39.948,
            Species::H2O => 18.015,
            Species::Air => 28.965,
            Species::R134a => 102.031,
        }
    }

    /// Map to the rfluids Pure enum (internal use for the CoolProp backend).
    pub(crate) fn backend_pure(&self) -> rfluids::substance::Pure {
        use rfluids::substance::Pure;
        match self {
            Species::CH4 => Pure::Methane,
            Species::Ethane => Pure::Ethane,
            Species::Ethylene => Pure::Ethylene,
            Species::Propane => Pure::nPropane,
            Species::Propylene => Pure::Propylene,
            Species::NButane => Pure::nButane,
            Species::Isobutane => Pure::Isobutane,
            Species::NPentane => Pure::nPentane,
            Species::Isopentane => Pure::Isopentane,
            Species::NHexane => Pure::nHexane,
            Species::N2 => Pure::Nitrogen,
            Species::O2 => Pure::Oxygen,
            Species::CO2 => Pure::CarbonDioxide,
            Species::CO => Pure::CarbonMonoxide,
            Species::H2S => Pure::HydrogenSulfide,
            Species::H2 => Pure::Hydrogen,
            Species::He => Pure::Helium,
            Species::Ar => Pure::Argon,
            Species::H2O => Pure::Water,
            Species::Air => Pure::Air,
            Species::R134a => Pure::R134a,
        }
    }
}

impl std::str::FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let canonical: String = s
            .trim()
            .to_uppercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match canonical.as_str() {
            "CH4" | "METHANE" => Ok(Species::CH4),
            "C2H6" | "ETHANE" => Ok(Species::Ethane),
            "C2H4" | "ETHYLENE" => Ok(Species::Ethylene),
            "C3H8" | "PROPANE" => Ok(Species::Propane),
            "C3H6" | "PROPYLENE" => Ok(Species::Propylene),
            "NBUTANE" | "BUTANE" => Ok(Species::NButane),
            "IBUTANE" | "ISOBUTANE" => Ok(Species::Isobutane),
            "NPENTANE" | "PENTANE" => Ok(Species::NPentane),
            "IPENTANE" | "ISOPENTANE" => Ok(Species::Isopentane),
            "NHEXANE" | "HEXANE" => Ok(Species::NHexane),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "CO2" | "CARBONDIOXIDE" => Ok(Species::CO2),
            "CO" | "CARBONMONOXIDE" => Ok(Species::CO),
            "H2S" | "HYDROGENSULFIDE" => Ok(Species::H2S),
            "H2" | "HYDROGEN" => Ok(Species::H2),
            "HE" | "HELIUM" => Ok(Species::He),
            "AR" | "ARGON" => Ok(Species::Ar),
            "H2O" | "WATER" => Ok(Species::H2O),
            "AIR" => Ok(Species::Air),
            "R134A" => Ok(Species::R134a),
            _ => Err("unknown species"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_common_aliases() {
        assert_eq!("Methane".parse::<Species>().unwrap(), Species::CH4);
        assert_eq!("CarbonDioxide".parse::<Species>().unwrap(), Species::CO2);
        assert_eq!("carbon dioxide".parse::<Species>().unwrap(), Species::CO2);
        assert_eq!("n-butane".parse::<Species>().unwrap(), Species::NButane);
        assert_eq!("i-pentane".parse::<Species>().unwrap(), Species::Isopentane);
        assert_eq!(
            "Hydrogen Sulfide".parse::<Species>().unwrap(),
            Species::H2S
        );
        assert_eq!("r134a".parse::<Species>().unwrap(), Species::R134a);
    }

    #[test]
    fn unknown_name_is_rejected() {
        assert!("fake_name".parse::<Species>().is_err());
    }

    #[test]
    fn canonical_key_roundtrip() {
        for species in Species::ALL {
            let parsed = species
                .key()
                .parse::<Species>()
                .expect("canonical key should parse");
            assert_eq!(parsed, species);
        }
    }

    #[test]
    fn mixture_molar_masses_are_positive() {
        for species in Species::ALL {
            assert!(species.molar_mass() > 0.0);
        }
    }
}
