//! Fluid composition (pure or mixtures).

use crate::error::{FluidError, FluidResult};
use crate::species::Species;
use cf_core::numeric::{Tolerances, nearly_equal};
use cf_core::units::constants::R_UNIVERSAL;

/// Fluid composition defined by normalized mole fractions.
///
/// Input fractions need not be pre-normalized; the constructor scales them
/// to sum to 1 and keeps species in a canonical order so two compositions
/// built from the same components compare cleanly.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Species and their mole fractions (always normalized to sum=1).
    items: Vec<(Species, f64)>,
}

impl Composition {
    /// Create a pure-species composition.
    pub fn pure(species: Species) -> Self {
        Self {
            items: vec![(species, 1.0)],
        }
    }

    /// Create a composition from mole fractions.
    ///
    /// Validates that all fractions are finite, non-negative, and have a
    /// positive sum, then normalizes to sum=1.
    pub fn from_mole_fractions(fractions: Vec<(Species, f64)>) -> FluidResult<Self> {
        if fractions.is_empty() {
            return Err(FluidError::Underspecified {
                what: "empty composition",
            });
        }

        let mut sum = 0.0;
        for (_, frac) in &fractions {
            if !frac.is_finite() {
                return Err(FluidError::NonPhysical {
                    what: "non-finite mole fraction",
                });
            }
            if *frac < 0.0 {
                return Err(FluidError::NonPhysical {
                    what: "negative mole fraction",
                });
            }
            sum += frac;
        }

        if sum <= 0.0 || !sum.is_finite() {
            return Err(FluidError::NonPhysical {
                what: "mole fractions sum to zero or non-finite",
            });
        }

        let mut normalized: Vec<(Species, f64)> = fractions
            .into_iter()
            .map(|(s, f)| (s, f / sum))
            .filter(|(_, f)| *f > 1e-15)
            .collect();

        if normalized.is_empty() {
            return Err(FluidError::NonPhysical {
                what: "all mole fractions negligible",
            });
        }

        // Merge duplicates and order canonically.
        normalized.sort_by(|a, b| a.0.cmp(&b.0));
        normalized.dedup_by(|next, kept| {
            if kept.0 == next.0 {
                kept.1 += next.1;
                true
            } else {
                false
            }
        });

        Ok(Self { items: normalized })
    }

    /// Create a composition from component names, failing fast on any name
    /// the backend database does not resolve.
    pub fn from_names(entries: &[(&str, f64)]) -> FluidResult<Self> {
        let mut fractions = Vec::with_capacity(entries.len());
        for (name, frac) in entries {
            let species: Species = name.parse().map_err(|_| FluidError::InvalidFluid {
                name: (*name).to_string(),
            })?;
            fractions.push((species, *frac));
        }
        Self::from_mole_fractions(fractions)
    }

    /// Get mole fraction of a species (0.0 if not present).
    pub fn mole_fraction(&self, species: Species) -> f64 {
        self.items
            .iter()
            .find(|(s, _)| *s == species)
            .map(|(_, f)| *f)
            .unwrap_or(0.0)
    }

    /// Returns `Some(species)` if exactly one species is present.
    pub fn single_species(&self) -> Option<Species> {
        if self.items.len() == 1 {
            let (species, frac) = self.items[0];
            let tol = Tolerances {
                abs: 1e-10,
                rel: 1e-10,
            };
            if nearly_equal(frac, 1.0, tol) {
                return Some(species);
            }
        }
        None
    }

    /// Iterate over all species with non-zero mole fractions.
    pub fn iter(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.items.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Mixture molar mass [kg/kmol]: M_mix = Σ x_i M_i.
    pub fn molar_mass(&self) -> f64 {
        self.items
            .iter()
            .map(|(species, mole_frac)| species.molar_mass() * mole_frac)
            .sum()
    }

    /// Specific gas constant [J/(kg K)] from the mixture molar mass.
    pub fn specific_gas_constant(&self) -> f64 {
        R_UNIVERSAL / (self.molar_mass() / 1000.0)
    }

    /// Tolerance-based comparison: same species set, fractions within `tol`.
    pub fn approx_eq(&self, other: &Self, tol: Tolerances) -> bool {
        if self.items.len() != other.items.len() {
            return false;
        }
        // Both sides are canonically ordered.
        self.items
            .iter()
            .zip(other.items.iter())
            .all(|((sa, fa), (sb, fb))| sa == sb && nearly_equal(*fa, *fb, tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: Tolerances = Tolerances {
        abs: 1e-10,
        rel: 1e-10,
    };

    #[test]
    fn pure_composition() {
        let comp = Composition::pure(Species::CO2);
        assert_eq!(comp.single_species(), Some(Species::CO2));
        assert_eq!(comp.mole_fraction(Species::CO2), 1.0);
        assert_eq!(comp.mole_fraction(Species::N2), 0.0);
    }

    #[test]
    fn mixture_normalization_non_unit_sum() {
        let comp =
            Composition::from_mole_fractions(vec![(Species::CH4, 2.0), (Species::Ethane, 8.0)])
                .unwrap();

        assert_eq!(comp.single_species(), None);
        assert!(nearly_equal(comp.mole_fraction(Species::CH4), 0.2, TOL));
        assert!(nearly_equal(comp.mole_fraction(Species::Ethane), 0.8, TOL));
    }

    #[test]
    fn percent_style_fractions_normalize() {
        // Compositions are often entered in percent.
        let comp = Composition::from_names(&[
            ("methane", 92.11),
            ("ethane", 4.94),
            ("propane", 1.71),
            ("n2", 0.4),
            ("co2", 0.22),
        ])
        .unwrap();
        let sum: f64 = comp.iter().map(|(_, f)| f).sum();
        assert!(nearly_equal(sum, 1.0, TOL));
    }

    #[test]
    fn unknown_component_fails_fast() {
        let err = Composition::from_names(&[("fake_name", 1.0)]).unwrap_err();
        assert!(matches!(err, FluidError::InvalidFluid { .. }));
        assert!(err.to_string().contains("fake_name"));
    }

    #[test]
    fn invalid_negative_fraction() {
        let result =
            Composition::from_mole_fractions(vec![(Species::O2, -0.5), (Species::N2, 1.5)]);
        assert!(result.is_err());
    }

    #[test]
    fn invalid_zero_sum() {
        let result =
            Composition::from_mole_fractions(vec![(Species::O2, 0.0), (Species::N2, 0.0)]);
        assert!(result.is_err());
    }

    #[test]
    fn duplicates_are_merged() {
        let comp = Composition::from_mole_fractions(vec![
            (Species::N2, 0.25),
            (Species::N2, 0.25),
            (Species::CO2, 0.5),
        ])
        .unwrap();
        assert_eq!(comp.len(), 2);
        assert!(nearly_equal(comp.mole_fraction(Species::N2), 0.5, TOL));
    }

    #[test]
    fn mixture_molar_mass() {
        let comp =
            Composition::from_mole_fractions(vec![(Species::CH4, 0.5), (Species::Ethane, 0.5)])
                .unwrap();
        assert!(nearly_equal(comp.molar_mass(), 23.0565, Tolerances {
            abs: 1e-3,
            rel: 1e-4,
        }));
        // R_spec = 8.314 / 0.0230565
        assert!((comp.specific_gas_constant() - 360.6).abs() < 1.0);
    }

    #[test]
    fn approx_eq_respects_ordering() {
        let a = Composition::from_names(&[("co2", 0.7), ("n2", 0.3)]).unwrap();
        let b = Composition::from_names(&[("n2", 0.3), ("co2", 0.7)]).unwrap();
        assert!(a.approx_eq(&b, TOL));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn normalized_sum_is_one(fracs in prop::collection::vec(0.0_f64..1.0_f64, 1..6)) {
            let species = [
                Species::CH4,
                Species::Ethane,
                Species::Propane,
                Species::N2,
                Species::CO2,
                Species::H2S,
            ];
            let input: Vec<(Species, f64)> = fracs
                .iter()
                .enumerate()
                .map(|(i, &f)| (species[i % species.len()], f))
                .collect();

            if let Ok(comp) = Composition::from_mole_fractions(input) {
                let sum: f64 = comp.iter().map(|(_, f)| f).sum();
                let tol = Tolerances { abs: 1e-9, rel: 1e-9 };
                prop_assert!(nearly_equal(sum, 1.0, tol));
            }
        }
    }
}
