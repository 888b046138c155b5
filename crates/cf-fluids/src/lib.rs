//! cf-fluids: real-gas thermodynamic states for compressor performance work.
//!
//! Provides:
//! - Chemical species definitions (process gases, inerts, refrigerants)
//! - Composition handling (pure fluids and mixtures, normalized internally)
//! - `State`: composition + canonical (p, T), derived properties on demand
//! - `EosModel` trait for equation-of-state backends
//! - CoolProp backend (pure fluids and custom mixtures)
//!
//! # Architecture
//!
//! The `EosModel` trait isolates the rest of the workspace from backend
//! dependencies. CoolProp (via `rfluids`) is the primary backend; the seam
//! leaves room for other equations of state later.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cf_fluids::{Composition, CoolPropModel, State, StateInput};
//! use cf_core::units::{pa, kelvin};
//!
//! let model = Arc::new(CoolPropModel::new());
//! let comp = Composition::from_names(&[("Methane", 1.0)]).unwrap();
//! let input = StateInput::PT {
//!     p: pa(100_000.0),
//!     t: kelvin(300.0),
//! };
//!
//! let state = State::define(model, input, comp).unwrap();
//! println!("Density: {} kg/m³", state.rho().unwrap().value);
//! ```

pub mod composition;
pub mod coolprop;
pub mod error;
pub mod model;
pub mod species;
pub mod state;

// Re-exports for ergonomics
pub use composition::Composition;
pub use coolprop::CoolPropModel;
pub use error::{FluidError, FluidResult};
pub use model::{EosModel, PropertySet, SpecEnthalpy, SpecEntropy, SpecHeatCapacity, StateInput};
pub use species::Species;
pub use state::State;
