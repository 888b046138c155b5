//! cf-perf: centrifugal compressor performance on real-gas states.
//!
//! Provides:
//! - Polytropic and isentropic head/efficiency calculations (Schultz,
//!   Mallen-Saville and base formulations)
//! - `Point`: one operating condition, closed from a discharge state, a
//!   head/efficiency pair, or dimensionless coefficients
//! - Similarity conversion of points to new suction conditions, with Mach,
//!   Reynolds and volume-ratio acceptance checks
//! - `Curve` and `Impeller`: performance maps interpolated over flow and
//!   speed
//! - Single-section leakage balance (balance line and seal gas streams)
//! - Serializable snapshots for round-trip persistence
//!
//! States come from `cf-fluids`; this crate only consumes the `EosModel`
//! seam and never talks to a property backend directly.

pub mod convert;
pub mod curve;
pub mod error;
pub mod impeller;
pub mod point;
pub mod polytropic;
pub mod section;
pub mod snapshot;

mod solve;

pub use convert::{ConversionDiagnostics, Converted, Find, mach_limits, reynolds_limits};
pub use curve::{Curve, Interpolated};
pub use error::{PerfError, PerfResult};
pub use impeller::Impeller;
pub use point::{FlowSpec, Point, PointInput, PointMode};
pub use polytropic::PolytropicMethod;
pub use section::{RotorFlowModel, SectionPoint, SectionStreams, StraightThrough};
pub use snapshot::{ImpellerSnapshot, PointSnapshot, StateSnapshot};
