//! Similarity (affinity) conversion of a point to new suction conditions.
//!
//! The flow coefficient, head coefficient, efficiency and volume ratio of
//! the original point are held invariant; Mach and Reynolds agreement is
//! checked against acceptance bands and reported as a warning when degraded,
//! never as a failure.

use crate::error::PerfResult;
use crate::point::{FlowSpec, Point, PointInput, PointMode};
use cf_fluids::State;
use tracing::warn;

/// Which quantity the conversion solves for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Find {
    /// Find the speed that reproduces the original coefficients at the new
    /// suction condition; flow follows from the flow coefficient.
    Speed,
    /// Keep the original speed and find the similar operating point at the
    /// new suction condition.
    Flow,
}

/// Similarity quality of a conversion.
///
/// All three are converted-relative-to-original measures. `reynolds_ratio`
/// is `None` when the backend has no transport model for the composition.
#[derive(Debug, Clone, Copy)]
pub struct ConversionDiagnostics {
    /// Tip Mach number difference, converted minus original.
    pub mach_diff: f64,
    /// Machine Reynolds number ratio, converted over original.
    pub reynolds_ratio: Option<f64>,
    /// Volume ratio of the converted point over the original's.
    pub volume_ratio_ratio: f64,
}

/// A converted point together with its similarity diagnostics.
#[derive(Debug, Clone)]
pub struct Converted {
    pub point: Point,
    pub diagnostics: ConversionDiagnostics,
}

/// Acceptance band for the Mach number difference, as a function of the
/// original point's Mach number (ASME PTC-10 figure 3.4).
pub fn mach_limits(mach: f64) -> (f64, f64) {
    let upper = -0.25 * mach + 0.286;
    if mach < 0.214 {
        (-mach, upper)
    } else if mach < 0.86 {
        (0.266 * mach - 0.271, upper)
    } else {
        (-0.042, 0.07)
    }
}

/// Acceptance band for the Reynolds ratio, as a function of the original
/// point's Reynolds number (ASME PTC-10 figure 3.5 shape).
pub fn reynolds_limits(reynolds: f64) -> (f64, f64) {
    let upper = 100.0_f64.powf((reynolds / 1e7).powf(0.3)).min(100.0);
    let lower = 0.01_f64.powf((reynolds / 1e6).powf(0.3)).max(0.01);
    (lower, upper)
}

impl Point {
    /// Convert `original` to a new suction condition.
    ///
    /// The converted point is a new instance; `original` is untouched. Band
    /// violations degrade the similarity assumption and are logged as
    /// warnings while the result is still returned.
    pub fn convert_from(original: &Point, suc: State, find: Find) -> PerfResult<Converted> {
        let mode = match find {
            Find::Speed => PointMode::Coefficients {
                phi: original.phi(),
                psi: original.psi(),
                eff: original.eff(),
                volume_ratio: original.volume_ratio(),
            },
            Find::Flow => PointMode::HeadEff {
                head: original.head(),
                eff: original.eff(),
                flow: FlowSpec::Volumetric(original.flow_v()),
                speed: original.speed(),
            },
        };
        let point = Point::resolve(PointInput {
            suc,
            mode,
            b: Some(original.b()),
            d: Some(original.d()),
            method: original.method(),
        })?;

        let diagnostics = diagnose(original, &point)?;
        Ok(Converted { point, diagnostics })
    }
}

fn diagnose(original: &Point, converted: &Point) -> PerfResult<ConversionDiagnostics> {
    let mach_orig = original.mach()?;
    let mach_diff = converted.mach()? - mach_orig;
    let (mach_lo, mach_hi) = mach_limits(mach_orig);
    if mach_diff < mach_lo || mach_diff > mach_hi {
        warn!(
            target: "cf_perf::convert",
            mach_diff, mach_lo, mach_hi,
            "Mach number difference outside the similarity acceptance band"
        );
    }

    let reynolds_ratio = match (original.reynolds(), converted.reynolds()) {
        (Ok(re_orig), Ok(re_conv)) => {
            let ratio = re_conv / re_orig;
            let (re_lo, re_hi) = reynolds_limits(re_orig);
            if ratio < re_lo || ratio > re_hi {
                warn!(
                    target: "cf_perf::convert",
                    ratio, re_lo, re_hi,
                    "Reynolds ratio outside the similarity acceptance band"
                );
            }
            Some(ratio)
        }
        _ => {
            warn!(
                target: "cf_perf::convert",
                "no transport model for this composition, Reynolds check skipped"
            );
            None
        }
    };

    let volume_ratio_ratio = converted.volume_ratio() / original.volume_ratio();
    if !(0.95..=1.05).contains(&volume_ratio_ratio) {
        warn!(
            target: "cf_perf::convert",
            volume_ratio_ratio,
            "volume ratio outside the similarity acceptance band"
        );
    }

    Ok(ConversionDiagnostics {
        mach_diff,
        reynolds_ratio,
        volume_ratio_ratio,
    })
}
