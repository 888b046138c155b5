//! Bracketed bisection used by point closure solvers.

use crate::error::{PerfError, PerfResult};
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub(crate) struct SolverConfig {
    /// Relative residual tolerance (scaled by the caller-supplied scale).
    pub rel_tol: f64,
    pub max_iter: usize,
    pub max_expand: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            rel_tol: 1e-6,
            max_iter: 80,
            max_expand: 40,
        }
    }
}

/// Finds a root of `f` inside `[lo, hi]`, growing the upper bound
/// geometrically until the residual changes sign.
///
/// `scale` sets the magnitude against which residuals are judged (e.g. the
/// target head for a head residual). Fails with `PerfError::Convergence`
/// when the bracket cannot be established or the cap is reached; no partial
/// value is ever returned.
pub(crate) fn bisect_root(
    mut f: impl FnMut(f64) -> PerfResult<f64>,
    mut lo: f64,
    mut hi: f64,
    scale: f64,
    cfg: &SolverConfig,
    what: &'static str,
) -> PerfResult<f64> {
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(PerfError::InvalidInput {
            what: "solver bracket must be finite and ordered",
        });
    }
    let tol = cfg.rel_tol * scale.abs().max(f64::MIN_POSITIVE);

    let mut r_lo = f(lo)?;
    if r_lo.abs() <= tol {
        return Ok(lo);
    }
    let mut r_hi = f(hi)?;

    let mut expansions = 0;
    while r_hi.signum() == r_lo.signum() {
        expansions += 1;
        if expansions > cfg.max_expand {
            return Err(PerfError::Convergence {
                what,
                iterations: expansions,
            });
        }
        hi += hi - lo;
        r_hi = f(hi)?;
    }
    if r_hi.abs() <= tol {
        return Ok(hi);
    }

    for iter in 0..cfg.max_iter {
        let mid = 0.5 * (lo + hi);
        let r_mid = f(mid)?;
        debug!(target: "cf_perf::solve", what, iter, mid, r_mid, "bisection step");

        if r_mid.abs() <= tol || (hi - lo) <= 1e-9 * mid.abs() {
            return Ok(mid);
        }

        if r_mid.signum() == r_lo.signum() {
            lo = mid;
            r_lo = r_mid;
        } else {
            hi = mid;
        }
    }

    Err(PerfError::Convergence {
        what,
        iterations: cfg.max_iter,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_simple_root() {
        let cfg = SolverConfig::default();
        let root = bisect_root(|x| Ok(x * x - 2.0), 0.0, 1.0, 1.0, &cfg, "sqrt2").unwrap();
        assert!((root - 2.0_f64.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn expands_upper_bound() {
        let cfg = SolverConfig::default();
        // Root at 100, initial bracket far too small.
        let root = bisect_root(|x| Ok(x - 100.0), 0.0, 1.0, 100.0, &cfg, "linear").unwrap();
        assert!((root - 100.0).abs() < 1e-3);
    }

    #[test]
    fn handles_decreasing_residuals() {
        let cfg = SolverConfig::default();
        let root = bisect_root(|x| Ok(5.0 - x), 0.0, 20.0, 5.0, &cfg, "decreasing").unwrap();
        assert!((root - 5.0).abs() < 1e-4);
    }

    #[test]
    fn reports_convergence_failure() {
        let cfg = SolverConfig {
            rel_tol: 1e-12,
            max_iter: 2,
            max_expand: 2,
        };
        // Residual never changes sign.
        let err = bisect_root(|_| Ok(1.0), 0.0, 1.0, 1.0, &cfg, "no root").unwrap_err();
        assert!(matches!(err, PerfError::Convergence { .. }));
    }
}
