//! Quantile matching.
//!
//! Given `k` constraints `(x[i], p[i])` and the values of any fixed slots,
//! solve for the `k` free parameters such that `CDF(x[i]; θ) = p[i]`.
//!
//! Families with an analytic inverse solve directly. The rest go through
//! [`match_quantiles`]: a trust-region solve on unconstrained coordinates
//! (see [`Transform`]), followed by an optional untransformed refinement
//! that is kept only when it strictly improves the residual.

use crate::distributions::{Distribution, Metadata, ParamSlot};
use crate::error::{DistributionError, Result};
use crate::linalg::norm;
use crate::roots::{find_root_trust_region, TrustRegionOptions};

/// Relative margin that keeps seeds off the edge of a logistic range.
const LOGISTIC_EDGE: f64 = 1e-12;

/// Options for quantile matching.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantileOptions {
    /// Options for both trust-region passes.
    pub trust_region: TrustRegionOptions,
    /// Run the untransformed refinement pass after a successful first pass.
    pub refine: bool,
    /// Residual tolerance of the refinement pass.
    pub refine_tol: f64,
}

impl Default for QuantileOptions {
    fn default() -> Self {
        Self {
            trust_region: TrustRegionOptions::default(),
            refine: true,
            refine_tol: 1e-12,
        }
    }
}

/// Which procedure produced a [`QuantileFit`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitRegime {
    /// Analytic inverse of the CDF.
    ClosedForm,
    /// Trust region on transformed coordinates; refinement absent or
    /// rejected.
    TrustRegion,
    /// Untransformed refinement accepted.
    Refined,
    /// Negative-Binomial constraints met only by its Poisson limit with
    /// this rate.
    PoissonLimit { rate: f64 },
}

/// Result of quantile matching.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuantileFit {
    /// Complete parameter vector, fixed slots included.
    pub params: Vec<f64>,
    /// True if the constraints are met within solver tolerance.
    pub success: bool,
    pub regime: FitRegime,
}

impl QuantileFit {
    /// A closed-form fit. Succeeds if every parameter is finite.
    pub(crate) fn closed_form(params: Vec<f64>) -> Self {
        let success = params.iter().all(|v| v.is_finite());
        Self {
            params,
            success,
            regime: FitRegime::ClosedForm,
        }
    }
}

// ============================================================================
// Validation
// ============================================================================

/// Checks a constraint set against a distribution's metadata.
///
/// Checks run in this order, and the first failure is returned:
/// constraint count, `x`/`p` lengths, fixed-value count, fixed-value
/// ranges, `0 < p < 1`, strictly increasing `p`, strictly increasing `x`,
/// every `x` strictly inside the hard support.
pub fn validate_constraints(meta: &Metadata, x: &[f64], p: &[f64], extra: &[f64]) -> Result<()> {
    let n_free = meta.n_free();
    if x.len() != n_free {
        return Err(DistributionError::ConstraintCount {
            name: meta.name,
            expected: n_free,
            got: x.len(),
        });
    }
    if p.len() != x.len() {
        return Err(DistributionError::LengthMismatch {
            x_len: x.len(),
            p_len: p.len(),
        });
    }
    if extra.len() != meta.fixed.len() {
        return Err(DistributionError::ExtraParamCount {
            name: meta.name,
            expected: meta.fixed.len(),
            got: extra.len(),
        });
    }
    for (&slot_index, &value) in meta.fixed.iter().zip(extra) {
        check_slot(meta.name, &meta.params[slot_index], value)?;
    }
    for (index, &value) in p.iter().enumerate() {
        if !(value > 0.0 && value < 1.0) {
            return Err(DistributionError::ProbabilityOutOfRange { index, value });
        }
    }
    if p.windows(2).any(|w| w[0] >= w[1]) {
        return Err(DistributionError::UnorderedProbabilities);
    }
    if x.iter().any(|v| v.is_nan()) || x.windows(2).any(|w| w[0] >= w[1]) {
        return Err(DistributionError::UnorderedValues);
    }
    for (index, &value) in x.iter().enumerate() {
        if !(value > meta.hard_min && value < meta.hard_max) {
            return Err(DistributionError::OutsideSupport {
                name: meta.name,
                index,
                value,
            });
        }
    }
    Ok(())
}

fn check_slot(name: &'static str, slot: &ParamSlot, value: f64) -> Result<()> {
    if !slot.contains(value) {
        return Err(DistributionError::ParamOutOfRange {
            name,
            slot: slot.name,
            value,
            min: slot.min,
            max: slot.max,
        });
    }
    if slot.integer && value.is_finite() && value.fract() != 0.0 {
        return Err(DistributionError::ParamNotInteger {
            name,
            slot: slot.name,
            value,
        });
    }
    Ok(())
}

/// Rejects `x[index]` as outside the support of `meta`.
pub(crate) fn outside_support(meta: &Metadata, index: usize, value: f64) -> DistributionError {
    DistributionError::OutsideSupport {
        name: meta.name,
        index,
        value,
    }
}

// ============================================================================
// Transforms
// ============================================================================

/// Map from a parameter slot's range to the whole real line.
///
/// `forward` sends an admissible parameter value to an unconstrained
/// coordinate; `inverse` maps any real back inside the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Unbounded slot: `v = u`.
    Identity,
    /// `[min, ∞)`: `v = min + eᵘ`.
    Log { min: f64 },
    /// `(−∞, max]`: `v = max − eᵘ`.
    NegLog { max: f64 },
    /// `[min, max]`: `v = min + (max − min)/(1 + e⁻ᵘ)`.
    Logistic { min: f64, max: f64 },
}

impl Transform {
    /// Transform chosen from the finiteness of a slot's bounds.
    ///
    /// Bounded periodic locations (Von Mises μ) fall under `Logistic`.
    pub fn for_slot(slot: &ParamSlot) -> Self {
        match (slot.min.is_finite(), slot.max.is_finite()) {
            (true, true) => Transform::Logistic {
                min: slot.min,
                max: slot.max,
            },
            (true, false) => Transform::Log { min: slot.min },
            (false, true) => Transform::NegLog { max: slot.max },
            (false, false) => Transform::Identity,
        }
    }

    /// Parameter value to unconstrained coordinate. Values on or beyond a
    /// bound are pulled just inside it.
    pub fn forward(self, v: f64) -> f64 {
        match self {
            Transform::Identity => v,
            Transform::Log { min } => (v - min).max(f64::MIN_POSITIVE).ln(),
            Transform::NegLog { max } => (max - v).max(f64::MIN_POSITIVE).ln(),
            Transform::Logistic { min, max } => {
                let width = max - min;
                let t = ((v - min) / width).clamp(LOGISTIC_EDGE, 1.0 - LOGISTIC_EDGE);
                (t / (1.0 - t)).ln()
            }
        }
    }

    /// Unconstrained coordinate to parameter value.
    pub fn inverse(self, u: f64) -> f64 {
        match self {
            Transform::Identity => u,
            Transform::Log { min } => min + u.exp(),
            Transform::NegLog { max } => max - u.exp(),
            Transform::Logistic { min, max } => min + (max - min) / (1.0 + (-u).exp()),
        }
    }

    /// True if `v` is strictly inside the range this transform covers.
    fn admits(self, v: f64) -> bool {
        match self {
            Transform::Identity => v.is_finite(),
            Transform::Log { min } => v > min && v.is_finite(),
            Transform::NegLog { max } => v < max && v.is_finite(),
            Transform::Logistic { min, max } => v > min && v < max,
        }
    }
}

// ============================================================================
// Matching Engine
// ============================================================================

/// Residuals `CDF(x[i]; θ) − p[i]`.
pub fn quantile_residuals<D: Distribution + ?Sized>(
    dist: &D,
    params: &[f64],
    x: &[f64],
    p: &[f64],
) -> Vec<f64> {
    x.iter()
        .zip(p)
        .map(|(&xi, &pi)| dist.cdf(xi, params) - pi)
        .collect()
}

/// Solves for the free slots of `dist` from a seed.
///
/// `seed` holds one value per free slot, in slot order; `extra` holds the
/// fixed slots. Inputs are assumed validated.
///
/// The first pass runs the trust region on coordinates given by
/// [`Transform::for_slot`]. When it succeeds and `opts.refine` is set, a
/// second pass runs on the raw parameters from the first-pass solution.
/// The second pass uses the tighter `opts.refine_tol` and is accepted only
/// if it succeeds, every free value stays strictly inside its slot range,
/// and the residual norm strictly drops.
pub fn match_quantiles<D: Distribution + ?Sized>(
    dist: &D,
    x: &[f64],
    p: &[f64],
    extra: &[f64],
    seed: &[f64],
    opts: &QuantileOptions,
) -> QuantileFit {
    let meta = dist.metadata();
    let free: Vec<usize> = meta.free_slots().collect();
    let transforms: Vec<Transform> = free
        .iter()
        .map(|&i| Transform::for_slot(&meta.params[i]))
        .collect();

    let mut template = vec![f64::NAN; meta.params.len()];
    for (&slot_index, &value) in meta.fixed.iter().zip(extra) {
        template[slot_index] = value;
    }
    let assemble = |free_values: &[f64]| {
        let mut full = template.clone();
        for (&i, &v) in free.iter().zip(free_values) {
            full[i] = v;
        }
        full
    };

    let u0: Vec<f64> = transforms
        .iter()
        .zip(seed)
        .map(|(t, &v)| t.forward(v))
        .collect();
    let transformed = |u: &[f64]| {
        let values: Vec<f64> = transforms.iter().zip(u).map(|(t, &ui)| t.inverse(ui)).collect();
        quantile_residuals(dist, &assemble(&values), x, p)
    };
    let first = find_root_trust_region(transformed, &u0, &opts.trust_region);
    let first_values: Vec<f64> = transforms
        .iter()
        .zip(&first.x)
        .map(|(t, &ui)| t.inverse(ui))
        .collect();

    if !first.success {
        trace_debug!(
            name = meta.name,
            iterations = first.iterations,
            residual = first.residual_norm(),
            "quantile match: transformed pass failed"
        );
        return QuantileFit {
            params: assemble(&first_values),
            success: false,
            regime: FitRegime::TrustRegion,
        };
    }
    if !opts.refine {
        return QuantileFit {
            params: assemble(&first_values),
            success: true,
            regime: FitRegime::TrustRegion,
        };
    }

    let raw = |values: &[f64]| quantile_residuals(dist, &assemble(values), x, p);
    let first_norm = norm(&raw(&first_values));
    let refine_opts = TrustRegionOptions {
        tol: opts.refine_tol,
        ..opts.trust_region
    };
    let second = find_root_trust_region(raw, &first_values, &refine_opts);
    let in_range = transforms.iter().zip(&second.x).all(|(t, &v)| t.admits(v));
    let second_norm = second.residual_norm();

    if second.success && in_range && second_norm < first_norm {
        QuantileFit {
            params: assemble(&second.x),
            success: true,
            regime: FitRegime::Refined,
        }
    } else {
        trace_debug!(
            name = meta.name,
            first_norm,
            second_norm,
            in_range,
            "quantile match: refinement rejected"
        );
        QuantileFit {
            params: assemble(&first_values),
            success: true,
            regime: FitRegime::TrustRegion,
        }
    }
}
