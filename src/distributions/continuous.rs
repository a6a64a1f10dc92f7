//! Continuous families other than the Von Mises.
//!
//! Densities are exactly `0.0` outside the support and `NaN` only for
//! invalid parameters. CDFs are exact `0.0`/`1.0` outside the support.

use std::f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2};

use crate::distributions::quantile::{match_quantiles, outside_support, validate_constraints};
use crate::distributions::{
    bounded_ppf, continuous_ppf_by_root, unpack, Distribution, Kind, Metadata, ParamSlot,
    QuantileFit, QuantileOptions,
};
use crate::error::Result;
use crate::special::{
    erf, erfinv, gamma_inc_lower, gamma_inc_upper, inverse_normal_cdf, ln_beta, ln_gamma,
    regularized_incomplete_beta, standard_normal_cdf, standard_normal_pdf,
};

const INF: f64 = f64::INFINITY;
const NEG_INF: f64 = f64::NEG_INFINITY;

fn positive(v: f64) -> bool {
    v > 0.0 && v.is_finite()
}

fn location_scale_valid(mu: f64, sigma: f64) -> bool {
    mu.is_finite() && positive(sigma)
}

/// Sets the lower end of a range to zero if it lies within a tenth of the
/// range's width from zero.
fn snap_to_zero((lo, hi): (f64, f64)) -> (f64, f64) {
    if lo < (hi - lo) / 10.0 {
        (0.0, hi)
    } else {
        (lo, hi)
    }
}

// ============================================================================
// Closed-Form Location-Scale Fits
// ============================================================================

/// `(μ, σ)` of the Normal whose `p[i]` quantiles are `x[i]`.
fn fit_normal(x: &[f64], p: &[f64]) -> [f64; 2] {
    let z1 = inverse_normal_cdf(p[0]);
    let z2 = inverse_normal_cdf(p[1]);
    let sigma = (x[1] - x[0]) / (z2 - z1);
    [x[1] - z2 * sigma, sigma]
}

/// `(μ, σ)` of the Cauchy whose `p[i]` quantiles are `x[i]`.
fn fit_cauchy(x: &[f64], p: &[f64]) -> [f64; 2] {
    let z1 = (PI * (p[0] - 0.5)).tan();
    let z2 = (PI * (p[1] - 0.5)).tan();
    let sigma = (x[1] - x[0]) / (z2 - z1);
    [x[0] - z1 * sigma, sigma]
}

fn fit_half_normal(x: f64, p: f64, mu: f64) -> f64 {
    (x - mu) / (SQRT_2 * erfinv(p))
}

fn fit_half_cauchy(x: f64, p: f64, mu: f64) -> f64 {
    (x - mu) / (0.5 * PI * p).tan()
}

// ============================================================================
// Standard Student-t
// ============================================================================

/// CDF of the standard Student-t with `ν` degrees of freedom.
///
/// With `ib = I_{ν/(ν+t²)}(ν/2, ½)` the CDF is `1 − ib/2` for `t ≥ 0` and
/// `ib/2` otherwise. `ν = ∞` is the standard normal.
fn student_t_cdf_std(t: f64, nu: f64) -> f64 {
    if nu == INF {
        return standard_normal_cdf(t);
    }
    let ib = regularized_incomplete_beta(nu / (nu + t * t), 0.5 * nu, 0.5);
    if t >= 0.0 {
        1.0 - 0.5 * ib
    } else {
        0.5 * ib
    }
}

fn student_t_ln_pdf_std(t: f64, nu: f64) -> f64 {
    if nu == INF {
        return standard_normal_pdf(t).ln();
    }
    ln_gamma(0.5 * (nu + 1.0)) - ln_gamma(0.5 * nu) - 0.5 * (PI * nu).ln()
        - 0.5 * (nu + 1.0) * (t * t / nu).ln_1p()
}

/// Inverse of [`student_t_cdf_std`]. Closed form at `ν = 1` (Cauchy) and
/// `ν = ∞` (Normal); otherwise a root solve on the upper half, reflected.
fn student_t_ppf_std(p: f64, nu: f64) -> f64 {
    if nu.is_nan() || nu <= 0.0 || p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return NEG_INF;
    }
    if p == 1.0 {
        return INF;
    }
    if nu == 1.0 {
        return (PI * (p - 0.5)).tan();
    }
    if nu == INF {
        return inverse_normal_cdf(p);
    }
    if p == 0.5 {
        return 0.0;
    }
    if p > 0.5 {
        continuous_ppf_by_root(|t| student_t_cdf_std(t, nu), p, 0.0)
    } else {
        -continuous_ppf_by_root(|t| student_t_cdf_std(t, nu), 1.0 - p, 0.0)
    }
}

// ============================================================================
// Beta
// ============================================================================

/// Beta distribution on `[0, 1]`.
///
/// # Mathematical Definition
/// - PDF: θ^(α−1) (1−θ)^(β−1) / B(α, β)
/// - CDF: I_θ(α, β)
///
/// The PPF has no closed form and is found by Brent's method on `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Beta;

static BETA: Metadata = Metadata {
    name: "Beta",
    var_name: "θ",
    kind: Kind::Continuous,
    params: &[ParamSlot::real("α", 0.0, INF), ParamSlot::real("β", 0.0, INF)],
    fixed: &[],
    location: None,
    hard_min: 0.0,
    hard_max: 1.0,
    parametrization: None,
};

/// Density at an endpoint where the shape exponent is `shape − 1`.
fn beta_endpoint(shape: f64, a: f64, b: f64) -> f64 {
    if shape == 1.0 {
        (-ln_beta(a, b)).exp()
    } else if shape > 1.0 {
        0.0
    } else {
        INF
    }
}

impl Distribution for Beta {
    fn metadata(&self) -> &'static Metadata {
        &BETA
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        1.0
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [a, b] = unpack(params);
        if x.is_nan() || !positive(a) || !positive(b) {
            return f64::NAN;
        }
        if !(0.0..=1.0).contains(&x) {
            return 0.0;
        }
        if x == 0.0 {
            return beta_endpoint(a, a, b);
        }
        if x == 1.0 {
            return beta_endpoint(b, a, b);
        }
        ((a - 1.0) * x.ln() + (b - 1.0) * (-x).ln_1p() - ln_beta(a, b)).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [a, b] = unpack(params);
        if x.is_nan() || !positive(a) || !positive(b) {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        regularized_incomplete_beta(x, a, b)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [a, b] = unpack(params);
        if !positive(a) || !positive(b) {
            return f64::NAN;
        }
        bounded_ppf(|x| self.cdf(x, params), p, 0.0, 1.0)
    }

    fn default_x_range(&self, _params: &[f64]) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&BETA, x, p, extra)?;
        Ok(match_quantiles(self, x, p, extra, &[1.0, 1.0], opts))
    }
}

// ============================================================================
// Cauchy
// ============================================================================

/// Cauchy distribution with location μ and scale σ.
///
/// # Mathematical Definition
/// - PDF: 1 / (πσ (1 + z²)), z = (y−μ)/σ
/// - CDF: ½ + atan(z)/π
/// - PPF: μ + σ tan(π(p − ½))
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cauchy;

static CAUCHY: Metadata = Metadata {
    name: "Cauchy",
    var_name: "y",
    kind: Kind::Continuous,
    params: &[
        ParamSlot::real("μ", NEG_INF, INF),
        ParamSlot::real("σ", 0.0, INF),
    ],
    fixed: &[],
    location: Some(0),
    hard_min: NEG_INF,
    hard_max: INF,
    parametrization: None,
};

impl Distribution for Cauchy {
    fn metadata(&self) -> &'static Metadata {
        &CAUCHY
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        NEG_INF
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        let z = (x - mu) / sigma;
        1.0 / (PI * sigma * (1.0 + z * z))
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        0.5 + ((x - mu) / sigma).atan() / PI
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        if p == 0.0 {
            NEG_INF
        } else if p == 1.0 {
            INF
        } else {
            mu + sigma * (PI * (p - 0.5)).tan()
        }
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (self.ppf(0.025, params), self.ppf(0.975, params))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&CAUCHY, x, p, extra)?;
        Ok(QuantileFit::closed_form(fit_cauchy(x, p).to_vec()))
    }
}

// ============================================================================
// Exponential
// ============================================================================

/// Exponential distribution with rate β.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exponential;

static EXPONENTIAL: Metadata = Metadata {
    name: "Exponential",
    var_name: "y",
    kind: Kind::Continuous,
    params: &[ParamSlot::real("β", 0.0, INF)],
    fixed: &[],
    location: None,
    hard_min: 0.0,
    hard_max: INF,
    parametrization: None,
};

impl Distribution for Exponential {
    fn metadata(&self) -> &'static Metadata {
        &EXPONENTIAL
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [beta] = unpack(params);
        if x.is_nan() || !positive(beta) {
            return f64::NAN;
        }
        if x < 0.0 {
            return 0.0;
        }
        beta * (-beta * x).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [beta] = unpack(params);
        if x.is_nan() || !positive(beta) {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        -(-beta * x).exp_m1()
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [beta] = unpack(params);
        if !positive(beta) {
            return f64::NAN;
        }
        -(-p).ln_1p() / beta
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (0.0, self.ppf(0.999, params))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&EXPONENTIAL, x, p, extra)?;
        Ok(QuantileFit::closed_form(vec![-(-p[0]).ln_1p() / x[0]]))
    }
}

// ============================================================================
// Gamma
// ============================================================================

/// Gamma distribution with shape α and rate β.
///
/// # Mathematical Definition
/// - PDF: β^α y^(α−1) e^(−βy) / Γ(α)
/// - CDF: P(α, βy), the regularized lower incomplete gamma function
///
/// The PPF is solved on the unit-rate distribution and rescaled by 1/β.
/// Quantile matching rescales `x` by `x[1]` before solving, so the
/// trust region always works at unit scale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gamma;

static GAMMA: Metadata = Metadata {
    name: "Gamma",
    var_name: "y",
    kind: Kind::Continuous,
    params: &[ParamSlot::real("α", 0.0, INF), ParamSlot::real("β", 0.0, INF)],
    fixed: &[],
    location: None,
    hard_min: 0.0,
    hard_max: INF,
    parametrization: None,
};

impl Distribution for Gamma {
    fn metadata(&self) -> &'static Metadata {
        &GAMMA
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [alpha, beta] = unpack(params);
        if x.is_nan() || !positive(alpha) || !positive(beta) {
            return f64::NAN;
        }
        if x < 0.0 || x == INF {
            return 0.0;
        }
        if x == 0.0 {
            return if alpha == 1.0 {
                beta
            } else if alpha > 1.0 {
                0.0
            } else {
                INF
            };
        }
        (alpha * beta.ln() + (alpha - 1.0) * x.ln() - beta * x - ln_gamma(alpha)).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [alpha, beta] = unpack(params);
        if x.is_nan() || !positive(alpha) || !positive(beta) {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        gamma_inc_lower(beta * x, alpha, true)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [alpha, beta] = unpack(params);
        if !positive(alpha) || !positive(beta) {
            return f64::NAN;
        }
        continuous_ppf_by_root(|y| gamma_inc_lower(y, alpha, true), p, 0.0) / beta
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        snap_to_zero((self.ppf(0.001, params), self.ppf(0.999, params)))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&GAMMA, x, p, extra)?;
        let scale = x[1];
        let rescaled = [x[0] / scale, 1.0];
        let seed = 0.75_f64.exp();
        let mut fit = match_quantiles(self, &rescaled, p, extra, &[seed, seed], opts);
        fit.params[1] /= scale;
        Ok(fit)
    }
}

// ============================================================================
// Half-Cauchy
// ============================================================================

/// Cauchy folded at its location μ, supported on `[μ, ∞)`.
///
/// # Mathematical Definition
/// - PDF: 2 / (πσ (1 + z²)), z = (y−μ)/σ
/// - CDF: 2 atan(z)/π
/// - PPF: μ + σ tan(πp/2)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalfCauchy;

static HALF_CAUCHY: Metadata = Metadata {
    name: "HalfCauchy",
    var_name: "y",
    kind: Kind::Continuous,
    params: &[
        ParamSlot::real("μ", NEG_INF, INF),
        ParamSlot::real("σ", 0.0, INF),
    ],
    fixed: &[0],
    location: Some(0),
    hard_min: NEG_INF,
    hard_max: INF,
    parametrization: None,
};

impl Distribution for HalfCauchy {
    fn metadata(&self) -> &'static Metadata {
        &HALF_CAUCHY
    }

    fn x_min(&self, params: &[f64]) -> f64 {
        params.first().copied().unwrap_or(f64::NAN)
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        if x < mu {
            return 0.0;
        }
        let z = (x - mu) / sigma;
        2.0 / (PI * sigma * (1.0 + z * z))
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        if x <= mu {
            return 0.0;
        }
        2.0 * ((x - mu) / sigma).atan() / PI
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        if p == 1.0 {
            return INF;
        }
        mu + sigma * (0.5 * PI * p).tan()
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (self.x_min(params), self.ppf(0.9, params))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&HALF_CAUCHY, x, p, extra)?;
        let mu = extra[0];
        if x[0] <= mu {
            return Err(outside_support(&HALF_CAUCHY, 0, x[0]));
        }
        let scale = fit_half_cauchy(x[0], p[0], mu);
        Ok(QuantileFit::closed_form(vec![mu, scale]))
    }
}

// ============================================================================
// Half-Normal
// ============================================================================

/// Normal folded at its location μ, supported on `[μ, ∞)`.
///
/// # Mathematical Definition
/// - PDF: 2φ(z)/σ, z = (y−μ)/σ
/// - CDF: erf(z/√2)
/// - PPF: μ + √2 σ erfinv(p)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalfNormal;

static HALF_NORMAL: Metadata = Metadata {
    name: "HalfNormal",
    ..HALF_CAUCHY
};

impl Distribution for HalfNormal {
    fn metadata(&self) -> &'static Metadata {
        &HALF_NORMAL
    }

    fn x_min(&self, params: &[f64]) -> f64 {
        params.first().copied().unwrap_or(f64::NAN)
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        if x < mu {
            return 0.0;
        }
        2.0 * standard_normal_pdf((x - mu) / sigma) / sigma
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        if x <= mu {
            return 0.0;
        }
        erf((x - mu) / sigma * FRAC_1_SQRT_2)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        mu + SQRT_2 * sigma * erfinv(p)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (self.x_min(params), self.ppf(0.999, params))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&HALF_NORMAL, x, p, extra)?;
        let mu = extra[0];
        if x[0] <= mu {
            return Err(outside_support(&HALF_NORMAL, 0, x[0]));
        }
        let scale = fit_half_normal(x[0], p[0], mu);
        Ok(QuantileFit::closed_form(vec![mu, scale]))
    }
}

// ============================================================================
// Half-Student-t
// ============================================================================

/// Student-t folded at its location μ, supported on `[μ, ∞)`.
///
/// # Mathematical Definition
/// - PDF: twice the Student-t density
/// - CDF: 1 − I_{ν/(z²+ν)}(ν/2, ½), z = (y−μ)/σ
/// - PPF: the Student-t PPF at `(1+p)/2`
///
/// ν and μ are fixed during quantile matching; σ is solved from one
/// quantile. ν = 1 and ν = ∞ use the Half-Cauchy and Half-Normal closed
/// forms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HalfStudentT;

static HALF_STUDENT_T: Metadata = Metadata {
    name: "HalfStudentT",
    var_name: "y",
    kind: Kind::Continuous,
    params: &[
        ParamSlot::real("ν", 0.0, INF),
        ParamSlot::real("μ", NEG_INF, INF),
        ParamSlot::real("σ", 0.0, INF),
    ],
    fixed: &[0, 1],
    location: Some(1),
    hard_min: NEG_INF,
    hard_max: INF,
    parametrization: None,
};

fn student_t_valid(nu: f64, mu: f64, sigma: f64) -> bool {
    nu > 0.0 && location_scale_valid(mu, sigma)
}

impl Distribution for HalfStudentT {
    fn metadata(&self) -> &'static Metadata {
        &HALF_STUDENT_T
    }

    fn x_min(&self, params: &[f64]) -> f64 {
        params.get(1).copied().unwrap_or(f64::NAN)
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [nu, mu, sigma] = unpack(params);
        if x.is_nan() || !student_t_valid(nu, mu, sigma) {
            return f64::NAN;
        }
        if x < mu || x == INF {
            return 0.0;
        }
        2.0 * student_t_ln_pdf_std((x - mu) / sigma, nu).exp() / sigma
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [nu, mu, sigma] = unpack(params);
        if x.is_nan() || !student_t_valid(nu, mu, sigma) {
            return f64::NAN;
        }
        if x <= mu {
            return 0.0;
        }
        let z = (x - mu) / sigma;
        if nu == INF {
            return erf(z * FRAC_1_SQRT_2);
        }
        1.0 - regularized_incomplete_beta(nu / (z * z + nu), 0.5 * nu, 0.5)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [nu, mu, sigma] = unpack(params);
        if !student_t_valid(nu, mu, sigma) {
            return f64::NAN;
        }
        if p == 0.0 {
            return mu;
        }
        mu + sigma * student_t_ppf_std(0.5 * (1.0 + p), nu)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (self.x_min(params), self.ppf(0.999, params))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&HALF_STUDENT_T, x, p, extra)?;
        let [nu, mu] = [extra[0], extra[1]];
        if x[0] <= mu {
            return Err(outside_support(&HALF_STUDENT_T, 0, x[0]));
        }
        if nu == 1.0 {
            let sigma = fit_half_cauchy(x[0], p[0], mu);
            return Ok(QuantileFit::closed_form(vec![nu, mu, sigma]));
        }
        if nu == INF {
            let sigma = fit_half_normal(x[0], p[0], mu);
            return Ok(QuantileFit::closed_form(vec![nu, mu, sigma]));
        }
        let seed = if nu < 3.0 {
            fit_half_cauchy(x[0], p[0], mu)
        } else {
            fit_half_normal(x[0], p[0], mu)
        };
        Ok(match_quantiles(self, x, p, extra, &[seed], opts))
    }
}

// ============================================================================
// Inverse-Gamma
// ============================================================================

/// Inverse-Gamma distribution: `1/Y` for `Y ~ Gamma(α, β)`.
///
/// # Mathematical Definition
/// - PDF: β^α y^(−α−1) e^(−β/y) / Γ(α)
/// - CDF: Q(α, β/y), the regularized upper incomplete gamma function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InverseGamma;

static INVERSE_GAMMA: Metadata = Metadata {
    name: "InverseGamma",
    ..GAMMA
};

impl Distribution for InverseGamma {
    fn metadata(&self) -> &'static Metadata {
        &INVERSE_GAMMA
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [alpha, beta] = unpack(params);
        if x.is_nan() || !positive(alpha) || !positive(beta) {
            return f64::NAN;
        }
        if x <= 0.0 || x == INF {
            return 0.0;
        }
        (alpha * beta.ln() - ln_gamma(alpha) - (alpha + 1.0) * x.ln() - beta / x).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [alpha, beta] = unpack(params);
        if x.is_nan() || !positive(alpha) || !positive(beta) {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        gamma_inc_upper(beta / x, alpha, true)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        1.0 / Gamma.ppf(1.0 - p, params)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        snap_to_zero((self.ppf(0.001, params), self.ppf(0.99, params)))
    }

    /// Fits Gamma to `(1/x[1], 1/x[0])` at `(1−p[1], 1−p[0])`.
    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&INVERSE_GAMMA, x, p, extra)?;
        let inverted = [1.0 / x[1], 1.0 / x[0]];
        let complement = [1.0 - p[1], 1.0 - p[0]];
        Gamma.quantile_set_with(&inverted, &complement, extra, opts)
    }
}

// ============================================================================
// Log-Normal
// ============================================================================

/// Log-Normal distribution: `ln Y ~ Normal(μ, σ)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogNormal;

static LOG_NORMAL: Metadata = Metadata {
    name: "LogNormal",
    var_name: "y",
    kind: Kind::Continuous,
    params: &[
        ParamSlot::real("μ", NEG_INF, INF),
        ParamSlot::real("σ", 0.0, INF),
    ],
    fixed: &[],
    location: None,
    hard_min: 0.0,
    hard_max: INF,
    parametrization: None,
};

impl Distribution for LogNormal {
    fn metadata(&self) -> &'static Metadata {
        &LOG_NORMAL
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        if x <= 0.0 || x == INF {
            return 0.0;
        }
        standard_normal_pdf((x.ln() - mu) / sigma) / (x * sigma)
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        standard_normal_cdf((x.ln() - mu) / sigma)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        (mu + sigma * inverse_normal_cdf(p)).exp()
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        snap_to_zero((self.ppf(0.001, params), self.ppf(0.99, params)))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&LOG_NORMAL, x, p, extra)?;
        let ln_x = [x[0].ln(), x[1].ln()];
        Ok(QuantileFit::closed_form(fit_normal(&ln_x, p).to_vec()))
    }
}

// ============================================================================
// Normal
// ============================================================================

/// Normal distribution with mean μ and standard deviation σ.
///
/// # Examples
/// ```
/// use u_probdist::distributions::{Distribution, Normal};
/// let fit = Normal.quantile_set(&[-1.0, 1.0], &[0.25, 0.75], &[]).unwrap();
/// assert!(fit.params[0].abs() < 1e-12);
/// assert!((Normal.cdf(1.0, &fit.params) - 0.75).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normal;

static NORMAL: Metadata = Metadata {
    name: "Normal",
    location: Some(0),
    hard_min: NEG_INF,
    ..LOG_NORMAL
};

impl Distribution for Normal {
    fn metadata(&self) -> &'static Metadata {
        &NORMAL
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        NEG_INF
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        standard_normal_pdf((x - mu) / sigma) / sigma
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if x.is_nan() || !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        standard_normal_cdf((x - mu) / sigma)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [mu, sigma] = unpack(params);
        if !location_scale_valid(mu, sigma) {
            return f64::NAN;
        }
        mu + sigma * inverse_normal_cdf(p)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (self.ppf(0.001, params), self.ppf(0.999, params))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&NORMAL, x, p, extra)?;
        Ok(QuantileFit::closed_form(fit_normal(x, p).to_vec()))
    }
}

// ============================================================================
// Pareto
// ============================================================================

/// Pareto distribution with minimum yₘᵢₙ and tail index α.
///
/// # Mathematical Definition
/// - PDF: α yₘᵢₙ^α / y^(α+1) for y ≥ yₘᵢₙ
/// - CDF: 1 − (yₘᵢₙ/y)^α
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pareto;

static PARETO: Metadata = Metadata {
    name: "Pareto",
    params: &[ParamSlot::real("yₘᵢₙ", 0.0, INF), ParamSlot::real("α", 0.0, INF)],
    ..GAMMA
};

impl Distribution for Pareto {
    fn metadata(&self) -> &'static Metadata {
        &PARETO
    }

    fn x_min(&self, params: &[f64]) -> f64 {
        params.first().copied().unwrap_or(f64::NAN)
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [y_min, alpha] = unpack(params);
        if x.is_nan() || !positive(y_min) || !positive(alpha) {
            return f64::NAN;
        }
        if x < y_min || x == INF {
            return 0.0;
        }
        (alpha.ln() + alpha * y_min.ln() - (alpha + 1.0) * x.ln()).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [y_min, alpha] = unpack(params);
        if x.is_nan() || !positive(y_min) || !positive(alpha) {
            return f64::NAN;
        }
        if x <= y_min {
            return 0.0;
        }
        -(alpha * (y_min / x).ln()).exp_m1()
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [y_min, alpha] = unpack(params);
        if !positive(y_min) || !positive(alpha) {
            return f64::NAN;
        }
        y_min * (-(-p).ln_1p() / alpha).exp()
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        let [y_min, alpha] = unpack(params);
        (y_min, (y_min.ln() - 0.01_f64.ln() / (1.0 + alpha)).exp())
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&PARETO, x, p, extra)?;
        let ln_q1 = (-p[0]).ln_1p();
        let ln_q2 = (-p[1]).ln_1p();
        let alpha = (ln_q1 - ln_q2) / (x[1].ln() - x[0].ln());
        let y_min = (ln_q2 / alpha + x[1].ln()).exp();
        Ok(QuantileFit::closed_form(vec![y_min, alpha]))
    }
}

// ============================================================================
// Student-t
// ============================================================================

/// Student-t distribution with ν degrees of freedom, location μ and
/// scale σ.
///
/// # Mathematical Definition
/// - PDF: Γ((ν+1)/2) / (Γ(ν/2) √(πν) σ) · (1 + z²/ν)^(−(ν+1)/2)
/// - CDF: with ib = I_{ν/(ν+z²)}(ν/2, ½), `1 − ib/2` for z ≥ 0, else `ib/2`
///
/// ν = ∞ is the Normal and ν = 1 the Cauchy. ν is fixed during quantile
/// matching: a symmetric family cannot meet three arbitrary quantiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentT;

static STUDENT_T: Metadata = Metadata {
    name: "StudentT",
    fixed: &[0],
    ..HALF_STUDENT_T
};

impl Distribution for StudentT {
    fn metadata(&self) -> &'static Metadata {
        &STUDENT_T
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        NEG_INF
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [nu, mu, sigma] = unpack(params);
        if x.is_nan() || !student_t_valid(nu, mu, sigma) {
            return f64::NAN;
        }
        if x.is_infinite() {
            return 0.0;
        }
        student_t_ln_pdf_std((x - mu) / sigma, nu).exp() / sigma
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [nu, mu, sigma] = unpack(params);
        if x.is_nan() || !student_t_valid(nu, mu, sigma) {
            return f64::NAN;
        }
        student_t_cdf_std((x - mu) / sigma, nu)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [nu, mu, sigma] = unpack(params);
        if !student_t_valid(nu, mu, sigma) {
            return f64::NAN;
        }
        mu + sigma * student_t_ppf_std(p, nu)
    }

    /// Wider probability bounds for heavier tails.
    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        let [nu, _, _] = unpack(params);
        let (p1, p2) = if nu < 2.0 {
            (0.05, 0.95)
        } else if nu < 4.0 {
            (0.01, 0.99)
        } else if nu < 10.0 {
            (0.005, 0.995)
        } else {
            (0.001, 0.999)
        };
        (self.ppf(p1, params), self.ppf(p2, params))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&STUDENT_T, x, p, extra)?;
        let nu = extra[0];
        if nu == 1.0 || nu == INF {
            let [mu, sigma] = if nu == 1.0 {
                fit_cauchy(x, p)
            } else {
                fit_normal(x, p)
            };
            return Ok(QuantileFit::closed_form(vec![nu, mu, sigma]));
        }
        let seed = if nu < 3.0 {
            fit_cauchy(x, p)
        } else {
            fit_normal(x, p)
        };
        Ok(match_quantiles(self, x, p, extra, &seed, opts))
    }
}

// ============================================================================
// Uniform
// ============================================================================

/// Continuous uniform distribution on `[α, β]`.
///
/// Every value is `NaN` unless `α < β`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Uniform;

static UNIFORM: Metadata = Metadata {
    name: "Uniform",
    var_name: "y",
    kind: Kind::Continuous,
    params: &[
        ParamSlot::real("α", NEG_INF, INF),
        ParamSlot::real("β", NEG_INF, INF),
    ],
    fixed: &[],
    location: None,
    hard_min: NEG_INF,
    hard_max: INF,
    parametrization: None,
};

fn uniform_bounds(params: &[f64]) -> Option<(f64, f64)> {
    let [alpha, beta] = unpack(params);
    (alpha.is_finite() && beta.is_finite() && alpha < beta).then_some((alpha, beta))
}

impl Distribution for Uniform {
    fn metadata(&self) -> &'static Metadata {
        &UNIFORM
    }

    fn x_min(&self, params: &[f64]) -> f64 {
        uniform_bounds(params).map_or(f64::NAN, |(alpha, _)| alpha)
    }

    fn x_max(&self, params: &[f64]) -> f64 {
        uniform_bounds(params).map_or(f64::NAN, |(_, beta)| beta)
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let Some((alpha, beta)) = uniform_bounds(params) else {
            return f64::NAN;
        };
        if x.is_nan() {
            f64::NAN
        } else if x < alpha || x > beta {
            0.0
        } else {
            1.0 / (beta - alpha)
        }
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let Some((alpha, beta)) = uniform_bounds(params) else {
            return f64::NAN;
        };
        if x.is_nan() {
            return f64::NAN;
        }
        ((x - alpha) / (beta - alpha)).clamp(0.0, 1.0)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let Some((alpha, beta)) = uniform_bounds(params) else {
            return f64::NAN;
        };
        alpha + p * (beta - alpha)
    }

    /// The support padded by 10% on each side, or `(0, 1)` if `β ≤ α`.
    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        match uniform_bounds(params) {
            Some((alpha, beta)) => {
                let pad = 0.1 * (beta - alpha);
                (alpha - pad, beta + pad)
            }
            None => (0.0, 1.0),
        }
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&UNIFORM, x, p, extra)?;
        let dp = p[1] - p[0];
        let alpha = (p[1] * x[0] - p[0] * x[1]) / dp;
        let beta = alpha + (x[1] - x[0]) / dp;
        Ok(QuantileFit::closed_form(vec![alpha, beta]))
    }
}

// ============================================================================
// Weibull
// ============================================================================

/// Weibull distribution with shape α and scale σ.
///
/// # Mathematical Definition
/// - PDF: (α/σ) (y/σ)^(α−1) e^(−(y/σ)^α)
/// - CDF: 1 − e^(−(y/σ)^α)
/// - PPF: σ (−ln(1−p))^(1/α)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Weibull;

static WEIBULL: Metadata = Metadata {
    name: "Weibull",
    params: &[ParamSlot::real("α", 0.0, INF), ParamSlot::real("σ", 0.0, INF)],
    ..GAMMA
};

impl Distribution for Weibull {
    fn metadata(&self) -> &'static Metadata {
        &WEIBULL
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [alpha, sigma] = unpack(params);
        if x.is_nan() || !positive(alpha) || !positive(sigma) {
            return f64::NAN;
        }
        if x < 0.0 || x == INF {
            return 0.0;
        }
        if x == 0.0 {
            return if alpha == 1.0 {
                1.0 / sigma
            } else if alpha > 1.0 {
                0.0
            } else {
                INF
            };
        }
        let y = x / sigma;
        (alpha / sigma) * y.powf(alpha - 1.0) * (-y.powf(alpha)).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [alpha, sigma] = unpack(params);
        if x.is_nan() || !positive(alpha) || !positive(sigma) {
            return f64::NAN;
        }
        if x <= 0.0 {
            return 0.0;
        }
        -(-(x / sigma).powf(alpha)).exp_m1()
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [alpha, sigma] = unpack(params);
        if !positive(alpha) || !positive(sigma) {
            return f64::NAN;
        }
        sigma * (-(-p).ln_1p()).powf(1.0 / alpha)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        snap_to_zero((self.ppf(0.001, params), self.ppf(0.999, params)))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&WEIBULL, x, p, extra)?;
        let ll1 = (-(-p[0]).ln_1p()).ln();
        let ll2 = (-(-p[1]).ln_1p()).ln();
        let alpha = (ll2 - ll1) / (x[1].ln() - x[0].ln());
        let sigma = (x[1].ln() - ll2 / alpha).exp();
        Ok(QuantileFit::closed_form(vec![alpha, sigma]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::quantile::quantile_residuals;
    use crate::distributions::FitRegime;
    use crate::error::DistributionError;
    use crate::linalg::norm;
    use approx::assert_relative_eq;

    #[test]
    fn test_beta_values() {
        let params = [2.0, 3.0];
        assert_relative_eq!(Beta.cdf(0.4, &params), 0.5248, max_relative = 1e-12);
        assert_relative_eq!(Beta.density(0.4, &params), 1.728, max_relative = 1e-12);
        assert_eq!(Beta.density(1.5, &params), 0.0);
        assert_eq!(Beta.density(0.0, &params), 0.0);
        assert_eq!(Beta.density(0.0, &[0.5, 0.5]), INF);
        assert_relative_eq!(Beta.density(0.0, &[1.0, 3.0]), 3.0, max_relative = 1e-12);
        assert!(Beta.density(0.5, &[-1.0, 2.0]).is_nan());
        assert_relative_eq!(Beta.ppf(0.5248, &params), 0.4, epsilon = 1e-10);
    }

    #[test]
    fn test_beta_quantile_set() {
        let truth = [2.0, 5.0];
        let x = [Beta.ppf(0.1, &truth), Beta.ppf(0.9, &truth)];
        let fit = Beta.quantile_set(&x, &[0.1, 0.9], &[]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[0], 2.0, max_relative = 1e-5);
        assert_relative_eq!(fit.params[1], 5.0, max_relative = 1e-5);
    }

    #[test]
    fn test_cauchy() {
        let params = [1.0, 2.0];
        assert_relative_eq!(Cauchy.cdf(3.0, &params), 0.75, epsilon = 1e-15);
        assert_eq!(Cauchy.ppf(0.0, &params), NEG_INF);
        assert_eq!(Cauchy.ppf(1.0, &params), INF);
        assert_relative_eq!(Cauchy.ppf(0.75, &params), 3.0, max_relative = 1e-14);
        let fit = Cauchy.quantile_set(&[-1.0, 3.0], &[0.25, 0.75], &[]).unwrap();
        assert_eq!(fit.regime, FitRegime::ClosedForm);
        assert_relative_eq!(fit.params[0], 1.0, epsilon = 1e-14);
        assert_relative_eq!(fit.params[1], 2.0, max_relative = 1e-14);
    }

    #[test]
    fn test_exponential_median_fit() {
        let fit = Exponential.quantile_set(&[1.0], &[0.5], &[]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[0], std::f64::consts::LN_2, max_relative = 1e-15);
        assert_eq!(Exponential.density(-1.0, &[2.0]), 0.0);
        assert_eq!(Exponential.cdf(-1.0, &[2.0]), 0.0);
        assert_eq!(Exponential.ppf(1.0, &[2.0]), INF);
    }

    #[test]
    fn test_gamma_values() {
        let params = [3.0, 2.0];
        assert_relative_eq!(
            Gamma.cdf(1.5, &params),
            0.576_809_918_873_156_5,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            Gamma.ppf(0.5, &params),
            1.337_030_156_861_780_2,
            max_relative = 1e-9
        );
        assert_eq!(Gamma.density(0.0, &[1.0, 2.0]), 2.0);
        assert_eq!(Gamma.density(0.0, &[0.5, 2.0]), INF);
        assert_eq!(Gamma.density(INF, &params), 0.0);
    }

    #[test]
    fn test_gamma_quantile_set_rescales() {
        let truth = [3.0, 0.01];
        let x = [Gamma.ppf(0.05, &truth), Gamma.ppf(0.95, &truth)];
        let fit = Gamma.quantile_set(&x, &[0.05, 0.95], &[]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[0], 3.0, max_relative = 1e-5);
        assert_relative_eq!(fit.params[1], 0.01, max_relative = 1e-5);
    }

    #[test]
    fn test_gamma_default_range_snaps_to_zero() {
        let (lo, hi) = Gamma.default_x_range(&[1.0, 1.0]);
        assert_eq!(lo, 0.0);
        assert!(hi > 6.0);
        let (lo, _) = Gamma.default_x_range(&[400.0, 1.0]);
        assert!(lo > 300.0);
    }

    #[test]
    fn test_half_cauchy_and_half_normal() {
        let params = [1.0, 2.0];
        assert_relative_eq!(HalfCauchy.cdf(3.0, &params), 0.5, epsilon = 1e-15);
        assert_eq!(HalfCauchy.density(0.5, &params), 0.0);
        assert_eq!(HalfCauchy.ppf(1.0, &params), INF);
        assert_relative_eq!(
            HalfNormal.cdf(1.0 + 2.0 * 1.959_963_984_540_054, &params),
            0.95,
            max_relative = 1e-12
        );

        let fit = HalfCauchy.quantile_set(&[3.0], &[0.5], &[1.0]).unwrap();
        assert_eq!(fit.params[0], 1.0);
        assert_relative_eq!(fit.params[1], 2.0, max_relative = 1e-14);
        let fit = HalfNormal.quantile_set(&[4.0], &[0.7], &[1.0]).unwrap();
        assert_relative_eq!(HalfNormal.cdf(4.0, &fit.params), 0.7, max_relative = 1e-12);
    }

    #[test]
    fn test_half_quantile_below_location_rejected() {
        assert!(matches!(
            HalfNormal.quantile_set(&[0.5], &[0.5], &[1.0]),
            Err(DistributionError::OutsideSupport { index: 0, .. })
        ));
        assert!(matches!(
            HalfStudentT.quantile_set(&[1.0], &[0.5], &[3.0, 1.0]),
            Err(DistributionError::OutsideSupport { .. })
        ));
    }

    #[test]
    fn test_half_student_t() {
        let params = [3.0, 0.0, 1.0];
        assert_relative_eq!(
            HalfStudentT.cdf(1.0, &params),
            0.608_997_781_044_229_4,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            HalfStudentT.ppf(0.608_997_781_044_229_4, &params),
            1.0,
            max_relative = 1e-7
        );
        assert_eq!(HalfStudentT.ppf(0.0, &[3.0, 2.0, 1.0]), 2.0);

        let truth = [3.0, 0.5, 2.0];
        let x = [HalfStudentT.ppf(0.6, &truth)];
        let fit = HalfStudentT.quantile_set(&x, &[0.6], &[3.0, 0.5]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[2], 2.0, max_relative = 1e-6);
    }

    #[test]
    fn test_half_student_t_limits_delegate() {
        let fit = HalfStudentT.quantile_set(&[3.0], &[0.5], &[1.0, 1.0]).unwrap();
        assert_eq!(fit.regime, FitRegime::ClosedForm);
        assert_relative_eq!(fit.params[2], 2.0, max_relative = 1e-14);
        let fit = HalfStudentT.quantile_set(&[3.0], &[0.5], &[INF, 1.0]).unwrap();
        assert_eq!(fit.regime, FitRegime::ClosedForm);
        assert_relative_eq!(
            HalfNormal.cdf(3.0, &fit.params[1..]),
            0.5,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_inverse_gamma() {
        let params = [3.0, 2.0];
        assert_relative_eq!(
            InverseGamma.cdf(1.0, &params),
            0.676_676_416_183_063_5,
            max_relative = 1e-12
        );
        assert_eq!(InverseGamma.density(0.0, &params), 0.0);
        let x = [InverseGamma.ppf(0.2, &params), InverseGamma.ppf(0.8, &params)];
        let fit = InverseGamma.quantile_set(&x, &[0.2, 0.8], &[]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[0], 3.0, max_relative = 1e-5);
        assert_relative_eq!(fit.params[1], 2.0, max_relative = 1e-5);
    }

    #[test]
    fn test_log_normal_and_normal_fits() {
        let fit = LogNormal.quantile_set(&[1.0, 10.0], &[0.5, 0.9], &[]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[0], 0.0, epsilon = 1e-14);
        let r = quantile_residuals(&LogNormal, &fit.params, &[1.0, 10.0], &[0.5, 0.9]);
        assert!(norm(&r) < 1e-12);

        let fit = Normal.quantile_set(&[1.0, 5.0], &[0.1, 0.6], &[]).unwrap();
        let r = quantile_residuals(&Normal, &fit.params, &[1.0, 5.0], &[0.1, 0.6]);
        assert!(norm(&r) < 1e-12);
    }

    #[test]
    fn test_pareto() {
        let params = [2.0, 3.0];
        assert_eq!(Pareto.density(1.0, &params), 0.0);
        assert_relative_eq!(Pareto.cdf(4.0, &params), 0.875, max_relative = 1e-14);
        assert_relative_eq!(Pareto.ppf(0.875, &params), 4.0, max_relative = 1e-13);
        let (lo, hi) = Pareto.default_x_range(&params);
        assert_eq!(lo, 2.0);
        assert!(hi > lo);
        let fit = Pareto.quantile_set(&[3.0, 4.0], &[0.2, 0.875], &[]).unwrap();
        let r = quantile_residuals(&Pareto, &fit.params, &[3.0, 4.0], &[0.2, 0.875]);
        assert!(norm(&r) < 1e-12);
    }

    #[test]
    fn test_student_t_values() {
        let std = [5.0, 0.0, 1.0];
        assert_relative_eq!(
            StudentT.cdf(1.0, &std),
            0.818_391_266_175_438_7,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            StudentT.density(0.0, &std),
            0.379_606_689_822_494_4,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            StudentT.ppf(0.9, &[5.0, 1.0, 2.0]),
            3.951_768_097_648_962,
            max_relative = 1e-8
        );
        assert_relative_eq!(
            StudentT.cdf(0.7, &[INF, 0.0, 1.0]),
            standard_normal_cdf(0.7),
            max_relative = 1e-15
        );
        assert_relative_eq!(
            StudentT.ppf(0.75, &[1.0, 0.0, 1.0]),
            1.0,
            max_relative = 1e-14
        );
    }

    #[test]
    fn test_student_t_default_range_by_tail_weight() {
        let cases = [(1.5, 0.05), (3.0, 0.01), (5.0, 0.005), (30.0, 0.001)];
        for (nu, p1) in cases {
            let params = [nu, 0.0, 1.0];
            let (lo, hi) = StudentT.default_x_range(&params);
            assert_relative_eq!(lo, StudentT.ppf(p1, &params), max_relative = 1e-12);
            assert_relative_eq!(hi, -lo, max_relative = 1e-6);
        }
    }

    #[test]
    fn test_student_t_limits_delegate() {
        let fit = StudentT.quantile_set(&[-1.0, 3.0], &[0.25, 0.75], &[1.0]).unwrap();
        assert_eq!(fit.regime, FitRegime::ClosedForm);
        assert_relative_eq!(fit.params[1], 1.0, epsilon = 1e-14);
        assert_relative_eq!(fit.params[2], 2.0, max_relative = 1e-14);
        let fit = StudentT.quantile_set(&[-1.0, 3.0], &[0.25, 0.75], &[INF]).unwrap();
        assert_eq!(fit.regime, FitRegime::ClosedForm);
        assert_eq!(fit.params[0], INF);
    }

    #[test]
    fn test_student_t_heavy_tail_seeded_from_cauchy() {
        let truth = [2.0, -1.0, 0.5];
        let x = [StudentT.ppf(0.05, &truth), StudentT.ppf(0.7, &truth)];
        let fit = StudentT.quantile_set(&x, &[0.05, 0.7], &[2.0]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[1], -1.0, max_relative = 1e-5);
        assert_relative_eq!(fit.params[2], 0.5, max_relative = 1e-5);
    }

    #[test]
    fn test_uniform() {
        let fit = Uniform.quantile_set(&[1.0, 2.0], &[0.25, 0.75], &[]).unwrap();
        assert_eq!(fit.regime, FitRegime::ClosedForm);
        assert_relative_eq!(fit.params[0], 0.5, epsilon = 1e-15);
        assert_relative_eq!(fit.params[1], 2.5, epsilon = 1e-15);
        assert_relative_eq!(Uniform.cdf(1.0, &fit.params), 0.25, epsilon = 1e-15);

        assert!(Uniform.density(0.5, &[1.0, 1.0]).is_nan());
        assert_eq!(Uniform.density(5.0, &[0.0, 4.0]), 0.0);
        assert_eq!(Uniform.default_x_range(&[2.0, 1.0]), (0.0, 1.0));
        let (lo, hi) = Uniform.default_x_range(&[0.0, 10.0]);
        assert_relative_eq!(lo, -1.0);
        assert_relative_eq!(hi, 11.0);
    }

    #[test]
    fn test_weibull() {
        let params = [2.0, 3.0];
        let x = 3.0 * std::f64::consts::LN_2.sqrt();
        assert_relative_eq!(Weibull.cdf(x, &params), 0.5, max_relative = 1e-14);
        assert_relative_eq!(Weibull.ppf(0.5, &params), x, max_relative = 1e-14);
        assert_eq!(Weibull.density(0.0, &params), 0.0);
        assert_relative_eq!(Weibull.density(0.0, &[1.0, 4.0]), 0.25);
        let fit = Weibull.quantile_set(&[1.0, 4.0], &[0.2, 0.9], &[]).unwrap();
        let r = quantile_residuals(&Weibull, &fit.params, &[1.0, 4.0], &[0.2, 0.9]);
        assert!(norm(&r) < 1e-12);
    }

    #[test]
    fn test_invalid_params_give_nan() {
        assert!(Normal.density(0.0, &[0.0, 0.0]).is_nan());
        assert!(Normal.cdf(0.0, &[0.0, -1.0]).is_nan());
        assert!(Gamma.ppf(0.5, &[-1.0, 1.0]).is_nan());
        assert!(StudentT.cdf(0.0, &[0.0, 0.0, 1.0]).is_nan());
        assert!(Pareto.ppf(0.5, &[0.0, 1.0]).is_nan());
    }
}
