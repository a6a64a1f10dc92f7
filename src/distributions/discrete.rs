//! Discrete families other than the Negative-Binomial.
//!
//! Mass functions return `NaN` at non-integers, outside the support and
//! for invalid parameters. Families with a closed-form CDF (Binomial,
//! Discrete-Uniform, Geometric, Poisson) override the summed CDF; the rest
//! go through [`discrete_cdf`]. Binomial and Poisson invert their CDF with
//! [`discrete_ppf_by_cdf`]; the summed families also sum to invert.

use crate::distributions::quantile::{match_quantiles, outside_support, validate_constraints};
use crate::distributions::{
    discrete_cdf, discrete_ppf, discrete_ppf_by_cdf, is_integer, normal_seed, unpack,
    Distribution, Kind, Metadata, ParamSlot, QuantileFit, QuantileOptions, DEFAULT_MAX_STEPS,
    DEFAULT_MAX_TERMS, PPF_CLOSE_RTOL,
};
use crate::error::{DistributionError, Result};
use crate::special::{
    gamma_inc_upper, ln_beta, ln_choose, ln_factorial, regularized_incomplete_beta,
};

const INF: f64 = f64::INFINITY;

/// `x` as a count if it is a non-negative whole number.
fn as_count(x: f64) -> Option<u64> {
    if is_integer(x) && x >= 0.0 {
        Some(x as u64)
    } else {
        None
    }
}

fn unsupported(meta: &Metadata) -> DistributionError {
    DistributionError::Unsupported { name: meta.name }
}

// ============================================================================
// Bernoulli
// ============================================================================

/// Bernoulli distribution on `{0, 1}` with success probability θ.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bernoulli;

static BERNOULLI: Metadata = Metadata {
    name: "Bernoulli",
    var_name: "y",
    kind: Kind::Discrete,
    params: &[ParamSlot::real("θ", 0.0, 1.0)],
    fixed: &[],
    location: None,
    hard_min: 0.0,
    hard_max: 1.0,
    parametrization: None,
};

impl Distribution for Bernoulli {
    fn metadata(&self) -> &'static Metadata {
        &BERNOULLI
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        1.0
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [theta] = unpack(params);
        if !(0.0..=1.0).contains(&theta) {
            return f64::NAN;
        }
        if x == 0.0 {
            1.0 - theta
        } else if x == 1.0 {
            theta
        } else {
            f64::NAN
        }
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [theta] = unpack(params);
        if x.is_nan() || !(0.0..=1.0).contains(&theta) {
            return f64::NAN;
        }
        if x < 0.0 {
            0.0
        } else if x < 1.0 {
            1.0 - theta
        } else {
            1.0
        }
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [theta] = unpack(params);
        if p.is_nan() || !(0.0..=1.0).contains(&theta) {
            return f64::NAN;
        }
        if p == 1.0 {
            return self.ppf_terminal(params);
        }
        if p <= 1.0 - theta {
            0.0
        } else {
            1.0
        }
    }

    fn default_x_range(&self, _params: &[f64]) -> (f64, f64) {
        (-0.2, 1.2)
    }

    fn quantile_set_with(
        &self,
        _x: &[f64],
        _p: &[f64],
        _extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        Err(unsupported(&BERNOULLI))
    }
}

// ============================================================================
// Beta-Binomial
// ============================================================================

/// Beta-Binomial distribution: Binomial(N, θ) with θ ~ Beta(α, β).
///
/// # Mathematical Definition
/// - PMF: C(N, n) B(n+α, N−n+β) / B(α, β), n ∈ {0, …, N}
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BetaBinomial;

static BETA_BINOMIAL: Metadata = Metadata {
    name: "BetaBinomial",
    var_name: "n",
    kind: Kind::Discrete,
    params: &[
        ParamSlot::integer("N", 0.0, INF),
        ParamSlot::real("α", 0.0, INF),
        ParamSlot::real("β", 0.0, INF),
    ],
    fixed: &[0],
    location: None,
    hard_min: 0.0,
    hard_max: INF,
    parametrization: None,
};

impl Distribution for BetaBinomial {
    fn metadata(&self) -> &'static Metadata {
        &BETA_BINOMIAL
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, params: &[f64]) -> f64 {
        params.first().copied().unwrap_or(f64::NAN)
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [n_trials, alpha, beta] = unpack(params);
        let (Some(big_n), Some(n)) = (as_count(n_trials), as_count(x)) else {
            return f64::NAN;
        };
        if n > big_n || !(alpha > 0.0 && beta > 0.0) {
            return f64::NAN;
        }
        let k = n as f64;
        (ln_choose(big_n, n) + ln_beta(k + alpha, n_trials - k + beta) - ln_beta(alpha, beta)).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        discrete_cdf(self, x, params, DEFAULT_MAX_TERMS)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        discrete_ppf(self, p, params, DEFAULT_MAX_TERMS)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (-1.0, self.x_max(params) + 1.0)
    }

    fn quantile_set_with(
        &self,
        _x: &[f64],
        _p: &[f64],
        _extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        Err(unsupported(&BETA_BINOMIAL))
    }
}

// ============================================================================
// Binomial
// ============================================================================

/// Binomial distribution: successes in N trials with probability θ.
///
/// # Mathematical Definition
/// - PMF: C(N, n) θⁿ (1−θ)^(N−n)
/// - CDF: I₁₋θ(N−k, k+1) with k = ⌊x⌋
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Binomial;

static BINOMIAL: Metadata = Metadata {
    name: "Binomial",
    var_name: "n",
    kind: Kind::Discrete,
    params: &[ParamSlot::integer("N", 0.0, INF), ParamSlot::real("θ", 0.0, 1.0)],
    fixed: &[0],
    location: None,
    hard_min: 0.0,
    hard_max: INF,
    parametrization: None,
};

impl Distribution for Binomial {
    fn metadata(&self) -> &'static Metadata {
        &BINOMIAL
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, params: &[f64]) -> f64 {
        params.first().copied().unwrap_or(f64::NAN)
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [n_trials, theta] = unpack(params);
        let (Some(big_n), Some(n)) = (as_count(n_trials), as_count(x)) else {
            return f64::NAN;
        };
        if n > big_n || !(0.0..=1.0).contains(&theta) {
            return f64::NAN;
        }
        if theta == 0.0 {
            return if n == 0 { 1.0 } else { 0.0 };
        }
        if theta == 1.0 {
            return if n == big_n { 1.0 } else { 0.0 };
        }
        let k = n as f64;
        (ln_choose(big_n, n) + k * theta.ln() + (n_trials - k) * (-theta).ln_1p()).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [n_trials, theta] = unpack(params);
        if x.is_nan() || as_count(n_trials).is_none() || !(0.0..=1.0).contains(&theta) {
            return f64::NAN;
        }
        if x < 0.0 {
            return 0.0;
        }
        if x >= n_trials {
            return 1.0;
        }
        let k = x.floor();
        if theta == 0.0 {
            return 1.0;
        }
        if theta == 1.0 {
            return 0.0;
        }
        regularized_incomplete_beta(1.0 - theta, n_trials - k, k + 1.0)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [n_trials, theta] = unpack(params);
        let seed = normal_seed(n_trials * theta, n_trials * theta * (1.0 - theta), p);
        discrete_ppf_by_cdf(self, p, params, seed, DEFAULT_MAX_STEPS)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        let [n_trials, _] = unpack(params);
        if n_trials < 50.0 {
            (-1.0, n_trials + 1.0)
        } else {
            (self.ppf(0.001, params), self.ppf(0.999, params))
        }
    }

    /// Solves for θ given one quantile and N. Requires `x < N`.
    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&BINOMIAL, x, p, extra)?;
        let n_trials = extra[0];
        if x[0] >= n_trials {
            return Err(outside_support(&BINOMIAL, 0, x[0]));
        }
        let seed = (x[0].floor() + 0.5) / (n_trials + 1.0);
        Ok(match_quantiles(self, x, p, extra, &[seed], opts))
    }
}

// ============================================================================
// Categorical
// ============================================================================

/// Categorical distribution on `{1, 2, 3, 4}` with θ₄ = 1 − θ₁ − θ₂ − θ₃.
///
/// All values are `NaN` when θ₁ + θ₂ + θ₃ exceeds 1.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Categorical;

static CATEGORICAL: Metadata = Metadata {
    name: "Categorical",
    var_name: "y",
    kind: Kind::Discrete,
    params: &[
        ParamSlot::real("θ1", 0.0, 1.0),
        ParamSlot::real("θ2", 0.0, 1.0),
        ParamSlot::real("θ3", 0.0, 1.0),
    ],
    fixed: &[],
    location: None,
    hard_min: 1.0,
    hard_max: 4.0,
    parametrization: None,
};

impl Categorical {
    /// The four category probabilities, or `None` if they are not a valid
    /// probability vector.
    fn probabilities(params: &[f64]) -> Option<[f64; 4]> {
        let [t1, t2, t3] = unpack(params);
        let t4 = 1.0 - t1 - t2 - t3;
        let probs = [t1, t2, t3, t4];
        if probs.iter().all(|&t| t >= 0.0) {
            Some(probs)
        } else {
            None
        }
    }
}

impl Distribution for Categorical {
    fn metadata(&self) -> &'static Metadata {
        &CATEGORICAL
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        1.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        4.0
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let Some(probs) = Self::probabilities(params) else {
            return f64::NAN;
        };
        match as_count(x) {
            Some(c @ 1..=4) => probs[(c - 1) as usize],
            _ => f64::NAN,
        }
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        if Self::probabilities(params).is_none() {
            return f64::NAN;
        }
        discrete_cdf(self, x, params, DEFAULT_MAX_TERMS)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        if Self::probabilities(params).is_none() {
            return f64::NAN;
        }
        discrete_ppf(self, p, params, DEFAULT_MAX_TERMS)
    }

    fn default_x_range(&self, _params: &[f64]) -> (f64, f64) {
        (-0.25, 4.25)
    }

    fn quantile_set_with(
        &self,
        _x: &[f64],
        _p: &[f64],
        _extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        Err(unsupported(&CATEGORICAL))
    }
}

// ============================================================================
// Discrete Uniform
// ============================================================================

/// Uniform distribution on the integers `low..=high`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscreteUniform;

static DISCRETE_UNIFORM: Metadata = Metadata {
    name: "DiscreteUniform",
    var_name: "y",
    kind: Kind::Discrete,
    params: &[
        ParamSlot::integer("low", f64::NEG_INFINITY, INF),
        ParamSlot::integer("high", f64::NEG_INFINITY, INF),
    ],
    fixed: &[],
    location: None,
    hard_min: f64::NEG_INFINITY,
    hard_max: INF,
    parametrization: None,
};

fn discrete_uniform_bounds(params: &[f64]) -> Option<(f64, f64)> {
    let [low, high] = unpack(params);
    if is_integer(low) && is_integer(high) && low <= high {
        Some((low, high))
    } else {
        None
    }
}

impl Distribution for DiscreteUniform {
    fn metadata(&self) -> &'static Metadata {
        &DISCRETE_UNIFORM
    }

    fn x_min(&self, params: &[f64]) -> f64 {
        params.first().copied().unwrap_or(f64::NAN)
    }

    fn x_max(&self, params: &[f64]) -> f64 {
        params.get(1).copied().unwrap_or(f64::NAN)
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        match discrete_uniform_bounds(params) {
            Some((low, high)) if is_integer(x) && x >= low && x <= high => {
                1.0 / (high - low + 1.0)
            }
            _ => f64::NAN,
        }
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let Some((low, high)) = discrete_uniform_bounds(params) else {
            return f64::NAN;
        };
        if x.is_nan() {
            return f64::NAN;
        }
        if x < low {
            return 0.0;
        }
        if x >= high {
            return 1.0;
        }
        (x.floor() - low + 1.0) / (high - low + 1.0)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let Some((low, high)) = discrete_uniform_bounds(params) else {
            return f64::NAN;
        };
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return f64::NAN;
        }
        if p == 0.0 {
            return low;
        }
        let t = p * (high - low + 1.0);
        let steps = if (t - t.round()).abs() <= PPF_CLOSE_RTOL * t {
            t.round()
        } else {
            t.ceil()
        };
        (low + steps - 1.0).clamp(low, high)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        let [low, high] = unpack(params);
        (low - 1.0, high + 1.0)
    }

    fn quantile_set_with(
        &self,
        _x: &[f64],
        _p: &[f64],
        _extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        Err(unsupported(&DISCRETE_UNIFORM))
    }
}

// ============================================================================
// Geometric
// ============================================================================

/// Geometric distribution: failures before the first success.
///
/// # Mathematical Definition
/// - PMF: θ (1−θ)ʸ, y ∈ {0, 1, …}
/// - CDF: 1 − (1−θ)^(⌊y⌋+1)
/// - PPF: ⌈ln(1−p)/ln(1−θ) − 1⌉
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometric;

static GEOMETRIC: Metadata = Metadata {
    name: "Geometric",
    var_name: "y",
    kind: Kind::Discrete,
    params: &[ParamSlot::real("θ", 0.0, 1.0)],
    fixed: &[],
    location: None,
    hard_min: 0.0,
    hard_max: INF,
    parametrization: None,
};

impl Distribution for Geometric {
    fn metadata(&self) -> &'static Metadata {
        &GEOMETRIC
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [theta] = unpack(params);
        if as_count(x).is_none() || !(0.0..=1.0).contains(&theta) {
            return f64::NAN;
        }
        if theta == 1.0 {
            return if x == 0.0 { 1.0 } else { 0.0 };
        }
        if theta == 0.0 {
            return 0.0;
        }
        (x * (-theta).ln_1p() + theta.ln()).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [theta] = unpack(params);
        if x.is_nan() || !(0.0..=1.0).contains(&theta) {
            return f64::NAN;
        }
        if x < 0.0 {
            return 0.0;
        }
        if x == INF {
            return 1.0;
        }
        -((x.floor() + 1.0) * (-theta).ln_1p()).exp_m1()
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [theta] = unpack(params);
        if p.is_nan() || !(0.0..=1.0).contains(&theta) {
            return f64::NAN;
        }
        if p == 0.0 {
            return 0.0;
        }
        if p == 1.0 {
            return INF;
        }
        let k = ((-p).ln_1p() / (-theta).ln_1p() - 1.0).ceil().max(0.0);
        // Rounding in the log ratio can overshoot by one.
        if k > 0.0 && self.cdf(k - 1.0, params) >= p {
            k - 1.0
        } else {
            k
        }
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (-1.0, self.ppf(0.999, params))
    }

    /// θ = 1 − (1−p)^(1/(y+1)).
    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&GEOMETRIC, x, p, extra)?;
        let y = x[0].floor();
        let theta = -((-p[0]).ln_1p() / (y + 1.0)).exp_m1();
        Ok(QuantileFit::closed_form(vec![theta]))
    }
}

// ============================================================================
// Hypergeometric
// ============================================================================

/// Hypergeometric distribution: `n` of `N` draws without replacement land
/// in the `a` marked items of an urn holding `a + b`.
///
/// Support is `max(0, N−b) ..= min(N, a)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hypergeometric;

static HYPERGEOMETRIC: Metadata = Metadata {
    name: "Hypergeometric",
    var_name: "n",
    kind: Kind::Discrete,
    params: &[
        ParamSlot::integer("N", 0.0, INF),
        ParamSlot::integer("a", 0.0, INF),
        ParamSlot::integer("b", 0.0, INF),
    ],
    fixed: &[0],
    location: None,
    hard_min: 0.0,
    hard_max: INF,
    parametrization: None,
};

fn hypergeometric_counts(params: &[f64]) -> Option<(u64, u64, u64)> {
    let [n, a, b] = unpack(params);
    let (n, a, b) = (as_count(n)?, as_count(a)?, as_count(b)?);
    if n <= a + b {
        Some((n, a, b))
    } else {
        None
    }
}

impl Distribution for Hypergeometric {
    fn metadata(&self) -> &'static Metadata {
        &HYPERGEOMETRIC
    }

    fn x_min(&self, params: &[f64]) -> f64 {
        let [n, _, b] = unpack(params);
        (n - b).max(0.0)
    }

    fn x_max(&self, params: &[f64]) -> f64 {
        let [n, a, _] = unpack(params);
        n.min(a)
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let (Some((n, a, b)), Some(k)) = (hypergeometric_counts(params), as_count(x)) else {
            return f64::NAN;
        };
        if k < n.saturating_sub(b) || k > n.min(a) {
            return f64::NAN;
        }
        (ln_choose(a, k) + ln_choose(b, n - k) - ln_choose(a + b, n)).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        if hypergeometric_counts(params).is_none() {
            return f64::NAN;
        }
        discrete_cdf(self, x, params, DEFAULT_MAX_TERMS)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        if hypergeometric_counts(params).is_none() {
            return f64::NAN;
        }
        discrete_ppf(self, p, params, DEFAULT_MAX_TERMS)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (self.x_min(params) - 1.0, self.x_max(params) + 1.0)
    }

    fn quantile_set_with(
        &self,
        _x: &[f64],
        _p: &[f64],
        _extra: &[f64],
        _opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        Err(unsupported(&HYPERGEOMETRIC))
    }
}

// ============================================================================
// Poisson
// ============================================================================

/// Poisson distribution with rate λ.
///
/// # Mathematical Definition
/// - PMF: λⁿ e^(−λ) / n!
/// - CDF: Q(⌊x⌋+1, λ), the regularized upper incomplete gamma function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Poisson;

static POISSON: Metadata = Metadata {
    name: "Poisson",
    var_name: "n",
    kind: Kind::Discrete,
    params: &[ParamSlot::real("λ", 0.0, INF)],
    fixed: &[],
    location: None,
    hard_min: 0.0,
    hard_max: INF,
    parametrization: None,
};

impl Poisson {
    /// Solves `CDF(x[0]; λ) = p[0]` for λ on already-validated input.
    pub(crate) fn fit_rate(x: &[f64], p: &[f64], opts: &QuantileOptions) -> QuantileFit {
        let seed = x[0].floor() + 0.5;
        match_quantiles(&Poisson, &x[..1], &p[..1], &[], &[seed], opts)
    }
}

impl Distribution for Poisson {
    fn metadata(&self) -> &'static Metadata {
        &POISSON
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        let [lambda] = unpack(params);
        let Some(n) = as_count(x) else {
            return f64::NAN;
        };
        if lambda.is_nan() || lambda < 0.0 {
            return f64::NAN;
        }
        if lambda == 0.0 {
            return if n == 0 { 1.0 } else { 0.0 };
        }
        (x * lambda.ln() - ln_factorial(n) - lambda).exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        let [lambda] = unpack(params);
        if x.is_nan() || lambda.is_nan() || lambda < 0.0 {
            return f64::NAN;
        }
        if x < 0.0 {
            return 0.0;
        }
        if lambda == 0.0 || x == INF {
            return 1.0;
        }
        gamma_inc_upper(lambda, x.floor() + 1.0, true)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        let [lambda] = unpack(params);
        discrete_ppf_by_cdf(
            self,
            p,
            params,
            normal_seed(lambda, lambda, p),
            DEFAULT_MAX_STEPS,
        )
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (self.ppf(0.001, params), self.ppf(0.999, params))
    }

    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(&POISSON, x, p, extra)?;
        Ok(Self::fit_rate(x, p, opts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::FitRegime;
    use approx::assert_relative_eq;

    fn pmf_total<D: Distribution>(dist: &D, params: &[f64], upto: u32) -> f64 {
        (0..=upto)
            .map(|k| dist.density(f64::from(k), params))
            .filter(|m| !m.is_nan())
            .sum()
    }

    #[test]
    fn test_bernoulli() {
        let params = [0.3];
        assert_relative_eq!(Bernoulli.density(0.0, &params), 0.7);
        assert_relative_eq!(Bernoulli.density(1.0, &params), 0.3);
        assert!(Bernoulli.density(0.5, &params).is_nan());
        assert!(Bernoulli.density(2.0, &params).is_nan());
        assert_eq!(Bernoulli.ppf(0.7, &params), 0.0);
        assert_eq!(Bernoulli.ppf(0.71, &params), 1.0);
        assert_eq!(Bernoulli.ppf(0.0, &params), 0.0);
        assert_eq!(Bernoulli.ppf(1.0, &params), 1.0);
        assert!(matches!(
            Bernoulli.quantile_set(&[0.5], &[0.5], &[]),
            Err(DistributionError::Unsupported { name: "Bernoulli" })
        ));
    }

    #[test]
    fn test_beta_binomial_values() {
        let params = [12.0, 2.0, 3.0];
        assert_relative_eq!(
            BetaBinomial.density(4.0, &params),
            0.12362637362637363,
            max_relative = 1e-10
        );
        assert_relative_eq!(
            BetaBinomial.cdf(4.0, &params),
            0.489010989010989,
            max_relative = 1e-10
        );
        assert_relative_eq!(pmf_total(&BetaBinomial, &params, 12), 1.0, epsilon = 1e-12);
        assert!(BetaBinomial.density(13.0, &params).is_nan());
        assert_eq!(BetaBinomial.ppf(1.0, &params), 12.0);
        assert_eq!(BetaBinomial.default_x_range(&params), (-1.0, 13.0));
    }

    #[test]
    fn test_binomial_values() {
        let params = [10.0, 0.3];
        assert_relative_eq!(
            Binomial.density(3.0, &params),
            0.266827932,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            Binomial.cdf(3.0, &params),
            0.6496107184,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            Binomial.cdf(3.7, &params),
            0.6496107184,
            max_relative = 1e-9
        );
        assert_eq!(Binomial.cdf(-0.5, &params), 0.0);
        assert_eq!(Binomial.cdf(10.0, &params), 1.0);
        assert!(Binomial.density(-1.0, &params).is_nan());
        assert!(Binomial.density(2.5, &params).is_nan());
        assert_eq!(Binomial.ppf(0.6496107184, &params), 3.0);
        assert_eq!(Binomial.ppf(0.65, &params), 4.0);
    }

    #[test]
    fn test_binomial_closed_form_cdf_matches_sum() {
        let params = [37.0, 0.62];
        for k in 0..37 {
            let x = f64::from(k);
            assert_relative_eq!(
                Binomial.cdf(x, &params),
                discrete_cdf(&Binomial, x, &params, DEFAULT_MAX_TERMS),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_binomial_degenerate_theta() {
        assert_eq!(Binomial.density(0.0, &[5.0, 0.0]), 1.0);
        assert_eq!(Binomial.density(5.0, &[5.0, 1.0]), 1.0);
        assert_eq!(Binomial.density(4.0, &[5.0, 1.0]), 0.0);
        assert_eq!(Binomial.cdf(4.0, &[5.0, 1.0]), 0.0);
    }

    #[test]
    fn test_binomial_default_range() {
        assert_eq!(Binomial.default_x_range(&[20.0, 0.5]), (-1.0, 21.0));
        let (lo, hi) = Binomial.default_x_range(&[1000.0, 0.5]);
        assert!(lo > 400.0 && hi < 600.0, "({lo}, {hi})");
    }

    #[test]
    fn test_binomial_ppf_with_median_past_summation_budget() {
        let params = [1e6, 0.5];
        let k = Binomial.ppf(0.5, &params);
        assert_eq!(k, 500_000.0);
        assert!(Binomial.cdf(k, &params) >= 0.5);
        assert!(Binomial.cdf(k - 1.0, &params) < 0.5);
        // 500000 ± 3.09·500
        let (lo, hi) = Binomial.default_x_range(&params);
        assert!((498_400.0..499_000.0).contains(&lo), "{lo}");
        assert!((501_000.0..501_600.0).contains(&hi), "{hi}");
    }

    #[test]
    fn test_binomial_quantile_set() {
        let fit = Binomial.quantile_set(&[5.0], &[0.5], &[20.0]).unwrap();
        assert!(fit.success);
        assert_eq!(fit.params[0], 20.0);
        assert_relative_eq!(fit.params[1], 0.2788045540306650, max_relative = 1e-8);
        assert!(matches!(
            Binomial.quantile_set(&[20.0], &[0.5], &[20.0]),
            Err(DistributionError::OutsideSupport { .. })
        ));
    }

    #[test]
    fn test_categorical() {
        let params = [0.1, 0.2, 0.3];
        assert_relative_eq!(Categorical.density(4.0, &params), 0.4, epsilon = 1e-15);
        assert!(Categorical.density(0.0, &params).is_nan());
        assert!(Categorical.density(5.0, &params).is_nan());
        assert_relative_eq!(Categorical.cdf(2.5, &params), 0.3, epsilon = 1e-15);
        assert_eq!(Categorical.ppf(0.35, &params), 3.0);
        let invalid = [0.5, 0.4, 0.3];
        assert!(Categorical.density(1.0, &invalid).is_nan());
        assert!(Categorical.cdf(2.0, &invalid).is_nan());
        assert!(Categorical.ppf(0.5, &invalid).is_nan());
    }

    #[test]
    fn test_discrete_uniform() {
        let params = [-2.0, 5.0];
        assert_relative_eq!(DiscreteUniform.density(0.0, &params), 0.125);
        assert!(DiscreteUniform.density(6.0, &params).is_nan());
        assert_relative_eq!(DiscreteUniform.cdf(1.5, &params), 0.5);
        assert_eq!(DiscreteUniform.ppf(0.5, &params), 1.0);
        assert_eq!(DiscreteUniform.ppf(1.0, &params), 5.0);
        assert!(DiscreteUniform.cdf(0.0, &[3.0, 1.0]).is_nan());
        assert_eq!(DiscreteUniform.default_x_range(&params), (-3.0, 6.0));
    }

    #[test]
    fn test_discrete_uniform_ppf_closed_form() {
        let params = [-2.0, 5.0];
        for k in -2..=5 {
            let x = f64::from(k);
            let p = DiscreteUniform.cdf(x, &params);
            assert_eq!(DiscreteUniform.ppf(p, &params), x, "p = {p}");
        }
        assert_eq!(DiscreteUniform.ppf(0.0, &params), -2.0);
        assert_eq!(DiscreteUniform.ppf(1e-12, &params), -2.0);
        assert!(DiscreteUniform.ppf(1.5, &params).is_nan());
        assert!(DiscreteUniform.ppf(0.5, &[3.0, 1.0]).is_nan());
        // Width far beyond any summation budget.
        let wide = [0.0, 1e9 - 1.0];
        assert_eq!(DiscreteUniform.ppf(0.25, &wide), 2.5e8 - 1.0);
        assert_eq!(DiscreteUniform.ppf(1.0, &wide), 1e9 - 1.0);
    }

    #[test]
    fn test_geometric() {
        let params = [0.2];
        assert_relative_eq!(Geometric.cdf(4.0, &params), 0.67232, max_relative = 1e-14);
        assert_relative_eq!(Geometric.density(0.0, &params), 0.2, max_relative = 1e-14);
        assert_eq!(Geometric.ppf(0.67232, &params), 4.0);
        assert_eq!(Geometric.ppf(0.6724, &params), 5.0);
        assert_eq!(Geometric.ppf(1.0, &params), f64::INFINITY);
        assert_eq!(Geometric.density(0.0, &[1.0]), 1.0);
        assert_eq!(Geometric.density(3.0, &[1.0]), 0.0);
    }

    #[test]
    fn test_geometric_quantile_set_closed_form() {
        let fit = Geometric.quantile_set(&[4.0], &[0.67232], &[]).unwrap();
        assert_eq!(fit.regime, FitRegime::ClosedForm);
        assert_relative_eq!(fit.params[0], 0.2, max_relative = 1e-12);
    }

    #[test]
    fn test_hypergeometric_support_and_values() {
        let params = [5.0, 7.0, 4.0];
        assert_eq!(Hypergeometric.x_min(&params), 1.0);
        assert_eq!(Hypergeometric.x_max(&params), 5.0);
        assert_relative_eq!(
            Hypergeometric.density(3.0, &params),
            0.45454545454545453,
            max_relative = 1e-10
        );
        assert!(Hypergeometric.density(0.0, &params).is_nan());
        assert_relative_eq!(pmf_total(&Hypergeometric, &params, 5), 1.0, epsilon = 1e-12);
        assert_eq!(Hypergeometric.default_x_range(&params), (0.0, 6.0));
        assert!(Hypergeometric.density(1.0, &[20.0, 7.0, 4.0]).is_nan());
    }

    #[test]
    fn test_poisson_values() {
        let params = [3.0];
        assert_relative_eq!(
            Poisson.density(4.0, &params),
            0.16803135574154082,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            Poisson.cdf(2.0, &params),
            0.42319008112684353,
            max_relative = 1e-12
        );
        assert_eq!(Poisson.density(0.0, &[0.0]), 1.0);
        assert_eq!(Poisson.density(2.0, &[0.0]), 0.0);
        assert!(Poisson.density(-1.0, &params).is_nan());
        assert_eq!(Poisson.ppf(0.42319008112684353, &params), 2.0);
        assert_eq!(Poisson.ppf(1.0, &params), f64::INFINITY);
    }

    #[test]
    fn test_poisson_ppf_with_median_past_summation_budget() {
        let params = [2e5];
        let k = Poisson.ppf(0.5, &params);
        assert!((k - 2e5).abs() <= 1.0, "{k}");
        assert!(Poisson.cdf(k, &params) >= 0.5);
        assert!(Poisson.cdf(k - 1.0, &params) < 0.5);
        // 2e5 ± 3.09·447
        let (lo, hi) = Poisson.default_x_range(&params);
        assert!((198_500.0..198_700.0).contains(&lo), "{lo}");
        assert!((201_300.0..201_500.0).contains(&hi), "{hi}");
    }

    #[test]
    fn test_poisson_quantile_set() {
        let fit = Poisson.quantile_set(&[3.0], &[0.5], &[]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[0], 3.672060748850896, max_relative = 1e-8);
    }
}
