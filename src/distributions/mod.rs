//! Univariate probability distributions.
//!
//! Every family implements [`Distribution`], a stateless interface over a
//! plain parameter slice. Families are zero-sized (or `Copy`) values with
//! `'static` [`Metadata`], so a single instance serves every parameter
//! vector and is freely shared across threads.
//!
//! # Supported Distributions
//!
//! | Family | Kind | Parameters (fixed in brackets) | Quantile matching |
//! |---|---|---|---|
//! | [`Bernoulli`] | discrete | θ | no |
//! | [`BetaBinomial`] | discrete | [N], α, β | no |
//! | [`Binomial`] | discrete | [N], θ | trust region |
//! | [`Categorical`] | discrete | θ₁, θ₂, θ₃ | no |
//! | [`DiscreteUniform`] | discrete | low, high | no |
//! | [`Geometric`] | discrete | θ | closed form |
//! | [`Hypergeometric`] | discrete | [N], a, b | no |
//! | [`NegativeBinomial`] | discrete | 4 parametrizations | trust region, Poisson limit |
//! | [`Poisson`] | discrete | λ | trust region |
//! | [`Beta`] | continuous | α, β | trust region |
//! | [`Cauchy`] | continuous | μ, σ | closed form |
//! | [`Exponential`] | continuous | β | closed form |
//! | [`Gamma`] | continuous | α, β | trust region |
//! | [`HalfCauchy`] | continuous | [μ], σ | closed form |
//! | [`HalfNormal`] | continuous | [μ], σ | closed form |
//! | [`HalfStudentT`] | continuous | [ν], [μ], σ | trust region |
//! | [`InverseGamma`] | continuous | α, β | trust region |
//! | [`LogNormal`] | continuous | μ, σ | closed form |
//! | [`Normal`] | continuous | μ, σ | closed form |
//! | [`Pareto`] | continuous | y_min, α | closed form |
//! | [`StudentT`] | continuous | [ν], μ, σ | trust region |
//! | [`Uniform`] | continuous | α, β | closed form |
//! | [`VonMises`] | continuous | μ, κ | trust region |
//! | [`Weibull`] | continuous | α, σ | closed form |
//!
//! # Undefined values
//!
//! Evaluation never errors. A discrete mass function returns `NaN` at
//! non-integers and outside the support. A continuous density returns an
//! exact `0.0` outside the support and `NaN` only for invalid parameters.
//! CDFs return exact `0.0`/`1.0` outside the support.

mod continuous;
mod discrete;
mod negative_binomial;
pub mod quantile;
mod von_mises;

pub use continuous::{
    Beta, Cauchy, Exponential, Gamma, HalfCauchy, HalfNormal, HalfStudentT, InverseGamma,
    LogNormal, Normal, Pareto, StudentT, Uniform, Weibull,
};
pub use discrete::{
    Bernoulli, BetaBinomial, Binomial, Categorical, DiscreteUniform, Geometric, Hypergeometric,
    Poisson,
};
pub use negative_binomial::NegativeBinomial;
pub use quantile::{FitRegime, QuantileFit, QuantileOptions, Transform};
pub use von_mises::VonMises;

use crate::error::{DistributionError, Result};
use crate::roots::{brent, secant, BrentOptions, SecantOptions};
use crate::special::inverse_normal_cdf;
use crate::stats::CompensatedSum;

/// Default summation budget for [`discrete_cdf`] and [`discrete_ppf`].
pub const DEFAULT_MAX_TERMS: usize = 100_000;

/// Default CDF-evaluation budget for [`discrete_ppf_by_cdf`].
pub const DEFAULT_MAX_STEPS: usize = 2_000;

/// Relative tolerance at which a running CDF sum counts as reaching `p`.
pub(crate) const PPF_CLOSE_RTOL: f64 = 1e-12;

// ============================================================================
// Metadata
// ============================================================================

/// Whether a distribution has a mass function or a density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Kind {
    Discrete,
    Continuous,
}

/// Equivalent parameter encodings of the Negative-Binomial family.
///
/// With success probability `p = β/(1+β)` and mean `μ = α/β`:
///
/// | Tag | Slots | To canonical (α, β) |
/// |---|---|---|
/// | `AlphaBeta` | α, β | identity |
/// | `MuPhi` | μ, φ | α = φ, β = φ/μ |
/// | `AlphaP` | α, p | β = p/(1−p) |
/// | `RB` | r, b | α = r, β = 1/b |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Parametrization {
    AlphaBeta,
    MuPhi,
    AlphaP,
    RB,
}

/// One named parameter with its admissible closed range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSlot {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub integer: bool,
}

impl ParamSlot {
    pub const fn real(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            min,
            max,
            integer: false,
        }
    }

    pub const fn integer(name: &'static str, min: f64, max: f64) -> Self {
        Self {
            name,
            min,
            max,
            integer: true,
        }
    }

    /// True if `value` lies in `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Static description of a distribution variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metadata {
    /// Display name, unique per family.
    pub name: &'static str,
    /// Name of the random variable.
    pub var_name: &'static str,
    pub kind: Kind,
    /// Parameter slots in parameter-vector order.
    pub params: &'static [ParamSlot],
    /// Slots held constant during quantile matching.
    pub fixed: &'static [usize],
    /// Slot that shifts the distribution additively, if any.
    pub location: Option<usize>,
    /// Support bound independent of parameter values.
    pub hard_min: f64,
    pub hard_max: f64,
    pub parametrization: Option<Parametrization>,
}

impl Metadata {
    /// True if slot `i` is fixed during quantile matching.
    pub fn is_fixed(&self, i: usize) -> bool {
        self.fixed.contains(&i)
    }

    /// Indices of the free slots, in order.
    pub fn free_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.params.len()).filter(move |&i| !self.is_fixed(i))
    }

    /// Number of free slots, which is also the number of quantile
    /// constraints required.
    pub fn n_free(&self) -> usize {
        self.params.len() - self.fixed.len()
    }
}

/// Copies the first `N` parameters into an array, padding with `NaN`.
pub(crate) fn unpack<const N: usize>(params: &[f64]) -> [f64; N] {
    let mut out = [f64::NAN; N];
    for (o, &v) in out.iter_mut().zip(params) {
        *o = v;
    }
    out
}

/// True if `x` is a finite whole number.
pub(crate) fn is_integer(x: f64) -> bool {
    x.is_finite() && x.fract() == 0.0
}

// ============================================================================
// Distribution Trait
// ============================================================================

/// A univariate probability distribution over a parameter slice.
///
/// Implementors supply the support, density, CDF, PPF, default display
/// range and quantile matching. Vectorized evaluation, checked PPF and
/// parameter validation are provided.
///
/// # Examples
/// ```
/// use u_probdist::distributions::{Distribution, Normal};
/// let params = [1.0, 2.0];
/// assert!((Normal.cdf(1.0, &params) - 0.5).abs() < 1e-15);
/// let x = Normal.ppf(0.975, &params);
/// assert!((x - (1.0 + 2.0 * 1.959963984540054)).abs() < 1e-9);
/// ```
pub trait Distribution: Send + Sync {
    /// Static description of this variant.
    fn metadata(&self) -> &'static Metadata;

    /// Lower end of the support for `params`.
    fn x_min(&self, params: &[f64]) -> f64;

    /// Upper end of the support for `params`.
    fn x_max(&self, params: &[f64]) -> f64;

    /// PMF for discrete families, PDF for continuous ones.
    fn density(&self, x: f64, params: &[f64]) -> f64;

    fn cdf(&self, x: f64, params: &[f64]) -> f64;

    /// Inverse CDF for `p ∈ [0, 1]`. Callers outside that range should use
    /// [`ppf_checked`](Distribution::ppf_checked).
    fn ppf(&self, p: f64, params: &[f64]) -> f64;

    /// A plotting range that shows the bulk of the distribution.
    fn default_x_range(&self, params: &[f64]) -> (f64, f64);

    /// Solves for the free parameters such that `CDF(x[i]) = p[i]`.
    ///
    /// `extra` holds the values of the fixed slots in slot order. The
    /// returned parameter vector is complete, fixed slots included.
    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        opts: &QuantileOptions,
    ) -> Result<QuantileFit>;

    fn name(&self) -> &'static str {
        self.metadata().name
    }

    fn kind(&self) -> Kind {
        self.metadata().kind
    }

    /// Checks length, range and integrality of a parameter vector.
    fn validate_params(&self, params: &[f64]) -> Result<()> {
        let meta = self.metadata();
        if params.len() != meta.params.len() {
            return Err(DistributionError::ParamCount {
                name: meta.name,
                expected: meta.params.len(),
                got: params.len(),
            });
        }
        for (slot, &value) in meta.params.iter().zip(params) {
            if !slot.contains(value) {
                return Err(DistributionError::ParamOutOfRange {
                    name: meta.name,
                    slot: slot.name,
                    value,
                    min: slot.min,
                    max: slot.max,
                });
            }
            if slot.integer && value.is_finite() && value.fract() != 0.0 {
                return Err(DistributionError::ParamNotInteger {
                    name: meta.name,
                    slot: slot.name,
                    value,
                });
            }
        }
        Ok(())
    }

    /// PPF that returns `NaN` for `p` outside `[0, 1]` or NaN.
    fn ppf_checked(&self, p: f64, params: &[f64]) -> f64 {
        if p.is_nan() || !(0.0..=1.0).contains(&p) {
            return f64::NAN;
        }
        self.ppf(p, params)
    }

    /// Value returned by the PPF at `p = 1`.
    fn ppf_terminal(&self, params: &[f64]) -> f64 {
        self.x_max(params)
    }

    fn pdf_many(&self, xs: &[f64], params: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.density(x, params)).collect()
    }

    fn cdf_many(&self, xs: &[f64], params: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.cdf(x, params)).collect()
    }

    fn ppf_many(&self, ps: &[f64], params: &[f64]) -> Vec<f64> {
        ps.iter().map(|&p| self.ppf_checked(p, params)).collect()
    }

    /// [`quantile_set_with`](Distribution::quantile_set_with) using
    /// default solver options.
    fn quantile_set(&self, x: &[f64], p: &[f64], extra: &[f64]) -> Result<QuantileFit> {
        self.quantile_set_with(x, p, extra, &QuantileOptions::default())
    }
}

// ============================================================================
// Discrete Helpers
// ============================================================================

/// CDF of a discrete distribution by compensated summation of its PMF.
///
/// Sums from `x_min` to `⌊x⌋`, skipping `NaN` terms. Returns exactly 0
/// below the support and exactly 1 at or above `x_max`. Returns `NaN` if
/// reaching `⌊x⌋` would take more than `max_terms` masses.
pub fn discrete_cdf<D: Distribution + ?Sized>(
    dist: &D,
    x: f64,
    params: &[f64],
    max_terms: usize,
) -> f64 {
    let lo = dist.x_min(params);
    let hi = dist.x_max(params);
    if x.is_nan() || lo.is_nan() || hi.is_nan() {
        return f64::NAN;
    }
    if x < lo {
        return 0.0;
    }
    if x >= hi {
        return 1.0;
    }
    let end = x.floor();
    if end - lo >= max_terms as f64 {
        trace_debug!(x, max_terms, "discrete cdf: summation budget exceeded");
        return f64::NAN;
    }
    let mut acc = CompensatedSum::new();
    let mut k = lo;
    while k <= end {
        let mass = dist.density(k, params);
        if !mass.is_nan() {
            acc.add(mass);
        }
        k += 1.0;
    }
    acc.value().clamp(0.0, 1.0)
}

/// CDF at every integer in `[x_start, x_end]` from one running sum.
///
/// Element `i` is the CDF at `⌈x_start⌉ + i`. Used for plotting, where
/// a CDF at each integer would otherwise cost a separate summation.
/// Every element is `NaN` if the masses below `⌈x_start⌉` alone exceed
/// `max_terms`.
pub fn discrete_cdf_running<D: Distribution + ?Sized>(
    dist: &D,
    x_start: f64,
    x_end: f64,
    params: &[f64],
    max_terms: usize,
) -> Vec<f64> {
    let lo = dist.x_min(params);
    let hi = dist.x_max(params);
    if !x_start.is_finite() || !x_end.is_finite() || x_end < x_start {
        return Vec::new();
    }
    let first = x_start.ceil();
    let last = x_end.floor();
    let n = (last - first + 1.0).max(0.0) as usize;
    if lo.is_nan() || hi.is_nan() {
        return vec![f64::NAN; n];
    }
    if first.min(hi) - lo > max_terms as f64 {
        trace_debug!(x_start, max_terms, "discrete cdf: summation budget exceeded");
        return vec![f64::NAN; n];
    }

    let mut acc = CompensatedSum::new();
    let mut k = lo;
    while k < first && k <= hi {
        let mass = dist.density(k, params);
        if !mass.is_nan() {
            acc.add(mass);
        }
        k += 1.0;
    }

    let mut out = Vec::with_capacity(n);
    let mut x = first;
    while x <= last {
        if x < lo {
            out.push(0.0);
        } else if x >= hi {
            out.push(1.0);
        } else {
            let mass = dist.density(x, params);
            if !mass.is_nan() {
                acc.add(mass);
            }
            out.push(acc.value().clamp(0.0, 1.0));
        }
        x += 1.0;
    }
    out
}

/// Smallest support point `k` with `CDF(k) ≥ p`, by incremental summation.
///
/// Returns `x_min` at `p = 0` and [`Distribution::ppf_terminal`] at
/// `p = 1`. A running sum within relative `1e-12` of `p` counts as
/// reaching it. Returns `NaN` if `max_terms` masses are summed without
/// reaching `p`.
pub fn discrete_ppf<D: Distribution + ?Sized>(
    dist: &D,
    p: f64,
    params: &[f64],
    max_terms: usize,
) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    let lo = dist.x_min(params);
    if p == 0.0 {
        return lo;
    }
    if p == 1.0 {
        return dist.ppf_terminal(params);
    }
    let hi = dist.x_max(params);
    if lo.is_nan() || hi.is_nan() {
        return f64::NAN;
    }

    let mut acc = CompensatedSum::new();
    let mut k = lo;
    for _ in 0..max_terms {
        let mass = dist.density(k, params);
        if !mass.is_nan() {
            acc.add(mass);
        }
        let sum = acc.value();
        if sum >= p || (p - sum).abs() <= PPF_CLOSE_RTOL * p {
            return k;
        }
        if k >= hi {
            return hi;
        }
        k += 1.0;
    }
    trace_debug!(p, max_terms, "discrete ppf: summation budget exhausted");
    f64::NAN
}

/// `CDF(k) ≥ p`, counting a CDF within relative `1e-12` of `p` as
/// reaching it. `None` if the CDF is `NaN`.
fn cdf_reaches<D: Distribution + ?Sized>(
    dist: &D,
    k: f64,
    p: f64,
    params: &[f64],
) -> Option<bool> {
    let c = dist.cdf(k, params);
    if c.is_nan() {
        None
    } else {
        Some(c >= p || (p - c).abs() <= PPF_CLOSE_RTOL * p)
    }
}

/// Smallest support point `k` with `CDF(k) ≥ p`, by bracketing and
/// bisecting the CDF over the integers.
///
/// For families whose CDF has a closed or special-function form, so the
/// cost does not grow with the distance from `x_min`. The search starts
/// at `⌊seed⌋` clamped to the support (see [`normal_seed`]), doubles its
/// step until the CDF crosses `p`, then bisects. Boundaries and the
/// closeness rule are those of [`discrete_ppf`]. Returns `NaN` if the CDF
/// is `NaN` or `max_steps` evaluations pass without an answer.
///
/// # Examples
/// ```
/// use u_probdist::distributions::{discrete_ppf_by_cdf, normal_seed, Poisson};
/// use u_probdist::distributions::DEFAULT_MAX_STEPS;
/// let seed = normal_seed(2e5, 2e5, 0.5);
/// let k = discrete_ppf_by_cdf(&Poisson, 0.5, &[2e5], seed, DEFAULT_MAX_STEPS);
/// assert!((k - 2e5).abs() <= 1.0);
/// ```
pub fn discrete_ppf_by_cdf<D: Distribution + ?Sized>(
    dist: &D,
    p: f64,
    params: &[f64],
    seed: f64,
    max_steps: usize,
) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    let lo = dist.x_min(params);
    if p == 0.0 {
        return lo;
    }
    if p == 1.0 {
        return dist.ppf_terminal(params);
    }
    let hi = dist.x_max(params);
    if lo.is_nan() || hi.is_nan() || lo > hi {
        return f64::NAN;
    }

    let start = if seed.is_finite() {
        seed.floor().clamp(lo, hi)
    } else {
        lo
    };
    let mut budget = max_steps;
    let mut spend = || {
        let left = budget > 0;
        budget = budget.saturating_sub(1);
        left
    };

    // CDF(below) < p ≤ CDF(above) once bracketed.
    let (mut below, mut above) = match cdf_reaches(dist, start, p, params) {
        None => return f64::NAN,
        Some(true) => {
            let mut above = start;
            let mut step = 1.0;
            loop {
                if above <= lo {
                    return lo;
                }
                if !spend() {
                    trace_debug!(p, max_steps, "discrete ppf: bracketing budget exhausted");
                    return f64::NAN;
                }
                let k = (above - step).max(lo);
                match cdf_reaches(dist, k, p, params) {
                    None => return f64::NAN,
                    Some(true) => above = k,
                    Some(false) => break (k, above),
                }
                step *= 2.0;
            }
        }
        Some(false) => {
            let mut below = start;
            let mut step = 1.0;
            loop {
                if below >= hi {
                    return hi;
                }
                if !spend() {
                    trace_debug!(p, max_steps, "discrete ppf: bracketing budget exhausted");
                    return f64::NAN;
                }
                let k = (below + step).min(hi);
                match cdf_reaches(dist, k, p, params) {
                    None => return f64::NAN,
                    Some(true) => break (below, k),
                    Some(false) => below = k,
                }
                step *= 2.0;
            }
        }
    };

    while above - below > 1.0 {
        if !spend() {
            trace_debug!(p, max_steps, "discrete ppf: bisection budget exhausted");
            return f64::NAN;
        }
        let mid = (below + (above - below) / 2.0).floor();
        match cdf_reaches(dist, mid, p, params) {
            None => return f64::NAN,
            Some(true) => above = mid,
            Some(false) => below = mid,
        }
    }
    above
}

/// Quantile `p` of a Normal with the given mean and variance, as a
/// starting point for [`discrete_ppf_by_cdf`].
pub fn normal_seed(mean: f64, variance: f64, p: f64) -> f64 {
    mean + variance.max(0.0).sqrt() * inverse_normal_cdf(p)
}

// ============================================================================
// Continuous Helpers
// ============================================================================

/// Inverts a continuous CDF supported on `[lower, ∞)`.
///
/// Brent's method runs on `ξ ∈ [0, 1]` with `x = lower + ξ/(1−ξ)`, so the
/// bracket is finite. A secant polish on `x` follows and is kept only if it
/// lowers `|CDF(x) − p|`.
pub fn continuous_ppf_by_root<F>(cdf: F, p: f64, lower: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    if p.is_nan() || !(0.0..=1.0).contains(&p) || lower.is_nan() {
        return f64::NAN;
    }
    if p == 0.0 {
        return lower;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let to_x = |xi: f64| {
        if xi >= 1.0 {
            f64::INFINITY
        } else {
            lower + xi / (1.0 - xi)
        }
    };
    let xi = match brent(|xi| cdf(to_x(xi)) - p, 0.0, 1.0, &BrentOptions::default()) {
        Ok(xi) => xi,
        Err(_e) => {
            trace_debug!(p, lower, error = %_e, "ppf: brent failed on compactified support");
            return f64::NAN;
        }
    };
    let first = to_x(xi);
    if !first.is_finite() {
        return first;
    }

    let residual = |x: f64| cdf(x) - p;
    match secant(residual, first, &SecantOptions::default()) {
        Ok(polished)
            if polished >= lower && residual(polished).abs() < residual(first).abs() =>
        {
            polished
        }
        _ => first,
    }
}

/// Inverts a continuous CDF supported on `[lower, upper]` by Brent's method.
pub(crate) fn bounded_ppf<F>(cdf: F, p: f64, lower: f64, upper: f64) -> f64
where
    F: Fn(f64) -> f64,
{
    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return lower;
    }
    if p == 1.0 {
        return upper;
    }
    let opts = BrentOptions {
        tol: 1e-12,
        ..BrentOptions::default()
    };
    match brent(|x| cdf(x) - p, lower, upper, &opts) {
        Ok(x) => x,
        Err(_e) => {
            trace_debug!(p, lower, upper, error = %_e, "ppf: brent failed on bounded support");
            f64::NAN
        }
    }
}

// ============================================================================
// Registry
// ============================================================================

static ALL: [&dyn Distribution; 27] = [
    &Bernoulli,
    &BetaBinomial,
    &Binomial,
    &Categorical,
    &DiscreteUniform,
    &Geometric,
    &Hypergeometric,
    &NegativeBinomial::ALPHA_BETA,
    &NegativeBinomial::MU_PHI,
    &NegativeBinomial::ALPHA_P,
    &NegativeBinomial::R_B,
    &Poisson,
    &Beta,
    &Cauchy,
    &Exponential,
    &Gamma,
    &HalfCauchy,
    &HalfNormal,
    &HalfStudentT,
    &InverseGamma,
    &LogNormal,
    &Normal,
    &Pareto,
    &StudentT,
    &Uniform,
    &VonMises,
    &Weibull,
];

/// Every distribution variant, Negative-Binomial parametrizations included.
pub fn all() -> &'static [&'static dyn Distribution] {
    &ALL
}

/// Looks up a variant by display name.
///
/// `"NegativeBinomial"` resolves to the `AlphaBeta` parametrization; use
/// [`lookup`] for the others.
pub fn by_name(name: &str) -> Option<&'static dyn Distribution> {
    ALL.iter().copied().find(|d| d.name() == name)
}

/// Looks up a variant by display name and parametrization tag.
pub fn lookup(
    name: &str,
    parametrization: Option<Parametrization>,
) -> Option<&'static dyn Distribution> {
    ALL.iter().copied().find(|d| {
        let meta = d.metadata();
        meta.name == name && (parametrization.is_none() || meta.parametrization == parametrization)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_registry_names_unique_per_parametrization() {
        let all = all();
        assert_eq!(all.len(), 27);
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                let same = a.name() == b.name()
                    && a.metadata().parametrization == b.metadata().parametrization;
                assert!(!same, "duplicate variant {}", a.name());
            }
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(by_name("Normal").map(|d| d.kind()), Some(Kind::Continuous));
        assert!(by_name("Triangular").is_none());
        let nb = lookup("NegativeBinomial", Some(Parametrization::RB)).map(|d| d.metadata());
        assert_eq!(nb.map(|m| m.params[0].name), Some("r"));
        let default_nb = by_name("NegativeBinomial").map(|d| d.metadata().parametrization);
        assert_eq!(default_nb, Some(Some(Parametrization::AlphaBeta)));
    }

    #[test]
    fn test_metadata_fixed_slots_in_range() {
        for d in all() {
            let meta = d.metadata();
            for &i in meta.fixed {
                assert!(i < meta.params.len(), "{}", meta.name);
            }
            if let Some(loc) = meta.location {
                assert!(loc < meta.params.len(), "{}", meta.name);
            }
            assert!(meta.hard_min < meta.hard_max, "{}", meta.name);
            assert_eq!(meta.free_slots().count(), meta.n_free());
        }
    }

    #[test]
    fn test_validate_params() {
        assert!(Normal.validate_params(&[0.0, 1.0]).is_ok());
        assert!(matches!(
            Normal.validate_params(&[0.0]),
            Err(DistributionError::ParamCount { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            Normal.validate_params(&[0.0, -1.0]),
            Err(DistributionError::ParamOutOfRange { slot: "σ", .. })
        ));
        assert!(matches!(
            Binomial.validate_params(&[10.5, 0.3]),
            Err(DistributionError::ParamNotInteger { slot: "N", .. })
        ));
    }

    #[test]
    fn test_unpack_pads_with_nan() {
        let [a, b, c] = unpack::<3>(&[1.0, 2.0]);
        assert_eq!((a, b), (1.0, 2.0));
        assert!(c.is_nan());
    }

    #[test]
    fn test_ppf_checked_rejects_out_of_range() {
        assert!(Normal.ppf_checked(-0.1, &[0.0, 1.0]).is_nan());
        assert!(Normal.ppf_checked(1.1, &[0.0, 1.0]).is_nan());
        assert!(Normal.ppf_checked(f64::NAN, &[0.0, 1.0]).is_nan());
        assert_eq!(Normal.ppf_checked(1.0, &[0.0, 1.0]), f64::INFINITY);
    }

    #[test]
    fn test_vectorized_evaluation() {
        let params = [0.0, 1.0];
        let xs = [-1.0, 0.0, 1.0];
        let cdf = Normal.cdf_many(&xs, &params);
        assert_relative_eq!(cdf[0] + cdf[2], 1.0, epsilon = 1e-15);
        let ppf = Normal.ppf_many(&[0.5, 2.0], &params);
        assert!(ppf[0].abs() < 1e-15);
        assert!(ppf[1].is_nan());
        assert_eq!(Normal.pdf_many(&xs, &params).len(), 3);
    }

    #[test]
    fn test_discrete_cdf_sums_masses() {
        // Bernoulli(0.3): CDF(0) = 0.7
        let cdf = |x: f64| discrete_cdf(&Bernoulli, x, &[0.3], DEFAULT_MAX_TERMS);
        assert_relative_eq!(cdf(0.0), 0.7, epsilon = 1e-15);
        assert_relative_eq!(cdf(0.5), 0.7, epsilon = 1e-15);
        assert_eq!(cdf(-0.1), 0.0);
        assert_eq!(cdf(1.0), 1.0);
        assert_eq!(cdf(7.0), 1.0);
    }

    #[test]
    fn test_discrete_cdf_budget_exceeded() {
        let params = [1e7, 2.0, 3.0];
        assert!(discrete_cdf(&BetaBinomial, 5e6, &params, 1_000).is_nan());
        // Outside the support no summation is needed.
        assert_eq!(discrete_cdf(&BetaBinomial, -1.0, &params, 1_000), 0.0);
        assert_eq!(discrete_cdf(&BetaBinomial, 1e7, &params, 1_000), 1.0);
        // Exactly max_terms masses fit.
        let small = [12.0, 2.0, 3.0];
        assert!(!discrete_cdf(&BetaBinomial, 4.0, &small, 5).is_nan());
        assert!(discrete_cdf(&BetaBinomial, 5.0, &small, 5).is_nan());
    }

    #[test]
    fn test_discrete_cdf_running_matches_pointwise() {
        let params = [12.0, 2.0, 3.0];
        let running = discrete_cdf_running(&BetaBinomial, -2.0, 14.0, &params, DEFAULT_MAX_TERMS);
        assert_eq!(running.len(), 17);
        for (i, &c) in running.iter().enumerate() {
            let x = -2.0 + i as f64;
            assert_relative_eq!(c, BetaBinomial.cdf(x, &params), epsilon = 1e-13);
        }
    }

    #[test]
    fn test_discrete_cdf_running_budget_exceeded() {
        let params = [1e7, 2.0, 3.0];
        let running = discrete_cdf_running(&BetaBinomial, 5e6, 5e6 + 3.0, &params, 1_000);
        assert_eq!(running.len(), 4);
        assert!(running.iter().all(|c| c.is_nan()));
    }

    #[test]
    fn test_discrete_ppf_boundaries() {
        let params = [20.0, 0.4];
        assert_eq!(
            discrete_ppf(&Binomial, 0.0, &params, DEFAULT_MAX_TERMS),
            0.0
        );
        assert_eq!(
            discrete_ppf(&Binomial, 1.0, &params, DEFAULT_MAX_TERMS),
            20.0
        );
        assert!(discrete_ppf(&Binomial, 1.5, &params, DEFAULT_MAX_TERMS).is_nan());
    }

    #[test]
    fn test_discrete_ppf_budget_exhausted() {
        // Mass near 1e6 is unreachable within ten terms.
        assert!(discrete_ppf(&Poisson, 0.5, &[1e6], 10).is_nan());
    }

    #[test]
    fn test_discrete_ppf_by_cdf_large_binomial() {
        let params = [1e6, 0.5];
        let seed = normal_seed(5e5, 2.5e5, 0.5);
        let k = discrete_ppf_by_cdf(&Binomial, 0.5, &params, seed, DEFAULT_MAX_STEPS);
        assert_eq!(k, 500_000.0);
        assert!(Binomial.cdf(k, &params) >= 0.5);
        assert!(Binomial.cdf(k - 1.0, &params) < 0.5);
    }

    #[test]
    fn test_discrete_ppf_by_cdf_poor_seed() {
        // Seeds at either end of the support still bracket the answer.
        let params = [3.5];
        let expected = discrete_ppf(&Poisson, 0.7, &params, DEFAULT_MAX_TERMS);
        for seed in [0.0, 1e4, f64::NAN] {
            let k = discrete_ppf_by_cdf(&Poisson, 0.7, &params, seed, DEFAULT_MAX_STEPS);
            assert_eq!(k, expected, "seed {seed}");
        }
    }

    #[test]
    fn test_discrete_ppf_by_cdf_boundaries() {
        let params = [20.0, 0.4];
        let ppf = |p: f64| discrete_ppf_by_cdf(&Binomial, p, &params, 8.0, DEFAULT_MAX_STEPS);
        assert_eq!(ppf(0.0), 0.0);
        assert_eq!(ppf(1.0), 20.0);
        assert!(ppf(-0.5).is_nan());
        assert_eq!(ppf(1e-300), 0.0);
        assert_eq!(ppf(1.0 - 1e-16), 20.0);
        let invalid = discrete_ppf_by_cdf(&Binomial, 0.5, &[20.0, 1.5], 8.0, DEFAULT_MAX_STEPS);
        assert!(invalid.is_nan());
    }

    #[test]
    fn test_discrete_ppf_by_cdf_budget_exhausted() {
        // Five doublings from zero cannot reach 1e6.
        assert!(discrete_ppf_by_cdf(&Poisson, 0.5, &[1e6], 0.0, 5).is_nan());
    }

    #[test]
    fn test_continuous_ppf_by_root_exponential() {
        let cdf = |x: f64| if x <= 0.0 { 0.0 } else { 1.0 - (-2.0 * x).exp() };
        for p in [1e-6, 0.1, 0.5, 0.9, 0.999_999] {
            let x = continuous_ppf_by_root(cdf, p, 0.0);
            assert_relative_eq!(x, -(1.0 - p).ln() / 2.0, max_relative = 1e-7);
        }
        assert_eq!(continuous_ppf_by_root(cdf, 0.0, 0.0), 0.0);
        assert_eq!(continuous_ppf_by_root(cdf, 1.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_bounded_ppf() {
        let cdf = |x: f64| x * x;
        assert_relative_eq!(bounded_ppf(cdf, 0.25, 0.0, 1.0), 0.5, epsilon = 1e-11);
        assert_eq!(bounded_ppf(cdf, 0.0, 0.0, 1.0), 0.0);
        assert_eq!(bounded_ppf(cdf, 1.0, 0.0, 1.0), 1.0);
        assert!(bounded_ppf(|_| f64::NAN, 0.5, 0.0, 1.0).is_nan());
    }

    #[test]
    fn test_continuous_ppf_by_root_shifted_lower() {
        let cdf = |x: f64| if x <= 3.0 { 0.0 } else { 1.0 - 1.0 / (x - 2.0) };
        let x = continuous_ppf_by_root(cdf, 0.75, 3.0);
        assert_relative_eq!(x, 6.0, max_relative = 1e-9);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn discrete_ppf_is_left_inverse(
            n in 1u32..60,
            theta in 0.02_f64..0.98,
            p in 0.001_f64..0.999,
        ) {
            let params = [f64::from(n), theta];
            let k = discrete_ppf(&Binomial, p, &params, DEFAULT_MAX_TERMS);
            prop_assert!(Binomial.cdf(k, &params) >= p - 1e-10);
            if k > 0.0 {
                prop_assert!(Binomial.cdf(k - 1.0, &params) < p + 1e-10);
            }
        }

        #[test]
        fn bracketed_ppf_matches_summation(
            lambda in 0.1_f64..200.0,
            p in 0.001_f64..0.999,
        ) {
            let params = [lambda];
            let summed = discrete_ppf(&Poisson, p, &params, DEFAULT_MAX_TERMS);
            let seed = normal_seed(lambda, lambda, p);
            let bracketed = discrete_ppf_by_cdf(&Poisson, p, &params, seed, DEFAULT_MAX_STEPS);
            prop_assert_eq!(summed, bracketed);
        }

        #[test]
        fn continuous_ppf_by_root_inverts_cdf(scale in 0.1_f64..50.0, p in 0.001_f64..0.999) {
            let cdf = |x: f64| if x <= 0.0 { 0.0 } else { 1.0 - (-x / scale).exp() };
            let x = continuous_ppf_by_root(cdf, p, 0.0);
            prop_assert!((cdf(x) - p).abs() < 1e-9);
        }
    }
}
