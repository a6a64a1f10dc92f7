//! Negative-Binomial distribution in four parametrizations.
//!
//! All math runs on the canonical `(α, β)` pair; the public encodings are
//! pure conversions on the way in and out (see [`Parametrization`]).

use crate::distributions::quantile::{match_quantiles, quantile_residuals, validate_constraints};
use crate::distributions::{
    discrete_ppf_by_cdf, is_integer, normal_seed, unpack, Distribution, FitRegime, Kind,
    Metadata, ParamSlot, Parametrization, Poisson, QuantileFit, QuantileOptions,
    DEFAULT_MAX_STEPS,
};
use crate::error::Result;
use crate::linalg::norm;
use crate::special::{inverse_normal_cdf, ln_factorial, ln_gamma, regularized_incomplete_beta};

const INF: f64 = f64::INFINITY;

/// Agreement required of the second constraint under the Poisson limit.
const POISSON_LIMIT_TOL: f64 = 1e-6;

/// Negative-Binomial distribution.
///
/// # Mathematical Definition
/// With canonical shape α and rate β (success probability `β/(1+β)`):
/// - PMF: Γ(y+α) / (Γ(α) y!) · (β/(1+β))^α · (1/(1+β))^y
/// - CDF: I_{β/(1+β)}(α, ⌊y⌋+1)
/// - Mean α/β, variance α(1+β)/β²
///
/// As α, β → ∞ with α/β = λ fixed the distribution tends to Poisson(λ).
/// In the `MuPhi` encoding that limit is expressible directly: `φ = ∞`
/// evaluates as Poisson(μ).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeBinomial(Parametrization);

impl Default for NegativeBinomial {
    fn default() -> Self {
        Self::ALPHA_BETA
    }
}

static ALPHA_BETA: Metadata = Metadata {
    name: "NegativeBinomial",
    var_name: "y",
    kind: Kind::Discrete,
    params: &[ParamSlot::real("α", 0.0, INF), ParamSlot::real("β", 0.0, INF)],
    fixed: &[],
    location: None,
    hard_min: 0.0,
    hard_max: INF,
    parametrization: Some(Parametrization::AlphaBeta),
};

static MU_PHI: Metadata = Metadata {
    params: &[ParamSlot::real("μ", 0.0, INF), ParamSlot::real("φ", 0.0, INF)],
    parametrization: Some(Parametrization::MuPhi),
    ..ALPHA_BETA
};

static ALPHA_P: Metadata = Metadata {
    params: &[ParamSlot::real("α", 0.0, INF), ParamSlot::real("p", 0.0, 1.0)],
    parametrization: Some(Parametrization::AlphaP),
    ..ALPHA_BETA
};

static R_B: Metadata = Metadata {
    params: &[ParamSlot::real("r", 0.0, INF), ParamSlot::real("b", 0.0, INF)],
    parametrization: Some(Parametrization::RB),
    ..ALPHA_BETA
};

impl NegativeBinomial {
    pub const ALPHA_BETA: Self = Self(Parametrization::AlphaBeta);
    pub const MU_PHI: Self = Self(Parametrization::MuPhi);
    pub const ALPHA_P: Self = Self(Parametrization::AlphaP);
    pub const R_B: Self = Self(Parametrization::RB);

    pub const fn new(parametrization: Parametrization) -> Self {
        Self(parametrization)
    }

    pub fn parametrization(&self) -> Parametrization {
        self.0
    }

    /// Public parameters to canonical `(α, β)`.
    pub fn to_canonical(&self, params: &[f64]) -> (f64, f64) {
        let [a, b] = unpack(params);
        match self.0 {
            Parametrization::AlphaBeta => (a, b),
            Parametrization::MuPhi => (b, b / a),
            Parametrization::AlphaP => (a, b / (1.0 - b)),
            Parametrization::RB => (a, 1.0 / b),
        }
    }

    /// Canonical `(α, β)` to public parameters.
    pub fn from_canonical(&self, alpha: f64, beta: f64) -> [f64; 2] {
        match self.0 {
            Parametrization::AlphaBeta => [alpha, beta],
            Parametrization::MuPhi => [alpha / beta, alpha],
            Parametrization::AlphaP => [alpha, beta / (1.0 + beta)],
            Parametrization::RB => [alpha, 1.0 / beta],
        }
    }

    /// Public parameters of the Poisson limit with the given rate.
    pub fn poisson_limit(&self, rate: f64) -> [f64; 2] {
        match self.0 {
            Parametrization::AlphaBeta => [INF, INF],
            Parametrization::MuPhi => [rate, INF],
            Parametrization::AlphaP => [INF, 1.0],
            Parametrization::RB => [INF, 0.0],
        }
    }

    /// Rate if `params` encode the Poisson limit explicitly.
    fn explicit_poisson_rate(&self, params: &[f64]) -> Option<f64> {
        let [mu, phi] = unpack(params);
        (self.0 == Parametrization::MuPhi && phi == INF && mu.is_finite() && mu >= 0.0)
            .then_some(mu)
    }

    fn canonical_valid(alpha: f64, beta: f64) -> bool {
        alpha > 0.0 && beta > 0.0 && alpha.is_finite() && beta.is_finite()
    }
}

impl Distribution for NegativeBinomial {
    fn metadata(&self) -> &'static Metadata {
        match self.0 {
            Parametrization::AlphaBeta => &ALPHA_BETA,
            Parametrization::MuPhi => &MU_PHI,
            Parametrization::AlphaP => &ALPHA_P,
            Parametrization::RB => &R_B,
        }
    }

    fn x_min(&self, _params: &[f64]) -> f64 {
        0.0
    }

    fn x_max(&self, _params: &[f64]) -> f64 {
        INF
    }

    fn density(&self, x: f64, params: &[f64]) -> f64 {
        if let Some(rate) = self.explicit_poisson_rate(params) {
            return Poisson.density(x, &[rate]);
        }
        if !is_integer(x) || x < 0.0 {
            return f64::NAN;
        }
        let (alpha, beta) = self.to_canonical(params);
        if !Self::canonical_valid(alpha, beta) {
            return f64::NAN;
        }
        let ln_1p_beta = beta.ln_1p();
        (ln_gamma(x + alpha) - ln_gamma(alpha) - ln_factorial(x as u64)
            + alpha * (beta.ln() - ln_1p_beta)
            - x * ln_1p_beta)
            .exp()
    }

    fn cdf(&self, x: f64, params: &[f64]) -> f64 {
        if let Some(rate) = self.explicit_poisson_rate(params) {
            return Poisson.cdf(x, &[rate]);
        }
        let (alpha, beta) = self.to_canonical(params);
        if x.is_nan() || !Self::canonical_valid(alpha, beta) {
            return f64::NAN;
        }
        if x < 0.0 {
            return 0.0;
        }
        if x == INF {
            return 1.0;
        }
        regularized_incomplete_beta(beta / (1.0 + beta), alpha, x.floor() + 1.0)
    }

    fn ppf(&self, p: f64, params: &[f64]) -> f64 {
        if let Some(rate) = self.explicit_poisson_rate(params) {
            return Poisson.ppf(p, &[rate]);
        }
        let (alpha, beta) = self.to_canonical(params);
        if !Self::canonical_valid(alpha, beta) {
            return f64::NAN;
        }
        let mean = alpha / beta;
        let seed = normal_seed(mean, mean * (1.0 + beta) / beta, p);
        discrete_ppf_by_cdf(self, p, params, seed, DEFAULT_MAX_STEPS)
    }

    fn default_x_range(&self, params: &[f64]) -> (f64, f64) {
        (self.ppf(0.001, params), self.ppf(0.999, params))
    }

    /// Fits two quantiles.
    ///
    /// The fit runs in canonical log space, seeded by matching the moments
    /// of a continuity-corrected Normal fit. If that fails, a Poisson rate
    /// is fitted to the first constraint; when it also meets the second
    /// within `1e-6` the result is [`FitRegime::PoissonLimit`] with the
    /// limiting public parameters.
    fn quantile_set_with(
        &self,
        x: &[f64],
        p: &[f64],
        extra: &[f64],
        opts: &QuantileOptions,
    ) -> Result<QuantileFit> {
        validate_constraints(self.metadata(), x, p, extra)?;

        let canonical = Self::ALPHA_BETA;
        let seed = moment_seed(x, p);
        let fit = match_quantiles(&canonical, x, p, &[], &seed, opts);
        if fit.success {
            return Ok(QuantileFit {
                params: self.from_canonical(fit.params[0], fit.params[1]).to_vec(),
                ..fit
            });
        }

        let poisson = Poisson::fit_rate(x, p, opts);
        let rate = poisson.params[0];
        let second = quantile_residuals(&Poisson, &[rate], &x[1..], &p[1..]);
        if poisson.success && norm(&second) < POISSON_LIMIT_TOL {
            trace_info!(rate, "negative binomial: constraints met by Poisson limit");
            return Ok(QuantileFit {
                params: self.poisson_limit(rate).to_vec(),
                success: true,
                regime: FitRegime::PoissonLimit { rate },
            });
        }

        trace_debug!(
            poisson_success = poisson.success,
            "negative binomial: no fit and no Poisson limit"
        );
        Ok(QuantileFit {
            params: self.from_canonical(fit.params[0], fit.params[1]).to_vec(),
            success: false,
            regime: fit.regime,
        })
    }
}

/// Canonical `(α, β)` whose mean and variance match a Normal fitted to
/// the continuity-corrected quantiles.
fn moment_seed(x: &[f64], p: &[f64]) -> [f64; 2] {
    let z1 = inverse_normal_cdf(p[0]);
    let z2 = inverse_normal_cdf(p[1]);
    let sigma = (x[1] - x[0]) / (z2 - z1);
    let mean = (x[0] + 0.5 - sigma * z1).max(0.5);
    let var = sigma * sigma;
    if var > mean && var.is_finite() {
        let beta = mean / (var - mean);
        [mean * beta, beta]
    } else {
        // Under-dispersed: start near the Poisson end.
        [mean * 100.0, 100.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributions::{discrete_ppf, DEFAULT_MAX_TERMS};
    use approx::assert_relative_eq;

    #[test]
    fn test_parametrizations_agree() {
        // α = 3, β = 0.5 → μ = 6, φ = 3, p = 1/3, r = 3, b = 2
        let cases = [
            (NegativeBinomial::ALPHA_BETA, [3.0, 0.5]),
            (NegativeBinomial::MU_PHI, [6.0, 3.0]),
            (NegativeBinomial::ALPHA_P, [3.0, 1.0 / 3.0]),
            (NegativeBinomial::R_B, [3.0, 2.0]),
        ];
        for (nb, params) in cases {
            let (a, b) = nb.to_canonical(&params);
            assert_relative_eq!(a, 3.0, max_relative = 1e-14);
            assert_relative_eq!(b, 0.5, max_relative = 1e-14);
            let back = nb.from_canonical(a, b);
            assert_relative_eq!(back[0], params[0], max_relative = 1e-14);
            assert_relative_eq!(back[1], params[1], max_relative = 1e-14);
            assert_relative_eq!(
                nb.density(4.0, &params),
                NegativeBinomial::ALPHA_BETA.density(4.0, &[3.0, 0.5]),
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_pmf_and_cdf_values() {
        let nb = NegativeBinomial::ALPHA_BETA;
        let params = [3.0, 0.5];
        // C(6, 4) (1/3)^3 (2/3)^4
        let expected = 15.0 * (1.0_f64 / 3.0).powi(3) * (2.0_f64 / 3.0).powi(4);
        assert_relative_eq!(nb.density(4.0, &params), expected, max_relative = 1e-10);
        let summed: f64 = (0..=7).map(|k| nb.density(f64::from(k), &params)).sum();
        assert_relative_eq!(nb.cdf(7.0, &params), summed, max_relative = 1e-12);
        assert!(nb.density(1.5, &params).is_nan());
        assert!(nb.density(-1.0, &params).is_nan());
        assert!(nb.density(1.0, &[0.0, 0.5]).is_nan());
        assert_eq!(nb.cdf(-0.5, &params), 0.0);
    }

    #[test]
    fn test_mu_phi_infinite_dispersion_is_poisson() {
        let nb = NegativeBinomial::MU_PHI;
        assert_relative_eq!(nb.density(4.0, &[3.0, INF]), Poisson.density(4.0, &[3.0]));
        assert_relative_eq!(nb.cdf(2.0, &[3.0, INF]), Poisson.cdf(2.0, &[3.0]));
    }

    #[test]
    fn test_ppf_with_median_past_summation_budget() {
        // Close to Gamma(2, 2.5e5), whose median is 1.678·2.5e5.
        let nb = NegativeBinomial::ALPHA_BETA;
        let params = [2.0, 4e-6];
        let k = nb.ppf(0.5, &params);
        assert!((410_000.0..430_000.0).contains(&k), "{k}");
        assert!(nb.cdf(k, &params) >= 0.5);
        assert!(nb.cdf(k - 1.0, &params) < 0.5);
        let (lo, hi) = nb.default_x_range(&params);
        assert!(lo.is_finite() && hi.is_finite() && lo < k && k < hi, "({lo}, {hi})");
        assert_eq!(nb.ppf(0.0, &params), 0.0);
        assert_eq!(nb.ppf(1.0, &params), INF);
    }

    #[test]
    fn test_ppf_agrees_with_summation() {
        let nb = NegativeBinomial::ALPHA_BETA;
        let params = [3.0, 0.5];
        for p in [0.01, 0.2, 0.5, 0.77, 0.99] {
            let summed = discrete_ppf(&nb, p, &params, DEFAULT_MAX_TERMS);
            assert_eq!(nb.ppf(p, &params), summed, "p = {p}");
        }
        assert!(nb.ppf(0.5, &[0.0, 0.5]).is_nan());
        let mu_phi = NegativeBinomial::MU_PHI;
        assert_eq!(mu_phi.ppf(0.5, &[3.0, INF]), Poisson.ppf(0.5, &[3.0]));
    }

    #[test]
    fn test_quantile_set_recovers_parameters() {
        let truth = [3.0, 0.5];
        let nb = NegativeBinomial::ALPHA_BETA;
        let x = [3.0, 9.0];
        let p = [nb.cdf(3.0, &truth), nb.cdf(9.0, &truth)];
        let fit = nb.quantile_set(&x, &p, &[]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[0], 3.0, max_relative = 1e-5);
        assert_relative_eq!(fit.params[1], 0.5, max_relative = 1e-5);
    }

    #[test]
    fn test_quantile_set_reports_public_parametrization() {
        let nb = NegativeBinomial::MU_PHI;
        let truth = [6.0, 3.0];
        let x = [3.0, 9.0];
        let p = [nb.cdf(3.0, &truth), nb.cdf(9.0, &truth)];
        let fit = nb.quantile_set(&x, &p, &[]).unwrap();
        assert!(fit.success);
        assert_relative_eq!(fit.params[0], 6.0, max_relative = 1e-5);
        assert_relative_eq!(fit.params[1], 3.0, max_relative = 1e-5);
    }

    #[test]
    fn test_poisson_generated_quantiles() {
        let lambda = 5.0;
        let x = [3.0, 7.0];
        let p = [Poisson.cdf(3.0, &[lambda]), Poisson.cdf(7.0, &[lambda])];
        for nb in [
            NegativeBinomial::ALPHA_BETA,
            NegativeBinomial::MU_PHI,
            NegativeBinomial::ALPHA_P,
            NegativeBinomial::R_B,
        ] {
            let fit = nb.quantile_set(&x, &p, &[]).unwrap();
            assert!(fit.success);
            match fit.regime {
                FitRegime::PoissonLimit { rate } => {
                    assert_relative_eq!(rate, lambda, max_relative = 1e-6);
                    assert_eq!(fit.params, nb.poisson_limit(rate).to_vec());
                }
                _ => {
                    let r = quantile_residuals(&nb, &fit.params, &x, &p);
                    assert!(norm(&r) < 1e-8, "residual {r:?}");
                }
            }
        }
    }

    #[test]
    fn test_poisson_limit_encodings() {
        assert_eq!(NegativeBinomial::ALPHA_BETA.poisson_limit(2.0), [INF, INF]);
        assert_eq!(NegativeBinomial::MU_PHI.poisson_limit(2.0), [2.0, INF]);
        assert_eq!(NegativeBinomial::ALPHA_P.poisson_limit(2.0), [INF, 1.0]);
        assert_eq!(NegativeBinomial::R_B.poisson_limit(2.0), [INF, 0.0]);
    }

    #[test]
    fn test_moment_seed_over_dispersed() {
        let [alpha, beta] = moment_seed(&[2.0, 20.0], &[0.25, 0.75]);
        assert!(alpha > 0.0 && beta > 0.0);
        assert!(beta < 1.0, "wide quantiles should give a small rate, got {beta}");
    }
}
