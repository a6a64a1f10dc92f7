//! Clenshaw–Curtis quadrature.
//!
//! Used for densities without a closed-form CDF. A [`ClenshawCurtis`] rule
//! holds nodes and weights for a fixed number of points on `[-1, 1]`; it is
//! built per call and may be reused across several integrals within that
//! call, but is never cached globally.
//!
//! Reference: Trefethen (2000), *Spectral Methods in MATLAB*, program
//! `clencurt`.

use std::f64::consts::PI;

/// Default number of Chebyshev points.
pub const DEFAULT_POINTS: usize = 100;

/// Chebyshev extremal points `cos(πi/(n−1))` mapped onto `[low, high]`.
///
/// Points run from `high` down to `low`. Returns an empty vector for
/// `n < 2`.
pub fn chebyshev_points(n: usize, low: f64, high: f64) -> Vec<f64> {
    if n < 2 {
        return Vec::new();
    }
    let half_width = (high - low) / 2.0;
    let mid = (high + low) / 2.0;
    let last = (n - 1) as f64;
    (0..n)
        .map(|i| half_width * (PI * i as f64 / last).cos() + mid)
        .collect()
}

/// Clenshaw–Curtis weights for `n` points on `[-1, 1]`.
///
/// The weights sum to 2. Returns an empty vector for `n < 2`.
pub fn clenshaw_curtis_weights(n: usize) -> Vec<f64> {
    if n < 2 {
        return Vec::new();
    }
    let m = n - 1;
    let mf = m as f64;
    let theta: Vec<f64> = (0..=m).map(|i| PI * i as f64 / mf).collect();
    let mut w = vec![0.0; m + 1];
    let mut v = vec![1.0; m.saturating_sub(1)];

    if m % 2 == 0 {
        w[0] = 1.0 / (mf * mf - 1.0);
        w[m] = w[0];
        for k in 1..m / 2 {
            let kf = k as f64;
            for j in 1..m {
                v[j - 1] -= 2.0 * (2.0 * kf * theta[j]).cos() / (4.0 * kf * kf - 1.0);
            }
        }
        for j in 1..m {
            v[j - 1] -= (mf * theta[j]).cos() / (mf * mf - 1.0);
        }
    } else {
        w[0] = 1.0 / (mf * mf);
        w[m] = w[0];
        for k in 1..=(m - 1) / 2 {
            let kf = k as f64;
            for j in 1..m {
                v[j - 1] -= 2.0 * (2.0 * kf * theta[j]).cos() / (4.0 * kf * kf - 1.0);
            }
        }
    }

    for j in 1..m {
        w[j] = 2.0 * v[j - 1] / mf;
    }
    w
}

/// A Clenshaw–Curtis rule on the reference interval `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct ClenshawCurtis {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl ClenshawCurtis {
    /// Builds a rule with `n` points (at least 2).
    pub fn new(n: usize) -> Self {
        let n = n.max(2);
        Self {
            nodes: chebyshev_points(n, -1.0, 1.0),
            weights: clenshaw_curtis_weights(n),
        }
    }

    /// Number of points in the rule.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a rule has at least two points.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Integrates `f` over `[a, b]`.
    pub fn integrate<F: FnMut(f64) -> f64>(&self, mut f: F, a: f64, b: f64) -> f64 {
        let half_width = (b - a) / 2.0;
        let mid = (b + a) / 2.0;
        let sum: f64 = self
            .nodes
            .iter()
            .zip(&self.weights)
            .map(|(&t, &w)| w * f(half_width * t + mid))
            .sum();
        half_width * sum
    }
}

impl Default for ClenshawCurtis {
    fn default() -> Self {
        Self::new(DEFAULT_POINTS)
    }
}

/// Integrates `f` over `[a, b]` with an `n`-point Clenshaw–Curtis rule.
///
/// # Examples
/// ```
/// use u_probdist::quadrature::clenshaw_curtis_integrate;
/// let area = clenshaw_curtis_integrate(|x: f64| x.sin(), 0.0, std::f64::consts::PI, 100);
/// assert!((area - 2.0).abs() < 1e-12);
/// ```
pub fn clenshaw_curtis_integrate<F: FnMut(f64) -> f64>(f: F, a: f64, b: f64, n: usize) -> f64 {
    ClenshawCurtis::new(n).integrate(f, a, b)
}
