//! Scalar and multivariate root finding.
//!
//! # Solvers
//!
//! | Function | Kind | Needs |
//! |---|---|---|
//! | [`brent`] | bracketed, scalar | sign change on `[lower, upper]` |
//! | [`newton`] | open, scalar | derivative |
//! | [`secant`] | open, scalar | starting point |
//! | [`find_root_trust_region`] | multivariate | starting vector |
//!
//! Every solver runs under an explicit iteration budget. Scalar solvers
//! report failure through [`RootError`]; the trust-region solver returns a
//! [`TrustRegionOutcome`] whose `success` flag states whether the final
//! residual met tolerance.

use crate::error::RootError;
use crate::linalg::{dot, modified_cholesky, norm, quad_form, Matrix};

// ============================================================================
// Options
// ============================================================================

/// Settings for [`brent`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BrentOptions {
    /// Absolute tolerance on the root.
    pub tol: f64,
    /// Maximum number of iterations.
    pub max_iter: usize,
}

impl Default for BrentOptions {
    fn default() -> Self {
        Self {
            tol: 1e-8,
            max_iter: 1000,
        }
    }
}

/// Settings for [`newton`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NewtonOptions {
    /// Stop when successive iterates differ by at most this much.
    pub tol: f64,
    pub max_iter: usize,
    /// Abort when `|f'(x)|` drops below this.
    pub epsilon: f64,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            tol: 1e-8,
            max_iter: 200,
            epsilon: 1e-14,
        }
    }
}

/// Settings for [`secant`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecantOptions {
    /// Stop when successive iterates differ by at most this much.
    pub tol: f64,
    pub max_iter: usize,
    /// Relative and absolute offset of the second starting point.
    pub h: f64,
}

impl Default for SecantOptions {
    fn default() -> Self {
        Self {
            tol: 1e-8,
            max_iter: 200,
            h: 1e-4,
        }
    }
}

/// Settings for [`find_root_trust_region`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrustRegionOptions {
    /// Converged when every residual component is at most `tol` in magnitude.
    pub tol: f64,
    pub max_iter: usize,
    /// Upper bound Δ̄ on the trust radius; the initial radius is `0.99·Δ̄`.
    pub max_radius: f64,
    /// Minimum ratio of actual to predicted reduction for accepting a step.
    pub eta: f64,
    /// Stop when the trust radius falls below this.
    pub min_radius: f64,
    /// Step used by the central-difference Jacobian.
    pub jacobian_eps: f64,
}

impl Default for TrustRegionOptions {
    fn default() -> Self {
        Self {
            tol: 1e-9,
            max_iter: 10_000,
            max_radius: 1000.0,
            eta: 0.125,
            min_radius: 1e-12,
            jacobian_eps: 4.7e-6,
        }
    }
}

// ============================================================================
// Brent
// ============================================================================

/// Finds a root of `f` on `[lower, upper]` by Brent's method.
///
/// Combines inverse quadratic interpolation, secant steps, and bisection,
/// falling back to bisection whenever interpolation would leave the bracket
/// or converge too slowly.
///
/// Reference: Brent (1973), *Algorithms for Minimization without
/// Derivatives*, Chapter 4.
///
/// # Errors
/// - [`RootError::NotBracketed`] if `f(lower)` and `f(upper)` share a sign.
/// - [`RootError::NonFinite`] if `f` is NaN at an endpoint.
/// - [`RootError::MaxIterations`] if the budget runs out.
///
/// # Examples
/// ```
/// use u_probdist::roots::{brent, BrentOptions};
/// let root = brent(|x| x * x - 2.0, 0.0, 2.0, &BrentOptions::default()).unwrap();
/// assert!((root - 2.0_f64.sqrt()).abs() < 1e-8);
/// ```
pub fn brent<F>(mut f: F, lower: f64, upper: f64, opts: &BrentOptions) -> Result<f64, RootError>
where
    F: FnMut(f64) -> f64,
{
    let mut a = lower;
    let mut b = upper;
    let mut fa = f(a);
    let mut fb = f(b);

    if fa.is_nan() {
        return Err(RootError::NonFinite { x: a });
    }
    if fb.is_nan() {
        return Err(RootError::NonFinite { x: b });
    }
    if fa.abs() < opts.tol {
        return Ok(a);
    }
    if fb.abs() < opts.tol {
        return Ok(b);
    }
    if (fa > 0.0) == (fb > 0.0) {
        trace_debug!(lower, upper, fa, fb, "brent: root not bracketed");
        return Err(RootError::NotBracketed {
            f_lower: fa,
            f_upper: fb,
        });
    }

    let mut c = a;
    let mut fc = fa;

    for _ in 0..opts.max_iter {
        let prev_step = b - a;

        // Keep b as the best estimate
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let tol_act = 2.0 * f64::EPSILON * b.abs() + opts.tol / 2.0;
        let mut new_step = (c - b) / 2.0;

        if new_step.abs() <= tol_act || fb == 0.0 {
            return Ok(b);
        }

        if prev_step.abs() >= tol_act && fa.abs() > fb.abs() {
            let cb = c - b;
            let (mut p, mut q);
            if a == c {
                // Secant
                let t1 = fb / fa;
                p = cb * t1;
                q = 1.0 - t1;
            } else {
                // Inverse quadratic interpolation
                let qa = fa / fc;
                let t1 = fb / fc;
                let t2 = fb / fa;
                p = t2 * (cb * qa * (qa - t1) - (b - a) * (t1 - 1.0));
                q = (qa - 1.0) * (t1 - 1.0) * (t2 - 1.0);
            }
            if p > 0.0 {
                q = -q;
            } else {
                p = -p;
            }

            if p < 0.75 * cb * q - (tol_act * q).abs() / 2.0 && p < (prev_step * q / 2.0).abs() {
                new_step = p / q;
            }
        }

        if new_step.abs() < tol_act {
            new_step = if new_step > 0.0 { tol_act } else { -tol_act };
        }

        a = b;
        fa = fb;
        b += new_step;
        fb = f(b);
        if fb.is_nan() {
            return Err(RootError::NonFinite { x: b });
        }

        if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
            c = a;
            fc = fa;
        }
    }

    Err(RootError::MaxIterations {
        iterations: opts.max_iter,
    })
}

// ============================================================================
// Newton and Secant
// ============================================================================

/// Newton's method from `x0` using the derivative `df`.
///
/// # Errors
/// - [`RootError::FlatDerivative`] if `|f'(x)| < epsilon` at some iterate.
/// - [`RootError::NonFinite`] if an iterate becomes NaN or infinite.
/// - [`RootError::MaxIterations`] if the budget runs out.
pub fn newton<F, D>(mut f: F, mut df: D, x0: f64, opts: &NewtonOptions) -> Result<f64, RootError>
where
    F: FnMut(f64) -> f64,
    D: FnMut(f64) -> f64,
{
    let mut x0 = x0;
    for _ in 0..opts.max_iter {
        let y = f(x0);
        let slope = df(x0);
        if slope.abs() < opts.epsilon {
            return Err(RootError::FlatDerivative {
                x: x0,
                derivative: slope,
            });
        }
        let x = x0 - y / slope;
        if !x.is_finite() {
            return Err(RootError::NonFinite { x: x0 });
        }
        if (x - x0).abs() <= opts.tol {
            return Ok(x);
        }
        x0 = x;
    }
    Err(RootError::MaxIterations {
        iterations: opts.max_iter,
    })
}

/// Secant method from `x0`.
///
/// The second starting point is `x0(1+h) ± h`. The iterate with the smaller
/// residual is kept as the current best estimate, so the update is always
/// formed from the better point.
///
/// # Errors
/// - [`RootError::NonFinite`] if an iterate becomes NaN or infinite.
/// - [`RootError::MaxIterations`] if the budget runs out or the residuals
///   stagnate at two distinct points.
pub fn secant<F>(mut f: F, x0: f64, opts: &SecantOptions) -> Result<f64, RootError>
where
    F: FnMut(f64) -> f64,
{
    let mut x0 = x0;
    let mut x1 = x0 * (1.0 + opts.h);
    x1 += if x1 >= 0.0 { opts.h } else { -opts.h };

    let mut q0 = f(x0);
    let mut q1 = f(x1);
    if q1.abs() < q0.abs() {
        std::mem::swap(&mut x0, &mut x1);
        std::mem::swap(&mut q0, &mut q1);
    }

    for _ in 0..opts.max_iter {
        if q0 == q1 {
            if x0 == x1 {
                return Ok(x0);
            }
            break;
        }
        let x = if q1.abs() > q0.abs() {
            (x0 - q0 / q1 * x1) / (1.0 - q0 / q1)
        } else {
            (x1 - q1 / q0 * x0) / (1.0 - q1 / q0)
        };
        if !x.is_finite() {
            return Err(RootError::NonFinite { x: x1 });
        }
        if (x - x0).abs() <= opts.tol {
            return Ok(x);
        }
        x0 = x1;
        q0 = q1;
        x1 = x;
        q1 = f(x1);
    }

    Err(RootError::MaxIterations {
        iterations: opts.max_iter,
    })
}

// ============================================================================
// Trust-Region Dogleg
// ============================================================================

/// Result of [`find_root_trust_region`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrustRegionOutcome {
    /// Final iterate.
    pub x: Vec<f64>,
    /// Residual `f(x)` at the final iterate.
    pub residual: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// True if every residual component is within tolerance.
    pub success: bool,
}

impl TrustRegionOutcome {
    /// Euclidean norm of the final residual.
    pub fn residual_norm(&self) -> f64 {
        norm(&self.residual)
    }
}

/// Central-difference Jacobian of `f` at `x`.
///
/// Column `j` is `(f(x + h eⱼ) − f(x − h eⱼ)) / 2h` with
/// `h = eps · max(|xⱼ|, 1)`.
pub fn jacobian_central_diff<F>(f: &mut F, x: &[f64], eps: f64) -> Matrix
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    let n = x.len();
    let mut plus = x.to_vec();
    let mut minus = x.to_vec();
    let mut columns = Vec::with_capacity(n);

    for j in 0..n {
        let h = eps * x[j].abs().max(1.0);
        plus[j] = x[j] + h;
        minus[j] = x[j] - h;
        let f_plus = f(&plus);
        let f_minus = f(&minus);
        plus[j] = x[j];
        minus[j] = x[j];
        let span = 2.0 * h;
        columns.push(
            f_plus
                .iter()
                .zip(&f_minus)
                .map(|(p, m)| (p - m) / span)
                .collect::<Vec<f64>>(),
        );
    }

    let m = columns.first().map_or(0, Vec::len);
    let mut jac = Matrix::zeros(m, n);
    for (j, col) in columns.iter().enumerate() {
        for (i, &v) in col.iter().enumerate().take(m) {
            jac[(i, j)] = v;
        }
    }
    jac
}

/// Solves `f(x) = 0` by a trust-region dogleg method with a
/// central-difference Jacobian.
///
/// See [`find_root_trust_region_with_jacobian`] for the algorithm.
///
/// # Examples
/// ```
/// use u_probdist::roots::{find_root_trust_region, TrustRegionOptions};
/// let f = |x: &[f64]| vec![x[0] * x[0] - 4.0, x[0] + x[1] - 3.0];
/// let out = find_root_trust_region(f, &[1.0, 1.0], &TrustRegionOptions::default());
/// assert!(out.success);
/// assert!((out.x[0] - 2.0).abs() < 1e-8);
/// assert!((out.x[1] - 1.0).abs() < 1e-8);
/// ```
pub fn find_root_trust_region<F>(f: F, x0: &[f64], opts: &TrustRegionOptions) -> TrustRegionOutcome
where
    F: FnMut(&[f64]) -> Vec<f64>,
{
    let eps = opts.jacobian_eps;
    trust_region(
        f,
        |f: &mut F, x: &[f64]| jacobian_central_diff(f, x, eps),
        x0,
        opts,
    )
}

/// Solves `f(x) = 0` by a trust-region dogleg method with a supplied
/// Jacobian.
///
/// # Algorithm
/// At each iterate the Gauss–Newton system `JᵀJ p = −Jᵀr` is solved by
/// [`modified_cholesky`](crate::linalg::modified_cholesky). The Newton step
/// is taken when it is available and fits in the trust radius Δ; otherwise
/// the Cauchy (steepest-descent) step is used, or the dogleg path between
/// them is cut at the boundary. With `ρ` the ratio of actual to predicted
/// reduction in `‖r‖²`, the radius shrinks to `‖p‖/4` when `ρ < ¼` and
/// doubles (up to Δ̄) when `ρ > ¾` on the boundary; the step is accepted
/// when `ρ > η`.
///
/// Reference: Nocedal & Wright (2006), *Numerical Optimization*, 2nd ed.,
/// §4.1 and Algorithm 4.1.
pub fn find_root_trust_region_with_jacobian<F, J>(
    f: F,
    mut jac: J,
    x0: &[f64],
    opts: &TrustRegionOptions,
) -> TrustRegionOutcome
where
    F: FnMut(&[f64]) -> Vec<f64>,
    J: FnMut(&[f64]) -> Matrix,
{
    trust_region(f, |_: &mut F, x: &[f64]| jac(x), x0, opts)
}

fn trust_region<F, J>(
    mut f: F,
    mut jac: J,
    x0: &[f64],
    opts: &TrustRegionOptions,
) -> TrustRegionOutcome
where
    F: FnMut(&[f64]) -> Vec<f64>,
    J: FnMut(&mut F, &[f64]) -> Matrix,
{
    let mut x = x0.to_vec();
    let mut delta = 0.99 * opts.max_radius;
    let mut r = f(&x);

    if r.iter().any(|v| !v.is_finite()) {
        trace_debug!(?x, "trust region: non-finite residual at starting point");
        return TrustRegionOutcome {
            x,
            residual: r,
            iterations: 0,
            success: false,
        };
    }

    let mut j = jac(&mut f, &x);
    let mut jtj = j.gram();
    let mut jtr = j.transpose_mul_vec(&r);

    let mut iterations = 0;
    while iterations < opts.max_iter && !within_tol(&r, opts.tol) && delta >= opts.min_radius {
        let p = dogleg_step(&jtj, &jtr, delta);
        let trial: Vec<f64> = x.iter().zip(&p).map(|(a, b)| a + b).collect();
        let new_r = f(&trial);
        let rho = reduction_ratio(&r, &new_r, &j, &p);
        let p_norm = norm(&p);

        if !rho.is_finite() || rho < 0.25 {
            delta = p_norm / 4.0;
        } else if rho > 0.75 && (p_norm - delta).abs() < 1e-12 {
            delta = (2.0 * delta).min(opts.max_radius);
        }

        if rho.is_finite() && rho > opts.eta {
            x = trial;
            r = new_r;
            j = jac(&mut f, &x);
            jtj = j.gram();
            jtr = j.transpose_mul_vec(&r);
        }

        iterations += 1;
    }

    let success = within_tol(&r, opts.tol);
    trace_debug!(iterations, success, delta, "trust region finished");

    TrustRegionOutcome {
        x,
        residual: r,
        iterations,
        success,
    }
}

/// True if every component is finite and at most `tol` in magnitude.
fn within_tol(r: &[f64], tol: f64) -> bool {
    r.iter().all(|v| v.abs() <= tol)
}

/// Ratio of actual to model-predicted reduction in `‖r‖²`.
fn reduction_ratio(r: &[f64], new_r: &[f64], j: &Matrix, p: &[f64]) -> f64 {
    let r2 = dot(r, r);
    let actual = r2 - dot(new_r, new_r);
    let model: Vec<f64> = r.iter().zip(j.mul_vec(p)).map(|(a, b)| a + b).collect();
    let predicted = r2 - dot(&model, &model);
    actual / predicted
}

/// Dogleg step for the model `‖r + J p‖²` within radius `delta`.
fn dogleg_step(jtj: &Matrix, jtr: &[f64], delta: f64) -> Vec<f64> {
    let chol = modified_cholesky(jtj);
    let p_newton: Vec<f64> = chol.solve(jtr).into_iter().map(|v| -v).collect();

    if chol.positive_definite && norm(&p_newton) <= delta {
        return p_newton;
    }

    let g_norm = norm(jtr);
    if g_norm == 0.0 {
        return vec![0.0; jtr.len()];
    }

    // Cauchy point
    let curvature = quad_form(jtj, jtr);
    let tau = if curvature > 0.0 {
        (g_norm.powi(3) / (delta * curvature)).min(1.0)
    } else {
        1.0
    };
    let scale = -tau * delta / g_norm;
    let p_cauchy: Vec<f64> = jtr.iter().map(|g| scale * g).collect();
    let pc_norm = norm(&p_cauchy);

    if !chol.positive_definite || (pc_norm - delta).abs() <= 1e-12 {
        return p_cauchy;
    }

    // Solve ‖pC + β(pN − pC)‖² = Δ² for β ∈ [0, 1]
    let pn2 = dot(&p_newton, &p_newton);
    let pc2 = pc_norm * pc_norm;
    let pnpc = dot(&p_newton, &p_cauchy);
    let a = pn2 + pc2 - 2.0 * pnpc;
    let b = 2.0 * (pnpc - pc2);
    let c = pc2 - delta * delta;
    let disc = (b * b - 4.0 * a * c).max(0.0);
    let q = -0.5 * (b + b.signum() * disc.sqrt());

    let beta = if b.abs() < 1e-12 {
        (-c / a).sqrt()
    } else if b < 0.0 {
        q / a
    } else {
        c / q
    };

    if (0.0..=1.0).contains(&beta) {
        p_cauchy
            .iter()
            .zip(&p_newton)
            .map(|(pc, pn)| pc + beta * (pn - pc))
            .collect()
    } else {
        p_cauchy
    }
}
