//! Small dense linear algebra for the trust-region solver.
//!
//! Systems here are at most 3×3 (one row per quantile constraint), so a
//! plain row-major [`Matrix`] over `Vec<f64>` is all that is needed.
//!
//! # Algorithms
//!
//! - **Modified Cholesky**: Gill–Murray–Wright with diagonal pivoting.
//!   Produces `P A Pᵀ + E = L Lᵀ` with a diagonal perturbation `E` that
//!   keeps the factor well defined even for indefinite or singular `A`.
//!   Reference: Gill, Murray & Wright (1981), *Practical Optimization*,
//!   §4.4.2.2.
//! - **Triangular solves**: column-oriented substitution, Golub & Van Loan
//!   (2013), *Matrix Computations*, Algorithms 3.1.3–3.1.4.

use std::ops::{Index, IndexMut};

/// Pivots smaller than this are treated as zero in triangular solves.
const PIVOT_EPS: f64 = 1e-14;

/// Dense row-major matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// A `rows × cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// The `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Builds a matrix from row slices. Returns `None` if rows are ragged.
    pub fn from_rows(rows: &[&[f64]]) -> Option<Self> {
        let cols = rows.first().map_or(0, |r| r.len());
        if rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        Some(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flat_map(|r| r.iter().copied()).collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t[(j, i)] = self[(i, j)];
            }
        }
        t
    }

    /// `A x`.
    pub fn mul_vec(&self, x: &[f64]) -> Vec<f64> {
        (0..self.rows).map(|i| dot(self.row(i), x)).collect()
    }

    /// `Aᵀ x`.
    pub fn transpose_mul_vec(&self, x: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.cols];
        for (i, &xi) in x.iter().enumerate().take(self.rows) {
            for (o, &a) in out.iter_mut().zip(self.row(i)) {
                *o += a * xi;
            }
        }
        out
    }

    /// Gram matrix `AᵀA`.
    pub fn gram(&self) -> Self {
        let mut g = Self::zeros(self.cols, self.cols);
        for i in 0..self.cols {
            for j in 0..=i {
                let s: f64 = (0..self.rows).map(|k| self[(k, i)] * self[(k, j)]).sum();
                g[(i, j)] = s;
                g[(j, i)] = s;
            }
        }
        g
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        &mut self.data[i * self.cols + j]
    }
}

/// Dot product over the common prefix of `a` and `b`.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean norm.
pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

/// Quadratic form `xᵀ A x`.
pub fn quad_form(a: &Matrix, x: &[f64]) -> f64 {
    dot(x, &a.mul_vec(x))
}

/// Solves `L x = b` for lower-triangular `L`; near-zero pivots yield a zero
/// component.
pub fn lower_tri_solve(l: &Matrix, b: &[f64]) -> Vec<f64> {
    let n = l.rows();
    let mut x = b.to_vec();
    for j in 0..n {
        if l[(j, j)].abs() > PIVOT_EPS {
            x[j] /= l[(j, j)];
            for i in j + 1..n {
                x[i] -= x[j] * l[(i, j)];
            }
        } else {
            x[j] = 0.0;
        }
    }
    x
}

/// Solves `U x = b` for upper-triangular `U`; near-zero pivots yield a zero
/// component.
pub fn upper_tri_solve(u: &Matrix, b: &[f64]) -> Vec<f64> {
    let n = u.rows();
    let mut x = b.to_vec();
    for j in (0..n).rev() {
        if u[(j, j)].abs() > PIVOT_EPS {
            x[j] /= u[(j, j)];
            for i in 0..j {
                x[i] -= x[j] * u[(i, j)];
            }
        } else {
            x[j] = 0.0;
        }
    }
    x
}

/// Result of [`modified_cholesky`].
#[derive(Debug, Clone)]
pub struct ModifiedCholesky {
    /// Lower-triangular factor of the permuted, perturbed matrix.
    pub l: Matrix,
    /// `perm[i]` is the original index of row/column `i`.
    pub perm: Vec<usize>,
    /// False if a negative pivot was encountered, i.e. the input was not
    /// positive semi-definite.
    pub positive_definite: bool,
}

impl ModifiedCholesky {
    /// Solves `A x = b` using the factorization `P A Pᵀ ≈ L Lᵀ`.
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.perm.len();
        let permuted: Vec<f64> = self.perm.iter().map(|&p| b[p]).collect();
        let y = lower_tri_solve(&self.l, &permuted);
        let z = upper_tri_solve(&self.l.transpose(), &y);
        let mut x = vec![0.0; n];
        for (i, &p) in self.perm.iter().enumerate() {
            x[p] = z[i];
        }
        x
    }
}

/// Gill–Murray–Wright modified Cholesky factorization of a symmetric matrix.
///
/// Only the lower triangle of `a` is read.
pub fn modified_cholesky(a: &Matrix) -> ModifiedCholesky {
    let n = a.rows();
    let mut l = a.clone();
    let mut perm: Vec<usize> = (0..n).collect();
    let mut positive_definite = true;

    let mut xi: f64 = 0.0;
    let mut eta: f64 = 0.0;
    for i in 0..n {
        eta = eta.max(l[(i, i)].abs());
        for j in 0..i {
            xi = xi.max(l[(i, j)].abs());
        }
    }

    let beta_sq = if n > 1 {
        eta.max(xi / ((n * n - 1) as f64).sqrt())
    } else {
        eta
    };
    let beta = beta_sq.sqrt().max(PIVOT_EPS);

    for k in 0..n {
        // Largest remaining diagonal
        let mut mu = k;
        for i in k + 1..n {
            if l[(mu, mu)] < l[(i, i)] {
                mu = i;
            }
        }

        // Symmetric pivot k <-> mu, lower triangle only
        perm.swap(k, mu);
        for i in 0..k {
            let t = l[(k, i)];
            l[(k, i)] = l[(mu, i)];
            l[(mu, i)] = t;
        }
        let t = l[(k, k)];
        l[(k, k)] = l[(mu, mu)];
        l[(mu, mu)] = t;
        for i in k + 1..mu {
            let t = l[(i, k)];
            l[(i, k)] = l[(mu, i)];
            l[(mu, i)] = t;
        }
        for i in mu + 1..n {
            let t = l[(i, k)];
            l[(i, k)] = l[(i, mu)];
            l[(i, mu)] = t;
        }

        let mut c_max: f64 = 0.0;
        for i in k + 1..n {
            c_max = c_max.max(l[(i, k)].abs());
        }
        let c_sq = (c_max / beta).powi(2);

        if l[(k, k)] < 0.0 {
            positive_definite = false;
        }

        let pivot = l[(k, k)].abs().max(PIVOT_EPS * eta).max(c_sq);
        l[(k, k)] = pivot.sqrt();

        for i in k + 1..n {
            l[(i, k)] /= l[(k, k)];
        }

        for j in k + 1..n {
            for i in j..n {
                l[(i, j)] -= l[(i, k)] * l[(j, k)];
            }
        }
    }

    for i in 0..n {
        for j in i + 1..n {
            l[(i, j)] = 0.0;
        }
    }

    ModifiedCholesky {
        l,
        perm,
        positive_definite,
    }
}

/// Solves `A x = b` for symmetric positive-definite `A`.
///
/// Returns `None` if the modified Cholesky factorization detects that `A`
/// is not positive semi-definite.
pub fn solve_pos_def(a: &Matrix, b: &[f64]) -> Option<Vec<f64>> {
    let chol = modified_cholesky(a);
    chol.positive_definite.then(|| chol.solve(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spd() -> Matrix {
        Matrix::from_rows(&[&[4.0, 2.0, 0.6], &[2.0, 5.0, 1.0], &[0.6, 1.0, 3.0]]).unwrap()
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(Matrix::from_rows(&[&[1.0, 2.0], &[3.0]]).is_none());
    }

    #[test]
    fn test_mul_and_transpose() {
        let a = Matrix::from_rows(&[&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(a.mul_vec(&[1.0, 0.0, -1.0]), vec![-2.0, -2.0]);
        assert_eq!(a.transpose_mul_vec(&[1.0, 1.0]), vec![5.0, 7.0, 9.0]);
        assert_eq!(a.transpose().row(2), &[3.0, 6.0]);
    }

    #[test]
    fn test_gram_matches_product() {
        let a = Matrix::from_rows(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]).unwrap();
        let g = a.gram();
        assert_eq!(g.row(0), &[35.0, 44.0]);
        assert_eq!(g.row(1), &[44.0, 56.0]);
    }

    #[test]
    fn test_norm_and_quad_form() {
        assert_relative_eq!(norm(&[3.0, 4.0]), 5.0);
        let i = Matrix::identity(2);
        assert_relative_eq!(quad_form(&i, &[3.0, 4.0]), 25.0);
    }

    #[test]
    fn test_triangular_solves() {
        let l = Matrix::from_rows(&[&[2.0, 0.0], &[1.0, 4.0]]).unwrap();
        let x = lower_tri_solve(&l, &[4.0, 10.0]);
        assert_relative_eq!(x[0], 2.0);
        assert_relative_eq!(x[1], 2.0);
        let u = l.transpose();
        let x = upper_tri_solve(&u, &[8.0, 8.0]);
        assert_relative_eq!(x[1], 2.0);
        assert_relative_eq!(x[0], 3.0);
    }

    #[test]
    fn test_tri_solve_zero_pivot() {
        let l = Matrix::from_rows(&[&[0.0, 0.0], &[1.0, 2.0]]).unwrap();
        let x = lower_tri_solve(&l, &[5.0, 4.0]);
        assert_eq!(x, vec![0.0, 2.0]);
    }

    #[test]
    fn test_cholesky_solve_spd() {
        let a = spd();
        let x_true = [1.0, -2.0, 0.5];
        let b = a.mul_vec(&x_true);
        let x = solve_pos_def(&a, &b).expect("SPD matrix");
        for (got, want) in x.iter().zip(&x_true) {
            assert_relative_eq!(got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cholesky_reconstructs_permuted_matrix() {
        let a = spd();
        let chol = modified_cholesky(&a);
        assert!(chol.positive_definite);
        let llt = {
            let lt = chol.l.transpose();
            let mut m = Matrix::zeros(3, 3);
            for i in 0..3 {
                for j in 0..3 {
                    let col: Vec<f64> = (0..3).map(|k| lt[(k, j)]).collect();
                    m[(i, j)] = dot(chol.l.row(i), &col);
                }
            }
            m
        };
        for i in 0..3 {
            for j in 0..3 {
                let orig = a[(chol.perm[i], chol.perm[j])];
                assert_relative_eq!(llt[(i, j)], orig, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_cholesky_indefinite_reports_failure() {
        let a = Matrix::from_rows(&[&[1.0, 0.0], &[0.0, -1.0]]).unwrap();
        assert!(!modified_cholesky(&a).positive_definite);
        assert!(solve_pos_def(&a, &[1.0, 1.0]).is_none());
    }

    #[test]
    fn test_cholesky_singular_is_perturbed() {
        // Rank-one JᵀJ still yields a usable factor.
        let j = Matrix::from_rows(&[&[1.0, 2.0], &[2.0, 4.0]]).unwrap();
        let chol = modified_cholesky(&j.gram());
        assert!(chol.solve(&[1.0, 2.0]).iter().all(|v| v.is_finite()));
    }
}
