//! # u-probdist
//!
//! Univariate probability distributions for interactive exploration.
//!
//! This crate provides the numerical core behind a distribution explorer:
//! special functions with no closed form, scalar and multivariate root
//! finders, and a uniform distribution abstraction whose hardest capability
//! is *quantile matching*: solving for parameters such that given
//! `(x, p)` pairs lie exactly on the CDF.
//!
//! ## Modules
//!
//! - [`special`]: log-gamma, log-factorial, error function and inverse,
//!   incomplete beta/gamma, modified Bessel I₀
//! - [`quadrature`]: Clenshaw–Curtis integration
//! - [`linalg`]: small dense linear algebra, modified Cholesky
//! - [`roots`]: Brent, Newton, secant, trust-region dogleg
//! - [`distributions`]: the [`Distribution`](distributions::Distribution)
//!   trait and 24 families
//! - [`random`]: seeded RNG and inverse-transform sampling
//! - [`stats`]: compensated summation
//!
//! ## Design Philosophy
//!
//! - **Pure functions**: no global state, no caches; every call is
//!   independent and thread-safe
//! - **NaN for undefined values**: evaluation never panics or errors on
//!   out-of-domain input
//! - **Explicit budgets**: every iterative routine takes a maximum
//!   iteration count and reports failure when it is exhausted
//! - **Property-based testing**: mathematical invariants verified via proptest
//!
//! ## Feature Flags
//!
//! - `tracing`: emit solver diagnostics through the `tracing` crate
//! - `serde`: derive `Serialize`/`Deserialize` for option and result types

#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

pub mod distributions;
pub mod error;
pub mod linalg;
pub mod quadrature;
pub mod random;
pub mod roots;
pub mod special;
pub mod stats;

pub use distributions::{Distribution, FitRegime, Kind, QuantileFit, QuantileOptions};
pub use error::{DistributionError, Result, RootError};
