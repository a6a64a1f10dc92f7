//! Error types.
//!
//! Evaluation functions never error: they return `f64::NAN` for undefined
//! values. The types here cover setup mistakes (malformed parameter vectors
//! or quantile constraints) and solver failures.

/// Errors raised while validating parameters or quantile constraints.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    /// The parameter vector has the wrong length.
    #[error("{name} expects {expected} parameters, got {got}")]
    ParamCount {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    /// A parameter lies outside its admissible range.
    #[error("{name}: parameter {slot} = {value} outside [{min}, {max}]")]
    ParamOutOfRange {
        name: &'static str,
        slot: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// An integer-valued parameter has a fractional part.
    #[error("{name}: parameter {slot} = {value} must be an integer")]
    ParamNotInteger {
        name: &'static str,
        slot: &'static str,
        value: f64,
    },

    /// Number of quantile constraints does not match the free parameter count.
    #[error("{name} needs {expected} quantile constraints, got {got}")]
    ConstraintCount {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    /// `x` and `p` have different lengths.
    #[error("x and p must have equal length, got {x_len} and {p_len}")]
    LengthMismatch { x_len: usize, p_len: usize },

    /// Wrong number of values supplied for the fixed parameters.
    #[error("{name} needs {expected} fixed parameter values, got {got}")]
    ExtraParamCount {
        name: &'static str,
        expected: usize,
        got: usize,
    },

    /// A probability is not strictly inside (0, 1).
    #[error("p[{index}] = {value} must satisfy 0 < p < 1")]
    ProbabilityOutOfRange { index: usize, value: f64 },

    /// Probabilities are not strictly increasing.
    #[error("quantile probabilities must be strictly increasing")]
    UnorderedProbabilities,

    /// Quantile values are not strictly increasing.
    #[error("quantile values must be strictly increasing")]
    UnorderedValues,

    /// A quantile value lies outside the support.
    #[error("x[{index}] = {value} lies outside the support of {name}")]
    OutsideSupport {
        name: &'static str,
        index: usize,
        value: f64,
    },

    /// The family has no quantile-matching procedure.
    #[error("{name} does not support quantile matching")]
    Unsupported { name: &'static str },
}

/// Errors raised by the scalar root finders.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RootError {
    /// `f(lower)` and `f(upper)` have the same sign.
    #[error("root not bracketed: f(lower) = {f_lower}, f(upper) = {f_upper}")]
    NotBracketed { f_lower: f64, f_upper: f64 },

    /// The iteration budget ran out before reaching tolerance.
    #[error("no convergence after {iterations} iterations")]
    MaxIterations { iterations: usize },

    /// Newton's method hit a near-zero derivative.
    #[error("derivative {derivative} too small at x = {x}")]
    FlatDerivative { x: f64, derivative: f64 },

    /// The function returned NaN or infinity.
    #[error("non-finite function value at x = {x}")]
    NonFinite { x: f64 },
}

/// Result alias for distribution setup operations.
pub type Result<T> = std::result::Result<T, DistributionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = DistributionError::ConstraintCount {
            name: "Normal",
            expected: 2,
            got: 1,
        };
        assert_eq!(e.to_string(), "Normal needs 2 quantile constraints, got 1");

        let e = RootError::NotBracketed {
            f_lower: 1.0,
            f_upper: 2.0,
        };
        assert!(e.to_string().contains("not bracketed"));
    }

    #[test]
    fn test_errors_are_std_errors() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<DistributionError>();
        assert_error::<RootError>();
    }
}
