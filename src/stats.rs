//! Compensated summation.
//!
//! Discrete CDFs and PPFs accumulate long runs of probability masses whose
//! magnitudes span many orders; plain `+=` drifts by O(nε). The streaming
//! [`CompensatedSum`] keeps the error at O(ε) independent of `n`.
//!
//! Reference: Neumaier (1974), "Rundungsfehleranalyse einiger Verfahren
//! zur Summation endlicher Summen", *Zeitschrift für Angewandte
//! Mathematik und Mechanik* 54(1), pp. 39–51.

/// Streaming Neumaier (improved Kahan) accumulator.
///
/// # Examples
/// ```
/// use u_probdist::stats::CompensatedSum;
/// let mut acc = CompensatedSum::new();
/// for _ in 0..10 {
///     acc.add(0.1);
/// }
/// assert_eq!(acc.value(), 1.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `x`. The larger operand's low-order bits go into the
    /// compensation term.
    pub fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    /// Current compensated total.
    pub fn value(&self) -> f64 {
        self.sum + self.compensation
    }
}

impl Extend<f64> for CompensatedSum {
    fn extend<I: IntoIterator<Item = f64>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}

/// Compensated sum of a slice.
pub fn compensated_sum(data: &[f64]) -> f64 {
    let mut acc = CompensatedSum::new();
    acc.extend(data.iter().copied());
    acc.value()
}
