//! Pairwise comparison matrices and eigenvector priority derivation
//!
//! A [`PairwiseMatrix`] holds the relative-importance judgments for one group
//! of sibling items as a positive reciprocal matrix: `m[i][j]` says how much
//! more important item `i` is than item `j`, and `m[j][i]` is always its
//! reciprocal. Priority weights are the principal (Perron–Frobenius)
//! eigenvector of that matrix, and the spread between the principal
//! eigenvalue and the matrix size measures how self-contradictory the
//! judgments are.
//!
//! # Derivation
//!
//! Every mutation recomputes the full eigen-decomposition. The dominant root
//! is selected by largest *real part* — the eigen-solver reports complex
//! results for a general real matrix, and comparing raw complex values is not
//! well-defined, but for a positive reciprocal matrix the dominant root is
//! guaranteed real and at least `n`. The matching eigenvector is recovered as
//! the minimal singular direction of `A − λmax·I`, normalized by Euclidean
//! norm and rescaled to sum to one.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{AhpResult, MatrixError};
use crate::judgment::Judgment;

/// Consistency index threshold below which a judgment set is accepted
///
/// Fixed and independent of matrix size; the design deliberately does not
/// normalize by a per-size random-index ratio.
pub const CONSISTENCY_THRESHOLD: f64 = 0.1;

/// A positive reciprocal judgment matrix with eigen-derived priorities
///
/// A fresh matrix has every pair judged "equal importance" (all cells 1.0),
/// which already yields a valid, uniform priority vector. Judgments are
/// entered one pair at a time with [`set_value`](Self::set_value) or
/// [`set_judgment`](Self::set_judgment); the reciprocal cell is written
/// automatically and every derived field is recomputed synchronously, so the
/// priorities and consistency index always agree with the matrix content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairwiseMatrix {
    values: DMatrix<f64>,
    principal_eigenvalue: f64,
    priorities: DVector<f64>,
    /// Unordered pairs (min, max) that have received at least one judgment
    judged: BTreeSet<(usize, usize)>,
}

impl PairwiseMatrix {
    /// Create a matrix for `n` sibling items, every pair judged equal
    pub fn new(n: usize) -> AhpResult<Self> {
        if n == 0 {
            return Err(MatrixError::Empty.into());
        }
        let mut matrix = Self {
            values: DMatrix::from_element(n, n, 1.0),
            principal_eigenvalue: n as f64,
            priorities: DVector::from_element(n, 1.0 / n as f64),
            judged: BTreeSet::new(),
        };
        matrix.recompute();
        Ok(matrix)
    }

    /// Number of items being compared
    pub fn size(&self) -> usize {
        self.values.nrows()
    }

    /// Record the judgment for the pair `(i, j)`
    ///
    /// Writes `value` at `(i, j)` and its reciprocal at `(j, i)`, then
    /// recomputes the eigen-decomposition, priority vector, and consistency
    /// index. Repeating an identical call leaves the matrix and every derived
    /// field unchanged.
    ///
    /// # Errors
    ///
    /// Fails on an out-of-range index, on `i == j`, or on a non-positive
    /// (or NaN) value.
    pub fn set_value(&mut self, i: usize, j: usize, value: f64) -> AhpResult<()> {
        let n = self.size();
        if i >= n {
            return Err(MatrixError::IndexOutOfRange { index: i, size: n }.into());
        }
        if j >= n {
            return Err(MatrixError::IndexOutOfRange { index: j, size: n }.into());
        }
        if i == j {
            return Err(MatrixError::SelfComparison { index: i }.into());
        }
        if !(value > 0.0) {
            return Err(MatrixError::NonPositiveValue { value }.into());
        }

        self.values[(i, j)] = value;
        self.values[(j, i)] = 1.0 / value;
        self.judged.insert((i.min(j), i.max(j)));
        self.recompute();
        Ok(())
    }

    /// Record a judgment expressed on the verbal scale
    ///
    /// The judgment's favored side decides whether the scale value or its
    /// reciprocal lands in the `(i, j)` cell.
    pub fn set_judgment(&mut self, i: usize, j: usize, judgment: Judgment) -> AhpResult<()> {
        self.set_value(i, j, judgment.value())
    }

    /// Return the matrix to its fresh all-equal state
    ///
    /// Clears the judged-pair record as well, so a re-elicitation of an
    /// inconsistent group starts from scratch.
    pub fn reset(&mut self) {
        let n = self.size();
        self.values = DMatrix::from_element(n, n, 1.0);
        self.judged.clear();
        self.recompute();
    }

    /// The judgment value at `(i, j)`
    pub fn value(&self, i: usize, j: usize) -> AhpResult<f64> {
        let n = self.size();
        if i >= n {
            return Err(MatrixError::IndexOutOfRange { index: i, size: n }.into());
        }
        if j >= n {
            return Err(MatrixError::IndexOutOfRange { index: j, size: n }.into());
        }
        Ok(self.values[(i, j)])
    }

    /// Read access to the raw judgment matrix, for display
    pub fn entries(&self) -> &DMatrix<f64> {
        &self.values
    }

    /// Dominant (Perron–Frobenius) eigenvalue of the current matrix
    pub fn principal_eigenvalue(&self) -> f64 {
        self.principal_eigenvalue
    }

    /// Local priority weights, in item order; entries are positive and sum to 1
    pub fn priority_vector(&self) -> &DVector<f64> {
        &self.priorities
    }

    /// Consistency index CI = (λmax − n) / (n − 1)
    ///
    /// Defined as 0 for a single-item matrix, which is trivially consistent.
    pub fn consistency_index(&self) -> f64 {
        let n = self.size();
        if n <= 1 {
            return 0.0;
        }
        (self.principal_eigenvalue - n as f64) / (n as f64 - 1.0)
    }

    /// Whether the judgment set is logically consistent (CI below threshold)
    pub fn is_consistent(&self) -> bool {
        self.consistency_index() < CONSISTENCY_THRESHOLD
    }

    /// Number of unordered pairs that have been judged at least once
    pub fn judged_pair_count(&self) -> usize {
        self.judged.len()
    }

    /// Number of unordered pairs the matrix holds
    pub fn total_pair_count(&self) -> usize {
        let n = self.size();
        n * (n - 1) / 2
    }

    /// Whether every unordered pair has received a judgment
    ///
    /// A single-item matrix has no pairs and counts as fully judged.
    pub fn is_fully_judged(&self) -> bool {
        self.judged_pair_count() == self.total_pair_count()
    }

    /// Unordered pairs `(i, j)`, `i < j`, still awaiting a judgment
    pub fn unjudged_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.size();
        let mut pairs = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if !self.judged.contains(&(i, j)) {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }

    /// Recompute the eigen-decomposition and every derived field
    fn recompute(&mut self) {
        let n = self.size();
        if n == 1 {
            self.principal_eigenvalue = 1.0;
            self.priorities = DVector::from_element(1, 1.0);
            return;
        }

        // Dominant root by largest real part; the Perron-Frobenius root of a
        // positive reciprocal matrix is real and >= n, so any imaginary parts
        // reported by the solver belong to the discarded subdominant roots.
        let eigenvalues = self.values.complex_eigenvalues();
        let lambda_max = eigenvalues
            .iter()
            .map(|e| e.re)
            .fold(f64::NEG_INFINITY, f64::max);

        // The matching eigenvector spans the null space of A - lambda*I;
        // take the right singular direction with minimal singular value.
        let shifted = &self.values - DMatrix::from_diagonal_element(n, n, lambda_max);
        let svd = shifted.svd(false, true);
        let mut weights = match svd.v_t {
            Some(v_t) => {
                let singular = &svd.singular_values;
                let mut min_idx = 0;
                for k in 1..singular.len() {
                    if singular[k] < singular[min_idx] {
                        min_idx = k;
                    }
                }
                v_t.row(min_idx).transpose()
            }
            None => DVector::from_element(n, 1.0),
        };

        // The Perron vector has entries of a single sign; orient it positive.
        if weights.sum() < 0.0 {
            weights = -weights;
        }
        let norm = weights.norm();
        if norm > 0.0 {
            weights /= norm;
        }
        let total = weights.sum();
        if total > 0.0 {
            weights /= total;
        }

        self.principal_eigenvalue = lambda_max;
        self.priorities = weights;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::Intensity;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_size_rejected() {
        assert!(PairwiseMatrix::new(0).is_err());
    }

    #[test]
    fn test_fresh_matrix_is_uniform() {
        let matrix = PairwiseMatrix::new(4).unwrap();

        for weight in matrix.priority_vector().iter() {
            assert_relative_eq!(*weight, 0.25, epsilon = 1e-9);
        }
        assert_relative_eq!(matrix.principal_eigenvalue(), 4.0, epsilon = 1e-9);
        assert!(matrix.consistency_index().abs() < 1e-9);
        assert!(matrix.is_consistent());
    }

    #[test]
    fn test_single_item_is_trivial() {
        let matrix = PairwiseMatrix::new(1).unwrap();

        assert_eq!(matrix.priority_vector().len(), 1);
        assert_relative_eq!(matrix.priority_vector()[0], 1.0, epsilon = 1e-12);
        assert_eq!(matrix.consistency_index(), 0.0);
        assert!(matrix.is_consistent());
        assert!(matrix.is_fully_judged());
    }

    #[test]
    fn test_reciprocal_invariant() {
        let mut matrix = PairwiseMatrix::new(3).unwrap();
        matrix.set_value(0, 1, 2.0).unwrap();
        matrix.set_value(1, 2, 5.0).unwrap();
        matrix.set_value(2, 0, 7.0).unwrap();

        let n = matrix.size();
        for i in 0..n {
            assert_relative_eq!(matrix.value(i, i).unwrap(), 1.0, epsilon = 1e-12);
            for j in 0..n {
                let product = matrix.value(i, j).unwrap() * matrix.value(j, i).unwrap();
                assert_relative_eq!(product, 1.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_priority_vector_valid_after_judgments() {
        let mut matrix = PairwiseMatrix::new(4).unwrap();
        matrix.set_value(0, 1, 3.0).unwrap();
        matrix.set_value(0, 2, 5.0).unwrap();
        matrix.set_value(0, 3, 9.0).unwrap();
        matrix.set_value(1, 2, 2.0).unwrap();
        matrix.set_value(1, 3, 4.0).unwrap();
        matrix.set_value(2, 3, 2.0).unwrap();

        let weights = matrix.priority_vector();
        assert_relative_eq!(weights.sum(), 1.0, epsilon = 1e-9);
        for weight in weights.iter() {
            assert!(*weight > 0.0);
        }
        // Dominant root of a positive reciprocal matrix is at least n.
        assert!(matrix.principal_eigenvalue() >= matrix.size() as f64 - 1e-9);
    }

    #[test]
    fn test_transitive_judgments_are_consistent() {
        // A>B=2, B>C=2, A>C=4: perfectly transitive.
        let mut matrix = PairwiseMatrix::new(3).unwrap();
        matrix.set_value(0, 1, 2.0).unwrap();
        matrix.set_value(1, 2, 2.0).unwrap();
        matrix.set_value(0, 2, 4.0).unwrap();

        assert!(matrix.consistency_index().abs() < 1e-9);
        assert!(matrix.is_consistent());

        // Weights follow the implied 4:2:1 ratios.
        let weights = matrix.priority_vector();
        assert_relative_eq!(weights[0] / weights[1], 2.0, epsilon = 1e-6);
        assert_relative_eq!(weights[1] / weights[2], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_intransitive_judgments_are_inconsistent() {
        // A>B=2, B>C=2, C>A=4: a preference cycle.
        let mut matrix = PairwiseMatrix::new(3).unwrap();
        matrix.set_value(0, 1, 2.0).unwrap();
        matrix.set_value(1, 2, 2.0).unwrap();
        matrix.set_value(2, 0, 4.0).unwrap();

        assert!(matrix.consistency_index() > CONSISTENCY_THRESHOLD);
        assert!(!matrix.is_consistent());
    }

    #[test]
    fn test_set_value_is_idempotent() {
        let mut matrix = PairwiseMatrix::new(3).unwrap();
        matrix.set_value(0, 1, 3.0).unwrap();
        matrix.set_value(1, 2, 2.0).unwrap();

        let before = matrix.clone();
        matrix.set_value(1, 2, 2.0).unwrap();

        assert_eq!(matrix, before);
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        let mut matrix = PairwiseMatrix::new(3).unwrap();

        assert!(matrix.set_value(3, 0, 2.0).is_err());
        assert!(matrix.set_value(0, 3, 2.0).is_err());
        assert!(matrix.set_value(1, 1, 2.0).is_err());
        assert!(matrix.set_value(0, 1, 0.0).is_err());
        assert!(matrix.set_value(0, 1, -3.0).is_err());
        assert!(matrix.set_value(0, 1, f64::NAN).is_err());

        // A rejected call leaves the matrix untouched.
        assert_relative_eq!(matrix.value(0, 1).unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(matrix.judged_pair_count(), 0);
    }

    #[test]
    fn test_judged_pair_tracking() {
        let mut matrix = PairwiseMatrix::new(3).unwrap();
        assert_eq!(matrix.total_pair_count(), 3);
        assert!(!matrix.is_fully_judged());

        matrix.set_value(0, 1, 2.0).unwrap();
        // Judging (1, 0) covers the same unordered pair as (0, 1).
        matrix.set_value(1, 0, 2.0).unwrap();
        assert_eq!(matrix.judged_pair_count(), 1);
        assert_eq!(matrix.unjudged_pairs(), vec![(0, 2), (1, 2)]);

        matrix.set_value(0, 2, 4.0).unwrap();
        matrix.set_value(1, 2, 2.0).unwrap();
        assert!(matrix.is_fully_judged());
        assert!(matrix.unjudged_pairs().is_empty());
    }

    #[test]
    fn test_reset_restores_fresh_state() {
        let mut matrix = PairwiseMatrix::new(3).unwrap();
        matrix.set_value(0, 1, 2.0).unwrap();
        matrix.set_value(1, 2, 2.0).unwrap();
        matrix.set_value(2, 0, 4.0).unwrap();
        assert!(!matrix.is_consistent());

        matrix.reset();

        assert_eq!(matrix, PairwiseMatrix::new(3).unwrap());
        assert!(matrix.is_consistent());
        assert_eq!(matrix.judged_pair_count(), 0);
    }

    #[test]
    fn test_set_judgment_uses_scale_semantics() {
        let mut matrix = PairwiseMatrix::new(2).unwrap();
        matrix
            .set_judgment(0, 1, Judgment::favoring_second(Intensity::Strong))
            .unwrap();

        assert_relative_eq!(matrix.value(0, 1).unwrap(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(matrix.value(1, 0).unwrap(), 5.0, epsilon = 1e-12);
        // The stronger side gets the larger weight.
        assert!(matrix.priority_vector()[1] > matrix.priority_vector()[0]);
    }

    #[test]
    fn test_strong_preference_dominates_weights() {
        let mut matrix = PairwiseMatrix::new(2).unwrap();
        matrix.set_value(0, 1, 9.0).unwrap();

        let weights = matrix.priority_vector();
        assert_relative_eq!(weights[0], 0.9, epsilon = 1e-9);
        assert_relative_eq!(weights[1], 0.1, epsilon = 1e-9);
    }
}
