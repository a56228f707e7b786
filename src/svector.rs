//! Sparse rational vectors.
//!
//! A [`SparseVector`] maps a nonnegative variable index to a nonzero
//! [`Rational`] coefficient. The map is kept compact at all times — entries
//! are never inserted with a zero value, and [`SparseVector::compactify`] is
//! available for vectors built by subtraction or linear combination where a
//! cancellation can produce a zero that must be dropped before an equality
//! check is meaningful.

use std::collections::BTreeMap;

use crate::rational::Rational;

/// A compacted, sparse, index-keyed vector of exact rationals.
///
/// `BTreeMap` (rather than a hash map) is used so that iteration is
/// deterministic — the same certificate always produces the same
/// linear-combination traversal order, which matters for reproducible
/// diagnostics.
#[derive(Clone, Debug, Default)]
pub struct SparseVector {
    entries: BTreeMap<usize, Rational>,
}

impl SparseVector {
    /// An empty vector (all coordinates zero).
    pub fn new() -> Self {
        SparseVector {
            entries: BTreeMap::new(),
        }
    }

    /// Build directly from a map of index to value, compacting on the way
    /// in.
    pub fn from_entries(entries: BTreeMap<usize, Rational>) -> Self {
        let mut v = SparseVector { entries };
        v.compactify();
        v
    }

    /// Set `index` to `value`, or remove it if `value` is zero.
    pub fn set(&mut self, index: usize, value: Rational) {
        if value.is_zero() {
            self.entries.remove(&index);
        } else {
            self.entries.insert(index, value);
        }
    }

    /// Add `value` to whatever is currently stored at `index` (starting from
    /// zero), dropping the entry if the result cancels to zero.
    pub fn add_at(&mut self, index: usize, value: Rational) {
        let combined = match self.entries.get(&index) {
            Some(existing) => existing + &value,
            None => value,
        };
        self.set(index, combined);
    }

    /// Value at `index`, or zero if absent.
    pub fn get(&self, index: usize) -> Rational {
        self.entries.get(&index).cloned().unwrap_or_else(Rational::zero)
    }

    /// Number of nonzero entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` iff every coordinate is zero.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop any zero-valued entries. Idempotent.
    pub fn compactify(&mut self) {
        self.entries.retain(|_, v| !v.is_zero());
    }

    /// Iterate `(index, value)` pairs in increasing index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Rational)> {
        self.entries.iter().map(|(&i, v)| (i, v))
    }

    /// Scalar product `sum_i self[i] * other[i]`.
    ///
    /// Iterates whichever side has fewer entries and looks the index up in
    /// the other, as specified: a missing key on either side contributes
    /// zero to the sum.
    pub fn scalar_product(&self, other: &SparseVector) -> Rational {
        let (small, big) = if self.entries.len() <= other.entries.len() {
            (self, other)
        } else {
            (other, self)
        };
        let mut acc = Rational::zero();
        for (idx, value) in small.entries.iter() {
            if let Some(other_value) = big.entries.get(idx) {
                acc = &acc + &(value * other_value);
            }
        }
        acc
    }

    /// Elementwise `self - other`, compacted.
    pub fn subtract(&self, other: &SparseVector) -> SparseVector {
        let mut result = self.clone();
        for (idx, value) in other.entries.iter() {
            result.add_at(*idx, -value);
        }
        result.compactify();
        result
    }

    /// `true` iff every index in this vector's support names a variable
    /// flagged integer in `is_int`, with an integer coefficient.
    pub fn is_integral_on(&self, is_int: &[bool]) -> bool {
        self.entries
            .iter()
            .all(|(&idx, v)| !is_int.get(idx).copied().unwrap_or(false) || v.is_integer())
    }

    /// Stricter than [`SparseVector::is_integral_on`]: `true` iff the
    /// support is nonempty only over variables flagged integer in `is_int`
    /// *and* every coefficient is itself an integer. Used by the unsplit
    /// predicate, which requires the branch coefficients to name only
    /// integer variables, not merely to happen to be integral where they do.
    pub fn is_fully_integer_on(&self, is_int: &[bool]) -> bool {
        self.entries
            .iter()
            .all(|(&idx, v)| is_int.get(idx).copied().unwrap_or(false) && v.is_integer())
    }
}

impl PartialEq for SparseVector {
    fn eq(&self, other: &Self) -> bool {
        // Both sides are always kept compact by construction, so a direct
        // map comparison is equivalent to "compactify both, then compare".
        self.entries == other.entries
    }
}

impl Eq for SparseVector {}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(pairs: &[(usize, i64)]) -> SparseVector {
        let mut sv = SparseVector::new();
        for &(i, n) in pairs {
            sv.set(i, Rational::from_i64(n));
        }
        sv
    }

    #[test]
    fn equality_ignores_explicit_zeros() {
        let mut a = v(&[(0, 1), (1, 2)]);
        a.set(2, Rational::zero());
        let b = v(&[(0, 1), (1, 2)]);
        assert_eq!(a, b);
    }

    #[test]
    fn scalar_product_skips_missing_keys() {
        let a = v(&[(0, 2), (3, 5)]);
        let b = v(&[(0, 3), (1, 100)]);
        // Only index 0 is shared: 2*3 = 6.
        assert_eq!(a.scalar_product(&b), Rational::from_i64(6));
    }

    #[test]
    fn subtract_cancels_to_empty() {
        let a = v(&[(0, 1), (1, 2)]);
        let b = v(&[(0, 1), (1, 2)]);
        let diff = a.subtract(&b);
        assert!(diff.is_empty());
    }

    #[test]
    fn add_at_accumulates_and_can_cancel() {
        let mut a = v(&[(0, 1)]);
        a.add_at(0, Rational::from_i64(-1));
        assert!(a.is_empty());
    }

    #[test]
    fn integrality_check_only_constrains_integer_variables() {
        let mut sv = SparseVector::new();
        sv.set(0, Rational::from_token("t", "3/2").unwrap());
        sv.set(1, Rational::from_i64(4));
        // Index 0 is not integer-flagged, so its fractional coefficient is fine.
        assert!(sv.is_integral_on(&[false, true]));
        // If index 0 *is* flagged integer, the fractional coefficient fails.
        assert!(!sv.is_integral_on(&[true, true]));
    }

    #[test]
    fn fully_integer_check_rejects_non_integer_variables_in_support() {
        let sv = v(&[(0, 3)]);
        assert!(sv.is_fully_integer_on(&[true]));
        assert!(!sv.is_fully_integer_on(&[false]));
    }
}
