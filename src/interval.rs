//! The `Interval` keying the entries of an [`IntervalTree`](crate::IntervalTree).
//!
//! An `Interval<T>` is closed: it covers `[begin, end]` with both bounds
//! inclusive, so a point can be written as `[x, x]`. Intervals are ordered
//! lexicographically, begin first and end as the tie-breaker. For
//! `Interval<u32>`:
//! - [1,4] < [2,5], because 1 < 2
//! - [1,4] < [1,5], because 4 < 5
//!
//! This is exactly the derived ordering over the `(begin, end)` fields.

/// A closed interval `[begin, end]`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub struct Interval<T> {
    /// Inclusive lower bound
    pub begin: T,
    /// Inclusive upper bound
    pub end: T,
}

impl<T: Ord> Interval<T> {
    /// Create a new `Interval`
    ///
    /// # Panics
    ///
    /// This method panics when begin > end
    #[inline]
    pub fn new(begin: T, end: T) -> Self {
        assert!(begin <= end, "invalid interval");
        Self { begin, end }
    }

    /// Create a degenerate interval covering the single point `x`
    #[inline]
    pub fn point(x: T) -> Self
    where
        T: Clone,
    {
        Self {
            begin: x.clone(),
            end: x,
        }
    }

    /// Checks if self overlaps with the other interval, both bounds inclusive:
    /// `[a, b]` and `[c, d]` overlap iff `a <= d` and `c <= b`.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[should_panic(expected = "invalid interval")]
    fn reversed_bounds_should_panic() {
        let _interval = Interval::new(3, 1);
    }

    #[test]
    fn point_interval_is_valid() {
        let p = Interval::point(7);
        assert_eq!(p, Interval::new(7, 7));
    }

    #[test]
    fn overlap_is_inclusive_at_bounds() {
        let a = Interval::new(1, 5);
        assert!(a.overlaps(&Interval::new(5, 9)));
        assert!(a.overlaps(&Interval::new(0, 1)));
        assert!(!a.overlaps(&Interval::new(6, 9)));
        assert!(!a.overlaps(&Interval::new(0, 0)));
    }
}
