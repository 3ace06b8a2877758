use std::hash::Hash;

use crate::interval::Interval;

/// The contract an entry must satisfy to be stored in an
/// [`IntervalTree`](crate::IntervalTree).
///
/// An entry carries its own interval: `insert` and `remove` ask the entry for
/// its bounds rather than taking them as a separate argument, so an entry can
/// never end up filed under an interval that is not its own.
///
/// Entries under one interval are kept in a set, which is why implementors
/// must also be `Eq + Hash`: equality is what lets the set reject duplicate
/// insertions and find the exact instance a removal targets.
pub trait HasInterval<T: Ord>: Eq + Hash {
    /// The interval of this entry.
    ///
    /// Must be stable: the tree files the entry under the interval reported at
    /// insertion time and looks it up under the interval reported at removal
    /// time.
    fn interval(&self) -> Interval<T>;
}
