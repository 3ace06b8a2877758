//! `interval_tree` is an in-memory collection of intervals backed by an
//! augmented red-black tree.
//!
//! Intervals are closed (`[begin, end]`, both bounds inclusive) and ordered
//! lexicographically by `(begin, end)`. A single interval may hold an
//! arbitrary number of distinct entries: the tree keeps one node per distinct
//! interval and absorbs repeat insertions into a per-node set, so rebalancing
//! cost scales with the number of distinct intervals, not the number of
//! entries. Every node additionally tracks the maximum end bound of its
//! subtree, which lets overlap queries prune whole subtrees and run in
//! O(k + log n) for k matches.
//!
//! Nodes live in a plain vector and reference each other through indices
//! rather than pointers, so the tree is `Send` and `Unpin` and carries parent
//! back-references without ownership cycles.
//!
//! The structure is single-threaded: any concurrent access must be guarded by
//! external locking on the caller's side.
//!
//! # Example
//!
//! ```rust
//! use interval_tree::{HasInterval, Interval, IntervalTree};
//!
//! #[derive(Debug, Clone, PartialEq, Eq, Hash)]
//! struct Job {
//!     start: u32,
//!     stop: u32,
//!     id: u32,
//! }
//!
//! impl HasInterval<u32> for Job {
//!     fn interval(&self) -> Interval<u32> {
//!         Interval::new(self.start, self.stop)
//!     }
//! }
//!
//! let mut tree = IntervalTree::new();
//! tree.insert(Job { start: 1, stop: 5, id: 0 });
//! tree.insert(Job { start: 10, stop: 20, id: 1 });
//! assert_eq!(tree.find_overlapping(&Interval::new(4, 12)).len(), 2);
//! ```

mod entry;
mod index;
mod interval;
mod iter;
mod node;
mod tree;

#[cfg(test)]
mod tests;

pub use entry::HasInterval;
pub use interval::Interval;
pub use iter::Iter;
pub use tree::IntervalTree;
