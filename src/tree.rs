use std::cmp::Ordering;
use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

use crate::entry::HasInterval;
use crate::index::{DefaultIx, IndexType, NodeIndex};
use crate::interval::Interval;
use crate::iter::Iter;
use crate::node::{Color, Node};

/// Fraction of the entry count used to pre-size overlap query results.
const DEFAULT_ALLOCATION_FACTOR: f32 = 0.5;

/// An interval tree: an augmented red-black tree over closed intervals,
/// holding a set of entries per distinct interval.
#[derive(Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(
        serialize = "T: serde::Serialize, V: serde::Serialize + Eq + std::hash::Hash, Ix: serde::Serialize",
        deserialize = "T: serde::Deserialize<'de>, V: serde::Deserialize<'de> + Eq + std::hash::Hash, Ix: serde::Deserialize<'de>"
    ))
)]
pub struct IntervalTree<T, V, Ix = DefaultIx> {
    /// Node arena; index 0 is the sentinel
    pub(crate) nodes: Vec<Node<T, V, Ix>>,
    /// Root of the tree
    pub(crate) root: NodeIndex<Ix>,
    /// Number of entries (not nodes) in the tree
    pub(crate) len: usize,
    /// Result pre-sizing heuristic for overlap queries
    allocation_factor: f32,
}

impl<T, V> IntervalTree<T, V>
where
    T: Ord,
{
    /// Create an empty `IntervalTree`
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Self::new_sentinel()],
            root: Self::sentinel(),
            len: 0,
            allocation_factor: DEFAULT_ALLOCATION_FACTOR,
        }
    }

    /// Create an empty `IntervalTree` with a custom result pre-sizing factor:
    /// overlap queries allocate their result buffer for
    /// `len * allocation_factor` entries up front.
    #[inline]
    #[must_use]
    pub fn with_allocation_factor(allocation_factor: f32) -> Self {
        Self {
            allocation_factor,
            ..Self::new()
        }
    }
}

impl<T, V> Default for IntervalTree<T, V>
where
    T: Ord,
{
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, V, Ix> IntervalTree<T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    /// Creates a new `IntervalTree` with estimated node capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = vec![Self::new_sentinel()];
        nodes.reserve(capacity);
        IntervalTree {
            nodes,
            root: Self::sentinel(),
            len: 0,
            allocation_factor: DEFAULT_ALLOCATION_FACTOR,
        }
    }

    /// Insert an entry under its own interval.
    ///
    /// Entries with an interval already present in the tree join that node's
    /// value set without any structural change; a new interval adds one RED
    /// node and rebalances. Always succeeds and always increments [`len`].
    ///
    /// [`len`]: IntervalTree::len
    ///
    /// # Panics
    ///
    /// This method panics when the tree is at the maximum number of nodes for
    /// its index type
    ///
    /// # Example
    /// ```rust
    /// use interval_tree::{HasInterval, Interval, IntervalTree};
    ///
    /// #[derive(PartialEq, Eq, Hash)]
    /// struct Tag(u32, u32, &'static str);
    ///
    /// impl HasInterval<u32> for Tag {
    ///     fn interval(&self) -> Interval<u32> {
    ///         Interval::new(self.0, self.1)
    ///     }
    /// }
    ///
    /// let mut tree = IntervalTree::new();
    /// tree.insert(Tag(1, 5, "a"));
    /// tree.insert(Tag(1, 5, "b"));
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(tree.node_count(), 1);
    /// ```
    #[inline]
    pub fn insert(&mut self, entry: V)
    where
        V: HasInterval<T>,
    {
        let interval = entry.interval();
        self.len = self.len.wrapping_add(1);

        let mut y = Self::sentinel();
        let mut x = self.root;
        while !self.node_ref(x, Node::is_sentinel) {
            y = x;
            match interval.cmp(self.node_ref(x, Node::interval)) {
                Ordering::Equal => {
                    // Exact key match absorbs the entry, no fixup needed
                    let _ignore = self.node_mut(x, Node::values_mut).insert(entry);
                    self.verify();
                    return;
                }
                Ordering::Less => x = self.node_ref(x, Node::left),
                Ordering::Greater => x = self.node_ref(x, Node::right),
            }
        }

        let z = NodeIndex::new(self.nodes.len());
        // check for max capacity, except if we use usize
        assert!(
            <Ix as IndexType>::max().index() == !0 || NodeIndex::end() != z,
            "Reached maximum number of nodes"
        );
        self.nodes.push(Self::new_node(interval, entry, z));

        self.node_mut(z, Node::set_parent(y));
        if self.node_ref(y, Node::is_sentinel) {
            self.root = z;
        } else {
            if self.node_ref(z, Node::interval) < self.node_ref(y, Node::interval) {
                self.node_mut(y, Node::set_left(z));
            } else {
                self.node_mut(y, Node::set_right(z));
            }
            self.update_max_bottom_up(y);
        }

        self.insert_fixup(z);
        self.verify();
    }

    /// Remove an entry, looked up under its own interval.
    ///
    /// Returns `true` if the entry was present. Removing an absent entry (or
    /// an entry whose interval is not in the tree) is a silent no-op that
    /// leaves [`len`] untouched. The tree node is removed only when its last
    /// entry goes.
    ///
    /// [`len`]: IntervalTree::len
    ///
    /// # Example
    /// ```rust
    /// use interval_tree::{HasInterval, Interval, IntervalTree};
    ///
    /// #[derive(PartialEq, Eq, Hash)]
    /// struct Tag(u32, u32, &'static str);
    ///
    /// impl HasInterval<u32> for Tag {
    ///     fn interval(&self) -> Interval<u32> {
    ///         Interval::new(self.0, self.1)
    ///     }
    /// }
    ///
    /// let mut tree = IntervalTree::new();
    /// tree.insert(Tag(1, 5, "a"));
    /// assert!(!tree.remove(&Tag(1, 5, "b")));
    /// assert!(tree.remove(&Tag(1, 5, "a")));
    /// assert!(tree.is_empty());
    /// ```
    #[inline]
    pub fn remove(&mut self, entry: &V) -> bool
    where
        V: HasInterval<T>,
    {
        let interval = entry.interval();
        let Some(z) = self.search_exact(&interval) else {
            return false;
        };

        if self.node_ref(z, Node::values).len() > 1 {
            // The node stays, it holds other entries with the same interval
            if !self.node_mut(z, Node::values_mut).remove(entry) {
                return false;
            }
            self.len = self.len.wrapping_sub(1);
            self.verify();
            return true;
        }
        if !self.node_ref(z, Node::values).contains(entry) {
            return false;
        }

        self.remove_inner(z);
        // Swap the node with the last node stored in the vector and update indices
        let _removed = self.nodes.swap_remove(z.index());
        let old = NodeIndex::<Ix>::new(self.nodes.len());
        self.update_idx(old, z);

        self.len = self.len.wrapping_sub(1);
        self.verify();
        true
    }

    /// Return the set of entries stored under exactly the given interval.
    ///
    /// Only exact matches are returned; an interval not present in the tree
    /// yields an empty set.
    ///
    /// # Example
    /// ```rust
    /// use interval_tree::{HasInterval, Interval, IntervalTree};
    ///
    /// #[derive(PartialEq, Eq, Hash)]
    /// struct Tag(u32, u32, &'static str);
    ///
    /// impl HasInterval<u32> for Tag {
    ///     fn interval(&self) -> Interval<u32> {
    ///         Interval::new(self.0, self.1)
    ///     }
    /// }
    ///
    /// let mut tree = IntervalTree::new();
    /// tree.insert(Tag(3, 3, "x"));
    /// tree.insert(Tag(3, 3, "y"));
    /// assert_eq!(tree.lookup(&Interval::new(3, 3)).len(), 2);
    /// assert!(tree.lookup(&Interval::new(3, 4)).is_empty());
    /// ```
    #[inline]
    pub fn lookup(&self, interval: &Interval<T>) -> HashSet<&V>
    where
        V: Eq + Hash,
    {
        match self.search_exact(interval) {
            Some(x) => self.node_ref(x, Node::values).iter().collect(),
            None => HashSet::new(),
        }
    }

    /// Find all entries whose interval overlaps the given interval, both
    /// bounds inclusive.
    ///
    /// The result is unordered.
    ///
    /// # Example
    /// ```rust
    /// use interval_tree::{HasInterval, Interval, IntervalTree};
    ///
    /// #[derive(Debug, PartialEq, Eq, Hash)]
    /// struct Tag(u32, u32, &'static str);
    ///
    /// impl HasInterval<u32> for Tag {
    ///     fn interval(&self) -> Interval<u32> {
    ///         Interval::new(self.0, self.1)
    ///     }
    /// }
    ///
    /// let mut tree = IntervalTree::new();
    /// tree.insert(Tag(1, 5, "a"));
    /// tree.insert(Tag(10, 20, "b"));
    /// tree.insert(Tag(15, 25, "c"));
    /// assert_eq!(tree.find_overlapping(&Interval::new(6, 12)), [&Tag(10, 20, "b")]);
    /// ```
    #[inline]
    pub fn find_overlapping(&self, interval: &Interval<T>) -> Vec<&V> {
        let mut collector =
            Vec::with_capacity((self.len as f32 * self.allocation_factor) as usize);
        if self.node_ref(self.root, Node::is_sentinel) {
            return collector;
        }

        // Breadth-first to keep the stack flat; pruning makes the order
        // irrelevant anyway
        let mut queue = VecDeque::new();
        queue.push_back(self.root);
        while let Some(p) = queue.pop_front() {
            if self.node_ref(p, Node::interval).overlaps(interval) {
                collector.extend(self.node_ref(p, Node::values).iter());
            }
            let p_left = self.node_ref(p, Node::left);
            // A left subtree whose maximum end is below the query begin cannot
            // overlap; a sentinel child has no max at all
            if self.max(p_left) >= Some(&interval.begin) {
                queue.push_back(p_left);
            }
            let p_right = self.node_ref(p, Node::right);
            // Everything to the right begins at or after this node's begin
            if !self.node_ref(p_right, Node::is_sentinel)
                && self.node_ref(p, Node::interval).begin <= interval.end
            {
                queue.push_back(p_right);
            }
        }

        collector
    }

    /// Return every entry in the tree, in no particular order.
    #[inline]
    #[must_use]
    pub fn get_all(&self) -> HashSet<&V>
    where
        V: Eq + Hash,
    {
        let mut all = HashSet::with_capacity(self.len);
        // Slot reclamation keeps the arena dense: everything past the
        // sentinel is a live node
        all.extend(self.nodes.iter().skip(1).flat_map(Node::values));
        all
    }

    /// Return the maximum end bound across all intervals in the tree, or
    /// `None` if the tree is empty.
    ///
    /// # Example
    /// ```rust
    /// use interval_tree::{HasInterval, Interval, IntervalTree};
    ///
    /// #[derive(PartialEq, Eq, Hash)]
    /// struct Tag(u32, u32, &'static str);
    ///
    /// impl HasInterval<u32> for Tag {
    ///     fn interval(&self) -> Interval<u32> {
    ///         Interval::new(self.0, self.1)
    ///     }
    /// }
    ///
    /// let mut tree = IntervalTree::new();
    /// assert_eq!(tree.max_end(), None);
    /// tree.insert(Tag(0, 100, "a"));
    /// tree.insert(Tag(0, 50, "b"));
    /// assert_eq!(tree.max_end(), Some(&100));
    /// tree.remove(&Tag(0, 100, "a"));
    /// assert_eq!(tree.max_end(), Some(&50));
    /// ```
    #[inline]
    #[must_use]
    pub fn max_end(&self) -> Option<&T> {
        self.max(self.root)
    }

    /// Get an iterator over the nodes of the tree, sorted by interval.
    #[inline]
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, V, Ix> {
        Iter::new(self)
    }

    /// Remove all entries from the tree
    #[inline]
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Self::new_sentinel());
        self.root = Self::sentinel();
        self.len = 0;
    }

    /// Return the number of entries in the tree.
    ///
    /// Entries sharing an interval all count; see [`node_count`] for the
    /// number of distinct intervals.
    ///
    /// [`node_count`]: IntervalTree::node_count
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return the number of distinct intervals in the tree.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len().wrapping_sub(1)
    }

    /// Return `true` if the tree contains no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T, V, Ix> IntervalTree<T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    /// Create a new sentinel node
    fn new_sentinel() -> Node<T, V, Ix> {
        Node {
            interval: None,
            values: HashSet::new(),
            max_index: None,
            left: None,
            right: None,
            parent: None,
            color: Color::Black,
        }
    }

    /// Create a new tree node holding a single entry
    fn new_node(interval: Interval<T>, entry: V, index: NodeIndex<Ix>) -> Node<T, V, Ix>
    where
        V: Eq + Hash,
    {
        let mut values = HashSet::with_capacity(1);
        let _ignore = values.insert(entry);
        Node {
            max_index: Some(index),
            interval: Some(interval),
            values,
            left: Some(Self::sentinel()),
            right: Some(Self::sentinel()),
            parent: Some(Self::sentinel()),
            color: Color::Red,
        }
    }

    /// Get the sentinel node index
    fn sentinel() -> NodeIndex<Ix> {
        NodeIndex::new(0)
    }
}

impl<T, V, Ix> IntervalTree<T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    /// Remove a node from the tree structure.
    ///
    /// Two-child nodes are replaced by their in-order predecessor (the
    /// maximum of the left subtree), which has no right child and can be
    /// spliced out directly.
    fn remove_inner(&mut self, z: NodeIndex<Ix>) {
        let mut y = z;
        let mut y_orig_color = self.node_ref(y, Node::color);
        let x;
        if self.left_ref(z, Node::is_sentinel) {
            x = self.node_ref(z, Node::right);
            self.transplant(z, x);
            self.update_max_bottom_up(self.node_ref(z, Node::parent));
        } else if self.right_ref(z, Node::is_sentinel) {
            x = self.node_ref(z, Node::left);
            self.transplant(z, x);
            self.update_max_bottom_up(self.node_ref(z, Node::parent));
        } else {
            y = self.tree_maximum(self.node_ref(z, Node::left));
            let mut p = y;
            y_orig_color = self.node_ref(y, Node::color);
            x = self.node_ref(y, Node::left);
            if self.node_ref(y, Node::parent) == z {
                self.node_mut(x, Node::set_parent(y));
            } else {
                self.transplant(y, x);
                p = self.node_ref(y, Node::parent);
                self.node_mut(y, Node::set_left(self.node_ref(z, Node::left)));
                self.left_mut(y, Node::set_parent(y));
            }
            self.transplant(z, y);
            self.node_mut(y, Node::set_right(self.node_ref(z, Node::right)));
            self.right_mut(y, Node::set_parent(y));
            self.node_mut(y, Node::set_color(self.node_ref(z, Node::color)));

            self.update_max_bottom_up(p);
        }

        if matches!(y_orig_color, Color::Black) {
            self.remove_fixup(x);
        }
    }

    /// Search for the node with exactly the given interval.
    fn search_exact(&self, interval: &Interval<T>) -> Option<NodeIndex<Ix>> {
        let mut x = self.root;
        while !self.node_ref(x, Node::is_sentinel) {
            match interval.cmp(self.node_ref(x, Node::interval)) {
                Ordering::Equal => return Some(x),
                Ordering::Less => x = self.node_ref(x, Node::left),
                Ordering::Greater => x = self.node_ref(x, Node::right),
            }
        }
        None
    }

    /// Restore red-black tree properties after an insert.
    fn insert_fixup(&mut self, mut z: NodeIndex<Ix>) {
        while self.parent_ref(z, Node::is_red) {
            if self.grand_parent_ref(z, Node::is_sentinel) {
                break;
            }
            if self.is_left_child(self.node_ref(z, Node::parent)) {
                let y = self.grand_parent_ref(z, Node::right);
                if self.node_ref(y, Node::is_red) {
                    // Red uncle: push the conflict two levels up
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.node_mut(y, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    z = self.parent_ref(z, Node::parent);
                } else {
                    if self.is_right_child(z) {
                        // Inner grandchild: rotate to the outside first
                        z = self.node_ref(z, Node::parent);
                        self.left_rotate(z);
                    }
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    self.right_rotate(self.parent_ref(z, Node::parent));
                }
            } else {
                let y = self.grand_parent_ref(z, Node::left);
                if self.node_ref(y, Node::is_red) {
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.node_mut(y, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    z = self.parent_ref(z, Node::parent);
                } else {
                    if self.is_left_child(z) {
                        z = self.node_ref(z, Node::parent);
                        self.right_rotate(z);
                    }
                    self.parent_mut(z, Node::set_color(Color::Black));
                    self.grand_parent_mut(z, Node::set_color(Color::Red));
                    self.left_rotate(self.parent_ref(z, Node::parent));
                }
            }
        }
        self.node_mut(self.root, Node::set_color(Color::Black));
    }

    /// Restore red-black tree properties after a remove.
    fn remove_fixup(&mut self, mut x: NodeIndex<Ix>) {
        while x != self.root && self.node_ref(x, Node::is_black) {
            let mut w;
            if self.is_left_child(x) {
                w = self.parent_ref(x, Node::right);
                if self.node_ref(w, Node::is_red) {
                    // Red sibling: rotate it away to get a black sibling
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.parent_mut(x, Node::set_color(Color::Red));
                    self.left_rotate(self.node_ref(x, Node::parent));
                    w = self.parent_ref(x, Node::right);
                }
                if self.node_ref(w, Node::is_sentinel) {
                    break;
                }
                if self.left_ref(w, Node::is_black) && self.right_ref(w, Node::is_black) {
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = self.node_ref(x, Node::parent);
                } else {
                    if self.right_ref(w, Node::is_black) {
                        // Near red child: rotate it into the far position
                        self.left_mut(w, Node::set_color(Color::Black));
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.right_rotate(w);
                        w = self.parent_ref(x, Node::right);
                    }
                    self.node_mut(w, Node::set_color(self.parent_ref(x, Node::color)));
                    self.parent_mut(x, Node::set_color(Color::Black));
                    self.right_mut(w, Node::set_color(Color::Black));
                    self.left_rotate(self.node_ref(x, Node::parent));
                    x = self.root;
                }
            } else {
                w = self.parent_ref(x, Node::left);
                if self.node_ref(w, Node::is_red) {
                    self.node_mut(w, Node::set_color(Color::Black));
                    self.parent_mut(x, Node::set_color(Color::Red));
                    self.right_rotate(self.node_ref(x, Node::parent));
                    w = self.parent_ref(x, Node::left);
                }
                if self.node_ref(w, Node::is_sentinel) {
                    break;
                }
                if self.right_ref(w, Node::is_black) && self.left_ref(w, Node::is_black) {
                    self.node_mut(w, Node::set_color(Color::Red));
                    x = self.node_ref(x, Node::parent);
                } else {
                    if self.left_ref(w, Node::is_black) {
                        self.right_mut(w, Node::set_color(Color::Black));
                        self.node_mut(w, Node::set_color(Color::Red));
                        self.left_rotate(w);
                        w = self.parent_ref(x, Node::left);
                    }
                    self.node_mut(w, Node::set_color(self.parent_ref(x, Node::color)));
                    self.parent_mut(x, Node::set_color(Color::Black));
                    self.left_mut(w, Node::set_color(Color::Black));
                    self.right_rotate(self.node_ref(x, Node::parent));
                    x = self.root;
                }
            }
        }
        self.node_mut(x, Node::set_color(Color::Black));
    }

    /// Binary tree left rotate.
    fn left_rotate(&mut self, x: NodeIndex<Ix>) {
        if self.right_ref(x, Node::is_sentinel) {
            return;
        }
        let y = self.node_ref(x, Node::right);
        self.node_mut(x, Node::set_right(self.node_ref(y, Node::left)));
        if !self.left_ref(y, Node::is_sentinel) {
            self.left_mut(y, Node::set_parent(x));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_left(x));

        self.rotate_update_max(x, y);
    }

    /// Binary tree right rotate.
    fn right_rotate(&mut self, x: NodeIndex<Ix>) {
        if self.left_ref(x, Node::is_sentinel) {
            return;
        }
        let y = self.node_ref(x, Node::left);
        self.node_mut(x, Node::set_left(self.node_ref(y, Node::right)));
        if !self.right_ref(y, Node::is_sentinel) {
            self.right_mut(y, Node::set_parent(x));
        }

        self.replace_parent(x, y);
        self.node_mut(y, Node::set_right(x));

        self.rotate_update_max(x, y);
    }

    /// Replace parent during a rotation.
    fn replace_parent(&mut self, x: NodeIndex<Ix>, y: NodeIndex<Ix>) {
        self.node_mut(y, Node::set_parent(self.node_ref(x, Node::parent)));
        if self.parent_ref(x, Node::is_sentinel) {
            self.root = y;
        } else if self.is_left_child(x) {
            self.parent_mut(x, Node::set_left(y));
        } else {
            self.parent_mut(x, Node::set_right(y));
        }
        self.node_mut(x, Node::set_parent(y));
    }

    /// Update the max value after a rotation.
    ///
    /// The rotated pair covers the same key set as before, so the subtree max
    /// moves from `x` to `y` unchanged and only `x` needs recomputing;
    /// ancestors are unaffected.
    fn rotate_update_max(&mut self, x: NodeIndex<Ix>, y: NodeIndex<Ix>) {
        self.node_mut(y, Node::set_max_index(self.node_ref(x, Node::max_index)));
        self.recalculate_max(x);
    }

    /// Update the max value towards the root.
    ///
    /// A deletion can shrink a max that only a full upward walk discovers.
    fn update_max_bottom_up(&mut self, x: NodeIndex<Ix>) {
        let mut p = x;
        while !self.node_ref(p, Node::is_sentinel) {
            self.recalculate_max(p);
            p = self.node_ref(p, Node::parent);
        }
    }

    /// Recalculate max value from the node's own end and both children
    fn recalculate_max(&mut self, x: NodeIndex<Ix>) {
        self.node_mut(x, Node::set_max_index(x));
        let x_left = self.node_ref(x, Node::left);
        let x_right = self.node_ref(x, Node::right);
        if self.max(x_left) > self.max(x) {
            self.node_mut(
                x,
                Node::set_max_index(self.node_ref(x_left, Node::max_index)),
            );
        }
        if self.max(x_right) > self.max(x) {
            self.node_mut(
                x,
                Node::set_max_index(self.node_ref(x_right, Node::max_index)),
            );
        }
    }

    /// Find the node with the maximum interval in a subtree.
    fn tree_maximum(&self, mut x: NodeIndex<Ix>) -> NodeIndex<Ix> {
        while !self.right_ref(x, Node::is_sentinel) {
            x = self.node_ref(x, Node::right);
        }
        x
    }

    /// Replace one subtree as a child of its parent with another subtree.
    fn transplant(&mut self, u: NodeIndex<Ix>, v: NodeIndex<Ix>) {
        if self.parent_ref(u, Node::is_sentinel) {
            self.root = v;
        } else if self.is_left_child(u) {
            self.parent_mut(u, Node::set_left(v));
        } else {
            self.parent_mut(u, Node::set_right(v));
        }
        self.node_mut(v, Node::set_parent(self.node_ref(u, Node::parent)));
    }

    /// Check if a node is a left child of its parent.
    fn is_left_child(&self, node: NodeIndex<Ix>) -> bool {
        self.parent_ref(node, Node::left) == node
    }

    /// Check if a node is a right child of its parent.
    fn is_right_child(&self, node: NodeIndex<Ix>) -> bool {
        self.parent_ref(node, Node::right) == node
    }

    /// Update node indices after a slot reclamation.
    ///
    /// `swap_remove` moved the node at slot `old` into slot `new`; every link
    /// pointing at `old` has to follow, including `max_index` references on
    /// the path from the moved node to the root.
    fn update_idx(&mut self, old: NodeIndex<Ix>, new: NodeIndex<Ix>) {
        if self.root == old {
            self.root = new;
        }
        if self.nodes.get(new.index()).is_some() {
            if !self.parent_ref(new, Node::is_sentinel) {
                if self.parent_ref(new, Node::left) == old {
                    self.parent_mut(new, Node::set_left(new));
                } else {
                    self.parent_mut(new, Node::set_right(new));
                }
            }
            self.left_mut(new, Node::set_parent(new));
            self.right_mut(new, Node::set_parent(new));

            let mut p = new;
            while !self.node_ref(p, Node::is_sentinel) {
                if self.node_ref(p, Node::max_index) == old {
                    self.node_mut(p, Node::set_max_index(new));
                }
                p = self.node_ref(p, Node::parent);
            }
        }
    }

    #[cfg(feature = "validation")]
    fn verify(&self) {
        self.check_invariants();
    }

    #[cfg(not(feature = "validation"))]
    fn verify(&self) {}
}

// Convenient methods for reference or mutate current/parent/left/right node
impl<'a, T, V, Ix> IntervalTree<T, V, Ix>
where
    Ix: IndexType,
{
    pub(crate) fn node_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V, Ix>) -> R,
    {
        op(&self.nodes[node.index()])
    }

    pub(crate) fn node_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V, Ix>) -> R,
    {
        op(&mut self.nodes[node.index()])
    }

    fn left_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].left().index();
        op(&self.nodes[idx])
    }

    fn right_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].right().index();
        op(&self.nodes[idx])
    }

    fn parent_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].parent().index();
        op(&self.nodes[idx])
    }

    fn grand_parent_ref<F, R>(&'a self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a Node<T, V, Ix>) -> R,
    {
        let parent_idx = self.nodes[node.index()].parent().index();
        let grand_parent_idx = self.nodes[parent_idx].parent().index();
        op(&self.nodes[grand_parent_idx])
    }

    fn left_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].left().index();
        op(&mut self.nodes[idx])
    }

    fn right_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].right().index();
        op(&mut self.nodes[idx])
    }

    fn parent_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V, Ix>) -> R,
    {
        let idx = self.nodes[node.index()].parent().index();
        op(&mut self.nodes[idx])
    }

    fn grand_parent_mut<F, R>(&'a mut self, node: NodeIndex<Ix>, op: F) -> R
    where
        R: 'a,
        F: FnOnce(&'a mut Node<T, V, Ix>) -> R,
    {
        let parent_idx = self.nodes[node.index()].parent().index();
        let grand_parent_idx = self.nodes[parent_idx].parent().index();
        op(&mut self.nodes[grand_parent_idx])
    }

    /// End bound of the subtree maximum, `None` for the sentinel.
    pub(crate) fn max(&self, node: NodeIndex<Ix>) -> Option<&T> {
        let max_index = self.nodes[node.index()].max_index?.index();
        self.nodes[max_index].interval.as_ref().map(|i| &i.end)
    }
}

impl<T, V, Ix> IntervalTree<T, V, Ix>
where
    T: Ord + std::fmt::Debug,
    V: std::fmt::Debug,
    Ix: IndexType,
{
    /// Render the tree structure for inspection.
    ///
    /// One line per node, right subtree above, indentation growing with
    /// depth. RED nodes are wrapped in angle brackets; each line shows
    /// `begin / end / subtree max` followed by the node's entries.
    #[must_use]
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if self.node_ref(self.root, Node::is_sentinel) {
            out.push_str("<empty tree>\n");
            return out;
        }
        self.dump_inner(self.root, 0, &mut out);
        out
    }

    fn dump_inner(&self, x: NodeIndex<Ix>, indent: usize, out: &mut String) {
        use std::fmt::Write;

        if !self.right_ref(x, Node::is_sentinel) {
            self.dump_inner(self.node_ref(x, Node::right), indent + 2, out);
        }
        let node = &self.nodes[x.index()];
        let interval = node.interval();
        let max = &self.nodes[node.max_index().index()].interval().end;
        let _ignore = if node.is_black() {
            writeln!(
                out,
                "{:indent$}{:?} / {:?} / {:?}: {:?}",
                "",
                interval.begin,
                interval.end,
                max,
                node.values()
            )
        } else {
            writeln!(
                out,
                "{:indent$}<{:?} / {:?} / {:?}>: {:?}",
                "",
                interval.begin,
                interval.end,
                max,
                node.values()
            )
        };
        if !self.left_ref(x, Node::is_sentinel) {
            self.dump_inner(self.node_ref(x, Node::left), indent + 2, out);
        }
    }
}

#[cfg(any(test, feature = "validation"))]
impl<T, V, Ix> IntervalTree<T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    /// Walk the whole tree and assert every structural invariant: BST order
    /// over `(begin, end)`, the red-black properties, augmentation
    /// correctness, and non-empty value sets.
    ///
    /// This is a development/testing hook; it visits every node and is far
    /// too expensive for production paths.
    pub fn check_invariants(&self) {
        assert!(
            self.node_ref(self.root, Node::is_black),
            "root must be black"
        );
        self.check_order();
        self.check_children_color(self.root);
        let _ignore = self.check_black_height(self.root);
        let _ignore = self.check_max_at(self.root);
        for node in self.nodes.iter().skip(1) {
            assert!(!node.values().is_empty(), "live node with no values");
        }
    }

    /// In-order traversal must yield strictly increasing intervals.
    fn check_order(&self) {
        let mut prev: Option<&Interval<T>> = None;
        for (interval, _) in self.iter() {
            if let Some(p) = prev {
                assert!(p < interval, "search order violated");
            }
            prev = Some(interval);
        }
    }

    fn check_children_color(&self, x: NodeIndex<Ix>) {
        if self.node_ref(x, Node::is_sentinel) {
            return;
        }
        self.check_children_color(self.node_ref(x, Node::left));
        self.check_children_color(self.node_ref(x, Node::right));
        if self.node_ref(x, Node::is_red) {
            assert!(self.left_ref(x, Node::is_black), "red node with red child");
            assert!(self.right_ref(x, Node::is_black), "red node with red child");
        }
    }

    fn check_black_height(&self, x: NodeIndex<Ix>) -> usize {
        if self.node_ref(x, Node::is_sentinel) {
            return 0;
        }
        let left_height = self.check_black_height(self.node_ref(x, Node::left));
        let right_height = self.check_black_height(self.node_ref(x, Node::right));
        assert_eq!(left_height, right_height, "unequal black heights");
        if self.node_ref(x, Node::is_black) {
            return left_height.wrapping_add(1);
        }
        left_height
    }

    fn check_max_at(&self, x: NodeIndex<Ix>) -> Option<&T> {
        if self.node_ref(x, Node::is_sentinel) {
            return None;
        }
        let mut computed = &self.node_ref(x, Node::interval).end;
        if let Some(left_max) = self.check_max_at(self.node_ref(x, Node::left)) {
            if left_max > computed {
                computed = left_max;
            }
        }
        if let Some(right_max) = self.check_max_at(self.node_ref(x, Node::right)) {
            if right_max > computed {
                computed = right_max;
            }
        }
        assert!(self.max(x) == Some(computed), "stale subtree max");
        Some(computed)
    }
}
