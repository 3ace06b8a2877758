use std::collections::HashSet;

use crate::index::{IndexType, NodeIndex};
use crate::interval::Interval;
use crate::node::Node;
use crate::tree::IntervalTree;

/// Pushes a link of nodes on the left to stack.
fn left_link<T, V, Ix>(
    tree_ref: &IntervalTree<T, V, Ix>,
    mut x: NodeIndex<Ix>,
) -> Vec<NodeIndex<Ix>>
where
    T: Ord,
    Ix: IndexType,
{
    let mut nodes = vec![];
    while !tree_ref.node_ref(x, Node::is_sentinel) {
        nodes.push(x);
        x = tree_ref.node_ref(x, Node::left);
    }
    nodes
}

/// An iterator over the nodes of an `IntervalTree`, sorted by interval.
///
/// Each item is a distinct interval together with the full set of entries
/// stored under it.
#[derive(Debug)]
pub struct Iter<'a, T, V, Ix>
where
    T: Ord,
{
    /// Reference to the tree
    tree_ref: &'a IntervalTree<T, V, Ix>,
    /// Stack for iteration
    stack: Vec<NodeIndex<Ix>>,
}

impl<'a, T, V, Ix> Iter<'a, T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    pub(crate) fn new(tree_ref: &'a IntervalTree<T, V, Ix>) -> Self {
        Iter {
            tree_ref,
            stack: left_link(tree_ref, tree_ref.root),
        }
    }
}

impl<'a, T, V, Ix> Iterator for Iter<'a, T, V, Ix>
where
    T: Ord,
    Ix: IndexType,
{
    type Item = (&'a Interval<T>, &'a HashSet<V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.stack.pop()?;
        self.stack.extend(left_link(
            self.tree_ref,
            self.tree_ref.node_ref(x, Node::right),
        ));
        Some(self.tree_ref.node_ref(x, |xn| (xn.interval(), xn.values())))
    }
}
