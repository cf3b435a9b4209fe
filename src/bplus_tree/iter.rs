use core::iter::FusedIterator;

use super::BPlusTree;
use crate::raw::{Arena, Node, NodeId};

/// Iterator over `(key, values)` entries in key order, following the leaf
/// chain. Created by [`BPlusTree::iter`].
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    leaf: Option<NodeId>,
    index: usize,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            leaf: self.leaf,
            index: self.index,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a [V]);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            let leaf = nodes.get(self.leaf?).as_leaf();
            if self.index < leaf.key_count() {
                let item = (leaf.key(self.index), leaf.slot(self.index).as_slice());
                self.index += 1;
                self.remaining = self.remaining.saturating_sub(1);
                return Some(item);
            }
            self.leaf = leaf.next();
            self.index = 0;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over keys in order. Created by [`BPlusTree::keys`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// What [`BPlusTree::repr`] lists.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum ReprKind {
    /// `(key, values)` pairs.
    #[default]
    Entries,
    /// Keys only.
    Keys,
    /// Every value, flattened.
    Values,
}

/// Options for [`BPlusTree::repr`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReprOptions {
    /// Subtree to list; the whole tree when `None`.
    pub root: Option<NodeId>,
    pub kind: ReprKind,
    /// List in descending order.
    pub descending: bool,
}

impl ReprOptions {
    pub fn keys() -> Self {
        Self {
            kind: ReprKind::Keys,
            ..Self::default()
        }
    }

    pub fn values() -> Self {
        Self {
            kind: ReprKind::Values,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn root(mut self, root: NodeId) -> Self {
        self.root = Some(root);
        self
    }

    #[must_use]
    pub fn descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }
}

/// A flat listing of a tree or subtree, shaped by [`ReprKind`].
#[derive(Debug, PartialEq, Eq)]
pub enum Repr<'a, K, V> {
    Entries(Vec<(&'a K, &'a [V])>),
    Keys(Vec<&'a K>),
    Values(Vec<&'a V>),
}

impl<K, V, C> BPlusTree<K, V, C> {
    /// Iterates `(key, values)` entries in key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            leaf: Some(self.first_leaf_of(self.root)),
            index: 0,
            remaining: self.len,
        }
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Lists the contents of the tree, or of the subtree at `options.root`,
    /// by walking its nodes rather than the leaf chain.
    ///
    /// # Panics
    ///
    /// Panics if `options.root` does not name a live node of this tree.
    pub fn repr(&self, options: ReprOptions) -> Repr<'_, K, V> {
        let mut entries = self.subtree_entries(options.root.unwrap_or(self.root));
        if options.descending {
            entries.reverse();
        }
        match options.kind {
            ReprKind::Entries => Repr::Entries(entries),
            ReprKind::Keys => Repr::Keys(entries.into_iter().map(|(key, _)| key).collect()),
            ReprKind::Values if options.descending => {
                Repr::Values(entries.into_iter().flat_map(|(_, values)| values.iter().rev()).collect())
            }
            ReprKind::Values => Repr::Values(entries.into_iter().flat_map(|(_, values)| values.iter()).collect()),
        }
    }

    fn subtree_entries(&self, root: NodeId) -> Vec<(&K, &[V])> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            match self.nodes.get(id) {
                Node::Branch(branch) => stack.extend(branch.children().iter().rev()),
                Node::Leaf(leaf) => {
                    out.extend(leaf.keys().iter().zip(leaf.slots().iter().map(|slot| slot.as_slice())));
                }
            }
        }
        out
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::bplus_tree::tests::sample;
    use pretty_assertions::assert_eq;

    #[test]
    fn iter_walks_chain_in_order() {
        let tree = sample();
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 10);
        assert_eq!(iter.next(), Some((&1, &['z'][..])));
        assert_eq!(iter.next(), Some((&2, &['b'][..])));
        assert_eq!(iter.next(), Some((&3, &['c', 'C'][..])));
        assert_eq!(iter.len(), 7);
        assert_eq!(iter.last(), Some((&12, &['p'][..])));

        let keys: Vec<i32> = (&tree).into_iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 5, 6, 8, 10, 11, 12]);
    }

    #[test]
    fn empty_tree_iterates_nothing() {
        let tree: BPlusTree<i32, i32> = BPlusTree::default();
        assert_eq!(tree.iter().next(), None);
        assert_eq!(tree.keys().len(), 0);
    }

    #[test]
    fn repr_entries_keys_and_values() {
        let tree = sample();
        let Repr::Entries(entries) = tree.repr(ReprOptions::default()) else {
            panic!("expected entries");
        };
        assert_eq!(entries, tree.iter().collect::<Vec<_>>());

        assert_eq!(
            tree.repr(ReprOptions::keys()),
            Repr::Keys(vec![&1, &2, &3, &4, &5, &6, &8, &10, &11, &12])
        );

        let Repr::Values(values) = tree.repr(ReprOptions::values()) else {
            panic!("expected values");
        };
        assert_eq!(values.into_iter().collect::<String>(), "zbcCdefghmnp");

        let Repr::Values(values) = tree.repr(ReprOptions::values().descending(true)) else {
            panic!("expected values");
        };
        assert_eq!(values.into_iter().collect::<String>(), "pnmhgfedCcbz");
    }

    #[test]
    fn repr_of_subtree() {
        let tree = sample();
        // Root [5]: the left branch holds keys below 5.
        let left = tree.nodes.get(tree.root).as_branch().child(0);
        assert_eq!(
            tree.repr(ReprOptions::keys().root(left).descending(true)),
            Repr::Keys(vec![&4, &3, &2, &1])
        );
        assert_eq!(tree.depth_of(left), 1);
    }
}
