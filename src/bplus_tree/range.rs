use core::cmp::Ordering;

use super::{BPlusTree, Direction};
use crate::compare::Comparator;

/// Order in which [`fetch_range`](BPlusTree::fetch_range) returns values.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum RangeOrder {
    #[default]
    Ascending,
    Descending,
}

impl<K, V, C: Comparator<K>> BPlusTree<K, V, C> {
    /// Every value stored under keys in `lo..=hi`, flattened in key order
    /// (insertion order within a key), or the reverse for
    /// [`RangeOrder::Descending`].
    ///
    /// Either bound may be absent from the tree. An empty result is returned
    /// when `lo > hi` or no key falls in the range.
    pub fn fetch_range(&self, lo: &K, hi: &K, order: RangeOrder) -> Vec<&V> {
        let mut out = Vec::new();
        if self.cmp.compare(lo, hi) == Ordering::Greater {
            return out;
        }
        // Starts at `lo` or the first key after it.
        let Some((mut leaf_id, mut idx, _)) = self.seek(lo, Some(Direction::Right)) else {
            return out;
        };

        'scan: loop {
            let leaf = self.nodes.get(leaf_id).as_leaf();
            for i in idx..leaf.key_count() {
                if self.cmp.compare(leaf.key(i), hi) == Ordering::Greater {
                    break 'scan;
                }
                out.extend(leaf.slot(i).iter());
            }
            match leaf.next() {
                Some(next) => {
                    leaf_id = next;
                    idx = 0;
                }
                None => break,
            }
        }

        if order == RangeOrder::Descending {
            out.reverse();
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

    fn range(tree: &BPlusTree<i32, char>, lo: i32, hi: i32) -> String {
        tree.fetch_range(&lo, &hi, RangeOrder::Ascending).into_iter().collect()
    }

    #[test]
    fn single_key_ranges() {
        let mut tree = BPlusTree::new(4).unwrap();
        tree.store(4, 'a');
        tree.store(4, 'a');
        tree.store(4, 'b');
        assert_eq!(range(&tree, 4, 4), "aab");

        let tree = sample();
        assert_eq!(range(&tree, 2, 2), "b");
        assert_eq!(range(&tree, 4, 4), "d");
    }

    #[test]
    fn inverted_or_out_of_tree_ranges_are_empty() {
        let tree = sample();
        assert_eq!(range(&tree, 4, -4), "");
        assert_eq!(range(&tree, 50, 50), "");
        assert_eq!(range(&tree, 50, -50), "");
        assert_eq!(range(&tree, 7, 7), "");
    }

    #[test]
    fn ranges_span_leaf_boundaries() {
        let tree = sample();
        assert_eq!(range(&tree, 1, 2), "zb");
        assert_eq!(range(&tree, 2, 3), "bcC");
        assert_eq!(range(&tree, 1, 3), "zbcC");
        assert_eq!(range(&tree, 2, 4), "bcCd");
        assert_eq!(range(&tree, 1, 4), "zbcCd");
        assert_eq!(range(&tree, 1, 5), "zbcCde");
        assert_eq!(range(&tree, 2, 5), "bcCde");
        assert_eq!(range(&tree, 7, 10), "hm");
        assert_eq!(range(&tree, -100, 100), "zbcCdefghmnp");
    }

    #[test]
    fn descending_reverses_values() {
        let tree = sample();
        let values: String = tree.fetch_range(&1, &4, RangeOrder::Descending).into_iter().collect();
        assert_eq!(values, "dCcbz");
    }

    #[test]
    fn absent_bounds_snap_inwards() {
        let mut tree = BPlusTree::new(50).unwrap();
        tree.store(1, 1);
        tree.store(1, 2);
        tree.store(5, 2);
        tree.store(10, 3);

        let range = |lo: i32, hi: i32| -> Vec<i32> {
            tree.fetch_range(&lo, &hi, RangeOrder::Ascending)
                .into_iter()
                .copied()
                .collect()
        };
        assert_eq!(range(1, 1), vec![1, 2]);
        assert_eq!(range(5, 5), vec![2]);
        assert_eq!(range(10, 10), vec![3]);
        assert_eq!(range(1, 5), vec![1, 2, 2]);
        assert_eq!(range(1, 10), vec![1, 2, 2, 3]);
        assert_eq!(range(1, 11), vec![1, 2, 2, 3]);
        assert_eq!(range(-1, 11), vec![1, 2, 2, 3]);
        assert_eq!(range(5, 10), vec![2, 3]);
        assert_eq!(range(1, 2), vec![1, 2]);
        assert_eq!(range(-20, 20), vec![1, 2, 2, 3]);
        assert_eq!(range(4, 20), vec![2, 3]);
    }

    #[test]
    fn empty_tree() {
        let tree: BPlusTree<i32, i32> = BPlusTree::default();
        assert!(tree.fetch_range(&0, &10, RangeOrder::Ascending).is_empty());
    }
}
