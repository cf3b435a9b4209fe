//! Key ordering used by the tree.

use core::cmp::Ordering;

/// A total order over keys.
///
/// Every descent, split and range bound in a [`BPlusTree`](crate::BPlusTree)
/// goes through this trait, so the tree never requires `K: Ord` when a
/// comparator is supplied. Implementations must be consistent for the
/// lifetime of the tree: changing the order of two stored keys corrupts it
/// (which [`check`](crate::BPlusTree::check) will report as a disorder).
///
/// Any `Fn(&K, &K) -> Ordering` is a comparator:
///
/// ```
/// use bplus_index::{BPlusTree, Config};
///
/// let descending = |a: &i32, b: &i32| b.cmp(a);
/// let mut tree = BPlusTree::with_comparator(Config::new(4), descending).unwrap();
/// for k in 1..=5 {
///     tree.store(k, k * 10);
/// }
/// assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![5, 4, 3, 2, 1]);
/// ```
pub trait Comparator<K: ?Sized> {
    /// Compares two keys.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The key type's own [`Ord`], ascending.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Natural;

impl<K: Ord + ?Sized> Comparator<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
