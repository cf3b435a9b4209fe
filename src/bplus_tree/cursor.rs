use core::iter::FusedIterator;

use log::trace;

use super::{BPlusTree, Direction};
use crate::compare::Comparator;
use crate::raw::{Arena, Node, NodeId};

/// Where a [`Cursor`] starts and when it stops.
///
/// ```
/// use bplus_index::{BPlusTree, CursorOptions};
///
/// let mut tree = BPlusTree::new(4).unwrap();
/// for (k, v) in [(1, 'a'), (2, 'b'), (2, 'c'), (3, 'd')] {
///     tree.store(k, v);
/// }
///
/// let mut cursor = tree.values(CursorOptions::new().key(2).limit(2));
/// let entry = cursor.next().unwrap();
/// assert_eq!((entry.key, entry.values), (&2, &['b', 'c'][..]));
/// assert!(cursor.is_finished());
/// assert!(cursor.next().is_none());
/// ```
#[derive(Clone, Debug)]
pub struct CursorOptions<K, V> {
    key: Option<K>,
    target: Option<Target<V>>,
    limit: Option<usize>,
    miss: Option<Direction>,
}

impl<K, V> CursorOptions<K, V> {
    /// Start at the smallest key, no target, no limit.
    pub fn new() -> Self {
        Self {
            key: None,
            target: None,
            limit: None,
            miss: None,
        }
    }

    /// Start at `key`. If it is absent the cursor is empty, unless a
    /// [`miss`](Self::miss) direction says where to start instead.
    #[must_use]
    pub fn key(mut self, key: K) -> Self {
        self.key = Some(key);
        self
    }

    /// Stop after the first key holding a value equal to `target`.
    #[must_use]
    pub fn target(mut self, target: V) -> Self
    where
        V: PartialEq,
    {
        self.target = Some(Target {
            value: target,
            eq: <V as PartialEq>::eq,
        });
        self
    }

    /// Yield at most `limit` values in total; the last slot is truncated to fit.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Start at the nearest key in `direction` when the start key is absent.
    #[must_use]
    pub fn miss(mut self, direction: Direction) -> Self {
        self.miss = Some(direction);
        self
    }
}

/// A target value and the equality it was given with, so cursors over values
/// without `PartialEq` still work when no target is set.
#[derive(Clone, Debug)]
struct Target<V> {
    value: V,
    eq: fn(&V, &V) -> bool,
}

impl<V> Target<V> {
    fn matches(&self, values: &[V]) -> bool {
        values.iter().any(|v| (self.eq)(v, &self.value))
    }
}

impl<K, V> Default for CursorOptions<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// One step of a [`Cursor`]: a key and the values yielded for it.
#[derive(Debug, PartialEq, Eq)]
pub struct CursorEntry<'a, K, V> {
    pub key: &'a K,
    pub values: &'a [V],
}

/// A single-pass walk along the leaf chain created by
/// [`BPlusTree::values`].
///
/// The entry that satisfies the limit or the target, or the tree's last
/// entry, is the final one: afterwards [`is_finished`](Self::is_finished)
/// reports `true` and the cursor yields nothing more.
pub struct Cursor<'a, K, V> {
    nodes: &'a Arena<Node<K, V>>,
    leaf: Option<NodeId>,
    index: usize,
    remaining: Option<usize>,
    target: Option<Target<V>>,
    finished: bool,
}

impl<K, V> Cursor<'_, K, V> {
    /// Whether the completing entry has been yielded, or there was nothing to
    /// yield at all.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<'a, K, V> Iterator for Cursor<'a, K, V> {
    type Item = CursorEntry<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let Some(leaf_id) = self.leaf else {
            self.finished = true;
            return None;
        };
        let nodes = self.nodes;
        let leaf = nodes.get(leaf_id).as_leaf();
        if self.index >= leaf.key_count() {
            // Only an empty root leaf has nothing at its start.
            self.finished = true;
            return None;
        }

        let key = leaf.key(self.index);
        let mut values: &'a [V] = leaf.slot(self.index);
        self.index += 1;
        if self.index == leaf.key_count() {
            self.leaf = leaf.next();
            self.index = 0;
        }
        let mut done = self.leaf.is_none();

        if let Some(remaining) = self.remaining.as_mut() {
            if values.len() >= *remaining {
                values = &values[..*remaining];
                *remaining = 0;
                done = true;
            } else {
                *remaining -= values.len();
            }
        }
        if let Some(target) = &self.target
            && target.matches(values)
        {
            done = true;
        }

        self.finished = done;
        Some(CursorEntry { key, values })
    }
}

impl<K, V> FusedIterator for Cursor<'_, K, V> {}

impl<K, V, C: Comparator<K>> BPlusTree<K, V, C> {
    /// Opens a cursor over `(key, values)` entries in key order, bounded by
    /// `options`.
    pub fn values(&self, options: CursorOptions<K, V>) -> Cursor<'_, K, V> {
        let CursorOptions {
            key,
            target,
            limit,
            miss,
        } = options;

        let start = match &key {
            Some(key) => self.seek(key, miss).map(|(leaf, index, _)| (leaf, index)),
            None => Some((self.first_leaf_of(self.root), 0)),
        };
        trace!("cursor starts at {start:?}, limit {limit:?}");

        let (leaf, index) = start.unzip();
        Cursor {
            nodes: &self.nodes,
            leaf,
            index: index.unwrap_or(0),
            remaining: limit,
            target,
            finished: limit == Some(0),
        }
    }
}
