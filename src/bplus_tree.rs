use core::fmt;

use smallvec::SmallVec;

use crate::compare::{Comparator, Natural};
use crate::config::{Config, Mode, Order};
use crate::error::Result;
use crate::raw::{Arena, LeafNode, Node, NodeId, SearchResult};

mod check;
mod cursor;
mod insert;
mod iter;
mod range;
mod remove;

pub use cursor::{Cursor, CursorEntry, CursorOptions};
pub use iter::{Iter, Keys, Repr, ReprKind, ReprOptions};
pub use range::RangeOrder;

/// Which neighbour to settle for when a looked-up key is absent.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// The greatest existing key smaller than the requested one.
    Left,
    /// The smallest existing key greater than the requested one.
    Right,
}

/// One step of a descent: a branch and the child index taken out of it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Frame {
    pub(crate) node: NodeId,
    pub(crate) child_index: usize,
}

/// Root-to-leaf descent record. Mutations walk it back up as an explicit
/// stack instead of recursing.
pub(crate) type Path = SmallVec<[Frame; 16]>;

/// An in-memory B+tree ordered index.
///
/// Keys are kept in comparator order across a chain of leaves; each key holds
/// a slot of values (exactly one in [`Mode::Unique`], one or more in
/// [`Mode::Multimap`]). Branches hold denormalised separator keys: `keys[i]`
/// is the minimum key of the subtree under `children[i + 1]`.
///
/// # Examples
///
/// ```
/// use bplus_index::{BPlusTree, Direction};
///
/// let mut tree = BPlusTree::new(4).unwrap();
/// tree.store(1, "a");
/// tree.store(3, "c");
/// tree.store(3, "c2");
///
/// assert_eq!(tree.fetch(&3), Some(&["c", "c2"][..]));
/// assert_eq!(tree.fetch(&2), None);
/// assert_eq!(tree.fetch_nearest(&2, Direction::Right), Some((&3, &["c", "c2"][..])));
///
/// assert_eq!(tree.remove_value(&3, &"c"), Some("c"));
/// assert_eq!(tree.fetch(&3), Some(&["c2"][..]));
/// ```
pub struct BPlusTree<K, V, C = Natural> {
    nodes: Arena<Node<K, V>>,
    root: NodeId,
    order: Order,
    mode: Mode,
    debug_validate: bool,
    cmp: C,
    /// Distinct keys stored.
    len: usize,
    /// Values stored across all slots.
    value_count: usize,
}

/// A successful lookup: the matched key and values, the leaf holding them and
/// the child index taken at each branch on the way down.
pub struct Found<'a, K, V> {
    key: &'a K,
    values: &'a [V],
    leaf: LeafRef<'a, K, V>,
    path: SmallVec<[usize; 16]>,
}

impl<'a, K, V> Found<'a, K, V> {
    /// The matched key; the neighbour's key when a miss direction was used.
    pub fn key(&self) -> &'a K {
        self.key
    }

    /// All values stored under [`key`](Self::key), in insertion order.
    pub fn values(&self) -> &'a [V] {
        self.values
    }

    /// The leaf containing the matched key.
    pub fn leaf(&self) -> LeafRef<'a, K, V> {
        self.leaf
    }

    /// Child indices chosen from the root down; empty when the root is a leaf.
    pub fn path(&self) -> &[usize] {
        &self.path
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Found<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Found")
            .field("key", self.key)
            .field("values", &self.values)
            .field("leaf", &self.leaf.id)
            .field("path", &self.path)
            .finish()
    }
}

/// Read-only view of a leaf.
pub struct LeafRef<'a, K, V> {
    id: NodeId,
    leaf: &'a LeafNode<K, V>,
}

impl<K, V> Clone for LeafRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for LeafRef<'_, K, V> {}

impl<'a, K, V> LeafRef<'a, K, V> {
    /// The leaf's id, usable with [`BPlusTree::leaf`] and
    /// [`BPlusTree::check_subtree`].
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The leaf's keys in ascending order.
    pub fn keys(&self) -> &'a [K] {
        self.leaf.keys()
    }

    /// The values stored under `keys()[index]`.
    pub fn values(&self, index: usize) -> &'a [V] {
        self.leaf.slot(index)
    }

    /// Number of keys in the leaf.
    pub fn len(&self) -> usize {
        self.leaf.key_count()
    }

    /// Only an empty tree's root leaf holds no keys.
    pub fn is_empty(&self) -> bool {
        self.leaf.key_count() == 0
    }

    /// The leaf holding the next-greater key range.
    pub fn next(&self) -> Option<NodeId> {
        self.leaf.next()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for LeafRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeafRef")
            .field("id", &self.id)
            .field("keys", &self.leaf.keys())
            .field("slots", &self.leaf.slots())
            .field("next", &self.leaf.next())
            .finish()
    }
}

impl<K: Ord, V> BPlusTree<K, V, Natural> {
    /// Creates an empty multimap tree of the given order using the keys' own
    /// ordering.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOrder`](crate::Error::InvalidOrder) unless `order` is even and at least 4.
    pub fn new(order: usize) -> Result<Self> {
        Self::with_config(Config::new(order))
    }

    /// Creates an empty tree from `config` using the keys' own ordering.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOrder`](crate::Error::InvalidOrder) unless `config.order` is even and at least 4.
    pub fn with_config(config: Config) -> Result<Self> {
        Self::with_comparator(config, Natural)
    }
}

impl<K, V, C> BPlusTree<K, V, C> {
    /// Creates an empty tree from `config`, ordering keys with `cmp`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidOrder`](crate::Error::InvalidOrder) unless `config.order` is even and at least 4.
    pub fn with_comparator(config: Config, cmp: C) -> Result<Self> {
        let order = Order::new(config.order)?;
        Ok(Self::from_parts(order, config.mode, config.debug_validate, cmp))
    }

    fn from_parts(order: Order, mode: Mode, debug_validate: bool, cmp: C) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Leaf(LeafNode::new()));
        Self {
            nodes,
            root,
            order,
            mode,
            debug_validate,
            cmp,
            len: 0,
            value_count: 0,
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of values across all keys.
    pub fn value_count(&self) -> usize {
        self.value_count
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The configured branching factor.
    pub fn order(&self) -> usize {
        self.order.get()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    /// Number of branch levels above the leaves; 0 while the root is a leaf.
    pub fn depth(&self) -> usize {
        self.depth_of(self.root)
    }

    /// Depth of the subtree rooted at `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not name a live node of this tree.
    pub fn depth_of(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Node::Branch(branch) = self.nodes.get(current) {
            current = branch.child(0);
            depth += 1;
        }
        depth
    }

    /// Returns a view of the leaf `id`, or `None` if `id` names a branch or no
    /// live node. Use it to follow [`LeafRef::next`] links.
    pub fn leaf(&self, id: NodeId) -> Option<LeafRef<'_, K, V>> {
        match self.nodes.try_get(id)? {
            Node::Leaf(leaf) => Some(LeafRef { id, leaf }),
            Node::Branch(_) => None,
        }
    }

    /// The leftmost leaf of the subtree rooted at `id`.
    pub(crate) fn first_leaf_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Node::Branch(branch) = self.nodes.get(current) {
            current = branch.child(0);
        }
        current
    }

    /// The minimum key of the subtree rooted at `id`, if it holds any.
    pub(crate) fn subtree_min(&self, id: NodeId) -> Option<&K> {
        self.nodes.get(self.first_leaf_of(id)).as_leaf().first_key()
    }

    fn leaf_ref(&self, id: NodeId) -> LeafRef<'_, K, V> {
        LeafRef {
            id,
            leaf: self.nodes.get(id).as_leaf(),
        }
    }
}

impl<K, V, C: Comparator<K>> BPlusTree<K, V, C> {
    /// Descends from the root to the leaf whose range covers `key`, recording
    /// each branch and the child index taken.
    pub(crate) fn locate(&self, key: &K) -> (NodeId, Path) {
        let mut path = Path::new();
        let mut current = self.root;
        while let Node::Branch(branch) = self.nodes.get(current) {
            let child_index = branch.search_child(&self.cmp, key);
            path.push(Frame {
                node: current,
                child_index,
            });
            current = branch.child(child_index);
        }
        (current, path)
    }

    /// Locates `key`, or its neighbour in the `miss` direction when absent.
    /// Returns the leaf, the index in it and the path to it.
    fn seek(&self, key: &K, miss: Option<Direction>) -> Option<(NodeId, usize, Path)> {
        let (leaf_id, path) = self.locate(key);
        let leaf = self.nodes.get(leaf_id).as_leaf();
        match (leaf.search(&self.cmp, key), miss) {
            (SearchResult::Found(idx), _) => Some((leaf_id, idx, path)),
            (SearchResult::NotFound(_), None) => None,
            // Descent lands on a leaf whose first key is <= `key` unless it is
            // the leftmost leaf, so there is never a predecessor to step back to.
            (SearchResult::NotFound(idx), Some(Direction::Left)) => idx.checked_sub(1).map(|i| (leaf_id, i, path)),
            (SearchResult::NotFound(idx), Some(Direction::Right)) => {
                if idx < leaf.key_count() {
                    return Some((leaf_id, idx, path));
                }
                let next = leaf.next()?;
                let first = self.nodes.get(next).as_leaf().first_key()?;
                let (next_id, next_path) = self.locate(first);
                debug_assert_eq!(next_id, next);
                Some((next_id, 0, next_path))
            }
        }
    }

    /// The values stored at `key`, or `None` if it is absent.
    pub fn fetch(&self, key: &K) -> Option<&[V]> {
        let (leaf_id, _) = self.locate(key);
        let leaf = self.nodes.get(leaf_id).as_leaf();
        match leaf.search(&self.cmp, key) {
            SearchResult::Found(idx) => Some(leaf.slot(idx)),
            SearchResult::NotFound(_) => None,
        }
    }

    /// The first value stored at `key`; in unique mode, the value.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.fetch(key).and_then(<[V]>::first)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.fetch(key).is_some()
    }

    /// The entry at `key`, or at the nearest existing key in `direction` when
    /// `key` is absent. `None` if there is no such neighbour.
    pub fn fetch_nearest(&self, key: &K, direction: Direction) -> Option<(&K, &[V])> {
        self.fetch_with(key, Some(direction)).map(|found| (found.key, found.values))
    }

    /// Full lookup: like [`fetch`](Self::fetch), or
    /// [`fetch_nearest`](Self::fetch_nearest) when `miss` is given, but also
    /// returning the containing leaf and the descent path.
    pub fn fetch_with(&self, key: &K, miss: Option<Direction>) -> Option<Found<'_, K, V>> {
        let (leaf_id, idx, path) = self.seek(key, miss)?;
        let leaf = self.leaf_ref(leaf_id);
        Some(Found {
            key: leaf.leaf.key(idx),
            values: leaf.leaf.slot(idx),
            leaf,
            path: path.iter().map(|frame| frame.child_index).collect(),
        })
    }

    /// Runs validation after a mutation when the tree was configured with
    /// `debug_validate`.
    ///
    /// # Panics
    ///
    /// Panics with the violation if the tree no longer satisfies its invariants.
    fn validate_after(&self, operation: &str) {
        if !self.debug_validate {
            return;
        }
        if let Err(err) = self.check() {
            log::error!("{operation} left the tree invalid: {err}");
            panic!("{operation} left the tree invalid: {err}");
        }
    }
}

impl<K: Ord, V> Default for BPlusTree<K, V, Natural> {
    fn default() -> Self {
        Self::from_parts(Order::DEFAULT, Mode::default(), false, Natural)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for BPlusTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C> IntoIterator for &'a BPlusTree<K, V, C> {
    type Item = (&'a K, &'a [V]);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
