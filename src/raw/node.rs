use core::cmp::Ordering;

use smallvec::SmallVec;

use super::handle::NodeId;
use crate::compare::Comparator;

/// The values stored under one key. Unique-mode slots always hold exactly one
/// value and never spill to the heap.
pub(crate) type Slot<V> = SmallVec<[V; 1]>;

pub(crate) enum Node<K, V> {
    Branch(BranchNode<K>),
    Leaf(LeafNode<K, V>),
}

// B+Tree: branches store separator keys and child ids.
// keys[i] is the minimum key reachable through children[i + 1].
pub(crate) struct BranchNode<K> {
    keys: Vec<K>,
    children: Vec<NodeId>,
}

// B+Tree: leaves store keys, their value slots and a non-owning link to the
// leaf holding the next-greater key range.
pub(crate) struct LeafNode<K, V> {
    keys: Vec<K>,
    slots: Vec<Slot<V>>,
    next: Option<NodeId>,
}

/// Result of searching for a key in a leaf.
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

impl<K, V> Node<K, V> {
    pub(crate) fn as_leaf(&self) -> &LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_leaf_mut(&mut self) -> &mut LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn as_branch(&self) -> &BranchNode<K> {
        match self {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("expected branch node"),
        }
    }

    pub(crate) fn as_branch_mut(&mut self) -> &mut BranchNode<K> {
        match self {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("expected branch node"),
        }
    }

    pub(crate) fn into_leaf(self) -> LeafNode<K, V> {
        match self {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => panic!("expected leaf node"),
        }
    }

    pub(crate) fn into_branch(self) -> BranchNode<K> {
        match self {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => panic!("expected branch node"),
        }
    }

    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Branch(branch) => branch.keys(),
            Node::Leaf(leaf) => leaf.keys(),
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys().len()
    }

    /// The quantity rebalancing is measured in: children for a branch,
    /// key/slot pairs for a leaf.
    pub(crate) fn fill(&self) -> usize {
        match self {
            Node::Branch(branch) => branch.child_count(),
            Node::Leaf(leaf) => leaf.key_count(),
        }
    }
}

impl<K> BranchNode<K> {
    pub(crate) fn new(keys: Vec<K>, children: Vec<NodeId>) -> Self {
        debug_assert_eq!(keys.len() + 1, children.len());
        Self { keys, children }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> NodeId {
        self.children[index]
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Index of the child whose subtree can contain `key`: the first child
    /// `i` with `keys[i] > key`, or the last child if no key is greater.
    #[inline]
    pub(crate) fn search_child<C: Comparator<K>>(&self, cmp: &C, key: &K) -> usize {
        self.keys.partition_point(|k| cmp.compare(k, key) != Ordering::Greater)
    }

    /// Inserts `child` immediately after `children[index]`, with `key` as the
    /// separator between them.
    pub(crate) fn insert_child(&mut self, index: usize, key: K, child: NodeId) {
        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
    }

    /// Removes `children[index + 1]` and the separator in front of it.
    pub(crate) fn remove_child(&mut self, index: usize) -> (K, NodeId) {
        let key = self.keys.remove(index);
        let child = self.children.remove(index + 1);
        (key, child)
    }

    pub(crate) fn push_child(&mut self, key: K, child: NodeId) {
        self.keys.push(key);
        self.children.push(child);
    }

    /// Prepends `child`; `key` becomes the separator between it and the
    /// previous first child.
    pub(crate) fn push_child_front(&mut self, child: NodeId, key: K) {
        self.keys.insert(0, key);
        self.children.insert(0, child);
    }

    /// Removes the last child and the separator in front of it.
    pub(crate) fn pop_child(&mut self) -> (K, NodeId) {
        let key = self.keys.pop().expect("branch has a separator to give");
        let child = self.children.pop().expect("branch has a child to give");
        (key, child)
    }

    /// Removes the first child and the separator after it.
    pub(crate) fn pop_child_front(&mut self) -> (NodeId, K) {
        let child = self.children.remove(0);
        let key = self.keys.remove(0);
        (child, key)
    }

    pub(crate) fn set_key(&mut self, index: usize, key: K) {
        self.keys[index] = key;
    }

    pub(crate) fn replace_key(&mut self, index: usize, key: K) -> K {
        core::mem::replace(&mut self.keys[index], key)
    }

    /// Splits off `children[at..]` into a new branch. Returns the separator
    /// that now sits between the halves and the right half.
    pub(crate) fn split_off(&mut self, at: usize) -> (K, BranchNode<K>) {
        debug_assert!(at > 0 && at < self.children.len());
        let children = self.children.split_off(at);
        let keys = self.keys.split_off(at);
        let separator = self.keys.pop().expect("left half keeps a separator");
        (separator, BranchNode::new(keys, children))
    }

    /// Appends every child of `right`; `separator` is the minimum key of
    /// `right`'s subtree.
    pub(crate) fn absorb(&mut self, separator: K, mut right: BranchNode<K>) {
        self.keys.push(separator);
        self.keys.append(&mut right.keys);
        self.children.append(&mut right.children);
    }
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            keys: Vec::new(),
            slots: Vec::new(),
            next: None,
        }
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    pub(crate) fn first_key(&self) -> Option<&K> {
        self.keys.first()
    }

    #[inline]
    pub(crate) fn slot(&self, index: usize) -> &Slot<V> {
        &self.slots[index]
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> &mut Slot<V> {
        &mut self.slots[index]
    }

    pub(crate) fn slots(&self) -> &[Slot<V>] {
        &self.slots
    }

    pub(crate) fn next(&self) -> Option<NodeId> {
        self.next
    }

    pub(crate) fn set_next(&mut self, next: Option<NodeId>) {
        self.next = next;
    }

    #[inline]
    pub(crate) fn search<C: Comparator<K>>(&self, cmp: &C, key: &K) -> SearchResult {
        match self.keys.binary_search_by(|k| cmp.compare(k, key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    pub(crate) fn insert(&mut self, index: usize, key: K, slot: Slot<V>) {
        self.keys.insert(index, key);
        self.slots.insert(index, slot);
    }

    pub(crate) fn remove(&mut self, index: usize) -> (K, Slot<V>) {
        let key = self.keys.remove(index);
        let slot = self.slots.remove(index);
        (key, slot)
    }

    pub(crate) fn push(&mut self, key: K, slot: Slot<V>) {
        self.keys.push(key);
        self.slots.push(slot);
    }

    pub(crate) fn push_front(&mut self, key: K, slot: Slot<V>) {
        self.keys.insert(0, key);
        self.slots.insert(0, slot);
    }

    pub(crate) fn pop(&mut self) -> (K, Slot<V>) {
        let key = self.keys.pop().expect("leaf has an entry to give");
        let slot = self.slots.pop().expect("leaf has a slot to give");
        (key, slot)
    }

    pub(crate) fn pop_front(&mut self) -> (K, Slot<V>) {
        self.remove(0)
    }

    /// Splits off `keys[at..]` into a new leaf that inherits this leaf's
    /// `next` link. The caller links this leaf to the new one once it has an id.
    pub(crate) fn split_off(&mut self, at: usize) -> LeafNode<K, V> {
        debug_assert!(at > 0 && at < self.keys.len());
        LeafNode {
            keys: self.keys.split_off(at),
            slots: self.slots.split_off(at),
            next: self.next.take(),
        }
    }

    /// Appends every entry of `right` and takes over its `next` link.
    pub(crate) fn absorb(&mut self, mut right: LeafNode<K, V>) {
        self.keys.append(&mut right.keys);
        self.slots.append(&mut right.slots);
        self.next = right.next;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::Natural;
    use smallvec::smallvec;

    fn leaf(keys: &[i32]) -> LeafNode<i32, char> {
        let mut leaf = LeafNode::new();
        for &k in keys {
            leaf.push(k, smallvec![char::from(b'a' + k as u8)]);
        }
        leaf
    }

    fn ids(range: core::ops::Range<usize>) -> Vec<NodeId> {
        range.map(NodeId::from_index).collect()
    }

    #[test]
    fn search_child_picks_first_greater_separator() {
        let branch = BranchNode::new(vec![10, 20, 30], ids(0..4));
        assert_eq!(branch.search_child(&Natural, &5), 0);
        assert_eq!(branch.search_child(&Natural, &10), 1);
        assert_eq!(branch.search_child(&Natural, &19), 1);
        assert_eq!(branch.search_child(&Natural, &20), 2);
        assert_eq!(branch.search_child(&Natural, &30), 3);
        assert_eq!(branch.search_child(&Natural, &99), 3);
    }

    #[test]
    fn branch_split_hands_up_middle_separator() {
        // Five children, four keys: an over-full order-4 branch.
        let mut left = BranchNode::new(vec![10, 20, 30, 40], ids(0..5));
        let (separator, right) = left.split_off(5 / 2);
        assert_eq!(separator, 20);
        assert_eq!(left.keys(), &[10]);
        assert_eq!(left.children(), &ids(0..2)[..]);
        assert_eq!(right.keys(), &[30, 40]);
        assert_eq!(right.children(), &ids(2..5)[..]);
    }

    #[test]
    fn branch_absorb_restores_split() {
        let mut left = BranchNode::new(vec![10, 20, 30, 40], ids(0..5));
        let (separator, right) = left.split_off(2);
        left.absorb(separator, right);
        assert_eq!(left.keys(), &[10, 20, 30, 40]);
        assert_eq!(left.children(), &ids(0..5)[..]);
    }

    #[test]
    fn branch_borrow_primitives() {
        let mut branch = BranchNode::new(vec![10, 20], ids(0..3));
        let (key, child) = branch.pop_child();
        assert_eq!((key, child), (20, NodeId::from_index(2)));
        branch.push_child_front(child, 5);
        assert_eq!(branch.keys(), &[5, 10]);
        assert_eq!(branch.child(0), NodeId::from_index(2));

        let (child, key) = branch.pop_child_front();
        assert_eq!((child, key), (NodeId::from_index(2), 5));
        branch.push_child(key, child);
        assert_eq!(branch.keys(), &[10, 5]);
        assert_eq!(branch.child_count(), 3);
    }

    #[test]
    fn leaf_split_moves_chain_link_right() {
        let mut left = leaf(&[1, 2, 3, 4]);
        left.set_next(Some(NodeId::from_index(9)));
        let right = left.split_off(2);
        assert_eq!(left.keys(), &[1, 2]);
        assert_eq!(right.keys(), &[3, 4]);
        assert_eq!(left.next(), None);
        assert_eq!(right.next(), Some(NodeId::from_index(9)));
        assert_eq!(right.slot(0).as_slice(), &['d']);
    }

    #[test]
    fn leaf_absorb_takes_chain_link() {
        let mut left = leaf(&[1, 2]);
        let mut right = leaf(&[5]);
        right.set_next(Some(NodeId::from_index(4)));
        left.absorb(right);
        assert_eq!(left.keys(), &[1, 2, 5]);
        assert_eq!(left.slots().len(), 3);
        assert_eq!(left.next(), Some(NodeId::from_index(4)));
    }

    #[test]
    fn leaf_search() {
        let leaf = leaf(&[2, 4, 6]);
        assert!(matches!(leaf.search(&Natural, &4), SearchResult::Found(1)));
        assert!(matches!(leaf.search(&Natural, &5), SearchResult::NotFound(2)));
        assert!(matches!(leaf.search(&Natural, &0), SearchResult::NotFound(0)));
        assert!(matches!(leaf.search(&Natural, &7), SearchResult::NotFound(3)));
    }

    #[test]
    fn fill_counts_children_or_entries() {
        let node: Node<i32, char> = Node::Branch(BranchNode::new(vec![3], ids(0..2)));
        assert_eq!(node.fill(), 2);
        assert_eq!(node.key_count(), 1);
        let node = Node::Leaf(leaf(&[1, 2, 3]));
        assert_eq!(node.fill(), 3);
    }
}
