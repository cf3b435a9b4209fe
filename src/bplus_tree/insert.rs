use log::{debug, trace};
use smallvec::smallvec;

use super::{BPlusTree, Path};
use crate::compare::Comparator;
use crate::config::Mode;
use crate::raw::{BranchNode, Node, NodeId, SearchResult};

impl<K: Clone, V, C: Comparator<K>> BPlusTree<K, V, C> {
    /// Stores `value` under `key`.
    ///
    /// In [`Mode::Unique`] an existing value is overwritten; in
    /// [`Mode::Multimap`] it is appended to the key's values. Neither case
    /// changes the tree's shape. A new key may split its leaf, and the split
    /// may propagate up to a new root.
    ///
    /// # Panics
    ///
    /// With `debug_validate` on, panics if the tree fails validation afterwards.
    pub fn store(&mut self, key: K, value: V) {
        self.store_entry(key, value);
        self.validate_after("store");
    }

    fn store_entry(&mut self, key: K, value: V) {
        let (leaf_id, mut path) = self.locate(&key);
        let leaf = self.nodes.get_mut(leaf_id).as_leaf_mut();
        match leaf.search(&self.cmp, &key) {
            SearchResult::Found(idx) => match self.mode {
                Mode::Unique => *leaf.slot_mut(idx) = smallvec![value],
                Mode::Multimap => {
                    leaf.slot_mut(idx).push(value);
                    self.value_count += 1;
                }
            },
            SearchResult::NotFound(idx) => {
                leaf.insert(idx, key, smallvec![value]);
                self.len += 1;
                self.value_count += 1;
                if leaf.key_count() > self.order.max_keys() {
                    let (separator, right) = self.split_leaf(leaf_id);
                    self.propagate_split(&mut path, separator, right);
                }
            }
        }
    }

    /// Halves an over-full leaf. The right half inherits the old `next` link
    /// and the left half links to it. Returns the right half's first key and id.
    pub(super) fn split_leaf(&mut self, leaf_id: NodeId) -> (K, NodeId) {
        let leaf = self.nodes.get_mut(leaf_id).as_leaf_mut();
        let at = leaf.key_count() / 2;
        let right = leaf.split_off(at);
        let separator = right.key(0).clone();

        let right_id = self.nodes.alloc(Node::Leaf(right));
        self.nodes.get_mut(leaf_id).as_leaf_mut().set_next(Some(right_id));
        trace!("split leaf {leaf_id:?} at {at} into {right_id:?}");
        (separator, right_id)
    }

    /// Halves an over-full branch by children. Returns the separator between
    /// the halves (the right half's minimum key) and the right half's id.
    pub(super) fn split_branch(&mut self, branch_id: NodeId) -> (K, NodeId) {
        let branch = self.nodes.get_mut(branch_id).as_branch_mut();
        let at = branch.child_count() / 2;
        let (separator, right) = branch.split_off(at);

        let right_id = self.nodes.alloc(Node::Branch(right));
        trace!("split branch {branch_id:?} at child {at} into {right_id:?}");
        (separator, right_id)
    }

    pub(super) fn split_node(&mut self, id: NodeId) -> (K, NodeId) {
        match self.nodes.get(id) {
            Node::Leaf(_) => self.split_leaf(id),
            Node::Branch(_) => self.split_branch(id),
        }
    }

    /// Inserts `new_child` to the right of the child the path descended into,
    /// splitting ancestors as long as they overflow.
    fn propagate_split(&mut self, path: &mut Path, mut separator: K, mut new_child: NodeId) {
        while let Some(frame) = path.pop() {
            let parent = self.nodes.get_mut(frame.node).as_branch_mut();
            parent.insert_child(frame.child_index, separator, new_child);
            if parent.key_count() <= self.order.max_keys() {
                return;
            }
            (separator, new_child) = self.split_branch(frame.node);
        }

        // The root itself split.
        let old_root = self.root;
        let new_root = BranchNode::new(vec![separator], vec![old_root, new_child]);
        self.root = self.nodes.alloc(Node::Branch(new_root));
        debug!("tree grew to depth {} under new root {:?}", self.depth(), self.root);
    }
}
