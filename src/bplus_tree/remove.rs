use log::{debug, trace};

use super::{BPlusTree, Frame, Path};
use crate::compare::Comparator;
use crate::config::Mode;
use crate::raw::{Node, NodeId, SearchResult};

impl<K: Clone, V, C: Comparator<K>> BPlusTree<K, V, C> {
    /// Removes `key` and returns its value.
    ///
    /// In [`Mode::Multimap`] this only succeeds when the key holds exactly one
    /// value; with several values the removal is ambiguous and the tree is left
    /// untouched. Use [`remove_value`](Self::remove_value) to pick one.
    ///
    /// # Panics
    ///
    /// With `debug_validate` on, panics if the tree fails validation afterwards.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let mode = self.mode;
        let removed = self.remove_where(key, |values| match mode {
            Mode::Unique => Some(0),
            Mode::Multimap => (values.len() == 1).then_some(0),
        });
        self.validate_after("remove");
        removed
    }

    /// Removes the first value under `key` equal to `value`, dropping the key
    /// once no values remain. In [`Mode::Unique`] `value` is not compared and
    /// the key is removed outright.
    ///
    /// # Panics
    ///
    /// With `debug_validate` on, panics if the tree fails validation afterwards.
    pub fn remove_value(&mut self, key: &K, value: &V) -> Option<V>
    where
        V: PartialEq,
    {
        let mode = self.mode;
        let removed = self.remove_where(key, |values| match mode {
            Mode::Unique => Some(0),
            Mode::Multimap => values.iter().position(|v| v == value),
        });
        self.validate_after("remove_value");
        removed
    }

    /// Removes the value `pick` selects from `key`'s slot, then restores the
    /// tree's shape if the key itself went away.
    fn remove_where(&mut self, key: &K, pick: impl FnOnce(&[V]) -> Option<usize>) -> Option<V> {
        let (leaf_id, mut path) = self.locate(key);

        let leaf = self.nodes.get_mut(leaf_id).as_leaf_mut();
        let SearchResult::Found(idx) = leaf.search(&self.cmp, key) else {
            return None;
        };
        let value_idx = pick(leaf.slot(idx))?;
        let value = leaf.slot_mut(idx).remove(value_idx);
        self.value_count -= 1;
        if !leaf.slot(idx).is_empty() {
            return Some(value);
        }

        leaf.remove(idx);
        self.len -= 1;
        let underfull = leaf.key_count() < self.order.min_children();
        trace!("removed key at {idx} of leaf {leaf_id:?}, {} left", leaf.key_count());

        // A root leaf may hold any number of entries.
        if path.is_empty() {
            return Some(value);
        }

        if underfull {
            self.rebalance(leaf_id, &mut path);
        }
        // Separators are the minimum of the subtree to their right, so they go
        // stale when a subtree's first key is removed or entries move between
        // siblings.
        if idx == 0 || underfull {
            self.repair_separators(key);
        }
        Some(value)
    }

    /// Restores minimum occupancy from `node_id` upwards: borrow from a sibling
    /// that can spare an entry, otherwise merge with one and continue at the
    /// parent, which just lost a child.
    fn rebalance(&mut self, node_id: NodeId, path: &mut Path) {
        let min = self.order.min_children();
        let mut node_id = node_id;

        while let Some(&frame) = path.last() {
            if self.nodes.get(node_id).fill() >= min {
                return;
            }

            let parent = self.nodes.get(frame.node).as_branch();
            let idx = frame.child_index;
            let left = idx.checked_sub(1).map(|i| parent.child(i));
            let right = (idx + 1 < parent.child_count()).then(|| parent.child(idx + 1));

            // Try to borrow from right sibling
            if let Some(right_id) = right
                && self.nodes.get(right_id).fill() > min
            {
                match self.nodes.get(node_id) {
                    Node::Leaf(_) => self.borrow_from_right_leaf(node_id, right_id, frame),
                    Node::Branch(_) => self.borrow_from_right_branch(node_id, right_id, frame),
                }
                return;
            }

            // Try to borrow from left sibling
            if let Some(left_id) = left
                && self.nodes.get(left_id).fill() > min
            {
                match self.nodes.get(node_id) {
                    Node::Leaf(_) => self.borrow_from_left_leaf(node_id, left_id, frame),
                    Node::Branch(_) => self.borrow_from_left_branch(node_id, left_id, frame),
                }
                return;
            }

            // Must merge; the left node of the pair survives.
            match (left, right) {
                (Some(left_id), _) => self.merge_siblings(frame.node, idx - 1, left_id, node_id),
                (None, Some(right_id)) => self.merge_siblings(frame.node, idx, node_id, right_id),
                (None, None) => unreachable!("non-root branch {:?} has a single child", frame.node),
            }
            path.pop();
            node_id = frame.node;
        }

        self.collapse_root();
    }

    fn borrow_from_right_leaf(&mut self, leaf_id: NodeId, right_id: NodeId, frame: Frame) {
        // Pop from right sibling
        let right = self.nodes.get_mut(right_id).as_leaf_mut();
        let (key, slot) = right.pop_front();
        let right_first = right.key(0).clone();

        // Push to back of current leaf
        self.nodes.get_mut(leaf_id).as_leaf_mut().push(key, slot);
        self.nodes
            .get_mut(frame.node)
            .as_branch_mut()
            .set_key(frame.child_index, right_first);
        trace!("leaf {leaf_id:?} borrowed from right sibling {right_id:?}");
    }

    fn borrow_from_left_leaf(&mut self, leaf_id: NodeId, left_id: NodeId, frame: Frame) {
        // Pop from left sibling
        let (key, slot) = self.nodes.get_mut(left_id).as_leaf_mut().pop();
        let separator = key.clone();

        // Push to front of current leaf
        self.nodes.get_mut(leaf_id).as_leaf_mut().push_front(key, slot);
        self.nodes
            .get_mut(frame.node)
            .as_branch_mut()
            .set_key(frame.child_index - 1, separator);
        trace!("leaf {leaf_id:?} borrowed from left sibling {left_id:?}");
    }

    /// Rotates the right sibling's first child through the parent: the parent's
    /// separator comes down in front of it and the sibling's first separator
    /// goes up.
    fn borrow_from_right_branch(&mut self, branch_id: NodeId, right_id: NodeId, frame: Frame) {
        let (child, right_first) = self.nodes.get_mut(right_id).as_branch_mut().pop_child_front();
        let separator = self
            .nodes
            .get_mut(frame.node)
            .as_branch_mut()
            .replace_key(frame.child_index, right_first);
        self.nodes.get_mut(branch_id).as_branch_mut().push_child(separator, child);
        trace!("branch {branch_id:?} borrowed from right sibling {right_id:?}");
    }

    fn borrow_from_left_branch(&mut self, branch_id: NodeId, left_id: NodeId, frame: Frame) {
        let (child_min, child) = self.nodes.get_mut(left_id).as_branch_mut().pop_child();
        let separator = self
            .nodes
            .get_mut(frame.node)
            .as_branch_mut()
            .replace_key(frame.child_index - 1, child_min);
        self.nodes
            .get_mut(branch_id)
            .as_branch_mut()
            .push_child_front(child, separator);
        trace!("branch {branch_id:?} borrowed from left sibling {left_id:?}");
    }

    /// Folds `right_id` into `left_id`, its left neighbour under `parent_id`,
    /// and drops the separator between them. Splits the result again if it
    /// overflows.
    fn merge_siblings(&mut self, parent_id: NodeId, separator_idx: usize, left_id: NodeId, right_id: NodeId) {
        let (separator, removed) = self
            .nodes
            .get_mut(parent_id)
            .as_branch_mut()
            .remove_child(separator_idx);
        debug_assert_eq!(removed, right_id);

        let right = self.nodes.take(right_id);
        match self.nodes.get_mut(left_id) {
            Node::Leaf(left) => left.absorb(right.into_leaf()),
            Node::Branch(left) => left.absorb(separator, right.into_branch()),
        }
        trace!("merged {right_id:?} into {left_id:?}");

        if self.nodes.get(left_id).key_count() > self.order.max_keys() {
            let (separator, new_id) = self.split_node(left_id);
            self.nodes
                .get_mut(parent_id)
                .as_branch_mut()
                .insert_child(separator_idx, separator, new_id);
            debug!("merged node {left_id:?} overflowed, split off {new_id:?}");
        }
    }

    /// Replaces a root branch that is down to one child with that child.
    fn collapse_root(&mut self) {
        if let Node::Branch(root) = self.nodes.get(self.root)
            && root.child_count() == 1
        {
            let child = root.child(0);
            self.nodes.free(self.root);
            self.root = child;
            debug!("tree shrank to depth {} under root {:?}", self.depth(), self.root);
        }
    }

    /// Recomputes, bottom-up, every separator of the branches on `key`'s
    /// search path from the minimum of the subtree to its right.
    fn repair_separators(&mut self, key: &K) {
        let (_, path) = self.locate(key);
        for frame in path.iter().rev() {
            let child_count = self.nodes.get(frame.node).as_branch().child_count();
            for i in 1..child_count {
                let child = self.nodes.get(frame.node).as_branch().child(i);
                let Some(min) = self.subtree_min(child).cloned() else {
                    continue;
                };
                self.nodes.get_mut(frame.node).as_branch_mut().set_key(i - 1, min);
            }
        }
    }
}
