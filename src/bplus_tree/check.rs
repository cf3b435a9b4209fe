use core::cmp::Ordering;

use super::BPlusTree;
use crate::compare::Comparator;
use crate::config::Mode;
use crate::error::{Result, Violation};
use crate::raw::{Node, NodeId};

/// State gathered while walking a subtree.
#[derive(Default)]
struct Walk {
    leaf_depth: Option<usize>,
    /// Leaves in key order.
    leaves: Vec<NodeId>,
    keys: usize,
    values: usize,
}

type Checked = core::result::Result<(), Violation>;

impl<K, V, C: Comparator<K>> BPlusTree<K, V, C> {
    /// Verifies every structural invariant of the tree: key order, fill
    /// bounds, uniform leaf depth, separator accuracy, the leaf chain and the
    /// key and value counters.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`](crate::Error::InvariantViolation) naming
    /// the first broken rule found.
    pub fn check(&self) -> Result<()> {
        let mut walk = Walk::default();
        self.check_node(self.root, 0, true, None, None, &mut walk)?;
        self.check_leaf_chain(&walk.leaves)?;

        if walk.keys != self.len {
            return Err(Violation::CountMismatch {
                what: "key",
                stored: self.len,
                actual: walk.keys,
            }
            .into());
        }
        if walk.values != self.value_count {
            return Err(Violation::CountMismatch {
                what: "value",
                stored: self.value_count,
                actual: walk.values,
            }
            .into());
        }
        Ok(())
    }

    /// Verifies the structural invariants of the subtree rooted at `id`,
    /// treating it as a root: it may hold fewer entries than a non-root node.
    /// The leaf chain and the tree-wide counters are not checked.
    ///
    /// # Errors
    ///
    /// [`Error::InvariantViolation`](crate::Error::InvariantViolation) naming
    /// the first broken rule found, including
    /// [`Violation::DanglingNode`] if `id` is not a live node.
    pub fn check_subtree(&self, id: NodeId) -> Result<()> {
        let mut walk = Walk::default();
        self.check_node(id, 0, true, None, None, &mut walk)?;
        Ok(())
    }

    /// Checks `id` and everything below it. Keys must lie in `[lower, upper)`.
    fn check_node(
        &self,
        id: NodeId,
        depth: usize,
        is_root: bool,
        lower: Option<&K>,
        upper: Option<&K>,
        walk: &mut Walk,
    ) -> Checked {
        let node = self.nodes.try_get(id).ok_or(Violation::DanglingNode { node: id })?;
        let keys = node.keys();
        let min = self.order.min_children();

        if keys.len() > self.order.max_keys() {
            return Err(Violation::Overflow {
                node: id,
                keys: keys.len(),
                max: self.order.max_keys(),
            });
        }
        // Check keys are sorted
        for i in 1..keys.len() {
            if self.cmp.compare(&keys[i - 1], &keys[i]) != Ordering::Less {
                return Err(Violation::Disorder { node: id, index: i });
            }
        }
        if let (Some(lower), Some(first)) = (lower, keys.first())
            && self.cmp.compare(first, lower) == Ordering::Less
        {
            return Err(Violation::RangeBound { node: id });
        }
        if let (Some(upper), Some(last)) = (upper, keys.last())
            && self.cmp.compare(last, upper) != Ordering::Less
        {
            return Err(Violation::RangeBound { node: id });
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.slots().len() != keys.len() {
                    return Err(Violation::KeySlotMismatch {
                        node: id,
                        keys: keys.len(),
                        slots: leaf.slots().len(),
                    });
                }
                if !is_root && keys.len() < min {
                    return Err(Violation::UnderpopulatedLeaf {
                        node: id,
                        entries: keys.len(),
                        min,
                    });
                }
                for (index, slot) in leaf.slots().iter().enumerate() {
                    if slot.is_empty() {
                        return Err(Violation::EmptySlot { node: id, index });
                    }
                    if self.mode == Mode::Unique && slot.len() > 1 {
                        return Err(Violation::SharedSlot {
                            node: id,
                            index,
                            values: slot.len(),
                        });
                    }
                    walk.values += slot.len();
                }

                match walk.leaf_depth {
                    None => walk.leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(Violation::LeafDepth {
                            node: id,
                            expected,
                            found: depth,
                        });
                    }
                    Some(_) => {}
                }
                walk.keys += keys.len();
                walk.leaves.push(id);
                Ok(())
            }
            Node::Branch(branch) => {
                let children = branch.children();
                if children.len() != keys.len() + 1 {
                    return Err(Violation::KeyChildMismatch {
                        node: id,
                        keys: keys.len(),
                        children: children.len(),
                    });
                }
                if is_root && children.len() < 2 {
                    return Err(Violation::UnderpopulatedRoot {
                        node: id,
                        children: children.len(),
                    });
                }
                if !is_root && children.len() < min {
                    return Err(Violation::UnderpopulatedBranch {
                        node: id,
                        children: children.len(),
                        min,
                    });
                }

                for (i, &child) in children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { Some(&keys[i - 1]) };
                    let child_upper = keys.get(i).or(upper);
                    self.check_node(child, depth + 1, false, child_lower, child_upper, walk)?;
                }

                // Separators must equal the minimum of the subtree to their right.
                for (index, separator) in keys.iter().enumerate() {
                    let fresh = self
                        .subtree_min(children[index + 1])
                        .is_some_and(|first| self.cmp.compare(first, separator) == Ordering::Equal);
                    if !fresh {
                        return Err(Violation::StaleSeparator { node: id, index });
                    }
                }
                Ok(())
            }
        }
    }

    /// Follows `next` links from the leftmost leaf and compares them with the
    /// leaves found by descent.
    fn check_leaf_chain(&self, leaves: &[NodeId]) -> Checked {
        let mut current = leaves.first().copied();
        for (position, &expected) in leaves.iter().enumerate() {
            if current != Some(expected) {
                return Err(Violation::LeafChain { position });
            }
            let leaf = self
                .nodes
                .try_get(expected)
                .ok_or(Violation::DanglingNode { node: expected })?;
            current = leaf.as_leaf().next();
        }
        match current {
            None => Ok(()),
            Some(_) => Err(Violation::LeafChain {
                position: leaves.len(),
            }),
        }
    }
}
