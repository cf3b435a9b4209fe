//! Error types for the index.

use thiserror::Error;

use crate::NodeId;

/// Result type alias for index operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by the index.
///
/// Absent keys are not errors: lookups and removals return `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The branching factor must be even and at least 4.
    #[error("invalid order {order}: must be even and >= 4")]
    InvalidOrder { order: usize },

    /// A structural invariant does not hold; the tree is corrupt.
    #[error("invariant violation: {0}")]
    InvariantViolation(#[from] Violation),
}

/// The rule a failed [`check`](crate::BPlusTree::check) found broken.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A node holds more than `order - 1` keys.
    #[error("node {node:?} overflowed: {keys} keys, max {max}")]
    Overflow { node: NodeId, keys: usize, max: usize },

    /// Keys within a node are not strictly increasing.
    #[error("node {node:?} has disordered or duplicate keys at index {index}")]
    Disorder { node: NodeId, index: usize },

    /// The root branch has fewer than two children.
    #[error("root branch {node:?} has {children} children, needs at least 2")]
    UnderpopulatedRoot { node: NodeId, children: usize },

    /// A non-root branch has fewer than `ceil(order / 2)` children.
    #[error("branch {node:?} has {children} children, needs at least {min}")]
    UnderpopulatedBranch { node: NodeId, children: usize, min: usize },

    /// A non-root leaf has fewer than `ceil(order / 2)` entries.
    #[error("leaf {node:?} has {entries} entries, needs at least {min}")]
    UnderpopulatedLeaf { node: NodeId, entries: usize, min: usize },

    /// A branch does not have exactly one more child than keys.
    #[error("branch {node:?} has {keys} keys but {children} children")]
    KeyChildMismatch { node: NodeId, keys: usize, children: usize },

    /// A leaf does not have exactly one slot per key.
    #[error("leaf {node:?} has {keys} keys but {slots} slots")]
    KeySlotMismatch { node: NodeId, keys: usize, slots: usize },

    /// A leaf slot holds no values.
    #[error("leaf {node:?} has an empty slot at index {index}")]
    EmptySlot { node: NodeId, index: usize },

    /// A unique-mode slot holds more than one value.
    #[error("leaf {node:?} holds {values} values at index {index} in unique mode")]
    SharedSlot { node: NodeId, index: usize, values: usize },

    /// Leaves are not all at the same depth.
    #[error("leaf {node:?} at depth {found}, expected {expected}")]
    LeafDepth { node: NodeId, expected: usize, found: usize },

    /// A node's keys fall outside the range its parent separators allow.
    #[error("node {node:?} has keys outside its separator range")]
    RangeBound { node: NodeId },

    /// A separator differs from the minimum key of the subtree to its right.
    #[error("branch {node:?} separator {index} is not the minimum of its right subtree")]
    StaleSeparator { node: NodeId, index: usize },

    /// Walking the `next` links does not reproduce the tree's keys in order.
    #[error("leaf chain diverges from tree order at position {position}")]
    LeafChain { position: usize },

    /// The stored key or value counters disagree with the tree contents.
    #[error("{what} counter is {stored}, tree holds {actual}")]
    CountMismatch { what: &'static str, stored: usize, actual: usize },

    /// A child or chain link points at no live node.
    #[error("link to {node:?} does not resolve to a live node")]
    DanglingNode { node: NodeId },
}
