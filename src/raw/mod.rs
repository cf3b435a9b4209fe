mod arena;
mod handle;
mod node;

pub(crate) use arena::Arena;
pub use handle::NodeId;
pub(crate) use node::{BranchNode, LeafNode, Node, SearchResult};
