//! An in-memory B+tree ordered index for Rust.
//!
//! [`BPlusTree`] keeps keys in comparator order across a linked chain of
//! leaves and supports:
//!
//! - [`store`](BPlusTree::store) - Insert a value, splitting nodes upwards as they fill
//! - [`fetch`](BPlusTree::fetch) / [`fetch_nearest`](BPlusTree::fetch_nearest) - Exact or nearest-neighbour lookup
//! - [`fetch_range`](BPlusTree::fetch_range) - All values in an inclusive key range
//! - [`values`](BPlusTree::values) - A [`Cursor`] bounded by a value limit or a target value
//! - [`remove`](BPlusTree::remove) / [`remove_value`](BPlusTree::remove_value) - Deletion with borrow, merge and root collapse
//! - [`check`](BPlusTree::check) - Full structural validation
//!
//! # Example
//!
//! ```
//! use bplus_index::{BPlusTree, Config, CursorOptions, RangeOrder};
//!
//! let mut index = BPlusTree::with_config(Config::new(4)).unwrap();
//! for (day, reading) in [(3, 21.5), (1, 19.0), (2, 20.1), (2, 20.4), (5, 18.2)] {
//!     index.store(day, reading);
//! }
//!
//! // Multimap by default: readings under the same day keep insertion order.
//! assert_eq!(index.fetch(&2), Some(&[20.1, 20.4][..]));
//!
//! // Inclusive range, absent bounds allowed.
//! assert_eq!(index.fetch_range(&2, &4, RangeOrder::Ascending), vec![&20.1, &20.4, &21.5]);
//!
//! // The first three readings from day 2 onwards.
//! let firsts: Vec<_> = index.values(CursorOptions::new().key(2).limit(3)).map(|e| e.values.len()).collect();
//! assert_eq!(firsts, vec![2, 1]);
//!
//! assert!(index.check().is_ok());
//! ```
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Branches hold
//! separator keys equal to the minimum key of the subtree on their right;
//! leaves hold key/value-slot pairs and a non-owning link to the next leaf.
//! Mutations record their descent as an explicit stack of frames and walk it
//! back up to split, borrow or merge.
//!
//! The engine logs through the [`log`] facade; no logger is installed here.

// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod bplus_tree;
mod compare;
mod config;
mod error;
mod raw;

pub use bplus_tree::{
    BPlusTree, Cursor, CursorEntry, CursorOptions, Direction, Found, Iter, Keys, LeafRef, RangeOrder, Repr, ReprKind,
    ReprOptions,
};
pub use compare::{Comparator, Natural};
pub use config::{Config, DEFAULT_ORDER, Mode};
pub use error::{Error, Result, Violation};
pub use raw::NodeId;
