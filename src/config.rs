//! Construction-time configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Branching factor used when none is configured.
pub const DEFAULT_ORDER: usize = 6;

/// How values are stored under a key.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// One value per key; storing an existing key overwrites it.
    Unique,
    /// Any number of values per key, kept in insertion order.
    #[default]
    Multimap,
}

/// Tree configuration.
///
/// ```
/// use bplus_index::{Config, Mode};
///
/// let config: Config = serde_json::from_str(r#"{ "order": 8, "mode": "unique" }"#).unwrap();
/// assert_eq!(config, Config::new(8).mode(Mode::Unique));
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum children per branch; must be even and at least 4.
    pub order: usize,
    /// Run [`check`](crate::BPlusTree::check) after every mutation.
    pub debug_validate: bool,
    /// Value storage policy.
    pub mode: Mode,
}

impl Config {
    /// A configuration with the given order and default settings otherwise.
    pub const fn new(order: usize) -> Self {
        Self {
            order,
            debug_validate: false,
            mode: Mode::Multimap,
        }
    }

    /// Enables or disables post-mutation validation.
    #[must_use]
    pub const fn debug_validate(mut self, enabled: bool) -> Self {
        self.debug_validate = enabled;
        self
    }

    /// Sets the value storage policy.
    #[must_use]
    pub const fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER)
    }
}

/// A validated branching factor `m`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Order(usize);

impl Order {
    pub(crate) const DEFAULT: Self = Self(DEFAULT_ORDER);

    pub(crate) fn new(order: usize) -> Result<Self> {
        if order < 4 || order % 2 != 0 {
            return Err(Error::InvalidOrder { order });
        }
        Ok(Self(order))
    }

    pub(crate) const fn get(self) -> usize {
        self.0
    }

    /// `ceil(m / 2)`: the fewest children a non-root branch, or entries a
    /// non-root leaf, may hold.
    pub(crate) const fn min_children(self) -> usize {
        self.0.div_ceil(2)
    }

    /// `m - 1`: the most keys any node may hold.
    pub(crate) const fn max_keys(self) -> usize {
        self.0 - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_bounds() {
        let order = Order::new(4).unwrap();
        assert_eq!(order.min_children(), 2);
        assert_eq!(order.max_keys(), 3);

        let order = Order::new(128).unwrap();
        assert_eq!(order.min_children(), 64);
        assert_eq!(order.max_keys(), 127);
    }

    #[test]
    fn rejects_odd_and_small_orders() {
        for order in [0, 1, 2, 3, 5, 7, 129] {
            assert_eq!(Order::new(order), Err(Error::InvalidOrder { order }));
        }
    }

    #[test]
    fn defaults_match_builder() {
        assert_eq!(Config::default(), Config::new(DEFAULT_ORDER));
        let config = Config::new(10).debug_validate(true).mode(Mode::Unique);
        assert!(config.debug_validate);
        assert_eq!(config.mode, Mode::Unique);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: Config = serde_json::from_str(r#"{ "debug_validate": true }"#).unwrap();
        assert_eq!(config, Config::default().debug_validate(true));

        let json = serde_json::to_string(&Config::new(4).mode(Mode::Unique)).unwrap();
        assert_eq!(json, r#"{"order":4,"debug_validate":false,"mode":"unique"}"#);
    }
}
