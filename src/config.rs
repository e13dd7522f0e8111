//! Configuration Module
//!
//! Construction parameters for a TTL map, loadable from environment variables.

use std::env;

use serde::Deserialize;

/// TTL map construction parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TtlMapConfig {
    /// Number of entries to preallocate room for (a hint, not a limit)
    pub initial_capacity: usize,
    /// Hard bound on live entries, 0 = unbounded
    pub max_capacity: usize,
}

impl TtlMapConfig {
    /// Creates a new TtlMapConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TTLMAP_INITIAL_CAPACITY` - Preallocation hint (default: 0)
    /// - `TTLMAP_MAX_CAPACITY` - Maximum live entries, 0 or negative for
    ///   unbounded (default: 0)
    pub fn from_env() -> Self {
        Self {
            initial_capacity: env::var("TTLMAP_INITIAL_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            max_capacity: env::var("TTLMAP_MAX_CAPACITY")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .map(|v| usize::try_from(v).unwrap_or(0))
                .unwrap_or(0),
        }
    }

    /// Returns the hard bound, or None when unbounded.
    pub fn capacity_limit(&self) -> Option<usize> {
        (self.max_capacity > 0).then_some(self.max_capacity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = TtlMapConfig::default();
        assert_eq!(config.initial_capacity, 0);
        assert_eq!(config.max_capacity, 0);
        assert_eq!(config.capacity_limit(), None);
    }

    // Single test touching the environment so parallel tests don't race on it
    #[test]
    fn test_config_from_env() {
        env::remove_var("TTLMAP_INITIAL_CAPACITY");
        env::remove_var("TTLMAP_MAX_CAPACITY");

        let config = TtlMapConfig::from_env();
        assert_eq!(config, TtlMapConfig::default());

        env::set_var("TTLMAP_INITIAL_CAPACITY", "64");
        env::set_var("TTLMAP_MAX_CAPACITY", "128");
        let config = TtlMapConfig::from_env();
        assert_eq!(config.initial_capacity, 64);
        assert_eq!(config.capacity_limit(), Some(128));

        env::set_var("TTLMAP_MAX_CAPACITY", "-1");
        assert_eq!(TtlMapConfig::from_env().capacity_limit(), None);

        env::set_var("TTLMAP_MAX_CAPACITY", "lots");
        assert_eq!(TtlMapConfig::from_env().capacity_limit(), None);

        env::remove_var("TTLMAP_INITIAL_CAPACITY");
        env::remove_var("TTLMAP_MAX_CAPACITY");
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: TtlMapConfig = serde_json::from_str(r#"{"max_capacity": 10}"#).unwrap();
        assert_eq!(config.initial_capacity, 0);
        assert_eq!(config.capacity_limit(), Some(10));
    }
}
